use log::debug;

use crate::{
    config::TracerConfig,
    memory::{ArgumentReader, MemoryView},
    metadata::{
        provider::{CallInfo, FunctionId, RuntimeMetadata},
        signatures::MethodSignature,
    },
    stack::cache::generic_context,
    Result,
};

/// Render the arguments of one call as `<type> <name> = <value>` lines.
///
/// Any failure in the lookup chain yields an empty list; individual unreadable values
/// render as `<?>` instead.
pub fn capture_arguments(
    runtime: &dyn RuntimeMetadata,
    memory: &dyn MemoryView,
    config: &TracerConfig,
    function: FunctionId,
    call: CallInfo,
) -> Vec<String> {
    match try_capture_arguments(runtime, memory, config, function, call) {
        Ok(arguments) => arguments,
        Err(error) => {
            debug!("No arguments for 0x{:X}: {}", function, error);
            Vec::new()
        }
    }
}

fn try_capture_arguments(
    runtime: &dyn RuntimeMetadata,
    memory: &dyn MemoryView,
    config: &TracerConfig,
    function: FunctionId,
    call: CallInfo,
) -> Result<Vec<String>> {
    let location = runtime.function_info(function, None)?;
    let context = generic_context(runtime, &location);
    let signature =
        MethodSignature::decode(runtime, location.module_id, location.method_token, &context)?;

    let ranges = runtime.argument_ranges(function, call)?;
    let skip = usize::from(signature.has_this);
    if ranges.len() < signature.parameters.len() + skip {
        return Err(unavailable_error!(
            "{} argument ranges for {} parameters",
            ranges.len(),
            signature.parameters.len() + skip
        ));
    }

    let reader = ArgumentReader::new(runtime, memory, config);
    let mut arguments = Vec::with_capacity(signature.parameters.len());
    for (index, (param, range)) in signature
        .parameters
        .iter()
        .zip(&ranges[skip..])
        .enumerate()
    {
        if range.start == 0 {
            continue;
        }

        let value = reader.read(param.element_type, range.start);
        if param.name.is_empty() {
            arguments.push(format!("{} arg{} = {}", param.type_name, index, value));
        } else {
            arguments.push(format!("{} {} = {}", param.type_name, param.name, value));
        }
    }

    Ok(arguments)
}
