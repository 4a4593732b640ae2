use std::sync::Arc;

use dashmap::DashMap;
use log::debug;

use crate::{
    metadata::{
        provider::{CallInfo, FunctionId, FunctionLocation, RuntimeMetadata},
        signatures::{GenericContext, MethodSignature},
        typesystem::TypeNameResolver,
    },
    stack::FunctionInfo,
    Result,
};

/// Process-wide cache of [`FunctionInfo`], keyed by [`FunctionId`].
///
/// Entries are never evicted or modified: function ids are stable and bounded by the code
/// the runtime loads. Builds run outside any shard lock, so two threads entering the same
/// new function may both build it; the first insert wins and both get that instance.
#[derive(Default)]
pub struct FunctionInfoCache {
    entries: DashMap<FunctionId, Arc<FunctionInfo>>,
}

impl FunctionInfoCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        FunctionInfoCache {
            entries: DashMap::new(),
        }
    }

    /// The cached info of `function`, if already built
    #[must_use]
    pub fn get(&self, function: FunctionId) -> Option<Arc<FunctionInfo>> {
        self.entries
            .get(&function)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// The cached info of `function`, building it with `build` on a miss
    pub fn get_or_build<F>(&self, function: FunctionId, build: F) -> Arc<FunctionInfo>
    where
        F: FnOnce() -> FunctionInfo,
    {
        if let Some(info) = self.get(function) {
            return info;
        }

        let built = Arc::new(build());
        Arc::clone(self.entries.entry(function).or_insert(built).value())
    }

    /// Number of cached functions
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the display metadata of `function`.
///
/// Every lookup degrades independently: a missing module leaves the module and assembly
/// names empty, an unresolvable type leaves the type name empty, and a broken signature
/// leaves the method signature empty. When the runtime reports no declaring class, it is
/// asked again with the frame context of `call`; if that still yields none, the declaring
/// `TypeDef` of the method is named instead.
pub fn build_function_info(
    runtime: &dyn RuntimeMetadata,
    function: FunctionId,
    call: CallInfo,
) -> FunctionInfo {
    let mut info = FunctionInfo::default();

    let location = match runtime.function_info(function, None) {
        Ok(location) => location,
        Err(error) => {
            debug!("No function info for 0x{:X}: {}", function, error);
            return info;
        }
    };

    match runtime.module_info(location.module_id) {
        Ok(module) => {
            info.module_name = module.name;
            match runtime.assembly_name(module.assembly_id) {
                Ok(name) => info.assembly_name = name,
                Err(error) => debug!("No assembly name for 0x{:X}: {}", function, error),
            }
        }
        Err(error) => debug!("No module info for 0x{:X}: {}", function, error),
    }

    let location = if location.class_id == 0 {
        match runtime
            .frame_info(function, call)
            .and_then(|frame| runtime.function_info(function, Some(frame)))
        {
            Ok(framed) => framed,
            Err(error) => {
                debug!("No frame context for 0x{:X}: {}", function, error);
                location
            }
        }
    } else {
        location
    };

    info.type_name = declaring_type_name(runtime, &location).unwrap_or_else(|error| {
        debug!("No declaring type for 0x{:X}: {}", function, error);
        String::new()
    });

    let context = generic_context(runtime, &location);
    info.method_signature = MethodSignature::decode(
        runtime,
        location.module_id,
        location.method_token,
        &context,
    )
    .map(|signature| signature.render(&info.type_name))
    .unwrap_or_else(|error| {
        debug!("No method signature for 0x{:X}: {}", function, error);
        String::new()
    });

    info
}

fn declaring_type_name(runtime: &dyn RuntimeMetadata, location: &FunctionLocation) -> Result<String> {
    let resolver = TypeNameResolver::new(runtime);
    if location.class_id != 0 {
        return resolver.class_name(location.class_id);
    }

    let method = runtime.method_props(location.module_id, location.method_token)?;
    resolver.type_def_name(location.module_id, method.class_token, None)
}

/// Resolve the concrete generic arguments of the declaring class and of the method.
///
/// A list with any unresolvable argument is dropped as a whole, so that positions stay
/// meaningful and the decoder falls back to `!n` / `!!n`.
pub(crate) fn generic_context(
    runtime: &dyn RuntimeMetadata,
    location: &FunctionLocation,
) -> GenericContext {
    let resolver = TypeNameResolver::new(runtime);
    let resolve = |classes: &[usize]| -> Vec<String> {
        classes
            .iter()
            .map(|class| resolver.class_name(*class))
            .collect::<Result<Vec<_>>>()
            .unwrap_or_default()
    };

    let type_args = if location.class_id == 0 {
        Vec::new()
    } else {
        runtime
            .class_info(location.class_id)
            .map(|class| resolve(&class.type_args))
            .unwrap_or_default()
    };

    GenericContext::new(type_args, resolve(&location.type_args))
}
