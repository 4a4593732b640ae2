use crate::{
    metadata::{
        provider::{ModuleId, RuntimeMetadata},
        signatures::{GenericContext, SignatureDecoder},
        token::Token,
        typesystem::CallingConvention,
    },
    Error, Result,
};

/// One decoded parameter of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamMeta {
    /// Element type tag used to read the argument value
    pub element_type: u8,
    /// Display name of the parameter type
    pub type_name: String,
    /// Declared parameter name, empty when the metadata has none
    pub name: String,
}

/// A method definition decoded into display form.
///
/// Transient: it is rebuilt whenever it is needed and never cached, the cached form is the
/// rendered string in [`crate::stack::FunctionInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Method name
    pub name: String,
    /// The method takes an implicit `this` argument
    pub has_this: bool,
    /// Display name of the return type
    pub return_type: String,
    /// Parameters in declaration order, excluding `this`
    pub parameters: Vec<ParamMeta>,
}

impl MethodSignature {
    /// Decode the `MethodDef` `method` of `module`.
    ///
    /// Calling convention and generic arity are read from the blob header, then the return
    /// type and each parameter type are decoded and paired with the declared parameter
    /// names by sequence number.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] if the method has no signature blob, or any error of
    /// [`SignatureDecoder::decode_type`] for malformed blobs.
    pub fn decode(
        runtime: &dyn RuntimeMetadata,
        module: ModuleId,
        method: Token,
        context: &GenericContext,
    ) -> Result<MethodSignature> {
        let props = runtime.method_props(module, method)?;
        if props.signature.is_empty() {
            return Err(Error::Empty);
        }

        let names = runtime.param_names(module, method).unwrap_or_default();

        let mut decoder = SignatureDecoder::new(runtime, module, context, &props.signature);
        let convention = CallingConvention::from_bits_truncate(decoder.parser().read_le::<u8>()?);
        if convention.contains(CallingConvention::GENERIC) {
            decoder.parser().read_compressed_uint()?;
        }

        let param_count = decoder.parser().read_compressed_uint()?;
        let return_type = decoder.decode_type()?;

        let mut parameters = Vec::new();
        for sequence in 1..=param_count {
            let (element_type, type_name) = decoder.decode_tagged()?;
            let name = names
                .iter()
                .find(|(seq, _)| *seq == sequence)
                .map(|(_, name)| name.clone())
                .unwrap_or_default();

            parameters.push(ParamMeta {
                element_type,
                type_name,
                name,
            });
        }

        Ok(MethodSignature {
            name: props.name,
            has_this: convention.contains(CallingConvention::HASTHIS),
            return_type,
            parameters,
        })
    }

    /// Render as `ReturnType DeclaringType.Name(Type name, ...)`; unnamed parameters show
    /// only their type.
    #[must_use]
    pub fn render(&self, declaring_type: &str) -> String {
        let params = self
            .parameters
            .iter()
            .map(|param| {
                if param.name.is_empty() {
                    param.type_name.clone()
                } else {
                    format!("{} {}", param.type_name, param.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{} {}.{}({})",
            self.return_type, declaring_type, self.name, params
        )
    }
}
