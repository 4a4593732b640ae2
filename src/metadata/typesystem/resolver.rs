use crate::{
    metadata::{
        provider::{ClassId, ModuleId, RuntimeMetadata},
        signatures::{GenericContext, SignatureDecoder},
        token::{Token, TokenTable},
        typesystem::{primitive_name, TypeAttributes, MAX_RECURSION_DEPTH},
    },
    Error::RecursionLimit,
    Result,
};

/// Turns class handles and type tokens into source-level display names.
///
/// Nested types are rendered as `Outer+Inner`, generic types as `Name<A, B>` with the raw
/// arity marker (`` `2 ``) removed. Generic arguments are themselves fully resolved.
///
/// ```rust,ignore
/// let resolver = TypeNameResolver::new(runtime);
/// assert_eq!(resolver.class_name(dictionary_of_string_int)?, "Dictionary<string, int>");
/// ```
#[derive(Clone, Copy)]
pub struct TypeNameResolver<'a> {
    runtime: &'a dyn RuntimeMetadata,
}

impl<'a> TypeNameResolver<'a> {
    /// Create a resolver that queries `runtime`
    #[must_use]
    pub fn new(runtime: &'a dyn RuntimeMetadata) -> Self {
        TypeNameResolver { runtime }
    }

    /// Display name of a loaded class, including its concrete generic arguments
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] if any runtime query along the way fails.
    pub fn class_name(&self, class: ClassId) -> Result<String> {
        self.class_name_at(class, 0)
    }

    pub(crate) fn class_name_at(&self, class: ClassId, depth: usize) -> Result<String> {
        if depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        if class == 0 {
            return Err(unavailable_error!("Class id is null"));
        }

        let info = self.runtime.class_info(class)?;
        if info.type_token.is_null() {
            return self.array_class_name(class, depth);
        }

        let args = info
            .type_args
            .iter()
            .map(|arg| self.class_name_at(*arg, depth + 1))
            .collect::<Result<Vec<String>>>()?;

        let args = if args.is_empty() {
            None
        } else {
            Some(args.as_slice())
        };
        self.type_def_name_at(info.module_id, info.type_token, args, depth + 1)
    }

    fn array_class_name(&self, class: ClassId, depth: usize) -> Result<String> {
        let Some(array) = self.runtime.array_class(class)? else {
            return Err(unavailable_error!("Class 0x{:X} has no type definition", class));
        };

        let element = if array.element_class != 0 {
            self.class_name_at(array.element_class, depth + 1)?
        } else {
            primitive_name(array.element_type)
                .map(str::to_string)
                .ok_or_else(|| {
                    unavailable_error!("Array element type 0x{:X} has no name", array.element_type)
                })?
        };

        Ok(format!("{}{}", element, array_suffix(array.rank)))
    }

    /// Display name of a `TypeDef`.
    ///
    /// `args` are the generic arguments to print. When `None`, the declared generic parameter
    /// names are used, so an open definition renders as `List<T>`. For nested types the
    /// leading arguments belong to the enclosing types.
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] if the type or an enclosing type is unknown.
    pub fn type_def_name(
        &self,
        module: ModuleId,
        token: Token,
        args: Option<&[String]>,
    ) -> Result<String> {
        self.type_def_name_at(module, token, args, 0)
    }

    fn type_def_name_at(
        &self,
        module: ModuleId,
        token: Token,
        args: Option<&[String]>,
        depth: usize,
    ) -> Result<String> {
        if depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        let props = self.runtime.type_def_props(module, token)?;
        let simple = strip_arity(&props.name);

        let declared;
        let args = match args {
            Some(args) => args,
            None => {
                declared = self
                    .runtime
                    .generic_param_names(module, token)
                    .unwrap_or_default();
                declared.as_slice()
            }
        };

        if !TypeAttributes::from_bits_retain(props.flags).is_nested() {
            return Ok(format!("{}{}", simple, generic_suffix(args)));
        }

        let enclosing = self.runtime.enclosing_class(module, token)?;
        let inherited = self
            .runtime
            .generic_param_names(module, enclosing)
            .map_or(0, |names| names.len())
            .min(args.len());

        let outer = self.type_def_name_at(module, enclosing, Some(&args[..inherited]), depth + 1)?;
        Ok(format!(
            "{}+{}{}",
            outer,
            simple,
            generic_suffix(&args[inherited..])
        ))
    }

    /// Display name of any type token found in a signature: `TypeDef`, `TypeRef` or `TypeSpec`.
    ///
    /// Tokens of other tables yield an empty name.
    ///
    /// # Errors
    /// Returns [`crate::Error::Unavailable`] if the token cannot be resolved, or
    /// [`crate::Error::RecursionLimit`] if type specs nest too deeply.
    pub fn type_token_name(
        &self,
        module: ModuleId,
        token: Token,
        args: Option<&[String]>,
        depth: usize,
    ) -> Result<String> {
        if depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        match token.kind() {
            Some(TokenTable::TypeDef) => self.type_def_name_at(module, token, args, depth + 1),
            Some(TokenTable::TypeRef) => {
                let name = self.runtime.type_ref_name(module, token)?;
                Ok(format!(
                    "{}{}",
                    strip_arity(&name),
                    generic_suffix(args.unwrap_or_default())
                ))
            }
            Some(TokenTable::TypeSpec) => {
                let blob = self.runtime.type_spec_blob(module, token)?;
                let context = GenericContext::default();
                SignatureDecoder::new(self.runtime, module, &context, &blob)
                    .with_depth(depth + 1)
                    .decode_type()
            }
            _ => Ok(String::new()),
        }
    }
}

/// Removes the generic arity marker (`` `N `` and everything after it) from a type name
#[must_use]
pub fn strip_arity(name: &str) -> &str {
    match name.find('`') {
        Some(index) => &name[..index],
        None => name,
    }
}

fn generic_suffix(args: &[String]) -> String {
    if args.is_empty() {
        String::new()
    } else {
        format!("<{}>", args.join(", "))
    }
}

/// `[]` for vectors and rank-1 arrays, `[,]` for rank 2 and so on
pub(crate) fn array_suffix(rank: u32) -> String {
    let commas = rank.saturating_sub(1) as usize;
    format!("[{}]", ",".repeat(commas))
}
