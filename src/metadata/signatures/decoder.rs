use log::debug;

use crate::{
    file::parser::Parser,
    metadata::{
        provider::{ModuleId, RuntimeMetadata},
        token::Token,
        typesystem::{
            array_suffix, primitive_name, CallingConvention, TypeNameResolver, ELEMENT_TYPE,
            MAX_RECURSION_DEPTH,
        },
    },
    Error::{self, RecursionLimit},
    Result,
};

/// Concrete generic arguments a signature is decoded against.
///
/// `VAR n` resolves to `type_args[n]` and `MVAR n` to `method_args[n]`. When no binding
/// exists (e.g. decoding an open generic definition) the placeholders `!n` / `!!n` are used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenericContext {
    /// Display names of the declaring type's generic arguments
    pub type_args: Vec<String>,
    /// Display names of the method's generic arguments
    pub method_args: Vec<String>,
}

impl GenericContext {
    /// Create a context from already resolved argument names
    #[must_use]
    pub fn new(type_args: Vec<String>, method_args: Vec<String>) -> Self {
        GenericContext {
            type_args,
            method_args,
        }
    }
}

/// Recursive-descent decoder turning a type signature into its display name.
///
/// The decoder walks a single forward-only [`Parser`]. Every nested type increases the
/// depth, and decoding fails with [`crate::Error::RecursionLimit`] once it reaches
/// [`MAX_RECURSION_DEPTH`], so malformed or hostile blobs always terminate. Truncated
/// blobs fail with [`crate::Error::OutOfBounds`]; unknown tags produce an empty segment.
///
/// ```rust,ignore
/// let context = GenericContext::default();
/// // SZARRAY R8
/// let mut decoder = SignatureDecoder::new(runtime, module, &context, &[0x1D, 0x0D]);
/// assert_eq!(decoder.decode_type()?, "double[]");
/// ```
pub struct SignatureDecoder<'a> {
    parser: Parser<'a>,
    resolver: TypeNameResolver<'a>,
    module: ModuleId,
    context: &'a GenericContext,
    depth: usize,
}

impl<'a> SignatureDecoder<'a> {
    /// Create a decoder over `data`, resolving tokens in `module`
    #[must_use]
    pub fn new(
        runtime: &'a dyn RuntimeMetadata,
        module: ModuleId,
        context: &'a GenericContext,
        data: &'a [u8],
    ) -> Self {
        SignatureDecoder {
            parser: Parser::new(data),
            resolver: TypeNameResolver::new(runtime),
            module,
            context,
            depth: 0,
        }
    }

    /// Start at an initial nesting depth, used when a type spec is decoded from inside
    /// another signature
    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Access to the underlying cursor, for reading signature headers
    pub fn parser(&mut self) -> &mut Parser<'a> {
        &mut self.parser
    }

    /// Decode the next type and return its display name
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated data, [`crate::Error::Malformed`]
    /// on invalid compressed values and [`crate::Error::RecursionLimit`] on excessive nesting.
    pub fn decode_type(&mut self) -> Result<String> {
        self.decode_tagged().map(|(_, name)| name)
    }

    /// Decode the next type, returning the element type tag a value of this type is read
    /// with together with its display name.
    ///
    /// Custom modifiers and `PINNED` are transparent, and a generic instantiation reports
    /// the tag of its generic type (`CLASS` or `VALUETYPE`).
    ///
    /// # Errors
    /// Same as [`SignatureDecoder::decode_type`].
    pub fn decode_tagged(&mut self) -> Result<(u8, String)> {
        self.depth += 1;
        let result = self.decode_tagged_inner();
        self.depth -= 1;
        result
    }

    fn decode_tagged_inner(&mut self) -> Result<(u8, String)> {
        if self.depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        let tag = self.parser.read_le::<u8>()?;
        if let Some(name) = primitive_name(tag) {
            return Ok((tag, name.to_string()));
        }

        let name = match tag {
            ELEMENT_TYPE::CLASS | ELEMENT_TYPE::VALUETYPE => {
                let token = self.parser.read_compressed_token()?;
                self.token_name(token, None)?
            }
            ELEMENT_TYPE::SZARRAY => format!("{}[]", self.decode_type()?),
            ELEMENT_TYPE::ARRAY => {
                let element = self.decode_type()?;
                let rank = self.parser.read_compressed_uint()?;

                let num_sizes = self.parser.read_compressed_uint()?;
                for _ in 0..num_sizes {
                    self.parser.read_compressed_uint()?;
                }

                let num_lo_bounds = self.parser.read_compressed_uint()?;
                for _ in 0..num_lo_bounds {
                    self.parser.read_compressed_int()?;
                }

                format!("{}{}", element, array_suffix(rank))
            }
            ELEMENT_TYPE::BYREF => format!("{}&", self.decode_type()?),
            ELEMENT_TYPE::PTR => format!("{}*", self.decode_type()?),
            ELEMENT_TYPE::GENERICINST => {
                let kind = self.parser.read_le::<u8>()?;
                let token = self.parser.read_compressed_token()?;
                let arg_count = self.parser.read_compressed_uint()?;

                let mut args = Vec::new();
                for _ in 0..arg_count {
                    args.push(self.decode_type()?);
                }

                return Ok((kind, self.token_name(token, Some(args.as_slice()))?));
            }
            ELEMENT_TYPE::VAR => {
                let index = self.parser.read_compressed_uint()? as usize;
                self.context
                    .type_args
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| format!("!{index}"))
            }
            ELEMENT_TYPE::MVAR => {
                let index = self.parser.read_compressed_uint()? as usize;
                self.context
                    .method_args
                    .get(index)
                    .cloned()
                    .unwrap_or_else(|| format!("!!{index}"))
            }
            ELEMENT_TYPE::TYPEDBYREF => "typedref".to_string(),
            ELEMENT_TYPE::FNPTR => {
                self.skip_method_signature()?;
                "fnptr".to_string()
            }
            ELEMENT_TYPE::PINNED | ELEMENT_TYPE::SENTINEL => return self.decode_tagged(),
            ELEMENT_TYPE::CMOD_REQD | ELEMENT_TYPE::CMOD_OPT => {
                self.parser.read_compressed_token()?;
                return self.decode_tagged();
            }
            _ => {
                debug!("Unsupported element type 0x{:02X} in signature", tag);
                String::new()
            }
        };

        Ok((tag, name))
    }

    /// Consume a nested method signature, as found after `FNPTR`
    fn skip_method_signature(&mut self) -> Result<()> {
        let convention = CallingConvention::from_bits_truncate(self.parser.read_le::<u8>()?);
        if convention.contains(CallingConvention::GENERIC) {
            self.parser.read_compressed_uint()?;
        }

        let param_count = self.parser.read_compressed_uint()?;
        self.decode_type()?;
        for _ in 0..param_count {
            self.decode_type()?;
        }

        Ok(())
    }

    /// Resolve a type token; a failed lookup degrades to an empty name for this segment only
    fn token_name(&self, token: Token, args: Option<&[String]>) -> Result<String> {
        match self
            .resolver
            .type_token_name(self.module, token, args, self.depth)
        {
            Ok(name) => Ok(name),
            Err(Error::Unavailable(reason)) => {
                debug!("Unresolved type token {}: {}", token, reason);
                Ok(String::new())
            }
            Err(error) => Err(error),
        }
    }
}
