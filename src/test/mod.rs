//! In-memory host used by the unit tests.
//!
//! [`MockRuntime`] answers every [`RuntimeMetadata`] query from plain maps that tests fill
//! through builder methods. Anything not registered is reported as
//! [`crate::Error::Unavailable`], the same way a real host reports a failing query.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{
    metadata::{
        provider::{
            ArgumentRange, ArrayClass, ArrayObject, AssemblyId, CallInfo, ClassId, ClassInfo,
            FrameInfo, FunctionId, FunctionLocation, MethodProps, ModuleId, ModuleInfo, ObjectId,
            RuntimeMetadata, StringLayout, ThreadId, TypeDefProps,
        },
        token::{Token, TokenTable},
    },
    Result,
};

type Key = (ModuleId, Token);

#[derive(Default)]
pub struct MockRuntime {
    current_thread: Option<ThreadId>,
    functions: HashMap<FunctionId, FunctionLocation>,
    framed: HashMap<FunctionId, (FrameInfo, FunctionLocation)>,
    argument_ranges: HashMap<FunctionId, Vec<ArgumentRange>>,
    modules: HashMap<ModuleId, ModuleInfo>,
    assemblies: HashMap<AssemblyId, String>,
    classes: HashMap<ClassId, ClassInfo>,
    array_classes: HashMap<ClassId, ArrayClass>,
    objects: HashMap<ObjectId, ClassId>,
    array_objects: HashMap<ObjectId, ArrayObject>,
    class_sizes: HashMap<ClassId, usize>,
    string_layout: Option<StringLayout>,
    type_defs: HashMap<Key, TypeDefProps>,
    generic_params: HashMap<Key, Vec<String>>,
    enclosing: HashMap<Key, Token>,
    type_refs: HashMap<Key, String>,
    type_specs: HashMap<Key, Vec<u8>>,
    methods: HashMap<Key, MethodProps>,
    params: HashMap<Key, Vec<(u32, String)>>,
    rows: HashMap<u8, u32>,
    function_info_calls: AtomicUsize,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_token(&mut self, table: TokenTable) -> Token {
        let row = self.rows.entry(table as u8).or_insert(0);
        *row += 1;
        Token::from_parts(table, *row)
    }

    pub fn set_current_thread(&mut self, thread: ThreadId) {
        self.current_thread = Some(thread);
    }

    pub fn add_function(&mut self, function: FunctionId, location: FunctionLocation) {
        self.functions.insert(function, location);
    }

    /// `function_info` with `frame` as context answers `location` instead
    pub fn set_frame_info(
        &mut self,
        function: FunctionId,
        frame: FrameInfo,
        location: FunctionLocation,
    ) {
        self.framed.insert(function, (frame, location));
    }

    pub fn set_argument_ranges(&mut self, function: FunctionId, ranges: Vec<ArgumentRange>) {
        self.argument_ranges.insert(function, ranges);
    }

    pub fn add_module(&mut self, module: ModuleId, info: ModuleInfo) {
        self.modules.insert(module, info);
    }

    pub fn add_assembly(&mut self, assembly: AssemblyId, name: &str) {
        self.assemblies.insert(assembly, name.to_string());
    }

    pub fn add_class(&mut self, class: ClassId, info: ClassInfo) {
        self.classes.insert(class, info);
    }

    pub fn add_array_class(&mut self, class: ClassId, array: ArrayClass) {
        self.array_classes.insert(class, array);
    }

    pub fn add_object(&mut self, object: ObjectId, class: ClassId) {
        self.objects.insert(object, class);
    }

    pub fn add_array_object(&mut self, object: ObjectId, array: ArrayObject) {
        self.array_objects.insert(object, array);
    }

    pub fn set_class_size(&mut self, class: ClassId, size: usize) {
        self.class_sizes.insert(class, size);
    }

    pub fn set_string_layout(&mut self, layout: StringLayout) {
        self.string_layout = Some(layout);
    }

    pub fn add_type_def(
        &mut self,
        module: ModuleId,
        name: &str,
        flags: u32,
        generic_params: &[&str],
    ) -> Token {
        let token = self.next_token(TokenTable::TypeDef);
        self.type_defs.insert(
            (module, token),
            TypeDefProps {
                name: name.to_string(),
                flags,
            },
        );
        self.generic_params.insert(
            (module, token),
            generic_params.iter().map(|p| (*p).to_string()).collect(),
        );
        token
    }

    pub fn set_enclosing(&mut self, module: ModuleId, inner: Token, outer: Token) {
        self.enclosing.insert((module, inner), outer);
    }

    pub fn add_type_ref(&mut self, module: ModuleId, name: &str) -> Token {
        let token = self.next_token(TokenTable::TypeRef);
        self.type_refs.insert((module, token), name.to_string());
        token
    }

    pub fn add_type_spec(&mut self, module: ModuleId, blob: &[u8]) -> Token {
        let token = self.next_token(TokenTable::TypeSpec);
        self.type_specs.insert((module, token), blob.to_vec());
        token
    }

    pub fn add_method(
        &mut self,
        module: ModuleId,
        owner: Token,
        name: &str,
        signature: &[u8],
        params: &[(u32, &str)],
    ) -> Token {
        let token = self.next_token(TokenTable::MethodDef);
        self.methods.insert(
            (module, token),
            MethodProps {
                name: name.to_string(),
                class_token: owner,
                signature: signature.to_vec(),
            },
        );
        self.params.insert(
            (module, token),
            params
                .iter()
                .map(|(seq, name)| (*seq, (*name).to_string()))
                .collect(),
        );
        token
    }

    /// Number of `function_info` queries answered so far
    pub fn function_info_calls(&self) -> usize {
        self.function_info_calls.load(Ordering::SeqCst)
    }
}

fn lookup<K, V>(map: &HashMap<K, V>, key: &K, what: &str) -> Result<V>
where
    K: std::hash::Hash + Eq + std::fmt::Debug,
    V: Clone,
{
    map.get(key)
        .cloned()
        .ok_or_else(|| unavailable_error!("Unknown {} {:?}", what, key))
}

impl RuntimeMetadata for MockRuntime {
    fn current_thread_id(&self) -> Result<ThreadId> {
        self.current_thread
            .ok_or_else(|| unavailable_error!("No managed thread"))
    }

    fn frame_info(&self, function: FunctionId, _call: CallInfo) -> Result<FrameInfo> {
        self.framed
            .get(&function)
            .map(|(frame, _)| *frame)
            .ok_or_else(|| unavailable_error!("No frame for function {}", function))
    }

    fn argument_ranges(&self, function: FunctionId, _call: CallInfo) -> Result<Vec<ArgumentRange>> {
        lookup(&self.argument_ranges, &function, "argument ranges of function")
    }

    fn function_info(
        &self,
        function: FunctionId,
        frame: Option<FrameInfo>,
    ) -> Result<FunctionLocation> {
        self.function_info_calls.fetch_add(1, Ordering::SeqCst);
        if let (Some(frame), Some((known, location))) = (frame, self.framed.get(&function)) {
            if frame == *known {
                return Ok(location.clone());
            }
        }
        lookup(&self.functions, &function, "function")
    }

    fn module_info(&self, module: ModuleId) -> Result<ModuleInfo> {
        lookup(&self.modules, &module, "module")
    }

    fn assembly_name(&self, assembly: AssemblyId) -> Result<String> {
        lookup(&self.assemblies, &assembly, "assembly")
    }

    fn class_info(&self, class: ClassId) -> Result<ClassInfo> {
        lookup(&self.classes, &class, "class")
    }

    fn class_from_object(&self, object: ObjectId) -> Result<ClassId> {
        lookup(&self.objects, &object, "object")
    }

    fn array_class(&self, class: ClassId) -> Result<Option<ArrayClass>> {
        if let Some(array) = self.array_classes.get(&class) {
            return Ok(Some(*array));
        }
        self.class_info(class).map(|_| None)
    }

    fn array_object(&self, object: ObjectId, rank: u32) -> Result<ArrayObject> {
        let array = lookup(&self.array_objects, &object, "array object")?;
        if array.dimension_sizes.len() != rank as usize {
            return Err(unavailable_error!("Array {} is not of rank {}", object, rank));
        }
        Ok(array)
    }

    fn class_size(&self, class: ClassId) -> Result<usize> {
        lookup(&self.class_sizes, &class, "class size")
    }

    fn string_layout(&self) -> Result<StringLayout> {
        self.string_layout
            .ok_or_else(|| unavailable_error!("No string layout"))
    }

    fn type_def_props(&self, module: ModuleId, token: Token) -> Result<TypeDefProps> {
        lookup(&self.type_defs, &(module, token), "type definition")
    }

    fn enclosing_class(&self, module: ModuleId, token: Token) -> Result<Token> {
        lookup(&self.enclosing, &(module, token), "enclosing class")
    }

    fn type_ref_name(&self, module: ModuleId, token: Token) -> Result<String> {
        lookup(&self.type_refs, &(module, token), "type reference")
    }

    fn type_spec_blob(&self, module: ModuleId, token: Token) -> Result<Vec<u8>> {
        lookup(&self.type_specs, &(module, token), "type specification")
    }

    fn generic_param_names(&self, module: ModuleId, token: Token) -> Result<Vec<String>> {
        lookup(&self.generic_params, &(module, token), "type definition")
    }

    fn method_props(&self, module: ModuleId, token: Token) -> Result<MethodProps> {
        lookup(&self.methods, &(module, token), "method")
    }

    fn param_names(&self, module: ModuleId, token: Token) -> Result<Vec<(u32, String)>> {
        lookup(&self.params, &(module, token), "method")
    }
}
