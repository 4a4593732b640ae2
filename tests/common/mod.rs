//! A scripted host for the integration tests.
//!
//! [`TestHost`] implements [`RuntimeMetadata`] over maps filled by the tests. The current
//! managed thread is tracked per OS thread, so several test threads can drive one
//! [`dotstack::StackManager`] as distinct managed threads.

#![allow(dead_code)]

use std::{cell::Cell, collections::HashMap};

use dotstack::{
    metadata::token::{Token, TokenTable},
    prelude::*,
};

thread_local! {
    static CURRENT_THREAD: Cell<ThreadId> = const { Cell::new(0) };
}

/// Make the calling OS thread deliver events as managed thread `thread`
pub fn run_as(thread: ThreadId) {
    CURRENT_THREAD.with(|current| current.set(thread));
}

pub const MODULE: ModuleId = 1;
pub const ASSEMBLY: AssemblyId = 2;

#[derive(Default)]
pub struct TestHost {
    functions: HashMap<FunctionId, FunctionLocation>,
    ranges: HashMap<FunctionId, Vec<ArgumentRange>>,
    classes: HashMap<ClassId, ClassInfo>,
    arrays: HashMap<ClassId, ArrayClass>,
    objects: HashMap<ObjectId, ClassId>,
    array_objects: HashMap<ObjectId, ArrayObject>,
    type_defs: HashMap<Token, (TypeDefProps, Vec<String>)>,
    enclosing: HashMap<Token, Token>,
    methods: HashMap<Token, (MethodProps, Vec<(u32, String)>)>,
    next_row: u32,
}

impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn unavailable<T>(what: &str) -> dotstack::Result<T> {
        Err(Error::Unavailable(what.to_string()))
    }

    pub fn type_def(&mut self, name: &str, flags: u32, params: &[&str]) -> Token {
        self.next_row += 1;
        let token = Token::from_parts(TokenTable::TypeDef, self.next_row);
        self.type_defs.insert(
            token,
            (
                TypeDefProps {
                    name: name.to_string(),
                    flags,
                },
                params.iter().map(|p| (*p).to_string()).collect(),
            ),
        );
        token
    }

    pub fn nest(&mut self, inner: Token, outer: Token) {
        self.enclosing.insert(inner, outer);
    }

    /// Registers a method and a function id for it, declared on `owner` without a class id
    pub fn method(
        &mut self,
        function: FunctionId,
        owner: Token,
        name: &str,
        signature: &[u8],
        params: &[(u32, &str)],
    ) -> Token {
        self.next_row += 1;
        let token = Token::from_parts(TokenTable::MethodDef, self.next_row);
        self.methods.insert(
            token,
            (
                MethodProps {
                    name: name.to_string(),
                    class_token: owner,
                    signature: signature.to_vec(),
                },
                params
                    .iter()
                    .map(|(seq, name)| (*seq, (*name).to_string()))
                    .collect(),
            ),
        );
        self.functions.insert(
            function,
            FunctionLocation {
                class_id: 0,
                module_id: MODULE,
                method_token: token,
                type_args: vec![],
            },
        );
        token
    }

    /// A function with a trivial `void Type.Name()` signature
    pub fn simple_function(&mut self, function: FunctionId, owner: Token, name: &str) {
        self.method(function, owner, name, &[0x00, 0x00, 0x01], &[]);
    }

    pub fn ranges(&mut self, function: FunctionId, ranges: Vec<ArgumentRange>) {
        self.ranges.insert(function, ranges);
    }

    pub fn class(&mut self, class: ClassId, info: ClassInfo) {
        self.classes.insert(class, info);
    }

    pub fn add_array_class(&mut self, class: ClassId, array: ArrayClass) {
        self.classes.insert(class, ClassInfo::default());
        self.arrays.insert(class, array);
    }

    pub fn add_array_object(&mut self, object: ObjectId, class: ClassId, array: ArrayObject) {
        self.objects.insert(object, class);
        self.array_objects.insert(object, array);
    }
}

impl RuntimeMetadata for TestHost {
    fn current_thread_id(&self) -> dotstack::Result<ThreadId> {
        match CURRENT_THREAD.with(Cell::get) {
            0 => Self::unavailable("no managed thread"),
            thread => Ok(thread),
        }
    }

    fn frame_info(&self, _function: FunctionId, _call: CallInfo) -> dotstack::Result<FrameInfo> {
        Self::unavailable("frame info")
    }

    fn argument_ranges(
        &self,
        function: FunctionId,
        _call: CallInfo,
    ) -> dotstack::Result<Vec<ArgumentRange>> {
        self.ranges
            .get(&function)
            .cloned()
            .map_or_else(|| Self::unavailable("argument ranges"), Ok)
    }

    fn function_info(
        &self,
        function: FunctionId,
        _frame: Option<FrameInfo>,
    ) -> dotstack::Result<FunctionLocation> {
        self.functions
            .get(&function)
            .cloned()
            .map_or_else(|| Self::unavailable("function"), Ok)
    }

    fn module_info(&self, module: ModuleId) -> dotstack::Result<ModuleInfo> {
        if module == MODULE {
            Ok(ModuleInfo {
                name: "App.dll".to_string(),
                assembly_id: ASSEMBLY,
            })
        } else {
            Self::unavailable("module")
        }
    }

    fn assembly_name(&self, assembly: AssemblyId) -> dotstack::Result<String> {
        if assembly == ASSEMBLY {
            Ok("App".to_string())
        } else {
            Self::unavailable("assembly")
        }
    }

    fn class_info(&self, class: ClassId) -> dotstack::Result<ClassInfo> {
        self.classes
            .get(&class)
            .cloned()
            .map_or_else(|| Self::unavailable("class"), Ok)
    }

    fn class_from_object(&self, object: ObjectId) -> dotstack::Result<ClassId> {
        self.objects
            .get(&object)
            .copied()
            .map_or_else(|| Self::unavailable("object"), Ok)
    }

    fn array_class(&self, class: ClassId) -> dotstack::Result<Option<ArrayClass>> {
        Ok(self.arrays.get(&class).copied())
    }

    fn array_object(&self, object: ObjectId, _rank: u32) -> dotstack::Result<ArrayObject> {
        self.array_objects
            .get(&object)
            .cloned()
            .map_or_else(|| Self::unavailable("array"), Ok)
    }

    fn class_size(&self, _class: ClassId) -> dotstack::Result<usize> {
        Self::unavailable("class size")
    }

    fn string_layout(&self) -> dotstack::Result<StringLayout> {
        Ok(StringLayout {
            length_offset: 8,
            buffer_offset: 12,
        })
    }

    fn type_def_props(&self, _module: ModuleId, token: Token) -> dotstack::Result<TypeDefProps> {
        self.type_defs
            .get(&token)
            .map(|(props, _)| props.clone())
            .map_or_else(|| Self::unavailable("type def"), Ok)
    }

    fn enclosing_class(&self, _module: ModuleId, token: Token) -> dotstack::Result<Token> {
        self.enclosing
            .get(&token)
            .copied()
            .map_or_else(|| Self::unavailable("enclosing class"), Ok)
    }

    fn type_ref_name(&self, _module: ModuleId, _token: Token) -> dotstack::Result<String> {
        Self::unavailable("type ref")
    }

    fn type_spec_blob(&self, _module: ModuleId, _token: Token) -> dotstack::Result<Vec<u8>> {
        Self::unavailable("type spec")
    }

    fn generic_param_names(&self, _module: ModuleId, token: Token) -> dotstack::Result<Vec<String>> {
        self.type_defs
            .get(&token)
            .map(|(_, params)| params.clone())
            .map_or_else(|| Self::unavailable("type def"), Ok)
    }

    fn method_props(&self, _module: ModuleId, token: Token) -> dotstack::Result<MethodProps> {
        self.methods
            .get(&token)
            .map(|(props, _)| props.clone())
            .map_or_else(|| Self::unavailable("method"), Ok)
    }

    fn param_names(&self, _module: ModuleId, token: Token) -> dotstack::Result<Vec<(u32, String)>> {
        self.methods
            .get(&token)
            .map(|(_, names)| names.clone())
            .map_or_else(|| Self::unavailable("method"), Ok)
    }
}
