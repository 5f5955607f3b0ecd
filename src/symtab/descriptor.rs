use std::collections::BTreeMap;

use serde::Serialize;

use super::types::MjType;

pub const RECEIVER: &str = "this";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarDescriptor {
    pub name: String,
    pub ty: MjType,
}

impl VarDescriptor {
    pub fn new(name: impl Into<String>, ty: MjType) -> Self {
        Self { name: name.into(), ty }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDescriptor {
    pub name: String,
    /// True for the class holding `main`; it has no layout and cannot be instantiated.
    pub is_entry: bool,
    /// Declaration order is the struct layout: a field's offset is its index.
    pub fields: Vec<VarDescriptor>,
    pub methods: BTreeMap<String, MethodDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub class_name: String,
    pub return_type: MjType,
    /// Receiver first, then declared parameters in order.
    pub formals: Vec<VarDescriptor>,
    pub locals: Vec<VarDescriptor>,
    pub mangled_name: String,
}

/// Where an identifier lives inside a method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage<'a> {
    Formal(&'a VarDescriptor),
    Local(&'a VarDescriptor),
    Field { index: usize, var: &'a VarDescriptor },
}

impl<'a> Storage<'a> {
    pub fn var(&self) -> &'a VarDescriptor {
        match self {
            Storage::Formal(var) | Storage::Local(var) | Storage::Field { var, .. } => *var,
        }
    }
}

pub fn mangle_method(class_name: &str, method_name: &str) -> String {
    format!("{class_name}.{method_name}")
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>, is_entry: bool) -> Self {
        Self { name: name.into(), is_entry, fields: Vec::new(), methods: BTreeMap::new() }
    }

    pub fn field(&self, name: &str) -> Option<(usize, &VarDescriptor)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    /// Three-tier lookup inside `method`: formal, then local, then field. First match wins.
    pub fn resolve<'a>(&'a self, method: &'a MethodDescriptor, name: &str) -> Option<Storage<'a>> {
        if let Some(var) = method.formal(name) {
            return Some(Storage::Formal(var));
        }
        if let Some(var) = method.local(name) {
            return Some(Storage::Local(var));
        }
        self.field(name).map(|(index, var)| Storage::Field { index, var })
    }
}

impl MethodDescriptor {
    pub fn new(class_name: &str, name: &str, return_type: MjType) -> Self {
        Self {
            name: name.to_string(),
            class_name: class_name.to_string(),
            return_type,
            formals: vec![VarDescriptor::new(RECEIVER, MjType::Object(class_name.to_string()))],
            locals: Vec::new(),
            mangled_name: mangle_method(class_name, name),
        }
    }

    /// Declared parameters, without the receiver.
    pub fn params(&self) -> &[VarDescriptor] {
        &self.formals[1..]
    }

    fn formal(&self, name: &str) -> Option<&VarDescriptor> {
        self.params().iter().find(|v| v.name == name)
    }

    fn local(&self, name: &str) -> Option<&VarDescriptor> {
        self.locals.iter().find(|v| v.name == name)
    }

    /// Stack slot name for a formal or local. Fields have no slot.
    pub fn slot_name(&self, storage: &Storage<'_>) -> Option<String> {
        let (var, suffix) = match storage {
            Storage::Formal(var) => (var, "pmtr"),
            Storage::Local(var) => (var, "local"),
            Storage::Field { .. } => return None,
        };
        Some(format!("{}.{}.{}.{suffix}", self.class_name, self.name, var.name))
    }

    /// Name of the incoming parameter register for a declared parameter.
    pub fn param_register(var: &VarDescriptor) -> String {
        format!("arg.{}", var.name)
    }
}
