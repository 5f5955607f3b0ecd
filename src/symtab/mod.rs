//! Symbol table construction.
//!
//! One walk over the AST, before any IR exists, that fixes every class's
//! field layout and method table. Identifier uses are not resolved here; code
//! generation does that against the finished table.

pub mod descriptor;
mod register;
pub mod types;

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::diagnostics::CompileError;
use crate::parser::ast::Program;
pub use descriptor::{ClassDescriptor, MethodDescriptor, Storage, VarDescriptor, mangle_method};
pub use types::MjType;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTable {
    /// Entry class first, then the remaining classes in declaration order.
    classes: Vec<ClassDescriptor>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.index.get(name).map(|&i| &self.classes[i])
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.iter()
    }

    pub fn entry_class(&self) -> Option<&ClassDescriptor> {
        self.classes.first().filter(|c| c.is_entry)
    }

    pub fn to_json(&self) -> Result<String, CompileError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn insert(&mut self, class: ClassDescriptor) {
        self.index.insert(class.name.clone(), self.classes.len());
        self.classes.push(class);
    }

    fn class_mut(&mut self, name: &str) -> Result<&mut ClassDescriptor, CompileError> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.classes[i]),
            None => Err(CompileError::codegen(format!("class '{name}' was never registered"))),
        }
    }
}

/// Build the complete symbol table. Any unresolvable type aborts the build;
/// no partial table is ever returned.
pub fn build_symbol_table(program: &Program) -> Result<SymbolTable, CompileError> {
    let mut table = SymbolTable::default();

    register::register_class_names(program, &mut table)?;
    register::register_fields(program, &mut table)?;
    register::register_methods(program, &mut table)?;

    for class in &table.classes {
        debug!(class = %class.name, fields = class.fields.len(), methods = class.methods.len(), "registered class");
    }
    Ok(table)
}
