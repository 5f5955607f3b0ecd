use std::collections::HashSet;

use tracing::debug;

use crate::diagnostics::CompileError;
use crate::lexer::is_identifier;
use crate::parser::ast::*;
use crate::span::Spanned;
use super::descriptor::{ClassDescriptor, MethodDescriptor, RECEIVER, VarDescriptor};
use super::types::MjType;
use super::SymbolTable;

pub(crate) fn resolve_type(ty: &Spanned<TypeExpr>, table: &SymbolTable) -> Result<MjType, CompileError> {
    match &ty.node {
        TypeExpr::Int => Ok(MjType::Int),
        TypeExpr::Boolean => Ok(MjType::Boolean),
        TypeExpr::IntArray => Ok(MjType::IntArray),
        TypeExpr::Named(name) => match table.class(name) {
            Some(class) if !class.is_entry => Ok(MjType::Object(name.clone())),
            Some(_) => Err(CompileError::type_err(
                format!("entry class '{name}' cannot be used as a type"),
                ty.span,
            )),
            None => Err(CompileError::type_err(format!("unknown type '{name}'"), ty.span)),
        },
    }
}

/// Names are spliced into dotted symbols, so they must be plain identifiers.
/// Source text always satisfies this; a JSON AST might not.
fn check_name(name: &Spanned<String>, kind: &str) -> Result<(), CompileError> {
    if is_identifier(&name.node) {
        Ok(())
    } else {
        Err(CompileError::type_err(format!("invalid {kind} name '{}'", name.node), name.span))
    }
}

/// Pass 0: register every class name, entry class first.
/// Layouts are not computed yet so that declarations may reference classes
/// that appear later in the file.
pub(crate) fn register_class_names(program: &Program, table: &mut SymbolTable) -> Result<(), CompileError> {
    let main = &program.main_class.node;
    check_name(&main.name, "class")?;
    table.insert(ClassDescriptor::new(main.name.node.clone(), true));

    for class in &program.classes {
        let c = &class.node;
        check_name(&c.name, "class")?;
        if let Some(parent) = &c.superclass {
            return Err(CompileError::unsupported(
                format!("inheritance ('{}' extends '{}')", c.name.node, parent.node),
                parent.span,
            ));
        }
        if table.class(&c.name.node).is_some() {
            return Err(CompileError::type_err(
                format!("class '{}' is already defined", c.name.node),
                c.name.span,
            ));
        }
        table.insert(ClassDescriptor::new(c.name.node.clone(), false));
    }
    Ok(())
}

/// Pass 1: resolve field types in declaration order, fixing each field's offset.
pub(crate) fn register_fields(program: &Program, table: &mut SymbolTable) -> Result<(), CompileError> {
    for class in &program.classes {
        let c = &class.node;
        let mut fields = Vec::with_capacity(c.fields.len());
        let mut seen = HashSet::new();
        for field in &c.fields {
            check_name(&field.name, "field")?;
            if !seen.insert(field.name.node.as_str()) {
                return Err(CompileError::type_err(
                    format!("field '{}' is already defined in class '{}'", field.name.node, c.name.node),
                    field.name.span,
                ));
            }
            fields.push(VarDescriptor::new(field.name.node.clone(), resolve_type(&field.ty, table)?));
        }
        table.class_mut(&c.name.node)?.fields = fields;
    }
    Ok(())
}

/// Pass 2: build a descriptor for every method and attach it to its class.
pub(crate) fn register_methods(program: &Program, table: &mut SymbolTable) -> Result<(), CompileError> {
    for class in &program.classes {
        let c = &class.node;
        for method in &c.methods {
            let desc = build_method(&c.name.node, &method.node, table)?;
            let class_desc = table.class_mut(&c.name.node)?;
            if class_desc.methods.contains_key(&desc.name) {
                return Err(CompileError::type_err(
                    format!("method '{}' is already defined in class '{}'", desc.name, c.name.node),
                    method.node.name.span,
                ));
            }
            debug!(method = %desc.mangled_name, params = desc.params().len(), locals = desc.locals.len(), "registered method");
            class_desc.methods.insert(desc.name.clone(), desc);
        }
    }
    Ok(())
}

fn build_method(class_name: &str, m: &MethodDecl, table: &SymbolTable) -> Result<MethodDescriptor, CompileError> {
    check_name(&m.name, "method")?;
    let return_type = resolve_type(&m.return_type, table)?;
    let mut desc = MethodDescriptor::new(class_name, &m.name.node, return_type);
    let mut seen: HashSet<&str> = HashSet::from([RECEIVER]);

    for param in &m.params {
        check_name(&param.name, "parameter")?;
        if !seen.insert(param.name.node.as_str()) {
            return Err(CompileError::type_err(
                format!("parameter '{}' is already defined in method '{}'", param.name.node, m.name.node),
                param.name.span,
            ));
        }
        desc.formals.push(VarDescriptor::new(param.name.node.clone(), resolve_type(&param.ty, table)?));
    }

    for local in &m.locals {
        check_name(&local.name, "variable")?;
        if !seen.insert(local.name.node.as_str()) {
            return Err(CompileError::type_err(
                format!("variable '{}' is already defined in method '{}'", local.name.node, m.name.node),
                local.name.span,
            ));
        }
        desc.locals.push(VarDescriptor::new(local.name.node.clone(), resolve_type(&local.ty, table)?));
    }

    Ok(desc)
}
