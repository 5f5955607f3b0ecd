pub mod lower;
pub mod runtime;

use tracing::{debug, info};

use crate::diagnostics::CompileError;
use crate::ir::{Instr, Module};
use crate::parser::ast::{ClassDecl, Program};
use crate::symtab::SymbolTable;
use runtime::RuntimeRegistry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Lower classes on scoped worker threads. Output is merged back in
    /// declaration order, so the module text is identical either way.
    pub parallel: bool,
}

/// Lower a program against its finished symbol table.
///
/// Module layout: the print format constant, every class's struct type,
/// `@main`, then each class's methods, and finally the runtime declarations.
/// Struct types come first because sizing an allocation needs a complete type.
pub fn codegen(program: &Program, table: &SymbolTable, options: &CodegenOptions) -> Result<Module, CompileError> {
    let runtime = RuntimeRegistry::new();
    let mut module = Module::new();

    module.push(runtime.format_constant());
    module.extend(table.classes().filter(|c| !c.is_entry).map(|c| Instr::TypeDecl {
        name: c.name.clone(),
        fields: c.fields.iter().map(|f| f.ty.ir_type()).collect(),
    }));
    module.extend(lower::lower_entry(&program.main_class.node, table, &runtime)?);

    let per_class = if options.parallel {
        lower_classes_parallel(&program.classes, table, &runtime)?
    } else {
        program
            .classes
            .iter()
            .map(|class| lower_class(&class.node, table, &runtime))
            .collect::<Result<Vec<_>, _>>()?
    };
    for items in per_class {
        module.extend(items);
    }

    module.extend(runtime.declarations());
    info!(classes = program.classes.len(), items = module.items().len(), parallel = options.parallel, "generated module");
    Ok(module)
}

fn lower_class(
    class: &ClassDecl,
    table: &SymbolTable,
    runtime: &RuntimeRegistry,
) -> Result<Vec<Instr>, CompileError> {
    let desc = table
        .class(&class.name.node)
        .ok_or_else(|| CompileError::codegen(format!("no descriptor for class '{}'", class.name.node)))?;

    let mut items = Vec::with_capacity(class.methods.len());
    for method in &class.methods {
        items.extend(lower::lower_method(desc, &method.node, table, runtime)?);
    }
    debug!(class = %desc.name, items = items.len(), "lowered class");
    Ok(items)
}

/// One scoped thread per class. Results are joined in spawn order; the first
/// error in declaration order wins, matching sequential lowering.
fn lower_classes_parallel(
    classes: &[crate::span::Spanned<ClassDecl>],
    table: &SymbolTable,
    runtime: &RuntimeRegistry,
) -> Result<Vec<Vec<Instr>>, CompileError> {
    std::thread::scope(|s| {
        let handles: Vec<_> = classes
            .iter()
            .map(|class| s.spawn(move || lower_class(&class.node, table, runtime)))
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(_) => Err(CompileError::codegen("class lowering worker panicked")),
            })
            .collect()
    })
}
