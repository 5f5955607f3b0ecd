pub mod span;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod symtab;
pub mod ir;
pub mod codegen;

use diagnostics::CompileError;
use std::path::Path;

pub use codegen::CodegenOptions;

/// Lex and parse MiniJava source into an AST.
pub fn parse_source(source: &str) -> Result<parser::ast::Program, CompileError> {
    let tokens = lexer::lex(source)?;
    let mut parser = parser::Parser::new(&tokens, source);
    parser.parse_program()
}

/// Read an AST produced by an external front end (the serde JSON form of
/// [`parser::ast::Program`]).
pub fn parse_ast_json(json: &str) -> Result<parser::ast::Program, CompileError> {
    Ok(serde_json::from_str(json)?)
}

/// Lower an already-built AST (symbol table → codegen) to module text.
pub fn compile_program(
    program: &parser::ast::Program,
    options: &CodegenOptions,
) -> Result<String, CompileError> {
    let table = symtab::build_symbol_table(program)?;
    let module = codegen::codegen(program, &table, options)?;
    Ok(module.to_string())
}

/// Compile a source string to IR text (lex → parse → symbol table → codegen).
/// No file I/O.
pub fn compile_to_ir(source: &str) -> Result<String, CompileError> {
    compile_to_ir_with_options(source, &CodegenOptions::default())
}

pub fn compile_to_ir_with_options(source: &str, options: &CodegenOptions) -> Result<String, CompileError> {
    let program = parse_source(source)?;
    compile_program(&program, options)
}

/// Compile a `.java` source file and write the module to `output_path`.
pub fn compile_file(input: &Path, output_path: &Path, options: &CodegenOptions) -> Result<(), CompileError> {
    let source = std::fs::read_to_string(input).map_err(|e| CompileError::io(input, e))?;
    let ir = compile_to_ir_with_options(&source, options)?;
    std::fs::write(output_path, ir).map_err(|e| CompileError::io(output_path, e))
}
