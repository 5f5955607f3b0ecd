#![allow(dead_code)]

use std::process::Command;

pub fn mjc() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mjc"))
}

/// Wrap a single statement in an entry class.
pub fn main_with(stmt: &str) -> String {
    format!("class Main {{ public static void main(String[] args) {{ {stmt} }} }}\n")
}

/// Entry class that prints `expr`, followed by the given class declarations.
pub fn program(expr: &str, classes: &str) -> String {
    format!("{}{classes}\n", main_with(&format!("System.out.println({expr});")))
}

pub fn compile_ir(source: &str) -> String {
    match mjc::compile_to_ir(source) {
        Ok(ir) => ir,
        Err(err) => panic!("compilation failed: {err}\n--- source ---\n{source}"),
    }
}

pub fn compile_err(source: &str) -> mjc::diagnostics::CompileError {
    match mjc::compile_to_ir(source) {
        Ok(ir) => panic!("compilation should have failed, got:\n{ir}"),
        Err(err) => err,
    }
}

/// Lines of the function defined as `@name`, from `define` to the closing brace.
pub fn function_body<'a>(ir: &'a str, name: &str) -> Vec<&'a str> {
    let header = format!(" @{name}(");
    let mut lines = ir.lines().skip_while(|l| !(l.starts_with("define") && l.contains(&header)));
    let mut body = Vec::new();
    for line in lines.by_ref() {
        body.push(line);
        if line == "}" {
            break;
        }
    }
    assert!(!body.is_empty(), "no function @{name} in:\n{ir}");
    body
}

/// Every label defined in `lines`, without the trailing colon.
pub fn labels<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    lines
        .iter()
        .filter(|l| !l.starts_with(' ') && l.ends_with(':'))
        .map(|l| l.trim_end_matches(':'))
        .collect()
}

/// Checks that every label in a function body is defined exactly once, every
/// branch target exists, and every basic block ends in a terminator.
pub fn assert_well_formed(body: &[&str]) {
    let defined = labels(body);
    let mut seen = std::collections::HashSet::new();
    for label in &defined {
        assert!(seen.insert(*label), "label {label} defined twice:\n{}", body.join("\n"));
    }
    for line in body {
        for part in line.split("label %").skip(1) {
            let target = part.split([',', ' ']).next().unwrap_or_default();
            assert!(defined.contains(&target), "branch to undefined label {target}:\n{}", body.join("\n"));
        }
    }
    // The line before each label (other than the first) and before `}` must terminate a block.
    for (i, line) in body.iter().enumerate().skip(2) {
        let starts_block = (!line.starts_with(' ') && line.ends_with(':')) || *line == "}";
        if starts_block {
            let prev = body[i - 1].trim_start();
            assert!(
                prev.starts_with("br ") || prev.starts_with("ret "),
                "block before `{line}` does not end in a terminator:\n{}",
                body.join("\n")
            );
        }
    }
}

/// Checks that every `%class.X` is declared before the first instruction or
/// signature that uses it, and that all struct types precede the entry routine.
pub fn assert_types_declared_before_use(ir: &str) {
    let lines: Vec<&str> = ir.lines().collect();
    let mut declared = std::collections::HashMap::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some(rest) = line.strip_prefix("%class.") {
            if let Some((name, _)) = rest.split_once(" = type ") {
                declared.insert(name.to_string(), i);
            }
        }
    }
    let main = lines
        .iter()
        .position(|l| l.starts_with("define i32 @main("))
        .unwrap_or_else(|| panic!("no entry routine in:\n{ir}"));
    for (name, decl) in &declared {
        assert!(*decl < main, "%class.{name} declared after @main:\n{ir}");
    }
    // Struct types may refer to each other in any order; only uses outside them count.
    for (i, line) in lines.iter().enumerate().filter(|(_, l)| !l.contains(" = type ")) {
        for part in line.split("%class.").skip(1) {
            let name: String = part.chars().take_while(|c| c.is_ascii_alphanumeric() || *c == '_').collect();
            let decl = declared
                .get(&name)
                .unwrap_or_else(|| panic!("%class.{name} is never declared:\n{ir}"));
            assert!(*decl <= i, "%class.{name} used on line {i} before its declaration:\n{ir}");
        }
    }
}

pub fn compile_should_fail_with(source: &str, expected_msg: &str) {
    let dir = tempfile::tempdir().unwrap();
    let src_path = dir.path().join("Test.java");
    let out_path = dir.path().join("Test.ll");

    std::fs::write(&src_path, source).unwrap();

    let output = mjc()
        .arg("compile")
        .arg(&src_path)
        .arg("-o")
        .arg(&out_path)
        .output()
        .unwrap();

    assert!(!output.status.success(), "Compilation should have failed");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains(expected_msg),
        "Expected error containing '{expected_msg}', got: {stderr}"
    );
    assert!(!out_path.exists(), "no module should be written on failure");
}
