mod common;
use common::{mjc, program};

const SOURCE: &str = "class Main { public static void main(String[] a) { System.out.println(new Counter().inc(41)); } }
class Counter { int total; public int inc(int by) { total = total + by + 1; return total; } }
";

fn write_source(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn compile_writes_ll_next_to_input_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(&dir, "Counter.java", SOURCE);

    let output = mjc().arg("compile").arg(&src).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let ll = std::fs::read_to_string(dir.path().join("Counter.ll")).unwrap();
    assert_eq!(ll, mjc::compile_to_ir(SOURCE).unwrap());
}

#[test]
fn compile_honors_output_flag() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(&dir, "Counter.java", SOURCE);
    let out = dir.path().join("custom.ll");

    let status = mjc().arg("compile").arg(&src).arg("-o").arg(&out).status().unwrap();
    assert!(status.success());
    assert!(out.exists());
    assert!(!dir.path().join("Counter.ll").exists());
}

#[test]
fn emit_ir_prints_module() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(&dir, "Counter.java", SOURCE);

    let output = mjc().arg("emit-ir").arg(&src).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("define i32 @Counter.inc(%class.Counter* %this, i32 %arg.by) {"));
    assert!(stdout.ends_with("declare i8* @malloc(i32)\n"));
}

#[test]
fn parallel_flag_produces_identical_output() {
    let dir = tempfile::tempdir().unwrap();
    let text = program(
        "new A().a() + new B().b()",
        "class A { int x; public int a() { x = 1; return x; } }
         class B { boolean y; public int b() { int r; if (y) r = 1; else r = 2; return r; } }
         class C { public int c(int n) { while (n < 10) n = n + 1; return n; } }",
    );
    let src = write_source(&dir, "Many.java", &text);

    let seq = mjc().arg("emit-ir").arg(&src).output().unwrap();
    let par = mjc().arg("--parallel").arg("emit-ir").arg(&src).output().unwrap();
    assert!(seq.status.success() && par.status.success());
    assert_eq!(seq.stdout, par.stdout);
}

#[test]
fn symbols_dumps_layout_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(&dir, "Counter.java", SOURCE);

    let output = mjc().arg("symbols").arg(&src).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["classes"][0]["name"], "Main");
    assert_eq!(json["classes"][0]["is_entry"], true);
    let counter = &json["classes"][1];
    assert_eq!(counter["fields"][0]["name"], "total");
    let inc = &counter["methods"]["inc"];
    assert_eq!(inc["mangled_name"], "Counter.inc");
    assert_eq!(inc["formals"][0]["name"], "this");
    assert_eq!(inc["formals"][1]["name"], "by");
}

#[test]
fn ast_json_round_trips_through_cli() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(&dir, "Counter.java", SOURCE);

    let ast = mjc().arg("ast").arg(&src).output().unwrap();
    assert!(ast.status.success());
    let ast_path = dir.path().join("Counter.json");
    std::fs::write(&ast_path, &ast.stdout).unwrap();

    let from_json = mjc().arg("--ast-json").arg("emit-ir").arg(&ast_path).output().unwrap();
    assert!(from_json.status.success(), "{}", String::from_utf8_lossy(&from_json.stderr));
    assert_eq!(String::from_utf8(from_json.stdout).unwrap(), mjc::compile_to_ir(SOURCE).unwrap());
}

#[test]
fn invalid_ast_json_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_source(&dir, "bad.json", "{\"classes\": []}");

    let output = mjc().arg("--ast-json").arg("emit-ir").arg(&path).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid AST JSON"));
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = mjc().arg("emit-ir").arg(dir.path().join("absent.java")).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("I/O error"));
}

#[test]
fn verbose_logging_goes_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let src = write_source(&dir, "Counter.java", SOURCE);

    let output = mjc().arg("-vv").arg("emit-ir").arg(&src).output().unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("registered method"), "{stderr}");
    assert!(stderr.contains("generated module"), "{stderr}");
    assert!(!String::from_utf8_lossy(&output.stdout).contains("registered"));
}
