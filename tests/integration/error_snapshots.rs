//! Snapshot tests for error message formatting.
//!
//! Uses insta inline snapshots to catch wording regressions.
//! Run `cargo insta review` to review changes.

use insta::assert_snapshot;

fn error_for(source: &str) -> String {
    mjc::compile_to_ir(source).unwrap_err().to_string()
}

fn in_class(body: &str) -> String {
    format!(
        "class Main {{ public static void main(String[] a) {{ System.out.println(new A().f()); }} }}\nclass A {{ {body} }}\n"
    )
}

#[test]
fn missing_semicolon_error() {
    let source = "class Main { public static void main(String[] a) { System.out.println(1) } }";
    assert_snapshot!(error_for(source), @"Syntax error: expected ;, found }");
}

#[test]
fn unexpected_character_error() {
    let source = "class Main { public static void main(String[] a) { System.out.println(1 % 2); } }";
    assert_snapshot!(error_for(source), @"Syntax error: unexpected character '%'");
}

#[test]
fn undefined_variable_error() {
    assert_snapshot!(
        error_for(&in_class("public int f() { return nope; }")),
        @"Resolve error: cannot find variable 'nope' in method 'A.f'"
    );
}

#[test]
fn unknown_type_error() {
    assert_snapshot!(
        error_for(&in_class("Widget w; public int f() { return 0; }")),
        @"Type error: unknown type 'Widget'"
    );
}

#[test]
fn duplicate_field_error() {
    assert_snapshot!(
        error_for(&in_class("int w; boolean w; public int f() { return 0; }")),
        @"Type error: field 'w' is already defined in class 'A'"
    );
}

#[test]
fn duplicate_method_error() {
    assert_snapshot!(
        error_for(&in_class("public int f() { return 0; } public int f() { return 1; }")),
        @"Type error: method 'f' is already defined in class 'A'"
    );
}

#[test]
fn array_lookup_unsupported_error() {
    assert_snapshot!(
        error_for(&in_class("int[] xs; public int f() { return xs[1]; }")),
        @"Unsupported: array lookup is not yet supported"
    );
}

#[test]
fn inheritance_unsupported_error() {
    let source = "class Main { public static void main(String[] a) { {} } }\nclass A { }\nclass B extends A { }\n";
    assert_snapshot!(
        error_for(source),
        @"Unsupported: inheritance ('B' extends 'A') is not yet supported"
    );
}

#[test]
fn return_type_mismatch_error() {
    assert_snapshot!(
        error_for(&in_class("public int f() { return true; }")),
        @"Codegen error: return value of 'A.f': expected i32, found i1"
    );
}
