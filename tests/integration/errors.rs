mod common;
use common::{compile_err, compile_should_fail_with, main_with, program};
use mjc::diagnostics::CompileError;

#[test]
fn unresolved_identifier_is_fatal() {
    let err = compile_err(&program(
        "new A().f()",
        "class A { public int f() { return missing; } }",
    ));
    match err {
        CompileError::Resolve { msg, .. } => {
            assert_eq!(msg, "cannot find variable 'missing' in method 'A.f'");
        }
        other => panic!("expected resolve error, got {other:?}"),
    }
}

#[test]
fn unresolved_assignment_target_is_fatal() {
    let err = compile_err(&program(
        "new A().f()",
        "class A { public int f() { ghost = 1; return 0; } }",
    ));
    assert!(matches!(err, CompileError::Resolve { .. }), "{err:?}");
}

#[test]
fn identifiers_in_entry_routine_do_not_resolve() {
    let err = compile_err(&main_with("x = 1;"));
    assert!(err.to_string().contains("entry routine"), "{err}");
}

#[test]
fn this_outside_method() {
    let err = compile_err(&main_with("System.out.println(this.f());"));
    assert_eq!(err.to_string(), "Resolve error: 'this' used outside of a method");
}

#[test]
fn unknown_type_aborts_before_generation() {
    let err = compile_err(&program("1", "class A { Nope n; }"));
    assert!(matches!(err, CompileError::Type { .. }));
}

#[test]
fn unknown_class_in_new() {
    let err = compile_err(&main_with("System.out.println(new Ghost().f());"));
    assert_eq!(err.to_string(), "Type error: unknown class 'Ghost'");
}

#[test]
fn entry_class_cannot_be_instantiated() {
    let err = compile_err(&main_with("System.out.println(new Main().f());"));
    assert!(err.to_string().contains("cannot be instantiated"), "{err}");
}

#[test]
fn unsupported_features_fail_loudly() {
    let cases = [
        (program("new A().f()", "class A { int[] xs; public int f() { xs[0] = 1; return 0; } }"), "array element assignment"),
        (program("new A().f()", "class A { int[] xs; public int f() { return xs[0]; } }"), "array lookup"),
        (program("new A().f()", "class A { int[] xs; public int f() { return xs.length; } }"), "array length"),
        (main_with("if (!true) {} else {}"), "boolean negation"),
        (program("new A().f(3)", "class A { int[] xs; public int f(int n) { xs = new int[n]; return 0; } }"), "non-constant size"),
        (program("1", "class A { } class B extends A { }"), "inheritance"),
    ];
    for (src, feature) in cases {
        let err = compile_err(&src);
        assert!(matches!(err, CompileError::Unsupported { .. }), "{feature}: {err:?}");
        assert!(err.to_string().contains(feature), "{err}");
        assert!(err.to_string().ends_with("is not yet supported"), "{err}");
    }
}

#[test]
fn unknown_method_on_known_class() {
    let err = compile_err(&program("new A().nope()", "class A { }"));
    assert_eq!(err.to_string(), "Codegen error: class 'A' has no method 'nope'");
}

#[test]
fn arity_mismatch() {
    let err = compile_err(&program(
        "new A().f(1, 2)",
        "class A { public int f(int x) { return x; } }",
    ));
    assert!(err.to_string().contains("takes 1 argument(s) but 2 were supplied"), "{err}");
}

#[test]
fn scalar_type_mismatch_is_reported() {
    let err = compile_err(&program(
        "new A().f()",
        "class A { int n; public int f() { n = true; return n; } }",
    ));
    assert!(err.to_string().contains("assignment to 'n': expected i32, found i1"), "{err}");
}

#[test]
fn arithmetic_on_booleans_is_reported() {
    let err = compile_err(&main_with("System.out.println(true + 1);"));
    assert!(err.to_string().contains("operator '+' cannot be applied to i1 and i32"), "{err}");
}

#[test]
fn non_boolean_condition() {
    let err = compile_err(&main_with("while (1) {}"));
    assert!(err.to_string().contains("condition must be boolean"), "{err}");
}

#[test]
fn printing_an_object_is_rejected() {
    let err = compile_err(&program("new A()", "class A { }"));
    assert!(err.to_string().contains("expects int or boolean"), "{err}");
}

#[test]
fn cli_reports_syntax_errors() {
    compile_should_fail_with(&main_with("System.out.println(1)"), "expected ;");
}

#[test]
fn cli_reports_unresolved_identifiers() {
    compile_should_fail_with(
        &program("new A().f()", "class A { public int f() { return zzz; } }"),
        "cannot find variable 'zzz'",
    );
}

#[test]
fn cli_reports_unsupported_features() {
    compile_should_fail_with(&main_with("if (!false) {} else {}"), "boolean negation is not yet supported");
}

#[test]
fn cli_reports_codegen_errors_without_source_labels() {
    compile_should_fail_with(&program("new A().nope()", "class A { }"), "error: class 'A' has no method 'nope'");
}

#[test]
fn oversized_array_is_rejected() {
    let err = compile_err(&program(
        "new A().f()",
        "class A { int[] xs; public int f() { xs = new int[2000000000]; return 0; } }",
    ));
    match err {
        CompileError::Unsupported { feature, .. } => {
            assert!(feature.contains("2000000000 elements"), "{feature}");
        }
        other => panic!("expected unsupported error, got {other:?}"),
    }
}

#[test]
fn largest_representable_array_still_compiles() {
    let ir = common::compile_ir(&program(
        "new A().f()",
        "class A { int[] xs; public int f() { xs = new int[536870911]; return 0; } }",
    ));
    assert!(ir.contains("getelementptr i32, i32* null, i32 536870911"), "{ir}");
}

#[test]
fn negative_array_size_from_json_ast() {
    let source = program(
        "new A().f()",
        "class A { int[] xs; public int f() { xs = new int[7777]; return 0; } }",
    );
    let json = serde_json::to_string(&mjc::parse_source(&source).unwrap()).unwrap();
    assert!(json.contains(r#"{"IntLit":7777}"#), "{json}");
    let program = mjc::parse_ast_json(&json.replace(r#"{"IntLit":7777}"#, r#"{"IntLit":-7777}"#)).unwrap();

    let err = mjc::compile_program(&program, &mjc::CodegenOptions::default()).unwrap_err();
    assert!(matches!(err, CompileError::Type { .. }), "{err:?}");
    assert_eq!(err.to_string(), "Type error: array size -7777 is negative");
}

#[test]
fn dotted_names_in_json_ast_are_rejected() {
    let source = program(
        "new A().b()",
        "class A { public int b() { return 1; } }
         class Ab { public int c() { return 2; } }",
    );
    let mut program = mjc::parse_source(&source).unwrap();
    program.classes[0].node.methods[0].node.name.node = "b.c".to_string();
    program.classes[1].node.name.node = "A.b".to_string();
    let json = serde_json::to_string(&program).unwrap();

    let parsed = mjc::parse_ast_json(&json).unwrap();
    let err = mjc::compile_program(&parsed, &mjc::CodegenOptions::default()).unwrap_err();
    assert_eq!(err.to_string(), "Type error: invalid class name 'A.b'");
}
