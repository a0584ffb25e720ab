use race_compiler::{compile_to_ast, compile_to_c, BuildErrorKind, CompileError};

// ── Builder errors ───────────────────────────────────────────────────────

#[test]
fn unknown_instance_kind() {
    let result = compile_to_ast("plane wright { wings: 2 }");
    assert_build_error(result, BuildErrorKind::UnknownInstanceKind);
}

#[test]
fn call_of_call_result_rejected() {
    let result = compile_to_ast("fn main() { a.b()(); }");
    assert_build_error(result, BuildErrorKind::UnsupportedCallee);
}

fn assert_build_error(
    result: Result<race_compiler::ast::Program, CompileError>,
    expected: BuildErrorKind,
) {
    match result {
        Ok(_) => panic!("Expected {:?} error, but lowering succeeded", expected),
        Err(CompileError::Build { kind, .. }) => assert_eq!(kind, expected),
        Err(other) => panic!("Expected {:?} build error, got: {:?}", expected, other),
    }
}

// ── Type mapping errors ──────────────────────────────────────────────────

#[test]
fn unknown_type_name() {
    let result = compile_to_c("struct X { a: i64 }");
    match result {
        Err(CompileError::TypeMapping { type_name }) => assert_eq!(type_name, "i64"),
        other => panic!("Expected TypeMapping error, got: {:?}", other),
    }
}

#[test]
fn supported_types_always_map() {
    for ty in ["i32", "f32", "string", "bool"] {
        let source = format!("struct X {{ field: {} }}", ty);
        compile_to_c(&source).unwrap_or_else(|e| panic!("type '{}' should map: {:?}", ty, e));
    }
}

#[test]
fn unsupported_types_always_fail() {
    for ty in ["i64", "u32", "text", "number"] {
        let source = format!("struct X {{ field: {} }}", ty);
        let result = compile_to_c(&source);
        assert!(
            matches!(result, Err(CompileError::TypeMapping { .. })),
            "type '{}' must not map silently",
            ty
        );
    }
}

#[test]
fn instance_without_any_struct() {
    let result = compile_to_c("engine myEngine { horsepower: 450 }");
    match result {
        Err(CompileError::TypeMapping { type_name }) => assert_eq!(type_name, "engine"),
        other => panic!("Expected TypeMapping error, got: {:?}", other),
    }
}

// ── Unsupported lowerings ────────────────────────────────────────────────

#[test]
fn if_statement_is_unsupported() {
    let result = compile_to_c("fn main() { if 1 < 2 { } }");
    assert_unsupported(result, "if statement");
}

#[test]
fn return_statement_is_unsupported() {
    let result = compile_to_c("fn main() -> i32 { return 0; }");
    assert_unsupported(result, "return statement");
}

#[test]
fn assignment_is_unsupported() {
    let result = compile_to_c("fn main() { x = 1; }");
    assert_unsupported(result, "assignment");
}

#[test]
fn for_in_loop_is_unsupported() {
    let result = compile_to_c("fn main() { for lap in laps { } }");
    assert_unsupported(result, "for-in loop");
}

fn assert_unsupported(result: Result<String, CompileError>, construct: &str) {
    match result {
        Ok(c) => panic!("Expected UnsupportedLowering, but emission produced:\n{}", c),
        Err(CompileError::UnsupportedLowering { construct: found }) => {
            assert_eq!(found, construct);
        }
        Err(other) => panic!("Expected UnsupportedLowering error, got: {:?}", other),
    }
}

// ── Intrinsic errors ─────────────────────────────────────────────────────

#[test]
fn println_without_arguments() {
    let result = compile_to_c("fn main() { println(); }");
    match result {
        Err(CompileError::IntrinsicArity { name }) => assert_eq!(name, "println"),
        other => panic!("Expected IntrinsicArity error, got: {:?}", other),
    }
}

#[test]
fn println_with_non_literal_template() {
    let result = compile_to_c("fn main() { println(x); }");
    assert_unsupported(result, "println with a non-literal template");
}

// ── Parse and lexical error locations ────────────────────────────────────

#[test]
fn parse_error_location_single_line() {
    let result = compile_to_ast("struct { horsepower: i32 }");
    match result {
        Err(CompileError::Parse { line, col, .. }) => {
            assert_eq!(line, 1, "Error should be on line 1, got {}", line);
            assert!(col > 1, "Error column should be > 1, got {}", col);
        }
        other => panic!("Expected parse error, got: {:?}", other),
    }
}

#[test]
fn parse_error_location_multiline() {
    let result = compile_to_ast("struct Engine { horsepower: i32 }\nstruct {");
    match result {
        Err(CompileError::Parse { line, .. }) => {
            assert_eq!(line, 2, "Error should be on line 2, got {}", line);
        }
        other => panic!("Expected parse error, got: {:?}", other),
    }
}

#[test]
fn top_level_garbage_rejected() {
    let result = compile_to_ast("42;");
    assert!(matches!(result, Err(CompileError::Parse { .. })));
}

#[test]
fn lexical_error_reports_character() {
    let result = compile_to_ast("struct Engine { horsepower: i32 }\n@");
    match result {
        Err(CompileError::Lexical(e)) => {
            assert_eq!(e.line, 2);
            assert_eq!(e.unexpected_char, '@');
        }
        other => panic!("Expected lexical error, got: {:?}", other),
    }
}
