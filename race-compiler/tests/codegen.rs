use race_compiler::compile_to_c;

// ── Struct emission ──────────────────────────────────────────────────────

#[test]
fn engine_struct_two_fields_in_order() {
    let source = "struct Engine { horsepower: i32, torque: f32 }";
    let c = compile_to_c(source).expect("struct should compile");

    assert!(c.contains("typedef struct {"));
    assert!(c.contains("} Engine;"));

    let hp = c.find("int horsepower;").expect("horsepower field missing");
    let tq = c.find("float torque;").expect("torque field missing");
    assert!(hp < tq, "fields must keep declaration order");
}

#[test]
fn struct_field_of_struct_type() {
    let source = r#"
        struct Engine { horsepower: i32 }
        struct Car { engine: Engine, color: string }
    "#;
    let c = compile_to_c(source).expect("nested struct type should compile");
    assert!(c.contains("Engine engine;"), "struct-typed field should use the struct name");
    assert!(c.contains("char * color;"));
}

#[test]
fn no_includes_when_not_needed() {
    let source = "struct Engine { horsepower: i32 }";
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(!c.contains("#include"), "plain structs need no includes");
}

// ── Instance emission ────────────────────────────────────────────────────

#[test]
fn engine_instance_separator_placement() {
    let source = r#"
        struct Engine { horsepower: i32, torque: f32 }
        engine myEngine { horsepower: 450, torque: 550.5 }
    "#;
    let c = compile_to_c(source).expect("instance should compile");

    assert!(c.contains("Engine myEngine = {"));
    let hp = c.find(".horsepower = 450,").expect("first field needs a trailing comma");
    let tq = c.find(".torque = 550.5").expect("last field missing");
    assert!(hp < tq, "fields must keep instance order");
    assert!(
        !c.contains(".torque = 550.5,"),
        "last field must not be followed by a comma"
    );
}

#[test]
fn instance_separator_count() {
    let source = r#"
        struct Track { laps: i32, length: f32, surface: string }
        track monza { laps: 53, length: 5.793, surface: "asphalt" }
    "#;
    let c = compile_to_c(source).expect("Compilation failed");

    // Three fields: exactly two separators, none after the last.
    let field_lines: Vec<&str> = c
        .lines()
        .map(|l| l.trim())
        .filter(|l| l.starts_with('.'))
        .collect();
    assert_eq!(field_lines.len(), 3);
    assert_eq!(
        field_lines.iter().filter(|l| l.ends_with(',')).count(),
        2,
        "N fields must produce N-1 separators"
    );
    assert!(!field_lines[2].ends_with(','));
}

#[test]
fn instance_type_resolves_by_kind() {
    let source = r#"
        struct Engine { horsepower: i32 }
        struct Car { maxSpeed: i32 }
        engine myEngine { horsepower: 450 }
    "#;
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(
        c.contains("Engine myEngine = {"),
        "kind 'engine' should pick the Engine struct, not the last one emitted"
    );
}

#[test]
fn instance_type_falls_back_to_last_struct() {
    let source = r#"
        struct Motor { rpm: i32 }
        engine e1 { rpm: 9000 }
    "#;
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(
        c.contains("Motor e1 = {"),
        "with no kind-named struct, the most recently emitted struct is used"
    );
}

#[test]
fn nested_struct_init_value() {
    let source = r#"
        struct Engine { horsepower: i32, torque: f32 }
        struct Car { weight: i32, engine: Engine }
        car mySuperCar {
            weight: 1200kg,
            engine: Engine { horsepower: 450, torque: 550.5 }
        }
    "#;
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.contains("Car mySuperCar = {"));
    assert!(c.contains(".weight = 1200,"), "unit suffix should be stripped");
    assert!(c.contains(".engine = { .horsepower = 450, .torque = 550.5 }"));
}

// ── Function emission ────────────────────────────────────────────────────

#[test]
fn unit_suffix_stripped_in_var_decl() {
    let source = r#"
        fn main() -> i32 {
            let torque: i32 = 450Nm;
        }
    "#;
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.contains("int main() {"));
    assert!(c.contains("int torque = 450;"), "Nm suffix must be stripped");
}

#[test]
fn var_decl_without_suffix_still_emitted() {
    let source = "fn main() { let x: i32 = 5; }";
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.contains("int x = 5;"));
}

#[test]
fn var_decl_without_initializer() {
    let source = "fn main() { let x: f32; }";
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.contains("float x;"));
}

#[test]
fn function_signature_params_mapped() {
    let source = "fn add(a: i32, b: i32) -> i32 { }";
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.contains("int add(int a, int b) {"));
}

#[test]
fn function_without_return_type_emits_void() {
    let source = "fn setup() { }";
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.contains("void setup() {"));
}

#[test]
fn binary_expr_in_var_decl() {
    let source = r#"
        fn main() {
            let result: f32 = myEngine.horsepower + myEngine.torque;
        }
    "#;
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.contains("float result = myEngine.horsepower + myEngine.torque;"));
}

#[test]
fn member_access_chain_emission() {
    let source = "fn main() { let x: i32 = race.car.engine; }";
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.contains("int x = race.car.engine;"));
}

#[test]
fn array_literal_emission() {
    let source = "fn main() { let laps: i32 = [1, 2, 3]; }";
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.contains("int laps = {1, 2, 3};"));
}

#[test]
fn bool_emission_includes_stdbool() {
    let source = "fn main() { let done: bool = true; }";
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.contains("#include <stdbool.h>"));
    assert!(c.contains("bool done = true;"));
}

// ── Intrinsic println lowering ───────────────────────────────────────────

#[test]
fn println_lowers_to_printf() {
    let source = r#"
        fn main() {
            println("torque: ", torque);
        }
    "#;
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.starts_with("#include <stdio.h>"), "println must pull in stdio");
    assert!(
        c.contains(r#"printf("torque: %d\n", torque);"#),
        "template, one %d specifier, and the value argument expected, got:\n{}",
        c
    );
}

#[test]
fn println_specifier_per_argument() {
    let source = r#"fn main() { println("lap ", lap, number); }"#;
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.contains(r#"printf("lap %d%d\n", lap, number);"#));
}

#[test]
fn println_template_only() {
    let source = r#"fn main() { println("race over"); }"#;
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.contains(r#"printf("race over\n");"#));
}

#[test]
fn generic_call_reconstructed() {
    let source = "fn main() { simulate(laps, myCar); }";
    let c = compile_to_c(source).expect("Compilation failed");
    assert!(c.contains("simulate(laps, myCar);"));
}

// ── End to end ───────────────────────────────────────────────────────────

#[test]
fn full_racing_program() {
    let source = r#"
        module racing {
            import physics;

            struct Engine { horsepower: i32, torque: f32 }
            struct Car { maxSpeed: i32, weight: i32, engine: Engine, color: string }

            engine myEngine { horsepower: 450, torque: 550.5 }
            car mySuperCar {
                maxSpeed: 320,
                weight: 1200kg,
                engine: Engine { horsepower: 450, torque: 550.5 },
                color: "red"
            }

            fn main() -> i32 {
                let result: f32 = myEngine.horsepower + myEngine.torque;
                println("horsepower: ", myEngine.horsepower);
            }
        }
    "#;
    let c = compile_to_c(source).expect("full program should compile");

    assert!(c.starts_with("#include <stdio.h>"));
    assert!(c.contains("// module: racing"));

    // Declarations must precede the instances that reference them.
    let engine_decl = c.find("} Engine;").expect("Engine struct missing");
    let engine_inst = c.find("Engine myEngine = {").expect("myEngine instance missing");
    assert!(engine_decl < engine_inst);

    assert!(c.contains("Car mySuperCar = {"));
    assert!(c.contains(".maxSpeed = 320,"));
    assert!(c.contains(".weight = 1200,"));
    assert!(c.contains(".engine = { .horsepower = 450, .torque = 550.5 },"));
    assert!(c.contains(".color = \"red\""));
    assert!(!c.contains(".color = \"red\","));

    assert!(c.contains("int main() {"));
    assert!(c.contains("float result = myEngine.horsepower + myEngine.torque;"));
    assert!(c.contains(r#"printf("horsepower: %d\n", myEngine.horsepower);"#));
}
