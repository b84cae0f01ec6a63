//! Substitution tests - each case parses, substitutes and prints

use crate::parser::parse_program;
use crate::printer::print_program;
use crate::substitute::{substitute, Env, LoopTest};
use crate::types::ast::Expr;

fn simplify(source: &str) -> String {
    let program = parse_program(source).expect("Should parse");
    print_program(&substitute(program))
}

/* ===================== Canonical Examples ===================== */

#[test]
fn test_substitute_if_else_chain() {
    let source = "function foo(x, y, z){\n\
                  \x20   let a = x + 1;\n\
                  \x20   let b = a + y;\n\
                  \x20   let c = 0;\n\
                  \x20   \n\
                  \x20   if (b < z) {\n\
                  \x20       c = c + 5;\n\
                  \x20       return x + y + z + c;\n\
                  \x20   } else if (b < z * 2) {\n\
                  \x20       c = c + x + 5;\n\
                  \x20       return x + y + z + c;\n\
                  \x20   } else {\n\
                  \x20       c = c + z + 5;\n\
                  \x20       return x + y + z + c;\n\
                  \x20   }\n\
                  }\n";

    assert_eq!(
        simplify(source),
        "function foo(x, y, z) {\n    if (x + 1 + y < z) {\n        return x + y + z + (0 + 5);\n    } else if (x + 1 + y < z * 2) {\n        return x + y + z + (0 + x + 5);\n    } else {\n        return x + y + z + (0 + z + 5);\n    }\n}"
    );
}

#[test]
fn test_substitute_while_loop_keeps_observed_assignment() {
    let source = "function foo(x, y, z){\n\
                  \x20   let a = x + 1;\n\
                  \x20   let b = a + y;\n\
                  \x20   let c = 0;\n\
                  \x20   \n\
                  \x20   while (a < z) {\n\
                  \x20       c = a + b;\n\
                  \x20       z = c * 2;\n\
                  \x20   }\n\
                  \x20   \n\
                  \x20   return z;\n\
                  }\n";

    assert_eq!(
        simplify(source),
        "function foo(x, y, z) {\n    while (x + 1 < z) {\n        z = (x + 1 + (x + 1 + y)) * 2;\n    }\n    return z;\n}"
    );
}

#[test]
fn test_substitute_empty_function() {
    assert_eq!(simplify("function foo(){\n    \n}\n"), "function foo() {\n}");
}

#[test]
fn test_substitute_without_bindings_is_unchanged() {
    let source = "function foo(x){\n    if(x>5){\n        return true;\n    }\n    return false;\n}\n";
    assert_eq!(
        simplify(source),
        "function foo(x) {\n    if (x > 5) {\n        return true;\n    }\n    return false;\n}"
    );
}

#[test]
fn test_substitute_unknown_identifier_is_kept() {
    assert_eq!(
        simplify("function foo(){\n    return a;\n}"),
        "function foo() {\n    return a;\n}"
    );
}

#[test]
fn test_substitute_array_indexing() {
    assert_eq!(
        simplify("function foo(){\n    let a=[1,2,3,4];\n    return a[2]+ a[0];\n}"),
        "function foo() {\n    return 3 + 1;\n}"
    );
}

#[test]
fn test_substitute_declaration_then_assignment() {
    assert_eq!(
        simplify("function foo(){\n    let a;\n    a=8;\n    if(a>6)\n        return true;\n}"),
        "function foo() {\n    if (8 > 6)\n        return true;\n}"
    );
}

/* ===================== Scoping ===================== */

#[test]
fn test_branch_bindings_do_not_leak() {
    let source = "function f(x){ let c = 1; if (x) { c = 2; } else { c = 3; } return c; }";
    assert_eq!(
        simplify(source),
        "function f(x) {\n    if (x) {\n    } else {\n    }\n    return 1;\n}"
    );
}

#[test]
fn test_loop_bindings_do_not_leak() {
    let source = "function f(n){ let i = 0; while (i < n) { i = i + 1; } return i; }";
    assert_eq!(
        simplify(source),
        "function f(n) {\n    while (0 < n) {\n    }\n    return 0;\n}"
    );
}

#[test]
fn test_function_parameters_shadow_outer_bindings() {
    let source = "let x = 5;\nfunction f(x){ return x; }\nfunction g(){ return x; }";
    assert_eq!(
        simplify(source),
        "function f(x) {\n    return x;\n}\nfunction g() {\n    return 5;\n}"
    );
}

#[test]
fn test_sequential_rebinding_uses_latest_value() {
    let source = "function f(y){ let a = y; a = a * 2; a = a + 1; return a; }";
    assert_eq!(simplify(source), "function f(y) {\n    return y * 2 + 1;\n}");
}

/* ===================== Loops ===================== */

#[test]
fn test_loop_assignment_eliminated_when_not_observed() {
    let source = "function f(x, z){ let t = 0; while (x < z) { t = x + 1; z = t * 2; } return z; }";
    assert_eq!(
        simplify(source),
        "function f(x, z) {\n    while (x < z) {\n        z = (x + 1) * 2;\n    }\n    return z;\n}"
    );
}

#[test]
fn test_loop_observation_ignores_string_contents() {
    let source = "function f(s){ let n = 0; while (s !== 'n') { n = 1; s = 'n'; } return n; }";
    assert_eq!(
        simplify(source),
        "function f(s) {\n    while (s !== 'n') {\n        s = 'n';\n    }\n    return 0;\n}"
    );
}

#[test]
fn test_nested_loops_keep_assignments_each_test_reads() {
    let source = "function f(a, b){ while (a < 10) { while (b < 5) { b = b + 1; } a = a + 1; } return a; }";
    assert_eq!(
        simplify(source),
        "function f(a, b) {\n    while (a < 10) {\n        while (b < 5) {\n            b = b + 1;\n        }\n        a = a + 1;\n    }\n    return a;\n}"
    );
}

#[test]
fn test_inner_loop_only_observes_its_own_test() {
    let source = "function f(a, b){ while (a < 10) { while (b < 5) { a = a + 1; b = b + 1; } } return a; }";
    assert_eq!(
        simplify(source),
        "function f(a, b) {\n    while (a < 10) {\n        while (b < 5) {\n            b = b + 1;\n        }\n    }\n    return a;\n}"
    );
}

#[test]
fn test_compound_assignment_in_loop_keeps_operator() {
    let source = "function f(i, n){ while (i < n) { i += 2; } return i; }";
    assert_eq!(
        simplify(source),
        "function f(i, n) {\n    while (i < n) {\n        i += 2;\n    }\n    return i;\n}"
    );
}

#[test]
fn test_compound_assignment_outside_loop_is_inlined() {
    let source = "function f(x){ let s = x; s += 3; s *= 2; return s; }";
    assert_eq!(simplify(source), "function f(x) {\n    return (x + 3) * 2;\n}");
}

#[test]
fn test_for_loop_passes_through() {
    let source = "function f(n){ let s = 0; for (let i = 0; i < n; i++) { s += i; } return s; }";
    assert_eq!(
        simplify(source),
        "function f(n) {\n    for (let i = 0; i < n; i++) {\n        s += i;\n    }\n    return 0;\n}"
    );
}

/* ===================== Expressions ===================== */

#[test]
fn test_element_store_is_preserved() {
    let source = "function f(a, i){ let k = i + 1; a[k] = k; return a; }";
    assert_eq!(
        simplify(source),
        "function f(a, i) {\n    a[i + 1] = i + 1;\n    return a;\n}"
    );
}

#[test]
fn test_structural_substitution_of_other_expressions() {
    let source = "function f(x){ let a = x * 2; let b = [a, 1]; return g(a, b) || !a && (a ? 1 : 2); }";
    assert_eq!(
        simplify(source),
        "function f(x) {\n    return g(x * 2, [x * 2, 1]) || !(x * 2) && (x * 2 ? 1 : 2);\n}"
    );
}

#[test]
fn test_nested_assignment_binds_its_target() {
    let source = "function f(x){ let a = 0; let b = a = x; return a + b; }";
    assert_eq!(simplify(source), "function f(x) {\n    return x + x;\n}");
}

#[test]
fn test_nested_compound_assignment_yields_new_value() {
    let source = "function f(x){ let a = x; let b = (a += 1) * 2; return b - a; }";
    assert_eq!(simplify(source), "function f(x) {\n    return (x + 1) * 2 - (x + 1);\n}");
}

#[test]
fn test_nested_assignment_to_loop_observed_name_is_kept() {
    let source = "function f(i, n){ while (i < n) { g(i = i + 1); } return i; }";
    assert_eq!(
        simplify(source),
        "function f(i, n) {\n    while (i < n) {\n        g(i = i + 1);\n    }\n    return i;\n}"
    );
}

#[test]
fn test_assignment_in_while_test_is_kept() {
    let source = "function f(i, n){ while ((i = i + 1) < n) { } return i; }";
    assert_eq!(
        simplify(source),
        "function f(i, n) {\n    while ((i = i + 1) < n) {\n    }\n    return i;\n}"
    );
}

#[test]
fn test_property_names_are_not_substituted() {
    let source = "function f(o){ let length = 3; return o.length + length; }";
    assert_eq!(simplify(source), "function f(o) {\n    return o.length + 3;\n}");
}

#[test]
fn test_out_of_range_index_is_not_inlined() {
    let source = "function f(){ let a = [1, 2]; return a[5]; }";
    assert_eq!(simplify(source), "function f() {\n    return [1, 2][5];\n}");
}

#[test]
fn test_substitution_is_deterministic() {
    let source = "function foo(x, y, z){ let a = x + 1; let b = a + y; if (b < z) { return b; } return a; }";
    assert_eq!(simplify(source), simplify(source));
}

/* ===================== Environment ===================== */

#[test]
fn test_env_child_is_independent() {
    let mut parent = Env::new();
    parent.bind("a", Expr::ident("x"));

    let mut child = parent.child();
    child.bind("a", Expr::ident("y"));
    child.bind("b", Expr::ident("z"));

    assert_eq!(parent.lookup("a"), Some(&Expr::ident("x")));
    assert!(!parent.is_bound("b"));
    assert_eq!(child.lookup("a"), Some(&Expr::ident("y")));
}

#[test]
fn test_loop_test_tokens() {
    let program = parse_program("a1 + b.c * 2e3 < 'zz' + d[0]").expect("Should parse");
    let test = match &program.body[0] {
        crate::types::ast::Stmt::Expr { expr, .. } => expr.clone(),
        other => panic!("Expected expression, got {:?}", other),
    };
    let observed = LoopTest::from_test(&test);
    let mut names = observed.names().collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, vec!["a1", "b", "c", "d"]);
}
