//! Painter tests - classification and rendering of simplified source

use maplit::btreeset;

use crate::painter::{
    classify, evaluate, extract_param_values, render_html, render_lines, Classification,
    EvaluationError, LineState, ParamBindings, ParamValue, RenderOptions,
};
use crate::parser::parse_program;
use crate::printer::print_program;
use crate::substitute::substitute;
use crate::types::ast::{Expr, Stmt};
use crate::types::values::Val;

const CHAIN: &str = "function foo(x, y, z) {\n    if (x + 1 + y < z) {\n        return x + y + z + (0 + 5);\n    } else if (x + 1 + y < z * 2) {\n        return x + y + z + (0 + x + 5);\n    } else {\n        return x + y + z + (0 + z + 5);\n    }\n}";

fn simplify(source: &str) -> String {
    print_program(&substitute(parse_program(source).expect("Should parse")))
}

fn classify_text(code: &str, params: &str) -> Classification {
    let program = parse_program(code).expect("Should parse");
    let values = extract_param_values(params).expect("Should parse values");
    classify(&program, values).expect("Should evaluate")
}

fn paint(code: &str, params: &str) -> String {
    render_html(code, &classify_text(code, params), &RenderOptions::default())
}

fn eval_str(source: &str, bindings: &ParamBindings) -> Result<Val, EvaluationError> {
    let program = parse_program(source).expect("Should parse");
    match &program.body[0] {
        Stmt::Expr { expr, .. } => evaluate(expr, bindings, 0),
        other => panic!("Expected expression, got {:?}", other),
    }
}

fn bindings(pairs: &[(&str, &str)]) -> ParamBindings {
    let mut bindings = ParamBindings::new();
    for (name, text) in pairs {
        let mut values = extract_param_values(text).expect("Should parse value");
        bindings.bind(*name, ParamValue::new(values.remove(0)));
    }
    bindings
}

/* ===================== Parameter Values ===================== */

#[test]
fn test_extract_param_values() {
    assert!(extract_param_values("").expect("Should parse").is_empty());
    assert!(extract_param_values("   ").expect("Should parse").is_empty());

    let values = extract_param_values("1,2,3").expect("Should parse");
    assert_eq!(values.len(), 3);

    let values = extract_param_values("'1234'").expect("Should parse");
    assert!(matches!(values.as_slice(), [Expr::LitStr { v, .. }] if v == "1234"));

    let values = extract_param_values("[8,9,10],1").expect("Should parse");
    assert!(matches!(values[0], Expr::LitList { ref elements, .. } if elements.len() == 3));
    assert!(matches!(values[1], Expr::LitNum { v, .. } if v == 1.0));
}

#[test]
fn test_extract_param_values_rejects_malformed_text() {
    assert!(extract_param_values("1,,2").is_err());
    assert!(extract_param_values("let a = 1").is_err());
}

/* ===================== Painting ===================== */

#[test]
fn test_paint_second_branch_taken() {
    assert_eq!(
        paint(CHAIN, "1,2,3"),
        "<p>function foo(x, y, z) {</p>\
         <p><mark style=\"background-color:red\">    if (x + 1 + y < z) {</mark></p>\
         <p>        return x + y + z + (0 + 5);</p>\
         <p><mark style=\"background-color:lawngreen\">    } else if (x + 1 + y < z * 2) {</mark></p>\
         <p>        return x + y + z + (0 + x + 5);</p>\
         <p>    } else {</p>\
         <p>        return x + y + z + (0 + z + 5);</p>\
         <p>    }</p>\
         <p>}</p>"
    );
}

#[test]
fn test_paint_taken_branch_kills_alternates() {
    assert_eq!(
        paint(CHAIN, "3,2,100"),
        "<p>function foo(x, y, z) {</p>\
         <p><mark style=\"background-color:lawngreen\">    if (x + 1 + y < z) {</mark></p>\
         <p>        return x + y + z + (0 + 5);</p>\
         <p><mark style=\"background-color:red\">    } else if (x + 1 + y < z * 2) {</mark></p>\
         <p>        return x + y + z + (0 + x + 5);</p>\
         <p>    } else {</p>\
         <p>        return x + y + z + (0 + z + 5);</p>\
         <p>    }</p>\
         <p>}</p>"
    );
    assert_eq!(
        classify_text(CHAIN, "3,2,100"),
        Classification {
            taken: btreeset! {1},
            not_taken: btreeset! {3},
        }
    );
}

#[test]
fn test_paint_string_parameter() {
    let code = simplify("function foo(x){\n    if(x[1]==='2')\n        return true;\n    return false;\n}");
    assert_eq!(
        paint(&code, "'1234'"),
        "<p>function foo(x) {</p>\
         <p><mark style=\"background-color:lawngreen\">    if (x[1] === '2')</mark></p>\
         <p>        return true;</p>\
         <p>    return false;</p>\
         <p>}</p>"
    );
}

#[test]
fn test_paint_without_parameters() {
    let code = simplify(
        "function goo(){\n    let a=5\n    if(2*a > 12){\n        return 6;\n    }\n    else{\n        return 0;\n    }\n}",
    );
    assert_eq!(
        paint(&code, ""),
        "<p>function goo() {</p>\
         <p><mark style=\"background-color:red\">    if (2 * 5 > 12) {</mark></p>\
         <p>        return 6;</p>\
         <p>    } else {</p>\
         <p>        return 0;</p>\
         <p>    }</p>\
         <p>}</p>"
    );
}

#[test]
fn test_paint_empty_input() {
    let code = simplify("");
    assert_eq!(code, "");
    assert_eq!(paint(&code, ""), "<p></p>");
}

#[test]
fn test_paint_if_without_alternate() {
    let code = simplify("function foo(){\n    if(7>6)\n        return true;\n      }");
    assert_eq!(
        paint(&code, ""),
        "<p>function foo() {</p>\
         <p><mark style=\"background-color:lawngreen\">    if (7 > 6)</mark></p>\
         <p>        return true;</p>\
         <p>}</p>"
    );
}

#[test]
fn test_paint_array_parameter() {
    let code = simplify(
        "function foo(x,y){\n    if(x[y]>y){\n        return y;\n    }\n    else\n        return x[y];\n}",
    );
    assert_eq!(
        paint(&code, "[8,9,10],1"),
        "<p>function foo(x, y) {</p>\
         <p><mark style=\"background-color:lawngreen\">    if (x[y] > y) {</mark></p>\
         <p>        return y;</p>\
         <p>    } else</p>\
         <p>        return x[y];</p>\
         <p>}</p>"
    );
}

#[test]
fn test_paint_single_if_with_value() {
    let code = simplify("function foo(x){ if(x>5){ return true; } return false; }");
    assert_eq!(classify_text(&code, "10").taken, btreeset! {1});
    assert_eq!(classify_text(&code, "1").not_taken, btreeset! {1});
}

/* ===================== Classification ===================== */

#[test]
fn test_nested_branches_are_classified() {
    let code = "function f(a, b) {\n    while (a < b) {\n        if (a > 0) {\n            return 1;\n        }\n    }\n}";
    assert_eq!(classify_text(code, "1, 2").taken, btreeset! {2});
}

#[test]
fn test_values_are_consumed_across_functions() {
    let code = "function f(a) {\n    if (a) {\n    }\n}\nfunction g(b) {\n    if (b) {\n    }\n}";
    let classification = classify_text(code, "true, false");
    assert_eq!(classification.taken, btreeset! {1});
    assert_eq!(classification.not_taken, btreeset! {5});
}

#[test]
fn test_unbound_name_is_an_error() {
    let program = parse_program("function f(a) {\n    if (a < limit) {\n    }\n}").expect("Should parse");
    let values = extract_param_values("1").expect("Should parse");
    assert_eq!(
        classify(&program, values),
        Err(EvaluationError::Unbound {
            name: "limit".to_string(),
            line: 1,
        })
    );
}

#[test]
fn test_missing_value_leaves_parameter_unbound() {
    let program = parse_program("function f(a, b) {\n    if (b) {\n    }\n}").expect("Should parse");
    let values = extract_param_values("1").expect("Should parse");
    assert!(matches!(
        classify(&program, values),
        Err(EvaluationError::Unbound { ref name, .. }) if name == "b"
    ));
}

#[test]
fn test_line_state() {
    let classification = Classification {
        taken: btreeset! {1},
        not_taken: btreeset! {3},
    };
    assert_eq!(classification.line_state(1), LineState::Taken);
    assert_eq!(classification.line_state(3), LineState::NotTaken);
    assert_eq!(classification.line_state(2), LineState::Plain);
}

/* ===================== Evaluation ===================== */

#[test]
fn test_evaluate_arithmetic_and_comparison() {
    let b = bindings(&[("x", "1"), ("y", "2"), ("z", "3")]);
    assert_eq!(eval_str("x + 1 + y < z", &b), Ok(Val::Bool(false)));
    assert_eq!(eval_str("x + 1 + y < z * 2", &b), Ok(Val::Bool(true)));
    assert_eq!(eval_str("z % 2", &b), Ok(Val::Num(1.0)));
    assert_eq!(eval_str("-x", &b), Ok(Val::Num(-1.0)));
}

#[test]
fn test_evaluate_strings_and_arrays() {
    let b = bindings(&[("s", "'1234'"), ("a", "[8, 9, 10]")]);
    assert_eq!(eval_str("s[1]", &b), Ok(Val::Str("2".to_string())));
    assert_eq!(eval_str("s.length", &b), Ok(Val::Num(4.0)));
    assert_eq!(eval_str("a.length", &b), Ok(Val::Num(3.0)));
    assert_eq!(eval_str("a[5]", &b), Ok(Val::Undefined));
    assert_eq!(eval_str("s + 1", &b), Ok(Val::Str("12341".to_string())));
    assert_eq!(eval_str("'10' < '9'", &b), Ok(Val::Bool(true)));
    assert_eq!(eval_str("'10' < 9", &b), Ok(Val::Bool(false)));
}

#[test]
fn test_evaluate_equality() {
    let b = ParamBindings::new();
    assert_eq!(eval_str("'2' == 2", &b), Ok(Val::Bool(true)));
    assert_eq!(eval_str("'2' === 2", &b), Ok(Val::Bool(false)));
    assert_eq!(eval_str("null == undefined", &b), Ok(Val::Bool(true)));
    assert_eq!(eval_str("null === undefined", &b), Ok(Val::Bool(false)));
    assert_eq!(eval_str("NaN == NaN", &b), Ok(Val::Bool(false)));
    assert_eq!(eval_str("true == 1", &b), Ok(Val::Bool(true)));
}

#[test]
fn test_evaluate_logical_and_unary() {
    let b = ParamBindings::new();
    assert_eq!(eval_str("0 || 'x'", &b), Ok(Val::Str("x".to_string())));
    assert_eq!(eval_str("0 && missing", &b), Ok(Val::Num(0.0)));
    assert_eq!(eval_str("!''", &b), Ok(Val::Bool(true)));
    assert_eq!(eval_str("~5", &b), Ok(Val::Num(-6.0)));
    assert_eq!(eval_str("typeof missing", &b), Ok(Val::Str("undefined".to_string())));
    assert_eq!(eval_str("1 > 0 ? 'a' : 'b'", &b), Ok(Val::Str("a".to_string())));
}

#[test]
fn test_evaluate_rejects_unsupported_constructs() {
    let b = bindings(&[("x", "1")]);
    assert!(matches!(
        eval_str("f(x)", &b),
        Err(EvaluationError::Unsupported { .. })
    ));
    assert!(matches!(
        eval_str("undefined.x", &b),
        Err(EvaluationError::TypeMismatch { .. })
    ));
}

#[test]
fn test_parameter_values_do_not_see_other_parameters() {
    let b = bindings(&[("x", "y"), ("y", "1")]);
    assert!(matches!(
        eval_str("x", &b),
        Err(EvaluationError::Unbound { ref name, .. }) if name == "y"
    ));
}

/* ===================== Rendering ===================== */

#[test]
fn test_render_line_count_matches_source() {
    let lines = render_lines("a\n\nb\n", &Classification::default(), &RenderOptions::default());
    assert_eq!(lines, vec!["<p>a</p>", "<p></p>", "<p>b</p>", "<p></p>"]);
}

#[test]
fn test_render_custom_colors_and_escaping() {
    let options = RenderOptions {
        taken_color: "green".to_string(),
        not_taken_color: "salmon".to_string(),
        escape_html: true,
    };
    let classification = Classification {
        taken: btreeset! {0},
        not_taken: btreeset! {1},
    };
    assert_eq!(
        render_html("if (a < b)\nif (a && b)", &classification, &options),
        "<p><mark style=\"background-color:green\">if (a &lt; b)</mark></p>\
         <p><mark style=\"background-color:salmon\">if (a &amp;&amp; b)</mark></p>"
    );
}
