//! Comparison operator tests: Equal, NotEqual, Less, Greater, LessOrEqual,
//! GreaterOrEqual. Null operands yield null results.

use super::helpers::*;
use cqm_elm::Expression;
use cqm_eval::CqlValue;
use pretty_assertions::assert_eq;

fn eval(expr: Expression) -> CqlValue {
    let e = engine();
    let mut c = ctx();
    e.evaluate(&expr, &mut c).unwrap()
}

#[test]
fn equal_on_integers() {
    assert_eq!(
        eval(Expression::Equal(binary(int_expr(3), int_expr(3)))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::Equal(binary(int_expr(3), int_expr(4)))),
        CqlValue::Boolean(false)
    );
}

#[test]
fn equal_coerces_numeric_widths() {
    assert_eq!(
        eval(Expression::Equal(binary(int_expr(3), decimal_expr("3.0")))),
        CqlValue::Boolean(true)
    );
}

#[test]
fn equal_with_null_is_null() {
    assert_eq!(
        eval(Expression::Equal(binary(int_expr(3), null_expr()))),
        CqlValue::Null
    );
    assert_eq!(
        eval(Expression::NotEqual(binary(null_expr(), int_expr(3)))),
        CqlValue::Null
    );
}

#[test]
fn not_equal_negates_equal() {
    assert_eq!(
        eval(Expression::NotEqual(binary(int_expr(3), int_expr(4)))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::NotEqual(binary(
            string_expr("a"),
            string_expr("a")
        ))),
        CqlValue::Boolean(false)
    );
}

#[test]
fn ordering_comparisons() {
    assert_eq!(
        eval(Expression::Less(binary(int_expr(1), int_expr(2)))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::Greater(binary(decimal_expr("1.5"), int_expr(1)))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::LessOrEqual(binary(int_expr(2), int_expr(2)))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::GreaterOrEqual(binary(int_expr(1), int_expr(2)))),
        CqlValue::Boolean(false)
    );
}

#[test]
fn ordering_with_null_is_null() {
    assert_eq!(
        eval(Expression::Less(binary(null_expr(), int_expr(2)))),
        CqlValue::Null
    );
    assert_eq!(
        eval(Expression::GreaterOrEqual(binary(int_expr(2), null_expr()))),
        CqlValue::Null
    );
}

#[test]
fn strings_compare_lexicographically() {
    assert_eq!(
        eval(Expression::Less(binary(string_expr("abc"), string_expr("abd")))),
        CqlValue::Boolean(true)
    );
}

#[test]
fn comparing_incompatible_types_is_an_error() {
    let e = engine();
    let mut c = ctx();
    let result = e.evaluate(
        &Expression::Less(binary(bool_expr(true), int_expr(1))),
        &mut c,
    );
    assert!(result.is_err());
}
