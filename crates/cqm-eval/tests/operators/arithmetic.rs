//! Arithmetic operator tests: Add, Subtract, Multiply, Divide, Negate.
//! Null operands propagate; integer overflow is an evaluation error.

use super::helpers::*;
use cqm_elm::Expression;
use cqm_eval::{CqlValue, EvalError};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::str::FromStr;

fn eval(expr: Expression) -> CqlValue {
    let e = engine();
    let mut c = ctx();
    e.evaluate(&expr, &mut c).unwrap()
}

#[test]
fn integer_arithmetic() {
    assert_eq!(
        eval(Expression::Add(binary(int_expr(2), int_expr(3)))),
        CqlValue::Integer(5)
    );
    assert_eq!(
        eval(Expression::Subtract(binary(int_expr(2), int_expr(3)))),
        CqlValue::Integer(-1)
    );
    assert_eq!(
        eval(Expression::Multiply(binary(int_expr(4), int_expr(3)))),
        CqlValue::Integer(12)
    );
}

#[test]
fn mixed_width_promotes_to_decimal() {
    assert_eq!(
        eval(Expression::Add(binary(int_expr(2), decimal_expr("0.5")))),
        CqlValue::Decimal(Decimal::from_str("2.5").unwrap())
    );
}

#[test]
fn null_operands_propagate() {
    assert_eq!(
        eval(Expression::Add(binary(int_expr(2), null_expr()))),
        CqlValue::Null
    );
    assert_eq!(
        eval(Expression::Multiply(binary(null_expr(), null_expr()))),
        CqlValue::Null
    );
}

#[test]
fn divide_always_yields_decimal() {
    assert_eq!(
        eval(Expression::Divide(binary(int_expr(3), int_expr(2)))),
        CqlValue::Decimal(Decimal::from_str("1.5").unwrap())
    );
}

#[test]
fn divide_by_zero_is_null() {
    assert_eq!(
        eval(Expression::Divide(binary(int_expr(3), int_expr(0)))),
        CqlValue::Null
    );
}

#[test]
fn integer_overflow_is_an_error() {
    let e = engine();
    let mut c = ctx();
    let result = e.evaluate(
        &Expression::Add(binary(int_expr(i32::MAX), int_expr(1))),
        &mut c,
    );
    assert!(matches!(result, Err(EvalError::Overflow { .. })));
}

#[test]
fn negate() {
    assert_eq!(eval(Expression::Negate(unary(int_expr(5)))), CqlValue::Integer(-5));
    assert_eq!(eval(Expression::Negate(unary(null_expr()))), CqlValue::Null);
}

#[test]
fn arithmetic_on_strings_is_an_error() {
    let e = engine();
    let mut c = ctx();
    let result = e.evaluate(
        &Expression::Add(binary(string_expr("a"), string_expr("b"))),
        &mut c,
    );
    assert!(result.is_err());
}
