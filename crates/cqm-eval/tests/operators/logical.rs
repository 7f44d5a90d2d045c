//! Logical operator tests: And, Or, Xor, Implies, Not, IsNull, IsTrue,
//! IsFalse, Coalesce, If. All follow three-valued logic per the CQL
//! specification.

use super::helpers::*;
use cqm_elm::{Element, Expression, IfExpression, NaryExpression};
use cqm_eval::CqlValue;
use pretty_assertions::assert_eq;

fn eval(expr: Expression) -> CqlValue {
    let e = engine();
    let mut c = ctx();
    e.evaluate(&expr, &mut c).unwrap()
}

/// And truth table:
/// | A     | B     | A and B |
/// |-------|-------|---------|
/// | true  | true  | true    |
/// | true  | null  | null    |
/// | false | null  | false   | <- false dominates null
/// | null  | null  | null    |
#[test]
fn and_truth_table() {
    assert_eq!(
        eval(Expression::And(binary(bool_expr(true), bool_expr(true)))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::And(binary(bool_expr(true), bool_expr(false)))),
        CqlValue::Boolean(false)
    );
    assert_eq!(
        eval(Expression::And(binary(bool_expr(true), null_expr()))),
        CqlValue::Null
    );
    assert_eq!(
        eval(Expression::And(binary(bool_expr(false), null_expr()))),
        CqlValue::Boolean(false)
    );
    assert_eq!(
        eval(Expression::And(binary(null_expr(), bool_expr(false)))),
        CqlValue::Boolean(false)
    );
    assert_eq!(
        eval(Expression::And(binary(null_expr(), null_expr()))),
        CqlValue::Null
    );
}

/// Or truth table: true dominates null
#[test]
fn or_truth_table() {
    assert_eq!(
        eval(Expression::Or(binary(bool_expr(false), bool_expr(false)))),
        CqlValue::Boolean(false)
    );
    assert_eq!(
        eval(Expression::Or(binary(bool_expr(true), null_expr()))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::Or(binary(null_expr(), bool_expr(true)))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::Or(binary(bool_expr(false), null_expr()))),
        CqlValue::Null
    );
}

#[test]
fn xor_is_null_when_either_operand_is_null() {
    assert_eq!(
        eval(Expression::Xor(binary(bool_expr(true), bool_expr(false)))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::Xor(binary(bool_expr(true), bool_expr(true)))),
        CqlValue::Boolean(false)
    );
    assert_eq!(
        eval(Expression::Xor(binary(bool_expr(true), null_expr()))),
        CqlValue::Null
    );
}

#[test]
fn implies_truth_table() {
    assert_eq!(
        eval(Expression::Implies(binary(bool_expr(false), null_expr()))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::Implies(binary(null_expr(), bool_expr(true)))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::Implies(binary(bool_expr(true), bool_expr(false)))),
        CqlValue::Boolean(false)
    );
    assert_eq!(
        eval(Expression::Implies(binary(null_expr(), bool_expr(false)))),
        CqlValue::Null
    );
}

#[test]
fn not_propagates_null() {
    assert_eq!(
        eval(Expression::Not(unary(bool_expr(true)))),
        CqlValue::Boolean(false)
    );
    assert_eq!(eval(Expression::Not(unary(null_expr()))), CqlValue::Null);
}

#[test]
fn not_rejects_non_boolean_operand() {
    let e = engine();
    let mut c = ctx();
    let result = e.evaluate(&Expression::Not(unary(int_expr(1))), &mut c);
    assert!(result.is_err());
}

#[test]
fn null_predicates_never_return_null() {
    assert_eq!(
        eval(Expression::IsNull(unary(null_expr()))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::IsNull(unary(bool_expr(false)))),
        CqlValue::Boolean(false)
    );
    assert_eq!(
        eval(Expression::IsTrue(unary(null_expr()))),
        CqlValue::Boolean(false)
    );
    assert_eq!(
        eval(Expression::IsTrue(unary(bool_expr(true)))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::IsFalse(unary(bool_expr(false)))),
        CqlValue::Boolean(true)
    );
    assert_eq!(
        eval(Expression::IsFalse(unary(null_expr()))),
        CqlValue::Boolean(false)
    );
}

#[test]
fn coalesce_returns_first_non_null() {
    let expr = Expression::Coalesce(NaryExpression {
        element: Element::default(),
        operand: vec![null_expr(), int_expr(7), int_expr(9)],
    });
    assert_eq!(eval(expr), CqlValue::Integer(7));

    let all_null = Expression::Coalesce(NaryExpression {
        element: Element::default(),
        operand: vec![null_expr(), null_expr()],
    });
    assert_eq!(eval(all_null), CqlValue::Null);
}

#[test]
fn if_selects_else_on_false_and_null() {
    let make_if = |condition| {
        Expression::If(IfExpression {
            element: Element::default(),
            condition,
            then: int_expr(1),
            else_clause: int_expr(2),
        })
    };
    assert_eq!(eval(make_if(bool_expr(true))), CqlValue::Integer(1));
    assert_eq!(eval(make_if(bool_expr(false))), CqlValue::Integer(2));
    assert_eq!(eval(make_if(null_expr())), CqlValue::Integer(2));
}
