//! Operator implementations over runtime values
//!
//! Logical operators implement CQL three-valued logic: `and` is
//! false-dominant, `or` is true-dominant, and null propagates everywhere a
//! result is genuinely unknown. Comparison and arithmetic operators return
//! null when either operand is null.

use crate::error::{EvalError, EvalResult};
use crate::value::CqlValue;
use rust_decimal::Decimal;
use std::cmp::Ordering;

// ============================================================================
// Logical operators (three-valued)
// ============================================================================

fn bool_operand(value: &CqlValue, operator: &str) -> EvalResult<Option<bool>> {
    match value {
        CqlValue::Null => Ok(None),
        CqlValue::Boolean(b) => Ok(Some(*b)),
        other => Err(EvalError::invalid_operand(
            operator,
            format!("expected Boolean, found {}", other.type_name()),
        )),
    }
}

fn from_tristate(value: Option<bool>) -> CqlValue {
    value.map_or(CqlValue::Null, CqlValue::Boolean)
}

/// `and`: false dominates null
pub fn cql_and(left: &CqlValue, right: &CqlValue) -> EvalResult<CqlValue> {
    let l = bool_operand(left, "And")?;
    let r = bool_operand(right, "And")?;
    Ok(from_tristate(match (l, r) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), Some(true)) => Some(true),
        _ => None,
    }))
}

/// `or`: true dominates null
pub fn cql_or(left: &CqlValue, right: &CqlValue) -> EvalResult<CqlValue> {
    let l = bool_operand(left, "Or")?;
    let r = bool_operand(right, "Or")?;
    Ok(from_tristate(match (l, r) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    }))
}

/// `xor`: null if either operand is null
pub fn cql_xor(left: &CqlValue, right: &CqlValue) -> EvalResult<CqlValue> {
    let l = bool_operand(left, "Xor")?;
    let r = bool_operand(right, "Xor")?;
    Ok(from_tristate(match (l, r) {
        (Some(a), Some(b)) => Some(a ^ b),
        _ => None,
    }))
}

/// `implies`: a false antecedent makes the implication true regardless of the
/// consequent; a true consequent makes it true regardless of the antecedent.
pub fn cql_implies(left: &CqlValue, right: &CqlValue) -> EvalResult<CqlValue> {
    let l = bool_operand(left, "Implies")?;
    let r = bool_operand(right, "Implies")?;
    Ok(from_tristate(match (l, r) {
        (Some(false), _) => Some(true),
        (_, Some(true)) => Some(true),
        (Some(true), Some(false)) => Some(false),
        _ => None,
    }))
}

/// `not`: null stays null
pub fn cql_not(operand: &CqlValue) -> EvalResult<CqlValue> {
    Ok(from_tristate(bool_operand(operand, "Not")?.map(|b| !b)))
}

// ============================================================================
// Comparison operators
// ============================================================================

fn as_decimal(value: &CqlValue) -> Option<Decimal> {
    match value {
        CqlValue::Integer(i) => Some(Decimal::from(*i)),
        CqlValue::Long(l) => Some(Decimal::from(*l)),
        CqlValue::Decimal(d) => Some(*d),
        _ => None,
    }
}

/// Equality with null propagation. Numeric operands of different widths
/// compare by value.
pub fn cql_equal(left: &CqlValue, right: &CqlValue) -> EvalResult<CqlValue> {
    if left.is_null() || right.is_null() {
        return Ok(CqlValue::Null);
    }
    if let (Some(a), Some(b)) = (as_decimal(left), as_decimal(right)) {
        return Ok(CqlValue::Boolean(a == b));
    }
    match (left, right) {
        (CqlValue::Boolean(a), CqlValue::Boolean(b)) => Ok(CqlValue::Boolean(a == b)),
        (CqlValue::String(a), CqlValue::String(b)) => Ok(CqlValue::Boolean(a == b)),
        (CqlValue::Date(a), CqlValue::Date(b)) => Ok(CqlValue::Boolean(a == b)),
        (CqlValue::Code(a), CqlValue::Code(b)) => Ok(CqlValue::Boolean(a == b)),
        (CqlValue::Resource(a), CqlValue::Resource(b)) => Ok(CqlValue::Boolean(a == b)),
        (CqlValue::List(a), CqlValue::List(b)) => {
            if a.len() != b.len() {
                return Ok(CqlValue::Boolean(false));
            }
            let mut unknown = false;
            for (x, y) in a.iter().zip(b) {
                match cql_equal(x, y)? {
                    CqlValue::Boolean(false) => return Ok(CqlValue::Boolean(false)),
                    CqlValue::Null => unknown = true,
                    _ => {}
                }
            }
            Ok(if unknown {
                CqlValue::Null
            } else {
                CqlValue::Boolean(true)
            })
        }
        _ => Err(EvalError::unsupported_operator(
            "Equal",
            format!("{}, {}", left.type_name(), right.type_name()),
        )),
    }
}

/// Ordering comparison for Less/Greater and friends. `None` means the
/// comparison involves null and the result is unknown.
pub fn cql_compare(
    operator: &str,
    left: &CqlValue,
    right: &CqlValue,
) -> EvalResult<Option<Ordering>> {
    if left.is_null() || right.is_null() {
        return Ok(None);
    }
    if let (Some(a), Some(b)) = (as_decimal(left), as_decimal(right)) {
        return Ok(Some(a.cmp(&b)));
    }
    match (left, right) {
        (CqlValue::String(a), CqlValue::String(b)) => Ok(Some(a.cmp(b))),
        (CqlValue::Date(a), CqlValue::Date(b)) => Ok(Some(a.cmp(b))),
        _ => Err(EvalError::unsupported_operator(
            operator,
            format!("{}, {}", left.type_name(), right.type_name()),
        )),
    }
}

// ============================================================================
// Arithmetic operators
// ============================================================================

fn arith(
    operator: &'static str,
    left: &CqlValue,
    right: &CqlValue,
    int_op: fn(i32, i32) -> Option<i32>,
    long_op: fn(i64, i64) -> Option<i64>,
    dec_op: fn(Decimal, Decimal) -> Option<Decimal>,
) -> EvalResult<CqlValue> {
    match (left, right) {
        (CqlValue::Null, _) | (_, CqlValue::Null) => Ok(CqlValue::Null),
        (CqlValue::Integer(a), CqlValue::Integer(b)) => int_op(*a, *b)
            .map(CqlValue::Integer)
            .ok_or_else(|| EvalError::overflow(operator)),
        (CqlValue::Long(a), CqlValue::Long(b)) => long_op(*a, *b)
            .map(CqlValue::Long)
            .ok_or_else(|| EvalError::overflow(operator)),
        (CqlValue::Integer(a), CqlValue::Long(b)) => long_op(i64::from(*a), *b)
            .map(CqlValue::Long)
            .ok_or_else(|| EvalError::overflow(operator)),
        (CqlValue::Long(a), CqlValue::Integer(b)) => long_op(*a, i64::from(*b))
            .map(CqlValue::Long)
            .ok_or_else(|| EvalError::overflow(operator)),
        _ => match (as_decimal(left), as_decimal(right)) {
            (Some(a), Some(b)) => dec_op(a, b)
                .map(CqlValue::Decimal)
                .ok_or_else(|| EvalError::overflow(operator)),
            _ => Err(EvalError::unsupported_operator(
                operator,
                format!("{}, {}", left.type_name(), right.type_name()),
            )),
        },
    }
}

/// Addition with null propagation and checked overflow
pub fn cql_add(left: &CqlValue, right: &CqlValue) -> EvalResult<CqlValue> {
    arith(
        "Add",
        left,
        right,
        i32::checked_add,
        i64::checked_add,
        Decimal::checked_add,
    )
}

/// Subtraction with null propagation and checked overflow
pub fn cql_subtract(left: &CqlValue, right: &CqlValue) -> EvalResult<CqlValue> {
    arith(
        "Subtract",
        left,
        right,
        i32::checked_sub,
        i64::checked_sub,
        Decimal::checked_sub,
    )
}

/// Multiplication with null propagation and checked overflow
pub fn cql_multiply(left: &CqlValue, right: &CqlValue) -> EvalResult<CqlValue> {
    arith(
        "Multiply",
        left,
        right,
        i32::checked_mul,
        i64::checked_mul,
        Decimal::checked_mul,
    )
}

/// Division always produces a Decimal; a zero divisor yields null per CQL.
pub fn cql_divide(left: &CqlValue, right: &CqlValue) -> EvalResult<CqlValue> {
    if left.is_null() || right.is_null() {
        return Ok(CqlValue::Null);
    }
    match (as_decimal(left), as_decimal(right)) {
        (Some(_), Some(b)) if b.is_zero() => Ok(CqlValue::Null),
        (Some(a), Some(b)) => a
            .checked_div(b)
            .map(CqlValue::Decimal)
            .ok_or_else(|| EvalError::overflow("Divide")),
        _ => Err(EvalError::unsupported_operator(
            "Divide",
            format!("{}, {}", left.type_name(), right.type_name()),
        )),
    }
}

/// Numeric negation with null propagation
pub fn cql_negate(operand: &CqlValue) -> EvalResult<CqlValue> {
    match operand {
        CqlValue::Null => Ok(CqlValue::Null),
        CqlValue::Integer(i) => i
            .checked_neg()
            .map(CqlValue::Integer)
            .ok_or_else(|| EvalError::overflow("Negate")),
        CqlValue::Long(l) => l
            .checked_neg()
            .map(CqlValue::Long)
            .ok_or_else(|| EvalError::overflow("Negate")),
        CqlValue::Decimal(d) => Ok(CqlValue::Decimal(-*d)),
        other => Err(EvalError::unsupported_operator("Negate", other.type_name())),
    }
}

// ============================================================================
// String operators
// ============================================================================

/// Concatenation over any number of operands; any null yields null.
pub fn cql_concatenate(operands: &[CqlValue]) -> EvalResult<CqlValue> {
    let mut out = String::new();
    for operand in operands {
        match operand {
            CqlValue::Null => return Ok(CqlValue::Null),
            CqlValue::String(s) => out.push_str(s),
            other => {
                return Err(EvalError::invalid_operand(
                    "Concatenate",
                    format!("expected String, found {}", other.type_name()),
                ));
            }
        }
    }
    Ok(CqlValue::String(out))
}
