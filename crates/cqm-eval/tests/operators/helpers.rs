//! Shared helpers for constructing ELM expression nodes in tests

use cqm_elm::{
    BinaryExpression, Element, Expression, Library, Literal, NullLiteral, Statements,
    UnaryExpression, VersionedIdentifier,
};
use cqm_eval::{EvaluationContext, MeasureEngine, PatientRecord};
use cqm_terminology::ValueSetCatalog;
use serde_json::json;
use std::sync::Arc;

pub fn engine() -> MeasureEngine {
    MeasureEngine::new()
}

pub fn ctx() -> EvaluationContext {
    let library = Library {
        identifier: VersionedIdentifier {
            id: "OperatorTests".to_string(),
            system: None,
            version: None,
        },
        schema_identifier: None,
        usings: None,
        parameters: None,
        value_sets: None,
        statements: Some(Statements { defs: vec![] }),
    };
    let patient = PatientRecord::from_json(&json!({ "id": "1" })).unwrap();
    EvaluationContext::new(Arc::new(library), Arc::new(ValueSetCatalog::empty()), patient)
}

pub fn bool_expr(b: bool) -> Box<Expression> {
    Box::new(Expression::Literal(Literal {
        element: Element::default(),
        value_type: "{urn:hl7-org:elm-types:r1}Boolean".to_string(),
        value: Some(b.to_string()),
    }))
}

pub fn int_expr(i: i32) -> Box<Expression> {
    Box::new(Expression::Literal(Literal {
        element: Element::default(),
        value_type: "{urn:hl7-org:elm-types:r1}Integer".to_string(),
        value: Some(i.to_string()),
    }))
}

pub fn decimal_expr(text: &str) -> Box<Expression> {
    Box::new(Expression::Literal(Literal {
        element: Element::default(),
        value_type: "{urn:hl7-org:elm-types:r1}Decimal".to_string(),
        value: Some(text.to_string()),
    }))
}

pub fn string_expr(s: &str) -> Box<Expression> {
    Box::new(Expression::Literal(Literal {
        element: Element::default(),
        value_type: "{urn:hl7-org:elm-types:r1}String".to_string(),
        value: Some(s.to_string()),
    }))
}

pub fn null_expr() -> Box<Expression> {
    Box::new(Expression::Null(NullLiteral {
        element: Element::default(),
    }))
}

pub fn binary(left: Box<Expression>, right: Box<Expression>) -> BinaryExpression {
    BinaryExpression {
        element: Element::default(),
        operand: vec![left, right],
    }
}

pub fn unary(operand: Box<Expression>) -> UnaryExpression {
    UnaryExpression {
        element: Element::default(),
        operand,
    }
}
