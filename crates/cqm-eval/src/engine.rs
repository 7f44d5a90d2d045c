//! Measure evaluation engine
//!
//! [`MeasureEngine`] dispatches ELM expression nodes to their operator
//! implementations. Binding an engine to a library and a value-set catalog
//! yields a [`BoundMeasure`], the reusable execution unit: it owns the shared
//! read-only artifacts and evaluates them against any number of patient
//! sources.

use crate::context::EvaluationContext;
use crate::error::{EvalError, EvalResult};
use crate::operators;
use crate::patient::{PatientRecord, PatientSource};
use crate::value::CqlValue;
use chrono::NaiveDate;
use cqm_elm::{
    BinaryExpression, Expression, ExpressionRef, FirstLastExpression, IfExpression,
    InValueSetExpression, Library, ListExpression, Literal, NaryExpression, ParameterRef, Property,
    Retrieve, UnaryExpression, ValueSetRef,
};
use cqm_terminology::{Code, ValueSetCatalog};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

/// The expression evaluation engine.
///
/// The engine itself is stateless; all evaluation state lives in the
/// [`EvaluationContext`] passed to each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeasureEngine;

/// A measure library bound to its value-set catalog.
///
/// Construction is the expensive step; the bound measure is immutable and
/// reentrant, so one instance serves any number of concurrent executions.
#[derive(Debug)]
pub struct BoundMeasure {
    engine: MeasureEngine,
    library: Arc<Library>,
    catalog: Arc<ValueSetCatalog>,
}

impl MeasureEngine {
    /// Create a new engine
    pub fn new() -> Self {
        Self
    }

    /// Bind a library and value-set catalog into a reusable execution unit.
    pub fn bind(self, library: Arc<Library>, catalog: Arc<ValueSetCatalog>) -> BoundMeasure {
        BoundMeasure {
            engine: self,
            library,
            catalog,
        }
    }

    /// Evaluate every public statement of the library for the patient held by
    /// the context, memoizing cross-references within this patient only.
    pub fn evaluate_patient(
        &self,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<IndexMap<String, CqlValue>> {
        let library = Arc::clone(ctx.library());
        let mut results = IndexMap::new();
        for def in library.statement_defs() {
            if !def.is_public() || def.expression.is_none() {
                continue;
            }
            let value = self.evaluate_statement(&library, &def.name, ctx)?;
            results.insert(def.name.clone(), value);
        }
        Ok(results)
    }

    /// Evaluate a single statement by name, memoized per patient.
    pub fn evaluate_statement(
        &self,
        library: &Library,
        name: &str,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<CqlValue> {
        let cache_key = format!("{}:{}", library.identifier.id, name);
        if let Some(cached) = ctx.get_cached(&cache_key) {
            return Ok(cached);
        }

        let def = library
            .statement_defs()
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| EvalError::undefined_expression(name))?;
        let expr = def
            .expression
            .as_ref()
            .ok_or_else(|| EvalError::undefined_expression(name))?;

        let value = self.evaluate(expr, ctx)?;
        ctx.cache_result(cache_key, value.clone());
        Ok(value)
    }

    /// Main expression evaluation dispatcher.
    pub fn evaluate(&self, expr: &Expression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        if !ctx.enter_recursion() {
            return Err(EvalError::RecursionLimit);
        }

        let result = match expr {
            // === Literals ===
            Expression::Null(_) => Ok(CqlValue::Null),
            Expression::Literal(lit) => self.eval_literal(lit),

            // === References ===
            Expression::ExpressionRef(r) => self.eval_expression_ref(r, ctx),
            Expression::ParameterRef(r) => self.eval_parameter_ref(r, ctx),
            Expression::ValueSetRef(r) => self.eval_valueset_ref(r, ctx),
            Expression::Property(p) => self.eval_property(p, ctx),

            // === Logical ===
            Expression::And(e) => self.eval_binary(e, ctx, operators::cql_and),
            Expression::Or(e) => self.eval_binary(e, ctx, operators::cql_or),
            Expression::Xor(e) => self.eval_binary(e, ctx, operators::cql_xor),
            Expression::Implies(e) => self.eval_binary(e, ctx, operators::cql_implies),
            Expression::Not(e) => {
                let operand = self.evaluate(&e.operand, ctx)?;
                operators::cql_not(&operand)
            }

            // === Nullological ===
            Expression::IsNull(e) => self.eval_unary_predicate(e, ctx, |v| v.is_null()),
            Expression::IsTrue(e) => {
                self.eval_unary_predicate(e, ctx, |v| v.as_boolean() == Some(true))
            }
            Expression::IsFalse(e) => {
                self.eval_unary_predicate(e, ctx, |v| v.as_boolean() == Some(false))
            }
            Expression::Coalesce(e) => self.eval_coalesce(e, ctx),
            Expression::If(e) => self.eval_if(e, ctx),

            // === Comparison ===
            Expression::Equal(e) => self.eval_binary(e, ctx, operators::cql_equal),
            Expression::NotEqual(e) => {
                let equal = self.eval_binary(e, ctx, operators::cql_equal)?;
                operators::cql_not(&equal)
            }
            Expression::Less(e) => self.eval_comparison(e, ctx, "Less", Ordering::is_lt),
            Expression::Greater(e) => self.eval_comparison(e, ctx, "Greater", Ordering::is_gt),
            Expression::LessOrEqual(e) => {
                self.eval_comparison(e, ctx, "LessOrEqual", Ordering::is_le)
            }
            Expression::GreaterOrEqual(e) => {
                self.eval_comparison(e, ctx, "GreaterOrEqual", Ordering::is_ge)
            }

            // === Arithmetic ===
            Expression::Add(e) => self.eval_binary(e, ctx, operators::cql_add),
            Expression::Subtract(e) => self.eval_binary(e, ctx, operators::cql_subtract),
            Expression::Multiply(e) => self.eval_binary(e, ctx, operators::cql_multiply),
            Expression::Divide(e) => self.eval_binary(e, ctx, operators::cql_divide),
            Expression::Negate(e) => {
                let operand = self.evaluate(&e.operand, ctx)?;
                operators::cql_negate(&operand)
            }

            // === String ===
            Expression::Concatenate(e) => self.eval_concatenate(e, ctx),

            // === List ===
            Expression::List(e) => self.eval_list_constructor(e, ctx),
            Expression::Exists(e) => self.eval_exists(e, ctx),
            Expression::Count(e) => self.eval_count(e, ctx),
            Expression::First(e) => self.eval_first_last(e, ctx, true),
            Expression::Last(e) => self.eval_first_last(e, ctx, false),
            Expression::SingletonFrom(e) => self.eval_singleton_from(e, ctx),

            // === Clinical ===
            Expression::Retrieve(r) => self.eval_retrieve(r, ctx),
            Expression::InValueSet(e) => self.eval_in_value_set(e, ctx),
        };

        ctx.exit_recursion();
        result
    }

    // =========================================================================
    // Literal evaluation
    // =========================================================================

    fn eval_literal(&self, lit: &Literal) -> EvalResult<CqlValue> {
        let value_str = match &lit.value {
            Some(v) => v.as_str(),
            None => return Ok(CqlValue::Null),
        };

        // Handle qualified type names like "{urn:hl7-org:elm-types:r1}Boolean"
        let simple_type = lit.value_type.rsplit('}').next().unwrap_or(&lit.value_type);

        match simple_type {
            "Boolean" => value_str
                .parse::<bool>()
                .map(CqlValue::Boolean)
                .map_err(|_| EvalError::conversion_error(value_str, "Boolean")),
            "Integer" => value_str
                .parse::<i32>()
                .map(CqlValue::Integer)
                .map_err(|_| EvalError::conversion_error(value_str, "Integer")),
            "Long" => value_str
                .parse::<i64>()
                .map(CqlValue::Long)
                .map_err(|_| EvalError::conversion_error(value_str, "Long")),
            "Decimal" => Decimal::from_str(value_str)
                .map(CqlValue::Decimal)
                .map_err(|_| EvalError::conversion_error(value_str, "Decimal")),
            "String" => Ok(CqlValue::String(value_str.to_string())),
            "Date" => NaiveDate::parse_from_str(value_str, "%Y-%m-%d")
                .map(CqlValue::Date)
                .map_err(|_| EvalError::conversion_error(value_str, "Date")),
            _ => Err(EvalError::unsupported_expression(format!(
                "Literal type: {}",
                lit.value_type
            ))),
        }
    }

    // =========================================================================
    // References
    // =========================================================================

    fn eval_expression_ref(
        &self,
        r: &ExpressionRef,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<CqlValue> {
        let library = Arc::clone(ctx.library());
        self.evaluate_statement(&library, &r.name, ctx)
    }

    fn eval_parameter_ref(
        &self,
        r: &ParameterRef,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<CqlValue> {
        if let Some(value) = ctx.get_parameter(&r.name) {
            return Ok(value.clone());
        }

        // Fall back to the library-declared default
        let library = Arc::clone(ctx.library());
        let default = library
            .parameter_def(&r.name)
            .and_then(|def| def.default_expr.as_deref());
        match default {
            Some(expr) => self.evaluate(expr, ctx),
            None => Err(EvalError::undefined_parameter(&r.name)),
        }
    }

    fn eval_valueset_ref(
        &self,
        r: &ValueSetRef,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<CqlValue> {
        let id = ctx.resolve_value_set(&r.name)?;
        Ok(CqlValue::String(id.to_string()))
    }

    fn eval_property(&self, p: &Property, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        let source = match (&p.source, &p.scope) {
            (Some(src), _) => self.evaluate(src, ctx)?,
            (None, Some(scope)) => {
                return Err(EvalError::unsupported_expression(format!(
                    "Property scope: {scope}"
                )));
            }
            // No source and no scope: the property addresses the patient
            // record in the current context.
            (None, None) => CqlValue::Resource(ctx.patient().data().clone()),
        };
        self.get_property_value(&source, &p.path)
    }

    fn get_property_value(&self, value: &CqlValue, path: &str) -> EvalResult<CqlValue> {
        match value {
            CqlValue::Null => Ok(CqlValue::Null),
            CqlValue::Resource(json) => Ok(json
                .get(path)
                .map_or(CqlValue::Null, CqlValue::from_json)),
            CqlValue::Code(code) => match path {
                "code" => Ok(CqlValue::String(code.code.clone())),
                "system" => Ok(code
                    .system
                    .clone()
                    .map_or(CqlValue::Null, CqlValue::String)),
                "display" => Ok(code
                    .display
                    .clone()
                    .map_or(CqlValue::Null, CqlValue::String)),
                _ => Err(EvalError::invalid_property(path, "Code")),
            },
            // Project the property across list elements
            CqlValue::List(items) => {
                let projected = items
                    .iter()
                    .map(|item| self.get_property_value(item, path))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(CqlValue::List(projected))
            }
            other => Err(EvalError::invalid_property(path, other.type_name())),
        }
    }

    // =========================================================================
    // Operator plumbing
    // =========================================================================

    fn binary_operands(
        &self,
        e: &BinaryExpression,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<(CqlValue, CqlValue)> {
        if e.operand.len() != 2 {
            return Err(EvalError::internal(format!(
                "binary operator with {} operands",
                e.operand.len()
            )));
        }
        let left = self.evaluate(&e.operand[0], ctx)?;
        let right = self.evaluate(&e.operand[1], ctx)?;
        Ok((left, right))
    }

    fn eval_binary(
        &self,
        e: &BinaryExpression,
        ctx: &mut EvaluationContext,
        op: fn(&CqlValue, &CqlValue) -> EvalResult<CqlValue>,
    ) -> EvalResult<CqlValue> {
        let (left, right) = self.binary_operands(e, ctx)?;
        op(&left, &right)
    }

    fn eval_comparison(
        &self,
        e: &BinaryExpression,
        ctx: &mut EvaluationContext,
        operator: &str,
        accept: fn(Ordering) -> bool,
    ) -> EvalResult<CqlValue> {
        let (left, right) = self.binary_operands(e, ctx)?;
        Ok(operators::cql_compare(operator, &left, &right)?
            .map_or(CqlValue::Null, |ord| CqlValue::Boolean(accept(ord))))
    }

    fn eval_unary_predicate(
        &self,
        e: &UnaryExpression,
        ctx: &mut EvaluationContext,
        predicate: fn(&CqlValue) -> bool,
    ) -> EvalResult<CqlValue> {
        let operand = self.evaluate(&e.operand, ctx)?;
        Ok(CqlValue::Boolean(predicate(&operand)))
    }

    fn eval_coalesce(&self, e: &NaryExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        for operand in &e.operand {
            let value = self.evaluate(operand, ctx)?;
            if !value.is_null() {
                return Ok(value);
            }
        }
        Ok(CqlValue::Null)
    }

    fn eval_if(&self, e: &IfExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        let condition = self.evaluate(&e.condition, ctx)?;
        // A null condition selects the else branch, per CQL
        if condition.as_boolean() == Some(true) {
            self.evaluate(&e.then, ctx)
        } else {
            self.evaluate(&e.else_clause, ctx)
        }
    }

    fn eval_concatenate(
        &self,
        e: &NaryExpression,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<CqlValue> {
        let operands = e
            .operand
            .iter()
            .map(|op| self.evaluate(op, ctx))
            .collect::<EvalResult<Vec<_>>>()?;
        operators::cql_concatenate(&operands)
    }

    // =========================================================================
    // List operators
    // =========================================================================

    fn eval_list_constructor(
        &self,
        e: &ListExpression,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<CqlValue> {
        let elements = match &e.elements {
            Some(elements) => elements
                .iter()
                .map(|el| self.evaluate(el, ctx))
                .collect::<EvalResult<Vec<_>>>()?,
            None => vec![],
        };
        Ok(CqlValue::List(elements))
    }

    fn eval_exists(&self, e: &UnaryExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        let operand = self.evaluate(&e.operand, ctx)?;
        match operand {
            CqlValue::Null => Ok(CqlValue::Boolean(false)),
            CqlValue::List(items) => {
                Ok(CqlValue::Boolean(items.iter().any(|v| !v.is_null())))
            }
            other => Err(EvalError::invalid_operand(
                "Exists",
                format!("expected List, found {}", other.type_name()),
            )),
        }
    }

    fn eval_count(&self, e: &UnaryExpression, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        let operand = self.evaluate(&e.operand, ctx)?;
        match operand {
            // Count of null is 0, per CQL
            CqlValue::Null => Ok(CqlValue::Integer(0)),
            CqlValue::List(items) => {
                let count = items.iter().filter(|v| !v.is_null()).count();
                i32::try_from(count)
                    .map(CqlValue::Integer)
                    .map_err(|_| EvalError::overflow("Count"))
            }
            other => Err(EvalError::invalid_operand(
                "Count",
                format!("expected List, found {}", other.type_name()),
            )),
        }
    }

    fn eval_first_last(
        &self,
        e: &FirstLastExpression,
        ctx: &mut EvaluationContext,
        first: bool,
    ) -> EvalResult<CqlValue> {
        let source = self.evaluate(&e.source, ctx)?;
        match source {
            CqlValue::Null => Ok(CqlValue::Null),
            CqlValue::List(items) => Ok(if first {
                items.into_iter().next()
            } else {
                items.into_iter().next_back()
            }
            .unwrap_or(CqlValue::Null)),
            other => Err(EvalError::invalid_operand(
                if first { "First" } else { "Last" },
                format!("expected List, found {}", other.type_name()),
            )),
        }
    }

    fn eval_singleton_from(
        &self,
        e: &UnaryExpression,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<CqlValue> {
        let operand = self.evaluate(&e.operand, ctx)?;
        match operand {
            CqlValue::Null => Ok(CqlValue::Null),
            CqlValue::List(mut items) => match items.len() {
                0 => Ok(CqlValue::Null),
                1 => Ok(items.remove(0)),
                n => Err(EvalError::invalid_operand(
                    "SingletonFrom",
                    format!("list has {n} elements"),
                )),
            },
            other => Err(EvalError::invalid_operand(
                "SingletonFrom",
                format!("expected List, found {}", other.type_name()),
            )),
        }
    }

    // =========================================================================
    // Clinical operators
    // =========================================================================

    fn eval_retrieve(&self, r: &Retrieve, ctx: &mut EvaluationContext) -> EvalResult<CqlValue> {
        // Qualified type names like "{urn:healthit-gov:qdm:v5_3}Diagnosis"
        let data_type = r.data_type.rsplit('}').next().unwrap_or(&r.data_type);

        let value_set_id = match &r.codes {
            Some(codes) => match codes.as_ref() {
                Expression::ValueSetRef(vs) => Some(ctx.resolve_value_set(&vs.name)?.to_string()),
                other => match self.evaluate(other, ctx)? {
                    CqlValue::String(id) => Some(id),
                    value => {
                        return Err(EvalError::invalid_operand(
                            "Retrieve",
                            format!("codes must name a value set, found {}", value.type_name()),
                        ));
                    }
                },
            },
            None => None,
        };
        let code_property = r.code_property.as_deref().unwrap_or("code");

        let mut matched = Vec::new();
        for entry in ctx.patient().entries() {
            let kind = entry
                .get("recordType")
                .or_else(|| entry.get("resourceType"))
                .and_then(JsonValue::as_str);
            if kind != Some(data_type) {
                continue;
            }
            if let Some(vs_id) = &value_set_id {
                let codes = extract_codes(entry.get(code_property));
                if !codes.iter().any(|code| ctx.catalog().contains(vs_id, code)) {
                    continue;
                }
            }
            matched.push(CqlValue::Resource(entry.clone()));
        }

        tracing::debug!(
            data_type,
            matched = matched.len(),
            "retrieved patient records"
        );
        Ok(CqlValue::List(matched))
    }

    fn eval_in_value_set(
        &self,
        e: &InValueSetExpression,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<CqlValue> {
        let vs = e.valueset.as_ref().ok_or_else(|| {
            EvalError::invalid_operand("InValueSet", "missing valueset reference")
        })?;
        let vs_id = ctx.resolve_value_set(&vs.name)?.to_string();

        let codes = match self.evaluate(&e.code, ctx)? {
            CqlValue::Null => return Ok(CqlValue::Null),
            CqlValue::Code(code) => vec![code],
            CqlValue::String(raw) => vec![Code {
                code: raw,
                system: None,
                version: None,
                display: None,
            }],
            // Code objects read off a patient record arrive as opaque JSON
            CqlValue::Resource(json) => {
                let codes = extract_codes(Some(&json));
                if codes.is_empty() {
                    return Err(EvalError::invalid_operand(
                        "InValueSet",
                        "object carries no recognizable code",
                    ));
                }
                codes
            }
            other => {
                return Err(EvalError::invalid_operand(
                    "InValueSet",
                    format!("expected Code or String, found {}", other.type_name()),
                ));
            }
        };

        Ok(CqlValue::Boolean(
            codes
                .iter()
                .any(|code| ctx.catalog().contains(&vs_id, code)),
        ))
    }
}

impl BoundMeasure {
    /// The bound library
    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }

    /// The bound value-set catalog
    pub fn catalog(&self) -> &Arc<ValueSetCatalog> {
        &self.catalog
    }

    /// Evaluate every public statement for every patient in the source.
    ///
    /// Each patient gets a fresh context, so no evaluation state crosses
    /// patients. The first evaluation error aborts the whole execution; no
    /// partial results are returned.
    pub fn exec(
        &self,
        source: &PatientSource,
    ) -> EvalResult<IndexMap<String, IndexMap<String, CqlValue>>> {
        let mut results = IndexMap::with_capacity(source.len());
        for record in source.iter() {
            let values = self.exec_patient(record)?;
            // Duplicate identifiers overwrite earlier result slots
            results.insert(record.id().to_string(), values);
        }
        Ok(results)
    }

    /// Evaluate all public statements for one patient record.
    pub fn exec_patient(
        &self,
        record: &PatientRecord,
    ) -> EvalResult<IndexMap<String, CqlValue>> {
        let mut ctx = EvaluationContext::new(
            Arc::clone(&self.library),
            Arc::clone(&self.catalog),
            record.clone(),
        );
        self.engine.evaluate_patient(&mut ctx)
    }
}

/// Extract clinical codes from a record property: a bare string, a code
/// object, a FHIR CodeableConcept (`coding` array), or an array of any of
/// those.
fn extract_codes(value: Option<&JsonValue>) -> Vec<Code> {
    let Some(value) = value else {
        return vec![];
    };
    match value {
        JsonValue::String(s) => vec![Code {
            code: s.clone(),
            system: None,
            version: None,
            display: None,
        }],
        JsonValue::Array(items) => items
            .iter()
            .flat_map(|item| extract_codes(Some(item)))
            .collect(),
        JsonValue::Object(obj) => {
            if let Some(coding) = obj.get("coding") {
                return extract_codes(Some(coding));
            }
            match serde_json::from_value::<Code>(value.clone()) {
                Ok(code) => vec![code],
                Err(_) => vec![],
            }
        }
        _ => vec![],
    }
}
