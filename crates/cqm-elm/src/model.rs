//! ELM structures per the HL7 ELM specification, reduced to the node types
//! the measure engine evaluates.
//!
//! The shapes follow the ELM JSON schema: containers wrap their entries in a
//! `def` array, node kinds are discriminated by a `type` tag, and every node
//! may carry locator/result-type annotations (modeled by [`Element`]).

use serde::{Deserialize, Serialize};

// ============================================================================
// Library structure
// ============================================================================

/// ELM Library - the root element of a compiled measure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    /// Library identifier
    pub identifier: VersionedIdentifier,
    /// Schema identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_identifier: Option<VersionedIdentifier>,
    /// Data-model usings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usings: Option<UsingDefs>,
    /// Parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ParameterDefs>,
    /// Value set definitions (name -> id bindings used by InValueSet/Retrieve)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_sets: Option<ValueSetDefs>,
    /// Statements (named expression definitions)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statements: Option<Statements>,
}

impl Library {
    /// The statement definitions, or an empty slice when the collection
    /// exists but holds no defs.
    pub fn statement_defs(&self) -> &[ExpressionDef] {
        self.statements.as_ref().map_or(&[], |s| s.defs.as_slice())
    }

    /// Resolve a value-set name declared in this library to its OID/URL.
    pub fn value_set_id(&self, name: &str) -> Option<&str> {
        self.value_sets
            .as_ref()?
            .defs
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.id.as_str())
    }

    /// Find a parameter definition by name.
    pub fn parameter_def(&self, name: &str) -> Option<&ParameterDef> {
        self.parameters
            .as_ref()?
            .defs
            .iter()
            .find(|d| d.name == name)
    }
}

/// Versioned identifier for libraries and schemas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedIdentifier {
    /// Identifier
    pub id: String,
    /// System/namespace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

// ============================================================================
// Definition containers
// ============================================================================

/// Container for using definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsingDefs {
    #[serde(rename = "def")]
    pub defs: Vec<UsingDef>,
}

/// Container for parameter definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDefs {
    #[serde(rename = "def")]
    pub defs: Vec<ParameterDef>,
}

/// Container for value set definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueSetDefs {
    #[serde(rename = "def")]
    pub defs: Vec<ValueSetDef>,
}

/// Container for statements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statements {
    #[serde(rename = "def")]
    pub defs: Vec<ExpressionDef>,
}

// ============================================================================
// Definitions
// ============================================================================

/// Using definition (data model declaration)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsingDef {
    /// Local identifier
    pub local_identifier: String,
    /// Model URI
    pub uri: String,
    /// Model version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Parameter definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDef {
    /// Parameter name
    pub name: String,
    /// Access level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<AccessModifier>,
    /// Default value expression
    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_expr: Option<Box<Expression>>,
}

/// Value set definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetDef {
    /// Name (referenced by ValueSetRef)
    pub name: String,
    /// Value set OID/URL
    pub id: String,
    /// Version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Access level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<AccessModifier>,
}

/// Expression definition (a named statement)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionDef {
    /// Name
    pub name: String,
    /// Evaluation context (e.g. "Patient")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Access level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_level: Option<AccessModifier>,
    /// Expression body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<Box<Expression>>,
}

impl ExpressionDef {
    /// Whether this definition is externally visible (public statements are
    /// the ones a measure execution reports).
    pub fn is_public(&self) -> bool {
        self.access_level != Some(AccessModifier::Private)
    }
}

/// Access modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum AccessModifier {
    Public,
    Private,
}

// ============================================================================
// Base element
// ============================================================================

/// Base element for all ELM nodes
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Locator (source position)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<String>,
    /// Result type name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_type_name: Option<String>,
}

// ============================================================================
// Expressions
// ============================================================================

/// The ELM expression node types understood by the engine.
///
/// Deserialization is driven by the `type` tag; an ELM document containing a
/// node type outside this set fails at measure construction time, never
/// mid-evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    // === Literals ===
    Null(NullLiteral),
    Literal(Literal),

    // === References ===
    ExpressionRef(ExpressionRef),
    ParameterRef(ParameterRef),
    ValueSetRef(ValueSetRef),
    Property(Property),

    // === Logical (three-valued) ===
    And(BinaryExpression),
    Or(BinaryExpression),
    Xor(BinaryExpression),
    Implies(BinaryExpression),
    Not(UnaryExpression),

    // === Nullological ===
    IsNull(UnaryExpression),
    IsTrue(UnaryExpression),
    IsFalse(UnaryExpression),
    Coalesce(NaryExpression),
    If(IfExpression),

    // === Comparison ===
    Equal(BinaryExpression),
    NotEqual(BinaryExpression),
    Less(BinaryExpression),
    Greater(BinaryExpression),
    LessOrEqual(BinaryExpression),
    GreaterOrEqual(BinaryExpression),

    // === Arithmetic ===
    Add(BinaryExpression),
    Subtract(BinaryExpression),
    Multiply(BinaryExpression),
    Divide(BinaryExpression),
    Negate(UnaryExpression),

    // === String ===
    Concatenate(NaryExpression),

    // === List ===
    List(ListExpression),
    Exists(UnaryExpression),
    Count(UnaryExpression),
    First(FirstLastExpression),
    Last(FirstLastExpression),
    SingletonFrom(UnaryExpression),

    // === Clinical ===
    Retrieve(Retrieve),
    InValueSet(InValueSetExpression),
}

/// Null literal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NullLiteral {
    #[serde(flatten)]
    pub element: Element,
}

/// Literal value
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Literal {
    #[serde(flatten)]
    pub element: Element,
    /// Value type, possibly qualified (e.g. `{urn:hl7-org:elm-types:r1}Boolean`)
    pub value_type: String,
    /// The literal value as a string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Expression reference (a statement referencing another statement)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionRef {
    #[serde(flatten)]
    pub element: Element,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_name: Option<String>,
    pub name: String,
}

/// Parameter reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRef {
    #[serde(flatten)]
    pub element: Element,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_name: Option<String>,
    pub name: String,
}

/// Value set reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetRef {
    #[serde(flatten)]
    pub element: Element,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_name: Option<String>,
    pub name: String,
}

/// Property access
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(flatten)]
    pub element: Element,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Box<Expression>>,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Unary expression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnaryExpression {
    #[serde(flatten)]
    pub element: Element,
    pub operand: Box<Expression>,
}

/// Binary expression (ELM carries both operands in one array)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryExpression {
    #[serde(flatten)]
    pub element: Element,
    pub operand: Vec<Box<Expression>>,
}

/// N-ary expression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NaryExpression {
    #[serde(flatten)]
    pub element: Element,
    pub operand: Vec<Box<Expression>>,
}

/// If expression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfExpression {
    #[serde(flatten)]
    pub element: Element,
    pub condition: Box<Expression>,
    pub then: Box<Expression>,
    #[serde(rename = "else")]
    pub else_clause: Box<Expression>,
}

/// List constructor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListExpression {
    #[serde(flatten)]
    pub element: Element,
    #[serde(rename = "element", skip_serializing_if = "Option::is_none")]
    pub elements: Option<Vec<Box<Expression>>>,
}

/// First/Last expression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstLastExpression {
    #[serde(flatten)]
    pub element: Element,
    pub source: Box<Expression>,
}

/// Retrieve of clinical records from the patient context
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Retrieve {
    #[serde(flatten)]
    pub element: Element,
    /// Record type, possibly qualified (e.g. `{urn:healthit-gov:qdm:v5_3}Diagnosis`)
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Property on the record holding its code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_property: Option<String>,
    /// Terminology filter, typically a ValueSetRef
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codes: Option<Box<Expression>>,
}

/// Value set membership test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InValueSetExpression {
    #[serde(flatten)]
    pub element: Element,
    pub code: Box<Expression>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valueset: Option<ValueSetRef>,
}
