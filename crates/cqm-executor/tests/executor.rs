//! Executor contract tests: binding reuse, cohort normalization, result
//! shaping, wrapper equivalence, and failure propagation.

use cqm_elm::ElmError;
use cqm_executor::{ExecutorError, MeasureExecutor, execute_once};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

/// A minimal measure: one public statement evaluating to literal true.
fn example_elm() -> Value {
    json!({
        "library": {
            "identifier": { "id": "TestMeasure", "version": "1.0.0" },
            "schemaIdentifier": { "id": "urn:hl7-org:elm", "version": "r1" },
            "usings": {
                "def": [
                    { "localIdentifier": "System", "uri": "urn:hl7-org:elm-types:r1" },
                    { "localIdentifier": "QDM", "uri": "urn:healthit-gov:qdm:v5_3", "version": "5.3" }
                ]
            },
            "statements": {
                "def": [{
                    "name": "TestExpression",
                    "context": "Patient",
                    "accessLevel": "Public",
                    "expression": {
                        "type": "Literal",
                        "valueType": "{urn:hl7-org:elm-types:r1}Boolean",
                        "value": "true"
                    }
                }]
            }
        }
    })
}

fn example_patient() -> Value {
    json!({
        "id": "1",
        "recordType": "Patient",
        "name": "Test Patient",
        "gender": "M",
        "birthDate": "1980-01-01"
    })
}

#[tokio::test]
async fn single_patient_end_to_end() {
    let executor = MeasureExecutor::new(&example_elm(), &json!({})).unwrap();
    let results = executor.exec(&example_patient()).await.unwrap();

    assert_eq!(
        serde_json::to_value(&results).unwrap(),
        json!({ "1": { "TestExpression": true } })
    );
}

#[tokio::test]
async fn patient_batch_end_to_end() {
    let executor = MeasureExecutor::new(&example_elm(), &json!({})).unwrap();
    let patients = json!([{ "id": "1" }, { "id": "2" }]);
    let results = executor.exec(&patients).await.unwrap();

    assert_eq!(results.len(), 2);
    let ids: Vec<&str> = results.patient_ids().collect();
    assert_eq!(ids, vec!["1", "2"]);
    for id in ["1", "2"] {
        assert_eq!(
            results.patient(id).unwrap().get("TestExpression"),
            Some(&json!(true))
        );
    }
}

#[tokio::test]
async fn zero_statement_measure_yields_empty_statement_map() {
    let elm = json!({
        "library": {
            "identifier": { "id": "Empty" },
            "statements": { "def": [] }
        }
    });
    let executor = MeasureExecutor::new(&elm, &json!({})).unwrap();
    let results = executor.exec(&example_patient()).await.unwrap();

    assert_eq!(results.len(), 1);
    assert!(results.patient("1").unwrap().is_empty());
}

#[tokio::test]
async fn empty_cohort_yields_empty_result_not_an_error() {
    let executor = MeasureExecutor::new(&example_elm(), &json!({})).unwrap();
    let results = executor.exec(&json!([])).await.unwrap();
    assert!(results.is_empty());
    assert_eq!(serde_json::to_value(&results).unwrap(), json!({}));
}

#[tokio::test]
async fn executor_is_reusable_and_isolation_safe() {
    let executor = MeasureExecutor::new(&example_elm(), &json!({})).unwrap();

    let alone = executor.exec(&json!({ "id": "b" })).await.unwrap();
    executor.exec(&json!({ "id": "a" })).await.unwrap();
    let after_a = executor.exec(&json!({ "id": "b" })).await.unwrap();

    assert_eq!(alone, after_a);
}

#[tokio::test]
async fn duplicate_patient_ids_overwrite_result_slots() {
    let executor = MeasureExecutor::new(&example_elm(), &json!({})).unwrap();
    let results = executor
        .exec(&json!([{ "id": "1" }, { "id": "1" }]))
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn execute_once_is_equivalent_to_bind_then_exec() {
    let elm = example_elm();
    let patient = example_patient();
    let value_sets = json!({});

    let via_factory = MeasureExecutor::new(&elm, &value_sets)
        .unwrap()
        .exec(&patient)
        .await
        .unwrap();
    let via_once = execute_once(&elm, &patient, &value_sets).await.unwrap();

    assert_eq!(via_factory, via_once);
}

#[tokio::test]
async fn missing_identifier_fails_at_construction() {
    let elm = json!({
        "library": { "statements": { "def": [] } }
    });
    let err = MeasureExecutor::new(&elm, &json!({})).unwrap_err();
    assert!(matches!(
        err,
        ExecutorError::InvalidMeasure(ElmError::MissingIdentifier)
    ));
}

#[tokio::test]
async fn missing_statements_fails_at_construction() {
    let elm = json!({
        "library": { "identifier": { "id": "NoStatements" } }
    });
    let err = MeasureExecutor::new(&elm, &json!({})).unwrap_err();
    assert!(matches!(
        err,
        ExecutorError::InvalidMeasure(ElmError::MissingStatements)
    ));
}

#[tokio::test]
async fn malformed_value_sets_fail_at_construction() {
    let err = MeasureExecutor::new(&example_elm(), &json!("not an object")).unwrap_err();
    assert!(matches!(err, ExecutorError::InvalidValueSet(_)));
}

#[tokio::test]
async fn invalid_patient_input_is_rejected_before_evaluation() {
    let executor = MeasureExecutor::new(&example_elm(), &json!({})).unwrap();
    let err = executor.exec(&json!("not a patient")).await.unwrap_err();
    assert!(matches!(err, ExecutorError::InvalidInput { .. }));
}

#[tokio::test]
async fn evaluation_error_aborts_the_whole_cohort() {
    // Second statement references an undefined expression; the first patient
    // already trips it, and no partial results are returned.
    let elm = json!({
        "library": {
            "identifier": { "id": "Broken" },
            "statements": { "def": [
                {
                    "name": "Fine",
                    "expression": {
                        "type": "Literal",
                        "valueType": "{urn:hl7-org:elm-types:r1}Boolean",
                        "value": "true"
                    }
                },
                {
                    "name": "Dangling",
                    "expression": { "type": "ExpressionRef", "name": "Missing" }
                }
            ]}
        }
    });
    let executor = MeasureExecutor::new(&elm, &json!({})).unwrap();
    let err = executor
        .exec(&json!([{ "id": "1" }, { "id": "2" }]))
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutorError::Evaluation(_)));
}

#[tokio::test]
async fn terminology_dependent_measure_end_to_end() {
    let vs_id = "urn:oid:2.16.840.1.113883.3.464.1003.103.12.1001";
    let elm = json!({
        "library": {
            "identifier": { "id": "Diabetes", "version": "1.0.0" },
            "valueSets": { "def": [{ "name": "Diabetes", "id": vs_id }] },
            "statements": { "def": [{
                "name": "HasDiabetes",
                "context": "Patient",
                "expression": {
                    "type": "Exists",
                    "operand": {
                        "type": "Retrieve",
                        "dataType": "{urn:healthit-gov:qdm:v5_3}Diagnosis",
                        "codes": { "type": "ValueSetRef", "name": "Diabetes" }
                    }
                }
            }]}
        }
    });
    let value_sets = json!({
        vs_id: [{ "code": "E11.9", "system": "ICD-10-CM" }]
    });

    let executor = MeasureExecutor::new(&elm, &value_sets).unwrap();
    let results = executor
        .exec(&json!([
            {
                "id": "sick",
                "records": [
                    { "recordType": "Diagnosis",
                      "code": { "code": "E11.9", "system": "ICD-10-CM" } }
                ]
            },
            { "id": "healthy", "records": [] }
        ]))
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&results).unwrap(),
        json!({
            "sick": { "HasDiabetes": true },
            "healthy": { "HasDiabetes": false }
        })
    );
}
