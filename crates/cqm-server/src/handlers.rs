use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use cqm_executor::MeasureExecutor;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::ApiError;
use crate::registry::MeasureRegistry;

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "CQM Execution Service",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub async fn list_measures(State(registry): State<Arc<MeasureRegistry>>) -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "measures": registry.list() })))
}

pub async fn get_measure(
    State(registry): State<Arc<MeasureRegistry>>,
    Path(measure_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let executor = registry
        .get(&measure_id)
        .ok_or_else(|| ApiError::UnknownMeasure(measure_id.clone()))?;
    let definition = executor.definition();
    let body = json!({
        "measureId": measure_id,
        "libraryId": definition.id(),
        "libraryVersion": definition.version(),
        "statements": definition.statement_names(),
    });
    Ok((StatusCode::OK, Json(body)))
}

/// Evaluation request: either a registered measure by id, or an inline
/// bundle of compiled library plus value sets.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    pub measure_id: Option<String>,
    pub elm: Option<Value>,
    /// Omitted value sets mean an empty catalog
    #[serde(default = "empty_object")]
    pub value_sets: Value,
    pub patients: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

pub async fn evaluate(
    State(registry): State<Arc<MeasureRegistry>>,
    Json(request): Json<EvaluateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let executor = match (&request.measure_id, &request.elm) {
        (Some(id), _) => registry
            .get(id)
            .ok_or_else(|| ApiError::UnknownMeasure(id.clone()))?,
        (None, Some(elm)) => Arc::new(MeasureExecutor::new(elm, &request.value_sets)?),
        (None, None) => {
            return Err(ApiError::BadRequest(
                "request must supply either 'measureId' or 'elm'".to_string(),
            ));
        }
    };

    let results = executor.exec(&request.patients).await?;
    tracing::debug!(
        measure = executor.definition().id(),
        patients = results.len(),
        "measure evaluated"
    );
    Ok((StatusCode::OK, Json(results)))
}
