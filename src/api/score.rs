// src/api/score.rs
// CSV upload -> scored CSV download

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderName, HeaderValue, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::AppState;
use super::error::{ApiError, ApiResult};
use crate::scoring::BatchEvent;
use crate::table::{CSV_CONTENT_TYPE, RESULT_FILE_NAME};

/// Number of answer cells that fell back to the failure sentinel
pub const FAILURE_COUNT_HEADER: &str = "x-classification-failures";
/// `email (column): message` per failed cell, `; `-separated
pub const FAILURE_DETAILS_HEADER: &str = "x-classification-errors";

const MAX_DETAILS_LEN: usize = 8 * 1024;

/// POST /score
pub async fn score_handler(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Response> {
    info!("Score request: {} bytes", body.len());

    let (tx, mut rx) = mpsc::unbounded_channel();
    // The scorer (and its sender) is dropped with this statement
    let results = state.scorer().with_events(tx).score_csv(&body).await?;

    let mut failures = Vec::new();
    while let Some(event) = rx.recv().await {
        if let BatchEvent::CellFailed { email, column, message } = event {
            failures.push(format!("{} ({}): {}", email, column, message));
        }
    }

    let csv = results.to_csv_bytes().map_err(|e| {
        error!("Failed to serialize results: {}", e);
        ApiError::internal(format!("Failed to write results: {}", e))
    })?;

    let mut response = (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", RESULT_FILE_NAME),
            ),
        ],
        csv,
    )
        .into_response();

    let headers = response.headers_mut();
    headers.insert(
        HeaderName::from_static(FAILURE_COUNT_HEADER),
        HeaderValue::from(failures.len()),
    );
    if !failures.is_empty() {
        warn!("{} answer(s) could not be classified", failures.len());
        if let Ok(value) = HeaderValue::from_str(&failure_details(&failures)) {
            headers.insert(HeaderName::from_static(FAILURE_DETAILS_HEADER), value);
        }
    }

    Ok(response)
}

/// Header-safe summary: printable ASCII only, capped in length
pub fn failure_details(failures: &[String]) -> String {
    let mut details: String = failures
        .join("; ")
        .chars()
        .map(|c| if c == ' ' || c.is_ascii_graphic() { c } else { '?' })
        .collect();
    details.truncate(MAX_DETAILS_LEN);
    details
}

/// GET /health
pub async fn health_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
