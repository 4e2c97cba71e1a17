// src/api/mod.rs
// HTTP surface: upload a CSV, download the scores

pub mod error;
pub mod score;

pub use error::{ApiError, ApiResult};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::scoring::{AnswerEvaluator, BatchScorer, RequiredColumns};

/// Shared state: the evaluator is cloned into a fresh scorer per request
pub struct AppState {
    evaluator: AnswerEvaluator,
    columns: RequiredColumns,
}

impl AppState {
    pub fn new(evaluator: AnswerEvaluator) -> Self {
        Self {
            evaluator,
            columns: RequiredColumns::default(),
        }
    }

    pub fn scorer(&self) -> BatchScorer {
        BatchScorer::new(self.evaluator.clone()).with_columns(self.columns.clone())
    }
}

/// Upload cap for `POST /score` (axum defaults to 2 MB)
pub const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(score::health_handler))
        .route("/score", post(score::score_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
