//! `screener serve`: HTTP upload/download surface

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::api::{AppState, create_router};
use crate::scoring::AnswerEvaluator;

pub async fn run(evaluator: AnswerEvaluator, host: &str, port: u16) -> Result<()> {
    let app = create_router(Arc::new(AppState::new(evaluator)));

    let bind_address = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;

    info!("Screener listening on http://{}", bind_address);
    info!("POST a CSV to /score to download {}", crate::table::RESULT_FILE_NAME);

    axum::serve(listener, app).await?;
    Ok(())
}
