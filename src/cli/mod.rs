//! Command runners behind the `screener` binary

pub mod score;
pub mod serve;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::classifier::HuggingFaceClassifier;
use crate::scoring::{AnswerEvaluator, Rubric};

/// Resolved classifier settings (CLI > env > config file > defaults)
#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    pub url: String,
    pub model: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
    pub rubric_path: Option<PathBuf>,
}

/// Build the production evaluator: Hugging Face classifier + rubric
pub fn build_evaluator(options: &ClassifierOptions) -> Result<AnswerEvaluator> {
    let rubric = match &options.rubric_path {
        Some(path) => {
            info!("Using rubric from {}", path.display());
            Rubric::from_file(path)?
        }
        None => Rubric::default(),
    };

    let classifier = HuggingFaceClassifier::new(&options.url, &options.model)
        .with_token(options.api_token.clone())
        .with_timeout(options.timeout);

    info!("Classifier: {} ({})", classifier.model(), classifier.endpoint());
    Ok(AnswerEvaluator::new(Arc::new(classifier), rubric))
}
