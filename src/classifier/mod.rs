//! Zero-shot text classification behind a narrow request/response contract
//!
//! The batch scorer never talks to a model directly. It hands a text and a
//! candidate label set to a [`Classifier`] and gets back the single best
//! label plus a confidence in `[0, 1]`.

mod huggingface;

pub use huggingface::{DEFAULT_CLASSIFIER_MODEL, DEFAULT_CLASSIFIER_URL, HuggingFaceClassifier};

use async_trait::async_trait;

/// Label for answers judged machine-generated
pub const AI_LABEL: &str = "AI";
/// Label for answers judged human-written
pub const HUMAN_LABEL: &str = "Human";
/// Candidate label set, in the order it is sent to the classifier
pub const CANDIDATE_LABELS: [&str; 2] = [AI_LABEL, HUMAN_LABEL];

/// Top label chosen by a classifier and its score
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: f64,
}

impl Classification {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Error types for a single classification attempt
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("Classifier API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed classifier response: {0}")]
    MalformedResponse(String),

    #[error("Classifier returned label '{0}' outside the candidate set")]
    UnknownLabel(String),

    #[error("Classifier error: {0}")]
    Other(String),
}

/// A zero-shot classifier
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Pick exactly one label from `labels` for `text`
    async fn classify(
        &self,
        text: &str,
        labels: &[&str],
    ) -> Result<Classification, ClassificationError>;

    /// Name used in logs
    fn name(&self) -> &str;
}
