//! Hugging Face Inference API zero-shot classifier
//!
//! Calls the hosted `zero-shot-classification` task for an NLI model
//! (`facebook/bart-large-mnli` by default).

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{Classification, ClassificationError, Classifier};

pub const DEFAULT_CLASSIFIER_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "facebook/bart-large-mnli";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Zero-shot classifier backed by the Hugging Face Inference API
#[derive(Clone)]
pub struct HuggingFaceClassifier {
    client: HttpClient,
    base_url: String,
    model: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl HuggingFaceClassifier {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: HttpClient::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Attach a bearer token (`HF_API_TOKEN`)
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.api_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full model endpoint, e.g. `https://api-inference.huggingface.co/models/facebook/bart-large-mnli`
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url.trim_end_matches('/'), self.model)
    }
}

#[async_trait]
impl Classifier for HuggingFaceClassifier {
    async fn classify(
        &self,
        text: &str,
        labels: &[&str],
    ) -> Result<Classification, ClassificationError> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: labels,
            },
        };

        let mut builder = self
            .client
            .post(self.endpoint())
            .json(&request)
            .timeout(self.timeout);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClassificationError::Api { status, body });
        }

        let body = response.text().await?;
        let parsed: ZeroShotResponse = serde_json::from_str(&body)
            .map_err(|e| ClassificationError::MalformedResponse(e.to_string()))?;

        let classification = top_label(parsed, labels)?;
        debug!(
            "{} -> {} ({:.2})",
            self.model, classification.label, classification.confidence
        );
        Ok(classification)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
}

/// The legacy endpoint answers with parallel `labels`/`scores` arrays, the
/// router endpoint with a list of `{label, score}` pairs.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum ZeroShotResponse {
    Columns { labels: Vec<String>, scores: Vec<f64> },
    Pairs(Vec<LabelScore>),
    Error { error: String },
}

#[derive(Deserialize, Debug)]
struct LabelScore {
    label: String,
    score: f64,
}

/// Reduce a response to its highest-scoring label
fn top_label(
    response: ZeroShotResponse,
    labels: &[&str],
) -> Result<Classification, ClassificationError> {
    let pairs: Vec<(String, f64)> = match response {
        ZeroShotResponse::Columns { labels, scores } => {
            if labels.len() != scores.len() {
                return Err(ClassificationError::MalformedResponse(format!(
                    "{} labels but {} scores",
                    labels.len(),
                    scores.len()
                )));
            }
            labels.into_iter().zip(scores).collect()
        }
        ZeroShotResponse::Pairs(pairs) => pairs.into_iter().map(|p| (p.label, p.score)).collect(),
        ZeroShotResponse::Error { error } => return Err(ClassificationError::Other(error)),
    };

    let (label, score) = pairs
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or_else(|| ClassificationError::MalformedResponse("empty result".to_string()))?;

    if !labels.contains(&label.as_str()) {
        return Err(ClassificationError::UnknownLabel(label));
    }
    if !(0.0..=1.0).contains(&score) {
        return Err(ClassificationError::MalformedResponse(format!(
            "score {} out of range",
            score
        )));
    }

    Ok(Classification::new(label, score))
}
