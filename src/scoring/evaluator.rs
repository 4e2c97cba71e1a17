//! Answer evaluation: rubric + answer -> classifier -> scored label

use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

use super::rubric::Rubric;
use crate::classifier::{AI_LABEL, CANDIDATE_LABELS, ClassificationError, Classifier, HUMAN_LABEL};

/// Label attached to one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Ai,
    Human,
    /// Classification attempt failed
    Error,
}

impl Label {
    /// Parse a classifier label; anything outside the candidate set is rejected
    pub fn from_classifier(label: &str) -> Option<Self> {
        match label {
            AI_LABEL => Some(Self::Ai),
            HUMAN_LABEL => Some(Self::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => AI_LABEL,
            Self::Human => HUMAN_LABEL,
            Self::Error => "Error",
        }
    }

    /// Score contributed by one answer (AI-labeled answers score higher)
    pub fn increment(&self) -> u32 {
        match self {
            Self::Ai => 2,
            Self::Human => 1,
            Self::Error => 0,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label and confidence for one answer cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationResult {
    pub label: Label,
    pub confidence: f64,
}

impl ClassificationResult {
    /// Sentinel used when the classifier could not be reached or answered nonsense
    pub const FAILED: Self = Self {
        label: Label::Error,
        confidence: 0.0,
    };

    pub fn increment(&self) -> u32 {
        self.label.increment()
    }
}

/// Builds the evaluation prompt and runs it through a classifier
#[derive(Clone)]
pub struct AnswerEvaluator {
    classifier: Arc<dyn Classifier>,
    rubric: Rubric,
}

impl AnswerEvaluator {
    pub fn new(classifier: Arc<dyn Classifier>, rubric: Rubric) -> Self {
        Self { classifier, rubric }
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Exact text sent to the classifier for `answer`
    pub fn build_prompt(&self, answer: &str) -> String {
        self.rubric.render(answer)
    }

    /// Classify one answer, surfacing the failure cause
    pub async fn try_evaluate(&self, answer: &str) -> Result<ClassificationResult, ClassificationError> {
        let prompt = self.build_prompt(answer);
        let classification = self.classifier.classify(&prompt, &CANDIDATE_LABELS).await?;

        let label = Label::from_classifier(&classification.label)
            .ok_or_else(|| ClassificationError::UnknownLabel(classification.label.clone()))?;

        debug!("Evaluated answer ({} chars): {} {:.2}", answer.len(), label, classification.confidence);

        Ok(ClassificationResult {
            label,
            confidence: classification.confidence,
        })
    }

    /// Classify one answer; failures are logged and degrade to
    /// [`ClassificationResult::FAILED`]
    pub async fn evaluate(&self, answer: &str) -> ClassificationResult {
        match self.try_evaluate(answer).await {
            Ok(result) => result,
            Err(e) => {
                error!("Error evaluating text: {}", e);
                ClassificationResult::FAILED
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classification;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records prompts and answers with a scripted reply
    struct ScriptedClassifier {
        reply: Result<(&'static str, f64), &'static str>,
        prompts: Mutex<Vec<String>>,
        labels: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedClassifier {
        fn new(reply: Result<(&'static str, f64), &'static str>) -> Self {
            Self {
                reply,
                prompts: Mutex::new(Vec::new()),
                labels: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Classifier for ScriptedClassifier {
        async fn classify(
            &self,
            text: &str,
            labels: &[&str],
        ) -> Result<Classification, ClassificationError> {
            self.prompts.lock().unwrap().push(text.to_string());
            self.labels
                .lock()
                .unwrap()
                .push(labels.iter().map(|l| l.to_string()).collect());
            match self.reply {
                Ok((label, confidence)) => Ok(Classification::new(label, confidence)),
                Err(message) => Err(ClassificationError::Other(message.to_string())),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_increments() {
        assert_eq!(Label::Ai.increment(), 2);
        assert_eq!(Label::Human.increment(), 1);
        assert_eq!(Label::Error.increment(), 0);
        assert_eq!(ClassificationResult::FAILED.increment(), 0);
    }

    #[test]
    fn test_label_parsing_is_exact() {
        assert_eq!(Label::from_classifier("AI"), Some(Label::Ai));
        assert_eq!(Label::from_classifier("Human"), Some(Label::Human));
        assert_eq!(Label::from_classifier("human"), None);
        assert_eq!(Label::from_classifier("Error"), None);
    }

    #[tokio::test]
    async fn test_evaluate_passes_prompt_and_labels() {
        let classifier = Arc::new(ScriptedClassifier::new(Ok(("Human", 0.9))));
        let evaluator = AnswerEvaluator::new(classifier.clone(), Rubric::new("Rubric"));

        let result = evaluator.evaluate("I built a shed last summer").await;
        assert_eq!(result.label, Label::Human);
        assert!((result.confidence - 0.9).abs() < 1e-9);

        let prompts = classifier.prompts.lock().unwrap();
        assert_eq!(prompts.as_slice(), ["Rubric\n\nText: I built a shed last summer\n"]);
        let labels = classifier.labels.lock().unwrap();
        assert_eq!(labels[0], vec!["AI".to_string(), "Human".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_degrades_to_sentinel() {
        let classifier = Arc::new(ScriptedClassifier::new(Err("connection refused")));
        let evaluator = AnswerEvaluator::new(classifier, Rubric::default());

        let err = evaluator.try_evaluate("anything").await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));

        let result = evaluator.evaluate("anything").await;
        assert_eq!(result, ClassificationResult::FAILED);
        assert_eq!(result.increment(), 0);
    }

    #[tokio::test]
    async fn test_unexpected_label_is_a_failure() {
        let classifier = Arc::new(ScriptedClassifier::new(Ok(("Robot", 0.99))));
        let evaluator = AnswerEvaluator::new(classifier, Rubric::default());

        assert!(matches!(
            evaluator.try_evaluate("x").await,
            Err(ClassificationError::UnknownLabel(_))
        ));
        assert_eq!(evaluator.evaluate("x").await, ClassificationResult::FAILED);
    }
}
