// tests/cli_score.rs
// `screener score` end to end on disk

use async_trait::async_trait;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

use screener::classifier::{Classification, ClassificationError, Classifier};
use screener::cli::score::{Output, run};
use screener::scoring::{AnswerEvaluator, Rubric};
use screener::table::{RESULT_FILE_NAME, ResultTable};

/// "AI" for answers longer than 20 characters, "Human" otherwise
struct LengthClassifier;

#[async_trait]
impl Classifier for LengthClassifier {
    async fn classify(&self, text: &str, _labels: &[&str]) -> Result<Classification, ClassificationError> {
        let answer = text.rsplit("Text: ").next().unwrap_or("").trim_end();
        if answer.len() > 20 {
            Ok(Classification::new("AI", 0.75))
        } else {
            Ok(Classification::new("Human", 0.65))
        }
    }

    fn name(&self) -> &str {
        "length"
    }
}

fn evaluator() -> AnswerEvaluator {
    AnswerEvaluator::new(Arc::new(LengthClassifier), Rubric::default())
}

#[tokio::test]
async fn test_score_writes_result_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("applicants.csv");
    let output = dir.path().join(RESULT_FILE_NAME);
    fs::write(
        &input,
        "email,a,b,c,d,e\n\
         short@example.com,yes,no,maybe,ok,fine\n\
         long@example.com,this answer is quite long,no,this one is also rather long,ok,fine\n",
    )
    .unwrap();

    let results = run(evaluator(), &input, &Output::File(output.clone()), true)
        .await
        .unwrap();

    assert_eq!(results.rows()[0].total_score, 5);
    assert_eq!(results.rows()[1].total_score, 7);

    let written = ResultTable::from_csv_bytes(&fs::read(&output).unwrap()).unwrap();
    assert_eq!(written, results);
}

#[tokio::test]
async fn test_missing_column_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("applicants.csv");
    let output = dir.path().join(RESULT_FILE_NAME);
    fs::write(&input, "email,a,b,c,e\nx@y.com,1,2,3,5\n").unwrap();

    let err = run(evaluator(), &input, &Output::File(output.clone()), true)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("'d'"));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_missing_input_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join(RESULT_FILE_NAME);

    let result = run(
        evaluator(),
        &dir.path().join("nope.csv"),
        &Output::File(output),
        true,
    )
    .await;

    assert!(result.is_err());
}
