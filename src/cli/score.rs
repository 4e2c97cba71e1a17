//! `screener score`: CSV file in, progress notices out, result CSV written

use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::repl::colors;
use crate::scoring::{AnswerEvaluator, BatchEvent, BatchScorer};
use crate::table::{ResultTable, Table};

/// Where the result CSV goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    /// `-` means stdout
    pub fn parse(value: &str) -> Self {
        if value == "-" {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

/// Human-readable notice for one batch event
pub fn render_event(event: &BatchEvent) -> String {
    match event {
        BatchEvent::Started { rows } => colors::status(&format!("Processing {} applicants...", rows)),
        BatchEvent::CellStarted { email, column, text } => {
            format!("Processing answer for {} ({}): {}", email, column, text)
        }
        BatchEvent::CellFailed { message, .. } => {
            colors::error(&format!("Error evaluating text: {}", message))
        }
        BatchEvent::CellClassified { result, .. } => {
            format!("Answer Type: {}, Confidence: {:.2}", result.label, result.confidence)
        }
        BatchEvent::RowFinalized { email, total_score } => {
            colors::status(&format!("{} total_score={}", email, total_score))
        }
        BatchEvent::Finished { .. } => colors::success("Analysis complete!"),
    }
}

/// Plain-text rendering of the result table
pub fn render_results(results: &ResultTable) -> String {
    let width = results
        .rows()
        .iter()
        .map(|r| r.email.len())
        .chain(std::iter::once("email".len()))
        .max()
        .unwrap_or(5);

    let mut out = format!("{:<width$}  total_score\n", "email", width = width);
    for row in results.rows() {
        out.push_str(&format!("{:<width$}  {}\n", row.email, row.total_score, width = width));
    }
    out
}

/// Score `input` and write the results to `output`
pub async fn run(
    evaluator: AnswerEvaluator,
    input: &Path,
    output: &Output,
    quiet: bool,
) -> Result<ResultTable> {
    let table = Table::from_path(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let to_stderr = *output == Output::Stdout;

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if quiet && !matches!(event, BatchEvent::CellFailed { .. }) {
                continue;
            }
            let line = render_event(&event);
            if to_stderr {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        }
    });

    let scored = BatchScorer::new(evaluator).with_events(tx).score(&table).await;
    // Scorer (and its sender) is dropped here, so the printer drains and exits
    printer.await?;
    let results = scored?;

    match output {
        Output::Stdout => {
            let mut stdout = std::io::stdout().lock();
            results.write_csv(&mut stdout)?;
            stdout.flush()?;
        }
        Output::File(path) => {
            if !quiet {
                println!();
                println!("{}", colors::header("Results:"));
                print!("{}", render_results(&results));
            }
            results
                .write_path(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{}", colors::success(&format!("Saved results to {}", path.display())));
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{ClassificationResult, Label};
    use crate::table::ScoreRow;

    #[test]
    fn test_output_parse() {
        assert_eq!(Output::parse("-"), Output::Stdout);
        assert_eq!(Output::parse("out.csv"), Output::File(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_render_cell_events() {
        let started = BatchEvent::CellStarted {
            email: "x@y.com".into(),
            column: "a".into(),
            text: "I like rust".into(),
        };
        assert_eq!(render_event(&started), "Processing answer for x@y.com (a): I like rust");

        let classified = BatchEvent::CellClassified {
            email: "x@y.com".into(),
            column: "a".into(),
            result: ClassificationResult { label: Label::Human, confidence: 0.876 },
        };
        assert_eq!(render_event(&classified), "Answer Type: Human, Confidence: 0.88");

        let failed = BatchEvent::CellClassified {
            email: "x@y.com".into(),
            column: "b".into(),
            result: ClassificationResult::FAILED,
        };
        assert_eq!(render_event(&failed), "Answer Type: Error, Confidence: 0.00");
    }

    #[test]
    fn test_render_failure_mentions_cause() {
        let event = BatchEvent::CellFailed {
            email: "x@y.com".into(),
            column: "d".into(),
            message: "Network error: timed out".into(),
        };
        assert!(render_event(&event).contains("Error evaluating text: Network error: timed out"));
    }

    #[test]
    fn test_render_results_aligns_columns() {
        let results = ResultTable::new(vec![
            ScoreRow { email: "long.name@example.com".into(), total_score: 7 },
            ScoreRow { email: "a@b.c".into(), total_score: 10 },
        ]);
        let text = render_results(&results);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].find("total_score"), lines[1].find('7'));
        assert!(lines[2].starts_with("a@b.c "));
    }
}
