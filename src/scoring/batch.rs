//! Batch scoring over an applicant table
//!
//! One linear pass: validate the schema, then for each row evaluate every
//! answer column in order and sum the increments. A failing cell scores 0;
//! only a schema failure aborts the batch.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::evaluator::{AnswerEvaluator, ClassificationResult};
use super::schema::{RequiredColumns, SchemaError};
use crate::error::ScreenerError;
use crate::table::{ApplicantRecord, ResultTable, ScoreRow, Table};

/// Progress notifications emitted while a batch runs
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// Schema accepted, `rows` applicants queued
    Started { rows: usize },
    /// About to classify one answer
    CellStarted {
        email: String,
        column: String,
        text: String,
    },
    /// Classifier call failed; the cell will score 0
    CellFailed {
        email: String,
        column: String,
        message: String,
    },
    /// Final label for one answer (the failure sentinel included)
    CellClassified {
        email: String,
        column: String,
        result: ClassificationResult,
    },
    RowFinalized { email: String, total_score: u32 },
    Finished { rows: usize },
}

/// Scores every applicant in a table
pub struct BatchScorer {
    evaluator: AnswerEvaluator,
    columns: RequiredColumns,
    events: Option<mpsc::UnboundedSender<BatchEvent>>,
}

impl BatchScorer {
    pub fn new(evaluator: AnswerEvaluator) -> Self {
        Self {
            evaluator,
            columns: RequiredColumns::default(),
            events: None,
        }
    }

    /// Override the required columns (and their evaluation order)
    pub fn with_columns(mut self, columns: RequiredColumns) -> Self {
        self.columns = columns;
        self
    }

    /// Stream [`BatchEvent`]s to an observer
    pub fn with_events(mut self, events: mpsc::UnboundedSender<BatchEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Score a parsed table. Fails only when a required column is missing.
    pub async fn score(&self, table: &Table) -> Result<ResultTable, SchemaError> {
        let applicants = table.applicants(&self.columns).inspect_err(|e| {
            warn!("Rejecting batch: {}", e);
        })?;

        info!(
            "Scoring {} applicants over columns {:?} with {}",
            applicants.len(),
            self.columns.answers(),
            self.evaluator.classifier_name()
        );
        self.emit(BatchEvent::Started { rows: applicants.len() });

        let mut rows = Vec::with_capacity(applicants.len());
        for applicant in &applicants {
            rows.push(self.score_applicant(applicant).await);
        }

        self.emit(BatchEvent::Finished { rows: rows.len() });
        info!("Batch complete: {} rows", rows.len());
        Ok(ResultTable::new(rows))
    }

    /// Parse CSV bytes and score them
    pub async fn score_csv(&self, bytes: &[u8]) -> Result<ResultTable, ScreenerError> {
        let table = Table::from_bytes(bytes)?;
        Ok(self.score(&table).await?)
    }

    async fn score_applicant(&self, applicant: &ApplicantRecord) -> ScoreRow {
        let email = applicant.email();
        let mut total_score = 0;

        for column in self.columns.answers() {
            let text = applicant.answer(column);
            self.emit(BatchEvent::CellStarted {
                email: email.to_string(),
                column: column.clone(),
                text: text.to_string(),
            });

            let result = match self.evaluator.try_evaluate(text).await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Classification failed for {} ({}): {}", email, column, e);
                    self.emit(BatchEvent::CellFailed {
                        email: email.to_string(),
                        column: column.clone(),
                        message: e.to_string(),
                    });
                    ClassificationResult::FAILED
                }
            };

            total_score += result.increment();
            self.emit(BatchEvent::CellClassified {
                email: email.to_string(),
                column: column.clone(),
                result,
            });
        }

        debug!("{} scored {}", email, total_score);
        self.emit(BatchEvent::RowFinalized {
            email: email.to_string(),
            total_score,
        });

        ScoreRow {
            email: email.to_string(),
            total_score,
        }
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(tx) = &self.events {
            // Observer gone is not a scoring failure
            let _ = tx.send(event);
        }
    }
}
