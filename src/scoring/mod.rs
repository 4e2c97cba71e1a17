//! Applicant answer scoring
//!
//! - `schema`: required-column validation
//! - `rubric`: evaluation prompt template
//! - `evaluator`: one answer -> label + confidence
//! - `batch`: table -> per-applicant totals

pub mod batch;
pub mod evaluator;
pub mod rubric;
pub mod schema;

pub use batch::{BatchEvent, BatchScorer};
pub use evaluator::{AnswerEvaluator, ClassificationResult, Label};
pub use rubric::{DEFAULT_RUBRIC, Rubric};
pub use schema::{ANSWER_COLUMNS, EMAIL_COLUMN, RequiredColumns, SchemaError};
