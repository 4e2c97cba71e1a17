// src/error.rs
// Fatal batch errors; per-cell classifier failures never reach this type

use crate::scoring::schema::SchemaError;
use crate::table::TableError;

#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    /// Required column missing; the batch never started
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Input could not be parsed or output could not be written
    #[error(transparent)]
    Table(#[from] TableError),
}
