//! CSV ingestion and export
//!
//! Input tables are read leniently: short rows are padded with empty cells
//! and extra columns are carried along untouched. Output is always the two
//! column `email,total_score` layout, header included even with no rows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use crate::scoring::schema::{self, RequiredColumns, SchemaError};

/// MIME type of the exported result table
pub const CSV_CONTENT_TYPE: &str = "text/csv";
/// Default download / output file name
pub const RESULT_FILE_NAME: &str = "applicant_scores.csv";

const RESULT_HEADERS: [&str; 2] = ["email", "total_score"];

/// Error types for table parsing and serialization
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Error processing CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected result columns: expected 'email,total_score', found '{0}'")]
    ResultHeaders(String),
}

/// Parsed input table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(String::from).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TableError> {
        Self::from_reader(bytes)
    }

    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn cell(&self, row: usize, column: &str) -> &str {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|idx| self.rows.get(row)?.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Validate the required columns, then project every row into an
    /// [`ApplicantRecord`]
    pub fn applicants(&self, columns: &RequiredColumns) -> Result<Vec<ApplicantRecord>, SchemaError> {
        schema::validate(&self.headers, columns)?;

        Ok((0..self.rows.len())
            .map(|row| ApplicantRecord {
                email: self.cell(row, columns.email()).to_string(),
                answers: columns
                    .answers()
                    .iter()
                    .map(|col| (col.clone(), self.cell(row, col).to_string()))
                    .collect(),
            })
            .collect())
    }
}

/// One applicant row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicantRecord {
    email: String,
    answers: BTreeMap<String, String>,
}

impl ApplicantRecord {
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Answer text for `column`, empty when the cell was blank or missing
    pub fn answer(&self, column: &str) -> &str {
        self.answers.get(column).map(String::as_str).unwrap_or("")
    }
}

/// One exported row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub email: String,
    pub total_score: u32,
}

/// Scores in input row order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultTable {
    rows: Vec<ScoreRow>,
}

impl ResultTable {
    pub fn new(rows: Vec<ScoreRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ScoreRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        writer.write_record(RESULT_HEADERS)?;
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, TableError> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(buf)
    }

    pub fn write_path(&self, path: &Path) -> Result<(), TableError> {
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }

    /// Parse a previously exported result table
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_reader(bytes);

        let headers = reader.headers()?.clone();
        if headers.iter().ne(RESULT_HEADERS) {
            return Err(TableError::ResultHeaders(
                headers.iter().collect::<Vec<_>>().join(","),
            ));
        }

        let rows = reader
            .deserialize::<ScoreRow>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pads_short_rows() {
        let csv = "email,a,b,c,d,e\nx@y.com,one,two\n";
        let table = Table::from_bytes(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);

        let applicants = table.applicants(&RequiredColumns::default()).unwrap();
        assert_eq!(applicants[0].email(), "x@y.com");
        assert_eq!(applicants[0].answer("b"), "two");
        assert_eq!(applicants[0].answer("e"), "");
    }

    #[test]
    fn test_columns_resolved_by_name() {
        let csv = "e,d,c,b,a,email,extra\n5,4,3,2,1,z@z.io,ignored\n";
        let table = Table::from_bytes(csv.as_bytes()).unwrap();
        let applicants = table.applicants(&RequiredColumns::default()).unwrap();
        assert_eq!(applicants[0].email(), "z@z.io");
        assert_eq!(applicants[0].answer("a"), "1");
        assert_eq!(applicants[0].answer("e"), "5");
    }

    #[test]
    fn test_quoted_multiline_answer() {
        let csv = "email,a,b,c,d,e\nq@q.com,\"line one\nline two, with comma\",b,c,d,e\n";
        let table = Table::from_bytes(csv.as_bytes()).unwrap();
        let applicants = table.applicants(&RequiredColumns::default()).unwrap();
        assert_eq!(applicants[0].answer("a"), "line one\nline two, with comma");
    }

    #[test]
    fn test_applicants_rejects_missing_column() {
        let table = Table::from_bytes(b"email,a,b,c,e\n").unwrap();
        let err = table.applicants(&RequiredColumns::default()).unwrap_err();
        assert_eq!(err.column, "d");
    }

    #[test]
    fn test_empty_result_still_has_header() {
        let bytes = ResultTable::default().to_csv_bytes().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "email,total_score\n");
    }

    #[test]
    fn test_result_csv_layout() {
        let table = ResultTable::new(vec![
            ScoreRow { email: "a@b.com".into(), total_score: 10 },
            ScoreRow { email: "c@d.com".into(), total_score: 0 },
        ]);
        let text = String::from_utf8(table.to_csv_bytes().unwrap()).unwrap();
        assert_eq!(text, "email,total_score\na@b.com,10\nc@d.com,0\n");
    }

    #[test]
    fn test_result_headers_checked_on_parse() {
        let err = ResultTable::from_csv_bytes(b"mail,score\nx,1\n").unwrap_err();
        assert!(matches!(err, TableError::ResultHeaders(_)));
    }

    #[test]
    fn test_negative_score_is_rejected() {
        assert!(ResultTable::from_csv_bytes(b"email,total_score\nx@y.com,-1\n").is_err());
    }
}
