//! Required-column check run before any row is scored

pub const EMAIL_COLUMN: &str = "email";
pub const ANSWER_COLUMNS: [&str; 5] = ["a", "b", "c", "d", "e"];

/// A required column is absent from the uploaded table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("CSV must contain a column named '{column}'")]
pub struct SchemaError {
    pub column: String,
}

/// Identifier column plus the answer columns, in evaluation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredColumns {
    email: String,
    answers: Vec<String>,
}

impl Default for RequiredColumns {
    fn default() -> Self {
        Self::new(EMAIL_COLUMN, ANSWER_COLUMNS)
    }
}

impl RequiredColumns {
    pub fn new<I, S>(email: impl Into<String>, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            email: email.into(),
            answers: answers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    /// Every required name, identifier first
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.email.as_str()).chain(self.answers.iter().map(String::as_str))
    }
}

/// Case-sensitive presence check; reports the first missing column in
/// required order
pub fn validate(headers: &[String], required: &RequiredColumns) -> Result<(), SchemaError> {
    match required.names().find(|name| !headers.iter().any(|h| h == name)) {
        Some(missing) => Err(SchemaError {
            column: missing.to_string(),
        }),
        None => Ok(()),
    }
}
