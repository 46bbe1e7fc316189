use serde::{Deserialize, Serialize};

/// The category of a deck error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Root or included file is missing or unreadable.
    InvalidInputPath,
    UnterminatedQuotedString,
    /// A record was left open, or data appeared outside any keyword.
    MalformedRecord,
    InvalidKeywordName,
    CyclicInclude,
    /// `INCLUDE` without exactly one record holding exactly one token.
    MissingIncludeArgument,
    /// Query-time only; never produced by a parse.
    KeywordNotFound,
    InvalidPolicyTable,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInputPath => "invalid_input_path",
            ErrorKind::UnterminatedQuotedString => "unterminated_quoted_string",
            ErrorKind::MalformedRecord => "malformed_record",
            ErrorKind::InvalidKeywordName => "invalid_keyword_name",
            ErrorKind::CyclicInclude => "cyclic_include",
            ErrorKind::MissingIncludeArgument => "missing_include_argument",
            ErrorKind::KeywordNotFound => "keyword_not_found",
            ErrorKind::InvalidPolicyTable => "invalid_policy_table",
        }
    }
}

/// A deck error with the file and line it originated from.
///
/// `line` is 1-based; 0 means the error is not tied to a line (for example
/// a root file that could not be opened).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{file}:{line}: {message}")]
pub struct DeckError {
    pub kind: ErrorKind,
    pub file: String,
    pub line: u32,
    pub message: String,
}

impl DeckError {
    pub fn new(kind: ErrorKind, file: &str, line: u32, message: impl Into<String>) -> Self {
        DeckError {
            kind,
            file: file.to_owned(),
            line,
            message: message.into(),
        }
    }

    pub fn invalid_input(file: &str, line: u32, message: impl Into<String>) -> Self {
        DeckError::new(ErrorKind::InvalidInputPath, file, line, message)
    }

    pub fn unterminated_quote(file: &str, line: u32) -> Self {
        DeckError::new(
            ErrorKind::UnterminatedQuotedString,
            file,
            line,
            "unterminated quoted string",
        )
    }

    pub fn malformed(file: &str, line: u32, message: impl Into<String>) -> Self {
        DeckError::new(ErrorKind::MalformedRecord, file, line, message)
    }

    pub fn invalid_keyword(file: &str, line: u32, message: impl Into<String>) -> Self {
        DeckError::new(ErrorKind::InvalidKeywordName, file, line, message)
    }

    pub fn cyclic_include(file: &str, line: u32, message: impl Into<String>) -> Self {
        DeckError::new(ErrorKind::CyclicInclude, file, line, message)
    }

    pub fn missing_include_argument(file: &str, line: u32, message: impl Into<String>) -> Self {
        DeckError::new(ErrorKind::MissingIncludeArgument, file, line, message)
    }

    pub fn keyword_not_found(name: &str) -> Self {
        DeckError::new(
            ErrorKind::KeywordNotFound,
            "",
            0,
            format!("keyword '{}' not found in deck", name),
        )
    }

    pub fn invalid_policy(file: &str, message: impl Into<String>) -> Self {
        DeckError::new(ErrorKind::InvalidPolicyTable, file, 0, message)
    }

    /// Serialize with every field present, in a stable key order.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "file":    self.file,
            "kind":    self.kind.as_str(),
            "line":    self.line,
            "message": self.message,
        })
    }
}
