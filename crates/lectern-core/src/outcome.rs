//! The uniform result contract every endpoint executor returns.

use serde::{Deserialize, Serialize};

use crate::Error;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Display title.
    pub title: String,
    /// URI or path locating the document.
    pub locator: String,
    /// Optional plain-text excerpt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl ResultRecord {
    /// Create a record without a snippet.
    pub fn new(title: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            locator: locator.into(),
            snippet: None,
        }
    }

    /// Set the snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

/// Result of one atomic endpoint call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// At least one hit.
    Results {
        /// Hits in endpoint order.
        records: Vec<ResultRecord>,
        /// Total matches reported by the endpoint (may exceed `records.len()`).
        total: usize,
    },
    /// The endpoint answered and found nothing.
    NoResults,
    /// The call failed.
    Error {
        /// Human-readable cause.
        message: String,
        /// Stable short code (see [`Error::code`]).
        code: String,
    },
}

impl SearchOutcome {
    /// Build an outcome from a record list; empty lists become `NoResults`.
    pub fn from_records(records: Vec<ResultRecord>, total: Option<usize>) -> Self {
        if records.is_empty() {
            return Self::NoResults;
        }
        let total = total.unwrap_or(records.len()).max(records.len());
        Self::Results { records, total }
    }

    /// Fold an executor error into an outcome.
    pub fn from_error(error: &Error) -> Self {
        Self::Error {
            message: error.to_string(),
            code: error.code().to_string(),
        }
    }

    /// True for a nonempty result set.
    pub fn has_results(&self) -> bool {
        matches!(self, Self::Results { records, .. } if !records.is_empty())
    }

    /// True for an error outcome.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Records, or an empty slice.
    pub fn records(&self) -> &[ResultRecord] {
        match self {
            Self::Results { records, .. } => records,
            Self::NoResults | Self::Error { .. } => &[],
        }
    }
}
