/// Page status definitions for tracking crawl progress
///
/// A page row stores its outcome in two nullable columns (`content`, `error`).
/// `PageStatus` folds them into one value so a page is always in exactly one
/// state.
use std::fmt;

/// Error code recorded when the fetch itself failed (network, TLS, timeout)
pub const FETCH_ERROR_SENTINEL: i64 = -1;

/// Fetch outcome of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    /// Discovered but not fetched yet
    Pending,

    /// Successfully fetched; holds the raw page body
    Fetched(Vec<u8>),

    /// Fetch failed; holds the HTTP status or [`FETCH_ERROR_SENTINEL`]
    Failed(i64),
}

/// Payload-free discriminant of [`PageStatus`], used for counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Pending,
    Fetched,
    Failed,
}

impl PageStatus {
    /// Builds a status from the stored columns
    ///
    /// Rows written by older crawlers may carry both an error code and
    /// content; the error wins so the page never reads as a success.
    pub fn from_columns(content: Option<Vec<u8>>, error: Option<i64>) -> Self {
        match (content, error) {
            (_, Some(code)) => Self::Failed(code),
            (Some(body), None) => Self::Fetched(body),
            (None, None) => Self::Pending,
        }
    }

    /// Returns true if the page still waits to be fetched
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns the error code of a failed page
    pub fn error_code(&self) -> Option<i64> {
        match self {
            Self::Failed(code) => Some(*code),
            _ => None,
        }
    }

    /// Returns the body of a fetched page
    pub fn content(&self) -> Option<&[u8]> {
        match self {
            Self::Fetched(body) => Some(body.as_slice()),
            _ => None,
        }
    }

    pub fn kind(&self) -> StatusKind {
        match self {
            Self::Pending => StatusKind::Pending,
            Self::Fetched(_) => StatusKind::Fetched,
            Self::Failed(_) => StatusKind::Failed,
        }
    }
}

impl StatusKind {
    /// SQL predicate selecting rows of this kind from `Pages`
    pub fn sql_predicate(&self) -> &'static str {
        match self {
            Self::Pending => "content IS NULL AND error IS NULL",
            Self::Fetched => "content IS NOT NULL AND error IS NULL",
            Self::Failed => "error IS NOT NULL",
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::Pending, Self::Fetched, Self::Failed]
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Fetched => "fetched",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Fetched(body) => write!(f, "fetched ({} bytes)", body.len()),
            Self::Failed(code) => write!(f, "failed ({})", code),
        }
    }
}
