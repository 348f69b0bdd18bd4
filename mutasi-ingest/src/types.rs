use mutasi_core::Transaction;
use serde::{Deserialize, Serialize};

/// One visual row of a page's text layer, boilerplate already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 1-based page number
    pub page: u32,
    pub text: String,
}

impl RawLine {
    pub fn new(page: u32, text: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
        }
    }
}

/// A contiguous run of lines believed to form one transaction.
/// The first line always carries the date prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionChunk {
    /// Page of the first (date-bearing) line
    pub page: u32,
    pub lines: Vec<String>,
}

impl TransactionChunk {
    pub fn new(page: u32, first_line: impl Into<String>) -> Self {
        Self {
            page,
            lines: vec![first_line.into()],
        }
    }

    pub fn first_line(&self) -> &str {
        self.lines.first().map(String::as_str).unwrap_or("")
    }

    /// All lines joined with `\n`, kept on the record for traceability.
    pub fn raw_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Why the field parser rejected a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// First line has no resolvable `D Mon YYYY` date.
    UnknownDate,
}

/// A chunk that produced no transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedChunk {
    /// 0-based position in chunk discovery order
    pub index: usize,
    pub page: u32,
    pub first_line: String,
    pub reason: SkipReason,
}

/// Result of a whole-document parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedStatement {
    /// In document reading order
    pub transactions: Vec<Transaction>,
    /// Chunks dropped at the date step, reported instead of silently lost
    pub skipped: Vec<SkippedChunk>,
}

/// Progress events emitted while a document is processed.
/// Purely observational: sinks cannot influence the parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseProgress {
    Starting { message: String },
    /// After page `current` of `total` has been read
    Extracting { current: usize, total: usize },
    Stitching { message: String },
    ParsingStarted { message: String, total: usize },
    /// Periodic, not every chunk; `current` is 0-based
    Parsing { current: usize, total: usize },
    Complete { message: String },
}

impl ParseProgress {
    pub fn phase(&self) -> &'static str {
        match self {
            ParseProgress::Starting { .. } => "starting",
            ParseProgress::Extracting { .. } => "extracting",
            ParseProgress::Stitching { .. } => "stitching",
            ParseProgress::ParsingStarted { .. } | ParseProgress::Parsing { .. } => "parsing",
            ParseProgress::Complete { .. } => "complete",
        }
    }
}

impl std::fmt::Display for ParseProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseProgress::Starting { message }
            | ParseProgress::Stitching { message }
            | ParseProgress::Complete { message } => write!(f, "[{}] {message}", self.phase()),
            ParseProgress::ParsingStarted { message, total } => {
                write!(f, "[{}] {message} ({total} chunks)", self.phase())
            }
            ParseProgress::Extracting { current, total } => {
                write!(f, "[{}] page {current}/{total}", self.phase())
            }
            ParseProgress::Parsing { current, total } => {
                write!(f, "[{}] chunk {current}/{total}", self.phase())
            }
        }
    }
}
