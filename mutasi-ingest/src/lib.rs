//! mutasi-ingest: Bank Jago statement PDF ingestion (text layer, stitching, field parsing).

pub mod assembler;
pub mod error;
pub mod layout;
pub mod options;
pub mod parsers;
pub mod pdf_text;
pub mod stitch;
pub mod types;

pub use assembler::StatementParser;
pub use error::{IngestError, Result};
pub use options::ParserOptions;
pub use parsers::jago::looks_like_statement_file;
pub use pdf_text::PdfDocument;
pub use types::{
    ParseProgress, ParsedStatement, RawLine, SkipReason, SkippedChunk, TransactionChunk,
};
