use thiserror::Error;

/// Document-level failures. Per-field problems never surface here; they
/// degrade to empty values on the transaction instead.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Encrypted, image-only or empty PDF
    #[error("Tidak ada teks yang dapat diekstrak dari PDF (no text extracted)")]
    NoText,

    /// Text was found but no line starts with a transaction date
    #[error("Tidak ada transaksi yang ditemukan dalam PDF (no transactions found)")]
    NoTransactions,

    /// Every chunk was rejected at the date step
    #[error("Tidak ada transaksi valid yang berhasil diparsing (no valid transactions parsed)")]
    NoValidTransactions,

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;
