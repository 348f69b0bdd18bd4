//! Drive a document through extraction, stitching and field parsing.

use std::path::Path;

use rayon::prelude::*;

use crate::error::{IngestError, Result};
use crate::layout::{page_lines, NoiseFilter};
use crate::options::ParserOptions;
use crate::parsers::jago::parse_chunk;
use crate::pdf_text::PdfDocument;
use crate::stitch::stitch_lines;
use crate::types::{
    ParseProgress, ParsedStatement, RawLine, SkipReason, SkippedChunk, TransactionChunk,
};

/// Parses Bank Jago statement PDFs into transactions.
///
/// Progress is reported through the `progress` sink passed to each call;
/// use `|_| {}` to ignore it.
#[derive(Debug, Clone, Default)]
pub struct StatementParser {
    options: ParserOptions,
    noise: NoiseFilter,
}

impl StatementParser {
    pub fn new(options: ParserOptions) -> Self {
        let noise = NoiseFilter::new(&options.extra_noise);
        Self { options, noise }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse an in-memory PDF. `source_file` is recorded on every transaction
    /// unless the options override it.
    pub fn parse_bytes(
        &self,
        bytes: &[u8],
        source_file: &str,
        progress: &mut impl FnMut(&ParseProgress),
    ) -> Result<ParsedStatement> {
        emit_starting(progress);
        let pdf = PdfDocument::load_mem(bytes)?;
        let lines = self.extract_lines(&pdf, progress)?;
        self.assemble(&lines, source_file, progress)
    }

    pub fn parse_file(
        &self,
        path: impl AsRef<Path>,
        progress: &mut impl FnMut(&ParseProgress),
    ) -> Result<ParsedStatement> {
        let path = path.as_ref();
        emit_starting(progress);
        let pdf = PdfDocument::load(path)?;
        let lines = self.extract_lines(&pdf, progress)?;
        self.assemble(&lines, &file_name(path), progress)
    }

    /// Like [`parse_file`](Self::parse_file), but reads the file through tokio
    /// and yields to the runtime between pages.
    pub async fn parse_file_async(
        &self,
        path: impl AsRef<Path>,
        progress: &mut impl FnMut(&ParseProgress),
    ) -> Result<ParsedStatement> {
        let path = path.as_ref();
        emit_starting(progress);

        let bytes = tokio::fs::read(path).await?;
        let pdf = PdfDocument::load_mem(&bytes)?;

        let total = pdf.page_count();
        let mut lines = Vec::new();
        for page in 1..=total {
            lines.extend(self.page(&pdf, page)?);
            progress(&ParseProgress::Extracting {
                current: page,
                total,
            });
            tokio::task::yield_now().await;
        }

        self.assemble(&lines, &file_name(path), progress)
    }

    /// Run stitching and field parsing over an already extracted line stream.
    pub fn parse_lines(
        &self,
        lines: &[RawLine],
        source_file: &str,
        progress: &mut impl FnMut(&ParseProgress),
    ) -> Result<ParsedStatement> {
        emit_starting(progress);
        self.assemble(lines, source_file, progress)
    }

    /// Filtered rows of every page in reading order, one `Extracting` event per page.
    pub fn extract_lines(
        &self,
        pdf: &PdfDocument,
        progress: &mut impl FnMut(&ParseProgress),
    ) -> Result<Vec<RawLine>> {
        let total = pdf.page_count();
        let mut lines = Vec::new();
        for page in 1..=total {
            lines.extend(self.page(pdf, page)?);
            progress(&ParseProgress::Extracting {
                current: page,
                total,
            });
        }
        Ok(lines)
    }

    fn page(&self, pdf: &PdfDocument, page: usize) -> Result<Vec<RawLine>> {
        let page = page as u32;
        let runs = pdf.page_runs(page)?;
        let lines = page_lines(page, &runs, &self.noise);
        log::debug!("page {page}: {} runs, {} lines kept", runs.len(), lines.len());
        Ok(lines)
    }

    fn assemble(
        &self,
        lines: &[RawLine],
        source_file: &str,
        progress: &mut impl FnMut(&ParseProgress),
    ) -> Result<ParsedStatement> {
        if lines.is_empty() {
            return Err(IngestError::NoText);
        }

        progress(&ParseProgress::Stitching {
            message: "Menggabungkan baris transaksi...".to_string(),
        });
        let chunks = stitch_lines(lines);
        if chunks.is_empty() {
            return Err(IngestError::NoTransactions);
        }

        let total = chunks.len();
        progress(&ParseProgress::ParsingStarted {
            message: "Memproses transaksi...".to_string(),
            total,
        });

        let source_file = self.options.source_file.as_deref().unwrap_or(source_file);
        let results: Vec<std::result::Result<_, SkipReason>> = if self.options.parallel {
            chunks.par_iter().map(|c| parse_chunk(c, source_file)).collect()
        } else {
            chunks.iter().map(|c| parse_chunk(c, source_file)).collect()
        };

        let mut parsed = ParsedStatement {
            transactions: Vec::with_capacity(total),
            skipped: Vec::new(),
        };
        for (index, (chunk, result)) in chunks.iter().zip(results).enumerate() {
            let every = self.options.progress_every;
            if every > 0 && index % every == 0 {
                progress(&ParseProgress::Parsing {
                    current: index,
                    total,
                });
            }
            match result {
                Ok(txn) => parsed.transactions.push(txn),
                Err(reason) => parsed.skipped.push(skipped(index, chunk, reason)),
            }
        }

        if parsed.transactions.is_empty() {
            return Err(IngestError::NoValidTransactions);
        }

        log::info!(
            "{source_file}: {} transactions from {} chunks ({} skipped)",
            parsed.transactions.len(),
            total,
            parsed.skipped.len()
        );
        progress(&ParseProgress::Complete {
            message: format!("Berhasil memproses {} transaksi", parsed.transactions.len()),
        });
        Ok(parsed)
    }
}

fn emit_starting(progress: &mut impl FnMut(&ParseProgress)) {
    progress(&ParseProgress::Starting {
        message: "Memulai ekstraksi PDF...".to_string(),
    });
}

fn skipped(index: usize, chunk: &TransactionChunk, reason: SkipReason) -> SkippedChunk {
    log::warn!(
        "skipping chunk {index} on page {}: {reason:?}: {:?}",
        chunk.page,
        chunk.first_line()
    );
    SkippedChunk {
        index,
        page: chunk.page,
        first_line: chunk.first_line().to_string(),
        reason,
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(texts: &[&str]) -> Vec<RawLine> {
        texts.iter().map(|t| RawLine::new(1, *t)).collect()
    }

    fn collect(
        parser: &StatementParser,
        lines: &[RawLine],
    ) -> (Result<ParsedStatement>, Vec<ParseProgress>) {
        let mut events = Vec::new();
        let result = parser.parse_lines(lines, "jago.pdf", &mut |e: &ParseProgress| {
            events.push(e.clone())
        });
        (result, events)
    }

    #[test]
    fn test_empty_stream_is_no_text() {
        let (result, events) = collect(&StatementParser::default(), &[]);
        assert!(matches!(result, Err(IngestError::NoText)));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].phase(), "starting");
    }

    #[test]
    fn test_no_date_lines_is_no_transactions() {
        let (result, events) = collect(
            &StatementParser::default(),
            &raw(&["Juli 2021", "some text", "18.01"]),
        );
        assert!(matches!(result, Err(IngestError::NoTransactions)));
        assert_eq!(events.last().map(ParseProgress::phase), Some("stitching"));
    }

    #[test]
    fn test_all_rejected_is_no_valid_transactions() {
        let (result, _) = collect(
            &StatementParser::default(),
            &raw(&["31 Feb 2021 A Bunga 1 2", "30 Feb 2022 B Bunga 1 2"]),
        );
        assert!(matches!(result, Err(IngestError::NoValidTransactions)));
    }

    #[test]
    fn test_order_and_skips() {
        let (result, events) = collect(
            &StatementParser::default(),
            &raw(&[
                "2 Jan 2023 B Transfer Keluar -100 900",
                "31 Feb 2023 bad Bunga 1 2",
                "1 Jan 2023 A Transfer Masuk 1.000 1.000",
            ]),
        );
        let parsed = result.unwrap();

        // Document order, not date order.
        let dates: Vec<String> = parsed.transactions.iter().map(|t| t.date_string()).collect();
        assert_eq!(dates, vec!["2023-01-02", "2023-01-01"]);

        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].index, 1);
        assert_eq!(parsed.skipped[0].first_line, "31 Feb 2023 bad Bunga 1 2");
        assert_eq!(parsed.skipped[0].reason, SkipReason::UnknownDate);

        let phases: Vec<&str> = events.iter().map(ParseProgress::phase).collect();
        assert_eq!(
            phases,
            vec!["starting", "stitching", "parsing", "parsing", "complete"]
        );
        assert_eq!(
            events.last(),
            Some(&ParseProgress::Complete {
                message: "Berhasil memproses 2 transaksi".to_string()
            })
        );
    }

    #[test]
    fn test_parsing_progress_cadence() {
        let texts: Vec<String> = (0..120)
            .map(|i| format!("{} Mar 2023 A Bunga {i} {i}", i % 28 + 1))
            .collect();
        let texts: Vec<&str> = texts.iter().map(String::as_str).collect();
        let (result, events) = collect(&StatementParser::default(), &raw(&texts));
        assert_eq!(result.unwrap().transactions.len(), 120);

        let ticks: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                ParseProgress::Parsing { current, total } => {
                    assert_eq!(*total, 120);
                    Some(*current)
                }
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![0, 50, 100]);
    }

    #[test]
    fn test_progress_can_be_disabled() {
        let parser = StatementParser::new(ParserOptions {
            progress_every: 0,
            ..ParserOptions::default()
        });
        let (_, events) = collect(&parser, &raw(&["1 Jan 2023 A Bunga 1 2"]));
        assert!(!events.iter().any(|e| matches!(e, ParseProgress::Parsing { .. })));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let texts: Vec<String> = (0..200)
            .flat_map(|i| {
                [
                    format!(
                        "{} Apr 2024 TOKO {i} Pembayaran QRIS kopi -{i}.000 {i}.500",
                        i % 30 + 1
                    ),
                    format!("1{}.{:02}", i % 10, i % 60),
                    format!("ID#T{i}"),
                ]
            })
            .collect();
        let texts: Vec<&str> = texts.iter().map(String::as_str).collect();
        let lines = raw(&texts);

        let sequential = StatementParser::default()
            .parse_lines(&lines, "a.pdf", &mut |_| {})
            .unwrap();
        let parallel = StatementParser::new(ParserOptions {
            parallel: true,
            ..ParserOptions::default()
        })
        .parse_lines(&lines, "a.pdf", &mut |_| {})
        .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(parallel.transactions.len(), 200);
    }

    #[test]
    fn test_source_file_override() {
        let parser = StatementParser::new(ParserOptions {
            source_file: Some("renamed.pdf".to_string()),
            ..ParserOptions::default()
        });
        let parsed = parser
            .parse_lines(&raw(&["1 Jan 2023 A Bunga 1 2"]), "orig.pdf", &mut |_| {})
            .unwrap();
        assert_eq!(parsed.transactions[0].source_file, "renamed.pdf");
    }
}
