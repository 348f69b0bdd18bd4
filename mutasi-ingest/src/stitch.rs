//! Group the cross-page line stream into per-transaction chunks.
//!
//! The statement has no record delimiters. A row that starts with
//! `D Mon YYYY` opens a transaction, a bare month header such as
//! `Juli 2021` closes it, and everything else continues the open one.

use std::sync::LazyLock;

use mutasi_core::calendar::{is_date_range_banner, parse_date_prefix};
use regex::Regex;

use crate::types::{RawLine, TransactionChunk};

static PERIOD_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z]+(?:\s+\d{4})?$").expect("valid period header regex"));

/// How a single line affects the stitcher, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `D Mon YYYY ...`: opens a new chunk
    DateStart,
    /// `D Mon YYYY - D Mon YYYY`: report period banner, ignored entirely
    RangeBanner,
    /// One word, optionally a year: closes the open chunk
    PeriodHeader,
    Continuation,
}

pub fn classify_line(text: &str) -> LineKind {
    if parse_date_prefix(text).is_some() {
        if is_date_range_banner(text) {
            LineKind::RangeBanner
        } else {
            LineKind::DateStart
        }
    } else if PERIOD_HEADER_RE.is_match(text.trim()) {
        LineKind::PeriodHeader
    } else {
        LineKind::Continuation
    }
}

/// Single pass over `lines`. Continuation lines seen while no chunk is open
/// are dropped.
pub fn stitch_lines(lines: &[RawLine]) -> Vec<TransactionChunk> {
    let mut chunks = Vec::new();
    let mut current: Option<TransactionChunk> = None;
    let mut dropped = 0usize;

    for line in lines {
        match classify_line(&line.text) {
            LineKind::RangeBanner => {}
            LineKind::DateStart => {
                chunks.extend(current.take());
                current = Some(TransactionChunk::new(line.page, line.text.clone()));
            }
            LineKind::PeriodHeader => {
                chunks.extend(current.take());
            }
            LineKind::Continuation => match current.as_mut() {
                Some(chunk) => chunk.lines.push(line.text.clone()),
                None => dropped += 1,
            },
        }
    }
    chunks.extend(current);

    log::debug!(
        "stitched {} lines into {} chunks ({} stray lines dropped)",
        lines.len(),
        chunks.len(),
        dropped
    );
    chunks
}
