//! Rebuild visual rows from positioned runs and drop page boilerplate.

use std::collections::BTreeMap;

use crate::pdf_text::GlyphRun;
use crate::types::RawLine;

/// Substrings that mark a row as header/footer/legal text wherever they occur.
const NOISE_CONTAINS: &[&str] = &[
    "pockets transactions history",
    "pt bank jago",
    "www.jago.com",
    "menampilkan transaksi",
    "info penting",
    "dokumen ini adalah",
];

/// Row prefixes: page footers and column/summary labels.
const NOISE_PREFIXES: &[&str] = &["halaman ", "tanggal & waktu", "saldo terbaru"];

/// Case-insensitive boilerplate matcher, extensible from configuration.
#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    extra: Vec<String>,
}

impl NoiseFilter {
    pub fn new(extra: &[String]) -> Self {
        Self {
            extra: extra
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn is_noise(&self, row: &str) -> bool {
        let low = row.trim().to_lowercase();
        if low.is_empty() {
            return true;
        }
        if NOISE_CONTAINS.iter().any(|p| low.contains(*p)) {
            return true;
        }
        if NOISE_PREFIXES.iter().any(|p| low.starts_with(*p)) {
            return true;
        }
        // Two-column table header
        if low.contains("sumber/tujuan") && low.contains("rincian") {
            return true;
        }
        self.extra.iter().any(|p| low.contains(p.as_str()))
    }
}

/// Group runs into rows top-to-bottom, each row read left-to-right.
///
/// Runs whose baselines round to the same integer y share a row, which
/// absorbs sub-point jitter between glyph runs of one visual line.
pub fn rows_from_runs(runs: &[GlyphRun]) -> Vec<String> {
    let mut by_y: BTreeMap<i64, Vec<&GlyphRun>> = BTreeMap::new();
    for run in runs.iter().filter(|r| !r.text.trim().is_empty()) {
        by_y.entry(run.y.round() as i64).or_default().push(run);
    }

    // PDF origin is bottom-left: highest y reads first.
    by_y.into_values()
        .rev()
        .map(|mut row| {
            row.sort_by(|a, b| a.x.total_cmp(&b.x));
            row.iter()
                .map(|r| r.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
                .replace('\u{a0}', " ")
                .trim()
                .to_string()
        })
        .collect()
}

/// Rows of one page that survive the boilerplate filter.
pub fn page_lines(page: u32, runs: &[GlyphRun], filter: &NoiseFilter) -> Vec<RawLine> {
    rows_from_runs(runs)
        .into_iter()
        .filter(|row| !filter.is_noise(row))
        .map(|text| RawLine::new(page, text))
        .collect()
}
