//! Bank Jago "Pockets transactions history" chunk parser.
//!
//! One stitched chunk looks like:
//!   17 Jun 2021 BUDI SANTOSO Transfer Masuk Gaji bulan Juni 5.704.768 28.369.768
//!   18.01 ID#20210617ABC
//!
//! or, when the text layer breaks the row differently:
//!   17 Jun 2021
//!   18.01
//!   BUDI SANTOSO Transfer Masuk Gaji bulan Juni
//!   5.704.768 28.369.768
//!
//! The last two numeric tokens are amount and running balance. The remaining
//! text splits around a known transaction label into counterparty and note.

use std::cmp::Reverse;
use std::sync::LazyLock;

use mutasi_core::calendar::{parse_date_prefix, parse_time_prefix};
use mutasi_core::number::{normalize_number_separators, parse_idr_number};
use mutasi_core::Transaction;
use regex::Regex;

use crate::types::{SkipReason, TransactionChunk};

/// Transaction labels printed in the "Rincian" column.
pub const DETAIL_PHRASES: &[&str] = &[
    "Pembayaran dengan Jago Pay",
    "Pembayaran Produk Digital",
    "Isi Saldo Dompet Digital",
    "Tambah Uang Kantong",
    "Tarik Uang Kantong",
    "Pembatalan Transaksi",
    "Pembayaran QRIS",
    "Transaksi POS",
    "Transfer Masuk",
    "Transfer Keluar",
    "Reversal POS",
    "Pajak Bunga",
    "Bunga",
];

/// Longest first, so a phrase always beats a shorter phrase it contains.
static PHRASES_LONGEST_FIRST: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut phrases = DETAIL_PHRASES.to_vec();
    phrases.sort_by_key(|p| Reverse(p.len()));
    phrases
});

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bID#\s*([A-Za-z0-9_\-/]+)").expect("valid id regex"));

static REVERSAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(reversal|pembatalan)\b").expect("valid reversal regex"));

static NUMERIC_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+\-]?\$?[0-9][0-9.]*(?:,[0-9]+)?$").expect("valid numeric token regex")
});

/// Amount and balance pulled off the end of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct AmountSplit {
    pub amount: Option<f64>,
    pub balance: Option<f64>,
    /// The line without the two numeric tokens; unchanged if fewer than two were found
    pub stripped: String,
    /// Whether at least two numeric tokens were present
    pub found: bool,
}

fn clean_line(line: &str) -> String {
    normalize_number_separators(line.replace('\u{a0}', " ").trim())
}

/// Second-to-last numeric token is the amount, last is the balance.
pub fn extract_amount_and_balance(line: &str) -> AmountSplit {
    let norm = clean_line(line);
    let tokens: Vec<&str> = norm.split_whitespace().collect();

    let numeric: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| NUMERIC_TOKEN_RE.is_match(t))
        .map(|(i, _)| i)
        .collect();

    let [.., pos_amount, pos_balance] = numeric[..] else {
        return AmountSplit {
            amount: None,
            balance: None,
            stripped: norm,
            found: false,
        };
    };

    let stripped = tokens
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != pos_amount && *i != pos_balance)
        .map(|(_, t)| *t)
        .collect::<Vec<_>>()
        .join(" ");

    AmountSplit {
        amount: parse_idr_number(tokens[pos_amount]),
        balance: parse_idr_number(tokens[pos_balance]),
        stripped,
        found: true,
    }
}

/// Counterparty, label and note around the earliest known label in `body`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailSplit {
    pub source_or_destination: String,
    pub transaction_detail: String,
    pub note: String,
}

/// Find the earliest label occurrence (case-insensitive). At equal positions
/// the longer phrase wins. Without any label the whole body is the note.
pub fn split_detail(body: &str) -> DetailSplit {
    // ASCII lowercasing keeps byte offsets valid for slicing `body`.
    let low = body.to_ascii_lowercase();

    let mut best: Option<(usize, &'static str)> = None;
    for &phrase in PHRASES_LONGEST_FIRST.iter() {
        if let Some(idx) = low.find(&phrase.to_ascii_lowercase()) {
            if best.is_none_or(|(best_idx, _)| idx < best_idx) {
                best = Some((idx, phrase));
            }
        }
    }

    match best {
        Some((idx, phrase)) => DetailSplit {
            source_or_destination: body[..idx].trim().to_string(),
            transaction_detail: phrase.to_string(),
            note: body[idx + phrase.len()..].trim().to_string(),
        },
        None => DetailSplit {
            note: body.trim().to_string(),
            ..DetailSplit::default()
        },
    }
}

/// Distinct `ID#` tokens in first-seen order.
pub fn extract_ids(raw_text: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for caps in ID_RE.captures_iter(raw_text) {
        let id = &caps[1];
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    ids
}

pub fn is_reversal(raw_text: &str) -> bool {
    REVERSAL_RE.is_match(raw_text)
}

/// Where the time token was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeSource {
    /// Leading token of continuation line `index`
    Line { index: usize },
    /// Right after the date on the first line
    FirstLine,
}

fn find_time(
    chunk: &TransactionChunk,
    first_rest: &str,
) -> Option<(chrono::NaiveTime, TimeSource)> {
    let from_lines = chunk
        .lines
        .iter()
        .enumerate()
        .skip(1)
        .take(3)
        .find_map(|(index, line)| {
            parse_time_prefix(line.trim()).map(|t| (t.time, TimeSource::Line { index }))
        });

    from_lines.or_else(|| parse_time_prefix(first_rest).map(|t| (t.time, TimeSource::FirstLine)))
}

/// First line without its date prefix and a leading time token.
fn first_line_body(norm_first: &str) -> String {
    let rest = match parse_date_prefix(norm_first) {
        Some(p) => &norm_first[p.matched.len()..],
        None => norm_first,
    };
    let rest = rest.trim();
    let rest = match parse_time_prefix(rest) {
        Some(t) => &rest[t.matched.len()..],
        None => rest,
    };
    rest.trim().to_string()
}

/// The record's pieces in order: first-line body, then continuation lines,
/// with the consumed time token removed from its line. Empty pieces dropped.
fn fold_parts(
    chunk: &TransactionChunk,
    body: &str,
    time_source: Option<TimeSource>,
) -> Vec<String> {
    let mut parts = vec![body.to_string()];
    for (index, line) in chunk.lines.iter().enumerate().skip(1) {
        let line = clean_line(line);
        let line = match time_source {
            Some(TimeSource::Line { index: t }) if t == index => match parse_time_prefix(&line) {
                Some(tp) => line[tp.matched.len()..].trim().to_string(),
                None => line,
            },
            _ => line,
        };
        parts.push(line);
    }
    parts.retain(|p| !p.is_empty());
    parts
}

fn is_numeric_token(token: &str) -> bool {
    NUMERIC_TOKEN_RE.is_match(token)
}

/// Two or more tokens, all numeric.
fn is_numbers_only(line: &str) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    tokens.len() >= 2 && tokens.iter().all(|t| is_numeric_token(t))
}

/// Amount and balance for a record whose first line lacks them. Accepted
/// only when the record ends in two numbers, or one of its lines holds
/// nothing but numbers; digits inside free text never qualify.
fn folded_amounts(parts: &[String]) -> Option<AmountSplit> {
    let folded = parts.join(" ");
    let tokens: Vec<&str> = folded.split_whitespace().collect();
    if let [.., a, b] = tokens[..] {
        if is_numeric_token(a) && is_numeric_token(b) {
            return Some(extract_amount_and_balance(&folded));
        }
    }

    let index = parts.iter().position(|p| is_numbers_only(p))?;
    let numbers = extract_amount_and_balance(&parts[index]);
    let stripped = parts
        .iter()
        .enumerate()
        .map(|(i, p)| if i == index { numbers.stripped.as_str() } else { p.as_str() })
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Some(AmountSplit { stripped, ..numbers })
}

/// Turn one stitched chunk into a transaction.
///
/// Only an unresolvable date rejects the chunk; every other field degrades
/// to `None` or an empty string.
pub fn parse_chunk(chunk: &TransactionChunk, source_file: &str) -> Result<Transaction, SkipReason> {
    let first = chunk.first_line();
    let prefix = parse_date_prefix(first).ok_or(SkipReason::UnknownDate)?;
    let date = prefix.to_date().ok_or(SkipReason::UnknownDate)?;

    let first_rest = first[prefix.matched.len()..].trim();
    let time_found = find_time(chunk, first_rest);
    let time_source = time_found.map(|(_, source)| source);

    let body = first_line_body(&clean_line(first));
    let mut split = extract_amount_and_balance(&body);
    if !split.found {
        if let Some(folded) = folded_amounts(&fold_parts(chunk, &body, time_source)) {
            split = folded;
        }
    }

    let raw_text = chunk.raw_text();
    let ids = extract_ids(&raw_text);
    let detail = split_detail(&split.stripped);

    let mut txn = Transaction::new(
        source_file,
        chunk.page,
        date,
        time_found.map(|(t, _)| t),
        raw_text,
    );
    txn.source_or_destination = detail.source_or_destination;
    txn.transaction_detail = detail.transaction_detail;
    txn.note = detail.note;
    txn.amount = split.amount;
    txn.balance = split.balance;
    txn.transaction_id = ids.first().cloned();
    txn.transaction_ids = (!ids.is_empty()).then(|| ids.join(";"));
    txn.is_reversal = is_reversal(&txn.raw_text);
    Ok(txn)
}

/// Heuristic file-name check used before offering a file to this parser.
pub fn looks_like_statement_file(name: &str) -> bool {
    let name = name.to_lowercase();
    name.ends_with(".pdf")
        && (name.contains("jago") || name.contains("history") || name.contains("transaksi"))
}
