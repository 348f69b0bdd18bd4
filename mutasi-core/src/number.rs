//! Indonesian-locale number parsing.
//!
//! Dots group thousands, a comma starts the fraction:
//!   5.704.768   -> 5704768
//!   28.369,10   -> 28369.10
//!   -14.548     -> -14548
//!   5.704. 768  -> 5704768   (split by the PDF text layer)

use regex::Regex;
use std::sync::LazyLock;

static SPLIT_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\.\s+(\d)").expect("valid separator regex"));

/// Rejoin thousands groups split by the text layer: a digit, a dot,
/// whitespace, then a digit loses the whitespace (`5. 704` -> `5.704`).
pub fn normalize_number_separators(s: &str) -> String {
    let mut out = s.to_string();
    // Adjacent matches share a digit, so one pass can leave a split behind.
    while SPLIT_SEPARATOR_RE.is_match(&out) {
        out = SPLIT_SEPARATOR_RE.replace_all(&out, "${1}.${2}").into_owned();
    }
    out
}

/// Parse an IDR amount. Returns `None` for empty or unparseable input.
pub fn parse_idr_number(s: &str) -> Option<f64> {
    let raw = s.trim();
    if raw.is_empty() {
        return None;
    }

    let negative = raw.starts_with('-');
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let digits = match cleaned.rfind(',') {
        Some(idx) => {
            let int_part = cleaned[..idx].replace(['.', ','], "");
            let frac_part = &cleaned[idx + 1..];
            let frac_part = if frac_part.is_empty() { "0" } else { frac_part };
            format!("{int_part}.{frac_part}")
        }
        None => cleaned.replace('.', ""),
    };

    let value: f64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}
