//! Indonesian calendar tokens as printed on Jago statements.
//!
//!   17 Jun 2021          date prefix, month names in Indonesian or English
//!   18.01 / 18:01        time prefix, separator varies between exports

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use std::sync::LazyLock;

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})\s+([A-Za-z]{3})\s+(\d{4})\b").expect("valid date prefix regex")
});

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})[.:](\d{2})\b").expect("valid time prefix regex"));

static DATE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d{1,2}\s+[A-Za-z]{3}\s+\d{4}\s*-\s*\d{1,2}\s+[A-Za-z]{3}\s+\d{4}\b")
        .expect("valid date range regex")
});

/// Month number for a 3-letter month token (case-insensitive).
pub fn month_number(token: &str) -> Option<u32> {
    let month = match token.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "mei" | "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "agt" | "agu" | "aug" => 8,
        "sep" => 9,
        "okt" | "oct" => 10,
        "nov" => 11,
        "des" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// A `D Mon YYYY` token found at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePrefix<'a> {
    /// The exact text that matched, used to cut the prefix off the line.
    pub matched: &'a str,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DatePrefix<'_> {
    /// `None` for impossible dates such as `31 Feb 2021`.
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

/// A `H.MM` / `H:MM` token found at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePrefix<'a> {
    pub matched: &'a str,
    pub time: NaiveTime,
}

/// Match a leading Indonesian short date. The month token must be known,
/// the day is not range-checked here (see [`DatePrefix::to_date`]).
pub fn parse_date_prefix(text: &str) -> Option<DatePrefix<'_>> {
    let caps = DATE_RE.captures(text)?;
    let month = month_number(&caps[2])?;
    let day: u32 = caps[1].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    Some(DatePrefix {
        matched: caps.get(0)?.as_str(),
        year,
        month,
        day,
    })
}

/// Match a leading time token. Out-of-range values (`25.10`, `10.75`) do not match.
pub fn parse_time_prefix(text: &str) -> Option<TimePrefix<'_>> {
    let caps = TIME_RE.captures(text)?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0)?;

    Some(TimePrefix {
        matched: caps.get(0)?.as_str(),
        time,
    })
}

/// Parse `"17 Jun 2021"` (and anything it prefixes) into a calendar date.
pub fn parse_indonesian_date(text: &str) -> Option<NaiveDate> {
    parse_date_prefix(text.trim())?.to_date()
}

/// Report banners such as `17 Jun 2021 - 12 Des 2025`.
pub fn is_date_range_banner(text: &str) -> bool {
    DATE_RANGE_RE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_every_month_spelling_resolves() {
        let cases = [
            ("Jan", 1),
            ("Feb", 2),
            ("Mar", 3),
            ("Apr", 4),
            ("Mei", 5),
            ("May", 5),
            ("Jun", 6),
            ("Jul", 7),
            ("Agt", 8),
            ("Agu", 8),
            ("Aug", 8),
            ("Sep", 9),
            ("Okt", 10),
            ("Oct", 10),
            ("Nov", 11),
            ("Des", 12),
            ("Dec", 12),
        ];

        for (token, month) in cases {
            let text = format!("5 {token} 2023");
            let date = parse_indonesian_date(&text).unwrap();
            assert_eq!(date, ymd(2023, month, 5), "{text}");
            assert_eq!(
                date.format("%Y-%m-%d").to_string(),
                format!("2023-{month:02}-05")
            );
        }
    }

    #[test]
    fn test_month_token_is_case_insensitive() {
        assert_eq!(parse_indonesian_date("17 JUN 2021"), Some(ymd(2021, 6, 17)));
        assert_eq!(parse_indonesian_date("17 des 2021"), Some(ymd(2021, 12, 17)));
    }

    #[test]
    fn test_date_prefix_keeps_matched_text() {
        let p = parse_date_prefix("17 Jun 2021 BUDI Transfer Masuk").unwrap();
        assert_eq!(p.matched, "17 Jun 2021");
        assert_eq!((p.year, p.month, p.day), (2021, 6, 17));
    }

    #[test]
    fn test_unknown_month_or_bad_day() {
        assert!(parse_date_prefix("17 Abc 2021").is_none());
        assert!(parse_date_prefix("Juli 2021").is_none());
        // Matches as a prefix but is not a real day.
        let p = parse_date_prefix("31 Feb 2021").unwrap();
        assert!(p.to_date().is_none());
    }

    #[test]
    fn test_time_prefix_both_separators() {
        let t = parse_time_prefix("18.01").unwrap();
        assert_eq!(t.time, NaiveTime::from_hms_opt(18, 1, 0).unwrap());
        let t = parse_time_prefix("7:05 ID#abc").unwrap();
        assert_eq!(t.matched, "7:05");
        assert_eq!(t.time, NaiveTime::from_hms_opt(7, 5, 0).unwrap());
    }

    #[test]
    fn test_time_prefix_rejects_out_of_range_and_numbers() {
        assert!(parse_time_prefix("25.10").is_none());
        assert!(parse_time_prefix("10.75").is_none());
        assert!(parse_time_prefix("5.704.768").is_none());
        assert!(parse_time_prefix("Transfer 18.01").is_none());
    }

    #[test]
    fn test_date_range_banner() {
        assert!(is_date_range_banner("17 Jun 2021 - 12 Des 2025"));
        assert!(is_date_range_banner("1 jan 2024-31 jan 2024"));
        assert!(!is_date_range_banner("17 Jun 2021 Transfer Masuk 1.000 2.000"));
    }
}
