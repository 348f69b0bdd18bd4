//! The structured ledger entry recovered from one stitched statement chunk

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Jago statements carry no per-row currency marker.
pub const CURRENCY: &str = "IDR";

/// One transaction as reconstructed from the statement PDF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Originating file name (passthrough, never derived from content)
    pub source_file: String,
    /// 1-based page of the date-bearing line
    pub page: u32,
    pub date: NaiveDate,
    #[serde(default, with = "crate::serde_fmt::hm")]
    pub time: Option<NaiveTime>,
    /// `date` + `time`; `None` whenever `time` is `None`
    #[serde(default, with = "crate::serde_fmt::ymd_hm")]
    pub datetime: Option<NaiveDateTime>,
    /// Counterparty text before the recognised label, may be empty
    pub source_or_destination: String,
    /// Canonical label from the known vocabulary, or empty
    pub transaction_detail: String,
    pub note: String,
    /// Positive = credit/income, negative = debit/expense
    pub amount: Option<f64>,
    /// Running balance after this transaction
    pub balance: Option<f64>,
    pub currency: String,
    pub transaction_id: Option<String>,
    /// All distinct ids, `;`-joined
    pub transaction_ids: Option<String>,
    pub is_reversal: bool,
    /// Stitched source lines, newline-joined
    pub raw_text: String,
}

impl Transaction {
    /// Create a record with empty text fields; `datetime` follows `time`.
    pub fn new(
        source_file: impl Into<String>,
        page: u32,
        date: NaiveDate,
        time: Option<NaiveTime>,
        raw_text: impl Into<String>,
    ) -> Self {
        Self {
            source_file: source_file.into(),
            page,
            date,
            time,
            datetime: time.map(|t| date.and_time(t)),
            source_or_destination: String::new(),
            transaction_detail: String::new(),
            note: String::new(),
            amount: None,
            balance: None,
            currency: CURRENCY.to_string(),
            transaction_id: None,
            transaction_ids: None,
            is_reversal: false,
            raw_text: raw_text.into(),
        }
    }

    /// Returns true if money came in
    pub fn is_income(&self) -> bool {
        self.amount.is_some_and(|a| a > 0.0)
    }

    /// Returns true if money went out
    pub fn is_expense(&self) -> bool {
        self.amount.is_some_and(|a| a < 0.0)
    }

    /// `YYYY-MM-DD`
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// `HH:MM`
    pub fn time_string(&self) -> Option<String> {
        self.time
            .map(|t| t.format(crate::serde_fmt::hm::FORMAT).to_string())
    }

    /// `YYYY-MM-DD HH:MM`
    pub fn datetime_string(&self) -> Option<String> {
        self.datetime
            .map(|dt| dt.format(crate::serde_fmt::ymd_hm::FORMAT).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        let date = NaiveDate::from_ymd_opt(2021, 6, 17).unwrap();
        let time = NaiveTime::from_hms_opt(18, 1, 0);
        let mut t = Transaction::new("jago.pdf", 1, date, time, "17 Jun 2021\n18.01");
        t.amount = Some(5_704_768.0);
        t.balance = Some(28_369_768.0);
        t
    }

    #[test]
    fn test_datetime_follows_time() {
        let t = sample();
        assert_eq!(t.datetime_string().as_deref(), Some("2021-06-17 18:01"));
        assert_eq!(t.time_string().as_deref(), Some("18:01"));
        assert_eq!(t.currency, "IDR");

        let no_time = Transaction::new("jago.pdf", 1, t.date, None, "");
        assert!(no_time.datetime.is_none());
        assert!(no_time.datetime_string().is_none());
    }

    #[test]
    fn test_income_expense() {
        let mut t = sample();
        assert!(t.is_income());
        t.amount = Some(-14_548.0);
        assert!(t.is_expense());
        t.amount = None;
        assert!(!t.is_income() && !t.is_expense());
    }

    #[test]
    fn test_json_shape() {
        let t = sample();
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["date"], "2021-06-17");
        assert_eq!(v["time"], "18:01");
        assert_eq!(v["datetime"], "2021-06-17 18:01");
        assert_eq!(v["transaction_id"], serde_json::Value::Null);
        assert_eq!(v["is_reversal"], false);

        let back: Transaction = serde_json::from_value(v).unwrap();
        assert_eq!(back, t);
    }
}
