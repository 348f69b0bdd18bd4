//! CSV hand-off format between the statement parser and its consumers.
//!
//! Fixed column order:
//!   source_file,page,date,time,datetime,source_or_destination,transaction_detail,
//!   note,amount,balance,currency,transaction_id,transaction_ids,is_reversal,raw_text
//!
//! Fields containing a comma, quote or newline are quoted with internal quotes
//! doubled. Missing values are empty fields. Rows are joined with `\n`.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::io::{Read, Write};
use std::path::Path;

use crate::transaction::Transaction;

pub const CSV_COLUMNS: [&str; 15] = [
    "source_file",
    "page",
    "date",
    "time",
    "datetime",
    "source_or_destination",
    "transaction_detail",
    "note",
    "amount",
    "balance",
    "currency",
    "transaction_id",
    "transaction_ids",
    "is_reversal",
    "raw_text",
];

fn fmt_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn fmt_bool(value: bool) -> &'static str {
    // Consumers of the hand-off compare against the capitalised spelling.
    if value { "True" } else { "False" }
}

fn to_record(txn: &Transaction) -> [String; 15] {
    [
        txn.source_file.clone(),
        txn.page.to_string(),
        txn.date_string(),
        txn.time_string().unwrap_or_default(),
        txn.datetime_string().unwrap_or_default(),
        txn.source_or_destination.clone(),
        txn.transaction_detail.clone(),
        txn.note.clone(),
        fmt_number(txn.amount),
        fmt_number(txn.balance),
        txn.currency.clone(),
        txn.transaction_id.clone().unwrap_or_default(),
        txn.transaction_ids.clone().unwrap_or_default(),
        fmt_bool(txn.is_reversal).to_string(),
        txn.raw_text.clone(),
    ]
}

/// Write the header and one row per transaction. Every row, including the
/// last, is terminated by `\n`.
pub fn write_transactions_csv<W: Write>(out: W, txns: &[Transaction]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    wtr.write_record(CSV_COLUMNS).context("writing CSV header")?;
    for txn in txns {
        wtr.write_record(to_record(txn))
            .with_context(|| format!("writing CSV row for {} p.{}", txn.date_string(), txn.page))?;
    }
    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

/// Render the hand-off CSV as a string (rows joined with `\n`, no trailing newline).
pub fn transactions_to_csv(txns: &[Transaction]) -> Result<String> {
    let mut buf = Vec::new();
    write_transactions_csv(&mut buf, txns)?;
    let mut text = String::from_utf8(buf).context("CSV output is not UTF-8")?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    source_file: String,
    page: u32,
    date: NaiveDate,
    #[serde(default, deserialize_with = "crate::serde_fmt::hm::deserialize")]
    time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "crate::serde_fmt::ymd_hm::deserialize")]
    datetime: Option<NaiveDateTime>,
    #[serde(default)]
    source_or_destination: String,
    #[serde(default)]
    transaction_detail: String,
    #[serde(default)]
    note: String,
    amount: Option<f64>,
    balance: Option<f64>,
    #[serde(default)]
    currency: String,
    transaction_id: Option<String>,
    transaction_ids: Option<String>,
    #[serde(deserialize_with = "crate::serde_fmt::py_bool::deserialize")]
    is_reversal: bool,
    #[serde(default)]
    raw_text: String,
}

impl From<CsvRow> for Transaction {
    fn from(row: CsvRow) -> Self {
        let mut txn = Transaction::new(row.source_file, row.page, row.date, row.time, row.raw_text);
        // A consumer may have hand-edited the file; keep what it says.
        if row.datetime.is_some() {
            txn.datetime = row.datetime;
        }
        txn.source_or_destination = row.source_or_destination;
        txn.transaction_detail = row.transaction_detail;
        txn.note = row.note;
        txn.amount = row.amount;
        txn.balance = row.balance;
        if !row.currency.is_empty() {
            txn.currency = row.currency;
        }
        txn.transaction_id = row.transaction_id;
        txn.transaction_ids = row.transaction_ids;
        txn.is_reversal = row.is_reversal;
        txn
    }
}

/// Read hand-off CSV back into transactions (consumer side).
pub fn read_transactions_csv<R: Read>(input: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(input);

    let mut txns = Vec::new();
    for (i, result) in rdr.deserialize::<CsvRow>().enumerate() {
        // +2: header line plus 1-based numbering
        let row = result.with_context(|| format!("reading CSV row {}", i + 2))?;
        txns.push(Transaction::from(row));
    }
    Ok(txns)
}

/// Read a hand-off CSV file from disk.
pub fn read_transactions_csv_path(path: impl AsRef<Path>) -> Result<Vec<Transaction>> {
    let file = std::fs::File::open(path.as_ref())
        .with_context(|| format!("opening {}", path.as_ref().display()))?;
    read_transactions_csv(file).with_context(|| format!("parsing {}", path.as_ref().display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn() -> Transaction {
        let date = NaiveDate::from_ymd_opt(2021, 6, 17).unwrap();
        let time = NaiveTime::from_hms_opt(18, 1, 0);
        let mut t = Transaction::new(
            "jago.pdf",
            2,
            date,
            time,
            "17 Jun 2021 BUDI, SANTOSO Transfer Masuk 5.704.768 28.369.768\n18.01 ID#TX1",
        );
        t.source_or_destination = "BUDI, SANTOSO".to_string();
        t.transaction_detail = "Transfer Masuk".to_string();
        t.note = "Gaji \"Juni\"".to_string();
        t.amount = Some(5_704_768.0);
        t.balance = Some(28_369.1);
        t.transaction_id = Some("TX1".to_string());
        t.transaction_ids = Some("TX1".to_string());
        t
    }

    #[test]
    fn test_header_order() {
        let csv = transactions_to_csv(&[]).unwrap();
        assert_eq!(
            csv,
            "source_file,page,date,time,datetime,source_or_destination,transaction_detail,note,amount,balance,currency,transaction_id,transaction_ids,is_reversal,raw_text"
        );
    }

    #[test]
    fn test_row_escaping_and_values() {
        let csv = transactions_to_csv(&[txn()]).unwrap();
        let mut lines = csv.splitn(2, '\n');
        lines.next();
        let row = lines.next().unwrap();

        assert!(row.starts_with("jago.pdf,2,2021-06-17,18:01,2021-06-17 18:01,\"BUDI, SANTOSO\",Transfer Masuk,"));
        assert!(row.contains(",\"Gaji \"\"Juni\"\"\","));
        assert!(row.contains(",5704768,28369.1,IDR,TX1,TX1,False,"));
        assert!(row.ends_with("\"17 Jun 2021 BUDI, SANTOSO Transfer Masuk 5.704.768 28.369.768\n18.01 ID#TX1\""));
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_missing_values_are_empty_fields() {
        let date = NaiveDate::from_ymd_opt(2021, 6, 17).unwrap();
        let t = Transaction::new("a.pdf", 1, date, None, "17 Jun 2021");
        let csv = transactions_to_csv(&[t]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "a.pdf,1,2021-06-17,,,,,,,,IDR,,,False,17 Jun 2021");
    }

    #[test]
    fn test_reads_back_what_it_writes() {
        let mut reversal = txn();
        reversal.is_reversal = true;
        reversal.time = None;
        reversal.datetime = None;
        reversal.amount = None;

        let csv = transactions_to_csv(&[txn(), reversal.clone()]).unwrap();
        let back = read_transactions_csv(csv.as_bytes()).unwrap();
        assert_eq!(back, vec![txn(), reversal]);
    }

    #[test]
    fn test_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, transactions_to_csv(&[txn()]).unwrap()).unwrap();

        let back = read_transactions_csv_path(&path).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].transaction_detail, "Transfer Masuk");
    }

    #[test]
    fn test_bad_date_is_reported_with_row() {
        let csv = format!("{}\njago.pdf,1,not-a-date,,,,,,,,IDR,,,False,x", CSV_COLUMNS.join(","));
        let err = read_transactions_csv(csv.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("row 2"));
    }
}
