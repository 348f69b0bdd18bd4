use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use mutasi_core::{
    parse_indonesian_date, read_transactions_csv_path, transactions_to_csv, Transaction,
};
use mutasi_ingest::{
    looks_like_statement_file, ParseProgress, ParsedStatement, PdfDocument, StatementParser,
};
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod state;

use config::{Config, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "mutasi", version, about = "Bank Jago statement PDF to CSV/JSON")]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement PDF into transactions
    Parse {
        pdf: PathBuf,

        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Output format (default from config, else csv)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Parse chunks on all cores
        #[arg(long)]
        parallel: bool,

        /// No progress or summary on stderr
        #[arg(long, short)]
        quiet: bool,
    },

    /// Print the filtered text rows of a PDF as `page: text`
    Lines { pdf: PathBuf },

    /// Re-read an exported CSV, keeping rows between two dates
    Filter {
        csv: PathBuf,

        /// First day kept, written as on the statement ("1 Jun 2021")
        #[arg(long, value_parser = statement_date)]
        from: Option<NaiveDate>,

        /// Last day kept
        #[arg(long, value_parser = statement_date)]
        to: Option<NaiveDate>,

        /// Output format (default from config, else csv)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Manage ~/.mutasi/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    match cli.command {
        Command::Parse {
            pdf,
            out,
            format,
            parallel,
            quiet,
        } => {
            let cfg = config::load_config()?;
            parse(&cfg, &pdf, out.as_deref(), format, parallel, quiet).await?;
        }

        Command::Lines { pdf } => {
            let cfg = config::load_config()?;
            let parser = StatementParser::new(cfg.parser);
            let doc =
                PdfDocument::load(&pdf).with_context(|| format!("opening {}", pdf.display()))?;
            for line in parser.extract_lines(&doc, &mut |_| {})? {
                println!("{}: {}", line.page, line.text);
            }
        }

        Command::Filter {
            csv,
            from,
            to,
            format,
        } => {
            let cfg = config::load_config()?;
            let txns: Vec<Transaction> = read_transactions_csv_path(&csv)?
                .into_iter()
                .filter(|t| from.is_none_or(|d| t.date >= d) && to.is_none_or(|d| t.date <= d))
                .collect();
            log::info!("{} rows kept from {}", txns.len(), csv.display());

            let rendered = match format.unwrap_or(cfg.output.format) {
                OutputFormat::Csv => transactions_to_csv(&txns)?,
                OutputFormat::Json if cfg.output.pretty => serde_json::to_string_pretty(&txns)?,
                OutputFormat::Json => serde_json::to_string(&txns)?,
            };
            println!("{rendered}");
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&config::load_config()?)?);
            }
        },
    }

    Ok(())
}

async fn parse(
    cfg: &Config,
    pdf: &Path,
    out: Option<&Path>,
    format: Option<OutputFormat>,
    parallel: bool,
    quiet: bool,
) -> Result<()> {
    if !pdf.exists() {
        bail!("PDF not found: {}", pdf.display());
    }
    let name = pdf
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !looks_like_statement_file(&name) {
        log::warn!("{name} does not look like a Jago statement export; parsing anyway");
    }

    let mut options = cfg.parser.clone();
    options.parallel |= parallel;
    let parser = StatementParser::new(options);

    let parsed = parser
        .parse_file_async(pdf, &mut |event: &ParseProgress| {
            if !quiet {
                eprintln!("{event}");
            }
        })
        .await
        .with_context(|| format!("parsing {}", pdf.display()))?;

    let rendered = render(&parsed, format.unwrap_or(cfg.output.format), cfg.output.pretty)?;
    match out {
        Some(path) => {
            fs::write(path, &rendered).with_context(|| format!("write {}", path.display()))?;
        }
        None => println!("{rendered}"),
    }

    if !quiet {
        eprintln!(
            "Parsed {} transactions from {} ({} chunks skipped)",
            parsed.transactions.len(),
            pdf.display(),
            parsed.skipped.len()
        );
        for skip in &parsed.skipped {
            eprintln!("  skipped page {}: {}", skip.page, skip.first_line);
        }
    }
    Ok(())
}

fn statement_date(text: &str) -> Result<NaiveDate, String> {
    parse_indonesian_date(text)
        .ok_or_else(|| format!("expected a date like \"17 Jun 2021\", got {text:?}"))
}

fn render(parsed: &ParsedStatement, format: OutputFormat, pretty: bool) -> Result<String> {
    Ok(match format {
        OutputFormat::Csv => transactions_to_csv(&parsed.transactions)?,
        OutputFormat::Json if pretty => serde_json::to_string_pretty(parsed)?,
        OutputFormat::Json => serde_json::to_string(parsed)?,
    })
}
