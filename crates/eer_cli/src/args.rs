//! crates/eer_cli/src/args.rs
//!
//! CLI surface: one subcommand per form action.
//! - Report paths are local files (no scheme://)
//! - `classify` takes exactly one of REPORT / --text; `--apply` needs REPORT
//! - Dates on the command line use the canonical `YYYY-MM-DD`

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use eer_core::dates::{NaiveDate, CANONICAL_FORMAT};
use eer_io::prelude::ExportFormat;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "eer",
    version,
    disable_help_subcommand = true,
    about = "Emergency event reports: validate, export, submit, classify, browse"
)]
pub struct Args {
    /// JSON client config (endpoints, timeouts, classifier model).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only warnings and errors on stderr.
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Write a blank report (stdout when --out is omitted).
    New {
        #[arg(long)]
        out: Option<PathBuf>,
        /// Seed for movement ids (reproducible output).
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check a report and list every problem.
    Validate {
        report: PathBuf,
        /// Reference date for the "not in the future" rules.
        #[arg(long, value_parser = parse_day)]
        today: Option<NaiveDate>,
    },
    /// Write the report as an export file into a directory.
    Export {
        report: PathBuf,
        #[arg(long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Validate, then send the report to the intake API.
    Submit {
        report: PathBuf,
        /// Overrides API_URL and the config file.
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Suggest a trigger and three priority needs from a narrative.
    Classify {
        #[arg(conflicts_with = "text")]
        report: Option<PathBuf>,
        #[arg(long)]
        text: Option<String>,
        /// Write the suggestion back into REPORT.
        #[arg(long)]
        apply: bool,
    },
    /// List events stored by the intake API.
    List {
        /// Only events in this country (case-insensitive).
        #[arg(long)]
        country: Option<String>,
        /// Only events starting on or after this date.
        #[arg(long, value_parser = parse_day)]
        from: Option<NaiveDate>,
        /// Only events ending on or before this date.
        #[arg(long, value_parser = parse_day)]
        to: Option<NaiveDate>,
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Print one stored event.
    Show {
        id: String,
        #[arg(long)]
        api_url: Option<String>,
    },
    /// Print the initial map view for a country.
    Geocode { country: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

/// Errors surfaced by argument validation after clap parsing.
#[derive(Debug)]
pub enum CliError {
    Missing(&'static str),
    NonLocalPath(String),
    NotFound(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            Missing(s) => write!(f, "missing required input: {s}"),
            NonLocalPath(p) => write!(f, "path must be a local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
        }
    }
}
impl std::error::Error for CliError {}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), CANONICAL_FORMAT).map_err(|_| format!("expected YYYY-MM-DD, got {s:?}"))
}

#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

fn ensure_local_file(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    if !p.is_file() {
        return Err(CliError::NotFound(p.display().to_string()));
    }
    Ok(())
}

/// Parse argv (clap exits on usage errors and --help) then apply the checks
/// clap cannot express.
pub fn parse_and_validate() -> Result<Args, CliError> {
    let args = Args::parse();
    validate_args(&args)?;
    Ok(args)
}

pub fn validate_args(args: &Args) -> Result<(), CliError> {
    if let Some(cfg) = &args.config {
        ensure_local_file(cfg)?;
    }
    match &args.command {
        Command::New { .. } | Command::Geocode { .. } | Command::List { .. } => Ok(()),
        Command::Show { id, .. } if id.trim().is_empty() => Err(CliError::Missing("event ID")),
        Command::Show { .. } => Ok(()),
        Command::Validate { report, .. } | Command::Export { report, .. } | Command::Submit { report, .. } => {
            ensure_local_file(report)
        }
        Command::Classify { report, text, apply } => match (report, text) {
            (Some(r), _) => ensure_local_file(r),
            (None, Some(_)) if *apply => Err(CliError::Missing("REPORT (required by --apply)")),
            (None, Some(_)) => Ok(()),
            (None, None) => Err(CliError::Missing("REPORT or --text")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("eer").chain(argv.iter().copied()))
    }

    #[test]
    fn day_parser() {
        assert_eq!(parse_day("2024-01-05").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert!(parse_day("05/01/2024").is_err());
    }

    #[test]
    fn scheme_detection() {
        assert!(has_scheme("https://x/report.json"));
        assert!(has_scheme("file:report.json"));
        assert!(!has_scheme("./reports/chad.json"));
    }

    #[test]
    fn classify_inputs_are_exclusive() {
        assert!(parse(&["classify", "r.json", "--text", "x"]).is_err());
        let a = parse(&["classify"]).unwrap();
        assert!(matches!(validate_args(&a), Err(CliError::Missing(_))));
        let a = parse(&["classify", "--text", "x"]).unwrap();
        assert!(validate_args(&a).is_ok());
    }

    #[test]
    fn apply_needs_a_report_file() {
        let a = parse(&["classify", "--text", "x", "--apply"]).unwrap();
        match validate_args(&a) {
            Err(CliError::Missing(what)) => assert!(what.contains("--apply"), "{what}"),
            other => panic!("expected Missing, got {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let a = parse(&["geocode", "Chad", "--quiet"]).unwrap();
        assert!(a.quiet);
        assert!(matches!(a.command, Command::Geocode { ref country } if country == "Chad"));
    }

    #[test]
    fn export_defaults() {
        let a = parse(&["export", "r.json"]).unwrap();
        match a.command {
            Command::Export { format, out, .. } => {
                assert_eq!(format, FormatArg::Json);
                assert_eq!(out, PathBuf::from("."));
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn list_filters_parse_as_days() {
        let a = parse(&["list", "--country", "Chad", "--from", "2024-01-01"]).unwrap();
        match a.command {
            Command::List { country, from, to, api_url } => {
                assert_eq!(country.as_deref(), Some("Chad"));
                assert_eq!(from, NaiveDate::from_ymd_opt(2024, 1, 1));
                assert_eq!(to, None);
                assert_eq!(api_url, None);
            }
            other => panic!("{other:?}"),
        }
        assert!(parse(&["list", "--to", "01/05/2024"]).is_err());
        let a = parse(&["show", " "]).unwrap();
        assert!(matches!(validate_args(&a), Err(CliError::Missing(_))));
    }

    #[test]
    fn missing_report_file() {
        let a = parse(&["validate", "/definitely/not/here.json"]).unwrap();
        assert!(matches!(validate_args(&a), Err(CliError::NotFound(_))));
    }
}
