// crates/eer_cli/src/main.rs
//
// Entry point: exit codes, typed error mapping, logging setup, and one
// handler per subcommand. Network commands run on a current-thread tokio
// runtime built on demand.

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Report or input failed validation (also bad flags / config).
    pub const VALIDATION: i32 = 2;
    /// The intake API answered with a non-success status (or has no such event).
    pub const REJECTED: i32 = 3;
    pub const IO: i32 = 4;
    /// Request did not complete, or a service replied in an unexpected shape.
    pub const NETWORK: i32 = 5;
}

use std::fmt;
use std::future::Future;
use std::path::Path;
use std::process::ExitCode;

use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Args, Command};

use eer_core::{EventReport, ValidationErrors};
use eer_form::{validate, validate_as_of, FormStore, SubmitBlocked, SubmitOutcome};
use eer_io::export::write_atomic;
use eer_io::prelude::*;
use eer_net::{
    classify_form, submit_form, ClientConfig, EventFilter, EventsClient, GeminiClassifier, Geocoder,
    NarrativeClassifier, NetError, SubmissionClient,
};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    Validation(String),
    Rejected(String),
    Io(String),
    Network(String),
}

impl fmt::Display for MainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MainError::Validation(m) | MainError::Rejected(m) | MainError::Io(m) | MainError::Network(m) => {
                f.write_str(m)
            }
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("eer: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };

    init_tracing(args.quiet);

    let rc = match run(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("eer: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// stderr logging; `RUST_LOG` wins over the default level.
fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Rejected(_) => REJECTED,
        MainError::Io(_) => IO,
        MainError::Network(_) => NETWORK,
    }
}

/// Translate eer_io::IoError into MainError buckets.
fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Json { .. } | IoError::Invalid(_) => MainError::Validation(e.to_string()),
        IoError::Path(_) | IoError::Csv(_) | IoError::Limit(_) => MainError::Io(e.to_string()),
    }
}

fn map_net_err(e: NetError) -> MainError {
    match e {
        NetError::Config(_) => MainError::Validation(e.to_string()),
        NetError::Network(_) | NetError::Http { .. } | NetError::Integration(_) => {
            MainError::Network(e.to_string())
        }
    }
}

fn run(args: &Args) -> Result<(), MainError> {
    match &args.command {
        Command::New { out, seed } => cmd_new(out.as_deref(), *seed),
        Command::Validate { report, today } => cmd_validate(report, *today),
        Command::Export { report, format, out } => cmd_export(report, (*format).into(), out),
        Command::Submit { report, api_url } => {
            let cfg = load_api_config(args, api_url.as_deref())?;
            cmd_submit(report, &cfg)
        }
        Command::List { country, from, to, api_url } => {
            let cfg = load_api_config(args, api_url.as_deref())?;
            let filter = EventFilter { country: country.clone(), event_start: *from, event_end: *to };
            cmd_list(&filter, &cfg)
        }
        Command::Show { id, api_url } => {
            let cfg = load_api_config(args, api_url.as_deref())?;
            cmd_show(id, &cfg)
        }
        Command::Classify { report, text, apply } => {
            let cfg = load_config(args)?;
            cmd_classify(report.as_deref(), text.as_deref(), *apply, &cfg)
        }
        Command::Geocode { country } => {
            let cfg = load_config(args)?;
            cmd_geocode(country, &cfg)
        }
    }
}

/// Defaults → --config file → environment.
fn load_config(args: &Args) -> Result<ClientConfig, MainError> {
    let mut cfg = match &args.config {
        Some(p) => ClientConfig::from_json_file(p).map_err(map_net_err)?,
        None => ClientConfig::default(),
    };
    cfg.apply_env().map_err(map_net_err)?;
    cfg.validate().map_err(map_net_err)?;
    Ok(cfg)
}

/// `load_config`, then `--api-url` on top.
fn load_api_config(args: &Args, api_url: Option<&str>) -> Result<ClientConfig, MainError> {
    let mut cfg = load_config(args)?;
    if let Some(url) = api_url {
        cfg.api_base_url = url.to_string();
        cfg.validate().map_err(map_net_err)?;
    }
    Ok(cfg)
}

fn block_on<F: Future>(fut: F) -> Result<F::Output, MainError> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| MainError::Io(format!("runtime: {e}")))?;
    Ok(rt.block_on(fut))
}

fn print_json<T: serde::Serialize + ?Sized>(v: &T) -> Result<(), MainError> {
    let text = serde_json::to_string_pretty(v).map_err(|e| MainError::Io(e.to_string()))?;
    println!("{text}");
    Ok(())
}

fn print_errors(errors: &ValidationErrors) {
    for (key, msg) in errors.iter() {
        println!("{key}: {msg}");
    }
}

fn load_store(path: &Path) -> Result<FormStore, MainError> {
    let report = read_report(path).map_err(map_io_err)?;
    FormStore::from_report(report).map_err(|e| MainError::Validation(e.to_string()))
}

// ------------------------------------------------------------------------------------------------
// Subcommands
// ------------------------------------------------------------------------------------------------

fn cmd_new(out: Option<&Path>, seed: Option<u64>) -> Result<(), MainError> {
    let store = match seed {
        Some(s) => FormStore::with_seed(s),
        None => FormStore::new(),
    };
    let text = to_json_pretty(store.report()).map_err(map_io_err)?;
    match out {
        Some(p) => {
            write_atomic(p, text.as_bytes()).map_err(map_io_err)?;
            info!(path = %p.display(), "blank report written");
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn cmd_validate(path: &Path, today: Option<eer_core::dates::NaiveDate>) -> Result<(), MainError> {
    let report = read_report(path).map_err(map_io_err)?;
    let errors = match today {
        Some(t) => validate_as_of(&report, t),
        None => validate(&report),
    };
    if errors.is_empty() {
        println!("ok");
        return Ok(());
    }
    print_errors(&errors);
    Err(MainError::Validation(format!("{} validation error(s)", errors.len())))
}

fn cmd_export(path: &Path, format: ExportFormat, out: &Path) -> Result<(), MainError> {
    let report = read_report(path).map_err(map_io_err)?;
    let written = write_export(out, &report, format).map_err(map_io_err)?;
    println!("{}", written.display());
    Ok(())
}

fn cmd_submit(path: &Path, cfg: &ClientConfig) -> Result<(), MainError> {
    let mut store = load_store(path)?;
    let client = SubmissionClient::new(cfg).map_err(map_net_err)?;
    debug!(endpoint = %client.endpoint(), "submitting");

    let result = block_on(submit_form(&mut store, &client))?;
    let message = store.message().map(|m| m.text.clone()).unwrap_or_default();
    match result {
        Ok(SubmitOutcome::Success { event_id, .. }) => {
            match event_id {
                Some(id) => println!("{message} (id {id})"),
                None => println!("{message}"),
            }
            Ok(())
        }
        Ok(SubmitOutcome::HttpError { .. }) => Err(MainError::Rejected(message)),
        Ok(SubmitOutcome::NetworkError { message: detail }) => {
            Err(MainError::Network(format!("{message} ({detail})")))
        }
        Err(SubmitBlocked::Invalid { error_count }) => {
            print_errors(store.errors());
            Err(MainError::Validation(format!("{message} ({error_count} error(s))")))
        }
        Err(SubmitBlocked::InFlight) => Err(MainError::Validation("a submission is already in flight".into())),
    }
}

fn cmd_classify(
    report: Option<&Path>,
    text: Option<&str>,
    apply: bool,
    cfg: &ClientConfig,
) -> Result<(), MainError> {
    let classifier = GeminiClassifier::new(cfg).map_err(map_net_err)?;

    let (classification, store) = match (report, text) {
        (Some(path), _) => {
            let mut store = load_store(path)?;
            if store.report().narrative_summary.trim().is_empty() {
                return Err(MainError::Validation("Narrative summary is required.".into()));
            }
            let c = block_on(classify_form(&mut store, &classifier))?
                .map_err(|e| MainError::Network(format!("Failed to analyze narrative: {e}")))?;
            (c, Some((path, store)))
        }
        (None, Some(t)) if !t.trim().is_empty() => {
            let c = block_on(classifier.classify(t))?
                .map_err(|e| MainError::Network(format!("Failed to analyze narrative: {e}")))?;
            (c, None)
        }
        _ => return Err(MainError::Validation("Narrative summary is required.".into())),
    };

    if apply {
        if let Some((path, store)) = store {
            write_report(path, store.report())?;
            info!(path = %path.display(), "classification applied");
        }
    }
    print_json(&classification)
}

fn cmd_list(filter: &EventFilter, cfg: &ClientConfig) -> Result<(), MainError> {
    let client = EventsClient::new(cfg).map_err(map_net_err)?;
    let events = block_on(client.list_events(filter))?.map_err(map_net_err)?;
    info!(count = events.len(), "events fetched");
    print_json(&events)
}

fn cmd_show(id: &str, cfg: &ClientConfig) -> Result<(), MainError> {
    let client = EventsClient::new(cfg).map_err(map_net_err)?;
    match block_on(client.get_event(id.trim()))?.map_err(map_net_err)? {
        Some(event) => print_json(&event),
        None => Err(MainError::Rejected(format!("Event not found: {id}"))),
    }
}

fn cmd_geocode(country: &str, cfg: &ClientConfig) -> Result<(), MainError> {
    let geocoder = Geocoder::new(cfg).map_err(map_net_err)?;
    let view = block_on(geocoder.initial_view(country))?;
    print_json(&view)
}

fn write_report(path: &Path, report: &EventReport) -> Result<(), MainError> {
    let text = to_json_pretty(report).map_err(map_io_err)?;
    write_atomic(path, text.as_bytes()).map_err(map_io_err)
}
