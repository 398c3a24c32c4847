//! Local export of reports (no server round-trip).
//! - Names: `emergency_event_report_{country|"data"}.{json|csv}`
//! - Files are replaced whole, through a temp file in the target directory
//! - Reading back is size-limited and goes through the strict JSON reader.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use eer_core::EventReport;
use tracing::{debug, info};

use crate::{csv_export, json, IoError, IoResult};

/// Upper bound on report files accepted by `read_report`.
pub const MAX_REPORT_BYTES: u64 = 8 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// `emergency_event_report_{country}.{ext}`; an empty country becomes `data`.
/// Path separators in the country are replaced so the name stays one segment.
pub fn export_file_name(report: &EventReport, format: ExportFormat) -> String {
    let country = report.country.trim();
    let stem = if country.is_empty() {
        "data".to_string()
    } else {
        country.replace(['/', '\\'], "_")
    };
    format!("emergency_event_report_{stem}.{}", format.extension())
}

/// Export text for `format`.
pub fn render(report: &EventReport, format: ExportFormat) -> IoResult<String> {
    match format {
        ExportFormat::Json => json::to_json_pretty(report),
        ExportFormat::Csv => csv_export::to_csv(report),
    }
}

/// Render and atomically write the export into `dir`; returns the file path.
pub fn write_export(dir: &Path, report: &EventReport, format: ExportFormat) -> IoResult<PathBuf> {
    let text = render(report, format)?;
    let path = dir.join(export_file_name(report, format));
    write_atomic(&path, text.as_bytes())?;
    info!(path = %path.display(), rows = report.movements.len(), "export written");
    Ok(path)
}

/// Read a report JSON file (bounded) and parse it strictly.
pub fn read_report(path: &Path) -> IoResult<EventReport> {
    let f = File::open(path).map_err(|e| IoError::Path(format!("open {}: {e}", path.display())))?;
    let mut buf = String::new();
    f.take(MAX_REPORT_BYTES + 1).read_to_string(&mut buf)?;
    if buf.len() as u64 > MAX_REPORT_BYTES {
        return Err(IoError::Limit(format!(
            "{} exceeds {MAX_REPORT_BYTES} bytes",
            path.display()
        )));
    }
    debug!(path = %path.display(), bytes = buf.len(), "report read");
    json::from_json_str(&buf)
}

/// Replace `path` with `bytes`: the data goes to a synced temp file next to
/// the target, which is then renamed over it. Readers see the old file or
/// the new one, never a partial export.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> IoResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let at = |step: &str, e: io::Error| IoError::Path(format!("{step} {}: {e}", path.display()));

    fs::create_dir_all(dir).map_err(|e| at("create directory for", e))?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".eer-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| at("stage", e))?;
    tmp.write_all(bytes).map_err(|e| at("write", e))?;
    tmp.as_file().sync_all().map_err(|e| at("sync", e))?;
    // on error the temp file is removed when `PersistError` drops
    tmp.persist(path).map_err(|e| at("replace", e.error))?;
    sync_dir(dir);
    debug!(path = %path.display(), bytes = bytes.len(), "file replaced");
    Ok(())
}

/// Make the rename durable. Best effort: the data itself is already synced.
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
        debug!(dir = %dir.display(), error = %e, "directory sync skipped");
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
