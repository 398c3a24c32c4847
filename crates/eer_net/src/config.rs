//! crates/eer_net/src/config.rs
//! Endpoint and credential configuration.
//!
//! Layering: `Default` → optional JSON file → environment → explicit
//! overrides by the caller (CLI flags). Every layer may be partial.

use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{NetError, NetResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_CLASSIFIER_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Config files are small; anything larger is rejected unread.
const MAX_CONFIG_BYTES: u64 = 64 * 1024;

/// Narrative classifier (Gemini `generateContent`) settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// API root, without the `/v1beta/...` path.
    pub base_url: String,
    pub model: String,
    /// Sent as `x-goog-api-key`. Required for classification only.
    pub api_key: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CLASSIFIER_URL.to_string(),
            model: DEFAULT_CLASSIFIER_MODEL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Intake API root; reports go to `{api_base_url}/submit-event`.
    pub api_base_url: String,
    /// Nominatim-compatible search endpoint.
    pub geocoder_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub classifier: ClassifierConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: concat!("eer/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            classifier: ClassifierConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> NetResult<Self> {
        let meta = std::fs::metadata(path)
            .map_err(|e| NetError::Config(format!("{}: {e}", path.display())))?;
        if meta.len() > MAX_CONFIG_BYTES {
            return Err(NetError::Config(format!(
                "{}: config file larger than {MAX_CONFIG_BYTES} bytes",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| NetError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text).map_err(|e| NetError::Config(format!("{}: {e}", path.display())))
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) -> NetResult<()> {
        self.apply_env_with(|k| std::env::var(k).ok())
    }

    /// Overlay values from an arbitrary variable source. Empty values are
    /// treated as unset.
    pub fn apply_env_with<F>(&mut self, get: F) -> NetResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |k: &str| get(k).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("API_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = var("EER_GEOCODER_URL") {
            self.geocoder_url = v;
        }
        if let Some(v) = var("EER_CLASSIFIER_URL") {
            self.classifier.base_url = v;
        }
        if let Some(v) = var("EER_CLASSIFIER_MODEL") {
            self.classifier.model = v;
        }
        if let Some(v) = var("API_KEY").or_else(|| var("GEMINI_API_KEY")) {
            self.classifier.api_key = Some(v);
        }
        if let Some(v) = var("EER_HTTP_TIMEOUT_SECS") {
            self.timeout_seconds = v
                .trim()
                .parse()
                .map_err(|_| NetError::Config(format!("EER_HTTP_TIMEOUT_SECS: not a number: {v:?}")))?;
        }
        debug!(api = %self.api_base_url, model = %self.classifier.model, "client config resolved");
        Ok(())
    }

    /// Structural checks: URLs parse, timeout is positive.
    pub fn validate(&self) -> NetResult<()> {
        parse_url("api_base_url", &self.api_base_url)?;
        parse_url("geocoder_url", &self.geocoder_url)?;
        parse_url("classifier.base_url", &self.classifier.base_url)?;
        if self.timeout_seconds == 0 {
            return Err(NetError::Config("timeout_seconds must be > 0".into()));
        }
        if self.classifier.model.trim().is_empty() {
            return Err(NetError::Config("classifier.model is empty".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Shared HTTP client: timeout and user agent from this config.
    pub fn http_client(&self) -> NetResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout())
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| NetError::Config(format!("http client: {e}")))
    }
}

/// Parse `base` and append `suffix` as a path, tolerating a trailing slash.
pub(crate) fn join_url(base: &str, suffix: &str) -> NetResult<Url> {
    let joined = format!("{}/{}", base.trim_end_matches('/'), suffix.trim_start_matches('/'));
    parse_url("url", &joined)
}

pub(crate) fn parse_url(what: &str, raw: &str) -> NetResult<Url> {
    let url = Url::parse(raw).map_err(|e| NetError::Config(format!("{what}: {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(NetError::Config(format!("{what}: unsupported scheme {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let c = ClientConfig::default();
        assert_eq!(c.api_base_url, "http://localhost:8000");
        assert_eq!(c.classifier.model, "gemini-2.5-flash");
        assert!(c.user_agent.starts_with("eer/"));
        c.validate().unwrap();
    }

    #[test]
    fn env_overlay() {
        let vars: HashMap<&str, &str> = [
            ("API_URL", "https://intake.example.org/api/"),
            ("GEMINI_API_KEY", "k-123"),
            ("EER_CLASSIFIER_MODEL", ""),
            ("EER_HTTP_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();
        let mut c = ClientConfig::default();
        c.apply_env_with(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(c.api_base_url, "https://intake.example.org/api/");
        assert_eq!(c.classifier.api_key.as_deref(), Some("k-123"));
        assert_eq!(c.classifier.model, DEFAULT_CLASSIFIER_MODEL);
        assert_eq!(c.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn api_key_wins_over_gemini_key() {
        let mut c = ClientConfig::default();
        c.apply_env_with(|k| match k {
            "API_KEY" => Some("primary".into()),
            "GEMINI_API_KEY" => Some("secondary".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(c.classifier.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn bad_timeout_is_config_error() {
        let mut c = ClientConfig::default();
        let err = c
            .apply_env_with(|k| (k == "EER_HTTP_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, NetError::Config(_)));
    }

    #[test]
    fn rejects_non_http_urls() {
        let c = ClientConfig { api_base_url: "file:///tmp/x".into(), ..ClientConfig::default() };
        assert!(matches!(c.validate(), Err(NetError::Config(_))));
        let c = ClientConfig { timeout_seconds: 0, ..ClientConfig::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn join_tolerates_slashes() {
        assert_eq!(
            join_url("http://h:8000/", "/submit-event").unwrap().as_str(),
            "http://h:8000/submit-event"
        );
        assert_eq!(
            join_url("http://h/api", "submit-event").unwrap().as_str(),
            "http://h/api/submit-event"
        );
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("eer.json");
        std::fs::write(&p, r#"{"api_base_url":"http://10.0.0.2:9000","classifier":{"model":"m"}}"#).unwrap();
        let c = ClientConfig::from_json_file(&p).unwrap();
        assert_eq!(c.api_base_url, "http://10.0.0.2:9000");
        assert_eq!(c.classifier.model, "m");
        assert_eq!(c.classifier.base_url, DEFAULT_CLASSIFIER_URL);
        assert_eq!(c.timeout_seconds, DEFAULT_TIMEOUT_SECS);

        std::fs::write(&p, r#"{"apiUrl":"x"}"#).unwrap();
        assert!(matches!(ClientConfig::from_json_file(&p), Err(NetError::Config(_))));
    }
}
