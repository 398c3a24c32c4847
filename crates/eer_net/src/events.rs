//! crates/eer_net/src/events.rs
//! Read side of the intake API: events already stored by the server.
//!
//! - `GET {base}/events` with optional `country`, `eventStart`, `eventEnd`
//! - `GET {base}/events/{id}`; 404 means "no such event"

use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use eer_core::dates::{blank_date, format_date, NaiveDate};
use eer_core::Movement;

use crate::config::{join_url, ClientConfig};
use crate::error::{NetError, NetResult};

/// An event as the server keeps it: the submitted report plus its id.
///
/// Event type and trigger are kept as the server returns them; the server
/// does not restrict them to the form's choices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    pub id: String,
    pub country: String,
    pub email: String,
    #[serde(with = "blank_date")]
    pub event_start: Option<NaiveDate>,
    #[serde(with = "blank_date")]
    pub event_end: Option<NaiveDate>,
    pub event_type: String,
    pub trigger: String,
    #[serde(default)]
    pub priority_need1: Option<String>,
    #[serde(default)]
    pub priority_need2: Option<String>,
    #[serde(default)]
    pub priority_need3: Option<String>,
    #[serde(default)]
    pub narrative_summary: Option<String>,
    pub movements: Vec<Movement>,
}

/// Server-side filters for `list_events`. Country matches case-insensitively;
/// `event_start` keeps events starting on or after it, `event_end` those
/// ending on or before it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub country: Option<String>,
    pub event_start: Option<NaiveDate>,
    pub event_end: Option<NaiveDate>,
}

impl EventFilter {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(c) = self.country.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            pairs.push(("country", c.to_string()));
        }
        if let Some(d) = self.event_start {
            pairs.push(("eventStart", format_date(Some(d))));
        }
        if let Some(d) = self.event_end {
            pairs.push(("eventEnd", format_date(Some(d))));
        }
        pairs
    }
}

#[derive(Debug, Clone)]
pub struct EventsClient {
    http: reqwest::Client,
    events: Url,
}

impl EventsClient {
    pub fn new(config: &ClientConfig) -> NetResult<Self> {
        Ok(Self {
            http: config.http_client()?,
            events: join_url(&config.api_base_url, "events")?,
        })
    }

    pub async fn list_events(&self, filter: &EventFilter) -> NetResult<Vec<StoredEvent>> {
        let mut url = self.events.clone();
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        let resp = self.http.get(url).send().await?;
        let events: Vec<StoredEvent> = read_json(resp).await?;
        debug!(count = events.len(), "events listed");
        Ok(events)
    }

    /// One stored event; `None` when the server does not know the id.
    pub async fn get_event(&self, id: &str) -> NetResult<Option<StoredEvent>> {
        let mut url = self.events.clone();
        url.path_segments_mut()
            .map_err(|_| NetError::Config(format!("api_base_url cannot take a path: {}", self.events)))?
            .pop_if_empty()
            .push(id);
        let resp = self.http.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(id, "event not found");
            return Ok(None);
        }
        read_json(resp).await.map(Some)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> NetResult<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(NetError::Http { status: status.as_u16(), body });
    }
    let text = resp.text().await?;
    serde_json::from_str(&text)
        .map_err(|e| NetError::Integration(format!("stored event: {e}")))
}
