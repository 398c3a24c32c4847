//! crates/eer_net/src/submit.rs
//! POST a report to the intake API.

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde::Deserialize;
use tracing::{error, info, warn};

use eer_core::EventReport;
use eer_form::{FormStore, SubmitBlocked, SubmitOutcome};
use eer_io::json::to_json_bytes;

use crate::config::{join_url, ClientConfig};
use crate::error::NetResult;

const SUBMIT_PATH: &str = "submit-event";

#[derive(Deserialize)]
struct Accepted {
    id: String,
}

#[derive(Debug, Clone)]
pub struct SubmissionClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl SubmissionClient {
    pub fn new(config: &ClientConfig) -> NetResult<Self> {
        Ok(Self {
            http: config.http_client()?,
            endpoint: join_url(&config.api_base_url, SUBMIT_PATH)?,
        })
    }

    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send one report. Never fails: every result is a `SubmitOutcome`.
    pub async fn submit(&self, report: &EventReport) -> SubmitOutcome {
        let body = match to_json_bytes(report) {
            Ok(b) => b,
            Err(e) => return SubmitOutcome::NetworkError { message: e.to_string() },
        };

        let resp = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await;

        let resp = match resp {
            Ok(r) => r,
            Err(e) => {
                error!(endpoint = %self.endpoint, error = %e, "submission request failed");
                return SubmitOutcome::NetworkError { message: e.to_string() };
            }
        };

        let status = resp.status();
        if status.is_success() {
            // the stored event comes back; only its id is kept
            let event_id = match resp.json::<Accepted>().await {
                Ok(a) => Some(a.id),
                Err(e) => {
                    warn!(error = %e, "accepted, but the reply carried no event id");
                    None
                }
            };
            info!(status = status.as_u16(), event_id = event_id.as_deref().unwrap_or("-"), "report accepted");
            return SubmitOutcome::Success { status: status.as_u16(), event_id };
        }

        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        // best effort: the status alone is enough to report the rejection
        let body = resp.text().await.unwrap_or_default();
        SubmitOutcome::HttpError { status: status.as_u16(), status_text, body }
    }
}

/// Validate, send and record the outcome in one go.
///
/// The store hands out a snapshot before the request and takes the outcome
/// after it, so its state is never half-updated by a failed call.
pub async fn submit_form(
    store: &mut FormStore,
    client: &SubmissionClient,
) -> Result<SubmitOutcome, SubmitBlocked> {
    let snapshot = store.begin_submission()?;
    let outcome = client.submit(&snapshot).await;
    store.finish_submission(&outcome);
    Ok(outcome)
}
