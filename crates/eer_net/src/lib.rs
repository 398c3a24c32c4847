//! eer_net: HTTP side of the report form.
//!
//! - `submit`: POST a validated report to the intake API
//! - `events`: read back events the intake API has stored
//! - `geocode`: initial map view for the report's country
//! - `classify`: trigger / priority-need suggestion from the narrative
//! - `config`: endpoints, timeouts and credentials shared by every client
//!
//! Clients never touch the `FormStore` while a request is in flight; they
//! take snapshots and return values the store applies afterwards.

#![forbid(unsafe_code)]

pub mod classify;
pub mod config;
pub mod error;
pub mod events;
pub mod geocode;
pub mod submit;

pub use classify::{classify_form, parse_classification, GeminiClassifier, NarrativeClassifier};
pub use config::{ClassifierConfig, ClientConfig};
pub use error::{NetError, NetResult};
pub use events::{EventFilter, EventsClient, StoredEvent};
pub use geocode::Geocoder;
pub use submit::{submit_form, SubmissionClient};
