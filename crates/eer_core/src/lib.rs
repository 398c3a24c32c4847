//! eer_core: Data model for emergency event reports.
//!
//! This crate is **I/O-free**. It defines the stable types used across the
//! workspace (`eer_io`, `eer_form`, `eer_net`, `eer_cli`):
//!
//! - `EventReport` aggregate root and its `Movement` rows
//! - `Coordinates` with range checks at construction
//! - Closed enums: `EventType`, `Trigger`
//! - Calendar-date normalization to `YYYY-MM-DD`
//! - `MovementId` and its seedable generator
//! - `ValidationErrors`, the field-path keyed error set
//!
//! Wire names follow the JSON shape accepted by the submission endpoint.

#![forbid(unsafe_code)]

pub mod dates;
pub mod errors;
pub mod ids;
pub mod model;
pub mod validation;

pub use errors::CoreError;
pub use ids::{MovementId, MovementIdGen};
pub use model::{
    ClosedChoice, Coordinates, EventReport, EventType, Movement, MovementField, ReportField, Trigger,
};
pub use validation::{field_key, movement_key, ValidationErrors};
