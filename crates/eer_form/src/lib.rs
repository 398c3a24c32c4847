//! eer_form: the stateful core of the report form.
//!
//! One `FormStore` owns the report being edited, its current validation
//! errors, the submitting flag and last status message, and the pending map
//! selection. All mutation goes through the store's operations; validation
//! and serialization are pure functions over the owned report.
//!
//! Network work happens elsewhere (`eer_net`). The store only hands out a
//! snapshot when a submission starts and applies the outcome when it ends, so
//! no borrow of the store is held across an await.

#![forbid(unsafe_code)]

pub mod map;
pub mod outcome;
pub mod store;
pub mod validate;

pub use map::{MapPicker, MapView, PendingSelection, Side, ViewTicket};
pub use outcome::{Classification, Severity, SubmissionMessage, SubmitBlocked, SubmitOutcome};
pub use store::{FormStore, MovementUpdate};
pub use validate::{validate, validate_as_of};
