//! crates/eer_form/src/store.rs
//! `FormStore`: the single owner of the report being edited.
//!
//! Every mutation clears the error for the key it touches; a full validation
//! pass replaces the error set wholesale. Submission is split in two halves
//! (`begin_submission` / `finish_submission`) so the network call can run
//! without borrowing the store.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use eer_core::dates::normalize_date_input;
use eer_core::model::parse_optional_choice;
use eer_core::{
    movement_key, Coordinates, CoreError, EventReport, Movement, MovementField, MovementId,
    MovementIdGen, ReportField, ValidationErrors,
};

use crate::map::{MapPicker, MapView, PendingSelection, Side, ViewTicket};
use crate::outcome::{Classification, SubmissionMessage, SubmitBlocked, SubmitOutcome};
use crate::validate::validate_as_of;

/// One attribute write for a movement row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MovementUpdate {
    From(Option<Coordinates>),
    To(Option<Coordinates>),
    Individuals(i64),
}

impl MovementUpdate {
    pub fn field(&self) -> MovementField {
        match self {
            MovementUpdate::From(_) => MovementField::From,
            MovementUpdate::To(_) => MovementField::To,
            MovementUpdate::Individuals(_) => MovementField::Individuals,
        }
    }
}

#[derive(Debug)]
pub struct FormStore {
    report: EventReport,
    errors: ValidationErrors,
    submitting: bool,
    message: Option<SubmissionMessage>,
    ids: MovementIdGen,
    map: MapPicker,
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FormStore {
    /// Blank form, ids seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_ids(MovementIdGen::from_entropy())
    }

    /// Blank form with a reproducible id sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_ids(MovementIdGen::from_seed_u64(seed))
    }

    fn with_ids(mut ids: MovementIdGen) -> Self {
        let report = EventReport::blank(&mut ids);
        Self {
            report,
            errors: ValidationErrors::new(),
            submitting: false,
            message: None,
            ids,
            map: MapPicker::new(),
        }
    }

    /// Continue editing a previously saved report.
    pub fn from_report(report: EventReport) -> Result<Self, CoreError> {
        report.check_invariants()?;
        let mut store = Self::new();
        store.report = report;
        Ok(store)
    }

    // --------------------------------------------------------------------------------------------
    // Read access
    // --------------------------------------------------------------------------------------------

    #[inline]
    pub fn report(&self) -> &EventReport {
        &self.report
    }

    #[inline]
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    #[inline]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    #[inline]
    pub fn message(&self) -> Option<&SubmissionMessage> {
        self.message.as_ref()
    }

    #[inline]
    pub fn map(&self) -> &MapPicker {
        &self.map
    }

    // --------------------------------------------------------------------------------------------
    // Field edits
    // --------------------------------------------------------------------------------------------

    /// Replace one top-level field from raw input. The field's error is
    /// cleared even when the value is rejected.
    pub fn update_field(&mut self, field: ReportField, value: &str) -> Result<(), CoreError> {
        self.errors.clear(field.key());
        let r = &mut self.report;
        match field {
            ReportField::Country => r.country = value.to_string(),
            ReportField::Email => r.reporter_email = value.to_string(),
            ReportField::EventStart => r.event_start = normalize_date_input(value)?,
            ReportField::EventEnd => r.event_end = normalize_date_input(value)?,
            ReportField::EventType => r.event_type = parse_optional_choice(value)?,
            ReportField::Trigger => r.trigger = parse_optional_choice(value)?,
            ReportField::PriorityNeed1 => r.priority_need1 = value.to_string(),
            ReportField::PriorityNeed2 => r.priority_need2 = value.to_string(),
            ReportField::PriorityNeed3 => r.priority_need3 = value.to_string(),
            ReportField::NarrativeSummary => r.narrative_summary = value.to_string(),
        }
        debug!(field = field.key(), "field updated");
        Ok(())
    }

    /// Replace one movement attribute.
    ///
    /// # Panics
    /// When `index` is out of range.
    pub fn update_movement(&mut self, index: usize, update: MovementUpdate) {
        let len = self.report.movements.len();
        let Some(m) = self.report.movements.get_mut(index) else {
            panic!("movement index {index} out of range ({len} movements)");
        };
        match update {
            MovementUpdate::From(c) => m.from = c,
            MovementUpdate::To(c) => m.to = c,
            MovementUpdate::Individuals(n) => m.individuals = n,
        }
        self.errors.clear(&movement_key(index, update.field()));
        debug!(index, field = update.field().key(), "movement updated");
    }

    /// Headcount from raw text: leading integer, anything else is 0.
    pub fn set_individuals_input(&mut self, index: usize, raw: &str) {
        self.update_movement(index, MovementUpdate::Individuals(parse_leading_int(raw)));
    }

    pub fn add_movement(&mut self) -> MovementId {
        let id = self.ids.next_id();
        self.report.movements.push(Movement::new(id.clone()));
        debug!(%id, count = self.report.movements.len(), "movement added");
        id
    }

    /// Remove a movement. The last remaining one cannot be removed.
    /// Error keys and the pending map selection follow the rows that move up.
    pub fn remove_movement(&mut self, id: &MovementId) -> bool {
        if self.report.movements.len() <= 1 {
            return false;
        }
        let Some(index) = self.report.movement_index(id) else {
            return false;
        };
        self.report.movements.remove(index);
        self.errors.movement_removed(index);
        self.map.movement_removed(index);
        debug!(%id, index, "movement removed");
        true
    }

    /// Suggested trigger and needs from the classifier.
    pub fn apply_classification(&mut self, c: &Classification) {
        self.report.trigger = Some(c.trigger);
        let [n1, n2, n3] = &c.priority_needs;
        self.report.priority_need1 = n1.clone();
        self.report.priority_need2 = n2.clone();
        self.report.priority_need3 = n3.clone();
        for f in [
            ReportField::Trigger,
            ReportField::PriorityNeed1,
            ReportField::PriorityNeed2,
            ReportField::PriorityNeed3,
        ] {
            self.errors.clear(f.key());
        }
        debug!(trigger = %c.trigger, "classification applied");
    }

    // --------------------------------------------------------------------------------------------
    // Validation & submission
    // --------------------------------------------------------------------------------------------

    /// Full validation pass against the local date. True when clean.
    pub fn validate(&mut self) -> bool {
        self.validate_as_of(chrono::Local::now().date_naive())
    }

    pub fn validate_as_of(&mut self, today: NaiveDate) -> bool {
        self.errors = validate_as_of(&self.report, today);
        self.errors.is_empty()
    }

    /// First half of a submission: validate, mark in flight, hand out a
    /// snapshot of the report to send.
    pub fn begin_submission(&mut self) -> Result<EventReport, SubmitBlocked> {
        self.begin_submission_as_of(chrono::Local::now().date_naive())
    }

    pub fn begin_submission_as_of(&mut self, today: NaiveDate) -> Result<EventReport, SubmitBlocked> {
        if self.submitting {
            return Err(SubmitBlocked::InFlight);
        }
        self.message = None;
        if !self.validate_as_of(today) {
            let error_count = self.errors.len();
            self.message = Some(SubmissionMessage::fix_errors());
            info!(error_count, "submission blocked by validation");
            return Err(SubmitBlocked::Invalid { error_count });
        }
        self.submitting = true;
        info!(movements = self.report.movements.len(), "submission started");
        Ok(self.report.clone())
    }

    /// Second half: record the outcome. Success resets the form; failures
    /// keep the report for another attempt. An outcome arriving with no
    /// submission in flight is dropped; returns whether it was applied.
    pub fn finish_submission(&mut self, outcome: &SubmitOutcome) -> bool {
        if !self.submitting {
            warn!(success = outcome.is_success(), "outcome without a submission in flight ignored");
            return false;
        }
        self.submitting = false;
        match outcome {
            SubmitOutcome::Success { status, event_id } => {
                info!(status, event_id = event_id.as_deref().unwrap_or("-"), "submission accepted");
                self.reset();
            }
            SubmitOutcome::HttpError { status, status_text, body } => {
                warn!(status, %status_text, %body, "submission rejected");
            }
            SubmitOutcome::NetworkError { message } => {
                warn!(%message, "submission failed");
            }
        }
        self.message = Some(outcome.message());
        true
    }

    /// Blank report, no errors, no message, map closed.
    pub fn reset(&mut self) {
        self.report = EventReport::blank(&mut self.ids);
        self.errors = ValidationErrors::new();
        self.message = None;
        self.map.close();
    }

    // --------------------------------------------------------------------------------------------
    // Map selection
    // --------------------------------------------------------------------------------------------

    /// Open the map for one endpoint of the movement at `index`. The ticket
    /// tags any view computed for this opening (see `apply_map_view`); the
    /// country to geocode is `report().country`.
    ///
    /// # Panics
    /// When `index` is out of range.
    pub fn open_map(&mut self, index: usize, side: Side) -> ViewTicket {
        assert!(
            index < self.report.movements.len(),
            "movement index {index} out of range ({} movements)",
            self.report.movements.len()
        );
        self.map.open(index, side)
    }

    pub fn apply_map_view(&mut self, ticket: ViewTicket, view: MapView) -> bool {
        self.map.apply_view(ticket, view)
    }

    pub fn pick_on_map(&mut self, lat: f64, lon: f64) -> Result<Coordinates, CoreError> {
        self.map.pick(lat, lon)
    }

    /// Write the clicked point into the pending endpoint and close the map.
    /// Returns the movement index written, or None when nothing was clicked
    /// or the row no longer exists.
    pub fn confirm_map_selection(&mut self) -> Option<usize> {
        let (index, side, c) = self.map.take_confirmation()?;
        if index >= self.report.movements.len() {
            debug!(index, "stale map selection ignored");
            return None;
        }
        let update = match side {
            Side::From => MovementUpdate::From(Some(c)),
            Side::To => MovementUpdate::To(Some(c)),
        };
        self.update_movement(index, update);
        Some(index)
    }

    pub fn close_map(&mut self) {
        self.map.close();
    }

    #[inline]
    pub fn pending_selection(&self) -> PendingSelection {
        self.map.pending()
    }
}

/// Leading-integer parse of form input: optional whitespace and sign, then
/// digits; stops at the first non-digit. No digits gives 0. Saturates.
fn parse_leading_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut n: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(b - b'0');
        n = n.saturating_mul(10).saturating_add(d);
    }
    if negative {
        -n
    } else {
        n
    }
}
