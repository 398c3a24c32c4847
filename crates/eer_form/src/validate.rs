//! crates/eer_form/src/validate.rs
//! Field-level validation of a report. Pure: no store, no clock except the
//! `validate` convenience wrapper, which reads the local calendar date.
//!
//! Every rule runs; all violations are reported in one pass. An empty result
//! means the report may be submitted.

use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use eer_core::{
    field_key, movement_key, EventReport, Movement, MovementField, ReportField, ValidationErrors,
};

/// Basic `local@domain.tld` shape; unanchored like a browser's loose check.
static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\S+@\S+\.\S+").unwrap_or_else(|e| unreachable!("static email pattern: {e}"))
});

/// Validate against today's local calendar date.
pub fn validate(report: &EventReport) -> ValidationErrors {
    validate_as_of(report, Local::now().date_naive())
}

/// Validate with an explicit "today". A date equal to `today` is accepted
/// (the bound is the end of that day).
pub fn validate_as_of(report: &EventReport, today: NaiveDate) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    check_required_text(&mut errors, ReportField::Country, &report.country, "Country is required.");
    check_email(&mut errors, &report.reporter_email);
    check_dates(&mut errors, report.event_start, report.event_end, today);

    if report.event_type.is_none() {
        errors.insert(field_key(ReportField::EventType), "Event type is required.");
    }
    if report.trigger.is_none() {
        errors.insert(field_key(ReportField::Trigger), "Trigger is required.");
    }

    check_required_text(
        &mut errors,
        ReportField::NarrativeSummary,
        report.narrative_summary.trim(),
        "Narrative summary is required.",
    );
    check_required_text(&mut errors, ReportField::PriorityNeed1, &report.priority_need1, "Priority Need 1 is required.");
    check_required_text(&mut errors, ReportField::PriorityNeed2, &report.priority_need2, "Priority Need 2 is required.");
    check_required_text(&mut errors, ReportField::PriorityNeed3, &report.priority_need3, "Priority Need 3 is required.");

    for (i, m) in report.movements.iter().enumerate() {
        check_movement(&mut errors, i, m);
    }

    errors
}

// ------------------------------------------------------------------------------------------------
// Checks
// ------------------------------------------------------------------------------------------------

fn check_required_text(errors: &mut ValidationErrors, field: ReportField, value: &str, msg: &str) {
    if value.is_empty() {
        errors.insert(field_key(field), msg);
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    let key = field_key(ReportField::Email);
    if email.is_empty() {
        errors.insert(key, "Email is required.");
    } else if !EMAIL_SHAPE.is_match(email) {
        errors.insert(key, "Email address is invalid.");
    }
}

fn check_dates(
    errors: &mut ValidationErrors,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) {
    match start {
        None => errors.insert(field_key(ReportField::EventStart), "Event start date is required."),
        Some(s) if s > today => {
            errors.insert(field_key(ReportField::EventStart), "Event start date cannot be in the future.")
        }
        Some(_) => {}
    }

    // First failing rule wins for eventEnd.
    let end_key = field_key(ReportField::EventEnd);
    match (start, end) {
        (_, None) => errors.insert(end_key, "Event end date is required."),
        (_, Some(e)) if e > today => errors.insert(end_key, "Event end date cannot be in the future."),
        (Some(s), Some(e)) if e < s => errors.insert(end_key, "End date cannot be before start date."),
        _ => {}
    }
}

fn check_movement(errors: &mut ValidationErrors, index: usize, m: &Movement) {
    if m.from.is_none() {
        errors.insert(movement_key(index, MovementField::From), "Origin location is required.");
    }
    if m.to.is_none() {
        errors.insert(movement_key(index, MovementField::To), "Destination location is required.");
    }
    if m.individuals <= 0 {
        errors.insert(
            movement_key(index, MovementField::Individuals),
            "Number of individuals must be greater than 0.",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eer_core::{Coordinates, EventType, MovementIdGen, Trigger};
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const TODAY: (i32, u32, u32) = (2024, 6, 30);

    fn today() -> NaiveDate {
        ymd(TODAY.0, TODAY.1, TODAY.2)
    }

    /// The worked example: every field valid, one complete movement.
    fn chad() -> EventReport {
        let mut ids = MovementIdGen::from_seed_u64(42);
        let mut r = EventReport::blank(&mut ids);
        r.country = "Chad".into();
        r.reporter_email = "a@b.org".into();
        r.event_start = Some(ymd(2024, 1, 1));
        r.event_end = Some(ymd(2024, 1, 5));
        r.event_type = Some(EventType::Displacement);
        r.trigger = Some(Trigger::Conflict);
        r.priority_need1 = "Shelter".into();
        r.priority_need2 = "Food".into();
        r.priority_need3 = "Water".into();
        r.narrative_summary = "Armed clashes displaced families.".into();
        r.movements[0].from = Some(Coordinates::new(1.0, 1.0).unwrap());
        r.movements[0].to = Some(Coordinates::new(2.0, 2.0).unwrap());
        r.movements[0].individuals = 10;
        r
    }

    fn clear_field(r: &mut EventReport, f: ReportField) {
        match f {
            ReportField::Country => r.country.clear(),
            ReportField::Email => r.reporter_email.clear(),
            ReportField::EventStart => r.event_start = None,
            ReportField::EventEnd => r.event_end = None,
            ReportField::EventType => r.event_type = None,
            ReportField::Trigger => r.trigger = None,
            ReportField::PriorityNeed1 => r.priority_need1.clear(),
            ReportField::PriorityNeed2 => r.priority_need2.clear(),
            ReportField::PriorityNeed3 => r.priority_need3.clear(),
            ReportField::NarrativeSummary => r.narrative_summary.clear(),
        }
    }

    #[test]
    fn worked_example_is_clean() {
        assert!(validate_as_of(&chad(), today()).is_empty());
    }

    #[test]
    fn blank_report_flags_everything() {
        let mut ids = MovementIdGen::from_seed_u64(1);
        let errs = validate_as_of(&EventReport::blank(&mut ids), today());
        for f in ReportField::ALL {
            assert!(errs.contains(f.key()), "missing {f}");
        }
        for k in ["movements.0.from", "movements.0.to", "movements.0.individuals"] {
            assert!(errs.contains(k), "missing {k}");
        }
        assert_eq!(errs.len(), 13);
    }

    #[test]
    fn whitespace_narrative_is_empty() {
        let mut r = chad();
        r.narrative_summary = " \n\t ".into();
        let errs = validate_as_of(&r, today());
        assert_eq!(errs.keys().collect::<Vec<_>>(), vec!["narrativeSummary"]);
    }

    #[test]
    fn email_shape() {
        for bad in ["ab.org", "a@b", "@b.org", "a@.org"] {
            let mut r = chad();
            r.reporter_email = bad.into();
            let errs = validate_as_of(&r, today());
            assert_eq!(errs.get("email"), Some("Email address is invalid."), "{bad}");
        }
        let mut r = chad();
        r.reporter_email = "field.officer@agency.example.org".into();
        assert!(validate_as_of(&r, today()).is_empty());
    }

    #[test]
    fn end_before_start_flags_only_end() {
        let mut r = chad();
        r.event_start = Some(ymd(2024, 2, 10));
        r.event_end = Some(ymd(2024, 2, 9));
        let errs = validate_as_of(&r, today());
        assert_eq!(errs.keys().collect::<Vec<_>>(), vec!["eventEnd"]);
        assert_eq!(errs.get("eventEnd"), Some("End date cannot be before start date."));
    }

    #[test]
    fn today_is_allowed_tomorrow_is_not() {
        let mut r = chad();
        r.event_start = Some(today());
        r.event_end = Some(today());
        assert!(validate_as_of(&r, today()).is_empty());

        let tomorrow = today().succ_opt().unwrap();
        r.event_end = Some(tomorrow);
        r.event_start = Some(tomorrow);
        let errs = validate_as_of(&r, today());
        assert_eq!(errs.get("eventStart"), Some("Event start date cannot be in the future."));
        assert_eq!(errs.get("eventEnd"), Some("Event end date cannot be in the future."));
    }

    #[test]
    fn end_without_start_only_reports_start() {
        let mut r = chad();
        r.event_start = None;
        let errs = validate_as_of(&r, today());
        assert_eq!(errs.keys().collect::<Vec<_>>(), vec!["eventStart"]);
    }

    #[test]
    fn movement_errors_are_keyed_per_row() {
        let mut r = chad();
        let mut ids = MovementIdGen::from_seed_u64(9);
        let mut second = Movement::new(ids.next_id());
        second.from = Some(Coordinates::new(0.0, 0.0).unwrap());
        second.individuals = 1;
        r.movements.push(second);
        let errs = validate_as_of(&r, today());
        assert_eq!(errs.keys().collect::<Vec<_>>(), vec!["movements.1.to"]);
    }

    proptest! {
        #[test]
        fn missing_scalars_are_exactly_reported(mask in 0u16..(1 << 10)) {
            let mut r = chad();
            let cleared: Vec<ReportField> = ReportField::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, f)| f)
                .collect();
            for f in &cleared {
                clear_field(&mut r, *f);
            }
            let errs = validate_as_of(&r, today());
            let mut expected: Vec<&str> = cleared.iter().map(|f| f.key()).collect();
            expected.sort_unstable();
            prop_assert_eq!(errs.keys().collect::<Vec<_>>(), expected);
        }

        #[test]
        fn non_positive_individuals_are_flagged(n in i64::MIN..=0) {
            let mut r = chad();
            r.movements[0].individuals = n;
            let errs = validate_as_of(&r, today());
            prop_assert_eq!(errs.keys().collect::<Vec<_>>(), vec!["movements.0.individuals"]);
        }

        #[test]
        fn positive_individuals_pass(n in 1i64..=1_000_000) {
            let mut r = chad();
            r.movements[0].individuals = n;
            prop_assert!(validate_as_of(&r, today()).is_empty());
        }

        #[test]
        fn reversed_past_dates_flag_only_end(a in 0i64..3000, gap in 1i64..400) {
            let base = ymd(2015, 1, 1);
            let end = base + chrono::Duration::days(a);
            let start = end + chrono::Duration::days(gap);
            prop_assume!(start <= today());
            let mut r = chad();
            r.event_start = Some(start);
            r.event_end = Some(end);
            let errs = validate_as_of(&r, today());
            prop_assert_eq!(errs.keys().collect::<Vec<_>>(), vec!["eventEnd"]);
        }
    }
}
