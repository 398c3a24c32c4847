//! Flattened CSV export: one row per movement, report scalars repeated on
//! every row (a denormalized join of the one-to-many relation).
//!
//! Quoting: a cell containing a comma, a double quote or a line break is
//! wrapped in double quotes with inner quotes doubled. Absent coordinates are
//! empty cells. Records end in `\n`.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use eer_core::{dates::format_date, ClosedChoice, Coordinates, EventReport, Movement};

use crate::{IoError, IoResult};

pub const CSV_HEADER: [&str; 16] = [
    "country",
    "email",
    "eventStart",
    "eventEnd",
    "eventType",
    "trigger",
    "priorityNeed1",
    "priorityNeed2",
    "priorityNeed3",
    "narrativeSummary",
    "movement_id",
    "movement_from_lat",
    "movement_from_lon",
    "movement_to_lat",
    "movement_to_lon",
    "movement_individuals",
];

fn choice_cell<T: ClosedChoice>(v: Option<T>) -> String {
    v.map(|c| c.as_str().to_string()).unwrap_or_default()
}

fn coord_cells(c: Option<Coordinates>) -> [String; 2] {
    match c {
        Some(c) => [c.lat().to_string(), c.lon().to_string()],
        None => [String::new(), String::new()],
    }
}

/// The ten report-level cells shared by every row.
fn scalar_cells(r: &EventReport) -> [String; 10] {
    [
        r.country.clone(),
        r.reporter_email.clone(),
        format_date(r.event_start),
        format_date(r.event_end),
        choice_cell(r.event_type),
        choice_cell(r.trigger),
        r.priority_need1.clone(),
        r.priority_need2.clone(),
        r.priority_need3.clone(),
        r.narrative_summary.clone(),
    ]
}

fn movement_cells(m: &Movement) -> [String; 6] {
    let [from_lat, from_lon] = coord_cells(m.from);
    let [to_lat, to_lon] = coord_cells(m.to);
    [m.id.to_string(), from_lat, from_lon, to_lat, to_lon, m.individuals.to_string()]
}

/// Render the whole report as CSV text (header + one row per movement).
pub fn to_csv(report: &EventReport) -> IoResult<String> {
    let mut w = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::with_capacity(256 * (report.movements.len() + 1)));

    w.write_record(CSV_HEADER)?;
    let scalars = scalar_cells(report);
    for m in &report.movements {
        w.write_record(scalars.iter().chain(movement_cells(m).iter()))?;
    }

    let bytes = w.into_inner().map_err(|e| IoError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| IoError::Csv(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eer_core::{EventType, MovementIdGen, Trigger};

    fn two_movement_report() -> EventReport {
        let mut ids = MovementIdGen::from_seed_u64(5);
        let mut r = EventReport::blank(&mut ids);
        r.country = "Chad".into();
        r.reporter_email = "a@b.org".into();
        r.event_type = Some(EventType::Displacement);
        r.trigger = Some(Trigger::Conflict);
        r.narrative_summary = "Hello, world".into();
        r.movements[0].from = Some(Coordinates::new(1.0, 1.5).unwrap());
        r.movements[0].individuals = 10;
        let mut second = Movement::new(ids.next_id());
        second.to = Some(Coordinates::new(-2.0, 2.0).unwrap());
        second.individuals = 3;
        r.movements.push(second);
        r
    }

    #[test]
    fn header_plus_one_row_per_movement() {
        let text = to_csv(&two_movement_report()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER.join(","));
    }

    #[test]
    fn scalars_repeat_and_commas_are_quoted() {
        let r = two_movement_report();
        let text = to_csv(&r).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        let prefix = "Chad,a@b.org,,,displacement,conflict,,,,\"Hello, world\",";
        assert!(lines[1].starts_with(prefix), "{}", lines[1]);
        assert!(lines[2].starts_with(prefix), "{}", lines[2]);
        assert!(lines[1].ends_with(&format!("{},1,1.5,,,10", r.movements[0].id)));
        assert!(lines[2].ends_with(&format!("{},,,-2,2,3", r.movements[1].id)));
    }

    #[test]
    fn quotes_and_newlines_are_escaped() {
        let mut r = two_movement_report();
        r.narrative_summary = "He said \"go\"\nnow".into();
        let text = to_csv(&r).unwrap();
        assert!(text.contains("\"He said \"\"go\"\"\nnow\""));
    }
}
