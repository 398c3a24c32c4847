//! Export files on disk: naming, atomic write, and read-back.

use assert_json_diff::assert_json_eq;
use eer_core::dates::NaiveDate;
use eer_core::{Coordinates, EventReport, EventType, Movement, MovementIdGen, Trigger};
use eer_io::prelude::*;
use serde_json::json;

fn filled_report() -> EventReport {
    let mut ids = MovementIdGen::from_seed_u64(99);
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
    r.narrative_summary = "Clashes near the border.".into();
    r.movements[0].from = Some(Coordinates::new(1.0, 1.0).unwrap());
    r.movements[0].to = Some(Coordinates::new(2.0, 2.0).unwrap());
    r.movements[0].individuals = 10;
    let mut m = Movement::new(ids.next_id());
    m.individuals = 4;
    r.movements.push(m);
    r
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn json_export_lands_under_country_name_and_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let r = filled_report();

    let path = write_export(dir.path(), &r, ExportFormat::Json).unwrap();
    assert_eq!(path.file_name().unwrap(), "emergency_event_report_Chad.json");

    let back = read_report(&path).unwrap();
    assert_eq!(back, r);

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_json_eq!(
        on_disk,
        json!({
            "country": "Chad",
            "email": "a@b.org",
            "eventStart": "2024-01-01",
            "eventEnd": "2024-01-05",
            "eventType": "displacement",
            "trigger": "conflict",
            "priorityNeed1": "Shelter",
            "priorityNeed2": "Food",
            "priorityNeed3": "Water",
            "narrativeSummary": "Clashes near the border.",
            "movements": [
                {"id": r.movements[0].id.as_str(), "from": {"lat": 1.0, "lon": 1.0}, "to": {"lat": 2.0, "lon": 2.0}, "individuals": 10},
                {"id": r.movements[1].id.as_str(), "from": null, "to": null, "individuals": 4}
            ]
        })
    );
}

#[test]
fn csv_export_overwrites_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut r = filled_report();

    let first = write_export(dir.path(), &r, ExportFormat::Csv).unwrap();
    r.movements.truncate(1);
    let second = write_export(dir.path(), &r, ExportFormat::Csv).unwrap();
    assert_eq!(first, second);

    let text = std::fs::read_to_string(&second).unwrap();
    assert_eq!(text.lines().count(), 2);

    // no stray temp files left behind
    let names: Vec<_> = std::fs::read_dir(dir.path()).unwrap().map(|e| e.unwrap().file_name()).collect();
    assert_eq!(names.len(), 1);
}

#[test]
fn read_report_rejects_unknown_event_type() {
    let dir = tempfile::tempdir().unwrap();
    let mut v = serde_json::to_value(filled_report()).unwrap();
    v["eventType"] = json!("evacuation");
    let path = dir.path().join("bad.json");
    std::fs::write(&path, v.to_string()).unwrap();

    let err = read_report(&path).unwrap_err();
    assert!(matches!(err, IoError::Json { .. }), "{err:?}");
}
