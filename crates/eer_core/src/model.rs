//! crates/eer_core/src/model.rs
//! Event report aggregate, movement rows, coordinates and the closed enums.
//!
//! JSON shape (field order is the serialization order):
//! `country, email, eventStart, eventEnd, eventType, trigger,
//!  priorityNeed1..3, narrativeSummary, movements[{id, from, to, individuals}]`

use core::fmt;
use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dates::blank_date;
use crate::errors::CoreError;
use crate::ids::{MovementId, MovementIdGen};

// ----------------------------- Coordinates -----------------------------

/// A geographic point. Range-checked on every construction path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates", into = "RawCoordinates")]
pub struct Coordinates {
    lat: f64,
    lon: f64,
}

#[derive(Clone, Copy, Serialize, Deserialize)]
struct RawCoordinates {
    lat: f64,
    lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoreError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoreError::LatitudeOutOfRange(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(CoreError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[inline]
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = CoreError;
    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Coordinates::new(raw.lat, raw.lon)
    }
}

impl From<Coordinates> for RawCoordinates {
    fn from(c: Coordinates) -> Self {
        RawCoordinates { lat: c.lat, lon: c.lon }
    }
}

// ----------------------------- Closed enums -----------------------------

/// Closed set of string-valued choices with a stable wire form.
pub trait ClosedChoice: Copy + Sized + 'static {
    /// Wire name of the field holding this choice (error and message context).
    const FIELD: &'static str;
    const ALL: &'static [Self];
    fn as_str(self) -> &'static str;
    fn parse_choice(s: &str) -> Result<Self, CoreError>;
}

macro_rules! closed_choice_impls {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$name as ClosedChoice>::parse_choice(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = String::deserialize(d)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Displacement,
    Return,
    RelocationResettle,
}

impl ClosedChoice for EventType {
    const FIELD: &'static str = "eventType";
    const ALL: &'static [Self] = &[Self::Displacement, Self::Return, Self::RelocationResettle];

    fn as_str(self) -> &'static str {
        match self {
            EventType::Displacement => "displacement",
            EventType::Return => "return",
            EventType::RelocationResettle => "relocation_resettle",
        }
    }

    fn parse_choice(s: &str) -> Result<Self, CoreError> {
        match s {
            "displacement" => Ok(EventType::Displacement),
            "return" => Ok(EventType::Return),
            // older form builds used the slash spelling
            "relocation_resettle" | "relocation/resettle" => Ok(EventType::RelocationResettle),
            other => Err(CoreError::UnknownChoice { field: Self::FIELD, value: other.to_string() }),
        }
    }
}

closed_choice_impls!(EventType);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    Insecurity,
    Conflict,
    NaturalDisaster,
    Other,
}

impl ClosedChoice for Trigger {
    const FIELD: &'static str = "trigger";
    const ALL: &'static [Self] = &[Self::Insecurity, Self::Conflict, Self::NaturalDisaster, Self::Other];

    fn as_str(self) -> &'static str {
        match self {
            Trigger::Insecurity => "insecurity",
            Trigger::Conflict => "conflict",
            Trigger::NaturalDisaster => "natural_disaster",
            Trigger::Other => "other",
        }
    }

    fn parse_choice(s: &str) -> Result<Self, CoreError> {
        match s {
            "insecurity" => Ok(Trigger::Insecurity),
            "conflict" => Ok(Trigger::Conflict),
            "natural_disaster" => Ok(Trigger::NaturalDisaster),
            "other" => Ok(Trigger::Other),
            other => Err(CoreError::UnknownChoice { field: Self::FIELD, value: other.to_string() }),
        }
    }
}

closed_choice_impls!(Trigger);

/// Parse a form value for an optional choice: `""` means "not chosen yet".
pub fn parse_optional_choice<T: ClosedChoice>(raw: &str) -> Result<Option<T>, CoreError> {
    let s = raw.trim();
    if s.is_empty() {
        Ok(None)
    } else {
        T::parse_choice(s).map(Some)
    }
}

/// Serde adapter: `Option<T: ClosedChoice>` <-> enum value | `""`.
pub mod blank_choice {
    use super::{parse_optional_choice, ClosedChoice};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, T: ClosedChoice>(v: &Option<T>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(v.map(T::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, T: ClosedChoice>(d: D) -> Result<Option<T>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        parse_optional_choice(&raw).map_err(D::Error::custom)
    }
}

// ----------------------------- Movement -----------------------------

/// One population movement: origin, destination and headcount.
///
/// `individuals` is signed because it mirrors raw form input; anything ≤ 0
/// is rejected by validation, never by the model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Movement {
    pub id: MovementId,
    pub from: Option<Coordinates>,
    pub to: Option<Coordinates>,
    pub individuals: i64,
}

impl Movement {
    /// Fresh row: no locations, zero individuals.
    pub fn new(id: MovementId) -> Self {
        Self { id, from: None, to: None, individuals: 0 }
    }
}

/// Attribute selector for a movement (error keys use `key()`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementField {
    From,
    To,
    Individuals,
}

impl MovementField {
    pub fn key(self) -> &'static str {
        match self {
            MovementField::From => "from",
            MovementField::To => "to",
            MovementField::Individuals => "individuals",
        }
    }
}

// ----------------------------- EventReport -----------------------------

/// Top-level scalar fields of a report; `key()` is the wire / error-key name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportField {
    Country,
    Email,
    EventStart,
    EventEnd,
    EventType,
    Trigger,
    PriorityNeed1,
    PriorityNeed2,
    PriorityNeed3,
    NarrativeSummary,
}

impl ReportField {
    pub const ALL: [ReportField; 10] = [
        ReportField::Country,
        ReportField::Email,
        ReportField::EventStart,
        ReportField::EventEnd,
        ReportField::EventType,
        ReportField::Trigger,
        ReportField::PriorityNeed1,
        ReportField::PriorityNeed2,
        ReportField::PriorityNeed3,
        ReportField::NarrativeSummary,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ReportField::Country => "country",
            ReportField::Email => "email",
            ReportField::EventStart => "eventStart",
            ReportField::EventEnd => "eventEnd",
            ReportField::EventType => "eventType",
            ReportField::Trigger => "trigger",
            ReportField::PriorityNeed1 => "priorityNeed1",
            ReportField::PriorityNeed2 => "priorityNeed2",
            ReportField::PriorityNeed3 => "priorityNeed3",
            ReportField::NarrativeSummary => "narrativeSummary",
        }
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Aggregate root. Owns its movements exclusively; at least one is required.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EventReport {
    pub country: String,
    #[serde(rename = "email")]
    pub reporter_email: String,
    #[serde(with = "blank_date")]
    pub event_start: Option<NaiveDate>,
    #[serde(with = "blank_date")]
    pub event_end: Option<NaiveDate>,
    #[serde(with = "blank_choice")]
    pub event_type: Option<EventType>,
    #[serde(with = "blank_choice")]
    pub trigger: Option<Trigger>,
    pub priority_need1: String,
    pub priority_need2: String,
    pub priority_need3: String,
    pub narrative_summary: String,
    pub movements: Vec<Movement>,
}

impl EventReport {
    /// The initial / post-submit state: every scalar empty, one fresh movement.
    pub fn blank(ids: &mut MovementIdGen) -> Self {
        Self {
            country: String::new(),
            reporter_email: String::new(),
            event_start: None,
            event_end: None,
            event_type: None,
            trigger: None,
            priority_need1: String::new(),
            priority_need2: String::new(),
            priority_need3: String::new(),
            narrative_summary: String::new(),
            movements: vec![Movement::new(ids.next_id())],
        }
    }

    /// Structural invariants not expressible in the type (checked on load).
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        if self.movements.is_empty() {
            return Err(CoreError::NoMovements);
        }
        Ok(())
    }

    /// The three priority needs, in order.
    pub fn priority_needs(&self) -> [&str; 3] {
        [&self.priority_need1, &self.priority_need2, &self.priority_need3]
    }

    /// Position of the movement with `id`, if present.
    pub fn movement_index(&self, id: &MovementId) -> Option<usize> {
        self.movements.iter().position(|m| &m.id == id)
    }
}
