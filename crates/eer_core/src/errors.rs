//! crates/eer_core/src/errors.rs
//! Boundary rejections for the data model (no I/O, no network).

use core::fmt;

/// Minimal error set for data-model validation & parsing.
#[derive(Clone, Debug, PartialEq)]
pub enum CoreError {
    /// Latitude outside [-90, 90] or not finite.
    LatitudeOutOfRange(f64),
    /// Longitude outside [-180, 180] or not finite.
    LongitudeOutOfRange(f64),
    /// A closed-enum field received a value outside its known set.
    UnknownChoice { field: &'static str, value: String },
    /// Date input that cannot be read as a calendar date.
    InvalidDate(String),
    /// A report must always carry at least one movement.
    NoMovements,
    /// Map interaction while no selection is pending.
    NoPendingSelection,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::LatitudeOutOfRange(v) => write!(f, "latitude out of range: {v}"),
            CoreError::LongitudeOutOfRange(v) => write!(f, "longitude out of range: {v}"),
            CoreError::UnknownChoice { field, value } => {
                write!(f, "unknown value for {field}: {value:?}")
            }
            CoreError::InvalidDate(s) => write!(f, "invalid date: {s:?}"),
            CoreError::NoMovements => write!(f, "report must contain at least one movement"),
            CoreError::NoPendingSelection => write!(f, "no map selection pending"),
        }
    }
}

impl std::error::Error for CoreError {}
