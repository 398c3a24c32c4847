//! crates/eer_form/src/map.rs
//! Pending map selection.
//!
//! The picker records which movement endpoint the map was opened for, the
//! current view and the last clicked point. Views produced asynchronously
//! (geocoding) carry a `ViewTicket`; a ticket from an earlier opening no
//! longer matches and its view is dropped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use eer_core::{Coordinates, CoreError};

/// Initial view when nothing better is known.
pub const WORLD_CENTER: (f64, f64) = (20.0, 0.0);
pub const WORLD_ZOOM: u8 = 2;
/// Zoom used when the map is centred on a geocoded country.
pub const COUNTRY_ZOOM: u8 = 6;

/// Clicked coordinates keep this many decimal places (~0.1 m).
const CLICK_DECIMALS: i32 = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    From,
    To,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PendingSelection {
    #[default]
    Idle,
    Editing { index: usize, side: Side },
}

/// Identifies one opening of the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewTicket(u64);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: u8,
}

impl MapView {
    pub fn world() -> Self {
        // constants are in range
        let center = Coordinates::new(WORLD_CENTER.0, WORLD_CENTER.1)
            .unwrap_or_else(|e| unreachable!("world center: {e}"));
        Self { center, zoom: WORLD_ZOOM }
    }

    /// View centred on a geocoded country.
    pub fn country(center: Coordinates) -> Self {
        Self { center, zoom: COUNTRY_ZOOM }
    }
}

impl Default for MapView {
    fn default() -> Self {
        Self::world()
    }
}

#[derive(Debug, Default)]
pub struct MapPicker {
    pending: PendingSelection,
    generation: u64,
    view: MapView,
    clicked: Option<Coordinates>,
}

impl MapPicker {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn pending(&self) -> PendingSelection {
        self.pending
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self.pending, PendingSelection::Editing { .. })
    }

    #[inline]
    pub fn view(&self) -> MapView {
        self.view
    }

    /// Start editing one endpoint. Resets the view to the world and forgets
    /// any previous click; outstanding tickets become stale.
    pub fn open(&mut self, index: usize, side: Side) -> ViewTicket {
        self.generation = self.generation.wrapping_add(1);
        self.pending = PendingSelection::Editing { index, side };
        self.view = MapView::world();
        self.clicked = None;
        debug!(index, ?side, generation = self.generation, "map opened");
        ViewTicket(self.generation)
    }

    /// Apply a view computed for `ticket`. Returns false when the ticket is stale.
    pub fn apply_view(&mut self, ticket: ViewTicket, view: MapView) -> bool {
        if !self.is_open() || ticket.0 != self.generation {
            debug!(ticket = ticket.0, generation = self.generation, "stale map view dropped");
            return false;
        }
        self.view = view;
        true
    }

    /// Record a click, rounded to six decimals. Clicks on a wrapped copy of
    /// the world report longitudes past ±180; they are brought back in range.
    pub fn pick(&mut self, lat: f64, lon: f64) -> Result<Coordinates, CoreError> {
        if !self.is_open() {
            return Err(CoreError::NoPendingSelection);
        }
        let c = Coordinates::new(round_click(lat), round_click(wrap_longitude(lon)))?;
        self.clicked = Some(c);
        Ok(c)
    }

    /// Close with the clicked point. Without a click nothing happens and the
    /// map stays open.
    pub fn take_confirmation(&mut self) -> Option<(usize, Side, Coordinates)> {
        let PendingSelection::Editing { index, side } = self.pending else {
            return None;
        };
        let c = self.clicked?;
        self.close();
        Some((index, side, c))
    }

    pub fn close(&mut self) {
        self.pending = PendingSelection::Idle;
        self.clicked = None;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Keep the pending index aligned after the movement at `removed` is gone.
    pub fn movement_removed(&mut self, removed: usize) {
        if let PendingSelection::Editing { index, side } = self.pending {
            if index == removed {
                debug!(index, "pending map selection cancelled by removal");
                self.close();
            } else if index > removed {
                self.pending = PendingSelection::Editing { index: index - 1, side };
            }
        }
    }
}

fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

fn round_click(v: f64) -> f64 {
    let scale = 10f64.powi(CLICK_DECIMALS);
    (v * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_view_defaults() {
        let v = MapView::world();
        assert_eq!((v.center.lat(), v.center.lon(), v.zoom), (20.0, 0.0, 2));
        let c = MapView::country(Coordinates::new(15.4, 18.7).unwrap());
        assert_eq!(c.zoom, 6);
    }

    #[test]
    fn clicks_round_to_six_decimals() {
        let mut p = MapPicker::new();
        p.open(0, Side::From);
        let c = p.pick(12.345_678_91, -7.000_000_49).unwrap();
        assert_eq!(c.lat(), 12.345679);
        assert_eq!(c.lon(), -7.0);
    }

    #[test]
    fn wrapped_longitudes_come_back_in_range() {
        let mut p = MapPicker::new();
        p.open(0, Side::From);
        assert_eq!(p.pick(10.0, 190.0).unwrap().lon(), -170.0);
        assert_eq!(p.pick(10.0, -540.5).unwrap().lon(), 179.5);
        assert_eq!(p.pick(10.0, 180.0).unwrap().lon(), 180.0);
        assert!(matches!(p.pick(95.0, 0.0), Err(CoreError::LatitudeOutOfRange(_))));
    }

    #[test]
    fn pick_requires_open_map() {
        let mut p = MapPicker::new();
        assert_eq!(p.pick(1.0, 1.0), Err(CoreError::NoPendingSelection));
    }

    #[test]
    fn confirm_without_click_keeps_map_open() {
        let mut p = MapPicker::new();
        p.open(2, Side::To);
        assert_eq!(p.take_confirmation(), None);
        assert!(p.is_open());
        p.pick(1.0, 2.0).unwrap();
        let (i, s, c) = p.take_confirmation().unwrap();
        assert_eq!((i, s, c.lat(), c.lon()), (2, Side::To, 1.0, 2.0));
        assert_eq!(p.pending(), PendingSelection::Idle);
    }

    #[test]
    fn stale_ticket_is_ignored() {
        let mut p = MapPicker::new();
        let first = p.open(0, Side::From);
        let second = p.open(0, Side::To);
        let view = MapView::country(Coordinates::new(9.0, 9.0).unwrap());
        assert!(!p.apply_view(first, view));
        assert_eq!(p.view(), MapView::world());
        assert!(p.apply_view(second, view));
        p.close();
        assert!(!p.apply_view(second, MapView::world()));
    }

    #[test]
    fn removal_cancels_or_shifts() {
        let mut p = MapPicker::new();
        p.open(2, Side::From);
        p.movement_removed(0);
        assert_eq!(p.pending(), PendingSelection::Editing { index: 1, side: Side::From });
        p.movement_removed(3);
        assert_eq!(p.pending(), PendingSelection::Editing { index: 1, side: Side::From });
        p.movement_removed(1);
        assert_eq!(p.pending(), PendingSelection::Idle);
    }
}
