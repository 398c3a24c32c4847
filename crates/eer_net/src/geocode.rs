//! crates/eer_net/src/geocode.rs
//! Country name → map centre, via a Nominatim-compatible search endpoint.
//!
//! Lookup failures never reach the user: the map simply opens on the world.

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use eer_core::Coordinates;
use eer_form::MapView;

use crate::config::{parse_url, ClientConfig};
use crate::error::{NetError, NetResult};

/// One search hit. Nominatim returns coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    http: reqwest::Client,
    url: Url,
}

impl Geocoder {
    pub fn new(config: &ClientConfig) -> NetResult<Self> {
        Ok(Self {
            http: config.http_client()?,
            url: parse_url("geocoder_url", &config.geocoder_url)?,
        })
    }

    /// First match for `country`, if any.
    pub async fn lookup(&self, country: &str) -> NetResult<Option<Coordinates>> {
        let country = country.trim();
        if country.is_empty() {
            return Ok(None);
        }

        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("q", country)
            .append_pair("format", "json")
            .append_pair("limit", "1");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NetError::Http { status: status.as_u16(), body });
        }

        let places: Vec<Place> = resp.json().await?;
        let Some(first) = places.into_iter().next() else {
            debug!(country, "no geocoding match");
            return Ok(None);
        };
        parse_place(&first).map(Some)
    }

    /// Initial view for the map: the country at zoom 6, else the world.
    pub async fn initial_view(&self, country: &str) -> MapView {
        match self.lookup(country).await {
            Ok(Some(c)) => MapView::country(c),
            Ok(None) => MapView::world(),
            Err(e) => {
                warn!(country, error = %e, "geocoding failed; using world view");
                MapView::world()
            }
        }
    }
}

fn parse_place(p: &Place) -> NetResult<Coordinates> {
    let lat: f64 = p
        .lat
        .trim()
        .parse()
        .map_err(|_| NetError::Integration(format!("geocoder lat not numeric: {:?}", p.lat)))?;
    let lon: f64 = p
        .lon
        .trim()
        .parse()
        .map_err(|_| NetError::Integration(format!("geocoder lon not numeric: {:?}", p.lon)))?;
    Coordinates::new(lat, lon).map_err(|e| NetError::Integration(format!("geocoder: {e}")))
}
