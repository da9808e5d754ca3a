use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::address::FULL_ADDRESS_COLUMN;
use crate::error::AppError;
use crate::table::Table;

pub const LATITUDE_COLUMN: &str = "Latitude";
pub const LONGITUDE_COLUMN: &str = "Longitude";

/// Fixed client identifier sent with every provider request.
const USER_AGENT: &str = "address-to-gps";
/// Per-request provider timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Delay inserted before each lookup; a deliberate throughput ceiling so a
/// shared public provider with no authentication is never hammered.
pub const THROTTLE: Duration = Duration::from_millis(250);

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// A resolved coordinate pair. Either both values exist or the lookup
/// produced nothing — a half-populated pair cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One free-text address in, an optional coordinate pair out.
///
/// Timeouts, "no match" and provider-side failures are indistinguishable to
/// the caller; all collapse to `None`. Any provider honoring this shape is
/// substitutable, which is also how tests inject a canned implementation.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Option<Coordinates>;
}

/// Outcome of one raw provider call, kept internal so failure causes can be
/// told apart in the logs while the trait contract stays a plain option.
enum Lookup {
    Found(Coordinates),
    NotFound,
    TimedOut,
    ProviderError(String),
}

/// One entry of the provider's JSON search response. Nominatim reports
/// coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl Place {
    fn coordinates(&self) -> Option<Coordinates> {
        let latitude = self.lat.parse().ok()?;
        let longitude = self.lon.parse().ok()?;
        Some(Coordinates {
            latitude,
            longitude,
        })
    }
}

/// Geocoder backed by the public Nominatim search endpoint.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(NOMINATIM_URL)
    }

    /// Point the client at a different endpoint serving the same response
    /// shape, e.g. a self-hosted instance.
    pub fn with_base_url(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(NominatimGeocoder {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn lookup(&self, address: &str) -> Lookup {
        let request = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", address), ("format", "json"), ("limit", "1")]);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Lookup::TimedOut,
            Err(e) => return Lookup::ProviderError(e.to_string()),
        };
        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => return Lookup::ProviderError(e.to_string()),
        };
        match response.json::<Vec<Place>>().await {
            Ok(places) => match places.first().and_then(Place::coordinates) {
                Some(coords) => Lookup::Found(coords),
                None => Lookup::NotFound,
            },
            Err(e) if e.is_timeout() => Lookup::TimedOut,
            Err(e) => Lookup::ProviderError(e.to_string()),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Option<Coordinates> {
        match self.lookup(address).await {
            Lookup::Found(coords) => Some(coords),
            Lookup::NotFound => {
                debug!(%address, "no match from provider");
                None
            }
            Lookup::TimedOut => {
                warn!(%address, "provider timed out");
                None
            }
            Lookup::ProviderError(message) => {
                warn!(%address, %message, "provider error");
                None
            }
        }
    }
}

/// Shared counters over the row loop, read by the progress endpoint while a
/// conversion holds the table lock.
#[derive(Debug, Default)]
pub struct Progress {
    done: AtomicUsize,
    total: AtomicUsize,
}

impl Progress {
    pub fn start(&self, total: usize) {
        self.total.store(total, Ordering::SeqCst);
        self.done.store(0, Ordering::SeqCst);
    }

    fn bump(&self) {
        self.done.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> (usize, usize) {
        (
            self.done.load(Ordering::SeqCst),
            self.total.load(Ordering::SeqCst),
        )
    }
}

/// Counts reported back to the user after a conversion run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GeocodeSummary {
    pub rows: usize,
    pub misses: usize,
}

/// Geocode every row of the table, strictly sequentially.
///
/// Exactly one provider call is made per row, each preceded by a fixed
/// [`THROTTLE`] delay. A failed lookup records empty `Latitude`/`Longitude`
/// cells for that row only and the batch continues; there is no retry. The
/// two coordinate columns are appended once the loop finishes, so the row
/// count never changes.
pub async fn geocode_table(
    table: &mut Table,
    geocoder: &dyn Geocoder,
    progress: &Progress,
) -> Result<GeocodeSummary, AppError> {
    let addresses: Vec<String> = table
        .column(FULL_ADDRESS_COLUMN)
        .ok_or_else(|| anyhow::anyhow!("table has no {FULL_ADDRESS_COLUMN} column"))?
        .into_iter()
        .map(str::to_string)
        .collect();

    let rows = addresses.len();
    progress.start(rows);

    let mut latitudes = Vec::with_capacity(rows);
    let mut longitudes = Vec::with_capacity(rows);
    let mut misses = 0usize;

    for address in &addresses {
        sleep(THROTTLE).await;
        match geocoder.geocode(address).await {
            Some(coords) => {
                latitudes.push(coords.latitude.to_string());
                longitudes.push(coords.longitude.to_string());
            }
            None => {
                misses += 1;
                latitudes.push(String::new());
                longitudes.push(String::new());
            }
        }
        progress.bump();
    }

    table.add_column(LATITUDE_COLUMN, latitudes);
    table.add_column(LONGITUDE_COLUMN, longitudes);

    debug!(rows, misses, "geocoding loop finished");
    Ok(GeocodeSummary { rows, misses })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_parses_nominatim_payload() {
        let body = r#"[{"place_id":123,"lat":"39.7817213","lon":"-89.6501481","display_name":"Springfield, IL"}]"#;
        let places: Vec<Place> = serde_json::from_str(body).unwrap();
        let coords = places[0].coordinates().unwrap();
        assert_eq!(coords.latitude, 39.7817213);
        assert_eq!(coords.longitude, -89.6501481);
    }

    #[test]
    fn unparseable_coordinates_are_dropped() {
        let place = Place {
            lat: "not-a-number".into(),
            lon: "-89.65".into(),
        };
        assert!(place.coordinates().is_none());
    }

    #[test]
    fn empty_response_means_no_match() {
        let places: Vec<Place> = serde_json::from_str("[]").unwrap();
        assert!(places.first().and_then(Place::coordinates).is_none());
    }

    #[test]
    fn progress_snapshot_tracks_start() {
        let progress = Progress::default();
        progress.start(5);
        assert_eq!(progress.snapshot(), (0, 5));
        progress.bump();
        progress.bump();
        assert_eq!(progress.snapshot(), (2, 5));
    }
}
