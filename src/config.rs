use std::time::Duration;

use crate::error::NearbyError;
use crate::geopoint::GeoPoint;
use crate::types::RadiusOption;

/// Connaught Place, New Delhi. Used when the device cannot report a location.
pub const DEFAULT_FALLBACK_LATITUDE: f64 = 28.6139;
pub const DEFAULT_FALLBACK_LONGITUDE: f64 = 77.2090;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";

/// Runtime settings for the data client, the location resolver and the geocoder.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyConfig {
    pub supabase_url: String,
    pub anon_key: String,
    pub access_token: Option<String>,
    pub events_table: String,
    pub venues_table: String,
    pub default_radius: RadiusOption,
    pub fallback_center: GeoPoint,
    pub location_timeout: Duration,
    pub geocoder_url: String,
}

impl NearbyConfig {
    /// Creates a configuration with the given credentials and defaults for everything else.
    pub fn new(supabase_url: &str, anon_key: &str) -> Self {
        NearbyConfig {
            supabase_url: supabase_url.to_string(),
            anon_key: anon_key.to_string(),
            access_token: None,
            events_table: "events".to_string(),
            venues_table: "venues".to_string(),
            default_radius: RadiusOption::default(),
            fallback_center: default_fallback_center(),
            location_timeout: Duration::from_secs(10),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
        }
    }

    /// Reads the configuration from the process environment.
    ///
    /// `SUPABASE_URL` and `SUPABASE_ANON_KEY` are required. The optional variables are
    /// `SUPABASE_ACCESS_TOKEN`, `NEARBY_EVENTS_TABLE`, `NEARBY_VENUES_TABLE`,
    /// `NEARBY_DEFAULT_RADIUS_KM`, `NEARBY_FALLBACK_LAT` together with
    /// `NEARBY_FALLBACK_LNG`, `NEARBY_LOCATION_TIMEOUT_MS` and `NEARBY_GEOCODER_URL`.
    pub fn from_env() -> Result<Self, NearbyError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, e.g. a map loaded from a file.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, NearbyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| NearbyError::InvalidArgument(format!("{} is not set", key)))
        };

        let mut config =
            NearbyConfig::new(&required("SUPABASE_URL")?, &required("SUPABASE_ANON_KEY")?);
        config.access_token = lookup("SUPABASE_ACCESS_TOKEN").filter(|v| !v.is_empty());

        if let Some(table) = lookup("NEARBY_EVENTS_TABLE") {
            config.events_table = table;
        }
        if let Some(table) = lookup("NEARBY_VENUES_TABLE") {
            config.venues_table = table;
        }
        if let Some(radius) = lookup("NEARBY_DEFAULT_RADIUS_KM") {
            config.default_radius = radius.parse()?;
        }

        match (lookup("NEARBY_FALLBACK_LAT"), lookup("NEARBY_FALLBACK_LNG")) {
            (Some(lat), Some(lng)) => {
                config.fallback_center = GeoPoint::new(
                    parse_f64("NEARBY_FALLBACK_LAT", &lat)?,
                    parse_f64("NEARBY_FALLBACK_LNG", &lng)?,
                )?;
            }
            (None, None) => {}
            _ => {
                return Err(NearbyError::InvalidArgument(
                    "NEARBY_FALLBACK_LAT and NEARBY_FALLBACK_LNG must be set together".to_string(),
                ))
            }
        }

        if let Some(ms) = lookup("NEARBY_LOCATION_TIMEOUT_MS") {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                NearbyError::InvalidArgument(format!(
                    "NEARBY_LOCATION_TIMEOUT_MS must be a whole number of milliseconds, got '{}'",
                    ms
                ))
            })?;
            config.location_timeout = Duration::from_millis(ms);
        }
        if let Some(url) = lookup("NEARBY_GEOCODER_URL") {
            config.geocoder_url = url;
        }

        log::debug!(
            "Loaded config: supabase_url={}, events_table={}, venues_table={}, default_radius={}",
            config.supabase_url,
            config.events_table,
            config.venues_table,
            config.default_radius
        );
        Ok(config)
    }
}

fn parse_f64(key: &str, value: &str) -> Result<f64, NearbyError> {
    value.trim().parse().map_err(|_| {
        NearbyError::InvalidArgument(format!("{} must be a number, got '{}'", key, value))
    })
}

fn default_fallback_center() -> GeoPoint {
    GeoPoint::new_unchecked(DEFAULT_FALLBACK_LATITUDE, DEFAULT_FALLBACK_LONGITUDE)
}
