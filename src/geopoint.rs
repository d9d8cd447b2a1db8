// src/geopoint.rs

use serde::{Deserialize, Serialize};

use crate::error::NearbyError;

/// Mean Earth radius used by every distance computation in this crate.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

// Slack added to every bounding box edge, about 0.1 mm on the ground.
const BOX_PADDING_DEG: f64 = 1e-9;

/// A geographical point in decimal degrees.
///
/// Latitude is always within `[-90, 90]` and longitude within `[-180, 180]`; both
/// [`GeoPoint::new`] and deserialization enforce this. Rows coming from the backend
/// may spell the columns `latitude`/`longitude` or `lat`/`lng`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    #[serde(alias = "lat")]
    latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = NearbyError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.latitude, raw.longitude)
    }
}

impl GeoPoint {
    /// Creates a new `GeoPoint`.
    ///
    /// # Errors
    /// Returns [`NearbyError::InvalidCoordinate`] if latitude is not between -90 and 90,
    /// or longitude is not between -180 and 180 (NaN is rejected by both checks).
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, NearbyError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(NearbyError::InvalidCoordinate(format!(
                "Latitude must be between -90 and 90 degrees, got {}",
                latitude
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(NearbyError::InvalidCoordinate(format!(
                "Longitude must be between -180 and 180 degrees, got {}",
                longitude
            )));
        }
        Ok(GeoPoint {
            latitude,
            longitude,
        })
    }

    // Only for compile-time constants known to be in range.
    pub(crate) const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        GeoPoint {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Angular distance to `other` in radians, measured along a great circle.
    pub fn radians_to(&self, other: &GeoPoint) -> f64 {
        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lng = (other.longitude - self.longitude).to_radians();

        let h = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        // Rounding can push h a hair past 1 for near-antipodal points.
        let h = h.min(1.0);

        2.0 * h.sqrt().atan2((1.0 - h).sqrt())
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn kilometers_to(&self, other: &GeoPoint) -> f64 {
        EARTH_RADIUS_KM * self.radians_to(other)
    }

    /// Great-circle distance to `other` in miles.
    pub fn miles_to(&self, other: &GeoPoint) -> f64 {
        EARTH_RADIUS_MILES * self.radians_to(other)
    }

    /// Returns the smallest latitude/longitude box containing every point within
    /// `radius_km` of this one.
    ///
    /// The box is meant as a cheap pre-filter before the exact haversine check. When the
    /// circle touches a pole or crosses the antimeridian the longitude span widens to the
    /// whole `[-180, 180]` range instead of wrapping.
    pub fn bounding_box(&self, radius_km: f64) -> BoundingBox {
        let angular = radius_km.max(0.0) / EARTH_RADIUS_KM;
        // Stay in degrees for the latitude edges; a radians round trip can land a few
        // ulps inside the circle and drop points on its edge (or the center at r = 0).
        let angular_deg = angular.to_degrees() + BOX_PADDING_DEG;

        let min_lat = (self.latitude - angular_deg).max(-90.0);
        let max_lat = (self.latitude + angular_deg).min(90.0);

        let full_longitude = BoundingBox {
            min_lat,
            max_lat,
            min_lng: -180.0,
            max_lng: 180.0,
        };

        if self.latitude + angular_deg >= 90.0 || self.latitude - angular_deg <= -90.0 {
            return full_longitude;
        }

        let ratio = angular.sin() / self.latitude.to_radians().cos();
        if ratio >= 1.0 {
            return full_longitude;
        }
        let delta_lng = ratio.asin().to_degrees() + BOX_PADDING_DEG;
        let min_lng = self.longitude - delta_lng;
        let max_lng = self.longitude + delta_lng;
        if min_lng < -180.0 || max_lng > 180.0 {
            return full_longitude;
        }

        BoundingBox {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        }
    }
}

/// Great-circle distance between two points in kilometers (haversine, R = 6371 km).
///
/// Symmetric, zero for identical points and never negative.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    a.kilometers_to(&b)
}

/// An axis-aligned latitude/longitude rectangle, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lng..=self.max_lng).contains(&point.longitude)
    }
}
