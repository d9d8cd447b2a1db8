// src/location.rs

use std::future::Future;
use std::time::Duration;

use crate::config::NearbyConfig;
use crate::geopoint::GeoPoint;

/// Why the platform could not report a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

/// The answer of a single geolocation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationFix {
    Available(GeoPoint),
    Unavailable(UnavailableReason),
}

/// Anything that can report the user's current position, typically a bridge to the
/// platform geolocation API.
pub trait LocationSource {
    fn current_location(&self) -> impl Future<Output = LocationFix> + Send;
}

/// A source that always gives the same answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticLocation(pub LocationFix);

impl StaticLocation {
    pub fn at(point: GeoPoint) -> Self {
        StaticLocation(LocationFix::Available(point))
    }

    pub fn unavailable(reason: UnavailableReason) -> Self {
        StaticLocation(LocationFix::Unavailable(reason))
    }
}

impl LocationSource for StaticLocation {
    async fn current_location(&self) -> LocationFix {
        self.0
    }
}

/// Where a resolved coordinate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationOrigin {
    Device,
    Fallback(UnavailableReason),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedLocation {
    pub point: GeoPoint,
    pub origin: LocationOrigin,
}

impl ResolvedLocation {
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, LocationOrigin::Fallback(_))
    }
}

/// Turns a [`LocationSource`] answer into a coordinate the rest of the app can use.
///
/// Slow sources are cut off after `timeout` and treated as
/// [`UnavailableReason::Timeout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationResolver {
    fallback: GeoPoint,
    timeout: Duration,
}

impl LocationResolver {
    pub fn new(fallback: GeoPoint, timeout: Duration) -> Self {
        LocationResolver { fallback, timeout }
    }

    pub fn from_config(config: &NearbyConfig) -> Self {
        Self::new(config.fallback_center, config.location_timeout)
    }

    pub fn fallback(&self) -> GeoPoint {
        self.fallback
    }

    async fn fix<S: LocationSource>(&self, source: &S) -> LocationFix {
        match tokio::time::timeout(self.timeout, source.current_location()).await {
            Ok(fix) => fix,
            Err(_) => {
                log::warn!(
                    "Location source did not answer within {:?}",
                    self.timeout
                );
                LocationFix::Unavailable(UnavailableReason::Timeout)
            }
        }
    }

    /// Resolves the device position, substituting the fallback coordinate when the source
    /// reports no position or times out.
    pub async fn resolve<S: LocationSource>(&self, source: &S) -> ResolvedLocation {
        match self.fix(source).await {
            LocationFix::Available(point) => ResolvedLocation {
                point,
                origin: LocationOrigin::Device,
            },
            LocationFix::Unavailable(reason) => {
                log::warn!(
                    "Location unavailable ({:?}), using fallback ({}, {})",
                    reason,
                    self.fallback.latitude(),
                    self.fallback.longitude()
                );
                ResolvedLocation {
                    point: self.fallback,
                    origin: LocationOrigin::Fallback(reason),
                }
            }
        }
    }

    /// Resolves the device position without a fallback. `None` feeds straight into the
    /// pass-through mode of [`crate::filter_by_proximity`].
    pub async fn resolve_optional<S: LocationSource>(&self, source: &S) -> Option<GeoPoint> {
        match self.fix(source).await {
            LocationFix::Available(point) => Some(point),
            LocationFix::Unavailable(reason) => {
                log::debug!("Location unavailable ({:?}), no center", reason);
                None
            }
        }
    }
}
