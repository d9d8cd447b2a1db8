pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod geocode;
pub mod geopoint;
pub mod location;
pub mod nearby;
pub mod proximity;
pub mod query;
pub mod types;

pub use client::SupabaseClient;
pub use config::NearbyConfig;
pub use error::NearbyError;
pub use event::{Event, Venue};
pub use geocode::{Geocoder, Place};
pub use geopoint::{distance_km, BoundingBox, GeoPoint};
pub use location::{
    LocationFix, LocationOrigin, LocationResolver, LocationSource, ResolvedLocation,
    StaticLocation, UnavailableReason,
};
pub use proximity::{
    filter_by_proximity, filter_by_proximity_with, filter_by_radius_option, rank_by_proximity,
    Locatable, ProximityResult,
};
pub use query::TableQuery;

// Re-export key types from the types module if needed directly
pub use types::RadiusOption;
