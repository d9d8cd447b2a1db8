// src/nearby.rs

use serde::de::DeserializeOwned;

use crate::client::SupabaseClient;
use crate::error::NearbyError;
use crate::event::{Event, Venue};
use crate::geopoint::GeoPoint;
use crate::proximity::{rank_by_proximity, validate_radius, Locatable, ProximityResult};
use crate::query::TableQuery;
use crate::types::RadiusOption;

impl SupabaseClient {
    /// Fetches the events within `radius_km` of `center`, nearest first.
    ///
    /// When `center` is known, only rows inside the circle's bounding box are requested and
    /// the exact haversine filter runs on what comes back. When it is `None` every event is
    /// returned unfiltered and without distances, matching [`crate::filter_by_proximity`].
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use nearby_rs::{GeoPoint, SupabaseClient};
    /// # use nearby_rs::NearbyError;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), NearbyError> {
    /// let client = SupabaseClient::new("https://xyzcompany.supabase.co", "public-anon-key")?;
    /// let here = GeoPoint::new(28.6139, 77.2090)?;
    ///
    /// for result in client.nearby_events(Some(here), 5.0).await? {
    ///     println!("{} ({:.1} km)", result.item.title, result.distance_km.unwrap_or_default());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn nearby_events(
        &self,
        center: Option<GeoPoint>,
        radius_km: f64,
    ) -> Result<Vec<ProximityResult<Event>>, NearbyError> {
        self.nearby_rows(&self.events_table, center, radius_km).await
    }

    /// Fetches the venues within `radius_km` of `center`, nearest first. See
    /// [`SupabaseClient::nearby_events`].
    pub async fn nearby_venues(
        &self,
        center: Option<GeoPoint>,
        radius_km: f64,
    ) -> Result<Vec<ProximityResult<Venue>>, NearbyError> {
        self.nearby_rows(&self.venues_table, center, radius_km).await
    }

    /// [`SupabaseClient::nearby_events`] with the client's configured default radius
    /// (`NEARBY_DEFAULT_RADIUS_KM`, 5 km unless set).
    pub async fn nearby_events_default(
        &self,
        center: Option<GeoPoint>,
    ) -> Result<Vec<ProximityResult<Event>>, NearbyError> {
        self.nearby_events_within(center, self.default_radius).await
    }

    pub async fn nearby_venues_default(
        &self,
        center: Option<GeoPoint>,
    ) -> Result<Vec<ProximityResult<Venue>>, NearbyError> {
        self.nearby_venues_within(center, self.default_radius).await
    }

    /// Fetches the events within one of the preset radii, e.g. the one picked in the
    /// radius selector.
    pub async fn nearby_events_within(
        &self,
        center: Option<GeoPoint>,
        radius: RadiusOption,
    ) -> Result<Vec<ProximityResult<Event>>, NearbyError> {
        self.nearby_events(center, radius.km()).await
    }

    pub async fn nearby_venues_within(
        &self,
        center: Option<GeoPoint>,
        radius: RadiusOption,
    ) -> Result<Vec<ProximityResult<Venue>>, NearbyError> {
        self.nearby_venues(center, radius.km()).await
    }

    /// Generic form of [`SupabaseClient::nearby_events`] for any table whose rows carry
    /// `latitude`/`longitude` columns.
    pub async fn nearby_rows<T>(
        &self,
        table: &str,
        center: Option<GeoPoint>,
        radius_km: f64,
    ) -> Result<Vec<ProximityResult<T>>, NearbyError>
    where
        T: Locatable + DeserializeOwned + Send + Sync + 'static,
    {
        validate_radius(radius_km)?;

        let mut query = TableQuery::new(table);
        if let Some(center) = center {
            query.within_bounds(&center.bounding_box(radius_km));
        }
        let rows: Vec<T> = query.find(self).await?;
        log::debug!("Fetched {} candidate row(s) from '{}'", rows.len(), table);

        rank_by_proximity(center, rows, radius_km, |item| item.location())
    }
}
