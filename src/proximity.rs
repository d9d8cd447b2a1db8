// src/proximity.rs

use crate::error::NearbyError;
use crate::geopoint::{distance_km, GeoPoint};
use crate::types::RadiusOption;

/// A domain object that sits somewhere on the map.
///
/// Events and venues implement this; anything else with a stable id, a display title
/// and a coordinate can too. The filter never inspects the rest of the item.
pub trait Locatable {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn location(&self) -> GeoPoint;
}

impl<T: Locatable + ?Sized> Locatable for &T {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn title(&self) -> &str {
        (**self).title()
    }

    fn location(&self) -> GeoPoint {
        (**self).location()
    }
}

/// An item that survived the proximity filter, together with its distance from the
/// search center.
///
/// `distance_km` is `None` only in pass-through mode, i.e. when no center was known.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityResult<T> {
    pub item: T,
    pub distance_km: Option<f64>,
}

pub(crate) fn validate_radius(radius_km: f64) -> Result<(), NearbyError> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(NearbyError::InvalidArgument(format!(
            "radius_km must be a non-negative finite number, got {}",
            radius_km
        )));
    }
    Ok(())
}

// Assumes the radius has already been validated.
fn rank<T, I, F>(
    center: Option<GeoPoint>,
    items: I,
    radius_km: f64,
    locate: F,
) -> Vec<ProximityResult<T>>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> GeoPoint,
{
    let Some(center) = center else {
        return items
            .into_iter()
            .map(|item| ProximityResult {
                item,
                distance_km: None,
            })
            .collect();
    };

    let mut within: Vec<(T, f64)> = items
        .into_iter()
        .filter_map(|item| {
            let distance = distance_km(center, locate(&item));
            (distance <= radius_km).then_some((item, distance))
        })
        .collect();

    // Stable, so equal distances keep their input order.
    within.sort_by(|a, b| a.1.total_cmp(&b.1));

    log::debug!(
        "Proximity filter kept {} item(s) within {} km of ({}, {})",
        within.len(),
        radius_km,
        center.latitude(),
        center.longitude()
    );

    within
        .into_iter()
        .map(|(item, distance)| ProximityResult {
            item,
            distance_km: Some(distance),
        })
        .collect()
}

/// Filters and ranks `items` by their distance from an arbitrary item iterator,
/// using `locate` to read each item's coordinate.
///
/// This is the general form behind [`filter_by_proximity`]; use it for owned items or
/// for types that carry their coordinate without implementing [`Locatable`].
///
/// # Errors
/// [`NearbyError::InvalidArgument`] when `radius_km` is negative, NaN or infinite. The
/// radius is checked even when `center` is `None`.
pub fn rank_by_proximity<T, I, F>(
    center: Option<GeoPoint>,
    items: I,
    radius_km: f64,
    locate: F,
) -> Result<Vec<ProximityResult<T>>, NearbyError>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> GeoPoint,
{
    validate_radius(radius_km)?;
    Ok(rank(center, items, radius_km, locate))
}

/// Returns the items within `radius_km` of `center`, nearest first.
///
/// * With a center, every kept item carries its distance and the list is sorted
///   ascending by distance. Items at equal distance keep their input order.
/// * Without a center (location unknown or denied) every item is passed through in
///   input order with no distance, so callers never show an empty list only because
///   location is missing.
///
/// # Errors
/// [`NearbyError::InvalidArgument`] when `radius_km` is negative or not finite.
///
/// # Examples
///
/// ```rust
/// use nearby_rs::{filter_by_proximity, GeoPoint, Locatable};
///
/// struct Spot { id: String, at: GeoPoint }
///
/// impl Locatable for Spot {
///     fn id(&self) -> &str { &self.id }
///     fn title(&self) -> &str { &self.id }
///     fn location(&self) -> GeoPoint { self.at }
/// }
///
/// # fn main() -> Result<(), nearby_rs::NearbyError> {
/// let connaught_place = GeoPoint::new(28.6139, 77.2090)?;
/// let spots = vec![
///     Spot { id: "lucknow".into(), at: GeoPoint::new(26.8467, 80.9462)? },
///     Spot { id: "here".into(), at: connaught_place },
/// ];
///
/// let nearby = filter_by_proximity(Some(connaught_place), &spots, 5.0)?;
/// assert_eq!(nearby.len(), 1);
/// assert_eq!(nearby[0].item.id(), "here");
/// # Ok(())
/// # }
/// ```
pub fn filter_by_proximity<T: Locatable>(
    center: Option<GeoPoint>,
    items: &[T],
    radius_km: f64,
) -> Result<Vec<ProximityResult<&T>>, NearbyError> {
    rank_by_proximity(center, items, radius_km, |item| item.location())
}

/// Same as [`filter_by_proximity`] but reads coordinates through an accessor instead
/// of the [`Locatable`] trait.
pub fn filter_by_proximity_with<T, F>(
    center: Option<GeoPoint>,
    items: &[T],
    radius_km: f64,
    locate: F,
) -> Result<Vec<ProximityResult<&T>>, NearbyError>
where
    F: Fn(&T) -> GeoPoint,
{
    rank_by_proximity(center, items, radius_km, |item: &&T| locate(*item))
}

/// Runs [`filter_by_proximity`] with one of the preset radii. Preset radii are always
/// valid, so this cannot fail.
pub fn filter_by_radius_option<T: Locatable>(
    center: Option<GeoPoint>,
    items: &[T],
    radius: RadiusOption,
) -> Vec<ProximityResult<&T>> {
    rank(center, items, radius.km(), |item| item.location())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_radius_before_looking_at_center() {
        let items: Vec<GeoPoint> = Vec::new();
        for radius in [-1.0, f64::NAN, f64::INFINITY] {
            let result = rank_by_proximity(None, items.iter(), radius, |p| **p);
            assert!(matches!(result, Err(NearbyError::InvalidArgument(_))));
        }
    }

    #[test]
    fn zero_radius_keeps_only_exact_matches() {
        let center = GeoPoint::new(28.6139, 77.2090).unwrap();
        let other = GeoPoint::new(28.6140, 77.2090).unwrap();
        let points = [other, center];
        let kept = rank_by_proximity(Some(center), points.iter(), 0.0, |p| **p).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(*kept[0].item, center);
        assert_eq!(kept[0].distance_km, Some(0.0));
    }
}
