// src/event.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geopoint::GeoPoint;
use crate::proximity::Locatable;

/// A row of the `events` table.
///
/// The coordinate is stored in two plain columns (`latitude`, `longitude`) and is
/// flattened into [`GeoPoint`] on read, so a row with an out-of-range coordinate fails
/// to deserialize instead of producing a bogus distance later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub location: GeoPoint,
}

impl Event {
    pub fn new(id: impl Into<String>, title: impl Into<String>, location: GeoPoint) -> Self {
        Event {
            id: id.into(),
            title: title.into(),
            description: None,
            category: None,
            venue_id: None,
            starts_at: None,
            ends_at: None,
            location,
        }
    }
}

impl Locatable for Event {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn location(&self) -> GeoPoint {
        self.location
    }
}

/// A row of the `venues` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(flatten)]
    pub location: GeoPoint,
}

impl Venue {
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: GeoPoint) -> Self {
        Venue {
            id: id.into(),
            name: name.into(),
            address: None,
            capacity: None,
            location,
        }
    }
}

impl Locatable for Venue {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.name
    }

    fn location(&self) -> GeoPoint {
        self.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_row_round_trips_through_flat_columns() {
        let row = json!({
            "id": "9f0c",
            "title": "Rooftop jazz",
            "category": "music",
            "starts_at": "2026-11-02T18:30:00Z",
            "latitude": 28.6315,
            "longitude": 77.2167
        });
        let event: Event = serde_json::from_value(row).expect("event row");
        assert_eq!(event.title, "Rooftop jazz");
        assert_eq!(event.location.latitude(), 28.6315);
        assert!(event.starts_at.is_some());
        assert!(event.description.is_none());

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["latitude"], json!(28.6315));
        assert_eq!(back["longitude"], json!(77.2167));
        assert!(back.get("description").is_none());
    }

    #[test]
    fn venue_with_bad_coordinate_is_rejected() {
        let row = json!({"id": "v1", "name": "Nowhere", "latitude": 95.0, "longitude": 0.0});
        assert!(serde_json::from_value::<Venue>(row).is_err());
    }
}
