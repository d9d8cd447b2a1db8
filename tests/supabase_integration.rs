
#[cfg(test)]
mod supabase_tests {
    use super::test_utils::shared::*;
    use nearby_rs::{Event, Locatable, TableQuery, Venue};

    #[tokio::test]
    async fn test_nearby_events_are_sorted_and_within_radius() {
        let Some(client) = setup_client() else {
            return;
        };
        let results = client
            .nearby_events(Some(connaught_place()), 10.0)
            .await
            .expect("nearby_events failed");
        for pair in results.windows(2) {
            assert!(pair[0].distance_km.unwrap() <= pair[1].distance_km.unwrap());
        }
        for result in &results {
            let d = result.distance_km.expect("distance present with a center");
            assert!(d <= 10.0, "{} is {} km away", result.item.title(), d);
        }
    }

    #[tokio::test]
    async fn test_nearby_without_center_returns_whole_table() {
        let Some(client) = setup_client() else {
            return;
        };
        let all: Vec<Venue> = TableQuery::new(client.venues_table())
            .find(&client)
            .await
            .expect("venue query failed");
        let passthrough = client
            .nearby_venues(None, 1.0)
            .await
            .expect("nearby_venues failed");
        assert_eq!(passthrough.len(), all.len());
        assert!(passthrough.iter().all(|r| r.distance_km.is_none()));
    }

    #[tokio::test]
    async fn test_first_event() {
        let Some(client) = setup_client() else {
            return;
        };
        let mut query = TableQuery::new(client.events_table());
        query.order_by_ascending("starts_at");
        let first: Option<Event> = query.first(&client).await.expect("first failed");
        if let Some(event) = first {
            assert!(!event.id().is_empty());
        }
    }
}
