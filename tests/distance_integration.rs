
#[cfg(test)]
mod distance_tests {
    use super::test_utils::shared::*;
    use nearby_rs::geopoint::EARTH_RADIUS_KM;
    use nearby_rs::{distance_km, GeoPoint};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_point(rng: &mut StdRng) -> GeoPoint {
        GeoPoint::new(rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0))
            .expect("generated in range")
    }

    #[test]
    fn test_identity_symmetry_and_non_negativity() {
        let mut rng = StdRng::seed_from_u64(0x6e656172);
        for _ in 0..2_000 {
            let a = random_point(&mut rng);
            let b = random_point(&mut rng);

            assert_eq!(distance_km(a, a), 0.0, "distance to self for {:?}", a);

            let ab = distance_km(a, b);
            let ba = distance_km(b, a);
            assert!(ab >= 0.0, "negative distance between {:?} and {:?}", a, b);
            assert!(!ab.is_nan(), "NaN distance between {:?} and {:?}", a, b);
            assert!(
                (ab - ba).abs() <= 1e-9,
                "asymmetric distance {} vs {} for {:?}, {:?}",
                ab,
                ba,
                a,
                b
            );
            assert!(ab <= std::f64::consts::PI * EARTH_RADIUS_KM + 1e-6);
        }
    }

    #[test]
    fn test_same_point_is_zero_km() {
        let cp = connaught_place();
        assert_eq!(distance_km(cp, cp), 0.0);
    }

    #[test]
    fn test_delhi_to_lucknow() {
        let d = distance_km(connaught_place(), lucknow());
        // Great-circle distance; the road distance is considerably longer.
        assert!((410.0..425.0).contains(&d), "unexpected distance {}", d);
    }

    #[test]
    fn test_monotonic_with_angular_separation() {
        let cp = connaught_place();
        let mut previous = 0.0;
        for step in 1..=50 {
            let d = distance_km(cp, north_of(cp, step as f64 * 2.0));
            assert!(d > previous, "distance did not grow at step {}", step);
            previous = d;
        }
    }

    #[test]
    fn test_unit_conversions_agree() {
        let cp = connaught_place();
        let lk = lucknow();
        let radians = cp.radians_to(&lk);
        assert!((cp.kilometers_to(&lk) - radians * EARTH_RADIUS_KM).abs() < 1e-9);
        let ratio = cp.kilometers_to(&lk) / cp.miles_to(&lk);
        assert!((ratio - 1.609).abs() < 0.001, "km/mile ratio {}", ratio);
    }

    #[test]
    fn test_bounding_box_contains_the_whole_circle() {
        let mut rng = StdRng::seed_from_u64(42);
        let cp = connaught_place();
        let bbox = cp.bounding_box(10.0);
        for _ in 0..500 {
            let candidate = GeoPoint::new(
                cp.latitude() + rng.gen_range(-0.2..0.2),
                cp.longitude() + rng.gen_range(-0.2..0.2),
            )
            .unwrap();
            if distance_km(cp, candidate) <= 10.0 {
                assert!(bbox.contains(&candidate), "{:?} escaped {:?}", candidate, bbox);
            }
        }
        assert!(!bbox.contains(&lucknow()));
    }
}
