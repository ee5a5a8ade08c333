/// Great-circle distance helpers for geofence checks.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two WGS84 coordinates.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let d = haversine_distance_m(48.8566, 2.3522, 48.8566, 2.3522);
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_known_city_pair() {
        // Paris (Notre-Dame) to London (Big Ben), roughly 340 km
        let d = haversine_distance_m(48.8530, 2.3499, 51.5007, -0.1246);
        assert!((d - 340_000.0).abs() < 5_000.0, "got {d}");
    }

    #[test]
    fn test_small_latitude_offset() {
        // 0.001 degrees of latitude is ~111 m anywhere on the globe
        let d = haversine_distance_m(45.0, 7.0, 45.001, 7.0);
        assert!((d - 111.2).abs() < 1.0, "got {d}");
    }

    #[test]
    fn test_geofence_radius_scenario() {
        // visitor ~150 m north of a restaurant with a 100 m radius
        let d = haversine_distance_m(48.8566, 2.3522, 48.85795, 2.3522);
        assert!(d > 100.0 && d < 200.0, "got {d}");
    }
}
