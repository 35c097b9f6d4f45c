use crate::domain::model::{Coordinates, NearestStop, ShuttleStop};
use geo::{Distance, Geodesic, Point};

const METERS_PER_MILE: f64 = 1_609.344;

/// WGS84 測地線距離（英里）。站點座標無法解析時回傳無限大。
pub fn distance_miles(user: Coordinates, stop: &ShuttleStop) -> f64 {
    match stop.coordinates() {
        Ok(stop_coords) => geodesic_miles(user, stop_coords),
        Err(e) => {
            tracing::debug!("Skipping stop '{}': {}", stop.origin, e);
            f64::INFINITY
        }
    }
}

pub fn geodesic_miles(a: Coordinates, b: Coordinates) -> f64 {
    // geo 的 Point 以 (x=經度, y=緯度) 表示
    let from = Point::new(a.longitude, a.latitude);
    let to = Point::new(b.longitude, b.latitude);
    Geodesic.distance(from, to) / METERS_PER_MILE
}

/// 線性掃描取最近站點；距離相同時保留較早出現者
pub fn find_nearest<'a, I>(user: Coordinates, candidates: I) -> Option<NearestStop>
where
    I: IntoIterator<Item = &'a ShuttleStop>,
{
    let mut best: Option<(&ShuttleStop, f64)> = None;

    for stop in candidates {
        let distance = distance_miles(user, stop);
        if !distance.is_finite() {
            continue;
        }
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((stop, distance)),
        }
    }

    best.map(|(stop, distance_miles)| NearestStop {
        stop: stop.clone(),
        distance_miles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(origin: &str, location: &str) -> ShuttleStop {
        ShuttleStop {
            origin: origin.to_string(),
            destination: "North Depot".to_string(),
            pickup_times: "07:00".to_string(),
            location: location.to_string(),
        }
    }

    #[test]
    fn test_same_point_is_zero_miles() {
        let here = Coordinates::new(40.0, -75.0).unwrap();
        assert!(geodesic_miles(here, here).abs() < 1e-9);
    }

    #[test]
    fn test_known_distance_new_york_to_london() {
        let nyc = Coordinates::new(40.7128, -74.0060).unwrap();
        let london = Coordinates::new(51.5074, -0.1278).unwrap();
        let miles = geodesic_miles(nyc, london);
        assert!((miles - 3470.0).abs() < 15.0, "got {}", miles);
    }

    #[test]
    fn test_one_degree_of_latitude_is_about_69_miles() {
        let a = Coordinates::new(0.0, 0.0).unwrap();
        let b = Coordinates::new(1.0, 0.0).unwrap();
        let miles = geodesic_miles(a, b);
        assert!((miles - 68.7).abs() < 0.5, "got {}", miles);
    }

    #[test]
    fn test_unparseable_location_is_infinite() {
        let here = Coordinates::new(40.0, -75.0).unwrap();
        assert!(distance_miles(here, &stop("Harbour Road", "TBC")).is_infinite());
        assert!(distance_miles(here, &stop("Harbour Road", "")).is_infinite());
    }

    #[test]
    fn test_find_nearest_picks_closest() {
        let here = Coordinates::new(40.0, -75.0).unwrap();
        let stops = vec![
            stop("Far", "41.0, -75.0"),
            stop("Near", "40.01, -75.0"),
            stop("Middle", "40.5, -75.0"),
        ];

        let nearest = find_nearest(here, &stops).unwrap();
        assert_eq!(nearest.stop.origin, "Near");
        assert!(nearest.distance_miles < 1.0);
    }

    #[test]
    fn test_find_nearest_skips_bad_rows() {
        let here = Coordinates::new(40.0, -75.0).unwrap();
        let stops = vec![stop("Broken", "not a location"), stop("Valid", "42.0, -75.0")];

        let nearest = find_nearest(here, &stops).unwrap();
        assert_eq!(nearest.stop.origin, "Valid");
    }

    #[test]
    fn test_find_nearest_ties_keep_first() {
        let here = Coordinates::new(40.0, -75.0).unwrap();
        let stops = vec![stop("First", "40.1, -75.0"), stop("Second", "40.1, -75.0")];

        let nearest = find_nearest(here, &stops).unwrap();
        assert_eq!(nearest.stop.origin, "First");
    }

    #[test]
    fn test_find_nearest_none_when_all_rows_invalid() {
        let here = Coordinates::new(40.0, -75.0).unwrap();
        let stops = vec![stop("A", "TBC"), stop("B", "n/a")];
        assert!(find_nearest(here, &stops).is_none());
        assert!(find_nearest(here, &Vec::<ShuttleStop>::new()).is_none());
    }
}
