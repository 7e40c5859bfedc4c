// Geodesic helpers for the detail panel and click-to-marker hit testing.

use geo::{Bearing, Distance, Geodesic, Point};

/// Distance in meters and compass bearing in degrees from `p1` to `p2`,
/// both given as (lat, lon).
pub fn distance_and_bearing(p1: (f64, f64), p2: (f64, f64)) -> (f64, f64) {
    let start = Point::new(p1.1, p1.0);
    let end = Point::new(p2.1, p2.0);
    let distance = Geodesic.distance(start, end);
    let bearing = (Geodesic.bearing(start, end) + 360.0) % 360.0;
    (distance, bearing)
}

/// >= 1000m: show as km with 2 decimal places.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 { format!("{:.0} m", meters) } else { format!("{:.2} km", meters / 1000.0) }
}

pub fn format_bearing(degrees: f64) -> String {
    let directions = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let idx = ((degrees + 22.5) / 45.0) as usize % 8;
    format!("{:.0}° {}", degrees, directions[idx])
}

/// "1.25 km @ 45° NE", or None when either point is out of range.
pub fn distance_bearing_string(from: (f64, f64), to: (f64, f64)) -> Option<String> {
    for (lat, lon) in [from, to] {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
    }
    let (distance, bearing) = distance_and_bearing(from, to);
    Some(format!("{} @ {}", format_distance(distance), format_bearing(bearing)))
}
