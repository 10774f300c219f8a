use geo::{GeodesicDistance, Point};

/// Distance on the WGS84 ellipsoid, in kilometres, between two points given
/// in decimal degrees.
pub fn geodesic_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let from = Point::new(lon1, lat1);
    let to = Point::new(lon2, lat2);
    from.geodesic_distance(&to) / 1000.0
}
