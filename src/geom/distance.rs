use geo::{Euclidean, Geometry, Length, LineString, MultiPoint};

/// Survey distance of a geometry in whole kilometres.
///
/// Lines are measured along their path in the layer's (projected, metric) CRS.
/// MultiPoints are joined in stored order into one path, so point order
/// matters. Points, and every other geometry kind, have no survey distance.
///
/// Kilometres are rounded half-to-even: 2.5 km → 2, 3.5 km → 4.
pub fn distance_km(geometry: &Geometry<f64>) -> u64 {
    match geometry {
        Geometry::LineString(line) => meters_to_km(Euclidean.length(line)),
        Geometry::MultiPoint(points) => meters_to_km(multipoint_path_length_m(points)),
        Geometry::Point(_) => 0,
        _ => 0,
    }
}

/// Length of the path visiting the points in stored order.
fn multipoint_path_length_m(points: &MultiPoint<f64>) -> f64 {
    if points.0.len() < 2 { return 0.0 }
    Euclidean.length(&LineString::from(points.0.clone()))
}

#[inline]
fn meters_to_km(length_m: f64) -> u64 {
    if !length_m.is_finite() || length_m <= 0.0 { return 0 }
    (length_m / 1000.0).round_ties_even() as u64
}
