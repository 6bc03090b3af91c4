//! Great-circle distances and the fixed reference points around Konkuk University.

use super::domain::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Konkuk University main gate, the landmark every listing is measured against.
pub const KONKUK_UNIVERSITY: Coordinate = Coordinate::new(37.5408, 127.0794);

/// Subway stations serving the Konkuk University area.
pub const STATIONS: [(&str, Coordinate); 8] = [
    ("건대입구역", Coordinate::new(37.540458, 127.069320)),
    ("강변역", Coordinate::new(37.535102, 127.094761)),
    ("구의역", Coordinate::new(37.537190, 127.086164)),
    ("군자역", Coordinate::new(37.557200, 127.079546)),
    ("아차산역", Coordinate::new(37.551944, 127.089722)),
    ("광나루역", Coordinate::new(37.545291, 127.103485)),
    ("자양역", Coordinate::new(37.531667, 127.066667)),
    ("어린이대공원역", Coordinate::new(37.547778, 127.074444)),
];

/// Haversine distance in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Smallest distance from `point` to any entry of `references`; infinite for an empty set.
pub fn nearest_distance_km<'a, N, I>(point: Coordinate, references: I) -> f64
where
    N: 'a,
    I: IntoIterator<Item = &'a (N, Coordinate)>,
{
    references
        .into_iter()
        .map(|(_, reference)| haversine_km(point, *reference))
        .fold(f64::INFINITY, f64::min)
}

/// Distance to the closest of [`STATIONS`].
pub fn nearest_station_km(point: Coordinate) -> f64 {
    nearest_distance_km(point, STATIONS.iter())
}

/// Distance to [`KONKUK_UNIVERSITY`].
pub fn landmark_distance_km(point: Coordinate) -> f64 {
    haversine_km(point, KONKUK_UNIVERSITY)
}
