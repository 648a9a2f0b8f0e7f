use serde_json::Value;

/// Earth mean radius in km; dividing a km radius by this yields the angular
/// radius of the spherical cap.
pub const EARTH_RADIUS_KM: f64 = 6378.1;

/// A validated location-radius query. Construction is the validation gate:
/// nothing reaches the store until all three parameters parsed as numbers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

impl GeoQuery {
    pub fn from_params(
        lat: Option<&str>,
        lng: Option<&str>,
        radius: Option<&str>,
    ) -> Result<Self, &'static str> {
        let (lat, lng, radius) = match (non_empty(lat), non_empty(lng), non_empty(radius)) {
            (Some(lat), Some(lng), Some(radius)) => (lat, lng, radius),
            _ => return Err("Latitude, longitude, and radius are required."),
        };

        match (
            lat.parse::<f64>(),
            lng.parse::<f64>(),
            radius.parse::<f64>(),
        ) {
            (Ok(latitude), Ok(longitude), Ok(radius_km))
                if latitude.is_finite() && longitude.is_finite() && radius_km.is_finite() =>
            {
                Ok(Self {
                    latitude,
                    longitude,
                    radius_km,
                })
            }
            _ => Err("Invalid latitude, longitude, or radius values."),
        }
    }

    pub fn radius_radians(&self) -> f64 {
        self.radius_km / EARTH_RADIUS_KM
    }

    /// Spherical-cap membership test, boundary inclusive. Longitude-first to
    /// match geospatial convention.
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        angular_distance(self.longitude, self.latitude, longitude, latitude)
            <= self.radius_radians()
    }
}

fn non_empty(param: Option<&str>) -> Option<&str> {
    param.filter(|value| !value.trim().is_empty())
}

/// Great-circle central angle between two points, in radians (haversine).
pub fn angular_distance(lng_a: f64, lat_a: f64, lng_b: f64, lat_b: f64) -> f64 {
    let delta_lat = (lat_b - lat_a).to_radians();
    let delta_lng = (lng_b - lng_a).to_radians();

    let half_chord = (delta_lat / 2.0).sin().powi(2)
        + lat_a.to_radians().cos() * lat_b.to_radians().cos() * (delta_lng / 2.0).sin().powi(2);

    2.0 * half_chord.sqrt().asin()
}

/// Stored coordinates arrive as JSON strings or numbers; anything else is
/// unusable and the caller skips the entry.
pub fn coordinate(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}
