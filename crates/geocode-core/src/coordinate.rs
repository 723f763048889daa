use serde::{Deserialize, Deserializer, Serialize};

/// Mean earth radius in metres used for great-circle distances.
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_007.2;

/// A WGS84 position.
///
/// Missing or unconvertible components are `NaN`, never zero, so a document
/// that omits a longitude can be told apart from one placed on the prime
/// meridian. `NaN` serialises as JSON `null`.
///
/// Equality treats `NaN` as equal to `NaN` in the same component, so a
/// coordinate without altitude equals a copy of itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoCoordinate {
    #[serde(default = "nan", deserialize_with = "nan_if_null")]
    pub latitude: f64,
    #[serde(default = "nan", deserialize_with = "nan_if_null")]
    pub longitude: f64,
    #[serde(default = "nan", deserialize_with = "nan_if_null")]
    pub altitude: f64,
}

impl Default for GeoCoordinate {
    fn default() -> Self {
        Self {
            latitude: f64::NAN,
            longitude: f64::NAN,
            altitude: f64::NAN,
        }
    }
}

impl PartialEq for GeoCoordinate {
    fn eq(&self, other: &Self) -> bool {
        same_component(self.latitude, other.latitude)
            && same_component(self.longitude, other.longitude)
            && same_component(self.altitude, other.altitude)
    }
}

#[allow(clippy::float_cmp)]
fn same_component(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

impl GeoCoordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: f64::NAN,
        }
    }

    #[must_use]
    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = altitude;
        self
    }

    /// Latitude in `[-90, 90]` and longitude in `[-180, 180]`.
    ///
    /// Altitude never affects validity.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    #[must_use]
    pub fn has_altitude(&self) -> bool {
        self.altitude.is_finite()
    }

    /// Haversine distance in metres. `NaN` when either end is invalid.
    #[must_use]
    pub fn distance_to(&self, other: &GeoCoordinate) -> f64 {
        if !self.is_valid() || !other.is_valid() {
            return f64::NAN;
        }
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_MEAN_RADIUS_M * h.sqrt().min(1.0).asin()
    }
}

fn nan() -> f64 {
    f64::NAN
}

fn nan_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
