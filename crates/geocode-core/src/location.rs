use serde::{Deserialize, Serialize};

use crate::address::GeoAddress;
use crate::coordinate::GeoCoordinate;
use crate::shape::{GeoRectangle, GeoShape};

/// One geocoded place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Display name reported by the service.
    pub title: String,
    /// Language of `title`, when the service states it.
    pub language: Option<String>,
    pub coordinate: GeoCoordinate,
    pub address: GeoAddress,
    /// Extent of the place. Only set when the response carries one.
    pub bounding_box: Option<GeoRectangle>,
}

/// Keep the locations whose coordinate lies within `bounds`.
///
/// An unset shape keeps everything; an invalid one keeps nothing.
#[must_use]
pub fn filter_within(locations: Vec<GeoLocation>, bounds: &GeoShape) -> Vec<GeoLocation> {
    if matches!(bounds, GeoShape::Unset) {
        return locations;
    }
    locations
        .into_iter()
        .filter(|location| bounds.contains(&location.coordinate))
        .collect()
}
