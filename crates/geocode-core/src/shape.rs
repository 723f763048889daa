//! Geographic regions used as request bounds and as place extents.

use serde::{Deserialize, Serialize};

use crate::coordinate::GeoCoordinate;

/// A box described by its north-west and south-east corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoRectangle {
    pub top_left: GeoCoordinate,
    pub bottom_right: GeoCoordinate,
}

impl GeoRectangle {
    #[must_use]
    pub fn new(top_left: GeoCoordinate, bottom_right: GeoCoordinate) -> Self {
        Self {
            top_left,
            bottom_right,
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.top_left.is_valid()
            && self.bottom_right.is_valid()
            && self.top_left.latitude >= self.bottom_right.latitude
    }

    /// Whether `coord` lies inside the box, edges included.
    ///
    /// A box whose left edge is east of its right edge spans the
    /// antimeridian.
    #[must_use]
    pub fn contains(&self, coord: &GeoCoordinate) -> bool {
        if !self.is_valid() || !coord.is_valid() {
            return false;
        }
        let (top, bottom) = (self.top_left.latitude, self.bottom_right.latitude);
        if coord.latitude > top || coord.latitude < bottom {
            return false;
        }

        let (left, right) = (self.top_left.longitude, self.bottom_right.longitude);
        if left <= right {
            (left..=right).contains(&coord.longitude)
        } else {
            coord.longitude >= left || coord.longitude <= right
        }
    }

    #[must_use]
    pub fn center(&self) -> GeoCoordinate {
        let latitude = (self.top_left.latitude + self.bottom_right.latitude) / 2.0;
        let (left, right) = (self.top_left.longitude, self.bottom_right.longitude);
        let mut longitude = (left + right) / 2.0;
        if left > right {
            longitude += if longitude > 0.0 { -180.0 } else { 180.0 };
        }
        GeoCoordinate::new(latitude, longitude)
    }
}

/// A circle given by its center and a radius in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCircle {
    pub center: GeoCoordinate,
    pub radius: f64,
}

impl GeoCircle {
    #[must_use]
    pub fn new(center: GeoCoordinate, radius: f64) -> Self {
        Self { center, radius }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.center.is_valid() && self.radius.is_finite() && self.radius >= 0.0
    }

    #[must_use]
    pub fn contains(&self, coord: &GeoCoordinate) -> bool {
        self.is_valid() && self.center.distance_to(coord) <= self.radius
    }
}

/// Request bounds: a rectangle, a circle, or nothing at all.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeoShape {
    #[default]
    Unset,
    Rectangle(GeoRectangle),
    Circle(GeoCircle),
}

impl GeoShape {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            GeoShape::Unset => false,
            GeoShape::Rectangle(rect) => rect.is_valid(),
            GeoShape::Circle(circle) => circle.is_valid(),
        }
    }

    /// An unset or invalid shape contains nothing.
    #[must_use]
    pub fn contains(&self, coord: &GeoCoordinate) -> bool {
        match self {
            GeoShape::Unset => false,
            GeoShape::Rectangle(rect) => rect.contains(coord),
            GeoShape::Circle(circle) => circle.contains(coord),
        }
    }
}

impl From<GeoRectangle> for GeoShape {
    fn from(rect: GeoRectangle) -> Self {
        GeoShape::Rectangle(rect)
    }
}

impl From<GeoCircle> for GeoShape {
    fn from(circle: GeoCircle) -> Self {
        GeoShape::Circle(circle)
    }
}
