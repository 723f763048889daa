use serde::{Deserialize, Serialize};

/// Postal address of a place. Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeoAddress {
    pub street: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub postal_code: Option<String>,
}

impl GeoAddress {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.street.is_none()
            && self.district.is_none()
            && self.city.is_none()
            && self.county.is_none()
            && self.state.is_none()
            && self.country.is_none()
            && self.country_code.is_none()
            && self.postal_code.is_none()
    }
}
