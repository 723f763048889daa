//! Recursive-descent parser for the geocoding service's `places` document.
//!
//! ```text
//! places              resultCode="OK|FAILED" resultDescription="..."
//!   place *           title="..." (required) language="..."
//!     location        exactly one
//!       position      exactly one coordinate
//!       boundingBox   northWest + southEast coordinates, optional
//!     address         optional
//!       country countryCode state county city district postCode
//!       thoroughfare  name + number
//!     alternatives    skipped
//! ```
//!
//! Structural faults anywhere abort the whole document: no partial list is
//! ever returned. Leaf numeric values that do not convert degrade to `NaN`
//! and unknown elements are skipped.

use geocode_core::{GeoAddress, GeoCoordinate, GeoLocation, GeoRectangle, GeoShape};

use crate::cursor::{Element, ElementCursor};
use crate::error::GeocodeParseError;
use crate::state::ParseState;

const ROOT: &str = "places";

/// Parses one geocode response buffer.
///
/// Configure with [`set_bounds`](Self::set_bounds) and
/// [`parse`](Self::parse), then call [`run`](Self::run). `run` consumes the
/// parser, so each instance parses exactly once.
#[derive(Debug, Default)]
pub struct GeocodeXmlParser {
    bounds: GeoShape,
    data: Vec<u8>,
}

impl GeocodeXmlParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the request bounds.
    ///
    /// Results are neither filtered by nor annotated with the bounds; use
    /// [`geocode_core::filter_within`] to clip on the caller's side.
    pub fn set_bounds(&mut self, bounds: GeoShape) {
        self.bounds = bounds;
    }

    #[must_use]
    pub fn bounds(&self) -> &GeoShape {
        &self.bounds
    }

    /// Store the response buffer. Parsing starts with [`run`](Self::run).
    pub fn parse(&mut self, data: impl Into<Vec<u8>>) {
        self.data = data.into();
    }

    /// Walk the buffer and return the places in document order.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeParseError`] when the buffer is not well-formed XML,
    /// is truncated, does not follow the `places` structure, or reports a
    /// service-side failure.
    pub fn run(self) -> Result<Vec<GeoLocation>, GeocodeParseError> {
        let mut cursor = ElementCursor::new(&self.data);
        let outcome = parse_document(&mut cursor);

        match &outcome {
            Ok(locations) => {
                cursor.enter(ParseState::Done);
                if self.bounds.is_valid() {
                    let outside = locations
                        .iter()
                        .filter(|l| !self.bounds.contains(&l.coordinate))
                        .count();
                    tracing::debug!(outside, "places outside the request bounds");
                }
                tracing::debug!(
                    places = locations.len(),
                    bytes = self.data.len(),
                    state = %cursor.state(),
                    "geocode response parsed"
                );
            }
            Err(error) => {
                cursor.enter(ParseState::Failed);
                tracing::debug!(
                    %error,
                    bytes = self.data.len(),
                    state = %cursor.state(),
                    "geocode response rejected"
                );
            }
        }

        outcome
    }
}

fn parse_document(cursor: &mut ElementCursor<'_>) -> Result<Vec<GeoLocation>, GeocodeParseError> {
    let Some(root) = cursor.next_root()? else {
        return Err(cursor.structure_error(format!(
            "expected a root element named \"{ROOT}\" (no root element found)"
        )));
    };
    if root.name != ROOT {
        return Err(cursor.structure_error(format!(
            "the root element is expected to have the name \"{ROOT}\" \
             (root element was named \"{}\")",
            root.name
        )));
    }

    let previous = cursor.enter(ParseState::InRoot);
    check_result_code(cursor, &root)?;

    let mut locations = Vec::new();
    while let Some(child) = cursor.next_child()? {
        if child.name == "place" {
            locations.push(parse_place(cursor, &child)?);
        } else {
            tracing::debug!(element = %child.name, "skipping unknown child of places");
            cursor.skip_element()?;
        }
    }
    cursor.leave(previous);

    cursor.finish()?;
    Ok(locations)
}

fn check_result_code(cursor: &ElementCursor<'_>, root: &Element) -> Result<(), GeocodeParseError> {
    match root.attribute("resultCode") {
        None | Some("OK") => Ok(()),
        Some("FAILED") => {
            let description = root
                .attribute("resultDescription")
                .filter(|d| !d.trim().is_empty())
                .unwrap_or("the attribute \"resultCode\" of the element \"places\" indicates that the request failed");
            Err(GeocodeParseError::ServiceFailure(description.to_string()))
        }
        Some(other) => Err(cursor.structure_error(format!(
            "the attribute \"resultCode\" of the element \"places\" has an unknown value \
             (value was \"{other}\")"
        ))),
    }
}

fn parse_place(cursor: &mut ElementCursor<'_>, element: &Element) -> Result<GeoLocation, GeocodeParseError> {
    let previous = cursor.enter(ParseState::InPlace);

    let Some(title) = element.attribute("title") else {
        return Err(cursor.structure_error(
            "the element \"place\" did not have the required attribute \"title\"",
        ));
    };
    let mut location = GeoLocation {
        title: title.to_string(),
        language: element.attribute("language").map(str::to_string),
        ..GeoLocation::default()
    };

    let mut seen_location = false;
    let mut seen_address = false;
    while let Some(child) = cursor.next_child()? {
        match child.name.as_str() {
            "location" => {
                if seen_location {
                    return Err(cursor.structure_error(
                        "the element \"place\" has multiple child elements named \"location\" \
                         (exactly one expected)",
                    ));
                }
                parse_location(cursor, &mut location)?;
                seen_location = true;
            }
            "address" => {
                if seen_address {
                    return Err(cursor.structure_error(
                        "the element \"place\" has multiple child elements named \"address\" \
                         (at most one expected)",
                    ));
                }
                location.address = parse_address(cursor)?;
                seen_address = true;
            }
            other => {
                tracing::trace!(element = other, "skipping child of place");
                cursor.skip_element()?;
            }
        }
    }

    if !seen_location {
        return Err(cursor.structure_error(
            "the element \"place\" has no child elements named \"location\" (exactly one expected)",
        ));
    }

    cursor.leave(previous);
    Ok(location)
}

fn parse_location(cursor: &mut ElementCursor<'_>, location: &mut GeoLocation) -> Result<(), GeocodeParseError> {
    let previous = cursor.enter(ParseState::InLocation);

    let mut seen_position = false;
    while let Some(child) = cursor.next_child()? {
        match child.name.as_str() {
            "position" => {
                if seen_position {
                    return Err(cursor.structure_error(
                        "the element \"location\" has multiple child elements named \"position\" \
                         (exactly one expected)",
                    ));
                }
                location.coordinate = parse_coordinate(cursor, "position")?;
                seen_position = true;
            }
            "boundingBox" => {
                if location.bounding_box.is_some() {
                    return Err(cursor.structure_error(
                        "the element \"location\" has multiple child elements named \"boundingBox\" \
                         (at most one expected)",
                    ));
                }
                location.bounding_box = Some(parse_bounding_box(cursor)?);
            }
            other => {
                tracing::trace!(element = other, "skipping child of location");
                cursor.skip_element()?;
            }
        }
    }

    if !seen_position {
        return Err(cursor.structure_error(
            "the element \"location\" has no child elements named \"position\" (exactly one expected)",
        ));
    }

    cursor.leave(previous);
    Ok(())
}

fn parse_bounding_box(cursor: &mut ElementCursor<'_>) -> Result<GeoRectangle, GeocodeParseError> {
    let previous = cursor.enter(ParseState::InBounds);

    let mut north_west = None;
    let mut south_east = None;
    while let Some(child) = cursor.next_child()? {
        let slot = match child.name.as_str() {
            "northWest" => &mut north_west,
            "southEast" => &mut south_east,
            other => {
                tracing::trace!(element = other, "skipping child of boundingBox");
                cursor.skip_element()?;
                continue;
            }
        };
        if slot.is_some() {
            return Err(cursor.structure_error(format!(
                "the element \"boundingBox\" has multiple child elements named \"{}\"",
                child.name
            )));
        }
        *slot = Some(parse_coordinate(cursor, &child.name)?);
    }

    let (Some(top_left), Some(bottom_right)) = (north_west, south_east) else {
        let missing = if north_west.is_none() { "northWest" } else { "southEast" };
        return Err(cursor.structure_error(format!(
            "the element \"boundingBox\" did not have the required child element \"{missing}\""
        )));
    };

    cursor.leave(previous);
    Ok(GeoRectangle::new(top_left, bottom_right))
}

/// Parse `latitude`/`longitude`/`altitude` leaves of a coordinate element.
///
/// Absent or unusable values stay `NaN`.
fn parse_coordinate(cursor: &mut ElementCursor<'_>, element: &str) -> Result<GeoCoordinate, GeocodeParseError> {
    let previous = cursor.enter(ParseState::InCoordinate);

    let mut latitude = None;
    let mut longitude = None;
    let mut altitude = None;
    while let Some(child) = cursor.next_child()? {
        let (slot, limit) = match child.name.as_str() {
            "latitude" => (&mut latitude, Some(90.0)),
            "longitude" => (&mut longitude, Some(180.0)),
            "altitude" => (&mut altitude, None),
            other => {
                tracing::trace!(element = other, parent = element, "skipping child of coordinate");
                cursor.skip_element()?;
                continue;
            }
        };
        if slot.is_some() {
            return Err(cursor.structure_error(format!(
                "the element \"{element}\" has multiple child elements named \"{}\"",
                child.name
            )));
        }
        let text = cursor.read_text(&child.name)?;
        *slot = Some(convert_number(&text, &child.name, limit));
    }

    cursor.leave(previous);
    Ok(GeoCoordinate {
        latitude: latitude.unwrap_or(f64::NAN),
        longitude: longitude.unwrap_or(f64::NAN),
        altitude: altitude.unwrap_or(f64::NAN),
    })
}

/// Convert a leaf's text to `f64`, degrading to `NaN` on failure.
///
/// With `limit`, values outside `[-limit, limit]` are rejected as well.
fn convert_number(text: &str, field: &str, limit: Option<f64>) -> f64 {
    match text.parse::<f64>() {
        Ok(value) if !value.is_finite() => {
            tracing::warn!(field, value = text, "non-finite numeric value, using NaN");
            f64::NAN
        }
        Ok(value) if limit.is_some_and(|l| value.abs() > l) => {
            tracing::warn!(field, value, "numeric value out of range, using NaN");
            f64::NAN
        }
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(field, value = text, %error, "unparseable numeric value, using NaN");
            f64::NAN
        }
    }
}

fn parse_address(cursor: &mut ElementCursor<'_>) -> Result<GeoAddress, GeocodeParseError> {
    let previous = cursor.enter(ParseState::InAddress);

    let mut address = GeoAddress::default();
    let mut seen: Vec<String> = Vec::new();
    while let Some(child) = cursor.next_child()? {
        let slot = match child.name.as_str() {
            "country" => &mut address.country,
            "countryCode" => &mut address.country_code,
            "state" => &mut address.state,
            "county" => &mut address.county,
            "city" => &mut address.city,
            "district" => &mut address.district,
            "postCode" => &mut address.postal_code,
            "thoroughfare" => &mut address.street,
            other => {
                tracing::debug!(element = other, "skipping unknown address field");
                cursor.skip_element()?;
                continue;
            }
        };
        if seen.contains(&child.name) {
            return Err(repeated_child(cursor, "address", &child.name));
        }
        *slot = if child.name == "thoroughfare" {
            parse_thoroughfare(cursor)?
        } else {
            non_empty(cursor.read_text(&child.name)?)
        };
        seen.push(child.name);
    }

    cursor.leave(previous);
    Ok(address)
}

/// Street from `thoroughfare`: `"{number} {name}"`, or whichever is present.
fn parse_thoroughfare(cursor: &mut ElementCursor<'_>) -> Result<Option<String>, GeocodeParseError> {
    let mut name = None;
    let mut number = None;
    while let Some(child) = cursor.next_child()? {
        let slot = match child.name.as_str() {
            "name" => &mut name,
            "number" => &mut number,
            other => {
                tracing::debug!(element = other, "skipping unknown thoroughfare field");
                cursor.skip_element()?;
                continue;
            }
        };
        if slot.is_some() {
            return Err(repeated_child(cursor, "thoroughfare", &child.name));
        }
        *slot = Some(cursor.read_text(&child.name)?);
    }

    Ok(match (number.and_then(non_empty), name.and_then(non_empty)) {
        (Some(number), Some(name)) => Some(format!("{number} {name}")),
        (number, name) => name.or(number),
    })
}

fn repeated_child(cursor: &ElementCursor<'_>, parent: &str, child: &str) -> GeocodeParseError {
    cursor.structure_error(format!(
        "the element \"{parent}\" has multiple child elements named \"{child}\" (at most one expected)"
    ))
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
