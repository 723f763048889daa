//! Parsing of `--rect` and `--circle` command line values.

use geocode_core::{GeoCircle, GeoCoordinate, GeoRectangle, GeoShape};

fn numbers<const N: usize>(raw: &str, what: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!(
            "{what} expects {N} comma-separated numbers, got {}",
            parts.len()
        ));
    }
    let mut out = [0.0; N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|e| format!("invalid number \"{part}\" in {what}: {e}"))?;
    }
    Ok(out)
}

/// `TOP,LEFT,BOTTOM,RIGHT` in degrees.
pub(crate) fn parse_rect(raw: &str) -> Result<GeoRectangle, String> {
    let [top, left, bottom, right] = numbers::<4>(raw, "--rect")?;
    let rect = GeoRectangle::new(GeoCoordinate::new(top, left), GeoCoordinate::new(bottom, right));
    if !rect.is_valid() {
        return Err(format!("\"{raw}\" is not a valid rectangle"));
    }
    Ok(rect)
}

/// `LAT,LON,RADIUS` with the radius in metres.
pub(crate) fn parse_circle(raw: &str) -> Result<GeoCircle, String> {
    let [latitude, longitude, radius] = numbers::<3>(raw, "--circle")?;
    let circle = GeoCircle::new(GeoCoordinate::new(latitude, longitude), radius);
    if !circle.is_valid() {
        return Err(format!("\"{raw}\" is not a valid circle"));
    }
    Ok(circle)
}

pub(crate) fn to_shape(rect: Option<GeoRectangle>, circle: Option<GeoCircle>) -> GeoShape {
    match (rect, circle) {
        (Some(rect), _) => GeoShape::Rectangle(rect),
        (None, Some(circle)) => GeoShape::Circle(circle),
        (None, None) => GeoShape::Unset,
    }
}
