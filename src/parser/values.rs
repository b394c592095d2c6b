//! Scalar, point and vector extraction from OCX elements

use super::Element;
use crate::error::{Error, Result};
use crate::schema::Tags;
use nalgebra::{Point3, Vector3};

/// Parse one floating-point attribute value, naming the field on failure
pub fn parse_f64(field: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::parse_error_with_context(field, value, "floating-point number"))
}

/// Parse a whitespace separated list of floating-point values
pub fn parse_f64_list(field: &str, value: &str) -> Result<Vec<f64>> {
    value
        .split_whitespace()
        .map(|v| parse_f64(field, v))
        .collect()
}

/// Numeric value of a quantity element
///
/// Quantities carry their value in a `numericvalue` attribute. The `unit`
/// attribute is not interpreted.
pub fn numeric_value(quantity: Element<'_>) -> Result<f64> {
    let value = quantity
        .attribute_by_local_name("numericvalue")
        .ok_or_else(|| Error::missing_attribute(quantity.name(), "numericvalue"))?;
    parse_f64(quantity.local_name(), value)
}

/// Coordinates of a Point3D-typed element
///
/// Each coordinate is a quantity child element (X, Y, Z).
pub fn point3d(point: Element<'_>, tags: &Tags) -> Result<Point3<f64>> {
    let coordinate = |tag: &str, axis: &str| -> Result<f64> {
        let quantity = point.child(tag).ok_or_else(|| {
            Error::InvalidModel(format!(
                "{} has no {} coordinate",
                point.describe(),
                axis
            ))
        })?;
        numeric_value(quantity)
    };
    Ok(Point3::new(
        coordinate(&tags.x, "X")?,
        coordinate(&tags.y, "Y")?,
        coordinate(&tags.z, "Z")?,
    ))
}

/// Components of a Vector3D-typed element
///
/// Unlike points, vector components are plain `x`, `y`, `z` attributes.
pub fn vector3d(vector: Element<'_>) -> Result<Vector3<f64>> {
    let component = |name: &str| -> Result<f64> {
        let value = vector
            .attribute(name)
            .ok_or_else(|| Error::missing_attribute(vector.name(), name))?;
        parse_f64(name, value)
    };
    Ok(Vector3::new(component("x")?, component("y")?, component("z")?))
}
