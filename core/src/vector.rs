//! Two-dimensional vector value type used for screen-space positions.

use std::ops::{Add, Sub};

use glam::DVec2;
use thiserror::Error;

/// Reasons a vector operation may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum VectorError {
    /// A component was NaN or infinite.
    #[error("vector components must be finite numbers (received x: {x}, y: {y})")]
    NonFinite {
        /// Horizontal component that was supplied.
        x: f64,
        /// Vertical component that was supplied.
        y: f64,
    },
    /// Division by zero was requested.
    #[error("cannot divide a vector by zero")]
    ZeroDivisor,
}

/// Point or displacement in screen space whose components are always finite.
///
/// Addition and subtraction saturate at `±f64::MAX` instead of overflowing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2D(DVec2);

impl Vector2D {
    /// Vector with both components set to zero.
    pub const ZERO: Self = Self(DVec2::ZERO);

    /// Unit displacement along the horizontal axis.
    pub const UNIT_X: Self = Self(DVec2::X);

    /// Unit displacement along the vertical axis.
    pub const UNIT_Y: Self = Self(DVec2::Y);

    /// Creates a vector, rejecting NaN and infinite components.
    pub fn new(x: f64, y: f64) -> Result<Self, VectorError> {
        Self::from_dvec(DVec2::new(x, y))
    }

    /// Wraps a glam vector, rejecting NaN and infinite components.
    pub fn from_dvec(value: DVec2) -> Result<Self, VectorError> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(VectorError::NonFinite {
                x: value.x,
                y: value.y,
            })
        }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.0.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.0.y
    }

    /// Underlying glam representation.
    #[must_use]
    pub const fn as_dvec(&self) -> DVec2 {
        self.0
    }

    /// Overwrites both components. The vector is left untouched on failure.
    pub fn set(&mut self, x: f64, y: f64) -> Result<&mut Self, VectorError> {
        *self = Self::new(x, y)?;
        Ok(self)
    }

    /// Adds `other` in place and returns the vector for chaining.
    pub fn add_to(&mut self, other: Self) -> &mut Self {
        *self = Self::saturating(self.0 + other.0);
        self
    }

    /// Subtracts `other` in place and returns the vector for chaining.
    pub fn subtract_from(&mut self, other: Self) -> &mut Self {
        *self = Self::saturating(self.0 - other.0);
        self
    }

    /// Returns a new vector scaled by `scalar`.
    pub fn multiply_scalar(&self, scalar: f64) -> Result<Self, VectorError> {
        Self::from_dvec(self.0 * scalar)
    }

    /// Scales the vector in place.
    pub fn multiply_by_scalar(&mut self, scalar: f64) -> Result<&mut Self, VectorError> {
        *self = self.multiply_scalar(scalar)?;
        Ok(self)
    }

    /// Returns a new vector divided by `scalar`.
    pub fn divide_scalar(&self, scalar: f64) -> Result<Self, VectorError> {
        if scalar == 0.0 {
            return Err(VectorError::ZeroDivisor);
        }
        Self::from_dvec(self.0 / scalar)
    }

    /// Divides the vector in place.
    pub fn divide_by_scalar(&mut self, scalar: f64) -> Result<&mut Self, VectorError> {
        *self = self.divide_scalar(scalar)?;
        Ok(self)
    }

    /// Angle in radians measured from the positive horizontal axis.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.0.y.atan2(self.0.x)
    }

    /// Rotates the vector to `angle` radians while keeping its length.
    pub fn set_angle(&mut self, angle: f64) -> Result<&mut Self, VectorError> {
        let length = self.length();
        *self = Self::new(angle.cos() * length, angle.sin() * length)?;
        Ok(self)
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.0.length()
    }

    /// Rescales the vector to `length` while keeping its angle.
    pub fn set_length(&mut self, length: f64) -> Result<&mut Self, VectorError> {
        let angle = self.angle();
        *self = Self::new(angle.cos() * length, angle.sin() * length)?;
        Ok(self)
    }

    /// Negates the horizontal component.
    pub fn invert_x(&mut self) -> &mut Self {
        self.0.x = -self.0.x;
        self
    }

    /// Negates the vertical component.
    pub fn invert_y(&mut self) -> &mut Self {
        self.0.y = -self.0.y;
        self
    }

    /// Negates both components.
    pub fn invert(&mut self) -> &mut Self {
        self.0 = -self.0;
        self
    }

    // Sums of finite components are never NaN, only infinite.
    fn saturating(value: DVec2) -> Self {
        Self(DVec2::new(
            value.x.clamp(f64::MIN, f64::MAX),
            value.y.clamp(f64::MIN, f64::MAX),
        ))
    }
}

impl Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::saturating(self.0 + other.0)
    }
}

impl Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::saturating(self.0 - other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn vector(x: f64, y: f64) -> Vector2D {
        Vector2D::new(x, y).expect("finite components")
    }

    #[test]
    fn construction_rejects_nan() {
        assert!(matches!(
            Vector2D::new(f64::NAN, 1.0),
            Err(VectorError::NonFinite { .. })
        ));
        assert!(Vector2D::new(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn set_leaves_vector_untouched_on_failure() {
        let mut value = vector(3.0, 4.0);
        assert!(value.set(f64::NAN, 0.0).is_err());
        assert_eq!(value, vector(3.0, 4.0));
    }

    #[test]
    fn immutable_operators_return_new_vectors() {
        let a = vector(1.0, 2.0);
        let b = vector(3.0, 5.0);
        assert_eq!(a + b, vector(4.0, 7.0));
        assert_eq!(b - a, vector(2.0, 3.0));
        assert_eq!(a, vector(1.0, 2.0));
    }

    #[test]
    fn in_place_operations_chain() {
        let mut value = vector(1.0, 1.0);
        let _ = value
            .add_to(Vector2D::UNIT_X)
            .subtract_from(Vector2D::UNIT_Y)
            .invert_x();
        assert_eq!(value, vector(-2.0, 0.0));
    }

    #[test]
    fn overflow_saturates_instead_of_becoming_infinite() {
        let huge = vector(f64::MAX, -f64::MAX);
        assert_eq!(huge + huge, huge);
        assert_eq!(huge - huge, Vector2D::ZERO);

        let mut value = huge;
        let _ = value.add_to(huge).subtract_from(vector(-f64::MAX, f64::MAX));
        assert_eq!(value, huge);
        assert!(value.as_dvec().is_finite());
    }

    #[test]
    fn division_by_zero_is_rejected() {
        let value = vector(2.0, 2.0);
        assert_eq!(value.divide_scalar(0.0), Err(VectorError::ZeroDivisor));
        assert_eq!(value.divide_scalar(2.0), Ok(vector(1.0, 1.0)));
    }

    #[test]
    fn in_place_division_keeps_the_vector_on_failure() {
        let mut value = vector(6.0, -3.0);
        let _ = value.divide_by_scalar(3.0).expect("non-zero divisor");
        assert_eq!(value, vector(2.0, -1.0));

        assert_eq!(
            value.divide_by_scalar(0.0).map(|divided| *divided),
            Err(VectorError::ZeroDivisor)
        );
        assert!(value.divide_by_scalar(1e-320).is_err());
        assert_eq!(value, vector(2.0, -1.0));
    }

    #[test]
    fn length_and_angle_are_preserved_by_setters() {
        let mut value = vector(3.0, 4.0);
        assert!((value.length() - 5.0).abs() < 1e-12);

        let _ = value.set_length(10.0).expect("finite length");
        assert!((value.x() - 6.0).abs() < 1e-9);
        assert!((value.y() - 8.0).abs() < 1e-9);

        let _ = value.set_angle(FRAC_PI_2).expect("finite angle");
        assert!(value.x().abs() < 1e-9);
        assert!((value.y() - 10.0).abs() < 1e-9);
    }
}
