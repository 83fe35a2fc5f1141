//! Unit newtypes for the electrical quantities shown on diagrams.
//!
//! Bus state and terminal flows arrive from the network-model provider as raw
//! floats. Wrapping them keeps a voltage from being summed with a power flow and
//! gives every caption a single place where its unit suffix is decided.
//!
//! Values that were never computed (no load flow run) are carried as `NaN`;
//! [`Megawatts::is_defined`] and friends let callers decide how to render them.
//!
//! ```
//! use gat_core::units::{Kilovolts, Megawatts};
//!
//! let total: Megawatts = [Megawatts(12.5), Megawatts(-4.0)].into_iter().sum();
//! assert_eq!(total.value(), 8.5);
//! assert!(!Kilovolts(f64::NAN).is_defined());
//! ```

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::Add;

macro_rules! impl_unit_ops {
    ($type:ident, $suffix:literal, $sep:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|v| v.0).sum())
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match f.precision() {
                    Some(p) => write!(f, "{:.*}{}{}", p, self.0, $sep, $suffix),
                    None => write!(f, "{}{}{}", self.0, $sep, $suffix),
                }
            }
        }

        impl $type {
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            /// Nearest whole unit, halves away from zero.
            #[inline]
            pub fn round(self) -> Self {
                Self(self.0.round())
            }

            /// `false` for values the provider never computed (`NaN`) or infinities.
            #[inline]
            pub fn is_defined(self) -> bool {
                self.0.is_finite()
            }
        }
    };
}

/// Active power (MW).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Megawatts(pub f64);

impl_unit_ops!(Megawatts, "MW", " ");

/// Voltage magnitude or nominal voltage (kV).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Kilovolts(pub f64);

impl_unit_ops!(Kilovolts, "kV", " ");

/// Voltage angle (degrees). Diagrams never show radians.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Degrees(pub f64);

impl_unit_ops!(Degrees, "°", "");

/// Instantaneous current (A).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Amperes(pub f64);

impl_unit_ops!(Amperes, "A", " ");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_respects_precision() {
        assert_eq!(format!("{:.1}", Kilovolts(400.04)), "400.0 kV");
        assert_eq!(format!("{:.0}", Megawatts(12.6)), "13 MW");
        assert_eq!(format!("{:.1}", Degrees(-3.26)), "-3.3°");
    }

    #[test]
    fn test_sum_and_abs() {
        let total: Megawatts = vec![Megawatts(-10.0), Megawatts(-5.5)].into_iter().sum();
        assert_eq!(total.abs().value(), 15.5);
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(format!("{:.0}", Megawatts(250.5).round()), "251 MW");
        assert_eq!(format!("{:.0}", Amperes(-2.5).round()), "-3 A");
    }

    #[test]
    fn test_nan_is_undefined() {
        assert!(!Amperes(f64::NAN).is_defined());
        assert!(Amperes(0.0).is_defined());
        let total: Megawatts = [Megawatts(1.0), Megawatts(f64::NAN)].into_iter().sum();
        assert!(!total.is_defined());
    }
}
