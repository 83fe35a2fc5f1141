//! Error types for network-model lookups and construction.
//!
//! [`GatError`] covers everything the network model itself can report: ids that
//! do not resolve, duplicate registrations and malformed equipment. Crates built
//! on top (`gat-viz`, `gat-diagram`) wrap it in their own error enums.
//!
//! # Example
//!
//! ```
//! use gat_core::{GatError, GatResult, Network};
//!
//! fn nominal_kv(network: &Network, id: &str) -> GatResult<f64> {
//!     Ok(network.voltage_level(id)?.nominal_v.value())
//! }
//!
//! let err = nominal_kv(&Network::new(), "VL1").unwrap_err();
//! assert!(err.is_not_found());
//! ```

use thiserror::Error;

/// Unified error type for network-model operations.
#[derive(Error, Debug)]
pub enum GatError {
    /// A voltage level id that does not exist in the network.
    #[error("unknown voltage level '{0}'")]
    UnknownVoltageLevel(String),

    /// A substation id that does not exist in the network.
    #[error("unknown substation '{0}'")]
    UnknownSubstation(String),

    /// A bus id that does not exist in the referenced voltage level.
    #[error("unknown bus '{0}'")]
    UnknownBus(String),

    /// Equipment (converter station, dangling line, ...) that does not exist.
    #[error("unknown equipment '{0}'")]
    UnknownEquipment(String),

    /// A voltage level registered twice.
    #[error("duplicate voltage level '{0}'")]
    DuplicateVoltageLevel(String),

    /// Equipment registered twice.
    #[error("duplicate equipment '{0}'")]
    DuplicateEquipment(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl GatError {
    /// True for the "resource missing" class of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GatError::UnknownVoltageLevel(_)
                | GatError::UnknownSubstation(_)
                | GatError::UnknownBus(_)
                | GatError::UnknownEquipment(_)
        )
    }
}

/// Convenience type alias for Results using GatError.
pub type GatResult<T> = Result<T, GatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GatError::UnknownVoltageLevel("VL9".into());
        assert_eq!(err.to_string(), "unknown voltage level 'VL9'");
    }

    #[test]
    fn test_not_found_class() {
        assert!(GatError::UnknownSubstation("S".into()).is_not_found());
        assert!(GatError::UnknownEquipment("HVDC1".into()).is_not_found());
        assert!(!GatError::DuplicateVoltageLevel("VL1".into()).is_not_found());
        assert!(!GatError::Validation("bad".into()).is_not_found());
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> GatResult<()> {
            Err(GatError::UnknownBus("B1".into()))
        }

        fn outer() -> GatResult<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(GatError::UnknownBus(_))));
    }
}
