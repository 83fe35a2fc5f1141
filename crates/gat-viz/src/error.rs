//! Errors raised while assembling a rendering pipeline.

use gat_core::GatError;
use thiserror::Error;

pub type VizResult<T> = Result<T, VizError>;

#[derive(Error, Debug)]
pub enum VizError {
    /// Substation layout other than horizontal/vertical.
    #[error("invalid substation layout '{0}'")]
    InvalidSubstationLayout(String),

    /// Display mode other than feeder-position/state-variable.
    #[error("invalid display mode '{0}'")]
    InvalidDisplayMode(String),

    #[error("component library '{0}' not found")]
    ComponentLibraryNotFound(String),

    #[error(transparent)]
    Network(#[from] GatError),
}

impl VizError {
    /// True for the "resource missing" class of errors.
    pub fn is_not_found(&self) -> bool {
        match self {
            VizError::ComponentLibraryNotFound(_) => true,
            VizError::Network(err) => err.is_not_found(),
            VizError::InvalidSubstationLayout(_) | VizError::InvalidDisplayMode(_) => false,
        }
    }
}
