//! Error types for the diagram service.

use gat_core::GatError;
use gat_viz::VizError;
use serde::Serialize;
use thiserror::Error;

/// Result type for diagram service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from diagram service operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("network not found: {0}")]
    NetworkNotFound(String),

    #[error("variant {variant_id} not found in network {network_id}")]
    VariantNotFound {
        network_id: String,
        variant_id: String,
    },

    /// Any other missing resource (voltage level, substation, filter, stored config, ...).
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The rendering backend failed while writing a diagram.
    #[error("failed to render {target}: {source}")]
    Render {
        target: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("generation scheduler is shut down")]
    SchedulerShutdown,

    /// Channel closed unexpectedly (the generation task died).
    #[error("channel closed")]
    ChannelClosed,

    #[error("configuration error: {0}")]
    Config(String),

    /// The network snapshot is inconsistent (duplicate ids, broken graph invariants).
    #[error("network model error: {0}")]
    Model(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// How a caller should react to an error. Nothing is retried by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// A referenced resource does not exist.
    NotFound,
    /// The request itself is malformed.
    InvalidRequest,
    /// The renderer or its output sink failed.
    Backend,
    Internal,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::NetworkNotFound(_) | Error::VariantNotFound { .. } | Error::NotFound(_) => {
                ErrorClass::NotFound
            }
            Error::InvalidRequest(_) => ErrorClass::InvalidRequest,
            Error::Render { .. } | Error::Io(_) => ErrorClass::Backend,
            Error::SchedulerShutdown
            | Error::ChannelClosed
            | Error::Config(_)
            | Error::Model(_)
            | Error::Serialization(_) => ErrorClass::Internal,
        }
    }
}

impl From<GatError> for Error {
    fn from(e: GatError) -> Self {
        match e {
            e if e.is_not_found() => Error::NotFound(e.to_string()),
            e => Error::Model(e.to_string()),
        }
    }
}

impl From<VizError> for Error {
    fn from(e: VizError) -> Self {
        match e {
            VizError::Network(inner) => inner.into(),
            e if e.is_not_found() => Error::NotFound(e.to_string()),
            e => Error::InvalidRequest(e.to_string()),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for Error {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Error::ChannelClosed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        assert_eq!(
            Error::NetworkNotFound("n1".into()).class(),
            ErrorClass::NotFound
        );
        assert_eq!(
            Error::Render {
                target: "VL1".into(),
                source: anyhow::anyhow!("disk full"),
            }
            .class(),
            ErrorClass::Backend
        );
        assert_eq!(Error::SchedulerShutdown.class(), ErrorClass::Internal);
    }

    #[test]
    fn test_from_core_and_viz_errors() {
        let err: Error = GatError::UnknownVoltageLevel("VL9".into()).into();
        assert_eq!(err.class(), ErrorClass::NotFound);
        assert!(err.to_string().contains("VL9"));

        let err: Error = VizError::InvalidSubstationLayout("diagonal".into()).into();
        assert_eq!(err.class(), ErrorClass::InvalidRequest);

        let err: Error = VizError::ComponentLibraryNotFound("Missing".into()).into();
        assert_eq!(err.class(), ErrorClass::NotFound);

        let err: Error = VizError::Network(GatError::UnknownSubstation("S1".into())).into();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_model_errors_are_internal() {
        for e in [
            GatError::DuplicateVoltageLevel("VL1".into()),
            GatError::DuplicateEquipment("LINE1".into()),
            GatError::Validation("bad".into()),
            GatError::Other("node 3 is not a voltage level".into()),
        ] {
            let err: Error = e.into();
            assert!(matches!(err, Error::Model(_)));
            assert_eq!(err.class(), ErrorClass::Internal);
        }
    }
}
