//! Common types and utilities shared between the kubepost CLI and its tests

pub mod codec;
pub mod pod;

pub use codec::MEDIA_TYPE_JSON;
pub use pod::{pods_path, PodTemplate};

/// Errors raised while preparing or decoding API objects
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to encode {kind}: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode {kind}: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected object kind: expected {expected}, got {found}")]
    UnexpectedKind {
        expected: &'static str,
        found: String,
    },

    #[error("Unexpected apiVersion for {kind}: expected {expected}, got {found}")]
    UnexpectedApiVersion {
        kind: &'static str,
        expected: &'static str,
        found: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
