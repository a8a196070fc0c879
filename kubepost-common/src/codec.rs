//! JSON codec for core/v1 objects
//!
//! Decoding checks the `apiVersion`/`kind` envelope before the typed
//! deserializer runs, so a Status body is never accepted as a Pod.

use crate::{Error, Result};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Status;
use k8s_openapi::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Media type used for both `Accept` and `Content-Type`
pub const MEDIA_TYPE_JSON: &str = "application/json";

/// Encode an API object as compact JSON
pub fn encode<T: Resource + Serialize>(object: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(object).map_err(|source| Error::Encode {
        kind: T::KIND,
        source,
    })
}

/// Decode an API object, rejecting bodies that declare another type
pub fn decode<T: Resource + DeserializeOwned>(body: &[u8]) -> Result<T> {
    let value: Value = serde_json::from_slice(body).map_err(|source| Error::Decode {
        kind: T::KIND,
        source,
    })?;

    check_type_meta::<T>(&value)?;

    serde_json::from_value(value).map_err(|source| Error::Decode {
        kind: T::KIND,
        source,
    })
}

pub fn decode_pod(body: &[u8]) -> Result<Pod> {
    decode(body)
}

pub fn decode_status(body: &[u8]) -> Result<Status> {
    decode(body)
}

// Missing type fields are accepted; the server omits them in some responses.
fn check_type_meta<T: Resource>(value: &Value) -> Result<()> {
    if let Some(kind) = value.get("kind").and_then(Value::as_str) {
        if kind != T::KIND {
            return Err(Error::UnexpectedKind {
                expected: T::KIND,
                found: kind.to_string(),
            });
        }
    }

    if let Some(api_version) = value.get("apiVersion").and_then(Value::as_str) {
        if api_version != T::API_VERSION {
            return Err(Error::UnexpectedApiVersion {
                kind: T::KIND,
                expected: T::API_VERSION,
                found: api_version.to_string(),
            });
        }
    }

    Ok(())
}
