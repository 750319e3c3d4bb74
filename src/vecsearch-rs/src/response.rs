use bytes::Bytes;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::{ClientError, Result};

/// A response whose body has been read to the end exactly once.
///
/// Error mapping and typed decoding both work off the buffered bytes, so
/// neither can starve the other. The connection is released once the body
/// is buffered.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl RawResponse {
    pub async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let body = response.bytes().await?;
        Ok(Self { status, body })
    }

    /// Anything outside 2xx is an engine failure
    pub fn is_error(&self) -> bool {
        self.status.as_u16() > 299
    }

    /// Map a failure status to an engine error carrying the raw body
    pub fn error_for_status(&self) -> Result<()> {
        if !self.is_error() {
            return Ok(());
        }

        Err(ClientError::Server {
            status: self.status.as_u16(),
            reason: self.status.canonical_reason().unwrap_or_default().to_string(),
            body: String::from_utf8_lossy(&self.body).into_owned(),
        })
    }

    pub fn decode<T: DeserializeOwned>(&self, what: &'static str) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|source| ClientError::Decode { what, source })
    }

    /// Status check first, typed decode only on success
    pub fn into_typed<T: DeserializeOwned>(self, what: &'static str) -> Result<T> {
        self.error_for_status()?;
        self.decode(what)
    }
}
