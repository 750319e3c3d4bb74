use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as HttpClient, Method, Url};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use vecsearch_core::{Config, ConfigError};

use crate::response::RawResponse;
use crate::{ClientError, Result};

/// Request payload and the content type it is sent with
pub(crate) enum Body {
    Json(Vec<u8>),
    NdJson(Vec<u8>),
}

impl Body {
    pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(value).map_err(vecsearch_core::CodecError::from)?;
        Ok(Self::Json(bytes))
    }
}

/// Owns the HTTP connection settings and issues raw engine requests
pub(crate) struct Transport {
    http: HttpClient,
    addresses: Vec<Url>,
    next_address: AtomicUsize,
    username: String,
    password: String,
}

impl Transport {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let addresses = config
            .addresses
            .iter()
            .map(|address| {
                Url::parse(address).map_err(|e| {
                    ClientError::Config(ConfigError::InvalidAddress {
                        address: address.clone(),
                        reason: e.to_string(),
                    })
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut builder = HttpClient::builder();

        if config.insecure_skip_verify {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if !config.ca_cert_path.is_empty() {
            let pem =
                std::fs::read(&config.ca_cert_path).map_err(|source| ClientError::Certificate {
                    path: config.ca_cert_path.clone(),
                    source,
                })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(ClientError::Build)?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder.build().map_err(ClientError::Build)?;

        Ok(Self {
            http,
            addresses,
            next_address: AtomicUsize::new(0),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Build the URL for the given path segments on the next address, round-robin.
    /// Segments are percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let slot = self.next_address.fetch_add(1, Ordering::Relaxed) % self.addresses.len();
        let mut url = self.addresses[slot].clone();

        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Config(ConfigError::InvalidAddress {
                    address: self.addresses[slot].to_string(),
                    reason: "cannot be a base URL".to_string(),
                })
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Send one request and buffer its response.
    ///
    /// The whole exchange, body included, is raced against `token`; a cancelled
    /// token aborts it and drops the connection.
    pub async fn send(
        &self,
        token: &CancellationToken,
        operation: &'static str,
        method: Method,
        segments: &[&str],
        body: Option<Body>,
    ) -> Result<RawResponse> {
        if token.is_cancelled() {
            return Err(ClientError::Cancelled { operation });
        }

        let url = self.endpoint(segments)?;
        debug!(%method, %url, operation, "sending request");

        let mut request = self
            .http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password));

        request = match body {
            Some(Body::Json(bytes)) => request.header(CONTENT_TYPE, "application/json").body(bytes),
            Some(Body::NdJson(bytes)) => request
                .header(CONTENT_TYPE, "application/x-ndjson")
                .body(bytes),
            None => request,
        };

        let exchange = async {
            let response = request.send().await?;
            RawResponse::read(response).await
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(operation, "request cancelled");
                Err(ClientError::Cancelled { operation })
            }
            result = exchange => result,
        }
    }
}
