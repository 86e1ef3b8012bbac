//! HTTP client for registry lookups
//!
//! - Timeout and `reqlint/<version>` User-Agent
//! - Exponential backoff on 429 responses, timeouts and transport errors
//! - 404 maps to `PackageNotFound`

use crate::error::RegistryError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default timeout for HTTP requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("reqlint/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// What to do with a failed attempt
enum Attempt {
    Retry(RegistryError),
    Fail(RegistryError),
}

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RegistryError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RegistryError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                RegistryError::network_error("", "HTTP client", format!("failed to build client: {}", e))
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// GET `url` and decode the JSON body
    ///
    /// `package` and `registry` only label errors.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<T, RegistryError> {
        let mut delay = BASE_DELAY_MS;
        let mut attempt = 0;

        loop {
            let failure = match self.client.get(url).send().await {
                Ok(response) => match classify_status(response.status(), package, registry) {
                    None => {
                        return response.json::<T>().await.map_err(|e| {
                            RegistryError::InvalidResponse {
                                package: package.to_string(),
                                registry: registry.to_string(),
                                message: format!("failed to parse JSON: {}", e),
                            }
                        });
                    }
                    Some(failure) => failure,
                },
                Err(e) if e.is_timeout() => {
                    Attempt::Retry(RegistryError::timeout(package, registry))
                }
                Err(e) => Attempt::Retry(RegistryError::network_error(
                    package,
                    registry,
                    e.to_string(),
                )),
            };

            match failure {
                Attempt::Fail(err) => return Err(err),
                Attempt::Retry(err) if attempt >= self.max_retries => return Err(err),
                Attempt::Retry(err) => {
                    tracing::debug!("retrying {} in {}ms: {}", url, delay, err);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    delay *= 2;
                    attempt += 1;
                }
            }
        }
    }
}

/// Maps a status code to a failure, or `None` on success
fn classify_status(status: StatusCode, package: &str, registry: &str) -> Option<Attempt> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::TOO_MANY_REQUESTS => Attempt::Retry(RegistryError::RateLimitExceeded {
            registry: registry.to_string(),
        }),
        StatusCode::NOT_FOUND => Attempt::Fail(RegistryError::package_not_found(package, registry)),
        s if s.is_server_error() => {
            Attempt::Retry(RegistryError::network_error(package, registry, format!("HTTP {}", s)))
        }
        s => Attempt::Fail(RegistryError::network_error(package, registry, format!("HTTP {}", s))),
    })
}
