//! Upstream HTTP client
//!
//! The only component that performs network I/O. Every request goes through
//! the [`Dispatcher`] and its outcome is folded into [`PypiError`].

use std::sync::Arc;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{PypiError, Result};
use crate::limiter::Dispatcher;

/// Thin wrapper around `reqwest` that maps status codes to [`PypiError`].
///
/// One network call per invocation. No caching, no retry.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: Client,
    dispatcher: Arc<Dispatcher>,
}

impl UpstreamClient {
    pub fn new(http: Client, dispatcher: Arc<Dispatcher>) -> Self {
        Self { http, dispatcher }
    }

    /// Builds the HTTP client with the configured timeout and User-Agent.
    pub fn from_config(config: &Config, dispatcher: Arc<Dispatcher>) -> reqwest::Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::new(http, dispatcher))
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    // == Get JSON ==
    /// Issues a GET through the dispatcher and decodes the JSON body.
    ///
    /// The dispatcher permit is held until the body has been read.
    pub async fn get_json<T>(&self, url: Url, headers: HeaderMap) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.dispatcher.run(|| self.execute(url, headers)).await
    }

    async fn execute<T>(&self, url: Url, headers: HeaderMap) -> Result<T>
    where
        T: DeserializeOwned,
    {
        debug!(url = %url, "Upstream request");

        let response = self
            .http
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| PypiError::Upstream {
                status: None,
                message: format!("Request failed: {}", e),
            })?;

        let response = check_status(response).await?;
        let status = response.status().as_u16();

        let body = response.bytes().await.map_err(|e| PypiError::Upstream {
            status: Some(status),
            message: format!("Failed to read response body: {}", e),
        })?;

        serde_json::from_slice(&body).map_err(|e| PypiError::Upstream {
            status: Some(status),
            message: format!("Invalid JSON response: {}", e),
        })
    }
}

/// Maps 404, 429 and other error statuses, passing successes through.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    let code = status.as_u16();

    match code {
        404 => Err(PypiError::NotFound("Resource not found".to_string())),
        429 => {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            Err(PypiError::RateLimited { retry_after })
        }
        code if code >= 400 => {
            let text = response.text().await.unwrap_or_default();
            Err(PypiError::Upstream {
                status: Some(code),
                message: format!("HTTP {}: {}", code, text),
            })
        }
        _ => Ok(response),
    }
}
