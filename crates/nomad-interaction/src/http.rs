//! Shared request plumbing for the HTTP adapters.

use std::time::{Duration, Instant};

use nomad_core::error::{NomadError, Result};
use reqwest::{Client, StatusCode};
use serde::Serialize;

/// Longest slice of an error body carried into an error message.
const ERROR_BODY_CHARS: usize = 200;

pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| NomadError::config(format!("Failed to build HTTP client: {err}")))
}

/// Response of a completed exchange, whatever its status.
pub(crate) struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// POSTs `body` as JSON and reads the response as text.
///
/// Only transport failures are errors here; status handling is left to the
/// caller.
#[tracing::instrument(level = "debug", skip_all, fields(endpoint = %endpoint(url)))]
pub(crate) async fn post_json<B: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    body: &B,
) -> Result<RawResponse> {
    let started = Instant::now();
    let response = client.post(url).json(body).send().await.map_err(|err| {
        let err = err.without_url();
        tracing::warn!("POST failed after {:?}: {}", started.elapsed(), err);
        NomadError::remote_api(None, format!("{}: {}", endpoint(url), err))
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|err| {
        NomadError::remote_api(Some(status.as_u16()), err.without_url().to_string())
    })?;

    tracing::debug!(
        "POST -> {} in {:?} ({} bytes)",
        status,
        started.elapsed(),
        body.len()
    );
    Ok(RawResponse { status, body })
}

/// URL without its query string, which may carry an API key.
fn endpoint(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

pub(crate) fn map_http_error(status: StatusCode, body: &str) -> NomadError {
    let snippet: String = body.trim().chars().take(ERROR_BODY_CHARS).collect();
    let message = if snippet.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("HTTP {}: {}", status.as_u16(), snippet)
    };
    NomadError::remote_api(Some(status.as_u16()), message)
}
