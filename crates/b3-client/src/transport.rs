//! HTTP transport layer for upstream market-data requests

use b3_core::{Config, Error, Result, SourceType};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// HTTP transport layer shared by every endpoint group
#[derive(Debug)]
pub struct Transport {
  client: Client,
  timeout: Duration,
  max_retries: u32,
}

impl Transport {
  /// Create a new transport instance
  pub fn new(config: &Config) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent("Mozilla/5.0 (compatible; b3-client/0.1.0)")
      .build()
      .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self {
      client,
      timeout: Duration::from_secs(config.timeout_secs),
      max_retries: config.max_retries,
    })
  }

  /// Make a GET request and deserialize the JSON body
  ///
  /// Transport failures and 5xx responses are retried up to `max_retries`
  /// times with exponential backoff. 4xx responses are returned at once.
  #[instrument(skip(self, url), fields(url = %url))]
  pub async fn get_json<T>(&self, source: SourceType, url: Url) -> Result<T>
  where
    T: DeserializeOwned,
  {
    debug!("Making request to: {}", url);

    let mut attempt = 0;
    let mut last_error = None;

    while attempt <= self.max_retries {
      if attempt > 0 {
        let delay = Duration::from_millis(2_u64.pow(attempt) * 500);
        warn!("Retrying request in {}ms (attempt {})", delay.as_millis(), attempt + 1);
        tokio::time::sleep(delay).await;
      }

      match self.make_request(url.as_str()).await {
        Ok(response) => {
          let text = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("Failed to read response body: {}", e)))?;

          debug!("Response body length: {} bytes", text.len());

          return match serde_json::from_str::<T>(&text) {
            Ok(data) => {
              info!("Successfully parsed response from {}", source);
              Ok(data)
            }
            Err(e) => {
              error!("Failed to parse JSON response: {}", e);
              Err(Error::Parse(format!(
                "Failed to parse response: {}. Response: {}",
                e,
                preview(&text, 200)
              )))
            }
          };
        }
        Err(e @ Error::Api(_)) => return Err(e),
        Err(e) => {
          warn!("Request failed (attempt {}): {}", attempt + 1, e);
          last_error = Some(e);
          attempt += 1;
        }
      }
    }

    Err(last_error.unwrap_or_else(|| Error::Http("Max retries exceeded".to_string())))
  }

  /// Make the actual HTTP request
  async fn make_request(&self, url: &str) -> Result<Response> {
    let response = self
      .client
      .get(url)
      .send()
      .await
      .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

    let status = response.status();

    if status.is_success() {
      debug!("Request successful with status: {}", status);
      Ok(response)
    } else if status.is_client_error() {
      let body = response.text().await.unwrap_or_default();
      Err(client_error(status, &body))
    } else {
      error!("Request failed with status: {}", status);
      Err(Error::Http(format!("HTTP error: {}", status)))
    }
  }

  /// Get request timeout duration
  pub fn timeout(&self) -> Duration {
    self.timeout
  }
}

/// Map a 4xx response to an API error, keeping the upstream description
/// when the body carries one (Yahoo puts it under `*.error.description`).
fn client_error(status: StatusCode, body: &str) -> Error {
  let description = serde_json::from_str::<serde_json::Value>(body).ok().and_then(|v| {
    v.as_object()?
      .values()
      .find_map(|envelope| envelope.get("error")?.get("description")?.as_str().map(String::from))
  });

  match description {
    Some(description) => Error::Api(format!("{}: {}", status, description)),
    None => Error::Api(format!("HTTP error: {}", status)),
  }
}

fn preview(text: &str, max_chars: usize) -> &str {
  match text.char_indices().nth(max_chars) {
    Some((idx, _)) => &text[..idx],
    None => text,
  }
}
