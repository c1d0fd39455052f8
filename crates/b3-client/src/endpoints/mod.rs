//! Endpoint groups and the plumbing they share

pub mod sgs;
pub mod yahoo;

use crate::transport::Transport;
use b3_core::{Error, Result};
use governor::DefaultDirectRateLimiter;
use std::sync::Arc;
use url::Url;

/// Base trait for endpoint implementations
///
/// Provides common functionality needed by all endpoint modules
pub trait EndpointBase {
  /// Wait for rate limit before making a request
  async fn wait_for_rate_limit(&self) -> Result<()>;

  /// Get a reference to the transport layer
  fn transport(&self) -> &Arc<Transport>;
}

/// Macro to implement the EndpointBase trait for endpoint structs
macro_rules! impl_endpoint_base {
  ($struct_name:ident) => {
    impl EndpointBase for $struct_name {
      async fn wait_for_rate_limit(&self) -> Result<()> {
        self.rate_limiter.until_ready().await;
        Ok(())
      }

      fn transport(&self) -> &Arc<Transport> {
        &self.transport
      }
    }
  };
}

pub(crate) use impl_endpoint_base;

/// Shared rate limiter handle
pub type SharedRateLimiter = Arc<DefaultDirectRateLimiter>;

/// Join path segments onto a base URL, keeping any path already on the base
pub(crate) fn endpoint_url(base_url: &str, segments: &[&str]) -> Result<Url> {
  let mut url =
    Url::parse(base_url).map_err(|e| Error::Http(format!("Invalid base URL: {}", e)))?;
  url
    .path_segments_mut()
    .map_err(|_| Error::Http(format!("Base URL cannot carry a path: {}", base_url)))?
    .pop_if_empty()
    .extend(segments);
  Ok(url)
}
