/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-dot-]browne[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Main client tying the transport, rate limiter and endpoint groups together

use crate::endpoints::{sgs::SgsEndpoints, yahoo::YahooEndpoints, SharedRateLimiter};
use crate::transport::Transport;
use b3_core::{Config, Result};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Main market-data client
///
/// Provides access to the SGS rate series and the Yahoo Finance endpoints
/// through one transport and one rate limiter shared by every request.
///
/// # Examples
///
/// ```ignore
/// use b3_client::MarketDataClient;
/// use b3_core::Config;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::from_env()?;
///     let client = MarketDataClient::new(config)?;
///
///     let cdi = client.sgs().series(12, config.start_date).await?;
///     let petr = client.yahoo().daily_chart("PETR4.SA", config.start_date).await?;
///     Ok(())
/// }
/// ```
pub struct MarketDataClient {
  config: Config,
  rate_limiter: SharedRateLimiter,
  transport: Arc<Transport>,
}

impl MarketDataClient {
  /// Create a new client
  ///
  /// # Errors
  ///
  /// Returns an error if the HTTP client cannot be created.
  pub fn new(config: Config) -> Result<Self> {
    // Ensure rate_limit is non-zero, fallback to default if invalid
    let rate_limit_value = NonZeroU32::new(config.rate_limit)
      .or_else(|| NonZeroU32::new(b3_core::DEFAULT_RATE_LIMIT))
      .unwrap_or(NonZeroU32::MIN);
    let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(rate_limit_value)));

    let transport = Arc::new(Transport::new(&config)?);

    Ok(Self { config, rate_limiter, transport })
  }

  /// Rate-index series endpoints
  pub fn sgs(&self) -> SgsEndpoints {
    SgsEndpoints::new(
      self.transport.clone(),
      self.rate_limiter.clone(),
      self.config.sgs_base_url.clone(),
    )
  }

  /// Price history and company profile endpoints
  pub fn yahoo(&self) -> YahooEndpoints {
    YahooEndpoints::new(
      self.transport.clone(),
      self.rate_limiter.clone(),
      self.config.yahoo_base_url.clone(),
    )
  }

  /// Configuration the client was built with
  pub fn config(&self) -> &Config {
    &self.config
  }
}

impl std::fmt::Debug for MarketDataClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MarketDataClient")
      .field("config", &self.config)
      .field("transport", &self.transport)
      .field("rate_limiter", &"RateLimiter")
      .finish()
  }
}
