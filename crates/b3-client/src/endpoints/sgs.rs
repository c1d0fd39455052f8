//! Banco Central do Brasil SGS series endpoint
//!
//! `GET /dados/serie/bcdata.sgs.{code}/dados?formato=json&dataInicial=dd/mm/YYYY`

use super::{endpoint_url, impl_endpoint_base, EndpointBase, SharedRateLimiter};
use crate::transport::Transport;
use b3_core::{Error, Result, SourceType};
use b3_models::sgs::SgsObservation;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument};

/// Endpoints for SGS time series (rate indexes)
pub struct SgsEndpoints {
  transport: Arc<Transport>,
  rate_limiter: SharedRateLimiter,
  base_url: String,
}

impl_endpoint_base!(SgsEndpoints);

impl SgsEndpoints {
  /// Create a new SGS endpoints instance
  pub fn new(transport: Arc<Transport>, rate_limiter: SharedRateLimiter, base_url: String) -> Self {
    Self { transport, rate_limiter, base_url }
  }

  /// Fetch every observation of `series_code` from `start` onward
  ///
  /// # Examples
  ///
  /// ```ignore
  /// let cdi = client.sgs().series(12, NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()).await?;
  /// ```
  #[instrument(skip(self))]
  pub async fn series(&self, series_code: u32, start: NaiveDate) -> Result<Vec<SgsObservation>> {
    self.wait_for_rate_limit().await?;

    let series = format!("bcdata.sgs.{}", series_code);
    let mut url = endpoint_url(&self.base_url, &["dados", "serie", &series, "dados"])?;
    url
      .query_pairs_mut()
      .append_pair("formato", "json")
      .append_pair("dataInicial", &start.format("%d/%m/%Y").to_string());

    let observations: Vec<SgsObservation> =
      self.transport().get_json(SourceType::SgsSeries, url).await?;

    if observations.is_empty() {
      return Err(Error::NoData(format!("SGS series {} since {}", series_code, start)));
    }

    info!("Fetched {} observations for SGS series {}", observations.len(), series_code);
    Ok(observations)
  }
}
