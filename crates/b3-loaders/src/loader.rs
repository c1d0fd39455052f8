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

//! Base traits and types for data loaders

use crate::{LoaderResult, ProcessInfo, ProcessTracker};
use async_trait::async_trait;
use b3_client::MarketDataClient;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for data loaders
#[derive(Debug, Clone)]
pub struct LoaderConfig {
  /// Enable progress bars on per-ticker loops
  pub show_progress: bool,

  /// Enable process state tracking
  pub track_process: bool,

  /// Extra pause between per-ticker requests, on top of the client rate limit
  pub request_delay_ms: u64,
}

impl Default for LoaderConfig {
  fn default() -> Self {
    Self { show_progress: true, track_process: true, request_delay_ms: 0 }
  }
}

/// Shared context for all loaders
pub struct LoaderContext {
  pub client: Arc<MarketDataClient>,
  pub config: LoaderConfig,
  pub process_tracker: Option<ProcessTracker>,
}

impl LoaderContext {
  pub fn new(client: Arc<MarketDataClient>, config: LoaderConfig) -> Self {
    Self { client, config, process_tracker: None }
  }

  pub fn with_process_tracker(mut self, tracker: ProcessTracker) -> Self {
    self.process_tracker = Some(tracker);
    self
  }

  /// Start tracking `process_name` if tracking is enabled
  pub async fn track_start(&self, process_name: &str) -> LoaderResult<()> {
    match (&self.process_tracker, self.config.track_process) {
      (Some(tracker), true) => tracker.start(process_name).await,
      _ => Ok(()),
    }
  }

  /// Progress bar for a per-ticker loop, if progress display is enabled
  pub fn progress_bar(&self, len: usize, message: &'static str) -> Option<ProgressBar> {
    if !self.config.show_progress {
      return None;
    }
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
      ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
    {
      pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message(message);
    Some(pb)
  }

  /// Sleep for the configured per-ticker delay; no-op for the first item
  pub async fn pause_between(&self, idx: usize) {
    if idx > 0 && self.config.request_delay_ms > 0 {
      tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
    }
  }

  /// Close the most recent tracked process
  pub async fn track_complete(
    &self,
    state: crate::ProcessState,
    records_processed: usize,
  ) -> LoaderResult<()> {
    match (&self.process_tracker, self.config.track_process) {
      (Some(tracker), true) => tracker.complete(state, Some(records_processed)).await,
      _ => Ok(()),
    }
  }

  /// Mark the running process failed with `error_message`
  pub async fn track_fail(&self, error_message: &str) -> LoaderResult<()> {
    match (&self.process_tracker, self.config.track_process) {
      (Some(tracker), true) => tracker.fail(error_message).await,
      _ => Ok(()),
    }
  }

  /// Every process tracked so far, oldest first
  pub async fn tracked_processes(&self) -> Vec<ProcessInfo> {
    match &self.process_tracker {
      Some(tracker) => tracker.get_all().await,
      None => Vec::new(),
    }
  }
}

/// Base trait for all data loaders
#[async_trait]
pub trait DataLoader: Send + Sync {
  /// The type of data this loader processes
  type Input: Send + Sync;

  /// The result type after loading
  type Output: Send;

  /// Load data from the given input
  async fn load(&self, context: &LoaderContext, input: Self::Input) -> LoaderResult<Self::Output>;

  /// Validate input before loading
  async fn validate_input(&self, _input: &Self::Input) -> LoaderResult<()> {
    Ok(())
  }

  /// Get loader name for logging/tracking
  fn name(&self) -> &'static str;
}
