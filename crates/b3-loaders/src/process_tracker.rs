//! Process tracking for monitoring ETL stages
//! In-memory only; each run starts from an empty history

use crate::LoaderResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcessState {
  Running,
  Success,
  Failed,
  CompletedWithErrors,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessInfo {
  pub process_name: String,
  pub start_time: DateTime<Utc>,
  pub end_time: Option<DateTime<Utc>>,
  pub state: ProcessState,
  pub error_message: Option<String>,
  pub records_processed: Option<usize>,
}

/// In-memory process tracker
#[derive(Clone, Default)]
pub struct ProcessTracker {
  processes: Arc<Mutex<Vec<ProcessInfo>>>,
}

impl ProcessTracker {
  pub fn new() -> Self {
    Self { processes: Arc::new(Mutex::new(Vec::new())) }
  }

  pub async fn start(&self, process_name: &str) -> LoaderResult<()> {
    let mut processes = self.processes.lock().await;
    processes.push(ProcessInfo {
      process_name: process_name.to_string(),
      start_time: Utc::now(),
      end_time: None,
      state: ProcessState::Running,
      error_message: None,
      records_processed: None,
    });
    Ok(())
  }

  pub async fn complete(
    &self,
    state: ProcessState,
    records_processed: Option<usize>,
  ) -> LoaderResult<()> {
    let mut processes = self.processes.lock().await;
    if let Some(last) = processes.last_mut() {
      last.state = state;
      last.end_time = Some(Utc::now());
      last.records_processed = records_processed;
    }
    Ok(())
  }

  /// Fail the most recent process if it is still running
  pub async fn fail(&self, error_message: &str) -> LoaderResult<()> {
    let mut processes = self.processes.lock().await;
    if let Some(last) = processes.last_mut().filter(|p| p.state == ProcessState::Running) {
      last.state = ProcessState::Failed;
      last.end_time = Some(Utc::now());
      last.error_message = Some(error_message.to_string());
    }
    Ok(())
  }

  pub async fn get_all(&self) -> Vec<ProcessInfo> {
    self.processes.lock().await.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_start_and_complete() {
    let tracker = ProcessTracker::new();
    tokio_test::block_on(async {
      tracker.start("transform").await.unwrap();
      tracker.complete(ProcessState::CompletedWithErrors, Some(40)).await.unwrap();
    });

    let processes = tokio_test::block_on(tracker.get_all());
    assert_eq!(processes.len(), 1);
    assert_eq!(processes[0].state, ProcessState::CompletedWithErrors);
    assert_eq!(processes[0].records_processed, Some(40));
    assert!(processes[0].end_time.is_some());
  }

  #[test]
  fn test_fail_records_message() {
    let tracker = ProcessTracker::new();
    tokio_test::block_on(async {
      tracker.start("load").await.unwrap();
      tracker.fail("schema violation").await.unwrap();
    });

    let processes = tokio_test::block_on(tracker.get_all());
    assert_eq!(processes[0].state, ProcessState::Failed);
    assert_eq!(processes[0].error_message.as_deref(), Some("schema violation"));
  }

  #[test]
  fn test_fail_leaves_finished_process_alone() {
    let tracker = ProcessTracker::new();
    tokio_test::block_on(async {
      tracker.start("rate_index_loader").await.unwrap();
      tracker.complete(ProcessState::Success, Some(2)).await.unwrap();
      tracker.fail("listing file not found").await.unwrap();
    });

    let processes = tokio_test::block_on(tracker.get_all());
    assert_eq!(processes[0].state, ProcessState::Success);
    assert_eq!(processes[0].error_message, None);
  }

  #[test]
  fn test_complete_without_start_is_noop() {
    let tracker = ProcessTracker::new();
    tokio_test::block_on(tracker.complete(ProcessState::Success, None)).unwrap();
    assert!(tokio_test::block_on(tracker.get_all()).is_empty());
  }
}
