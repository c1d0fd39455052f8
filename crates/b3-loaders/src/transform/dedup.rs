//! First-occurrence deduplication with a report of what was dropped

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;
use tracing::warn;

/// Keys that occurred more than once in a table
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateReport<K> {
  pub table: &'static str,
  /// Distinct duplicated keys, in order of first occurrence
  pub keys: Vec<K>,
  /// Rows removed (every occurrence after the first)
  pub dropped_rows: usize,
}

impl<K> DuplicateReport<K> {
  pub fn empty(table: &'static str) -> Self {
    Self { table, keys: Vec::new(), dropped_rows: 0 }
  }

  pub fn is_empty(&self) -> bool {
    self.keys.is_empty()
  }
}

impl<K: Display> DuplicateReport<K> {
  /// Emit the report as a warning; silent when nothing was duplicated
  pub fn log(&self) {
    if self.is_empty() {
      return;
    }
    let keys: Vec<String> = self.keys.iter().map(|k| k.to_string()).collect();
    warn!(
      table = self.table,
      dropped_rows = self.dropped_rows,
      "Duplicate keys found, keeping first occurrence: {}",
      keys.join(", ")
    );
  }
}

/// Keep the first row per key, preserving input order
pub fn dedup_first<T, K, F>(table: &'static str, rows: Vec<T>, key_of: F) -> (Vec<T>, DuplicateReport<K>)
where
  K: Eq + Hash + Clone,
  F: Fn(&T) -> K,
{
  let mut seen: HashSet<K> = HashSet::with_capacity(rows.len());
  let mut reported: HashSet<K> = HashSet::new();
  let mut report = DuplicateReport::empty(table);
  let mut kept = Vec::with_capacity(rows.len());

  for row in rows {
    let key = key_of(&row);
    if seen.contains(&key) {
      report.dropped_rows += 1;
      if reported.insert(key.clone()) {
        report.keys.push(key);
      }
    } else {
      seen.insert(key);
      kept.push(row);
    }
  }

  (kept, report)
}
