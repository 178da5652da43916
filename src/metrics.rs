//! Per-source counters for registry invocations
//!
//! Tracks how often each source returned data, came back empty, or faulted,
//! and how long operations took.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct SourceMetrics {
    pub source_id: String,
    pub total_requests: u64,
    pub successful_requests: u64,
    /// Operations that produced no data (unreachable page or nothing matched)
    pub empty_results: u64,
    /// Adapter panics caught by the registry
    pub faults: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_empty: Option<DateTime<Utc>>,
    /// Last adapter fault
    pub last_failure: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub average_response_time_ms: f64,
    pub total_response_time_ms: u64,
}

impl SourceMetrics {
    pub fn new(source_id: String) -> Self {
        Self {
            source_id,
            total_requests: 0,
            successful_requests: 0,
            empty_results: 0,
            faults: 0,
            last_success: None,
            last_empty: None,
            last_failure: None,
            last_error: None,
            average_response_time_ms: 0.0,
            total_response_time_ms: 0,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            (self.successful_requests as f64 / self.total_requests as f64) * 100.0
        }
    }

    fn record_timing(&mut self, response_time: Duration) {
        self.total_response_time_ms += response_time.as_millis() as u64;
        let timed = self.successful_requests + self.empty_results;
        if timed > 0 {
            self.average_response_time_ms = self.total_response_time_ms as f64 / timed as f64;
        }
    }

    pub fn record_success(&mut self, response_time: Duration) {
        self.total_requests += 1;
        self.successful_requests += 1;
        self.last_success = Some(Utc::now());
        self.record_timing(response_time);
    }

    pub fn record_empty(&mut self, response_time: Duration) {
        self.total_requests += 1;
        self.empty_results += 1;
        self.last_empty = Some(Utc::now());
        self.record_timing(response_time);
    }

    pub fn record_fault(&mut self, error: String) {
        self.total_requests += 1;
        self.faults += 1;
        self.last_failure = Some(Utc::now());
        self.last_error = Some(error);
    }
}

/// Shared metrics store; cloning shares the same counters
#[derive(Clone, Default)]
pub struct MetricsTracker {
    metrics: Arc<Mutex<HashMap<String, SourceMetrics>>>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SourceMetrics>> {
        // Counters stay usable even if a holder panicked mid-update
        self.metrics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update(&self, source_id: &str, f: impl FnOnce(&mut SourceMetrics)) {
        let mut metrics = self.lock();
        let entry = metrics
            .entry(source_id.to_string())
            .or_insert_with(|| SourceMetrics::new(source_id.to_string()));
        f(entry);
    }

    pub fn record_success(&self, source_id: &str, response_time: Duration) {
        self.update(source_id, |m| m.record_success(response_time));
    }

    pub fn record_empty(&self, source_id: &str, response_time: Duration) {
        self.update(source_id, |m| m.record_empty(response_time));
    }

    pub fn record_fault(&self, source_id: &str, error: String) {
        self.update(source_id, |m| m.record_fault(error));
    }

    pub fn get_metrics(&self, source_id: &str) -> Option<SourceMetrics> {
        self.lock().get(source_id).cloned()
    }

    /// Snapshot of every source, ordered by id
    pub fn get_all_metrics(&self) -> Vec<SourceMetrics> {
        let mut all: Vec<SourceMetrics> = self.lock().values().cloned().collect();
        all.sort_by(|a, b| a.source_id.cmp(&b.source_id));
        all
    }
}
