//! Metrics collection module
//!
//! Tracks search volume, failures and store response times.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Number of recent store response times kept for the rolling average
const RESPONSE_WINDOW: usize = 100;

/// Search metrics collector
#[derive(Default)]
pub struct Metrics {
    total_searches: AtomicU64,
    failed_searches: AtomicU64,
    rejected_searches: AtomicU64,
    empty_results: AtomicU64,
    /// Recent store round trips in ms
    response_times: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc_search(&self) {
        self.total_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Store failure
    pub fn record_failure(&self) {
        self.failed_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Filters rejected before reaching the store
    pub fn record_rejected(&self) {
        self.rejected_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Successful store round trip
    pub fn record_success(&self, time_ms: u64, result_count: usize) {
        if result_count == 0 {
            self.empty_results.fetch_add(1, Ordering::Relaxed);
        }

        let mut times = self
            .response_times
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if times.len() >= RESPONSE_WINDOW {
            times.pop_front();
        }
        times.push_back(time_ms);
    }

    pub fn avg_response_time(&self) -> Option<u64> {
        let times = self
            .response_times
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if times.is_empty() {
            None
        } else {
            Some(times.iter().sum::<u64>() / times.len() as u64)
        }
    }

    /// Percentage of store round trips that succeeded
    pub fn reliability(&self) -> f64 {
        let failed = self.failed_searches.load(Ordering::Relaxed);
        let attempted = self
            .total_searches
            .load(Ordering::Relaxed)
            .saturating_sub(self.rejected_searches.load(Ordering::Relaxed));

        if attempted == 0 {
            100.0
        } else {
            (attempted.saturating_sub(failed) as f64 / attempted as f64) * 100.0
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_searches: self.total_searches.load(Ordering::Relaxed),
            failed_searches: self.failed_searches.load(Ordering::Relaxed),
            rejected_searches: self.rejected_searches.load(Ordering::Relaxed),
            empty_results: self.empty_results.load(Ordering::Relaxed),
            avg_response_time_ms: self.avg_response_time(),
            reliability: self.reliability(),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub total_searches: u64,
    pub failed_searches: u64,
    pub rejected_searches: u64,
    pub empty_results: u64,
    pub avg_response_time_ms: Option<u64>,
    pub reliability: f64,
}
