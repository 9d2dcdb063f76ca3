//! Caller-owned, append-only log of past results.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

use crate::result_set::{ResultSet, ResultSummary};

/// Results in insertion order, optionally bounded.
///
/// With a capacity limit the oldest entry is evicted once the log is full;
/// without one the log grows for as long as it is held.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultHistory {
    entries: VecDeque<ResultSet>,
    capacity: Option<usize>,
}

impl ResultHistory {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A limit of zero is treated as one.
    pub fn with_capacity_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: Some(limit.max(1)),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Append `result`, returning the evicted entry if the log was full.
    pub fn record(&mut self, result: ResultSet) -> Option<ResultSet> {
        let evicted = match self.capacity {
            Some(limit) if self.entries.len() >= limit => self.entries.pop_front(),
            _ => None,
        };
        if evicted.is_some() {
            debug!(capacity = ?self.capacity, "evicted oldest result");
        }
        self.entries.push_back(result);
        evicted
    }

    pub fn list(&self) -> Vec<ResultSet> {
        self.entries.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultSet> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&ResultSet> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summaries(&self) -> Vec<ResultSummary> {
        self.entries.iter().map(ResultSet::summary).collect()
    }
}

/// A [`ResultHistory`] shared between concurrent callers.
///
/// Appends take the write lock one at a time; readers get a cloned
/// snapshot that later appends cannot disturb.
#[derive(Debug, Clone, Default)]
pub struct SharedHistory {
    inner: Arc<RwLock<ResultHistory>>,
}

impl SharedHistory {
    pub fn new(history: ResultHistory) -> Self {
        Self {
            inner: Arc::new(RwLock::new(history)),
        }
    }

    pub fn record(&self, result: ResultSet) -> Option<ResultSet> {
        self.inner.write().record(result)
    }

    pub fn snapshot(&self) -> ResultHistory {
        self.inner.read().clone()
    }

    pub fn list(&self) -> Vec<ResultSet> {
        self.inner.read().list()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
