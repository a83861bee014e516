// Rolling history: the last HISTORY_CAPACITY metric records, oldest first.

use std::collections::VecDeque;

use log::debug;

use crate::constants::HISTORY_CAPACITY;
use crate::types::MetricRecord;

/// Fixed-capacity FIFO of metric records. Appending past capacity drops the oldest.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    records: VecDeque<MetricRecord>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Buffer with a non-default bound. A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append(&mut self, record: MetricRecord) {
        self.records.push_back(record);
        while self.records.len() > self.capacity {
            if let Some(evicted) = self.records.pop_front() {
                debug!("history full, evicted sample {}", evicted.timestamp);
            }
        }
    }

    /// Records oldest → newest.
    pub fn snapshot(&self) -> Vec<MetricRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricRecord> {
        self.records.iter()
    }

    pub fn latest(&self) -> Option<&MetricRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `(timestamp, VO2ren)` points for the consumption chart.
    pub fn consumption_series(&self) -> Vec<(String, f64)> {
        self.series(|r| r.consumption)
    }

    pub fn arterial_content_series(&self) -> Vec<(String, f64)> {
        self.series(|r| r.arterial_content)
    }

    pub fn venous_content_series(&self) -> Vec<(String, f64)> {
        self.series(|r| r.venous_content)
    }

    pub fn average_content_series(&self) -> Vec<(String, f64)> {
        self.series(MetricRecord::average_content)
    }

    fn series(&self, f: impl Fn(&MetricRecord) -> f64) -> Vec<(String, f64)> {
        self.records
            .iter()
            .map(|r| (r.timestamp.clone(), f(r)))
            .collect()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
