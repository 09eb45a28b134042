//! Time-series ring buffer implementation
//!
//! Holds the last [`MAX_CAPACITY`] samples for display. Samples are kept whole,
//! so the four metric columns handed out by [`TimeSeriesBuffer::snapshot`] are
//! always the same length and index-aligned.

use std::collections::VecDeque;

use crate::dashboard::types::{MetricSample, SeriesView};

/// Maximum number of samples kept for display
pub const MAX_CAPACITY: usize = 50;

/// Ring buffer for the displayed series (max 50 samples, FIFO eviction)
#[derive(Debug)]
pub struct TimeSeriesBuffer {
    samples: VecDeque<MetricSample>,
    /// Live appends since construction; never decremented
    appended: u64,
}

impl TimeSeriesBuffer {
    /// Creates an empty buffer
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(MAX_CAPACITY),
            appended: 0,
        }
    }

    /// Adds a sample to the end, evicting the oldest while over capacity
    pub fn append(&mut self, sample: MetricSample) {
        self.samples.push_back(sample);
        while self.samples.len() > MAX_CAPACITY {
            self.samples.pop_front();
        }
        self.appended += 1;
    }

    /// Removes every sample
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Replaces the content with the newest `MAX_CAPACITY` entries of `samples`
    pub fn seed(&mut self, samples: Vec<MetricSample>) {
        let skip = samples.len().saturating_sub(MAX_CAPACITY);
        self.samples.clear();
        self.samples.extend(samples.into_iter().skip(skip));
    }

    /// Applies a startup backlog without clobbering live data.
    ///
    /// With no live append yet this is [`seed`](Self::seed). Otherwise only the
    /// backlog entries whose timestamp sorts strictly before the oldest buffered
    /// sample are prepended, then the buffer is cut back to the newest
    /// `MAX_CAPACITY`. Returns the number of backlog entries kept.
    pub fn merge_backlog(&mut self, backlog: Vec<MetricSample>) -> usize {
        if self.appended == 0 || self.samples.is_empty() {
            let kept = backlog.len().min(MAX_CAPACITY);
            self.seed(backlog);
            return kept;
        }

        let oldest_live = self.samples[0].timestamp().to_string();
        let older: Vec<MetricSample> = backlog
            .into_iter()
            .filter(|s| s.timestamp() < oldest_live.as_str())
            .collect();

        let room = MAX_CAPACITY - self.samples.len();
        let kept = older.len().min(room);
        for sample in older.into_iter().rev().take(room) {
            self.samples.push_front(sample);
        }
        kept
    }

    /// Returns an owned copy of the series in chronological order (oldest first)
    pub fn snapshot(&self) -> SeriesView {
        self.samples.iter().collect()
    }

    /// Most recent sample, if any
    pub fn latest(&self) -> Option<&MetricSample> {
        self.samples.back()
    }

    /// Oldest buffered sample, if any
    pub fn oldest(&self) -> Option<&MetricSample> {
        self.samples.front()
    }

    /// Total number of live appends ever applied
    pub fn appended(&self) -> u64 {
        self.appended
    }

    pub fn capacity(&self) -> usize {
        MAX_CAPACITY
    }

    /// Returns the number of samples currently stored
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for TimeSeriesBuffer {
    fn default() -> Self {
        Self::new()
    }
}
