use serde::{Deserialize, Serialize};

use stria_protocol::TimeRange;

use crate::frame::MAX_SAMPLE_VALUES;

/// Aggregate numeric fields of one down-sampled slot — mean, min, max, last,
/// whatever the producing storage tracks. Renderers index positionally.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecimalSample {
    values: [f64; MAX_SAMPLE_VALUES],
    len: u8,
}

impl DecimalSample {
    /// Keeps up to [`MAX_SAMPLE_VALUES`] fields.
    pub fn new(values: &[f64]) -> Self {
        let mut stored = [f64::NAN; MAX_SAMPLE_VALUES];
        let len = values.len().min(MAX_SAMPLE_VALUES);
        stored[..len].copy_from_slice(&values[..len]);
        Self {
            values: stored,
            len: len as u8,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.len as usize]
    }

    /// First field; by convention the primary (line) value.
    pub fn primary(&self) -> f64 {
        if self.len == 0 {
            f64::NAN
        } else {
            self.values[0]
        }
    }

    /// Field at `index`, NaN when the slot carries fewer fields.
    pub fn field(&self, index: usize) -> f64 {
        if index < self.len as usize {
            self.values[index]
        } else {
            f64::NAN
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCount {
    pub code: u16,
    pub hits: u32,
}

/// Occurrence histogram of enum-coded states within one sample interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSample {
    counts: Vec<StateCount>,
}

impl StateSample {
    pub fn new(counts: Vec<StateCount>) -> Self {
        Self { counts }
    }

    pub fn single(code: u16) -> Self {
        Self {
            counts: vec![StateCount { code, hits: 1 }],
        }
    }

    /// Most common code within the interval; ties resolve to the smaller code.
    pub fn dominant(&self) -> Option<u16> {
        self.counts
            .iter()
            .max_by_key(|c| (c.hits, std::cmp::Reverse(c.code)))
            .map(|c| c.code)
    }
}

/// A reference-entry occurrence: an identifier into an external payload table
/// plus how many consecutive times it repeated within the interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSample {
    pub entry: u64,
    pub repeats: u32,
}

/// What one series recorded in one sample slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SampleCell {
    Empty,
    Decimal(DecimalSample),
    State(StateSample),
    Reference(ReferenceSample),
}

/// Fixed-duration block of consecutive samples at one sampling period.
///
/// Sample `i` spans `[start + i·period, start + (i+1)·period)`; the end of a
/// sample is the next sample's start, with a synthetic one-period end for the
/// last. Cells are stored per sample, then per series; a series index beyond
/// the recorded width reads as absent, not as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryBucket {
    start_time: f64,
    sampling_period: f64,
    cells: Vec<Vec<SampleCell>>,
}

impl HistoryBucket {
    pub fn new(start_time: f64, sampling_period: f64, cells: Vec<Vec<SampleCell>>) -> Self {
        Self {
            start_time,
            sampling_period,
            cells,
        }
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.sample_count() as f64 * self.sampling_period
    }

    pub fn sampling_period(&self) -> f64 {
        self.sampling_period
    }

    pub fn sample_count(&self) -> usize {
        self.cells.len()
    }

    pub fn timestamp_start(&self, index: usize) -> f64 {
        self.start_time + index as f64 * self.sampling_period
    }

    pub fn timestamp_end(&self, index: usize) -> f64 {
        self.timestamp_start(index) + self.sampling_period
    }

    pub fn cell(&self, series: usize, index: usize) -> Option<&SampleCell> {
        self.cells.get(index)?.get(series)
    }
}

/// The external history-query capability.
///
/// Implementations may down-sample, page, or fetch remotely; whatever latency
/// that involves stays on their side — `query` answers synchronously from
/// whatever is on hand, possibly partially covering the requested range, and
/// never blocks the frame.
pub trait HistoryStorage {
    /// Buckets overlapping `visible` at `sampling_period`, in ascending time
    /// order. May be empty; the caller clips.
    fn query(&self, visible: TimeRange, sampling_period: f64) -> Vec<HistoryBucket>;
}

/// Plain single-resolution in-memory storage, for tests and demos.
///
/// Ignores the requested sampling period: it serves the buckets it was given.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    buckets: Vec<HistoryBucket>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buckets must be pushed in ascending time order.
    pub fn push_bucket(&mut self, bucket: HistoryBucket) {
        if let Some(last) = self.buckets.last() {
            assert!(
                bucket.start_time() >= last.end_time(),
                "buckets must be pushed in ascending time order"
            );
        }
        self.buckets.push(bucket);
    }
}

impl HistoryStorage for MemoryHistory {
    fn query(&self, visible: TimeRange, _sampling_period: f64) -> Vec<HistoryBucket> {
        self.buckets
            .iter()
            .filter(|b| visible.overlaps(TimeRange::new(b.start_time(), b.end_time())))
            .cloned()
            .collect()
    }
}
