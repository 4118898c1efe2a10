use std::collections::HashMap;
use std::rc::Rc;

use stria_protocol::{Canvas, Rect, SharedStr};

use crate::frame::{FrameContext, MAX_SAMPLE_VALUES};
use crate::history::{DecimalSample, HistoryBucket, SampleCell};

use super::traverse::{traverse_lane, LaneSpec, TraversalParams};
use super::SeriesConfig;

/// Up-to-four generic values extracted from a sample for hover readouts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveValues {
    values: [f64; MAX_SAMPLE_VALUES],
    len: usize,
}

impl ActiveValues {
    pub fn from_slice(values: &[f64]) -> Self {
        let mut stored = [f64::NAN; MAX_SAMPLE_VALUES];
        let len = values.len().min(MAX_SAMPLE_VALUES);
        stored[..len].copy_from_slice(&values[..len]);
        Self {
            values: stored,
            len,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.len]
    }
}

/// Value extraction capability: how a stripe variant pulls its value out of a
/// bucket cell. Returning `None` means "no sample here" — absent series,
/// empty cell, mismatched cell kind — and the traversal skips the slot.
pub trait ValueReader {
    type Value;

    fn read(
        &self,
        ctx: &FrameContext,
        bucket: &HistoryBucket,
        series: usize,
        index: usize,
    ) -> Option<Self::Value>;

    /// Generic values published when the sample is the hovered one.
    fn active_values(&self, value: &Self::Value) -> ActiveValues;
}

/// Painting capability of one lane. `value_change` and `finish` answer with
/// the screen-space center of what they drew, or NaN when there is nothing
/// meaningful to point at.
pub trait StripePainter {
    type Value;

    /// Open a new segment.
    fn begin(&mut self, canvas: &mut dyn Canvas, lane: Rect, series: usize, config: &SeriesConfig);

    /// Feed one sample's value over the screen interval `[start_x, end_x)`.
    fn value_change(
        &mut self,
        canvas: &mut dyn Canvas,
        start_x: f64,
        end_x: f64,
        value: &Self::Value,
    ) -> f64;

    /// Close the current segment.
    fn finish(&mut self, canvas: &mut dyn Canvas) -> f64;
}

/// Object-safe pairing of a reader and a painter, selected per lane.
pub trait LaneStrategy {
    fn render_lane(
        &mut self,
        ctx: &FrameContext,
        params: TraversalParams,
        spec: &LaneSpec<'_>,
        canvas: &mut dyn Canvas,
    );
}

/// The concrete pairing: any reader with a painter speaking the same value
/// type runs the shared traversal.
pub struct LaneRenderer<R, P> {
    reader: R,
    painter: P,
}

impl<R, P> LaneRenderer<R, P> {
    pub fn new(reader: R, painter: P) -> Self {
        Self { reader, painter }
    }
}

impl<R, P> LaneStrategy for LaneRenderer<R, P>
where
    R: ValueReader,
    P: StripePainter<Value = R::Value>,
{
    fn render_lane(
        &mut self,
        ctx: &FrameContext,
        params: TraversalParams,
        spec: &LaneSpec<'_>,
        canvas: &mut dyn Canvas,
    ) {
        traverse_lane(ctx, params, spec, &self.reader, &mut self.painter, canvas);
    }
}

/// Decimal variant: the cell's aggregate fields pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalReader;

impl ValueReader for DecimalReader {
    type Value = DecimalSample;

    fn read(
        &self,
        _ctx: &FrameContext,
        bucket: &HistoryBucket,
        series: usize,
        index: usize,
    ) -> Option<Self::Value> {
        match bucket.cell(series, index)? {
            SampleCell::Decimal(sample) => Some(*sample),
            _ => None,
        }
    }

    fn active_values(&self, value: &Self::Value) -> ActiveValues {
        ActiveValues::from_slice(value.as_slice())
    }
}

/// State variant: the interval reduces to its most common code.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateReader;

impl ValueReader for StateReader {
    type Value = u16;

    fn read(
        &self,
        _ctx: &FrameContext,
        bucket: &HistoryBucket,
        series: usize,
        index: usize,
    ) -> Option<Self::Value> {
        match bucket.cell(series, index)? {
            SampleCell::State(sample) => sample.dominant(),
            _ => None,
        }
    }

    fn active_values(&self, value: &Self::Value) -> ActiveValues {
        ActiveValues::from_slice(&[f64::from(*value)])
    }
}

/// Payload lookup for reference entries. Implementations answer from whatever
/// table they maintain; an entry they cannot resolve is reported, not thrown.
pub trait ReferenceResolver {
    fn resolve(&self, entry: u64) -> Option<SharedStr>;
}

impl ReferenceResolver for HashMap<u64, SharedStr> {
    fn resolve(&self, entry: u64) -> Option<SharedStr> {
        self.get(&entry).cloned()
    }
}

/// A reference entry with its payload resolved (or not).
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceValue {
    pub entry: u64,
    pub repeats: u32,
    pub payload: Option<SharedStr>,
}

/// Reference variant: identifier + repeat count, payload resolved through the
/// injected lookup. Unresolved entries land in the frame's missing-resource
/// collector and paint as a fallback indicator.
pub struct ReferenceReader {
    resolver: Rc<dyn ReferenceResolver>,
}

impl ReferenceReader {
    pub fn new(resolver: Rc<dyn ReferenceResolver>) -> Self {
        Self { resolver }
    }
}

impl ValueReader for ReferenceReader {
    type Value = ReferenceValue;

    fn read(
        &self,
        ctx: &FrameContext,
        bucket: &HistoryBucket,
        series: usize,
        index: usize,
    ) -> Option<Self::Value> {
        match bucket.cell(series, index)? {
            SampleCell::Reference(sample) => {
                let payload = self.resolver.resolve(sample.entry);
                if payload.is_none() {
                    ctx.missing()
                        .report("reference entry", sample.entry.to_string());
                }
                Some(ReferenceValue {
                    entry: sample.entry,
                    repeats: sample.repeats,
                    payload,
                })
            }
            _ => None,
        }
    }

    fn active_values(&self, value: &Self::Value) -> ActiveValues {
        ActiveValues::from_slice(&[value.entry as f64, f64::from(value.repeats)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{DecimalSample, ReferenceSample, StateSample};

    fn ctx() -> FrameContext {
        FrameContext::new(0.0, 0.0, 1, 800.0, 600.0)
    }

    fn mixed_bucket() -> HistoryBucket {
        HistoryBucket::new(
            0.0,
            100.0,
            vec![vec![
                SampleCell::Decimal(DecimalSample::new(&[1.5, 1.0, 2.0])),
                SampleCell::State(StateSample::single(3)),
                SampleCell::Reference(ReferenceSample {
                    entry: 42,
                    repeats: 2,
                }),
            ]],
        )
    }

    #[test]
    fn decimal_reader_passes_aggregates_through() {
        let ctx = ctx();
        let bucket = mixed_bucket();
        let value = DecimalReader.read(&ctx, &bucket, 0, 0);
        assert_eq!(value.map(|v| v.primary()), Some(1.5));
        // Mismatched cell kind reads as absent.
        assert!(DecimalReader.read(&ctx, &bucket, 1, 0).is_none());
    }

    #[test]
    fn state_reader_reduces_to_dominant_code() {
        let ctx = ctx();
        let bucket = mixed_bucket();
        assert_eq!(StateReader.read(&ctx, &bucket, 1, 0), Some(3));
        let values = StateReader.active_values(&3);
        assert_eq!(values.as_slice(), &[3.0]);
    }

    #[test]
    fn reference_reader_resolves_payload() {
        let ctx = ctx();
        let bucket = mixed_bucket();
        let mut table = HashMap::new();
        table.insert(42u64, SharedStr::from("deploy"));
        let reader = ReferenceReader::new(Rc::new(table));
        let value = reader.read(&ctx, &bucket, 2, 0);
        assert_eq!(
            value.and_then(|v| v.payload),
            Some(SharedStr::from("deploy"))
        );
        assert!(ctx.missing().is_empty());
    }

    #[test]
    fn unresolved_reference_is_reported_not_fatal() {
        let ctx = ctx();
        let bucket = mixed_bucket();
        let reader = ReferenceReader::new(Rc::new(HashMap::new()));
        let value = reader.read(&ctx, &bucket, 2, 0);
        assert!(value.is_some_and(|v| v.payload.is_none()));
        let reports = ctx.missing().take();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].key, "42");
    }
}
