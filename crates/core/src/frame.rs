use std::cell::{Cell, RefCell};

use stria_protocol::{Point, Rect, SharedStr, TimeRange, TimeScale};

/// Immutable per-frame bundle handed to every layer.
///
/// Rebuilt by the frame loop for each frame, which is also what resets the
/// per-frame records (`FrameProps`, `ActiveSampleInfo`, `MissingResources`).
/// Those records sit behind single-threaded cells so layers can publish into
/// them during the cycle without threading `&mut` through every hook.
pub struct FrameContext {
    /// Timestamp of this frame, in milliseconds.
    pub frame_timestamp: f64,
    /// Time elapsed since the previous frame, zero on the first.
    pub frame_timestamp_delta: f64,
    /// Monotonically increasing frame counter.
    pub loop_index: u64,
    pub width: f64,
    pub height: f64,
    pub viewport: Rect,
    props: FrameProps,
    active: ActiveSampleInfo,
    missing: MissingResources,
}

impl FrameContext {
    pub fn new(
        frame_timestamp: f64,
        frame_timestamp_delta: f64,
        loop_index: u64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            frame_timestamp,
            frame_timestamp_delta,
            loop_index,
            width,
            height,
            viewport: Rect::new(0.0, 0.0, width, height),
            props: FrameProps::new(),
            active: ActiveSampleInfo::new(),
            missing: MissingResources::default(),
        }
    }

    pub fn props(&self) -> &FrameProps {
        &self.props
    }

    pub fn active(&self) -> &ActiveSampleInfo {
        &self.active
    }

    pub fn missing(&self) -> &MissingResources {
        &self.missing
    }

    /// Time-to-window transform for this frame.
    ///
    /// Derived from the published visible range; fatal before the upstream
    /// layer has published it.
    pub fn time_scale(&self) -> TimeScale {
        TimeScale::new(self.props.visible_range(), self.width)
    }
}

/// The closed set of shared per-frame properties.
///
/// Exactly one upstream layer publishes each required slot per frame, during
/// its layout; everyone else reads. A read before the publish, or a second
/// publish, is a wiring bug and fails fast with the slot name.
pub struct FrameProps {
    sampling_period: PropSlot<f64>,
    visible_range: PropSlot<TimeRange>,
    min_gap_distance: PropSlot<f64>,
    active_series: Cell<Option<usize>>,
    active_timestamp: Cell<f64>,
}

impl FrameProps {
    fn new() -> Self {
        Self {
            sampling_period: PropSlot::new("SamplingPeriod"),
            visible_range: PropSlot::new("VisibleTimeRangeX"),
            min_gap_distance: PropSlot::new("MinGapDistance"),
            active_series: Cell::new(None),
            active_timestamp: Cell::new(f64::NAN),
        }
    }

    pub fn publish_sampling_period(&self, period: f64) {
        self.sampling_period.publish(period);
    }

    pub fn sampling_period(&self) -> f64 {
        self.sampling_period.get()
    }

    pub fn publish_visible_range(&self, range: TimeRange) {
        self.visible_range.publish(range);
    }

    pub fn visible_range(&self) -> TimeRange {
        self.visible_range.get()
    }

    pub fn publish_min_gap_distance(&self, distance: f64) {
        self.min_gap_distance.publish(distance);
    }

    pub fn min_gap_distance(&self) -> f64 {
        self.min_gap_distance.get()
    }

    /// Optional hover inputs; unlike the slots above these default to "none"
    /// and may be left unpublished.
    pub fn set_active_sample(&self, series: Option<usize>, timestamp: f64) {
        self.active_series.set(series);
        self.active_timestamp.set(timestamp);
    }

    pub fn active_series(&self) -> Option<usize> {
        self.active_series.get()
    }

    pub fn active_timestamp(&self) -> f64 {
        self.active_timestamp.get()
    }
}

/// Write-once-per-frame cell. The frame loop rebuilds `FrameProps`, so a
/// fresh slot is the "cleared at frame start" state.
struct PropSlot<T: Copy> {
    name: &'static str,
    value: Cell<Option<T>>,
}

impl<T: Copy> PropSlot<T> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            value: Cell::new(None),
        }
    }

    fn publish(&self, value: T) {
        let previous = self.value.replace(Some(value));
        assert!(
            previous.is_none(),
            "shared frame property {} published twice in one frame",
            self.name
        );
    }

    fn get(&self) -> T {
        match self.value.get() {
            Some(value) => value,
            None => panic!(
                "shared frame property {} read before any layer published it this frame",
                self.name
            ),
        }
    }
}

/// Number of generic values carried per history sample.
pub const MAX_SAMPLE_VALUES: usize = 4;

/// The currently hovered sample, published by a stripe renderer and read by
/// readout layers later in the paint order. Reset with every frame.
pub struct ActiveSampleInfo {
    values: Cell<[f64; MAX_SAMPLE_VALUES]>,
    value_count: Cell<usize>,
    center: Cell<Point>,
}

impl ActiveSampleInfo {
    fn new() -> Self {
        Self {
            values: Cell::new([f64::NAN; MAX_SAMPLE_VALUES]),
            value_count: Cell::new(0),
            center: Cell::new(Point::new(f64::NAN, f64::NAN)),
        }
    }

    /// Overwrite the stored values with up to [`MAX_SAMPLE_VALUES`] entries.
    pub fn set_values(&self, values: &[f64]) {
        let mut stored = [f64::NAN; MAX_SAMPLE_VALUES];
        let count = values.len().min(MAX_SAMPLE_VALUES);
        stored[..count].copy_from_slice(&values[..count]);
        self.values.set(stored);
        self.value_count.set(count);
    }

    /// Stored value at `index`, NaN when unset.
    pub fn value(&self, index: usize) -> f64 {
        if index < MAX_SAMPLE_VALUES {
            self.values.get()[index]
        } else {
            f64::NAN
        }
    }

    pub fn value_count(&self) -> usize {
        self.value_count.get()
    }

    /// Candidate centers arrive once per fed sample; only a finite candidate
    /// moves the stored center.
    pub fn set_center_if_finite(&self, center: Point) {
        if center.x.is_finite() && center.y.is_finite() {
            self.center.set(center);
        }
    }

    pub fn center(&self) -> Point {
        self.center.get()
    }
}

/// A resource a layer needed this frame but could not resolve.
///
/// Reported instead of thrown so the frame completes with a fallback
/// indicator where the resource would have been drawn.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unresolved {kind} \"{key}\"")]
pub struct MissingResource {
    pub kind: &'static str,
    pub key: SharedStr,
}

/// Per-frame collector of [`MissingResource`] reports.
#[derive(Debug, Default)]
pub struct MissingResources {
    entries: RefCell<Vec<MissingResource>>,
}

impl MissingResources {
    pub fn report(&self, kind: &'static str, key: impl Into<SharedStr>) {
        self.entries.borrow_mut().push(MissingResource {
            kind,
            key: key.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drain the reports collected this frame.
    pub fn take(&self) -> Vec<MissingResource> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }
}

/// Layout-computed state cached for the paint phase.
///
/// Stored during `layout` with the frame's loop index; reading a snapshot
/// from an older frame means some layer skipped its calculate step, which is
/// a wiring bug worth failing loudly on.
#[derive(Debug, Default)]
pub struct Calculated<T> {
    value: Option<T>,
    stamp: u64,
}

impl<T> Calculated<T> {
    pub fn new() -> Self {
        Self {
            value: None,
            stamp: 0,
        }
    }

    pub fn store(&mut self, ctx: &FrameContext, value: T) {
        self.value = Some(value);
        self.stamp = ctx.loop_index;
    }

    pub fn get(&self, ctx: &FrameContext) -> &T {
        assert_eq!(
            self.stamp, ctx.loop_index,
            "calculated snapshot read before this frame's layout stored it"
        );
        match &self.value {
            Some(value) => value,
            None => panic!("calculated snapshot read before this frame's layout stored it"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(loop_index: u64) -> FrameContext {
        FrameContext::new(1_000.0, 16.0, loop_index, 800.0, 600.0)
    }

    #[test]
    fn props_round_trip() {
        let ctx = frame(1);
        ctx.props().publish_sampling_period(100.0);
        ctx.props()
            .publish_visible_range(TimeRange::new(0.0, 1_000.0));
        ctx.props().publish_min_gap_distance(150.0);

        assert_eq!(ctx.props().sampling_period(), 100.0);
        assert_eq!(ctx.props().visible_range().duration(), 1_000.0);
        assert_eq!(ctx.props().min_gap_distance(), 150.0);

        let scale = ctx.time_scale();
        assert_eq!(scale.to_x(500.0), 400.0);
    }

    #[test]
    #[should_panic(expected = "read before any layer published")]
    fn reading_unpublished_prop_is_fatal() {
        let ctx = frame(1);
        let _ = ctx.props().sampling_period();
    }

    #[test]
    #[should_panic(expected = "published twice")]
    fn double_publish_is_fatal() {
        let ctx = frame(1);
        ctx.props().publish_min_gap_distance(100.0);
        ctx.props().publish_min_gap_distance(100.0);
    }

    #[test]
    fn active_defaults_to_nan() {
        let ctx = frame(1);
        assert!(ctx.active().center().x.is_nan());
        assert!(ctx.active().value(0).is_nan());
        assert_eq!(ctx.active().value_count(), 0);
        assert_eq!(ctx.props().active_series(), None);
        assert!(ctx.props().active_timestamp().is_nan());
    }

    #[test]
    fn center_only_moves_on_finite_candidates() {
        let ctx = frame(1);
        ctx.active().set_center_if_finite(Point::new(40.0, 10.0));
        ctx.active()
            .set_center_if_finite(Point::new(f64::NAN, 10.0));
        let center = ctx.active().center();
        assert_eq!(center.x, 40.0);
        assert_eq!(center.y, 10.0);
    }

    #[test]
    fn values_truncate_to_capacity() {
        let ctx = frame(1);
        ctx.active().set_values(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(ctx.active().value_count(), MAX_SAMPLE_VALUES);
        assert_eq!(ctx.active().value(3), 4.0);
        assert!(ctx.active().value(4).is_nan());
    }

    #[test]
    fn missing_resources_collect_and_drain() {
        let ctx = frame(1);
        assert!(ctx.missing().is_empty());
        ctx.missing().report("reference entry", "entry-42");
        let reports = ctx.missing().take();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, "reference entry");
        assert_eq!(format!("{}", reports[0]), "unresolved reference entry \"entry-42\"");
        assert!(ctx.missing().is_empty());
    }

    #[test]
    fn calculated_snapshot_same_frame() {
        let ctx = frame(7);
        let mut snapshot = Calculated::new();
        snapshot.store(&ctx, 42usize);
        assert_eq!(*snapshot.get(&ctx), 42);
    }

    #[test]
    #[should_panic(expected = "calculated snapshot read")]
    fn stale_snapshot_is_fatal() {
        let old = frame(7);
        let mut snapshot = Calculated::new();
        snapshot.store(&old, 42usize);
        let next = frame(8);
        let _ = snapshot.get(&next);
    }
}
