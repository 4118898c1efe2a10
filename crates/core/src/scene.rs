use tracing::{trace, warn};

use stria_protocol::{Canvas, TimeRange};

use crate::frame::{FrameContext, MissingResource};
use crate::input::{EventOutcome, InputEvent, PointerEvent, PointerKind};
use crate::layer::{Layer, LayerKind};
use crate::registry::LayerRegistry;

/// The cooperative frame loop: one scene, discrete frames, no mid-frame
/// suspension. Each `render_frame` builds a fresh [`FrameContext`] — which is
/// what clears the shared properties, the active record, and the
/// missing-resource collector — then runs the registry's two-phase cycle.
pub struct Scene {
    registry: LayerRegistry,
    loop_index: u64,
    last_timestamp: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            registry: LayerRegistry::new(),
            loop_index: 0,
            last_timestamp: f64::NAN,
        }
    }

    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut LayerRegistry {
        &mut self.registry
    }

    pub fn dispatch(&mut self, event: &InputEvent) -> EventOutcome {
        self.registry.dispatch(event)
    }

    /// Run one frame at `now` (milliseconds) over a `width` × `height` area.
    pub fn render_frame(
        &mut self,
        now: f64,
        width: f64,
        height: f64,
        canvas: &mut dyn Canvas,
    ) -> FrameReport {
        self.loop_index += 1;
        let delta = if self.last_timestamp.is_nan() {
            0.0
        } else {
            now - self.last_timestamp
        };
        self.last_timestamp = now;

        let ctx = FrameContext::new(now, delta, self.loop_index, width, height);
        trace!(loop_index = self.loop_index, "frame begin");
        self.registry.paint_layers(&ctx, canvas);

        let missing = ctx.missing().take();
        if !missing.is_empty() {
            warn!(count = missing.len(), "frame completed with unresolved resources");
        }
        FrameReport {
            loop_index: self.loop_index,
            frame_timestamp_delta: delta,
            missing,
        }
    }
}

/// What one frame left behind.
#[derive(Debug)]
pub struct FrameReport {
    pub loop_index: u64,
    pub frame_timestamp_delta: f64,
    pub missing: Vec<MissingResource>,
}

/// The upstream collaborator owning the view window.
///
/// A `Calculations` layer, laid out before anything that paints, publishing
/// the shared frame properties every frame: visible range, sampling period,
/// minimum gap distance, and the optional hover sample. Wheel zooms around
/// the cursor, dragging pans; both consume the pointer event.
pub struct TimeWindowLayer {
    visible: TimeRange,
    sampling_period: f64,
    min_gap_distance: f64,
    hover: Option<(usize, f64)>,
    last_width: f64,
}

impl TimeWindowLayer {
    pub fn new(visible: TimeRange, sampling_period: f64, min_gap_distance: f64) -> Self {
        Self {
            visible,
            sampling_period,
            min_gap_distance,
            hover: None,
            last_width: 0.0,
        }
    }

    pub fn visible_range(&self) -> TimeRange {
        self.visible
    }

    pub fn set_visible_range(&mut self, visible: TimeRange) {
        self.visible = visible;
    }

    pub fn set_sampling_period(&mut self, period: f64) {
        self.sampling_period = period;
    }

    /// Hover sample published to stripe renderers; `None` clears it.
    pub fn set_hover(&mut self, series: Option<usize>, timestamp: f64) {
        self.hover = series.map(|s| (s, timestamp));
    }

    fn zoom_at(&mut self, time: f64, factor: f64) {
        self.visible = TimeRange::new(
            time - (time - self.visible.start) * factor,
            time + (self.visible.end - time) * factor,
        );
    }

    fn pan_by(&mut self, dt: f64) {
        self.visible = TimeRange::new(self.visible.start + dt, self.visible.end + dt);
    }
}

impl Layer for TimeWindowLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Calculations
    }

    fn layout(&mut self, ctx: &FrameContext, _canvas: &mut dyn Canvas) {
        self.last_width = ctx.width;
        ctx.props().publish_visible_range(self.visible);
        ctx.props().publish_sampling_period(self.sampling_period);
        ctx.props().publish_min_gap_distance(self.min_gap_distance);
        if let Some((series, timestamp)) = self.hover {
            ctx.props().set_active_sample(Some(series), timestamp);
        }
    }

    fn on_pointer(&mut self, event: &PointerEvent) -> EventOutcome {
        // Needs one laid-out frame to know the time-per-pixel ratio.
        if self.last_width <= 0.0 {
            return EventOutcome::Ignored;
        }
        let per_px = self.visible.duration() / self.last_width;
        match event.kind {
            PointerKind::Wheel if event.scroll != 0.0 => {
                let at = self.visible.start + event.position.x * per_px;
                let factor = if event.scroll > 0.0 { 0.8 } else { 1.25 };
                self.zoom_at(at, factor);
                EventOutcome::Consumed
            }
            PointerKind::Drag => {
                self.pan_by(-event.delta.x * per_px);
                EventOutcome::Consumed
            }
            _ => EventOutcome::Ignored,
        }
    }
}
