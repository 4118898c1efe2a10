use stria_protocol::{Canvas, Point, Rect, TimeRange, TimeScale};

use crate::frame::FrameContext;
use crate::history::HistoryBucket;

use super::painter::{StripePainter, ValueReader};
use super::SeriesConfig;

/// Per-frame inputs shared by every lane of a stripe renderer, read from the
/// shared frame properties once per frame.
#[derive(Debug, Clone, Copy)]
pub struct TraversalParams {
    pub visible: TimeRange,
    pub min_gap_distance: f64,
    pub scale: TimeScale,
}

/// One lane's inputs to the traversal engine.
pub struct LaneSpec<'a> {
    pub buckets: &'a [HistoryBucket],
    pub series: usize,
    pub lane: Rect,
    pub config: &'a SeriesConfig,
    /// Hover timestamp, present only when this lane's series is the active
    /// one. NaN matches no sample.
    pub active_timestamp: Option<f64>,
}

/// Reconstruct one lane's segments from its history samples.
///
/// Samples are visited in strictly ascending time order, bucket after bucket.
/// A sample ending before the visible range is skipped outright; the first
/// sample starting past it is fed once more — drawing the partial trailing
/// segment at the viewport edge — and ends the lane. A new segment opens
/// whenever the time distance to the previously fed sample exceeds the
/// configured gap threshold. The NaN sentinel in `last_sample_time` keeps the
/// first fed sample gap-free, since NaN comparisons are false.
///
/// When the hovered sample is encountered its extracted values are published
/// to the frame's active record, together with the painter-reported center of
/// its interval; center candidates also arrive from the `finish` call closing
/// the segment that contained it. Non-finite candidates leave the record
/// untouched.
pub fn traverse_lane<R, P>(
    ctx: &FrameContext,
    params: TraversalParams,
    spec: &LaneSpec<'_>,
    reader: &R,
    painter: &mut P,
    canvas: &mut dyn Canvas,
) where
    R: ValueReader,
    P: StripePainter<Value = R::Value>,
{
    let lane_mid = spec.lane.center().y;
    let mut last_sample_time = f64::NAN;
    let mut active_segment_open = false;

    painter.begin(canvas, spec.lane, spec.series, spec.config);

    'lane: for bucket in spec.buckets {
        for index in 0..bucket.sample_count() {
            let start = bucket.timestamp_start(index);
            let end = bucket.timestamp_end(index);
            // Malformed timestamps are dropped here; NaN never reaches a painter.
            if !start.is_finite() || !end.is_finite() {
                continue;
            }
            // Entirely before the viewport.
            if end < params.visible.start {
                continue;
            }
            let Some(value) = reader.read(ctx, bucket, spec.series, index) else {
                continue;
            };

            let start_x = params.scale.to_x(start);
            let end_x = params.scale.to_x(end);
            let is_active = spec
                .active_timestamp
                .is_some_and(|t| t >= start && t < end);

            if start > params.visible.end {
                // One trailing feed, then the lane is done.
                let center = painter.value_change(canvas, start_x, end_x, &value);
                if is_active {
                    ctx.active().set_values(reader.active_values(&value).as_slice());
                    ctx.active().set_center_if_finite(Point::new(center, lane_mid));
                    active_segment_open = true;
                }
                break 'lane;
            }

            if start - last_sample_time > params.min_gap_distance {
                let center = painter.finish(canvas);
                if active_segment_open {
                    ctx.active().set_center_if_finite(Point::new(center, lane_mid));
                    active_segment_open = false;
                }
                painter.begin(canvas, spec.lane, spec.series, spec.config);
            }

            let center = painter.value_change(canvas, start_x, end_x, &value);
            if is_active {
                ctx.active().set_values(reader.active_values(&value).as_slice());
                ctx.active().set_center_if_finite(Point::new(center, lane_mid));
                active_segment_open = true;
            }
            last_sample_time = start;
        }
    }

    let center = painter.finish(canvas);
    if active_segment_open {
        ctx.active().set_center_if_finite(Point::new(center, lane_mid));
    }
}
