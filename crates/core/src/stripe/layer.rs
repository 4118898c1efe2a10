use std::rc::Rc;

use tracing::debug;

use stria_protocol::{Canvas, Point, TextAlign, ThemeToken};

use crate::frame::{Calculated, FrameContext};
use crate::history::{HistoryBucket, HistoryStorage};
use crate::layer::{Layer, LayerKind};

use super::painter::{DecimalReader, LaneRenderer, LaneStrategy, ReferenceReader, ReferenceResolver, StateReader};
use super::painters::{BandPainter, MarkerPainter, StateBlockPainter};
use super::traverse::{LaneSpec, TraversalParams};
use super::{SeriesConfig, SeriesKind, StripeGeometry, StripeLayout};

const LABEL_FONT_SIZE: f64 = 10.0;
const LABEL_PADDING: f64 = 4.0;

/// Selects the reader/painter pairing for a lane, per frame.
pub type StrategyFactory = Box<dyn Fn(&SeriesConfig) -> Box<dyn LaneStrategy>>;

/// A `Content` layer rendering N parallel stripe lanes from history data.
///
/// During layout it reads the three shared frame properties, queries the
/// history storage for the visible range, and snapshots buckets plus the
/// recomputed lane layout. During paint each visible series renders through
/// the strategy its configuration selects, inside a lane-local clip scope.
pub struct StripeLayer {
    storage: Rc<dyn HistoryStorage>,
    geometry: StripeGeometry,
    series: Vec<SeriesConfig>,
    visible_series: Vec<usize>,
    factory: StrategyFactory,
    snapshot: Calculated<StripeFrame>,
}

struct StripeFrame {
    buckets: Vec<HistoryBucket>,
    layout: StripeLayout,
    params: Option<TraversalParams>,
}

impl StripeLayer {
    pub fn new(
        storage: Rc<dyn HistoryStorage>,
        geometry: StripeGeometry,
        series: Vec<SeriesConfig>,
        visible_series: Vec<usize>,
        factory: StrategyFactory,
    ) -> Result<Self, super::GeometryError> {
        geometry.validate()?;
        Ok(Self {
            storage,
            geometry,
            series,
            visible_series,
            factory,
            snapshot: Calculated::new(),
        })
    }

    /// The stock pairing per series kind: decimal band, state blocks,
    /// reference markers.
    pub fn with_default_painters(
        storage: Rc<dyn HistoryStorage>,
        resolver: Rc<dyn ReferenceResolver>,
        geometry: StripeGeometry,
        series: Vec<SeriesConfig>,
        visible_series: Vec<usize>,
    ) -> Result<Self, super::GeometryError> {
        let factory: StrategyFactory =
            Box::new(move |config: &SeriesConfig| -> Box<dyn LaneStrategy> {
                match config.kind {
                    SeriesKind::Decimal => {
                        Box::new(LaneRenderer::new(DecimalReader, BandPainter::new()))
                    }
                    SeriesKind::State => {
                        Box::new(LaneRenderer::new(StateReader, StateBlockPainter::new()))
                    }
                    SeriesKind::Reference => Box::new(LaneRenderer::new(
                        ReferenceReader::new(resolver.clone()),
                        MarkerPainter::new(),
                    )),
                }
            });
        Self::new(storage, geometry, series, visible_series, factory)
    }

    pub fn visible_series(&self) -> &[usize] {
        &self.visible_series
    }

    /// Lane list for subsequent frames; indices absent from the series
    /// configuration yield empty lanes.
    pub fn set_visible_series(&mut self, visible_series: Vec<usize>) {
        self.visible_series = visible_series;
    }
}

impl Layer for StripeLayer {
    fn kind(&self) -> LayerKind {
        LayerKind::Content
    }

    fn layout(&mut self, ctx: &FrameContext, _canvas: &mut dyn Canvas) {
        let visible = ctx.props().visible_range();
        let sampling_period = ctx.props().sampling_period();
        let min_gap_distance = ctx.props().min_gap_distance();

        let layout =
            StripeLayout::compute(&self.geometry, self.visible_series.len(), ctx.viewport);
        let (buckets, params) = if visible.duration() > 0.0 {
            let buckets = self.storage.query(visible, sampling_period);
            let params = TraversalParams {
                visible,
                min_gap_distance,
                scale: ctx.time_scale(),
            };
            (buckets, Some(params))
        } else {
            (Vec::new(), None)
        };

        self.snapshot.store(
            ctx,
            StripeFrame {
                buckets,
                layout,
                params,
            },
        );
    }

    fn paint(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        let frame = self.snapshot.get(ctx);
        let Some(params) = frame.params else {
            return;
        };

        for (lane_index, &series_index) in self.visible_series.iter().enumerate() {
            let Some(lane) = frame.layout.lane(lane_index) else {
                continue;
            };

            canvas.save();
            canvas.fill_rect(lane, ThemeToken::LaneBackground);
            canvas.clip_rect(lane);

            let Some(config) = self.series.get(series_index) else {
                // Lane references a series absent from the configuration:
                // an empty lane box, never a failure.
                debug!(series_index, "visible series index beyond configuration");
                canvas.restore();
                continue;
            };

            canvas.text(
                Point::new(lane.x + LABEL_PADDING, lane.y + LABEL_FONT_SIZE + 1.0),
                config.label.clone(),
                ThemeToken::LaneLabel,
                LABEL_FONT_SIZE,
                TextAlign::Left,
            );

            let active_timestamp = (ctx.props().active_series() == Some(series_index))
                .then(|| ctx.props().active_timestamp());
            let spec = LaneSpec {
                buckets: &frame.buckets,
                series: series_index,
                lane,
                config,
                active_timestamp,
            };
            let mut strategy = (self.factory)(config);
            strategy.render_lane(ctx, params, &spec, canvas);

            canvas.restore();
        }
    }
}
