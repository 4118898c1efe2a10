use stria_protocol::{Canvas, Point, Rect, SharedStr, TextAlign, ThemeToken};

use crate::history::DecimalSample;

use super::painter::{ReferenceValue, StripePainter};
use super::SeriesConfig;

const MARKER_FONT_SIZE: f64 = 9.0;
const MARKER_LABEL_PAD: f64 = 2.0;
const MISSING_BOX: f64 = 5.0;

/// Clamp a screen interval to the lane's time extent. Returns `None` when
/// nothing of it is inside the lane.
fn clamp_interval(lane: Rect, start_x: f64, end_x: f64) -> Option<(f64, f64)> {
    let x0 = start_x.max(lane.x);
    let x1 = end_x.min(lane.x + lane.w);
    (x1 > x0).then_some((x0, x1))
}

/// Decimal stripe painter: a min/max envelope fill with the primary value as
/// a line on top. Expects aggregate fields `[primary, min, max, ...]`; with
/// fewer than three fields only the line is drawn.
#[derive(Debug)]
pub struct BandPainter {
    lane: Rect,
    color: ThemeToken,
    min_value: f64,
    max_value: f64,
}

impl Default for BandPainter {
    fn default() -> Self {
        Self {
            lane: Rect::new(0.0, 0.0, 0.0, 0.0),
            color: ThemeToken::BandLine,
            min_value: 0.0,
            max_value: 1.0,
        }
    }
}

impl BandPainter {
    pub fn new() -> Self {
        Self::default()
    }

    fn value_y(&self, value: f64) -> f64 {
        let range = self.max_value - self.min_value;
        let normalized = if range > 0.0 {
            ((value - self.min_value) / range).clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.lane.y + self.lane.h * (1.0 - normalized)
    }
}

impl StripePainter for BandPainter {
    type Value = DecimalSample;

    fn begin(
        &mut self,
        _canvas: &mut dyn Canvas,
        lane: Rect,
        _series: usize,
        config: &SeriesConfig,
    ) {
        self.lane = lane;
        self.color = config.color;
        self.min_value = config.min_value;
        self.max_value = config.max_value;
    }

    fn value_change(
        &mut self,
        canvas: &mut dyn Canvas,
        start_x: f64,
        end_x: f64,
        value: &DecimalSample,
    ) -> f64 {
        let Some((x0, x1)) = clamp_interval(self.lane, start_x, end_x) else {
            return f64::NAN;
        };

        let low = value.field(1);
        let high = value.field(2);
        if low.is_finite() && high.is_finite() && high >= low {
            let top = self.value_y(high);
            let bottom = self.value_y(low);
            canvas.fill_rect(
                Rect::new(x0, top, x1 - x0, bottom - top),
                ThemeToken::BandFill,
            );
        }

        let primary = value.primary();
        if primary.is_finite() {
            let y = self.value_y(primary);
            canvas.line(Point::new(x0, y), Point::new(x1, y), self.color, 1.0);
        }

        (x0 + x1) / 2.0
    }

    fn finish(&mut self, _canvas: &mut dyn Canvas) -> f64 {
        f64::NAN
    }
}

/// State stripe painter: runs of equal codes merge into one block colored by
/// the rotating palette. Blocks flush when the code changes, the segment
/// closes, or the lane ends.
#[derive(Debug)]
pub struct StateBlockPainter {
    lane: Rect,
    run: Option<StateRun>,
}

impl Default for StateBlockPainter {
    fn default() -> Self {
        Self {
            lane: Rect::new(0.0, 0.0, 0.0, 0.0),
            run: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StateRun {
    code: u16,
    start_x: f64,
    end_x: f64,
}

impl StateBlockPainter {
    pub fn new() -> Self {
        Self::default()
    }

    fn flush(&mut self, canvas: &mut dyn Canvas) -> f64 {
        let Some(run) = self.run.take() else {
            return f64::NAN;
        };
        canvas.fill_rect(
            Rect::new(
                run.start_x,
                self.lane.y,
                run.end_x - run.start_x,
                self.lane.h,
            ),
            ThemeToken::palette(usize::from(run.code)),
        );
        (run.start_x + run.end_x) / 2.0
    }
}

impl StripePainter for StateBlockPainter {
    type Value = u16;

    fn begin(
        &mut self,
        _canvas: &mut dyn Canvas,
        lane: Rect,
        _series: usize,
        _config: &SeriesConfig,
    ) {
        self.lane = lane;
        self.run = None;
    }

    fn value_change(
        &mut self,
        canvas: &mut dyn Canvas,
        start_x: f64,
        end_x: f64,
        value: &u16,
    ) -> f64 {
        let Some((x0, x1)) = clamp_interval(self.lane, start_x, end_x) else {
            return f64::NAN;
        };
        match &mut self.run {
            Some(run) if run.code == *value => run.end_x = x1,
            _ => {
                let _ = self.flush(canvas);
                self.run = Some(StateRun {
                    code: *value,
                    start_x: x0,
                    end_x: x1,
                });
            }
        }
        (x0 + x1) / 2.0
    }

    fn finish(&mut self, canvas: &mut dyn Canvas) -> f64 {
        self.flush(canvas)
    }
}

/// Reference stripe painter: a vertical marker per entry with the resolved
/// payload as label. Unresolved payloads draw a small fallback box instead;
/// repeated entries carry a multiplier label.
#[derive(Debug)]
pub struct MarkerPainter {
    lane: Rect,
}

impl Default for MarkerPainter {
    fn default() -> Self {
        Self {
            lane: Rect::new(0.0, 0.0, 0.0, 0.0),
        }
    }
}

impl MarkerPainter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StripePainter for MarkerPainter {
    type Value = ReferenceValue;

    fn begin(
        &mut self,
        _canvas: &mut dyn Canvas,
        lane: Rect,
        _series: usize,
        _config: &SeriesConfig,
    ) {
        self.lane = lane;
    }

    fn value_change(
        &mut self,
        canvas: &mut dyn Canvas,
        start_x: f64,
        end_x: f64,
        value: &ReferenceValue,
    ) -> f64 {
        let Some((x0, x1)) = clamp_interval(self.lane, start_x, end_x) else {
            return f64::NAN;
        };
        canvas.line(
            Point::new(x0, self.lane.y),
            Point::new(x0, self.lane.y + self.lane.h),
            ThemeToken::MarkerLine,
            1.0,
        );

        match &value.payload {
            Some(payload) => {
                canvas.text(
                    Point::new(x0 + MARKER_LABEL_PAD, self.lane.y + MARKER_FONT_SIZE),
                    payload.clone(),
                    ThemeToken::MarkerText,
                    MARKER_FONT_SIZE,
                    TextAlign::Left,
                );
            }
            None => {
                canvas.fill_rect(
                    Rect::new(
                        x0 + MARKER_LABEL_PAD,
                        self.lane.y + MARKER_LABEL_PAD,
                        MISSING_BOX,
                        MISSING_BOX,
                    ),
                    ThemeToken::MissingEntry,
                );
            }
        }

        if value.repeats > 1 {
            canvas.text(
                Point::new(
                    x0 + MARKER_LABEL_PAD,
                    self.lane.y + self.lane.h - MARKER_LABEL_PAD,
                ),
                SharedStr::from(format!("×{}", value.repeats)),
                ThemeToken::TextMuted,
                MARKER_FONT_SIZE,
                TextAlign::Left,
            );
        }

        (x0 + x1) / 2.0
    }

    fn finish(&mut self, _canvas: &mut dyn Canvas) -> f64 {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stria_protocol::{RecordingCanvas, RenderCommand};

    fn lane() -> Rect {
        Rect::new(0.0, 0.0, 400.0, 40.0)
    }

    fn decimal_config() -> SeriesConfig {
        SeriesConfig::decimal("cpu", ThemeToken::Palette1, 0.0, 10.0)
    }

    #[test]
    fn band_painter_draws_envelope_and_line() {
        let mut painter = BandPainter::new();
        let mut canvas = RecordingCanvas::new();
        painter.begin(&mut canvas, lane(), 0, &decimal_config());
        let center =
            painter.value_change(&mut canvas, 100.0, 200.0, &DecimalSample::new(&[5.0, 2.0, 8.0]));
        assert_eq!(center, 150.0);
        let _ = painter.finish(&mut canvas);

        let commands = canvas.take();
        assert!(commands
            .iter()
            .any(|c| matches!(c, RenderCommand::FillRect { color: ThemeToken::BandFill, .. })));
        let line_y = commands.iter().find_map(|c| match c {
            RenderCommand::Line { from, .. } => Some(from.y),
            _ => None,
        });
        // primary 5.0 in [0, 10] maps to the lane middle
        assert_eq!(line_y, Some(20.0));
    }

    #[test]
    fn band_painter_clamps_to_lane_edge() {
        let mut painter = BandPainter::new();
        let mut canvas = RecordingCanvas::new();
        painter.begin(&mut canvas, lane(), 0, &decimal_config());
        // Interval extending past the lane clamps to its right edge.
        let center =
            painter.value_change(&mut canvas, 380.0, 500.0, &DecimalSample::new(&[1.0]));
        assert_eq!(center, 390.0);
        // Interval entirely outside draws nothing and reports no center.
        let outside =
            painter.value_change(&mut canvas, 500.0, 600.0, &DecimalSample::new(&[1.0]));
        assert!(outside.is_nan());
    }

    #[test]
    fn state_painter_merges_equal_code_runs() {
        let mut painter = StateBlockPainter::new();
        let mut canvas = RecordingCanvas::new();
        let config = SeriesConfig::state("mode");
        painter.begin(&mut canvas, lane(), 0, &config);
        let _ = painter.value_change(&mut canvas, 0.0, 100.0, &2);
        let _ = painter.value_change(&mut canvas, 100.0, 200.0, &2);
        let _ = painter.value_change(&mut canvas, 200.0, 300.0, &5);
        let finish_center = painter.finish(&mut canvas);

        let rects: Vec<&RenderCommand> = canvas
            .commands()
            .iter()
            .filter(|c| matches!(c, RenderCommand::FillRect { .. }))
            .collect();
        // Two runs: [0,200) of code 2, [200,300) of code 5.
        assert_eq!(rects.len(), 2);
        if let RenderCommand::FillRect { rect, .. } = rects[0] {
            assert_eq!(rect.w, 200.0);
        }
        // finish flushed the last run and reported its center
        assert_eq!(finish_center, 250.0);
    }

    #[test]
    fn marker_painter_flags_missing_payload() {
        let mut painter = MarkerPainter::new();
        let mut canvas = RecordingCanvas::new();
        let config = SeriesConfig::reference("events");
        painter.begin(&mut canvas, lane(), 0, &config);
        let _ = painter.value_change(
            &mut canvas,
            50.0,
            150.0,
            &ReferenceValue {
                entry: 9,
                repeats: 3,
                payload: None,
            },
        );

        let commands = canvas.commands();
        assert!(commands
            .iter()
            .any(|c| matches!(c, RenderCommand::FillRect { color: ThemeToken::MissingEntry, .. })));
        // repeat multiplier label
        assert!(commands.iter().any(|c| matches!(
            c,
            RenderCommand::Text { text, .. } if text.as_str() == "×3"
        )));
    }

    #[test]
    fn marker_painter_labels_resolved_payload() {
        let mut painter = MarkerPainter::new();
        let mut canvas = RecordingCanvas::new();
        let config = SeriesConfig::reference("events");
        painter.begin(&mut canvas, lane(), 0, &config);
        let _ = painter.value_change(
            &mut canvas,
            50.0,
            150.0,
            &ReferenceValue {
                entry: 9,
                repeats: 1,
                payload: Some(SharedStr::from("restart")),
            },
        );
        assert!(canvas.commands().iter().any(|c| matches!(
            c,
            RenderCommand::Text { text, .. } if text.as_str() == "restart"
        )));
    }
}
