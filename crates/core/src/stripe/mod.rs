//! The stripe renderer family: N parallel time-series lanes reconstructed
//! from history buckets, with gap splitting, viewport clipping, and hover
//! tracking. One traversal engine, parameterized over value extraction and
//! painting; the three variants differ only in those two capabilities.

pub mod layer;
pub mod painter;
pub mod painters;
pub mod traverse;

pub use layer::{StrategyFactory, StripeLayer};
pub use painter::{
    ActiveValues, DecimalReader, LaneRenderer, LaneStrategy, ReferenceReader, ReferenceResolver,
    ReferenceValue, StateReader, StripePainter, ValueReader,
};
pub use painters::{BandPainter, MarkerPainter, StateBlockPainter};
pub use traverse::{traverse_lane, LaneSpec, TraversalParams};

use serde::{Deserialize, Serialize};

use stria_protocol::{Rect, SharedStr, ThemeToken};

/// Which of the three stripe variants a series renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesKind {
    /// Fixed-count numeric aggregates per sample.
    Decimal,
    /// Enum-coded state, reduced to the most common code per interval.
    State,
    /// Reference entries: identifier + repeat count, payload looked up.
    Reference,
}

/// Per-series display configuration, index-aligned with the history data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub label: SharedStr,
    pub kind: SeriesKind,
    pub color: ThemeToken,
    /// Value range mapped onto the lane cross-axis by decimal painters.
    pub min_value: f64,
    pub max_value: f64,
}

impl SeriesConfig {
    pub fn decimal(
        label: impl Into<SharedStr>,
        color: ThemeToken,
        min_value: f64,
        max_value: f64,
    ) -> Self {
        Self {
            label: label.into(),
            kind: SeriesKind::Decimal,
            color,
            min_value,
            max_value,
        }
    }

    pub fn state(label: impl Into<SharedStr>) -> Self {
        Self {
            label: label.into(),
            kind: SeriesKind::State,
            color: ThemeToken::Palette0,
            min_value: 0.0,
            max_value: 1.0,
        }
    }

    pub fn reference(label: impl Into<SharedStr>) -> Self {
        Self {
            label: label.into(),
            kind: SeriesKind::Reference,
            color: ThemeToken::MarkerLine,
            min_value: 0.0,
            max_value: 1.0,
        }
    }
}

/// Stacking direction of the lane boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StripeAxis {
    /// Lanes are rows, stacked top to bottom.
    Vertical,
    /// Lanes are columns, stacked left to right.
    Horizontal,
}

/// Fixed lane size, fixed inter-lane gap, optional leading offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StripeGeometry {
    pub axis: StripeAxis,
    pub lane_size: f64,
    pub lane_gap: f64,
    pub start_offset: f64,
}

impl StripeGeometry {
    pub fn rows(lane_size: f64, lane_gap: f64) -> Self {
        Self {
            axis: StripeAxis::Vertical,
            lane_size,
            lane_gap,
            start_offset: 0.0,
        }
    }

    pub fn columns(lane_size: f64, lane_gap: f64) -> Self {
        Self {
            axis: StripeAxis::Horizontal,
            lane_size,
            lane_gap,
            start_offset: 0.0,
        }
    }

    pub fn with_start_offset(mut self, offset: f64) -> Self {
        self.start_offset = offset;
        self
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        if !(self.lane_size > 0.0 && self.lane_size.is_finite()) {
            return Err(GeometryError::LaneSize(self.lane_size));
        }
        if !(self.lane_gap >= 0.0 && self.lane_gap.is_finite()) {
            return Err(GeometryError::LaneGap(self.lane_gap));
        }
        if !self.start_offset.is_finite() {
            return Err(GeometryError::StartOffset(self.start_offset));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("lane size must be positive and finite, got {0}")]
    LaneSize(f64),
    #[error("lane gap must be non-negative and finite, got {0}")]
    LaneGap(f64),
    #[error("start offset must be finite, got {0}")]
    StartOffset(f64),
}

/// Per-frame lane box allocation, recomputed from lane count and the frame's
/// available area.
#[derive(Debug, Clone, PartialEq)]
pub struct StripeLayout {
    boxes: Vec<Rect>,
}

impl StripeLayout {
    pub fn compute(geometry: &StripeGeometry, lane_count: usize, area: Rect) -> Self {
        let mut boxes = Vec::with_capacity(lane_count);
        for index in 0..lane_count {
            let offset =
                geometry.start_offset + index as f64 * (geometry.lane_size + geometry.lane_gap);
            let rect = match geometry.axis {
                StripeAxis::Vertical => {
                    Rect::new(area.x, area.y + offset, area.w, geometry.lane_size)
                }
                StripeAxis::Horizontal => {
                    Rect::new(area.x + offset, area.y, geometry.lane_size, area.h)
                }
            };
            boxes.push(rect);
        }
        Self { boxes }
    }

    pub fn lane(&self, index: usize) -> Option<Rect> {
        self.boxes.get(index).copied()
    }

    pub fn lane_count(&self) -> usize {
        self.boxes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_stack_downward_with_gap() {
        let layout = StripeLayout::compute(
            &StripeGeometry::rows(20.0, 4.0),
            3,
            Rect::new(0.0, 10.0, 800.0, 600.0),
        );
        assert_eq!(layout.lane_count(), 3);
        let first = layout.lane(0).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        let second = layout.lane(1).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(first.y, 10.0);
        assert_eq!(first.h, 20.0);
        assert_eq!(first.w, 800.0);
        assert_eq!(second.y, 34.0);
        assert!(layout.lane(3).is_none());
    }

    #[test]
    fn columns_stack_rightward() {
        let layout = StripeLayout::compute(
            &StripeGeometry::columns(30.0, 2.0).with_start_offset(8.0),
            2,
            Rect::new(0.0, 0.0, 800.0, 600.0),
        );
        let first = layout.lane(0).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        let second = layout.lane(1).unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(first.x, 8.0);
        assert_eq!(first.w, 30.0);
        assert_eq!(first.h, 600.0);
        assert_eq!(second.x, 40.0);
    }

    #[test]
    fn geometry_validation() {
        assert!(StripeGeometry::rows(20.0, 0.0).validate().is_ok());
        assert_eq!(
            StripeGeometry::rows(0.0, 0.0).validate(),
            Err(GeometryError::LaneSize(0.0))
        );
        assert_eq!(
            StripeGeometry::rows(20.0, -1.0).validate(),
            Err(GeometryError::LaneGap(-1.0))
        );
        assert!(
            StripeGeometry::rows(20.0, 0.0)
                .with_start_offset(f64::NAN)
                .validate()
                .is_err()
        );
    }
}
