use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }
}

/// The drawable area handed to a frame, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl Viewport {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// A half-open window on the time axis, `[start, end)`.
///
/// Timestamps are milliseconds throughout; the unit only matters to the
/// history storage feeding the charts, everything here is unit-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }

    pub fn overlaps(&self, other: TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Linear mapping from timestamps to window X coordinates.
///
/// Every view used to recompute `(t - view_start) * width / duration` by
/// hand; this pins the arithmetic down in one place, together with the
/// inverse used for cursor hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    origin: f64,
    px_per_unit: f64,
}

impl TimeScale {
    /// Scale mapping `visible` onto `[0, width)`.
    ///
    /// A non-positive visible duration produces a degenerate scale; callers
    /// skip rendering for such windows before constructing one.
    pub fn new(visible: TimeRange, width: f64) -> Self {
        Self {
            origin: visible.start,
            px_per_unit: width / visible.duration(),
        }
    }

    pub fn to_x(&self, t: f64) -> f64 {
        (t - self.origin) * self.px_per_unit
    }

    pub fn to_time(&self, x: f64) -> f64 {
        self.origin + x / self.px_per_unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_center_and_contains() {
        let r = Rect::new(10.0, 20.0, 100.0, 40.0);
        let c = r.center();
        assert_eq!(c.x, 60.0);
        assert_eq!(c.y, 40.0);
        assert!(r.contains(c));
        assert!(!r.contains(Point::new(9.9, 25.0)));
        assert!(!r.contains(Point::new(110.0, 25.0))); // right edge is exclusive
    }

    #[test]
    fn time_range_half_open() {
        let r = TimeRange::new(100.0, 200.0);
        assert_eq!(r.duration(), 100.0);
        assert!(r.contains(100.0));
        assert!(!r.contains(200.0));
        assert!(r.overlaps(TimeRange::new(150.0, 300.0)));
        assert!(!r.overlaps(TimeRange::new(200.0, 300.0)));
    }

    #[test]
    fn time_scale_round_trip() {
        let scale = TimeScale::new(TimeRange::new(1_000.0, 2_000.0), 800.0);
        assert_eq!(scale.to_x(1_000.0), 0.0);
        assert_eq!(scale.to_x(2_000.0), 800.0);
        assert_eq!(scale.to_x(1_500.0), 400.0);
        assert!((scale.to_time(400.0) - 1_500.0).abs() < 1e-9);
    }
}
