use serde::{Deserialize, Serialize};

use crate::shared_str::SharedStr;
use crate::theme::ThemeToken;
use crate::types::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// The graphics-context capability layers and painters draw through.
///
/// The concrete primitive set lives behind this trait; the engine only relies
/// on `save`/`restore` pairing so that one layer's clip/transform mutations
/// never leak into the next. Implementations must treat `restore` without a
/// matching `save` as a programmer error.
pub trait Canvas {
    /// Push the current clip/transform state.
    fn save(&mut self);
    /// Pop back to the most recently saved state.
    fn restore(&mut self);

    /// Restrict subsequent drawing to `rect` until the enclosing `restore`.
    fn clip_rect(&mut self, rect: Rect);
    /// Translate the coordinate origin until the enclosing `restore`.
    fn translate(&mut self, dx: f64, dy: f64);

    fn fill_rect(&mut self, rect: Rect, color: ThemeToken);
    fn line(&mut self, from: Point, to: Point, color: ThemeToken, width: f64);
    fn text(&mut self, position: Point, text: SharedStr, color: ThemeToken, font_size: f64, align: TextAlign);
}

/// A single, stateless render instruction.
///
/// `RecordingCanvas` emits a `Vec<RenderCommand>` per frame. Renderers consume
/// the list sequentially — each command carries all the data it needs, and the
/// whole list serializes for replay or snapshot comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Push the clip/transform state (emitted by `Canvas::save`).
    Save,
    /// Pop to the matching `Save`.
    Restore,

    /// Restrict subsequent drawing to a rectangular region.
    ClipRect { rect: Rect },

    /// Translate the coordinate origin for subsequent commands.
    Translate { dx: f64, dy: f64 },

    /// Draw a filled rectangle.
    FillRect { rect: Rect, color: ThemeToken },

    /// Draw a line segment.
    Line {
        from: Point,
        to: Point,
        color: ThemeToken,
        width: f64,
    },

    /// Draw a text string at a position.
    Text {
        position: Point,
        text: SharedStr,
        color: ThemeToken,
        font_size: f64,
        align: TextAlign,
    },
}

/// `Canvas` implementation that records the command stream.
///
/// This is the reference graphics context: interactive shells replay the
/// recorded list against their toolkit, tests assert on it directly.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    commands: Vec<RenderCommand>,
    saved: usize,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Current save-stack depth; zero between frames.
    pub fn depth(&self) -> usize {
        self.saved
    }

    /// Hand out the recorded frame, leaving the canvas empty for the next one.
    pub fn take(&mut self) -> Vec<RenderCommand> {
        assert_eq!(self.saved, 0, "take() inside an unbalanced save scope");
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.saved += 1;
        self.commands.push(RenderCommand::Save);
    }

    fn restore(&mut self) {
        assert!(self.saved > 0, "restore without a matching save");
        self.saved -= 1;
        self.commands.push(RenderCommand::Restore);
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.commands.push(RenderCommand::ClipRect { rect });
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.commands.push(RenderCommand::Translate { dx, dy });
    }

    fn fill_rect(&mut self, rect: Rect, color: ThemeToken) {
        self.commands.push(RenderCommand::FillRect { rect, color });
    }

    fn line(&mut self, from: Point, to: Point, color: ThemeToken, width: f64) {
        self.commands.push(RenderCommand::Line {
            from,
            to,
            color,
            width,
        });
    }

    fn text(&mut self, position: Point, text: SharedStr, color: ThemeToken, font_size: f64, align: TextAlign) {
        self.commands.push(RenderCommand::Text {
            position,
            text,
            color,
            font_size,
            align,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_primitives_in_order() {
        let mut canvas = RecordingCanvas::new();
        canvas.save();
        canvas.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), ThemeToken::LaneBackground);
        canvas.line(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            ThemeToken::BandLine,
            1.0,
        );
        canvas.restore();

        let cmds = canvas.take();
        assert_eq!(cmds.len(), 4);
        assert!(matches!(cmds[0], RenderCommand::Save));
        assert!(matches!(cmds[1], RenderCommand::FillRect { .. }));
        assert!(matches!(cmds[2], RenderCommand::Line { .. }));
        assert!(matches!(cmds[3], RenderCommand::Restore));
    }

    #[test]
    fn tracks_save_depth() {
        let mut canvas = RecordingCanvas::new();
        canvas.save();
        canvas.save();
        assert_eq!(canvas.depth(), 2);
        canvas.restore();
        canvas.restore();
        assert_eq!(canvas.depth(), 0);
    }

    #[test]
    #[should_panic(expected = "restore without a matching save")]
    fn unbalanced_restore_panics() {
        let mut canvas = RecordingCanvas::new();
        canvas.restore();
    }

    #[test]
    fn command_stream_serializes() {
        let mut canvas = RecordingCanvas::new();
        canvas.save();
        canvas.text(
            Point::new(4.0, 12.0),
            SharedStr::from("lane"),
            ThemeToken::LaneLabel,
            10.0,
            TextAlign::Left,
        );
        canvas.restore();

        let json = serde_json::to_string(canvas.commands()).unwrap_or_default();
        assert!(json.contains("\"Save\""));
        assert!(json.contains("lane"));
        let back: Vec<RenderCommand> = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(back.len(), 3);
    }
}
