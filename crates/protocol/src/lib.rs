pub mod canvas;
pub mod shared_str;
pub mod theme;
pub mod types;

pub use canvas::{Canvas, RecordingCanvas, RenderCommand, TextAlign};
pub use shared_str::SharedStr;
pub use theme::ThemeToken;
pub use types::{Point, Rect, TimeRange, TimeScale, Viewport};
