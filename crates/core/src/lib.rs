//! Layered, frame-based rendering core for continuously-updating charts.
//!
//! A [`registry::LayerRegistry`] owns an ordered set of [`layer::Layer`]s and
//! drives a strict two-phase cycle per frame: every layer's `layout` runs,
//! across the whole registry, before any layer's `paint` — so later-painted
//! layers can rely on layout results regardless of paint order. Input events
//! route through the same registry, visually topmost layer first, stopping at
//! the first consumer.
//!
//! The [`stripe`] module is the heaviest consumer: it reconstructs per-series
//! visual segments from bucketed history samples with gap splitting, viewport
//! clipping, and hover tracking, through a single traversal engine
//! parameterized over value extraction and painting.
//!
//! Drawing goes through the opaque graphics-context capability in
//! `stria-protocol`; history data arrives through the
//! [`history::HistoryStorage`] capability, which answers synchronously and
//! never blocks a frame.

pub mod frame;
pub mod history;
pub mod input;
pub mod layer;
pub mod registry;
pub mod scene;
pub mod stripe;
pub mod wrap;

pub use frame::{
    ActiveSampleInfo, Calculated, FrameContext, FrameProps, MissingResource, MissingResources,
    MAX_SAMPLE_VALUES,
};
pub use history::{HistoryBucket, HistoryStorage, MemoryHistory, SampleCell};
pub use input::{
    EventOutcome, InputEvent, KeyEvent, KeyKind, PointerEvent, PointerKind, TouchEvent, TouchPhase,
};
pub use layer::{shared, DisposeHooks, Layer, LayerKind, SharedLayer};
pub use registry::LayerRegistry;
pub use scene::{FrameReport, Scene, TimeWindowLayer};
pub use wrap::{ForwardLayer, ToggleLayer};
