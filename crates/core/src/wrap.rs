use stria_protocol::Canvas;

use crate::frame::FrameContext;
use crate::input::{EventOutcome, KeyEvent, PointerEvent, TouchEvent};
use crate::layer::{DisposeHooks, Layer, LayerKind, SharedLayer};

/// Pass-through delegator: forwards the full lifecycle and all three handler
/// slots to the wrapped layer. Building block for wrappers that override a
/// single hook.
pub struct ForwardLayer {
    inner: SharedLayer,
}

impl ForwardLayer {
    pub fn new(inner: SharedLayer) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &SharedLayer {
        &self.inner
    }
}

impl Layer for ForwardLayer {
    fn kind(&self) -> LayerKind {
        self.inner.borrow().kind()
    }

    fn attach(&mut self, hooks: &mut DisposeHooks) {
        self.inner.borrow_mut().attach(hooks);
    }

    fn layout(&mut self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        self.inner.borrow_mut().layout(ctx, canvas);
    }

    fn paint(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        self.inner.borrow().paint(ctx, canvas);
    }

    fn on_pointer(&mut self, event: &PointerEvent) -> EventOutcome {
        self.inner.borrow_mut().on_pointer(event)
    }

    fn on_key(&mut self, event: &KeyEvent) -> EventOutcome {
        self.inner.borrow_mut().on_key(event)
    }

    fn on_touch(&mut self, event: &TouchEvent) -> EventOutcome {
        self.inner.borrow_mut().on_touch(event)
    }

    fn delegate(&self) -> Option<SharedLayer> {
        Some(self.inner.clone())
    }
}

/// Visibility-conditioned delegator.
///
/// While hidden it paints nothing and, unless `events_when_hidden` is set,
/// ignores every event without invoking the wrapped handler at all. Layout
/// still forwards so the wrapped layer's per-frame state stays warm.
pub struct ToggleLayer {
    inner: SharedLayer,
    visible: bool,
    events_when_hidden: bool,
}

impl ToggleLayer {
    pub fn new(inner: SharedLayer, visible: bool) -> Self {
        Self {
            inner,
            visible,
            events_when_hidden: false,
        }
    }

    pub fn with_events_when_hidden(mut self, enabled: bool) -> Self {
        self.events_when_hidden = enabled;
        self
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn handles_events(&self) -> bool {
        self.visible || self.events_when_hidden
    }
}

impl Layer for ToggleLayer {
    fn kind(&self) -> LayerKind {
        self.inner.borrow().kind()
    }

    fn attach(&mut self, hooks: &mut DisposeHooks) {
        self.inner.borrow_mut().attach(hooks);
    }

    fn layout(&mut self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        self.inner.borrow_mut().layout(ctx, canvas);
    }

    fn paint(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        if self.visible {
            self.inner.borrow().paint(ctx, canvas);
        }
    }

    fn on_pointer(&mut self, event: &PointerEvent) -> EventOutcome {
        if self.handles_events() {
            self.inner.borrow_mut().on_pointer(event)
        } else {
            EventOutcome::Ignored
        }
    }

    fn on_key(&mut self, event: &KeyEvent) -> EventOutcome {
        if self.handles_events() {
            self.inner.borrow_mut().on_key(event)
        } else {
            EventOutcome::Ignored
        }
    }

    fn on_touch(&mut self, event: &TouchEvent) -> EventOutcome {
        if self.handles_events() {
            self.inner.borrow_mut().on_touch(event)
        } else {
            EventOutcome::Ignored
        }
    }

    fn delegate(&self) -> Option<SharedLayer> {
        Some(self.inner.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::shared;
    use std::cell::Cell;
    use std::rc::Rc;
    use stria_protocol::{Point, Rect, RecordingCanvas, ThemeToken};

    struct Probe {
        pointer_calls: Rc<Cell<usize>>,
        consume: bool,
    }

    impl Probe {
        fn new(consume: bool) -> (Self, Rc<Cell<usize>>) {
            let calls = Rc::new(Cell::new(0));
            (
                Self {
                    pointer_calls: calls.clone(),
                    consume,
                },
                calls,
            )
        }
    }

    impl Layer for Probe {
        fn kind(&self) -> LayerKind {
            LayerKind::Content
        }

        fn paint(&self, _ctx: &FrameContext, canvas: &mut dyn Canvas) {
            canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), ThemeToken::LaneBackground);
        }

        fn on_pointer(&mut self, _event: &PointerEvent) -> EventOutcome {
            self.pointer_calls.set(self.pointer_calls.get() + 1);
            if self.consume {
                EventOutcome::Consumed
            } else {
                EventOutcome::Ignored
            }
        }
    }

    #[test]
    fn forward_layer_forwards_events_and_kind() {
        let (probe, calls) = Probe::new(true);
        let inner = shared(probe);
        let mut wrapper = ForwardLayer::new(inner);
        assert_eq!(wrapper.kind(), LayerKind::Content);
        let outcome = wrapper.on_pointer(&PointerEvent::click(Point::new(0.0, 0.0)));
        assert!(outcome.is_consumed());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn hidden_toggle_ignores_without_forwarding() {
        let (probe, calls) = Probe::new(true);
        let mut wrapper = ToggleLayer::new(shared(probe), false);
        let outcome = wrapper.on_pointer(&PointerEvent::click(Point::new(0.0, 0.0)));
        assert_eq!(outcome, EventOutcome::Ignored);
        assert_eq!(calls.get(), 0, "hidden wrapper must not invoke the wrapped handler");
    }

    #[test]
    fn hidden_toggle_with_events_enabled_forwards() {
        let (probe, calls) = Probe::new(true);
        let mut wrapper = ToggleLayer::new(shared(probe), false).with_events_when_hidden(true);
        let outcome = wrapper.on_pointer(&PointerEvent::click(Point::new(0.0, 0.0)));
        assert!(outcome.is_consumed());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn hidden_toggle_paints_nothing() {
        let (probe, _) = Probe::new(false);
        let mut wrapper = ToggleLayer::new(shared(probe), false);
        let ctx = FrameContext::new(0.0, 0.0, 1, 100.0, 100.0);
        let mut canvas = RecordingCanvas::new();
        Layer::paint(&wrapper, &ctx, &mut canvas);
        assert!(canvas.commands().is_empty());

        wrapper.set_visible(true);
        Layer::paint(&wrapper, &ctx, &mut canvas);
        assert_eq!(canvas.commands().len(), 1);
    }
}
