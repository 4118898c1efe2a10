use std::cell::RefCell;
use std::rc::Rc;

use stria_protocol::Canvas;

use crate::frame::FrameContext;
use crate::input::{EventOutcome, KeyEvent, PointerEvent, TouchEvent};

/// Default z-slot of a layer. The registry groups layers by kind, in this
/// order, back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerKind {
    /// Publishes shared per-frame properties; paints nothing itself.
    Calculations,
    Background,
    Content,
    Notification,
}

/// How layers are held: single ownership by the registry, shared handles for
/// callers that need to anchor, remove, or mutate a layer later.
pub type SharedLayer = Rc<RefCell<dyn Layer>>;

/// Wrap a layer for registry insertion.
pub fn shared(layer: impl Layer + 'static) -> SharedLayer {
    Rc::new(RefCell::new(layer))
}

/// Cleanup hooks a layer registers while attaching.
///
/// The registry runs them exactly once when the layer leaves, on every
/// removal path including registry teardown.
#[derive(Default)]
pub struct DisposeHooks {
    hooks: Vec<Box<dyn FnOnce()>>,
}

impl DisposeHooks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn on_remove(&mut self, hook: impl FnOnce() + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub(crate) fn run(&mut self) {
        for hook in self.hooks.drain(..) {
            hook();
        }
    }
}

impl std::fmt::Debug for DisposeHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisposeHooks")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// The unit-of-work contract of the rendering pipeline.
///
/// Per frame every layer first receives `layout` (in layout order), and only
/// after the whole registry finished laying out, `paint` (in paint order).
/// `layout` computes and may store [`crate::frame::Calculated`] snapshots;
/// `paint` takes `&self` and therefore cannot touch them — the read-only
/// contract is in the signature, not in a convention.
pub trait Layer {
    fn kind(&self) -> LayerKind;

    /// Runs exactly once, when the layer joins a registry. The only place
    /// dispose hooks can be registered.
    fn attach(&mut self, hooks: &mut DisposeHooks) {
        let _ = hooks;
    }

    fn layout(&mut self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        let _ = (ctx, canvas);
    }

    fn paint(&self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        let _ = (ctx, canvas);
    }

    fn on_pointer(&mut self, event: &PointerEvent) -> EventOutcome {
        let _ = event;
        EventOutcome::Ignored
    }

    fn on_key(&mut self, event: &KeyEvent) -> EventOutcome {
        let _ = event;
        EventOutcome::Ignored
    }

    fn on_touch(&mut self, event: &TouchEvent) -> EventOutcome {
        let _ = event;
        EventOutcome::Ignored
    }

    /// The layer this one wraps, if any. Anchor resolution follows the chain
    /// so callers can anchor against a layer that later got wrapped.
    fn delegate(&self) -> Option<SharedLayer> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn kinds_order_back_to_front() {
        assert!(LayerKind::Calculations < LayerKind::Background);
        assert!(LayerKind::Background < LayerKind::Content);
        assert!(LayerKind::Content < LayerKind::Notification);
    }

    #[test]
    fn dispose_hooks_run_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut hooks = DisposeHooks::new();
        for label in ["first", "second"] {
            let order = order.clone();
            hooks.on_remove(move || order.borrow_mut().push(label));
        }
        hooks.run();
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn dispose_hooks_run_is_idempotent() {
        let count = Rc::new(Cell::new(0));
        let mut hooks = DisposeHooks::new();
        let c = count.clone();
        hooks.on_remove(move || c.set(c.get() + 1));
        hooks.run();
        hooks.run();
        assert_eq!(count.get(), 1);
    }
}
