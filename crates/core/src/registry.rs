use std::rc::Rc;

use tracing::debug;

use stria_protocol::Canvas;

use crate::frame::FrameContext;
use crate::input::{EventOutcome, InputEvent};
use crate::layer::{DisposeHooks, Layer, LayerKind, SharedLayer};

/// Longest wrapper chain anchor resolution will follow. Deeper chains mean a
/// delegate cycle.
const MAX_DELEGATE_DEPTH: usize = 8;

/// Owns the ordered set of layers and drives the per-frame cycle.
///
/// Two parallel orderings over the same layers: paint order (back to front)
/// and layout order. They hold the same multiset at all times; the split
/// exists so a layer can compute early but draw late, or vice versa.
#[derive(Default)]
pub struct LayerRegistry {
    paint_order: Vec<SharedLayer>,
    layout_order: Vec<SharedLayer>,
    attachments: Vec<Attachment>,
}

struct Attachment {
    layer: SharedLayer,
    hooks: DisposeHooks,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.paint_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paint_order.is_empty()
    }

    /// Layers in paint order, back to front.
    pub fn layers(&self) -> impl Iterator<Item = &SharedLayer> {
        self.paint_order.iter()
    }

    /// Add `layer` at its type-priority slot: one past the last layer whose
    /// kind is the same or below. Groups layers by kind without disturbing
    /// relative order within a group. Returns the insertion index.
    pub fn add_layer(&mut self, layer: SharedLayer) -> usize {
        let kind = layer.borrow().kind();
        let index = priority_index(&self.paint_order, kind);
        self.paint_order.insert(index, layer.clone());
        self.layout_order.insert(index, layer.clone());
        self.attach(layer, index, kind);
        index
    }

    /// Explicit placement; bypasses the type-priority guarantee. Used to pin
    /// a layer against another one regardless of kinds.
    pub fn add_layer_at(&mut self, layer: SharedLayer, paint_index: usize, layout_index: usize) {
        self.paint_order.insert(paint_index, layer.clone());
        self.layout_order.insert(layout_index, layer.clone());
        let kind = layer.borrow().kind();
        self.attach(layer, paint_index, kind);
    }

    /// Insert directly below `anchor` in both orderings. The anchor may be a
    /// registered layer or one wrapped by a registered delegator chain;
    /// an unknown anchor is a wiring bug and fails fast.
    pub fn add_layer_below(&mut self, layer: SharedLayer, anchor: &SharedLayer) {
        let paint_index = anchor_index(&self.paint_order, anchor);
        let layout_index = anchor_index(&self.layout_order, anchor);
        self.add_layer_at(layer, paint_index, layout_index);
    }

    /// Insert directly above `anchor` in both orderings.
    pub fn add_layer_above(&mut self, layer: SharedLayer, anchor: &SharedLayer) {
        let paint_index = anchor_index(&self.paint_order, anchor) + 1;
        let layout_index = anchor_index(&self.layout_order, anchor) + 1;
        self.add_layer_at(layer, paint_index, layout_index);
    }

    /// Remove `layer` from both orderings, running its dispose hooks exactly
    /// once. Returns false when the layer is not registered.
    pub fn remove_layer(&mut self, layer: &SharedLayer) -> bool {
        let Some(paint_index) = self.paint_order.iter().position(|l| Rc::ptr_eq(l, layer)) else {
            return false;
        };
        self.paint_order.remove(paint_index);
        if let Some(layout_index) = self.layout_order.iter().position(|l| Rc::ptr_eq(l, layer)) {
            self.layout_order.remove(layout_index);
        }
        if let Some(slot) = self.attachments.iter().position(|a| Rc::ptr_eq(&a.layer, layer)) {
            let mut attachment = self.attachments.remove(slot);
            attachment.hooks.run();
        }
        debug!("layer removed");
        true
    }

    /// Remove every layer matching `predicate`; returns them in paint order.
    pub fn remove_where(&mut self, predicate: impl Fn(&dyn Layer) -> bool) -> Vec<SharedLayer> {
        let matching: Vec<SharedLayer> = self
            .paint_order
            .iter()
            .filter(|l| predicate(&*l.borrow()))
            .cloned()
            .collect();
        for layer in &matching {
            self.remove_layer(layer);
        }
        matching
    }

    /// Remove then reinsert at the type-priority slot, making `layer` the
    /// topmost of its kind group.
    pub fn to_top(&mut self, layer: &SharedLayer) {
        self.take_from_orders(layer);
        let kind = layer.borrow().kind();
        let index = priority_index(&self.paint_order, kind);
        self.paint_order.insert(index, layer.clone());
        self.layout_order.insert(index, layer.clone());
    }

    /// Remove then reinsert at absolute index 0 in both orderings, regardless
    /// of kind. The caller vouches for the ordering expectations this skips.
    pub fn to_bottom(&mut self, layer: &SharedLayer) {
        self.take_from_orders(layer);
        self.paint_order.insert(0, layer.clone());
        self.layout_order.insert(0, layer.clone());
    }

    /// Run one frame: every layer's `layout` completes, across the whole
    /// registry, before any layer's `paint` begins. Each call runs inside its
    /// own canvas save/restore scope; the guard restores on unwind too, so a
    /// panicking layer cannot leak clip or transform state.
    pub fn paint_layers(&mut self, ctx: &FrameContext, canvas: &mut dyn Canvas) {
        debug_assert_eq!(self.paint_order.len(), self.layout_order.len());

        for layer in &self.layout_order {
            let mut scope = CanvasScope::open(&mut *canvas);
            layer.borrow_mut().layout(ctx, &mut *scope.canvas);
        }
        for layer in &self.paint_order {
            let mut scope = CanvasScope::open(&mut *canvas);
            layer.borrow().paint(ctx, &mut *scope.canvas);
        }
    }

    /// Offer `event` to each layer, visually topmost first, stopping at the
    /// first one that consumes it.
    pub fn dispatch(&mut self, event: &InputEvent) -> EventOutcome {
        for layer in self.paint_order.iter().rev() {
            let outcome = {
                let mut layer = layer.borrow_mut();
                match event {
                    InputEvent::Pointer(ev) => layer.on_pointer(ev),
                    InputEvent::Key(ev) => layer.on_key(ev),
                    InputEvent::Touch(ev) => layer.on_touch(ev),
                }
            };
            if outcome.is_consumed() {
                return EventOutcome::Consumed;
            }
        }
        EventOutcome::Ignored
    }

    fn attach(&mut self, layer: SharedLayer, index: usize, kind: LayerKind) {
        let mut hooks = DisposeHooks::new();
        layer.borrow_mut().attach(&mut hooks);
        self.attachments.push(Attachment { layer, hooks });
        debug!(index, ?kind, "layer added");
    }

    fn take_from_orders(&mut self, layer: &SharedLayer) {
        let paint_index = self
            .paint_order
            .iter()
            .position(|l| Rc::ptr_eq(l, layer))
            .unwrap_or_else(|| panic!("layer to reorder is not registered"));
        self.paint_order.remove(paint_index);
        let layout_index = self
            .layout_order
            .iter()
            .position(|l| Rc::ptr_eq(l, layer))
            .unwrap_or_else(|| panic!("layer to reorder is not registered"));
        self.layout_order.remove(layout_index);
    }
}

impl Drop for LayerRegistry {
    fn drop(&mut self) {
        // Teardown counts as removal: hooks of still-registered layers run here.
        for attachment in &mut self.attachments {
            attachment.hooks.run();
        }
    }
}

fn priority_index(order: &[SharedLayer], kind: LayerKind) -> usize {
    order
        .iter()
        .rposition(|l| l.borrow().kind() <= kind)
        .map_or(0, |i| i + 1)
}

fn anchor_index(order: &[SharedLayer], anchor: &SharedLayer) -> usize {
    order
        .iter()
        .position(|candidate| resolves_to(candidate, anchor))
        .unwrap_or_else(|| panic!("anchor layer not found in registry"))
}

/// Whether `candidate` is `anchor` or wraps it through the delegate chain.
fn resolves_to(candidate: &SharedLayer, anchor: &SharedLayer) -> bool {
    let mut current = candidate.clone();
    for _ in 0..=MAX_DELEGATE_DEPTH {
        if Rc::ptr_eq(&current, anchor) {
            return true;
        }
        let next = current.borrow().delegate();
        match next {
            Some(next) => current = next,
            None => return false,
        }
    }
    panic!("delegate chain exceeds {MAX_DELEGATE_DEPTH} levels; cycle?");
}

/// Canvas save scope that restores on drop, unwind included.
struct CanvasScope<'a> {
    canvas: &'a mut dyn Canvas,
}

impl<'a> CanvasScope<'a> {
    fn open(canvas: &'a mut dyn Canvas) -> Self {
        canvas.save();
        Self { canvas }
    }
}

impl Drop for CanvasScope<'_> {
    fn drop(&mut self) {
        self.canvas.restore();
    }
}
