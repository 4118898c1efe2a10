use stria_protocol::{Point, SharedStr};

/// What a handler did with an event. Dispatch stops at the first `Consumed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum EventOutcome {
    Consumed,
    Ignored,
}

impl EventOutcome {
    pub fn is_consumed(self) -> bool {
        self == EventOutcome::Consumed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Move,
    Down,
    Up,
    Click,
    DoubleClick,
    Drag,
    Wheel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Point,
    /// Movement since the previous event; meaningful for `Move` and `Drag`.
    pub delta: Point,
    /// Scroll amount; meaningful for `Wheel`. Positive scrolls away from the
    /// user.
    pub scroll: f64,
}

impl PointerEvent {
    fn at(kind: PointerKind, position: Point) -> Self {
        Self {
            kind,
            position,
            delta: Point::new(0.0, 0.0),
            scroll: 0.0,
        }
    }

    pub fn moved(position: Point) -> Self {
        Self::at(PointerKind::Move, position)
    }

    pub fn down(position: Point) -> Self {
        Self::at(PointerKind::Down, position)
    }

    pub fn up(position: Point) -> Self {
        Self::at(PointerKind::Up, position)
    }

    pub fn click(position: Point) -> Self {
        Self::at(PointerKind::Click, position)
    }

    pub fn double_click(position: Point) -> Self {
        Self::at(PointerKind::DoubleClick, position)
    }

    pub fn drag(position: Point, delta: Point) -> Self {
        Self {
            delta,
            ..Self::at(PointerKind::Drag, position)
        }
    }

    pub fn wheel(position: Point, scroll: f64) -> Self {
        Self {
            scroll,
            ..Self::at(PointerKind::Wheel, position)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Down,
    Up,
    /// A typed character, after layout/IME resolution.
    Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub kind: KeyKind,
    /// Symbolic key name ("ArrowLeft", "a", "Escape", ...).
    pub symbol: SharedStr,
}

impl KeyEvent {
    pub fn new(kind: KeyKind, symbol: impl Into<SharedStr>) -> Self {
        Self {
            kind,
            symbol: symbol.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    /// Stable identifier of the touch point across its phases.
    pub id: u64,
    pub position: Point,
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, id: u64, position: Point) -> Self {
        Self {
            phase,
            id,
            position,
        }
    }
}

/// One input occurrence routed through the layer stack.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
    Touch(TouchEvent),
}
