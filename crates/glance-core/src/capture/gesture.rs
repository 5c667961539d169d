//! Pointer-drag selection state machine.

use super::geometry::{Point, Region};

/// Pointer input fed to the gesture by the host page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(Point),
    Move(Point),
    Release(Point),
}

/// Result of feeding one pointer event to the gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureChange {
    /// The event was ignored in the current state.
    None,
    /// The selection box appeared or moved; redraw it with these bounds.
    BoxUpdated(Region),
    /// The drag finished; the box is gone and this region should be captured.
    Finished(Region),
}

/// One in-flight drag: the anchor from the press and the latest pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    anchor: Point,
    current: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Idle,
    Selecting { drag: Option<Drag> },
}

/// Per-page-context selection gesture.
///
/// Two states: **Idle** and **Selecting**. A begin-capture signal arms the
/// gesture; the first press anchors the selection box, moves resize it as
/// the bounding box of anchor and pointer, and the release finalizes the
/// region and returns the gesture to Idle. At most one selection is active
/// per page context, and an in-flight gesture must resolve before a new
/// one starts.
///
/// Each pointer update is O(1) and queues no work; only the final
/// rectangle at release matters for the captured region.
#[derive(Debug)]
pub struct SelectionGesture {
    state: State,
}

impl SelectionGesture {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    /// True while a begin-capture signal is being serviced.
    pub fn is_selecting(&self) -> bool {
        matches!(self.state, State::Selecting { .. })
    }

    /// Current selection box bounds, if a drag is in progress.
    pub fn selection_box(&self) -> Option<Region> {
        match self.state {
            State::Selecting { drag: Some(d) } => Some(Region::bounding(d.anchor, d.current)),
            _ => None,
        }
    }

    /// Arms the gesture for one selection.
    ///
    /// Policy: a begin signal that arrives while a selection is already in
    /// progress is ignored; the in-flight gesture must resolve first.
    /// Returns whether the signal was accepted.
    pub fn begin(&mut self) -> bool {
        match self.state {
            State::Idle => {
                self.state = State::Selecting { drag: None };
                true
            }
            State::Selecting { .. } => false,
        }
    }

    /// Feeds one pointer event to the gesture.
    ///
    /// A release finalizes the region as the bounding box of the press and
    /// release points alone; intermediate moves never affect it. Degenerate
    /// (zero-sized) drags are clamped to a 1x1 region. A move or release
    /// with no preceding press is ignored.
    pub fn pointer(&mut self, event: PointerEvent) -> GestureChange {
        let State::Selecting { drag } = &mut self.state else {
            return GestureChange::None;
        };

        match (event, drag.as_mut()) {
            (PointerEvent::Press(point), None) => {
                *drag = Some(Drag {
                    anchor: point,
                    current: point,
                });
                GestureChange::BoxUpdated(Region::bounding(point, point))
            }
            (PointerEvent::Move(point), Some(d)) => {
                d.current = point;
                GestureChange::BoxUpdated(Region::bounding(d.anchor, point))
            }
            (PointerEvent::Release(point), Some(d)) => {
                let region = Region::bounding(d.anchor, point).clamp_to_minimum();
                self.state = State::Idle;
                GestureChange::Finished(region)
            }
            _ => GestureChange::None,
        }
    }

    /// Abandons any in-flight gesture and clears the selection box.
    ///
    /// This is the page-teardown path: an unreleased gesture must leave no
    /// overlay artifact behind.
    pub fn cancel(&mut self) {
        self.state = State::Idle;
    }
}

impl Default for SelectionGesture {
    fn default() -> Self {
        Self::new()
    }
}
