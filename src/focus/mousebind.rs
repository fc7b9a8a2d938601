// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Mouse bindings: a table keyed by `(context, button,
//! modifiers)`, plus the press/drag/release capture state machine that
//! decides when a `move` binding fires versus a `click` binding.

use std::collections::HashMap;

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Desktop,
    Window,
    WindowBorder,
    Titlebar,
    LeftGrip,
    RightGrip,
    Tab,
    Toolbar,
    Slit,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindEvent {
    Click,
    Move,
    Press,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseBindingKey {
    pub context: Context,
    pub button: u32,
    pub modifiers: u32,
}

#[derive(Debug, Default)]
pub struct MouseBindingTable {
    bindings: HashMap<(MouseBindingKey, BindEvent), u32>,
}

impl MouseBindingTable {
    pub fn new() -> Self {
        Self { bindings: HashMap::new() }
    }

    pub fn bind(&mut self, key: MouseBindingKey, event: BindEvent, action: u32) {
        self.bindings.insert((key, event), action);
    }

    /// Looks up `(context, button, modifiers)` directly, then falls
    /// back to the `Any` context: per-context tables share a catch-all.
    fn lookup(&self, context: Context, button: u32, modifiers: u32, event: BindEvent) -> Option<u32> {
        let direct = MouseBindingKey { context, button, modifiers };
        if let Some(&a) = self.bindings.get(&(direct, event)) {
            return Some(a);
        }
        if context != Context::Any {
            let any = MouseBindingKey { context: Context::Any, button, modifiers };
            return self.bindings.get(&(any, event)).copied();
        }
        None
    }
}

/// Manhattan distance used for the drag threshold, `DRAG_THRESHOLD = 4px`,
/// shared with [`crate::constants::DRAG_THRESHOLD_PX`].
fn manhattan(a: Point, b: Point) -> f64 {
    ((a.x - b.x).unsigned_abs() + (a.y - b.y).unsigned_abs()) as f64
}

#[derive(Debug, Clone, Copy)]
struct Capture {
    context: Context,
    button: u32,
    modifiers: u32,
    press_at: Point,
    move_fired: bool,
}

/// Per-seat press/drag/release bookkeeping ("Capture
/// semantics"). One instance serves a single pointer.
#[derive(Debug, Default)]
pub struct MouseBindState {
    capture: Option<Capture>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    NoBinding,
    PressFired(u32),
}

impl MouseBindState {
    pub fn new() -> Self {
        Self { capture: None }
    }

    /// Button press: runs any `press` binding immediately and remembers
    /// the location for drag-threshold detection.
    pub fn on_press(&mut self, table: &MouseBindingTable, context: Context, button: u32, modifiers: u32, at: Point) -> PressOutcome {
        self.capture = Some(Capture { context, button, modifiers, press_at: at, move_fired: false });
        match table.lookup(context, button, modifiers, BindEvent::Press) {
            Some(action) => PressOutcome::PressFired(action),
            None => PressOutcome::NoBinding,
        }
    }

    /// Motion while captured: fires the `move` binding once the
    /// Manhattan distance from the press point exceeds the threshold.
    /// Returns the action id the first time this fires for the current
    /// capture; `None` otherwise (already fired, or no capture, or
    /// below threshold).
    pub fn on_motion(&mut self, table: &MouseBindingTable, at: Point) -> Option<u32> {
        let capture = self.capture.as_mut()?;
        if capture.move_fired {
            return None;
        }
        if manhattan(capture.press_at, at) <= crate::constants::DRAG_THRESHOLD_PX {
            return None;
        }
        capture.move_fired = true;
        table.lookup(capture.context, capture.button, capture.modifiers, BindEvent::Move)
    }

    /// Release: fires the `click` binding only if no drag happened,
    /// then always clears the capture.
    pub fn on_release(&mut self, table: &MouseBindingTable, button: u32) -> Option<u32> {
        let capture = self.capture.take()?;
        if capture.button != button || capture.move_fired {
            return None;
        }
        table.lookup(capture.context, capture.button, capture.modifiers, BindEvent::Click)
    }

    /// Grab start clears the capture immediately ("cleared on
    /// grab start and on release").
    pub fn clear(&mut self) {
        self.capture = None;
    }

    pub fn press_anchor(&self) -> Option<Point> {
        self.capture.map(|c| c.press_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(context: Context) -> MouseBindingKey {
        MouseBindingKey { context, button: 1, modifiers: 0 }
    }

    #[test]
    fn click_fires_without_drag() {
        let mut table = MouseBindingTable::new();
        table.bind(key(Context::Titlebar), BindEvent::Click, 10);
        let mut state = MouseBindState::new();
        state.on_press(&table, Context::Titlebar, 1, 0, Point::new(0, 0));
        assert_eq!(state.on_release(&table, 1), Some(10));
    }

    #[test]
    fn drag_past_threshold_fires_move_not_click() {
        let mut table = MouseBindingTable::new();
        table.bind(key(Context::Titlebar), BindEvent::Move, 20);
        table.bind(key(Context::Titlebar), BindEvent::Click, 10);
        let mut state = MouseBindState::new();
        state.on_press(&table, Context::Titlebar, 1, 0, Point::new(0, 0));
        assert_eq!(state.on_motion(&table, Point::new(2, 2)), None); // below threshold (manhattan=4, not >)
        assert_eq!(state.on_motion(&table, Point::new(3, 3)), Some(20));
        // Already fired; further motion is a no-op.
        assert_eq!(state.on_motion(&table, Point::new(10, 10)), None);
        assert_eq!(state.on_release(&table, 1), None);
    }

    #[test]
    fn press_binding_fires_immediately() {
        let mut table = MouseBindingTable::new();
        table.bind(key(Context::Desktop), BindEvent::Press, 5);
        let mut state = MouseBindState::new();
        assert_eq!(state.on_press(&table, Context::Desktop, 1, 0, Point::new(0, 0)), PressOutcome::PressFired(5));
    }

    #[test]
    fn any_context_is_fallback() {
        let mut table = MouseBindingTable::new();
        table.bind(MouseBindingKey { context: Context::Any, button: 2, modifiers: 0 }, BindEvent::Click, 99);
        let mut state = MouseBindState::new();
        state.on_press(&table, Context::Slit, 2, 0, Point::new(0, 0));
        assert_eq!(state.on_release(&table, 2), Some(99));
    }

    #[test]
    fn clear_drops_capture() {
        let mut table = MouseBindingTable::new();
        table.bind(key(Context::Window), BindEvent::Click, 1);
        let mut state = MouseBindState::new();
        state.on_press(&table, Context::Window, 1, 0, Point::new(0, 0));
        state.clear();
        assert_eq!(state.on_release(&table, 1), None);
    }
}
