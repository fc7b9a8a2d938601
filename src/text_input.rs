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

//! The text-input ↔ input-method bridge. At most one
//! input method may be connected; at most one text-input is active at
//! a time. This module holds the bridging policy — event emission
//! against real Wayland resources happens in `server/mod.rs`.

use crate::arena_id;
use crate::view::ViewId;

arena_id!(TextInputId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentHint {
    pub content_type: bool,
    pub surrounding_text: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurroundingText {
    pub text: String,
    pub cursor: u32,
    pub anchor: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentType {
    pub hint: u32,
    pub purpose: u32,
}

/// What the active text-input advertised when it called `enable`; only
/// the features present here are sent onward ("only those
/// features the client advertised").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInputState {
    pub surrounding_text: Option<SurroundingText>,
    pub content_type: Option<ContentType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextInput {
    pub id: TextInputId,
    pub owner_client: u32,
    pub focused_surface: Option<ViewId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEvent {
    Enter { text_input: TextInputId },
    Leave { text_input: TextInputId },
}

/// Commit fields forwarded to the active text-input, falling back from
/// `current` to `pending` per-field ("read ... from current
/// falling back to pending").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitFields {
    pub delete_surrounding: Option<(u32, u32)>,
    pub preedit: Option<String>,
    pub commit_text: Option<String>,
}

pub fn resolve_commit(current: &CommitFields, pending: &CommitFields) -> CommitFields {
    CommitFields {
        delete_surrounding: current.delete_surrounding.or(pending.delete_surrounding),
        preedit: current.preedit.clone().or_else(|| pending.preedit.clone()),
        commit_text: current.commit_text.clone().or_else(|| pending.commit_text.clone()),
    }
}

#[derive(Debug, Default)]
pub struct TextInputBridge {
    text_inputs: Vec<TextInput>,
    active: Option<TextInputId>,
    input_method_connected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnableOutcome {
    /// A different text-input is already active; the new `enable` is
    /// ignored ("if already have an active and it's different,
    /// ignore the new one").
    Ignored,
    Activated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMethodConnectOutcome {
    Connected,
    Unavailable,
}

impl TextInputBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: TextInputId, owner_client: u32) {
        self.text_inputs.push(TextInput { id, owner_client, focused_surface: None });
    }

    pub fn active(&self) -> Option<TextInputId> {
        self.active
    }

    pub fn connect_input_method(&mut self) -> InputMethodConnectOutcome {
        if self.input_method_connected {
            return InputMethodConnectOutcome::Unavailable;
        }
        self.input_method_connected = true;
        InputMethodConnectOutcome::Connected
    }

    pub fn disconnect_input_method(&mut self) {
        self.input_method_connected = false;
    }

    /// Keyboard focus changed to `new_focus` (owned by `owner_client`
    /// when `Some`). Returns the enter/leave events to emit, and clears
    /// `active` if it was on a text-input that just lost focus.
    pub fn on_keyboard_focus_change(&mut self, new_focus: Option<ViewId>, owner_client: Option<u32>) -> Vec<FocusEvent> {
        let mut events = Vec::new();
        for ti in &mut self.text_inputs {
            let should_be_focused = new_focus.is_some() && Some(ti.owner_client) == owner_client;
            let was_focused = ti.focused_surface.is_some();
            if should_be_focused && ti.focused_surface != new_focus {
                ti.focused_surface = new_focus;
                events.push(FocusEvent::Enter { text_input: ti.id });
            } else if !should_be_focused && was_focused {
                ti.focused_surface = None;
                events.push(FocusEvent::Leave { text_input: ti.id });
                if self.active == Some(ti.id) {
                    self.active = None;
                }
            }
        }
        events
    }

    /// `enable` on `id` (second bullet).
    pub fn enable(&mut self, id: TextInputId) -> EnableOutcome {
        match self.active {
            Some(active) if active != id => EnableOutcome::Ignored,
            _ => {
                self.active = Some(id);
                EnableOutcome::Activated
            },
        }
    }

    pub fn disable(&mut self, id: TextInputId) {
        if self.active == Some(id) {
            self.active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ArenaId as _;

    fn tid(n: u64) -> TextInputId {
        TextInputId::from_raw(n)
    }

    fn vid(n: u64) -> ViewId {
        ViewId::from_raw(n)
    }

    #[test]
    fn focus_change_enters_and_leaves() {
        let mut bridge = TextInputBridge::new();
        bridge.register(tid(1), 42);
        let events = bridge.on_keyboard_focus_change(Some(vid(9)), Some(42));
        assert_eq!(events, vec![FocusEvent::Enter { text_input: tid(1) }]);

        let events = bridge.on_keyboard_focus_change(None, None);
        assert_eq!(events, vec![FocusEvent::Leave { text_input: tid(1) }]);
    }

    #[test]
    fn losing_focus_clears_active() {
        let mut bridge = TextInputBridge::new();
        bridge.register(tid(1), 42);
        bridge.on_keyboard_focus_change(Some(vid(9)), Some(42));
        bridge.enable(tid(1));
        assert_eq!(bridge.active(), Some(tid(1)));
        bridge.on_keyboard_focus_change(None, None);
        assert_eq!(bridge.active(), None);
    }

    #[test]
    fn enable_ignores_second_distinct_text_input() {
        let mut bridge = TextInputBridge::new();
        bridge.register(tid(1), 1);
        bridge.register(tid(2), 2);
        assert_eq!(bridge.enable(tid(1)), EnableOutcome::Activated);
        assert_eq!(bridge.enable(tid(2)), EnableOutcome::Ignored);
        assert_eq!(bridge.active(), Some(tid(1)));
    }

    #[test]
    fn re_enabling_same_text_input_is_activated_again() {
        let mut bridge = TextInputBridge::new();
        bridge.register(tid(1), 1);
        bridge.enable(tid(1));
        assert_eq!(bridge.enable(tid(1)), EnableOutcome::Activated);
    }

    #[test]
    fn only_one_input_method_connects() {
        let mut bridge = TextInputBridge::new();
        assert_eq!(bridge.connect_input_method(), InputMethodConnectOutcome::Connected);
        assert_eq!(bridge.connect_input_method(), InputMethodConnectOutcome::Unavailable);
        bridge.disconnect_input_method();
        assert_eq!(bridge.connect_input_method(), InputMethodConnectOutcome::Connected);
    }

    #[test]
    fn commit_fields_fall_back_to_pending() {
        let current = CommitFields { delete_surrounding: None, preedit: Some("a".into()), commit_text: None };
        let pending = CommitFields { delete_surrounding: Some((1, 2)), preedit: Some("b".into()), commit_text: Some("c".into()) };
        let resolved = resolve_commit(&current, &pending);
        assert_eq!(resolved.delete_surrounding, Some((1, 2)));
        assert_eq!(resolved.preedit, Some("a".into()));
        assert_eq!(resolved.commit_text, Some("c".into()));
    }
}
