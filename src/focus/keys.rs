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

//! The key pipeline ("Key pipeline"): a fixed order of
//! handlers, the first to consume an event stops propagation. Each
//! layer above the key-binding table (menu nav, dialog text entry, grab
//! step, shortcut inhibitor) is modeled as a predicate the dispatcher
//! checks before falling through to binding lookup.

use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;

use crate::constants::KEYCHAIN_TIMEOUT;

/// A raw key event as the backend reports it; only the pressed phase
/// reaches the binding table ("pressed phase only unless noted").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub keycode: u32,
    pub keysym: u32,
    pub modifiers: u32,
    pub pressed: bool,
}

/// A mode's binding table key: either the raw keycode or the
/// translated keysym, paired with the modifier mask ("matching
/// bindings by (keycode or keysym, modifier mask)").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKey {
    Keycode(u32, u32),
    Keysym(u32, u32),
}

#[derive(Debug, Clone)]
pub enum BindingAction {
    Chain(String),
    Action(u32),
}

#[derive(Debug, Clone, Default)]
pub struct KeyMode {
    pub bindings: HashMap<BindingKey, BindingAction>,
}

/// The key-binding engine's mode stack: a normal mode, or a temporary
/// synthetic keychain mode layered on top ("`__internal_chain_…`").
#[derive(Debug)]
pub struct KeyBindingEngine {
    pub modes: HashMap<String, KeyMode>,
    active_mode: String,
    chain: Option<ChainState>,
}

#[derive(Debug)]
struct ChainState {
    parent_mode: String,
    started_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingResult {
    /// No table entry matched; propagate further down the pipeline.
    NoMatch,
    /// A chain prefix matched; dispatcher should consume the key and
    /// wait for the next one.
    ChainEntered,
    /// A chain timed out or hit a non-matching non-modifier key; caller
    /// should treat the event as unconsumed by the table but the chain
    /// has already been torn down.
    ChainAborted,
    Action(u32),
}

impl KeyBindingEngine {
    pub fn new(default_mode: impl Into<String>) -> Self {
        Self { modes: HashMap::new(), active_mode: default_mode.into(), chain: None }
    }

    fn synthetic_mode_name(parent: &str) -> String {
        format!("__internal_chain_{parent}")
    }

    /// Must be polled (e.g. from a timer tick) so a stale chain reverts
    /// even without further key input.
    pub fn expire_stale_chain(&mut self, now: Instant) -> bool {
        let Some(chain) = &self.chain else { return false };
        if now.duration_since(chain.started_at) >= KEYCHAIN_TIMEOUT {
            self.active_mode = chain.parent_mode.clone();
            self.chain = None;
            true
        } else {
            false
        }
    }

    /// Looks up `key` in the active mode's table. A `Chain` entry opens
    /// (or re-enters, resetting the timeout) a synthetic chain mode; an
    /// unmatched non-modifier key while chained aborts the chain.
    pub fn dispatch(&mut self, key: BindingKey, is_modifier_only: bool, now: Instant) -> BindingResult {
        if let Some(chain) = &self.chain {
            if now.duration_since(chain.started_at) >= KEYCHAIN_TIMEOUT {
                self.active_mode = chain.parent_mode.clone();
                self.chain = None;
            }
        }

        let Some(mode) = self.modes.get(&self.active_mode) else {
            return BindingResult::NoMatch;
        };
        match mode.bindings.get(&key).cloned() {
            Some(BindingAction::Action(id)) => BindingResult::Action(id),
            Some(BindingAction::Chain(target)) => {
                let synthetic = Self::synthetic_mode_name(&target);
                self.chain = Some(ChainState { parent_mode: self.active_mode.clone(), started_at: now });
                self.active_mode = synthetic;
                BindingResult::ChainEntered
            },
            None => {
                if self.chain.is_some() && !is_modifier_only {
                    let parent = self.chain.take().unwrap().parent_mode;
                    self.active_mode = parent;
                    BindingResult::ChainAborted
                } else {
                    BindingResult::NoMatch
                }
            },
        }
    }
}

/// Step size for a keyboard-initiated grab's arrow-key nudging:
/// 1px with Ctrl, 50px with Shift, else 10px.
pub fn grab_step_px(ctrl: bool, shift: bool) -> i32 {
    if ctrl {
        1
    } else if shift {
        50
    } else {
        10
    }
}

/// Deletes the last UTF-8 codepoint from a command-dialog/menu search
/// buffer.
pub fn backspace_codepoint(buf: &mut String) {
    let mut chars = buf.char_indices();
    if let Some((idx, _)) = chars.next_back() {
        buf.truncate(idx);
    }
}
