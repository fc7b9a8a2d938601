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

//! `keyboard-shortcuts-inhibit-v1`: inhibits key-binding processing for
//! the surface & seat an inhibitor targets. Activation tracks focus
//! changes so only the inhibitor for the currently focused surface is
//! ever active.

use std::collections::HashMap;

use crate::arena_id;
use crate::view::ViewId;

arena_id!(InhibitorId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InhibitorKey {
    pub surface: ViewId,
    pub seat: u32,
}

#[derive(Debug, Default)]
pub struct ShortcutsInhibitor {
    registered: HashMap<InhibitorKey, InhibitorId>,
    active: Option<InhibitorKey>,
}

impl ShortcutsInhibitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key-binding processing should be skipped for `key`: true when
    /// an inhibitor is active for the focused surface & seat.
    pub fn is_inhibited(&self, key: InhibitorKey) -> bool {
        self.active == Some(key)
    }

    pub fn register(&mut self, key: InhibitorKey, id: InhibitorId) {
        self.registered.insert(key, id);
    }

    /// A client destroyed its inhibitor. If it was the active one,
    /// clears it.
    pub fn destroy(&mut self, key: InhibitorKey) {
        self.registered.remove(&key);
        if self.active == Some(key) {
            self.active = None;
        }
    }

    /// Keyboard focus changed to `new_focus` on `seat`: activates the
    /// matching inhibitor (if any) and deactivates whatever was active
    /// before.
    pub fn on_focus_change(&mut self, new_focus: Option<ViewId>, seat: u32) {
        self.active = new_focus.and_then(|surface| {
            let key = InhibitorKey { surface, seat };
            self.registered.contains_key(&key).then_some(key)
        });
    }
}
