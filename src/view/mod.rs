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

//! The view entity. Owns decoration, geometry, and policy flags for a
//! single toplevel window.

pub mod decoration;
pub mod geometry;
pub mod tabgroup;

use crate::arena_id;
use crate::outputs::OutputId;
use crate::prelude::*;
use crate::utils::ArenaId as _;
use crate::view::decoration::DecorMask;
use crate::view::decoration::TitleCache;
use crate::view::tabgroup::TabGroupId;

arena_id!(ViewId);

/// Exclusive shell kind: a tagged union variant, not a class hierarchy.
/// Each variant carries the backend-reported content size used by the
/// geometry contract's fallback tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Native { surface_size: Option<(i32, i32)> },
    XBridged { surface_size: Option<(i32, i32)> },
}

impl ViewKind {
    fn surface_size(self) -> Option<(i32, i32)> {
        match self {
            ViewKind::Native { surface_size } | ViewKind::XBridged { surface_size } => surface_size,
        }
    }

    pub fn is_x_bridged(self) -> bool {
        matches!(self, ViewKind::XBridged { .. })
    }
}

macro_rules! bitflags_focus_protection {
    () => {
        /// Per-window bias on how activation requests from the client
        /// itself are honored.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
        pub struct FocusProtection(pub u32);

        impl FocusProtection {
            pub const NONE: FocusProtection = FocusProtection(0);
            pub const GAIN: FocusProtection = FocusProtection(1 << 0);
            pub const REFUSE: FocusProtection = FocusProtection(1 << 1);
            pub const LOCK: FocusProtection = FocusProtection(1 << 2);
            pub const DENY: FocusProtection = FocusProtection(1 << 3);

            pub fn contains(self, bit: FocusProtection) -> bool {
                (self.0 & bit.0) == bit.0
            }
        }
    };
}
bitflags_focus_protection!();

/// Minimize/shade toggles carry a free-text `reason` for logging; kept
/// as a small enum of the reasons the core itself generates rather
/// than an arbitrary string, since every call site in this crate is
/// one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeReason {
    Client,
    Rule,
    KeyBinding,
    MouseBinding,
    Menu,
    Ipc,
}

impl StateChangeReason {
    pub fn as_str(self) -> &'static str {
        match self {
            StateChangeReason::Client => "client",
            StateChangeReason::Rule => "rule",
            StateChangeReason::KeyBinding => "keybinding",
            StateChangeReason::MouseBinding => "mousebinding",
            StateChangeReason::Menu => "menu",
            StateChangeReason::Ipc => "ipc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    Unmapped,
    Mapped,
}

#[derive(Debug)]
pub struct View {
    pub id: ViewId,
    pub create_seq: u64,
    pub kind: ViewKind,
    pub map_state: MapState,

    pub output: Option<OutputId>,
    pub workspace: usize,
    pub sticky: bool,

    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    saved: Option<geometry::SavedGeometry>,

    pub maximized_h: bool,
    pub maximized_v: bool,
    pub fullscreen: bool,
    pub fullscreen_output: Option<OutputId>,
    pub minimized: bool,
    pub shaded: bool,
    pub activated: bool,

    pub decor: DecorMask,
    pub alpha_focused: u8,
    pub alpha_unfocused: u8,
    pub focus_protection: FocusProtection,

    pub tab_group: Option<TabGroupId>,
    pub placed: bool,

    title_cache: TitleCache,

    pub app_id: Option<String>,
    pub instance: Option<String>,
    pub role: Option<String>,
    pub title: Option<String>,

    destroyed: bool,
}

impl View {
    /// `create(kind, surface)`: new view with a unique `create_seq`;
    /// placement deferred until `map()`.
    #[instrument(skip(kind), level = "debug")]
    pub fn create(id: ViewId, create_seq: u64, kind: ViewKind) -> Self {
        Self {
            id,
            create_seq,
            kind,
            map_state: MapState::Unmapped,
            output: None,
            workspace: 0,
            sticky: false,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            saved: None,
            maximized_h: false,
            maximized_v: false,
            fullscreen: false,
            fullscreen_output: None,
            minimized: false,
            shaded: false,
            activated: false,
            decor: DecorMask::normal(),
            alpha_focused: 255,
            alpha_unfocused: 255,
            focus_protection: FocusProtection::NONE,
            tab_group: None,
            placed: false,
            title_cache: TitleCache::new(),
            app_id: None,
            instance: None,
            role: None,
            title: None,
            destroyed: false,
        }
    }

    pub fn is_mapped(&self) -> bool {
        self.map_state == MapState::Mapped
    }

    pub(crate) fn saved_geometry(&self) -> Option<geometry::SavedGeometry> {
        self.saved
    }

    pub(crate) fn set_saved_geometry(&mut self, saved: Option<geometry::SavedGeometry>) {
        self.saved = saved;
    }

    /// `maximized ⇔ maximized_h ∧ maximized_v`.
    pub fn maximized(&self) -> bool {
        self.maximized_h && self.maximized_v
    }

    /// `unmap()`: returns to unmapped, idempotent.
    pub fn unmap(&mut self) {
        self.map_state = MapState::Unmapped;
        self.activated = false;
    }

    /// Views keep identity across unmap, but `map()` must be called
    /// again to re-enter the mapped pipeline.
    pub fn mark_mapped(&mut self) {
        self.map_state = MapState::Mapped;
    }

    /// `set_activated(b)`: the caller notifies the backend toplevel and
    /// foreign-toplevel-list protocols separately; this only updates the
    /// bookkeeping flag those notifications read.
    pub fn set_activated(&mut self, activated: bool) {
        self.activated = activated;
    }

    /// `destroy()`: must be called exactly once. Detaches
    /// from any tab group is the caller's responsibility (it needs the
    /// arena to find siblings); this clears the view's own state and
    /// poisons it against reuse.
    pub fn destroy(&mut self) {
        debug_assert!(!self.destroyed, "View::destroy called twice on {:?}", self.id);
        self.map_state = MapState::Unmapped;
        self.activated = false;
        self.tab_group = None;
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn title_cache_mut(&mut self) -> &mut TitleCache {
        &mut self.title_cache
    }

    /// Effective decoration mask for hit-testing / frame extents: shaded
    /// views keep their titlebar but says shading "disables
    /// content subtree; decoration stays", so the mask itself is
    /// unaffected by shade. Fullscreen views always decorate as `NONE`.
    pub fn effective_decor(&self) -> DecorMask {
        if self.fullscreen {
            DecorMask::NONE
        } else {
            self.decor
        }
    }
}
