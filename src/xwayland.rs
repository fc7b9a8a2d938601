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

//! The XWayland bridge contract: the minimum surface a bridged (X11)
//! toplevel exposes to the rest of this crate, plus size-hint rounding
//! and the `_NET_WM_WINDOW_TYPE` defaults the apps-rules/placement/
//! decoration paths need. An `XWaylandSurface` pairs with its
//! Wayland-protocol reflection into exactly one `View`: one X11 hint
//! surface plus one wlr surface forming one view.

use crate::arena_id;
use crate::geometry::Rectangle;
use crate::view::ViewId;
use crate::view::decoration::DecorMask;

arena_id!(XSurfaceId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetWmWindowType {
    Normal,
    Dialog,
    Utility,
    Splash,
    Dock,
    Toolbar,
    Menu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeHints {
    pub min_width: i32,
    pub min_height: i32,
    pub width_inc: i32,
    pub height_inc: i32,
}

/// Read accessors an X11-bridged toplevel exposes.
/// Backed by `x11rb`/smithay's `X11Surface` in the real bridge; this
/// trait is the seam this crate's policy code programs against so it
/// stays testable without a live X server.
pub trait XWaylandSurface {
    fn title(&self) -> Option<&str>;
    fn class(&self) -> Option<&str>;
    fn instance(&self) -> Option<&str>;
    fn role(&self) -> Option<&str>;
    fn window_type(&self) -> &[NetWmWindowType];
    fn parent(&self) -> Option<XSurfaceId>;
    fn size_hints(&self) -> Option<SizeHints>;

    fn set_fullscreen(&mut self, fullscreen: bool);
    fn set_maximized(&mut self, horz: bool, vert: bool);
    fn close(&mut self);
    fn configure(&mut self, geometry: Rectangle);
    fn offer_focus(&mut self);
}

/// Rounds `value` down to the nearest `min + n*inc` step, floor-clamped
/// to `min` (maximize algorithm step 2, "make fit"; shared by the
/// apps-rules `dimensions` attribute and interactive resize for
/// x-bridged views).
pub fn round_dimension(value: i32, min: i32, inc: i32) -> i32 {
    if value <= min || inc <= 1 {
        return value.max(min);
    }
    let steps = (value - min) / inc;
    min + steps * inc
}

pub fn round_size(size: (i32, i32), hints: SizeHints) -> (i32, i32) {
    (
        round_dimension(size.0, hints.min_width, hints.width_inc),
        round_dimension(size.1, hints.min_height, hints.height_inc),
    )
}

/// Default decoration mask for a window type absent an overriding rule
/// ("a `_NET_WM_WINDOW_TYPE_DIALOG`/`UTILITY` window defaults to
/// `TOOL`/`TINY` decor").
pub fn default_decor_for_window_type(window_type: &[NetWmWindowType]) -> DecorMask {
    if window_type.contains(&NetWmWindowType::Dialog) {
        DecorMask::tool()
    } else if window_type.contains(&NetWmWindowType::Utility) {
        DecorMask::tiny()
    } else {
        DecorMask::normal()
    }
}

/// Whether this window type is ever auto-tabbed or placed by the
/// placement policy ("`_NET_WM_WINDOW_TYPE_SPLASH`/`DOCK` never
/// auto-tab and are never placed").
pub fn participates_in_placement(window_type: &[NetWmWindowType]) -> bool {
    !window_type.contains(&NetWmWindowType::Splash) && !window_type.contains(&NetWmWindowType::Dock)
}

/// Tracks X11 surfaces waiting to be paired with their Wayland-protocol
/// reflection; a `View` is only created once both halves have arrived
/// ("becomes associated with a `View` only once both ... have
/// appeared").
#[derive(Debug, Default)]
pub struct PendingPairings {
    waiting_for_wl_surface: Vec<XSurfaceId>,
    waiting_for_x_surface: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingOutcome {
    /// Still waiting on the other half.
    Pending,
    /// Both halves arrived; the caller may now create a `View`.
    Ready,
}

impl PendingPairings {
    pub fn new() -> Self {
        Self::default()
    }

    /// The X11-side `XWaylandSurface` appeared, identified by its
    /// window id `wl_client_serial` (the value the X server and the
    /// Wayland protocol surface creation both carry).
    pub fn x_surface_arrived(&mut self, id: XSurfaceId, wl_client_serial: u32) -> PairingOutcome {
        if let Some(idx) = self.waiting_for_x_surface.iter().position(|&s| s == wl_client_serial) {
            self.waiting_for_x_surface.remove(idx);
            PairingOutcome::Ready
        } else {
            self.waiting_for_wl_surface.push(id);
            PairingOutcome::Pending
        }
    }

    pub fn wl_surface_arrived(&mut self, wl_client_serial: u32) -> PairingOutcome {
        if !self.waiting_for_wl_surface.is_empty() {
            self.waiting_for_wl_surface.pop();
            PairingOutcome::Ready
        } else {
            self.waiting_for_x_surface.push(wl_client_serial);
            PairingOutcome::Pending
        }
    }
}

/// Target for `offer_focus()`, once a bridged surface's `View` exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XViewLink {
    pub x_surface: XSurfaceId,
    pub view: ViewId,
}
