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

//! The move/resize grab engine. A pure state
//! machine over content rectangles; the caller owns the scene-graph
//! outline, the view's live geometry, and the resize-delay timer
//! itself (this module only says when to arm/disarm one).

use crate::geometry::FrameExtents;
use crate::geometry::Point;
use crate::geometry::Rectangle;
use crate::view::decoration::ResizeEdges;
use crate::view::ViewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabMode {
    Passthrough,
    Move,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginOutcome {
    Refused,
    Started { exit_fullscreen: bool, exit_maximized: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitReason {
    Release,
    KeyboardEnter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveUpdate {
    pub content: Rectangle,
    pub apply_now: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeUpdate {
    pub content: Rectangle,
    pub apply_now: bool,
    pub arm_timer: bool,
}

/// One move/resize session. `button == 0` marks a keyboard-initiated
/// grab (step 4); pointer deltas and keyboard nudges both
/// accumulate into the same running offset from the grab's anchor, so
/// `update_move`/`update_resize` don't need to know which drove them.
#[derive(Debug)]
pub struct Grab {
    mode: GrabMode,
    view: Option<ViewId>,
    button: u32,
    edges: ResizeEdges,
    tab_attach_enabled: bool,
    orig: Rectangle,
    accum: Point,
    pending: Option<Rectangle>,
    resize_timer_armed: bool,
}

impl Default for Grab {
    fn default() -> Self {
        Self::new()
    }
}

impl Grab {
    pub fn new() -> Self {
        Self {
            mode: GrabMode::Passthrough,
            view: None,
            button: 0,
            edges: ResizeEdges::NONE,
            tab_attach_enabled: false,
            orig: Rectangle::default(),
            accum: Point::default(),
            pending: None,
            resize_timer_armed: false,
        }
    }

    pub fn mode(&self) -> GrabMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != GrabMode::Passthrough
    }

    pub fn view(&self) -> Option<ViewId> {
        self.view
    }

    pub fn tab_attach_enabled(&self) -> bool {
        self.tab_attach_enabled
    }

    fn begin(&mut self, view: ViewId, button: u32, orig: Rectangle, mode: GrabMode, edges: ResizeEdges, tab_attach_enabled: bool) {
        self.mode = mode;
        self.view = Some(view);
        self.button = button;
        self.edges = edges;
        self.tab_attach_enabled = tab_attach_enabled;
        self.orig = orig;
        self.accum = Point::default();
        self.pending = None;
        self.resize_timer_armed = false;
    }

    /// `begin_move`: refuses only when maximized and
    /// `max_disable_move`; otherwise always reports whether the caller
    /// must exit fullscreen first.
    pub fn begin_move(&mut self, view: ViewId, button: u32, orig: Rectangle, fullscreen: bool, maximized: bool, max_disable_move: bool) -> BeginOutcome {
        if maximized && max_disable_move {
            return BeginOutcome::Refused;
        }
        self.begin(view, button, orig, GrabMode::Move, ResizeEdges::NONE, false);
        BeginOutcome::Started { exit_fullscreen: fullscreen, exit_maximized: false }
    }

    pub fn begin_tabbing(&mut self, view: ViewId, button: u32, orig: Rectangle, fullscreen: bool, maximized: bool, max_disable_move: bool) -> BeginOutcome {
        match self.begin_move(view, button, orig, fullscreen, maximized, max_disable_move) {
            BeginOutcome::Started { exit_fullscreen, exit_maximized } => {
                self.tab_attach_enabled = true;
                BeginOutcome::Started { exit_fullscreen, exit_maximized }
            },
            refused => refused,
        }
    }

    /// `begin_resize`: refuses when maximized and
    /// `max_disable_resize`; otherwise exits both fullscreen and
    /// maximized state unconditionally.
    pub fn begin_resize(
        &mut self,
        view: ViewId,
        button: u32,
        orig: Rectangle,
        edges: ResizeEdges,
        fullscreen: bool,
        maximized: bool,
        max_disable_resize: bool,
    ) -> BeginOutcome {
        if maximized && max_disable_resize {
            return BeginOutcome::Refused;
        }
        self.begin(view, button, orig, GrabMode::Resize, edges, false);
        BeginOutcome::Started { exit_fullscreen: fullscreen, exit_maximized: maximized }
    }

    /// A keyboard step (step 4 arrow-key nudge); `dx`/`dy` are
    /// already signed for the direction of travel (see
    /// [`crate::focus::keys::grab_step_px`] for the magnitude).
    pub fn nudge(&mut self, dx: i32, dy: i32) {
        self.accum.x += dx;
        self.accum.y += dy;
    }

    fn total_delta(&self, pointer_dx: i32, pointer_dy: i32) -> (i32, i32) {
        (pointer_dx + self.accum.x, pointer_dy + self.accum.y)
    }

    /// A keyboard-initiated grab (`button == 0`) steps via [`Self::nudge`];
    /// if the pointer then moves mid-grab, re-anchor on the current
    /// geometry so the pointer's own deltas are cumulative from there
    /// rather than jumping by whatever the keyboard already applied.
    /// No-op for pointer-initiated grabs.
    pub fn resync_to_pointer(&mut self) {
        if self.button != 0 {
            return;
        }
        self.orig = match self.mode {
            GrabMode::Resize => Self::resize_candidate(self.orig, self.edges, self.accum.x, self.accum.y),
            _ => Rectangle::new(self.orig.x + self.accum.x, self.orig.y + self.accum.y, self.orig.width, self.orig.height),
        };
        self.accum = Point::default();
    }

    /// Snaps each edge of `frame` independently to `box_rect`'s matching
    /// edge when within `threshold` ("snap its edges to the
    /// usable box edges within the threshold").
    fn snap_frame(frame: Rectangle, box_rect: Rectangle, threshold: i32) -> Rectangle {
        let mut r = frame;
        if (r.x - box_rect.x).abs() <= threshold {
            r.x = box_rect.x;
        }
        if (r.right() - box_rect.right()).abs() <= threshold {
            r.x = box_rect.right() - r.width;
        }
        if (r.y - box_rect.y).abs() <= threshold {
            r.y = box_rect.y;
        }
        if (r.bottom() - box_rect.bottom()).abs() <= threshold {
            r.y = box_rect.bottom() - r.height;
        }
        r
    }

    /// Move update: pointer delta `(dx, dy)` (0 for a keyboard-only
    /// tick) combined with any accumulated keyboard nudges.
    pub fn update_move(&mut self, dx: i32, dy: i32, edge_snap_threshold_px: i32, output_box: Option<Rectangle>, frame: FrameExtents, opaque_move: bool) -> MoveUpdate {
        let (tdx, tdy) = self.total_delta(dx, dy);
        let mut content = Rectangle::new(self.orig.x + tdx, self.orig.y + tdy, self.orig.width, self.orig.height);

        if edge_snap_threshold_px > 0 {
            if let Some(box_rect) = output_box {
                let frame_rect = Self::snap_frame(frame.frame_rect(content), box_rect, edge_snap_threshold_px);
                content.x = frame_rect.x + frame.left;
                content.y = frame_rect.y + frame.top;
            }
        }

        self.pending = Some(content);
        MoveUpdate { content, apply_now: opaque_move }
    }

    /// Derives a candidate content rect from `orig` and the active
    /// resize edges, enforcing `w >= 1, h >= 1`.
    fn resize_candidate(orig: Rectangle, edges: ResizeEdges, dx: i32, dy: i32) -> Rectangle {
        let mut x = orig.x;
        let mut y = orig.y;
        let mut w = orig.width;
        let mut h = orig.height;
        if edges.contains(ResizeEdges::RIGHT) {
            w = (orig.width + dx).max(1);
        }
        if edges.contains(ResizeEdges::LEFT) {
            w = (orig.width - dx).max(1);
            x = orig.x + orig.width - w;
        }
        if edges.contains(ResizeEdges::BOTTOM) {
            h = (orig.height + dy).max(1);
        }
        if edges.contains(ResizeEdges::TOP) {
            h = (orig.height - dy).max(1);
            y = orig.y + orig.height - h;
        }
        Rectangle::new(x, y, w, h)
    }

    pub fn update_resize(
        &mut self,
        dx: i32,
        dy: i32,
        edge_resize_snap_threshold_px: i32,
        output_box: Option<Rectangle>,
        frame: FrameExtents,
        opaque_resize: bool,
        opaque_resize_delay_ms: u64,
    ) -> ResizeUpdate {
        let (tdx, tdy) = self.total_delta(dx, dy);
        let mut content = Self::resize_candidate(self.orig, self.edges, tdx, tdy);

        if edge_resize_snap_threshold_px > 0 {
            if let Some(box_rect) = output_box {
                let frame_rect = Self::snap_frame(frame.frame_rect(content), box_rect, edge_resize_snap_threshold_px);
                content = Rectangle::new(
                    frame_rect.x + frame.left,
                    frame_rect.y + frame.top,
                    (frame_rect.width - frame.left - frame.right).max(1),
                    (frame_rect.height - frame.top - frame.bottom).max(1),
                );
            }
        }

        self.pending = Some(content);
        let arm_timer = opaque_resize && opaque_resize_delay_ms > 0;
        self.resize_timer_armed = arm_timer;
        ResizeUpdate { content, apply_now: opaque_resize && !arm_timer, arm_timer }
    }

    /// The delayed-opaque-resize timer firing: applies the latest
    /// pending geometry without ending the grab ("pending
    /// geometry is latest-wins; timer fires apply the most recent
    /// pending rectangle").
    pub fn resize_timer_fire(&mut self) -> Option<Rectangle> {
        if !self.resize_timer_armed {
            return None;
        }
        self.resize_timer_armed = false;
        self.pending
    }

    /// Finalizes the session: applies pending geometry, destroys the
    /// outline, cancels any resize timer, and ends the grab — atomic
    /// ("callers observing `grab.mode` after commit see
    /// passthrough").
    pub fn commit(&mut self, _reason: CommitReason) -> Option<Rectangle> {
        let result = self.pending.or(Some(self.orig));
        self.end();
        result
    }

    /// Escape during a grab: restores the pre-grab rectangle and ends
    /// the session.
    pub fn cancel(&mut self) -> Rectangle {
        let orig = self.orig;
        self.end();
        orig
    }

    pub fn end(&mut self) {
        self.mode = GrabMode::Passthrough;
        self.view = None;
        self.pending = None;
        self.resize_timer_armed = false;
        self.accum = Point::default();
    }
}

/// Four 1px outline strips (top, bottom, left, right) around `frame`
/// ("Outline").
pub fn outline_rects(frame: Rectangle) -> [Rectangle; 4] {
    [
        Rectangle::new(frame.x, frame.y, frame.width, 1),
        Rectangle::new(frame.x, frame.bottom() - 1, frame.width, 1),
        Rectangle::new(frame.x, frame.y, 1, frame.height),
        Rectangle::new(frame.right() - 1, frame.y, 1, frame.height),
    ]
}
