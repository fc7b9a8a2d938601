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

//! The geometry contract and maximize/fullscreen algorithm. Kept as
//! free functions over `&mut View` plus caller-supplied output/theme
//! context (rather than methods reaching into a `Server`)
//! so the maximize state machine is unit-testable without a live
//! backend.

use crate::geometry::FrameExtents;
use crate::geometry::Rectangle;
use crate::outputs::OutputId;
use crate::prelude::*;
use crate::view::View;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedGeometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl SavedGeometry {
    fn from_view(v: &View) -> Self {
        Self { x: v.x, y: v.y, width: v.width, height: v.height }
    }

    fn apply_to(self, v: &mut View) {
        v.x = self.x;
        v.y = self.y;
        v.width = self.width;
        v.height = self.height;
    }
}

/// Current content width/height per the geometry contract's fallback
/// tier: stored `width/height` if non-zero, else the backend surface's
/// reported current size, else 0.
pub fn current_width(view: &View) -> i32 {
    if view.width != 0 {
        return view.width;
    }
    view.kind.surface_size().map(|(w, _)| w).unwrap_or(0)
}

pub fn current_height(view: &View) -> i32 {
    if view.height != 0 {
        return view.height;
    }
    view.kind.surface_size().map(|(_, h)| h).unwrap_or(0)
}

/// `save_geometry()`: stores `(x, y, w, h)` for later restore. Called
/// on every 0→1 transition of maximize or fullscreen, and *not*
/// called when transitioning between partial axes of maximize if a
/// save already exists.
pub fn save_geometry(view: &mut View) {
    if view.saved_geometry().is_some() {
        return;
    }
    view.set_saved_geometry(Some(SavedGeometry::from_view(view)));
}

fn restore_geometry(view: &mut View) {
    if let Some(saved) = view.saved_geometry() {
        saved.apply_to(view);
    }
    view.set_saved_geometry(None);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaximizeOutcome {
    NoOp,
    DeferredByFullscreen,
    Applied(Rectangle),
    Restored(Rectangle),
}

/// Size-increment rounding shared with the XWayland bridge and the
/// apps-rules `Dimensions` attribute: round down to the nearest
/// increment step, floor-clamped to the minimum, then "make fit" by
/// never exceeding `max`.
pub fn round_to_increment(value: i32, min: i32, inc: i32, max: i32) -> i32 {
    let mut v = value.max(min);
    if inc > 1 {
        let steps = (v - min) / inc;
        v = min + steps * inc;
    }
    v.min(max)
}

pub struct SizeHints {
    pub min_width: i32,
    pub min_height: i32,
    pub width_inc: i32,
    pub height_inc: i32,
}

/// maximize algorithm. `box_rect` is the caller-selected
/// full-or-usable-area box with any tab-bar strut already subtracted
/// ("subtract tab-bar strut if the tab bar is not 'max over'").
/// `frame` is the view's current decoration frame extents.
pub fn set_maximized_axes(
    view: &mut View,
    h: bool,
    v: bool,
    box_rect: Rectangle,
    frame: FrameExtents,
    size_hints: Option<&SizeHints>,
) -> MaximizeOutcome {
    if view.fullscreen {
        return MaximizeOutcome::DeferredByFullscreen;
    }

    let was_maximized = view.maximized_h && view.maximized_v;
    let will_maximize = h && v;
    if view.maximized_h == h && view.maximized_v == v {
        return MaximizeOutcome::NoOp;
    }

    if will_maximize && !was_maximized {
        save_geometry(view);

        let content_w = box_rect.width - frame.left - frame.right;
        let content_h = box_rect.height - frame.top - frame.bottom;

        let (w, ht) = if view.kind.is_x_bridged() {
            if let Some(hints) = size_hints {
                (
                    round_to_increment(content_w, hints.min_width, hints.width_inc, content_w),
                    round_to_increment(content_h, hints.min_height, hints.height_inc, content_h),
                )
            } else {
                (content_w, content_h)
            }
        } else {
            (content_w, content_h)
        };

        view.width = w.max(1);
        view.height = ht.max(1);
        view.x = box_rect.x + frame.left;
        view.y = box_rect.y + frame.top;
        view.maximized_h = h;
        view.maximized_v = v;
        debug!(view = %view.id, "maximized");
        MaximizeOutcome::Applied(Rectangle::new(view.x, view.y, view.width, view.height))
    } else if !will_maximize && was_maximized {
        restore_geometry(view);
        view.maximized_h = h;
        view.maximized_v = v;
        MaximizeOutcome::Restored(Rectangle::new(view.x, view.y, view.width, view.height))
    } else {
        // Transitioning between partial axes (e.g. horz-only -> both):
        // a save point from the earlier partial transition already
        // exists and must not be clobbered (handled by `save_geometry`'s
        // own guard).
        view.maximized_h = h;
        view.maximized_v = v;
        MaximizeOutcome::NoOp
    }
}

pub fn set_maximized(
    view: &mut View,
    enable: bool,
    box_rect: Rectangle,
    frame: FrameExtents,
    size_hints: Option<&SizeHints>,
) -> MaximizeOutcome {
    set_maximized_axes(view, enable, enable, box_rect, frame, size_hints)
}

/// `set_fullscreen(b, output?)`: saves geometry on 0→1, restores on
/// 1→0; clears maximize-axes on entry.
pub fn set_fullscreen(
    view: &mut View,
    enable: bool,
    output: Option<OutputId>,
    output_box: Rectangle,
) -> MaximizeOutcome {
    if view.fullscreen == enable {
        return MaximizeOutcome::NoOp;
    }

    if enable {
        save_geometry(view);
        view.maximized_h = false;
        view.maximized_v = false;
        view.fullscreen = true;
        view.fullscreen_output = output;
        view.x = output_box.x;
        view.y = output_box.y;
        view.width = output_box.width;
        view.height = output_box.height;
        MaximizeOutcome::Applied(output_box)
    } else {
        view.fullscreen = false;
        view.fullscreen_output = None;
        restore_geometry(view);
        // Exiting fullscreen restores saved geometry, not the
        // maximized state.
        MaximizeOutcome::Restored(Rectangle::new(view.x, view.y, view.width, view.height))
    }
}

/// `set_minimized(b, reason)`: toggles, no geometry side effect beyond
/// the scene-subtree visibility the caller applies.
pub fn set_minimized(view: &mut View, enable: bool) -> bool {
    if view.minimized == enable {
        return false;
    }
    view.minimized = enable;
    true
}

/// `set_shaded(b, reason)`: rejected while fullscreen.
pub fn set_shaded(view: &mut View, enable: bool) -> Result<bool> {
    if view.fullscreen {
        return Err(anyhow!("cannot shade a fullscreen view"));
    }
    if view.shaded == enable {
        return Ok(false);
    }
    view.shaded = enable;
    Ok(true)
}

/// `set_alpha`: store focused/unfocused opacity. No policy beyond
/// storage here; pseudo-bg recompute is the caller's job (scene graph,
/// out of scope).
pub fn set_alpha(view: &mut View, focused: u8, unfocused: u8) {
    view.alpha_focused = focused;
    view.alpha_unfocused = unfocused;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ArenaId;
    use crate::view::ViewId;
    use crate::view::ViewKind;

    fn new_native() -> View {
        View::create(ViewId::from_raw(0), 0, ViewKind::Native { surface_size: None })
    }

    #[test]
    fn geometry_round_trip_identity() {
        let mut v = new_native();
        v.x = 10;
        v.y = 20;
        v.width = 300;
        v.height = 200;
        let box_rect = Rectangle::new(0, 0, 1000, 800);
        set_maximized(&mut v, true, box_rect, FrameExtents::NONE, None);
        let outcome = set_maximized(&mut v, false, box_rect, FrameExtents::NONE, None);
        assert_eq!(v.x, 10);
        assert_eq!(v.y, 20);
        assert_eq!(v.width, 300);
        assert_eq!(v.height, 200);
        assert!(matches!(outcome, MaximizeOutcome::Restored(_)));
    }

    #[test]
    fn maximize_is_idempotent() {
        let mut v = new_native();
        let box_rect = Rectangle::new(0, 0, 1000, 800);
        let first = set_maximized(&mut v, true, box_rect, FrameExtents::NONE, None);
        assert!(matches!(first, MaximizeOutcome::Applied(_)));
        let second = set_maximized(&mut v, true, box_rect, FrameExtents::NONE, None);
        assert_eq!(second, MaximizeOutcome::NoOp);
    }

    #[test]
    fn fullscreen_clears_maximize_axes() {
        let mut v = new_native();
        v.x = 5;
        v.y = 5;
        v.width = 50;
        v.height = 50;
        set_maximized(&mut v, true, Rectangle::new(0, 0, 1000, 800), FrameExtents::NONE, None);
        assert!(v.maximized());

        set_fullscreen(&mut v, true, None, Rectangle::new(0, 0, 1920, 1080));
        assert!(!v.maximized_h);
        assert!(!v.maximized_v);
        assert!(v.fullscreen);

        set_fullscreen(&mut v, false, None, Rectangle::new(0, 0, 1920, 1080));
        assert!(!v.fullscreen);
        // Restores pre-maximize geometry, not maximized state.
        assert_eq!((v.x, v.y, v.width, v.height), (5, 5, 50, 50));
        assert!(!v.maximized());
    }

    #[test]
    fn maximize_refused_while_fullscreen() {
        let mut v = new_native();
        set_fullscreen(&mut v, true, None, Rectangle::new(0, 0, 1920, 1080));
        let outcome = set_maximized(&mut v, true, Rectangle::new(0, 0, 1000, 800), FrameExtents::NONE, None);
        assert_eq!(outcome, MaximizeOutcome::DeferredByFullscreen);
    }

    #[test]
    fn maximize_with_frame_extents_and_scenario_s2_shape() {
        let mut v = new_native();
        let box_rect = Rectangle::new(0, 0, 1000, 800);
        let frame = FrameExtents { left: 4, top: 28, right: 4, bottom: 4 };
        // width/height = 50%/50% of 1000x800 computed upstream by the
        // rules engine; here we directly verify frame placement math for
        // a maximize (not a rule) using the same box.
        let outcome = set_maximized(&mut v, true, box_rect, frame, None);
        let applied = match outcome {
            MaximizeOutcome::Applied(r) => r,
            other => panic!("unexpected outcome {other:?}"),
        };
        assert_eq!(applied.x, frame.left);
        assert_eq!(applied.y, frame.top);
        assert_eq!(applied.width, box_rect.width - frame.left - frame.right);
    }

    #[test]
    fn shade_rejected_while_fullscreen() {
        let mut v = new_native();
        set_fullscreen(&mut v, true, None, Rectangle::new(0, 0, 100, 100));
        assert!(set_shaded(&mut v, true).is_err());
    }

    #[test]
    fn partial_axis_transition_preserves_save_point() {
        let mut v = new_native();
        v.x = 1;
        v.y = 2;
        v.width = 3;
        v.height = 4;
        let box_rect = Rectangle::new(0, 0, 1000, 800);
        // Horizontal-only maximize is a partial transition: neither
        // "both true" nor "both false", so save_geometry's own guard
        // decides whether a save point is created. Then a true full
        // maximize mustn't clobber the original saved rect.
        set_maximized_axes(&mut v, true, false, box_rect, FrameExtents::NONE, None);
        set_maximized_axes(&mut v, true, true, box_rect, FrameExtents::NONE, None);
        set_maximized_axes(&mut v, false, false, box_rect, FrameExtents::NONE, None);
        assert_eq!((v.x, v.y, v.width, v.height), (1, 2, 3, 4));
    }
}
