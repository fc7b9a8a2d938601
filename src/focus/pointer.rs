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

//! The pointer motion pipeline and pointer-constraint state. Constraint
//! activation is edge-triggered by pointer-focus changes; the
//! dispatcher (outside this module) owns the grab/menu/dialog checks
//! that gate hit-testing.

use crate::focus::FocusModel;
use crate::geometry::Point;
use crate::geometry::Rectangle;
use crate::view::ViewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Locked,
    Confined { region: Rectangle },
}

/// Tracks the single active constraint and the surface it belongs to;
/// a focus change away from that surface deactivates it: edge-triggered
/// by surface focus change.
#[derive(Debug, Default)]
pub struct PointerConstraints {
    active: Option<(ViewId, ConstraintKind)>,
}

impl PointerConstraints {
    pub fn new() -> Self {
        Self { active: None }
    }

    pub fn activate(&mut self, surface: ViewId, kind: ConstraintKind) {
        self.active = Some((surface, kind));
    }

    pub fn deactivate(&mut self) {
        self.active = None;
    }

    pub fn active_kind(&self) -> Option<ConstraintKind> {
        self.active.map(|(_, k)| k)
    }

    /// Called whenever pointer focus changes surface; deactivates the
    /// constraint if it belonged to the surface losing focus.
    pub fn on_pointer_focus_change(&mut self, new_focus: Option<ViewId>) {
        if let Some((surface, _)) = self.active {
            if Some(surface) != new_focus {
                self.active = None;
            }
        }
    }

    /// Region updates on an active `confined` constraint reclamp the
    /// cursor immediately. Returns the reclamped cursor position, or
    /// `None` if no confined constraint is active.
    pub fn set_confined_region(&mut self, region: Rectangle, cursor: Point, focused_geom: Rectangle) -> Option<Point> {
        match &mut self.active {
            Some((_, ConstraintKind::Confined { region: r })) => {
                *r = region;
                Some(clamp_confined(cursor, region, focused_geom))
            },
            _ => None,
        }
    }
}

/// Clamps `cursor` into `region` intersected with `focused_geom`: the
/// constraint's region intersected with the focused surface geometry.
/// Falls back to clamping into `region` alone if the intersection is
/// empty.
pub fn clamp_confined(cursor: Point, region: Rectangle, focused_geom: Rectangle) -> Point {
    let bounds = region.intersect(focused_geom).filter(|r| !r.is_empty()).unwrap_or(region);
    Rectangle::new(cursor.x, cursor.y, 0, 0).clamp_into(bounds).origin()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeMotion {
    pub time_us: u64,
    pub dx: f64,
    pub dy: f64,
    pub unaccel_dx: f64,
    pub unaccel_dy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionOutcome {
    /// A grab is active and not passthrough; the grab engine updates
    /// its own geometry from the delta.
    GrabUpdate,
    /// A `locked` constraint is active: cursor position is unchanged.
    Suppressed,
    /// A `confined` constraint clamped the cursor to this point.
    Clamped(Point),
    /// No grab/constraint: hit-test result (`None` clears pointer
    /// focus).
    HitTest(Option<ViewId>),
}

/// `place_next`'s pointer-pipeline counterpart ("Pointer
/// pipeline" steps, excluding the always-first "backend cursor-move"
/// which the caller performs before computing `cursor`).
pub fn motion_outcome(
    grab_active: bool,
    constraints: &PointerConstraints,
    focused_geom: Option<Rectangle>,
    cursor: Point,
    hit_test: impl FnOnce(Point) -> Option<ViewId>,
) -> MotionOutcome {
    if grab_active {
        return MotionOutcome::GrabUpdate;
    }
    match constraints.active_kind() {
        Some(ConstraintKind::Locked) => MotionOutcome::Suppressed,
        Some(ConstraintKind::Confined { region }) => {
            let bounds = focused_geom.unwrap_or(region);
            MotionOutcome::Clamped(clamp_confined(cursor, region, bounds))
        },
        None => MotionOutcome::HitTest(hit_test(cursor)),
    }
}

/// "If `focus_model ≠ click-to-focus` and no grab/menu/dialog
/// is active, set keyboard focus to the view under the cursor".
pub fn should_focus_on_motion(model: FocusModel, grab_active: bool, menu_open: bool, dialog_open: bool) -> bool {
    model != FocusModel::ClickToFocus && !grab_active && !menu_open && !dialog_open
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ArenaId as _;

    fn vid(n: u64) -> ViewId {
        ViewId::from_raw(n)
    }

    #[test]
    fn focus_change_deactivates_constraint_on_other_surface() {
        let mut c = PointerConstraints::new();
        c.activate(vid(1), ConstraintKind::Locked);
        c.on_pointer_focus_change(Some(vid(2)));
        assert_eq!(c.active_kind(), None);
    }

    #[test]
    fn focus_change_to_same_surface_keeps_constraint() {
        let mut c = PointerConstraints::new();
        c.activate(vid(1), ConstraintKind::Locked);
        c.on_pointer_focus_change(Some(vid(1)));
        assert_eq!(c.active_kind(), Some(ConstraintKind::Locked));
    }

    #[test]
    fn confined_clamps_into_intersection() {
        let region = Rectangle::new(0, 0, 100, 100);
        let geom = Rectangle::new(50, 50, 100, 100);
        let p = clamp_confined(Point::new(0, 0), region, geom);
        assert_eq!(p, Point::new(50, 50));
    }

    #[test]
    fn region_change_reclamps_confined_cursor() {
        let mut c = PointerConstraints::new();
        c.activate(vid(1), ConstraintKind::Confined { region: Rectangle::new(0, 0, 100, 100) });
        let new_region = Rectangle::new(0, 0, 20, 20);
        let p = c.set_confined_region(new_region, Point::new(50, 50), Rectangle::new(0, 0, 100, 100));
        assert_eq!(p, Some(Point::new(20, 20)));
    }

    #[test]
    fn locked_suppresses_motion() {
        let mut c = PointerConstraints::new();
        c.activate(vid(1), ConstraintKind::Locked);
        let outcome = motion_outcome(false, &c, None, Point::new(5, 5), |_| None);
        assert_eq!(outcome, MotionOutcome::Suppressed);
    }

    #[test]
    fn grab_active_short_circuits_constraints() {
        let mut c = PointerConstraints::new();
        c.activate(vid(1), ConstraintKind::Locked);
        let outcome = motion_outcome(true, &c, None, Point::new(5, 5), |_| None);
        assert_eq!(outcome, MotionOutcome::GrabUpdate);
    }

    #[test]
    fn no_constraint_runs_hit_test() {
        let c = PointerConstraints::new();
        let outcome = motion_outcome(false, &c, None, Point::new(5, 5), |_| Some(vid(9)));
        assert_eq!(outcome, MotionOutcome::HitTest(Some(vid(9))));
    }

    #[test]
    fn should_focus_on_motion_requires_non_click_model_and_no_overlays() {
        assert!(should_focus_on_motion(FocusModel::MouseFocus, false, false, false));
        assert!(!should_focus_on_motion(FocusModel::ClickToFocus, false, false, false));
        assert!(!should_focus_on_motion(FocusModel::MouseFocus, true, false, false));
        assert!(!should_focus_on_motion(FocusModel::MouseFocus, false, true, false));
    }
}
