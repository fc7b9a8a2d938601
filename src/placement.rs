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

//! Initial-placement strategies. All
//! strategies operate purely on geometry so they can run without a live
//! backend; `View::place_initial` (in `view/geometry.rs`) is the only
//! caller that also has to know about outputs and decoration.

use crate::geometry::Point;
use crate::geometry::Rectangle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrColumn {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy)]
pub struct CascadeState {
    pub anchor: Point,
    pub step: Point,
    pub last: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Smart { axis: RowOrColumn, horizontal: Direction, vertical: Direction },
    Cascade,
    UnderMouse,
    MinOverlap { axis: RowOrColumn },
    AutoTab,
}

/// Coarse grid step used by `row_min_overlap`/`col_min_overlap` to keep
/// the candidate search bounded on large outputs.
const OVERLAP_GRID_STEP: i32 = 16;

/// `place_next`: returns a top-left position for a `w x h` window on
/// `box_rect`. `existing` lists the frame rectangles of other mapped,
/// non-minimized, visible, non-sticky views on the same workspace (used
/// by the smart/min-overlap strategies); `cascade` carries the running
/// cascade cursor (the caller persists it per-screen).
pub fn place_next(
    strategy: Strategy,
    box_rect: Rectangle,
    w: i32,
    h: i32,
    cursor: Point,
    existing: &[Rectangle],
    cascade: Option<&mut CascadeState>,
) -> Point {
    let w = w.max(1);
    let h = h.max(1);
    match strategy {
        Strategy::Smart { axis, horizontal, vertical } => {
            smart_place(box_rect, w, h, existing, axis, horizontal, vertical)
                .unwrap_or_else(|| clamp_point(Point::new(box_rect.x, box_rect.y), box_rect, w, h))
        },
        Strategy::Cascade => cascade_place(box_rect, w, h, cascade),
        Strategy::UnderMouse => under_mouse(box_rect, w, h, cursor),
        Strategy::MinOverlap { axis } => min_overlap_place(box_rect, w, h, existing, axis),
        Strategy::AutoTab => {
            // Caller resolves tab-attach eligibility before calling; by
            // the time this strategy reaches `place_next` (no match
            // found), it behaves exactly as `row_smart`.
            smart_place(
                box_rect,
                w,
                h,
                existing,
                RowOrColumn::Row,
                Direction::LeftToRight,
                Direction::LeftToRight,
            )
            .unwrap_or_else(|| clamp_point(Point::new(box_rect.x, box_rect.y), box_rect, w, h))
        },
    }
}

fn clamp_point(p: Point, box_rect: Rectangle, w: i32, h: i32) -> Point {
    Rectangle::new(p.x, p.y, w, h).clamp_into(box_rect).origin()
}

fn overlaps_any(candidate: Rectangle, existing: &[Rectangle]) -> bool {
    existing.iter().any(|r| candidate.overlap_area(*r) > 0)
}

/// `row_smart`/`col_smart`: scan in row- or column-major order for the
/// first slot with no overlap against `existing`.
fn smart_place(
    box_rect: Rectangle,
    w: i32,
    h: i32,
    existing: &[Rectangle],
    axis: RowOrColumn,
    horizontal: Direction,
    vertical: Direction,
) -> Option<Point> {
    if w > box_rect.width || h > box_rect.height {
        return None;
    }
    let xs: Vec<i32> = x_candidates(box_rect, w, horizontal);
    let ys: Vec<i32> = y_candidates(box_rect, h, vertical);

    let scan = |outer: &[i32], inner: &[i32], row_major: bool| -> Option<Point> {
        for &o in outer {
            for &i in inner {
                let (x, y) = if row_major { (i, o) } else { (o, i) };
                let candidate = Rectangle::new(x, y, w, h);
                if !overlaps_any(candidate, existing) {
                    return Some(Point::new(x, y));
                }
            }
        }
        None
    };

    match axis {
        RowOrColumn::Row => scan(&ys, &xs, true),
        RowOrColumn::Column => scan(&xs, &ys, false),
    }
}

fn x_candidates(box_rect: Rectangle, w: i32, dir: Direction) -> Vec<i32> {
    let max_x = box_rect.right() - w;
    let mut v: Vec<i32> = (box_rect.x..=max_x).step_by(OVERLAP_GRID_STEP as usize).collect();
    if v.is_empty() {
        v.push(box_rect.x);
    }
    if dir == Direction::RightToLeft {
        v.reverse();
    }
    v
}

fn y_candidates(box_rect: Rectangle, h: i32, dir: Direction) -> Vec<i32> {
    let max_y = box_rect.bottom() - h;
    let mut v: Vec<i32> = (box_rect.y..=max_y).step_by(OVERLAP_GRID_STEP as usize).collect();
    if v.is_empty() {
        v.push(box_rect.y);
    }
    if dir == Direction::RightToLeft {
        v.reverse();
    }
    v
}

/// `cascade`: stagger from the running anchor; wraps back to the
/// anchor when the next position would leave the box.
fn cascade_place(box_rect: Rectangle, w: i32, h: i32, cascade: Option<&mut CascadeState>) -> Point {
    let Some(state) = cascade else {
        return clamp_point(box_rect.origin(), box_rect, w, h);
    };
    let mut next = Point::new(state.last.x + state.step.x, state.last.y + state.step.y);
    let fits = next.x + w <= box_rect.right() && next.y + h <= box_rect.bottom();
    if !fits {
        next = state.anchor;
    }
    state.last = next;
    clamp_point(next, box_rect, w, h)
}

/// `under_mouse`: centered on the cursor, clamped into the box.
fn under_mouse(box_rect: Rectangle, w: i32, h: i32, cursor: Point) -> Point {
    let p = Point::new(cursor.x - w / 2, cursor.y - h / 2);
    clamp_point(p, box_rect, w, h)
}

/// `row_min_overlap`/`col_min_overlap`: evaluate a coarse grid of
/// candidate positions and keep the one with least total overlap area
/// against `existing` (ties broken by scan order, i.e. the earliest
/// candidate in row/column-major order wins).
fn min_overlap_place(box_rect: Rectangle, w: i32, h: i32, existing: &[Rectangle], axis: RowOrColumn) -> Point {
    let xs = x_candidates(box_rect, w, Direction::LeftToRight);
    let ys = y_candidates(box_rect, h, Direction::LeftToRight);

    let mut best: Option<(i64, Point)> = None;
    let mut consider = |x: i32, y: i32| {
        let candidate = Rectangle::new(x, y, w, h);
        let total: i64 = existing.iter().map(|r| candidate.overlap_area(*r)).sum();
        if best.map(|(b, _)| total < b).unwrap_or(true) {
            best = Some((total, Point::new(x, y)));
        }
    };

    match axis {
        RowOrColumn::Row => {
            for &y in &ys {
                for &x in &xs {
                    consider(x, y);
                }
            }
        },
        RowOrColumn::Column => {
            for &x in &xs {
                for &y in &ys {
                    consider(x, y);
                }
            }
        },
    }
    best.map(|(_, p)| p).unwrap_or_else(|| clamp_point(box_rect.origin(), box_rect, w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_is_bounded() {
        let box_rect = Rectangle::new(0, 0, 1000, 800);
        let strategies = [
            Strategy::Smart { axis: RowOrColumn::Row, horizontal: Direction::LeftToRight, vertical: Direction::LeftToRight },
            Strategy::Cascade,
            Strategy::UnderMouse,
            Strategy::MinOverlap { axis: RowOrColumn::Row },
        ];
        for s in strategies {
            let p = place_next(s, box_rect, 300, 200, Point::new(500, 400), &[], None);
            assert!(p.x >= box_rect.x && p.y >= box_rect.y);
            assert!(p.x + 300 <= box_rect.right());
            assert!(p.y + 200 <= box_rect.bottom());
        }
    }

    #[test]
    fn smart_skips_occupied_first_slot() {
        let box_rect = Rectangle::new(0, 0, 1000, 800);
        let existing = [Rectangle::new(0, 0, 300, 200)];
        let p = place_next(
            Strategy::Smart { axis: RowOrColumn::Row, horizontal: Direction::LeftToRight, vertical: Direction::LeftToRight },
            box_rect,
            300,
            200,
            Point::new(0, 0),
            &existing,
            None,
        );
        assert!(Rectangle::new(p.x, p.y, 300, 200).overlap_area(existing[0]) == 0);
    }

    #[test]
    fn cascade_wraps_to_anchor() {
        let box_rect = Rectangle::new(0, 0, 100, 100);
        let mut state = CascadeState { anchor: Point::new(0, 0), step: Point::new(80, 80), last: Point::new(0, 0) };
        let p1 = place_next(Strategy::Cascade, box_rect, 30, 30, Point::new(0, 0), &[], Some(&mut state));
        assert_eq!(p1, Point::new(80, 80));
        // next step would leave the box -> wraps.
        let p2 = place_next(Strategy::Cascade, box_rect, 30, 30, Point::new(0, 0), &[], Some(&mut state));
        assert_eq!(p2, Point::new(0, 0));
    }

    #[test]
    fn under_mouse_centers_and_clamps() {
        let box_rect = Rectangle::new(0, 0, 1000, 800);
        let p = place_next(Strategy::UnderMouse, box_rect, 200, 100, Point::new(990, 790), &[], None);
        assert_eq!(p, Point::new(800, 700));
    }

    #[test]
    fn min_overlap_prefers_empty_region() {
        let box_rect = Rectangle::new(0, 0, 200, 200);
        let existing = [Rectangle::new(0, 0, 150, 150)];
        let p = place_next(Strategy::MinOverlap { axis: RowOrColumn::Row }, box_rect, 60, 60, Point::new(0, 0), &existing, None);
        let candidate = Rectangle::new(p.x, p.y, 60, 60);
        assert_eq!(candidate.overlap_area(existing[0]), 0);
    }
}
