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

//! The apps-rules engine. Rule schema, the linear first-match-wins
//! scan, and the pre/post-map attribute application math. Persistence
//! lives in [`persist`], the remember/forget toggles in [`remember`].

pub mod persist;
pub mod remember;

use regex::Regex;

use crate::arena_id;
use crate::color::Anchor;
use crate::color::IntOrPercent;
use crate::geometry::FrameExtents;
use crate::geometry::Point;
use crate::geometry::Rectangle;
use crate::prelude::*;
use crate::utils::ArenaId as _;
use crate::view::decoration::DecorMask;
use crate::view::FocusProtection;

arena_id!(RuleId);

/// One match predicate: `app_id`, `instance`, `role`, or `title`.
/// Compilation anchors the source pattern `^(?:pattern)$` and treats a
/// non-compiling regex as "set but invalid", which the matcher treats
/// as never matching.
#[derive(Debug, Clone)]
pub struct Predicate {
    pub set: bool,
    pub negate: bool,
    pub pattern: String,
    compiled: Option<Regex>,
}

impl Predicate {
    pub fn unset() -> Self {
        Self { set: false, negate: false, pattern: String::new(), compiled: None }
    }

    pub fn new(pattern: &str, negate: bool) -> Self {
        let anchored = format!("^(?:{pattern})$");
        let compiled = Regex::new(&anchored)
            .map_err(|e| warn!("apps-rule: invalid regex '{pattern}': {e}"))
            .ok();
        Self { set: true, negate, pattern: pattern.to_string(), compiled }
    }

    fn matches(&self, candidate: Option<&str>) -> bool {
        if !self.set {
            return true;
        }
        let Some(re) = &self.compiled else {
            return false;
        };
        let ok = re.is_match(candidate.unwrap_or(""));
        if self.negate {
            !ok
        } else {
            ok
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maximized {
    No,
    Horizontal,
    Vertical,
    Both,
}

impl Maximized {
    pub fn h(self) -> bool {
        matches!(self, Maximized::Horizontal | Maximized::Both)
    }

    pub fn v(self) -> bool {
        matches!(self, Maximized::Vertical | Maximized::Both)
    }

    pub fn name(self) -> &'static str {
        match self {
            Maximized::No => "no",
            Maximized::Horizontal => "horz",
            Maximized::Vertical => "vert",
            Maximized::Both => "yes",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Dimensions {
    pub width: IntOrPercent,
    pub height: IntOrPercent,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Position {
    pub anchor: Anchor,
    pub x: IntOrPercent,
    pub y: IntOrPercent,
}

/// A rule's attribute block. Every field is `Option`; `None` means
/// "not set" (the `set_X` guard in the original schema collapses onto
/// Rust's `Option`).
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    pub focus_hidden: Option<bool>,
    pub icon_hidden: Option<bool>,
    pub workspace: Option<i32>,
    pub sticky: Option<bool>,
    pub jump: Option<bool>,
    pub head: Option<i32>,
    pub dimensions: Option<Dimensions>,
    pub ignore_size_hints: Option<bool>,
    pub position: Option<Position>,
    pub minimized: Option<bool>,
    pub maximized: Option<Maximized>,
    pub fullscreen: Option<bool>,
    pub shaded: Option<bool>,
    pub tab: Option<bool>,
    pub alpha: Option<(u8, u8)>,
    pub focus_protection: Option<FocusProtection>,
    pub decor: Option<DecorMask>,
    pub layer: Option<i32>,
    pub save_on_close: Option<bool>,
}

impl Attributes {
    pub fn is_empty(&self) -> bool {
        let Attributes {
            focus_hidden,
            icon_hidden,
            workspace,
            sticky,
            jump,
            head,
            dimensions,
            ignore_size_hints,
            position,
            minimized,
            maximized,
            fullscreen,
            shaded,
            tab,
            alpha,
            focus_protection,
            decor,
            layer,
            save_on_close,
        } = self;
        focus_hidden.is_none()
            && icon_hidden.is_none()
            && workspace.is_none()
            && sticky.is_none()
            && jump.is_none()
            && head.is_none()
            && dimensions.is_none()
            && ignore_size_hints.is_none()
            && position.is_none()
            && minimized.is_none()
            && maximized.is_none()
            && fullscreen.is_none()
            && shaded.is_none()
            && tab.is_none()
            && alpha.is_none()
            && focus_protection.is_none()
            && decor.is_none()
            && layer.is_none()
            && save_on_close.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub id: RuleId,
    pub app_id: Predicate,
    pub instance: Predicate,
    pub role: Predicate,
    pub title: Predicate,

    pub match_limit: u32,
    pub match_count: u32,
    pub group_id: u32,

    pub attrs: Attributes,
}

impl Rule {
    pub fn new(id: RuleId) -> Self {
        Self {
            id,
            app_id: Predicate::unset(),
            instance: Predicate::unset(),
            role: Predicate::unset(),
            title: Predicate::unset(),
            match_limit: 0,
            match_count: 0,
            group_id: 0,
            attrs: Attributes::default(),
        }
    }

    fn matches(&self, candidate: &MatchCandidate<'_>) -> bool {
        if self.match_limit > 0 && self.match_count >= self.match_limit {
            return false;
        }
        self.app_id.matches(candidate.app_id)
            && self.instance.matches(candidate.instance)
            && self.role.matches(candidate.role)
            && self.title.matches(candidate.title)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MatchCandidate<'a> {
    pub app_id: Option<&'a str>,
    pub instance: Option<&'a str>,
    pub role: Option<&'a str>,
    pub title: Option<&'a str>,
}

/// The ordered rule list; order is match priority.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    next_id: u64,
    /// Cleared to `false` by the loader whenever a line can't be
    /// understood; disables `save()` until the next full reload.
    pub rewrite_safe: bool,
    pub generation: u64,
}

impl RuleSet {
    pub fn new() -> Self {
        Self { rules: Vec::new(), next_id: 0, rewrite_safe: true, generation: 0 }
    }

    pub fn push(&mut self, mut rule: Rule) -> RuleId {
        let id = RuleId::from_raw(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        rule.id = id;
        self.rules.push(rule);
        id
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get_mut(&mut self, id: RuleId) -> Option<&mut Rule> {
        self.rules.iter_mut().find(|r| r.id == id)
    }

    pub fn remove(&mut self, id: RuleId) {
        self.rules.retain(|r| r.id != id);
    }

    /// First index satisfying all set predicates, honoring `negate`
    /// and `match_limit`.
    pub fn match_first(&mut self, candidate: &MatchCandidate<'_>) -> Option<(usize, RuleId)> {
        let idx = self.rules.iter().position(|r| r.matches(candidate))?;
        self.rules[idx].match_count += 1;
        Some((idx, self.rules[idx].id))
    }

    /// Non-mutating variant for read-only callers (e.g. the `dump-config`
    /// IPC command's preview path) that must not advance `match_count`.
    pub fn find_first(&self, candidate: &MatchCandidate<'_>) -> Option<(usize, &Rule)> {
        self.rules.iter().enumerate().find(|(_, r)| r.matches(candidate))
    }
}

/// `position` semantics: compute the screen/window reference points
/// from `anchor`, negate offsets for right/bottom anchors, and return
/// the final frame top-left.
pub fn resolve_position(anchor: Anchor, offset: Point, usable_box: Rectangle, frame: Rectangle) -> Point {
    let (fx, fy) = anchor.fractions();
    let screen_ref = Point::new(
        usable_box.x + (usable_box.width as f64 * fx).round() as i32,
        usable_box.y + (usable_box.height as f64 * fy).round() as i32,
    );
    let window_ref = Point::new(
        frame.x + (frame.width as f64 * fx).round() as i32,
        frame.y + (frame.height as f64 * fy).round() as i32,
    );
    let ox = if anchor.negate_x() { -offset.x } else { offset.x };
    let oy = if anchor.negate_y() { -offset.y } else { offset.y };
    Point::new(screen_ref.x + ox - window_ref.x, screen_ref.y + oy - window_ref.y)
}

/// Resolves a `Dimensions` attribute into pixel width/height,
/// percent-scaled against the chosen box.
pub fn resolve_dimensions(dim: Dimensions, box_rect: Rectangle) -> (i32, i32) {
    let w = dim.width.resolve(box_rect.width).max(1);
    let h = dim.height.resolve(box_rect.height).max(1);
    (w, h)
}

/// Full pre-map placement math for a `position` attribute, given the
/// view's content size and decoration frame.
pub fn apply_position(anchor: Anchor, offset: Point, usable_box: Rectangle, content: Rectangle, frame: FrameExtents) -> Point {
    let frame_rect = frame.frame_rect(content);
    let frame_dims = Rectangle::new(0, 0, frame_rect.width, frame_rect.height);
    let frame_xy = resolve_position(anchor, offset, usable_box, frame_dims);
    Point::new(frame_xy.x + frame.left, frame_xy.y + frame.top)
}
