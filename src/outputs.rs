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

//! The output registry. One record per backend output, carrying its
//! usable area (full box minus struts) and a present-event dedup
//! triple for nested X11 backends.

use crate::arena_id;
use crate::geometry::Rectangle;
use crate::prelude::*;
use crate::utils::Arena;
use crate::utils::ArenaId as _;

arena_id!(OutputId);

/// A strut reserved out of the full output box by a docked widget
/// (toolbar, slit) or an explicit per-screen configuration override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Struts {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Struts {
    pub fn merge_max(self, other: Struts) -> Struts {
        Struts {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

#[derive(Debug)]
pub struct Output {
    pub id: OutputId,
    pub name: String,
    /// The output's full geometry in layout coordinates.
    pub full_area: Rectangle,
    /// `full_area` minus `struts`, clamped to non-negative size.
    usable_area: Rectangle,
    struts: Struts,

    /// Present-event dedup triple ("Output"): some nested X11
    /// backends re-emit a present event with `commit_seq` lagging the
    /// previously observed one; `have_seq` distinguishes "never seen a
    /// present yet" from "seen one with seq 0".
    have_seq: bool,
    last_seq: u64,
}

impl Output {
    pub fn new(id: OutputId, name: String, full_area: Rectangle) -> Self {
        Self {
            id,
            name,
            full_area,
            usable_area: full_area,
            struts: Struts::default(),
            have_seq: false,
            last_seq: 0,
        }
    }

    pub fn usable_area(&self) -> Rectangle {
        self.usable_area
    }

    pub fn struts(&self) -> Struts {
        self.struts
    }

    /// Recomputes `usable_area` from `full_area` and the given struts.
    /// Called whenever a toolbar/slit geometry or a per-screen strut
    /// override changes.
    pub fn set_struts(&mut self, struts: Struts) {
        self.struts = struts;
        let x = self.full_area.x + struts.left;
        let y = self.full_area.y + struts.top;
        let width = (self.full_area.width - struts.left - struts.right).max(0);
        let height = (self.full_area.height - struts.top - struts.bottom).max(0);
        self.usable_area = Rectangle::new(x, y, width, height);
    }

    /// Accepts a present event's `commit_seq`, deduplicating synthetic
    /// re-emissions that lag the last observed sequence. Returns `true`
    /// if the event should be forwarded.
    pub fn accept_present_seq(&mut self, commit_seq: u64) -> bool {
        if !self.have_seq || commit_seq >= self.last_seq {
            self.have_seq = true;
            self.last_seq = commit_seq;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Default)]
pub struct OutputRegistry {
    arena: Arena<OutputId, Output>,
    order: Vec<OutputId>,
}

impl OutputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self), level = "debug")]
    pub fn insert(&mut self, name: String, full_area: Rectangle) -> OutputId {
        let id = self.arena.insert_with(|id| Output::new(id, name, full_area));
        self.order.push(id);
        id
    }

    /// Output destruction: the caller is responsible for
    /// cascading to views whose `foreign_output`/`fullscreen_output`
    /// equals `id` and to session-lock surface expectations before
    /// calling this.
    pub fn remove(&mut self, id: OutputId) -> Option<Output> {
        self.order.retain(|&o| o != id);
        self.arena.remove(id)
    }

    pub fn get(&self, id: OutputId) -> Option<&Output> {
        self.arena.get(id)
    }

    pub fn get_mut(&mut self, id: OutputId) -> Option<&mut Output> {
        self.arena.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Output> {
        self.order.iter().filter_map(move |&id| self.arena.get(id))
    }

    /// Output containing `point`, used by cursor-driven focus-follows
    /// and by `place_initial`'s "choose an output by cursor position".
    pub fn at_point(&self, point: crate::geometry::Point) -> Option<OutputId> {
        self.iter().find(|o| o.full_area.contains_point(point)).map(|o| o.id)
    }

    /// Fallback used when no output contains the cursor (e.g. during
    /// startup racing a hotplug): the layout's bounding-box center.
    pub fn layout_center_fallback(&self) -> Option<OutputId> {
        self.order.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn struts_shrink_usable_area() {
        let mut reg = OutputRegistry::new();
        let id = reg.insert("eDP-1".into(), Rectangle::new(0, 0, 1920, 1080));
        reg.get_mut(id).unwrap().set_struts(Struts { left: 0, top: 24, right: 0, bottom: 0 });
        let usable = reg.get(id).unwrap().usable_area();
        assert_eq!(usable, Rectangle::new(0, 24, 1920, 1056));
    }

    #[test]
    fn present_seq_rejects_lagging_commit() {
        let mut o = Output::new(OutputId::from_raw(0), "eDP-1".into(), Rectangle::new(0, 0, 1920, 1080));
        assert!(o.accept_present_seq(5));
        assert!(o.accept_present_seq(6));
        assert!(!o.accept_present_seq(5));
        assert!(o.accept_present_seq(6));
    }

    #[test]
    fn at_point_finds_containing_output() {
        let mut reg = OutputRegistry::new();
        let left = reg.insert("L".into(), Rectangle::new(0, 0, 1920, 1080));
        let right = reg.insert("R".into(), Rectangle::new(1920, 0, 1920, 1080));
        assert_eq!(reg.at_point(crate::geometry::Point::new(10, 10)), Some(left));
        assert_eq!(reg.at_point(crate::geometry::Point::new(1930, 10)), Some(right));
        assert_eq!(reg.at_point(crate::geometry::Point::new(5000, 10)), None);
    }

    #[test]
    fn remove_drops_from_iteration_order() {
        let mut reg = OutputRegistry::new();
        let a = reg.insert("A".into(), Rectangle::new(0, 0, 100, 100));
        let b = reg.insert("B".into(), Rectangle::new(100, 0, 100, 100));
        assert_eq!(reg.len(), 2);
        reg.remove(a);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.iter().next().unwrap().id, b);
    }
}
