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

//! Tab-group policy: an ordered sequence of views sharing one drawn
//! frame, exactly one active at a time.

use crate::arena_id;
use crate::geometry::Rectangle;
use crate::view::ViewId;

arena_id!(TabGroupId);

#[derive(Debug)]
pub struct TabGroup {
    members: Vec<ViewId>,
    active_index: usize,
}

impl TabGroup {
    /// A group is created on first attach; `first` becomes the sole,
    /// active member.
    pub fn new(first: ViewId) -> Self {
        Self { members: vec![first], active_index: 0 }
    }

    pub fn members(&self) -> &[ViewId] {
        &self.members
    }

    pub fn active(&self) -> ViewId {
        self.members[self.active_index]
    }

    pub fn is_active(&self, view: ViewId) -> bool {
        self.active() == view
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, view: ViewId) -> bool {
        self.members.contains(&view)
    }

    /// Appends `view`; it does not become active.
    pub fn attach(&mut self, view: ViewId) {
        if !self.contains(view) {
            self.members.push(view);
        }
    }

    /// Removes `view`. If it was active, activates the member at the
    /// same index (clamped), or the new last member. Returns `true` if
    /// the group is now empty and should be destroyed: a tab group's
    /// lifetime ends when its member count drops to 0.
    pub fn detach(&mut self, view: ViewId) -> bool {
        if let Some(pos) = self.members.iter().position(|&v| v == view) {
            self.members.remove(pos);
            if self.members.is_empty() {
                return true;
            }
            if self.active_index >= self.members.len() {
                self.active_index = self.members.len() - 1;
            } else if pos < self.active_index {
                self.active_index -= 1;
            }
        }
        false
    }

    /// Activates `view` if it's a member; returns whether the active
    /// member changed.
    pub fn activate(&mut self, view: ViewId) -> bool {
        if let Some(pos) = self.members.iter().position(|&v| v == view) {
            if self.active_index != pos {
                self.active_index = pos;
                return true;
            }
        }
        false
    }

    pub fn next(&mut self) -> ViewId {
        self.active_index = (self.active_index + 1) % self.members.len();
        self.active()
    }

    pub fn prev(&mut self) -> ViewId {
        self.active_index = (self.active_index + self.members.len() - 1) % self.members.len();
        self.active()
    }
}

/// Geometry sync: when the active member's content rectangle changes,
/// every member takes the same rectangle — non-active members track
/// the active one.
pub fn synced_rect(active_rect: Rectangle) -> Rectangle {
    active_rect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ArenaId;

    fn vid(n: u64) -> ViewId {
        ViewId::from_raw(n)
    }

    #[test]
    fn new_group_single_active_member() {
        let g = TabGroup::new(vid(1));
        assert_eq!(g.active(), vid(1));
        assert!(g.is_active(vid(1)));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn attach_does_not_change_active() {
        let mut g = TabGroup::new(vid(1));
        g.attach(vid(2));
        assert_eq!(g.active(), vid(1));
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn detach_active_promotes_sibling() {
        let mut g = TabGroup::new(vid(1));
        g.attach(vid(2));
        g.attach(vid(3));
        g.activate(vid(2));
        assert!(!g.detach(vid(2)));
        // index 1 was removed; the member now at index 1 (vid(3)) becomes active.
        assert_eq!(g.active(), vid(3));
    }

    #[test]
    fn detach_last_member_signals_destroy() {
        let mut g = TabGroup::new(vid(1));
        assert!(g.detach(vid(1)));
        assert!(g.is_empty());
    }

    #[test]
    fn exactly_one_active_invariant_holds_through_churn() {
        let mut g = TabGroup::new(vid(1));
        g.attach(vid(2));
        g.attach(vid(3));
        for v in [vid(2), vid(3), vid(1), vid(2)] {
            g.activate(v);
            let actives = g.members().iter().filter(|&&m| g.is_active(m)).count();
            assert_eq!(actives, 1);
        }
    }

    #[test]
    fn next_prev_wrap() {
        let mut g = TabGroup::new(vid(1));
        g.attach(vid(2));
        g.attach(vid(3));
        assert_eq!(g.next(), vid(2));
        assert_eq!(g.next(), vid(3));
        assert_eq!(g.next(), vid(1));
        assert_eq!(g.prev(), vid(3));
    }
}
