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

//! The workspace-change OSD overlay: shows `"N: <name>"`
//! for a timeout, then hides.
//! `server_osd_ui_show_workspace`/`server_osd_hide_timer` pair — a
//! show call (re)arms a hide timer rather than stacking timers.

use std::time::Duration;
use std::time::Instant;

use crate::constants::OSD_DEFAULT_AUTO_HIDE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsdLabel {
    pub workspace: usize,
    pub name: String,
}

impl OsdLabel {
    /// The `"N: <name>"` text.
    pub fn text(&self) -> String {
        format!("{}: {}", self.workspace, self.name)
    }
}

/// Visible label plus the deadline its hide timer fires at. A new
/// `show` replaces both, so only the latest workspace change is ever
/// displayed (no queueing).
#[derive(Debug)]
struct Shown {
    label: OsdLabel,
    hides_at: Instant,
}

#[derive(Debug)]
pub struct Osd {
    auto_hide: Duration,
    shown: Option<Shown>,
}

impl Default for Osd {
    fn default() -> Self {
        Self::new(OSD_DEFAULT_AUTO_HIDE)
    }
}

impl Osd {
    pub fn new(auto_hide: Duration) -> Self {
        Self { auto_hide, shown: None }
    }

    pub fn is_visible(&self) -> bool {
        self.shown.is_some()
    }

    pub fn label(&self) -> Option<&OsdLabel> {
        self.shown.as_ref().map(|s| &s.label)
    }

    /// Shows `label`, (re)arming the hide timer from `now`.
    pub fn show(&mut self, label: OsdLabel, now: Instant) {
        self.shown = Some(Shown { label, hides_at: now + self.auto_hide });
    }

    /// Call on a tick; hides if the deadline has passed. Returns `true`
    /// if this call hid the OSD.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.shown {
            Some(s) if now >= s.hides_at => {
                self.shown = None;
                true
            },
            _ => false,
        }
    }

    pub fn hide(&mut self) {
        self.shown = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(n: usize) -> OsdLabel {
        OsdLabel { workspace: n, name: format!("Workspace {n}") }
    }

    #[test]
    fn text_format() {
        assert_eq!(label(3).text(), "3: Workspace 3");
    }

    #[test]
    fn show_then_tick_past_deadline_hides() {
        let mut osd = Osd::new(Duration::from_millis(100));
        let t0 = Instant::now();
        osd.show(label(1), t0);
        assert!(osd.is_visible());
        assert!(!osd.tick(t0 + Duration::from_millis(50)));
        assert!(osd.is_visible());
        assert!(osd.tick(t0 + Duration::from_millis(150)));
        assert!(!osd.is_visible());
    }

    #[test]
    fn second_show_replaces_and_rearms_timer() {
        let mut osd = Osd::new(Duration::from_millis(100));
        let t0 = Instant::now();
        osd.show(label(1), t0);
        osd.show(label(2), t0 + Duration::from_millis(80));
        // Original deadline (t0+100) has passed, but the second show
        // rearmed it to t0+180, so this tick must not hide it.
        assert!(!osd.tick(t0 + Duration::from_millis(120)));
        assert_eq!(osd.label(), Some(&label(2)));
    }

    #[test]
    fn hide_clears_immediately() {
        let mut osd = Osd::new(Duration::from_millis(100));
        osd.show(label(1), Instant::now());
        osd.hide();
        assert!(!osd.is_visible());
    }
}
