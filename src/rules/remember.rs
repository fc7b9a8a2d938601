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

//! Remember-toggle / forget: flips one attribute of the single rule
//! matching a given view, creating an app-id-only rule if none matched
//! yet.

use crate::rules::Attributes;
use crate::rules::MatchCandidate;
use crate::rules::Predicate;
use crate::rules::Rule;
use crate::rules::RuleId;
use crate::rules::RuleSet;
use crate::utils::ArenaId as _;
use crate::view::FocusProtection;

/// The subset of `Attributes` fields a user can remember/forget via a
/// menu toggle or the IPC surface. Mirrors the source's per-attribute
/// "remember" menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RememberAttr {
    Sticky,
    Jump,
    Workspace,
    Minimized,
    Maximized,
    Fullscreen,
    Shaded,
    Tab,
    Decor,
    Layer,
    FocusProtection,
    SaveOnClose,
}

/// The live view values a toggle reads when flipping an attribute on
/// ("toggling an attribute that is currently unset stores the
/// view's current value").
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewSnapshot {
    pub sticky: bool,
    pub jump: bool,
    pub workspace: i32,
    pub minimized: bool,
    pub maximized_h: bool,
    pub maximized_v: bool,
    pub fullscreen: bool,
    pub shaded: bool,
    pub tab: bool,
    pub decor: crate::view::decoration::DecorMask,
    pub layer: i32,
    pub focus_protection: FocusProtection,
    pub save_on_close: bool,
}

fn regex_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Returns the single rule id matching `candidate`, creating a new
/// `(app_id)`-only rule (regex-escaped, exact match) if none did.
fn find_or_create<'a>(set: &'a mut RuleSet, candidate: &MatchCandidate<'_>) -> RuleId {
    if let Some((_, rule)) = set.find_first(candidate) {
        return rule.id;
    }
    let mut rule = Rule::new(RuleId::from_raw(0));
    if let Some(app_id) = candidate.app_id {
        rule.app_id = Predicate::new(&regex_escape(app_id), false);
    }
    set.push(rule)
}

/// Toggles `attr` on the rule matching `candidate`. Returns whether the
/// rule set changed (and thus whether a save should be triggered).
pub fn toggle(set: &mut RuleSet, candidate: &MatchCandidate<'_>, attr: RememberAttr, snapshot: ViewSnapshot) -> bool {
    let rule_id = find_or_create(set, candidate);
    let Some(rule) = set.get_mut(rule_id) else {
        return false;
    };
    let attrs = &mut rule.attrs;
    let changed = match attr {
        RememberAttr::Sticky => toggle_bool(&mut attrs.sticky, snapshot.sticky),
        RememberAttr::Jump => toggle_bool(&mut attrs.jump, snapshot.jump),
        RememberAttr::Workspace => toggle_opt(&mut attrs.workspace, snapshot.workspace),
        RememberAttr::Minimized => toggle_bool(&mut attrs.minimized, snapshot.minimized),
        RememberAttr::Maximized => {
            use crate::rules::Maximized;
            let want = match (snapshot.maximized_h, snapshot.maximized_v) {
                (true, true) => Maximized::Both,
                (true, false) => Maximized::Horizontal,
                (false, true) => Maximized::Vertical,
                (false, false) => Maximized::No,
            };
            toggle_opt(&mut attrs.maximized, want)
        },
        RememberAttr::Fullscreen => toggle_bool(&mut attrs.fullscreen, snapshot.fullscreen),
        RememberAttr::Shaded => toggle_bool(&mut attrs.shaded, snapshot.shaded),
        RememberAttr::Tab => toggle_bool(&mut attrs.tab, snapshot.tab),
        RememberAttr::Decor => toggle_opt(&mut attrs.decor, snapshot.decor),
        RememberAttr::Layer => toggle_opt(&mut attrs.layer, snapshot.layer),
        RememberAttr::FocusProtection => toggle_opt(&mut attrs.focus_protection, snapshot.focus_protection),
        RememberAttr::SaveOnClose => toggle_bool(&mut attrs.save_on_close, snapshot.save_on_close),
    };

    if changed {
        set.generation = set.generation.wrapping_add(1);
        // An app-id-only rule whose attributes are now fully empty is
        // kept, not deleted ("the rule remains... kept, logged as an
        // empty rule" S5).
        if attrs_unreferenced(attrs) {
            tracing::debug!(rule = %rule_id, "apps-rule now has no set attributes");
        }
    }
    changed
}

fn attrs_unreferenced(attrs: &Attributes) -> bool {
    attrs.is_empty()
}

fn toggle_bool(slot: &mut Option<bool>, current: bool) -> bool {
    match slot {
        Some(_) => {
            *slot = None;
            true
        },
        None => {
            *slot = Some(current);
            true
        },
    }
}

fn toggle_opt<T: Copy>(slot: &mut Option<T>, current: T) -> bool {
    match slot {
        Some(_) => {
            *slot = None;
            true
        },
        None => {
            *slot = Some(current);
            true
        },
    }
}

/// `forget`: clears every remembered attribute on the rule matching
/// `candidate`, leaving match predicates untouched.
pub fn forget(set: &mut RuleSet, candidate: &MatchCandidate<'_>) -> bool {
    let Some((_, rule)) = set.find_first(candidate) else {
        return false;
    };
    let id = rule.id;
    let Some(rule) = set.get_mut(id) else {
        return false;
    };
    let had_any = !rule.attrs.is_empty();
    rule.attrs = Attributes::default();
    if had_any {
        set.generation = set.generation.wrapping_add(1);
    }
    had_any
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate<'a>(app_id: &'a str) -> MatchCandidate<'a> {
        MatchCandidate { app_id: Some(app_id), instance: None, role: None, title: None }
    }

    #[test]
    fn scenario_s5_toggle_and_untoggle_sticky() {
        let mut set = RuleSet::new();
        let snap = ViewSnapshot { sticky: true, ..Default::default() };
        assert!(toggle(&mut set, &candidate("Example"), RememberAttr::Sticky, snap));
        assert_eq!(set.rules().len(), 1);
        assert_eq!(set.rules()[0].attrs.sticky, Some(true));

        assert!(toggle(&mut set, &candidate("Example"), RememberAttr::Sticky, snap));
        assert_eq!(set.rules()[0].attrs.sticky, None);
        // Rule persists even with no attributes set.
        assert_eq!(set.rules().len(), 1);
    }

    #[test]
    fn generation_bumps_on_change() {
        let mut set = RuleSet::new();
        let gen0 = set.generation;
        toggle(&mut set, &candidate("X"), RememberAttr::Jump, ViewSnapshot::default());
        assert!(set.generation != gen0);
    }

    #[test]
    fn forget_clears_all_attributes() {
        let mut set = RuleSet::new();
        toggle(&mut set, &candidate("X"), RememberAttr::Sticky, ViewSnapshot { sticky: true, ..Default::default() });
        toggle(&mut set, &candidate("X"), RememberAttr::Jump, ViewSnapshot { jump: true, ..Default::default() });
        assert!(forget(&mut set, &candidate("X")));
        assert!(set.rules()[0].attrs.is_empty());
    }
}
