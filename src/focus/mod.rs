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

//! Focus & input dispatch. [`keys`] holds the
//! key pipeline, [`pointer`] the motion/constraint pipeline, and
//! [`mousebind`] the drag-capture state machine for button bindings.

pub mod keys;
pub mod mousebind;
pub mod pointer;

use crate::view::ViewId;

/// Per-screen (or global-default) click policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusModel {
    #[default]
    ClickToFocus,
    MouseFocus,
    StrictMouseFocus,
}

/// Why a focus change was requested; carried through so the log and
/// any downstream "jump to" logic can explain itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusReason {
    None,
    PointerClick,
    PointerMotion,
    KeyBind,
    Map,
    Activate,
}

/// The focus state machine's own bookkeeping; everything it decides is
/// expressed as a [`FocusEffect`] the caller applies against the
/// backend and the view arena (this module never touches either).
#[derive(Debug, Default)]
pub struct FocusState {
    pub model: FocusModel,
    pub focused: Option<ViewId>,
    pub auto_raise: bool,
    pub auto_raise_delay_ms: u64,
    pub auto_raise_pending: Option<ViewId>,
}

/// What the caller must do to realize a focus decision. Returned as
/// data rather than performed here because the backend calls (toplevel
/// activate, keyboard enter, foreign-toplevel notify) all need a live
/// Wayland client handle this module doesn't have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusEffect {
    NoOp,
    Refused,
    Changed { deactivated: Option<ViewId>, activated: ViewId, raise_now: bool, arm_auto_raise: bool },
}

impl FocusState {
    pub fn new(model: FocusModel, auto_raise: bool, auto_raise_delay_ms: u64) -> Self {
        Self { model, focused: None, auto_raise, auto_raise_delay_ms, auto_raise_pending: None }
    }

    /// `focus_view` (steps 1-5). `session_locked` models step
    /// 1; the caller is expected to have already checked the view is
    /// mappable/not destroyed.
    pub fn focus_view(&mut self, view: ViewId, reason: FocusReason, session_locked: bool) -> FocusEffect {
        if session_locked {
            return FocusEffect::Refused;
        }
        if self.focused == Some(view) {
            return FocusEffect::NoOp;
        }
        let deactivated = self.focused.take();
        self.focused = Some(view);

        let (raise_now, arm_auto_raise) = if !self.auto_raise {
            (false, false)
        } else if reason == FocusReason::PointerMotion && self.auto_raise_delay_ms > 0 {
            self.auto_raise_pending = Some(view);
            (false, true)
        } else {
            (true, false)
        };

        FocusEffect::Changed { deactivated, activated: view, raise_now, arm_auto_raise }
    }

    /// Fired when the auto-raise timer expires; `None` if the pending
    /// view changed focus again (or unfocused) before the timer fired.
    pub fn auto_raise_fire(&mut self) -> Option<ViewId> {
        self.auto_raise_pending.take().filter(|v| self.focused == Some(*v))
    }

    /// Output/view destruction cancels any pending auto-raise pointing
    /// at it (Cancellation).
    pub fn cancel_auto_raise_for(&mut self, view: ViewId) {
        if self.auto_raise_pending == Some(view) {
            self.auto_raise_pending = None;
        }
    }

    pub fn clear(&mut self) -> Option<ViewId> {
        self.auto_raise_pending = None;
        self.focused.take()
    }

    /// `strict-mouse-focus`'s z-order re-check: called after any
    /// event that changes stacking, with the view currently under
    /// the cursor. Returns the view to focus if it differs from the
    /// live focus and the model demands it.
    pub fn restack_recheck(&self, under_cursor: Option<ViewId>) -> Option<ViewId> {
        if self.model != FocusModel::StrictMouseFocus {
            return None;
        }
        match under_cursor {
            Some(v) if Some(v) != self.focused => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vid(n: u64) -> ViewId {
        use crate::utils::ArenaId as _;
        ViewId::from_raw(n)
    }

    #[test]
    fn focusing_same_view_is_noop() {
        let mut fs = FocusState::new(FocusModel::ClickToFocus, false, 0);
        fs.focus_view(vid(1), FocusReason::Map, false);
        assert_eq!(fs.focus_view(vid(1), FocusReason::Map, false), FocusEffect::NoOp);
    }

    #[test]
    fn session_locked_refuses() {
        let mut fs = FocusState::new(FocusModel::ClickToFocus, true, 0);
        assert_eq!(fs.focus_view(vid(1), FocusReason::KeyBind, true), FocusEffect::Refused);
        assert_eq!(fs.focused, None);
    }

    #[test]
    fn pointer_motion_with_delay_arms_auto_raise_instead_of_raising() {
        let mut fs = FocusState::new(FocusModel::MouseFocus, true, 250);
        let effect = fs.focus_view(vid(1), FocusReason::PointerMotion, false);
        assert_eq!(effect, FocusEffect::Changed { deactivated: None, activated: vid(1), raise_now: false, arm_auto_raise: true });
        assert_eq!(fs.auto_raise_pending, Some(vid(1)));
    }

    #[test]
    fn keybind_focus_raises_immediately() {
        let mut fs = FocusState::new(FocusModel::ClickToFocus, true, 250);
        let effect = fs.focus_view(vid(1), FocusReason::KeyBind, false);
        assert_eq!(effect, FocusEffect::Changed { deactivated: None, activated: vid(1), raise_now: true, arm_auto_raise: false });
    }

    #[test]
    fn auto_raise_fire_is_stale_safe() {
        let mut fs = FocusState::new(FocusModel::MouseFocus, true, 250);
        fs.focus_view(vid(1), FocusReason::PointerMotion, false);
        fs.focus_view(vid(2), FocusReason::PointerMotion, false);
        // vid(1)'s timer fires after focus already moved to vid(2).
        assert_eq!(fs.auto_raise_fire(), None);
    }

    #[test]
    fn strict_mouse_focus_rechecks_after_restack() {
        let mut fs = FocusState::new(FocusModel::StrictMouseFocus, false, 0);
        fs.focus_view(vid(1), FocusReason::Map, false);
        assert_eq!(fs.restack_recheck(Some(vid(2))), Some(vid(2)));
        assert_eq!(fs.restack_recheck(Some(vid(1))), None);
        assert_eq!(fs.restack_recheck(None), None);
    }

    #[test]
    fn click_to_focus_ignores_restack_recheck() {
        let fs = FocusState::new(FocusModel::ClickToFocus, false, 0);
        assert_eq!(fs.restack_recheck(Some(vid(2))), None);
    }
}
