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

//! The `server_action` catalog a menu item can carry. Dispatch itself
//! (what each action actually does to a live `Server`) lives outside
//! this crate's testable core, so this module only defines the catalog
//! and the toggle-state snapshot [`sync::SyncState`] needs to compute
//! `selected`/`toggle`.

use crate::focus::FocusModel;
use crate::placement::Direction;
use crate::placement::RowOrColumn;

/// A `server_action` menu item's action kind, with its `arg` already
/// typed per-variant instead of the source's bare `int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerActionKind {
    Reconfigure,
    SetStyle,
    SetWallpaper,
    SetFocusModel(FocusModel),
    ToggleAutoRaise,
    ToggleClickRaises,
    ToggleFocusNewWindows,
    SetWindowPlacement(crate::placement::Strategy),
    SetRowPlacementDirection(Direction),
    SetColPlacementDirection(Direction),
    WindowToggleShade,
    WindowToggleStick,
    WindowRaise,
    WindowLower,
    WindowSendToWorkspace(usize),
    WindowSetLayer(i32),
    WindowSetAlphaFocused(u8),
    WindowSetAlphaUnfocused(u8),
    WindowSetTitleDialog,
    SlitSetPlacement,
    SlitSetLayer(i32),
    SlitSetOnHead(usize),
    SlitToggleAutoHide,
    SlitToggleAutoRaise,
    SlitToggleMaxOver,
    SlitSetAlpha(u8),
    SlitCycleUp,
    SlitCycleDown,
    SlitToggleClientVisible,
}

impl ServerActionKind {
    /// Whether this action's item renders a checkable toggle: each item
    /// carries a `toggle: bool`.
    pub fn is_toggle(self) -> bool {
        matches!(
            self,
            ServerActionKind::SetFocusModel(_)
                | ServerActionKind::ToggleAutoRaise
                | ServerActionKind::ToggleClickRaises
                | ServerActionKind::ToggleFocusNewWindows
                | ServerActionKind::SetWindowPlacement(_)
                | ServerActionKind::SetRowPlacementDirection(_)
                | ServerActionKind::SetColPlacementDirection(_)
                | ServerActionKind::WindowToggleShade
                | ServerActionKind::WindowToggleStick
                | ServerActionKind::SlitToggleAutoHide
                | ServerActionKind::SlitToggleAutoRaise
                | ServerActionKind::SlitToggleMaxOver
                | ServerActionKind::SlitToggleClientVisible
        )
    }
}

/// The slice of live state a menu-open sync pass reads to compute
/// `selected`: recomputed whenever the menu is opened by syncing
/// against live state.
#[derive(Debug, Clone, Copy)]
pub struct SyncState {
    pub focus_model: FocusModel,
    pub auto_raise: bool,
    pub click_raises: bool,
    pub focus_new_windows: bool,
    pub placement_row_dir: Direction,
    pub placement_col_dir: Direction,
    pub view_shaded: Option<bool>,
    pub view_sticky: Option<bool>,
    pub slit_auto_hide: bool,
    pub slit_auto_raise: bool,
    pub slit_max_over: bool,
}

/// `selected` for a `server_action` item with this kind, against
/// `state`: exactly the item matching live state is selected; every
/// sibling in the same choice group is not.
pub fn is_selected(kind: ServerActionKind, state: &SyncState) -> bool {
    match kind {
        ServerActionKind::SetFocusModel(model) => state.focus_model == model,
        ServerActionKind::ToggleAutoRaise => state.auto_raise,
        ServerActionKind::ToggleClickRaises => state.click_raises,
        ServerActionKind::ToggleFocusNewWindows => state.focus_new_windows,
        ServerActionKind::SetRowPlacementDirection(dir) => state.placement_row_dir == dir,
        ServerActionKind::SetColPlacementDirection(dir) => state.placement_col_dir == dir,
        ServerActionKind::WindowToggleShade => state.view_shaded.unwrap_or(false),
        ServerActionKind::WindowToggleStick => state.view_sticky.unwrap_or(false),
        ServerActionKind::SlitToggleAutoHide => state.slit_auto_hide,
        ServerActionKind::SlitToggleAutoRaise => state.slit_auto_raise,
        ServerActionKind::SlitToggleMaxOver => state.slit_max_over,
        _ => false,
    }
}

/// Matches C's `FBWM_PLACE_*`/`FBWM_ROW_*`/`FBWM_COL_*` string helpers
/// (`window_placement_str`, `row_dir_str`): one name per catalog value,
/// used by both menu labels and the `dump-config` IPC reply.
pub fn placement_strategy_name(axis: RowOrColumn, strategy_is_min_overlap: bool, auto_tab: bool) -> &'static str {
    if auto_tab {
        return "autotab";
    }
    match (axis, strategy_is_min_overlap) {
        (RowOrColumn::Row, false) => "row_smart",
        (RowOrColumn::Column, false) => "col_smart",
        (RowOrColumn::Row, true) => "row_min_overlap",
        (RowOrColumn::Column, true) => "col_min_overlap",
    }
}
