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

//! The menu tree: item kinds, toggle/selected sync against
//! live state, single-root-open policy, and selection navigation.
//! Rendering itself is out of this crate's testable core; this module
//! owns the tree and its state transitions.

pub mod actions;

use crate::view::ViewId;

pub use actions::ServerActionKind;
pub use actions::SyncState;

/// One menu action on a view (`view_action(kind)`). Distinct
/// from [`ServerActionKind`]: these always target the view the menu was
/// opened for, never a typed argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewActionKind {
    Close,
    Iconify,
    ToggleMaximize,
    ToggleShade,
    ToggleStick,
    ToggleFullscreen,
    Kill,
    SendToWorkspaceNext,
    SendToWorkspacePrev,
    Lower,
    Raise,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Exec(String),
    Exit,
    Submenu(Menu),
    ServerAction { kind: ServerActionKind, arg: i64, cmd: Option<String> },
    ViewAction(ViewActionKind),
    WorkspaceSwitch(usize),
    Nop(String),
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub label: String,
    pub kind: ItemKind,
    pub toggle: bool,
    pub selected: bool,
}

impl Item {
    pub fn new(label: impl Into<String>, kind: ItemKind) -> Self {
        Self { label: label.into(), kind, toggle: false, selected: false }
    }

    fn sync(&mut self, state: &SyncState) {
        match &mut self.kind {
            ItemKind::ServerAction { kind, .. } => {
                self.toggle = kind.is_toggle();
                self.selected = actions::is_selected(*kind, state);
            },
            ItemKind::Submenu(menu) => menu.sync(state),
            _ => {
                self.toggle = false;
                self.selected = false;
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub title: String,
    pub items: Vec<Item>,
}

impl Menu {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), items: Vec::new() }
    }

    pub fn push(&mut self, item: Item) -> &mut Self {
        self.items.push(item);
        self
    }

    /// Recomputes every item's `toggle`/`selected` against `state`
    /// ("recomputed whenever the menu is opened").
    pub fn sync(&mut self, state: &SyncState) {
        for item in &mut self.items {
            item.sync(state);
        }
    }

    /// Index of the first item whose label begins with `letter`
    /// (case-insensitive), starting the search just after `from`
    /// and wrapping around ("first-letter keys jump").
    pub fn jump_index(&self, from: Option<usize>, letter: char) -> Option<usize> {
        let letter = letter.to_ascii_lowercase();
        let n = self.items.len();
        if n == 0 {
            return None;
        }
        let start = from.map(|i| (i + 1) % n).unwrap_or(0);
        (0..n).map(|i| (start + i) % n).find(|&i| self.items[i].label.chars().next().map(|c| c.to_ascii_lowercase()) == Some(letter))
    }
}

/// One level of open submenus, root-first ("submenus open to
/// the right of their parent's item").
#[derive(Debug, Default)]
pub struct MenuStack {
    /// `(menu, selected item index)` per open level.
    levels: Vec<(Menu, Option<usize>)>,
    /// The view this menu was opened for, if any (so `view_action`
    /// items have a target).
    target: Option<ViewId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved,
    OpenedSubmenu,
    ClosedSubmenu,
    /// Item at this stack depth was activated; caller dispatches it.
    Activated,
    NoOp,
}

impl MenuStack {
    pub fn new() -> Self {
        Self { levels: Vec::new(), target: None }
    }

    pub fn is_open(&self) -> bool {
        !self.levels.is_empty()
    }

    pub fn target(&self) -> Option<ViewId> {
        self.target
    }

    /// Opens `root` as the new root menu, replacing any menu already
    /// open ("exactly one root menu at a time; opening a new
    /// root closes the prior").
    pub fn open_root(&mut self, mut root: Menu, state: &SyncState, target: Option<ViewId>) {
        root.sync(state);
        self.levels.clear();
        self.levels.push((root, None));
        self.target = target;
    }

    pub fn close(&mut self) {
        self.levels.clear();
        self.target = None;
    }

    fn top(&self) -> Option<&(Menu, Option<usize>)> {
        self.levels.last()
    }

    fn top_mut(&mut self) -> Option<&mut (Menu, Option<usize>)> {
        self.levels.last_mut()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.top().and_then(|(_, sel)| *sel)
    }

    pub fn current_menu(&self) -> Option<&Menu> {
        self.top().map(|(m, _)| m)
    }

    /// Arrow down: moves selection to the next item, wrapping.
    pub fn move_next(&mut self) -> NavOutcome {
        let Some((menu, sel)) = self.top_mut() else { return NavOutcome::NoOp };
        if menu.items.is_empty() {
            return NavOutcome::NoOp;
        }
        *sel = Some(sel.map(|i| (i + 1) % menu.items.len()).unwrap_or(0));
        NavOutcome::Moved
    }

    /// Arrow up: moves selection to the previous item, wrapping.
    pub fn move_prev(&mut self) -> NavOutcome {
        let Some((menu, sel)) = self.top_mut() else { return NavOutcome::NoOp };
        let n = menu.items.len();
        if n == 0 {
            return NavOutcome::NoOp;
        }
        *sel = Some(sel.map(|i| (i + n - 1) % n).unwrap_or(n - 1));
        NavOutcome::Moved
    }

    /// Right arrow: opens the selected item's submenu, if it is one.
    pub fn open_selected_submenu(&mut self, state: &SyncState) -> NavOutcome {
        let Some((menu, Some(idx))) = self.top() else { return NavOutcome::NoOp };
        let Some(item) = menu.items.get(*idx) else { return NavOutcome::NoOp };
        let ItemKind::Submenu(sub) = &item.kind else { return NavOutcome::NoOp };
        let mut sub = sub.clone();
        sub.sync(state);
        self.levels.push((sub, None));
        NavOutcome::OpenedSubmenu
    }

    /// Left arrow: closes the current submenu level, unless it is the
    /// root (left on the root is a no-op, not a close).
    pub fn close_submenu(&mut self) -> NavOutcome {
        if self.levels.len() <= 1 {
            return NavOutcome::NoOp;
        }
        self.levels.pop();
        NavOutcome::ClosedSubmenu
    }

    /// Enter: activates the selected item. Returns the item kind for
    /// the caller to dispatch; a `submenu` activation instead opens it
    /// in place, same as Right.
    pub fn activate_selected(&mut self, state: &SyncState) -> Option<ItemKind> {
        let (menu, idx) = self.top()?;
        let idx = (*idx)?;
        let item = menu.items.get(idx)?;
        if matches!(item.kind, ItemKind::Submenu(_)) {
            self.open_selected_submenu(state);
            return None;
        }
        Some(item.kind.clone())
    }

    /// First-letter jump at the current level.
    pub fn jump_to_letter(&mut self, letter: char) -> NavOutcome {
        let Some((menu, sel)) = self.top_mut() else { return NavOutcome::NoOp };
        match menu.jump_index(*sel, letter) {
            Some(idx) => {
                *sel = Some(idx);
                NavOutcome::Moved
            },
            None => NavOutcome::NoOp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::focus::FocusModel;
    use crate::placement::Direction;

    fn state() -> SyncState {
        SyncState {
            focus_model: FocusModel::MouseFocus,
            auto_raise: false,
            click_raises: true,
            focus_new_windows: true,
            placement_row_dir: Direction::LeftToRight,
            placement_col_dir: Direction::LeftToRight,
            view_shaded: None,
            view_sticky: None,
            slit_auto_hide: false,
            slit_auto_raise: false,
            slit_max_over: false,
        }
    }

    fn focus_item(model: FocusModel) -> Item {
        Item::new(
            format!("{model:?}"),
            ItemKind::ServerAction { kind: ServerActionKind::SetFocusModel(model), arg: 0, cmd: None },
        )
    }

    #[test]
    fn scenario_s6_menu_sync() {
        let mut root = Menu::new("root");
        root.push(focus_item(FocusModel::ClickToFocus));
        root.push(focus_item(FocusModel::MouseFocus));
        root.push(focus_item(FocusModel::StrictMouseFocus));
        root.push(Item::new("Auto raise", ItemKind::ServerAction { kind: ServerActionKind::ToggleAutoRaise, arg: 0, cmd: None }));
        root.sync(&state());

        assert!(!root.items[0].selected);
        assert!(root.items[1].selected && root.items[1].toggle);
        assert!(!root.items[2].selected);
        assert!(root.items[3].toggle && !root.items[3].selected);
    }

    #[test]
    fn opening_new_root_closes_prior() {
        let mut stack = MenuStack::new();
        let mut first = Menu::new("first");
        first.push(Item::new("a", ItemKind::Exit));
        stack.open_root(first, &state(), None);
        stack.move_next();
        assert_eq!(stack.selected_index(), Some(0));

        let second = Menu::new("second");
        stack.open_root(second, &state(), None);
        assert_eq!(stack.levels.len(), 1);
        assert_eq!(stack.current_menu().unwrap().title, "second");
        assert_eq!(stack.selected_index(), None);
    }

    #[test]
    fn right_opens_submenu_left_closes_it() {
        let mut sub = Menu::new("sub");
        sub.push(Item::new("x", ItemKind::Exit));
        let mut root = Menu::new("root");
        root.push(Item::new("go", ItemKind::Submenu(sub)));

        let mut stack = MenuStack::new();
        stack.open_root(root, &state(), None);
        stack.move_next();
        assert_eq!(stack.open_selected_submenu(&state()), NavOutcome::OpenedSubmenu);
        assert_eq!(stack.current_menu().unwrap().title, "sub");
        assert_eq!(stack.close_submenu(), NavOutcome::ClosedSubmenu);
        assert_eq!(stack.current_menu().unwrap().title, "root");
        // Left on the root itself is a no-op.
        assert_eq!(stack.close_submenu(), NavOutcome::NoOp);
    }

    #[test]
    fn enter_activates_leaf_item() {
        let mut root = Menu::new("root");
        root.push(Item::new("quit", ItemKind::Exit));
        let mut stack = MenuStack::new();
        stack.open_root(root, &state(), None);
        stack.move_next();
        assert_eq!(stack.activate_selected(&state()), Some(ItemKind::Exit));
    }

    #[test]
    fn first_letter_jump_wraps_and_is_case_insensitive() {
        let mut root = Menu::new("root");
        root.push(Item::new("Apple", ItemKind::Exit));
        root.push(Item::new("Banana", ItemKind::Exit));
        root.push(Item::new("apricot", ItemKind::Exit));
        let mut stack = MenuStack::new();
        stack.open_root(root, &state(), None);

        assert_eq!(stack.jump_to_letter('A'), NavOutcome::Moved);
        assert_eq!(stack.selected_index(), Some(0));
        // Jumping again from index 0 should land on "apricot" (index 2), not "Apple" again.
        assert_eq!(stack.jump_to_letter('a'), NavOutcome::Moved);
        assert_eq!(stack.selected_index(), Some(2));
    }
}
