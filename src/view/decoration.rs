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

//! Decoration layout. Frame extents, titlebar/button hit-testing,
//! tab-bar layout, and title-glyph cache invalidation.

use crate::geometry::FrameExtents;
use crate::geometry::Point;
use crate::geometry::Rectangle;

/// A tiny home-grown bitflags macro: no `bitflags` crate is in the
/// dependency stack, and a plain newtype-over-`u32` with `const`
/// associated bits covers the mask types this crate needs without
/// pulling in a new dependency.
macro_rules! bitflags_like {
    (
        $(#[$meta:meta])*
        pub struct $name:ident: $ty:ty {
            $(const $variant:ident = $value:expr;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
        pub struct $name(pub $ty);

        impl $name {
            $(pub const $variant: $name = $name($value);)*
            pub const NONE: $name = $name(0);

            pub const fn bits(self) -> $ty {
                self.0
            }

            pub const fn from_bits(bits: $ty) -> Self {
                Self(bits)
            }

            pub fn contains(self, other: $name) -> bool {
                (self.0 & other.0) == other.0
            }

            pub fn intersects(self, other: $name) -> bool {
                (self.0 & other.0) != 0
            }

            pub fn insert(&mut self, other: $name) {
                self.0 |= other.0;
            }

            pub fn remove(&mut self, other: $name) {
                self.0 &= !other.0;
            }

            pub fn set(&mut self, other: $name, value: bool) {
                if value {
                    self.insert(other);
                } else {
                    self.remove(other);
                }
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl std::ops::BitAnd for $name {
            type Output = $name;
            fn bitand(self, rhs: $name) -> $name {
                $name(self.0 & rhs.0)
            }
        }

        impl std::ops::Sub for $name {
            type Output = $name;
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 & !rhs.0)
            }
        }
    };
}

bitflags_like! {
    /// Decoration mask bits, matching Fluxbox/X11 `WindowState`.
    pub struct DecorMask: u32 {
        const TITLEBAR = 1 << 0;
        const HANDLE   = 1 << 1;
        const BORDER   = 1 << 2;
        const ICONIFY  = 1 << 3;
        const MAXIMIZE = 1 << 4;
        const CLOSE    = 1 << 5;
        const MENU     = 1 << 6;
        const STICKY   = 1 << 7;
        const SHADE    = 1 << 8;
        const TAB      = 1 << 9;
        const ENABLED  = 1 << 10;
    }
}

impl DecorMask {
    /// `LAST - 1`: every bit below the (implicit) 11th, i.e. all named
    /// bits.
    pub fn normal() -> DecorMask {
        DecorMask((1 << 11) - 1)
    }

    pub fn tiny() -> DecorMask {
        DecorMask::TITLEBAR | DecorMask::ICONIFY
    }

    pub fn tool() -> DecorMask {
        DecorMask::TITLEBAR
    }

    pub fn border_only() -> DecorMask {
        DecorMask::BORDER
    }

    pub fn tab() -> DecorMask {
        DecorMask::BORDER | DecorMask::TAB
    }

    pub fn has_frame(self) -> bool {
        self.intersects(DecorMask::TITLEBAR | DecorMask::HANDLE | DecorMask::BORDER | DecorMask::TAB)
    }

    /// Canonicalized preset name if `self` matches one exactly, for
    /// apps-rules round-tripping.
    pub fn preset_name(self) -> Option<&'static str> {
        match self {
            DecorMask::NONE => Some("NONE"),
            m if m == DecorMask::normal() => Some("NORMAL"),
            m if m == DecorMask::tiny() => Some("TINY"),
            m if m == DecorMask::tool() => Some("TOOL"),
            DecorMask::BORDER => Some("BORDER"),
            m if m == DecorMask::tab() => Some("TAB"),
            _ => None,
        }
    }

    pub fn parse_preset(name: &str) -> Option<DecorMask> {
        match name.to_ascii_uppercase().as_str() {
            "NONE" => Some(DecorMask::NONE),
            "NORMAL" => Some(DecorMask::normal()),
            "TINY" => Some(DecorMask::tiny()),
            "TOOL" => Some(DecorMask::tool()),
            "BORDER" => Some(DecorMask::BORDER),
            "TAB" => Some(DecorMask::tab()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTest {
    None,
    Titlebar,
    Resize(ResizeEdges),
    BtnClose,
    BtnMax,
    BtnMin,
}

bitflags_like! {
    pub struct ResizeEdges: u8 {
        const LEFT   = 1 << 0;
        const RIGHT  = 1 << 1;
        const TOP    = 1 << 2;
        const BOTTOM = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabBarPlacement {
    Top,
    Bottom,
    Left,
    Right,
}

/// Geometry knobs that would otherwise come from the (out-of-scope)
/// resolved style sheet: border width and titlebar height.
#[derive(Debug, Clone, Copy)]
pub struct DecorationTheme {
    pub border_width: i32,
    pub title_height: i32,
    pub button_width: i32,
}

impl Default for DecorationTheme {
    fn default() -> Self {
        Self { border_width: 1, title_height: 24, button_width: 18 }
    }
}

/// Frame extents implied by a decoration mask ("Decoration"):
/// if the mask has any of TITLEBAR|HANDLE|BORDER|TAB, left/right come
/// from `border_width`, top from `title_height + border_width`, bottom
/// from `border_width`; otherwise the frame is empty.
pub fn frame_extents(mask: DecorMask, theme: &DecorationTheme) -> FrameExtents {
    if !mask.has_frame() {
        return FrameExtents::NONE;
    }
    FrameExtents {
        left: theme.border_width,
        top: theme.title_height + theme.border_width,
        right: theme.border_width,
        bottom: theme.border_width,
    }
}

/// Titlebar button layout: close/max/min are right-to-left packed into
/// the top-right of the titlebar, in that enabled-bit order, each
/// `button_width` wide, flush against the frame's right border.
fn titlebar_buttons(mask: DecorMask, frame: Rectangle, theme: &DecorationTheme) -> Vec<(DecorMask, Rectangle)> {
    let mut buttons = Vec::new();
    let mut x = frame.right() - theme.border_width;
    for bit in [DecorMask::CLOSE, DecorMask::MAXIMIZE, DecorMask::ICONIFY] {
        if mask.contains(bit) {
            x -= theme.button_width;
            buttons.push((
                bit,
                Rectangle::new(x, frame.y + theme.border_width, theme.button_width, theme.title_height),
            ));
        }
    }
    buttons
}

/// Hit-test a point against a view's frame, given its content rect,
/// decoration mask, and theme. `edge_threshold` is how many pixels from
/// a border edge still count as a resize grip.
pub fn hit_test(
    point: Point,
    content: Rectangle,
    mask: DecorMask,
    theme: &DecorationTheme,
    edge_threshold: i32,
) -> HitTest {
    let fe = frame_extents(mask, theme);
    let frame = fe.frame_rect(content);
    if !frame.contains_point(point) {
        return HitTest::None;
    }

    if mask.contains(DecorMask::TITLEBAR) {
        let titlebar = Rectangle::new(frame.x, frame.y, frame.width, fe.top);
        if titlebar.contains_point(point) {
            for (bit, rect) in titlebar_buttons(mask, frame, theme) {
                if rect.contains_point(point) {
                    return match bit {
                        DecorMask::CLOSE => HitTest::BtnClose,
                        DecorMask::MAXIMIZE => HitTest::BtnMax,
                        DecorMask::ICONIFY => HitTest::BtnMin,
                        _ => unreachable!(),
                    };
                }
            }
            return HitTest::Titlebar;
        }
    }

    if mask.intersects(DecorMask::HANDLE | DecorMask::BORDER) {
        let mut edges = ResizeEdges::NONE;
        if point.x < frame.x + edge_threshold {
            edges.insert(ResizeEdges::LEFT);
        }
        if point.x >= frame.right() - edge_threshold {
            edges.insert(ResizeEdges::RIGHT);
        }
        if point.y < frame.y + edge_threshold {
            edges.insert(ResizeEdges::TOP);
        }
        if point.y >= frame.bottom() - edge_threshold {
            edges.insert(ResizeEdges::BOTTOM);
        }
        if edges != ResizeEdges::NONE {
            return HitTest::Resize(edges);
        }
    }

    HitTest::None
}

/// Per-`(text, width, active)` title glyph cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TitleCacheKey {
    pub text: String,
    pub width: i32,
    pub active: bool,
}

/// Tracks whether a cached title render is still valid. The actual
/// glyph rasterization is delegated to the out-of-scope text-buffer
/// service (); this just decides when to ask it again.
#[derive(Debug, Default)]
pub struct TitleCache {
    key: Option<TitleCacheKey>,
}

impl TitleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `key` already matches the cached one (no
    /// re-render needed).
    pub fn is_valid(&self, key: &TitleCacheKey) -> bool {
        self.key.as_ref() == Some(key)
    }

    pub fn store(&mut self, key: TitleCacheKey) {
        self.key = Some(key);
    }

    /// Theme change or title change invalidates unconditionally.
    pub fn invalidate(&mut self) {
        self.key = None;
    }
}

/// Per-tab `(offset, length)` layout along the bar's major axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabSlot {
    pub offset: i32,
    pub length: i32,
}

/// Lay out `count` equal-width tabs along `bar_length`, the last one
/// absorbing any remainder so the slots tile exactly.
pub fn layout_tab_slots(count: usize, bar_length: i32) -> Vec<TabSlot> {
    if count == 0 {
        return Vec::new();
    }
    let base = bar_length / count as i32;
    let mut slots = Vec::with_capacity(count);
    let mut offset = 0;
    for i in 0..count {
        let length = if i + 1 == count { bar_length - offset } else { base };
        slots.push(TabSlot { offset, length });
        offset += length;
    }
    slots
}

/// `tabs_bar_contains`: whether `point` (in the view's local/frame
/// coordinate space) lies within the tab bar strip.
pub fn tabs_bar_contains(
    point: Point,
    frame: Rectangle,
    placement: TabBarPlacement,
    bar_thickness: i32,
) -> bool {
    let bar = match placement {
        TabBarPlacement::Top => Rectangle::new(frame.x, frame.y, frame.width, bar_thickness),
        TabBarPlacement::Bottom => {
            Rectangle::new(frame.x, frame.bottom() - bar_thickness, frame.width, bar_thickness)
        },
        TabBarPlacement::Left => Rectangle::new(frame.x, frame.y, bar_thickness, frame.height),
        TabBarPlacement::Right => {
            Rectangle::new(frame.right() - bar_thickness, frame.y, bar_thickness, frame.height)
        },
    };
    bar.contains_point(point)
}

/// `tabs_index_at`: which tab (if any) a point over the bar falls on.
pub fn tabs_index_at(
    point: Point,
    frame: Rectangle,
    placement: TabBarPlacement,
    bar_thickness: i32,
    slots: &[TabSlot],
) -> Option<usize> {
    if !tabs_bar_contains(point, frame, placement, bar_thickness) {
        return None;
    }
    let along = match placement {
        TabBarPlacement::Top | TabBarPlacement::Bottom => point.x - frame.x,
        TabBarPlacement::Left | TabBarPlacement::Right => point.y - frame.y,
    };
    slots
        .iter()
        .position(|slot| along >= slot.offset && along < slot.offset + slot.length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_canonicalization_roundtrip() {
        // parse(canonical_name(m)) == m for each preset.
        for m in [
            DecorMask::NONE,
            DecorMask::normal(),
            DecorMask::tiny(),
            DecorMask::tool(),
            DecorMask::BORDER,
            DecorMask::tab(),
        ] {
            let name = m.preset_name().expect("named preset");
            assert_eq!(DecorMask::parse_preset(name), Some(m));
        }
    }

    #[test]
    fn frame_extents_none_without_frame_bits() {
        let theme = DecorationTheme::default();
        assert_eq!(frame_extents(DecorMask::MENU, &theme), FrameExtents::NONE);
    }

    #[test]
    fn frame_extents_present_with_titlebar() {
        let theme = DecorationTheme { border_width: 4, title_height: 24, button_width: 18 };
        let fe = frame_extents(DecorMask::TITLEBAR | DecorMask::BORDER, &theme);
        assert_eq!(fe, FrameExtents { left: 4, top: 28, right: 4, bottom: 4 });
    }

    #[test]
    fn hit_test_titlebar_vs_close_button() {
        let theme = DecorationTheme { border_width: 4, title_height: 24, button_width: 18 };
        let content = Rectangle::new(100, 100, 400, 300);
        let mask = DecorMask::normal();
        let fe = frame_extents(mask, &theme);
        let frame = fe.frame_rect(content);

        let close_center = Point::new(frame.right() - theme.border_width - theme.button_width / 2, frame.y + 5);
        assert_eq!(hit_test(close_center, content, mask, &theme, 6), HitTest::BtnClose);

        let plain_titlebar = Point::new(frame.x + 50, frame.y + 5);
        assert_eq!(hit_test(plain_titlebar, content, mask, &theme, 6), HitTest::Titlebar);
    }

    #[test]
    fn hit_test_resize_edge() {
        let theme = DecorationTheme::default();
        let content = Rectangle::new(0, 0, 200, 200);
        let mask = DecorMask::BORDER;
        let frame = frame_extents(mask, &theme).frame_rect(content);
        let bottom_right = Point::new(frame.right() - 1, frame.bottom() - 1);
        let HitTest::Resize(edges) = hit_test(bottom_right, content, mask, &theme, 6) else {
            panic!("expected resize hit")
        };
        assert!(edges.contains(ResizeEdges::RIGHT));
        assert!(edges.contains(ResizeEdges::BOTTOM));
    }

    #[test]
    fn hit_test_outside_frame_is_none() {
        let theme = DecorationTheme::default();
        let content = Rectangle::new(0, 0, 200, 200);
        assert_eq!(
            hit_test(Point::new(-10, -10), content, DecorMask::normal(), &theme, 6),
            HitTest::None
        );
    }

    #[test]
    fn title_cache_invalidation() {
        let mut cache = TitleCache::new();
        let k1 = TitleCacheKey { text: "a".into(), width: 100, active: true };
        assert!(!cache.is_valid(&k1));
        cache.store(k1.clone());
        assert!(cache.is_valid(&k1));
        let k2 = TitleCacheKey { text: "a".into(), width: 100, active: false };
        assert!(!cache.is_valid(&k2));
        cache.invalidate();
        assert!(!cache.is_valid(&k1));
    }

    #[test]
    fn tab_slot_layout_tiles_exactly() {
        let slots = layout_tab_slots(3, 100);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0], TabSlot { offset: 0, length: 33 });
        assert_eq!(slots[1], TabSlot { offset: 33, length: 33 });
        assert_eq!(slots[2], TabSlot { offset: 66, length: 34 });
        assert_eq!(slots.last().unwrap().offset + slots.last().unwrap().length, 100);
    }

    #[test]
    fn tabs_index_at_picks_right_slot() {
        let frame = Rectangle::new(0, 0, 300, 200);
        let slots = layout_tab_slots(3, 300);
        let idx = tabs_index_at(Point::new(150, 5), frame, TabBarPlacement::Top, 24, &slots);
        assert_eq!(idx, Some(1));
        let idx_outside = tabs_index_at(Point::new(150, 100), frame, TabBarPlacement::Top, 24, &slots);
        assert_eq!(idx_outside, None);
    }
}
