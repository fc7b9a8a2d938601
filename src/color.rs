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

//! Color & parse utilities. The style-sheet grammar itself
//! (Xresources-like `key: value` lines) is out of scope; this module is
//! what the out-of-scope loader hands resolved string values to, and
//! what the apps-rules loader (`rules::persist`) uses for `Dimensions`
//! and `Position` payload tokens.

use crate::prelude::*;

/// Straight 8-bit RGBA, matching how the source stores parsed colors
/// before handing them to the renderer (out of scope here).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    /// `format(parse(s)) == s` for any valid `#RRGGBBAA`.
    pub fn format_hex8(self) -> String {
        format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
    }
}

fn named_color(name: &str) -> Option<Rgba> {
    let rgb = match name.to_ascii_lowercase().as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "gray" | "grey" => (128, 128, 128),
        "red" => (255, 0, 0),
        "green" => (0, 255, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "cyan" => (0, 255, 255),
        "magenta" => (255, 0, 255),
        "none" | "transparent" => return Some(Rgba::new(0, 0, 0, 0)),
        _ => return None,
    };
    Some(Rgba::new(rgb.0, rgb.1, rgb.2, 255))
}

fn parse_hex_digits(s: &str) -> Option<u8> {
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(s, 16).ok()
}

/// `#RRGGBB` or `#RRGGBBAA`, leading `#` optional, whitespace-trimmed.
pub fn parse_hex_color(s: &str) -> Option<Rgba> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    match s.len() {
        6 => Some(Rgba::new(
            parse_hex_digits(&s[0..2])?,
            parse_hex_digits(&s[2..4])?,
            parse_hex_digits(&s[4..6])?,
            255,
        )),
        8 => Some(Rgba::new(
            parse_hex_digits(&s[0..2])?,
            parse_hex_digits(&s[2..4])?,
            parse_hex_digits(&s[4..6])?,
            parse_hex_digits(&s[6..8])?,
        )),
        _ => None,
    }
}

/// X11-style `rgb:RRRR/GGGG/BBBB`, 1-4 hex digits per component, scaled
/// to the 0..=65535 range then down to 8 bits.
fn parse_rgb_colon(s: &str) -> Option<Rgba> {
    let mut parts = s.split('/');
    let (r, g, b) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let scale = |tok: &str| -> Option<u8> {
        if tok.is_empty() || tok.len() > 4 || !tok.bytes().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let v = u32::from_str_radix(tok, 16).ok()?;
        let max = (1u32 << (tok.len() * 4)) - 1;
        let scaled16 = if max == 0 { 0 } else { (v * 65535 + max / 2) / max };
        Some((scaled16 >> 8) as u8)
    };
    Some(Rgba::new(scale(r)?, scale(g)?, scale(b)?, 255))
}

/// X11-style `rgbi:R.R/G.G/B.B`, floats in `0.0..=1.0`.
fn parse_rgbi_colon(s: &str) -> Option<Rgba> {
    let mut parts = s.split('/');
    let (r, g, b) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let scale = |tok: &str| -> Option<u8> {
        let f: f64 = tok.parse().ok()?;
        if !(0.0..=1.0).contains(&f) {
            return None;
        }
        Some((f * 255.0).round() as u8)
    };
    Some(Rgba::new(scale(r)?, scale(g)?, scale(b)?, 255))
}

/// Parse any of `#RRGGBB[AA]`, `rgb:`, `rgbi:`, or a named color.
/// Unrecognized input yields `None`; callers fall back to a default per
/// ("invalid color: the default is used").
pub fn parse_color(s: &str) -> Option<Rgba> {
    let s = s.trim();
    if let Some(c) = parse_hex_color(s) {
        return Some(c);
    }
    if let Some(rest) = s.strip_prefix("rgb:").or_else(|| s.strip_prefix("RGB:")) {
        return parse_rgb_colon(rest);
    }
    if let Some(rest) = s.strip_prefix("rgbi:").or_else(|| s.strip_prefix("RGBI:")) {
        return parse_rgbi_colon(rest);
    }
    named_color(s)
}

/// `yes`/`no`/`true`/`false`/`1`/`0`, case-insensitive.
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Some(true),
        "no" | "false" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// An integer, optionally suffixed with `%`, as used by `Dimensions` and
/// `Position` attribute payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntOrPercent {
    pub value: i32,
    pub percent: bool,
}

impl IntOrPercent {
    /// Resolve against a reference extent when `percent` is set.
    pub fn resolve(self, reference: i32) -> i32 {
        if self.percent {
            (reference as i64 * self.value as i64 / 100) as i32
        } else {
            self.value
        }
    }
}

pub fn parse_int_with_percent(token: &str) -> Option<IntOrPercent> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    let (digits, percent) = match token.strip_suffix('%') {
        Some(d) => (d, true),
        None => (token, false),
    };
    let value: i32 = digits.parse().ok()?;
    Some(IntOrPercent { value, percent })
}

/// The 9-way anchor grid used by apps-rule `Position` and icon
/// placement. Recognizes `wincen`/`wincenter` aliases for `center`.
/// Unknown input defaults to `TopLeft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    TopLeft,
    Left,
    BottomLeft,
    Top,
    Center,
    Bottom,
    TopRight,
    Right,
    BottomRight,
}

impl Anchor {
    pub fn parse(s: &str) -> (Anchor, bool) {
        match s.trim().to_ascii_lowercase().as_str() {
            "topleft" => (Anchor::TopLeft, true),
            "left" => (Anchor::Left, true),
            "bottomleft" => (Anchor::BottomLeft, true),
            "top" => (Anchor::Top, true),
            "center" | "wincen" | "wincenter" => (Anchor::Center, true),
            "bottom" => (Anchor::Bottom, true),
            "topright" => (Anchor::TopRight, true),
            "right" => (Anchor::Right, true),
            "bottomright" => (Anchor::BottomRight, true),
            "" => (Anchor::TopLeft, false),
            _ => (Anchor::TopLeft, false),
        }
    }

    /// Fraction of width/height (0.0, 0.5, 1.0) this anchor sits at.
    pub fn fractions(self) -> (f64, f64) {
        use Anchor::*;
        match self {
            TopLeft => (0.0, 0.0),
            Left => (0.0, 0.5),
            BottomLeft => (0.0, 1.0),
            Top => (0.5, 0.0),
            Center => (0.5, 0.5),
            Bottom => (0.5, 1.0),
            TopRight => (1.0, 0.0),
            Right => (1.0, 0.5),
            BottomRight => (1.0, 1.0),
        }
    }

    /// offsets are negated for right-/bottom-anchored
    /// cases.
    pub fn negate_x(self) -> bool {
        matches!(self, Anchor::TopRight | Anchor::Right | Anchor::BottomRight)
    }

    pub fn negate_y(self) -> bool {
        matches!(
            self,
            Anchor::BottomLeft | Anchor::Bottom | Anchor::BottomRight
        )
    }
}

/// `#<n>` style hash-anchor tokens used in a couple of menu/toolbar
/// config fields to reference the Nth item positionally. Returns the
/// zero-based index.
pub fn parse_hash_anchor(s: &str) -> Option<usize> {
    let s = s.trim().strip_prefix('#')?;
    s.parse::<usize>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex6_and_hex8() {
        assert_eq!(parse_hex_color("#141414"), Some(Rgba::new(0x14, 0x14, 0x14, 255)));
        assert_eq!(parse_hex_color("141414"), Some(Rgba::new(0x14, 0x14, 0x14, 255)));
        assert_eq!(parse_hex_color("#11223344"), Some(Rgba::new(0x11, 0x22, 0x33, 0x44)));
    }

    #[test]
    fn hex8_format_roundtrip() {
        // format(parse(s)) == s for any valid #RRGGBBAA.
        for s in ["#00000000", "#FFFFFFFF", "#141414FF", "#A1B2C3D4"] {
            let c = parse_hex_color(s).unwrap();
            assert_eq!(c.format_hex8(), s);
        }
    }

    #[test]
    fn rgb_colon() {
        assert_eq!(parse_color("rgb:ff/00/00"), Some(Rgba::new(255, 0, 0, 255)));
        assert_eq!(parse_color("rgb:f/0/0"), Some(Rgba::new(255, 0, 0, 255)));
    }

    #[test]
    fn rgbi_colon() {
        assert_eq!(parse_color("rgbi:1.0/0.0/0.0"), Some(Rgba::new(255, 0, 0, 255)));
    }

    #[test]
    fn named() {
        assert_eq!(parse_color("red"), Some(Rgba::new(255, 0, 0, 255)));
        assert_eq!(parse_color("GREY"), Some(Rgba::new(128, 128, 128, 255)));
    }

    #[test]
    fn invalid_is_none() {
        assert_eq!(parse_color("not-a-color"), None);
        assert_eq!(parse_color("#12"), None);
    }

    #[test]
    fn bools() {
        assert_eq!(parse_bool("yes"), Some(true));
        assert_eq!(parse_bool("No"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn int_with_percent() {
        assert_eq!(
            parse_int_with_percent("50%"),
            Some(IntOrPercent { value: 50, percent: true })
        );
        assert_eq!(
            parse_int_with_percent("100"),
            Some(IntOrPercent { value: 100, percent: false })
        );
        assert_eq!(parse_int_with_percent(""), None);
    }

    #[test]
    fn int_with_percent_resolves() {
        let p = parse_int_with_percent("50%").unwrap();
        assert_eq!(p.resolve(1000), 500);
        let f = parse_int_with_percent("42").unwrap();
        assert_eq!(f.resolve(1000), 42);
    }

    #[test]
    fn anchor_aliases_and_default() {
        assert_eq!(Anchor::parse("wincen"), (Anchor::Center, true));
        assert_eq!(Anchor::parse("bogus"), (Anchor::TopLeft, false));
    }

    #[test]
    fn anchor_negation() {
        assert!(Anchor::TopRight.negate_x());
        assert!(!Anchor::TopRight.negate_y());
        assert!(Anchor::BottomLeft.negate_y());
        assert!(!Anchor::Center.negate_x());
    }

    #[test]
    fn hash_anchor() {
        assert_eq!(parse_hash_anchor("#3"), Some(3));
        assert_eq!(parse_hash_anchor("3"), None);
    }
}
