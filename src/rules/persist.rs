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

//! Atomic save/load and the apps-rules grammar.

use std::fmt::Write as _;
use std::fs::File;
use std::io::Read;
use std::io::Write as _;
use std::os::unix::io::FromRawFd;
use std::path::Path;

use nix::sys::stat::fchmod;
use nix::sys::stat::stat;
use nix::sys::stat::Mode;
use nix::unistd::mkstemp;

use crate::color::parse_bool;
use crate::color::parse_int_with_percent;
use crate::color::Anchor;
use crate::prelude::*;
use crate::rules::Attributes;
use crate::rules::Dimensions;
use crate::rules::Maximized;
use crate::rules::Position;
use crate::rules::Predicate;
use crate::rules::Rule;
use crate::rules::RuleId;
use crate::rules::RuleSet;
use crate::utils::ArenaId as _;
use crate::view::decoration::DecorMask;
use crate::view::FocusProtection;

fn write_match_terms(out: &mut String, rule: &Rule) {
    for (key, pred) in [
        ("app_id", &rule.app_id),
        ("instance", &rule.instance),
        ("role", &rule.role),
        ("title", &rule.title),
    ] {
        if pred.set {
            let _ = write!(out, " ({key}{}={})", if pred.negate { "!" } else { "" }, pred.pattern);
        }
    }
}

fn write_int_with_percent(out: &mut String, v: i32, percent: bool) {
    if percent {
        let _ = write!(out, "{v}%");
    } else {
        let _ = write!(out, "{v}");
    }
}

fn anchor_name(a: Anchor) -> &'static str {
    match a {
        Anchor::TopLeft => "TopLeft",
        Anchor::Left => "Left",
        Anchor::BottomLeft => "BottomLeft",
        Anchor::Top => "Top",
        Anchor::Center => "Center",
        Anchor::Bottom => "Bottom",
        Anchor::TopRight => "TopRight",
        Anchor::Right => "Right",
        Anchor::BottomRight => "BottomRight",
    }
}

fn write_focus_protection(out: &mut String, prot: FocusProtection) {
    if prot == FocusProtection::NONE {
        out.push_str("none");
        return;
    }
    let mut first = true;
    for (bit, name) in [
        (FocusProtection::LOCK, "lock"),
        (FocusProtection::DENY, "deny"),
        (FocusProtection::GAIN, "gain"),
        (FocusProtection::REFUSE, "refuse"),
    ] {
        if prot.contains(bit) {
            if !first {
                out.push(' ');
            }
            out.push_str(name);
            first = false;
        }
    }
}

fn write_attrs(out: &mut String, attrs: &Attributes, indent: &str) {
    match (attrs.focus_hidden, attrs.icon_hidden) {
        (Some(f), Some(i)) if f == i => {
            let _ = writeln!(out, "{indent}[Hidden] {{{}}}", if f { "yes" } else { "no" });
        },
        _ => {
            if let Some(f) = attrs.focus_hidden {
                let _ = writeln!(out, "{indent}[FocusHidden] {{{}}}", if f { "yes" } else { "no" });
            }
            if let Some(i) = attrs.icon_hidden {
                let _ = writeln!(out, "{indent}[IconHidden] {{{}}}", if i { "yes" } else { "no" });
            }
        },
    }
    if let Some(w) = attrs.workspace {
        let _ = writeln!(out, "{indent}[Workspace] {{{w}}}");
    }
    if let Some(s) = attrs.sticky {
        let _ = writeln!(out, "{indent}[Sticky] {{{}}}", if s { "yes" } else { "no" });
    }
    if let Some(j) = attrs.jump {
        let _ = writeln!(out, "{indent}[Jump] {{{}}}", if j { "yes" } else { "no" });
    }
    if let Some(h) = attrs.head {
        let _ = writeln!(out, "{indent}[Head] {{{h}}}");
    }
    if let Some(d) = attrs.dimensions {
        let _ = write!(out, "{indent}[Dimensions] {{");
        write_int_with_percent(out, d.width.value, d.width.percent);
        out.push(' ');
        write_int_with_percent(out, d.height.value, d.height.percent);
        let _ = writeln!(out, "}}");
    }
    if let Some(b) = attrs.ignore_size_hints {
        let _ = writeln!(out, "{indent}[IgnoreSizeHints] {{{}}}", if b { "yes" } else { "no" });
    }
    if let Some(p) = attrs.position {
        let _ = write!(out, "{indent}[Position] ({}) {{", anchor_name(p.anchor));
        write_int_with_percent(out, p.x.value, p.x.percent);
        out.push(' ');
        write_int_with_percent(out, p.y.value, p.y.percent);
        let _ = writeln!(out, "}}");
    }
    if let Some(m) = attrs.minimized {
        let _ = writeln!(out, "{indent}[Minimized] {{{}}}", if m { "yes" } else { "no" });
    }
    if let Some(m) = attrs.maximized {
        let _ = writeln!(out, "{indent}[Maximized] {{{}}}", m.name());
    }
    if let Some(f) = attrs.fullscreen {
        let _ = writeln!(out, "{indent}[Fullscreen] {{{}}}", if f { "yes" } else { "no" });
    }
    if let Some(s) = attrs.shaded {
        let _ = writeln!(out, "{indent}[Shaded] {{{}}}", if s { "yes" } else { "no" });
    }
    if let Some(t) = attrs.tab {
        let _ = writeln!(out, "{indent}[Tab] {{{}}}", if t { "yes" } else { "no" });
    }
    if let Some((f, u)) = attrs.alpha {
        let _ = writeln!(out, "{indent}[Alpha] {{{f} {u}}}");
    }
    if let Some(p) = attrs.focus_protection {
        let _ = write!(out, "{indent}[FocusProtection] {{");
        write_focus_protection(out, p);
        let _ = writeln!(out, "}}");
    }
    if let Some(mask) = attrs.decor {
        match mask.preset_name() {
            Some(name) => {
                let _ = writeln!(out, "{indent}[Deco] {{{name}}}");
            },
            None => {
                let _ = writeln!(out, "{indent}[Deco] {{0x{:x}}}", mask.bits());
            },
        }
    }
    if let Some(l) = attrs.layer {
        let _ = writeln!(out, "{indent}[Layer] {{{l}}}");
    }
    if let Some(c) = attrs.save_on_close {
        let _ = writeln!(out, "{indent}[Close] {{{}}}", if c { "yes" } else { "no" });
    }
}

/// Serializes the rule set to its canonical text form, grouping
/// consecutive same-`group_id` rules under one `[group]` block.
pub fn render(set: &RuleSet) -> String {
    let mut out = String::new();
    let rules = set.rules();
    let mut i = 0;
    while i < rules.len() {
        let rule = &rules[i];
        if rule.group_id > 0 {
            let group_id = rule.group_id;
            out.push_str("[group]\n");
            while i < rules.len() && rules[i].group_id == group_id {
                out.push_str("  [app]");
                write_match_terms(&mut out, &rules[i]);
                if rules[i].match_limit > 0 {
                    let _ = write!(out, " {{{}}}", rules[i].match_limit);
                }
                out.push('\n');
                i += 1;
            }
            write_attrs(&mut out, &rule.attrs, "  ");
            out.push_str("[end]\n\n");
        } else {
            out.push_str("[app]");
            write_match_terms(&mut out, rule);
            if rule.match_limit > 0 {
                let _ = write!(out, " {{{}}}", rule.match_limit);
            }
            out.push('\n');
            write_attrs(&mut out, &rule.attrs, "  ");
            out.push_str("[end]\n\n");
            i += 1;
        }
    }
    out
}

/// Atomic save: `<path>.tmp.XXXXXX`, `fchmod` to the existing file's
/// mode (or `0644`), `fsync`, `rename`. Refuses when `!rewrite_safe`.
pub fn save(set: &RuleSet, path: &Path) -> Result<()> {
    if !set.rewrite_safe {
        return Err(anyhow!("apps-rules file is not rewrite-safe; refusing to overwrite {}", path.display()));
    }
    let mode = stat(path).map(|st| st.st_mode & 0o777).unwrap_or(0o644);
    let template = format!("{}.tmp.XXXXXX", path.display());
    let (fd, tmp_path) = mkstemp(template.as_str()).context("creating temp file for apps-rules save")?;

    let result: Result<()> = (|| {
        fchmod(fd, Mode::from_bits_truncate(mode)).location(loc!())?;
        let mut file = unsafe { File::from_raw_fd(fd) };
        file.write_all(render(set).as_bytes()).location(loc!())?;
        file.sync_all().location(loc!())?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    std::fs::rename(&tmp_path, path).location(loc!())?;
    Ok(())
}

fn strip_block(s: &str, open: char, close: char) -> Option<&str> {
    let s = s.trim();
    let s = s.strip_prefix(open)?;
    s.strip_suffix(close)
}

fn parse_predicate_term(term: &str) -> Option<(&'static str, Predicate)> {
    let inner = strip_block(term, '(', ')')?;
    let (key, negate, pattern) = if let Some(idx) = inner.find("!=") {
        (&inner[..idx], true, &inner[idx + 2..])
    } else if let Some(idx) = inner.find('=') {
        (&inner[..idx], false, &inner[idx + 1..])
    } else {
        return None;
    };
    let canonical = match key.trim().to_ascii_lowercase().as_str() {
        "app_id" | "appid" | "class" => "app_id",
        "instance" | "name" => "instance",
        "role" => "role",
        "title" => "title",
        _ => return None,
    };
    Some((canonical, Predicate::new(pattern, negate)))
}

/// Parses one `[app] (pred ...) {limit}` header line (without the
/// leading `[app]`/`[group]` tag, already stripped by the caller).
fn apply_header(rule: &mut Rule, rest: &str) {
    let rest = rest.trim();
    let (terms, limit) = match rest.rsplit_once('{') {
        Some((head, tail)) if tail.ends_with('}') => (head.trim(), tail.trim_end_matches('}').trim().parse::<u32>().ok()),
        _ => (rest, None),
    };
    for term in split_parens(terms) {
        if let Some((key, pred)) = parse_predicate_term(&term) {
            match key {
                "app_id" => rule.app_id = pred,
                "instance" => rule.instance = pred,
                "role" => rule.role = pred,
                "title" => rule.title = pred,
                _ => {},
            }
        }
    }
    if let Some(limit) = limit {
        rule.match_limit = limit;
    }
}

/// Splits a string like `(app_id=foo) (instance=bar)` into its
/// parenthesized terms.
fn split_parens(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0;
    let mut cur = String::new();
    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                cur.push(c);
            },
            ')' => {
                depth -= 1;
                cur.push(c);
                if depth == 0 {
                    out.push(std::mem::take(&mut cur));
                }
            },
            _ if depth > 0 => cur.push(c),
            _ => {},
        }
    }
    out
}

fn attr_line(line: &str) -> Option<(&str, Option<&str>, &str)> {
    let line = line.trim();
    let tag_end = line.find(']')?;
    if !line.starts_with('[') {
        return None;
    }
    let tag = &line[1..tag_end];
    let rest = line[tag_end + 1..].trim();
    let (anchor, rest) = if let Some(stripped) = rest.strip_prefix('(') {
        let (inside, after) = stripped.split_once(')')?;
        (Some(inside), after.trim())
    } else {
        (None, rest)
    };
    let payload = strip_block(rest, '{', '}')?;
    Some((tag, anchor, payload))
}

fn apply_attr_line(attrs: &mut Attributes, tag: &str, anchor: Option<&str>, payload: &str, rewrite_safe: &mut bool) {
    let b = || parse_bool(payload);
    match tag.to_ascii_lowercase().as_str() {
        "hidden" => {
            if let Some(v) = b() {
                attrs.focus_hidden = Some(v);
                attrs.icon_hidden = Some(v);
            } else {
                *rewrite_safe = false;
            }
        },
        "focushidden" => attrs.focus_hidden = b().or_else(|| { *rewrite_safe = false; None }),
        "iconhidden" => attrs.icon_hidden = b().or_else(|| { *rewrite_safe = false; None }),
        "workspace" => attrs.workspace = payload.trim().parse().ok(),
        "sticky" => attrs.sticky = b(),
        "jump" => attrs.jump = b(),
        "head" => attrs.head = payload.trim().parse().ok(),
        "dimensions" => {
            let mut it = payload.split_whitespace();
            if let (Some(w), Some(h)) = (it.next(), it.next()) {
                if let (Some(w), Some(h)) = (parse_int_with_percent(w), parse_int_with_percent(h)) {
                    attrs.dimensions = Some(Dimensions { width: w, height: h });
                } else {
                    *rewrite_safe = false;
                }
            } else {
                *rewrite_safe = false;
            }
        },
        "ignoresizehints" => attrs.ignore_size_hints = b(),
        "position" => {
            let (anchor, ok) = Anchor::parse(anchor.unwrap_or(""));
            if !ok {
                *rewrite_safe = false;
            }
            let mut it = payload.split_whitespace();
            if let (Some(x), Some(y)) = (it.next(), it.next()) {
                if let (Some(x), Some(y)) = (parse_int_with_percent(x), parse_int_with_percent(y)) {
                    attrs.position = Some(Position { anchor, x, y });
                } else {
                    *rewrite_safe = false;
                }
            } else {
                *rewrite_safe = false;
            }
        },
        "minimized" => attrs.minimized = b(),
        "maximized" => {
            attrs.maximized = match payload.trim().to_ascii_lowercase().as_str() {
                "yes" => Some(Maximized::Both),
                "horz" => Some(Maximized::Horizontal),
                "vert" => Some(Maximized::Vertical),
                "no" => Some(Maximized::No),
                _ => {
                    *rewrite_safe = false;
                    None
                },
            };
        },
        "fullscreen" => attrs.fullscreen = b(),
        "shaded" => attrs.shaded = b(),
        "tab" => attrs.tab = b(),
        "alpha" => {
            let mut it = payload.split_whitespace();
            if let (Some(f), Some(u)) = (it.next().and_then(|v| v.parse::<u8>().ok()), it.next().and_then(|v| v.parse::<u8>().ok())) {
                attrs.alpha = Some((f, u));
            } else {
                *rewrite_safe = false;
            }
        },
        "focusnewwindow" => attrs.focus_protection = Some(if b().unwrap_or(false) { FocusProtection::GAIN } else { FocusProtection::NONE }),
        "focusprotection" => {
            let mut mask = FocusProtection::NONE;
            for word in payload.split_whitespace() {
                mask = FocusProtection(
                    mask.0
                        | match word.to_ascii_lowercase().as_str() {
                            "gain" => FocusProtection::GAIN.0,
                            "refuse" => FocusProtection::REFUSE.0,
                            "lock" => FocusProtection::LOCK.0,
                            "deny" => FocusProtection::DENY.0,
                            "none" => 0,
                            _ => {
                                *rewrite_safe = false;
                                0
                            },
                        },
                );
            }
            attrs.focus_protection = Some(mask);
        },
        "deco" => {
            attrs.decor = DecorMask::parse_preset(payload.trim()).or_else(|| {
                let s = payload.trim().trim_start_matches("0x");
                u32::from_str_radix(s, 16).ok().map(DecorMask::from_bits)
            });
            if attrs.decor.is_none() {
                *rewrite_safe = false;
            }
        },
        "layer" => attrs.layer = payload.trim().parse().ok(),
        "close" | "saveonclose" => attrs.save_on_close = b(),
        _ => *rewrite_safe = false,
    }
}

/// Loads an apps-rules file. Never fails fatally (a missing file is not
/// an error); on any parse trouble the returned set has
/// `rewrite_safe = false`.
pub fn load(path: &Path) -> Result<RuleSet> {
    let mut text = String::new();
    match File::open(path) {
        Ok(mut f) => {
            f.read_to_string(&mut text).location(loc!())?;
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(RuleSet::new()),
        Err(e) => return Err(e).location(loc!()),
    }
    Ok(parse(&text))
}

pub fn parse(text: &str) -> RuleSet {
    let mut set = RuleSet::new();
    let mut lines = text.lines().peekable();
    let mut rewrite_safe = true;
    let mut next_group_id: u32 = 1;

    while let Some(raw) = lines.next() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.eq_ignore_ascii_case("[group]") {
            let group_id = next_group_id;
            next_group_id += 1;
            let mut header_rules: Vec<Rule> = Vec::new();
            while let Some(next_line) = lines.peek() {
                let t = next_line.trim();
                if t.to_ascii_lowercase().starts_with("[app]") {
                    let rest = &t[5..];
                    let mut rule = Rule::new(RuleId::from_raw(0));
                    rule.group_id = group_id;
                    apply_header(&mut rule, rest);
                    header_rules.push(rule);
                    lines.next();
                } else {
                    break;
                }
            }
            let mut attrs = Attributes::default();
            while let Some(next_line) = lines.peek() {
                let t = next_line.trim();
                if t.eq_ignore_ascii_case("[end]") {
                    lines.next();
                    break;
                }
                if let Some((tag, anchor, payload)) = attr_line(t) {
                    apply_attr_line(&mut attrs, tag, anchor, payload, &mut rewrite_safe);
                } else {
                    rewrite_safe = false;
                }
                lines.next();
            }
            for mut rule in header_rules {
                rule.attrs = attrs.clone();
                set.push(rule);
            }
            continue;
        }

        if line.to_ascii_lowercase().starts_with("[app]") {
            let rest = &line[5..];
            let mut rule = Rule::new(RuleId::from_raw(0));
            apply_header(&mut rule, rest);
            while let Some(next_line) = lines.peek() {
                let t = next_line.trim();
                if t.eq_ignore_ascii_case("[end]") {
                    lines.next();
                    break;
                }
                if let Some((tag, anchor, payload)) = attr_line(t) {
                    apply_attr_line(&mut rule.attrs, tag, anchor, payload, &mut rewrite_safe);
                } else {
                    rewrite_safe = false;
                }
                lines.next();
            }
            set.push(rule);
            continue;
        }

        // Unrecognized top-level line.
        rewrite_safe = false;
    }

    set.rewrite_safe = rewrite_safe;
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load_round_trip_is_idempotent() {
        let mut set = RuleSet::new();
        let mut r = Rule::new(RuleId::from_raw(0));
        r.app_id = Predicate::new("Example", false);
        r.attrs.sticky = Some(true);
        set.push(r);

        let rendered = render(&set);
        let reloaded = parse(&rendered);
        assert!(reloaded.rewrite_safe);
        assert_eq!(reloaded.rules().len(), 1);
        assert_eq!(reloaded.rules()[0].attrs.sticky, Some(true));
        assert_eq!(render(&reloaded), rendered);
    }

    #[test]
    fn scenario_s5_sticky_toggle_format() {
        let mut set = RuleSet::new();
        let mut r = Rule::new(RuleId::from_raw(0));
        r.app_id = Predicate::new("Example", false);
        r.attrs.sticky = Some(true);
        set.push(r);
        let rendered = render(&set);
        assert_eq!(rendered, "[app] (app_id=Example)\n  [Sticky] {yes}\n[end]\n\n");
    }

    #[test]
    fn unknown_attribute_taints_rewrite_safe() {
        let text = "[app] (app_id=Foo)\n  [Bogus] {yes}\n[end]\n";
        let set = parse(text);
        assert!(!set.rewrite_safe);
    }

    #[test]
    fn group_block_shares_attributes() {
        let text = "[group]\n  [app] (app_id=A)\n  [app] (app_id=B)\n  [Sticky] {yes}\n[end]\n";
        let set = parse(text);
        assert_eq!(set.rules().len(), 2);
        assert_eq!(set.rules()[0].attrs.sticky, Some(true));
        assert_eq!(set.rules()[1].attrs.sticky, Some(true));
        assert_eq!(set.rules()[0].group_id, set.rules()[1].group_id);
    }
}
