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

//! S2 (apps-rule position math) and S5 (rule persistence round trip).

use fluxwl::color::Anchor;
use fluxwl::color::IntOrPercent;
use fluxwl::geometry::FrameExtents;
use fluxwl::geometry::Point;
use fluxwl::geometry::Rectangle;
use fluxwl::rules::apply_position;
use fluxwl::rules::remember::toggle;
use fluxwl::rules::remember::RememberAttr;
use fluxwl::rules::remember::ViewSnapshot;
use fluxwl::rules::resolve_dimensions;
use fluxwl::rules::Dimensions;
use fluxwl::rules::MatchCandidate;
use fluxwl::rules::Predicate;
use fluxwl::rules::Rule;
use fluxwl::rules::RuleId;
use fluxwl::rules::RuleSet;
use fluxwl::utils::ArenaId as _;

#[test]
fn s2_apps_rule_position_maps_to_exact_frame() {
    let mut set = RuleSet::new();
    let mut rule = Rule::new(RuleId::from_raw(0));
    rule.app_id = Predicate::new("Example", false);
    rule.attrs.dimensions = Some(Dimensions {
        width: IntOrPercent { value: 50, percent: true },
        height: IntOrPercent { value: 50, percent: true },
    });
    set.push(rule);

    let candidate = MatchCandidate { app_id: Some("Example"), instance: None, role: None, title: None };
    let (_, matched) = set.find_first(&candidate).expect("rule matches");
    let dims = matched.attrs.dimensions.expect("dimensions attribute set");

    let usable = Rectangle::new(0, 0, 1000, 800);
    let frame = FrameExtents { left: 4, top: 28, right: 4, bottom: 4 };

    let (content_w, content_h) = resolve_dimensions(dims, usable);
    assert_eq!((content_w, content_h), (500, 400));

    let content = Rectangle::new(0, 0, content_w, content_h);
    let frame_rect = frame.frame_rect(content);
    assert_eq!((frame_rect.width, frame_rect.height), (508, 432));

    let top_left = apply_position(Anchor::Center, Point::new(0, 0), usable, content, frame);
    assert_eq!(top_left, Point::new(250, 212));
}

#[test]
fn s5_remember_sticky_then_forget_round_trips_through_save_and_load() {
    let mut set = RuleSet::new();
    let candidate = MatchCandidate { app_id: Some("Example"), instance: None, role: None, title: None };

    assert!(toggle(&mut set, &candidate, RememberAttr::Sticky, ViewSnapshot { sticky: true, ..Default::default() }));
    let rendered = fluxwl::rules::persist::render(&set);
    assert!(rendered.contains("(app_id=Example)"));
    assert!(rendered.contains("[Sticky] {yes}"));

    let reloaded = fluxwl::rules::persist::parse(&rendered);
    assert_eq!(reloaded.rules().len(), 1);
    assert_eq!(reloaded.rules()[0].attrs.sticky, Some(true));

    let mut set = reloaded;
    assert!(toggle(&mut set, &candidate, RememberAttr::Sticky, ViewSnapshot { sticky: true, ..Default::default() }));
    assert_eq!(set.rules().len(), 1, "empty rule is kept, not deleted");
    assert_eq!(set.rules()[0].attrs.sticky, None);
    let rendered = fluxwl::rules::persist::render(&set);
    assert!(!rendered.contains("[Sticky]"));
}
