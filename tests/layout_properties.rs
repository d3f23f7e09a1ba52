//! Property-based tests for placement math
//!
//! These run the real box and edge helpers over random geometry instead of
//! hand-picked cases.

use std::collections::HashMap;
use std::rc::Rc;

use float_wm::host::WindowId;
use float_wm::host::term::TermHost;
use float_wm::layout::{
    CursorAnchor, Edges, LayoutContext, Position, ScreenSize, Size, WinBox, box_sizes,
    center_pos, change_box_by_edges, change_box_by_edges_list, extend_edges, pos_for_around,
};
use float_wm::text::display_height;
use float_wm::window::config::WinConfig;
use float_wm::{
    CreateOptions, EventBus, FloatConfig, MultiCreateOptions, MultiFloatingWindow,
    MultiOpenOptions, OpenOptions, Relative, RuntimeBuilder,
};
use proptest::prelude::*;

fn edges() -> impl Strategy<Value = Edges> {
    (0i32..4, 0i32..4, 0i32..4, 0i32..4).prop_map(|(t, r, b, l)| Edges::new(t, r, b, l))
}

fn win_box() -> impl Strategy<Value = WinBox> {
    (-50i32..50, -50i32..50, 0i32..100, 0i32..100)
        .prop_map(|(top, left, width, height)| WinBox::new(top, left, width, height))
}

fn relative() -> impl Strategy<Value = Relative> {
    prop_oneof![
        Just(Relative::Center),
        Just(Relative::Cursor),
        Just(Relative::CursorAround),
        Just(Relative::Editor),
    ]
}

fn shorthand(max: i32) -> impl Strategy<Value = Option<Vec<i32>>> {
    prop::option::of(prop::collection::vec(0i32..max, 0..5))
}

/// One child: size, border and padding shorthands, gap from the previous
/// child and top row.
fn child() -> impl Strategy<Value = (i32, i32, Option<Vec<i32>>, Option<Vec<i32>>, i32, i32)> {
    (1i32..12, 1i32..5, shorthand(2), shorthand(3), 0i32..4, 0i32..3)
}

fn float_box(host: &TermHost, window: Option<WindowId>) -> WinBox {
    match window.and_then(|window| host.window_config(window)) {
        Some(WinConfig::Float(config)) => {
            WinBox::new(config.row, config.col, config.width, config.height)
        }
        other => panic!("expected a float config, got {other:?}"),
    }
}

proptest! {
    /// Growing by some edges and shrinking by the same edges is a no-op
    #[test]
    fn edges_are_invertible(b in win_box(), e in edges()) {
        let grown = change_box_by_edges(b, Some(e));
        prop_assert_eq!(change_box_by_edges(grown, Some(e.negated())), b);
        prop_assert_eq!(change_box_by_edges(b, None), b);
    }

    /// Applying a list is the same as applying each entry in order
    #[test]
    fn edge_list_matches_sequential_application(
        b in win_box(),
        first in edges(),
        second in edges(),
        skip_first in any::<bool>(),
    ) {
        let first = (!skip_first).then_some(first);
        let folded = change_box_by_edges_list(b, [first, Some(second)]);
        let stepwise = change_box_by_edges(change_box_by_edges(b, first), Some(second));
        prop_assert_eq!(folded, stepwise);
    }

    /// Shorthand expansion never yields negative sides
    #[test]
    fn shorthand_is_never_negative(values in prop::collection::vec(-5i32..5, 0..5)) {
        let e = extend_edges(Some(values.as_slice()));
        prop_assert!(e.to_array().iter().all(|side| *side >= 0));
        if let Some(top) = values.first() {
            prop_assert_eq!(e.top, (*top).max(0));
            prop_assert_eq!(e.bottom, values.get(2).copied().unwrap_or(*top).max(0));
        }
    }

    /// Border box contains padding box contains content box, whatever the anchor
    #[test]
    fn boxes_nest(
        border in edges(),
        padding in edges(),
        relative in relative(),
        width in 1i32..60,
        height in 1i32..30,
        title_width in 0i32..80,
        cursor in (0i32..40, 0i32..120),
    ) {
        let ctx = LayoutContext::new(ScreenSize::new(40, 120), Position::new(cursor.0, cursor.1))
            .unwrap()
            .with_title("t", title_width)
            .with_border(border)
            .with_padding(padding);
        let options = OpenOptions::new(width, height)
            .with_relative(relative)
            .with_position(3, 7);
        let boxes = box_sizes(&ctx, &options, CursorAnchor::live());

        prop_assert!(boxes.border.contains(&boxes.padding));
        prop_assert!(boxes.padding.contains(&boxes.content));
        prop_assert_eq!(boxes.content.size(), Size::new(width.max(title_width), height));
        prop_assert_eq!(
            boxes.border.width,
            boxes.content.width + border.horizontal() + padding.horizontal()
        );
        prop_assert_eq!(boxes.cursor.is_none(), relative == Relative::Center);
    }

    /// A kept anchor makes placement independent of the live cursor
    #[test]
    fn kept_anchor_ignores_cursor_moves(
        stored in (0i32..40, 0i32..120),
        first in (0i32..40, 0i32..120),
        second in (0i32..40, 0i32..120),
        around in any::<bool>(),
    ) {
        let relative = if around { Relative::CursorAround } else { Relative::Cursor };
        let options = OpenOptions::new(10, 4).with_relative(relative);
        let stored = Some(Position::new(stored.0, stored.1));
        let place = |cursor: (i32, i32)| {
            let ctx = LayoutContext::new(ScreenSize::new(40, 120), Position::new(cursor.0, cursor.1))
                .unwrap();
            box_sizes(&ctx, &options, CursorAnchor::keep(stored))
        };
        prop_assert_eq!(place(first), place(second));
    }

    /// Around the cursor the box sits directly below or directly above it
    #[test]
    fn around_cursor_is_adjacent(
        lines in 10i32..60,
        columns in 10i32..120,
        width in 1i32..10,
        height in 1i32..8,
        cursor in (0i32..60, 0i32..120),
    ) {
        let cursor = Position::new(cursor.0 % lines, cursor.1 % columns);
        let ctx = LayoutContext::new(ScreenSize::new(lines, columns), cursor).unwrap();
        let pos = pos_for_around(&ctx, Size::new(width, height), cursor, false);
        prop_assert!(pos.top == cursor.top + 1 || pos.top + height == cursor.top);
        prop_assert!(pos.left == cursor.left || pos.left + width - 1 == cursor.left);
    }

    /// Centering leaves at most one extra cell on the bottom and right
    #[test]
    fn centering_is_balanced(
        lines in 0i32..80,
        columns in 0i32..200,
        b in win_box(),
    ) {
        let ctx = LayoutContext::new(ScreenSize::new(lines, columns), Position::default()).unwrap();
        let pos = center_pos(&ctx, &b);
        let slack_v = lines - b.height - 2 * pos.top;
        let slack_h = columns - b.width - 2 * pos.left;
        prop_assert!(slack_v == 0 || slack_v == 1);
        prop_assert!(slack_h == 0 || slack_h == 1);
    }

    /// Wrapped height is at least one row per line and shrinks as width grows
    #[test]
    fn display_height_is_monotonic(
        lines in prop::collection::vec("[a-z ]{0,40}", 1..8),
        width in 1usize..40,
    ) {
        let narrow = display_height(width, lines.as_slice(), None, false);
        let wide = display_height(width + 1, lines.as_slice(), None, false);
        prop_assert!(narrow >= lines.len());
        prop_assert!(wide <= narrow);
    }

    /// Children laid out side by side always stay inside the group frame
    #[test]
    fn group_frame_contains_every_child(
        children in prop::collection::vec(child(), 1..4),
        relative in relative(),
        border in shorthand(2),
        padding in shorthand(3),
        offsets in (-3i32..4, -3i32..4),
        cursor in (0i32..40, 0i32..120),
    ) {
        let mut host = TermHost::new(ScreenSize::new(40, 120));
        host.set_cursor(Position::new(cursor.0, cursor.1));
        let mut bus = EventBus::new();
        let runtime = RuntimeBuilder::new(FloatConfig::default())
            .initialize(&mut host)
            .unwrap();
        let keys: Vec<usize> = (0..children.len()).collect();
        let group = MultiFloatingWindow::create(
            &mut host,
            &mut bus,
            Rc::clone(&runtime),
            MultiCreateOptions::new(keys.iter().map(|k| (*k, CreateOptions::default())).collect()),
        )
        .unwrap();

        let mut wins = HashMap::new();
        let mut left = 0;
        for (key, (width, height, child_border, child_padding, gap, top)) in
            children.into_iter().enumerate()
        {
            let options = OpenOptions {
                border: child_border,
                padding: child_padding,
                ..OpenOptions::new(width, height).with_position(top, left + gap)
            };
            let ctx = LayoutContext::from_options(&host, &options).unwrap();
            left += gap + box_sizes(&ctx, &options, CursorAnchor::keep(None)).border.width;
            wins.insert(key, options);
        }
        let base = OpenOptions {
            border,
            padding,
            top_offset: offsets.0,
            left_offset: offsets.1,
            ..OpenOptions::default().with_relative(relative).with_title("g")
        };
        group.open(&mut host, &MultiOpenOptions::new(base, wins)).unwrap();

        let windows = group.windows(&host);
        let frame = float_box(&host, windows.frame);
        for (key, window) in windows.wins {
            let inner = float_box(&host, window);
            prop_assert!(frame.contains(&inner), "child {} at {:?} escapes {:?}", key, inner, frame);
        }
    }
}
