use super::{LayoutContext, Position, Size, WinBox, change_box_by_edges};
use crate::window::{OpenOptions, Relative};

/// Which cursor position a cursor-relative placement should anchor to.
///
/// `stored` is the position remembered from the previous placement of the same
/// window. When `update` is false and a stored position exists it is reused,
/// so resizing a window does not make it follow a cursor that moved since it
/// was opened. Otherwise the live cursor from the layout context is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorAnchor {
    pub stored: Option<Position>,
    pub update: bool,
}

impl CursorAnchor {
    pub const fn live() -> Self {
        Self {
            stored: None,
            update: true,
        }
    }

    pub const fn updating(stored: Option<Position>) -> Self {
        Self {
            stored,
            update: true,
        }
    }

    pub const fn keep(stored: Option<Position>) -> Self {
        Self {
            stored,
            update: false,
        }
    }

    pub fn pick(&self, live: Position) -> Position {
        match self.stored {
            Some(stored) if !self.update => stored,
            _ => live,
        }
    }
}

/// Nested boxes of one window, innermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxSizes {
    pub content: WinBox,
    pub padding: WinBox,
    pub border: WinBox,
    /// Cursor position the placement was anchored to. The caller stores it
    /// for the next non-updating placement. `None` for centered windows,
    /// which leaves the previously stored value untouched.
    pub cursor: Option<Position>,
}

pub fn center_pos(ctx: &LayoutContext, win_box: &WinBox) -> Position {
    let top = (ctx.lines - win_box.height).div_euclid(2);
    let left = (ctx.columns - win_box.width).div_euclid(2);
    Position::new(top, left)
}

/// Place a box of `size` next to `cursor`, flipping to the other side on the
/// axis where it would leave the screen.
pub fn pos_for_around(
    ctx: &LayoutContext,
    size: Size,
    cursor: Position,
    prefer_above: bool,
) -> Position {
    let usable_lines = ctx.lines - 1;
    let Position { mut top, mut left } = cursor;
    if prefer_above {
        if top - size.height < 0 {
            top += 1;
        } else {
            top -= size.height;
        }
    } else if top + 1 + size.height >= usable_lines {
        top -= size.height;
    } else {
        top += 1;
    }
    if left + size.width >= ctx.columns {
        left -= size.width - 1;
    }
    Position::new(top, left)
}

/// Compute content, padding and border boxes for `options` and anchor the
/// outermost one according to `options.relative`.
pub fn box_sizes(ctx: &LayoutContext, options: &OpenOptions, anchor: CursorAnchor) -> BoxSizes {
    let width = options.width.max(ctx.title.width);
    let content = WinBox::new(0, 0, width, options.height);
    let padding = change_box_by_edges(content, Some(ctx.padding));
    let border = change_box_by_edges(padding, Some(ctx.border));

    let (full_pos, cursor) = match options.relative {
        Relative::Center => (center_pos(ctx, &border), None),
        relative => {
            let cursor = anchor.pick(ctx.global_cursor_position);
            let pos = match relative {
                Relative::Cursor => cursor,
                Relative::CursorAround => pos_for_around(ctx, border.size(), cursor, false),
                _ => Position::new(options.top, options.left),
            };
            (pos, Some(cursor))
        }
    };

    let border = border.with_position(full_pos);
    let padding = padding.with_position(Position::new(
        border.top + ctx.border.top,
        border.left + ctx.border.left,
    ));
    let content = content.with_position(Position::new(
        padding.top + ctx.padding.top,
        padding.left + ctx.padding.left,
    ));

    BoxSizes {
        content,
        padding,
        border,
        cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Edges, ScreenSize};

    fn ctx(lines: i32, columns: i32) -> LayoutContext {
        LayoutContext::new(ScreenSize::new(lines, columns), Position::default()).unwrap()
    }

    #[test]
    fn center_of_square_screen() {
        let pos = center_pos(&ctx(50, 50), &WinBox::new(3, 3, 9, 9));
        assert_eq!(pos, Position::new(20, 20));
    }

    #[test]
    fn center_floors_towards_negative_infinity() {
        let pos = center_pos(&ctx(4, 4), &WinBox::new(0, 0, 7, 7));
        assert_eq!(pos, Position::new(-2, -2));
    }

    #[test]
    fn around_cursor_flips_at_screen_edges() {
        let ctx = ctx(50, 50);
        let size = Size::new(9, 9);
        let cases = [
            ((0, 0), (1, 0)),
            ((41, 0), (32, 0)),
            ((0, 41), (1, 33)),
            ((41, 41), (32, 33)),
        ];
        for ((top, left), (want_top, want_left)) in cases {
            assert_eq!(
                pos_for_around(&ctx, size, Position::new(top, left), false),
                Position::new(want_top, want_left),
                "cursor ({top}, {left})"
            );
        }
    }

    #[test]
    fn around_cursor_prefer_above() {
        let ctx = ctx(50, 50);
        let size = Size::new(9, 9);
        assert_eq!(
            pos_for_around(&ctx, size, Position::new(0, 0), true),
            Position::new(1, 0)
        );
        assert_eq!(
            pos_for_around(&ctx, size, Position::new(10, 10), true),
            Position::new(1, 10)
        );
    }

    fn sizes(border: Edges, padding: Edges) -> BoxSizes {
        let ctx = ctx(200, 200).with_border(border).with_padding(padding);
        box_sizes(&ctx, &OpenOptions::new(100, 100), CursorAnchor::live())
    }

    #[test]
    fn box_sizes_without_decorations() {
        let boxes = sizes(Edges::ZERO, Edges::ZERO);
        assert_eq!(boxes.border, WinBox::new(0, 0, 100, 100));
        assert_eq!(boxes.content, WinBox::new(0, 0, 100, 100));
    }

    #[test]
    fn box_sizes_with_border() {
        let boxes = sizes(Edges::uniform(1), Edges::ZERO);
        assert_eq!(boxes.border, WinBox::new(0, 0, 102, 102));
        assert_eq!(boxes.content, WinBox::new(1, 1, 100, 100));
    }

    #[test]
    fn box_sizes_with_border_and_padding() {
        let boxes = sizes(Edges::uniform(1), Edges::uniform(1));
        assert_eq!(boxes.border, WinBox::new(0, 0, 104, 104));
        assert_eq!(boxes.padding, WinBox::new(1, 1, 102, 102));
        assert_eq!(boxes.content, WinBox::new(2, 2, 100, 100));
    }

    #[test]
    fn title_widens_content() {
        let ctx = ctx(20, 20).with_title("a long title", 12);
        let boxes = box_sizes(&ctx, &OpenOptions::new(4, 2), CursorAnchor::live());
        assert_eq!(boxes.content.width, 12);
    }

    #[test]
    fn stored_cursor_is_reused_only_when_not_updating() {
        let mut ctx = ctx(50, 50);
        ctx.global_cursor_position = Position::new(30, 30);
        let options = OpenOptions {
            relative: Relative::Cursor,
            ..OpenOptions::new(5, 5)
        };
        let stored = Some(Position::new(2, 3));

        let kept = box_sizes(&ctx, &options, CursorAnchor::keep(stored));
        assert_eq!(kept.border.position(), Position::new(2, 3));
        assert_eq!(kept.cursor, stored);

        let fresh = box_sizes(&ctx, &options, CursorAnchor::updating(stored));
        assert_eq!(fresh.border.position(), Position::new(30, 30));
        assert_eq!(fresh.cursor, Some(Position::new(30, 30)));

        let first = box_sizes(&ctx, &options, CursorAnchor::keep(None));
        assert_eq!(first.cursor, Some(Position::new(30, 30)));
    }

    #[test]
    fn editor_relative_uses_requested_position() {
        let ctx = ctx(50, 50).with_border(Edges::new(1, 0, 0, 2));
        let options = OpenOptions {
            top: 7,
            left: 9,
            ..OpenOptions::new(5, 5)
        };
        let boxes = box_sizes(&ctx, &options, CursorAnchor::live());
        assert_eq!(boxes.border.position(), Position::new(7, 9));
        assert_eq!(boxes.content.position(), Position::new(8, 11));
    }

    #[test]
    fn centered_window_does_not_report_cursor() {
        let options = OpenOptions {
            relative: Relative::Center,
            ..OpenOptions::new(10, 10)
        };
        let boxes = box_sizes(&ctx(50, 50), &options, CursorAnchor::live());
        assert_eq!(boxes.cursor, None);
        assert_eq!(boxes.border.position(), Position::new(20, 20));
    }
}
