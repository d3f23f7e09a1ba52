//! Border text for hosts that cannot draw borders themselves.

use super::BorderChars;
use crate::host::Highlight;
use crate::layout::{LayoutContext, Size};

/// Buffer contents of a border window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BorderRender {
    pub lines: Vec<String>,
    pub highlights: Vec<Highlight>,
}

/// Glyphs with every side or corner that touches a disabled edge blanked.
fn visible_chars(ctx: &LayoutContext, chars: &BorderChars) -> BorderChars {
    let b = ctx.border;
    let keep = |glyph: &str, visible: bool| {
        if visible {
            glyph.to_owned()
        } else {
            String::new()
        }
    };
    BorderChars {
        top: keep(&chars.top, b.top > 0),
        right: keep(&chars.right, b.right > 0),
        bottom: keep(&chars.bottom, b.bottom > 0),
        left: keep(&chars.left, b.left > 0),
        top_left: keep(&chars.top_left, b.top > 0 && b.left > 0),
        top_right: keep(&chars.top_right, b.top > 0 && b.right > 0),
        bottom_right: keep(&chars.bottom_right, b.bottom > 0 && b.right > 0),
        bottom_left: keep(&chars.bottom_left, b.bottom > 0 && b.left > 0),
    }
}

fn repeat(glyph: &str, count: i32) -> String {
    glyph.repeat(count.max(0) as usize)
}

/// Lines and highlights that draw the border of a window of `size` cells.
///
/// Returns `None` when the context has no border. Highlight columns are
/// display cells; a highlight is only produced for enabled edges and only when
/// `highlight` names a group.
pub fn render_border_data(
    ctx: &LayoutContext,
    chars: &BorderChars,
    highlight: Option<&str>,
    size: Size,
) -> Option<BorderRender> {
    if !ctx.border_enabled {
        return None;
    }
    let b = ctx.border;
    let c = visible_chars(ctx, chars);
    let Size { width, height } = size;
    let space_width = width - b.left - b.right;
    let space_height = (height - b.top - b.bottom).max(0);

    let mut lines = Vec::with_capacity(height.max(0) as usize);
    if b.top > 0 {
        lines.push(format!(
            "{}{}{}{}",
            c.top_left,
            ctx.title.text,
            repeat(&c.top, space_width - ctx.title.width),
            c.top_right
        ));
    }
    for _ in 0..space_height {
        lines.push(format!("{}{}{}", c.left, repeat(" ", space_width), c.right));
    }
    if b.bottom > 0 {
        lines.push(format!(
            "{}{}{}",
            c.bottom_left,
            repeat(&c.bottom, space_width),
            c.bottom_right
        ));
    }

    let mut highlights = Vec::new();
    if let Some(group) = highlight.filter(|g| !g.is_empty()) {
        let full = width.max(0) as usize;
        let span = |line: i32, start: i32, end: i32| {
            Highlight::new(group, line as usize, start.max(0) as usize, end.max(0) as usize)
        };
        if b.top > 0 {
            highlights.push(span(0, 0, width));
        }
        let first_inner = if b.top > 0 { 1 } else { 0 };
        for l in 0..space_height {
            let line = first_inner + l;
            if b.left > 0 {
                highlights.push(span(line, 0, b.left));
            }
            if b.right > 0 {
                highlights.push(span(line, b.left + space_width, width));
            }
        }
        if b.bottom > 0 && height > 0 {
            highlights.push(Highlight::new(group, (height - 1) as usize, 0, full));
        }
    }

    Some(BorderRender { lines, highlights })
}
