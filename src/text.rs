use unicode_width::UnicodeWidthStr;

/// Number of terminal cells `text` occupies.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Cursor inside a buffer: 1-indexed line, 0-indexed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextCursor {
    pub line: usize,
    pub col: usize,
}

/// Rows needed to show `lines` soft-wrapped at `width` cells.
///
/// Every line takes at least one row. In insert mode the cursor may sit one
/// cell past the end of its line, which can push that line onto an extra row.
pub fn display_height<S>(
    width: usize,
    lines: &[S],
    cursor: Option<TextCursor>,
    insert_mode: bool,
) -> usize
where
    S: AsRef<str>,
{
    let width = width.max(1);
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let mut cells = display_width(line.as_ref());
            if insert_mode
                && let Some(cursor) = cursor
                && cursor.line == idx + 1
                && cursor.col + 1 >= cells
            {
                cells += 1;
            }
            cells.div_ceil(width).max(1)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_characters_take_two_cells() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn wraps_long_lines() {
        let lines = ["12345", "123456789012", ""];
        assert_eq!(display_height(5, &lines, None, false), 1 + 3 + 1);
    }

    #[test]
    fn insert_cursor_at_line_end_adds_a_cell() {
        let lines = ["12345"];
        let at_end = Some(TextCursor { line: 1, col: 5 });
        assert_eq!(display_height(5, &lines, at_end, false), 1);
        assert_eq!(display_height(5, &lines, at_end, true), 2);
        let inside = Some(TextCursor { line: 1, col: 1 });
        assert_eq!(display_height(5, &lines, inside, true), 1);
    }
}
