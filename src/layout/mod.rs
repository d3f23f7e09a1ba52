pub mod context;
pub mod finder;
pub mod floating;

pub use context::{LayoutContext, ScreenSize, Title};
pub use floating::{BoxSizes, CursorAnchor, box_sizes, center_pos, pos_for_around};

/// Thickness of a border or padding on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Edges {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Edges {
    pub const ZERO: Edges = Edges::new(0, 0, 0, 0);

    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    pub const fn negated(self) -> Self {
        Self::new(-self.top, -self.right, -self.bottom, -self.left)
    }

    pub const fn horizontal(self) -> i32 {
        self.left + self.right
    }

    pub const fn vertical(self) -> i32 {
        self.top + self.bottom
    }

    pub const fn is_zero(self) -> bool {
        self.top == 0 && self.right == 0 && self.bottom == 0 && self.left == 0
    }

    pub const fn to_array(self) -> [i32; 4] {
        [self.top, self.right, self.bottom, self.left]
    }
}

/// Rectangle in screen cells. `top` and `left` are 0-indexed and may be
/// negative while a box is being grown outward from an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct WinBox {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl WinBox {
    pub const fn new(top: i32, left: i32, width: i32, height: i32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub const fn position(&self) -> Position {
        Position::new(self.top, self.left)
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub const fn with_position(mut self, pos: Position) -> Self {
        self.top = pos.top;
        self.left = pos.left;
        self
    }

    /// Column just past the right edge.
    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    /// Line just past the bottom edge.
    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    pub const fn contains(&self, other: &WinBox) -> bool {
        other.top >= self.top
            && other.left >= self.left
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Position {
    pub top: i32,
    pub left: i32,
}

impl Position {
    pub const fn new(top: i32, left: i32) -> Self {
        Self { top, left }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Expand a CSS-like shorthand to four sides.
///
/// `None` disables the edges entirely. An empty list means 1 on every side,
/// a missing bottom mirrors the top and a missing left mirrors the right.
/// Negative thicknesses are clamped to zero.
pub fn extend_edges(edges: Option<&[i32]>) -> Edges {
    let Some(edges) = edges else {
        return Edges::ZERO;
    };
    let top = edges.first().copied().unwrap_or(1);
    let right = edges.get(1).copied().unwrap_or(top);
    let bottom = edges.get(2).copied().unwrap_or(top);
    let left = edges.get(3).copied().unwrap_or(right);
    Edges::new(top.max(0), right.max(0), bottom.max(0), left.max(0))
}

/// Grow `win_box` outward by `edges`; negative edges shrink it.
pub fn change_box_by_edges(win_box: WinBox, edges: Option<Edges>) -> WinBox {
    let Some(edges) = edges else {
        return win_box;
    };
    WinBox {
        top: win_box.top - edges.top,
        left: win_box.left - edges.left,
        width: win_box.width + edges.horizontal(),
        height: win_box.height + edges.vertical(),
    }
}

/// Apply each set of edges in turn, innermost first.
pub fn change_box_by_edges_list<I>(win_box: WinBox, edges_list: I) -> WinBox
where
    I: IntoIterator<Item = Option<Edges>>,
{
    edges_list
        .into_iter()
        .fold(win_box, |acc, edges| change_box_by_edges(acc, edges))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_edges_shorthand() {
        assert_eq!(extend_edges(None), Edges::ZERO);
        assert_eq!(extend_edges(Some(&[])), Edges::uniform(1));
        assert_eq!(extend_edges(Some(&[2])), Edges::uniform(2));
        assert_eq!(extend_edges(Some(&[2, 1])), Edges::new(2, 1, 2, 1));
        assert_eq!(extend_edges(Some(&[3, 2, 1])), Edges::new(3, 2, 1, 2));
        assert_eq!(extend_edges(Some(&[4, 3, 2, 1])), Edges::new(4, 3, 2, 1));
    }

    #[test]
    fn extend_edges_clamps_negative_values() {
        assert_eq!(extend_edges(Some(&[-1, 2])), Edges::new(0, 2, 0, 2));
    }

    #[test]
    fn change_box_grows_outward() {
        let b = WinBox::new(5, 5, 10, 4);
        assert_eq!(
            change_box_by_edges(b, Some(Edges::new(1, 2, 3, 4))),
            WinBox::new(4, 1, 16, 8)
        );
        assert_eq!(change_box_by_edges(b, None), b);
    }

    #[test]
    fn change_box_list_skips_missing_edges() {
        let b = WinBox::new(0, 0, 3, 3);
        let grown = change_box_by_edges_list(b, [None, Some(Edges::uniform(1)), None]);
        assert_eq!(grown, WinBox::new(-1, -1, 5, 5));
    }

    #[test]
    fn contains_edge_cases() {
        let outer = WinBox::new(0, 0, 10, 10);
        assert!(outer.contains(&outer));
        assert!(outer.contains(&WinBox::new(9, 9, 1, 1)));
        assert!(!outer.contains(&WinBox::new(9, 9, 2, 1)));
        assert!(!outer.contains(&WinBox::new(-1, 0, 1, 1)));
    }
}
