//! Snapshot of everything placement math needs to know about the screen.

use super::{Edges, Position, extend_edges};
use crate::error::{FloatError, Result};
use crate::host::Environment;
use crate::window::OpenOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScreenSize {
    pub lines: i32,
    pub columns: i32,
}

impl ScreenSize {
    pub const fn new(lines: i32, columns: i32) -> Self {
        Self { lines, columns }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Title {
    pub text: String,
    /// Display width in cells, which differs from `text.len()` for wide
    /// characters.
    pub width: i32,
}

/// Immutable layout inputs for one open/resume/resize call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutContext {
    pub lines: i32,
    pub columns: i32,
    pub global_cursor_position: Position,
    pub title: Title,
    pub border_enabled: bool,
    pub border: Edges,
    pub padding_enabled: bool,
    pub padding: Edges,
}

impl LayoutContext {
    /// Context without border, padding, or title.
    pub fn new(screen: ScreenSize, cursor: Position) -> Result<Self> {
        if screen.lines < 0 || screen.columns < 0 {
            return Err(FloatError::InvalidGeometry {
                lines: screen.lines,
                columns: screen.columns,
            });
        }
        Ok(Self {
            lines: screen.lines,
            columns: screen.columns,
            global_cursor_position: cursor,
            ..Self::default()
        })
    }

    /// Use the context carried by `options` or sample a fresh one from `env`.
    pub fn from_options<E>(env: &E, options: &OpenOptions) -> Result<Self>
    where
        E: Environment + ?Sized,
    {
        if let Some(ctx) = &options.context {
            let screen = ScreenSize::new(ctx.lines, ctx.columns);
            Self::new(screen, ctx.global_cursor_position)?;
            return Ok(ctx.clone());
        }
        let mut ctx = Self::new(env.screen_size(), env.global_cursor_position())?;
        if let Some(text) = options.title.as_deref().filter(|t| !t.is_empty()) {
            ctx = ctx.with_title(text, env.display_width(text) as i32);
        }
        if options.border.is_some() {
            ctx = ctx.with_border(extend_edges(options.border.as_deref()));
        }
        if options.padding.is_some() {
            ctx = ctx.with_padding(extend_edges(options.padding.as_deref()));
        }
        Ok(ctx)
    }

    pub fn with_title(mut self, text: impl Into<String>, width: i32) -> Self {
        self.title = Title {
            text: text.into(),
            width: width.max(0),
        };
        self
    }

    pub fn with_border(mut self, border: Edges) -> Self {
        self.border_enabled = true;
        self.border = border;
        self
    }

    pub fn with_padding(mut self, padding: Edges) -> Self {
        self.padding_enabled = true;
        self.padding = padding;
        self
    }

    pub fn screen(&self) -> ScreenSize {
        ScreenSize::new(self.lines, self.columns)
    }
}
