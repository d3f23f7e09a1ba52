pub mod config;
pub mod decorator;
pub mod floating;
pub mod multi;

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

pub use config::{
    ConfigBuilder, FloatConfigBuilder, FloatWinConfig, PopupConfig, PopupConfigBuilder, WinConfig,
    WinConfigs,
};
pub use floating::FloatingWindow;
pub use multi::{MultiCreateOptions, MultiFloatingWindow, MultiOpenOptions};

use crate::constants::DEFAULT_BORDER_CHARS;
use crate::error::Result;
use crate::host::{
    BufHidden, BufType, BufferId, BufferOption, Highlight, Host, WindowId, WindowOption,
};
use crate::layout::{LayoutContext, Position};

/// What a window's position is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Relative {
    /// Centered on the screen; `top`/`left` are ignored.
    Center,
    /// Outer box starts at the cursor.
    Cursor,
    /// Next to the cursor, flipped to stay on screen.
    CursorAround,
    /// `top`/`left` are absolute screen coordinates.
    #[default]
    Editor,
}

impl fmt::Display for Relative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Relative::Center => "center",
            Relative::Cursor => "cursor",
            Relative::CursorAround => "cursor-around",
            Relative::Editor => "editor",
        };
        f.write_str(s)
    }
}

impl FromStr for Relative {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center" => Ok(Relative::Center),
            "cursor" => Ok(Relative::Cursor),
            "cursor-around" | "around" => Ok(Relative::CursorAround),
            "editor" => Ok(Relative::Editor),
            other => Err(format!("unknown relative position '{other}'")),
        }
    }
}

/// Border glyphs, one per side and corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderChars {
    pub top: String,
    pub right: String,
    pub bottom: String,
    pub left: String,
    pub top_left: String,
    pub top_right: String,
    pub bottom_right: String,
    pub bottom_left: String,
}

impl BorderChars {
    /// Glyphs in top/right/bottom/left/top-left/top-right/bottom-right/
    /// bottom-left order.
    pub fn new(chars: [&str; 8]) -> Self {
        let [top, right, bottom, left, top_left, top_right, bottom_right, bottom_left] =
            chars.map(String::from);
        Self {
            top,
            right,
            bottom,
            left,
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    pub fn to_vec(&self) -> Vec<String> {
        vec![
            self.top.clone(),
            self.right.clone(),
            self.bottom.clone(),
            self.left.clone(),
            self.top_left.clone(),
            self.top_right.clone(),
            self.bottom_right.clone(),
            self.bottom_left.clone(),
        ]
    }
}

impl Default for BorderChars {
    fn default() -> Self {
        Self::new(DEFAULT_BORDER_CHARS)
    }
}

/// Buffer-local presets applied when a window's buffers are created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Mode {
    /// No settings are touched.
    #[default]
    Default,
    /// Scratch buffer: not backed by a file, hidden when abandoned, unlisted,
    /// no swap file.
    Base,
    /// `Base` plus read-only and unmodifiable.
    Show,
}

impl Mode {
    pub fn buffer_options(self) -> Vec<BufferOption> {
        match self {
            Mode::Default => Vec::new(),
            Mode::Base => vec![
                BufferOption::BufType(BufType::NoFile),
                BufferOption::BufHidden(BufHidden::Hide),
                BufferOption::BufListed(false),
                BufferOption::Wrap(true),
                BufferOption::SwapFile(false),
                BufferOption::ModeLine(false),
            ],
            Mode::Show => {
                let mut options = Mode::Base.buffer_options();
                options.extend([
                    BufferOption::Modifiable(false),
                    BufferOption::Modified(false),
                    BufferOption::ReadOnly(true),
                ]);
                options
            }
        }
    }

    pub fn window_options(self) -> Vec<WindowOption> {
        match self {
            Mode::Default => Vec::new(),
            Mode::Base | Mode::Show => vec![
                WindowOption::List(false),
                WindowOption::SignColumn(false),
                WindowOption::Number(false),
                WindowOption::RelativeNumber(false),
                WindowOption::FoldEnable(false),
                WindowOption::FoldColumn(0),
                WindowOption::Spell(false),
                WindowOption::CursorColumn(false),
                WindowOption::CursorLine(false),
                WindowOption::ColorColumn(String::new()),
            ],
        }
    }

    pub fn default_modifiable(self) -> Option<bool> {
        match self {
            Mode::Default | Mode::Show => Some(false),
            Mode::Base => None,
        }
    }

    pub fn default_focus(self) -> Option<bool> {
        match self {
            Mode::Default => Some(false),
            Mode::Base | Mode::Show => None,
        }
    }
}

/// Caller-supplied setup run against the host inside a batch. Two hooks are
/// equal only when they share the same closure.
pub struct Hook<F: ?Sized>(Rc<F>);

/// Runs once per buffer right after it is created.
pub type BufferHook = Hook<dyn Fn(&mut dyn Host, BufferId) -> Result<()>>;

/// Runs once per window right after it is opened; moved windows are skipped.
pub type WindowHook = Hook<dyn Fn(&mut dyn Host, BufferId, WindowId) -> Result<()>>;

impl BufferHook {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&mut dyn Host, BufferId) -> Result<()> + 'static,
    {
        Hook(Rc::new(hook))
    }

    pub fn call(&self, host: &mut dyn Host, buffer: BufferId) -> Result<()> {
        (*self.0)(host, buffer)
    }
}

impl WindowHook {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&mut dyn Host, BufferId, WindowId) -> Result<()> + 'static,
    {
        Hook(Rc::new(hook))
    }

    pub fn call(&self, host: &mut dyn Host, buffer: BufferId, window: WindowId) -> Result<()> {
        (*self.0)(host, buffer, window)
    }
}

impl<F: ?Sized> Clone for Hook<F> {
    fn clone(&self) -> Self {
        Hook(Rc::clone(&self.0))
    }
}

impl<F: ?Sized> PartialEq for Hook<F> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<F: ?Sized> Eq for Hook<F> {}

impl<F: ?Sized> fmt::Debug for Hook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOptions {
    /// Buffer name; empty creates a scratch buffer.
    pub name: String,
    pub mode: Mode,
    /// Allocate a second buffer for drawing the border in its own window.
    pub has_border_buf: bool,
    /// Runs after the mode's buffer settings.
    pub on_init: Option<BufferHook>,
    /// Replaces the [`Mode::Show`] settings of the border buffer.
    pub border_on_init: Option<BufferHook>,
}

impl Default for CreateOptions {
    fn default() -> Self {
        Self {
            name: String::new(),
            mode: Mode::Default,
            has_border_buf: true,
            on_init: None,
            border_on_init: None,
        }
    }
}

impl CreateOptions {
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_border_buf(mut self, has_border_buf: bool) -> Self {
        self.has_border_buf = has_border_buf;
        self
    }

    pub fn with_on_init(mut self, hook: BufferHook) -> Self {
        self.on_init = Some(hook);
        self
    }

    pub fn with_border_on_init(mut self, hook: BufferHook) -> Self {
        self.border_on_init = Some(hook);
        self
    }
}

/// Everything a caller can ask of an open, resume or resize.
///
/// Defaults: editor-relative at (0, 0), no offsets, no padding, no border,
/// focus and modifiable taken from the window's [`Mode`], focusable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpenOptions {
    pub relative: Relative,
    pub top: i32,
    pub left: i32,
    /// Added to the resolved row after anchoring.
    pub top_offset: i32,
    /// Added to the resolved column after anchoring.
    pub left_offset: i32,
    pub width: i32,
    pub height: i32,
    /// Popup dialect only.
    pub max_width: Option<i32>,
    /// Popup dialect only.
    pub max_height: Option<i32>,
    /// Padding shorthand in top/right/bottom/left order; an empty list means 1
    /// on every side.
    pub padding: Option<Vec<i32>>,
    /// Border shorthand in top/right/bottom/left order; an empty list enables
    /// every side.
    pub border: Option<Vec<i32>>,
    pub border_chars: Option<BorderChars>,
    /// Open only the border/background around the box, using this window's
    /// content buffer. Used for the shared frame of a group.
    pub border_only: bool,
    pub title: Option<String>,
    pub filetype: Option<String>,
    pub focus: Option<bool>,
    pub focusable: Option<bool>,
    pub lines: Option<Vec<String>>,
    pub highlights: Vec<Highlight>,
    pub modifiable: Option<bool>,
    pub win_hl: Option<String>,
    /// Float dialect only.
    pub win_hl_nc: Option<String>,
    pub border_win_hl: Option<String>,
    /// Runs on a newly opened content window after the mode's window
    /// settings.
    pub on_open: Option<WindowHook>,
    /// Replaces the [`Mode::Show`] window settings of a newly opened border
    /// window, or of the frame when `border_only` is set.
    pub border_on_open: Option<WindowHook>,
    /// Reuse this context instead of sampling the environment.
    pub context: Option<LayoutContext>,
}

impl OpenOptions {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_relative(mut self, relative: Relative) -> Self {
        self.relative = relative;
        self
    }

    pub fn with_position(mut self, top: i32, left: i32) -> Self {
        self.top = top;
        self.left = left;
        self
    }

    pub fn with_border(mut self, border: Vec<i32>) -> Self {
        self.border = Some(border);
        self
    }

    pub fn with_padding(mut self, padding: Vec<i32>) -> Self {
        self.padding = Some(padding);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines = Some(lines.into_iter().map(Into::into).collect());
        self
    }

    /// Degenerate boxes are never opened.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Buffers exist, nothing is shown.
    Created,
    Opened,
    /// Windows were torn down; buffers are kept for the next open.
    Closed,
}

/// Runtime identity of one controller's buffers and windows.
///
/// Window ids are filled in when a batch that opens windows is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowHandle {
    pub buffer: BufferId,
    pub border_buffer: Option<BufferId>,
    pub window: Option<WindowId>,
    pub border_window: Option<WindowId>,
    /// Cursor position of the last cursor-relative placement.
    pub stored_cursor: Option<Position>,
    pub state: WindowState,
}

impl WindowHandle {
    pub fn new(buffer: BufferId, border_buffer: Option<BufferId>) -> Self {
        Self {
            buffer,
            border_buffer,
            window: None,
            border_window: None,
            stored_cursor: None,
            state: WindowState::Created,
        }
    }

    pub fn buffers(&self) -> impl Iterator<Item = BufferId> + '_ {
        std::iter::once(self.buffer).chain(self.border_buffer)
    }

    pub(crate) fn mark_closed(&mut self) {
        self.window = None;
        self.border_window = None;
        if self.state == WindowState::Opened {
            self.state = WindowState::Closed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_mode_extends_base() {
        let base = Mode::Base.buffer_options();
        let show = Mode::Show.buffer_options();
        assert!(base.iter().all(|o| show.contains(o)));
        assert!(show.contains(&BufferOption::ReadOnly(true)));
        assert!(Mode::Default.buffer_options().is_empty());
    }

    #[test]
    fn relative_round_trips_through_strings() {
        for relative in [
            Relative::Center,
            Relative::Cursor,
            Relative::CursorAround,
            Relative::Editor,
        ] {
            assert_eq!(relative.to_string().parse::<Relative>(), Ok(relative));
        }
        assert!("window".parse::<Relative>().is_err());
    }

    #[test]
    fn degenerate_sizes() {
        assert!(OpenOptions::new(0, 3).is_degenerate());
        assert!(OpenOptions::new(3, -1).is_degenerate());
        assert!(!OpenOptions::new(1, 1).is_degenerate());
    }

    #[test]
    fn close_keeps_created_state() {
        let mut handle = WindowHandle::new(BufferId(1), None);
        handle.mark_closed();
        assert_eq!(handle.state, WindowState::Created);
        handle.state = WindowState::Opened;
        handle.window = Some(WindowId(3));
        handle.mark_closed();
        assert_eq!(handle.state, WindowState::Closed);
        assert_eq!(handle.window, None);
    }
}
