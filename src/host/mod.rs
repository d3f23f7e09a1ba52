//! Boundary between the layout engine and the editor that actually owns
//! buffers and windows.
//!
//! The engine never talks to an editor directly. It describes what it needs
//! through the [`Host`] and [`Environment`] traits: a small, fixed set of typed
//! operations that an editor integration implements once. [`term::TermHost`]
//! is an in-process implementation used by the demo binary and the tests.
//!
//! Mutating calls issued by controllers always run inside a batch opened with
//! [`Host::begin_batch`] and closed with [`Host::commit_batch`] (see
//! [`crate::notifier::Notifier`]). A host must apply a committed batch as one
//! unit and discard everything since `begin_batch` on [`Host::abort_batch`].

pub mod term;

use std::fmt;

use thiserror::Error;

use crate::layout::Position;
use crate::layout::context::ScreenSize;
use crate::window::config::WinConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamespaceId(pub u32);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf#{}", self.0)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "win#{}", self.0)
    }
}

pub type HostResult<T> = Result<T, HostError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("buffer {0} does not exist")]
    BufferNotFound(BufferId),
    #[error("window {0} does not exist")]
    WindowNotFound(WindowId),
    #[error("buffer {0} is not shown in any window")]
    NoWindowForBuffer(BufferId),
    #[error("host rejected the call: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BufType {
    Normal,
    NoFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BufHidden {
    Keep,
    Hide,
    Wipe,
}

/// Buffer-local settings the engine knows how to ask for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BufferOption {
    BufType(BufType),
    BufHidden(BufHidden),
    BufListed(bool),
    SwapFile(bool),
    ModeLine(bool),
    Wrap(bool),
    Modifiable(bool),
    Modified(bool),
    ReadOnly(bool),
    FileType(String),
}

impl BufferOption {
    /// Stable option name; two options with the same key overwrite each other.
    pub fn key(&self) -> &'static str {
        match self {
            BufferOption::BufType(_) => "buftype",
            BufferOption::BufHidden(_) => "bufhidden",
            BufferOption::BufListed(_) => "buflisted",
            BufferOption::SwapFile(_) => "swapfile",
            BufferOption::ModeLine(_) => "modeline",
            BufferOption::Wrap(_) => "wrap",
            BufferOption::Modifiable(_) => "modifiable",
            BufferOption::Modified(_) => "modified",
            BufferOption::ReadOnly(_) => "readonly",
            BufferOption::FileType(_) => "filetype",
        }
    }
}

/// Window-local settings the engine knows how to ask for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WindowOption {
    List(bool),
    Number(bool),
    RelativeNumber(bool),
    SignColumn(bool),
    FoldEnable(bool),
    FoldColumn(u8),
    Spell(bool),
    CursorLine(bool),
    CursorColumn(bool),
    ColorColumn(String),
    /// `Normal:<group>,NormalNC:<group>` style highlight remapping.
    WinHighlight(String),
}

impl WindowOption {
    pub fn key(&self) -> &'static str {
        match self {
            WindowOption::List(_) => "list",
            WindowOption::Number(_) => "number",
            WindowOption::RelativeNumber(_) => "relativenumber",
            WindowOption::SignColumn(_) => "signcolumn",
            WindowOption::FoldEnable(_) => "foldenable",
            WindowOption::FoldColumn(_) => "foldcolumn",
            WindowOption::Spell(_) => "spell",
            WindowOption::CursorLine(_) => "cursorline",
            WindowOption::CursorColumn(_) => "cursorcolumn",
            WindowOption::ColorColumn(_) => "colorcolumn",
            WindowOption::WinHighlight(_) => "winhighlight",
        }
    }
}

/// A highlighted column range on one buffer line. Columns are 0-indexed and
/// `col_end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub namespace: Option<NamespaceId>,
    pub group: String,
    pub line: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl Highlight {
    pub fn new(group: impl Into<String>, line: usize, col_start: usize, col_end: usize) -> Self {
        Self {
            namespace: None,
            group: group.into(),
            line,
            col_start,
            col_end,
        }
    }

    pub fn with_namespace(mut self, namespace: NamespaceId) -> Self {
        self.namespace = Some(namespace);
        self
    }
}

/// Read-only queries about the editor screen.
pub trait Environment {
    /// Cursor position on the whole screen, 0-indexed.
    fn global_cursor_position(&self) -> Position;

    /// Usable screen size in cells.
    fn screen_size(&self) -> ScreenSize;

    /// Number of screen cells `text` occupies.
    fn display_width(&self, text: &str) -> usize {
        crate::text::display_width(text)
    }
}

/// Buffer and window primitives offered by the editor.
pub trait Host: Environment {
    fn create_namespace(&mut self, name: &str) -> HostResult<NamespaceId>;

    /// Create a scratch buffer, or a named one when `name` is not empty.
    fn create_buffer(&mut self, name: &str) -> HostResult<BufferId>;

    fn delete_buffer(&mut self, buffer: BufferId) -> HostResult<()>;

    fn open_window(
        &mut self,
        buffer: BufferId,
        focus: bool,
        config: &WinConfig,
    ) -> HostResult<WindowId>;

    fn set_window_config(&mut self, window: WindowId, config: &WinConfig) -> HostResult<()>;

    /// Close the window currently showing `buffer`. The buffer survives.
    fn close_window_by_buffer(&mut self, buffer: BufferId) -> HostResult<()>;

    fn window_of_buffer(&self, buffer: BufferId) -> Option<WindowId>;

    fn set_buffer_lines(&mut self, buffer: BufferId, lines: &[String]) -> HostResult<()>;

    fn set_buffer_option(&mut self, buffer: BufferId, option: BufferOption) -> HostResult<()>;

    fn set_window_option(&mut self, window: WindowId, option: WindowOption) -> HostResult<()>;

    fn add_highlight(&mut self, buffer: BufferId, highlight: &Highlight) -> HostResult<()>;

    /// Make `from` fall back to `to` unless `from` is defined explicitly.
    fn link_highlight(&mut self, from: &str, to: &str) -> HostResult<()>;

    fn begin_batch(&mut self);

    fn commit_batch(&mut self) -> HostResult<()>;

    fn abort_batch(&mut self);
}
