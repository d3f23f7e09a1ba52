//! Shared crate-wide constants.

/// Border glyphs in top/right/bottom/left/top-left/top-right/bottom-right/
/// bottom-left order.
pub const DEFAULT_BORDER_CHARS: [&str; 8] = ["─", "│", "─", "│", "┌", "┐", "┘", "└"];

/// Highlight group applied to the content of a floating window.
pub const DEFAULT_WIN_HL: &str = "FloatWmNormalFloat";

/// Highlight group applied to a floating window that does not have focus.
/// Linked to [`DEFAULT_WIN_HL`] at runtime initialization.
pub const DEFAULT_WIN_HL_NC: &str = "FloatWmNormalFloatNC";

/// Highlight group applied to border glyphs.
pub const DEFAULT_BORDER_WIN_HL: &str = "FloatWmNormalFloatBorder";

/// Namespace used for every highlight the crate adds.
pub const DEFAULT_NAMESPACE: &str = "float-wm-floatwin";

/// Stacking order of a regular content window.
pub const CONTENT_ZINDEX: u16 = 100;

/// Stacking order of the border window that sits under its content window.
pub const BORDER_ZINDEX: u16 = 99;

/// Stacking order of a shared frame drawn behind a group of windows.
pub const FRAME_ZINDEX: u16 = 1;

/// Filetype given to border buffers so host-side plugins can ignore them.
pub const BORDER_FILETYPE: &str = "float-wm-border";
