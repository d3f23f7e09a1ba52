//! Turning computed boxes into the placement descriptors a host understands.
//!
//! Hosts come in two flavours. Popup hosts take one descriptor and draw the
//! border, padding and title themselves. Float hosts only place plain
//! rectangles, so the border is drawn by this crate into a second window that
//! sits under the content window. A [`ConfigBuilder`] is chosen once at
//! startup (see [`crate::runtime`]) and used for every placement.

use std::fmt;

use super::{BorderChars, OpenOptions};
use crate::config::{Backend, FloatConfig};
use crate::constants::{BORDER_ZINDEX, CONTENT_ZINDEX, FRAME_ZINDEX};
use crate::layout::{BoxSizes, CursorAnchor, Edges, LayoutContext, Position, Size, box_sizes};

/// What clicking a popup's border does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    Button,
    Click,
    None,
}

/// Popup dialect descriptor. `line` and `col` are 1-indexed and locate the
/// outermost (border) box; the size fields describe the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupConfig {
    pub line: i32,
    pub col: i32,
    pub zindex: u16,
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: i32,
    pub max_height: i32,
    pub highlight: String,
    pub title: Option<String>,
    pub padding: Option<Edges>,
    pub border: Option<Edges>,
    pub border_chars: Option<BorderChars>,
    pub border_highlight: Option<String>,
    pub close: Option<CloseTrigger>,
}

/// Float dialect descriptor: an editor-relative, 0-indexed rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatWinConfig {
    pub row: i32,
    pub col: i32,
    pub width: i32,
    pub height: i32,
    pub focusable: bool,
    pub zindex: u16,
}

impl FloatWinConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WinConfig {
    Popup(PopupConfig),
    Float(FloatWinConfig),
}

impl WinConfig {
    pub fn zindex(&self) -> u16 {
        match self {
            WinConfig::Popup(config) => config.zindex,
            WinConfig::Float(config) => config.zindex,
        }
    }

    /// Size of the area the window's buffer is drawn into.
    pub fn content_size(&self) -> Size {
        match self {
            WinConfig::Popup(config) => Size::new(config.min_width, config.min_height),
            WinConfig::Float(config) => config.size(),
        }
    }
}

impl From<FloatWinConfig> for WinConfig {
    fn from(config: FloatWinConfig) -> Self {
        WinConfig::Float(config)
    }
}

/// Result of one placement computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinConfigs {
    pub window: WinConfig,
    /// Separate border window, float dialect only.
    pub border: Option<FloatWinConfig>,
    pub boxes: BoxSizes,
}

impl WinConfigs {
    /// Cursor the placement was anchored to, to be stored by the caller.
    pub fn cursor(&self) -> Option<Position> {
        self.boxes.cursor
    }
}

pub trait ConfigBuilder: fmt::Debug {
    fn backend(&self) -> Backend;

    fn build(&self, ctx: &LayoutContext, options: &OpenOptions, anchor: CursorAnchor)
    -> WinConfigs;

    /// Window-local highlight remapping, if the dialect uses one.
    fn window_highlight(&self, options: &OpenOptions) -> Option<String>;

    fn border_chars<'a>(&'a self, options: &'a OpenOptions) -> &'a BorderChars;

    fn border_highlight<'a>(&'a self, options: &'a OpenOptions) -> &'a str;
}

#[derive(Debug, Clone)]
struct Defaults {
    win_hl: String,
    win_hl_nc: String,
    border_win_hl: String,
    border_chars: BorderChars,
}

impl From<&FloatConfig> for Defaults {
    fn from(config: &FloatConfig) -> Self {
        Self {
            win_hl: config.win_hl.clone(),
            win_hl_nc: config.win_hl_nc.clone(),
            border_win_hl: config.border_win_hl.clone(),
            border_chars: config.border_chars.clone(),
        }
    }
}

impl Defaults {
    fn border_chars<'a>(&'a self, options: &'a OpenOptions) -> &'a BorderChars {
        options.border_chars.as_ref().unwrap_or(&self.border_chars)
    }

    fn border_highlight<'a>(&'a self, options: &'a OpenOptions) -> &'a str {
        options.border_win_hl.as_deref().unwrap_or(&self.border_win_hl)
    }
}

#[derive(Debug, Clone)]
pub struct PopupConfigBuilder {
    defaults: Defaults,
}

impl PopupConfigBuilder {
    pub fn new(config: &FloatConfig) -> Self {
        Self {
            defaults: config.into(),
        }
    }
}

impl ConfigBuilder for PopupConfigBuilder {
    fn backend(&self) -> Backend {
        Backend::Popup
    }

    fn build(
        &self,
        ctx: &LayoutContext,
        options: &OpenOptions,
        anchor: CursorAnchor,
    ) -> WinConfigs {
        let boxes = box_sizes(ctx, options, anchor);
        let content = boxes.content;
        let mut config = PopupConfig {
            line: boxes.border.top + 1 + options.top_offset,
            col: boxes.border.left + 1 + options.left_offset,
            zindex: if options.border_only {
                FRAME_ZINDEX
            } else {
                CONTENT_ZINDEX
            },
            min_width: content.width,
            min_height: content.height,
            max_width: options.max_width.filter(|w| *w > 0).unwrap_or(content.width),
            max_height: options
                .max_height
                .filter(|h| *h > 0)
                .unwrap_or(content.height),
            highlight: options
                .win_hl
                .clone()
                .unwrap_or_else(|| self.defaults.win_hl.clone()),
            title: None,
            padding: None,
            border: None,
            border_chars: None,
            border_highlight: None,
            close: None,
        };
        if ctx.padding_enabled {
            config.padding = Some(ctx.padding);
        }
        if ctx.border_enabled {
            config.border = Some(ctx.border);
            if ctx.border.top > 0 {
                if ctx.title.width > 0 {
                    config.title = Some(ctx.title.text.clone());
                }
                config.close = Some(CloseTrigger::Button);
            }
            config.border_chars = Some(self.defaults.border_chars(options).clone());
            config.border_highlight = Some(self.defaults.border_highlight(options).to_owned());
        }
        WinConfigs {
            window: WinConfig::Popup(config),
            border: None,
            boxes,
        }
    }

    fn window_highlight(&self, _options: &OpenOptions) -> Option<String> {
        None
    }

    fn border_chars<'a>(&'a self, options: &'a OpenOptions) -> &'a BorderChars {
        self.defaults.border_chars(options)
    }

    fn border_highlight<'a>(&'a self, options: &'a OpenOptions) -> &'a str {
        self.defaults.border_highlight(options)
    }
}

#[derive(Debug, Clone)]
pub struct FloatConfigBuilder {
    defaults: Defaults,
}

impl FloatConfigBuilder {
    pub fn new(config: &FloatConfig) -> Self {
        Self {
            defaults: config.into(),
        }
    }
}

impl ConfigBuilder for FloatConfigBuilder {
    fn backend(&self) -> Backend {
        Backend::Float
    }

    fn build(
        &self,
        ctx: &LayoutContext,
        options: &OpenOptions,
        anchor: CursorAnchor,
    ) -> WinConfigs {
        let boxes = box_sizes(ctx, options, anchor);
        let (content, border) = (boxes.content, boxes.border);
        let window = FloatWinConfig {
            row: content.top + options.top_offset,
            col: content.left + options.left_offset,
            width: content.width,
            height: content.height,
            focusable: options.focusable.unwrap_or(true),
            zindex: CONTENT_ZINDEX,
        };
        let border = FloatWinConfig {
            row: border.top + options.top_offset,
            col: border.left + options.left_offset,
            width: border.width,
            height: border.height,
            focusable: false,
            zindex: if options.border_only {
                FRAME_ZINDEX
            } else {
                BORDER_ZINDEX
            },
        };
        WinConfigs {
            window: WinConfig::Float(window),
            border: Some(border),
            boxes,
        }
    }

    fn window_highlight(&self, options: &OpenOptions) -> Option<String> {
        let normal = options.win_hl.as_deref().unwrap_or(&self.defaults.win_hl);
        let normal_nc = options
            .win_hl_nc
            .as_deref()
            .unwrap_or(&self.defaults.win_hl_nc);
        Some(format!("Normal:{normal},NormalNC:{normal_nc}"))
    }

    fn border_chars<'a>(&'a self, options: &'a OpenOptions) -> &'a BorderChars {
        self.defaults.border_chars(options)
    }

    fn border_highlight<'a>(&'a self, options: &'a OpenOptions) -> &'a str {
        self.defaults.border_highlight(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ScreenSize;
    use crate::window::Relative;

    fn ctx() -> LayoutContext {
        LayoutContext::new(ScreenSize::new(50, 80), Position::new(10, 20)).unwrap()
    }

    #[test]
    fn popup_line_and_col_are_one_indexed() {
        let builder = PopupConfigBuilder::new(&FloatConfig::default());
        let options = OpenOptions::new(10, 4).with_position(3, 5);
        let built = builder.build(&ctx(), &options, CursorAnchor::live());
        let WinConfig::Popup(config) = built.window else {
            panic!("expected popup config");
        };
        assert_eq!((config.line, config.col), (4, 6));
        assert_eq!((config.min_width, config.max_width), (10, 10));
        assert_eq!(config.zindex, CONTENT_ZINDEX);
        assert!(config.border.is_none());
        assert!(built.border.is_none());
    }

    #[test]
    fn popup_border_brings_title_and_close_button() {
        let builder = PopupConfigBuilder::new(&FloatConfig::default());
        let ctx = ctx()
            .with_border(Edges::new(1, 1, 1, 0))
            .with_title("hi", 2);
        let options = OpenOptions {
            max_width: Some(30),
            border_only: true,
            ..OpenOptions::new(10, 4)
        };
        let built = builder.build(&ctx, &options, CursorAnchor::live());
        let WinConfig::Popup(config) = built.window else {
            panic!("expected popup config");
        };
        assert_eq!(config.title.as_deref(), Some("hi"));
        assert_eq!(config.close, Some(CloseTrigger::Button));
        assert_eq!(config.max_width, 30);
        assert_eq!(config.zindex, FRAME_ZINDEX);
        assert_eq!(config.border_chars, Some(BorderChars::default()));
    }

    #[test]
    fn popup_without_top_border_has_no_title() {
        let builder = PopupConfigBuilder::new(&FloatConfig::default());
        let ctx = ctx().with_border(Edges::new(0, 1, 1, 1)).with_title("hi", 2);
        let built = builder.build(&ctx, &OpenOptions::new(10, 4), CursorAnchor::live());
        let WinConfig::Popup(config) = built.window else {
            panic!("expected popup config");
        };
        assert_eq!(config.title, None);
        assert_eq!(config.close, None);
    }

    #[test]
    fn float_configs_apply_offsets_to_both_windows() {
        let builder = FloatConfigBuilder::new(&FloatConfig::default());
        let ctx = ctx().with_border(Edges::uniform(1));
        let options = OpenOptions {
            relative: Relative::Cursor,
            top_offset: 2,
            left_offset: -1,
            focusable: Some(false),
            ..OpenOptions::new(6, 3)
        };
        let built = builder.build(&ctx, &options, CursorAnchor::live());
        assert_eq!(
            built.window,
            WinConfig::Float(FloatWinConfig {
                row: 13,
                col: 20,
                width: 6,
                height: 3,
                focusable: false,
                zindex: CONTENT_ZINDEX,
            })
        );
        assert_eq!(
            built.border,
            Some(FloatWinConfig {
                row: 12,
                col: 19,
                width: 8,
                height: 5,
                focusable: false,
                zindex: BORDER_ZINDEX,
            })
        );
        assert_eq!(built.cursor(), Some(Position::new(10, 20)));
    }

    #[test]
    fn float_window_highlight_uses_defaults() {
        let builder = FloatConfigBuilder::new(&FloatConfig::default());
        let options = OpenOptions {
            win_hl: Some("Pmenu".into()),
            ..OpenOptions::new(1, 1)
        };
        assert_eq!(
            builder.window_highlight(&options).as_deref(),
            Some("Normal:Pmenu,NormalNC:FloatWmNormalFloatNC")
        );
        let popup = PopupConfigBuilder::new(&FloatConfig::default());
        assert_eq!(popup.window_highlight(&options), None);
    }
}
