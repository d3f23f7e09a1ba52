use std::collections::HashMap;

use ratatui::style::{Color, Modifier, Style};

use crate::constants::{DEFAULT_BORDER_WIN_HL, DEFAULT_WIN_HL};

// Highlight group styles used when the in-memory host draws windows. Groups
// without an entry fall back to `Normal`.

pub const NORMAL: &str = "Normal";
pub const TITLE: &str = "Title";

pub fn float_bg() -> Color {
    Color::Rgb(0x1f, 0x23, 0x35)
}

pub fn float_fg() -> Color {
    Color::White
}

pub fn border_fg() -> Color {
    Color::Rgb(0x7a, 0x88, 0xcf)
}

pub fn title_fg() -> Color {
    Color::Rgb(0xff, 0xa5, 0x00)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    groups: HashMap<String, Style>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::empty()
            .with_group(NORMAL, Style::default())
            .with_group(DEFAULT_WIN_HL, Style::default().fg(float_fg()).bg(float_bg()))
            .with_group(
                DEFAULT_BORDER_WIN_HL,
                Style::default().fg(border_fg()).bg(float_bg()),
            )
            .with_group(
                TITLE,
                Style::default().fg(title_fg()).add_modifier(Modifier::BOLD),
            )
            .with_group("Search", Style::default().fg(Color::Black).bg(Color::Yellow))
            .with_group("Comment", Style::default().fg(Color::DarkGray))
    }
}

impl Theme {
    pub fn empty() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }

    pub fn with_group(mut self, group: impl Into<String>, style: Style) -> Self {
        self.groups.insert(group.into(), style);
        self
    }

    /// Style defined for exactly `group`.
    pub fn get(&self, group: &str) -> Option<Style> {
        self.groups.get(group).copied()
    }

    /// Style for `group`, or `Normal` when it is not defined.
    pub fn style(&self, group: &str) -> Style {
        self.get(group)
            .or_else(|| self.get(NORMAL))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_groups_fall_back_to_normal() {
        let theme = Theme::empty().with_group(NORMAL, Style::default().fg(Color::Red));
        assert_eq!(theme.style("Missing"), Style::default().fg(Color::Red));
        assert_eq!(Theme::empty().style("Missing"), Style::default());
    }

    #[test]
    fn default_theme_styles_float_groups() {
        let theme = Theme::default();
        assert_eq!(theme.style(DEFAULT_WIN_HL).bg, Some(float_bg()));
        assert!(theme.get("FloatWmNormalFloatNC").is_none());
    }
}
