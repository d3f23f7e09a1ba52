//! Crate-wide defaults, chosen once when the runtime is initialized.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::constants::{DEFAULT_BORDER_WIN_HL, DEFAULT_NAMESPACE, DEFAULT_WIN_HL, DEFAULT_WIN_HL_NC};
use crate::window::{BorderChars, ConfigBuilder, FloatConfigBuilder, PopupConfigBuilder};

/// Which placement dialect the host speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Backend {
    /// One descriptor per window; the host draws borders and titles.
    Popup,
    /// Plain rectangles; borders are drawn into a second window.
    #[default]
    Float,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Popup => f.write_str("popup"),
            Backend::Float => f.write_str("float"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "popup" => Ok(Backend::Popup),
            "float" => Ok(Backend::Float),
            other => Err(format!("unknown backend '{other}', expected 'popup' or 'float'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatConfig {
    pub backend: Backend,
    /// Name of the highlight namespace created at startup.
    pub namespace: String,
    pub win_hl: String,
    pub win_hl_nc: String,
    pub border_win_hl: String,
    pub border_chars: BorderChars,
}

impl Default for FloatConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            namespace: DEFAULT_NAMESPACE.to_owned(),
            win_hl: DEFAULT_WIN_HL.to_owned(),
            win_hl_nc: DEFAULT_WIN_HL_NC.to_owned(),
            border_win_hl: DEFAULT_BORDER_WIN_HL.to_owned(),
            border_chars: BorderChars::default(),
        }
    }
}

impl FloatConfig {
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_win_hl(mut self, win_hl: impl Into<String>) -> Self {
        self.win_hl = win_hl.into();
        self
    }

    pub fn with_border_win_hl(mut self, border_win_hl: impl Into<String>) -> Self {
        self.border_win_hl = border_win_hl.into();
        self
    }

    pub fn with_border_chars(mut self, border_chars: BorderChars) -> Self {
        self.border_chars = border_chars;
        self
    }

    /// Placement strategy for the configured backend.
    pub fn config_builder(&self) -> Rc<dyn ConfigBuilder> {
        match self.backend {
            Backend::Popup => Rc::new(PopupConfigBuilder::new(self)),
            Backend::Float => Rc::new(FloatConfigBuilder::new(self)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("Popup".parse::<Backend>(), Ok(Backend::Popup));
        assert_eq!("float".parse::<Backend>(), Ok(Backend::Float));
        assert!("nvim".parse::<Backend>().is_err());
    }

    #[test]
    fn builder_follows_backend() {
        let config = FloatConfig::default().with_backend(Backend::Popup);
        assert_eq!(config.config_builder().backend(), Backend::Popup);
        assert_eq!(FloatConfig::default().config_builder().backend(), Backend::Float);
    }
}
