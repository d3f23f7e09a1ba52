//! Floating window layout and lifecycle for editor plugin hosts.
//!
//! Geometry lives in [`layout`], descriptor construction and controllers in
//! [`window`]. Every mutation a controller wants to make is returned as a
//! [`notifier::Notifier`] so callers can batch several controllers into one
//! atomic host update.

pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod host;
pub mod layout;
pub mod notifier;
pub mod runtime;
pub mod text;
pub mod theme;
pub mod tracing_sub;
pub mod window;

pub use config::{Backend, FloatConfig};
pub use error::{FloatError, Result};
pub use events::{EditorEvent, EventBus};
pub use host::{Environment, Host};
pub use notifier::Notifier;
pub use runtime::{Runtime, RuntimeBuilder};
pub use window::{
    BufferHook, CreateOptions, FloatingWindow, Mode, MultiCreateOptions, MultiFloatingWindow,
    MultiOpenOptions, OpenOptions, Relative, WindowHook,
};
