use thiserror::Error;

use crate::host::{BufferId, HostError};

pub type Result<T, E = FloatError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum FloatError {
    #[error("invalid screen geometry: {lines} lines x {columns} columns")]
    InvalidGeometry { lines: i32, columns: i32 },
    #[error("buffer {buffer:?} has no known window; open it before resizing")]
    NotOpened { buffer: BufferId },
    #[error("host call failed: {0}")]
    Host(#[from] HostError),
    #[error("event listener failed: {0}")]
    Listener(String),
}

impl FloatError {
    /// Whether the error only says that a window was already gone. Close paths
    /// treat these as success.
    pub fn is_already_closed(&self) -> bool {
        matches!(
            self,
            FloatError::Host(HostError::WindowNotFound(_) | HostError::NoWindowForBuffer(_))
        )
    }
}
