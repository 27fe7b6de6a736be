//! The accessibility seam used to write window geometry.

use thiserror::Error;

use crate::sys::geometry::{Point, Size};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AxError {
    #[error("window is no longer valid")]
    InvalidElement,
    #[error("attribute write rejected: {0}")]
    Rejected(String),
}

/// Write access to a window's frame. Implementations may block on the window
/// server; callers keep them off the UI-affine thread.
pub trait GeometryHandle: Send + Sync {
    fn set_size(&self, size: Size) -> Result<(), AxError>;

    fn set_position(&self, position: Point) -> Result<(), AxError>;
}
