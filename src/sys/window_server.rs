use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::sys::ax::GeometryHandle;
use crate::sys::geometry::{Point, Size};
use crate::sys::screen::{DisplayUuid, SpaceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(u32);

impl WindowId {
    pub const fn new(id: u32) -> Self { Self(id) }

    pub const fn as_u32(&self) -> u32 { self.0 }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowFlags: u8 {
        const MINIMIZED = 1 << 0;
        const HIDDEN = 1 << 1;
        /// Native fullscreen, i.e. the window owns a fullscreen space.
        const FULLSCREEN = 1 << 2;
        /// Background process with no user-facing window.
        const WINDOWLESS = 1 << 3;
    }
}

/// A window as enumerated by the window registry. Position and size are in
/// the top-left-origin window space.
#[derive(Clone)]
pub struct Window {
    pub id: WindowId,
    pub display: Option<DisplayUuid>,
    pub spaces: Vec<SpaceId>,
    pub flags: WindowFlags,
    pub position: Option<Point>,
    pub size: Option<Size>,
    /// Present only when the window's geometry can be changed.
    pub handle: Option<Arc<dyn GeometryHandle>>,
}

impl Window {
    pub fn is_minimized(&self) -> bool { self.flags.contains(WindowFlags::MINIMIZED) }

    pub fn is_hidden(&self) -> bool { self.flags.contains(WindowFlags::HIDDEN) }

    pub fn is_fullscreen(&self) -> bool { self.flags.contains(WindowFlags::FULLSCREEN) }

    pub fn is_windowless(&self) -> bool { self.flags.contains(WindowFlags::WINDOWLESS) }

    pub fn is_on_display(&self, display: &DisplayUuid) -> bool {
        self.display.as_ref() == Some(display)
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("display", &self.display)
            .field("spaces", &self.spaces)
            .field("flags", &self.flags)
            .field("position", &self.position)
            .field("size", &self.size)
            .field("has_handle", &self.handle.is_some())
            .finish()
    }
}

pub trait WindowSource {
    /// Live windows in the registry's natural enumeration order.
    fn list_windows(&self) -> Vec<Window>;
}
