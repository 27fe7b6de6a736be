//! Decides whether a window reaches into the taskbar band and, if so, what
//! frame it should be shrunk to.

use crate::sys::geometry::{Point, Size, to_window_space};
use crate::sys::screen::Display;
use crate::sys::window_server::Window;

/// Slack used to tell "needs adjustment" from "already adjusted". Absorbs
/// rounding in frames reported back by applications.
pub const TOLERANCE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustDecision {
    /// The window lacks something needed to adjust it. Not an error.
    NotAdjustable(&'static str),
    /// Native fullscreen windows are never resized.
    Fullscreen,
    NoOverlap,
    AlreadyAdjusted,
    /// The computed height is not positive or would not change anything.
    Degenerate,
    Resize { size: Size, position: Point },
}

/// Top edge of the taskbar band on `display`, in window space.
pub fn taskbar_top(display: &Display, reference: &Display, height: f64) -> f64 {
    let visible = to_window_space(display.visible_frame, reference.frame);
    visible.origin.y + visible.size.height - height
}

/// `display` must be the window's own display, freshly resolved from the
/// current topology, and `reference` the coordinate flip anchor.
pub fn plan_adjustment(
    window: &Window,
    display: &Display,
    reference: &Display,
    height: f64,
) -> AdjustDecision {
    if window.is_windowless() {
        return AdjustDecision::NotAdjustable("windowless");
    }
    if window.is_fullscreen() {
        return AdjustDecision::Fullscreen;
    }
    if window.handle.is_none() {
        return AdjustDecision::NotAdjustable("no geometry handle");
    }
    let (Some(position), Some(size)) = (window.position, window.size) else {
        return AdjustDecision::NotAdjustable("unknown frame");
    };

    let top = taskbar_top(display, reference, height);
    let bottom = position.y + size.height;

    let overlaps = bottom > top + TOLERANCE;
    let already_adjusted = (bottom - top).abs() <= TOLERANCE;
    if already_adjusted {
        return AdjustDecision::AlreadyAdjusted;
    }
    if !overlaps {
        return AdjustDecision::NoOverlap;
    }

    let new_height = top - position.y;
    if new_height <= 0.0 || (size.height - new_height).abs() <= TOLERANCE {
        return AdjustDecision::Degenerate;
    }

    AdjustDecision::Resize {
        size: Size::new(size.width, new_height),
        position,
    }
}
