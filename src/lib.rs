//! Overlay taskbar core: one panel per display, kept in sync with display
//! topology, space visibility and window state, plus reactive shrinking of
//! windows that would otherwise render underneath the taskbar.

pub mod actor;
pub mod common;
pub mod model;
pub mod sys;
