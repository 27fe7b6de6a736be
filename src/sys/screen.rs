use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::collections::{HashMap, HashSet};
use crate::sys::geometry::Rect;

/// Stable identity of a display, as reissued by the OS across reconnects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayUuid(String);

impl DisplayUuid {
    pub fn new(uuid: impl Into<String>) -> Self { Self(uuid.into()) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for DisplayUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for DisplayUuid {
    fn from(value: &str) -> Self { Self::new(value) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceId(u64);

impl SpaceId {
    pub const fn new(id: u64) -> Self { Self(id) }
}

/// Snapshot of one attached display. Frames are in the bottom-left-origin
/// screen space; `visible_frame` excludes the menu bar and the Dock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub uuid: DisplayUuid,
    pub frame: Rect,
    pub visible_frame: Rect,
    /// Set on the display carrying the menu bar. It anchors the flip between
    /// screen space and window space.
    #[serde(default)]
    pub is_primary: bool,
}

pub trait DisplaySource {
    fn list_displays(&self) -> Vec<Display>;
}

/// Picks the display used as the coordinate flip anchor.
///
/// Enumeration order is not guaranteed to be stable, so the explicitly
/// flagged primary display wins. Only when no display carries the flag does
/// the first listed one stand in.
pub fn reference_display(displays: &[Display]) -> Option<&Display> {
    displays.iter().find(|d| d.is_primary).or_else(|| {
        let first = displays.first();
        if let Some(d) = first {
            debug!(display = %d.uuid, "No primary display flagged; using first listed display");
        }
        first
    })
}

/// Which spaces each display hosts and which spaces are currently visible.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpaceSnapshot {
    by_display: HashMap<DisplayUuid, HashSet<SpaceId>>,
    visible: HashSet<SpaceId>,
}

impl SpaceSnapshot {
    pub fn new(
        by_display: HashMap<DisplayUuid, HashSet<SpaceId>>,
        visible: HashSet<SpaceId>,
    ) -> Self {
        Self { by_display, visible }
    }

    pub fn spaces_of(&self, display: &DisplayUuid) -> Option<&HashSet<SpaceId>> {
        self.by_display.get(display)
    }

    /// Spaces hosted by `display` that are visible right now.
    pub fn visible_spaces_for(&self, display: &DisplayUuid) -> HashSet<SpaceId> {
        let Some(spaces) = self.spaces_of(display) else {
            return HashSet::default();
        };
        spaces.intersection(&self.visible).copied().collect()
    }
}

pub trait SpaceSource {
    fn space_snapshot(&self) -> SpaceSnapshot;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(uuid: &str, is_primary: bool) -> Display {
        Display {
            uuid: uuid.into(),
            frame: Rect::from_xywh(0.0, 0.0, 100.0, 100.0),
            visible_frame: Rect::from_xywh(0.0, 0.0, 100.0, 90.0),
            is_primary,
        }
    }

    #[test]
    fn reference_display_prefers_flagged_primary() {
        let displays = vec![display("external", false), display("builtin", true)];
        assert_eq!(
            reference_display(&displays).map(|d| d.uuid.as_str()),
            Some("builtin")
        );
    }

    #[test]
    fn reference_display_falls_back_to_first() {
        let displays = vec![display("a", false), display("b", false)];
        assert_eq!(reference_display(&displays).map(|d| d.uuid.as_str()), Some("a"));
        assert!(reference_display(&[]).is_none());
    }

    #[test]
    fn visible_spaces_for_intersects_with_global_visibility() {
        let mut by_display = HashMap::default();
        by_display.insert(
            DisplayUuid::from("a"),
            [SpaceId::new(1), SpaceId::new(2)].into_iter().collect::<HashSet<_>>(),
        );
        let visible = [SpaceId::new(2), SpaceId::new(3)].into_iter().collect::<HashSet<_>>();
        let snapshot = SpaceSnapshot::new(by_display, visible);

        let expected: HashSet<SpaceId> = [SpaceId::new(2)].into_iter().collect();
        assert_eq!(snapshot.visible_spaces_for(&"a".into()), expected);
        assert!(snapshot.visible_spaces_for(&"missing".into()).is_empty());
    }
}
