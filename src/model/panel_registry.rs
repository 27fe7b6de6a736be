//! Owns the one-panel-per-display mapping.
//!
//! The registry is the only owner of panel surfaces. It never looks at window
//! geometry; it only follows display topology and visibility requests.

use tracing::{debug, trace};

use crate::common::collections::{HashMap, HashSet};
use crate::sys::geometry::Rect;
use crate::sys::screen::{Display, DisplayUuid};
use crate::sys::window_server::Window;

/// The on-screen surface of one panel. Rendering is up to the implementor.
pub trait PanelSurface {
    /// `frame` is in the bottom-left-origin screen space.
    fn set_frame(&mut self, frame: Rect);
    fn show(&mut self);
    fn hide(&mut self);
    fn update_contents(&mut self, windows: &[&Window]);
    fn update_appearance(&mut self);
}

pub trait PanelFactory {
    fn create_panel(&mut self, display: &DisplayUuid) -> Box<dyn PanelSurface>;
}

/// Frame of the taskbar band at the bottom edge of `display`'s visible frame.
pub fn panel_frame(display: &Display, height: f64) -> Rect {
    let visible = display.visible_frame;
    Rect::from_xywh(visible.origin.x, visible.origin.y, visible.size.width, height)
}

pub struct Panel {
    display: DisplayUuid,
    frame: Rect,
    visible: bool,
    surface: Box<dyn PanelSurface>,
}

impl Panel {
    pub fn display(&self) -> &DisplayUuid { &self.display }

    pub fn frame(&self) -> Rect { self.frame }

    pub fn is_visible(&self) -> bool { self.visible }

    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
        self.surface.set_frame(frame);
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.surface.show();
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.surface.hide();
    }

    pub fn update_contents(&mut self, windows: &[&Window]) { self.surface.update_contents(windows) }

    pub fn update_appearance(&mut self) { self.surface.update_appearance() }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TopologyDiff {
    pub added: Vec<DisplayUuid>,
    pub removed: Vec<DisplayUuid>,
    pub repositioned: Vec<DisplayUuid>,
}

impl TopologyDiff {
    pub fn is_membership_change(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

pub struct PanelRegistry {
    panels: HashMap<DisplayUuid, Panel>,
    factory: Box<dyn PanelFactory>,
}

impl PanelRegistry {
    pub fn new(factory: Box<dyn PanelFactory>) -> Self {
        Self { panels: HashMap::default(), factory }
    }

    /// Brings the panel set in line with `displays`: new displays get a
    /// shown panel at their bottom edge, vanished displays lose theirs, and
    /// surviving panels are moved to the display's current bottom edge.
    pub fn sync_to_topology(&mut self, displays: &[Display], height: f64) -> TopologyDiff {
        let mut diff = TopologyDiff::default();
        let current: HashSet<&DisplayUuid> = displays.iter().map(|d| &d.uuid).collect();

        let stale: Vec<DisplayUuid> =
            self.panels.keys().filter(|uuid| !current.contains(uuid)).cloned().collect();
        for uuid in stale {
            if let Some(mut panel) = self.panels.remove(&uuid) {
                panel.hide();
                debug!(display = %uuid, "Removed panel for disconnected display");
                diff.removed.push(uuid);
            }
        }

        for d in displays {
            let frame = panel_frame(d, height);
            if let Some(panel) = self.panels.get_mut(&d.uuid) {
                if panel.frame != frame {
                    panel.set_frame(frame);
                    trace!(display = %d.uuid, ?frame, "Repositioned panel");
                    diff.repositioned.push(d.uuid.clone());
                }
                continue;
            }
            let mut panel = Panel {
                display: d.uuid.clone(),
                frame,
                visible: false,
                surface: self.factory.create_panel(&d.uuid),
            };
            panel.set_frame(frame);
            panel.show();
            debug!(display = %d.uuid, ?frame, "Created panel");
            self.panels.insert(d.uuid.clone(), panel);
            diff.added.push(d.uuid.clone());
        }

        diff
    }

    pub fn hide_all(&mut self) {
        for panel in self.panels.values_mut() {
            panel.hide();
        }
    }

    pub fn show_all(&mut self) {
        for panel in self.panels.values_mut() {
            panel.show();
        }
    }

    pub fn teardown(&mut self) {
        for (uuid, mut panel) in self.panels.drain() {
            panel.hide();
            trace!(display = %uuid, "Tore down panel");
        }
    }

    pub fn get(&self, display: &DisplayUuid) -> Option<&Panel> { self.panels.get(display) }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Panel> { self.panels.values_mut() }

    pub fn displays(&self) -> HashSet<DisplayUuid> { self.panels.keys().cloned().collect() }

    pub fn len(&self) -> usize { self.panels.len() }

    pub fn is_empty(&self) -> bool { self.panels.is_empty() }
}
