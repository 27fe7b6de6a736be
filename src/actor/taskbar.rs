//! The taskbar actor keeps one panel per display in sync with topology, space
//! visibility and window state, and shrinks windows that reach into the
//! taskbar band.
//!
//! All snapshot reads, panel mutations and filtering happen on the actor's
//! task, one event at a time. Geometry writes are handed to the
//! [`GeometryWorker`](super::geometry_worker::GeometryWorker) so that a slow
//! application never stalls the taskbar.

#[cfg(test)]
mod testing;


mod replay;

pub use replay::{ReplayError, Report, replay};

use std::sync::mpsc::{RecvError, SyncSender, sync_channel};

use tracing::{debug, info, instrument, trace, warn};

use crate::actor;
use crate::actor::geometry_worker::{GeometryCommand, GeometryQueue};
use crate::common::config::{ConfigError, TaskbarSettings};
use crate::model::geometry_adjuster::{AdjustDecision, plan_adjustment};
use crate::model::panel_registry::{PanelFactory, PanelRegistry};
use crate::model::window_filter::{has_fullscreen_window, select_windows_for_panel};
use crate::sys::screen::{Display, DisplaySource, SpaceSource, reference_display};
use crate::sys::window_server::{Window, WindowId, WindowSource};

/// The external collaborators the taskbar reads from. Built once at startup.
pub struct TaskbarContext {
    pub displays: Box<dyn DisplaySource>,
    pub windows: Box<dyn WindowSource>,
    pub spaces: Box<dyn SpaceSource>,
}

pub struct Taskbar {
    context: TaskbarContext,
    settings: TaskbarSettings,
    panels: PanelRegistry,
    geometry: GeometryQueue,
    enabled: bool,
}

impl Taskbar {
    pub fn new(
        context: TaskbarContext,
        panel_factory: Box<dyn PanelFactory>,
        settings: TaskbarSettings,
        geometry: GeometryQueue,
    ) -> Self {
        Self {
            context,
            settings,
            panels: PanelRegistry::new(panel_factory),
            geometry,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool { self.enabled }

    pub fn settings(&self) -> &TaskbarSettings { &self.settings }

    pub fn panels(&self) -> &PanelRegistry { &self.panels }

    #[instrument(skip(self))]
    pub fn enable(&mut self) {
        if self.enabled {
            return;
        }
        self.enabled = true;
        info!("Enabling taskbar");
        self.sync_panels();
        self.refresh_contents();
        // Windows that were maximized or tiled before the taskbar existed.
        self.adjust_all_windows();
    }

    /// Removes every panel. Windows that were shrunk keep their geometry.
    #[instrument(skip(self))]
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        info!("Disabling taskbar");
        self.panels.teardown();
    }

    #[instrument(skip(self))]
    pub fn on_topology_changed(&mut self) {
        if !self.enabled {
            return;
        }
        self.sync_panels();
        self.refresh_contents();
    }

    fn sync_panels(&mut self) {
        let displays = self.context.displays.list_displays();
        let diff = self.panels.sync_to_topology(&displays, self.settings.height);
        if diff.is_membership_change() {
            debug!(added = ?diff.added, removed = ?diff.removed, "Panel set changed");
        }
    }

    pub fn refresh_contents(&mut self) {
        if !self.enabled {
            return;
        }
        let windows = self.context.windows.list_windows();
        let spaces = self.context.spaces.space_snapshot();

        for panel in self.panels.iter_mut() {
            let uuid = panel.display().clone();
            if has_fullscreen_window(&uuid, &windows) {
                trace!(display = %uuid, "Fullscreen window present; hiding panel");
                panel.hide();
                continue;
            }
            panel.show();
            let listed = select_windows_for_panel(&uuid, &windows, &spaces, &self.settings);
            trace!(display = %uuid, count = listed.len(), "Updating panel contents");
            panel.update_contents(&listed);
        }
    }

    pub fn on_appearance_changed(&mut self) {
        for panel in self.panels.iter_mut() {
            panel.update_appearance();
        }
    }

    /// Returns how many windows had a resize queued.
    pub fn adjust_all_windows(&mut self) -> usize {
        if !self.enabled {
            return 0;
        }
        let displays = self.context.displays.list_displays();
        let windows = self.context.windows.list_windows();
        windows.iter().filter(|window| self.adjust_against(window, &displays)).count()
    }

    /// Queues a resize if `window` reaches into the taskbar band. Returns
    /// whether a resize was queued.
    pub fn adjust_if_needed(&self, window: &Window) -> bool {
        if !self.enabled {
            return false;
        }
        let displays = self.context.displays.list_displays();
        self.adjust_against(window, &displays)
    }

    fn adjust_against(&self, window: &Window, displays: &[Display]) -> bool {
        let Some(display_uuid) = &window.display else {
            trace!(window = %window.id, "Window has no display; skipping");
            return false;
        };
        let Some(display) = displays.iter().find(|d| &d.uuid == display_uuid) else {
            trace!(window = %window.id, display = %display_uuid, "Display is gone; skipping");
            return false;
        };
        let Some(reference) = reference_display(displays) else {
            return false;
        };

        match plan_adjustment(window, display, reference, self.settings.height) {
            AdjustDecision::Resize { size, position } => {
                let Some(handle) = window.handle.clone() else {
                    return false;
                };
                debug!(window = %window.id, ?size, ?position, "Shrinking window above taskbar");
                self.geometry.submit(GeometryCommand {
                    window: window.id,
                    handle,
                    size,
                    position,
                })
            }
            decision => {
                trace!(window = %window.id, ?decision, "Not adjusting window");
                false
            }
        }
    }

    /// A window moved or resized. The window is looked up again so a stale
    /// event for a closed window does nothing.
    pub fn on_window_geometry_event(&mut self, window: WindowId) -> bool {
        if !self.enabled {
            return false;
        }
        let Some(window) =
            self.context.windows.list_windows().into_iter().find(|w| w.id == window)
        else {
            trace!(%window, "Window is gone; skipping adjustment");
            return false;
        };
        self.adjust_if_needed(&window)
    }

    /// Applies new settings. Invalid settings are rejected and the current
    /// ones stay in effect.
    #[instrument(skip(self, settings))]
    pub fn on_settings_changed(&mut self, settings: TaskbarSettings) -> Result<(), ConfigError> {
        settings.validate()?;
        let height_changed = settings.height != self.settings.height;
        let wants_enabled = settings.enabled;
        self.settings = settings;

        match (self.enabled, wants_enabled) {
            (false, true) => self.enable(),
            (true, false) => self.disable(),
            (true, true) => {
                if height_changed {
                    debug!(height = self.settings.height, "Taskbar height changed");
                    self.sync_panels();
                    self.adjust_all_windows();
                }
                self.refresh_contents();
            }
            (false, false) => {}
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum Event {
    Enable,
    Disable,
    /// Displays were attached, detached or rearranged.
    TopologyChanged,
    AppearanceChanged,
    /// Window list or space visibility changed.
    RefreshContents,
    AdjustAllWindows,
    WindowGeometryChanged(WindowId),
    SettingsChanged(TaskbarSettings),
    QueryEnabled(SyncSender<bool>),
}

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

#[derive(Clone)]
pub struct TaskbarHandle {
    tx: Sender,
}

impl TaskbarHandle {
    pub fn new(tx: Sender) -> Self { Self { tx } }

    pub fn send(&self, event: Event) { self.tx.send(event) }

    /// Blocks until the actor answers. Must not be called from the actor's
    /// own thread.
    pub fn is_enabled(&self) -> Result<bool, RecvError> {
        let (tx, rx) = sync_channel(1);
        if self.tx.try_send(Event::QueryEnabled(tx)).is_err() {
            return Err(RecvError);
        }
        rx.recv()
    }
}

pub struct TaskbarActor {
    taskbar: Taskbar,
    rx: Receiver,
}

impl TaskbarActor {
    pub fn new(taskbar: Taskbar, rx: Receiver) -> Self { Self { taskbar, rx } }

    /// Processes events until every sender is dropped. The taskbar starts
    /// enabled when its settings say so.
    pub async fn run(mut self) {
        if self.taskbar.settings().enabled {
            self.taskbar.enable();
        }
        while let Some((span, event)) = self.rx.recv().await {
            let _enter = span.enter();
            self.handle_event(event);
        }
        debug!("Taskbar channel closed; shutting down");
        self.taskbar.disable();
    }

    fn handle_event(&mut self, event: Event) {
        trace!(?event, "Taskbar event");
        match event {
            Event::Enable => self.taskbar.enable(),
            Event::Disable => self.taskbar.disable(),
            Event::TopologyChanged => self.taskbar.on_topology_changed(),
            Event::AppearanceChanged => self.taskbar.on_appearance_changed(),
            Event::RefreshContents => self.taskbar.refresh_contents(),
            Event::AdjustAllWindows => {
                self.taskbar.adjust_all_windows();
            }
            Event::WindowGeometryChanged(wid) => {
                self.taskbar.on_window_geometry_event(wid);
            }
            Event::SettingsChanged(settings) => {
                if let Err(err) = self.taskbar.on_settings_changed(settings) {
                    warn!(%err, "Ignoring invalid taskbar settings");
                }
            }
            Event::QueryEnabled(resp) => {
                let _ = resp.send(self.taskbar.is_enabled());
            }
        }
    }
}
