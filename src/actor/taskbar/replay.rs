//! Drives a [`Taskbar`] through a [`Script`] against a [`ScriptedSystem`] and
//! reports where panels and windows ended up.

use std::io;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info_span};

use super::{Taskbar, TaskbarContext};
use crate::actor::geometry_worker::{self, GeometryWorker, QUEUE_CAPACITY};
use crate::common::collections::BTreeMap;
use crate::common::config::ConfigError;
use crate::sys::geometry::Rect;
use crate::sys::screen::DisplayUuid;
use crate::sys::scripted::{PanelRecord, Script, ScriptedSystem, Step};
use crate::sys::window_server::WindowId;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("invalid settings: {0}")]
    Settings(#[from] ConfigError),
    #[error("failed to start geometry worker: {0}")]
    Worker(#[source] io::Error),
    #[error("geometry worker panicked")]
    WorkerPanicked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub enabled: bool,
    /// Panels alive after the last step.
    pub panels: BTreeMap<DisplayUuid, PanelRecord>,
    /// Window-space frames once every queued geometry write has landed.
    pub windows: BTreeMap<WindowId, Option<Rect>>,
}

pub fn replay(script: Script) -> Result<Report, ReplayError> {
    script.settings.validate()?;

    let system = ScriptedSystem::new(script.world);
    let (queue, rx) = geometry_worker::queue(QUEUE_CAPACITY);
    let worker = GeometryWorker::spawn(rx).map_err(ReplayError::Worker)?;
    let context = TaskbarContext {
        displays: Box::new(system.clone()),
        windows: Box::new(system.clone()),
        spaces: Box::new(system.clone()),
    };
    let mut taskbar = Taskbar::new(context, Box::new(system.clone()), script.settings, queue);

    let result = script.steps.into_iter().enumerate().try_for_each(|(idx, step)| {
        let _span = info_span!("replay", step = idx).entered();
        debug!(?step, "Applying step");
        apply_step(&mut taskbar, &system, step)
    });

    let enabled = taskbar.is_enabled();
    // Panel surfaces are released together with the taskbar.
    let panels = system.live_panels();
    // The taskbar holds the last queue sender; the worker drains and exits.
    drop(taskbar);
    if worker.join().is_err() {
        return Err(ReplayError::WorkerPanicked);
    }
    result?;

    Ok(Report {
        enabled,
        panels,
        windows: system.world().windows.iter().map(|w| (w.id, w.frame)).collect(),
    })
}

fn apply_step(
    taskbar: &mut Taskbar,
    system: &ScriptedSystem,
    step: Step,
) -> Result<(), ReplayError> {
    match step {
        Step::Enable => taskbar.enable(),
        Step::Disable => taskbar.disable(),
        Step::SetDisplays(displays) => {
            system.update_world(|w| w.displays = displays);
            taskbar.on_topology_changed();
        }
        Step::SetWindows(windows) => {
            system.update_world(|w| w.windows = windows);
            taskbar.refresh_contents();
        }
        Step::SetSpaces { spaces, visible } => {
            system.update_world(|w| {
                w.spaces = spaces;
                w.visible_spaces = visible;
            });
            taskbar.refresh_contents();
        }
        Step::MoveWindow { id, frame } => {
            let known = system.update_world(|w| match w.window_mut(id) {
                Some(spec) => {
                    spec.frame = Some(frame);
                    true
                }
                None => false,
            });
            if known {
                taskbar.on_window_geometry_event(id);
            }
        }
        Step::CloseWindow(id) => {
            system.update_world(|w| w.windows.retain(|spec| spec.id != id));
            taskbar.refresh_contents();
        }
        Step::Refresh => taskbar.refresh_contents(),
        Step::AppearanceChanged => taskbar.on_appearance_changed(),
        Step::AdjustAll => {
            taskbar.adjust_all_windows();
        }
        Step::UpdateSettings(settings) => taskbar.on_settings_changed(settings)?,
    }
    Ok(())
}
