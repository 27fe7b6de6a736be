use crossbeam_channel::Receiver;

use super::{Taskbar, TaskbarContext};
use crate::actor::geometry_worker::{self, GeometryCommand, GeometryWorker, QUEUE_CAPACITY};
use crate::common::config::TaskbarSettings;
use crate::sys::geometry::Rect;
use crate::sys::screen::{Display, DisplayUuid, SpaceId};
use crate::sys::scripted::{ScriptedSystem, WindowSpec, World};

pub fn display(uuid: &str, x: f64, is_primary: bool) -> Display {
    Display {
        uuid: uuid.into(),
        frame: Rect::from_xywh(x, 0.0, 1600.0, 1000.0),
        visible_frame: Rect::from_xywh(x, 0.0, 1600.0, 1000.0),
        is_primary,
    }
}

pub fn window(id: u32, display: &str, frame: Rect) -> WindowSpec {
    WindowSpec {
        spaces: vec![SpaceId::new(1)],
        ..WindowSpec::new(id, display, frame)
    }
}

/// Two side-by-side displays, "left" (primary) and "right", each showing
/// space 1 and 2 respectively.
pub fn two_display_world() -> World {
    World {
        displays: vec![display("left", 0.0, true), display("right", 1600.0, false)],
        windows: Vec::new(),
        spaces: [
            (DisplayUuid::from("left"), vec![SpaceId::new(1)]),
            (DisplayUuid::from("right"), vec![SpaceId::new(2)]),
        ]
        .into_iter()
        .collect(),
        visible_spaces: vec![SpaceId::new(1), SpaceId::new(2)],
    }
}

/// A taskbar wired to a scripted system. Geometry commands stay queued until
/// [`Harness::drain_geometry`] applies them.
pub struct Harness {
    pub system: ScriptedSystem,
    pub taskbar: Taskbar,
    geometry_rx: Receiver<GeometryCommand>,
}

impl Harness {
    pub fn new(world: World) -> Self { Self::with_settings(world, TaskbarSettings::default()) }

    pub fn with_settings(world: World, settings: TaskbarSettings) -> Self {
        let system = ScriptedSystem::new(world);
        let (queue, geometry_rx) = geometry_worker::queue(QUEUE_CAPACITY);
        let context = TaskbarContext {
            displays: Box::new(system.clone()),
            windows: Box::new(system.clone()),
            spaces: Box::new(system.clone()),
        };
        let taskbar = Taskbar::new(context, Box::new(system.clone()), settings, queue);
        Self { system, taskbar, geometry_rx }
    }

    pub fn into_parts(self) -> (ScriptedSystem, Taskbar, Receiver<GeometryCommand>) {
        (self.system, self.taskbar, self.geometry_rx)
    }

    pub fn queued_geometry(&self) -> usize { self.geometry_rx.len() }

    /// Applies every queued command the way the worker thread would.
    pub fn drain_geometry(&self) -> usize {
        let mut applied = 0;
        for cmd in self.geometry_rx.try_iter() {
            GeometryWorker::apply(&cmd);
            applied += 1;
        }
        applied
    }
}
