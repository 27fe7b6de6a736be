//! An in-memory system: displays, spaces, windows, panel surfaces and
//! geometry handles all backed by one shared [`World`].
//!
//! Used by the `replay` command to drive the taskbar from a RON script, and
//! by tests as the fake for every external collaborator.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

use crate::common::collections::{BTreeMap, HashMap, HashSet};
use crate::common::config::TaskbarSettings;
use crate::model::panel_registry::{PanelFactory, PanelSurface};
use crate::sys::ax::{AxError, GeometryHandle};
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::screen::{Display, DisplaySource, DisplayUuid, SpaceId, SpaceSnapshot, SpaceSource};
use crate::sys::window_server::{Window, WindowFlags, WindowId, WindowSource};

fn yes() -> bool { true }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub id: WindowId,
    #[serde(default)]
    pub display: Option<DisplayUuid>,
    #[serde(default)]
    pub spaces: Vec<SpaceId>,
    #[serde(default)]
    pub minimized: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default)]
    pub windowless: bool,
    /// Window-space frame; `None` when the registry could not read it.
    #[serde(default)]
    pub frame: Option<Rect>,
    #[serde(default = "yes")]
    pub adjustable: bool,
    /// Makes every geometry write to this window fail.
    #[serde(default)]
    pub rejects_writes: bool,
}

impl WindowSpec {
    pub fn new(id: u32, display: &str, frame: Rect) -> Self {
        Self {
            id: WindowId::new(id),
            display: Some(display.into()),
            spaces: Vec::new(),
            minimized: false,
            hidden: false,
            fullscreen: false,
            windowless: false,
            frame: Some(frame),
            adjustable: true,
            rejects_writes: false,
        }
    }

    fn flags(&self) -> WindowFlags {
        let mut flags = WindowFlags::empty();
        flags.set(WindowFlags::MINIMIZED, self.minimized);
        flags.set(WindowFlags::HIDDEN, self.hidden);
        flags.set(WindowFlags::FULLSCREEN, self.fullscreen);
        flags.set(WindowFlags::WINDOWLESS, self.windowless);
        flags
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    #[serde(default)]
    pub displays: Vec<Display>,
    #[serde(default)]
    pub windows: Vec<WindowSpec>,
    #[serde(default)]
    pub spaces: BTreeMap<DisplayUuid, Vec<SpaceId>>,
    #[serde(default)]
    pub visible_spaces: Vec<SpaceId>,
}

impl World {
    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut WindowSpec> {
        self.windows.iter_mut().find(|w| w.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRecord {
    pub display: DisplayUuid,
    pub frame: Rect,
    pub visible: bool,
    pub contents: Vec<WindowId>,
    pub appearance_updates: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GeometryWrite {
    Size { window: WindowId, size: Size },
    Position { window: WindowId, position: Point },
}

#[derive(Default)]
struct State {
    world: World,
    /// Indexed by creation order; `None` once the surface is dropped.
    panels: Vec<Option<PanelRecord>>,
    writes: Vec<GeometryWrite>,
}

#[derive(Clone, Default)]
pub struct ScriptedSystem {
    state: Arc<Mutex<State>>,
}

impl ScriptedSystem {
    pub fn new(world: World) -> Self {
        Self {
            state: Arc::new(Mutex::new(State { world, ..Default::default() })),
        }
    }

    pub fn world(&self) -> World { self.state.lock().world.clone() }

    pub fn update_world<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.state.lock().world)
    }

    pub fn live_panels(&self) -> BTreeMap<DisplayUuid, PanelRecord> {
        self.state
            .lock()
            .panels
            .iter()
            .flatten()
            .map(|p| (p.display.clone(), p.clone()))
            .collect()
    }

    pub fn live_panel(&self, display: &DisplayUuid) -> Option<PanelRecord> {
        self.live_panels().remove(display)
    }

    pub fn live_panel_displays(&self) -> HashSet<DisplayUuid> {
        self.live_panels().into_keys().collect()
    }

    pub fn panels_created(&self) -> usize { self.state.lock().panels.len() }

    pub fn geometry_writes(&self) -> Vec<GeometryWrite> { self.state.lock().writes.clone() }
}

impl DisplaySource for ScriptedSystem {
    fn list_displays(&self) -> Vec<Display> { self.state.lock().world.displays.clone() }
}

impl SpaceSource for ScriptedSystem {
    fn space_snapshot(&self) -> SpaceSnapshot {
        let state = self.state.lock();
        let by_display: HashMap<DisplayUuid, HashSet<SpaceId>> = state
            .world
            .spaces
            .iter()
            .map(|(display, spaces)| (display.clone(), spaces.iter().copied().collect()))
            .collect();
        let visible = state.world.visible_spaces.iter().copied().collect();
        SpaceSnapshot::new(by_display, visible)
    }
}

impl WindowSource for ScriptedSystem {
    fn list_windows(&self) -> Vec<Window> {
        let state = self.state.lock();
        state
            .world
            .windows
            .iter()
            .map(|spec| Window {
                id: spec.id,
                display: spec.display.clone(),
                spaces: spec.spaces.clone(),
                flags: spec.flags(),
                position: spec.frame.map(|f| f.origin),
                size: spec.frame.map(|f| f.size),
                handle: spec.adjustable.then(|| {
                    Arc::new(ScriptedHandle {
                        window: spec.id,
                        state: self.state.clone(),
                    }) as Arc<dyn GeometryHandle>
                }),
            })
            .collect()
    }
}

impl PanelFactory for ScriptedSystem {
    fn create_panel(&mut self, display: &DisplayUuid) -> Box<dyn PanelSurface> {
        let mut state = self.state.lock();
        let slot = state.panels.len();
        state.panels.push(Some(PanelRecord {
            display: display.clone(),
            frame: Rect::default(),
            visible: false,
            contents: Vec::new(),
            appearance_updates: 0,
        }));
        Box::new(ScriptedPanel { slot, state: self.state.clone() })
    }
}

struct ScriptedPanel {
    slot: usize,
    state: Arc<Mutex<State>>,
}

impl ScriptedPanel {
    fn with_record(&self, f: impl FnOnce(&mut PanelRecord)) {
        if let Some(Some(record)) = self.state.lock().panels.get_mut(self.slot) {
            f(record);
        }
    }
}

impl PanelSurface for ScriptedPanel {
    fn set_frame(&mut self, frame: Rect) { self.with_record(|r| r.frame = frame) }

    fn show(&mut self) { self.with_record(|r| r.visible = true) }

    fn hide(&mut self) { self.with_record(|r| r.visible = false) }

    fn update_contents(&mut self, windows: &[&Window]) {
        let ids: Vec<WindowId> = windows.iter().map(|w| w.id).collect();
        self.with_record(|r| r.contents = ids)
    }

    fn update_appearance(&mut self) { self.with_record(|r| r.appearance_updates += 1) }
}

impl Drop for ScriptedPanel {
    fn drop(&mut self) {
        if let Some(slot) = self.state.lock().panels.get_mut(self.slot) {
            *slot = None;
        }
    }
}

struct ScriptedHandle {
    window: WindowId,
    state: Arc<Mutex<State>>,
}

impl ScriptedHandle {
    fn write(&self, write: GeometryWrite, f: impl FnOnce(&mut Rect)) -> Result<(), AxError> {
        let mut state = self.state.lock();
        let spec = state.world.window_mut(self.window).ok_or(AxError::InvalidElement)?;
        if spec.rejects_writes {
            return Err(AxError::Rejected(format!("window {} refused", self.window)));
        }
        let frame = spec.frame.get_or_insert_with(Rect::default);
        f(frame);
        trace!(?write, "Scripted geometry write");
        state.writes.push(write);
        Ok(())
    }
}

impl GeometryHandle for ScriptedHandle {
    fn set_size(&self, size: Size) -> Result<(), AxError> {
        self.write(GeometryWrite::Size { window: self.window, size }, |f| f.size = size)
    }

    fn set_position(&self, position: Point) -> Result<(), AxError> {
        self.write(
            GeometryWrite::Position { window: self.window, position },
            |f| f.origin = position,
        )
    }
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to parse script: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// A replayable sequence of system changes and taskbar triggers.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub settings: TaskbarSettings,
    #[serde(default)]
    pub world: World,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(buf: &str) -> Result<Script, ScriptError> { Ok(ron::from_str(buf)?) }
}

#[derive(Debug, Clone, Deserialize)]
pub enum Step {
    Enable,
    Disable,
    SetDisplays(Vec<Display>),
    SetWindows(Vec<WindowSpec>),
    SetSpaces {
        spaces: BTreeMap<DisplayUuid, Vec<SpaceId>>,
        visible: Vec<SpaceId>,
    },
    MoveWindow { id: WindowId, frame: Rect },
    CloseWindow(WindowId),
    Refresh,
    AppearanceChanged,
    AdjustAll,
    UpdateSettings(TaskbarSettings),
}
