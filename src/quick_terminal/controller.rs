//! Per-window controller state and the registry that owns it.

use crate::dock::DockSuppressor;
use crate::host::{AppId, SpaceId, WindowId};
use crate::surface::{SplitTree, SplitTreeSnapshot, SurfaceRequest};
use quickterm_config::QuickTerminalPosition;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Instant;

/// Identity of one overlay controller (one per window, one per tab)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(pub u64);

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "qt-{}", self.0)
    }
}

/// State of one overlay window.
///
/// `visible` is the logical flag: it flips when a show or hide starts, while
/// the window itself converges when the animation lands. All controllers in
/// one tab group carry the same `visible`, `previous_app` and
/// `previous_space`.
#[derive(Debug)]
pub struct Controller {
    pub(crate) id: ControllerId,
    pub(crate) window: WindowId,
    pub(crate) visible: bool,
    pub(crate) position: QuickTerminalPosition,
    /// Foreign app that was frontmost before the overlay took focus
    pub(crate) previous_app: Option<AppId>,
    pub(crate) previous_space: Option<SpaceId>,
    /// At most one per tab group
    pub(crate) hidden_dock: Option<DockSuppressor>,
    /// Focus loss before this instant does not auto-hide
    pub(crate) suppress_auto_hide_until: Option<Instant>,
    /// False for one-shot command overlays, which are never persisted
    pub(crate) restorable: bool,
    pub(crate) tree: SplitTree,
    /// What a freshly materialized surface runs
    pub(crate) request: SurfaceRequest,
    /// Restored layout waiting for the first show
    pub(crate) pending_snapshot: Option<SplitTreeSnapshot>,
}

impl Controller {
    pub(crate) fn new(
        id: ControllerId,
        window: WindowId,
        position: QuickTerminalPosition,
        request: SurfaceRequest,
        restorable: bool,
    ) -> Self {
        Self {
            id,
            window,
            visible: false,
            position,
            previous_app: None,
            previous_space: None,
            hidden_dock: None,
            suppress_auto_hide_until: None,
            restorable,
            tree: SplitTree::new(),
            request,
            pending_snapshot: None,
        }
    }

    pub fn id(&self) -> ControllerId {
        self.id
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn position(&self) -> QuickTerminalPosition {
        self.position
    }

    pub fn previous_app(&self) -> Option<AppId> {
        self.previous_app
    }

    pub fn previous_space(&self) -> Option<SpaceId> {
        self.previous_space
    }

    /// Holds the group's live dock suppressor
    pub fn holds_dock_suppressor(&self) -> bool {
        self.hidden_dock.is_some()
    }

    pub fn is_restorable(&self) -> bool {
        self.restorable
    }

    pub fn tree(&self) -> &SplitTree {
        &self.tree
    }
}

/// Owns every controller, indexed by id and by window.
///
/// `last_active` is a plain id, validated on read, so removing a controller
/// can never leave a dangling reference behind.
#[derive(Debug, Default)]
pub(crate) struct ControllerRegistry {
    controllers: BTreeMap<ControllerId, Controller>,
    by_window: HashMap<WindowId, ControllerId>,
    last_active: Option<ControllerId>,
    next_id: u64,
}

impl ControllerRegistry {
    pub(crate) fn next_id(&mut self) -> ControllerId {
        self.next_id += 1;
        ControllerId(self.next_id)
    }

    pub(crate) fn insert(&mut self, controller: Controller) {
        self.by_window.insert(controller.window, controller.id);
        self.controllers.insert(controller.id, controller);
    }

    pub(crate) fn remove(&mut self, id: ControllerId) -> Option<Controller> {
        let controller = self.controllers.remove(&id)?;
        self.by_window.remove(&controller.window);
        if self.last_active == Some(id) {
            self.last_active = None;
        }
        Some(controller)
    }

    pub(crate) fn get(&self, id: ControllerId) -> Option<&Controller> {
        self.controllers.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ControllerId) -> Option<&mut Controller> {
        self.controllers.get_mut(&id)
    }

    pub(crate) fn by_window(&self, window: WindowId) -> Option<ControllerId> {
        self.by_window.get(&window).copied()
    }

    pub(crate) fn window_of(&self, id: ControllerId) -> Option<WindowId> {
        self.controllers.get(&id).map(|c| c.window)
    }

    /// Point a controller at a rebuilt window
    pub(crate) fn reindex(&mut self, id: ControllerId, window: WindowId) {
        let Some(controller) = self.controllers.get_mut(&id) else {
            return;
        };
        self.by_window.remove(&controller.window);
        controller.window = window;
        self.by_window.insert(window, id);
    }

    pub(crate) fn ids(&self) -> Vec<ControllerId> {
        self.controllers.keys().copied().collect()
    }

    pub(crate) fn first(&self) -> Option<ControllerId> {
        self.controllers.keys().next().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.controllers.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Controller> {
        self.controllers.values()
    }

    pub(crate) fn last_active(&self) -> Option<ControllerId> {
        self.last_active.filter(|id| self.controllers.contains_key(id))
    }

    /// Record `id` as most recently active; `None` or an unknown id clears
    pub(crate) fn set_last_active(&mut self, id: Option<ControllerId>) {
        self.last_active = id.filter(|id| self.controllers.contains_key(id));
    }
}
