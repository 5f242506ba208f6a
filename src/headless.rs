//! In-memory window host, dock and surfaces.
//!
//! Behaves like a small window server: windows have frames, levels, alpha
//! and key status, tab groups keep their order and selection, animations stay
//! pending until [`HeadlessHost::finish_animations`] lands them. Used by the
//! test suite and by `quickterm replay`.

use crate::chrome::ChromeVariant;
use crate::dock::DockControl;
use crate::geometry::{Point, Rect, Screen};
use crate::host::{
    Alert, AnimationId, AnimationRequest, AppId, ConfirmPrompt, SpaceId, TabGroupInfo,
    WindowAppearance, WindowHost, WindowId, WindowLevel,
};
use crate::quick_terminal::{OverlayEvent, QuickTerminalManager};
use crate::scheduler::{Clock, ManualClock};
use crate::surface::{Surface, SurfaceFactory, SurfaceId, SurfaceRequest};
use parking_lot::Mutex;
use quickterm_config::SpaceBehavior;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::rc::Rc;

/// Process id the headless host reports for itself
pub const HEADLESS_APP: AppId = AppId(1);
/// Some other application that is frontmost at startup
pub const OTHER_APP: AppId = AppId(2);

/// Upper bound on `settle` rounds; a focus retry chain needs about a dozen
const MAX_SETTLE_ROUNDS: usize = 64;

/// State of one headless window
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWindow {
    pub id: WindowId,
    pub chrome: ChromeVariant,
    pub frame: Rect,
    pub alpha: f64,
    pub level: WindowLevel,
    pub ignores_mouse: bool,
    /// Ordered into the window list (may still be transparent)
    pub on_screen: bool,
    pub appearance: Option<WindowAppearance>,
    pub space_behavior: Option<SpaceBehavior>,
    pub space: SpaceId,
    pub fullscreen: bool,
    pub sheet_attached: bool,
}

impl HeadlessWindow {
    fn new(id: WindowId, chrome: ChromeVariant, space: SpaceId) -> Self {
        Self {
            id,
            chrome,
            frame: Rect::default(),
            alpha: 1.0,
            level: WindowLevel::Normal,
            ignores_mouse: false,
            on_screen: false,
            appearance: None,
            space_behavior: None,
            space,
            fullscreen: false,
            sheet_attached: false,
        }
    }

    /// On screen and not fully transparent
    pub fn is_shown(&self) -> bool {
        self.on_screen && self.alpha > 0.0
    }
}

#[derive(Debug, Clone, Default)]
struct HeadlessTabGroup {
    windows: Vec<WindowId>,
    selected: Option<WindowId>,
}

/// A started animation that has not landed yet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingAnimation {
    pub id: AnimationId,
    pub window: WindowId,
    pub request: AnimationRequest,
}

#[derive(Debug)]
pub struct HeadlessHost {
    screens: Vec<Screen>,
    main_screen: usize,
    mouse_screen: usize,
    menu_bar_screen: usize,
    windows: BTreeMap<WindowId, HeadlessWindow>,
    next_window: u64,
    key_window: Option<WindowId>,
    groups: Vec<HeadlessTabGroup>,
    /// When false, `tab_group` never returns a group object
    tab_group_objects: bool,
    /// When true, `add_tabbed_window` only queues the registration
    defer_tab_registration: bool,
    pending_tabs: Vec<(WindowId, WindowId)>,
    active_space: SpaceId,
    frontmost: Option<AppId>,
    app_active: bool,
    activation_failures: u32,
    activations: Vec<AppId>,
    confirm_responses: VecDeque<bool>,
    prompts: Vec<ConfirmPrompt>,
    alerts: Vec<Alert>,
    next_animation: u64,
    pending: Vec<PendingAnimation>,
    animations_started: usize,
}

impl HeadlessHost {
    /// Host with the given displays; the first is main, mouse and menu-bar
    /// screen. Another application starts frontmost.
    pub fn new(screens: Vec<Screen>) -> Self {
        Self {
            screens,
            main_screen: 0,
            mouse_screen: 0,
            menu_bar_screen: 0,
            windows: BTreeMap::new(),
            next_window: 0,
            key_window: None,
            groups: Vec::new(),
            tab_group_objects: true,
            defer_tab_registration: false,
            pending_tabs: Vec::new(),
            active_space: SpaceId(1),
            frontmost: Some(OTHER_APP),
            app_active: false,
            activation_failures: 0,
            activations: Vec::new(),
            confirm_responses: VecDeque::new(),
            prompts: Vec::new(),
            alerts: Vec::new(),
            next_animation: 0,
            pending: Vec::new(),
            animations_started: 0,
        }
    }

    // ── Scenario setup ──────────────────────────────────────────────────

    pub fn set_screens(&mut self, screens: Vec<Screen>) {
        self.screens = screens;
        let last = self.screens.len().saturating_sub(1);
        self.main_screen = self.main_screen.min(last);
        self.mouse_screen = self.mouse_screen.min(last);
        self.menu_bar_screen = self.menu_bar_screen.min(last);
    }

    pub fn set_main_screen(&mut self, index: usize) {
        self.main_screen = index;
    }

    pub fn set_mouse_screen(&mut self, index: usize) {
        self.mouse_screen = index;
    }

    pub fn set_tab_group_objects(&mut self, enabled: bool) {
        self.tab_group_objects = enabled;
    }

    pub fn set_defer_tab_registration(&mut self, deferred: bool) {
        self.defer_tab_registration = deferred;
    }

    /// Apply every queued `add_tabbed_window`
    pub fn register_pending_tabs(&mut self) {
        for (parent, child) in std::mem::take(&mut self.pending_tabs) {
            self.attach_tab(parent, child);
        }
    }

    /// The next `count` activations of this app silently do nothing
    pub fn fail_next_activations(&mut self, count: u32) {
        self.activation_failures = count;
    }

    /// Answers for upcoming confirmations; once empty, prompts are accepted
    pub fn queue_confirm_response(&mut self, proceed: bool) {
        self.confirm_responses.push_back(proceed);
    }

    /// User switched to another application
    pub fn focus_other_app(&mut self, app: AppId) {
        self.frontmost = Some(app);
        self.app_active = false;
    }

    /// User clicked `window` (or it was made key by something else in-app)
    pub fn focus_window(&mut self, window: WindowId) {
        if self.windows.contains_key(&window) {
            self.key_window = Some(window);
            self.app_active = true;
            self.frontmost = Some(HEADLESS_APP);
        }
    }

    /// Simulate an unrelated in-app window taking key status
    pub fn clear_key_window(&mut self) {
        self.key_window = None;
    }

    pub fn switch_space(&mut self, space: SpaceId) {
        self.active_space = space;
    }

    pub fn set_fullscreen(&mut self, window: WindowId, fullscreen: bool) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.fullscreen = fullscreen;
        }
    }

    pub fn set_sheet_attached(&mut self, window: WindowId, attached: bool) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.sheet_attached = attached;
        }
    }

    // ── Animations ──────────────────────────────────────────────────────

    /// Land every pending animation and return their ids in start order
    pub fn finish_animations(&mut self) -> Vec<AnimationId> {
        let pending = std::mem::take(&mut self.pending);
        pending
            .into_iter()
            .map(|anim| {
                if let Some(w) = self.windows.get_mut(&anim.window) {
                    w.frame = anim.request.frame;
                    w.alpha = anim.request.alpha;
                }
                anim.id
            })
            .collect()
    }

    pub fn pending_animations(&self) -> &[PendingAnimation] {
        &self.pending
    }

    /// Animations started since creation
    pub fn animations_started(&self) -> usize {
        self.animations_started
    }

    // ── Inspection ──────────────────────────────────────────────────────

    pub fn window(&self, window: WindowId) -> Option<&HeadlessWindow> {
        self.windows.get(&window)
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    pub fn prompts(&self) -> &[ConfirmPrompt] {
        &self.prompts
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn activations(&self) -> &[AppId] {
        &self.activations
    }

    fn group_index(&self, window: WindowId) -> Option<usize> {
        self.groups.iter().position(|g| g.windows.contains(&window))
    }

    fn detach_tab(&mut self, window: WindowId) {
        let Some(index) = self.group_index(window) else {
            return;
        };
        let group = &mut self.groups[index];
        let Some(pos) = group.windows.iter().position(|w| *w == window) else {
            return;
        };
        group.windows.remove(pos);
        if group.selected == Some(window) {
            let next = pos.min(group.windows.len().saturating_sub(1));
            group.selected = group.windows.get(next).copied();
        }
        if group.windows.is_empty() {
            self.groups.remove(index);
        }
    }

    fn attach_tab(&mut self, parent: WindowId, child: WindowId) {
        if !self.windows.contains_key(&parent) || !self.windows.contains_key(&child) {
            return;
        }
        self.detach_tab(child);
        let index = match self.group_index(parent) {
            Some(index) => index,
            None => {
                self.groups.push(HeadlessTabGroup {
                    windows: vec![parent],
                    selected: Some(parent),
                });
                self.groups.len() - 1
            }
        };
        let group = &mut self.groups[index];
        let pos = group
            .windows
            .iter()
            .position(|w| *w == parent)
            .map_or(group.windows.len(), |p| p + 1);
        group.windows.insert(pos, child);
    }

    fn screen_containing(&self, frame: &Rect) -> Option<Screen> {
        let center = Point::new(
            frame.min_x() + frame.width() / 2.0,
            frame.min_y() + frame.height() / 2.0,
        );
        self.screens
            .iter()
            .find(|s| {
                center.x >= s.frame.min_x()
                    && center.x < s.frame.max_x()
                    && center.y >= s.frame.min_y()
                    && center.y < s.frame.max_y()
            })
            .or_else(|| self.screens.iter().find(|s| s.frame.intersects(frame)))
            .cloned()
    }
}

impl WindowHost for HeadlessHost {
    fn main_screen(&self) -> Option<Screen> {
        self.screens.get(self.main_screen).cloned()
    }

    fn screen_with_mouse(&self) -> Option<Screen> {
        self.screens.get(self.mouse_screen).cloned()
    }

    fn menu_bar_screen(&self) -> Option<Screen> {
        self.screens.get(self.menu_bar_screen).cloned()
    }

    fn screen_of(&self, window: WindowId) -> Option<Screen> {
        let frame = self.windows.get(&window)?.frame;
        self.screen_containing(&frame)
    }

    fn screens(&self) -> Vec<Screen> {
        self.screens.clone()
    }

    fn create_window(&mut self, chrome: ChromeVariant) -> Option<WindowId> {
        self.next_window += 1;
        let id = WindowId(self.next_window);
        self.windows
            .insert(id, HeadlessWindow::new(id, chrome, self.active_space));
        Some(id)
    }

    fn rebuild_window(&mut self, window: WindowId, chrome: ChromeVariant) -> Option<WindowId> {
        let old = self.windows.remove(&window)?;
        self.next_window += 1;
        let id = WindowId(self.next_window);
        self.windows.insert(
            id,
            HeadlessWindow {
                id,
                chrome,
                ..old
            },
        );

        for group in &mut self.groups {
            for w in group.windows.iter_mut().filter(|w| **w == window) {
                *w = id;
            }
            if group.selected == Some(window) {
                group.selected = Some(id);
            }
        }
        if self.key_window == Some(window) {
            self.key_window = Some(id);
        }
        self.pending.retain(|anim| anim.window != window);
        Some(id)
    }

    fn close_window(&mut self, window: WindowId) {
        if self.windows.remove(&window).is_none() {
            return;
        }
        self.detach_tab(window);
        self.pending_tabs
            .retain(|(parent, child)| *parent != window && *child != window);
        self.pending.retain(|anim| anim.window != window);
        if self.key_window == Some(window) {
            self.key_window = None;
        }
    }

    fn frame(&self, window: WindowId) -> Option<Rect> {
        self.windows.get(&window).map(|w| w.frame)
    }

    fn set_frame(&mut self, window: WindowId, frame: Rect) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.frame = frame;
        }
    }

    fn set_frame_origin(&mut self, window: WindowId, origin: Point) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.frame = w.frame.with_origin(origin);
        }
    }

    fn level(&self, window: WindowId) -> Option<WindowLevel> {
        self.windows.get(&window).map(|w| w.level)
    }

    fn set_level(&mut self, window: WindowId, level: WindowLevel) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.level = level;
        }
    }

    fn set_alpha(&mut self, window: WindowId, alpha: f64) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.alpha = alpha;
        }
    }

    fn set_ignores_mouse_events(&mut self, window: WindowId, ignore: bool) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.ignores_mouse = ignore;
        }
    }

    fn set_appearance(&mut self, window: WindowId, appearance: WindowAppearance) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.appearance = Some(appearance);
        }
    }

    fn set_space_behavior(&mut self, window: WindowId, behavior: SpaceBehavior) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.space_behavior = Some(behavior);
        }
    }

    fn make_key_and_order_front(&mut self, window: WindowId) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.on_screen = true;
            self.key_window = Some(window);
        }
    }

    fn order_out(&mut self, window: WindowId) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.on_screen = false;
            if self.key_window == Some(window) {
                self.key_window = None;
            }
        }
    }

    fn is_key(&self, window: WindowId) -> bool {
        self.app_active && self.key_window == Some(window)
    }

    fn key_window(&self) -> Option<WindowId> {
        if self.app_active { self.key_window } else { None }
    }

    fn has_attached_sheet(&self, window: WindowId) -> bool {
        self.windows.get(&window).is_some_and(|w| w.sheet_attached)
    }

    fn is_fullscreen(&self, window: WindowId) -> bool {
        self.windows.get(&window).is_some_and(|w| w.fullscreen)
    }

    fn exit_fullscreen(&mut self, window: WindowId) {
        self.set_fullscreen(window, false);
    }

    fn animate(&mut self, window: WindowId, request: AnimationRequest) -> AnimationId {
        self.next_animation += 1;
        let id = AnimationId(self.next_animation);
        self.animations_started += 1;
        self.pending.push(PendingAnimation {
            id,
            window,
            request,
        });
        id
    }

    fn tab_group(&self, window: WindowId) -> Option<TabGroupInfo> {
        if !self.tab_group_objects || !self.windows.contains_key(&window) {
            return None;
        }
        // Every window owns a group object, untabbed ones a group of one
        match self.group_index(window) {
            Some(index) => Some(TabGroupInfo {
                windows: self.groups[index].windows.clone(),
                selected: self.groups[index].selected,
            }),
            None => Some(TabGroupInfo {
                windows: vec![window],
                selected: Some(window),
            }),
        }
    }

    fn tabbed_windows(&self, window: WindowId) -> Option<Vec<WindowId>> {
        let index = self.group_index(window)?;
        Some(self.groups[index].windows.clone())
    }

    fn add_tabbed_window(&mut self, parent: WindowId, child: WindowId) {
        if self.defer_tab_registration {
            self.pending_tabs.push((parent, child));
        } else {
            self.attach_tab(parent, child);
        }
    }

    fn select_tab(&mut self, window: WindowId) {
        if let Some(index) = self.group_index(window) {
            self.groups[index].selected = Some(window);
        }
    }

    fn active_space(&self) -> SpaceId {
        self.active_space
    }

    fn move_to_active_space(&mut self, window: WindowId) {
        let space = self.active_space;
        if let Some(w) = self.windows.get_mut(&window) {
            w.space = space;
        }
    }

    fn current_app(&self) -> AppId {
        HEADLESS_APP
    }

    fn frontmost_app(&self) -> Option<AppId> {
        self.frontmost
    }

    fn is_app_active(&self) -> bool {
        self.app_active
    }

    fn activate_app(&mut self, app: AppId) {
        self.activations.push(app);
        if app == HEADLESS_APP {
            if self.activation_failures > 0 {
                self.activation_failures -= 1;
                return;
            }
            self.app_active = true;
        } else {
            self.app_active = false;
        }
        self.frontmost = Some(app);
    }

    fn confirm(&mut self, prompt: &ConfirmPrompt) -> bool {
        self.prompts.push(prompt.clone());
        self.confirm_responses.pop_front().unwrap_or(true)
    }

    fn alert(&mut self, alert: &Alert) {
        self.alerts.push(alert.clone());
    }
}

/// Run a headless manager until it is idle: land every pending animation,
/// then jump the clock to the next timer and run it. Returns the number of
/// rounds that did work.
pub fn settle(manager: &mut QuickTerminalManager<HeadlessHost>, clock: &ManualClock) -> usize {
    let mut rounds = 0;
    while rounds < MAX_SETTLE_ROUNDS {
        let landed = manager.host_mut().finish_animations();
        let animated = !landed.is_empty();
        for animation in landed {
            manager.dispatch(OverlayEvent::AnimationFinished(animation));
        }

        let mut ran = 0;
        if let Some(deadline) = manager.next_deadline() {
            let now = clock.now();
            if deadline > now {
                clock.advance(deadline - now);
            }
            ran = manager.run_due_timers();
        }

        if !animated && ran == 0 {
            break;
        }
        rounds += 1;
    }
    if rounds == MAX_SETTLE_ROUNDS {
        log::warn!("settle: still busy after {rounds} rounds");
    }
    rounds
}

// ── Dock ────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct DockState {
    autohide: bool,
    presentation_holds: usize,
}

/// Dock whose preference and presentation holds live in memory
#[derive(Debug)]
pub struct HeadlessDock {
    state: Mutex<DockState>,
}

impl HeadlessDock {
    pub fn new(autohide: bool) -> Self {
        Self {
            state: Mutex::new(DockState {
                autohide,
                presentation_holds: 0,
            }),
        }
    }

    /// Number of presentation options currently held
    pub fn presentation_holds(&self) -> usize {
        self.state.lock().presentation_holds
    }
}

impl DockControl for HeadlessDock {
    fn autohide(&self) -> bool {
        self.state.lock().autohide
    }

    fn set_autohide(&self, autohide: bool) {
        self.state.lock().autohide = autohide;
    }

    fn acquire_presentation(&self) {
        self.state.lock().presentation_holds += 1;
    }

    fn release_presentation(&self) {
        let mut state = self.state.lock();
        state.presentation_holds = state.presentation_holds.saturating_sub(1);
    }
}

// ── Surfaces ────────────────────────────────────────────────────────────

/// Surface with settable process state
#[derive(Debug)]
pub struct HeadlessSurface {
    id: SurfaceId,
    command: Option<String>,
    exited: Cell<bool>,
    needs_confirm: Cell<bool>,
    focused: Cell<bool>,
    focus_grants: Cell<u32>,
}

impl HeadlessSurface {
    fn new(id: SurfaceId, command: Option<String>) -> Self {
        Self {
            id,
            command,
            exited: Cell::new(false),
            needs_confirm: Cell::new(false),
            focused: Cell::new(false),
            focus_grants: Cell::new(0),
        }
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn set_exited(&self, exited: bool) {
        self.exited.set(exited);
    }

    pub fn set_needs_confirm(&self, needs: bool) {
        self.needs_confirm.set(needs);
    }

    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }

    /// Times keyboard focus was granted
    pub fn focus_grants(&self) -> u32 {
        self.focus_grants.get()
    }
}

impl Surface for HeadlessSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn process_exited(&self) -> bool {
        self.exited.get()
    }

    fn needs_confirm_quit(&self) -> bool {
        self.needs_confirm.get() && !self.exited.get()
    }

    fn focus_changed(&self, focused: bool) {
        self.focused.set(focused);
    }

    fn grant_focus(&self) {
        self.focus_grants.set(self.focus_grants.get() + 1);
        self.focused.set(true);
    }
}

#[derive(Debug, Default)]
struct SurfaceRegistry {
    surfaces: HashMap<SurfaceId, Rc<HeadlessSurface>>,
    order: Vec<SurfaceId>,
    dead: HashSet<SurfaceId>,
}

/// Factory handing out [`HeadlessSurface`]s; clones share one registry so a
/// test can keep a handle after giving the factory to the manager
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurfaceFactory {
    registry: Rc<RefCell<SurfaceRegistry>>,
}

impl HeadlessSurfaceFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SurfaceId) -> Option<Rc<HeadlessSurface>> {
        self.registry.borrow().surfaces.get(&id).cloned()
    }

    /// Surfaces in creation order
    pub fn surfaces(&self) -> Vec<Rc<HeadlessSurface>> {
        let registry = self.registry.borrow();
        registry
            .order
            .iter()
            .filter_map(|id| registry.surfaces.get(id).cloned())
            .collect()
    }

    pub fn created(&self) -> usize {
        self.registry.borrow().order.len()
    }

    /// Make `id` impossible to restore
    pub fn forget(&self, id: SurfaceId) {
        let mut registry = self.registry.borrow_mut();
        registry.surfaces.remove(&id);
        registry.dead.insert(id);
    }

    fn register(&self, surface: HeadlessSurface) -> Rc<HeadlessSurface> {
        let surface = Rc::new(surface);
        let mut registry = self.registry.borrow_mut();
        registry.order.push(surface.id);
        registry.surfaces.insert(surface.id, Rc::clone(&surface));
        surface
    }
}

impl SurfaceFactory for HeadlessSurfaceFactory {
    fn create(&mut self, request: &SurfaceRequest) -> Rc<dyn Surface> {
        self.register(HeadlessSurface::new(SurfaceId::new(), request.command.clone()))
    }

    fn restore(&mut self, id: SurfaceId) -> Option<Rc<dyn Surface>> {
        if self.registry.borrow().dead.contains(&id) {
            return None;
        }
        if let Some(existing) = self.get(id) {
            return Some(existing);
        }
        Some(self.register(HeadlessSurface::new(id, None)))
    }
}
