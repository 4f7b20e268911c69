//! In-memory window system, displays, split view and launcher for tests.
//!
//! Animated property changes jump straight to their target and mark the window as
//! animating, so tests can check both the final value and whether it was animated.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::time::Duration;

use glam::IVec2;

use crate::animation::{AnimationSettings, Clock};
use crate::display::Displays;
use crate::home_launcher::HomeLauncherPresenter;
use crate::overview::Options;
use crate::services::Services;
use crate::split_view::{SnapPosition, SplitState, SplitView, SplitViewObserver};
use crate::utils::{Rect, Transform};
use crate::window::{OverlayKind, RootId, WindowId, WindowStateType, WindowSystem, WindowType};

#[derive(Debug, Clone)]
pub struct TestWindow {
    pub root: RootId,
    pub title: String,
    pub window_type: WindowType,
    pub state_type: WindowStateType,
    pub always_on_top: bool,
    pub transient_parent: Option<WindowId>,
    pub bounds: Rect,
    pub transform: Transform,
    pub opacity: f32,
    pub visible: bool,
    pub animating: bool,
    pub overlay: Option<OverlayKind>,
}

impl TestWindow {
    fn new(root: RootId, bounds: Rect) -> Self {
        Self {
            root,
            title: String::new(),
            window_type: WindowType::Normal,
            state_type: WindowStateType::Normal,
            always_on_top: false,
            transient_parent: None,
            bounds,
            transform: Transform::IDENTITY,
            opacity: 1.,
            visible: true,
            animating: false,
            overlay: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TestDisplay {
    root: RootId,
    bounds: Rect,
    work_area: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresenterUpdate {
    pub y: i32,
    pub opacity: f32,
    pub animated: bool,
}

#[derive(Default)]
struct State {
    next_id: u64,
    windows: HashMap<WindowId, TestWindow>,
    mru: Vec<WindowId>,
    displays: Vec<TestDisplay>,
    backdrops: HashMap<RootId, WindowId>,

    split_state: SplitState,
    left: Option<WindowId>,
    right: Option<WindowId>,
    default_snap_position: Option<SnapPosition>,
    divider: Option<WindowId>,
    observers: Vec<Weak<dyn SplitViewObserver>>,
    split_view_ended: bool,

    launcher_disabled: bool,
    presenter_updates: Vec<PresenterUpdate>,

    minimized: Vec<WindowId>,
    closed: Vec<WindowId>,
    destroyed_overlays: Vec<WindowId>,
}

pub struct TestShell {
    state: RefCell<State>,
    clock: Clock,
    /// Called after an overlay is destroyed, with the state borrow released.
    overlay_destroyed: RefCell<Option<Box<dyn Fn(WindowId)>>>,
}

pub const DISPLAY_BOUNDS: Rect = Rect::new(0, 0, 1000, 850);
pub const WORK_AREA: Rect = Rect::new(0, 0, 1000, 800);

impl TestShell {
    /// One 1000x850 display with a 50 px shelf at the bottom.
    pub fn new() -> Rc<Self> {
        let shell = Rc::new(Self {
            state: RefCell::new(State::default()),
            clock: Clock::with_time(Duration::ZERO),
            overlay_destroyed: RefCell::new(None),
        });
        shell.add_display(DISPLAY_BOUNDS, WORK_AREA);
        shell
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn on_overlay_destroyed(&self, f: impl Fn(WindowId) + 'static) {
        *self.overlay_destroyed.borrow_mut() = Some(Box::new(f));
    }

    pub fn services(self: &Rc<Self>) -> Services {
        self.services_with_options(Options::default())
    }

    pub fn services_with_options(self: &Rc<Self>, options: Options) -> Services {
        Services {
            windows: self.clone(),
            displays: self.clone(),
            split_view: self.clone(),
            clock: self.clock.clone(),
            options: Rc::new(options),
        }
    }

    pub fn add_display(&self, bounds: Rect, work_area: Rect) -> RootId {
        let mut state = self.state.borrow_mut();
        let root = RootId(state.displays.len() as u32);
        state.displays.push(TestDisplay {
            root,
            bounds,
            work_area,
        });
        root
    }

    fn next_id(state: &mut State) -> WindowId {
        state.next_id += 1;
        WindowId(state.next_id)
    }

    /// Adds a window on the primary display. It becomes the most recently used one.
    pub fn add_window(&self, bounds: Rect) -> WindowId {
        self.add_window_on(RootId(0), bounds)
    }

    pub fn add_window_on(&self, root: RootId, bounds: Rect) -> WindowId {
        let mut state = self.state.borrow_mut();
        let id = Self::next_id(&mut state);
        state.windows.insert(id, TestWindow::new(root, bounds));
        state.mru.insert(0, id);
        id
    }

    /// Adds a transient child of `parent`, which is not part of the MRU list.
    pub fn add_transient(&self, parent: WindowId, bounds: Rect) -> WindowId {
        let mut state = self.state.borrow_mut();
        let root = state.windows.get(&parent).map_or(RootId(0), |w| w.root);
        let id = Self::next_id(&mut state);
        let mut window = TestWindow::new(root, bounds);
        window.transient_parent = Some(parent);
        state.windows.insert(id, window);
        id
    }

    pub fn add_backdrop(&self, root: RootId) -> WindowId {
        let bounds = self.root_bounds(root);
        let mut state = self.state.borrow_mut();
        let id = Self::next_id(&mut state);
        state.windows.insert(id, TestWindow::new(root, bounds));
        state.backdrops.insert(root, id);
        id
    }

    pub fn add_divider(&self, bounds: Rect) -> WindowId {
        let mut state = self.state.borrow_mut();
        let id = Self::next_id(&mut state);
        state.windows.insert(id, TestWindow::new(RootId(0), bounds));
        state.divider = Some(id);
        id
    }

    pub fn update(&self, window: WindowId, f: impl FnOnce(&mut TestWindow)) {
        if let Some(window) = self.state.borrow_mut().windows.get_mut(&window) {
            f(window);
        }
    }

    pub fn set_title(&self, window: WindowId, title: &str) {
        self.update(window, |w| w.title = title.to_owned());
    }

    pub fn set_state_type(&self, window: WindowId, state_type: WindowStateType) {
        self.update(window, |w| {
            w.state_type = state_type;
            if state_type == WindowStateType::Minimized {
                w.visible = false;
            }
        });
    }

    pub fn window(&self, window: WindowId) -> Option<TestWindow> {
        self.state.borrow().windows.get(&window).cloned()
    }

    /// Removes the window. The caller delivers the destruction notification.
    pub fn destroy(&self, window: WindowId) {
        let mut state = self.state.borrow_mut();
        state.windows.remove(&window);
        state.mru.retain(|&w| w != window);
    }

    /// Live overlays of `kind`.
    pub fn overlays(&self, kind: OverlayKind) -> Vec<WindowId> {
        let state = self.state.borrow();
        let mut overlays: Vec<_> = state
            .windows
            .iter()
            .filter(|(_, w)| w.overlay == Some(kind))
            .map(|(&id, _)| id)
            .collect();
        overlays.sort();
        overlays
    }

    /// Changes the split view state and notifies the live observers.
    pub fn set_split_view(
        &self,
        split_state: SplitState,
        left: Option<WindowId>,
        right: Option<WindowId>,
    ) {
        let (previous, observers) = {
            let mut state = self.state.borrow_mut();
            let previous = state.split_state;
            state.split_state = split_state;
            state.left = left;
            state.right = right;
            state.observers.retain(|observer| observer.strong_count() > 0);
            let observers: Vec<_> = state.observers.iter().filter_map(Weak::upgrade).collect();
            (previous, observers)
        };
        for observer in observers {
            observer.on_split_view_state_changed(previous, split_state);
        }
    }

    pub fn set_default_snap_position(&self, position: SnapPosition) {
        self.state.borrow_mut().default_snap_position = Some(position);
    }

    pub fn split_view_ended(&self) -> bool {
        self.state.borrow().split_view_ended
    }

    pub fn set_launcher_enabled(&self, enabled: bool) {
        self.state.borrow_mut().launcher_disabled = !enabled;
    }

    pub fn presenter_updates(&self) -> Vec<PresenterUpdate> {
        self.state.borrow().presenter_updates.clone()
    }

    pub fn last_presenter_update(&self) -> Option<PresenterUpdate> {
        self.state.borrow().presenter_updates.last().copied()
    }

    pub fn minimized(&self) -> Vec<WindowId> {
        self.state.borrow().minimized.clone()
    }

    pub fn closed(&self) -> Vec<WindowId> {
        self.state.borrow().closed.clone()
    }

    pub fn destroyed_overlays(&self) -> Vec<WindowId> {
        self.state.borrow().destroyed_overlays.clone()
    }

    fn read<T>(&self, window: WindowId, default: T, f: impl FnOnce(&TestWindow) -> T) -> T {
        self.state.borrow().windows.get(&window).map_or(default, f)
    }

    fn write(&self, window: WindowId, anim: Option<&AnimationSettings>, f: impl FnOnce(&mut TestWindow)) {
        self.update(window, |w| {
            f(w);
            w.animating |= anim.is_some();
        });
    }
}

impl WindowSystem for TestShell {
    fn root(&self, window: WindowId) -> RootId {
        self.read(window, RootId(0), |w| w.root)
    }

    fn title(&self, window: WindowId) -> String {
        self.read(window, String::new(), |w| w.title.clone())
    }

    fn window_type(&self, window: WindowId) -> WindowType {
        self.read(window, WindowType::Normal, |w| w.window_type)
    }

    fn state_type(&self, window: WindowId) -> WindowStateType {
        self.read(window, WindowStateType::Normal, |w| w.state_type)
    }

    fn is_always_on_top(&self, window: WindowId) -> bool {
        self.read(window, false, |w| w.always_on_top)
    }

    fn transient_parent(&self, window: WindowId) -> Option<WindowId> {
        self.read(window, None, |w| w.transient_parent)
    }

    fn transient_children(&self, window: WindowId) -> Vec<WindowId> {
        let state = self.state.borrow();
        let mut children: Vec<_> = state
            .windows
            .iter()
            .filter(|(_, w)| w.transient_parent == Some(window))
            .map(|(&id, _)| id)
            .collect();
        children.sort();
        children
    }

    fn bounds(&self, window: WindowId) -> Rect {
        self.read(window, Rect::default(), |w| w.bounds)
    }

    fn target_bounds(&self, window: WindowId) -> Rect {
        self.bounds(window)
    }

    fn set_bounds(&self, window: WindowId, bounds: Rect, anim: Option<&AnimationSettings>) {
        self.write(window, anim, |w| w.bounds = bounds);
    }

    fn transform(&self, window: WindowId) -> Transform {
        self.read(window, Transform::IDENTITY, |w| w.transform)
    }

    fn set_transform(&self, window: WindowId, transform: Transform, anim: Option<&AnimationSettings>) {
        self.write(window, anim, |w| w.transform = transform);
    }

    fn opacity(&self, window: WindowId) -> f32 {
        self.read(window, 1., |w| w.opacity)
    }

    fn set_opacity(&self, window: WindowId, opacity: f32, anim: Option<&AnimationSettings>) {
        self.write(window, anim, |w| w.opacity = opacity);
    }

    fn is_visible(&self, window: WindowId) -> bool {
        self.read(window, false, |w| w.visible)
    }

    fn show(&self, window: WindowId) {
        self.update(window, |w| w.visible = true);
    }

    fn hide(&self, window: WindowId) {
        self.update(window, |w| w.visible = false);
    }

    fn minimize(&self, window: WindowId) {
        self.set_state_type(window, WindowStateType::Minimized);
        self.state.borrow_mut().minimized.push(window);
    }

    fn close(&self, window: WindowId) {
        self.state.borrow_mut().closed.push(window);
    }

    fn stop_animating(&self, window: WindowId) {
        self.update(window, |w| w.animating = false);
    }

    fn stack_at_top(&self, window: WindowId) {
        let mut state = self.state.borrow_mut();
        if let Some(idx) = state.mru.iter().position(|&w| w == window) {
            let window = state.mru.remove(idx);
            state.mru.insert(0, window);
        }
    }

    fn mru_windows(&self) -> Vec<WindowId> {
        self.state.borrow().mru.clone()
    }

    fn backdrop_window(&self, root: RootId) -> Option<WindowId> {
        self.state.borrow().backdrops.get(&root).copied()
    }

    fn create_overlay(&self, root: RootId, kind: OverlayKind, bounds: Rect) -> WindowId {
        let mut state = self.state.borrow_mut();
        let id = Self::next_id(&mut state);
        let mut overlay = TestWindow::new(root, bounds);
        overlay.overlay = Some(kind);
        state.windows.insert(id, overlay);
        id
    }

    fn destroy_overlay(&self, overlay: WindowId) {
        {
            let mut state = self.state.borrow_mut();
            if state.windows.remove(&overlay).is_none() {
                return;
            }
            state.destroyed_overlays.push(overlay);
        }
        if let Some(f) = &*self.overlay_destroyed.borrow() {
            f(overlay);
        }
    }
}

impl Displays for TestShell {
    fn roots(&self) -> Vec<RootId> {
        self.state.borrow().displays.iter().map(|d| d.root).collect()
    }

    fn primary_root(&self) -> RootId {
        RootId(0)
    }

    fn root_at(&self, location: IVec2) -> RootId {
        let state = self.state.borrow();
        state
            .displays
            .iter()
            .find(|d| d.bounds.contains(location))
            .map_or(RootId(0), |d| d.root)
    }

    fn root_bounds(&self, root: RootId) -> Rect {
        let state = self.state.borrow();
        state
            .displays
            .iter()
            .find(|d| d.root == root)
            .map_or(Rect::default(), |d| d.bounds)
    }

    fn work_area(&self, root: RootId) -> Rect {
        let state = self.state.borrow();
        state
            .displays
            .iter()
            .find(|d| d.root == root)
            .map_or(Rect::default(), |d| d.work_area)
    }
}

impl SplitView for TestShell {
    fn state(&self) -> SplitState {
        self.state.borrow().split_state
    }

    fn snapped_window_bounds(&self, root: RootId, position: SnapPosition) -> Rect {
        let work_area = self.work_area(root);
        let half = work_area.w / 2;
        match position {
            SnapPosition::Left => work_area.with_width(half),
            SnapPosition::Right => Rect::new(work_area.x + half, work_area.y, half, work_area.h),
        }
    }

    fn left_window(&self) -> Option<WindowId> {
        self.state.borrow().left
    }

    fn right_window(&self) -> Option<WindowId> {
        self.state.borrow().right
    }

    fn default_snap_position(&self) -> SnapPosition {
        let state = self.state.borrow();
        state.default_snap_position.unwrap_or(match state.split_state {
            SplitState::RightSnapped => SnapPosition::Right,
            _ => SnapPosition::Left,
        })
    }

    fn divider_window(&self) -> Option<WindowId> {
        let state = self.state.borrow();
        if state.split_state == SplitState::NoSnap {
            return None;
        }
        state.divider
    }

    fn end_split_view(&self) {
        let mut state = self.state.borrow_mut();
        state.split_view_ended = true;
        state.split_state = SplitState::NoSnap;
        state.left = None;
        state.right = None;
    }

    fn add_observer(&self, observer: Weak<dyn SplitViewObserver>) {
        self.state.borrow_mut().observers.push(observer);
    }
}

impl HomeLauncherPresenter for TestShell {
    fn is_home_launcher_enabled(&self) -> bool {
        !self.state.borrow().launcher_disabled
    }

    fn update_y_position_and_opacity(
        &self,
        y: i32,
        opacity: f32,
        settings: Option<&AnimationSettings>,
    ) {
        self.state.borrow_mut().presenter_updates.push(PresenterUpdate {
            y,
            opacity,
            animated: settings.is_some(),
        });
    }
}
