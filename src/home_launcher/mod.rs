//! Swiping the active window away to reveal the home launcher, and back.
//!
//! While the finger moves, progress runs from 0 (window in place, launcher hidden) to 1
//! (window shrunk into an off-screen workspace above the display, launcher shown). The
//! window, its transient children, the backdrop and the split view divider follow the
//! progress without animation. On release everything animates to 0 or 1, depending on
//! which half of the work area the finger left, and the gesture then settles: at 1 the
//! swiped windows are minimized, at 0 they stay.
//!
//! With overview open, the gesture instead moves the overview grid out of the way.

use std::rc::Rc;

use glam::IVec2;
use tracing::{debug, trace};

use crate::animation::{Animation, AnimationSettings};
use crate::services::Services;
use crate::split_view::{SnapPosition, SplitState};
use crate::utils::{lerp_f32, lerp_i32, scale_y_translate, transform_between, Rect, Transform};
use crate::window::{
    transient_tree, ObservedWindows, RootId, WindowId, WindowStateType, WindowType,
};

mod transition;


pub use transition::{
    offscreen_window_bounds, offscreen_workspace_bounds, progress_in_work_area, TransitionEntity,
    TransitionTarget, WindowTransitionState,
};
use transition::window_transition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Swipe the active window up to show the home launcher.
    SwipeUpToShow,
    /// Swipe down from the home launcher to bring back the last window.
    SwipeDownToHide,
}

/// The launcher surface that slides in from below.
pub trait HomeLauncherPresenter {
    fn is_home_launcher_enabled(&self) -> bool;
    fn update_y_position_and_opacity(
        &self,
        y: i32,
        opacity: f32,
        settings: Option<&AnimationSettings>,
    );
}

/// What the gesture needs from overview.
pub trait OverviewControl {
    fn is_selecting(&self) -> bool;
    /// Ends overview, minimizing its windows, once the launcher took over.
    fn exit_to_home_launcher(&self);
    fn update_grid_y_position_and_opacity(
        &self,
        location: IVec2,
        new_y: i32,
        opacity: f32,
        work_area: Rect,
        settings: Option<&AnimationSettings>,
    );
}

#[derive(Debug)]
enum GestureState {
    Idle,
    /// The finger is down; every update is applied at once.
    Tracking(GestureSession),
    /// Released; animating to the final state.
    Committing {
        session: GestureSession,
        anim: Animation,
    },
}

/// Everything a swipe changed, so that it can be settled or undone.
#[derive(Debug)]
struct GestureSession {
    mode: Mode,
    last_location: IVec2,
    progress: f64,
    /// `None` when the swipe only moves overview.
    window: Option<WindowId>,
    /// The other window when both sides of split view are snapped.
    window2: Option<WindowId>,
    root: RootId,
    /// Applied in order: backdrop, divider, transient descendants, `window2`, `window`.
    entities: Vec<TransitionEntity>,
    /// Windows behind `window` hidden for the swipe, most recently used first.
    hidden_windows: Vec<WindowId>,
    observed: ObservedWindows,
}

impl GestureSession {
    fn is_top_half(&self) -> bool {
        self.progress > 0.5
    }

    fn forget_entity(&mut self, window: WindowId) {
        self.entities.retain(|entity| entity.target.window() != window);
    }
}

/// Collaborators of the gesture, kept apart from the state so that the state can be
/// borrowed mutably while they are used.
struct GestureContext {
    services: Services,
    presenter: Rc<dyn HomeLauncherPresenter>,
    overview: Rc<dyn OverviewControl>,
}

pub struct HomeLauncherGestureHandler {
    ctx: GestureContext,
    state: GestureState,
}

impl HomeLauncherGestureHandler {
    pub fn new(
        services: Services,
        presenter: Rc<dyn HomeLauncherPresenter>,
        overview: Rc<dyn OverviewControl>,
    ) -> Self {
        Self {
            ctx: GestureContext {
                services,
                presenter,
                overview,
            },
            state: GestureState::Idle,
        }
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, GestureState::Tracking(_))
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.state, GestureState::Committing { .. })
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    /// The swiped window, if a session moves one.
    pub fn window(&self) -> Option<WindowId> {
        self.session()?.window
    }

    pub fn window2(&self) -> Option<WindowId> {
        self.session()?.window2
    }

    pub fn hidden_windows(&self) -> &[WindowId] {
        self.session()
            .map_or(&[], |session| session.hidden_windows.as_slice())
    }

    pub fn entities(&self) -> &[TransitionEntity] {
        self.session().map_or(&[], |session| session.entities.as_slice())
    }

    /// Progress of the current session, 0 when idle.
    pub fn progress(&self) -> f64 {
        self.session().map_or(0., |session| session.progress)
    }

    fn session(&self) -> Option<&GestureSession> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Tracking(session) | GestureState::Committing { session, .. } => {
                Some(session)
            }
        }
    }

    /// Progress for a finger at `location`: 1 at the top of the work area, 0 at the bottom.
    pub fn progress_for_location(&self, location: IVec2) -> f64 {
        let work_area = self.ctx.services.displays.work_area_at(location);
        progress_in_work_area(work_area, location.y)
    }

    /// Starts a swipe. Returns `false` if a swipe is already in progress or nothing can be
    /// swiped.
    pub fn on_press_event(&mut self, mode: Mode) -> bool {
        if self.is_active() {
            debug!("ignoring press, a home launcher swipe is already in progress");
            return false;
        }

        let Some(session) = self.ctx.start_session(mode) else {
            return false;
        };
        self.ctx.update_windows(&session, 0., None);
        self.state = GestureState::Tracking(session);
        true
    }

    /// Follows the finger. Returns `false` if no swipe is being tracked.
    pub fn on_scroll_event(&mut self, location: IVec2) -> bool {
        let progress = self.progress_for_location(location);
        let GestureState::Tracking(session) = &mut self.state else {
            return false;
        };

        session.last_location = location;
        session.progress = progress;
        self.ctx.update_windows(session, progress, None);
        true
    }

    /// Lets go at `location`. Returns `false` if no swipe is being tracked.
    pub fn on_release_event(&mut self, location: IVec2) -> bool {
        let progress = self.progress_for_location(location);
        let GestureState::Tracking(session) = &mut self.state else {
            return false;
        };

        session.last_location = location;
        session.progress = progress;
        self.animate_to_final_state();
        true
    }

    /// Lets go at the last location.
    pub fn cancel(&mut self) {
        if self.is_tracking() {
            self.animate_to_final_state();
        }
    }

    fn animate_to_final_state(&mut self) {
        let GestureState::Tracking(session) =
            std::mem::replace(&mut self.state, GestureState::Idle)
        else {
            return;
        };

        let final_progress = if session.is_top_half() { 1. } else { 0. };
        let config = self.ctx.services.options.animations.home_launcher_release();
        let settings = AnimationSettings::from_config(config);
        self.ctx
            .update_windows(&session, final_progress, settings.as_ref());

        if settings.is_none() {
            self.ctx.settle(session);
            return;
        }

        let anim = Animation::new(
            self.ctx.services.clock.clone(),
            session.progress,
            final_progress,
            config,
        );
        self.state = GestureState::Committing { session, anim };
    }

    /// Settles the swipe once the release animation finished. Call once per frame.
    pub fn advance_animations(&mut self) {
        let GestureState::Committing { anim, .. } = &self.state else {
            return;
        };
        if !anim.is_done() {
            return;
        }

        if let GestureState::Committing { session, .. } =
            std::mem::replace(&mut self.state, GestureState::Idle)
        {
            self.ctx.settle(session);
        }
    }

    /// Jumps to the end of the swipe without animation.
    pub fn on_tablet_mode_ended(&mut self) {
        let session = match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle => return,
            GestureState::Tracking(session) | GestureState::Committing { session, .. } => {
                session
            }
        };

        let windows = &*self.ctx.services.windows;
        for entity in &session.entities {
            if matches!(
                entity.target,
                TransitionTarget::Window(_) | TransitionTarget::TransientDescendant { .. }
            ) {
                windows.stop_animating(entity.target.window());
            }
        }

        let final_progress = if session.is_top_half() { 1. } else { 0. };
        self.ctx.update_windows(&session, final_progress, None);
        self.ctx.settle(session);
    }

    /// Forgets a window that is being destroyed. Losing the swiped window aborts the swipe.
    pub fn on_window_destroying(&mut self, window: WindowId) {
        let (GestureState::Tracking(session) | GestureState::Committing { session, .. }) =
            &mut self.state
        else {
            return;
        };
        if !session.observed.remove(window) {
            return;
        }

        if session.window == Some(window) {
            debug!("swiped window {window:?} was destroyed, aborting the swipe");
            let windows = &*self.ctx.services.windows;
            for &hidden in &session.hidden_windows {
                windows.show(hidden);
            }
            self.state = GestureState::Idle;
            return;
        }

        if session.window2 == Some(window) {
            session.window2 = None;
            session.forget_entity(window);
            return;
        }

        let is_descendant = session.entities.iter().any(|entity| {
            matches!(
                entity.target,
                TransitionTarget::TransientDescendant { window: descendant, .. } if descendant == window
            )
        });
        if is_descendant {
            session.forget_entity(window);
            return;
        }

        session.hidden_windows.retain(|&hidden| hidden != window);
    }
}

impl GestureContext {
    /// Whether `window` can be swiped in `mode`.
    fn can_process_window(&self, window: WindowId, mode: Mode) -> bool {
        let windows = &*self.services.windows;

        // The shelf hides in fullscreen, so there is nothing to swipe from.
        if windows.state_type(window) == WindowStateType::Fullscreen {
            debug!("not swiping fullscreen window {window:?}");
            return false;
        }

        let visible = windows.is_visible(window);
        match mode {
            Mode::SwipeUpToShow if !visible => return false,
            Mode::SwipeDownToHide if visible => return false,
            _ => (),
        }

        if !self.presenter.is_home_launcher_enabled() {
            return false;
        }
        windows.window_type(window) != WindowType::Popup
            && windows.transient_parent(window).is_none()
    }

    fn start_session(&self, mode: Mode) -> Option<GestureSession> {
        let services = &self.services;
        let windows = &*services.windows;
        let split_view = &*services.split_view;
        let split_view_active = split_view.is_active();

        if self.presenter.is_home_launcher_enabled()
            && self.overview.is_selecting()
            && !split_view_active
        {
            debug_assert_eq!(mode, Mode::SwipeUpToShow);
            let root = services.displays.primary_root();
            trace!("starting home launcher swipe over overview");
            return Some(GestureSession {
                mode,
                last_location: bottom_of(services.displays.work_area(root)),
                progress: 0.,
                window: None,
                window2: None,
                root,
                entities: Vec::new(),
                hidden_windows: Vec::new(),
                observed: ObservedWindows::new(),
            });
        }

        let mut mru = windows.mru_windows();
        let first = *mru.first()?;
        if !self.can_process_window(first, mode) {
            return None;
        }

        let window = if split_view_active {
            split_view.default_snapped_window()?
        } else {
            first
        };
        mru.retain(|&other| other != window);

        let window2 = if mode == Mode::SwipeUpToShow && split_view.state() == SplitState::BothSnapped
        {
            match split_view.default_snap_position().opposite() {
                SnapPosition::Left => split_view.left_window(),
                SnapPosition::Right => split_view.right_window(),
            }
        } else {
            None
        };
        if let Some(window2) = window2 {
            mru.retain(|&other| other != window2);
        }

        if mode == Mode::SwipeDownToHide {
            windows.show(window);
            windows.set_opacity(window, 1., None);
        }

        let root = windows.root(window);
        let work_area = services.displays.work_area(root);
        let work_area_f = work_area.to_f64();
        let target_work_area =
            offscreen_workspace_bounds(work_area_f, services.options.offscreen_width_ratio);

        let mut observed = ObservedWindows::new();
        let mut entities = Vec::new();

        if let Some(backdrop) = windows.backdrop_window(root) {
            let bounds = windows.bounds(backdrop);
            // The backdrop also covers the shelf; squeeze it to the work area so that no
            // shelf-sized strip shows below the window.
            let scale_y = if bounds.h > 0 {
                f64::from(work_area.h) / f64::from(bounds.h)
            } else {
                1.
            };
            entities.push(TransitionEntity {
                target: TransitionTarget::Backdrop(backdrop),
                state: WindowTransitionState {
                    initial_opacity: 1.,
                    // Not 0, which would make the backdrop controller hide it.
                    target_opacity: services.options.backdrop_target_opacity,
                    initial_transform: scale_y_translate(scale_y, 0.),
                    target_transform: transform_between(
                        bounds.to_f64(),
                        target_work_area,
                    ),
                },
            });
        }

        if let Some(divider) = split_view.divider_window() {
            let bounds = windows.bounds(divider);
            entities.push(TransitionEntity {
                target: TransitionTarget::Divider(divider),
                state: WindowTransitionState {
                    initial_opacity: 1.,
                    target_opacity: 0.,
                    initial_transform: Transform::IDENTITY,
                    target_transform: transform_between(
                        bounds.to_f64(),
                        offscreen_window_bounds(bounds, work_area_f, target_work_area),
                    ),
                },
            });
        }

        let mut swiped = vec![window];
        swiped.extend(window2);
        let mut top_level = Vec::new();
        for &parent in &swiped {
            observed.add(parent);
            for descendant in transient_tree(windows, parent).into_iter().skip(1) {
                observed.add(descendant);
                entities.push(TransitionEntity {
                    target: TransitionTarget::TransientDescendant {
                        window: descendant,
                        parent,
                    },
                    state: window_transition(windows, descendant, work_area_f, target_work_area),
                });
            }
            top_level.push(TransitionEntity {
                target: TransitionTarget::Window(parent),
                state: window_transition(windows, parent, work_area_f, target_work_area),
            });
        }
        // The primary window goes last.
        entities.extend(top_level.into_iter().rev());

        let mut hidden_windows = Vec::new();
        if mode == Mode::SwipeUpToShow && !self.overview.is_selecting() {
            for other in mru {
                if windows.is_visible(other) {
                    observed.add(other);
                    windows.hide(other);
                    hidden_windows.push(other);
                }
            }
        }

        debug!(
            "starting home launcher swipe {mode:?} of {window:?}, hid {} windows",
            hidden_windows.len()
        );

        Some(GestureSession {
            mode,
            last_location: bottom_of(work_area),
            progress: 0.,
            window: Some(window),
            window2,
            root,
            entities,
            hidden_windows,
            observed,
        })
    }

    fn update_windows(
        &self,
        session: &GestureSession,
        progress: f64,
        settings: Option<&AnimationSettings>,
    ) {
        let services = &self.services;
        let work_area = services.displays.work_area_at(session.last_location);
        let y = lerp_i32(progress, work_area.bottom(), work_area.y);
        let opacity = lerp_f32(progress, 0., 1.);
        self.presenter
            .update_y_position_and_opacity(y, opacity, settings);

        if self.overview.is_selecting() {
            debug_assert_eq!(session.mode, Mode::SwipeUpToShow);
            self.overview.update_grid_y_position_and_opacity(
                session.last_location,
                y - work_area.h,
                1. - opacity,
                work_area,
                settings,
            );
        }

        for entity in &session.entities {
            entity.apply(
                &*services.windows,
                &*services.split_view,
                session.root,
                progress,
                settings,
            );
        }
    }

    /// Puts everything in its final place once the swipe is over.
    fn settle(&self, session: GestureSession) {
        let services = &self.services;
        let windows = &*services.windows;
        let top_half = session.is_top_half();

        let mut launcher_opacity = 1.;
        if self.overview.is_selecting() {
            if top_half {
                // Ending overview also ends split view.
                self.overview.exit_to_home_launcher();
            } else {
                launcher_opacity = 0.;
            }
        }
        let work_area = services.displays.work_area_at(session.last_location);
        self.presenter
            .update_y_position_and_opacity(work_area.y, launcher_opacity, None);

        let Some(window) = session.window else {
            return;
        };

        if top_half && services.split_view.state() == SplitState::BothSnapped {
            services.split_view.end_split_view();
        }

        for entity in &session.entities {
            if matches!(
                entity.target,
                TransitionTarget::Window(_) | TransitionTarget::TransientDescendant { .. }
            ) {
                entity.restore(windows);
            }
        }

        if top_half {
            windows.minimize(window);
            if let Some(window2) = session.window2 {
                windows.minimize(window2);
            }
            // Reverse order keeps the most recently used order intact.
            for &hidden in session.hidden_windows.iter().rev() {
                windows.minimize(hidden);
            }
        } else {
            for &hidden in &session.hidden_windows {
                windows.show(hidden);
            }
        }

        // Minimizing may have changed the backdrop, so it goes last.
        if let Some(backdrop) = windows.backdrop_window(session.root) {
            windows.set_transform(backdrop, Transform::IDENTITY, None);
            windows.set_opacity(backdrop, 1., None);
        }
        debug!(
            "home launcher swipe settled, launcher {}",
            if top_half { "shown" } else { "hidden" }
        );
    }
}

/// Where a new swipe starts: the bottom of the work area, progress 0.
fn bottom_of(work_area: Rect) -> IVec2 {
    IVec2::new(work_area.x + work_area.w / 2, work_area.bottom())
}
