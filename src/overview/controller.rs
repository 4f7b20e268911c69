use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::IVec2;
use tracing::debug;

use super::session::OverviewSession;
use super::{is_selectable, DelayedAnimations, EnterExitOverviewType, OverviewDelegate};
use crate::animation::AnimationSettings;
use crate::home_launcher::OverviewControl;
use crate::services::Services;
use crate::split_view::{SplitState, SplitViewObserver};
use crate::utils::Rect;
use crate::window::WindowId;

/// Starts and ends overview sessions and routes notifications to the active one.
pub struct OverviewController {
    services: Services,
    delayed: Rc<DelayedAnimations>,
    session: RefCell<Option<OverviewSession>>,
}

impl OverviewController {
    /// Creates the controller and subscribes it to split view changes.
    pub fn new(services: Services) -> Rc<Self> {
        let controller = Rc::new(Self {
            services,
            delayed: Rc::new(DelayedAnimations::default()),
            session: RefCell::new(None),
        });

        let observer: Weak<OverviewController> = Rc::downgrade(&controller);
        controller.services.split_view.add_observer(observer);
        controller
    }

    pub fn is_selecting(&self) -> bool {
        self.session.borrow().is_some()
    }

    pub fn delayed_animations(&self) -> &DelayedAnimations {
        &self.delayed
    }

    /// Starts overview with the most recently used windows, or ends it.
    ///
    /// Returns whether overview is active afterwards.
    pub fn toggle_overview(&self, enter_exit_type: EnterExitOverviewType) -> bool {
        if self.is_selecting() {
            if let Some(session) = self.session.borrow_mut().as_mut() {
                session.set_enter_exit_type(enter_exit_type);
            }
            self.end_overview(None);
            return false;
        }

        let windows = &*self.services.windows;
        let mru: Vec<WindowId> = windows
            .mru_windows()
            .into_iter()
            .filter(|&window| is_selectable(windows, window))
            .collect();

        let delegate: Rc<dyn OverviewDelegate> = self.delayed.clone();
        let mut session = OverviewSession::new(self.services.clone(), delegate, enter_exit_type);
        session.init(&mru);
        *self.session.borrow_mut() = Some(session);
        true
    }

    /// Ends overview, activating nothing.
    pub fn end_overview(&self, selected: Option<WindowId>) {
        // Take the session out first: shutting down notifies collaborators that may call
        // back into the controller.
        let session = self.session.borrow_mut().take();
        if let Some(session) = session {
            session.shutdown(selected);
        }
    }

    /// Ends overview and returns the selected window, which the caller activates.
    pub fn accept_selection(&self) -> Option<WindowId> {
        let session = self.session.borrow_mut().take()?;
        let selected = session.selected_window();
        if let Some(window) = selected {
            self.services.windows.stack_at_top(window);
        }
        session.shutdown(selected);
        selected
    }

    pub fn increment_selection(&self, increment: i32) {
        self.with_session(|session| session.increment_selection(increment));
    }

    /// Runs `f` on the active session, if any.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut OverviewSession) -> R) -> Option<R> {
        self.session.borrow_mut().as_mut().map(f)
    }

    pub fn on_window_destroying(&self, window: WindowId) {
        let empty = self
            .with_session(|session| session.on_window_destroying(window))
            .unwrap_or(false);
        if empty {
            debug!("last overview window was destroyed");
            self.end_overview(None);
        }
    }

    /// Destroys overlays whose fade-out finished. Call once per frame.
    pub fn advance_animations(&self) {
        self.delayed.advance(&*self.services.windows);
    }
}

impl SplitViewObserver for OverviewController {
    fn on_split_view_state_changed(&self, previous: SplitState, state: SplitState) {
        let end = self
            .with_session(|session| session.on_split_view_state_changed(previous, state))
            .unwrap_or(false);
        if end {
            self.end_overview(None);
        }
    }
}

impl OverviewControl for OverviewController {
    fn is_selecting(&self) -> bool {
        OverviewController::is_selecting(self)
    }

    fn exit_to_home_launcher(&self) {
        if self.is_selecting() {
            self.toggle_overview(EnterExitOverviewType::SwipeFromShelf);
        }
    }

    fn update_grid_y_position_and_opacity(
        &self,
        location: IVec2,
        new_y: i32,
        opacity: f32,
        work_area: Rect,
        settings: Option<&AnimationSettings>,
    ) {
        if let Some(session) = self.session.borrow().as_ref() {
            session.update_grid_at_location_y_position_and_opacity(
                location, new_y, opacity, work_area, settings,
            );
        }
    }
}
