//! Overview mode: every window scaled down into a grid, one grid per display.
//!
//! [`OverviewController`] owns the optional [`OverviewSession`], which owns one
//! [`WindowGrid`] per display. Grids lay their [`WindowItem`]s out with the
//! [`GridLayoutEngine`](crate::layout::GridLayoutEngine) and push the results to the window
//! system through [`Services`](crate::services::Services).

use std::cell::RefCell;
use std::mem;

use overview_config::{self as config, Config};
use tracing::trace;

use crate::animation::{Animation, AnimationSettings};
use crate::layout::GridParams;
use crate::services::Services;
use crate::split_view::SplitState;
use crate::window::{WindowId, WindowSystem, WindowType};

mod controller;
mod filter;
mod grid;
mod item;
mod session;


pub use controller::OverviewController;
pub use filter::TitleFilter;
pub use grid::WindowGrid;
pub use item::WindowItem;
pub use session::OverviewSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    /// Whether moving this way walks the item list backwards.
    pub fn is_backward(self) -> bool {
        matches!(self, Self::Left | Self::Up)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewTransition {
    Enter,
    InOverview,
    Exit,
}

/// How overview is entered or left, which changes the animations used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnterExitOverviewType {
    #[default]
    Normal,
    /// Windows are minimized when overview ends.
    WindowsMinimized,
    /// Overview is swiped away towards the home launcher, which drives the motion.
    SwipeFromShelf,
    /// Overview was opened by dragging a window.
    WindowDragged,
}

/// Animation presets used by the overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverviewAnimationType {
    LayoutOnEnter,
    LayoutInOverview,
    RestoreWindow,
    SelectorMove,
    SelectorFadeOut,
    ShieldFade,
    NewItemFade,
}

/// Runtime options resolved from the config.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub grid: GridParams,
    pub dimmed_opacity: f32,
    pub offscreen_width_ratio: f64,
    pub backdrop_target_opacity: f32,
    pub animations: config::Animations,
}

impl Default for Options {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Options {
    pub fn from_config(config: &Config) -> Self {
        Self {
            grid: GridParams::from_config(&config.overview),
            dimmed_opacity: config.overview.dimmed_opacity.clamp(0., 1.) as f32,
            offscreen_width_ratio: config.home_launcher.offscreen_width_ratio.clamp(0.1, 1.),
            backdrop_target_opacity: config.home_launcher.backdrop_target_opacity.clamp(0., 1.)
                as f32,
            animations: config.animations.clone(),
        }
    }

    pub fn animation(&self, kind: OverviewAnimationType) -> config::Animation {
        let anims = &self.animations;
        match kind {
            OverviewAnimationType::LayoutOnEnter => anims.layout_on_enter(),
            OverviewAnimationType::LayoutInOverview => anims.layout_in_overview(),
            OverviewAnimationType::RestoreWindow => anims.restore_window(),
            OverviewAnimationType::SelectorMove => anims.selector_move(),
            OverviewAnimationType::SelectorFadeOut => anims.selector_fade_out(),
            OverviewAnimationType::ShieldFade => anims.shield_fade(),
            OverviewAnimationType::NewItemFade => anims.new_item_fade(),
        }
    }

    /// Settings for the window system, `None` if the preset is disabled.
    pub fn animation_settings(&self, kind: OverviewAnimationType) -> Option<AnimationSettings> {
        AnimationSettings::from_config(self.animation(kind))
    }
}

/// Host callbacks of an overview session.
pub trait OverviewDelegate {
    /// Keeps an overlay animating after its grid let go of it.
    fn add_delayed_animation_observer(&self, animation: CleanupAnimation);

    /// Announces the newly selected window to accessibility clients.
    fn send_accessible_selection_event(&self, _window: WindowId) {}
}

/// An overlay that is destroyed once its fade-out animation finishes.
#[derive(Debug)]
pub struct CleanupAnimation {
    overlay: WindowId,
    anim: Animation,
}

impl CleanupAnimation {
    pub fn new(overlay: WindowId, anim: Animation) -> Self {
        Self { overlay, anim }
    }

    pub fn overlay(&self) -> WindowId {
        self.overlay
    }

    pub fn is_done(&self) -> bool {
        self.anim.is_done()
    }
}

/// Cleanup animations that outlive the grids, and the overview session, that started them.
#[derive(Debug, Default)]
pub struct DelayedAnimations {
    pending: RefCell<Vec<CleanupAnimation>>,
}

impl DelayedAnimations {
    /// Destroys the overlays whose animations have finished.
    ///
    /// The window system may queue new cleanup animations while an overlay is destroyed.
    pub fn advance(&self, windows: &dyn WindowSystem) {
        let done = {
            let mut pending = self.pending.borrow_mut();
            let (done, running): (Vec<_>, Vec<_>) =
                mem::take(&mut *pending).into_iter().partition(CleanupAnimation::is_done);
            *pending = running;
            done
        };

        for anim in done {
            trace!("destroying overlay {:?} after fade-out", anim.overlay);
            windows.destroy_overlay(anim.overlay);
        }
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

impl OverviewDelegate for DelayedAnimations {
    fn add_delayed_animation_observer(&self, animation: CleanupAnimation) {
        self.pending.borrow_mut().push(animation);
    }
}

/// Whether `window` hides everything behind it in its workspace.
pub fn can_cover_available_workspace(services: &Services, window: WindowId) -> bool {
    let state = services.windows.state_type(window);
    if services.split_view.state() != SplitState::NoSnap {
        return state.is_snapped();
    }
    state.is_maximized_or_fullscreen()
}

/// Whether `window` can be shown as an overview item.
pub fn is_selectable(windows: &dyn WindowSystem, window: WindowId) -> bool {
    windows.window_type(window) == WindowType::Normal
        && windows.transient_parent(window).is_none()
}
