//! Per-window start and end values of the swipe, and the geometry of the off-screen target.

use crate::animation::AnimationSettings;
use crate::split_view::SplitView;
use crate::utils::{lerp_f32, lerp_transform, transform_between, Rect, RectF, Transform};
use crate::window::{RootId, WindowId, WindowSystem};

/// Opacity and transform of a window at progress 0 (`initial`) and 1 (`target`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowTransitionState {
    pub initial_opacity: f32,
    pub target_opacity: f32,
    pub initial_transform: Transform,
    pub target_transform: Transform,
}

impl WindowTransitionState {
    /// Linear opacity and blended transform at `progress`.
    pub fn interpolate(&self, progress: f64) -> (f32, Transform) {
        (
            lerp_f32(progress, self.initial_opacity, self.target_opacity),
            lerp_transform(progress, self.initial_transform, self.target_transform),
        )
    }
}

/// What a [`TransitionEntity`] moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionTarget {
    /// A swiped window: the active one, or the other snapped window in split view.
    Window(WindowId),
    /// A transient child (a dialog, say) that moves with `parent`.
    TransientDescendant { window: WindowId, parent: WindowId },
    /// The workspace backdrop behind maximized windows.
    Backdrop(WindowId),
    /// The split view divider.
    Divider(WindowId),
}

impl TransitionTarget {
    pub fn window(self) -> WindowId {
        match self {
            Self::Window(window)
            | Self::TransientDescendant { window, .. }
            | Self::Backdrop(window)
            | Self::Divider(window) => window,
        }
    }

    /// Backdrop and divider are owned by other components and may have been replaced since
    /// the swipe started; they only move while they are still the current ones.
    fn is_current(self, windows: &dyn WindowSystem, split_view: &dyn SplitView, root: RootId) -> bool {
        match self {
            Self::Backdrop(window) => windows.backdrop_window(root) == Some(window),
            Self::Divider(window) => split_view.divider_window() == Some(window),
            Self::Window(_) | Self::TransientDescendant { .. } => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionEntity {
    pub target: TransitionTarget,
    pub state: WindowTransitionState,
}

impl TransitionEntity {
    /// Puts the target at `progress` of its transition.
    pub fn apply(
        &self,
        windows: &dyn WindowSystem,
        split_view: &dyn SplitView,
        root: RootId,
        progress: f64,
        anim: Option<&AnimationSettings>,
    ) {
        if !self.target.is_current(windows, split_view, root) {
            return;
        }

        let window = self.target.window();
        let (opacity, transform) = self.state.interpolate(progress);
        windows.set_opacity(window, opacity, anim);
        windows.set_transform(window, transform, anim);
    }

    /// Puts the target back to where it was when the swipe started, without animation.
    pub fn restore(&self, windows: &dyn WindowSystem) {
        let window = self.target.window();
        windows.set_transform(window, self.state.initial_transform, None);
        windows.set_opacity(window, self.state.initial_opacity, None);
    }
}

/// The work area scaled down by `width_ratio` and moved one work area height up, out of
/// the screen.
pub fn offscreen_workspace_bounds(work_area: RectF, width_ratio: f64) -> RectF {
    RectF::new(
        (1. - width_ratio) / 2. * work_area.size.x + work_area.loc.x,
        work_area.loc.y - work_area.size.y,
        width_ratio * work_area.size.x,
        width_ratio * work_area.size.y,
    )
}

/// Where `bounds` ends up when `src_work_area` is squeezed into `dst_work_area`, keeping
/// its position relative to the work area.
pub fn offscreen_window_bounds(bounds: Rect, src_work_area: RectF, dst_work_area: RectF) -> RectF {
    let bounds = bounds.to_f64();
    let ratio = if src_work_area.size.x != 0. {
        dst_work_area.size.x / src_work_area.size.x
    } else {
        1.
    };
    RectF {
        loc: (bounds.loc - src_work_area.loc) * ratio + dst_work_area.loc,
        size: bounds.size * ratio,
    }
}

/// Transition of a window that shrinks into the off-screen workspace and fades out.
pub fn window_transition(
    windows: &dyn WindowSystem,
    window: WindowId,
    work_area: RectF,
    target_work_area: RectF,
) -> WindowTransitionState {
    let bounds = windows.target_bounds(window);
    WindowTransitionState {
        initial_opacity: windows.opacity(window),
        target_opacity: 0.,
        initial_transform: windows.transform(window),
        target_transform: transform_between(
            bounds.to_f64(),
            offscreen_window_bounds(bounds, work_area, target_work_area),
        ),
    }
}

/// Vertical position of `y` in `work_area`: 1 at the top, 0 at the bottom.
///
/// `y` is clamped to the work area first.
pub fn progress_in_work_area(work_area: Rect, y: i32) -> f64 {
    if work_area.h <= 0 {
        return 0.;
    }
    let y = y.clamp(work_area.y, work_area.bottom());
    f64::from(work_area.bottom() - y) / f64::from(work_area.h)
}
