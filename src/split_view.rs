//! The split-view collaborator.

use std::rc::Weak;

use crate::utils::Rect;
use crate::window::{RootId, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitState {
    #[default]
    NoSnap,
    LeftSnapped,
    RightSnapped,
    BothSnapped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapPosition {
    Left,
    Right,
}

impl SnapPosition {
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Which split-view drop hint is shown while a window is dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndicatorState {
    #[default]
    None,
    /// The drag handles are visible but no preview yet.
    DragArea,
    /// Dropping now snaps the window to the left half.
    PreviewAreaLeft,
    /// Dropping now snaps the window to the right half.
    PreviewAreaRight,
}

impl IndicatorState {
    pub fn is_preview_area(self) -> bool {
        matches!(self, Self::PreviewAreaLeft | Self::PreviewAreaRight)
    }
}

pub trait SplitView {
    fn state(&self) -> SplitState;
    /// Bounds a window snapped to `position` on `root` would get.
    fn snapped_window_bounds(&self, root: RootId, position: SnapPosition) -> Rect;
    fn left_window(&self) -> Option<WindowId>;
    fn right_window(&self) -> Option<WindowId>;
    fn default_snap_position(&self) -> SnapPosition;
    fn divider_window(&self) -> Option<WindowId>;
    fn end_split_view(&self);
    /// Subscribes to state changes. Dropped subscribers are skipped and forgotten.
    fn add_observer(&self, observer: Weak<dyn SplitViewObserver>);

    fn is_active(&self) -> bool {
        self.state() != SplitState::NoSnap
    }

    /// The snapped window on the default side.
    fn default_snapped_window(&self) -> Option<WindowId> {
        match self.default_snap_position() {
            SnapPosition::Left => self.left_window(),
            SnapPosition::Right => self.right_window(),
        }
    }
}

/// Receives split-view state changes, see [`SplitView::add_observer()`].
pub trait SplitViewObserver {
    fn on_split_view_state_changed(&self, previous: SplitState, state: SplitState);
}
