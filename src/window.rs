//! The window-system collaborator and window bookkeeping.

use std::collections::HashMap;

use crate::animation::AnimationSettings;
use crate::utils::{Rect, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// Identifies a display's root window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    #[default]
    Normal,
    Popup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowStateType {
    #[default]
    Normal,
    Minimized,
    Maximized,
    Fullscreen,
    LeftSnapped,
    RightSnapped,
}

impl WindowStateType {
    pub fn is_minimized(self) -> bool {
        self == Self::Minimized
    }

    pub fn is_maximized_or_fullscreen(self) -> bool {
        matches!(self, Self::Maximized | Self::Fullscreen)
    }

    pub fn is_snapped(self) -> bool {
        matches!(self, Self::LeftSnapped | Self::RightSnapped)
    }
}

/// Helper surfaces the overview creates on a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// Full-screen background behind the grid.
    Shield,
    /// Highlight behind the keyboard-selected item.
    Selection,
    /// Drop target reserved while a window is dragged from outside overview.
    NewItem,
}

/// Operations the overview and the gesture handler perform on windows.
///
/// All mutations are synchronous. When `anim` is `Some`, the window system animates the
/// property towards the new value; queries for the current value then keep returning the
/// new (target) value.
pub trait WindowSystem {
    fn root(&self, window: WindowId) -> RootId;
    fn title(&self, window: WindowId) -> String;
    fn window_type(&self, window: WindowId) -> WindowType;
    fn state_type(&self, window: WindowId) -> WindowStateType;
    fn is_always_on_top(&self, window: WindowId) -> bool;
    fn transient_parent(&self, window: WindowId) -> Option<WindowId>;
    fn transient_children(&self, window: WindowId) -> Vec<WindowId>;

    fn bounds(&self, window: WindowId) -> Rect;
    /// Bounds the window ends up with once its bounds animation finishes.
    fn target_bounds(&self, window: WindowId) -> Rect;
    fn set_bounds(&self, window: WindowId, bounds: Rect, anim: Option<&AnimationSettings>);

    fn transform(&self, window: WindowId) -> Transform;
    fn set_transform(&self, window: WindowId, transform: Transform, anim: Option<&AnimationSettings>);

    fn opacity(&self, window: WindowId) -> f32;
    fn set_opacity(&self, window: WindowId, opacity: f32, anim: Option<&AnimationSettings>);

    fn is_visible(&self, window: WindowId) -> bool;
    /// Shows the window without a visibility animation.
    fn show(&self, window: WindowId);
    /// Hides the window without a visibility animation.
    fn hide(&self, window: WindowId);
    /// Minimizes the window without a minimize animation.
    fn minimize(&self, window: WindowId);
    /// Asks the window to close. Destruction is reported later, if at all.
    fn close(&self, window: WindowId);

    /// Finishes all in-flight animations, jumping to their targets.
    fn stop_animating(&self, window: WindowId);
    fn stack_at_top(&self, window: WindowId);

    /// Windows in most-recently-used order, the active one first.
    fn mru_windows(&self) -> Vec<WindowId>;
    /// The workspace backdrop behind maximized windows on `root`, if shown.
    fn backdrop_window(&self, root: RootId) -> Option<WindowId>;

    fn create_overlay(&self, root: RootId, kind: OverlayKind, bounds: Rect) -> WindowId;
    fn destroy_overlay(&self, overlay: WindowId);
}

/// Returns `window` followed by its transient descendants, depth first.
pub fn transient_tree(windows: &dyn WindowSystem, window: WindowId) -> Vec<WindowId> {
    let mut tree = Vec::new();
    let mut stack = vec![window];
    while let Some(next) = stack.pop() {
        tree.push(next);
        let children = windows.transient_children(next);
        stack.extend(children.into_iter().rev());
    }
    tree
}

/// Windows a component listens to for destruction and state changes.
///
/// Removal is O(1): the last entry is swapped into the freed slot.
#[derive(Debug, Default)]
pub struct ObservedWindows {
    windows: Vec<WindowId>,
    index: HashMap<WindowId, usize>,
}

impl ObservedWindows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the window was already observed.
    pub fn add(&mut self, window: WindowId) -> bool {
        if self.index.contains_key(&window) {
            return false;
        }
        self.index.insert(window, self.windows.len());
        self.windows.push(window);
        true
    }

    /// Returns `false` if the window was not observed.
    pub fn remove(&mut self, window: WindowId) -> bool {
        let Some(idx) = self.index.remove(&window) else {
            return false;
        };
        self.windows.swap_remove(idx);
        if let Some(moved) = self.windows.get(idx) {
            self.index.insert(*moved, idx);
        }
        true
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.index.contains_key(&window)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.windows.iter().copied()
    }

    pub fn clear(&mut self) {
        self.windows.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observed_windows_swap_remove_keeps_index() {
        let mut observed = ObservedWindows::new();
        for id in 1..=4 {
            assert!(observed.add(WindowId(id)));
        }
        assert!(!observed.add(WindowId(2)));

        assert!(observed.remove(WindowId(1)));
        assert!(!observed.remove(WindowId(1)));
        // 4 was moved into the first slot and must still be removable.
        assert!(observed.remove(WindowId(4)));

        let mut left: Vec<_> = observed.iter().collect();
        left.sort();
        assert_eq!(left, [WindowId(2), WindowId(3)]);
        assert!(observed.contains(WindowId(3)));
        assert!(!observed.contains(WindowId(4)));
        assert_eq!(observed.len(), 2);
    }
}
