use std::rc::Rc;

use glam::IVec2;
use tracing::{debug, warn};

use super::grid::{split_aware_bounds, WindowGrid};
use super::{Direction, EnterExitOverviewType, OverviewDelegate, OverviewTransition};
use crate::animation::AnimationSettings;
use crate::services::Services;
use crate::split_view::{IndicatorState, SplitState};
use crate::utils::Rect;
use crate::window::{RootId, WindowId, WindowStateType};

/// One overview session: a grid per display and the selection across them.
pub struct OverviewSession {
    grids: Vec<WindowGrid>,
    /// Grid that receives keyboard navigation.
    selected_grid_index: usize,
    enter_exit_type: EnterExitOverviewType,
    filter_text: String,
    services: Services,
    delegate: Rc<dyn OverviewDelegate>,
}

impl OverviewSession {
    pub fn new(
        services: Services,
        delegate: Rc<dyn OverviewDelegate>,
        enter_exit_type: EnterExitOverviewType,
    ) -> Self {
        Self {
            grids: Vec::new(),
            selected_grid_index: 0,
            enter_exit_type,
            filter_text: String::new(),
            services,
            delegate,
        }
    }

    /// Builds a grid for every display and lays out `windows` in them.
    ///
    /// Displays without windows still get a grid, so the shield covers them and the
    /// primary one shows the "no items" label.
    pub fn init(&mut self, windows: &[WindowId]) {
        let primary = self.services.displays.primary_root();

        for root in self.services.displays.roots() {
            let on_root: Vec<WindowId> = windows
                .iter()
                .copied()
                .filter(|&window| self.services.windows.root(window) == root)
                .collect();

            if root == primary {
                self.selected_grid_index = self.grids.len();
            }
            self.grids.push(self.new_grid(root, &on_root));
        }

        for grid in &mut self.grids {
            grid.prepare_for_overview();
            grid.calculate_window_list_animation_states(None, OverviewTransition::Enter);
            grid.position_windows(true, None, OverviewTransition::Enter);
        }

        debug!(
            "overview started with {} windows on {} displays ({:?})",
            windows.len(),
            self.grids.len(),
            self.enter_exit_type
        );
    }

    fn new_grid(&self, root: RootId, windows: &[WindowId]) -> WindowGrid {
        WindowGrid::new(
            root,
            windows,
            split_aware_bounds(&self.services, root),
            self.enter_exit_type,
            self.services.clone(),
            self.delegate.clone(),
        )
    }

    /// Puts every window back. `selected` is the window picked to activate, if any.
    pub fn shutdown(mut self, selected: Option<WindowId>) {
        let minimize = matches!(
            self.enter_exit_type,
            EnterExitOverviewType::WindowsMinimized | EnterExitOverviewType::SwipeFromShelf
        );

        for grid in &mut self.grids {
            if grid.should_animate_when_exiting() {
                let selected = selected.filter(|&window| grid.contains(window));
                grid.calculate_window_list_animation_states(selected, OverviewTransition::Exit);
            }
            grid.shutdown(selected, minimize);
        }

        debug!("overview ended ({:?})", self.enter_exit_type);
    }

    pub fn grids(&self) -> &[WindowGrid] {
        &self.grids
    }

    pub fn grid(&self, root: RootId) -> Option<&WindowGrid> {
        self.grids.iter().find(|grid| grid.root() == root)
    }

    pub fn grid_containing_mut(&mut self, window: WindowId) -> Option<&mut WindowGrid> {
        self.grids.iter_mut().find(|grid| grid.contains(window))
    }

    fn grid_index(&self, root: RootId) -> Option<usize> {
        self.grids.iter().position(|grid| grid.root() == root)
    }

    /// The grid of `root`, created and prepared if the display had no windows so far.
    fn grid_for_root(&mut self, root: RootId) -> &mut WindowGrid {
        let idx = match self.grid_index(root) {
            Some(idx) => idx,
            None => {
                let mut grid = self.new_grid(root, &[]);
                grid.prepare_for_overview();
                self.grids.push(grid);
                self.grids.len() - 1
            }
        };
        &mut self.grids[idx]
    }

    pub fn selected_grid_index(&self) -> usize {
        self.selected_grid_index
    }

    pub fn enter_exit_type(&self) -> EnterExitOverviewType {
        self.enter_exit_type
    }

    pub fn set_enter_exit_type(&mut self, enter_exit_type: EnterExitOverviewType) {
        self.enter_exit_type = enter_exit_type;
        for grid in &mut self.grids {
            grid.set_enter_exit_type(enter_exit_type);
        }
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn is_window_in_overview(&self, window: WindowId) -> bool {
        self.grids.iter().any(|grid| grid.contains(window))
    }

    /// Whether the focused grid shows the keyboard selection.
    pub fn is_selecting(&self) -> bool {
        self.grids
            .get(self.selected_grid_index)
            .is_some_and(WindowGrid::is_selecting)
    }

    pub fn selected_window(&self) -> Option<WindowId> {
        self.grids.get(self.selected_grid_index)?.selected_window()
    }

    /// Moves the selection, continuing on the next display when a grid runs out of items.
    pub fn move_selection(&mut self, direction: Direction, animate: bool) {
        let count = self.grids.len();
        if count == 0 {
            return;
        }

        // The first backwards move starts on the last display.
        if direction.is_backward() && !self.grids[self.selected_grid_index].is_selecting() {
            self.selected_grid_index = count - 1;
        }

        // At most one full cycle over the displays.
        for _ in 0..=count {
            if !self.grids[self.selected_grid_index].move_selection(direction, animate) {
                break;
            }
            self.selected_grid_index = if direction.is_backward() {
                (self.selected_grid_index + count - 1) % count
            } else {
                (self.selected_grid_index + 1) % count
            };
        }
    }

    /// Moves the selection by `increment` items, backwards if negative.
    pub fn increment_selection(&mut self, increment: i32) {
        let direction = if increment > 0 {
            Direction::Right
        } else {
            Direction::Left
        };
        for _ in 0..increment.unsigned_abs() {
            self.move_selection(direction, true);
        }
    }

    /// Dims the windows whose titles do not match `text`, then selects the first match if
    /// nothing is selected.
    pub fn set_filter_text(&mut self, text: &str) {
        self.filter_text = text.to_owned();
        for grid in &mut self.grids {
            grid.filter_items(text);
        }

        if self.is_selecting() {
            return;
        }
        self.move_selection(Direction::Right, false);
    }

    /// Adds `window` to the grid of its display.
    pub fn add_item(&mut self, window: WindowId, reposition: bool, animate: bool) -> bool {
        if self.is_window_in_overview(window) {
            warn!("window {window:?} is already in overview");
            return false;
        }
        let root = self.services.windows.root(window);
        self.grid_for_root(root).add_item(window, reposition, animate)
    }

    pub fn remove_item(&mut self, window: WindowId, reposition: bool) -> bool {
        self.grid_containing_mut(window)
            .is_some_and(|grid| grid.remove_item(window, reposition))
    }

    pub fn animate_and_close(&mut self, window: WindowId) {
        if let Some(grid) = self.grid_containing_mut(window) {
            grid.animate_and_close(window);
        }
    }

    pub fn on_window_drag_started(&mut self, dragged: WindowId, animate: bool) {
        let root = self.services.windows.root(dragged);
        self.grid_for_root(root).on_window_drag_started(dragged, animate);
    }

    pub fn on_window_drag_continued(
        &mut self,
        dragged: WindowId,
        location: IVec2,
        indicator: IndicatorState,
    ) {
        let root = self.services.windows.root(dragged);
        if let Some(idx) = self.grid_index(root) {
            self.grids[idx].on_window_drag_continued(location, indicator);
        }
    }

    pub fn on_window_drag_ended(&mut self, dragged: WindowId, drop_into_overview: bool) {
        let root = self.services.windows.root(dragged);
        let already_in_overview = self.is_window_in_overview(dragged);
        if let Some(idx) = self.grid_index(root) {
            self.grids[idx].on_window_drag_ended(dragged, drop_into_overview, already_in_overview);
        }
    }

    /// Forgets a window that is being destroyed. Returns `true` if overview became empty.
    pub fn on_window_destroying(&mut self, window: WindowId) -> bool {
        let Some(idx) = self.grids.iter().position(|grid| grid.contains(window)) else {
            return false;
        };
        if self.grids[idx].on_window_destroying(window) {
            return self.on_grid_empty(idx);
        }
        false
    }

    /// Drops the empty grid at `idx`. Returns `true` if no window is left in overview.
    fn on_grid_empty(&mut self, idx: usize) -> bool {
        let mut grid = self.grids.remove(idx);
        grid.shutdown(None, false);

        if idx < self.selected_grid_index
            || (self.selected_grid_index >= self.grids.len() && self.selected_grid_index > 0)
        {
            self.selected_grid_index -= 1;
        }
        self.grids.iter().all(WindowGrid::is_empty)
    }

    pub fn on_window_bounds_changed(&mut self, window: WindowId) {
        if let Some(grid) = self.grid_containing_mut(window) {
            grid.on_window_bounds_changed(window);
        }
    }

    pub fn on_window_state_changed(&mut self, window: WindowId, old_state: WindowStateType) {
        if let Some(grid) = self.grid_containing_mut(window) {
            grid.on_window_state_changed(window, old_state);
        }
    }

    /// Returns `true` if overview has to end, which it does once both sides are snapped.
    pub fn on_split_view_state_changed(&mut self, previous: SplitState, state: SplitState) -> bool {
        debug!("split view state changed from {previous:?} to {state:?}");
        if state == SplitState::BothSnapped {
            return true;
        }

        for idx in 0..self.grids.len() {
            let bounds = split_aware_bounds(&self.services, self.grids[idx].root());
            self.grids[idx].set_bounds_and_update_positions(bounds, None);
        }
        false
    }

    pub fn on_display_bounds_changed(&mut self) {
        for idx in 0..self.grids.len() {
            let bounds = split_aware_bounds(&self.services, self.grids[idx].root());
            let grid = &mut self.grids[idx];
            grid.set_bounds(bounds);
            grid.position_windows(false, None, OverviewTransition::InOverview);
        }
    }

    /// Lays every grid out in `bounds`, leaving the slot of `ignored` alone.
    pub fn set_bounds_for_window_grids_ignoring(&mut self, bounds: Rect, ignored: Option<WindowId>) {
        for grid in &mut self.grids {
            let ignored = ignored.filter(|&window| grid.contains(window));
            grid.set_bounds_and_update_positions(bounds, ignored);
        }
    }

    pub fn set_window_list_not_animated_when_exiting(&mut self, root: RootId) {
        if let Some(idx) = self.grid_index(root) {
            self.grids[idx].set_window_list_not_animated_when_exiting();
        }
    }

    /// Whether the wallpaper of `root` animates on its own, that is no animating window
    /// covers it.
    pub fn should_animate_wallpaper(&self, root: RootId) -> bool {
        self.grid(root).is_some_and(WindowGrid::should_animate_wallpaper)
    }

    /// Moves the grid on the display at `location` along with the home launcher.
    pub fn update_grid_at_location_y_position_and_opacity(
        &self,
        location: IVec2,
        new_y: i32,
        opacity: f32,
        work_area: Rect,
        settings: Option<&AnimationSettings>,
    ) {
        let root = self.services.displays.root_at(location);
        if let Some(grid) = self.grid(root) {
            grid.update_y_position_and_opacity(new_y, opacity, work_area, settings);
        }
    }

    #[cfg(test)]
    pub fn verify_invariants(&self) {
        assert!(self.grids.is_empty() || self.selected_grid_index < self.grids.len());
        for grid in &self.grids {
            grid.verify_invariants();
        }
    }
}
