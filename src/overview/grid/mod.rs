//! The overview grid of one display.
//!
//! A grid owns the items of its root in layout order, the full-screen shield behind them
//! and, while keyboard selection is active, the selection highlight. Item geometry comes
//! from the [`GridLayoutEngine`]; the results are pushed to the window system, animated or
//! not depending on the transition.

use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::filter::TitleFilter;
use super::item::WindowItem;
use super::{
    can_cover_available_workspace, CleanupAnimation, EnterExitOverviewType, OverviewAnimationType,
    OverviewDelegate, OverviewTransition,
};
use crate::animation::{Animation, AnimationSettings};
use crate::layout::{GridLayoutEngine, LayoutWindow};
use crate::services::Services;
use crate::split_view::{SnapPosition, SplitState};
use crate::utils::{scale_y_translate, Rect};
use crate::window::{ObservedWindows, OverlayKind, RootId, WindowId, WindowStateType};

mod drag;
mod nudge;
mod selection;

use nudge::NudgeData;

pub struct WindowGrid {
    root: RootId,
    /// Items in layout and keyboard navigation order.
    items: Vec<WindowItem>,
    /// Area the items are laid out in.
    bounds: Rect,
    shield: Option<WindowId>,
    no_items_label_visible: bool,
    /// Selection highlight overlay, present while keyboard selection is active.
    selection: Option<WindowId>,
    /// Only meaningful while `selection` is set.
    selected_index: usize,
    /// Drop target placeholder shown while a window is dragged into overview.
    new_item: Option<WindowId>,
    nudge_data: Vec<NudgeData>,
    observed: ObservedWindows,
    prepared_for_overview: bool,
    should_animate_when_exiting: bool,
    enter_exit_type: EnterExitOverviewType,
    engine: GridLayoutEngine,
    services: Services,
    delegate: Rc<dyn OverviewDelegate>,
}

impl WindowGrid {
    pub fn new(
        root: RootId,
        windows: &[WindowId],
        bounds: Rect,
        enter_exit_type: EnterExitOverviewType,
        services: Services,
        delegate: Rc<dyn OverviewDelegate>,
    ) -> Self {
        let params = services.options.grid;
        let mut observed = ObservedWindows::new();
        let mut items = Vec::with_capacity(windows.len());
        for &window in windows {
            if observed.add(window) {
                items.push(WindowItem::new(&*services.windows, window, &params));
            }
        }

        Self {
            root,
            items,
            bounds,
            shield: None,
            no_items_label_visible: false,
            selection: None,
            selected_index: 0,
            new_item: None,
            nudge_data: Vec::new(),
            observed,
            prepared_for_overview: false,
            should_animate_when_exiting: true,
            enter_exit_type,
            engine: GridLayoutEngine::new(params),
            services,
            delegate,
        }
    }

    pub fn root(&self) -> RootId {
        self.root
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn items(&self) -> &[WindowItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn shield(&self) -> Option<WindowId> {
        self.shield
    }

    pub fn is_no_items_label_visible(&self) -> bool {
        self.no_items_label_visible
    }

    pub fn should_animate_when_exiting(&self) -> bool {
        self.should_animate_when_exiting
    }

    pub fn set_enter_exit_type(&mut self, enter_exit_type: EnterExitOverviewType) {
        self.enter_exit_type = enter_exit_type;
    }

    pub fn contains(&self, window: WindowId) -> bool {
        self.index_of(window).is_some()
    }

    pub fn item(&self, window: WindowId) -> Option<&WindowItem> {
        self.index_of(window).map(|idx| &self.items[idx])
    }

    fn index_of(&self, window: WindowId) -> Option<usize> {
        self.items.iter().position(|item| item.window() == window)
    }

    /// Creates the shield and prepares the items. Must run before the first positioning.
    pub fn prepare_for_overview(&mut self) {
        if self.prepared_for_overview {
            return;
        }
        self.init_shield();
        for item in &mut self.items {
            item.prepare_for_overview(&*self.services.windows);
        }
        self.prepared_for_overview = true;
    }

    fn init_shield(&mut self) {
        if self.shield.is_some() {
            return;
        }

        let windows = &*self.services.windows;
        let bounds = self.services.displays.root_bounds(self.root);
        let shield = windows.create_overlay(self.root, OverlayKind::Shield, bounds);
        windows.set_opacity(shield, 0., None);
        let settings = self.animation_settings(OverviewAnimationType::ShieldFade);
        windows.set_opacity(shield, 1., settings.as_ref());
        self.shield = Some(shield);
    }

    fn animation_settings(&self, kind: OverviewAnimationType) -> Option<AnimationSettings> {
        self.services.options.animation_settings(kind)
    }

    /// Lays out the items and moves them into their cells.
    ///
    /// `ignored` keeps its slot but is not moved.
    pub fn position_windows(
        &mut self,
        animate: bool,
        ignored: Option<WindowId>,
        transition: OverviewTransition,
    ) {
        debug_assert_ne!(transition, OverviewTransition::Exit);

        let Some(shield) = self.shield else {
            warn!("positioning overview items before the grid was prepared");
            return;
        };

        // A grid without items still keeps its shield over the whole display.
        let windows = self.services.windows.clone();
        windows.set_bounds(shield, self.services.displays.root_bounds(self.root), None);

        self.show_no_items_label(self.items.is_empty());
        if self.items.is_empty() {
            return;
        }

        let rects = self.window_rects(ignored);
        let kind = match transition {
            OverviewTransition::Enter => OverviewAnimationType::LayoutOnEnter,
            _ => OverviewAnimationType::LayoutInOverview,
        };
        let settings = self.animation_settings(kind);
        let params = *self.engine.params();

        for (item, rect) in self.items.iter_mut().zip(rects) {
            let Some(rect) = rect else {
                continue;
            };
            if item.animating_to_close() || Some(item.window()) == ignored {
                continue;
            }

            let mut animate_item = animate;
            if animate && transition == OverviewTransition::Enter {
                animate_item = item.should_animate_when_entering();
            }
            // The placeholder fades in on its own.
            if Some(item.window()) == self.new_item {
                animate_item = false;
            }

            let anim = if animate_item { settings.as_ref() } else { None };
            item.set_bounds(&*windows, &params, rect, anim);
        }

        if self.selection.is_some() {
            self.move_selection_widget_to_target(false);
        }
    }

    /// Cells for the current items, skipping closing items and `ignored`.
    fn window_rects(&self, ignored: Option<WindowId>) -> Vec<Option<Rect>> {
        let input: Vec<LayoutWindow> = self
            .items
            .iter()
            .map(|item| {
                item.layout_window(item.animating_to_close() || Some(item.window()) == ignored)
            })
            .collect();
        self.engine.layout(self.bounds, &input)
    }

    fn show_no_items_label(&mut self, visible: bool) {
        // The message is only shown on the primary display.
        if self.root != self.services.displays.primary_root() {
            return;
        }
        self.no_items_label_visible = visible;
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn set_bounds_and_update_positions(&mut self, bounds: Rect, ignored: Option<WindowId>) {
        self.bounds = bounds;
        self.position_windows(true, ignored, OverviewTransition::InOverview);
    }

    /// Adds `window` at the front. Returns `false` if it is already in the grid.
    pub fn add_item(&mut self, window: WindowId, reposition: bool, animate: bool) -> bool {
        if self.contains(window) {
            warn!("window {window:?} is already in the overview grid");
            return false;
        }

        let windows = &*self.services.windows;
        self.observed.add(window);
        let mut item = WindowItem::new(windows, window, self.engine.params());
        item.prepare_for_overview(windows);
        self.items.insert(0, item);
        self.nudge_data.clear();

        // Keep the selection on the same item.
        if self.selection.is_some() {
            self.selected_index += 1;
        }

        if reposition {
            self.position_windows(animate, None, OverviewTransition::InOverview);
        }
        true
    }

    /// Removes the item of `window`. Returns `false` if there is none.
    pub fn remove_item(&mut self, window: WindowId, reposition: bool) -> bool {
        let Some(idx) = self.index_of(window) else {
            return false;
        };

        self.observed.remove(window);
        self.erase_item(idx);

        if reposition {
            self.position_windows(true, None, OverviewTransition::InOverview);
        }
        true
    }

    fn erase_item(&mut self, idx: usize) {
        self.items.remove(idx);
        self.nudge_data.clear();

        if self.items.is_empty() {
            self.drop_selection_widget();
            self.selected_index = 0;
            return;
        }

        if self.selection.is_some() {
            let send_focus_alert = self.selected_index == idx;
            if self.selected_index >= idx && self.selected_index != 0 {
                self.selected_index -= 1;
            }
            let selected = &mut self.items[self.selected_index];
            selected.set_selected(true);
            if send_focus_alert {
                self.delegate.send_accessible_selection_event(selected.window());
            }
        }
    }

    /// Dims the items whose title does not match `pattern`.
    pub fn filter_items(&mut self, pattern: &str) {
        let filter = TitleFilter::new(pattern);
        let windows = self.services.windows.clone();

        for idx in 0..self.items.len() {
            let title = windows.title(self.items[idx].window());
            if filter.matches(&title) {
                self.items[idx].set_dimmed(&*windows, &self.services.options, false);
                continue;
            }

            self.items[idx].set_dimmed(&*windows, &self.services.options, true);
            if self.selection.is_some() && self.selected_index == idx {
                self.items[idx].set_selected(false);
                self.drop_selection_widget();
            }
        }
    }

    /// Starts closing the window of an item.
    pub fn animate_and_close(&mut self, window: WindowId) {
        let Some(idx) = self.index_of(window) else {
            warn!("closing window {window:?} which is not in the grid");
            return;
        };

        self.items[idx].animate_and_close(&*self.services.windows);
        self.position_windows(true, None, OverviewTransition::InOverview);
    }

    /// Removes the item of a window that is being destroyed.
    ///
    /// Returns `true` if the grid became empty. The caller drops the grid in that case.
    pub fn on_window_destroying(&mut self, window: WindowId) -> bool {
        self.observed.remove(window);
        let Some(idx) = self.index_of(window) else {
            return false;
        };

        // Closing items were already laid out without themselves.
        let needs_repositioning = !self.items[idx].animating_to_close();
        if Some(window) == self.new_item {
            self.new_item = None;
        }
        self.erase_item(idx);

        if self.items.is_empty() {
            debug!("overview grid on {:?} became empty", self.root);
            return true;
        }

        if needs_repositioning {
            self.position_windows(true, None, OverviewTransition::InOverview);
        }
        false
    }

    pub fn on_window_bounds_changed(&mut self, window: WindowId) {
        // Bounds change while preparing; positioning follows anyway.
        if !self.prepared_for_overview {
            return;
        }
        let Some(idx) = self.index_of(window) else {
            return;
        };

        let windows = &*self.services.windows;
        windows.stop_animating(window);
        self.items[idx].update_window_dimensions(windows, self.engine.params());
        self.position_windows(false, None, OverviewTransition::InOverview);
    }

    pub fn on_window_state_changed(&mut self, window: WindowId, old_state: WindowStateType) {
        if !self.prepared_for_overview {
            return;
        }
        // Swiping overview away minimizes every window.
        if self.enter_exit_type == EnterExitOverviewType::SwipeFromShelf {
            return;
        }

        let windows = &*self.services.windows;
        let new_state = windows.state_type(window);
        if old_state.is_minimized() == new_state.is_minimized() {
            return;
        }
        let Some(idx) = self.index_of(window) else {
            return;
        };

        self.items[idx].on_minimized_state_changed(windows);
        self.position_windows(false, None, OverviewTransition::InOverview);
    }

    /// Decides which items animate when entering or exiting overview.
    ///
    /// Windows stacked below the first window that covers the workspace are not visible,
    /// so they do not animate. `selected` is only given when exiting.
    pub fn calculate_window_list_animation_states(
        &mut self,
        selected: Option<WindowId>,
        transition: OverviewTransition,
    ) {
        debug_assert!(transition == OverviewTransition::Exit || selected.is_none());

        let windows = self.services.windows.clone();
        let selected_idx = selected.and_then(|window| self.index_of(window));
        let mut covered = false;
        let mut checked_selected = false;

        // Always-on-top windows are visible above everything, unless the selected window
        // is fullscreen and hides them.
        let selected_fullscreen =
            selected.is_some_and(|window| windows.state_type(window) == WindowStateType::Fullscreen);
        if !selected_fullscreen {
            for idx in 0..self.items.len() {
                if !windows.is_always_on_top(self.items[idx].window()) {
                    continue;
                }
                let is_selected = Some(idx) == selected_idx;
                checked_selected |= is_selected;
                self.calculate_item_animation_state(idx, &mut covered, is_selected, transition);
            }
        }

        if !checked_selected {
            if let Some(idx) = selected_idx {
                self.calculate_item_animation_state(idx, &mut covered, true, transition);
            }
        }

        // Under a fullscreen selection always-on-top windows count like any other.
        for idx in 0..self.items.len() {
            if Some(idx) == selected_idx
                || (!selected_fullscreen && windows.is_always_on_top(self.items[idx].window()))
            {
                continue;
            }
            self.calculate_item_animation_state(idx, &mut covered, false, transition);
        }
    }

    fn calculate_item_animation_state(
        &mut self,
        idx: usize,
        covered: &mut bool,
        selected: bool,
        transition: OverviewTransition,
    ) {
        let item = &mut self.items[idx];
        let can_cover = can_cover_available_workspace(&self.services, item.window());
        let should_animate = selected || !*covered;

        match transition {
            OverviewTransition::Enter => {
                item.set_should_animate_when_entering(should_animate && !item.was_minimized())
            }
            OverviewTransition::Exit => item.set_should_animate_when_exiting(should_animate),
            OverviewTransition::InOverview => (),
        }

        *covered |= can_cover;
    }

    pub fn set_window_list_not_animated_when_exiting(&mut self) {
        self.should_animate_when_exiting = false;
        for item in &mut self.items {
            item.set_should_animate_when_exiting(false);
        }
    }

    /// Moves the shield and the items vertically and fades them, following the home launcher
    /// swipe.
    pub fn update_y_position_and_opacity(
        &self,
        new_y: i32,
        opacity: f32,
        work_area: Rect,
        settings: Option<&AnimationSettings>,
    ) {
        let windows = &*self.services.windows;

        if let Some(shield) = self.shield {
            // The shield covers the shelf; shrink it to the work area so it does not cover
            // the launcher showing up behind it.
            let shield_height = windows.bounds(shield).h;
            let height_ratio = if settings.is_none() && shield_height > 0 {
                f64::from(work_area.h) / f64::from(shield_height)
            } else {
                1.
            };
            windows.set_transform(
                shield,
                scale_y_translate(height_ratio, f64::from(new_y)),
                settings,
            );
            windows.set_opacity(shield, opacity, settings);
        }

        for item in &self.items {
            item.update_y_position_and_opacity(windows, new_y, opacity, settings);
        }
    }

    /// Whether the wallpaper needs its own animation, that is no animating window on this
    /// grid hides it.
    pub fn should_animate_wallpaper(&self) -> bool {
        !self.items.iter().any(|item| {
            item.should_animate_when_entering()
                && can_cover_available_workspace(&self.services, item.window())
        })
    }

    /// Restores every window and lets go of the overlays.
    ///
    /// With `minimize`, every window except `selected` is minimized instead of shown.
    pub fn shutdown(&mut self, selected: Option<WindowId>, minimize: bool) {
        let windows = self.services.windows.clone();
        let restore = self.animation_settings(OverviewAnimationType::RestoreWindow);

        for item in &self.items {
            if Some(item.window()) == self.new_item {
                continue;
            }
            let is_selected = Some(item.window()) == selected;
            let anim = if item.should_animate_when_exiting() {
                restore.as_ref()
            } else {
                None
            };
            item.restore(&*windows, anim, is_selected);
            if minimize && !is_selected {
                windows.minimize(item.window());
            }
        }

        self.drop_selection_widget();
        if let Some(new_item) = self.new_item.take() {
            windows.destroy_overlay(new_item);
        }
        self.nudge_data.clear();
        self.observed.clear();
        self.items.clear();

        let Some(shield) = self.shield.take() else {
            return;
        };
        // The home launcher gesture already moved the shield away.
        if self.enter_exit_type == EnterExitOverviewType::SwipeFromShelf {
            windows.destroy_overlay(shield);
            return;
        }
        self.fade_out_overlay(shield, OverviewAnimationType::ShieldFade);
    }

    /// Fades `overlay` out and destroys it once the fade finishes, even after the grid is
    /// gone.
    fn fade_out_overlay(&self, overlay: WindowId, kind: OverviewAnimationType) {
        let windows = &*self.services.windows;
        let Some(settings) = self.animation_settings(kind) else {
            windows.destroy_overlay(overlay);
            return;
        };

        trace!("fading out overlay {overlay:?}");
        windows.set_opacity(overlay, 0., Some(&settings));
        let anim = Animation::new(
            self.services.clock.clone(),
            1.,
            0.,
            self.services.options.animation(kind),
        );
        self.delegate
            .add_delayed_animation_observer(CleanupAnimation::new(overlay, anim));
    }

    #[cfg(test)]
    pub fn verify_invariants(&self) {
        if self.selection.is_some() {
            assert!(!self.items.is_empty(), "selection in an empty grid");
            assert!(self.selected_index < self.items.len());
        }
        for (idx, item) in self.items.iter().enumerate() {
            let expected = self.selection.is_some() && idx == self.selected_index;
            assert!(
                !item.selected() || expected,
                "item {idx} is marked selected but the selection is elsewhere"
            );
            assert!(self.observed.contains(item.window()));
        }
        assert_eq!(self.observed.len(), self.items.len());
        for data in &self.nudge_data {
            assert!(data.index < self.items.len());
        }
        if let Some(new_item) = self.new_item {
            assert!(self.contains(new_item), "placeholder is not in the grid");
        }
    }
}

/// Grid bounds on `root` that leave room for the snapped window in split view.
pub(crate) fn split_aware_bounds(services: &Services, root: RootId) -> Rect {
    let split_view = &services.split_view;
    match split_view.state() {
        SplitState::LeftSnapped => split_view.snapped_window_bounds(root, SnapPosition::Right),
        SplitState::RightSnapped => split_view.snapped_window_bounds(root, SnapPosition::Left),
        _ => services.displays.work_area(root),
    }
}
