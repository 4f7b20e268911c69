//! Dragging a window from outside overview into a grid.
//!
//! While the drag is in progress a placeholder item sits at the front of the grid as the
//! drop target. When split view previews are shown the grid shrinks to the other half and
//! the placeholder is hidden, since dropping there snaps the window instead.

use glam::IVec2;
use tracing::{debug, warn};

use super::{split_aware_bounds, WindowGrid};
use crate::overview::{Direction, OverviewAnimationType};
use crate::split_view::{IndicatorState, SnapPosition};
use crate::utils::Rect;
use crate::window::{OverlayKind, WindowId};

impl WindowGrid {
    pub fn new_item_overlay(&self) -> Option<WindowId> {
        self.new_item
    }

    /// The placeholder, if it is the front item.
    fn new_item_in_grid(&self) -> Option<WindowId> {
        let new_item = self.new_item?;
        let first = self.items.first()?;
        (first.window() == new_item).then_some(new_item)
    }

    pub fn on_window_drag_started(&mut self, dragged: WindowId, animate: bool) {
        if self.new_item.is_some() {
            warn!("window drag started while another drag is in progress");
            return;
        }

        let windows = self.services.windows.clone();
        let overlay =
            windows.create_overlay(self.root, OverlayKind::NewItem, windows.bounds(dragged));
        let settings = if animate {
            self.animation_settings(OverviewAnimationType::NewItemFade)
        } else {
            None
        };
        if settings.is_some() {
            windows.set_opacity(overlay, 0., None);
        }
        windows.set_opacity(overlay, 1., settings.as_ref());

        self.new_item = Some(overlay);
        self.add_item(overlay, true, animate);

        windows.stack_at_top(dragged);
        debug!("window {dragged:?} is dragged over overview on {:?}", self.root);
    }

    pub fn on_window_drag_continued(&mut self, location: IVec2, indicator: IndicatorState) {
        if !self.services.split_view.is_active() {
            let should_show = !indicator.is_preview_area();
            let placeholder = self.new_item_in_grid();
            if let Some(placeholder) = placeholder {
                let windows = &*self.services.windows;
                if windows.is_visible(placeholder) != should_show {
                    if should_show {
                        windows.show(placeholder);
                    } else {
                        windows.hide(placeholder);
                    }
                    windows.set_opacity(placeholder, if should_show { 1. } else { 0. }, None);
                }
            }

            let expected = self.bounds_during_drag(indicator);
            if self.bounds != expected {
                let ignored = if should_show { None } else { placeholder };
                self.set_bounds_and_update_positions(expected, ignored);
            }
        }

        if indicator.is_preview_area() {
            self.clear_selection();
            return;
        }

        // Only the placeholder takes drops; highlight it while hovered.
        let target = self
            .items
            .iter()
            .position(|item| item.target_bounds().contains(location))
            .filter(|&idx| Some(self.items[idx].window()) == self.new_item);

        let Some(idx) = target else {
            self.clear_selection();
            return;
        };

        let previous = self.selected_index;
        if previous == idx && self.selection.is_some() {
            return;
        }
        if previous != idx {
            self.clear_selection();
        }

        self.selected_index = idx;
        let direction = if idx > previous {
            Direction::Right
        } else {
            Direction::Left
        };
        self.move_selection_widget(direction, true, false, false);
        self.items[idx].set_selected(true);
    }

    /// Ends the drag, converting the dragged window into an item if it was dropped on the
    /// placeholder or `drop_into_overview` is set.
    ///
    /// `already_in_overview` tells whether any grid already shows the window.
    pub fn on_window_drag_ended(
        &mut self,
        dragged: WindowId,
        drop_into_overview: bool,
        already_in_overview: bool,
    ) {
        let Some(placeholder) = self.new_item else {
            warn!("window drag ended without a drag in progress");
            return;
        };

        let dropped = match self.selected_window() {
            Some(selected) => {
                self.clear_selection();
                selected == placeholder
            }
            None => drop_into_overview,
        };
        if dropped && !already_in_overview {
            self.add_item(dragged, false, false);
        }

        self.remove_item(placeholder, false);
        self.services.windows.destroy_overlay(placeholder);
        self.new_item = None;

        // The bounds may have followed a preview that was not used in the end.
        let bounds = split_aware_bounds(&self.services, self.root);
        self.set_bounds_and_update_positions(bounds, None);
    }

    fn bounds_during_drag(&self, indicator: IndicatorState) -> Rect {
        let split_view = &self.services.split_view;
        match indicator {
            IndicatorState::PreviewAreaLeft => {
                split_view.snapped_window_bounds(self.root, SnapPosition::Right)
            }
            IndicatorState::PreviewAreaRight => {
                split_view.snapped_window_bounds(self.root, SnapPosition::Left)
            }
            _ => self.services.displays.work_area(self.root),
        }
    }
}
