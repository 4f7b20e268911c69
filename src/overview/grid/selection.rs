use glam::IVec2;

use super::WindowGrid;
use crate::overview::{Direction, OverviewAnimationType};
use crate::utils::Rect;
use crate::window::{OverlayKind, WindowId};

/// Offset the selection highlight slides by when it fades in or out.
///
/// UP moves like LEFT and DOWN like RIGHT.
fn slide_vector(direction: Direction, bounds: Rect) -> IVec2 {
    if direction.is_backward() {
        IVec2::new(-bounds.w, 0)
    } else {
        IVec2::new(bounds.w, 0)
    }
}

impl WindowGrid {
    pub fn is_selecting(&self) -> bool {
        self.selection.is_some()
    }

    pub fn selection_overlay(&self) -> Option<WindowId> {
        self.selection
    }

    /// Window of the selected item, if keyboard selection is active.
    pub fn selected_window(&self) -> Option<WindowId> {
        self.selection?;
        self.items.get(self.selected_index).map(|item| item.window())
    }

    /// Moves the selection one step, skipping dimmed items.
    ///
    /// The first move picks the first item, or the last one for LEFT and UP. Returns `true`
    /// when the move ran past either end; the selection is then dropped and the caller moves
    /// on to the next grid.
    pub fn move_selection(&mut self, direction: Direction, animate: bool) -> bool {
        if self.items.is_empty() {
            return true;
        }

        let old_y = self.selected_window().map(|_| {
            let item = &mut self.items[self.selected_index];
            item.set_selected(false);
            item.target_bounds().y
        });

        let last = self.items.len() - 1;
        let mut index = self.selected_index;
        let mut changed = false;
        let mut out_of_bounds = false;
        let mut recreate = false;

        if self.selection.is_none() {
            index = if direction.is_backward() { last } else { 0 };
            changed = true;
        }

        while !changed || (!out_of_bounds && self.items[index].dimmed()) {
            if direction.is_backward() {
                match index.checked_sub(1) {
                    Some(prev) => index = prev,
                    None => out_of_bounds = true,
                }
            } else if index >= last {
                out_of_bounds = true;
            } else {
                index += 1;
            }

            // Changing rows restarts the highlight instead of sliding it across.
            if !out_of_bounds && old_y.is_some_and(|y| self.items[index].target_bounds().y != y) {
                recreate = true;
            }
            changed = true;
        }

        if !out_of_bounds {
            self.selected_index = index;
        }
        self.move_selection_widget(direction, recreate, out_of_bounds, animate);

        if !out_of_bounds {
            self.items[self.selected_index].set_selected(true);
        }
        out_of_bounds
    }

    pub(super) fn move_selection_widget(
        &mut self,
        direction: Direction,
        recreate: bool,
        out_of_bounds: bool,
        animate: bool,
    ) {
        if recreate || out_of_bounds {
            if let Some(old) = self.selection.take() {
                self.fade_out_selection(old, direction);
            }
        }
        if out_of_bounds {
            return;
        }

        if self.selection.is_none() {
            self.init_selection_widget(direction);
        }
        if let Some(window) = self.selected_window() {
            self.delegate.send_accessible_selection_event(window);
        }
        self.move_selection_widget_to_target(animate);
    }

    fn init_selection_widget(&mut self, direction: Direction) {
        let Some(item) = self.items.get(self.selected_index) else {
            return;
        };

        let target = item.target_bounds();
        let bounds = target.offset_by(-slide_vector(direction, target));
        let windows = &*self.services.windows;
        let overlay = windows.create_overlay(self.root, OverlayKind::Selection, bounds);
        windows.set_opacity(overlay, 0., None);
        self.selection = Some(overlay);
    }

    /// Fades the old highlight out while sliding it along `direction`.
    fn fade_out_selection(&self, overlay: WindowId, direction: Direction) {
        let windows = &*self.services.windows;
        if let Some(settings) = self.animation_settings(OverviewAnimationType::SelectorFadeOut) {
            let bounds = windows.bounds(overlay);
            let slid = bounds.offset_by(slide_vector(direction, bounds));
            windows.set_bounds(overlay, slid, Some(&settings));
        }
        self.fade_out_overlay(overlay, OverviewAnimationType::SelectorFadeOut);
    }

    pub(super) fn move_selection_widget_to_target(&self, animate: bool) {
        let (Some(overlay), Some(item)) = (self.selection, self.items.get(self.selected_index))
        else {
            return;
        };

        let settings = if animate {
            self.animation_settings(OverviewAnimationType::SelectorMove)
        } else {
            None
        };
        let windows = &*self.services.windows;
        windows.set_bounds(overlay, item.target_bounds(), settings.as_ref());
        windows.set_opacity(overlay, 1., settings.as_ref());
    }

    /// Removes the highlight at once, without fading it out.
    pub(super) fn drop_selection_widget(&mut self) {
        if let Some(overlay) = self.selection.take() {
            self.services.windows.destroy_overlay(overlay);
        }
    }

    /// Unselects the selected item and removes the highlight at once.
    pub(super) fn clear_selection(&mut self) {
        if self.selection.is_none() {
            return;
        }
        if let Some(item) = self.items.get_mut(self.selected_index) {
            item.set_selected(false);
        }
        self.drop_selection_widget();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slide_vector_is_horizontal() {
        let bounds = Rect::new(10, 10, 200, 100);
        assert_eq!(slide_vector(Direction::Left, bounds), IVec2::new(-200, 0));
        assert_eq!(slide_vector(Direction::Up, bounds), IVec2::new(-200, 0));
        assert_eq!(slide_vector(Direction::Right, bounds), IVec2::new(200, 0));
        assert_eq!(slide_vector(Direction::Down, bounds), IVec2::new(200, 0));
    }
}
