use glam::DVec2;

use super::Options;
use crate::animation::AnimationSettings;
use crate::layout::{FillMode, GridParams, LayoutWindow};
use crate::utils::{transform_between, Rect, RectF, Size, Transform};
use crate::window::{WindowId, WindowSystem};

/// One window shown in an overview grid.
///
/// The item never owns its window. The grid removes the item in the same call that reports
/// the window's destruction.
#[derive(Debug)]
pub struct WindowItem {
    window: WindowId,
    /// Size of the window on the desktop, used as the layout input.
    size: Size,
    fill_mode: FillMode,
    /// Cell in the grid, header and margins included.
    target_bounds: Rect,
    /// Maps the window from its desktop bounds into its cell.
    overview_transform: Transform,
    original_transform: Transform,
    original_opacity: f32,
    was_minimized: bool,
    dimmed: bool,
    selected: bool,
    animating_to_close: bool,
    should_animate_when_entering: bool,
    should_animate_when_exiting: bool,
}

impl WindowItem {
    pub fn new(windows: &dyn WindowSystem, window: WindowId, params: &GridParams) -> Self {
        let size = windows.target_bounds(window).size();
        Self {
            window,
            size,
            fill_mode: FillMode::for_size(size, params.extreme_window_ratio),
            target_bounds: Rect::default(),
            overview_transform: Transform::IDENTITY,
            original_transform: windows.transform(window),
            original_opacity: windows.opacity(window),
            was_minimized: windows.state_type(window).is_minimized(),
            dimmed: false,
            selected: false,
            animating_to_close: false,
            should_animate_when_entering: true,
            should_animate_when_exiting: true,
        }
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn target_bounds(&self) -> Rect {
        self.target_bounds
    }

    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }

    pub fn overview_transform(&self) -> Transform {
        self.overview_transform
    }

    pub fn dimmed(&self) -> bool {
        self.dimmed
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn animating_to_close(&self) -> bool {
        self.animating_to_close
    }

    pub fn was_minimized(&self) -> bool {
        self.was_minimized
    }

    pub fn should_animate_when_entering(&self) -> bool {
        self.should_animate_when_entering
    }

    pub fn set_should_animate_when_entering(&mut self, value: bool) {
        self.should_animate_when_entering = value;
    }

    pub fn should_animate_when_exiting(&self) -> bool {
        self.should_animate_when_exiting
    }

    pub fn set_should_animate_when_exiting(&mut self, value: bool) {
        self.should_animate_when_exiting = value;
    }

    pub fn layout_window(&self, ignored: bool) -> LayoutWindow {
        LayoutWindow {
            size: self.size,
            fill_mode: self.fill_mode,
            ignored,
        }
    }

    /// Minimized windows are shown while they are in the grid.
    pub fn prepare_for_overview(&mut self, windows: &dyn WindowSystem) {
        self.original_transform = windows.transform(self.window);
        self.original_opacity = windows.opacity(self.window);
        if self.was_minimized {
            windows.show(self.window);
        }
    }

    /// Re-reads the window size after its desktop bounds changed.
    pub fn update_window_dimensions(&mut self, windows: &dyn WindowSystem, params: &GridParams) {
        self.size = windows.target_bounds(self.window).size();
        self.fill_mode = FillMode::for_size(self.size, params.extreme_window_ratio);
    }

    pub fn on_minimized_state_changed(&mut self, windows: &dyn WindowSystem) {
        self.was_minimized = windows.state_type(self.window).is_minimized();
        if self.was_minimized {
            windows.show(self.window);
        }
    }

    /// Places the item into `cell`, scaling the window to fit below the header.
    pub fn set_bounds(
        &mut self,
        windows: &dyn WindowSystem,
        params: &GridParams,
        cell: Rect,
        anim: Option<&AnimationSettings>,
    ) {
        self.target_bounds = cell;

        let source = windows.target_bounds(self.window);
        let content = content_bounds(params, cell);
        let dst = fit_centered(source.size(), content);

        self.overview_transform = transform_between(source.to_f64(), dst);
        windows.set_transform(self.window, self.overview_transform, anim);
    }

    pub fn set_dimmed(&mut self, windows: &dyn WindowSystem, options: &Options, dimmed: bool) {
        self.dimmed = dimmed;
        let opacity = if dimmed { options.dimmed_opacity } else { 1. };
        windows.set_opacity(self.window, opacity, None);
    }

    /// Moves the item vertically by `new_y` on top of its grid placement.
    pub fn update_y_position_and_opacity(
        &self,
        windows: &dyn WindowSystem,
        new_y: i32,
        opacity: f32,
        anim: Option<&AnimationSettings>,
    ) {
        let offset = Transform::from_translation(DVec2::new(0., f64::from(new_y)));
        windows.set_transform(self.window, offset * self.overview_transform, anim);
        windows.set_opacity(self.window, opacity, anim);
    }

    /// Puts the window back where it was before overview.
    ///
    /// A window that was minimized before overview is hidden again unless it was picked.
    pub fn restore(
        &self,
        windows: &dyn WindowSystem,
        anim: Option<&AnimationSettings>,
        selected: bool,
    ) {
        windows.set_transform(self.window, self.original_transform, anim);
        windows.set_opacity(self.window, self.original_opacity, anim);
        if self.was_minimized && !selected {
            windows.hide(self.window);
        }
    }

    /// Starts closing the window. The grid stops laying the item out from now on.
    pub fn animate_and_close(&mut self, windows: &dyn WindowSystem) {
        self.animating_to_close = true;
        windows.set_opacity(self.window, 0., None);
        windows.close(self.window);
    }
}

/// The part of a cell the window content occupies.
fn content_bounds(params: &GridParams, cell: Rect) -> Rect {
    let inner = cell.inset(params.window_margin, params.window_margin);
    let header = params.header_height.min(inner.h);
    Rect::new(inner.x, inner.y + header, inner.w, inner.h - header)
}

/// The largest rectangle with the aspect of `size` centered in `bounds`.
fn fit_centered(size: Size, bounds: Rect) -> RectF {
    let bounds = bounds.to_f64();
    if size.is_empty() {
        return RectF {
            loc: bounds.loc + bounds.size / 2.,
            size: DVec2::ZERO,
        };
    }

    let size = DVec2::new(f64::from(size.w), f64::from(size.h));
    let scale = (bounds.size / size).min_element().max(0.);
    let fitted = size * scale;
    RectF {
        loc: bounds.loc + (bounds.size - fitted) / 2.,
        size: fitted,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn content_skips_header_and_margins() {
        let params = GridParams::default();
        let content = content_bounds(&params, Rect::new(100, 100, 400, 300));
        assert_eq!(content, Rect::new(105, 145, 390, 250));

        // Too short for the header.
        let content = content_bounds(&params, Rect::new(0, 0, 100, 30));
        assert_eq!(content.h, 0);
    }

    #[test]
    fn fit_keeps_aspect() {
        let fitted = fit_centered(Size::new(800, 600), Rect::new(0, 0, 400, 400));
        assert_abs_diff_eq!(fitted.size.x, 400., epsilon = 1e-6);
        assert_abs_diff_eq!(fitted.size.y, 300., epsilon = 1e-6);
        assert_abs_diff_eq!(fitted.loc.y, 50., epsilon = 1e-6);

        let fitted = fit_centered(Size::new(0, 600), Rect::new(0, 0, 400, 400));
        assert_eq!(fitted.size, DVec2::ZERO);
    }
}
