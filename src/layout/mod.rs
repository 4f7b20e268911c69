//! Grid layout for the overview.
//!
//! Windows are packed left to right into rows of equal height. The row height is the
//! largest one (up to a maximum) for which every window still fits into the usable area,
//! found by bisection. The rows are then balanced by repeatedly squeezing the widest row
//! until squeezing stops making the rows more even, and the resulting block is centered
//! vertically.

use overview_config as config;
use tracing::trace;

use crate::utils::{Rect, Size};

#[cfg(test)]
mod tests;

/// Bisection and balancing passes after which the current best height and bound are used.
const MAX_LAYOUT_PASSES: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    pub window_margin: i32,
    pub max_row_height: i32,
    pub inset_ratio: f64,
    pub vertical_inset_ratio: f64,
    pub header_height: i32,
    pub extreme_window_ratio: f64,
}

impl Default for GridParams {
    fn default() -> Self {
        Self::from_config(&config::Overview::default())
    }
}

impl GridParams {
    pub fn from_config(config: &config::Overview) -> Self {
        Self {
            window_margin: config.window_margin.max(0),
            max_row_height: config.max_row_height.max(1),
            inset_ratio: config.inset_ratio.clamp(0., 0.5),
            vertical_inset_ratio: config.vertical_inset_ratio.clamp(0., 0.5),
            header_height: config.header_height.max(0),
            extreme_window_ratio: config.extreme_window_ratio.max(1.),
        }
    }
}

/// How a window's aspect ratio is treated when sizing its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    #[default]
    Normal,
    /// Much wider than tall; the cell gets a fixed wide aspect.
    Letterboxed,
    /// Much taller than wide; the cell gets a fixed narrow aspect.
    Pillarboxed,
}

impl FillMode {
    pub fn for_size(size: Size, extreme_ratio: f64) -> Self {
        let (w, h) = (f64::from(size.w), f64::from(size.h));
        if w > h * extreme_ratio {
            Self::Letterboxed
        } else if h > w * extreme_ratio {
            Self::Pillarboxed
        } else {
            Self::Normal
        }
    }
}

/// One entry of the layout input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutWindow {
    /// Target size of the window on the desktop.
    pub size: Size,
    pub fill_mode: FillMode,
    /// Skipped windows keep their slot in the output but get no rectangle.
    pub ignored: bool,
}

impl LayoutWindow {
    pub fn new(size: Size, params: &GridParams) -> Self {
        Self {
            size,
            fill_mode: FillMode::for_size(size, params.extreme_window_ratio),
            ignored: false,
        }
    }

    pub fn ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct Fit {
    fits: bool,
    max_bottom: i32,
    /// Right edge of the narrowest row.
    min_right: i32,
    /// Right edge of the widest row.
    max_right: i32,
}

#[derive(Debug, Clone, Default)]
pub struct GridLayoutEngine {
    params: GridParams,
}

impl GridLayoutEngine {
    pub fn new(params: GridParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GridParams {
        &self.params
    }

    /// Area inside `bounds` that the cells are packed into.
    pub fn usable_bounds(&self, bounds: Rect) -> Rect {
        let GridParams {
            window_margin,
            inset_ratio,
            vertical_inset_ratio,
            ..
        } = self.params;

        let horizontal_inset = (inset_ratio * f64::from(bounds.w))
            .min(inset_ratio * f64::from(bounds.h))
            .floor() as i32;
        let vertical_inset = horizontal_inset
            + (vertical_inset_ratio * f64::from(bounds.h - 2 * horizontal_inset)) as i32;
        bounds.inset(
            (horizontal_inset - window_margin).max(0),
            (vertical_inset - window_margin).max(0),
        )
    }

    /// Scale of the window's content inside a cell of height `height`.
    pub fn item_scale(&self, window: &LayoutWindow, height: i32) -> f64 {
        let available = height - 2 * self.params.window_margin - self.params.header_height;
        if window.size.h <= 0 {
            return 0.;
        }
        (f64::from(available) / f64::from(window.size.h)).clamp(0., 2.)
    }

    /// Width of the cell, margins included, for a row of height `height`.
    pub fn item_width(&self, window: &LayoutWindow, height: i32) -> i32 {
        match window.fill_mode {
            FillMode::Letterboxed => (self.params.extreme_window_ratio * f64::from(height)) as i32,
            FillMode::Pillarboxed => (f64::from(height) / self.params.extreme_window_ratio) as i32,
            FillMode::Normal => {
                let scaled = (f64::from(window.size.w) * self.item_scale(window, height)).floor();
                (scaled as i32 + 2 * self.params.window_margin).max(1)
            }
        }
    }

    /// Computes one cell per window, `None` for ignored windows.
    ///
    /// If the windows do not fit even at the minimum row height, the rows that do not fit
    /// are still placed, past the bottom of `bounds`.
    pub fn layout(&self, bounds: Rect, windows: &[LayoutWindow]) -> Vec<Option<Rect>> {
        let mut rects = vec![None; windows.len()];
        if windows.iter().all(|w| w.ignored) {
            return rects;
        }

        let margin = self.params.window_margin;
        let max_height = self.params.max_row_height + 2 * margin;
        let total = self.usable_bounds(bounds);

        let mut width_diff = total.w;
        let mut right_bound = total.right();

        let mut low_height = 2 * margin;
        let mut high_height = low_height.max(total.h + 1);
        let mut height = (low_height + high_height) / 2;
        let mut height_fixed = false;

        let mut passes = 0;
        loop {
            if passes == MAX_LAYOUT_PASSES {
                trace!("grid layout stopped after {passes} passes");
                break;
            }
            passes += 1;

            let row_bounds = total.with_width(right_bound - total.x);
            let fit = self.fit(row_bounds, height.min(max_height), windows, &mut rects, false);

            if height_fixed {
                if !fit.fits {
                    // Revert the last squeeze.
                    right_bound += 1;
                    break;
                }
                // Every window is zero-width at this scale.
                if fit.max_right <= total.x {
                    break;
                }
            } else {
                if fit.fits {
                    low_height = height;
                } else {
                    high_height = height;
                }
                height = (low_height + high_height) / 2;
                if height == low_height {
                    height_fixed = true;
                }
            }

            if fit.fits && height_fixed {
                if fit.max_right - fit.min_right <= width_diff {
                    // Rows are getting more even, squeeze the widest one.
                    right_bound = fit.max_right - 1;
                    width_diff = fit.max_right - fit.min_right;
                } else {
                    right_bound += 1;
                    break;
                }
            }
        }

        let row_bounds = total.with_width(right_bound - total.x);
        let fit = self.fit(row_bounds, height.min(max_height), windows, &mut rects, true);
        if !fit.fits {
            trace!(
                "{} windows do not fit into {total:?}, overflowing",
                windows.len()
            );
        }

        let offset = (total.bottom() - fit.max_bottom) / 2;
        for rect in rects.iter_mut().flatten() {
            *rect = rect.translated(0, offset);
        }
        rects
    }

    fn fit(
        &self,
        bounds: Rect,
        height: i32,
        windows: &[LayoutWindow],
        rects: &mut [Option<Rect>],
        overflow: bool,
    ) -> Fit {
        let mut fit = Fit {
            fits: true,
            max_bottom: bounds.y,
            min_right: bounds.right(),
            max_right: bounds.x,
        };

        let last = windows.iter().rposition(|w| !w.ignored);
        let mut left = bounds.x;
        let mut top = bounds.y;

        for (idx, window) in windows.iter().enumerate() {
            if window.ignored {
                rects[idx] = None;
                continue;
            }

            let width = self.item_width(window, height);
            if left + width > bounds.right() {
                if left > bounds.x {
                    fit.min_right = fit.min_right.min(left);
                    fit.max_right = fit.max_right.max(left);
                    top += height;
                    left = bounds.x;
                }

                if top + height > bounds.bottom() || bounds.x + width > bounds.right() {
                    fit.fits = false;
                    if !overflow {
                        break;
                    }
                }
            }

            rects[idx] = Some(Rect::new(left, top, width, height));
            left += width;

            if Some(idx) == last {
                fit.min_right = fit.min_right.min(left);
                fit.max_right = fit.max_right.max(left);
            }
            fit.max_bottom = top + height;
        }

        fit
    }
}
