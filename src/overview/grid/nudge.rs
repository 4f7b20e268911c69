//! Sliding the neighbours of an item into its place while the item is swiped away.

use super::WindowGrid;
use crate::utils::{lerp_rect, Rect};
use crate::window::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct NudgeData {
    pub index: usize,
    pub src: Rect,
    pub dst: Rect,
}

/// Row number of every cell, counting from 1. Cells in a row share their y, so a new y
/// starts a new row. The cell at `skip` gets row 0 and does not count.
fn rows<'a>(cells: impl IntoIterator<Item = Option<&'a Rect>>, skip: Option<usize>) -> Vec<usize> {
    let mut rows = Vec::new();
    let mut current = 1;
    let mut last_y = None;
    for (idx, cell) in cells.into_iter().enumerate() {
        let Some(cell) = cell.filter(|_| Some(idx) != skip) else {
            rows.push(0);
            continue;
        };
        if last_y.is_some_and(|y| y != cell.y) {
            current += 1;
        }
        rows.push(current);
        last_y = Some(cell.y);
    }
    rows
}

impl WindowGrid {
    /// Prepares the neighbours of `window` to slide into its place.
    ///
    /// Only items in the same row that stay in that row are nudged. Nothing is nudged if
    /// removing the item changes the number of rows, if it pulls the last item of the
    /// previous row down, or if any item is already closing.
    pub fn start_nudge(&mut self, window: WindowId) {
        self.nudge_data.clear();

        if self.items.len() <= 1 || self.items.iter().any(|item| item.animating_to_close()) {
            return;
        }
        let Some(index) = self.index_of(window) else {
            return;
        };

        let src_rects: Vec<Rect> = self.items.iter().map(|item| item.target_bounds()).collect();
        let dst_rects = self.window_rects(Some(window));

        let src_rows = rows(src_rects.iter().map(Some), None);
        let dst_rows = rows(dst_rects.iter().map(Option::as_ref), Some(index));

        let last = src_rows.len() - 1;
        if dst_rows[last] != 0 && src_rows[last] != dst_rows[last] {
            return;
        }
        if dst_rows[last] == 0 && src_rows[last - 1] != dst_rows[last - 1] {
            return;
        }

        // The last item of the previous row would drop into this row while the rest of
        // the row shifts right.
        if src_rows[index] > 1 {
            let mut previous_row_last = index;
            while src_rows[previous_row_last] == src_rows[index] {
                previous_row_last -= 1;
            }
            if src_rows[previous_row_last] != dst_rows[previous_row_last] {
                return;
            }
        }

        let should_nudge = |idx: usize| {
            idx < src_rows.len() && dst_rows[idx] == src_rows[index] && dst_rows[idx] == src_rows[idx]
        };

        let mut affected = Vec::new();
        let mut idx = index;
        while let Some(prev) = idx.checked_sub(1).filter(|&prev| should_nudge(prev)) {
            affected.push(prev);
            idx = prev;
        }
        let mut idx = index + 1;
        while should_nudge(idx) {
            affected.push(idx);
            idx += 1;
        }

        self.nudge_data = affected
            .into_iter()
            .filter_map(|index| {
                let dst = dst_rects[index]?;
                Some(NudgeData {
                    index,
                    src: src_rects[index],
                    dst,
                })
            })
            .collect();
    }

    /// Moves the nudged items towards their new cells. `value` is the swipe distance.
    pub fn update_nudge(&mut self, value: f64) {
        let progress = (value * value / 30.).clamp(0., 1.);
        let windows = &*self.services.windows;
        let params = *self.engine.params();

        for data in &self.nudge_data {
            let Some(item) = self.items.get_mut(data.index) else {
                continue;
            };
            let bounds = lerp_rect(progress, data.src, data.dst);
            item.set_bounds(windows, &params, bounds, None);
        }
    }

    pub fn end_nudge(&mut self) {
        self.nudge_data.clear();
    }

    pub fn is_nudging(&self) -> bool {
        !self.nudge_data.is_empty()
    }
}
