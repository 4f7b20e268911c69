use glam::IVec2;

use crate::utils::Rect;
use crate::window::RootId;

/// Display and work area queries.
pub trait Displays {
    fn roots(&self) -> Vec<RootId>;
    fn primary_root(&self) -> RootId;
    /// Root of the display nearest to `location`.
    fn root_at(&self, location: IVec2) -> RootId;
    /// Full bounds of the display.
    fn root_bounds(&self, root: RootId) -> Rect;
    /// Display bounds minus the shelf and other reserved areas.
    fn work_area(&self, root: RootId) -> Rect;

    /// Work area of the display nearest to `location`.
    fn work_area_at(&self, location: IVec2) -> Rect {
        self.work_area(self.root_at(location))
    }
}
