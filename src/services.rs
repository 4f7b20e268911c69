use std::rc::Rc;

use crate::animation::Clock;
use crate::display::Displays;
use crate::overview::Options;
use crate::split_view::SplitView;
use crate::window::WindowSystem;

/// Collaborators shared by the overview and the home launcher gesture.
#[derive(Clone)]
pub struct Services {
    pub windows: Rc<dyn WindowSystem>,
    pub displays: Rc<dyn Displays>,
    pub split_view: Rc<dyn SplitView>,
    pub clock: Clock,
    pub options: Rc<Options>,
}
