pub mod pages;
pub mod templates;
pub mod toolbar;

pub use pages::{PageSurface, paint_page, track_gesture};
