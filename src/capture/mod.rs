pub mod screen;

pub use screen::{Capture, Capturer, Rect, WaylandCapture, WindowInfo};
