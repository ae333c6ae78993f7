//! Focus tracking and the sticky focus coordinator.

mod coordinator;
mod tracker;

pub use coordinator::{FocusBinding, FocusCoordinator, is_sticky_focused};
pub use tracker::FocusTracker;
