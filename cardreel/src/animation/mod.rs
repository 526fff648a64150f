//! Entrance/exit animations for card blocks.

/// Easing curves.
pub mod ease;
/// Named animations and motion sampling.
pub mod motion;
