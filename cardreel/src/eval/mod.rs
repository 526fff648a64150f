//! Timeline evaluation: frame index → per-frame visual state.

/// Frame → card state evaluation.
pub mod evaluator;
/// Segment reveal rules.
pub mod reveal;
/// Card spans on the output timeline.
pub mod timeline;
