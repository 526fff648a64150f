/// CSS-like color parsing.
pub mod color;
/// Frame/time primitives.
pub mod core;
/// Error taxonomy.
pub mod error;
pub(crate) mod math;
