//! Asset addressing: project URLs and their local copies.

/// URL → local path map used by the engine.
pub mod local;
/// URL classification and data URI decoding.
pub mod source;
