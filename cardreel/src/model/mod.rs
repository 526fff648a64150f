//! Project schema: the JSON document an editor posts to request a video.

mod de;
/// Schema types and accessors.
pub mod project;
/// Path-addressed schema validation.
pub mod validate;
