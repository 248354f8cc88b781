//! Route data models and the distance annotator.

pub mod route;
pub mod types;

// Re-exports for convenience
pub use route::{AnnotatedRoute, Route};
pub use types::{InputError, Result, RoutePoint, Stop};
