// HTTP middleware
pub mod actor_context;

pub use actor_context::*;
