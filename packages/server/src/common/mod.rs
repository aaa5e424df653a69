// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod error;
pub mod id;
pub mod pagination;
pub mod types;

pub use auth::{ActorContext, Role};
pub use entity_ids::*;
pub use error::Error;
pub use id::{Id, V4, V7};
pub use types::*;
