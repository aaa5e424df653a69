// HTTP routes
pub mod admin;
pub mod availability;
pub mod health;
pub mod notifications;
pub mod reservations;

pub use admin::*;
pub use availability::*;
pub use health::*;
pub use notifications::*;
pub use reservations::*;
