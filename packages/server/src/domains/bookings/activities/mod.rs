mod cancel;
mod confirm;
mod reserve;

pub use cancel::cancel;
pub use confirm::confirm;
pub use reserve::{reserve, ReserveMode, ReserveRequest};
