mod register;

pub use register::{register, NotificationRequest, RegistrationOutcome};
