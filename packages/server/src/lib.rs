// Reservation & Availability Engine - API Core
//
// Backend API for seat and time-slot reservations over a shared event/venue
// catalog: time-bounded holds, duplicate-submission guards, and a waitlist
// cascade on cancellation. The Postgres ledger is the synchronization point;
// request handlers are stateless.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
