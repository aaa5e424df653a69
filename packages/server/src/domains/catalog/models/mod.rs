mod venue_listing;

pub use venue_listing::{VenueListing, STATUS_AVAILABLE, STATUS_BOOKED};
