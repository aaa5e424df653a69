mod project;

pub use project::{
    project_availability, resolve_capacity, Availability, UnitAvailability, UnitStatus,
    DEFAULT_EVENT_CAPACITY,
};
