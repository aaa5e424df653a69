// Kernel: infrastructure shared by all domains

pub mod deps;
pub mod scheduled_tasks;
pub mod test_dependencies;
pub mod traits;

pub use deps::{
    HoldPolicy, PgCatalogStore, PgNotificationStore, PgReservationStore, ServerDeps,
};
pub use traits::{BaseCatalogStore, BaseNotificationStore, BaseReservationStore};
