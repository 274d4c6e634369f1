//! Record store: the `courses` and `students` collections.
//!
//! Workers and request handlers share one store handle (`Arc<dyn RecordStore>`);
//! implementations must be safe for concurrent use.

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod store;

pub use in_memory::InMemoryRecordStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresRecordStore;
pub use store::{RecordStore, StoreError, UpdateOutcome};
