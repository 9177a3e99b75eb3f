//! Storage backends for zoo records.
//!
//! The zoo talks to storage only through [`ZooStore`]. The in-memory backend
//! is always available; the durable backend sits behind the `persistent`
//! cargo feature.

mod memory;
mod traits;

#[cfg(feature = "persistent")]
pub mod persistent;

pub use memory::InMemoryZooStore;
pub use traits::{Placement, StorageError, ZooAttributes, ZooStore};

#[cfg(feature = "persistent")]
pub use persistent::{open_database, PersistentConfig, PersistentZooStore};
