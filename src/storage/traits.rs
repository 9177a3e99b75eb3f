//! Abstract storage trait for menagerie.
//!
//! The zoo persists through this trait only, so backends can be swapped:
//! - In-memory backend for tests and throwaway sessions
//! - Persistent WAL backend (feature `persistent`) for durable saves

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animal::{Animal, AnimalId};
use crate::habitat::{Habitat, HabitatId};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Animal not found.
    #[error("Animal not found: {0}")]
    AnimalNotFound(AnimalId),

    /// Habitat not found.
    #[error("Habitat not found: {0}")]
    HabitatNotFound(HabitatId),

    /// Key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Stored records contradict each other.
    #[error("Corrupt data: {0}")]
    Corrupt(String),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File system failure.
    #[error("I/O error: {0}")]
    Io(String),
}

/// The zoo-wide scalar attributes.
///
/// A field is `None` when the backend has never recorded it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZooAttributes {
    /// Last recorded balance.
    pub balance: Option<u32>,
    /// Last recorded day.
    pub current_day: Option<u32>,
}

/// A record that an animal lives in a habitat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// The resident.
    pub animal_id: AnimalId,
    /// The habitat it lives in.
    pub habitat_id: HabitatId,
}

impl Placement {
    /// Creates a placement record.
    #[must_use]
    pub const fn new(animal_id: AnimalId, habitat_id: HabitatId) -> Self {
        Self {
            animal_id,
            habitat_id,
        }
    }
}

/// Storage trait for zoo records, keyed by entity ID.
///
/// Loads return records in the order they were first saved. Habitats are
/// returned without residents; residents are rebuilt from
/// [`ZooStore::load_associations`].
pub trait ZooStore: Send + Sync {
    /// Read the stored balance and day.
    fn load_zoo_attributes(&self) -> Result<ZooAttributes, StorageError>;

    /// Read every stored habitat.
    fn load_habitats(&self) -> Result<Vec<Habitat>, StorageError>;

    /// Read every stored animal.
    fn load_animals(&self) -> Result<Vec<Animal>, StorageError>;

    /// Read every animal-in-habitat placement.
    fn load_associations(&self) -> Result<Vec<Placement>, StorageError>;

    /// Insert a new animal. Returns error if the ID already exists.
    fn save_animal(&self, animal: &Animal) -> Result<(), StorageError>;

    /// Insert a new habitat. Returns error if the ID already exists.
    fn save_habitat(&self, habitat: &Habitat) -> Result<(), StorageError>;

    /// Set an animal's used flag. Returns error if not found.
    fn update_animal_used(&self, id: AnimalId, used: bool) -> Result<(), StorageError>;

    /// Set a habitat's used flag. Returns error if not found.
    fn update_habitat_used(&self, id: HabitatId, used: bool) -> Result<(), StorageError>;

    /// Rename a habitat. Returns error if not found.
    fn update_habitat_name(&self, id: HabitatId, name: &str) -> Result<(), StorageError>;

    /// Overwrite the balance and day together.
    fn update_zoo_attributes(&self, balance: u32, current_day: u32) -> Result<(), StorageError>;

    /// Record a placement. Recording the same placement twice is a no-op.
    fn save_association(&self, placement: Placement) -> Result<(), StorageError>;

    /// Forget a placement. Forgetting an unknown placement is a no-op.
    fn remove_association(&self, placement: Placement) -> Result<(), StorageError>;
}
