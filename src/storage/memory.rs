//! In-memory storage backend.
//!
//! This module provides a thread-safe in-memory implementation of
//! [`ZooStore`]. It is intended for tests, throwaway sessions, and as the
//! index the persistent backend replays its log into.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::animal::{Animal, AnimalId};
use crate::habitat::{Habitat, HabitatId};
use crate::storage::traits::{Placement, StorageError, ZooAttributes, ZooStore};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::Backend(format!("poisoned lock: {context}"))
}

/// Every record a backend holds, in save order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct ZooRecords {
    pub attributes: ZooAttributes,
    pub habitats: Vec<Habitat>,
    pub animals: Vec<Animal>,
    pub placements: Vec<Placement>,
}

impl ZooRecords {
    fn animal_mut(&mut self, id: AnimalId) -> Result<&mut Animal, StorageError> {
        self.animals
            .iter_mut()
            .find(|a| a.id() == id)
            .ok_or(StorageError::AnimalNotFound(id))
    }

    fn habitat_mut(&mut self, id: HabitatId) -> Result<&mut Habitat, StorageError> {
        self.habitats
            .iter_mut()
            .find(|h| h.id() == id)
            .ok_or(StorageError::HabitatNotFound(id))
    }

    pub fn insert_animal(&mut self, animal: &Animal) -> Result<(), StorageError> {
        if self.animals.iter().any(|a| a.id() == animal.id()) {
            return Err(StorageError::DuplicateKey(animal.id().to_string()));
        }
        self.animals.push(animal.clone());
        Ok(())
    }

    pub fn insert_habitat(&mut self, habitat: &Habitat) -> Result<(), StorageError> {
        if self.habitats.iter().any(|h| h.id() == habitat.id()) {
            return Err(StorageError::DuplicateKey(habitat.id().to_string()));
        }
        // Residents are tracked as placements, never inside the habitat record.
        let mut record = Habitat::with_id(habitat.id(), habitat.name(), habitat.climate());
        record.set_used(habitat.is_used());
        self.habitats.push(record);
        Ok(())
    }

    pub fn set_animal_used(&mut self, id: AnimalId, used: bool) -> Result<(), StorageError> {
        self.animal_mut(id)?.set_used(used);
        Ok(())
    }

    pub fn set_habitat_used(&mut self, id: HabitatId, used: bool) -> Result<(), StorageError> {
        self.habitat_mut(id)?.set_used(used);
        Ok(())
    }

    pub fn set_habitat_name(&mut self, id: HabitatId, name: &str) -> Result<(), StorageError> {
        self.habitat_mut(id)?.rename(name);
        Ok(())
    }

    pub fn set_attributes(&mut self, balance: u32, current_day: u32) {
        self.attributes = ZooAttributes {
            balance: Some(balance),
            current_day: Some(current_day),
        };
    }

    pub fn add_placement(&mut self, placement: Placement) {
        if !self.placements.contains(&placement) {
            self.placements.push(placement);
        }
    }

    pub fn remove_placement(&mut self, placement: Placement) {
        self.placements.retain(|p| *p != placement);
    }
}

/// Thread-safe in-memory zoo store.
#[derive(Debug, Default)]
pub struct InMemoryZooStore {
    state: RwLock<ZooRecords>,
}

impl InMemoryZooStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(
        &self,
        context: &'static str,
        f: impl FnOnce(&ZooRecords) -> T,
    ) -> Result<T, StorageError> {
        let state = self.state.read().map_err(|_| lock_err(context))?;
        Ok(f(&state))
    }

    fn write<T>(
        &self,
        context: &'static str,
        f: impl FnOnce(&mut ZooRecords) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut state = self.state.write().map_err(|_| lock_err(context))?;
        f(&mut state)
    }
}

impl ZooStore for InMemoryZooStore {
    fn load_zoo_attributes(&self) -> Result<ZooAttributes, StorageError> {
        self.read("zoo.load_attributes", |s| s.attributes)
    }

    fn load_habitats(&self) -> Result<Vec<Habitat>, StorageError> {
        self.read("habitat.load", |s| s.habitats.clone())
    }

    fn load_animals(&self) -> Result<Vec<Animal>, StorageError> {
        self.read("animal.load", |s| s.animals.clone())
    }

    fn load_associations(&self) -> Result<Vec<Placement>, StorageError> {
        self.read("placement.load", |s| s.placements.clone())
    }

    fn save_animal(&self, animal: &Animal) -> Result<(), StorageError> {
        self.write("animal.insert", |s| s.insert_animal(animal))
    }

    fn save_habitat(&self, habitat: &Habitat) -> Result<(), StorageError> {
        self.write("habitat.insert", |s| s.insert_habitat(habitat))
    }

    fn update_animal_used(&self, id: AnimalId, used: bool) -> Result<(), StorageError> {
        self.write("animal.update_used", |s| s.set_animal_used(id, used))
    }

    fn update_habitat_used(&self, id: HabitatId, used: bool) -> Result<(), StorageError> {
        self.write("habitat.update_used", |s| s.set_habitat_used(id, used))
    }

    fn update_habitat_name(&self, id: HabitatId, name: &str) -> Result<(), StorageError> {
        self.write("habitat.update_name", |s| s.set_habitat_name(id, name))
    }

    fn update_zoo_attributes(&self, balance: u32, current_day: u32) -> Result<(), StorageError> {
        self.write("zoo.update_attributes", |s| {
            s.set_attributes(balance, current_day);
            Ok(())
        })
    }

    fn save_association(&self, placement: Placement) -> Result<(), StorageError> {
        self.write("placement.insert", |s| {
            s.add_placement(placement);
            Ok(())
        })
    }

    fn remove_association(&self, placement: Placement) -> Result<(), StorageError> {
        self.write("placement.delete", |s| {
            s.remove_placement(placement);
            Ok(())
        })
    }
}
