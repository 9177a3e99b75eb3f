//! Habitats: named enclosures with a fixed climate and a resident list.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::animal::{Animal, AnimalId, AnimalLookup};
use crate::climate::Climate;
use crate::error::{ZooError, ZooResult};

/// Globally unique, stable habitat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitatId(Uuid);

impl HabitatId {
    /// Creates a new random habitat ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a habitat ID from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for HabitatId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An enclosure the zoo can place animals in.
///
/// A habitat only stores the IDs of its residents. Placement rules that need
/// the full animal records take an [`AnimalLookup`] from the caller.
///
/// Invariant: every resident could live in `climate` and coexisted with every
/// other resident at the moment it was admitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habitat {
    id: HabitatId,
    name: String,
    climate: Climate,
    #[serde(default)]
    used: bool,
    /// Rebuilt from placement rows on load.
    #[serde(skip)]
    residents: Vec<AnimalId>,
}

impl Habitat {
    /// Creates a new, unused, empty habitat.
    ///
    /// # Examples
    ///
    /// ```
    /// use menagerie::{Climate, Habitat};
    ///
    /// let habitat = Habitat::new("North Paddock", Climate::Temperate);
    /// assert_eq!(habitat.cost(), 150);
    /// assert!(habitat.residents().is_empty());
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, climate: Climate) -> Self {
        Self::with_id(HabitatId::new(), name, climate)
    }

    /// Creates a new habitat with a specific ID.
    #[must_use]
    pub fn with_id(id: HabitatId, name: impl Into<String>, climate: Climate) -> Self {
        Self {
            id,
            name: name.into(),
            climate,
            used: false,
            residents: Vec::new(),
        }
    }

    /// Returns the habitat's ID.
    #[must_use]
    pub const fn id(&self) -> HabitatId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Changes the display name. The climate can never change.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The fixed climate.
    #[must_use]
    pub const fn climate(&self) -> Climate {
        self.climate
    }

    /// True while the habitat is part of the zoo's active set.
    #[must_use]
    pub const fn is_used(&self) -> bool {
        self.used
    }

    pub(crate) fn set_used(&mut self, used: bool) {
        self.used = used;
    }

    /// Purchase price; depends on the climate only.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.climate.habitat_cost()
    }

    /// Resident IDs in admission order.
    #[must_use]
    pub fn residents(&self) -> &[AnimalId] {
        &self.residents
    }

    /// True if the animal lives here.
    #[must_use]
    pub fn contains(&self, id: AnimalId) -> bool {
        self.residents.contains(&id)
    }

    /// Checks whether `animal` may be admitted without changing anything.
    ///
    /// The climate is checked first, then each resident in admission order;
    /// the first failure is reported.
    ///
    /// # Errors
    /// - `IncompatibleClimate` if the species cannot live in this climate
    /// - `IncompatibleResident` if the animal and an existing resident cannot coexist
    pub fn check_admission<L>(&self, animal: &Animal, roster: &L) -> ZooResult<()>
    where
        L: AnimalLookup + ?Sized,
    {
        if !animal.can_live_in(self.climate) {
            return Err(ZooError::IncompatibleClimate {
                animal: animal.name().to_string(),
                climate: self.climate,
            });
        }

        for resident in self.residents.iter().filter_map(|&id| roster.animal(id)) {
            if resident.id() == animal.id() {
                continue;
            }
            if !animal.can_coexist(resident) {
                return Err(ZooError::IncompatibleResident {
                    animal: animal.name().to_string(),
                    resident: resident.name().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Admits `animal` if it passes [`Habitat::check_admission`].
    ///
    /// Admitting an animal that is already a resident is a no-op. On error the
    /// resident list is untouched.
    ///
    /// # Errors
    /// Same as [`Habitat::check_admission`].
    pub fn add_animal<L>(&mut self, animal: &Animal, roster: &L) -> ZooResult<()>
    where
        L: AnimalLookup + ?Sized,
    {
        self.check_admission(animal, roster)?;
        if !self.contains(animal.id()) {
            self.residents.push(animal.id());
        }
        Ok(())
    }

    /// Removes a resident. Returns false if the animal was not living here.
    pub fn remove_animal(&mut self, id: AnimalId) -> bool {
        let before = self.residents.len();
        self.residents.retain(|&r| r != id);
        self.residents.len() != before
    }

    /// Takes every resident out at once, returning them in admission order.
    pub(crate) fn evict_all(&mut self) -> Vec<AnimalId> {
        std::mem::take(&mut self.residents)
    }

    /// Re-attaches a resident recorded in storage without re-checking rules.
    pub(crate) fn restore_resident(&mut self, id: AnimalId) {
        if !self.contains(id) {
            self.residents.push(id);
        }
    }

    /// Sum of the residents' attraction scores; zero when empty.
    #[must_use]
    pub fn attraction_score<L>(&self, roster: &L) -> u32
    where
        L: AnimalLookup + ?Sized,
    {
        self.residents
            .iter()
            .filter_map(|&id| roster.animal(id))
            .fold(0u32, |acc, a| acc.saturating_add(a.attraction_score()))
    }
}

impl fmt::Display for Habitat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.climate, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animal::Species;

    fn roster(animals: &[&Animal]) -> Vec<Animal> {
        animals.iter().map(|&a| a.clone()).collect()
    }

    #[test]
    fn test_add_compatible_animal() {
        let mut habitat = Habitat::new("Bamboo Grove", Climate::Temperate);
        let panda = Animal::new(Species::RedPanda, 100, 5000, 55.0);
        let animals = roster(&[&panda]);

        habitat.add_animal(&panda, &animals).unwrap();
        assert_eq!(habitat.residents(), &[panda.id()]);
    }

    #[test]
    fn test_climate_checked_before_residents() {
        let mut habitat = Habitat::new("Glacier", Climate::Polar);
        let boar = Animal::new(Species::WildBoar, 10, 80_000, 90.0);
        let animals = roster(&[&boar]);

        let err = habitat.add_animal(&boar, &animals).unwrap_err();
        assert!(matches!(err, ZooError::IncompatibleClimate { climate: Climate::Polar, .. }));
        assert!(habitat.residents().is_empty());
    }

    #[test]
    fn test_conflicting_resident_is_named() {
        let mut habitat = Habitat::new("Mixed", Climate::Temperate);
        let leopard = Animal::new(Species::Leopard, 100, 35_000, 210.0);
        let panda = Animal::new(Species::RedPanda, 100, 5000, 55.0);
        let animals = roster(&[&leopard, &panda]);

        habitat.add_animal(&leopard, &animals).unwrap();
        let err = habitat.add_animal(&panda, &animals).unwrap_err();
        match err {
            ZooError::IncompatibleResident { animal, resident } => {
                assert_eq!(animal, "Red Panda");
                assert_eq!(resident, "Leopard");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(habitat.residents(), &[leopard.id()]);
    }

    #[test]
    fn test_first_conflicting_resident_wins() {
        let mut habitat = Habitat::new("Swamp", Climate::Temperate);
        let boar = Animal::new(Species::WildBoar, 10, 80_000, 90.0);
        let leopard = Animal::new(Species::Leopard, 10, 35_000, 210.0);
        let gator = Animal::new(Species::ChineseAlligator, 10, 30_000, 150.0);
        let animals = roster(&[&boar, &leopard, &gator]);

        habitat.add_animal(&boar, &animals).unwrap();
        habitat.add_animal(&leopard, &animals).unwrap();
        let err = habitat.add_animal(&gator, &animals).unwrap_err();
        assert_eq!(err.to_string(), "Chinese Alligator cannot coexist with Wild Boar");
        assert_eq!(habitat.residents().len(), 2);
    }

    #[test]
    fn test_adding_resident_twice_is_noop() {
        let mut habitat = Habitat::new("Pen", Climate::Continental);
        let boar = Animal::new(Species::WildBoar, 10, 80_000, 90.0);
        let animals = roster(&[&boar]);

        habitat.add_animal(&boar, &animals).unwrap();
        habitat.add_animal(&boar, &animals).unwrap();
        assert_eq!(habitat.residents().len(), 1);
    }

    #[test]
    fn test_remove_animal() {
        let mut habitat = Habitat::new("Pen", Climate::Continental);
        let boar = Animal::new(Species::WildBoar, 10, 80_000, 90.0);
        let animals = roster(&[&boar]);
        habitat.add_animal(&boar, &animals).unwrap();

        assert!(habitat.remove_animal(boar.id()));
        assert!(!habitat.remove_animal(boar.id()));
        assert!(habitat.residents().is_empty());
    }

    #[test]
    fn test_attraction_score() {
        let mut habitat = Habitat::new("Pen", Climate::Temperate);
        let animals = roster(&[]);
        assert_eq!(habitat.attraction_score(&animals), 0);

        let boar = Animal::new(Species::WildBoar, 10, 80_000, 90.0);
        let other = Animal::new(Species::WildBoar, 12, 81_000, 91.0);
        let animals = roster(&[&boar, &other]);
        habitat.add_animal(&boar, &animals).unwrap();
        habitat.add_animal(&other, &animals).unwrap();
        assert_eq!(habitat.attraction_score(&animals), 40);
    }

    #[test]
    fn test_residents_not_serialized() {
        let mut habitat = Habitat::new("Pen", Climate::Temperate);
        habitat.restore_resident(AnimalId::new());
        habitat.set_used(true);

        let json = serde_json::to_string(&habitat).unwrap();
        let back: Habitat = serde_json::from_str(&json).unwrap();
        assert!(back.residents().is_empty());
        assert!(back.is_used());
        assert_eq!(back.id(), habitat.id());
    }
}
