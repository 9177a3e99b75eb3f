//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use menagerie::{
    Animal, Climate, EventLog, Habitat, HabitatId, InMemoryZooStore, RandomSource,
    ScriptedRandom, Species, Zoo, ZooConfig, ZooStore,
};

/// Opens a zoo with default configuration over the given collaborators.
pub fn open_zoo(
    store: Arc<dyn ZooStore>,
    journal: Arc<dyn EventLog>,
    rng: impl RandomSource + 'static,
) -> Zoo {
    Zoo::open(ZooConfig::default(), store, journal, Box::new(rng)).unwrap()
}

/// A zoo over a fresh in-memory store with a scripted generator.
pub fn scripted_zoo(rng: ScriptedRandom) -> Zoo {
    open_zoo(
        Arc::new(InMemoryZooStore::new()),
        Arc::new(menagerie::NullJournal),
        rng,
    )
}

/// Registers and activates a habitat.
pub fn active_habitat(zoo: &mut Zoo, climate: Climate) -> HabitatId {
    let id = zoo.register_new_habitat(Habitat::new(climate.default_habitat_name(), climate));
    zoo.activate_habitat(id).unwrap();
    id
}

pub fn red_panda() -> Animal {
    Animal::new(Species::RedPanda, 100, 5000, 55.0)
}

pub fn small_bird() -> Animal {
    Animal::new(Species::AfricanPygmyGoose, 1, 40, 10.0)
}
