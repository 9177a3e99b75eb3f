//! # Menagerie - a zoo management simulation core
//!
//! Menagerie decides which animals may legally share a habitat and runs the
//! zoo's day-by-day economy: a balance fed by visitors, a rotating shop, and
//! purchases that turn shop stock into owned animals and habitats.
//!
//! ## Core Concepts
//!
//! - **Species**: a closed catalog; each species knows its climates and its prey
//! - **Habitat**: a named enclosure with a fixed climate and a resident list
//! - **Shop**: a bounded inventory restocked by weighted random draws
//! - **Zoo**: the state machine owning balance, day, habitats, animals and the shop
//!
//! Persistence, journaling and randomness are injected collaborators:
//! [`ZooStore`], [`EventLog`] and [`RandomSource`].
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use menagerie::{
//!     Animal, InMemoryZooStore, MemoryJournal, Species, StdRandom, Zoo, ZooConfig,
//! };
//!
//! let journal = Arc::new(MemoryJournal::new());
//! let mut zoo = Zoo::open(
//!     ZooConfig::default(),
//!     Arc::new(InMemoryZooStore::new()),
//!     journal.clone(),
//!     Box::new(StdRandom::seeded(7)),
//! )?;
//!
//! let habitat = zoo.habitats()[0].id();
//! zoo.activate_habitat(habitat)?;
//!
//! let panda = zoo.register_new_animal(Animal::new(Species::RedPanda, 100, 5000, 55.0));
//! assert!(zoo.add_animal_to_habitat(panda, habitat)?);
//! assert_eq!(zoo.total_attraction(), 80);
//!
//! let outcome = zoo.advance_day();
//! assert_eq!(outcome.report().map(|r| r.day), Some(2));
//! # Ok::<(), menagerie::ZooError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Domain types
pub mod animal;
pub mod climate;
pub mod compatibility;
pub mod error;
pub mod habitat;
pub mod shop;

// Collaborators
pub mod journal;
pub mod rng;
pub mod storage;

// State machine
pub mod config;
pub mod zoo;

// Re-export primary types at crate root for convenience
pub use animal::{Animal, AnimalId, AnimalLookup, AnimalType, Species, SpeciesProfile};
pub use climate::Climate;
pub use config::ZooConfig;
pub use error::{ZooError, ZooResult};
pub use habitat::{Habitat, HabitatId};
pub use journal::{CsvJournal, EventLog, MemoryJournal, NullJournal};
pub use rng::{RandomSource, ScriptedRandom, StdRandom};
pub use shop::{Product, ProductId, Shop};
pub use storage::{InMemoryZooStore, Placement, StorageError, ZooAttributes, ZooStore};
pub use zoo::{DayOutcome, DayReport, PurchaseOutcome, PurchaseReceipt, Zoo};
