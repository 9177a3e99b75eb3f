//! The zoo state machine.
//!
//! [`Zoo`] owns the balance, the day counter, every habitat and animal, and
//! the shop. All mutation goes through its methods, which apply the change
//! in memory, write it through to the [`ZooStore`], and describe it to the
//! [`EventLog`].
//!
//! Persistence failures are absorbed: the in-memory change is kept and the
//! failure is reported through `log`. The exceptions are the balance and day
//! writes made by [`Zoo::advance_day`] and [`Zoo::purchase_product`], which
//! roll back when the store refuses them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::animal::{Animal, AnimalId};
use crate::config::ZooConfig;
use crate::error::{ZooError, ZooResult};
use crate::habitat::{Habitat, HabitatId};
use crate::journal::{EventLog, NullJournal};
use crate::rng::{RandomSource, StdRandom};
use crate::shop::{Product, ProductId, Shop};
use crate::storage::{InMemoryZooStore, Placement, StorageError, ZooStore};

/// What happened when the zoo moved to the next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayReport {
    /// The new current day.
    pub day: u32,
    /// Visitors drawn for the day.
    pub visitors: u32,
    /// Balance earned from `visitors`.
    pub revenue: u32,
    /// Whether the shop was restocked.
    pub shop_refilled: bool,
}

/// Result of [`Zoo::advance_day`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[must_use]
pub enum DayOutcome {
    /// The zoo moved to the next day.
    Advanced(DayReport),
    /// The store refused the new balance and day; nothing changed.
    RolledBack,
}

impl DayOutcome {
    /// The report, if the day actually advanced.
    #[must_use]
    pub const fn report(&self) -> Option<&DayReport> {
        match self {
            Self::Advanced(report) => Some(report),
            Self::RolledBack => None,
        }
    }
}

/// Record of a completed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseReceipt {
    /// What was bought.
    pub product: ProductId,
    /// Display name of the bought item.
    pub name: String,
    /// Price paid.
    pub cost: u32,
    /// Balance left after paying.
    pub balance_after: u32,
}

/// Result of a purchase that passed the balance check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[must_use]
pub enum PurchaseOutcome {
    /// The product was paid for and registered.
    Purchased(PurchaseReceipt),
    /// The store refused the new balance; the balance and the shop are unchanged.
    RolledBack,
}

impl PurchaseOutcome {
    /// The receipt, if the purchase went through.
    #[must_use]
    pub const fn receipt(&self) -> Option<&PurchaseReceipt> {
        match self {
            Self::Purchased(receipt) => Some(receipt),
            Self::RolledBack => None,
        }
    }
}

/// State restored from a store.
struct Restored {
    balance: u32,
    current_day: u32,
    habitats: Vec<Habitat>,
    animals: Vec<Animal>,
}

fn restore(store: &dyn ZooStore) -> ZooResult<Restored> {
    let attributes = store.load_zoo_attributes()?;
    let balance = attributes
        .balance
        .ok_or_else(|| ZooError::missing_attribute("balance"))?;
    let current_day = attributes
        .current_day
        .ok_or_else(|| ZooError::missing_attribute("current_day"))?;

    let mut habitats = store.load_habitats()?;
    let mut animals = store.load_animals()?;

    let mut placed: HashSet<AnimalId> = HashSet::new();
    for placement in store.load_associations()? {
        if !animals.iter().any(|a| a.id() == placement.animal_id) {
            return Err(StorageError::Corrupt(format!(
                "placement references unknown animal {}",
                placement.animal_id
            ))
            .into());
        }
        let habitat = habitats
            .iter_mut()
            .find(|h| h.id() == placement.habitat_id)
            .ok_or_else(|| {
                StorageError::Corrupt(format!(
                    "placement references unknown habitat {}",
                    placement.habitat_id
                ))
            })?;
        if !placed.insert(placement.animal_id) {
            return Err(StorageError::Corrupt(format!(
                "animal {} is placed in more than one habitat",
                placement.animal_id
            ))
            .into());
        }
        habitat.restore_resident(placement.animal_id);
    }

    // Placements decide the used flag; the two are written separately.
    for animal in &mut animals {
        let used = placed.contains(&animal.id());
        if animal.is_used() != used {
            log::warn!(
                "animal {} has used={} but {} placement; restoring used={used}",
                animal.id(),
                animal.is_used(),
                if used { "a" } else { "no" }
            );
            animal.set_used(used);
        }
    }

    Ok(Restored {
        balance,
        current_day,
        habitats,
        animals,
    })
}

impl Restored {
    fn defaults(config: &ZooConfig) -> Self {
        Self {
            balance: config.starting_balance,
            current_day: config.starting_day,
            habitats: vec![Habitat::new(
                &config.default_habitat_name,
                config.default_habitat_climate,
            )],
            animals: Vec::new(),
        }
    }
}

/// Writes fresh defaults to `store`.
///
/// The habitats are only written once the attributes are stored; until then
/// every open sees a missing attribute and starts over.
fn persist_defaults(store: &dyn ZooStore, state: &Restored) {
    if let Err(e) = store.update_zoo_attributes(state.balance, state.current_day) {
        log::warn!("could not persist default zoo attributes, skipping default habitats: {e}");
        return;
    }
    for habitat in &state.habitats {
        if let Err(e) = store.save_habitat(habitat) {
            log::warn!("could not persist default habitat {habitat}: {e}");
        }
    }
}

/// The zoo: one explicitly constructed context owning all game state.
///
/// A `Zoo` is single-threaded. An embedding that shares it between threads
/// must wrap it in a `Mutex`.
pub struct Zoo {
    config: ZooConfig,
    balance: u32,
    current_day: u32,
    habitats: Vec<Habitat>,
    animals: Vec<Animal>,
    shop: Shop,
    store: Arc<dyn ZooStore>,
    journal: Arc<dyn EventLog>,
    rng: Box<dyn RandomSource>,
}

impl fmt::Debug for Zoo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zoo")
            .field("balance", &self.balance)
            .field("current_day", &self.current_day)
            .field("habitats", &self.habitats.len())
            .field("animals", &self.animals.len())
            .field("shop", &self.shop.len())
            .finish_non_exhaustive()
    }
}

impl Zoo {
    /// Restores a zoo from `store`, or starts a fresh one.
    ///
    /// If the store is missing an attribute, or its records contradict each
    /// other, the zoo starts from the configured defaults instead. Defaults
    /// are written back to a store that was merely missing data, so the next
    /// open restores them; a store holding contradictory records is left
    /// untouched. The shop is stocked either way.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if `config` fails validation. Store failures
    /// never fail construction.
    pub fn open(
        config: ZooConfig,
        store: Arc<dyn ZooStore>,
        journal: Arc<dyn EventLog>,
        rng: Box<dyn RandomSource>,
    ) -> ZooResult<Self> {
        let config = config.validate()?;

        let state = match restore(store.as_ref()) {
            Ok(restored) => {
                log::info!(
                    "restored zoo on day {} with {} habitats and {} animals",
                    restored.current_day,
                    restored.habitats.len(),
                    restored.animals.len()
                );
                restored
            }
            Err(e) => {
                log::warn!("could not restore zoo, reverting to defaults: {e}");
                let defaults = Restored::defaults(&config);
                if matches!(e, ZooError::MissingPersistedAttribute { .. }) {
                    persist_defaults(store.as_ref(), &defaults);
                }
                defaults
            }
        };

        Ok(Self::assemble(config, state, store, journal, rng))
    }

    /// A zoo with default configuration, an in-memory store, no journal, and
    /// a seeded generator. Handy for tests and demos.
    #[must_use]
    pub fn in_memory(seed: u64) -> Self {
        let config = ZooConfig::default();
        let store: Arc<dyn ZooStore> = Arc::new(InMemoryZooStore::new());
        let state = Restored::defaults(&config);
        persist_defaults(store.as_ref(), &state);
        Self::assemble(
            config,
            state,
            store,
            Arc::new(NullJournal),
            Box::new(StdRandom::seeded(seed)),
        )
    }

    fn assemble(
        config: ZooConfig,
        state: Restored,
        store: Arc<dyn ZooStore>,
        journal: Arc<dyn EventLog>,
        mut rng: Box<dyn RandomSource>,
    ) -> Self {
        let mut shop = Shop::new(config.shop_capacity);
        shop.refill(rng.as_mut());
        Self {
            config,
            balance: state.balance,
            current_day: state.current_day,
            habitats: state.habitats,
            animals: state.animals,
            shop,
            store,
            journal,
            rng,
        }
    }

    fn persist(&self, what: &str, result: Result<(), StorageError>) {
        if let Err(e) = result {
            log::warn!("could not persist {what}: {e}");
        }
    }

    fn habitat_index(&self, id: HabitatId) -> ZooResult<usize> {
        self.habitats
            .iter()
            .position(|h| h.id() == id)
            .ok_or(ZooError::UnknownHabitat { id })
    }

    fn animal_index(&self, id: AnimalId) -> ZooResult<usize> {
        self.animals
            .iter()
            .position(|a| a.id() == id)
            .ok_or(ZooError::UnknownAnimal { id })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> u32 {
        self.balance
    }

    /// Current day, starting from the configured first day.
    #[must_use]
    pub const fn current_day(&self) -> u32 {
        self.current_day
    }

    /// The validated configuration.
    #[must_use]
    pub const fn config(&self) -> &ZooConfig {
        &self.config
    }

    /// Every owned habitat, in the order it was acquired.
    #[must_use]
    pub fn habitats(&self) -> &[Habitat] {
        &self.habitats
    }

    /// Every owned animal, in the order it was acquired.
    #[must_use]
    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    /// Habitats in the active set.
    pub fn used_habitats(&self) -> impl Iterator<Item = &Habitat> {
        self.habitats.iter().filter(|h| h.is_used())
    }

    /// Owned habitats outside the active set.
    pub fn unused_habitats(&self) -> impl Iterator<Item = &Habitat> {
        self.habitats.iter().filter(|h| !h.is_used())
    }

    /// Animals not placed in any habitat.
    pub fn unused_animals(&self) -> impl Iterator<Item = &Animal> {
        self.animals.iter().filter(|a| !a.is_used())
    }

    /// Looks up an owned habitat.
    #[must_use]
    pub fn habitat(&self, id: HabitatId) -> Option<&Habitat> {
        self.habitats.iter().find(|h| h.id() == id)
    }

    /// Looks up an owned animal.
    #[must_use]
    pub fn animal(&self, id: AnimalId) -> Option<&Animal> {
        self.animals.iter().find(|a| a.id() == id)
    }

    /// The animals living in a habitat, in admission order.
    ///
    /// # Errors
    /// Returns `UnknownHabitat` if the zoo does not own the habitat.
    pub fn residents_of(&self, id: HabitatId) -> ZooResult<Vec<&Animal>> {
        let habitat = &self.habitats[self.habitat_index(id)?];
        Ok(habitat
            .residents()
            .iter()
            .filter_map(|&r| self.animal(r))
            .collect())
    }

    /// Today's shop.
    #[must_use]
    pub const fn shop(&self) -> &Shop {
        &self.shop
    }

    /// Sum of attraction scores over active habitats.
    #[must_use]
    pub fn total_attraction(&self) -> u32 {
        self.used_habitats()
            .fold(0u32, |acc, h| acc.saturating_add(h.attraction_score(&self.animals)))
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Places an unused animal in an active habitat.
    ///
    /// Returns `Ok(false)` without changing anything if the habitat is not
    /// active or the animal is already placed.
    ///
    /// # Errors
    /// - `UnknownHabitat` / `UnknownAnimal` if the zoo does not own them
    /// - `IncompatibleClimate` / `IncompatibleResident` if the habitat refuses
    ///   the animal; nothing changes
    pub fn add_animal_to_habitat(
        &mut self,
        animal_id: AnimalId,
        habitat_id: HabitatId,
    ) -> ZooResult<bool> {
        let h = self.habitat_index(habitat_id)?;
        let a = self.animal_index(animal_id)?;
        if !self.habitats[h].is_used() || self.animals[a].is_used() {
            return Ok(false);
        }

        self.habitats[h].add_animal(&self.animals[a], &self.animals)?;
        self.animals[a].set_used(true);

        self.persist("animal used flag", self.store.update_animal_used(animal_id, true));
        self.persist(
            "placement",
            self.store
                .save_association(Placement::new(animal_id, habitat_id)),
        );
        self.journal.log_message(&format!(
            "Added the animal: {} to the habitat: {}.",
            self.animals[a], self.habitats[h]
        ));
        Ok(true)
    }

    /// Takes an animal out of an active habitat and returns it to the unused pool.
    ///
    /// Returns `Ok(false)` without changing anything if the habitat is not
    /// active or the animal does not live there.
    ///
    /// # Errors
    /// `UnknownHabitat` / `UnknownAnimal` if the zoo does not own them.
    pub fn remove_animal_from_habitat(
        &mut self,
        animal_id: AnimalId,
        habitat_id: HabitatId,
    ) -> ZooResult<bool> {
        let h = self.habitat_index(habitat_id)?;
        let a = self.animal_index(animal_id)?;
        if !self.habitats[h].is_used() || !self.habitats[h].contains(animal_id) {
            return Ok(false);
        }

        self.habitats[h].remove_animal(animal_id);
        self.animals[a].set_used(false);

        self.persist("animal used flag", self.store.update_animal_used(animal_id, false));
        self.persist(
            "placement removal",
            self.store
                .remove_association(Placement::new(animal_id, habitat_id)),
        );
        self.journal.log_message(&format!(
            "Removed the animal: {} from the habitat: {}.",
            self.animals[a], self.habitats[h]
        ));
        Ok(true)
    }

    /// Moves a habitat into the active set. Activating an active habitat is a no-op.
    ///
    /// # Errors
    /// `UnknownHabitat` if the zoo does not own it.
    pub fn activate_habitat(&mut self, id: HabitatId) -> ZooResult<()> {
        let h = self.habitat_index(id)?;
        if self.habitats[h].is_used() {
            return Ok(());
        }

        self.habitats[h].set_used(true);
        self.persist("habitat used flag", self.store.update_habitat_used(id, true));
        self.journal
            .log_message(&format!("Now using the habitat: {}.", self.habitats[h]));
        Ok(())
    }

    /// Takes a habitat out of the active set, evicting every resident.
    ///
    /// Evicted animals return to the unused pool. Returns the evicted IDs in
    /// admission order.
    ///
    /// # Errors
    /// `UnknownHabitat` if the zoo does not own it.
    pub fn deactivate_habitat(&mut self, id: HabitatId) -> ZooResult<Vec<AnimalId>> {
        let h = self.habitat_index(id)?;
        let was_used = self.habitats[h].is_used();

        let evicted = self.habitats[h].evict_all();
        for &animal_id in &evicted {
            if let Some(animal) = self.animals.iter_mut().find(|a| a.id() == animal_id) {
                animal.set_used(false);
            }
            self.persist(
                "animal used flag",
                self.store.update_animal_used(animal_id, false),
            );
            self.persist(
                "placement removal",
                self.store.remove_association(Placement::new(animal_id, id)),
            );
        }

        if was_used {
            self.habitats[h].set_used(false);
            self.persist("habitat used flag", self.store.update_habitat_used(id, false));
        }
        if was_used || !evicted.is_empty() {
            self.journal
                .log_message(&format!("Now the habitat is unused: {}.", self.habitats[h]));
        }
        Ok(evicted)
    }

    /// Changes a habitat's display name.
    ///
    /// # Errors
    /// `UnknownHabitat` if the zoo does not own it.
    pub fn rename_habitat(&mut self, id: HabitatId, name: impl Into<String>) -> ZooResult<()> {
        let h = self.habitat_index(id)?;
        let name = name.into();
        let previous = self.habitats[h].name().to_string();
        self.habitats[h].rename(name.clone());

        self.persist("habitat name", self.store.update_habitat_name(id, &name));
        self.journal.log_message(&format!(
            "Renamed the habitat: {previous} to {}.",
            self.habitats[h]
        ));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Adds a newly acquired animal to the unused pool and saves it.
    ///
    /// Registering an animal the zoo already owns is a no-op.
    pub fn register_new_animal(&mut self, mut animal: Animal) -> AnimalId {
        let id = animal.id();
        if self.animal(id).is_some() {
            return id;
        }

        animal.set_used(false);
        self.persist("new animal", self.store.save_animal(&animal));
        self.journal
            .log_message(&format!("Added a new animal: {animal}."));
        self.animals.push(animal);
        id
    }

    /// Adds a newly acquired habitat, empty and inactive, and saves it.
    ///
    /// Registering a habitat the zoo already owns is a no-op.
    pub fn register_new_habitat(&mut self, mut habitat: Habitat) -> HabitatId {
        let id = habitat.id();
        if self.habitat(id).is_some() {
            return id;
        }

        habitat.evict_all();
        habitat.set_used(false);
        self.persist("new habitat", self.store.save_habitat(&habitat));
        self.journal
            .log_message(&format!("Added a new habitat: {habitat}."));
        self.habitats.push(habitat);
        id
    }

    // ------------------------------------------------------------------
    // Economy
    // ------------------------------------------------------------------

    /// Draws today's visitor count from the active attraction total.
    ///
    /// Zero when the total is below 1; otherwise one Gaussian sample with mean
    /// `ln(total)` and deviation 1, truncated toward zero and floored at 0.
    pub fn num_visitors(&mut self) -> u32 {
        let total = self.total_attraction();
        if total < 1 {
            return 0;
        }
        let sample = self.rng.gaussian(f64::from(total).ln(), 1.0);
        if sample.is_nan() || sample < 1.0 {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let visitors = sample.trunc().min(f64::from(u32::MAX)) as u32;
        visitors
    }

    /// Moves to the next day and collects ticket revenue.
    ///
    /// The shop is restocked when the new day is a multiple of the restock
    /// interval. If the store refuses the new balance and day, nothing changes
    /// and [`DayOutcome::RolledBack`] is returned.
    pub fn advance_day(&mut self) -> DayOutcome {
        let visitors = self.num_visitors();
        let revenue = visitors.saturating_mul(self.config.ticket_price);
        let day = self.current_day.saturating_add(1);
        let balance = self.balance.saturating_add(revenue);

        if let Err(e) = self.store.update_zoo_attributes(balance, day) {
            log::warn!("could not persist day {day}, staying on day {}: {e}", self.current_day);
            return DayOutcome::RolledBack;
        }

        self.current_day = day;
        self.balance = balance;
        let shop_refilled = day % self.config.restock_interval_days == 0;
        if shop_refilled {
            self.shop.refill(self.rng.as_mut());
        }

        self.journal.log_message(&format!(
            "Moved to day {day}: {visitors} visitors, earned {revenue}."
        ));
        DayOutcome::Advanced(DayReport {
            day,
            visitors,
            revenue,
            shop_refilled,
        })
    }

    /// Buys a listed product and registers it as a new unused animal or habitat.
    ///
    /// If the store refuses the new balance, the balance is unchanged, the
    /// product stays listed in its place, and [`PurchaseOutcome::RolledBack`]
    /// is returned.
    ///
    /// # Errors
    /// - `UnknownProduct` if the shop does not list `id`
    /// - `BalanceTooLow` if the product costs more than the balance; nothing changes
    pub fn purchase_product(&mut self, id: ProductId) -> ZooResult<PurchaseOutcome> {
        let product = self.shop.product(id).ok_or(ZooError::UnknownProduct { id })?;
        let cost = product.cost();
        if cost > self.balance {
            return Err(ZooError::BalanceTooLow {
                cost,
                balance: self.balance,
            });
        }

        let (index, product) = self
            .shop
            .take_product(id)
            .ok_or(ZooError::UnknownProduct { id })?;
        let balance = self.balance - cost;
        if let Err(e) = self.store.update_zoo_attributes(balance, self.current_day) {
            log::warn!("could not persist purchase of {product}, rolling back: {e}");
            self.shop.put_back(index, product);
            return Ok(PurchaseOutcome::RolledBack);
        }
        self.balance = balance;

        self.journal.log_message(&format!(
            "Purchased a new product: {product} for {cost}."
        ));
        let name = product.name().to_string();
        match product {
            Product::Animal(animal) => {
                self.register_new_animal(animal);
            }
            Product::Habitat(habitat) => {
                self.register_new_habitat(habitat);
            }
        }

        Ok(PurchaseOutcome::Purchased(PurchaseReceipt {
            product: id,
            name,
            cost,
            balance_after: balance,
        }))
    }
}
