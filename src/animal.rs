//! Animals and the species catalog.
//!
//! Species are a closed set. Each one is a tag into a static profile table
//! holding its biology, price and attraction score. Predator/prey and
//! climate rules live in [`crate::compatibility`].

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::climate::Climate;
use crate::compatibility;
use crate::rng::RandomSource;

/// Globally unique, stable animal identifier.
///
/// # Examples
///
/// ```
/// use menagerie::AnimalId;
///
/// let id = AnimalId::new();
/// assert_ne!(id, AnimalId::new());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimalId(Uuid);

impl AnimalId {
    /// Creates a new random animal ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an animal ID from an existing UUID.
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

impl Default for AnimalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broad zoological class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnimalType {
    /// Feathered, egg-laying.
    Bird,
    /// Fur-bearing.
    Mammal,
    /// Scaled, cold-blooded.
    Reptile,
    /// Lives in water and on land.
    Amphibian,
    /// Gill-breathing.
    Fish,
}

impl fmt::Display for AnimalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bird => write!(f, "BIRD"),
            Self::Mammal => write!(f, "MAMMAL"),
            Self::Reptile => write!(f, "REPTILE"),
            Self::Amphibian => write!(f, "AMPHIBIAN"),
            Self::Fish => write!(f, "FISH"),
        }
    }
}

/// Static biology and economics of a species.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesProfile {
    /// Display name, e.g. "Red Panda".
    pub name: &'static str,
    /// Zoological class.
    pub animal_type: AnimalType,
    /// Grams.
    pub average_weight: u32,
    /// Centimeters.
    pub average_size: f32,
    /// Days.
    pub lifespan: u32,
    /// How much a single individual draws visitors.
    pub attraction_score: u32,
    /// Shop price.
    pub cost: u32,
    /// Free-text blurb shown to players.
    pub description: &'static str,
}

const AFRICAN_PYGMY_GOOSE: SpeciesProfile = SpeciesProfile {
    name: "African Pygmy Goose",
    animal_type: AnimalType::Bird,
    average_weight: 300,
    average_size: 27.0,
    lifespan: 2000,
    attraction_score: 15,
    cost: 10,
    description: "The African pygmy goose is a small and colorful waterfowl species found in \
                  sub-Saharan Africa. It is known for its diminutive size and elegant appearance.",
};

const CHINESE_ALLIGATOR: SpeciesProfile = SpeciesProfile {
    name: "Chinese Alligator",
    animal_type: AnimalType::Reptile,
    average_weight: 30_000,
    average_size: 150.0,
    lifespan: 14_610,
    attraction_score: 120,
    cost: 270,
    description: "Chinese alligators have a relatively short snout and stout body. They possess \
                  a dark gray to olive-brown skin color, with a rough texture and prominent scales.",
};

const LEOPARD: SpeciesProfile = SpeciesProfile {
    name: "Leopard",
    animal_type: AnimalType::Mammal,
    average_weight: 35_000,
    average_size: 210.0,
    lifespan: 6210,
    attraction_score: 30,
    cost: 100,
    description: "Compared to other wild cats, the leopard has relatively short legs and a long \
                  body with a large skull. Its fur is marked with rosettes. It is similar in \
                  appearance to the jaguar.",
};

const RED_PANDA: SpeciesProfile = SpeciesProfile {
    name: "Red Panda",
    animal_type: AnimalType::Mammal,
    average_weight: 5000,
    average_size: 55.0,
    lifespan: 4749,
    attraction_score: 80,
    cost: 90,
    description: "As their name suggests, red pandas' fur is mostly rusty-red color. They have \
                  white markings on their ears, cheeks, muzzles and above their eyes.",
};

const WILD_BOAR: SpeciesProfile = SpeciesProfile {
    name: "Wild Boar",
    animal_type: AnimalType::Mammal,
    average_weight: 80_000,
    average_size: 90.0,
    lifespan: 2922,
    attraction_score: 20,
    cost: 30,
    description: "The wild boar is a bulky, massively built suid with short and relatively thin \
                  legs. The trunk is short and robust, while the hindquarters are comparatively \
                  underdeveloped.",
};

/// The species the zoo knows how to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    /// Small tropical waterfowl.
    AfricanPygmyGoose,
    /// Temperate reptile that hunts anything but its own kind.
    ChineseAlligator,
    /// Big cat, lives anywhere but polar.
    Leopard,
    /// Temperate mammal that hunts small birds.
    RedPanda,
    /// Hardy mammal, the shop's common stock.
    WildBoar,
}

impl Species {
    /// Every species in the catalog.
    pub const ALL: [Self; 5] = [
        Self::AfricanPygmyGoose,
        Self::ChineseAlligator,
        Self::Leopard,
        Self::RedPanda,
        Self::WildBoar,
    ];

    /// The static profile for this species.
    #[must_use]
    pub const fn profile(self) -> &'static SpeciesProfile {
        match self {
            Self::AfricanPygmyGoose => &AFRICAN_PYGMY_GOOSE,
            Self::ChineseAlligator => &CHINESE_ALLIGATOR,
            Self::Leopard => &LEOPARD,
            Self::RedPanda => &RED_PANDA,
            Self::WildBoar => &WILD_BOAR,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.profile().name
    }

    /// Zoological class.
    #[must_use]
    pub const fn animal_type(self) -> AnimalType {
        self.profile().animal_type
    }

    /// Shop price.
    #[must_use]
    pub const fn cost(self) -> u32 {
        self.profile().cost
    }

    /// Default attraction score for individuals of this species.
    #[must_use]
    pub const fn attraction_score(self) -> u32 {
        self.profile().attraction_score
    }

    /// Looks a species up by its display name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single animal owned by (or for sale to) the zoo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    id: AnimalId,
    species: Species,
    /// Days.
    age: u32,
    /// Grams.
    weight: u32,
    /// Centimeters.
    size: f32,
    attraction_score: u32,
    #[serde(default)]
    used: bool,
}

impl Animal {
    /// Creates a new, unused animal with a fresh ID.
    ///
    /// # Examples
    ///
    /// ```
    /// use menagerie::{Animal, Species};
    ///
    /// let panda = Animal::new(Species::RedPanda, 100, 5000, 55.0);
    /// assert_eq!(panda.name(), "Red Panda");
    /// assert!(!panda.is_used());
    /// ```
    #[must_use]
    pub fn new(species: Species, age: u32, weight: u32, size: f32) -> Self {
        Self::with_id(AnimalId::new(), species, age, weight, size)
    }

    /// Creates a new animal with a specific ID, e.g. when restoring from storage.
    #[must_use]
    pub fn with_id(id: AnimalId, species: Species, age: u32, weight: u32, size: f32) -> Self {
        Self {
            id,
            species,
            age,
            weight,
            size: size.max(0.0),
            attraction_score: species.attraction_score(),
            used: false,
        }
    }

    /// Generates an animal of the given species with randomised measurements.
    ///
    /// Age is uniform in `[1, lifespan]`; weight and size are Gaussian around the
    /// species averages with a deviation of 1.
    #[must_use]
    pub fn random(species: Species, rng: &mut dyn RandomSource) -> Self {
        let profile = species.profile();
        let age = rng.uniform_int(1, i64::from(profile.lifespan));
        let weight = rng.gaussian(f64::from(profile.average_weight), 1.0);
        let size = rng.gaussian(f64::from(profile.average_size), 1.0);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (age, weight, size) = (
            age.clamp(0, i64::from(u32::MAX)) as u32,
            weight.max(0.0) as u32,
            size.max(0.0) as f32,
        );
        Self::new(species, age, weight, size)
    }

    /// Returns the animal's ID.
    #[must_use]
    pub const fn id(&self) -> AnimalId {
        self.id
    }

    /// Returns the species.
    #[must_use]
    pub const fn species(&self) -> Species {
        self.species
    }

    /// Species display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.species.name()
    }

    /// Species blurb.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        self.species.profile().description
    }

    /// Zoological class.
    #[must_use]
    pub const fn animal_type(&self) -> AnimalType {
        self.species.animal_type()
    }

    /// Age in days.
    #[must_use]
    pub const fn age(&self) -> u32 {
        self.age
    }

    /// Weight in grams.
    #[must_use]
    pub const fn weight(&self) -> u32 {
        self.weight
    }

    /// Size in centimeters.
    #[must_use]
    pub const fn size(&self) -> f32 {
        self.size
    }

    /// This individual's attraction score.
    #[must_use]
    pub const fn attraction_score(&self) -> u32 {
        self.attraction_score
    }

    /// Overrides the species attraction score for this individual.
    pub fn set_attraction_score(&mut self, score: u32) {
        self.attraction_score = score;
    }

    /// Shop price of the species.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.species.cost()
    }

    /// True while the animal is placed in a habitat.
    #[must_use]
    pub const fn is_used(&self) -> bool {
        self.used
    }

    pub(crate) fn set_used(&mut self, used: bool) {
        self.used = used;
    }

    /// True if this animal would prey on `other`.
    #[must_use]
    pub fn hunts(&self, other: &Self) -> bool {
        compatibility::hunts(self, other)
    }

    /// True if neither animal preys on the other.
    #[must_use]
    pub fn can_coexist(&self, other: &Self) -> bool {
        compatibility::can_coexist(self, other)
    }

    /// True if this animal's species tolerates `climate`.
    #[must_use]
    pub fn can_live_in(&self, climate: Climate) -> bool {
        compatibility::can_live_in(self.species, climate)
    }
}

impl fmt::Display for Animal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id)
    }
}

/// Read access to animals by ID.
///
/// Habitats only hold [`AnimalId`]s; whoever owns the animals resolves them
/// through this trait when a placement rule needs the full record.
pub trait AnimalLookup {
    /// Returns the animal with the given ID, if known.
    fn animal(&self, id: AnimalId) -> Option<&Animal>;
}

impl AnimalLookup for [Animal] {
    fn animal(&self, id: AnimalId) -> Option<&Animal> {
        self.iter().find(|a| a.id == id)
    }
}

impl AnimalLookup for Vec<Animal> {
    fn animal(&self, id: AnimalId) -> Option<&Animal> {
        self.as_slice().animal(id)
    }
}

impl AnimalLookup for std::collections::HashMap<AnimalId, Animal> {
    fn animal(&self, id: AnimalId) -> Option<&Animal> {
        self.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRandom, StdRandom};

    #[test]
    fn test_new_animal_takes_species_defaults() {
        let boar = Animal::new(Species::WildBoar, 10, 80_000, 90.0);
        assert_eq!(boar.name(), "Wild Boar");
        assert_eq!(boar.animal_type(), AnimalType::Mammal);
        assert_eq!(boar.attraction_score(), 20);
        assert_eq!(boar.cost(), 30);
        assert!(!boar.is_used());
    }

    #[test]
    fn test_attraction_override_is_per_individual() {
        let mut a = Animal::new(Species::Leopard, 1, 35_000, 210.0);
        let b = Animal::new(Species::Leopard, 1, 35_000, 210.0);
        a.set_attraction_score(99);
        assert_eq!(a.attraction_score(), 99);
        assert_eq!(b.attraction_score(), Species::Leopard.attraction_score());
    }

    #[test]
    fn test_random_uses_scripted_draws() {
        let mut rng = ScriptedRandom::new()
            .with_ints([1234])
            .with_gaussians([5000.7, 54.2]);
        let panda = Animal::random(Species::RedPanda, &mut rng);
        assert_eq!(panda.age(), 1234);
        assert_eq!(panda.weight(), 5000);
        assert!((panda.size() - 54.2).abs() < 1e-4);
    }

    #[test]
    fn test_random_age_within_lifespan() {
        let mut rng = StdRandom::seeded(3);
        for species in Species::ALL {
            for _ in 0..50 {
                let animal = Animal::random(species, &mut rng);
                assert!(animal.age() >= 1);
                assert!(animal.age() <= species.profile().lifespan);
            }
        }
    }

    #[test]
    fn test_species_from_name() {
        assert_eq!(Species::from_name("Leopard"), Some(Species::Leopard));
        assert_eq!(Species::from_name("Unicorn"), None);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Animal::new(Species::WildBoar, 1, 1, 1.0);
        let b = Animal::new(Species::WildBoar, 1, 1, 1.0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_animal_serde_roundtrip_keeps_used_flag() {
        let mut goose = Animal::new(Species::AfricanPygmyGoose, 5, 300, 27.0);
        goose.set_used(true);
        let json = serde_json::to_string(&goose).unwrap();
        let back: Animal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, goose);
        assert!(back.is_used());
    }

    #[test]
    fn test_lookup_over_slice() {
        let animals = vec![
            Animal::new(Species::WildBoar, 1, 1, 1.0),
            Animal::new(Species::Leopard, 1, 1, 1.0),
        ];
        let id = animals[1].id();
        assert_eq!(animals.animal(id).map(Animal::species), Some(Species::Leopard));
        assert!(animals.animal(AnimalId::new()).is_none());
    }
}
