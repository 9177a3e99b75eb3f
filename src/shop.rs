//! The shop: a bounded, periodically restocked list of products.
//!
//! Stock is generated by weighted draws from a [`RandomSource`]:
//!
//! ```text
//! draw [0,9]   0..=1  -> habitat   draw [0,99]: <10 TROPICAL, <30 DRY, <50 TEMPERATE,
//!                                               <95 CONTINENTAL, else POLAR
//!              2..=9  -> animal    draw [0,99]: <5 rare, <15 uncommon, else common
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::animal::{Animal, AnimalId, Species};
use crate::climate::Climate;
use crate::habitat::{Habitat, HabitatId};
use crate::rng::RandomSource;

/// Default number of products on offer after a restock.
pub const DEFAULT_CAPACITY: usize = 10;

/// Species sold with 5% probability per animal draw.
pub const RARE_SPECIES: Species = Species::Leopard;
/// Species sold with 10% probability per animal draw.
pub const UNCOMMON_SPECIES: Species = Species::RedPanda;
/// Species sold with 85% probability per animal draw.
pub const COMMON_SPECIES: Species = Species::WildBoar;

/// Identity of a product: the ID of the animal or habitat being sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ProductId {
    /// An animal for sale.
    Animal(AnimalId),
    /// A habitat for sale.
    Habitat(HabitatId),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Animal(id) => write!(f, "animal:{id}"),
            Self::Habitat(id) => write!(f, "habitat:{id}"),
        }
    }
}

impl From<AnimalId> for ProductId {
    fn from(id: AnimalId) -> Self {
        Self::Animal(id)
    }
}

impl From<HabitatId> for ProductId {
    fn from(id: HabitatId) -> Self {
        Self::Habitat(id)
    }
}

/// Something the zoo can buy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "item", rename_all = "snake_case")]
pub enum Product {
    /// A generated animal.
    Animal(Animal),
    /// A generated, empty habitat.
    Habitat(Habitat),
}

impl Product {
    /// The ID of the item being sold.
    #[must_use]
    pub fn id(&self) -> ProductId {
        match self {
            Self::Animal(a) => ProductId::Animal(a.id()),
            Self::Habitat(h) => ProductId::Habitat(h.id()),
        }
    }

    /// Purchase price.
    #[must_use]
    pub fn cost(&self) -> u32 {
        match self {
            Self::Animal(a) => a.cost(),
            Self::Habitat(h) => h.cost(),
        }
    }

    /// Display name of the item.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Animal(a) => a.name(),
            Self::Habitat(h) => h.name(),
        }
    }

    /// The animal, if this is an animal product.
    #[must_use]
    pub fn as_animal(&self) -> Option<&Animal> {
        match self {
            Self::Animal(a) => Some(a),
            Self::Habitat(_) => None,
        }
    }

    /// The habitat, if this is a habitat product.
    #[must_use]
    pub fn as_habitat(&self) -> Option<&Habitat> {
        match self {
            Self::Habitat(h) => Some(h),
            Self::Animal(_) => None,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Animal(a) => write!(f, "{a}"),
            Self::Habitat(h) => write!(f, "{h}"),
        }
    }
}

fn draw_habitat(rng: &mut dyn RandomSource) -> Habitat {
    let climate = match rng.uniform_int(0, 99) {
        r if r < 10 => Climate::Tropical,
        r if r < 30 => Climate::Dry,
        r if r < 50 => Climate::Temperate,
        r if r < 95 => Climate::Continental,
        _ => Climate::Polar,
    };
    Habitat::new(climate.default_habitat_name(), climate)
}

fn draw_animal(rng: &mut dyn RandomSource) -> Animal {
    let species = match rng.uniform_int(0, 99) {
        r if r < 5 => RARE_SPECIES,
        r if r < 15 => UNCOMMON_SPECIES,
        _ => COMMON_SPECIES,
    };
    Animal::random(species, rng)
}

/// Draws one fresh product.
pub fn draw_product(rng: &mut dyn RandomSource) -> Product {
    if rng.uniform_int(0, 9) <= 1 {
        Product::Habitat(draw_habitat(rng))
    } else {
        Product::Animal(draw_animal(rng))
    }
}

/// Inventory of products on offer.
#[derive(Debug, Clone, PartialEq)]
pub struct Shop {
    capacity: usize,
    products: Vec<Product>,
}

impl Shop {
    /// Creates an empty shop. Call [`Shop::refill`] to stock it.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            products: Vec::with_capacity(capacity),
        }
    }

    /// Number of products stocked by each refill.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Replaces the whole inventory with `capacity` freshly drawn products.
    pub fn refill(&mut self, rng: &mut dyn RandomSource) {
        self.products.clear();
        while self.products.len() < self.capacity {
            self.products.push(draw_product(rng));
        }
    }

    /// Products in listing order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products currently listed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// True once everything has been bought.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Looks up a listed product.
    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    /// True if the product is listed.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.product(id).is_some()
    }

    /// Listed animals, in listing order.
    pub fn animal_products(&self) -> impl Iterator<Item = &Animal> {
        self.products.iter().filter_map(Product::as_animal)
    }

    /// Listed habitats, in listing order.
    pub fn habitat_products(&self) -> impl Iterator<Item = &Habitat> {
        self.products.iter().filter_map(Product::as_habitat)
    }

    /// Takes a product off the shelf. Returns `None` if it is not listed.
    pub fn remove_product(&mut self, id: ProductId) -> Option<Product> {
        let index = self.products.iter().position(|p| p.id() == id)?;
        Some(self.products.remove(index))
    }

    /// Like [`Shop::remove_product`], also returning the listing position.
    pub(crate) fn take_product(&mut self, id: ProductId) -> Option<(usize, Product)> {
        let index = self.products.iter().position(|p| p.id() == id)?;
        Some((index, self.products.remove(index)))
    }

    /// Puts a product taken with [`Shop::take_product`] back where it was.
    pub(crate) fn put_back(&mut self, index: usize, product: Product) {
        let index = index.min(self.products.len());
        self.products.insert(index, product);
    }
}

impl Default for Shop {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
