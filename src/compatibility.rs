//! Placement rules: which climates a species tolerates and who eats whom.
//!
//! All functions here are pure. `hunts` is asymmetric; `can_coexist` is
//! derived from it in both directions and is therefore symmetric.

use crate::animal::{Animal, AnimalType, Species};
use crate::climate::Climate;

/// Leopards take prey up to this weight (grams).
pub const LEOPARD_MAX_PREY_WEIGHT: u32 = 40_000;

/// Red pandas take birds up to this size (centimeters).
pub const RED_PANDA_MAX_PREY_SIZE: f32 = 15.0;

/// Wild boars take prey up to this size (centimeters).
pub const WILD_BOAR_MAX_PREY_SIZE: f32 = 50.0;

/// True if `species` can be kept in a habitat with the given climate.
#[must_use]
pub fn can_live_in(species: Species, climate: Climate) -> bool {
    match species {
        Species::AfricanPygmyGoose => climate == Climate::Tropical,
        Species::ChineseAlligator | Species::RedPanda => climate == Climate::Temperate,
        // Very wide tolerance, but not the cold.
        Species::Leopard => climate != Climate::Polar,
        Species::WildBoar => matches!(
            climate,
            Climate::Temperate | Climate::Tropical | Climate::Continental
        ),
    }
}

/// True if `predator` would prey on `prey`.
#[must_use]
pub fn hunts(predator: &Animal, prey: &Animal) -> bool {
    let same_species = predator.species() == prey.species();
    match predator.species() {
        Species::AfricanPygmyGoose => false,
        // Opportunistic; eats anything that is not another alligator.
        Species::ChineseAlligator => !same_species,
        Species::Leopard => prey.weight() <= LEOPARD_MAX_PREY_WEIGHT && !same_species,
        Species::RedPanda => {
            prey.animal_type() == AnimalType::Bird && prey.size() <= RED_PANDA_MAX_PREY_SIZE
        }
        Species::WildBoar => prey.size() <= WILD_BOAR_MAX_PREY_SIZE && !same_species,
    }
}

/// True if neither animal hunts the other.
#[must_use]
pub fn can_coexist(a: &Animal, b: &Animal) -> bool {
    !hunts(a, b) && !hunts(b, a)
}

/// Climates in which `species` can live, in [`Climate::ALL`] order.
#[must_use]
pub fn habitable_climates(species: Species) -> Vec<Climate> {
    Climate::ALL
        .into_iter()
        .filter(|&c| can_live_in(species, c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn average(species: Species) -> Animal {
        let p = species.profile();
        Animal::new(species, 100, p.average_weight, p.average_size)
    }

    #[test]
    fn test_climate_rules() {
        assert_eq!(
            habitable_climates(Species::AfricanPygmyGoose),
            vec![Climate::Tropical]
        );
        assert_eq!(
            habitable_climates(Species::RedPanda),
            vec![Climate::Temperate]
        );
        assert_eq!(
            habitable_climates(Species::ChineseAlligator),
            vec![Climate::Temperate]
        );
        assert_eq!(
            habitable_climates(Species::Leopard),
            vec![
                Climate::Tropical,
                Climate::Dry,
                Climate::Temperate,
                Climate::Continental
            ]
        );
        assert_eq!(
            habitable_climates(Species::WildBoar),
            vec![Climate::Tropical, Climate::Temperate, Climate::Continental]
        );
    }

    #[test]
    fn test_red_panda_hunts_only_small_birds() {
        let panda = Animal::new(Species::RedPanda, 100, 5000, 55.0);
        let chick = Animal::new(Species::AfricanPygmyGoose, 1, 40, 10.0);
        let goose = average(Species::AfricanPygmyGoose);
        let boar = average(Species::WildBoar);

        assert!(panda.hunts(&chick));
        assert!(!chick.hunts(&panda));
        assert!(!can_coexist(&panda, &chick));
        assert!(!can_coexist(&chick, &panda));

        assert!(!panda.hunts(&goose));
        assert!(!panda.hunts(&boar));
    }

    #[test]
    fn test_red_panda_threshold_is_inclusive() {
        let panda = average(Species::RedPanda);
        let at_limit = Animal::new(Species::AfricanPygmyGoose, 1, 40, 15.0);
        let above = Animal::new(Species::AfricanPygmyGoose, 1, 40, 15.1);
        assert!(panda.hunts(&at_limit));
        assert!(!panda.hunts(&above));
    }

    #[test]
    fn test_leopard_weight_threshold_and_own_kind() {
        let leopard = average(Species::Leopard);
        let other_leopard = Animal::new(Species::Leopard, 5, 30_000, 200.0);
        let panda = average(Species::RedPanda);
        let boar = average(Species::WildBoar);

        assert!(leopard.hunts(&panda));
        assert!(!leopard.hunts(&boar));
        assert!(!leopard.hunts(&other_leopard));
        assert!(can_coexist(&leopard, &other_leopard));
        assert!(can_coexist(&leopard, &boar));
    }

    #[test]
    fn test_alligator_only_tolerates_alligators() {
        let gator = average(Species::ChineseAlligator);
        let other_gator = average(Species::ChineseAlligator);
        for species in Species::ALL {
            let other = average(species);
            if species == Species::ChineseAlligator {
                assert!(can_coexist(&gator, &other_gator));
            } else {
                assert!(gator.hunts(&other), "alligator should hunt {species}");
            }
        }
    }

    #[test]
    fn test_boar_hunts_small_non_boars() {
        let boar = average(Species::WildBoar);
        let piglet = Animal::new(Species::WildBoar, 1, 1000, 20.0);
        let goose = average(Species::AfricanPygmyGoose);
        let panda = average(Species::RedPanda);

        assert!(!boar.hunts(&piglet));
        assert!(boar.hunts(&goose));
        assert!(!boar.hunts(&panda));
    }

    #[test]
    fn test_goose_hunts_nothing() {
        let goose = average(Species::AfricanPygmyGoose);
        for species in Species::ALL {
            assert!(!goose.hunts(&average(species)));
        }
    }

    #[test]
    fn test_coexistence_symmetric_over_catalog() {
        for a in Species::ALL {
            for b in Species::ALL {
                let x = average(a);
                let y = average(b);
                assert_eq!(can_coexist(&x, &y), can_coexist(&y, &x));
            }
        }
    }
}
