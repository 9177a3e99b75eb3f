//! End-to-end tests for the zoo state machine over the public API.

mod common;

use std::fs;
use std::sync::Arc;

use menagerie::journal::CSV_HEADER;
use menagerie::{
    Climate, CsvJournal, DayOutcome, Habitat, InMemoryZooStore, MemoryJournal, Product,
    ProductId, PurchaseOutcome, ScriptedRandom, Species, StdRandom, ZooError, ZooStore,
};
use tempfile::tempdir;

use common::{active_habitat, open_zoo, red_panda, scripted_zoo, small_bird};

#[test]
fn test_red_panda_settles_in_temperate_habitat() {
    let mut zoo = scripted_zoo(ScriptedRandom::new());
    let habitat = active_habitat(&mut zoo, Climate::Temperate);
    let panda = zoo.register_new_animal(red_panda());

    assert!(zoo.add_animal_to_habitat(panda, habitat).unwrap());
    let residents = zoo.residents_of(habitat).unwrap();
    assert_eq!(residents.len(), 1);
    assert_eq!(residents[0].species(), Species::RedPanda);
    assert_eq!(zoo.unused_animals().count(), 0);
}

#[test]
fn test_small_bird_and_red_panda_never_share() {
    let panda = red_panda();
    let bird = small_bird();
    assert!(panda.hunts(&bird));
    assert!(!panda.can_coexist(&bird));
    assert!(!bird.can_coexist(&panda));

    // The habitat refuses the pair whichever arrives first, as long as the
    // climate admits the newcomer.
    let roster = vec![panda.clone(), bird.clone()];
    let mut habitat = Habitat::new("Aviary", Climate::Temperate);
    habitat.add_animal(&panda, &roster).unwrap();
    let err = habitat.add_animal(&bird, &roster).unwrap_err();
    assert!(err.is_compatibility());
}

#[test]
fn test_week_of_days_restocks_shop_once() {
    let mut zoo = scripted_zoo(ScriptedRandom::new());
    let mut refills = 0;
    for _ in 0..13 {
        match zoo.advance_day() {
            DayOutcome::Advanced(report) => refills += usize::from(report.shop_refilled),
            DayOutcome::RolledBack => panic!("in-memory store never refuses"),
        }
    }
    assert_eq!(zoo.current_day(), 14);
    // Days 7 and 14.
    assert_eq!(refills, 2);
    assert_eq!(zoo.shop().len(), 10);
}

#[test]
fn test_balance_too_low_leaves_listing() {
    // Kind roll 9 (animal), species roll 0 (rare leopard, cost 100).
    let rng = ScriptedRandom::new().with_ints([9, 0]);
    let config = menagerie::ZooConfig {
        starting_balance: 50,
        shop_capacity: 1,
        ..menagerie::ZooConfig::default()
    };
    let mut zoo = menagerie::Zoo::open(
        config,
        Arc::new(InMemoryZooStore::new()),
        Arc::new(MemoryJournal::new()),
        Box::new(rng),
    )
    .unwrap();

    let id = zoo.shop().products()[0].id();
    let err = zoo.purchase_product(id).unwrap_err();
    assert!(matches!(err, ZooError::BalanceTooLow { cost: 100, balance: 50 }));
    assert_eq!(zoo.balance(), 50);
    assert!(zoo.shop().contains(id));
}

#[test]
fn test_buy_place_and_earn() {
    let store = Arc::new(InMemoryZooStore::new());
    let journal = Arc::new(MemoryJournal::new());
    let mut zoo = open_zoo(store.clone(), journal.clone(), StdRandom::seeded(17));
    let starting = zoo.balance();

    let affordable = zoo
        .shop()
        .products()
        .iter()
        .find(|p| p.as_animal().is_some() && p.cost() <= starting)
        .map(Product::id);

    if let Some(ProductId::Animal(animal)) = affordable {
        let outcome = zoo.purchase_product(ProductId::Animal(animal)).unwrap();
        let PurchaseOutcome::Purchased(receipt) = outcome else {
            panic!("in-memory store never refuses");
        };
        assert_eq!(zoo.balance(), starting - receipt.cost);
        assert!(zoo.animal(animal).is_some());
        assert_eq!(store.load_animals().unwrap().len(), 1);

        let species = zoo.animal(animal).unwrap().species();
        let climate = menagerie::compatibility::habitable_climates(species)[0];
        let habitat = zoo.habitats()[0].id();
        let habitat = if zoo.habitat(habitat).unwrap().climate() == climate {
            zoo.activate_habitat(habitat).unwrap();
            habitat
        } else {
            active_habitat(&mut zoo, climate)
        };
        assert!(zoo.add_animal_to_habitat(animal, habitat).unwrap());
        assert!(zoo.total_attraction() > 0);
    }

    let _ = zoo.advance_day();
    assert!(zoo.balance() >= starting.saturating_sub(100));
    assert!(journal.contains("Moved to day 2"));
}

#[test]
fn test_deactivation_frees_animals_for_another_habitat() {
    let mut zoo = scripted_zoo(ScriptedRandom::new());
    let first = active_habitat(&mut zoo, Climate::Continental);
    let second = active_habitat(&mut zoo, Climate::Tropical);
    let boar = zoo.register_new_animal(menagerie::Animal::new(Species::WildBoar, 9, 80_000, 90.0));

    assert!(zoo.add_animal_to_habitat(boar, first).unwrap());
    assert!(!zoo.add_animal_to_habitat(boar, second).unwrap());

    zoo.deactivate_habitat(first).unwrap();
    assert_eq!(zoo.unused_habitats().count(), 2);
    assert!(zoo.add_animal_to_habitat(boar, second).unwrap());
    assert_eq!(zoo.used_habitats().count(), 1);
}

#[test]
fn test_csv_journal_records_history() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.csv");
    let journal = Arc::new(CsvJournal::open(&path).unwrap());

    let mut zoo = open_zoo(
        Arc::new(InMemoryZooStore::new()),
        journal,
        ScriptedRandom::new(),
    );
    let habitat = zoo.habitats()[0].id();
    zoo.activate_habitat(habitat).unwrap();
    zoo.rename_habitat(habitat, "Meadow").unwrap();
    let _ = zoo.advance_day();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines.len(), 4);
    assert!(lines[1].contains("Now using the habitat"));
    assert!(lines[2].contains("Renamed the habitat"));
    assert!(lines[3].contains("Moved to day 2"));

    // `yyyy:Mon:dd HH:MM:SS` before the first comma.
    let stamp = lines[3].split(',').next().unwrap();
    assert_eq!(stamp.len(), "2024:Jan:01 00:00:00".len());
    assert_eq!(stamp.matches(':').count(), 4);
}
