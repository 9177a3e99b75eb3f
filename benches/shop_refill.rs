use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use menagerie::{Animal, Climate, Habitat, Shop, Species, StdRandom};

fn bench_shop_refill(c: &mut Criterion) {
    let mut group = c.benchmark_group("shop");
    group.throughput(Throughput::Elements(10));
    group.bench_function("refill_capacity_10", |b| {
        let mut shop = Shop::default();
        let mut rng = StdRandom::seeded(42);
        b.iter(|| {
            shop.refill(&mut rng);
            black_box(shop.len())
        });
    });
    group.finish();
}

fn bench_admission_check(c: &mut Criterion) {
    // A crowded boar pen: every newcomer is checked against every resident.
    let roster: Vec<Animal> = (0..64)
        .map(|i| Animal::new(Species::WildBoar, i + 1, 80_000, 90.0))
        .collect();
    let mut habitat = Habitat::new("Pen", Climate::Continental);
    for animal in &roster {
        habitat.add_animal(animal, &roster).unwrap();
    }
    let newcomer = Animal::new(Species::WildBoar, 3, 79_000, 88.0);

    let mut group = c.benchmark_group("habitat");
    group.throughput(Throughput::Elements(roster.len() as u64));
    group.bench_function("check_admission_64_residents", |b| {
        b.iter(|| black_box(habitat.check_admission(black_box(&newcomer), &roster).is_ok()));
    });
    group.finish();
}

criterion_group!(benches, bench_shop_refill, bench_admission_check);
criterion_main!(benches);
