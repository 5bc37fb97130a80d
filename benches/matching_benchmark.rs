use criterion::{black_box, criterion_group, criterion_main, Criterion};
use unique_variant_engine::{
    genericize, GenericMod, ObservedItem, ReferenceDb, ReferenceEntry, VariantEngine,
};

const MOD_LINES: &[&str] = &[
    "+(20-30) to Strength",
    "Adds (10-15) to (20-25) Fire Damage to Attacks",
    "-(20-10)% to Chaos Resistance",
    "Commissioned 79200 coins to commemorate Akoya",
    "(1.2-1.6)% of Physical Attack Damage Leeched as Life",
    "Gain a Frenzy Charge on Critical Strike",
];

fn create_test_entry(variant_count: usize) -> ReferenceEntry {
    let labels = (0..variant_count).map(|i| format!("Pre 3.{}.0", i)).collect();
    let mut entry = ReferenceEntry::new("Bench Item", "Iron Ring", labels);

    for i in 0..variant_count {
        let low = 10.0 * i as f64;
        entry.explicits.push(
            GenericMod::new("+# to maximum Life", vec![[low, low + 10.0]]).with_variants(vec![i]),
        );
    }
    let every: Vec<usize> = (0..variant_count).collect();
    for line in [
        "#% increased Attack Speed",
        "+#% to Fire Resistance",
        "+#% to Cold Resistance",
        "Adds # to # Physical Damage to Attacks",
        "#% increased Rarity of Items found",
    ] {
        let ranges = if line.starts_with("Adds") {
            vec![[1.0, 3.0], [5.0, 8.0]]
        } else {
            vec![[10.0, 20.0]]
        };
        entry
            .explicits
            .push(GenericMod::new(line, ranges).with_variants(every.clone()));
    }
    entry
}

fn create_test_item(life: u32) -> ObservedItem {
    ObservedItem::new("Bench Item", "Iron Ring").with_explicits([
        format!("+{} to maximum Life", life),
        "12% increased Attack Speed".to_string(),
        "+15% to Fire Resistance".to_string(),
        "+18% to Cold Resistance".to_string(),
        "Adds 2 to 7 Physical Damage to Attacks".to_string(),
        "20% increased Rarity of Items found".to_string(),
    ])
}

fn bench_genericize(c: &mut Criterion) {
    c.bench_function("genericize_6_lines", |b| {
        b.iter(|| {
            for line in MOD_LINES {
                black_box(genericize(line));
            }
        });
    });
}

fn bench_resolve(c: &mut Criterion) {
    let engine = VariantEngine::default();

    let db_2 = ReferenceDb::new(vec![create_test_entry(2)]);
    let db_8 = ReferenceDb::new(vec![create_test_entry(8)]);
    let item = create_test_item(15);

    c.bench_function("resolve_2_variants", |b| {
        b.iter(|| black_box(engine.resolve(&item, &db_2).unwrap()));
    });

    c.bench_function("resolve_8_variants", |b| {
        b.iter(|| black_box(engine.resolve(&item, &db_8).unwrap()));
    });
}

criterion_group!(benches, bench_genericize, bench_resolve);
criterion_main!(benches);
