//! Load, filter and rank a small catalog through the public crate APIs.

use laptopscope_catalog::{Catalog, InMemorySource, LoadPolicy};
use laptopscope_model::{FilterOptions, RawRecord};
use laptopscope_query::{filter, resolve};
use laptopscope_rerank::rank;
use pretty_assertions::assert_eq;

fn source() -> InMemorySource {
    InMemorySource::new(vec![
        RawRecord::new("IdeaPad Slim 3", "Lenovo", 65_990u64, 55).with_cpu("13th Gen Core i7 13620H"),
        RawRecord::new("Vivobook 14", "Asus", "₹79,990", 68).with_cpu("Intel Core Ultra 7 255H"),
        RawRecord::new("Nitro V 16", "Acer", 84_990u64, 68)
            .with_cpu("14th Gen Core i5 14450HX")
            .with_gpu("NVIDIA GeForce RTX 4050", 6),
        RawRecord::new("Victus 15", "HP", 65_990u64, 72)
            .with_cpu("AMD Ryzen 5 8645HS")
            .with_gpu("NVIDIA GeForce RTX 3050", 6),
    ])
}

#[test]
fn min_score_sixty_ranks_three_records() {
    let catalog = Catalog::load(&source(), LoadPolicy::Strict).unwrap().catalog;

    let options = FilterOptions {
        min_score: Some(60),
        ..Default::default()
    };
    let config = resolve(&options, catalog.facets()).unwrap();
    let matches = filter(catalog.records(), &config);
    assert_eq!(matches.len(), 3);

    let ranked = rank(&matches).unwrap();
    let order: Vec<(&str, u32)> = ranked
        .iter()
        .map(|r| (r.record.name.as_str(), r.record.score))
        .collect();
    assert_eq!(
        order,
        vec![("Victus 15", 72), ("Vivobook 14", 68), ("Nitro V 16", 68)]
    );

    for entry in &ranked {
        let expected = entry.record.price as f64 / entry.record.score as f64;
        assert!((entry.value_score - expected).abs() < 1e-9);
    }
}

#[test]
fn filtering_does_not_touch_catalog() {
    let catalog = Catalog::load(&source(), LoadPolicy::Strict).unwrap().catalog;
    let before = catalog.records().to_vec();

    let config = resolve(&FilterOptions::default(), catalog.facets()).unwrap();
    let ranked = rank(&filter(catalog.records(), &config)).unwrap();

    assert_eq!(ranked.len(), before.len());
    assert_eq!(catalog.records(), before.as_slice());
}
