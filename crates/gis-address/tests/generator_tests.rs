//! Batch address generation and mock ID cards.

use chrono::NaiveDate;
use gis_address::{find_collisions, AddressGenerator, CivilNumber, IdCard};
use omana_common::MapConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use test_utils::generators::horizontal_run;

#[test]
fn test_batch_indices_follow_input_order() {
    let config = MapConfig::builtin();
    let gen = AddressGenerator::new(&config.layout, 10).unwrap();

    let points = horizontal_run((5.0, 5.0), 25.0, 5);
    let report = gen.generate_batch(&points).unwrap();

    let houses: Vec<i64> = report.addresses.iter().map(|a| a.house_number).collect();
    assert_eq!(houses, [101, 202, 303, 404, 505]);
    assert!(report.collisions.is_empty());
    assert_eq!(report.fallbacks, 0);
}

#[test]
fn test_same_cell_collides_every_ten_houses() {
    let config = MapConfig::builtin();
    let gen = AddressGenerator::new(&config.layout, 10).unwrap();

    let points = vec![(5.0, 5.0); 11];
    let report = gen.generate_batch(&points).unwrap();

    assert_eq!(report.collisions.len(), 1);
    assert_eq!(report.collisions[0].indices, vec![0, 10]);
    assert_eq!(report.collisions[0].key.house, 101);
    assert_eq!(find_collisions(&report.addresses), report.collisions);
}

#[test]
fn test_outside_point_falls_back_to_first_zone() {
    let config = MapConfig::builtin();
    let gen = AddressGenerator::new(&config.layout, 10).unwrap();

    let report = gen.generate_batch(&[(-50.0, 10.0)]).unwrap();
    let address = &report.addresses[0];
    assert!(address.fallback);
    assert_eq!(address.block_code, "A-001");
    assert_eq!(report.fallbacks, 1);
    assert!(address.local_code().is_err());
}

#[test]
fn test_local_code_drops_region_and_block() {
    let config = MapConfig::builtin();
    let gen = AddressGenerator::new(&config.layout, 10).unwrap();

    // Same plot position in A-001 and A-002 yields the same local code
    let a = gen.address_for(5.0, 5.0, 0).unwrap();
    let b = gen.address_for(255.0, 5.0, 0).unwrap();
    assert_ne!(a.block_code, b.block_code);
    assert_eq!(a.local_code().unwrap(), b.local_code().unwrap());
    assert_ne!(a.national_code().unwrap(), b.national_code().unwrap());
}

#[test]
fn test_mock_id_card() {
    let config = MapConfig::builtin();
    let gen = AddressGenerator::new(&config.layout, 10).unwrap();
    let address = gen.address_for(30.0, 45.0, 0).unwrap();

    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let mut rng = StdRng::seed_from_u64(7);
    let card = IdCard::mock(&mut rng, &address, today).unwrap();

    assert!(CivilNumber::parse(card.civil_number.as_str()).is_some());
    assert_eq!(card.address_code, "OM-MSC-03-01-001-012-01201");
    assert!(card.issue_date <= today);
    assert!(card.date_of_birth < today);
    assert_eq!(
        card.expiry_date,
        card.issue_date.checked_add_months(chrono::Months::new(120)).unwrap()
    );
    assert!(!card.is_expired(today));
    assert!(card.is_expired(card.expiry_date));
}
