use sandy_engine::domain::materials::{MaterialKind, MAT_EMPTY, MAT_SAND, MAT_WATER};
use sandy_engine::{EngineError, MaterialRegistry, World};

#[test]
fn bundle_overrides_builtins_and_keeps_invariants() {
    let json = r#"{
        "formatVersion": 1,
        "materials": [
            { "id": 3, "name": "Heavy Water", "kind": "water", "density": 12 },
            { "id": 40, "name": "Red Sand", "kind": "sand", "color": 16711680 }
        ]
    }"#;
    let registry = MaterialRegistry::from_bundle_json(json).expect("bundle should parse");

    assert!(registry.is_registered(MAT_EMPTY));
    assert!(registry.is_registered(MAT_SAND));
    assert_eq!(registry.id_by_name("Heavy Water"), Some(MAT_WATER));
    assert_eq!(registry.density(MAT_WATER), 12);
    assert!(registry.is_liquid(MAT_WATER));

    assert_eq!(registry.kind(40), MaterialKind::Sand);
    assert_eq!(registry.color(40), 0xFF0000);
    assert!(registry.can_sleep(40));

    let manifest = registry.manifest_json().unwrap();
    assert!(manifest.contains("Red Sand"));
}

#[test]
fn bundle_without_builtins_only_knows_its_entries() {
    let json = r#"{ "includeBuiltins": false, "materials": [ { "id": 9, "name": "Grit", "kind": "sand" } ] }"#;
    let registry = MaterialRegistry::from_bundle_json(json).unwrap();
    assert!(registry.is_registered(MAT_EMPTY));
    assert!(registry.is_registered(9));
    assert!(!registry.is_registered(MAT_SAND));
    assert_eq!(registry.len(), 2);
}

#[test]
fn bundle_rejects_reserved_ids_and_bad_ranges() {
    let boundary = r#"{ "materials": [ { "id": 255, "name": "Wall", "kind": "stone" } ] }"#;
    assert!(matches!(MaterialRegistry::from_bundle_json(boundary), Err(EngineError::Bundle(_))));

    let empty_slot = r#"{ "materials": [ { "id": 0, "name": "Void", "kind": "sand" } ] }"#;
    assert!(matches!(MaterialRegistry::from_bundle_json(empty_slot), Err(EngineError::Bundle(_))));

    let conductivity = r#"{ "materials": [ { "id": 50, "name": "Hot", "kind": "stone", "conductivity": 2.0 } ] }"#;
    assert!(matches!(MaterialRegistry::from_bundle_json(conductivity), Err(EngineError::Bundle(_))));

    let future = r#"{ "formatVersion": 99 }"#;
    assert!(matches!(MaterialRegistry::from_bundle_json(future), Err(EngineError::Bundle(_))));

    assert!(matches!(MaterialRegistry::from_bundle_json("{"), Err(EngineError::Json(_))));
}

#[test]
fn custom_powder_falls_like_sand() {
    let json = r#"{ "materials": [ { "id": 40, "name": "Red Sand", "kind": "sand" } ] }"#;
    let registry = std::sync::Arc::new(MaterialRegistry::from_bundle_json(json).unwrap());
    let mut world = World::new(sandy_engine::SimulationConfig::with_size(32, 32), registry).unwrap();
    assert!(world.place(4, 0, 40));
    for _ in 0..40 {
        world.step();
    }
    assert_eq!(world.grid().get(4, 31), 40);
}
