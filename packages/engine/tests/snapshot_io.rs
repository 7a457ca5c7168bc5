use std::sync::Arc;

use sandy_engine::domain::materials::{MAT_SAND, MAT_STONE, MAT_WATER};
use sandy_engine::{Coordinator, EngineError, MaterialRegistry, SimulationConfig, SnapshotError, World};

fn coordinator(width: u32, height: u32) -> Coordinator {
    let config = SimulationConfig {
        workers: 2,
        ..SimulationConfig::with_size(width, height)
    };
    Coordinator::new(config, Arc::new(MaterialRegistry::with_builtins())).unwrap()
}

#[test]
fn empty_world_snapshot_is_tiny() {
    let world = World::with_size(100, 50).unwrap();
    let bytes = world.save_snapshot();
    // header + one cell run + one temperature run
    assert_eq!(bytes.len(), 10 + 3 + 6);
    assert_eq!(&bytes[..4], b"SAND");
}

#[test]
fn saved_world_resumes_in_threaded_driver() {
    let mut world = World::with_size(128, 96).unwrap();
    world.fill_rect(0, 90, 128, 6, MAT_STONE);
    world.fill_rect(8, 4, 40, 20, MAT_SAND);
    world.fill_rect(70, 4, 40, 20, MAT_WATER);
    for _ in 0..10 {
        world.step();
    }
    let bytes = world.save_snapshot();

    let mut threaded = coordinator(128, 96);
    let info = threaded.load_snapshot(&bytes).unwrap();
    assert!(!info.size_mismatch);
    assert_eq!(info.particles, world.particle_count());
    assert_eq!(threaded.shared().cells_to_vec(), world.shared().cells_to_vec());
    assert_eq!(threaded.shared().temperatures_to_vec(), world.shared().temperatures_to_vec());

    // loaded regions are awake: the falling material keeps falling
    let out = threaded.advance_frame().unwrap();
    assert!(out.active_chunks > 0);
    assert!(out.cells_updated > 0);
    assert_eq!(out.particle_count, info.particles);
}

#[test]
fn smaller_snapshot_loads_into_larger_world() {
    let mut small = World::with_size(32, 32).unwrap();
    small.fill_rect(0, 0, 32, 32, MAT_STONE);
    let bytes = small.save_snapshot();

    let mut big = coordinator(64, 64);
    let info = big.load_snapshot(&bytes).unwrap();
    assert!(info.size_mismatch);
    assert_eq!((info.width, info.height), (32, 32));
    assert_eq!(big.particle_count(), 32 * 32);
}

#[test]
fn corrupt_snapshot_is_rejected_without_touching_the_world() {
    let mut world = World::with_size(64, 64).unwrap();
    world.fill_rect(0, 0, 64, 8, MAT_SAND);
    let mut bytes = world.save_snapshot();

    let mut target = World::with_size(64, 64).unwrap();
    target.fill_rect(0, 60, 64, 4, MAT_STONE);

    bytes[0] = b'X';
    let err = target.load_snapshot(&bytes).unwrap_err();
    assert!(matches!(err, EngineError::Snapshot(SnapshotError::BadMagic { .. })));

    let err = target.load_snapshot(&bytes[..5]).unwrap_err();
    assert!(matches!(err, EngineError::Snapshot(SnapshotError::TooShort { .. })));

    assert_eq!(target.particle_count(), 64 * 4);
}
