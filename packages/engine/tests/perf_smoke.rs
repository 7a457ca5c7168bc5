use sandy_engine::domain::materials::MAT_SAND;
use sandy_engine::World;

#[test]
fn perf_smoke_step() {
    let mut world = World::with_size(128, 64).unwrap();
    world.enable_perf_metrics(true);
    assert_eq!(world.fill_rect(0, 0, 128, 32, MAT_SAND), 128 * 32);

    let out = world.step();
    let stats = out.perf.expect("perf stats requested");
    assert!(stats.frame_ms >= 0.0);
    assert!(stats.phase_ms.iter().all(|ms| *ms >= 0.0));
    assert_eq!(stats.particle_count, 128 * 32);
    assert_eq!(stats.occupied_chunks, 2);
    assert_eq!(world.perf_stats(), &stats);
}

#[test]
fn perf_stats_serialize_camel_case() {
    let mut world = World::with_size(64, 64).unwrap();
    world.enable_perf_metrics(true);
    let stats = world.step().perf.unwrap();
    let json = serde_json::to_string(&stats).unwrap();
    assert!(json.contains("\"frameMs\""));
    assert!(json.contains("\"phaseMs\""));
    assert!(json.contains("\"cellsUpdated\""));
}

#[test]
fn disabling_perf_clears_stats() {
    let mut world = World::with_size(64, 64).unwrap();
    world.enable_perf_metrics(true);
    world.fill_rect(0, 0, 8, 8, MAT_SAND);
    world.step();
    world.enable_perf_metrics(false);
    assert_eq!(world.perf_stats().particle_count, 0);
    assert!(world.step().perf.is_none());
}
