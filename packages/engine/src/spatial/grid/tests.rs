use super::*;
use crate::core::constants::DEFAULT_TEMPERATURE;

fn grid(width: u32, height: u32) -> Grid {
    Grid::new(Arc::new(SharedMemory::new(width, height).unwrap()))
}

fn drain_marked(g: &Grid) -> Vec<usize> {
    let mem = g.shared();
    let mut snap = crate::spatial::chunks::ChunkBitmap::new(mem.layout().total_chunks());
    mem.take_chunk_state(&mut snap);
    snap.iter_set().collect()
}

#[test]
fn out_of_bounds_reads_return_sentinels() {
    let g = grid(10, 10);
    assert_eq!(g.get(-1, 0), BOUNDARY_ID);
    assert_eq!(g.get(0, 10), BOUNDARY_ID);
    assert_eq!(g.get_velocity(10, 3), 0.0);
    assert_eq!(g.get_temp(3, -4), DEFAULT_TEMPERATURE);
}

#[test]
fn out_of_bounds_writes_are_ignored() {
    let mut g = grid(10, 10);
    g.set(-1, 0, 2);
    g.set(10, 10, 2);
    g.set_velocity(11, 0, 3.0);
    g.move_cell(0, 0, 20, 0);
    assert_eq!(g.particle_count(), 0);
    assert_eq!(g.shared().count_non_empty(), 0);
}

#[test]
fn set_tracks_counter_and_resets_scalars() {
    let mut g = grid(16, 16);
    g.set(3, 3, 2);
    g.set_temp(3, 3, 400.0);
    g.set_velocity(3, 3, 2.5);
    assert_eq!(g.particle_count(), 1);

    g.set(3, 3, 3);
    assert_eq!(g.particle_count(), 1);
    assert_eq!(g.get_temp(3, 3), DEFAULT_TEMPERATURE);
    assert_eq!(g.get_velocity(3, 3), 0.0);

    g.set(3, 3, 0);
    assert_eq!(g.particle_count(), 0);
}

#[test]
fn move_carries_state_and_destroys_target() {
    let mut g = grid(16, 16);
    g.set(1, 1, 2);
    g.set_temp(1, 1, 90.0);
    g.set_velocity(1, 1, 4.0);
    g.set(1, 2, 3);
    assert_eq!(g.particle_count(), 2);

    g.move_cell(1, 1, 1, 2);
    assert_eq!(g.get(1, 2), 2);
    assert_eq!(g.get_temp(1, 2), 90.0);
    assert_eq!(g.get_velocity(1, 2), 4.0);
    assert_eq!(g.get(1, 1), 0);
    assert_eq!(g.get_temp(1, 1), DEFAULT_TEMPERATURE);
    assert_eq!(g.particle_count(), 1);
}

#[test]
fn swap_twice_restores_both_cells() {
    let mut g = grid(16, 16);
    g.set(4, 4, 2);
    g.set_temp(4, 4, 55.0);
    g.set(5, 4, 3);
    g.set_velocity(5, 4, 1.5);

    g.swap(4, 4, 5, 4);
    assert_eq!((g.get(4, 4), g.get(5, 4)), (3, 2));
    assert_eq!(g.get_velocity(4, 4), 1.5);
    g.swap(4, 4, 5, 4);
    assert_eq!((g.get(4, 4), g.get(5, 4)), (2, 3));
    assert_eq!(g.get_temp(4, 4), 55.0);
    assert_eq!(g.particle_count(), 2);
}

#[test]
fn interior_wake_marks_only_own_chunk() {
    let g = grid(192, 192);
    g.wake(96, 96);
    assert_eq!(drain_marked(&g), vec![4]);
}

#[test]
fn corner_wake_marks_edge_and_corner_neighbours() {
    let g = grid(192, 192);
    // local (63, 0) of chunk (1, 1)
    g.wake(127, 64);
    let layout = *g.shared().layout();
    let mut expected = vec![
        layout.chunk_idx_from_coords(1, 1),
        layout.chunk_idx_from_coords(2, 1),
        layout.chunk_idx_from_coords(1, 0),
        layout.chunk_idx_from_coords(2, 0),
    ];
    expected.sort_unstable();
    assert_eq!(drain_marked(&g), expected);
}

#[test]
fn mutation_resets_neighbour_sleep_timers() {
    let mut g = grid(16, 16);
    let idx = g.index(6, 6).unwrap();
    for _ in 0..40 {
        g.bump_sleep(idx);
    }
    assert_eq!(g.sleep_timer(idx), 40);
    g.set(7, 7, 2);
    assert_eq!(g.sleep_timer(idx), 0);
}

#[test]
fn claim_only_fills_empty_cells() {
    let mut g = grid(8, 8);
    assert!(g.claim(2, 2, 3));
    assert!(!g.claim(2, 2, 2));
    assert_eq!(g.get(2, 2), 3);
    assert_eq!(g.particle_count(), 1);
}

#[test]
fn stamps_only_count_inside_a_frame() {
    let mut g = grid(8, 8);
    g.set(1, 1, 2);
    let idx = g.index(1, 1).unwrap();
    assert!(!g.is_stamped(idx));

    g.begin_frame(7);
    assert!(!g.is_stamped(idx));
    g.move_cell(1, 1, 1, 2);
    assert!(g.is_stamped(g.index(1, 2).unwrap()));

    g.begin_frame(8);
    assert!(!g.is_stamped(g.index(1, 2).unwrap()));
}
