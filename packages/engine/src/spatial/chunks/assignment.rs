use super::ChunkGrid;

/// A chunk owned by one worker for the whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkAssignment {
    pub cx: u32,
    pub cy: u32,
}

/// Deal chunks to `workers` lists round-robin in row-major order.
///
/// Neighbouring chunks land on different workers, so an active region is
/// spread across the pool instead of piling onto one thread.
pub fn assign_round_robin(layout: &ChunkGrid, workers: usize) -> Vec<Vec<ChunkAssignment>> {
    let workers = workers.max(1);
    let mut out: Vec<Vec<ChunkAssignment>> = (0..workers)
        .map(|_| Vec::with_capacity(layout.total_chunks() / workers + 1))
        .collect();

    let (chunks_x, chunks_y) = layout.dimensions();
    let mut i = 0usize;
    for cy in 0..chunks_y {
        for cx in 0..chunks_x {
            out[i % workers].push(ChunkAssignment { cx, cy });
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_chunk_assigned_exactly_once() {
        let layout = ChunkGrid::new(64 * 5, 64 * 3);
        let lists = assign_round_robin(&layout, 4);
        assert_eq!(lists.len(), 4);

        let mut seen = vec![0u8; layout.total_chunks()];
        for list in &lists {
            for a in list {
                seen[layout.chunk_idx_from_coords(a.cx, a.cy)] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn more_workers_than_chunks_leaves_some_idle() {
        let layout = ChunkGrid::new(64, 64);
        let lists = assign_round_robin(&layout, 3);
        assert_eq!(lists[0].len(), 1);
        assert!(lists[1].is_empty() && lists[2].is_empty());
    }
}
