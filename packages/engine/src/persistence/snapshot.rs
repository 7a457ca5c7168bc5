//! "SAND" world snapshots
//!
//! Little-endian layout:
//!
//! ```text
//! b"SAND" | version u8 | width u16 | height u16 | flags u8
//! cell runs:        { count u16, id u8 }   covering width * height cells
//! temperature runs: { count u16, f32 }     (version >= 2)
//! ```
//!
//! Runs hold at most 65535 cells. Temperatures are compared by bit pattern,
//! so `-0.0` and `0.0` are different runs and a NaN run stays one run.

use crate::core::constants::CHUNK_SIZE;
use crate::core::error::SnapshotError;
use crate::domain::registry::MaterialRegistry;
use crate::spatial::grid::Grid;

pub const MAGIC: [u8; 4] = *b"SAND";
pub const VERSION: u8 = 2;
pub const HEADER_LEN: usize = 10;

const MAX_RUN: usize = u16::MAX as usize;
const CELL_RUN_LEN: usize = 3;
const TEMP_RUN_LEN: usize = 6;

/// What a load found in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub version: u8,
    pub width: u32,
    pub height: u32,
    /// Non-empty cells placed into the grid.
    pub particles: u32,
    /// The file's dimensions differ from the grid's.
    pub size_mismatch: bool,
    /// Cells whose id is not registered; loaded as empty.
    pub unknown_cells: u32,
}

/// Encode the whole grid.
pub fn save_snapshot(grid: &Grid) -> Vec<u8> {
    let mem = grid.shared();
    let cells = mem.cells_to_vec();
    let temps = mem.temperatures_to_vec();

    let mut out = Vec::with_capacity(HEADER_LEN + 64);
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&(grid.width() as u16).to_le_bytes());
    out.extend_from_slice(&(grid.height() as u16).to_le_bytes());
    out.push(0);

    for (count, id) in runs(&cells, |c| *c) {
        out.extend_from_slice(&count.to_le_bytes());
        out.push(id);
    }
    for (count, bits) in runs(&temps, |t| t.to_bits()) {
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());
    }
    out
}

/// Split `values` into `(count, key)` runs of at most `MAX_RUN` equal keys.
fn runs<T, K: PartialEq + Copy>(values: &[T], key: impl Fn(&T) -> K) -> Vec<(u16, K)> {
    let mut out = Vec::new();
    let mut iter = values.iter().map(key);
    let Some(mut current) = iter.next() else {
        return out;
    };
    let mut count = 1usize;
    for k in iter {
        if k == current && count < MAX_RUN {
            count += 1;
        } else {
            out.push((count as u16, current));
            current = k;
            count = 1;
        }
    }
    out.push((count as u16, current));
    out
}

/// Decoded file contents, before anything touches the grid.
struct Decoded {
    version: u8,
    width: u32,
    height: u32,
    cell_runs: Vec<(usize, u8)>,
    temp_runs: Vec<(usize, f32)>,
}

fn decode(data: &[u8]) -> Result<Decoded, SnapshotError> {
    if data.len() < HEADER_LEN {
        return Err(SnapshotError::TooShort {
            len: data.len(),
            min: HEADER_LEN,
        });
    }
    let found = [data[0], data[1], data[2], data[3]];
    if found != MAGIC {
        return Err(SnapshotError::BadMagic { found });
    }
    let version = data[4];
    if version > VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: version,
            supported: VERSION,
        });
    }
    let width = u16::from_le_bytes([data[5], data[6]]) as u32;
    let height = u16::from_le_bytes([data[7], data[8]]) as u32;
    // data[9]: flags, reserved
    let declared = width as usize * height as usize;

    let mut offset = HEADER_LEN;
    let cell_runs = read_runs(data, &mut offset, declared, "cells", CELL_RUN_LEN, |r| r[2])?;
    let temp_runs = if version >= 2 {
        read_runs(data, &mut offset, declared, "temperature", TEMP_RUN_LEN, |r| {
            f32::from_le_bytes([r[2], r[3], r[4], r[5]])
        })?
    } else {
        Vec::new()
    };

    Ok(Decoded {
        version,
        width,
        height,
        cell_runs,
        temp_runs,
    })
}

/// Read `{count u16, value}` records until `declared` cells are covered.
fn read_runs<V>(
    data: &[u8],
    offset: &mut usize,
    declared: usize,
    block: &'static str,
    record_len: usize,
    value: impl Fn(&[u8]) -> V,
) -> Result<Vec<(usize, V)>, SnapshotError> {
    let mut out = Vec::new();
    let mut covered = 0usize;
    while covered < declared {
        let Some(record) = data.get(*offset..*offset + record_len) else {
            return Err(SnapshotError::Truncated { block, offset: *offset });
        };
        let count = u16::from_le_bytes([record[0], record[1]]) as usize;
        out.push((count, value(record)));
        covered += count;
        *offset += record_len;
    }
    Ok(out)
}

/// Replace the grid's contents with a snapshot.
///
/// The file is fully validated before the grid is touched. A file of another
/// size is loaded anyway: runs are laid out linearly over the grid and cut
/// off at its end. Ids missing from `registry` load as empty.
pub fn load_snapshot(grid: &mut Grid, registry: &MaterialRegistry, data: &[u8]) -> Result<SnapshotInfo, SnapshotError> {
    let decoded = decode(data)?;
    let size_mismatch = decoded.width != grid.width() || decoded.height != grid.height();
    if size_mismatch {
        log::warn!(
            "snapshot is {}x{}, world is {}x{}; loading what fits",
            decoded.width,
            decoded.height,
            grid.width(),
            grid.height()
        );
    }

    grid.clear();
    let mem = grid.shared().clone();
    let layout = *mem.layout();
    let size = grid.size();
    let width = grid.width() as usize;
    let chunk = CHUNK_SIZE as usize;

    let mut index = 0usize;
    let mut particles = 0u32;
    let mut unknown_cells = 0u32;
    for (count, id) in decoded.cell_runs {
        let end = (index + count).min(size);
        let id = if id != 0 && !registry.is_registered(id) {
            unknown_cells += end.saturating_sub(index) as u32;
            0
        } else {
            id
        };
        if id != 0 && end > index {
            for i in index..end {
                mem.store_cell(i, id);
            }
            particles += (end - index) as u32;

            // chunk rectangle spanned by the run; a run crossing rows spans every column
            let (first_row, last_row) = (index / width, (end - 1) / width);
            let (cx0, cx1) = if first_row == last_row {
                ((index % width) / chunk, ((end - 1) % width) / chunk)
            } else {
                (0, (width - 1) / chunk)
            };
            for cy in first_row / chunk..=last_row / chunk {
                for cx in cx0..=cx1 {
                    mem.mark_chunk(layout.chunk_idx_from_coords(cx as u32, cy as u32));
                }
            }
        }
        index = end;
        if index >= size {
            break;
        }
    }

    let mut index = 0usize;
    for (count, temp) in decoded.temp_runs {
        let end = (index + count).min(size);
        for i in index..end {
            mem.store_temperature(i, temp);
        }
        index = end;
        if index >= size {
            break;
        }
    }

    mem.store_particle_count(particles);
    if unknown_cells > 0 {
        log::warn!("snapshot holds {} cells of unregistered materials; loaded as empty", unknown_cells);
    }
    log::info!(
        "loaded snapshot v{} {}x{}: {} particles",
        decoded.version,
        decoded.width,
        decoded.height,
        particles
    );

    Ok(SnapshotInfo {
        version: decoded.version,
        width: decoded.width,
        height: decoded.height,
        particles,
        size_mismatch,
        unknown_cells,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::shared_memory::SharedMemory;
    use crate::domain::materials::{MAT_SAND, MAT_STONE, MAT_WATER};

    fn builtins() -> MaterialRegistry {
        MaterialRegistry::with_builtins()
    }

    fn grid(w: u32, h: u32) -> Grid {
        Grid::new(Arc::new(SharedMemory::new(w, h).unwrap()))
    }

    #[test]
    fn empty_grid_is_nineteen_bytes() {
        let bytes = save_snapshot(&grid(64, 64));
        assert_eq!(bytes.len(), 19);
        assert_eq!(&bytes[..4], b"SAND");
        assert_eq!(bytes[4], 2);
        assert_eq!(&bytes[5..9], &[64, 0, 64, 0]);
        assert_eq!(bytes[9], 0);
        // one cell run of 4096 empties, one temperature run of 20.0
        assert_eq!(&bytes[10..13], &[0x00, 0x10, 0]);
        assert_eq!(&bytes[13..15], &[0x00, 0x10]);
        assert_eq!(&bytes[15..19], &20.0f32.to_le_bytes());
    }

    #[test]
    fn long_runs_split_at_u16_max() {
        // 300 * 300 = 90000 cells -> 65535 + 24465
        let bytes = save_snapshot(&grid(300, 300));
        assert_eq!(bytes.len(), HEADER_LEN + 2 * CELL_RUN_LEN + 2 * TEMP_RUN_LEN);
        assert_eq!(u16::from_le_bytes([bytes[10], bytes[11]]), u16::MAX);
    }

    #[test]
    fn round_trip_restores_cells_temps_and_count() {
        let mut src = grid(100, 70);
        src.set(1, 1, MAT_SAND);
        src.set(2, 1, MAT_SAND);
        src.set(99, 69, MAT_STONE);
        src.set(50, 30, MAT_WATER);
        src.set_temp(50, 30, -0.0);
        src.set_temp(10, 10, 451.5);
        let bytes = save_snapshot(&src);

        let mut dst = grid(100, 70);
        dst.set(5, 5, MAT_STONE);
        let info = load_snapshot(&mut dst, &builtins(), &bytes).unwrap();
        assert_eq!(info.particles, 4);
        assert!(!info.size_mismatch);
        assert_eq!(dst.shared().cells_to_vec(), src.shared().cells_to_vec());
        let bits = |g: &Grid| -> Vec<u32> {
            g.shared().temperatures_to_vec().iter().map(|t| t.to_bits()).collect()
        };
        assert_eq!(bits(&dst), bits(&src));
        assert_eq!(dst.particle_count(), 4);
        assert_eq!(save_snapshot(&dst), bytes);
    }

    #[test]
    fn load_wakes_chunks_under_runs() {
        let mut src = grid(128, 128);
        src.set(100, 100, MAT_STONE);
        let bytes = save_snapshot(&src);

        let mut dst = grid(128, 128);
        load_snapshot(&mut dst, &builtins(), &bytes).unwrap();
        let layout = *dst.shared().layout();
        assert!(dst.shared().is_chunk_marked(layout.chunk_idx_from_coords(1, 1)));
        assert!(!dst.shared().is_chunk_marked(layout.chunk_idx_from_coords(0, 0)));
    }

    #[test]
    fn header_errors() {
        let mut g = grid(8, 8);
        assert_eq!(
            load_snapshot(&mut g, &builtins(), b"SAND"),
            Err(SnapshotError::TooShort { len: 4, min: 10 })
        );
        assert_eq!(
            load_snapshot(&mut g, &builtins(), b"DUNE\x02\x08\x00\x08\x00\x00"),
            Err(SnapshotError::BadMagic { found: *b"DUNE" })
        );
        assert_eq!(
            load_snapshot(&mut g, &builtins(), b"SAND\x03\x08\x00\x08\x00\x00"),
            Err(SnapshotError::UnsupportedVersion { found: 3, supported: 2 })
        );
    }

    #[test]
    fn truncated_blocks_are_rejected_and_grid_untouched() {
        let mut g = grid(8, 8);
        g.set(0, 0, MAT_STONE);
        let full = save_snapshot(&grid(8, 8));

        // header only: cells block missing
        let err = load_snapshot(&mut g, &builtins(), &full[..HEADER_LEN]).unwrap_err();
        assert_eq!(err, SnapshotError::Truncated { block: "cells", offset: 10 });

        // temperature block cut short
        let err = load_snapshot(&mut g, &builtins(), &full[..full.len() - 1]).unwrap_err();
        assert_eq!(err, SnapshotError::Truncated { block: "temperature", offset: 13 });

        assert_eq!(g.get(0, 0), MAT_STONE);
    }

    #[test]
    fn version_one_keeps_default_temperature() {
        let mut bytes = b"SAND\x01\x04\x00\x02\x00\x00".to_vec();
        bytes.extend_from_slice(&[8, 0, MAT_SAND]);
        let mut g = grid(4, 2);
        let info = load_snapshot(&mut g, &builtins(), &bytes).unwrap();
        assert_eq!(info.version, 1);
        assert_eq!(g.particle_count(), 8);
        assert_eq!(g.get_temp(3, 1), 20.0);
    }

    #[test]
    fn unregistered_ids_load_as_empty() {
        let mut bytes = b"SAND\x01\x04\x00\x02\x00\x00".to_vec();
        bytes.extend_from_slice(&[2, 0, MAT_SAND, 3, 0, 200, 3, 0, 255]);
        let mut g = grid(4, 2);
        let info = load_snapshot(&mut g, &builtins(), &bytes).unwrap();
        assert_eq!(info.unknown_cells, 6);
        assert_eq!(info.particles, 2);
        assert_eq!(g.particle_count(), 2);
        assert_eq!(g.shared().count_non_empty(), 2);
        assert_eq!(g.get(2, 0), 0);
        assert_eq!(g.get(3, 1), 0);
    }

    #[test]
    fn mismatched_size_loads_what_fits() {
        let mut src = grid(16, 16);
        for x in 0..16 {
            src.set(x, 15, MAT_STONE);
        }
        let bytes = save_snapshot(&src);

        let mut small = grid(16, 8);
        let info = load_snapshot(&mut small, &builtins(), &bytes).unwrap();
        assert!(info.size_mismatch);
        assert_eq!((info.width, info.height), (16, 16));
        // the stone row lies past the end of the smaller grid
        assert_eq!(small.particle_count(), 0);

        let mut big = grid(32, 32);
        load_snapshot(&mut big, &builtins(), &bytes).unwrap();
        // linear layout: file row 15 (cells 240..256) lands on big row 7, x 16..32
        assert_eq!(big.particle_count(), 16);
        assert_eq!(big.get(16, 7), MAT_STONE);
        assert_eq!(big.get(31, 7), MAT_STONE);
    }
}
