use super::*;

use crate::core::constants::DEFAULT_TEMPERATURE;

impl Grid {
    // === Material id ===
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        match self.index(x, y) {
            Some(idx) => self.mem.cell(idx),
            None => BOUNDARY_ID,
        }
    }

    #[inline]
    pub fn get_index(&self, idx: usize) -> u8 {
        if idx < self.size { self.mem.cell(idx) } else { BOUNDARY_ID }
    }

    #[inline]
    pub fn is_empty(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == 0
    }

    /// Place `id`, resetting velocity, temperature and sleep state.
    pub fn set(&mut self, x: i32, y: i32, id: u8) {
        if let Some(idx) = self.index(x, y) {
            self.set_index(idx, id);
        }
    }

    pub fn set_index(&mut self, idx: usize, id: u8) {
        if idx >= self.size {
            return;
        }
        let old = self.mem.cell(idx);
        self.mem.store_cell(idx, id);
        self.mem.store_velocity(idx, 0.0);
        self.mem.store_temperature(idx, DEFAULT_TEMPERATURE);
        self.mem.store_sleep_timer(idx, 0);
        self.mem.store_stamp(idx, self.tag);
        self.count_transition(old, id);
        let (x, y) = self.coords(idx);
        self.wake_neighborhood(x, y);
    }

    /// Place `id` only if the cell is still empty. Used for off-grid re-entry,
    /// which races with neighbouring workers.
    pub fn claim(&mut self, x: i32, y: i32, id: u8) -> bool {
        let Some(idx) = self.index(x, y) else {
            return false;
        };
        if id == 0 || !self.mem.compare_exchange_cell(idx, 0, id) {
            return false;
        }
        self.mem.store_velocity(idx, 0.0);
        self.mem.store_temperature(idx, DEFAULT_TEMPERATURE);
        self.mem.store_sleep_timer(idx, 0);
        self.mem.store_stamp(idx, self.tag);
        self.mem.adjust_particle_count(1);
        self.wake_neighborhood(x, y);
        true
    }

    #[inline]
    pub(super) fn count_transition(&self, old: u8, new: u8) {
        match (old == 0, new == 0) {
            (true, false) => self.mem.adjust_particle_count(1),
            (false, true) => self.mem.adjust_particle_count(-1),
            _ => {}
        }
    }

    // === Velocity slot ===
    // Fall speed for movers, heat for ember, launch phase for firework.
    #[inline]
    pub fn get_velocity(&self, x: i32, y: i32) -> f32 {
        self.index(x, y).map_or(0.0, |idx| self.mem.velocity(idx))
    }

    #[inline]
    pub fn set_velocity(&mut self, x: i32, y: i32, v: f32) {
        if let Some(idx) = self.index(x, y) {
            self.mem.store_velocity(idx, v);
        }
    }

    // === Temperature ===
    #[inline]
    pub fn get_temp(&self, x: i32, y: i32) -> f32 {
        self.index(x, y)
            .map_or(DEFAULT_TEMPERATURE, |idx| self.mem.temperature(idx))
    }

    #[inline]
    pub fn get_temp_index(&self, idx: usize) -> f32 {
        self.mem.temperature(idx)
    }

    #[inline]
    pub fn set_temp(&mut self, x: i32, y: i32, t: f32) {
        if let Some(idx) = self.index(x, y) {
            self.mem.store_temperature(idx, t);
        }
    }

    #[inline]
    pub fn set_temp_index(&mut self, idx: usize, t: f32) {
        if idx < self.size {
            self.mem.store_temperature(idx, t);
        }
    }

    // === Sleep timer ===
    #[inline]
    pub fn sleep_timer(&self, idx: usize) -> u8 {
        self.mem.sleep_timer(idx)
    }

    #[inline]
    pub fn bump_sleep(&mut self, idx: usize) {
        let t = self.mem.sleep_timer(idx);
        self.mem.store_sleep_timer(idx, t.saturating_add(1));
    }

    #[inline]
    pub fn reset_sleep(&mut self, idx: usize) {
        self.mem.store_sleep_timer(idx, 0);
    }
}
