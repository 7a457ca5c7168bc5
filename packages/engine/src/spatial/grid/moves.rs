use super::*;

use crate::core::constants::DEFAULT_TEMPERATURE;

impl Grid {
    /// Relocate a cell to `(x2, y2)` and leave the source empty. Whatever was
    /// at the destination is destroyed.
    pub fn move_cell(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (Some(src), Some(dst)) = (self.index(x1, y1), self.index(x2, y2)) else {
            return;
        };
        if src == dst {
            return;
        }
        let id = self.mem.cell(src);
        let replaced = self.mem.cell(dst);

        self.mem.store_cell(dst, id);
        self.mem.store_velocity(dst, self.mem.velocity(src));
        self.mem.store_temperature(dst, self.mem.temperature(src));
        self.mem.store_sleep_timer(dst, 0);
        self.mem.store_stamp(dst, self.tag);

        self.mem.store_cell(src, 0);
        self.mem.store_velocity(src, 0.0);
        self.mem.store_temperature(src, DEFAULT_TEMPERATURE);
        self.mem.store_sleep_timer(src, 0);

        // source always ends empty, so only a destroyed destination changes the count
        if replaced != 0 {
            self.mem.adjust_particle_count(-1);
        }

        self.wake_neighborhood(x1, y1);
        self.wake_neighborhood(x2, y2);
    }

    /// Exchange id, velocity and temperature of two cells.
    pub fn swap(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (Some(a), Some(b)) = (self.index(x1, y1), self.index(x2, y2)) else {
            return;
        };
        if a == b {
            return;
        }
        let (id_a, id_b) = (self.mem.cell(a), self.mem.cell(b));
        let (v_a, v_b) = (self.mem.velocity(a), self.mem.velocity(b));
        let (t_a, t_b) = (self.mem.temperature(a), self.mem.temperature(b));

        self.mem.store_cell(a, id_b);
        self.mem.store_cell(b, id_a);
        self.mem.store_velocity(a, v_b);
        self.mem.store_velocity(b, v_a);
        self.mem.store_temperature(a, t_b);
        self.mem.store_temperature(b, t_a);
        self.mem.store_stamp(a, self.tag);
        self.mem.store_stamp(b, self.tag);

        self.wake_neighborhood(x1, y1);
        self.wake_neighborhood(x2, y2);
    }
}
