//! Player movement physics and collision constraints

/// Physics helpers for the per-tick player update.
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Steer velocity toward `desired` (direction × max speed), clamping the
    /// change to the acceleration budget for this tick.
    /// Returns (new_vel_x, new_vel_y).
    pub fn steer_velocity(
        vel_x: f32,
        vel_y: f32,
        desired_x: f32,
        desired_y: f32,
        max_accel: f32,
        dt: f32,
    ) -> (f32, f32) {
        let dvx = desired_x - vel_x;
        let dvy = desired_y - vel_y;
        let delta = (dvx * dvx + dvy * dvy).sqrt();
        if delta <= 0.0 {
            return (vel_x, vel_y);
        }

        let max_change = max_accel * dt;
        let scale = (max_change / delta).min(1.0);
        (vel_x + dvx * scale, vel_y + dvy * scale)
    }

    /// Clamp speed to `max_speed`, preserving direction.
    pub fn clamp_speed(vel_x: f32, vel_y: f32, max_speed: f32) -> (f32, f32) {
        let speed = (vel_x * vel_x + vel_y * vel_y).sqrt();
        if speed <= max_speed || speed == 0.0 {
            return (vel_x, vel_y);
        }
        let scale = max_speed / speed;
        (vel_x * scale, vel_y * scale)
    }

    /// Clamp a position to the circular arena bound.
    ///
    /// Returns (x, y, clamped). Callers zero the velocity when `clamped` is
    /// true so the next tick does not oscillate back over the boundary.
    pub fn clamp_to_arena(x: f32, y: f32, bound: f32) -> (f32, f32, bool) {
        let dist = (x * x + y * y).sqrt();
        if dist <= bound {
            return (x, y, false);
        }
        let scale = bound / dist;
        (x * scale, y * scale, true)
    }

    /// Check circle overlap between two entities.
    pub fn circles_overlap(x1: f32, y1: f32, x2: f32, y2: f32, combined_radius: f32) -> bool {
        let dx = x2 - x1;
        let dy = y2 - y1;
        dx * dx + dy * dy < combined_radius * combined_radius
    }

    /// Resolve overlap between two players of equal radius by pushing both
    /// apart symmetrically along the connecting normal, half the overlap
    /// each. Purely positional; momentum is deliberately not transferred.
    ///
    /// Returns `None` when the pair does not overlap or sits exactly
    /// coincident (no usable normal).
    pub fn resolve_player_overlap(
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        player_radius: f32,
    ) -> Option<((f32, f32), (f32, f32))> {
        let dx = x2 - x1;
        let dy = y2 - y1;
        let dist = (dx * dx + dy * dy).sqrt();
        let min_dist = player_radius * 2.0;

        if dist <= 0.0 || dist >= min_dist {
            return None;
        }

        let overlap = (min_dist - dist) / 2.0;
        let nx = dx / dist;
        let ny = dy / dist;

        Some((
            (x1 - nx * overlap, y1 - ny * overlap),
            (x2 + nx * overlap, y2 + ny * overlap),
        ))
    }
}
