use std::ops::Sub;

/// Point in world units. `y` grows downward, like screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[cfg(test)]
    pub fn distance_to(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    /// Moves at most `max_step` toward `target`, landing exactly on it when
    /// it is within reach.
    pub fn move_towards(&mut self, target: Vec2, max_step: f64) {
        let delta = target - *self;
        let distance = delta.length();
        if distance <= max_step || distance == 0.0 {
            *self = target;
            return;
        }
        let scale = max_step / distance;
        self.x += delta.x * scale;
        self.y += delta.y * scale;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}
