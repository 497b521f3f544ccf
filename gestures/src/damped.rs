use tactile_geometry::{ScenePoint, SceneVector};

/// A position that follows its input with a limited step per update.
///
/// A single large jump in a fast burst of input would otherwise dominate the direction estimate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DampedPosition {
    current: ScenePoint,
    previous: ScenePoint,
    max_delta: f64,
}

impl DampedPosition {
    pub fn new(max_delta: f64) -> Self {
        Self {
            current: ScenePoint::zero(),
            previous: ScenePoint::zero(),
            max_delta,
        }
    }

    pub fn reset(&mut self, pos: ScenePoint) {
        self.current = pos;
        self.previous = pos;
    }

    pub fn update(&mut self, pos: ScenePoint) {
        self.previous = self.current;
        self.current += (pos - self.current).with_max_length(self.max_delta);
    }

    pub fn set_max_delta(&mut self, max_delta: f64) {
        self.max_delta = max_delta;
    }

    pub fn current(&self) -> ScenePoint {
        self.current
    }

    pub fn previous(&self) -> ScenePoint {
        self.previous
    }

    /// The movement of the most recent update.
    pub fn movement(&self) -> SceneVector {
        self.current - self.previous
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn reset_sets_both_positions() {
        let mut damped = DampedPosition::new(5.0);
        damped.reset(ScenePoint::new(3.0, 4.0));
        assert_eq!(damped.current(), ScenePoint::new(3.0, 4.0));
        assert_eq!(damped.previous(), damped.current());
        assert_eq!(damped.movement(), SceneVector::zero());
    }

    #[test]
    fn small_steps_are_followed_exactly() {
        let mut damped = DampedPosition::new(5.0);
        damped.reset(ScenePoint::zero());
        damped.update(ScenePoint::new(3.0, 0.0));
        assert_eq!(damped.current(), ScenePoint::new(3.0, 0.0));
        assert_eq!(damped.previous(), ScenePoint::zero());
    }

    #[test]
    fn large_jumps_are_clamped() {
        let mut damped = DampedPosition::new(5.0);
        damped.reset(ScenePoint::zero());
        damped.update(ScenePoint::new(0.0, 100.0));
        assert_abs_diff_eq!(damped.current().y, 5.0, epsilon = 1e-9);

        damped.update(ScenePoint::new(0.0, 100.0));
        assert_abs_diff_eq!(damped.current().y, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(damped.movement().y, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn diagonal_jumps_keep_their_direction() {
        let mut damped = DampedPosition::new(5.0);
        damped.reset(ScenePoint::new(1.0, 1.0));
        damped.update(ScenePoint::new(31.0, 41.0));
        assert_abs_diff_eq!(damped.movement().x, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(damped.movement().y, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_max_delta_holds_the_position() {
        let mut damped = DampedPosition::new(0.0);
        damped.reset(ScenePoint::new(2.0, 2.0));
        damped.update(ScenePoint::new(10.0, -4.0));
        assert_eq!(damped.current(), ScenePoint::new(2.0, 2.0));
    }

    #[test]
    fn changing_the_max_delta() {
        let mut damped = DampedPosition::new(1.0);
        damped.reset(ScenePoint::zero());
        damped.set_max_delta(50.0);
        damped.update(ScenePoint::new(30.0, 40.0));
        assert_eq!(damped.current(), ScenePoint::new(30.0, 40.0));
    }
}
