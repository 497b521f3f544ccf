use euclid::{Angle, Transform2D};

use crate::{EPSILON, LocalPoint, LocalSpace, LocalVector, ScenePoint, SceneSpace, SceneVector};

pub type LocalToScene = Transform2D<f64, LocalSpace, SceneSpace>;

/// Maps an element's local coordinates into scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementTransform {
    to_scene: LocalToScene,
}

impl Default for ElementTransform {
    fn default() -> Self {
        Self::new(LocalToScene::identity())
    }
}

impl From<LocalToScene> for ElementTransform {
    fn from(to_scene: LocalToScene) -> Self {
        Self::new(to_scene)
    }
}

impl ElementTransform {
    pub fn new(to_scene: LocalToScene) -> Self {
        Self { to_scene }
    }

    pub fn from_translation(x: f64, y: f64) -> Self {
        LocalToScene::translation(x, y).into()
    }

    /// A rotation around the local origin. Positive angles rotate from the x axis towards the y
    /// axis.
    pub fn from_rotation(radians: f64) -> Self {
        LocalToScene::rotation(Angle::radians(radians)).into()
    }

    pub fn from_scale(scale: f64) -> Self {
        LocalToScene::scale(scale, scale).into()
    }

    /// Applies `translation` after this transform, in scene units.
    pub fn then_translate(self, translation: SceneVector) -> Self {
        self.to_scene.then_translate(translation).into()
    }

    pub fn to_scene(&self) -> LocalToScene {
        self.to_scene
    }

    pub fn map_point(&self, point: LocalPoint) -> ScenePoint {
        self.to_scene.transform_point(point)
    }

    /// Maps a vector, ignoring translation.
    pub fn map_vector(&self, vector: LocalVector) -> SceneVector {
        self.to_scene.transform_vector(vector)
    }

    /// Maps a local direction to a scene space unit vector.
    ///
    /// - Returns `None` if the transform collapses the direction.
    pub fn map_direction(&self, direction: LocalVector) -> Option<SceneVector> {
        let mapped = self.map_vector(direction);
        let length = mapped.length();
        (length > EPSILON).then(|| mapped / length)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn identity_keeps_points() {
        let t = ElementTransform::default();
        assert_eq!(t.map_point(LocalPoint::new(3.0, -2.0)), ScenePoint::new(3.0, -2.0));
    }

    #[test]
    fn translation_moves_points_but_not_directions() {
        let t = ElementTransform::from_translation(10.0, 20.0);
        assert_eq!(t.map_point(LocalPoint::new(1.0, 1.0)), ScenePoint::new(11.0, 21.0));
        assert_eq!(
            t.map_direction(LocalVector::new(1.0, 0.0)),
            Some(SceneVector::new(1.0, 0.0))
        );
    }

    #[test]
    fn rotated_direction() {
        let t = ElementTransform::from_rotation(FRAC_PI_2);
        let d = t.map_direction(LocalVector::new(1.0, 0.0)).unwrap();
        assert_abs_diff_eq!(d.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(d.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn scaled_direction_is_normalized() {
        let t = ElementTransform::from_scale(3.0).then_translate(SceneVector::new(5.0, 5.0));
        let d = t.map_direction(LocalVector::new(0.0, -1.0)).unwrap();
        assert_abs_diff_eq!(d.length(), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(d.y, -1.0, epsilon = 1e-9);
        assert_eq!(t.map_point(LocalPoint::new(1.0, 1.0)), ScenePoint::new(8.0, 8.0));
    }

    #[test]
    fn degenerate_transform_has_no_direction() {
        let t = ElementTransform::from_scale(0.0);
        assert_eq!(t.map_direction(LocalVector::new(1.0, 0.0)), None);
    }
}
