use bitflags::bitflags;
use derive_more::{Constructor, Deref, Display, From, Into};

use tactile_geometry::{ElementTransform, LocalPoint, ScenePoint};

/// Identifies a touch among the currently active touches of a window.
///
/// Identifiers get reused after a touch is released.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, From, Into, Display)]
#[display("touch {_0}")]
pub struct TouchId(pub i32);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TouchPhase {
    Pressed,
    Moved,
    Stationary,
    Released,
}

bitflags! {
    /// The union of the phases of all touch points in a [`TouchEvent`].
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
    pub struct TouchPhases: u8 {
        const PRESSED = 1;
        const MOVED = 1 << 1;
        const STATIONARY = 1 << 2;
        const RELEASED = 1 << 3;
    }
}

impl From<TouchPhase> for TouchPhases {
    fn from(phase: TouchPhase) -> Self {
        match phase {
            TouchPhase::Pressed => TouchPhases::PRESSED,
            TouchPhase::Moved => TouchPhases::MOVED,
            TouchPhase::Stationary => TouchPhases::STATIONARY,
            TouchPhase::Released => TouchPhases::RELEASED,
        }
    }
}

/// A single touch point sample.
#[derive(Debug, Copy, Clone, PartialEq, Constructor)]
pub struct TouchPoint {
    pub id: TouchId,
    pub phase: TouchPhase,
    /// Position relative to the element receiving the sample.
    pub pos: LocalPoint,
    pub scene_pos: ScenePoint,
}

impl TouchPoint {
    /// Creates a sample from a local position, computing its scene position with `transform`.
    pub fn mapped(
        id: impl Into<TouchId>,
        phase: TouchPhase,
        pos: LocalPoint,
        transform: &ElementTransform,
    ) -> Self {
        Self::new(id.into(), phase, pos, transform.map_point(pos))
    }

    pub fn is_pressed(&self) -> bool {
        self.phase == TouchPhase::Pressed
    }

    pub fn is_released(&self) -> bool {
        self.phase == TouchPhase::Released
    }
}

/// The touch points that got delivered together.
#[derive(Debug, Clone, Default, PartialEq, Deref, From)]
pub struct TouchEvent(Vec<TouchPoint>);

impl From<TouchPoint> for TouchEvent {
    fn from(point: TouchPoint) -> Self {
        Self(vec![point])
    }
}

impl TouchEvent {
    pub fn new(points: impl IntoIterator<Item = TouchPoint>) -> Self {
        Self(points.into_iter().collect())
    }

    pub fn phases(&self) -> TouchPhases {
        self.iter()
            .fold(TouchPhases::empty(), |phases, p| phases | TouchPhases::from(p.phase))
    }

    /// `true` if at least one touch started with this event.
    pub fn has_pressed(&self) -> bool {
        self.phases().contains(TouchPhases::PRESSED)
    }

    pub fn find(&self, id: TouchId) -> Option<&TouchPoint> {
        self.iter().find(|p| p.id == id)
    }

    /// The touch points that started with this event.
    pub fn pressed(&self) -> impl Iterator<Item = &TouchPoint> {
        self.iter().filter(|p| p.is_pressed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: i32, phase: TouchPhase) -> TouchPoint {
        TouchPoint::mapped(id, phase, LocalPoint::new(1.0, 2.0), &Default::default())
    }

    #[test]
    fn phases_are_combined() {
        let event = TouchEvent::new([
            point(1, TouchPhase::Moved),
            point(2, TouchPhase::Pressed),
        ]);
        assert_eq!(event.phases(), TouchPhases::MOVED | TouchPhases::PRESSED);
        assert!(event.has_pressed());
        assert_eq!(TouchEvent::default().phases(), TouchPhases::empty());
    }

    #[test]
    fn pressed_and_find() {
        let event = TouchEvent::new([
            point(1, TouchPhase::Stationary),
            point(2, TouchPhase::Pressed),
            point(3, TouchPhase::Released),
        ]);
        let pressed: Vec<_> = event.pressed().map(|p| p.id).collect();
        assert_eq!(pressed, [TouchId(2)]);
        assert!(event.find(TouchId(3)).unwrap().is_released());
        assert!(event.find(TouchId(4)).is_none());
    }

    #[test]
    fn mapped_computes_the_scene_position() {
        let transform = ElementTransform::from_translation(10.0, 0.0);
        let p = TouchPoint::mapped(7, TouchPhase::Pressed, LocalPoint::new(1.0, 2.0), &transform);
        assert_eq!(p.scene_pos, ScenePoint::new(11.0, 2.0));
        assert_eq!(p.id.to_string(), "touch 7");
    }
}
