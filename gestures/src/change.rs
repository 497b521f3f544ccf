use std::fmt;

use tactile_geometry::{LocalPoint, ScenePoint};
use tactile_input::TouchId;

use crate::GestureDirection;

/// The recognition state of a drag gesture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum RecognizerState {
    #[default]
    WaitingForTouch,
    /// A touch is being observed as a candidate.
    Undecided { touch: TouchId },
    /// The touch was recognized as a drag and is owned.
    Recognized { touch: TouchId },
}

impl RecognizerState {
    pub fn status(&self) -> RecognizerStatus {
        match self {
            Self::WaitingForTouch => RecognizerStatus::WaitingForTouch,
            Self::Undecided { .. } => RecognizerStatus::Undecided,
            Self::Recognized { .. } => RecognizerStatus::Recognized,
        }
    }

    pub fn touch(&self) -> Option<TouchId> {
        match *self {
            Self::WaitingForTouch => None,
            Self::Undecided { touch } | Self::Recognized { touch } => Some(touch),
        }
    }
}

/// [`RecognizerState`] without the data.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecognizerStatus {
    WaitingForTouch,
    Undecided,
    Recognized,
}

/// A change of an observable drag gesture property.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DragGestureChange {
    Status(RecognizerStatus),
    Pressed(bool),
    Dragging(bool),
    TouchPosition(LocalPoint),
    TouchScenePosition(ScenePoint),
    Distance(f64),
    SceneDistance(f64),
    Direction(GestureDirection),
    DistanceThreshold(f64),
    RecognitionTimeout(u64),
    ImmediateRecognition(bool),
}

pub type Observer = Box<dyn FnMut(&DragGestureChange)>;

#[derive(Default)]
pub struct Observers(Vec<Observer>);

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observers").field(&self.0.len()).finish()
    }
}

impl Observers {
    pub fn subscribe(&mut self, observer: impl FnMut(&DragGestureChange) + 'static) {
        self.0.push(Box::new(observer));
    }

    pub fn notify(&mut self, change: DragGestureChange) {
        for observer in &mut self.0 {
            observer(&change);
        }
    }
}

/// A snapshot of the derived gesture properties, for detecting what an operation changed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct PublicState {
    pub status: RecognizerStatus,
    pub pressed: bool,
    pub dragging: bool,
    pub touch_position: LocalPoint,
    pub touch_scene_position: ScenePoint,
    pub distance: f64,
    pub scene_distance: f64,
}

impl PublicState {
    /// The changes from `self` to `now`, in a stable order.
    pub fn changes_to(&self, now: &PublicState) -> impl Iterator<Item = DragGestureChange> {
        use DragGestureChange::*;
        [
            (self.status != now.status).then_some(Status(now.status)),
            (self.pressed != now.pressed).then_some(Pressed(now.pressed)),
            (self.dragging != now.dragging).then_some(Dragging(now.dragging)),
            (self.touch_position != now.touch_position).then_some(TouchPosition(now.touch_position)),
            (self.touch_scene_position != now.touch_scene_position)
                .then_some(TouchScenePosition(now.touch_scene_position)),
            (self.distance != now.distance).then_some(Distance(now.distance)),
            (self.scene_distance != now.scene_distance).then_some(SceneDistance(now.scene_distance)),
        ]
        .into_iter()
        .flatten()
    }
}
