//! Coordinate spaces shared by touch input and gesture recognition.
//!
//! Every element has its own local coordinate system. All elements of a window share the scene
//! coordinate system. Keeping the two apart in the type system makes it impossible to feed a
//! local position into a scene space computation by accident.

mod transform;

pub use transform::*;

/// The coordinate system of a single element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSpace;

/// The coordinate system shared by all elements of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneSpace;

pub type LocalPoint = euclid::Point2D<f64, LocalSpace>;
pub type LocalVector = euclid::Vector2D<f64, LocalSpace>;
pub type ScenePoint = euclid::Point2D<f64, SceneSpace>;
pub type SceneVector = euclid::Vector2D<f64, SceneSpace>;

pub const EPSILON: f64 = f64::EPSILON;
