use serde::Deserialize;

use tactile_geometry::{LocalPoint, LocalVector};

/// The direction a touch has to move in to be recognized as a drag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureDirection {
    /// Along the positive x axis.
    #[default]
    Rightwards,
    /// Along the negative x axis.
    Leftwards,
    /// Along the negative y axis.
    Upwards,
    /// Along the positive y axis.
    Downwards,
    /// Along the x axis, in any direction.
    Horizontal,
    /// Along the y axis, in any direction.
    Vertical,
}

impl GestureDirection {
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Rightwards | Self::Leftwards | Self::Horizontal)
    }

    pub fn is_vertical(self) -> bool {
        !self.is_horizontal()
    }

    /// `true` if movement of both signs along the axis counts.
    pub fn is_bidirectional(self) -> bool {
        matches!(self, Self::Horizontal | Self::Vertical)
    }

    /// The unit vector of the direction in local coordinates. Bidirectional directions point
    /// towards the positive side of their axis.
    pub fn local_unit_vector(self) -> LocalVector {
        match self {
            Self::Rightwards | Self::Horizontal => LocalVector::new(1.0, 0.0),
            Self::Leftwards => LocalVector::new(-1.0, 0.0),
            Self::Downwards | Self::Vertical => LocalVector::new(0.0, 1.0),
            Self::Upwards => LocalVector::new(0.0, -1.0),
        }
    }

    /// The signed distance from `from` to `to` along this direction's axis.
    ///
    /// This is measured along the axis and not along the direction, so moving left under
    /// [`Self::Leftwards`] yields a negative distance.
    pub fn axis_distance(self, from: LocalPoint, to: LocalPoint) -> f64 {
        if self.is_horizontal() {
            to.x - from.x
        } else {
            to.y - from.y
        }
    }
}
