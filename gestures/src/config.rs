use std::{fs, path::Path};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use tactile_geometry::{LocalPoint, ScenePoint};

use crate::GestureDirection;

pub const DEFAULT_RECOGNITION_TIMEOUT_MS: u64 = 400;
pub const DEFAULT_COMPOSITION_WINDOW_MS: u64 = 60;
/// A 96 dpi screen.
pub const DEFAULT_PIXELS_PER_MM: f64 = 96.0 / 25.4;

/// Distances derived from the physical screen density.
const DISTANCE_THRESHOLD_MM: f64 = 4.0;
const MAX_DISTANCE_MM: f64 = 10.0;
const MAX_DAMPING_STEP_MM: f64 = 1.0;

/// Recognition timeout used when time constraints are removed.
const UNCONSTRAINED_RECOGNITION_TIMEOUT_MS: u64 = 60 * 60 * 1000;

/// Recognition parameters of a drag gesture.
///
/// All distances are in scene units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RecognizerConfig {
    pub direction: GestureDirection,
    /// How far the touch has to travel along the direction before it gets recognized.
    pub distance_threshold: f64,
    /// A touch that travels farther than this without being recognized gets rejected.
    pub max_distance: f64,
    /// A second touch starting within this time after a touch started rules out a single finger
    /// drag.
    pub composition_window_ms: u64,
    /// How long a touch may stay undecided.
    pub recognition_timeout_ms: u64,
    /// Recognize as soon as a touch lands, without any tests.
    pub immediate_recognition: bool,
    /// The maximum distance the damped touch position moves per update.
    pub max_damping_step: f64,
    /// How fast reported positions catch up with the touch after recognition.
    pub smoothing_rate: SmoothingRate,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self::for_pixels_per_mm(DEFAULT_PIXELS_PER_MM)
    }
}

impl RecognizerConfig {
    /// A default configuration with distances matching a screen density.
    pub fn for_pixels_per_mm(pixels_per_mm: f64) -> Self {
        Self {
            direction: GestureDirection::default(),
            distance_threshold: DISTANCE_THRESHOLD_MM * pixels_per_mm,
            max_distance: MAX_DISTANCE_MM * pixels_per_mm,
            composition_window_ms: DEFAULT_COMPOSITION_WINDOW_MS,
            recognition_timeout_ms: DEFAULT_RECOGNITION_TIMEOUT_MS,
            immediate_recognition: false,
            max_damping_step: MAX_DAMPING_STEP_MM * pixels_per_mm,
            smoothing_rate: SmoothingRate::default(),
        }
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml).context("Parsing drag gesture configuration")?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let toml = fs::read_to_string(path)
            .with_context(|| format!("Reading drag gesture configuration {}", path.display()))?;
        Self::from_toml_str(&toml).with_context(|| format!("In {}", path.display()))
    }

    /// Adjusts the density dependent distances, keeping everything else.
    pub fn set_pixels_per_mm(&mut self, pixels_per_mm: f64) {
        let defaults = Self::for_pixels_per_mm(pixels_per_mm);
        self.distance_threshold = defaults.distance_threshold;
        self.max_distance = defaults.max_distance;
        self.max_damping_step = defaults.max_damping_step;
    }

    /// No recognition timeout worth mentioning and no composition window.
    pub fn remove_time_constraints(&mut self) {
        self.recognition_timeout_ms = UNCONSTRAINED_RECOGNITION_TIMEOUT_MS;
        self.composition_window_ms = 0;
    }

    /// `true` if every touch gets recognized right away.
    pub fn recognition_disabled(&self) -> bool {
        self.immediate_recognition
            || (self.distance_threshold <= 0.0 && self.composition_window_ms == 0)
    }

    /// Checks whether recognition is possible with this configuration.
    pub fn validate(&self) -> Result<()> {
        if self.recognition_disabled() {
            return Ok(());
        }
        ensure!(
            self.distance_threshold < self.max_distance,
            "Distance threshold ({}) must be less than the maximum distance ({})",
            self.distance_threshold,
            self.max_distance
        );
        ensure!(
            self.composition_window_ms < self.recognition_timeout_ms,
            "Composition window ({}ms) must be shorter than the recognition timeout ({}ms)",
            self.composition_window_ms,
            self.recognition_timeout_ms
        );
        ensure!(
            self.max_damping_step > 0.0,
            "Maximum damping step ({}) must be positive",
            self.max_damping_step
        );
        Ok(())
    }
}

/// The fraction of the remaining distance a reported position moves towards the touch per update.
///
/// In `(0, 1]`, so positions converge monotonically and never overshoot. `1` follows the touch
/// without smoothing.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Deserialize)]
#[serde(try_from = "f64")]
pub struct SmoothingRate(f64);

impl Default for SmoothingRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<f64> for SmoothingRate {
    type Error = anyhow::Error;

    fn try_from(rate: f64) -> Result<Self> {
        Self::new(rate)
    }
}

impl From<SmoothingRate> for f64 {
    fn from(rate: SmoothingRate) -> Self {
        rate.0
    }
}

impl SmoothingRate {
    pub const DEFAULT: Self = Self(0.4);
    pub const NONE: Self = Self(1.0);

    pub fn new(rate: f64) -> Result<Self> {
        ensure!(
            rate > 0.0 && rate <= 1.0,
            "Smoothing rate must be in the range (0, 1], was {rate}"
        );
        Ok(Self(rate))
    }

    pub fn approach_local(self, from: LocalPoint, to: LocalPoint) -> LocalPoint {
        from.lerp(to, self.0)
    }

    pub fn approach_scene(self, from: ScenePoint, to: ScenePoint) -> ScenePoint {
        from.lerp(to, self.0)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn valid() -> RecognizerConfig {
        RecognizerConfig {
            distance_threshold: 10.0,
            max_distance: 50.0,
            composition_window_ms: 60,
            recognition_timeout_ms: 400,
            ..Default::default()
        }
    }

    #[test]
    fn defaults() {
        let config = RecognizerConfig::default();
        assert_eq!(config.direction, GestureDirection::Rightwards);
        assert_eq!(config.recognition_timeout_ms, 400);
        assert_eq!(config.composition_window_ms, 60);
        assert!(!config.immediate_recognition);
        assert_eq!(config.smoothing_rate, SmoothingRate::DEFAULT);
        assert_abs_diff_eq!(config.distance_threshold, 4.0 * 96.0 / 25.4, epsilon = 1e-9);
        // One millimeter per update.
        assert_abs_diff_eq!(config.max_damping_step, 96.0 / 25.4, epsilon = 1e-9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn threshold_must_be_below_max_distance() {
        let config = RecognizerConfig {
            distance_threshold: 100.0,
            ..valid()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("maximum distance"));
    }

    #[test]
    fn composition_window_must_be_below_timeout() {
        let config = RecognizerConfig {
            composition_window_ms: 400,
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn disabled_recognition_skips_validation() {
        let config = RecognizerConfig {
            distance_threshold: 100.0,
            immediate_recognition: true,
            ..valid()
        };
        assert!(config.recognition_disabled());
        assert!(config.validate().is_ok());

        let config = RecognizerConfig {
            distance_threshold: 0.0,
            composition_window_ms: 0,
            recognition_timeout_ms: 0,
            ..valid()
        };
        assert!(config.recognition_disabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn removing_time_constraints() {
        let mut config = valid();
        config.remove_time_constraints();
        assert_eq!(config.composition_window_ms, 0);
        assert_eq!(config.recognition_timeout_ms, 3_600_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn pixel_density() {
        let mut config = valid();
        config.set_pixels_per_mm(10.0);
        assert_eq!(config.distance_threshold, 40.0);
        assert_eq!(config.max_distance, 100.0);
        assert_eq!(config.max_damping_step, 10.0);
        assert_eq!(config.recognition_timeout_ms, 400);
    }

    #[test]
    fn parse_toml() {
        let config = RecognizerConfig::from_toml_str(
            r#"
direction = "horizontal"
distance-threshold = 12.5
max-distance = 40
recognition-timeout-ms = 500
smoothing-rate = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(config.direction, GestureDirection::Horizontal);
        assert_eq!(config.distance_threshold, 12.5);
        assert_eq!(config.max_distance, 40.0);
        assert_eq!(config.recognition_timeout_ms, 500);
        assert_eq!(f64::from(config.smoothing_rate), 0.25);
        // Not mentioned, so the default.
        assert_eq!(config.composition_window_ms, DEFAULT_COMPOSITION_WINDOW_MS);
    }

    #[test]
    fn parse_toml_rejects_bad_values() {
        assert!(RecognizerConfig::from_toml_str("smoothing-rate = 1.5").is_err());
        assert!(RecognizerConfig::from_toml_str("smoothing-rate = 0.0").is_err());
        assert!(RecognizerConfig::from_toml_str("direction = \"diagonal\"").is_err());
        assert!(RecognizerConfig::from_toml_str("distance = 3.0").is_err());
    }

    #[test]
    fn smoothing_never_overshoots() {
        let rate = SmoothingRate::DEFAULT;
        let target = ScenePoint::new(100.0, 0.0);
        let mut pos = ScenePoint::zero();
        let mut previous_gap = f64::MAX;
        for _ in 0..50 {
            pos = rate.approach_scene(pos, target);
            let gap = target.x - pos.x;
            assert!(gap >= 0.0);
            assert!(gap < previous_gap);
            previous_gap = gap;
        }

        let jump = SmoothingRate::NONE.approach_local(LocalPoint::zero(), LocalPoint::new(3.0, 4.0));
        assert_eq!(jump, LocalPoint::new(3.0, 4.0));
    }
}
