//! Recognition of single finger drags along an axis.
//!
//! A [`DragGesture`] watches the touches that land on its element. A touch that starts alone
//! becomes a candidate and is observed without being taken away from the elements below. Once
//! it has moved far enough in the right direction, the recognizer takes ownership of the touch
//! and reports the drag until the touch is released.
//!
//! The host delivers three kinds of input:
//!
//! - [`DragGesture::touch_event`]: touches delivered to the element directly, this includes new
//!   presses and owned touches.
//! - [`DragGesture::unowned_touch_event`]: updates of candidate or watched touches, forwarded by
//!   the arbiter.
//! - [`DragGesture::ownership_event`]: ownership decisions of the arbiter.
//!
//! In addition, the host wakes the recognizer at [`DragGesture::recognition_deadline`] by calling
//! [`DragGesture::recognition_timer_elapsed`].

use std::rc::Rc;

use itertools::Itertools;
use log::{debug, error, trace, warn};

use tactile_geometry::{ElementTransform, LocalPoint, ScenePoint, SceneVector};
use tactile_input::{ActiveTouches, TouchEvent, TouchId, TouchPoint, TouchPhase, TimeSource};

use crate::{
    DampedPosition, DragGestureChange, GestureDirection, Observers, OwnershipEvent,
    RecognitionTimer, RecognizerConfig, RecognizerId, RecognizerState, RecognizerStatus,
    SmoothingRate, TouchArbiter, change::PublicState,
};

/// What the host should do with a touch event after the recognizer has seen it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventDisposition {
    /// The recognizer took the touch, don't propagate the event.
    Consumed,
    /// Let the elements below see the event.
    Ignored,
}

/// Where the current touch started.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Anchor {
    pos: LocalPoint,
    scene_pos: ScenePoint,
    /// The gesture direction in scene space, a unit vector.
    scene_direction: SceneVector,
}

impl Default for Anchor {
    fn default() -> Self {
        Self {
            pos: LocalPoint::zero(),
            scene_pos: ScenePoint::zero(),
            scene_direction: GestureDirection::default().local_unit_vector().cast_unit(),
        }
    }
}

/// A single finger drag recognizer for one element.
///
/// The recognition timer does not fire by itself. While a touch is undecided,
/// [`Self::recognition_deadline`] returns when it has to be rejected, and the host must call
/// [`Self::recognition_timer_elapsed`] at that time. Only then is the time a candidate waits for
/// an arbiter that stopped sending updates bounded by the recognition timeout. Without the
/// wake-up, an expired deadline is noticed with the next unowned update.
#[derive(Debug)]
pub struct DragGesture {
    id: RecognizerId,
    config: RecognizerConfig,
    arbiter: Rc<dyn TouchArbiter>,
    time_source: Rc<dyn TimeSource>,

    state: RecognizerState,
    enabled: bool,
    visible: bool,
    transform: ElementTransform,

    anchor: Anchor,
    damped_scene_pos: DampedPosition,
    recognition_timer: RecognitionTimer,
    active_touches: ActiveTouches,

    public_pos: LocalPoint,
    public_scene_pos: ScenePoint,

    observers: Observers,
}

impl DragGesture {
    pub fn new(
        config: RecognizerConfig,
        arbiter: Rc<dyn TouchArbiter>,
        time_source: Rc<dyn TimeSource>,
    ) -> Self {
        Self {
            id: RecognizerId::next(),
            damped_scene_pos: DampedPosition::new(config.max_damping_step),
            recognition_timer: RecognitionTimer::new(config.recognition_timeout_ms),
            config,
            arbiter,
            time_source,
            state: RecognizerState::WaitingForTouch,
            enabled: true,
            visible: true,
            transform: ElementTransform::default(),
            anchor: Anchor::default(),
            active_touches: ActiveTouches::default(),
            public_pos: LocalPoint::zero(),
            public_scene_pos: ScenePoint::zero(),
            observers: Observers::default(),
        }
    }

    pub fn id(&self) -> RecognizerId {
        self.id
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&DragGestureChange) + 'static) {
        self.observers.subscribe(observer);
    }

    // Properties

    pub fn direction(&self) -> GestureDirection {
        self.config.direction
    }

    pub fn set_direction(&mut self, direction: GestureDirection) {
        if direction == self.config.direction {
            return;
        }
        self.notifying(|this| this.config.direction = direction);
        self.observers
            .notify(DragGestureChange::Direction(direction));
    }

    pub fn distance_threshold(&self) -> f64 {
        self.config.distance_threshold
    }

    pub fn set_distance_threshold(&mut self, threshold: f64) {
        if threshold == self.config.distance_threshold {
            return;
        }
        self.config.distance_threshold = threshold;
        self.observers
            .notify(DragGestureChange::DistanceThreshold(threshold));
    }

    pub fn max_distance(&self) -> f64 {
        self.config.max_distance
    }

    pub fn set_max_distance(&mut self, max_distance: f64) {
        self.config.max_distance = max_distance;
    }

    pub fn composition_window_ms(&self) -> u64 {
        self.config.composition_window_ms
    }

    pub fn set_composition_window_ms(&mut self, window_ms: u64) {
        self.config.composition_window_ms = window_ms;
    }

    pub fn recognition_timeout_ms(&self) -> u64 {
        self.config.recognition_timeout_ms
    }

    pub fn set_recognition_timeout_ms(&mut self, timeout_ms: u64) {
        if timeout_ms == self.config.recognition_timeout_ms {
            return;
        }
        self.config.recognition_timeout_ms = timeout_ms;
        self.recognition_timer.set_interval(timeout_ms);
        self.observers
            .notify(DragGestureChange::RecognitionTimeout(timeout_ms));
    }

    pub fn immediate_recognition(&self) -> bool {
        self.config.immediate_recognition
    }

    pub fn set_immediate_recognition(&mut self, immediate: bool) {
        if immediate == self.config.immediate_recognition {
            return;
        }
        self.config.immediate_recognition = immediate;
        self.observers
            .notify(DragGestureChange::ImmediateRecognition(immediate));
    }

    pub fn set_max_damping_step(&mut self, max_step: f64) {
        self.config.max_damping_step = max_step;
        self.damped_scene_pos.set_max_delta(max_step);
    }

    pub fn set_smoothing_rate(&mut self, rate: SmoothingRate) {
        self.config.smoothing_rate = rate;
    }

    /// Adapts all distances to the density of the screen the element is shown on.
    pub fn set_pixels_per_mm(&mut self, pixels_per_mm: f64) {
        let mut config = self.config.clone();
        config.set_pixels_per_mm(pixels_per_mm);
        self.set_distance_threshold(config.distance_threshold);
        self.set_max_distance(config.max_distance);
        self.set_max_damping_step(config.max_damping_step);
    }

    /// Practically disables the recognition timeout and the composition window.
    pub fn remove_time_constraints(&mut self) {
        let mut config = self.config.clone();
        config.remove_time_constraints();
        self.set_recognition_timeout_ms(config.recognition_timeout_ms);
        self.set_composition_window_ms(config.composition_window_ms);
        debug!("{}: Removed time constraints", self.id);
    }

    /// The element's current local to scene transform. Used for mapping the gesture direction
    /// into scene space when a touch starts.
    pub fn set_transform(&mut self, transform: ElementTransform) {
        self.transform = transform;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.give_up_if_disabled_or_invisible();
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.give_up_if_disabled_or_invisible();
    }

    // Read only state

    pub fn state(&self) -> RecognizerState {
        self.state
    }

    pub fn status(&self) -> RecognizerStatus {
        self.state.status()
    }

    pub fn is_dragging(&self) -> bool {
        self.status() == RecognizerStatus::Recognized
    }

    pub fn is_pressed(&self) -> bool {
        self.status() != RecognizerStatus::WaitingForTouch
    }

    /// The distance travelled along the axis of the direction, in local coordinates.
    pub fn distance(&self) -> f64 {
        self.config
            .direction
            .axis_distance(self.anchor.pos, self.public_pos)
    }

    /// The distance travelled along the direction, in scene coordinates.
    pub fn scene_distance(&self) -> f64 {
        self.project(self.public_scene_pos - self.anchor.scene_pos)
    }

    pub fn touch_position(&self) -> LocalPoint {
        self.public_pos
    }

    pub fn touch_scene_position(&self) -> ScenePoint {
        self.public_scene_pos
    }

    pub fn active_touches(&self) -> &ActiveTouches {
        &self.active_touches
    }

    /// When the undecided touch gets rejected if it was not recognized until then.
    pub fn recognition_deadline(&self) -> Option<u64> {
        self.recognition_timer.deadline()
    }

    // Inbound events

    pub fn touch_event(&mut self, event: &TouchEvent) -> EventDisposition {
        trace!("{}: {}ms {event:?}", self.id, self.now());

        if !self.enabled || !self.visible {
            return EventDisposition::Ignored;
        }

        self.notifying(|this| {
            let disposition = match this.state {
                RecognizerState::WaitingForTouch => this.touch_event_waiting(event),
                RecognizerState::Undecided { touch } => {
                    this.touch_event_undecided(touch, event);
                    EventDisposition::Ignored
                }
                RecognizerState::Recognized { touch } => {
                    this.touch_event_recognized(touch, event);
                    EventDisposition::Consumed
                }
            };
            this.active_touches.update(event, this.now());
            disposition
        })
    }

    pub fn unowned_touch_event(&mut self, event: &TouchEvent) {
        trace!("{}: Unowned {}ms {event:?}", self.id, self.now());

        self.notifying(|this| {
            if let RecognizerState::Undecided { touch } = this.state {
                this.unowned_touch_event_undecided(touch, event);
            }
            this.active_touches.update(event, this.now());
        });
    }

    pub fn ownership_event(&mut self, event: OwnershipEvent) {
        let touch = event.touch();
        if self.state.touch() != Some(touch) {
            debug!("{}: Ignoring {event:?}, not tracking {touch}", self.id);
            return;
        }

        match event {
            OwnershipEvent::Granted(_) => {
                debug!("{}: Ownership of {touch} granted", self.id);
            }
            OwnershipEvent::Lost(_) => {
                debug!("{}: Lost {touch} to another recognizer", self.id);
                // Keep the composition window up to date.
                self.arbiter.add_touch_watcher(touch, self.id);
                self.notifying(|this| this.set_state(RecognizerState::WaitingForTouch));
            }
        }
    }

    /// Rejects the undecided touch if the recognition timeout has passed.
    ///
    /// Calls before the deadline or after the touch got decided are ignored.
    pub fn recognition_timer_elapsed(&mut self) {
        if !self.recognition_timer.has_elapsed(self.now()) {
            return;
        }
        if let RecognizerState::Undecided { touch } = self.state {
            debug!(
                "{}: Rejecting {touch}, it takes too long to drag beyond the threshold",
                self.id
            );
            self.notifying(|this| this.reject(touch));
        }
    }

    /// Gives up on the current touch. For example when the window lost focus.
    pub fn cancel(&mut self) {
        self.notifying(|this| match this.state {
            RecognizerState::WaitingForTouch => {}
            RecognizerState::Undecided { touch } => this.reject(touch),
            RecognizerState::Recognized { .. } => {
                this.set_state(RecognizerState::WaitingForTouch)
            }
        });
    }

    // State handlers

    fn touch_event_waiting(&mut self, event: &TouchEvent) -> EventDisposition {
        if !event.has_pressed() {
            return EventDisposition::Ignored;
        }

        let Some(point) = self.single_touch_candidate(event) else {
            self.watch_pressed_touches(event);
            return EventDisposition::Ignored;
        };

        self.begin_touch(&point);

        if self.config.recognition_disabled() {
            debug!(
                "{}: Recognition is disabled, requesting {} right away",
                self.id, point.id
            );
            self.arbiter.request_ownership(point.id, self.id);
            self.set_state(RecognizerState::Recognized { touch: point.id });
            EventDisposition::Consumed
        } else {
            // Let the elements below have it, we take it later if it gets recognized.
            self.arbiter.add_candidate_owner(point.id, self.id);
            self.set_state(RecognizerState::Undecided { touch: point.id });
            EventDisposition::Ignored
        }
    }

    /// The pressed touch of `event` if it may become a single finger drag.
    fn single_touch_candidate(&self, event: &TouchEvent) -> Option<TouchPoint> {
        if self.is_within_composition_window() {
            debug!(
                "{}: Touch started within the composition window of another touch",
                self.id
            );
            return None;
        }

        let Ok(point) = event.pressed().exactly_one() else {
            debug!("{}: More than one touch started at once", self.id);
            return None;
        };

        if let Err(e) = self.config.validate() {
            warn!(
                "{}: Gesture recognition is impossible, the recognition properties are wrongly set: {e:#}",
                self.id
            );
            return None;
        }

        Some(*point)
    }

    fn touch_event_undecided(&mut self, touch: TouchId, event: &TouchEvent) {
        if event.find(touch).is_some() {
            trace!("{}: {touch} delivered directly while undecided", self.id);
        }

        // Other touches are of no interest, but their end keeps the composition window up to
        // date.
        self.watch_pressed_touches(event);

        if event.has_pressed() && self.is_within_composition_window() {
            debug!("{}: Multi-finger drags are not accepted", self.id);
            self.reject(touch);
        }
    }

    fn touch_event_recognized(&mut self, touch: TouchId, event: &TouchEvent) {
        let Some(point) = event.find(touch) else {
            error!(
                "{}: {touch} is missing from a touch event without being released first, considering it released",
                self.id
            );
            self.set_state(RecognizerState::WaitingForTouch);
            return;
        };

        self.damped_scene_pos.update(point.scene_pos);
        self.publish_position(point.pos, point.scene_pos);

        if point.phase == TouchPhase::Released {
            self.set_state(RecognizerState::WaitingForTouch);
        }
    }

    fn unowned_touch_event_undecided(&mut self, touch: TouchId, event: &TouchEvent) {
        if self.recognition_timer.has_elapsed(self.now()) {
            debug!("{}: Recognition timeout passed for {touch}", self.id);
            self.reject(touch);
            return;
        }

        let Some(point) = event.find(touch) else {
            error!(
                "{}: {touch} is missing from an unowned touch event without being released first, considering it released",
                self.id
            );
            self.arbiter.remove_candidate_owner(touch, self.id);
            self.set_state(RecognizerState::WaitingForTouch);
            return;
        };

        if point.phase == TouchPhase::Released {
            debug!("{}: {touch} ended before recognition concluded", self.id);
            self.arbiter.remove_candidate_owner(touch, self.id);
            self.set_state(RecognizerState::WaitingForTouch);
            return;
        }

        self.damped_scene_pos.update(point.scene_pos);

        if !self.moving_in_gesture_direction() {
            debug!("{}: Rejecting {touch}, moving in the wrong direction", self.id);
            self.reject(touch);
            return;
        }

        if self.is_within_composition_window() {
            // Another touch may still start and rule out a single finger drag.
            trace!("{}: Still within the composition window", self.id);
            return;
        }

        if self.moved_far_enough_along_gesture_axis() {
            debug!("{}: Recognized {touch}", self.id);
            self.arbiter.request_ownership(touch, self.id);
            self.set_state(RecognizerState::Recognized { touch });
            self.publish_position(point.pos, point.scene_pos);
        } else if self.is_past_max_distance() {
            debug!(
                "{}: Rejecting {touch}, it went farther than the maximum distance without being recognized",
                self.id
            );
            self.reject(touch);
        } else {
            trace!("{}: Not far enough yet", self.id);
        }
    }

    // Transitions

    fn begin_touch(&mut self, point: &TouchPoint) {
        let local_direction = self.config.direction.local_unit_vector();
        let scene_direction = self
            .transform
            .map_direction(local_direction)
            .unwrap_or_else(|| {
                warn!(
                    "{}: Element transform collapses the gesture direction, using the local direction",
                    self.id
                );
                local_direction.cast_unit()
            });

        self.anchor = Anchor {
            pos: point.pos,
            scene_pos: point.scene_pos,
            scene_direction,
        };
        self.damped_scene_pos.reset(point.scene_pos);
        self.publish_position(point.pos, point.scene_pos);
    }

    /// Withdraws the candidacy for `touch` and goes back to waiting.
    fn reject(&mut self, touch: TouchId) {
        self.arbiter.remove_candidate_owner(touch, self.id);
        // Keep the composition window up to date.
        self.arbiter.add_touch_watcher(touch, self.id);
        self.set_state(RecognizerState::WaitingForTouch);
    }

    fn give_up_if_disabled_or_invisible(&mut self) {
        if self.enabled && self.visible {
            return;
        }
        if self.state != RecognizerState::WaitingForTouch {
            debug!("{}: Giving up, disabled or made invisible", self.id);
            self.cancel();
        }
    }

    fn set_state(&mut self, state: RecognizerState) {
        if state == self.state {
            return;
        }

        let previous = self.state;
        if let RecognizerState::Undecided { .. } = previous {
            self.recognition_timer.stop();
        }

        self.state = state;
        debug!(
            "{}: {:?} -> {:?}",
            self.id,
            previous.status(),
            state.status()
        );

        if let RecognizerState::Undecided { .. } = state {
            self.recognition_timer.start(self.now());
        }
    }

    /// Updates the reported positions.
    ///
    /// After a recognition, the touch is likely some distance away from the anchor. Jumping to
    /// it would look like the dragged content appears out of nowhere, so in this case the reported
    /// positions approach the touch over several updates.
    fn publish_position(&mut self, pos: LocalPoint, scene_pos: ScenePoint) {
        if self.status() == RecognizerStatus::Recognized && !self.config.recognition_disabled() {
            let rate = self.config.smoothing_rate;
            self.public_pos = rate.approach_local(self.public_pos, pos);
            self.public_scene_pos = rate.approach_scene(self.public_scene_pos, scene_pos);
        } else {
            self.public_pos = pos;
            self.public_scene_pos = scene_pos;
        }
    }

    fn watch_pressed_touches(&self, event: &TouchEvent) {
        for point in event.pressed() {
            self.arbiter.add_touch_watcher(point.id, self.id);
        }
    }

    // Tests

    fn moving_in_gesture_direction(&self) -> bool {
        self.config.direction.is_bidirectional()
            || self.project(self.damped_scene_pos.movement()) >= 0.0
    }

    fn moved_far_enough_along_gesture_axis(&self) -> bool {
        let threshold = self.config.distance_threshold;
        if threshold <= 0.0 {
            return true;
        }

        let projection = self.project(self.damped_total_movement());
        trace!(
            "{}: Moved {projection} along the gesture axis, threshold is {threshold}",
            self.id
        );
        if self.config.direction.is_bidirectional() {
            projection.abs() > threshold
        } else {
            projection > threshold
        }
    }

    fn is_past_max_distance(&self) -> bool {
        let max_distance = self.config.max_distance;
        self.damped_total_movement().square_length() > max_distance * max_distance
    }

    fn is_within_composition_window(&self) -> bool {
        let window = self.config.composition_window_ms;
        if window == 0 || self.active_touches.is_empty() {
            return false;
        }
        self.active_touches
            .most_recent_start_time()
            .is_some_and(|started| self.now() <= started.saturating_add(window))
    }

    fn damped_total_movement(&self) -> SceneVector {
        self.damped_scene_pos.current() - self.anchor.scene_pos
    }

    /// The scalar projection of `vector` onto the scene direction.
    fn project(&self, vector: SceneVector) -> f64 {
        vector.dot(self.anchor.scene_direction)
    }

    fn now(&self) -> u64 {
        self.time_source.now_ms()
    }

    // Change notifications

    /// Runs `f` and notifies observers about every public property it changed.
    fn notifying<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let before = self.public_state();
        let r = f(self);
        let after = self.public_state();
        for change in before.changes_to(&after) {
            self.observers.notify(change);
        }
        r
    }

    fn public_state(&self) -> PublicState {
        PublicState {
            status: self.status(),
            pressed: self.is_pressed(),
            dragging: self.is_dragging(),
            touch_position: self.public_pos,
            touch_scene_position: self.public_scene_pos,
            distance: self.distance(),
            scene_distance: self.scene_distance(),
        }
    }
}
