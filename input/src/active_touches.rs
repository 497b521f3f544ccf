//! Bookkeeping of the touches that are currently down and when they started.
//!
//! Touch identifiers are reused quickly and entries come and go with every event batch, so the
//! entries live in a fixed pool of slots with an occupancy mask instead of a growing collection.

use log::{debug, error};
use static_assertions::const_assert;

use crate::{TouchEvent, TouchId, TouchPhase, TouchPhases};

/// The maximum number of simultaneously tracked touches. Further touches are not tracked.
pub const ACTIVE_TOUCH_CAPACITY: usize = 16;

const_assert!(ACTIVE_TOUCH_CAPACITY <= u32::BITS as usize);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ActiveTouch {
    pub id: TouchId,
    pub start_time_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ActiveTouches {
    slots: [ActiveTouch; ACTIVE_TOUCH_CAPACITY],
    /// Bit `n` is set if `slots[n]` is in use.
    occupied: u32,
}

impl ActiveTouches {
    /// Applies all presses and releases of `event`. Presses get `now_ms` as their start time.
    pub fn update(&mut self, event: &TouchEvent, now_ms: u64) {
        if !event
            .phases()
            .intersects(TouchPhases::PRESSED | TouchPhases::RELEASED)
        {
            return;
        }

        for point in event.iter() {
            match point.phase {
                TouchPhase::Pressed => self.on_touch_start(point.id, now_ms),
                TouchPhase::Released => self.on_touch_end(point.id),
                TouchPhase::Moved | TouchPhase::Stationary => {}
            }
        }
    }

    pub fn on_touch_start(&mut self, id: TouchId, start_time_ms: u64) {
        // A reused identifier whose release we did not see.
        self.on_touch_end(id);

        let Some(slot) = self.free_slot() else {
            debug!(
                "All {ACTIVE_TOUCH_CAPACITY} active touch slots are in use, not tracking {id}"
            );
            return;
        };

        self.slots[slot] = ActiveTouch { id, start_time_ms };
        self.occupied |= 1u32 << slot;
    }

    pub fn on_touch_end(&mut self, id: TouchId) {
        if let Some(slot) = self.slot_of(id) {
            self.occupied &= !(1u32 << slot);
        }
    }

    /// The latest start time of all active touches.
    ///
    /// Callers are expected to check [`Self::is_empty`] first, asking an empty bookkeeper is
    /// considered a logic error and logged.
    pub fn most_recent_start_time(&self) -> Option<u64> {
        if self.is_empty() {
            error!("Internal error: asked for the most recent start time without active touches");
            return None;
        }
        self.iter().map(|touch| touch.start_time_ms).max()
    }

    pub fn start_time(&self, id: TouchId) -> Option<u64> {
        self.slot_of(id).map(|slot| self.slots[slot].start_time_ms)
    }

    pub fn contains(&self, id: TouchId) -> bool {
        self.slot_of(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub fn len(&self) -> usize {
        self.occupied.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveTouch> {
        self.occupied_slots().map(move |slot| &self.slots[slot])
    }

    fn slot_of(&self, id: TouchId) -> Option<usize> {
        self.occupied_slots().find(|slot| self.slots[*slot].id == id)
    }

    fn free_slot(&self) -> Option<usize> {
        let slot = (!self.occupied).trailing_zeros() as usize;
        (slot < ACTIVE_TOUCH_CAPACITY).then_some(slot)
    }

    fn occupied_slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..ACTIVE_TOUCH_CAPACITY).filter(move |slot| self.occupied & (1u32 << *slot) != 0)
    }
}

#[cfg(test)]
mod tests {
    use tactile_geometry::LocalPoint;

    use super::*;
    use crate::TouchPoint;

    fn event(points: &[(i32, TouchPhase)]) -> TouchEvent {
        TouchEvent::new(points.iter().map(|(id, phase)| {
            TouchPoint::mapped(*id, *phase, LocalPoint::zero(), &Default::default())
        }))
    }

    #[test]
    fn starts_empty() {
        let touches = ActiveTouches::default();
        assert!(touches.is_empty());
        assert_eq!(touches.len(), 0);
        assert_eq!(touches.most_recent_start_time(), None);
    }

    #[test]
    fn tracks_presses_and_releases() {
        let mut touches = ActiveTouches::default();
        touches.update(&event(&[(1, TouchPhase::Pressed)]), 10);
        touches.update(&event(&[(1, TouchPhase::Moved), (2, TouchPhase::Pressed)]), 25);

        assert_eq!(touches.len(), 2);
        assert_eq!(touches.start_time(TouchId(1)), Some(10));
        assert_eq!(touches.most_recent_start_time(), Some(25));

        touches.update(&event(&[(2, TouchPhase::Released)]), 30);
        assert!(!touches.contains(TouchId(2)));
        assert_eq!(touches.most_recent_start_time(), Some(10));

        touches.update(&event(&[(1, TouchPhase::Released)]), 40);
        assert!(touches.is_empty());
    }

    #[test]
    fn moves_do_not_change_anything() {
        let mut touches = ActiveTouches::default();
        touches.update(&event(&[(1, TouchPhase::Pressed)]), 10);
        touches.update(&event(&[(1, TouchPhase::Moved), (3, TouchPhase::Stationary)]), 50);
        assert_eq!(touches.len(), 1);
        assert_eq!(touches.start_time(TouchId(1)), Some(10));
    }

    #[test]
    fn releasing_an_unknown_touch_is_ignored() {
        let mut touches = ActiveTouches::default();
        touches.on_touch_start(TouchId(1), 5);
        touches.on_touch_end(TouchId(9));
        assert_eq!(touches.len(), 1);
    }

    #[test]
    fn reused_identifier_replaces_the_stale_entry() {
        let mut touches = ActiveTouches::default();
        touches.on_touch_start(TouchId(1), 5);
        touches.on_touch_start(TouchId(1), 80);
        assert_eq!(touches.len(), 1);
        assert_eq!(touches.start_time(TouchId(1)), Some(80));
    }

    #[test]
    fn saturated_pool_ignores_new_touches() {
        let mut touches = ActiveTouches::default();
        for i in 0..ACTIVE_TOUCH_CAPACITY {
            touches.on_touch_start(TouchId(i as i32), i as u64);
        }
        touches.on_touch_start(TouchId(100), 1000);

        assert_eq!(touches.len(), ACTIVE_TOUCH_CAPACITY);
        assert!(!touches.contains(TouchId(100)));
        assert_eq!(
            touches.most_recent_start_time(),
            Some(ACTIVE_TOUCH_CAPACITY as u64 - 1)
        );

        // A freed slot gets reused.
        touches.on_touch_end(TouchId(3));
        touches.on_touch_start(TouchId(100), 1000);
        assert!(touches.contains(TouchId(100)));
        assert_eq!(touches.most_recent_start_time(), Some(1000));
    }
}
