//! Replays a scripted touch sequence through a drag gesture and logs what it recognizes.
//!
//! ```sh
//! RUST_LOG=debug cargo run --example drag_replay -- [config.toml]
//! ```

use std::{env, rc::Rc};

use anyhow::Result;
use log::info;

use tactile_geometry::{ElementTransform, LocalPoint};
use tactile_gestures::{
    ArbiterRequest, DragGesture, EventDisposition, OwnershipEvent, RecognizerConfig,
    RecordingArbiter,
};
use tactile_input::{ManualClock, TouchEvent, TouchId, TouchPhase, TouchPoint};

const TOUCH: TouchId = TouchId(1);

/// Time, phase, and local position of a single touch.
const SCRIPT: &[(u64, TouchPhase, f64, f64)] = &[
    (0, TouchPhase::Pressed, 100.0, 100.0),
    (16, TouchPhase::Moved, 103.0, 101.0),
    (33, TouchPhase::Moved, 108.0, 101.0),
    (50, TouchPhase::Moved, 114.0, 102.0),
    (66, TouchPhase::Moved, 121.0, 102.0),
    (83, TouchPhase::Moved, 130.0, 103.0),
    (100, TouchPhase::Moved, 140.0, 103.0),
    (116, TouchPhase::Moved, 152.0, 104.0),
    (133, TouchPhase::Stationary, 152.0, 104.0),
    (150, TouchPhase::Released, 155.0, 104.0),
];

fn main() -> Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => RecognizerConfig::load(path)?,
        None => RecognizerConfig::default(),
    };
    config.validate()?;
    info!("Replaying with {config:?}");

    let clock = Rc::new(ManualClock::new(0));
    let arbiter = Rc::new(RecordingArbiter::default());
    let transform = ElementTransform::from_translation(20.0, 40.0);

    let mut gesture = DragGesture::new(config, arbiter.clone(), clock.clone());
    gesture.set_transform(transform);
    gesture.subscribe(|change| info!("{change:?}"));

    for (time, phase, x, y) in SCRIPT.iter().copied() {
        clock.set(time);

        if let Some(deadline) = gesture.recognition_deadline()
            && time >= deadline
        {
            gesture.recognition_timer_elapsed();
        }

        let event: TouchEvent =
            TouchPoint::mapped(TOUCH, phase, LocalPoint::new(x, y), &transform).into();
        if gesture.is_dragging() || phase == TouchPhase::Pressed {
            if gesture.touch_event(&event) == EventDisposition::Consumed {
                info!("{time}ms: consumed");
            }
        } else if gesture.is_pressed() {
            gesture.unowned_touch_event(&event);
        }

        // A single recognizer gets every touch it asks for.
        let owner_requested = arbiter
            .take()
            .into_iter()
            .any(|request| matches!(request, ArbiterRequest::RequestOwnership(..)));
        if owner_requested {
            gesture.ownership_event(OwnershipEvent::Granted(TOUCH));
        }
    }

    info!(
        "Done: distance {:.1}, scene distance {:.1}",
        gesture.distance(),
        gesture.scene_distance()
    );
    Ok(())
}
