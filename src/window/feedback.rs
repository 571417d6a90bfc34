//! Haptic and activation capabilities handed to the overlay model.

use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2::{class, msg_send, MainThreadMarker};
use objc2_app_kit::NSApplication;

use crate::model::HapticSink;

/// NSHapticFeedbackPatternGeneric
const HAPTIC_PATTERN_GENERIC: isize = 0;
/// NSHapticFeedbackPerformanceTimeNow
const HAPTIC_TIME_NOW: usize = 1;

/// Pulses the trackpad through `NSHapticFeedbackManager`.
///
/// Machines without a Force Touch trackpad silently ignore the request.
pub struct TrackpadHaptics;

impl HapticSink for TrackpadHaptics {
    fn pulse(&self) {
        unsafe {
            let performer: Option<Retained<AnyObject>> =
                msg_send![class!(NSHapticFeedbackManager), defaultPerformer];
            match performer {
                Some(performer) => {
                    let _: () = msg_send![
                        &performer,
                        performFeedbackPattern: HAPTIC_PATTERN_GENERIC,
                        performanceTime: HAPTIC_TIME_NOW
                    ];
                }
                None => log::debug!("No haptic performer available"),
            }
        }
    }
}

/// Brings the (Dock-less) process to the foreground.
pub fn activate_app(mtm: MainThreadMarker) {
    let app = NSApplication::sharedApplication(mtm);
    unsafe {
        let _: () = msg_send![&app, activateIgnoringOtherApps: true];
    }
}
