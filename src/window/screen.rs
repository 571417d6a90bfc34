use objc2::MainThreadMarker;
use objc2_app_kit::NSScreen;

use super::notch_window::from_ns_rect;
use crate::model::{Rect, ScreenMetrics};

/// Reads the primary display from AppKit on every call.
///
/// "Primary" is the first entry of `NSScreen.screens` (the one carrying the
/// menu bar). `mainScreen` follows the key window, so it is only a fallback.
#[derive(Debug, Clone, Copy)]
pub struct MainScreen {
    mtm: MainThreadMarker,
}

impl MainScreen {
    pub fn new(mtm: MainThreadMarker) -> Self {
        Self { mtm }
    }
}

impl ScreenMetrics for MainScreen {
    fn main_screen_frame(&self) -> Option<Rect> {
        let screen = NSScreen::screens(self.mtm)
            .firstObject()
            .or_else(|| NSScreen::mainScreen(self.mtm))?;
        Some(from_ns_rect(screen.frame()))
    }
}
