use std::cell::Cell;

use objc2::rc::Retained;
use objc2::{define_class, msg_send, MainThreadMarker, MainThreadOnly};
use objc2_app_kit::{
    NSBackingStoreType, NSColor, NSView, NSWindow, NSWindowCollectionBehavior, NSWindowStyleMask,
};
use objc2_foundation::{NSPoint, NSRect, NSSize, NSString};

use crate::model::Rect;

/// NSScreenSaverWindowLevel (1000) + 1: above the menu bar, full-screen
/// apps and the Dock, so nothing can cover the notch.
const OVERLAY_WINDOW_LEVEL: isize = 1001;

// Custom NSWindow subclass that never becomes key or main, so the overlay
// never steals keyboard focus or reacts to Cmd-W style gestures.
define_class!(
    #[unsafe(super(NSWindow))]
    #[thread_kind = MainThreadOnly]
    #[name = "TopNotchWindow"]
    struct TopNotchWindow;

    impl TopNotchWindow {
        #[unsafe(method(canBecomeKeyWindow))]
        fn can_become_key_window(&self) -> bool {
            false
        }

        #[unsafe(method(canBecomeMainWindow))]
        fn can_become_main_window(&self) -> bool {
            false
        }
    }
);

impl TopNotchWindow {
    fn new(mtm: MainThreadMarker, frame: NSRect, style: NSWindowStyleMask) -> Retained<Self> {
        unsafe {
            msg_send![
                Self::alloc(mtm),
                initWithContentRect: frame,
                styleMask: style,
                backing: NSBackingStoreType::Buffered,
                defer: false
            ]
        }
    }
}

/// The transparent surface the notch shape is drawn into.
pub struct NotchWindow {
    window: Retained<NSWindow>,
    ignores_mouse: Cell<bool>,
}

impl NotchWindow {
    pub fn new(mtm: MainThreadMarker, frame: Rect) -> Self {
        let frame = to_ns_rect(frame);
        log::debug!(
            "Creating overlay window at ({}, {}) size {}x{}",
            frame.origin.x,
            frame.origin.y,
            frame.size.width,
            frame.size.height
        );

        let style = NSWindowStyleMask::Borderless | NSWindowStyleMask::FullSizeContentView;
        let custom_window = TopNotchWindow::new(mtm, frame, style);
        let window: Retained<NSWindow> = unsafe { Retained::cast_unchecked(custom_window) };

        window.setLevel(OVERLAY_WINDOW_LEVEL);

        window.setCollectionBehavior(
            NSWindowCollectionBehavior::CanJoinAllSpaces
                | NSWindowCollectionBehavior::Stationary
                | NSWindowCollectionBehavior::FullScreenAuxiliary
                | NSWindowCollectionBehavior::IgnoresCycle,
        );

        // Fully transparent; the view paints the shape and its own shadow
        window.setOpaque(false);
        window.setHasShadow(false);
        let clear_color = NSColor::clearColor();
        window.setBackgroundColor(Some(&clear_color));

        window.setMovableByWindowBackground(false);
        window.setExcludedFromWindowsMenu(true);

        // Start click-through; the event loop enables input over the notch
        window.setIgnoresMouseEvents(true);
        window.setAcceptsMouseMovedEvents(true);

        window.setTitle(&NSString::from_str("TopNotch"));

        Self {
            window,
            ignores_mouse: Cell::new(true),
        }
    }

    pub fn show(&self) {
        self.window.orderFrontRegardless();
        log::debug!("Overlay window visible={}", self.window.isVisible());
    }

    pub fn set_content_view(&self, view: &NSView) {
        self.window.setContentView(Some(view));
    }

    pub fn set_needs_display(&self) {
        if let Some(view) = self.window.contentView() {
            view.setNeedsDisplay(true);
        }
    }

    /// Lets clicks fall through to whatever is below when `ignore` is true.
    pub fn set_ignores_mouse_events(&self, ignore: bool) {
        if self.ignores_mouse.get() == ignore {
            return;
        }
        self.ignores_mouse.set(ignore);
        self.window.setIgnoresMouseEvents(ignore);
        log::trace!("Overlay click-through={}", ignore);
    }

    pub fn set_frame(&self, frame: Rect) {
        log::info!(
            "Repositioning overlay window to ({}, {}) size {}x{}",
            frame.x,
            frame.y,
            frame.width,
            frame.height
        );
        self.window.setFrame_display(to_ns_rect(frame), true);
    }
}

pub fn to_ns_rect(rect: Rect) -> NSRect {
    NSRect::new(
        NSPoint::new(rect.x, rect.y),
        NSSize::new(rect.width, rect.height),
    )
}

pub fn from_ns_rect(rect: NSRect) -> Rect {
    Rect::new(
        rect.origin.x,
        rect.origin.y,
        rect.size.width,
        rect.size.height,
    )
}
