use std::sync::mpsc::Receiver;
use std::sync::{Arc, RwLock};
use std::time::Instant;

use objc2::rc::Retained;
use objc2::MainThreadMarker;
use objc2_app_kit::{NSApplication, NSApplicationActivationPolicy, NSEvent};
use objc2_foundation::NSDate;

use crate::config::{load_config, Config, ConfigWatcher, SharedConfig};
use crate::ipc::{subscribe_ipc_commands, IpcCommand};
use crate::model::{InputEvent, Point, Rect, ScreenMetrics};
use crate::overlay::Overlay;
use crate::view::{install_overlay, with_overlay, NotchView};
use crate::window::notch_window::to_ns_rect;
use crate::window::{
    activate_app, start_click_monitor, ClickMonitor, MainScreen, NotchWindow, TrackpadHaptics,
};

/// Event wait while the shape is animating (one display frame)
const FRAME_INTERVAL: f64 = 1.0 / 60.0;
/// Event wait while idle
const IDLE_INTERVAL: f64 = 0.05;

pub struct App {
    _app: Retained<NSApplication>,
    window: NotchWindow,
    _view: Retained<NotchView>,
    config: SharedConfig,
    config_watcher: Option<ConfigWatcher>,
    _click_monitor: Option<ClickMonitor>,
    clicks: Option<Receiver<Point>>,
    ipc_commands: async_channel::Receiver<IpcCommand>,
    surface: Rect,
}

impl App {
    /// Builds the overlay window for the primary screen. Returns `None` when
    /// no screen is attached.
    pub fn new(mtm: MainThreadMarker) -> Option<Self> {
        let app = NSApplication::sharedApplication(mtm);
        // Accessory policy: no dock icon, no menu bar
        app.setActivationPolicy(NSApplicationActivationPolicy::Accessory);

        let screen = MainScreen::new(mtm);
        if screen.main_screen_frame().is_none() {
            log::error!("No screen attached, nothing to overlay");
            return None;
        }

        let config = Arc::new(RwLock::new(load_config()));
        let config_watcher = match ConfigWatcher::new(config.clone()) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                log::error!("Failed to set up config watcher: {}", e);
                None
            }
        };

        let overlay = Overlay::new(
            &snapshot(&config),
            Box::new(screen),
            Some(Box::new(TrackpadHaptics)),
            move || activate_app(mtm),
        );
        let surface = overlay.model().surface_rect();

        let window = NotchWindow::new(mtm, surface);
        let view = NotchView::new(
            mtm,
            to_ns_rect(Rect::new(0.0, 0.0, surface.width, surface.height)),
        );
        window.set_content_view(&view);
        install_overlay(overlay);
        window.show();

        let (click_monitor, clicks) = match start_click_monitor() {
            Some((monitor, rx)) => (Some(monitor), Some(rx)),
            None => (None, None),
        };

        Some(Self {
            _app: app,
            window,
            _view: view,
            config,
            config_watcher,
            _click_monitor: click_monitor,
            clicks,
            ipc_commands: subscribe_ipc_commands(),
            surface,
        })
    }

    pub fn run(mut self, mtm: MainThreadMarker) {
        let app = NSApplication::sharedApplication(mtm);
        let mut last_tick = Instant::now();

        log::info!("Entering event loop");

        // Manual event loop so animation steps and polling share one thread
        loop {
            let animating = with_overlay(|overlay| overlay.is_animating()).unwrap_or(false);
            let wait = if animating { FRAME_INTERVAL } else { IDLE_INTERVAL };

            let date = NSDate::dateWithTimeIntervalSinceNow(wait);
            while let Some(event) = unsafe {
                app.nextEventMatchingMask_untilDate_inMode_dequeue(
                    objc2_app_kit::NSEventMask::Any,
                    Some(&date),
                    objc2_foundation::NSDefaultRunLoopMode,
                    true,
                )
            } {
                log::trace!("Event type: {:?}", event.r#type());
                app.sendEvent(&event);
                app.updateWindows();
            }

            let mut dirty = false;
            dirty |= self.drain_ipc_commands();
            dirty |= self.drain_outside_clicks();
            dirty |= self.reload_config_if_changed();
            dirty |= self.track_pointer();
            dirty |= self.follow_screen();

            let now = Instant::now();
            let dt = now.duration_since(last_tick).as_secs_f64();
            last_tick = now;
            dirty |= with_overlay(|overlay| overlay.step_animation(dt)).unwrap_or(false);

            if dirty {
                self.window.set_needs_display();
            }
        }
    }

    fn drain_ipc_commands(&mut self) -> bool {
        let mut changed = false;
        while let Ok(command) = self.ipc_commands.try_recv() {
            log::debug!("IPC command: {:?}", command);
            if command == IpcCommand::Reload {
                let config = load_config();
                match self.config.write() {
                    Ok(mut shared) => *shared = config.clone(),
                    Err(e) => log::error!("Config lock poisoned: {}", e),
                }
                with_overlay(|overlay| overlay.apply_config(&config));
                log::info!("Config reloaded on request");
                changed = true;
            } else {
                changed |= with_overlay(|overlay| overlay.apply_command(&command)).unwrap_or(false);
            }
        }
        changed
    }

    fn drain_outside_clicks(&mut self) -> bool {
        let Some(clicks) = self.clicks.as_ref() else {
            return false;
        };
        let mut changed = false;
        while let Ok(pointer) = clicks.try_recv() {
            let outcome =
                with_overlay(|overlay| overlay.handle_input(InputEvent::OutsideClick { pointer }));
            changed |= outcome.is_some_and(|o| o.state_changed);
        }
        changed
    }

    fn reload_config_if_changed(&mut self) -> bool {
        let Some(watcher) = self.config_watcher.as_ref() else {
            return false;
        };
        if !watcher.check_and_reload() {
            return false;
        }
        let config = snapshot(&self.config);
        with_overlay(|overlay| overlay.apply_config(&config));
        true
    }

    /// Drives hover from the polled cursor and switches click-through so only
    /// the shape and its drop zone take mouse input.
    fn track_pointer(&mut self) -> bool {
        let location = NSEvent::mouseLocation();
        let pointer = Point::new(location.x, location.y);

        let Some((accepts, outcome)) = with_overlay(|overlay| {
            let outcome = overlay.handle_input(InputEvent::PointerMoved { pointer });
            (overlay.accepts_pointer(pointer), outcome)
        }) else {
            return false;
        };

        self.window.set_ignores_mouse_events(!accepts);
        outcome.hover_changed
    }

    /// Keeps the window glued to the top of the primary screen across
    /// resolution and arrangement changes.
    fn follow_screen(&mut self) -> bool {
        let Some(surface) = with_overlay(|overlay| overlay.model().surface_rect()) else {
            return false;
        };
        if surface == self.surface {
            return false;
        }
        self.surface = surface;
        self.window.set_frame(surface);
        with_overlay(|overlay| overlay.refresh_target());
        true
    }
}

fn snapshot(config: &SharedConfig) -> Config {
    match config.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
