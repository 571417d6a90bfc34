pub mod click_monitor;
pub mod feedback;
pub mod notch_window;
pub mod screen;

pub use click_monitor::{start_click_monitor, ClickMonitor};
pub use feedback::{activate_app, TrackpadHaptics};
pub use notch_window::NotchWindow;
pub use screen::MainScreen;
