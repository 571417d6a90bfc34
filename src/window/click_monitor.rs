//! Global click monitor for detecting clicks outside the overlay

use block2::RcBlock;
use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2::{msg_send, ClassType};
use objc2_app_kit::{NSEvent, NSEventMask};
use std::ptr::NonNull;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use crate::model::Point;

/// Channel sender for click events - stored globally so the block can access it
static CLICK_SENDER: Mutex<Option<Sender<Point>>> = Mutex::new(None);

/// Handle to the click monitor - keeps it alive
pub struct ClickMonitor {
    monitor: Retained<AnyObject>,
}

/// Start the global click monitor and return a handle + receiver
///
/// The ClickMonitor must be kept alive for as long as events are wanted. The
/// Receiver yields screen coordinates for each click delivered to another
/// application; clicks on the overlay itself never show up here.
pub fn start_click_monitor() -> Option<(ClickMonitor, Receiver<Point>)> {
    let (tx, rx) = mpsc::channel();
    if let Ok(mut sender) = CLICK_SENDER.lock() {
        *sender = Some(tx);
    }

    let block = RcBlock::new(|_event_ptr: NonNull<NSEvent>| {
        let location = NSEvent::mouseLocation();

        if let Ok(sender) = CLICK_SENDER.lock() {
            if let Some(sender) = sender.as_ref() {
                let _ = sender.send(Point::new(location.x, location.y));
            }
        }
    });

    let mask = NSEventMask::LeftMouseDown | NSEventMask::RightMouseDown;

    let monitor = NSEvent::addGlobalMonitorForEventsMatchingMask_handler(mask, &block);

    if let Some(monitor) = monitor {
        log::info!("Global click monitor started");
        Some((ClickMonitor { monitor }, rx))
    } else {
        log::error!("Failed to create global click monitor");
        if let Ok(mut sender) = CLICK_SENDER.lock() {
            *sender = None;
        }
        None
    }
}

impl Drop for ClickMonitor {
    fn drop(&mut self) {
        unsafe {
            let _: () = msg_send![NSEvent::class(), removeMonitor: &*self.monitor];
        }
        if let Ok(mut sender) = CLICK_SENDER.lock() {
            *sender = None;
        }
        log::info!("Global click monitor stopped");
    }
}
