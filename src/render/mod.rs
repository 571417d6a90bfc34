//! Where things go inside the overlay view, and (on macOS) how they are
//! painted.
//!
//! View coordinates are the window's content coordinates: bottom-left origin,
//! with the window's top edge flush with the top of the screen.

#[cfg(target_os = "macos")]
mod graphics;

#[cfg(target_os = "macos")]
pub use graphics::{Graphics, Rgba, Shadow};

use std::fmt::Write;

use chrono::{DateTime, TimeZone};

use crate::animation::ShapeFrame;
use crate::model::{Point, Rect, Size};

/// Padding between the panel edge and its content.
pub const CONTENT_PADDING: f64 = 16.0;
/// Below this the panel content is not drawn at all.
const MIN_CONTENT_ALPHA: f64 = 0.01;

pub mod palette {
    pub const FILL: (f64, f64, f64, f64) = (0.0, 0.0, 0.0, 1.0);
    pub const STROKE: (f64, f64, f64, f64) = (1.0, 1.0, 1.0, 0.08);
    pub const STROKE_HOVER: (f64, f64, f64, f64) = (1.0, 1.0, 1.0, 0.2);
    pub const TEXT: (f64, f64, f64, f64) = (1.0, 1.0, 1.0, 1.0);
    pub const TEXT_SECONDARY: (f64, f64, f64, f64) = (0.62, 0.62, 0.66, 1.0);
    pub const FONT_FAMILY: &str = "Helvetica Neue";
    pub const TITLE_SIZE: f64 = 14.0;
}

/// The painted shape for `frame`, centered and hanging from the view's top.
pub fn shape_in_view(view: Size, frame: &ShapeFrame) -> Rect {
    let width = frame.width + frame.corner_radius * 2.0;
    Rect::new(
        (view.width - width) / 2.0,
        view.height - frame.height,
        width,
        frame.height,
    )
}

/// Baseline positions for the panel's header row, or `None` while the shape
/// is too small (or too transparent) to hold it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderLayout {
    /// Left baseline origin of the title
    pub title: Point,
    /// Right edge the clock text is aligned to
    pub clock_right: f64,
    pub alpha: f64,
}

pub fn header_layout(shape: Rect, frame: &ShapeFrame, ascent: f64) -> Option<HeaderLayout> {
    if frame.content_alpha < MIN_CONTENT_ALPHA {
        return None;
    }
    let inner_left = shape.x + frame.corner_radius + CONTENT_PADDING;
    let inner_right = shape.max_x() - frame.corner_radius - CONTENT_PADDING;
    let baseline = shape.max_y() - CONTENT_PADDING - ascent;
    if inner_right <= inner_left || baseline < shape.y + CONTENT_PADDING {
        return None;
    }
    Some(HeaderLayout {
        title: Point::new(inner_left, baseline),
        clock_right: inner_right,
        alpha: frame.content_alpha,
    })
}

/// Formats `now` with a user-supplied chrono format. A malformed format
/// yields an empty string instead of panicking mid-draw.
pub fn format_clock<Tz: TimeZone>(format: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    if write!(out, "{}", now.format(format)).is_err() {
        log::warn!("Invalid clock format '{}'", format);
        out.clear();
    }
    out
}
