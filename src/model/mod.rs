//! Overlay state machine and the geometry derived from it.
//!
//! The model owns the current [`OverlayState`] and [`OpenReason`]. Everything
//! else (the notch rect, the opened panel, the drop detector) is recomputed
//! on demand from the live screen frame, so display changes are picked up
//! without any invalidation.

mod geometry;
pub mod input;

pub use geometry::{Point, Rect, Size};
pub use input::{InputArbiter, InputEvent, InputOutcome};

use std::fmt;
use std::str::FromStr;

/// Corner radius of the closed shape.
const CLOSED_CORNER_RADIUS: f64 = 10.0;
/// Corner radius of the opened panel.
const OPENED_CORNER_RADIUS: f64 = 24.0;
/// Corner radius of the popping preview.
const POPPING_CORNER_RADIUS: f64 = 12.0;
/// Opacity of the closed/popping shape while the overlay is dimmed.
pub const DIMMED_OPACITY: f64 = 0.3;
/// Room below the tallest shape for its drop shadow.
const SURFACE_SHADOW_MARGIN: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverlayState {
    #[default]
    Closed,
    Opened,
    /// Quick preview between closed and opened. Nothing transitions here yet.
    Popping,
}

impl OverlayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayState::Closed => "closed",
            OverlayState::Opened => "opened",
            OverlayState::Popping => "popping",
        }
    }
}

impl fmt::Display for OverlayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OpenReason {
    Click,
    Drag,
    Boot,
    #[default]
    Unknown,
}

impl OpenReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenReason::Click => "click",
            OpenReason::Drag => "drag",
            OpenReason::Boot => "boot",
            OpenReason::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OpenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpenReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "click" => Ok(OpenReason::Click),
            "drag" => Ok(OpenReason::Drag),
            "boot" => Ok(OpenReason::Boot),
            "unknown" => Ok(OpenReason::Unknown),
            other => Err(format!("unknown open reason '{}'", other)),
        }
    }
}

/// Size constants the derived rects are built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Assumed size of the hardware cutout
    pub notch_size: Size,
    /// Size of the expanded panel
    pub opened_size: Size,
    /// Closed shape shrink / popping growth / drag-exit slack
    pub inset: f64,
    /// Extra extent of the drop detector
    pub drop_range: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            notch_size: Size::new(160.0, 30.0),
            opened_size: Size::new(500.0, 120.0),
            inset: 4.0,
            drop_range: 32.0,
        }
    }
}

/// Source of the primary screen frame.
///
/// Queried on every geometry computation; implementations must not cache.
pub trait ScreenMetrics {
    /// Frame of the primary screen, or `None` when no screen is attached.
    fn main_screen_frame(&self) -> Option<Rect>;
}

/// A screen that never changes. Used before AppKit is up and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedScreen(pub Option<Rect>);

impl ScreenMetrics for FixedScreen {
    fn main_screen_frame(&self) -> Option<Rect> {
        self.0
    }
}

/// Receiver of the fire-and-forget haptic pulse.
pub trait HapticSink {
    fn pulse(&self);
}

/// Called after every mutation with the updated model.
pub type Listener = Box<dyn Fn(&OverlayModel)>;

pub struct OverlayModel {
    state: OverlayState,
    open_reason: OpenReason,
    visible: bool,
    geometry: Geometry,
    screen: Box<dyn ScreenMetrics>,
    haptics: Option<Box<dyn HapticSink>>,
    activate_app: Box<dyn Fn()>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for OverlayModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayModel")
            .field("state", &self.state)
            .field("open_reason", &self.open_reason)
            .field("visible", &self.visible)
            .field("geometry", &self.geometry)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl OverlayModel {
    pub fn new(geometry: Geometry, screen: Box<dyn ScreenMetrics>) -> Self {
        Self {
            state: OverlayState::Closed,
            open_reason: OpenReason::Unknown,
            visible: true,
            geometry,
            screen,
            haptics: None,
            activate_app: Box::new(|| {}),
            listeners: Vec::new(),
        }
    }

    pub fn with_haptics(mut self, sink: Box<dyn HapticSink>) -> Self {
        self.haptics = Some(sink);
        self
    }

    /// Sets the capability that brings the process to the foreground on open.
    pub fn with_activator(mut self, activate: impl Fn() + 'static) -> Self {
        self.activate_app = Box::new(activate);
        self
    }

    pub fn subscribe(&mut self, listener: impl Fn(&OverlayModel) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(self);
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn open_reason(&self) -> OpenReason {
        self.open_reason
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn open(&mut self, reason: OpenReason) {
        log::debug!("open: {} -> opened ({})", self.state, reason);
        self.open_reason = reason;
        self.state = OverlayState::Opened;
        (self.activate_app)();
        self.notify();
    }

    pub fn close(&mut self) {
        log::debug!("close: {} -> closed", self.state);
        self.state = OverlayState::Closed;
        self.open_reason = OpenReason::Unknown;
        self.notify();
    }

    pub fn toggle(&mut self) {
        if self.state == OverlayState::Closed {
            self.open(OpenReason::Click);
        } else {
            self.close();
        }
        self.pulse_haptic();
    }

    /// Emits one haptic pulse if a sink is attached.
    pub fn pulse_haptic(&self) {
        if let Some(haptics) = &self.haptics {
            haptics.pulse();
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        self.notify();
    }

    /// Replaces the size constants, e.g. after a config reload.
    pub fn set_geometry(&mut self, geometry: Geometry) {
        if self.geometry == geometry {
            return;
        }
        self.geometry = geometry;
        self.notify();
    }

    // ---------------------------------------------------------------------
    // Geometry
    // ---------------------------------------------------------------------

    /// Primary screen frame, or the zero rect when there is no screen.
    pub fn screen_frame(&self) -> Rect {
        self.screen.main_screen_frame().unwrap_or(Rect::ZERO)
    }

    pub fn notch_rect(&self) -> Rect {
        let size = self.geometry.notch_size;
        match self.screen.main_screen_frame() {
            Some(screen) => screen.hanging_from_top(size),
            None => Rect::new(0.0, 0.0, size.width, size.height),
        }
    }

    pub fn opened_panel_rect(&self) -> Rect {
        self.screen_frame()
            .hanging_from_top(self.geometry.opened_size)
    }

    pub fn size_for(&self, state: OverlayState) -> Size {
        let notch = self.notch_rect().size();
        match state {
            OverlayState::Closed => notch.grow(-self.geometry.inset),
            OverlayState::Opened => self.geometry.opened_size,
            OverlayState::Popping => notch.grow(self.geometry.inset),
        }
    }

    pub fn corner_radius_for(state: OverlayState) -> f64 {
        match state {
            OverlayState::Closed => CLOSED_CORNER_RADIUS,
            OverlayState::Opened => OPENED_CORNER_RADIUS,
            OverlayState::Popping => POPPING_CORNER_RADIUS,
        }
    }

    pub fn current_size(&self) -> Size {
        self.size_for(self.state)
    }

    pub fn corner_radius(&self) -> f64 {
        Self::corner_radius_for(self.state)
    }

    /// Opacity the shape should be drawn with.
    pub fn opacity(&self) -> f64 {
        if self.visible || self.state == OverlayState::Opened {
            1.0
        } else {
            DIMMED_OPACITY
        }
    }

    /// The painted shape: the current size widened by one corner radius on
    /// each side so the rounded corners flare out from the cutout.
    pub fn shape_rect(&self) -> Rect {
        let size = self.current_size();
        let radius = self.corner_radius();
        self.screen_frame()
            .hanging_from_top(Size::new(size.width + radius * 2.0, size.height))
    }

    pub fn drop_detection_rect(&self) -> Rect {
        let size = self.current_size();
        let height = if self.state == OverlayState::Closed {
            size.height
        } else {
            self.notch_rect().height
        };
        let range = self.geometry.drop_range;
        self.screen_frame()
            .hanging_from_top(Size::new(size.width + range, height + range))
    }

    /// Where the overlay takes pointer input; everything else clicks through.
    pub fn hit_region(&self) -> Rect {
        self.drop_detection_rect().union(&self.shape_rect())
    }

    /// Frame of the hosting window: the full screen width, tall enough for
    /// the largest shape and its shadow.
    pub fn surface_rect(&self) -> Rect {
        let screen = self.screen_frame();
        let tallest = [
            OverlayState::Closed,
            OverlayState::Opened,
            OverlayState::Popping,
        ]
        .iter()
        .map(|state| self.size_for(*state).height)
        .fold(0.0, f64::max);
        let height = tallest + SURFACE_SHADOW_MARGIN;
        Rect::new(screen.x, screen.max_y() - height, screen.width, height)
    }

    /// The opened panel grown by the inset, used to decide whether a pointer
    /// has really left the panel.
    pub fn opened_panel_slack_rect(&self) -> Rect {
        self.opened_panel_rect().inflate(self.geometry.inset)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    pub const SCREEN: Rect = Rect::new(0.0, 0.0, 1440.0, 900.0);

    #[derive(Clone, Default)]
    pub struct Counter(pub Rc<Cell<u32>>);

    impl Counter {
        pub fn get(&self) -> u32 {
            self.0.get()
        }

        pub fn bump(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    impl HapticSink for Counter {
        fn pulse(&self) {
            self.bump();
        }
    }

    /// Model on a 1440x900 screen with counters for haptics and activation.
    pub fn model() -> (OverlayModel, Counter, Counter) {
        let haptics = Counter::default();
        let activations = Counter::default();
        let activated = activations.clone();
        let model = OverlayModel::new(Geometry::default(), Box::new(FixedScreen(Some(SCREEN))))
            .with_haptics(Box::new(haptics.clone()))
            .with_activator(move || activated.bump());
        (model, haptics, activations)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn starts_closed_and_unknown() {
        let (model, haptics, activations) = model();
        assert_eq!(model.state(), OverlayState::Closed);
        assert_eq!(model.open_reason(), OpenReason::Unknown);
        assert!(model.is_visible());
        assert_eq!(haptics.get(), 0);
        assert_eq!(activations.get(), 0);
    }

    #[test]
    fn toggle_alternates_strictly() {
        let (mut model, haptics, _) = model();
        let mut expected = OverlayState::Closed;
        for i in 0..9 {
            model.toggle();
            expected = if expected == OverlayState::Closed {
                OverlayState::Opened
            } else {
                OverlayState::Closed
            };
            assert_eq!(model.state(), expected, "after toggle #{}", i + 1);
        }
        assert_eq!(haptics.get(), 9);
    }

    #[test]
    fn toggle_on_fresh_model_opens_with_click() {
        let (mut model, haptics, activations) = model();
        model.toggle();
        assert_eq!(model.state(), OverlayState::Opened);
        assert_eq!(model.open_reason(), OpenReason::Click);
        assert_eq!(haptics.get(), 1);
        assert_eq!(activations.get(), 1);
    }

    #[test]
    fn second_open_overwrites_reason() {
        let (mut model, _, activations) = model();
        model.open(OpenReason::Boot);
        model.open(OpenReason::Drag);
        assert_eq!(model.state(), OverlayState::Opened);
        assert_eq!(model.open_reason(), OpenReason::Drag);
        assert_eq!(activations.get(), 2);
    }

    #[test]
    fn close_resets_reason_from_any_reason() {
        for reason in [OpenReason::Click, OpenReason::Drag, OpenReason::Boot] {
            let (mut model, haptics, _) = model();
            model.open(reason);
            model.close();
            assert_eq!(model.state(), OverlayState::Closed);
            assert_eq!(model.open_reason(), OpenReason::Unknown);
            assert_eq!(haptics.get(), 0);
        }
    }

    #[test]
    fn close_when_closed_is_harmless() {
        let (mut model, _, _) = model();
        model.close();
        model.close();
        assert_eq!(model.state(), OverlayState::Closed);
    }

    #[test]
    fn haptics_are_optional() {
        let mut model = OverlayModel::new(Geometry::default(), Box::new(FixedScreen(Some(SCREEN))));
        model.toggle();
        model.pulse_haptic();
        assert_eq!(model.state(), OverlayState::Opened);
    }

    #[test]
    fn listeners_see_every_mutation() {
        let (mut model, _, _) = model();
        let seen: Rc<RefCell<Vec<(OverlayState, OpenReason)>>> = Rc::default();
        let sink = seen.clone();
        model.subscribe(move |m| sink.borrow_mut().push((m.state(), m.open_reason())));

        model.open(OpenReason::Drag);
        model.close();
        model.toggle();

        assert_eq!(
            *seen.borrow(),
            vec![
                (OverlayState::Opened, OpenReason::Drag),
                (OverlayState::Closed, OpenReason::Unknown),
                (OverlayState::Opened, OpenReason::Click),
            ]
        );
    }

    #[test]
    fn set_visible_notifies_only_on_change() {
        let (mut model, _, _) = model();
        let count = Counter::default();
        let c = count.clone();
        model.subscribe(move |_| c.bump());
        model.set_visible(true);
        assert_eq!(count.get(), 0);
        model.set_visible(false);
        assert_eq!(count.get(), 1);
        assert!(!model.is_visible());
        assert_eq!(model.state(), OverlayState::Closed);
    }

    #[test]
    fn notch_rect_on_reference_screen() {
        let (model, _, _) = model();
        assert_eq!(model.notch_rect(), Rect::new(640.0, 870.0, 160.0, 30.0));
        assert_eq!(model.current_size(), Size::new(156.0, 26.0));
        assert_eq!(model.corner_radius(), 10.0);
    }

    #[test]
    fn notch_rect_follows_screen_origin() {
        let model = OverlayModel::new(
            Geometry::default(),
            Box::new(FixedScreen(Some(Rect::new(-1440.0, 200.0, 1440.0, 900.0)))),
        );
        assert_eq!(model.notch_rect(), Rect::new(-800.0, 1070.0, 160.0, 30.0));
    }

    #[test]
    fn per_state_sizes_and_radii() {
        let (model, _, _) = model();
        assert_eq!(model.size_for(OverlayState::Opened), Size::new(500.0, 120.0));
        assert_eq!(model.size_for(OverlayState::Popping), Size::new(164.0, 34.0));
        assert_eq!(OverlayModel::corner_radius_for(OverlayState::Opened), 24.0);
        assert_eq!(OverlayModel::corner_radius_for(OverlayState::Popping), 12.0);
    }

    #[test]
    fn closed_size_clamps_on_degenerate_notch() {
        for notch in [Size::new(0.0, 0.0), Size::new(3.0, 2.0), Size::new(160.0, 1.0)] {
            let geometry = Geometry {
                notch_size: notch,
                ..Geometry::default()
            };
            let model = OverlayModel::new(geometry, Box::new(FixedScreen(Some(SCREEN))));
            let size = model.current_size();
            assert!(size.width >= 0.0 && size.height >= 0.0);
            assert!(size.width <= notch.width && size.height <= notch.height);
        }
    }

    #[test]
    fn opened_panel_is_centered_and_hangs_from_top() {
        for screen in [
            SCREEN,
            Rect::new(0.0, 0.0, 1512.0, 982.0),
            Rect::new(300.0, -50.0, 2560.0, 1440.0),
            Rect::new(0.0, 0.0, 400.0, 300.0),
        ] {
            let model = OverlayModel::new(Geometry::default(), Box::new(FixedScreen(Some(screen))));
            let rect = model.opened_panel_rect();
            assert_eq!(rect.x + rect.width / 2.0, screen.x + screen.width / 2.0);
            assert_eq!(rect.max_y(), screen.max_y());
            assert_eq!(rect.size(), Size::new(500.0, 120.0));
        }
    }

    #[test]
    fn missing_screen_falls_back() {
        let model = OverlayModel::new(Geometry::default(), Box::new(FixedScreen(None)));
        assert_eq!(model.notch_rect(), Rect::new(0.0, 0.0, 160.0, 30.0));
        assert_eq!(model.screen_frame(), Rect::ZERO);
        assert_eq!(model.opened_panel_rect(), Rect::new(-250.0, -120.0, 500.0, 120.0));
        assert_eq!(model.current_size(), Size::new(156.0, 26.0));
    }

    #[test]
    fn drop_detector_tracks_state() {
        let (mut model, _, _) = model();
        assert_eq!(model.drop_detection_rect(), Rect::new(626.0, 842.0, 188.0, 58.0));

        model.open(OpenReason::Click);
        // Opened: panel width, but only the notch height plus range
        assert_eq!(model.drop_detection_rect(), Rect::new(454.0, 838.0, 532.0, 62.0));
    }

    #[test]
    fn shape_rect_adds_corner_flare() {
        let (mut model, _, _) = model();
        assert_eq!(model.shape_rect(), Rect::new(632.0, 874.0, 176.0, 26.0));
        model.open(OpenReason::Click);
        assert_eq!(model.shape_rect(), Rect::new(446.0, 780.0, 548.0, 120.0));
        assert_eq!(model.hit_region(), Rect::new(446.0, 780.0, 548.0, 120.0));
    }

    #[test]
    fn surface_spans_width_and_fits_panel() {
        let (model, _, _) = model();
        let surface = model.surface_rect();
        assert_eq!(surface, Rect::new(0.0, 756.0, 1440.0, 144.0));
        for state in [OverlayState::Closed, OverlayState::Opened, OverlayState::Popping] {
            assert!(model.size_for(state).height < surface.height);
        }
    }

    #[test]
    fn dimming_only_affects_closed_shape() {
        let (mut model, _, _) = model();
        model.set_visible(false);
        assert_eq!(model.opacity(), DIMMED_OPACITY);
        model.open(OpenReason::Click);
        assert_eq!(model.opacity(), 1.0);
        model.close();
        assert_eq!(model.opacity(), DIMMED_OPACITY);
    }

    #[test]
    fn set_geometry_reshapes_and_notifies() {
        let (mut model, _, _) = model();
        let count = Counter::default();
        let c = count.clone();
        model.subscribe(move |_| c.bump());
        model.set_geometry(Geometry::default());
        assert_eq!(count.get(), 0);
        model.set_geometry(Geometry {
            notch_size: Size::new(200.0, 32.0),
            ..Geometry::default()
        });
        assert_eq!(count.get(), 1);
        assert_eq!(model.notch_rect(), Rect::new(620.0, 868.0, 200.0, 32.0));
    }

    #[test]
    fn reasons_parse_from_names() {
        assert_eq!("drag".parse::<OpenReason>(), Ok(OpenReason::Drag));
        assert_eq!(" Boot ".parse::<OpenReason>(), Ok(OpenReason::Boot));
        assert!("swipe".parse::<OpenReason>().is_err());
        assert_eq!(OpenReason::Click.to_string(), "click");
        assert_eq!(OverlayState::Popping.to_string(), "popping");
    }

    struct LiveScreen(Rc<Cell<Rect>>);

    impl ScreenMetrics for LiveScreen {
        fn main_screen_frame(&self) -> Option<Rect> {
            Some(self.0.get())
        }
    }

    #[test]
    fn geometry_follows_screen_changes() {
        let frame = Rc::new(Cell::new(SCREEN));
        let model = OverlayModel::new(Geometry::default(), Box::new(LiveScreen(frame.clone())));
        assert_eq!(model.notch_rect(), Rect::new(640.0, 870.0, 160.0, 30.0));
        assert_eq!(model.opened_panel_rect(), Rect::new(470.0, 780.0, 500.0, 120.0));
        assert_eq!(model.surface_rect(), Rect::new(0.0, 756.0, 1440.0, 144.0));

        frame.set(Rect::new(0.0, 0.0, 1728.0, 1117.0));
        assert_eq!(model.notch_rect(), Rect::new(784.0, 1087.0, 160.0, 30.0));
        assert_eq!(model.opened_panel_rect(), Rect::new(614.0, 997.0, 500.0, 120.0));
        assert_eq!(model.surface_rect(), Rect::new(0.0, 973.0, 1728.0, 144.0));
    }
}
