//! Maps raw pointer and drag events from the surface onto model transitions.

use super::{OpenReason, OverlayModel, OverlayState, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    HoverEntered,
    HoverExited,
    /// Single click/tap on the overlay
    Click,
    DragEntered,
    /// The drag left the drop target; `pointer` is where the cursor is now
    DragExited { pointer: Point },
    /// Something was dropped on the overlay
    Drop { pointer: Point },
    /// A click delivered to another application
    OutsideClick { pointer: Point },
    /// Polled pointer location. The only source of hover: crossing the hit
    /// region becomes `HoverEntered` / `HoverExited`.
    PointerMoved { pointer: Point },
}

/// What the surface needs to know after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputOutcome {
    /// The model state or reason changed
    pub state_changed: bool,
    /// The hover flag flipped
    pub hover_changed: bool,
}

#[derive(Debug, Default)]
pub struct InputArbiter {
    hovering: bool,
    drop_targeting: bool,
}

impl InputArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn is_drop_targeting(&self) -> bool {
        self.drop_targeting
    }

    /// Whether the window should take mouse events at `pointer`.
    pub fn accepts_pointer(model: &OverlayModel, pointer: Point) -> bool {
        model.hit_region().contains(pointer)
    }

    pub fn handle(&mut self, model: &mut OverlayModel, event: InputEvent) -> InputOutcome {
        let before = (model.state(), model.open_reason());
        let hovering_before = self.hovering;

        match event {
            InputEvent::HoverEntered => self.hovering = true,
            InputEvent::HoverExited => self.hovering = false,
            InputEvent::Click => {
                log::debug!("click on overlay while {}", model.state());
                model.toggle();
            }
            InputEvent::DragEntered => {
                self.drop_targeting = true;
                self.open_for_drag(model);
            }
            InputEvent::DragExited { pointer } => {
                self.drop_targeting = false;
                Self::close_if_left_panel(model, pointer);
            }
            InputEvent::Drop { pointer } => {
                self.open_for_drag(model);
                self.drop_targeting = false;
                Self::close_if_left_panel(model, pointer);
            }
            InputEvent::OutsideClick { pointer } => {
                if model.state() == OverlayState::Opened
                    && !model.opened_panel_slack_rect().contains(pointer)
                    && !model.hit_region().contains(pointer)
                {
                    log::debug!(
                        "click outside overlay at ({:.1}, {:.1}), closing",
                        pointer.x,
                        pointer.y
                    );
                    model.close();
                }
            }
            InputEvent::PointerMoved { pointer } => {
                let inside = Self::accepts_pointer(model, pointer);
                if inside != self.hovering {
                    let crossing = if inside {
                        InputEvent::HoverEntered
                    } else {
                        InputEvent::HoverExited
                    };
                    return self.handle(model, crossing);
                }
            }
        }

        InputOutcome {
            state_changed: before != (model.state(), model.open_reason()),
            hover_changed: hovering_before != self.hovering,
        }
    }

    fn open_for_drag(&self, model: &mut OverlayModel) {
        if model.state() == OverlayState::Closed {
            model.open(OpenReason::Drag);
            model.pulse_haptic();
        }
    }

    fn close_if_left_panel(model: &mut OverlayModel, pointer: Point) {
        if model.state() == OverlayState::Opened
            && !model.opened_panel_slack_rect().contains(pointer)
        {
            log::debug!(
                "drag left panel at ({:.1}, {:.1}), closing",
                pointer.x,
                pointer.y
            );
            model.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::model;

    const FAR_AWAY: Point = Point::new(100.0, 100.0);
    const PANEL_MIDDLE: Point = Point::new(720.0, 850.0);

    #[test]
    fn hover_is_visual_only() {
        let (mut model, haptics, _) = model();
        let mut input = InputArbiter::new();

        let outcome = input.handle(&mut model, InputEvent::HoverEntered);
        assert!(input.is_hovering());
        assert!(outcome.hover_changed);
        assert!(!outcome.state_changed);

        input.handle(&mut model, InputEvent::HoverExited);
        assert!(!input.is_hovering());
        assert_eq!(model.state(), OverlayState::Closed);
        assert_eq!(haptics.get(), 0);
    }

    #[test]
    fn click_toggles() {
        let (mut model, haptics, _) = model();
        let mut input = InputArbiter::new();

        assert!(input.handle(&mut model, InputEvent::Click).state_changed);
        assert_eq!(model.state(), OverlayState::Opened);
        assert_eq!(model.open_reason(), OpenReason::Click);

        input.handle(&mut model, InputEvent::Click);
        assert_eq!(model.state(), OverlayState::Closed);
        assert_eq!(haptics.get(), 2);
    }

    #[test]
    fn drag_enter_then_exit_outside() {
        let (mut model, haptics, activations) = model();
        let mut input = InputArbiter::new();

        input.handle(&mut model, InputEvent::DragEntered);
        assert!(input.is_drop_targeting());
        assert_eq!(model.state(), OverlayState::Opened);
        assert_eq!(model.open_reason(), OpenReason::Drag);
        assert_eq!(haptics.get(), 1);
        assert_eq!(activations.get(), 1);

        input.handle(&mut model, InputEvent::DragExited { pointer: FAR_AWAY });
        assert!(!input.is_drop_targeting());
        assert_eq!(model.state(), OverlayState::Closed);
        assert_eq!(model.open_reason(), OpenReason::Unknown);
        assert_eq!(haptics.get(), 1);
    }

    #[test]
    fn drag_exit_inside_panel_keeps_it_open() {
        let (mut model, _, _) = model();
        let mut input = InputArbiter::new();
        input.handle(&mut model, InputEvent::DragEntered);
        input.handle(&mut model, InputEvent::DragExited { pointer: PANEL_MIDDLE });
        assert_eq!(model.state(), OverlayState::Opened);
    }

    #[test]
    fn drag_exit_within_slack_keeps_it_open() {
        let (mut model, _, _) = model();
        let mut input = InputArbiter::new();
        input.handle(&mut model, InputEvent::DragEntered);

        // Panel spans x 470..970, y 780..900; inset 4 gives 466..974, 776..904
        input.handle(&mut model, InputEvent::DragExited { pointer: Point::new(467.0, 777.0) });
        assert_eq!(model.state(), OverlayState::Opened);

        input.handle(&mut model, InputEvent::DragExited { pointer: Point::new(720.0, 775.0) });
        assert_eq!(model.state(), OverlayState::Closed);
    }

    #[test]
    fn drag_enter_while_open_keeps_reason() {
        let (mut model, haptics, _) = model();
        let mut input = InputArbiter::new();
        input.handle(&mut model, InputEvent::Click);
        input.handle(&mut model, InputEvent::DragEntered);
        assert_eq!(model.open_reason(), OpenReason::Click);
        assert_eq!(haptics.get(), 1);
    }

    #[test]
    fn drag_exit_while_closed_does_nothing() {
        let (mut model, _, _) = model();
        let mut input = InputArbiter::new();
        let outcome = input.handle(&mut model, InputEvent::DragExited { pointer: FAR_AWAY });
        assert!(!outcome.state_changed);
        assert_eq!(model.state(), OverlayState::Closed);
    }

    #[test]
    fn drop_on_closed_opens_and_stays_open() {
        let (mut model, haptics, _) = model();
        let mut input = InputArbiter::new();
        input.handle(&mut model, InputEvent::Drop { pointer: PANEL_MIDDLE });
        assert_eq!(model.state(), OverlayState::Opened);
        assert_eq!(model.open_reason(), OpenReason::Drag);
        assert_eq!(haptics.get(), 1);
        assert!(!input.is_drop_targeting());
    }

    #[test]
    fn outside_click_closes_open_panel() {
        let (mut model, _, _) = model();
        let mut input = InputArbiter::new();
        input.handle(&mut model, InputEvent::Click);

        input.handle(&mut model, InputEvent::OutsideClick { pointer: PANEL_MIDDLE });
        assert_eq!(model.state(), OverlayState::Opened);

        let outcome = input.handle(&mut model, InputEvent::OutsideClick { pointer: FAR_AWAY });
        assert!(outcome.state_changed);
        assert_eq!(model.state(), OverlayState::Closed);
    }

    #[test]
    fn outside_click_when_closed_is_ignored() {
        let (mut model, haptics, _) = model();
        let mut input = InputArbiter::new();
        input.handle(&mut model, InputEvent::OutsideClick { pointer: FAR_AWAY });
        assert_eq!(model.state(), OverlayState::Closed);
        assert_eq!(haptics.get(), 0);
    }

    #[test]
    fn pointer_motion_drives_hover_and_click_through() {
        let (mut model, _, _) = model();
        let mut input = InputArbiter::new();

        // Top-center of the screen is over the closed notch
        let over_notch = Point::new(720.0, 895.0);
        assert!(InputArbiter::accepts_pointer(&model, over_notch));
        let outcome = input.handle(&mut model, InputEvent::PointerMoved { pointer: over_notch });
        assert!(outcome.hover_changed);
        assert!(input.is_hovering());

        // Where the opened panel would be, but it is closed
        assert!(!InputArbiter::accepts_pointer(&model, Point::new(720.0, 800.0)));
        let outcome = input.handle(&mut model, InputEvent::PointerMoved { pointer: FAR_AWAY });
        assert!(outcome.hover_changed);
        assert!(!input.is_hovering());

        model.open(OpenReason::Click);
        assert!(InputArbiter::accepts_pointer(&model, Point::new(720.0, 800.0)));
    }

    #[test]
    fn hover_only_inside_hit_region() {
        let (mut model, _, _) = model();
        let mut input = InputArbiter::new();

        // Top edge of the screen, inside the window but far from the notch
        let beside_notch = Point::new(100.0, 895.0);
        let outcome = input.handle(&mut model, InputEvent::PointerMoved { pointer: beside_notch });
        assert!(!outcome.hover_changed);
        assert!(!input.is_hovering());

        let over_notch = Point::new(720.0, 895.0);
        assert!(input.handle(&mut model, InputEvent::PointerMoved { pointer: over_notch }).hover_changed);
        let again = Point::new(710.0, 890.0);
        assert!(!input.handle(&mut model, InputEvent::PointerMoved { pointer: again }).hover_changed);
        assert!(input.is_hovering());

        assert!(input.handle(&mut model, InputEvent::PointerMoved { pointer: beside_notch }).hover_changed);
        assert!(!input.is_hovering());
    }
}
