use std::cell::RefCell;

use objc2::rc::Retained;
use objc2::runtime::AnyObject;
use objc2::{define_class, msg_send, MainThreadMarker, MainThreadOnly};
use objc2_app_kit::{
    NSDragOperation, NSEvent, NSGraphicsContext, NSPasteboardTypeFileURL, NSPasteboardTypePNG,
    NSPasteboardTypeString, NSPasteboardTypeTIFF, NSPasteboardTypeURL, NSView,
};
use objc2_foundation::{NSArray, NSRect};

use crate::model::{InputEvent, Point, Size};
use crate::overlay::Overlay;
use crate::render::{self, palette, Graphics, Shadow};

thread_local! {
    // AppKit callbacks and the event loop both run on the main thread
    static OVERLAY: RefCell<Option<Overlay>> = const { RefCell::new(None) };
    static GRAPHICS: RefCell<Option<Graphics>> = const { RefCell::new(None) };
}

/// Hands the overlay to the view layer. Call once, before the window shows.
pub fn install_overlay(overlay: Overlay) {
    OVERLAY.with(|cell| *cell.borrow_mut() = Some(overlay));
}

/// Runs `f` against the installed overlay. Returns `None` when no overlay is
/// installed or it is already borrowed further up the stack.
pub fn with_overlay<R>(f: impl FnOnce(&mut Overlay) -> R) -> Option<R> {
    OVERLAY.with(|cell| match cell.try_borrow_mut() {
        Ok(mut overlay) => overlay.as_mut().map(f),
        Err(_) => {
            log::warn!("Overlay re-entered from AppKit callback, event dropped");
            None
        }
    })
}

define_class!(
    #[unsafe(super(NSView))]
    #[thread_kind = MainThreadOnly]
    #[name = "TopNotchView"]
    pub struct NotchView;

    impl NotchView {
        #[unsafe(method(drawRect:))]
        fn draw_rect(&self, _dirty_rect: NSRect) {
            self.draw_content();
        }

        #[unsafe(method(isOpaque))]
        fn is_opaque(&self) -> bool {
            false
        }

        #[unsafe(method(acceptsFirstMouse:))]
        fn accepts_first_mouse(&self, _event: Option<&NSEvent>) -> bool {
            true
        }

        #[unsafe(method(mouseDown:))]
        fn mouse_down(&self, _event: &NSEvent) {
            // Toggle fires on mouse-up
        }

        #[unsafe(method(mouseUp:))]
        fn mouse_up(&self, _event: &NSEvent) {
            self.dispatch(InputEvent::Click);
        }

        #[unsafe(method(draggingEntered:))]
        fn dragging_entered(&self, _sender: &AnyObject) -> NSDragOperation {
            self.dispatch(InputEvent::DragEntered);
            NSDragOperation::Copy
        }

        #[unsafe(method(draggingUpdated:))]
        fn dragging_updated(&self, _sender: &AnyObject) -> NSDragOperation {
            NSDragOperation::Copy
        }

        #[unsafe(method(draggingExited:))]
        fn dragging_exited(&self, _sender: Option<&AnyObject>) {
            self.dispatch(InputEvent::DragExited {
                pointer: mouse_location(),
            });
        }

        #[unsafe(method(prepareForDragOperation:))]
        fn prepare_for_drag_operation(&self, _sender: &AnyObject) -> bool {
            true
        }

        #[unsafe(method(performDragOperation:))]
        fn perform_drag_operation(&self, _sender: &AnyObject) -> bool {
            self.dispatch(InputEvent::Drop {
                pointer: mouse_location(),
            });
            true
        }
    }
);

impl NotchView {
    pub fn new(mtm: MainThreadMarker, frame: NSRect) -> Retained<Self> {
        let view: Retained<Self> = unsafe { msg_send![Self::alloc(mtm), initWithFrame: frame] };

        // Accept anything a user is likely to drag toward the notch
        unsafe {
            let types = NSArray::from_slice(&[
                NSPasteboardTypeFileURL,
                NSPasteboardTypeURL,
                NSPasteboardTypeString,
                NSPasteboardTypeTIFF,
                NSPasteboardTypePNG,
            ]);
            view.registerForDraggedTypes(&types);
        }

        view
    }

    fn dispatch(&self, event: InputEvent) {
        log::trace!("View input: {:?}", event);
        let outcome = with_overlay(|overlay| overlay.handle_input(event));
        if outcome.is_some_and(|o| o.state_changed || o.hover_changed) {
            self.setNeedsDisplay(true);
        }
    }

    fn draw_content(&self) {
        let bounds = self.bounds();

        let Some(ns_context) = NSGraphicsContext::currentContext() else {
            return;
        };
        let cg_context = ns_context.CGContext();
        let cg_context_ptr: *mut core_graphics::sys::CGContext =
            Retained::as_ptr(&cg_context) as *const _ as *mut _;
        let mut ctx =
            unsafe { core_graphics::context::CGContext::from_existing_context_ptr(cg_context_ptr) };

        GRAPHICS.with(|graphics| {
            let mut graphics = graphics.borrow_mut();
            if graphics.is_none() {
                *graphics = Graphics::new(palette::FONT_FAMILY, palette::TITLE_SIZE);
            }
            let Some(graphics) = graphics.as_ref() else {
                return;
            };

            graphics.clear(&mut ctx, bounds.size.width, bounds.size.height);

            OVERLAY.with(|cell| {
                let Ok(overlay) = cell.try_borrow() else {
                    return;
                };
                let Some(overlay) = overlay.as_ref() else {
                    return;
                };
                draw_overlay(
                    graphics,
                    &mut ctx,
                    Size::new(bounds.size.width, bounds.size.height),
                    overlay,
                );
            });
        });
    }
}

fn draw_overlay(
    graphics: &Graphics,
    ctx: &mut core_graphics::context::CGContext,
    view: Size,
    overlay: &Overlay,
) {
    let frame = overlay.frame();
    if frame.opacity <= 0.0 {
        return;
    }
    let shape = render::shape_in_view(view, &frame);

    let fade = |(r, g, b, a): (f64, f64, f64, f64), alpha: f64| (r, g, b, a * alpha);

    let mut shadow = Shadow::blend(frame.content_alpha);
    shadow.color = fade(shadow.color, frame.opacity);
    graphics.fill_notch_shape(
        ctx,
        shape,
        frame.corner_radius,
        fade(palette::FILL, frame.opacity),
        shadow,
    );

    let stroke = if overlay.is_hovering() || overlay.is_drop_targeting() {
        palette::STROKE_HOVER
    } else {
        palette::STROKE
    };
    graphics.stroke_notch_shape(ctx, shape, frame.corner_radius, fade(stroke, frame.opacity));

    let Some(header) = render::header_layout(shape, &frame, graphics.font_ascent()) else {
        return;
    };
    let panel = overlay.panel();
    graphics.draw_text(
        ctx,
        &panel.title,
        header.title.x,
        header.title.y,
        fade(palette::TEXT, header.alpha),
    );

    let clock = render::format_clock(&panel.clock_format, &chrono::Local::now());
    if !clock.is_empty() {
        let x = header.clock_right - graphics.measure_text(&clock);
        graphics.draw_text(
            ctx,
            &clock,
            x,
            header.title.y,
            fade(palette::TEXT_SECONDARY, header.alpha),
        );
    }
}

fn mouse_location() -> Point {
    let location = NSEvent::mouseLocation();
    Point::new(location.x, location.y)
}
