use core_foundation::base::TCFType;
use core_foundation::string::CFString;
use core_graphics::color::CGColor;
use core_graphics::context::CGContext;
use core_graphics::geometry::{CGPoint, CGRect, CGSize};
use core_text::font::CTFont;
use foreign_types::ForeignType;

use crate::model::Rect;

pub type Rgba = (f64, f64, f64, f64);

pub struct Graphics {
    font: CTFont,
}

impl Graphics {
    pub fn new(font_family: &str, font_size: f64) -> Option<Self> {
        let font = core_text::font::new_from_name(font_family, font_size)
            .or_else(|_| {
                log::warn!("Failed to load font '{}', using Helvetica", font_family);
                core_text::font::new_from_name("Helvetica", font_size)
            })
            .ok()?;

        Some(Self { font })
    }

    /// Traces a rect whose top edge is square and whose two bottom corners
    /// are rounded, so it reads as hanging off the screen edge.
    fn trace_notch_path(ctx: &CGContext, rect: Rect, radius: f64) {
        let r = radius.min(rect.width / 2.0).min(rect.height).max(0.0);
        let (x0, y0) = (rect.x, rect.y);
        let (x1, y1) = (rect.max_x(), rect.max_y());

        ctx.begin_path();
        ctx.move_to_point(x0, y1);
        ctx.add_line_to_point(x0, y0 + r);
        ctx.add_quad_curve_to_point(x0, y0, x0 + r, y0);
        ctx.add_line_to_point(x1 - r, y0);
        ctx.add_quad_curve_to_point(x1, y0, x1, y0 + r);
        ctx.add_line_to_point(x1, y1);
        ctx.close_path();
    }

    /// Fills the notch shape with a soft shadow underneath.
    pub fn fill_notch_shape(
        &self,
        ctx: &mut CGContext,
        rect: Rect,
        radius: f64,
        fill: Rgba,
        shadow: Shadow,
    ) {
        ctx.save();
        let (r, g, b, a) = shadow.color;
        ctx.set_shadow_with_color(
            CGSize::new(0.0, -shadow.offset_y),
            shadow.blur,
            &CGColor::rgb(r, g, b, a),
        );
        let (r, g, b, a) = fill;
        ctx.set_rgb_fill_color(r, g, b, a);
        Self::trace_notch_path(ctx, rect, radius);
        ctx.fill_path();
        ctx.restore();
    }

    /// Strokes the notch outline with a hairline.
    pub fn stroke_notch_shape(&self, ctx: &mut CGContext, rect: Rect, radius: f64, color: Rgba) {
        ctx.save();
        let (r, g, b, a) = color;
        ctx.set_rgb_stroke_color(r, g, b, a);
        ctx.set_line_width(1.0);
        Self::trace_notch_path(ctx, rect.inflate(-0.5), radius);
        ctx.stroke_path();
        ctx.restore();
    }

    pub fn clear(&self, ctx: &mut CGContext, width: f64, height: f64) {
        ctx.clear_rect(CGRect::new(
            &CGPoint::new(0.0, 0.0),
            &CGSize::new(width, height),
        ));
    }

    pub fn draw_text(&self, ctx: &mut CGContext, text: &str, x: f64, y: f64, color: Rgba) {
        use core_text::line::CTLine;

        let line = CTLine::new_with_attributed_string(
            self.attributed(text).as_concrete_TypeRef(),
        );

        let (r, g, b, a) = color;
        ctx.set_fill_color(&CGColor::rgb(r, g, b, a));

        let identity = core_graphics::geometry::CGAffineTransform {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx: 0.0,
            ty: 0.0,
        };
        ctx.set_text_matrix(&identity);
        ctx.set_text_position(x, y);

        unsafe {
            use core_text::line::CTLineRef;
            unsafe extern "C" {
                fn CTLineDraw(line: CTLineRef, context: core_graphics::sys::CGContextRef);
            }
            CTLineDraw(line.as_concrete_TypeRef(), ctx.as_ptr());
        }
    }

    pub fn measure_text(&self, text: &str) -> f64 {
        use core_text::line::CTLine;

        let line = CTLine::new_with_attributed_string(
            self.attributed(text).as_concrete_TypeRef(),
        );
        line.get_typographic_bounds().width
    }

    fn attributed(&self, text: &str) -> core_foundation::attributed_string::CFMutableAttributedString {
        use core_foundation::attributed_string::CFMutableAttributedString;
        use core_foundation::base::CFRange;
        use core_text::string_attributes::kCTFontAttributeName;

        let cf_string = CFString::new(text);
        let mut attr_string = CFMutableAttributedString::new();
        attr_string.replace_str(&cf_string, CFRange::init(0, 0));

        // CFString ranges count UTF-16 units
        let range = CFRange::init(0, cf_string.char_len());

        unsafe {
            attr_string.set_attribute(range, kCTFontAttributeName, &self.font);
        }
        attr_string
    }

    pub fn font_ascent(&self) -> f64 {
        self.font.ascent()
    }
}

/// Drop shadow drawn under the shape.
#[derive(Debug, Clone, Copy)]
pub struct Shadow {
    pub blur: f64,
    /// Downward offset in points
    pub offset_y: f64,
    pub color: Rgba,
}

impl Shadow {
    /// Interpolates between the closed (`t = 0`) and opened (`t = 1`) shadow.
    pub fn blend(t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        Self {
            blur: lerp(8.0, 16.0),
            offset_y: lerp(3.0, 6.0),
            color: (0.0, 0.0, 0.0, lerp(0.3, 0.5)),
        }
    }
}
