//! Spread geometry
//!
//! A spread holds two trim rectangles side by side. Each page gets the
//! bleed on its outer edges and the binding margin on its spine edge, so
//! the gap between the two trim rectangles is twice the binding margin:
//!
//! ```text
//! |bleed| verso |margin|margin| recto |bleed|
//! ```

use crate::constants::mm_to_pt;
use crate::options::BookletOptions;

use super::{PagePlacement, PageSide, Rect};

/// Physical dimensions of one spread, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub page_width: f32,
    pub page_height: f32,
    pub binding_margin: f32,
    pub bleed: f32,
}

impl Geometry {
    pub fn new(page_width: f32, page_height: f32, binding_margin: f32, bleed: f32) -> Self {
        Self {
            page_width,
            page_height,
            binding_margin,
            bleed,
        }
    }

    /// Build the geometry from millimetre options
    pub fn from_options(options: &BookletOptions) -> Self {
        let (width_mm, height_mm) = options.page_size.dimensions_mm();
        Self::new(
            mm_to_pt(width_mm),
            mm_to_pt(height_mm),
            mm_to_pt(options.binding_margin_mm),
            mm_to_pt(options.bleed_mm),
        )
    }

    pub fn spread_width(&self) -> f32 {
        2.0 * self.page_width + 2.0 * self.binding_margin + 2.0 * self.bleed
    }

    pub fn spread_height(&self) -> f32 {
        self.page_height + 2.0 * self.bleed
    }

    /// Trim rectangle of the left (verso) page
    pub fn left_rect(&self) -> Rect {
        Rect::new(self.bleed, self.bleed, self.page_width, self.page_height)
    }

    /// Trim rectangle of the right (recto) page
    pub fn right_rect(&self) -> Rect {
        Rect::new(
            self.bleed + self.page_width + 2.0 * self.binding_margin,
            self.bleed,
            self.page_width,
            self.page_height,
        )
    }

    pub fn rect_for(&self, side: PageSide) -> Rect {
        match side {
            PageSide::Verso => self.left_rect(),
            PageSide::Recto => self.right_rect(),
        }
    }
}

/// Fit a source box into a trim rectangle, preserving aspect ratio and centering.
///
/// `source_box` is the visible area of the source page in its own coordinate
/// space; its origin need not be zero. `rotation` is the page's clockwise
/// display rotation in degrees (0, 90, 180 or 270; anything else is treated
/// as 0). A page turned by 90 or 270 degrees is fitted with its width and
/// height swapped.
pub fn place_page(
    source_page: Option<usize>,
    side: PageSide,
    trim_rect: Rect,
    source_box: Rect,
    rotation: u16,
) -> PagePlacement {
    let rotation = match rotation {
        90 | 180 | 270 => rotation,
        _ => 0,
    };
    let (shown_width, shown_height) = if rotation % 180 == 0 {
        (source_box.width, source_box.height)
    } else {
        (source_box.height, source_box.width)
    };

    let scale = if shown_width > 0.0 && shown_height > 0.0 {
        (trim_rect.width / shown_width).min(trim_rect.height / shown_height)
    } else {
        1.0
    };

    let width = shown_width * scale;
    let height = shown_height * scale;
    let content_rect = Rect::new(
        trim_rect.x + (trim_rect.width - width) / 2.0,
        trim_rect.y + (trim_rect.height - height) / 2.0,
        width,
        height,
    );

    PagePlacement {
        source_page,
        side,
        trim_rect,
        content_rect,
        scale,
        rotation,
        matrix: placement_matrix(source_box, content_rect, scale, rotation),
    }
}

/// The `cm` operands that map `source_box` onto `content_rect`
fn placement_matrix(source: Rect, content: Rect, scale: f32, rotation: u16) -> [f32; 6] {
    let s = scale;
    let (cx, cy) = (content.x, content.y);
    match rotation {
        90 => [0.0, -s, s, 0.0, cx - s * source.y, cy + s * source.right()],
        180 => [-s, 0.0, 0.0, -s, cx + s * source.right(), cy + s * source.top()],
        270 => [0.0, s, -s, 0.0, cx + s * source.top(), cy - s * source.x],
        _ => [s, 0.0, 0.0, s, cx - s * source.x, cy - s * source.y],
    }
}
