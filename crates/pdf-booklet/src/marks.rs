//! Printer's marks rendering for booklet spreads
//!
//! Crop marks are short lines that extend the trim edges outward from each
//! corner of both trim rectangles: one horizontal and one vertical line per
//! corner, at most sixteen per spread.

use crate::constants::{CROP_MARK_LENGTH_MM, CROP_MARK_WIDTH_MM, mm_to_pt};
use crate::layout::{Geometry, PageSide, Rect};

/// A straight line segment in spread coordinates (points)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkSegment {
    pub from: (f32, f32),
    pub to: (f32, f32),
}

impl MarkSegment {
    fn new(from: (f32, f32), to: (f32, f32)) -> Self {
        Self { from, to }
    }

    pub fn length(&self) -> f32 {
        let dx = self.to.0 - self.from.0;
        let dy = self.to.1 - self.from.1;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Compute the crop mark segments for both pages of a spread.
///
/// Marks never extend past the room available around the trim box: the
/// bleed towards the sheet edges and the binding margin towards the spine.
/// A mark with no room at all is left out, so a spread without bleed only
/// gets the four horizontal marks at the spine.
pub fn crop_mark_segments(geometry: &Geometry) -> Vec<MarkSegment> {
    let mut segments = Vec::with_capacity(16);
    for side in [PageSide::Verso, PageSide::Recto] {
        segments.extend(corner_marks(geometry, side));
    }
    segments
}

fn corner_marks(geometry: &Geometry, side: PageSide) -> Vec<MarkSegment> {
    let rect = geometry.rect_for(side);
    let full = mm_to_pt(CROP_MARK_LENGTH_MM);

    // The verso's spine is on its right edge, the recto's on its left
    let (left_room, right_room) = match side {
        PageSide::Verso => (geometry.bleed, geometry.binding_margin),
        PageSide::Recto => (geometry.binding_margin, geometry.bleed),
    };
    let left_len = full.min(left_room);
    let right_len = full.min(right_room);
    let vertical_len = full.min(geometry.bleed);

    let corners = [
        (rect.x, rect.top(), -left_len, vertical_len),
        (rect.right(), rect.top(), right_len, vertical_len),
        (rect.x, rect.y, -left_len, -vertical_len),
        (rect.right(), rect.y, right_len, -vertical_len),
    ];

    corners
        .iter()
        .flat_map(|&(x, y, dx, dy)| {
            [
                MarkSegment::new((x + dx, y), (x, y)),
                MarkSegment::new((x, y + dy), (x, y)),
            ]
        })
        .filter(|segment| segment.length() > 0.0)
        .collect()
}

/// Whether any part of a segment lies strictly inside the rectangle
pub fn segment_intrudes(segment: &MarkSegment, rect: &Rect) -> bool {
    let mid = (
        (segment.from.0 + segment.to.0) / 2.0,
        (segment.from.1 + segment.to.1) / 2.0,
    );
    [segment.from, mid, segment.to]
        .iter()
        .any(|&(x, y)| rect.contains_strict(x, y))
}

/// Generate crop marks as PDF content stream operations
pub fn generate_crop_marks(segments: &[MarkSegment]) -> String {
    let mut ops = String::new();

    // Save graphics state
    ops.push_str("q\n");

    // Solid black hairlines
    ops.push_str("0 0 0 RG\n");
    ops.push_str(&format!("{} w\n", mm_to_pt(CROP_MARK_WIDTH_MM)));
    ops.push_str("[] 0 d\n");

    for segment in segments {
        ops.push_str(&format!(
            "{} {} m {} {} l S\n",
            segment.from.0, segment.from.1, segment.to.0, segment.to.1
        ));
    }

    // Restore graphics state
    ops.push_str("Q\n");

    ops
}
