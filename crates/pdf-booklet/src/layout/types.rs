//! Layout data types for imposition
//!
//! These types represent the intermediate layout calculations between
//! signature planning and PDF rendering.

/// Which side of a bound book this page appears on after folding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSide {
    /// Right-hand page; the spine edge is on the left
    Recto,
    /// Left-hand page; the spine edge is on the right
    Verso,
}

/// A half-open range `[start, end)` of padded page indices forming one signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureRange {
    pub start: usize,
    pub end: usize,
}

impl SignatureRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of pages in the signature
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The padded page count and signature split for one source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookletPlan {
    /// Pages in the source document
    pub input_page_count: usize,
    /// Input page count rounded up to a multiple of 4
    pub padded_page_count: usize,
    /// Contiguous, ordered partition of `[0, padded_page_count)`
    pub signature_ranges: Vec<SignatureRange>,
}

impl BookletPlan {
    /// Number of blank pages added by padding
    pub fn blank_pages(&self) -> usize {
        self.padded_page_count - self.input_page_count
    }

    /// Whether a padded index refers to a real source page
    pub fn is_real_page(&self, index: usize) -> bool {
        index < self.input_page_count
    }
}

/// Two padded page indices printed side by side on one output page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpreadPair {
    /// Index placed in the left half (verso)
    pub left: usize,
    /// Index placed in the right half (recto)
    pub right: usize,
}

impl SpreadPair {
    pub fn new(left: usize, right: usize) -> Self {
        Self { left, right }
    }

    /// The index shown on the given half of the spread
    pub fn index_for(&self, side: PageSide) -> usize {
        match side {
            PageSide::Verso => self.left,
            PageSide::Recto => self.right,
        }
    }
}

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Whether a point lies strictly inside the rectangle (edges excluded)
    pub fn contains_strict(&self, x: f32, y: f32) -> bool {
        x > self.x && x < self.right() && y > self.y && y < self.top()
    }
}

/// Final placement of a source page on a spread
///
/// This is the result of all layout calculations and contains
/// everything needed to render the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PagePlacement {
    /// Source page index (None = blank padding page)
    pub source_page: Option<usize>,
    /// Which half of the spread
    pub side: PageSide,
    /// The trim rectangle reserved for this page
    pub trim_rect: Rect,
    /// Where the scaled source content lands, inside `trim_rect`
    pub content_rect: Rect,
    /// Scale factor applied to the source page
    pub scale: f32,
    /// Clockwise display rotation of the source page, in degrees
    pub rotation: u16,
    /// `cm` operands mapping the source box onto `content_rect`
    pub matrix: [f32; 6],
}
