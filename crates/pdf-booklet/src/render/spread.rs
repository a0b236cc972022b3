//! Spread page rendering
//!
//! Builds one output page per spread: up to two source pages placed as
//! Form XObjects, clipped to their trim rectangles, plus optional crop marks.

use crate::layout::{BookletPlan, Geometry, PagePlacement, PageSide, SpreadPair, place_page};
use crate::marks::{crop_mark_segments, generate_crop_marks};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use super::xobject::{ObjectCache, create_page_xobject, page_box, page_rotation};

// =============================================================================
// Public API
// =============================================================================

/// Compute the placements for one spread.
///
/// Halves whose index is beyond the source document get a placement with
/// `source_page: None` and are left blank when rendered.
pub fn spread_placements(
    source: &Document,
    source_page_ids: &[ObjectId],
    plan: &BookletPlan,
    pair: SpreadPair,
    geometry: &Geometry,
) -> Vec<PagePlacement> {
    [PageSide::Verso, PageSide::Recto]
        .iter()
        .map(|&side| {
            let index = pair.index_for(side);
            let trim_rect = geometry.rect_for(side);
            match source_page_ids.get(index).filter(|_| plan.is_real_page(index)) {
                Some(&page_id) => place_page(
                    Some(index),
                    side,
                    trim_rect,
                    page_box(source, page_id),
                    page_rotation(source, page_id),
                ),
                None => place_page(None, side, trim_rect, trim_rect, 0),
            }
        })
        .collect()
}

/// Render one spread as a new page of `output`.
///
/// # Arguments
/// * `output` - The output document
/// * `source` - The source document containing the pages
/// * `source_page_ids` - Object IDs of all source pages, in page order
/// * `placements` - Placements for the two halves of this spread
/// * `geometry` - Spread dimensions
/// * `crop_marks` - Whether to draw crop marks
/// * `parent_pages_id` - The parent Pages object ID
/// * `cache` - Object copy cache shared by every spread of the output
#[allow(clippy::too_many_arguments)]
pub fn render_spread(
    output: &mut Document,
    source: &Document,
    source_page_ids: &[ObjectId],
    placements: &[PagePlacement],
    geometry: &Geometry,
    crop_marks: bool,
    parent_pages_id: ObjectId,
    cache: &mut ObjectCache,
) -> lopdf::Result<ObjectId> {
    // Create page dictionary
    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(geometry.spread_width()),
            Object::Real(geometry.spread_height()),
        ]),
    );

    let mut content_ops = Vec::new();
    let mut xobjects = Dictionary::new();

    // Render each page placement; blank halves draw nothing
    for (idx, placement) in placements.iter().enumerate() {
        let Some(source_idx) = placement.source_page else {
            continue;
        };
        let Some(&source_page_id) = source_page_ids.get(source_idx) else {
            continue;
        };

        let xobject_name = format!("P{}", idx);
        let xobject_id = create_page_xobject(output, source, source_page_id, cache)?;
        xobjects.set(xobject_name.as_bytes(), Object::Reference(xobject_id));

        content_ops.push(generate_placement_command(&xobject_name, placement));
    }

    if crop_marks {
        content_ops.push(generate_crop_marks(&crop_mark_segments(geometry)));
    }

    // Set up resources
    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    // Create content stream
    let content = content_ops.join("");
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(output.add_object(page_dict))
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Generate the content stream command that clips to the trim box and draws a page.
fn generate_placement_command(xobject_name: &str, placement: &PagePlacement) -> String {
    let clip = &placement.trim_rect;
    let [a, b, c, d, e, f] = placement.matrix;
    format!(
        "q {} {} {} {} re W n {} {} {} {} {} {} cm /{} Do Q\n",
        clip.x, clip.y, clip.width, clip.height, a, b, c, d, e, f, xobject_name
    )
}
