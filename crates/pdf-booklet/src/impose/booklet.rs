//! Booklet imposition (folded two-up spreads)

use crate::layout::{BookletPlan, Geometry, plan_signature};
use crate::render::{ObjectCache, render_spread, spread_placements};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Render every spread of the plan into a new document.
///
/// Signatures are emitted in order, each as its outside-in run of spreads.
pub(crate) fn impose_booklet(
    source: &Document,
    page_ids: &[ObjectId],
    plan: &BookletPlan,
    geometry: &Geometry,
    crop_marks: bool,
) -> Result<Document> {
    build_output(source, page_ids, plan, geometry, crop_marks)
        .map_err(|e| BookletError::RenderFailure(e.to_string()))
}

fn build_output(
    source: &Document,
    page_ids: &[ObjectId],
    plan: &BookletPlan,
    geometry: &Geometry,
    crop_marks: bool,
) -> lopdf::Result<Document> {
    let mut output = Document::with_version("1.7");
    let pages_tree_id = output.new_object_id();
    let mut page_refs = Vec::new();
    let mut cache = ObjectCache::new();

    for (sig_num, &range) in plan.signature_ranges.iter().enumerate() {
        let pairs = plan_signature(range);
        log::debug!(
            "Signature {} covers pages [{}, {}) as {} spread(s)",
            sig_num + 1,
            range.start,
            range.end,
            pairs.len()
        );

        for pair in pairs {
            let placements = spread_placements(source, page_ids, plan, pair, geometry);
            let page_id = render_spread(
                &mut output,
                source,
                page_ids,
                &placements,
                geometry,
                crop_marks,
                pages_tree_id,
                &mut cache,
            )?;
            page_refs.push(Object::Reference(page_id));
        }
    }

    finalize_document(&mut output, pages_tree_id, page_refs);
    Ok(output)
}

/// Create pages tree and catalog, finalize document structure
fn finalize_document(output: &mut Document, pages_tree_id: ObjectId, page_refs: Vec<Object>) {
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(page_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]));

    output.trailer.set("Root", catalog_id);
}
