//! Lossless structural compression
//!
//! Drops objects no longer reachable from the trailer, renumbers the rest
//! densely and deflates every stream that is still stored raw: page content,
//! images and embedded fonts alike.

use crate::impose::document_bytes;
use crate::types::Result;
use lopdf::Document;

/// Clean up and serialize a document with lossless compression
pub fn structural_save(doc: &mut Document) -> Result<Vec<u8>> {
    let pruned = doc.prune_objects();
    doc.renumber_objects();
    doc.compress();

    let bytes = document_bytes(doc)?;
    log::debug!(
        "Structural save pruned {} object(s), {} bytes written",
        pruned.len(),
        bytes.len()
    );
    Ok(bytes)
}
