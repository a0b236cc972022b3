//! Booklet imposition - arranging pages for folding and binding
//!
//! This module orchestrates the imposition process:
//! 1. Pad the page count and split it into signatures
//! 2. Order each signature's pages into outside-in spreads
//! 3. Render the spreads with bleed, binding margin and crop marks

mod booklet;
mod io;

pub use io::{document_bytes, load_pdf, load_pdf_bytes, save_pdf};

use crate::layout::{BookletPlan, Geometry, normalize};
use crate::options::BookletOptions;
use crate::types::*;
use booklet::impose_booklet;
use lopdf::{Document, ObjectId};

/// An imposed booklet together with the plan it was rendered from
#[derive(Debug, Clone)]
pub struct ImposedBooklet {
    pub document: Document,
    pub plan: BookletPlan,
}

/// Impose a document on the blocking thread pool
pub async fn impose(source: &Document, options: &BookletOptions) -> Result<ImposedBooklet> {
    options.validate()?;

    let source = source.clone();
    let options = options.clone();

    tokio::task::spawn_blocking(move || impose_document(&source, &options)).await?
}

/// Impose a document synchronously. The source is never modified.
pub fn impose_document(source: &Document, options: &BookletOptions) -> Result<ImposedBooklet> {
    options.validate()?;

    let page_ids: Vec<ObjectId> = source.get_pages().values().copied().collect();
    if page_ids.is_empty() {
        return Err(BookletError::NoPages);
    }

    let plan = normalize(page_ids.len(), options.signature_size)?;
    let geometry = Geometry::from_options(options);

    log::info!(
        "Imposing {} page(s) as {} spread(s) on {} {:.1}x{:.1}pt",
        plan.input_page_count,
        plan.padded_page_count / 2,
        options.page_size.name(),
        geometry.spread_width(),
        geometry.spread_height()
    );

    let document = impose_booklet(source, &page_ids, &plan, &geometry, options.crop_marks)?;
    Ok(ImposedBooklet { document, plan })
}
