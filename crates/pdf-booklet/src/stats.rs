use crate::constants::{PAGES_PER_SHEET, PAGES_PER_SPREAD};
use crate::layout::normalize;
use crate::options::BookletOptions;
use crate::types::*;

/// Calculate statistics for a booklet of `page_count` source pages
pub fn calculate_statistics(
    page_count: usize,
    options: &BookletOptions,
) -> Result<BookletStatistics> {
    options.validate()?;

    if page_count == 0 {
        return Err(BookletError::NoPages);
    }

    let plan = normalize(page_count, options.signature_size)?;
    let pages_per_signature: Vec<usize> =
        plan.signature_ranges.iter().map(|range| range.len()).collect();

    Ok(BookletStatistics {
        source_pages: page_count,
        padded_pages: plan.padded_page_count,
        blank_pages_added: plan.blank_pages(),
        signatures: pages_per_signature.len(),
        pages_per_signature,
        output_spreads: plan.padded_page_count / PAGES_PER_SPREAD,
        sheets: plan.padded_page_count / PAGES_PER_SHEET,
    })
}
