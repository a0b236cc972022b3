//! Signature planning
//!
//! Pads the page count to whole folded sheets and splits the padded pages
//! into signatures, the groups of nested sheets that are folded together.
//!
//! ## Example
//!
//! 10 source pages with a signature size of 4:
//! - padded to 12 pages (2 blanks)
//! - signatures `[0,4)`, `[4,8)`, `[8,12)`

use crate::constants::PAGES_PER_SHEET;
use crate::types::{BookletError, Result};

use super::{BookletPlan, SignatureRange};

// =============================================================================
// Padding
// =============================================================================

/// Round a page count up to the next multiple of 4
pub fn padded_page_count(page_count: usize) -> usize {
    page_count.div_ceil(PAGES_PER_SHEET) * PAGES_PER_SHEET
}

// =============================================================================
// Signature Ranges
// =============================================================================

/// Compute the padded page count and signature ranges for a document.
///
/// With no signature size the whole booklet is one signature. A signature
/// size is rounded up to a multiple of 4; the last signature is clamped to
/// the padded page count, which keeps it a multiple of 4 as well.
pub fn normalize(page_count: usize, signature_size: Option<usize>) -> Result<BookletPlan> {
    let padded = padded_page_count(page_count);

    let signature_ranges = match signature_size {
        None if padded == 0 => Vec::new(),
        None => vec![SignatureRange::new(0, padded)],
        Some(0) => {
            return Err(BookletError::InvalidArgument(
                "Signature size must be positive".to_string(),
            ));
        }
        Some(size) => split_signatures(padded, padded_page_count(size)),
    };

    let covered: usize = signature_ranges.iter().map(SignatureRange::len).sum();
    if covered != padded {
        return Err(BookletError::InvalidArgument(format!(
            "Signature ranges cover {} pages but the booklet has {}",
            covered, padded
        )));
    }

    log::debug!(
        "Planned {} pages ({} padded) into {} signature(s)",
        page_count,
        padded,
        signature_ranges.len()
    );

    Ok(BookletPlan {
        input_page_count: page_count,
        padded_page_count: padded,
        signature_ranges,
    })
}

fn split_signatures(padded: usize, signature_size: usize) -> Vec<SignatureRange> {
    (0..padded)
        .step_by(signature_size)
        .map(|start| SignatureRange::new(start, (start + signature_size).min(padded)))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_page_count() {
        assert_eq!(padded_page_count(0), 0);
        assert_eq!(padded_page_count(1), 4);
        assert_eq!(padded_page_count(4), 4);
        assert_eq!(padded_page_count(5), 8);
        assert_eq!(padded_page_count(10), 12);
    }

    #[test]
    fn test_signature_size_rounded_up() {
        // 6 rounds up to 8
        let plan = normalize(20, Some(6)).unwrap();
        assert_eq!(
            plan.signature_ranges,
            vec![
                SignatureRange::new(0, 8),
                SignatureRange::new(8, 16),
                SignatureRange::new(16, 20),
            ]
        );
    }

    #[test]
    fn test_signature_larger_than_booklet() {
        let plan = normalize(5, Some(16)).unwrap();
        assert_eq!(plan.signature_ranges, vec![SignatureRange::new(0, 8)]);
    }

    #[test]
    fn test_zero_signature_size_rejected() {
        assert!(matches!(
            normalize(8, Some(0)),
            Err(BookletError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_empty_document() {
        let plan = normalize(0, None).unwrap();
        assert_eq!(plan.padded_page_count, 0);
        assert!(plan.signature_ranges.is_empty());
    }
}
