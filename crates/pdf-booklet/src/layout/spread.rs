//! Spread ordering within a signature
//!
//! A signature of `n` pages is printed as `n/2` spreads. Spreads are
//! produced outside-in: the first spread is the outer face of the outermost
//! sheet, so for a 4-page signature the order is `[4 | 1]`, `[2 | 3]`.

use super::{BookletPlan, SignatureRange, SpreadPair};

/// Spread pairs for one signature, in print order.
///
/// Pair `i` of a signature `[s, s+n)` is `(s + n - 1 - i, s + i)`.
pub fn plan_signature(range: SignatureRange) -> Vec<SpreadPair> {
    let n = range.len();
    (0..n / 2)
        .map(|i| SpreadPair::new(range.start + n - 1 - i, range.start + i))
        .collect()
}

/// Spread pairs for every signature of a booklet, concatenated in signature order
pub fn plan_booklet(plan: &BookletPlan) -> Vec<SpreadPair> {
    plan.signature_ranges
        .iter()
        .flat_map(|&range| plan_signature(range))
        .collect()
}
