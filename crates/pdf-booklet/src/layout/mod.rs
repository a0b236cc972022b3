//! Layout calculation modules for imposition
//!
//! This module handles all the geometric calculations for booklet imposition:
//! - Signature planning (padding and splitting the page range)
//! - Spread ordering (which two pages share an output page)
//! - Spread geometry and content placement

mod geometry;
mod signature;
mod spread;
mod types;

pub use geometry::*;
pub use signature::*;
pub use spread::*;
pub use types::*;
