//! PDF rendering modules for imposition
//!
//! This module handles all PDF-specific operations:
//! - Creating XObjects from source pages
//! - Building spread pages
//! - Deep copying PDF objects

mod spread;
mod xobject;

pub use spread::{render_spread, spread_placements};
pub use xobject::{ObjectCache, copy_object_deep, create_page_xobject, page_box, page_rotation};
