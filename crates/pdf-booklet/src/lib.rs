pub mod constants;
mod convert;
pub mod impose;
pub mod layout;
pub mod marks;
pub mod optimize;
mod options;
pub mod render;
mod stats;
mod types;

pub use convert::{Conversion, ConversionMetadata, convert, convert_file};
pub use impose::{ImposedBooklet, impose, impose_document, load_pdf, load_pdf_bytes, save_pdf};
pub use layout::{BookletPlan, SignatureRange, SpreadPair, normalize, plan_booklet};
pub use optimize::{OptimizeConfig, OptimizedDocument, optimize};
pub use options::*;
pub use stats::calculate_statistics;
pub use types::*;
