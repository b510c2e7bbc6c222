pub mod analyzer;
pub mod header;
pub mod normalizer;
pub mod source;
pub mod types;
pub mod utils;

pub use header::{detect_header_row, HeaderDetector};
pub use normalizer::normalize;
pub use source::{GridSource, WorkbookSource};
