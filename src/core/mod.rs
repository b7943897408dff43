pub mod aggregate;
pub mod engine;
pub mod headers;
pub mod material;
pub mod reconcile;
pub mod router;
pub mod splitter;
pub mod text;
pub mod vocab;
pub mod workforce;

pub use aggregate::aggregate_workers;
pub use headers::{detect_section_header, split_bare_prefix, split_header_content};
pub use material::{extract_materials, is_material_like};
pub use reconcile::normalize_report;
pub use router::{classify_fragments, classify_lines};
pub use splitter::split_report_line;
pub use workforce::{extract_workers, is_workforce_like};

pub use crate::domain::model::{NormalizedSections, ReportResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
