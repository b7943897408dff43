pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{HttpClassifier, JsonFileClassifier, LocalStorage};
pub use app::ReportPipeline;
pub use config::{ClassifierSettings, TomlConfig};
pub use crate::core::engine::ReportEngine;
pub use crate::core::{
    aggregate_workers, classify_fragments, classify_lines, detect_section_header,
    extract_materials, extract_workers, is_material_like, is_workforce_like, normalize_report,
    split_header_content, split_report_line,
};
pub use domain::model::{
    AggregatedWorker, ClassifiedFragment, ExternalClassification, MaterialEntry,
    NormalizedSections, ReportResult, SectionKind, WorkerEntry,
};
pub use utils::error::{ReportError, Result};
