pub mod pipelines;

pub use pipelines::report_pipeline::ReportPipeline;
