use crate::domain::model::{ExternalClassification, ReportResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
}

/// Source of a secondary classification of the line buffer.
///
/// `Ok(None)` means the classifier had nothing to say; callers treat errors the same way.
#[async_trait]
pub trait SectionClassifier: Send + Sync {
    async fn classify(&self, lines: &[String]) -> Result<Option<ExternalClassification>>;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<String>>;
    async fn transform(&self, lines: Vec<String>) -> Result<ReportResult>;
    async fn load(&self, result: ReportResult) -> Result<String>;
}
