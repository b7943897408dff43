use crate::core::Pipeline;
use crate::utils::error::Result;

/// Runs a pipeline's extract, transform and load phases in order.
pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting report run");

        let lines = self.pipeline.extract().await?;
        tracing::info!(lines = lines.len(), "Extracted report lines");

        let result = self.pipeline.transform(lines).await?;
        tracing::info!(
            leistungen = result.sections.leistungen.len(),
            arbeitskraefte = result.sections.arbeitskraefte.len(),
            material = result.sections.material.len(),
            external = result.used_external,
            "Normalized report"
        );

        let output_path = self.pipeline.load(result).await?;
        tracing::info!(output = %output_path, "Report written");

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{NormalizedSections, ReportResult};
    use crate::utils::error::ReportError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingPipeline {
        phases: Mutex<Vec<&'static str>>,
        fail_transform: bool,
    }

    #[async_trait]
    impl Pipeline for RecordingPipeline {
        async fn extract(&self) -> Result<Vec<String>> {
            self.phases.lock().unwrap().push("extract");
            Ok(vec!["Schacht gesetzt".to_string()])
        }

        async fn transform(&self, lines: Vec<String>) -> Result<ReportResult> {
            self.phases.lock().unwrap().push("transform");
            if self.fail_transform {
                return Err(ReportError::InputError {
                    message: "broken".to_string(),
                });
            }
            Ok(ReportResult {
                sections: NormalizedSections::default(),
                workers: Vec::new(),
                materials: Vec::new(),
                used_external: false,
                line_count: lines.len(),
            })
        }

        async fn load(&self, _result: ReportResult) -> Result<String> {
            self.phases.lock().unwrap().push("load");
            Ok("out".to_string())
        }
    }

    #[tokio::test]
    async fn test_runs_phases_in_order() {
        let engine = ReportEngine::new(RecordingPipeline {
            phases: Mutex::new(Vec::new()),
            fail_transform: false,
        });
        assert_eq!(engine.run().await.unwrap(), "out");
        assert_eq!(
            *engine.pipeline.phases.lock().unwrap(),
            vec!["extract", "transform", "load"]
        );
    }

    #[tokio::test]
    async fn test_stops_on_transform_error() {
        let engine = ReportEngine::new(RecordingPipeline {
            phases: Mutex::new(Vec::new()),
            fail_transform: true,
        });
        assert!(engine.run().await.is_err());
        assert_eq!(
            *engine.pipeline.phases.lock().unwrap(),
            vec!["extract", "transform"]
        );
    }
}
