use crate::core::normalize_report;
use crate::domain::model::{
    AggregatedWorker, ExternalClassification, MaterialEntry, NormalizedSections, ReportResult,
};
use crate::domain::ports::{ConfigProvider, Pipeline, SectionClassifier, Storage};
use crate::utils::error::{ReportError, Result};
use serde::Serialize;

pub const JSON_FILE: &str = "report.json";
pub const TEXT_FILE: &str = "report.txt";
pub const SERVICES_CSV: &str = "leistungen.csv";
pub const WORKFORCE_CSV: &str = "arbeitskraefte.csv";
pub const MATERIAL_CSV: &str = "material.csv";

/// Reads a chat export, normalizes it and writes the report artifacts.
pub struct ReportPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    classifier: Option<Box<dyn SectionClassifier>>,
}

impl<S: Storage, C: ConfigProvider> ReportPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            classifier: None,
        }
    }

    pub fn with_classifier(mut self, classifier: Option<Box<dyn SectionClassifier>>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Asks the classifier, if any. Failures are logged and treated as no answer.
    async fn external_classification(&self, lines: &[String]) -> Option<ExternalClassification> {
        let classifier = self.classifier.as_ref()?;
        match classifier.classify(lines).await {
            Ok(Some(classification)) if !classification.is_empty() => {
                tracing::debug!(classifier = classifier.name(), "classifier answered");
                Some(classification)
            }
            Ok(_) => {
                tracing::info!(classifier = classifier.name(), "classifier returned nothing, using rules only");
                None
            }
            Err(e) => {
                tracing::warn!(
                    classifier = classifier.name(),
                    error = %e,
                    suggestion = %e.recovery_suggestion(),
                    "classifier failed, using rules only"
                );
                None
            }
        }
    }

    fn output_file(&self, name: &str) -> String {
        let base = self.config.output_path().trim_end_matches('/');
        if base.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", base, name)
        }
    }

    async fn write(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.output_file(name);
        tracing::debug!(file = %path, bytes = data.len(), "writing report artifact");
        self.storage.write_file(&path, data).await
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    generated_at: String,
    line_count: usize,
    used_external: bool,
    sections: &'a NormalizedSections,
    workers: &'a [AggregatedWorker],
    materials: &'a [MaterialEntry],
}

#[derive(Serialize)]
struct ServiceRow<'a> {
    leistung: &'a str,
}

#[derive(Serialize)]
struct WorkerRow<'a> {
    name: &'a str,
    group: &'a str,
    hours: Option<f64>,
}

fn csv_bytes<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ReportError::IoError(e.into_error()))
}

fn render_text(result: &ReportResult) -> String {
    let mut text = result.sections.to_report_text();
    let with_hours: Vec<String> = result
        .workers
        .iter()
        .filter(|w| w.has_hours)
        .map(|w| format!("{}: {}h", w.name, w.hours))
        .collect();
    if !with_hours.is_empty() {
        text.push_str("\n\nStunden:\n");
        text.push_str(&with_hours.join("\n"));
    }
    text.push('\n');
    text
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ReportPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<String>> {
        let input = self.config.input_path();
        tracing::debug!(input, "reading chat export");

        let data = self.storage.read_file(input).await?;
        let text = String::from_utf8(data).map_err(|e| ReportError::InputError {
            message: format!("{} is not valid UTF-8: {}", input, e),
        })?;

        Ok(text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn transform(&self, lines: Vec<String>) -> Result<ReportResult> {
        let external = self.external_classification(&lines).await;
        let sections = normalize_report(&lines, external.as_ref());
        let workers = sections.workers();
        let materials = sections.materials();

        Ok(ReportResult {
            workers,
            materials,
            used_external: external.is_some(),
            line_count: lines.len(),
            sections,
        })
    }

    async fn load(&self, result: ReportResult) -> Result<String> {
        for format in self.config.output_formats() {
            match format.as_str() {
                "json" => {
                    let document = ReportDocument {
                        generated_at: chrono::Utc::now().to_rfc3339(),
                        line_count: result.line_count,
                        used_external: result.used_external,
                        sections: &result.sections,
                        workers: &result.workers,
                        materials: &result.materials,
                    };
                    self.write(JSON_FILE, &serde_json::to_vec_pretty(&document)?)
                        .await?;
                }
                "csv" => {
                    let services = csv_bytes(
                        result
                            .sections
                            .leistungen
                            .iter()
                            .map(|leistung| ServiceRow { leistung }),
                    )?;
                    let workers = csv_bytes(result.workers.iter().map(|w| WorkerRow {
                        name: &w.name,
                        group: &w.group,
                        hours: w.has_hours.then_some(w.hours),
                    }))?;
                    let materials = csv_bytes(&result.materials)?;
                    self.write(SERVICES_CSV, &services).await?;
                    self.write(WORKFORCE_CSV, &workers).await?;
                    self.write(MATERIAL_CSV, &materials).await?;
                }
                "txt" => {
                    self.write(TEXT_FILE, render_text(&result).as_bytes())
                        .await?;
                }
                other => {
                    return Err(ReportError::InvalidConfigValueError {
                        field: "output_formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported format".to_string(),
                    })
                }
            }
        }

        Ok(self.config.output_path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_input(content: &str) -> Self {
            let mut files = HashMap::new();
            files.insert("chat.txt".to_string(), content.as_bytes().to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<String> {
            let files = self.files.lock().await;
            files
                .get(path)
                .map(|data| String::from_utf8_lossy(data).into_owned())
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ReportError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        formats: Vec<String>,
    }

    impl MockConfig {
        fn new(formats: &[&str]) -> Self {
            Self {
                formats: formats.iter().map(|f| f.to_string()).collect(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            "chat.txt"
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }
    }

    struct FixedClassifier(Result<Option<ExternalClassification>>);

    #[async_trait]
    impl SectionClassifier for FixedClassifier {
        async fn classify(&self, _lines: &[String]) -> Result<Option<ExternalClassification>> {
            match &self.0 {
                Ok(answer) => Ok(answer.clone()),
                Err(_) => Err(ReportError::ClassifierError {
                    classifier: "fixed".to_string(),
                    message: "unavailable".to_string(),
                }),
            }
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    const CHAT: &str = "Leistungen: Graben ausgehoben\r\n\r\nSchacht gesetzt\nAK: Müller 8h, Schmidt 6h\n   \nMaterial: 10m Rohr\n";

    #[tokio::test]
    async fn test_extract_drops_blank_lines() {
        let pipeline = ReportPipeline::new(MockStorage::with_input(CHAT), MockConfig::new(&["json"]));
        let lines = pipeline.extract().await.unwrap();
        assert_eq!(
            lines,
            vec![
                "Leistungen: Graben ausgehoben",
                "Schacht gesetzt",
                "AK: Müller 8h, Schmidt 6h",
                "Material: 10m Rohr",
            ]
        );
    }

    #[tokio::test]
    async fn test_extract_rejects_invalid_utf8() {
        let storage = MockStorage::with_input("");
        storage
            .files
            .lock()
            .await
            .insert("chat.txt".to_string(), vec![0xff, 0xfe]);
        let pipeline = ReportPipeline::new(storage, MockConfig::new(&["json"]));
        assert!(matches!(
            pipeline.extract().await,
            Err(ReportError::InputError { .. })
        ));
    }

    #[tokio::test]
    async fn test_transform_without_classifier() {
        let pipeline = ReportPipeline::new(MockStorage::with_input(CHAT), MockConfig::new(&["json"]));
        let lines = pipeline.extract().await.unwrap();
        let result = pipeline.transform(lines).await.unwrap();

        assert!(!result.used_external);
        assert_eq!(result.line_count, 4);
        assert_eq!(result.sections.arbeitskraefte, vec!["Müller 8h, Schmidt 6h"]);
        assert_eq!(result.sections.material, vec!["10; m; Rohr"]);
        assert_eq!(result.workers.len(), 2);
        assert_eq!(result.materials, vec![MaterialEntry::new("10", "m", "Rohr")]);
    }

    #[tokio::test]
    async fn test_classifier_failure_degrades_to_rules() {
        let failing = FixedClassifier(Err(ReportError::ConfigError {
            message: String::new(),
        }));
        let pipeline = ReportPipeline::new(MockStorage::with_input(CHAT), MockConfig::new(&["json"]))
            .with_classifier(Some(Box::new(failing)));
        let lines = pipeline.extract().await.unwrap();
        let result = pipeline.transform(lines).await.unwrap();

        assert!(!result.used_external);
        assert_eq!(result.sections.material, vec!["10; m; Rohr"]);
    }

    #[tokio::test]
    async fn test_classifier_answer_is_merged() {
        let answer = ExternalClassification {
            leistungen: vec![],
            arbeitskraefte: vec![],
            material: vec!["Schacht".to_string()],
        };
        let pipeline = ReportPipeline::new(MockStorage::with_input(CHAT), MockConfig::new(&["json"]))
            .with_classifier(Some(Box::new(FixedClassifier(Ok(Some(answer))))));
        let lines = pipeline.extract().await.unwrap();
        let result = pipeline.transform(lines).await.unwrap();

        assert!(result.used_external);
        assert!(result.sections.material.contains(&"Schacht".to_string()));
    }

    #[tokio::test]
    async fn test_load_writes_selected_formats() {
        let storage = MockStorage::with_input(CHAT);
        let pipeline = ReportPipeline::new(storage.clone(), MockConfig::new(&["json", "csv", "txt"]));
        let lines = pipeline.extract().await.unwrap();
        let result = pipeline.transform(lines).await.unwrap();

        assert_eq!(pipeline.load(result).await.unwrap(), "out");

        let json: serde_json::Value =
            serde_json::from_str(&storage.get_file("out/report.json").await.unwrap()).unwrap();
        assert_eq!(json["line_count"], 4);
        assert!(json["generated_at"].is_string());
        assert_eq!(json["sections"]["leistungen"][0], "Graben ausgehoben");

        let workers = storage.get_file("out/arbeitskraefte.csv").await.unwrap();
        assert_eq!(workers, "name,group,hours\nMüller,,8.0\nSchmidt,,6.0\n");

        let materials = storage.get_file("out/material.csv").await.unwrap();
        assert_eq!(materials, "qty,unit,desc\n10,m,Rohr\n");

        let text = storage.get_file("out/report.txt").await.unwrap();
        assert!(text.starts_with("Leistungen: Graben ausgehoben\n"));
        assert!(text.contains("Stunden:\nMüller: 8h"));
    }

    #[tokio::test]
    async fn test_load_only_json() {
        let storage = MockStorage::with_input(CHAT);
        let pipeline = ReportPipeline::new(storage.clone(), MockConfig::new(&["json"]));
        let result = pipeline.transform(vec!["Graben".to_string()]).await.unwrap();
        pipeline.load(result).await.unwrap();

        assert!(storage.get_file("out/report.json").await.is_some());
        assert!(storage.get_file("out/leistungen.csv").await.is_none());
    }
}
