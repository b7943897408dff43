use crate::domain::model::ExternalClassification;
use crate::domain::ports::SectionClassifier;
use crate::utils::error::{ReportError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const SYSTEM_PROMPT: &str = "Du ordnest Zeilen eines Baustellen-Chats drei Kategorien zu. \
Antworte nur mit einem JSON-Objekt mit den Schlüsseln \"leistungen\", \"arbeitskraefte\" \
und \"material\", jeweils eine Liste von Textstellen aus der Eingabe. \
Übernimm die Textstellen wörtlich, erfinde nichts.";

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Classification precomputed by an earlier run and stored as JSON.
#[derive(Debug, Clone)]
pub struct JsonFileClassifier {
    path: PathBuf,
}

impl JsonFileClassifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SectionClassifier for JsonFileClassifier {
    async fn classify(&self, _lines: &[String]) -> Result<Option<ExternalClassification>> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let parsed = ExternalClassification::from_json_str(&content);
        if parsed.is_none() {
            tracing::warn!(path = %self.path.display(), "classification file holds no JSON object");
        }
        Ok(parsed)
    }

    fn name(&self) -> &str {
        "json_file"
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    r#type: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// OpenAI-compatible chat completion endpoint asked for a JSON object answer.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpClassifier {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: Option<String>,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    fn request<'a>(&'a self, lines: &[String]) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: lines.join("\n"),
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                r#type: "json_object",
            },
        }
    }

    fn error(&self, message: impl Into<String>) -> ReportError {
        ReportError::ClassifierError {
            classifier: self.name().to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl SectionClassifier for HttpClassifier {
    async fn classify(&self, lines: &[String]) -> Result<Option<ExternalClassification>> {
        if lines.is_empty() {
            return Ok(None);
        }

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, lines = lines.len(), "requesting classification");
        let mut request = self.client.post(&self.endpoint).json(&self.request(lines));
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.error(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let data: ChatResponse = response.json().await?;
        let content = data
            .choices
            .as_ref()
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .unwrap_or_default();

        let parsed = ExternalClassification::from_json_str(content);
        if parsed.is_none() {
            tracing::warn!(classifier = self.name(), "answer holds no JSON object");
        }
        Ok(parsed)
    }

    fn name(&self) -> &str {
        "http"
    }
}
