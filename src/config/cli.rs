use crate::config::{default_timeout, ClassifierSettings, API_KEY_ENV, DEFAULT_CLASSIFIER_MODEL};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{validate_output_formats, validate_path, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "site-report-etl")]
#[command(about = "Turns a construction site chat export into a structured daily report")]
pub struct CliConfig {
    /// Chat export, one message per line
    #[arg(long, default_value = "chat.txt")]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "json,csv,txt")]
    pub formats: Vec<String>,

    /// JSON file with a precomputed classification of the same chat
    #[arg(long)]
    pub classification: Option<String>,

    /// OpenAI-compatible chat completion endpoint
    #[arg(long)]
    pub classifier_endpoint: Option<String>,

    #[arg(long, default_value = DEFAULT_CLASSIFIER_MODEL)]
    pub classifier_model: String,

    #[arg(long, default_value_t = default_timeout())]
    pub classifier_timeout: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    /// compact or json
    #[arg(long, default_value = "compact")]
    pub log_format: String,
}

impl CliConfig {
    /// The API key is only read from the environment, never from flags.
    pub fn classifier_settings(&self) -> ClassifierSettings {
        if let Some(endpoint) = &self.classifier_endpoint {
            ClassifierSettings::Http {
                endpoint: endpoint.clone(),
                model: self.classifier_model.clone(),
                api_key: std::env::var(API_KEY_ENV).ok(),
                timeout_seconds: self.classifier_timeout,
            }
        } else if let Some(path) = &self.classification {
            ClassifierSettings::File { path: path.clone() }
        } else {
            ClassifierSettings::None
        }
    }
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_path("output_path", &self.output_path)?;
        validate_output_formats("formats", &self.formats)?;

        if self.classification.is_some() && self.classifier_endpoint.is_some() {
            return Err(ReportError::ConfigError {
                message: "--classification and --classifier-endpoint are mutually exclusive"
                    .to_string(),
            });
        }
        self.classifier_settings().validate("classifier")
    }
}
