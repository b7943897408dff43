use crate::config::{default_timeout, ClassifierSettings, API_KEY_ENV, DEFAULT_CLASSIFIER_MODEL};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ReportError, Result};
use crate::utils::validation::{validate_output_formats, validate_path, validate_required_field, Validate};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub report: ReportConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    #[default]
    None,
    File,
    Http,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub kind: ClassifierKind,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| ReportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unknown variables are left as is.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Resolves the `[classifier]` table. A missing `api_key` falls back to the
    /// environment, as does a key that still holds an unresolved `${VAR}`.
    pub fn classifier_settings(&self) -> Result<ClassifierSettings> {
        let classifier = &self.classifier;
        Ok(match classifier.kind {
            ClassifierKind::None => ClassifierSettings::None,
            ClassifierKind::File => ClassifierSettings::File {
                path: validate_required_field("classifier.path", &classifier.path)?.clone(),
            },
            ClassifierKind::Http => ClassifierSettings::Http {
                endpoint: validate_required_field("classifier.endpoint", &classifier.endpoint)?
                    .clone(),
                model: classifier
                    .model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CLASSIFIER_MODEL.to_string()),
                api_key: classifier
                    .api_key
                    .clone()
                    .filter(|key| !ENV_VAR_RE.is_match(key))
                    .or_else(|| std::env::var(API_KEY_ENV).ok()),
                timeout_seconds: classifier.timeout_seconds.unwrap_or_else(default_timeout),
            },
        })
    }

    pub fn log_format(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .unwrap_or("compact")
    }

    pub fn verbose_logging(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .is_some_and(|level| matches!(level.to_lowercase().as_str(), "debug" | "trace"))
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("input.path", &self.input.path)?;
        validate_path("output.path", &self.output.path)?;
        validate_output_formats("output.formats", &self.output.formats)?;
        self.classifier_settings()?.validate("classifier")
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[report]
name = "baustelle-nord"
description = "Tagesbericht Baustelle Nord"

[input]
path = "chat.txt"

[output]
path = "./report"
formats = ["json", "csv"]
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.report.name, "baustelle-nord");
        assert_eq!(config.input_path(), "chat.txt");
        assert_eq!(config.output_formats(), &["json", "csv"]);
        assert_eq!(config.classifier.kind, ClassifierKind::None);
        assert_eq!(config.log_format(), "compact");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SITE_REPORT_TEST_ENDPOINT", "https://llm.example.com/v1/chat/completions");

        let toml_content = format!(
            "{}\n[classifier]\nkind = \"http\"\nendpoint = \"${{SITE_REPORT_TEST_ENDPOINT}}\"\napi_key = \"${{SITE_REPORT_UNSET_KEY}}\"\n",
            BASIC
        );
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();

        match config.classifier_settings().unwrap() {
            ClassifierSettings::Http {
                endpoint,
                model,
                api_key,
                timeout_seconds,
            } => {
                assert_eq!(endpoint, "https://llm.example.com/v1/chat/completions");
                assert_eq!(model, DEFAULT_CLASSIFIER_MODEL);
                assert_ne!(api_key.as_deref(), Some("${SITE_REPORT_UNSET_KEY}"));
                assert_eq!(timeout_seconds, 30);
            }
            other => panic!("unexpected settings: {:?}", other),
        }

        std::env::remove_var("SITE_REPORT_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = format!("{}\n[classifier]\nkind = \"http\"\nendpoint = \"invalid-url\"\n", BASIC);
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = format!("{}\n[classifier]\nkind = \"file\"\n", BASIC);
        let config = TomlConfig::from_toml_str(&toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ReportError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[report\nname = 1").unwrap_err();
        assert!(matches!(err, ReportError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let content = format!("{}\n[logging]\nlevel = \"debug\"\nformat = \"json\"\n", BASIC);
        temp_file.write_all(content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.report.name, "baustelle-nord");
        assert!(config.verbose_logging());
        assert_eq!(config.log_format(), "json");
    }
}
