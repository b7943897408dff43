#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::adapters::classifier::{HttpClassifier, JsonFileClassifier, DEFAULT_TIMEOUT_SECONDS};
use crate::domain::ports::SectionClassifier;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_range, validate_url};

pub const DEFAULT_CLASSIFIER_MODEL: &str = "gpt-4o-mini";
pub const API_KEY_ENV: &str = "CLASSIFIER_API_KEY";

/// Which secondary classifier a run uses, resolved from CLI flags or TOML.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierSettings {
    None,
    File {
        path: String,
    },
    Http {
        endpoint: String,
        model: String,
        api_key: Option<String>,
        timeout_seconds: u64,
    },
}

impl ClassifierSettings {
    pub fn validate(&self, field_prefix: &str) -> Result<()> {
        match self {
            ClassifierSettings::None => Ok(()),
            ClassifierSettings::File { path } => {
                validate_path(&format!("{}.path", field_prefix), path)
            }
            ClassifierSettings::Http {
                endpoint,
                timeout_seconds,
                ..
            } => {
                validate_url(&format!("{}.endpoint", field_prefix), endpoint)?;
                validate_range(
                    &format!("{}.timeout_seconds", field_prefix),
                    *timeout_seconds,
                    1,
                    600,
                )
            }
        }
    }

    pub fn build(&self) -> Result<Option<Box<dyn SectionClassifier>>> {
        let classifier: Box<dyn SectionClassifier> = match self {
            ClassifierSettings::None => return Ok(None),
            ClassifierSettings::File { path } => Box::new(JsonFileClassifier::new(path)),
            ClassifierSettings::Http {
                endpoint,
                model,
                api_key,
                timeout_seconds,
            } => Box::new(HttpClassifier::new(
                endpoint,
                model,
                api_key.clone(),
                *timeout_seconds,
            )?),
        };
        Ok(Some(classifier))
    }

    pub fn describe(&self) -> String {
        match self {
            ClassifierSettings::None => "none".to_string(),
            ClassifierSettings::File { path } => format!("file ({})", path),
            ClassifierSettings::Http {
                endpoint, model, ..
            } => format!("http ({} @ {})", model, endpoint),
        }
    }
}

pub(crate) fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_settings_validation() {
        let settings = ClassifierSettings::Http {
            endpoint: "not a url".to_string(),
            model: DEFAULT_CLASSIFIER_MODEL.to_string(),
            api_key: None,
            timeout_seconds: 30,
        };
        assert!(settings.validate("classifier").is_err());
        assert!(ClassifierSettings::None.validate("classifier").is_ok());
    }

    #[test]
    fn test_build_matches_kind() {
        assert!(ClassifierSettings::None.build().unwrap().is_none());
        let file = ClassifierSettings::File {
            path: "classification.json".to_string(),
        }
        .build()
        .unwrap()
        .unwrap();
        assert_eq!(file.name(), "json_file");
    }
}
