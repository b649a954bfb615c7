//! Configuration loading and parsing

use anyhow::{bail, Context, Result};
use perception_decoder::{DecoderConfig, Schema};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// Perception results file
    pub file: Option<PathBuf>,
    /// Column names in file order; the reference schema when absent
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Write notifications here instead of stdout
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `Event : <name> started at <start> ended at <end>`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl AppConfig {
    /// Schema for the input file
    pub fn schema(&self) -> Result<Schema> {
        match &self.input.fields {
            Some(fields) => Schema::new(fields.iter().cloned()).context("Invalid [input] fields"),
            None => Ok(Schema::perception()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.decoder
            .validate()
            .context("Invalid [decoder] section")?;
        let schema = self.schema()?;
        if schema.is_empty() {
            bail!("[input] fields must not be empty");
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
///
/// Values are checked by [`AppConfig::validate`] once command-line overrides
/// have been applied.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            file = "perception_results.txt"

            [decoder]
            frames_per_second = 25
            delimiter = ","

            [decoder.eyes_closed]
            min_duration = 1.0

            [decoder.looking_away]
            enabled = false

            [output]
            format = "json"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input.file, Some(PathBuf::from("perception_results.txt")));
        assert_eq!(config.decoder.frames_per_second, 25);
        assert_eq!(config.decoder.delimiter, ",");
        assert_eq!(config.decoder.comment_marker, '#');
        assert_eq!(config.decoder.eyes_closed.min_duration, 1.0);
        assert!(config.decoder.eyes_closed.enabled);
        assert!(!config.decoder.looking_away.enabled);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.decoder, DecoderConfig::default());
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.schema().unwrap().len(), 45);
    }

    #[test]
    fn test_custom_fields() {
        let config: AppConfig = toml::from_str(
            r#"
            [input]
            fields = ["Person.confidence", "Head.detection.confidence"]
            "#,
        )
        .unwrap();
        let schema = config.schema().unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.column("Head.detection.confidence").unwrap(), 1);

        let duplicated: AppConfig = toml::from_str(
            r#"
            [input]
            fields = ["a", "a"]
            "#,
        )
        .unwrap();
        assert!(duplicated.validate().is_err());
    }

    #[test]
    fn test_load_config_defers_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[decoder]\nframes_per_second = 0").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.decoder.frames_per_second, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("no/such/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
