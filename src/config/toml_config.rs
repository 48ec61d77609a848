use crate::core::ConfigProvider;
use crate::domain::model::{
    PoolSettings, SampleColumns, SampleFileOptions, TableFormat, TableOptions,
};
use crate::utils::error::{PoolError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub run: Option<RunInfo>,
    pub samples: SamplesConfig,
    pub mapping: Option<MappingConfig>,
    #[serde(default)]
    pub pooling: PoolingConfig,
    #[serde(default)]
    pub destination: DestinationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplesConfig {
    pub files: Vec<String>,
    pub format: Option<TableFormat>,
    pub header: Option<bool>,
    pub rows: Option<String>,
    pub columns: Option<SampleColumns>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    pub file: String,
    pub format: Option<TableFormat>,
    pub header: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PoolingConfig {
    pub volume: Option<f64>,
    pub liquid_class: Option<String>,
    pub new_tips: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DestinationConfig {
    pub name: Option<String>,
    pub r#type: Option<String>,
    pub start: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    pub prefix: Option<String>,
    pub labware_file: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PoolError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| PoolError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PLATE_DIR})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if self.samples.files.is_empty() {
            return Err(PoolError::MissingConfigError {
                field: "samples.files".to_string(),
            });
        }
        for file in &self.samples.files {
            crate::utils::validation::validate_path("samples.files", file)?;
        }
        if self.samples.format.is_none() {
            crate::utils::validation::validate_file_extensions(
                "samples.files",
                &self.samples.files,
                &["csv", "txt", "tsv"],
            )?;
        }
        if let Some(mapping) = &self.mapping {
            crate::utils::validation::validate_path("mapping.file", &mapping.file)?;
        }

        let settings = self.pool_settings();
        crate::utils::validation::validate_non_negative("pooling.volume", settings.volume)?;
        crate::utils::validation::validate_non_empty_string(
            "pooling.liquid_class",
            &settings.liquid_class,
        )?;
        crate::utils::validation::validate_non_empty_string(
            "destination.name",
            &settings.destination_labware_name,
        )?;
        crate::utils::validation::validate_positive_number(
            "destination.start",
            settings.destination_start_offset,
            1,
        )?;
        crate::utils::validation::validate_path("output.prefix", self.output_prefix())?;

        Ok(())
    }

    pub fn run_name(&self) -> &str {
        self.run.as_ref().map(|r| r.name.as_str()).unwrap_or("pool")
    }
}

impl ConfigProvider for TomlConfig {
    fn sample_files(&self) -> &[String] {
        &self.samples.files
    }

    fn sample_file_options(&self) -> SampleFileOptions {
        SampleFileOptions {
            table: TableOptions {
                format: self.samples.format,
                header: self.samples.header.unwrap_or(true),
            },
            rows: self
                .samples
                .rows
                .clone()
                .unwrap_or_else(|| "all".to_string()),
            columns: self.samples.columns.clone().unwrap_or_default(),
        }
    }

    fn map_file(&self) -> Option<&str> {
        self.mapping.as_ref().map(|m| m.file.as_str())
    }

    fn map_file_options(&self) -> TableOptions {
        self.mapping
            .as_ref()
            .map(|m| TableOptions {
                format: m.format,
                header: m.header.unwrap_or(true),
            })
            .unwrap_or_default()
    }

    fn output_prefix(&self) -> &str {
        self.output.prefix.as_deref().unwrap_or("TECAN_pool")
    }

    fn labware_file(&self) -> Option<&str> {
        self.output.labware_file.as_deref()
    }

    fn pool_settings(&self) -> PoolSettings {
        let defaults = PoolSettings::default();
        PoolSettings {
            volume: self.pooling.volume.unwrap_or(defaults.volume),
            liquid_class: self
                .pooling
                .liquid_class
                .clone()
                .unwrap_or(defaults.liquid_class),
            new_tips_between_replicates: self
                .pooling
                .new_tips
                .unwrap_or(defaults.new_tips_between_replicates),
            destination_labware_name: self
                .destination
                .name
                .clone()
                .unwrap_or(defaults.destination_labware_name),
            destination_labware_type: self
                .destination
                .r#type
                .clone()
                .unwrap_or(defaults.destination_labware_type),
            destination_start_offset: self
                .destination
                .start
                .unwrap_or(defaults.destination_start_offset),
        }
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

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_content = r#"
[samples]
files = ["plate1.csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.pool_settings(), PoolSettings::default());
        assert_eq!(config.output_prefix(), "TECAN_pool");
        assert_eq!(config.map_file(), None);
        assert_eq!(config.run_name(), "pool");
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[run]
name = "16S pooling"

[samples]
files = ["plate1.txt", "plate2.txt"]
format = "tab"
header = false
rows = "1-48"

[samples.columns]
sample = "0"
include = "1"
labware_name = "2"
labware_type = "3"
position = "4"

[mapping]
file = "map.txt"

[pooling]
volume = 20.0
liquid_class = "Water Contact Wet Single"
new_tips = true

[destination]
name = "Pool plate"
type = "384 Well Biorad PCR"
start = 13

[output]
prefix = "out/pool"
labware_file = "labware.toml"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());

        let settings = config.pool_settings();
        assert_eq!(settings.volume, 20.0);
        assert!(settings.new_tips_between_replicates);
        assert_eq!(settings.destination_labware_type, "384 Well Biorad PCR");
        assert_eq!(settings.destination_start_offset, 13);

        let options = config.sample_file_options();
        assert_eq!(options.table.format, Some(TableFormat::Tab));
        assert!(!options.table.header);
        assert_eq!(options.rows, "1-48");
        assert_eq!(options.columns.position, "4");
        assert_eq!(config.map_file(), Some("map.txt"));
        assert_eq!(config.labware_file(), Some("labware.toml"));
        assert_eq!(config.run_name(), "16S pooling");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FLUENT_POOL_TEST_DIR", "/data/run7");

        let toml_content = r#"
[samples]
files = ["${FLUENT_POOL_TEST_DIR}/plate1.csv"]

[output]
prefix = "${FLUENT_POOL_TEST_DIR}/pool"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.samples.files[0], "/data/run7/plate1.csv");
        assert_eq!(config.output_prefix(), "/data/run7/pool");

        std::env::remove_var("FLUENT_POOL_TEST_DIR");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[samples]
files = ["plate1.csv"]

[pooling]
volume = -5.0
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let no_files = TomlConfig::from_toml_str("[samples]\nfiles = []\n").unwrap();
        assert!(matches!(
            no_files.validate(),
            Err(PoolError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[samples\nfiles = 3").unwrap_err();
        assert!(matches!(err, PoolError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[run]
name = "file-test"

[samples]
files = ["plate1.csv"]
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.run_name(), "file-test");
    }
}
