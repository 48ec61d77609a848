pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use crate::core::ConfigProvider;
    use crate::domain::model::{
        PoolSettings, SampleColumns, SampleFileOptions, TableFormat, TableOptions,
    };
    use crate::utils::error::{PoolError, Result};
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    const SAMPLE_EXTENSIONS: &[&str] = &["csv", "txt", "tsv"];

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "fluent-pool")]
    #[command(about = "Create robot commands for pooling sample replicates")]
    pub struct CliConfig {
        /// Comma or tab-delimited files of samples to pool
        #[arg(required = true, value_name = "SAMPLE_FILE")]
        pub samplefiles: Vec<String>,

        /// Output file name prefix
        #[arg(long, default_value = "TECAN_pool")]
        pub prefix: String,

        /// A QIIME-formatted mapping file
        #[arg(long)]
        pub mapfile: Option<String>,

        /// Sample file format (csv or tab); detected from the extension if omitted
        #[arg(long)]
        pub sample_format: Option<String>,

        /// The sample files have no header row
        #[arg(long)]
        pub no_sample_header: bool,

        /// Which rows (not including header) to use: "all" or e.g. "1-48"
        #[arg(long, default_value = "all")]
        pub sample_rows: String,

        #[arg(long, default_value = "Sample")]
        pub sample_col: String,

        #[arg(long, default_value = "Call")]
        pub include_col: String,

        #[arg(long, default_value = "labware_name")]
        pub sample_labware_name: String,

        #[arg(long, default_value = "labware_type")]
        pub sample_labware_type: String,

        #[arg(long, default_value = "Well")]
        pub position_col: String,

        /// Mapping file format (csv or tab); detected from the extension if omitted
        #[arg(long)]
        pub map_format: Option<String>,

        /// The mapping file has no header row
        #[arg(long)]
        pub no_map_header: bool,

        /// Per-sample volume to pool (ul)
        #[arg(long, default_value = "30.0")]
        pub volume: f64,

        /// Liquid class for pooling
        #[arg(long, default_value = "Water Free Single No-cLLD")]
        pub liq_cls: String,

        /// Use new tips between sample replicates
        #[arg(long)]
        pub new_tips: bool,

        /// Destination labware name
        #[arg(long, default_value = "Pooled DNA plate")]
        pub dest_name: String,

        /// Destination labware type
        #[arg(long, default_value = "96 Well Eppendorf TwinTec PCR")]
        pub dest_type: String,

        /// Starting position (well) on the destination labware
        #[arg(long, default_value = "1")]
        pub dest_start: usize,

        /// TOML file with extra labware definitions
        #[arg(long)]
        pub labware_file: Option<String>,

        /// Plan the run and print it as JSON without writing files
        #[arg(long)]
        pub dry_run: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    fn validate_format(field: &str, value: &Option<String>) -> Result<()> {
        match value {
            Some(format) if TableFormat::parse(format).is_none() => {
                Err(PoolError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: format.clone(),
                    reason: "Supported formats: csv, tab".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            if self.samplefiles.is_empty() {
                return Err(PoolError::MissingConfigError {
                    field: "samplefiles".to_string(),
                });
            }
            validate_format("sample_format", &self.sample_format)?;
            validate_format("map_format", &self.map_format)?;
            if self.sample_format.is_none() {
                validation::validate_file_extensions(
                    "samplefiles",
                    &self.samplefiles,
                    SAMPLE_EXTENSIONS,
                )?;
            }
            validation::validate_path("prefix", &self.prefix)?;
            validation::validate_non_negative("volume", self.volume)?;
            validation::validate_positive_number("dest_start", self.dest_start, 1)?;
            validation::validate_non_empty_string("liq_cls", &self.liq_cls)?;
            validation::validate_non_empty_string("dest_name", &self.dest_name)?;
            validation::validate_non_empty_string("dest_type", &self.dest_type)?;
            Ok(())
        }
    }

    impl ConfigProvider for CliConfig {
        fn sample_files(&self) -> &[String] {
            &self.samplefiles
        }

        fn sample_file_options(&self) -> SampleFileOptions {
            SampleFileOptions {
                table: TableOptions {
                    format: self.sample_format.as_deref().and_then(TableFormat::parse),
                    header: !self.no_sample_header,
                },
                rows: self.sample_rows.clone(),
                columns: SampleColumns {
                    sample: self.sample_col.clone(),
                    include: self.include_col.clone(),
                    labware_name: self.sample_labware_name.clone(),
                    labware_type: self.sample_labware_type.clone(),
                    position: self.position_col.clone(),
                },
            }
        }

        fn map_file(&self) -> Option<&str> {
            self.mapfile.as_deref()
        }

        fn map_file_options(&self) -> TableOptions {
            TableOptions {
                format: self.map_format.as_deref().and_then(TableFormat::parse),
                header: !self.no_map_header,
            }
        }

        fn output_prefix(&self) -> &str {
            &self.prefix
        }

        fn labware_file(&self) -> Option<&str> {
            self.labware_file.as_deref()
        }

        fn pool_settings(&self) -> PoolSettings {
            PoolSettings {
                volume: self.volume,
                liquid_class: self.liq_cls.clone(),
                new_tips_between_replicates: self.new_tips,
                destination_labware_name: self.dest_name.clone(),
                destination_labware_type: self.dest_type.clone(),
                destination_start_offset: self.dest_start,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_defaults_match_pooling_defaults() {
            let config = CliConfig::parse_from(["fluent-pool", "samples.csv"]);
            assert!(config.validate().is_ok());
            assert_eq!(config.pool_settings(), PoolSettings::default());
            assert_eq!(config.output_prefix(), "TECAN_pool");
            assert_eq!(config.sample_file_options().columns, SampleColumns::default());
            assert!(config.sample_file_options().table.header);
        }

        #[test]
        fn test_flags_map_to_settings() {
            let config = CliConfig::parse_from([
                "fluent-pool",
                "a.txt",
                "b.txt",
                "--new-tips",
                "--volume",
                "12.5",
                "--dest-type",
                "384 Well Biorad PCR",
                "--dest-start",
                "5",
                "--no-sample-header",
            ]);
            assert_eq!(config.sample_files().len(), 2);
            let settings = config.pool_settings();
            assert!(settings.new_tips_between_replicates);
            assert_eq!(settings.volume, 12.5);
            assert_eq!(settings.destination_start_offset, 5);
            assert!(!config.sample_file_options().table.header);
        }

        #[test]
        fn test_validation_rejects_bad_values() {
            let negative = CliConfig::parse_from(["fluent-pool", "s.csv", "--volume=-1"]);
            assert!(negative.validate().is_err());

            let zero_start = CliConfig::parse_from(["fluent-pool", "s.csv", "--dest-start", "0"]);
            assert!(zero_start.validate().is_err());

            let excel = CliConfig::parse_from(["fluent-pool", "s.xlsx"]);
            assert!(excel.validate().is_err());

            let forced = CliConfig::parse_from(["fluent-pool", "s.dat", "--sample-format", "tab"]);
            assert!(forced.validate().is_ok());

            let bad_format =
                CliConfig::parse_from(["fluent-pool", "s.csv", "--map-format", "excel"]);
            assert!(bad_format.validate().is_err());
        }
    }
}
