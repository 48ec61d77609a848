use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Unknown labware type: \"{labware_type}\" has no entry in the labware catalog")]
    UnknownLabware { labware_type: String },

    #[error("Internal consistency error: {message}")]
    InternalConsistency { message: String },

    #[error("Invalid well \"{well}\" for labware type \"{labware_type}\"")]
    InvalidWell { well: String, labware_type: String },

    #[error("Column \"{column}\" not found in {table}")]
    MissingColumn { column: String, table: String },

    #[error("\"{value}\" value not allowed in include column (row {row})")]
    InvalidIncludeValue { value: String, row: usize },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value \"{value}\" for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Labware,
    Internal,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    High,
    Critical,
}

impl PoolError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PoolError::ConfigValidationError { .. }
            | PoolError::InvalidConfigValueError { .. }
            | PoolError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PoolError::MissingColumn { .. }
            | PoolError::InvalidIncludeValue { .. }
            | PoolError::InvalidWell { .. }
            | PoolError::CsvError(_) => ErrorCategory::Input,
            PoolError::UnknownLabware { .. } => ErrorCategory::Labware,
            PoolError::InternalConsistency { .. } => ErrorCategory::Internal,
            PoolError::IoError(_) | PoolError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input | ErrorCategory::Labware => {
                ErrorSeverity::High
            }
            ErrorCategory::Internal | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PoolError::UnknownLabware { .. } => {
                "Check the labware type spelling, or register it with --labware-file".to_string()
            }
            PoolError::InvalidWell { labware_type, .. } => format!(
                "Use well labels like \"A1\" or linear positions that fit \"{}\"",
                labware_type
            ),
            PoolError::MissingColumn { column, .. } => format!(
                "Add a \"{}\" column or point the matching --*-col option at an existing one",
                column
            ),
            PoolError::InvalidIncludeValue { .. } => {
                "Allowed include values: success, pass, include, fail, skip".to_string()
            }
            PoolError::CsvError(_) => {
                "Make sure the file is comma or tab delimited and matches --sample-format"
                    .to_string()
            }
            PoolError::IoError(_) => "Check that input files exist and the output path is writable".to_string(),
            PoolError::InternalConsistency { .. } => {
                "This is a bug; please report it together with the input files".to_string()
            }
            PoolError::ConfigValidationError { .. }
            | PoolError::InvalidConfigValueError { .. }
            | PoolError::MissingConfigError { .. } => {
                "Review the command line options or the TOML configuration".to_string()
            }
            PoolError::SerializationError(_) => "Review the input data".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Input problem: {}", self),
            ErrorCategory::Labware => format!("Labware problem: {}", self),
            ErrorCategory::Internal => format!("Internal error: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        PoolError::InternalConsistency {
            message: message.into(),
        }
    }

    pub(crate) fn unknown_labware(labware_type: &str) -> Self {
        PoolError::UnknownLabware {
            labware_type: labware_type.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PoolError>;
