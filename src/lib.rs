pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::labware::LabwareCatalog;
pub use core::{
    etl::{PlanSummary, PoolEngine, PoolReport},
    pipeline::PoolPipeline,
    pool::plan_pool,
};
pub use domain::model::{
    DestinationAssignment, IncludeFlag, PoolSettings, PoolWarning, SampleRow, TransferCommand,
};
pub use utils::error::{PoolError, Result};
