pub mod allocator;
pub mod commands;
pub mod etl;
pub mod manifest;
pub mod pipeline;
pub mod pool;
pub mod register;
pub mod reorder;

pub use crate::domain::model::{PoolInput, PoolOutcome};
pub use crate::domain::ports::{ConfigProvider, Pipeline, PositionDirectory, Storage};
pub use crate::utils::error::Result;
