use crate::domain::model::{
    PlateGeometry, PoolInput, PoolOutcome, PoolSettings, SampleFileOptions, TableOptions,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn sample_files(&self) -> &[String];
    fn sample_file_options(&self) -> SampleFileOptions;
    fn map_file(&self) -> Option<&str>;
    fn map_file_options(&self) -> TableOptions;
    fn output_prefix(&self) -> &str;
    fn labware_file(&self) -> Option<&str>;
    fn pool_settings(&self) -> PoolSettings;
}

/// Plate lookup: capacity and well label conversion per labware type.
pub trait PositionDirectory: Send + Sync {
    fn geometry(&self, labware_type: &str) -> Option<PlateGeometry>;

    fn capacity(&self, labware_type: &str) -> Option<usize> {
        self.geometry(labware_type).map(|g| g.wells())
    }

    /// Converts `A1`-style labels (or bare linear numbers) to a 1-based position.
    fn to_linear_position(&self, well_label: &str, labware_type: &str) -> Option<usize>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<PoolInput>;
    async fn transform(&self, input: &PoolInput) -> Result<PoolOutcome>;
    async fn load(&self, input: PoolInput, outcome: PoolOutcome) -> Result<Vec<String>>;
}
