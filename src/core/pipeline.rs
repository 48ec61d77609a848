use crate::adapters::labware::{sanitize_rack_label, LabwareCatalog};
use crate::adapters::mapping::{join_pooled, parse_mapping_table, render_mapping};
use crate::adapters::sample_file::parse_sample_table;
use crate::adapters::worklist::{render_manifest, render_worklist};
use crate::core::pool::plan_pool;
use crate::core::{ConfigProvider, Pipeline, PoolInput, PoolOutcome, Storage};
use crate::domain::model::IncludeFlag;
use crate::utils::error::{PoolError, Result};

pub struct PoolPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    catalog: LabwareCatalog,
}

impl<S: Storage, C: ConfigProvider> PoolPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self::with_catalog(storage, config, LabwareCatalog::builtin())
    }

    pub fn with_catalog(storage: S, config: C, catalog: LabwareCatalog) -> Self {
        Self {
            storage,
            config,
            catalog,
        }
    }

    /// Best-effort cleanup after a failed write; the write error is what gets reported.
    async fn remove_outputs(&self, paths: &[String]) {
        for path in paths {
            match self.storage.remove_file(path).await {
                Ok(()) => tracing::info!("Removed partial output {}", path),
                Err(PoolError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Could not remove partial output {}: {}", path, e),
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for PoolPipeline<S, C> {
    async fn extract(&self) -> Result<PoolInput> {
        let options = self.config.sample_file_options();

        // 依參數順序串接所有樣本檔
        let mut rows = Vec::new();
        for path in self.config.sample_files() {
            let data = self.storage.read_file(path).await?;
            let file_rows = parse_sample_table(&data, path, &options, &self.catalog)?;
            rows.extend(file_rows);
        }

        let total = rows.len();
        rows.retain(|row| row.include_flag == IncludeFlag::Include);
        tracing::debug!(
            "Kept {} of {} sample rows ({} skipped)",
            rows.len(),
            total,
            total - rows.len()
        );

        let mapping = match self.config.map_file() {
            Some(path) => {
                let data = self.storage.read_file(path).await?;
                Some(parse_mapping_table(
                    &data,
                    path,
                    &self.config.map_file_options(),
                )?)
            }
            None => None,
        };

        Ok(PoolInput { rows, mapping })
    }

    async fn transform(&self, input: &PoolInput) -> Result<PoolOutcome> {
        let mut settings = self.config.pool_settings();
        settings.destination_labware_name = sanitize_rack_label(&settings.destination_labware_name);

        plan_pool(&input.rows, &settings, &self.catalog)
    }

    async fn load(&self, input: PoolInput, outcome: PoolOutcome) -> Result<Vec<String>> {
        let prefix = self.config.output_prefix();

        // 先在記憶體中產生所有輸出，全部成功後才寫檔
        let mut outputs: Vec<(String, Vec<u8>)> = vec![
            (
                format!("{}.gwl", prefix),
                render_worklist(&outcome.commands).into_bytes(),
            ),
            (
                format!("{}_labware.txt", prefix),
                render_manifest(&outcome.manifest)?,
            ),
        ];
        if let Some(mapping) = &input.mapping {
            let joined = join_pooled(mapping, &outcome.plan)?;
            outputs.push((format!("{}_map.txt", prefix), render_mapping(&joined)?));
        }

        let mut written: Vec<String> = Vec::with_capacity(outputs.len());
        for (path, data) in outputs {
            tracing::debug!("Writing {} ({} bytes)", path, data.len());
            if let Err(e) = self.storage.write_file(&path, &data).await {
                tracing::error!("Writing {} failed: {}", path, e);
                // 失敗的檔案可能只寫了一半，一併移除
                written.push(path);
                self.remove_outputs(&written).await;
                return Err(e);
            }
            tracing::info!("File written: {}", path);
            written.push(path);
        }

        Ok(written)
    }
}
