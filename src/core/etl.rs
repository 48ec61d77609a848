use crate::core::{Pipeline, PoolInput, PoolOutcome};
use crate::domain::model::{DestinationPlan, ManifestEntry, PoolWarning};
use crate::utils::error::Result;
use serde::Serialize;

/// Result of a completed run: written files plus the warnings raised on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolReport {
    pub files: Vec<String>,
    pub warnings: Vec<PoolWarning>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary<'a> {
    pub samples: usize,
    pub replicates: usize,
    pub commands: usize,
    pub destination: &'a DestinationPlan,
    pub labware: &'a [ManifestEntry],
    pub warnings: Vec<String>,
}

impl<'a> PlanSummary<'a> {
    pub fn new(input: &PoolInput, outcome: &'a PoolOutcome) -> Self {
        Self {
            samples: outcome.plan.len(),
            replicates: input.rows.len(),
            commands: outcome.commands.len(),
            destination: &outcome.plan,
            labware: &outcome.manifest,
            warnings: outcome.warnings.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct PoolEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> PoolEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Extract and transform only; nothing is written.
    pub async fn plan(&self) -> Result<(PoolInput, PoolOutcome)> {
        tracing::info!("Extracting sample rows...");
        let input = self.pipeline.extract().await?;
        tracing::info!("Extracted {} included sample rows", input.rows.len());

        tracing::info!("Planning destinations and transfers...");
        let outcome = self.pipeline.transform(&input).await?;
        Ok((input, outcome))
    }

    pub async fn run(&self) -> Result<PoolReport> {
        tracing::info!("Starting pooling run...");
        let (input, outcome) = self.plan().await?;
        let warnings = outcome.warnings.clone();

        tracing::info!("Writing output files...");
        let files = self.pipeline.load(input, outcome).await?;

        Ok(PoolReport { files, warnings })
    }
}
