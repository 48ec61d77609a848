use crate::core::allocator::allocate;
use crate::core::commands::generate_commands;
use crate::core::manifest::build_manifest;
use crate::core::reorder::{ordering_for, reorder, WellOrdering};
use crate::domain::model::{IncludeFlag, PoolOutcome, PoolSettings, SampleRow};
use crate::domain::ports::PositionDirectory;
use crate::utils::error::{PoolError, Result};

/// Runs the pooling engine with the ordering picked from the destination geometry.
pub fn plan_pool<D>(rows: &[SampleRow], settings: &PoolSettings, directory: &D) -> Result<PoolOutcome>
where
    D: PositionDirectory + ?Sized,
{
    plan_pool_with_ordering(rows, settings, directory, None)
}

/// Register -> allocate -> reorder -> generate -> manifest.
///
/// Rows flagged `Skip` are ignored. Every labware lookup happens before the
/// first command is generated, so a failure never leaves a partial program.
pub fn plan_pool_with_ordering<D>(
    rows: &[SampleRow],
    settings: &PoolSettings,
    directory: &D,
    ordering: Option<&dyn WellOrdering>,
) -> Result<PoolOutcome>
where
    D: PositionDirectory + ?Sized,
{
    let dest_type = settings.destination_labware_type.as_str();
    let geometry = directory
        .geometry(dest_type)
        .ok_or_else(|| PoolError::unknown_labware(dest_type))?;

    let included: Vec<SampleRow> = rows
        .iter()
        .filter(|row| row.include_flag == IncludeFlag::Include)
        .cloned()
        .collect();
    check_sources(&included, directory)?;

    let allocation = allocate(&included, settings, directory)?;
    let ordering = ordering.unwrap_or_else(|| ordering_for(&geometry));
    let plan = reorder(allocation.plan, &geometry, ordering);

    let commands = generate_commands(&included, &plan, settings)?;
    let manifest = build_manifest(&commands);

    tracing::info!(
        "Planned {} samples ({} replicates) onto {} destination plate(s): {} commands",
        plan.len(),
        included.len(),
        plan.plates_needed,
        commands.len()
    );

    Ok(PoolOutcome {
        plan,
        commands,
        manifest,
        warnings: allocation.warnings,
    })
}

fn check_sources<D>(rows: &[SampleRow], directory: &D) -> Result<()>
where
    D: PositionDirectory + ?Sized,
{
    for row in rows {
        let capacity = directory
            .capacity(&row.source_labware_type)
            .ok_or_else(|| PoolError::unknown_labware(&row.source_labware_type))?;
        if row.source_position == 0 || row.source_position > capacity {
            return Err(PoolError::internal(format!(
                "sample \"{}\" references position {} on \"{}\" ({} wells)",
                row.sample_name, row.source_position, row.source_labware_name, capacity
            )));
        }
    }
    Ok(())
}
