use crate::domain::model::{
    DestinationAssignment, DestinationPlan, PoolSettings, SampleRow, Transfer, TransferCommand,
};
use crate::utils::error::{PoolError, Result};
use indexmap::IndexMap;

pub const POOLING_COMMENT: &str = "Sample pooling";

/// Emits the aspirate/dispense program for pooling replicates.
///
/// Samples are visited by ascending destination well (ties keep first-appearance
/// order); replicates keep their row order.
pub fn generate_commands(
    rows: &[SampleRow],
    plan: &DestinationPlan,
    settings: &PoolSettings,
) -> Result<Vec<TransferCommand>> {
    let mut groups: IndexMap<&str, Vec<&SampleRow>> = IndexMap::new();
    for row in rows {
        groups.entry(row.sample_name.as_str()).or_default().push(row);
    }

    let mut ordered: Vec<(&DestinationAssignment, Vec<&SampleRow>)> =
        Vec::with_capacity(groups.len());
    for (sample, replicates) in groups {
        let destination = plan.resolve(sample).ok_or_else(|| {
            PoolError::internal(format!("sample \"{}\" has no destination assignment", sample))
        })?;
        ordered.push((destination, replicates));
    }
    // sort_by_key 是穩定排序，同位置時保留首次出現順序
    ordered.sort_by_key(|(destination, _)| destination.target_position);

    let mut commands = Vec::with_capacity(1 + rows.len() * 3);
    commands.push(TransferCommand::Comment(POOLING_COMMENT.to_string()));

    for (destination, replicates) in ordered {
        let last = replicates.len() - 1;
        for (i, replicate) in replicates.into_iter().enumerate() {
            commands.push(TransferCommand::Aspirate(Transfer {
                labware_name: replicate.source_labware_name.clone(),
                labware_type: replicate.source_labware_type.clone(),
                position: replicate.source_position,
                volume: settings.volume,
                liquid_class: settings.liquid_class.clone(),
            }));
            commands.push(TransferCommand::Dispense(Transfer {
                labware_name: destination.labware_name.clone(),
                labware_type: destination.labware_type.clone(),
                position: destination.target_position,
                volume: settings.volume,
                liquid_class: settings.liquid_class.clone(),
            }));

            if settings.new_tips_between_replicates || i == last {
                commands.push(TransferCommand::TipDiscard);
            } else {
                commands.push(TransferCommand::TipFlush);
            }
        }
    }

    Ok(commands)
}
