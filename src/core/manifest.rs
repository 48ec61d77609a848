use crate::domain::model::{ManifestEntry, TransferCommand};
use indexmap::IndexSet;

/// Distinct labware referenced by the program, in first-appearance order.
pub fn build_manifest(commands: &[TransferCommand]) -> Vec<ManifestEntry> {
    let entries: IndexSet<ManifestEntry> = commands
        .iter()
        .filter_map(TransferCommand::transfer)
        .map(|t| ManifestEntry {
            labware_name: t.labware_name.clone(),
            labware_type: t.labware_type.clone(),
        })
        .collect();
    entries.into_iter().collect()
}
