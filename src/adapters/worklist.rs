use crate::domain::model::{ManifestEntry, Transfer, TransferCommand};
use crate::utils::error::{PoolError, Result};
use csv::WriterBuilder;

/// Tip types loaded on the deck with their capacity in µl.
pub const TIP_TYPES: &[(&str, f64)] = &[
    ("FCA, 1000ul SBS", 1000.0),
    ("FCA, 200ul SBS", 200.0),
    ("FCA, 50ul SBS", 50.0),
    ("FCA, 10ul SBS", 10.0),
];

/// Smallest tip holding `volume`; the largest tip when none does.
pub fn tip_type_for(volume: f64) -> &'static str {
    let fitting = TIP_TYPES
        .iter()
        .filter(|(_, capacity)| volume <= *capacity)
        .min_by(|a, b| a.1.total_cmp(&b.1));

    match fitting {
        Some((name, _)) => *name,
        None => {
            tracing::warn!("No tip type holds {} µl; using the largest tip", volume);
            TIP_TYPES
                .iter()
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(name, _)| *name)
                .unwrap_or("")
        }
    }
}

fn format_volume(volume: f64) -> String {
    if volume.fract() == 0.0 {
        format!("{:.1}", volume)
    } else {
        volume.to_string()
    }
}

fn transfer_line(prefix: char, transfer: &Transfer) -> String {
    // A;RackLabel;RackID;RackType;Position;TubeID;Volume;LiquidClass;TipType;TipMask;ForcedRackType
    format!(
        "{};{};;{};{};;{};{};{};;",
        prefix,
        transfer.labware_name,
        transfer.labware_type,
        transfer.position,
        format_volume(transfer.volume),
        transfer.liquid_class,
        tip_type_for(transfer.volume)
    )
}

pub fn command_line(command: &TransferCommand) -> String {
    match command {
        TransferCommand::Comment(text) => format!("C;{}", text),
        TransferCommand::Aspirate(t) => transfer_line('A', t),
        TransferCommand::Dispense(t) => transfer_line('D', t),
        TransferCommand::TipDiscard => "W;".to_string(),
        TransferCommand::TipFlush => "F;".to_string(),
    }
}

/// Renders the command sequence as a GWL worklist, one command per line.
pub fn render_worklist(commands: &[TransferCommand]) -> String {
    let mut out = String::new();
    for command in commands {
        out.push_str(&command_line(command));
        out.push('\n');
    }
    out
}

/// Tab-separated labware table for the deck setup.
pub fn render_manifest(entries: &[ManifestEntry]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(Vec::new());
    writer.write_record(["labware_name", "labware_type"])?;
    for entry in entries {
        writer.write_record([entry.labware_name.as_str(), entry.labware_type.as_str()])?;
    }
    writer
        .into_inner()
        .map_err(|e| PoolError::IoError(e.into_error()))
}
