use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Include/skip call attached to every sample row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncludeFlag {
    Include,
    Skip,
}

impl IncludeFlag {
    /// Case-insensitive: `success`/`pass`/`include` vs `fail`/`skip`.
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "success" | "pass" | "include" => Some(IncludeFlag::Include),
            "fail" | "skip" => Some(IncludeFlag::Skip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub sample_name: String,
    pub include_flag: IncludeFlag,
    pub source_labware_name: String,
    pub source_labware_type: String,
    pub source_position: usize,
}

/// Run parameters shared by every stage of the pooling engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSettings {
    pub volume: f64,
    pub liquid_class: String,
    pub new_tips_between_replicates: bool,
    pub destination_labware_name: String,
    pub destination_labware_type: String,
    pub destination_start_offset: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            volume: 30.0,
            liquid_class: "Water Free Single No-cLLD".to_string(),
            new_tips_between_replicates: false,
            destination_labware_name: "Pooled DNA plate".to_string(),
            destination_labware_type: "96 Well Eppendorf TwinTec PCR".to_string(),
            destination_start_offset: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateGeometry {
    pub rows: usize,
    pub columns: usize,
}

impl PlateGeometry {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    pub fn wells(&self) -> usize {
        self.rows * self.columns
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationAssignment {
    pub plate_instance: usize,
    pub labware_name: String,
    pub labware_type: String,
    pub target_position: usize,
}

/// One destination per distinct sample, keyed by sample name in first-appearance order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DestinationPlan {
    pub assignments: IndexMap<String, DestinationAssignment>,
    pub capacity: usize,
    pub plates_needed: usize,
}

impl DestinationPlan {
    pub fn resolve(&self, sample_name: &str) -> Option<&DestinationAssignment> {
        self.assignments.get(sample_name)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transfer {
    pub labware_name: String,
    pub labware_type: String,
    pub position: usize,
    pub volume: f64,
    pub liquid_class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TransferCommand {
    /// Trace line for humans reading the worklist; no device effect.
    Comment(String),
    Aspirate(Transfer),
    Dispense(Transfer),
    /// Drop the tip into waste; the next aspirate takes a fresh one.
    TipDiscard,
    /// Flush the tip and keep it.
    TipFlush,
}

impl TransferCommand {
    pub fn transfer(&self) -> Option<&Transfer> {
        match self {
            TransferCommand::Aspirate(t) | TransferCommand::Dispense(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ManifestEntry {
    pub labware_name: String,
    pub labware_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PoolWarning {
    Overflow {
        distinct_samples: usize,
        capacity: usize,
        plates_needed: usize,
    },
}

impl fmt::Display for PoolWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolWarning::Overflow {
                distinct_samples,
                capacity,
                plates_needed,
            } => write!(
                f,
                "Not enough wells for the number of samples ({} samples, {} wells per plate). Using {} destination plates",
                distinct_samples, capacity, plates_needed
            ),
        }
    }
}

/// Everything the core produced for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolOutcome {
    pub plan: DestinationPlan,
    pub commands: Vec<TransferCommand>,
    pub manifest: Vec<ManifestEntry>,
    pub warnings: Vec<PoolWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Csv,
    Tab,
}

impl TableFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "csv" => Some(TableFormat::Csv),
            "tab" | "tsv" | "txt" => Some(TableFormat::Tab),
            _ => None,
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        std::path::Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::parse)
    }

    pub fn delimiter(&self) -> u8 {
        match self {
            TableFormat::Csv => b',',
            TableFormat::Tab => b'\t',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleColumns {
    pub sample: String,
    pub include: String,
    pub labware_name: String,
    pub labware_type: String,
    pub position: String,
}

impl Default for SampleColumns {
    fn default() -> Self {
        Self {
            sample: "Sample".to_string(),
            include: "Call".to_string(),
            labware_name: "labware_name".to_string(),
            labware_type: "labware_type".to_string(),
            position: "Well".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// `None` means detect from the file extension.
    pub format: Option<TableFormat>,
    pub header: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            format: None,
            header: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleFileOptions {
    pub table: TableOptions,
    /// `all`, or 1-based ranges such as `1-48,50`.
    pub rows: String,
    pub columns: SampleColumns,
}

/// A QIIME-style mapping table kept as raw text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolInput {
    pub rows: Vec<SampleRow>,
    pub mapping: Option<MappingTable>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_flag_tokens() {
        assert_eq!(IncludeFlag::parse("Success"), Some(IncludeFlag::Include));
        assert_eq!(IncludeFlag::parse("PASS"), Some(IncludeFlag::Include));
        assert_eq!(IncludeFlag::parse(" include "), Some(IncludeFlag::Include));
        assert_eq!(IncludeFlag::parse("Fail"), Some(IncludeFlag::Skip));
        assert_eq!(IncludeFlag::parse("skip"), Some(IncludeFlag::Skip));
        assert_eq!(IncludeFlag::parse("maybe"), None);
    }

    #[test]
    fn test_table_format_from_path() {
        assert_eq!(TableFormat::from_path("a/b.csv"), Some(TableFormat::Csv));
        assert_eq!(TableFormat::from_path("plate.txt"), Some(TableFormat::Tab));
        assert_eq!(TableFormat::from_path("plate.xlsx"), None);
        assert_eq!(TableFormat::from_path("noext"), None);
    }
}
