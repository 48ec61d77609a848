use crate::domain::model::PlateGeometry;
use crate::domain::ports::PositionDirectory;
use crate::utils::error::{PoolError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

const BUILTIN_LABWARE: &[(&str, usize, usize)] = &[
    ("96 Well Eppendorf TwinTec PCR", 8, 12),
    ("PCR Adapter 96 Well and 96 Well Eppendorf TwinTec PCR", 8, 12),
    ("96 Well Skirted PCR", 8, 12),
    ("96 Well Greiner Microplate", 8, 12),
    ("384 Well Biorad PCR", 16, 24),
    ("PCR Adapter 384 Well and 384 Well Biorad PCR", 16, 24),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabwareDefinition {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Deserialize)]
struct LabwareFile {
    #[serde(default)]
    labware: Vec<LabwareDefinition>,
}

/// In-memory plate catalog. Wells are numbered column-wise (A1, B1, ... H1, A2).
#[derive(Debug, Clone, Default)]
pub struct LabwareCatalog {
    entries: HashMap<String, PlateGeometry>,
}

impl LabwareCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        BUILTIN_LABWARE
            .iter()
            .fold(Self::empty(), |catalog, (name, rows, columns)| {
                catalog.with_labware(name, *rows, *columns)
            })
    }

    pub fn with_labware(mut self, name: &str, rows: usize, columns: usize) -> Self {
        self.entries
            .insert(name.to_string(), PlateGeometry::new(rows, columns));
        self
    }

    /// 從 TOML 檔案載入額外的 labware 定義
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// ```toml
    /// [[labware]]
    /// name = "1536 Well Greiner"
    /// rows = 32
    /// columns = 48
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: LabwareFile =
            toml::from_str(content).map_err(|e| PoolError::ConfigValidationError {
                field: "labware".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        let mut catalog = Self::empty();
        for definition in file.labware {
            if definition.rows == 0 || definition.columns == 0 {
                return Err(PoolError::InvalidConfigValueError {
                    field: "labware".to_string(),
                    value: definition.name,
                    reason: "rows and columns must be at least 1".to_string(),
                });
            }
            catalog = catalog.with_labware(&definition.name, definition.rows, definition.columns);
        }
        Ok(catalog)
    }

    /// Built-in entries plus the optional labware file on top.
    pub fn with_overrides(labware_file: Option<&str>) -> Result<Self> {
        let catalog = Self::builtin();
        match labware_file {
            Some(path) => {
                let extra = Self::from_file(path)?;
                tracing::info!("Loaded {} labware definitions from {}", extra.len(), path);
                Ok(catalog.merge(extra))
            }
            None => Ok(catalog),
        }
    }

    /// Entries from `other` override entries with the same name.
    pub fn merge(mut self, other: LabwareCatalog) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rack labels containing `.` fail on the device; swap them for `_`.
pub fn sanitize_rack_label(label: &str) -> String {
    label.replace('.', "_")
}

fn well_label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Za-z]+)0*([1-9][0-9]*)$").unwrap())
}

/// `A` = 1, `Z` = 26, `AA` = 27. `None` once the label no longer fits a `usize`.
fn row_index(letters: &str) -> Option<usize> {
    letters
        .bytes()
        .map(|b| (b.to_ascii_uppercase() - b'A') as usize + 1)
        .try_fold(0usize, |acc, digit| acc.checked_mul(26)?.checked_add(digit))
}

impl PositionDirectory for LabwareCatalog {
    fn geometry(&self, labware_type: &str) -> Option<PlateGeometry> {
        self.entries.get(labware_type).copied()
    }

    fn to_linear_position(&self, well_label: &str, labware_type: &str) -> Option<usize> {
        let geometry = self.geometry(labware_type)?;
        let label = well_label.trim();

        if let Ok(position) = label.parse::<usize>() {
            return (1..=geometry.wells()).contains(&position).then_some(position);
        }

        let caps = well_label_pattern().captures(label)?;
        let row = row_index(&caps[1])?;
        let column: usize = caps[2].parse().ok()?;
        if row > geometry.rows || column > geometry.columns {
            return None;
        }
        Some((column - 1) * geometry.rows + row)
    }
}
