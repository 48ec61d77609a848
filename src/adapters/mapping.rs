use crate::adapters::sample_file::{read_table, resolve_format};
use crate::domain::model::{DestinationPlan, MappingTable, TableOptions};
use crate::utils::error::{PoolError, Result};
use csv::WriterBuilder;
use std::collections::HashSet;

pub const SAMPLE_ID_COLUMN: &str = "#SampleID";
pub const POST_POOL_COLUMNS: [&str; 3] = [
    "TECAN_postPool_labware_name",
    "TECAN_postPool_labware_type",
    "TECAN_postPool_target_position",
];

/// Loads a QIIME-style mapping file; `#SampleID` is required.
pub fn parse_mapping_table(data: &[u8], path: &str, options: &TableOptions) -> Result<MappingTable> {
    let format = resolve_format(options, path, "map_format")?;
    let (headers, records) = read_table(data, format, options.header)?;
    if !headers.iter().any(|h| h == SAMPLE_ID_COLUMN) {
        return Err(PoolError::MissingColumn {
            column: SAMPLE_ID_COLUMN.to_string(),
            table: format!("mapping file \"{}\"", path),
        });
    }

    Ok(MappingTable {
        headers,
        records: records
            .iter()
            .map(|r| r.iter().map(str::to_string).collect())
            .collect(),
    })
}

/// Keeps mapping rows for pooled samples and appends their pooled location.
///
/// Duplicate sample IDs keep their first row; mapping order is preserved.
pub fn join_pooled(mapping: &MappingTable, plan: &DestinationPlan) -> Result<MappingTable> {
    let id_index = mapping
        .headers
        .iter()
        .position(|h| h == SAMPLE_ID_COLUMN)
        .ok_or_else(|| PoolError::MissingColumn {
            column: SAMPLE_ID_COLUMN.to_string(),
            table: "mapping file".to_string(),
        })?;

    let mut headers = mapping.headers.clone();
    headers.extend(POST_POOL_COLUMNS.iter().map(|c| c.to_string()));

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for record in &mapping.records {
        let sample_id = record.get(id_index).map(String::as_str).unwrap_or("");
        if !seen.insert(sample_id.to_string()) {
            continue;
        }
        let Some(destination) = plan.resolve(sample_id) else {
            continue;
        };

        let mut joined = record.clone();
        joined.push(destination.labware_name.clone());
        joined.push(destination.labware_type.clone());
        joined.push(destination.target_position.to_string());
        records.push(joined);
    }

    tracing::debug!(
        "Mapping file: kept {} of {} rows",
        records.len(),
        mapping.records.len()
    );
    Ok(MappingTable { headers, records })
}

pub fn render_mapping(table: &MappingTable) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for record in &table.records {
        writer.write_record(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| PoolError::IoError(e.into_error()))
}
