use crate::adapters::labware::sanitize_rack_label;
use crate::domain::model::{
    IncludeFlag, SampleFileOptions, SampleRow, TableFormat, TableOptions,
};
use crate::domain::ports::PositionDirectory;
use crate::utils::error::{PoolError, Result};
use csv::{ReaderBuilder, StringRecord, Trim};

/// Resolves the table format from the explicit option or the file extension.
pub fn resolve_format(options: &TableOptions, path: &str, field: &str) -> Result<TableFormat> {
    options
        .format
        .or_else(|| TableFormat::from_path(path))
        .ok_or_else(|| PoolError::InvalidConfigValueError {
            field: field.to_string(),
            value: path.to_string(),
            reason: "File is not in a usable format (expected csv or tab-delimited)".to_string(),
        })
}

/// Reads a delimited table into header names and data records.
///
/// Without a header row the columns are named by their 0-based index.
pub fn read_table(
    data: &[u8],
    format: TableFormat,
    header: bool,
) -> Result<(Vec<String>, Vec<StringRecord>)> {
    let mut reader = ReaderBuilder::new()
        .delimiter(format.delimiter())
        .has_headers(header)
        .trim(Trim::All)
        .from_reader(data);

    let headers: Option<Vec<String>> = if header {
        Some(reader.headers()?.iter().map(str::to_string).collect())
    } else {
        None
    };

    let records = reader.records().collect::<std::result::Result<Vec<_>, _>>()?;
    let headers = headers.unwrap_or_else(|| {
        let width = records.first().map(|r| r.len()).unwrap_or(0);
        (0..width).map(|i| i.to_string()).collect()
    });
    Ok((headers, records))
}

/// Row ranges picked from a sample table, as 0-based half-open intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSelection {
    ranges: Vec<std::ops::Range<usize>>,
}

impl RowSelection {
    pub fn contains(&self, index: usize) -> bool {
        self.ranges.iter().any(|range| range.contains(&index))
    }
}

/// Parses `all` or 1-based selections such as `1-48,50`.
///
/// `None` selects every row.
pub fn parse_row_selection(selection: &str) -> Result<Option<RowSelection>> {
    let selection = selection.trim();
    if selection.is_empty() || selection.eq_ignore_ascii_case("all") {
        return Ok(None);
    }

    let invalid = |reason: &str| PoolError::InvalidConfigValueError {
        field: "sample_rows".to_string(),
        value: selection.to_string(),
        reason: reason.to_string(),
    };

    let mut ranges = Vec::new();
    for part in selection.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((start, end)) => (start.trim(), end.trim()),
            None => (part, part),
        };
        let start: usize = start.parse().map_err(|_| invalid("Row numbers must be integers"))?;
        let end: usize = end.parse().map_err(|_| invalid("Row numbers must be integers"))?;
        if start == 0 || end < start {
            return Err(invalid("Rows are 1-based and ranges must be ascending"));
        }
        ranges.push((start - 1)..end);
    }
    Ok(Some(RowSelection { ranges }))
}

fn column_index(headers: &[String], column: &str, table: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| PoolError::MissingColumn {
            column: column.to_string(),
            table: table.to_string(),
        })
}

struct ColumnIndices {
    sample: usize,
    include: usize,
    labware_name: usize,
    labware_type: usize,
    position: usize,
}

/// Loads one sample file: column checks, include tokens, well conversion.
///
/// Rows come back stably sorted by source position. Skip rows are kept; the
/// caller decides what to drop.
pub fn parse_sample_table<D>(
    data: &[u8],
    path: &str,
    options: &SampleFileOptions,
    directory: &D,
) -> Result<Vec<SampleRow>>
where
    D: PositionDirectory + ?Sized,
{
    let format = resolve_format(&options.table, path, "sample_format")?;
    let (headers, records) = read_table(data, format, options.table.header)?;
    let selection = parse_row_selection(&options.rows)?;

    let table = format!("sample table \"{}\"", path);
    let columns = &options.columns;
    let idx = ColumnIndices {
        sample: column_index(&headers, &columns.sample, &table)?,
        include: column_index(&headers, &columns.include, &table)?,
        labware_name: column_index(&headers, &columns.labware_name, &table)?,
        labware_type: column_index(&headers, &columns.labware_type, &table)?,
        position: column_index(&headers, &columns.position, &table)?,
    };

    let mut rows = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if let Some(selected) = &selection {
            if !selected.contains(i) {
                continue;
            }
        }
        rows.push(parse_record(record, i + 1, &idx, directory)?);
    }

    rows.sort_by_key(|row| row.source_position);
    tracing::debug!("Loaded {} rows from {}", rows.len(), path);
    Ok(rows)
}

fn parse_record<D>(
    record: &StringRecord,
    row_number: usize,
    idx: &ColumnIndices,
    directory: &D,
) -> Result<SampleRow>
where
    D: PositionDirectory + ?Sized,
{
    let cell = |i: usize| record.get(i).unwrap_or("");

    let include_token = cell(idx.include);
    let include_flag =
        IncludeFlag::parse(include_token).ok_or_else(|| PoolError::InvalidIncludeValue {
            value: include_token.to_string(),
            row: row_number,
        })?;

    let labware_type = cell(idx.labware_type);
    if directory.geometry(labware_type).is_none() {
        return Err(PoolError::unknown_labware(labware_type));
    }
    let well = cell(idx.position);
    let source_position = directory
        .to_linear_position(well, labware_type)
        .ok_or_else(|| PoolError::InvalidWell {
            well: well.to_string(),
            labware_type: labware_type.to_string(),
        })?;

    Ok(SampleRow {
        sample_name: cell(idx.sample).to_string(),
        include_flag,
        source_labware_name: sanitize_rack_label(cell(idx.labware_name)),
        source_labware_type: labware_type.to_string(),
        source_position,
    })
}
