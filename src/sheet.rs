//! Sheet loading: spreadsheet bytes to worksheet names and to one polars `DataFrame`.
//!
//! The first row of a worksheet is the header; the remaining rows are data. Each column is
//! typed from its cells so numeric columns stay numeric (whole-number floats become Int64).

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::error::{ExploreError, Result};

/// Inferred type for a worksheet column (preserves numbers, bools, dates; avoids stringifying).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CellColType {
    Int64,
    Float64,
    Boolean,
    Utf8,
    Date,
    Datetime,
}

/// Read an uploaded file fully into memory.
pub fn read_upload(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| ExploreError::UnreadableFile(format!("{}: {}", path.display(), e)))
}

fn open_workbook(content: &[u8]) -> Result<Sheets<Cursor<&[u8]>>> {
    Ok(open_workbook_auto_from_rs(Cursor::new(content))?)
}

/// Worksheet names in workbook order.
pub fn list_sheets(content: &[u8]) -> Result<Vec<String>> {
    let workbook = open_workbook(content)?;
    Ok(workbook.sheet_names().to_vec())
}

/// Materialize one worksheet as a `DataFrame`, preserving column order and cell types.
pub fn load_sheet(content: &[u8], sheet_name: &str) -> Result<DataFrame> {
    let mut workbook = open_workbook(content)?;
    let sheet_names = workbook.sheet_names().to_vec();
    if !sheet_names.iter().any(|s| s == sheet_name) {
        return Err(ExploreError::SheetNotFound {
            sheet: sheet_name.to_string(),
            available: sheet_names,
        });
    }
    let range = workbook.worksheet_range(sheet_name)?;
    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    let df = rows_to_frame(&rows)?;
    debug!(
        sheet = sheet_name,
        rows = df.height(),
        columns = df.width(),
        "worksheet loaded"
    );
    Ok(df)
}

/// Header row + data rows to a typed `DataFrame`. No rows yields an empty frame.
fn rows_to_frame(rows: &[Vec<Data>]) -> Result<DataFrame> {
    let Some((header_row, data_rows)) = rows.split_first() else {
        return Ok(DataFrame::empty());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|c| calamine::DataType::as_string(c).unwrap_or_else(|| c.to_string()))
        .collect();
    let names = unique_column_names(&headers);
    let mut columns = Vec::with_capacity(names.len());
    for (col_idx, name) in names.iter().enumerate() {
        let cells: Vec<Option<&Data>> = data_rows.iter().map(|row| row.get(col_idx)).collect();
        let inferred = infer_column_type(&cells);
        let series = column_to_series(name.as_str(), &cells, inferred)?;
        columns.push(series.into());
    }
    Ok(DataFrame::new(columns)?)
}

/// Header names made unique: blank headers become `column_N`, repeats get `.1`, `.2`, ...
fn unique_column_names(headers: &[String]) -> Vec<String> {
    let mut taken = HashSet::with_capacity(headers.len());
    headers
        .iter()
        .enumerate()
        .map(|(col_idx, header)| {
            let base = if header.trim().is_empty() {
                format!("column_{}", col_idx + 1)
            } else {
                header.clone()
            };
            let mut name = base.clone();
            let mut suffix = 0;
            while taken.contains(&name) {
                suffix += 1;
                name = format!("{}.{}", base, suffix);
            }
            if suffix > 0 {
                debug!(header = base.as_str(), renamed = name.as_str(), "duplicate header renamed");
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

/// Infers column type: any string makes the column text; prefers Int64 for whole-number
/// floats; Date/Datetime only for cells the workbook stores as dates.
fn infer_column_type(cells: &[Option<&Data>]) -> CellColType {
    use calamine::DataType as CellTrait;
    let mut has_string = false;
    let mut has_float = false;
    let mut has_int = false;
    let mut has_bool = false;
    let mut has_datetime = false;
    for cell in cells.iter().flatten() {
        if CellTrait::is_string(*cell) {
            has_string = true;
            break;
        }
        if CellTrait::is_float(*cell) {
            has_float = true;
        }
        if CellTrait::is_int(*cell) {
            has_int = true;
        }
        if CellTrait::is_bool(*cell) {
            has_bool = true;
        }
        if CellTrait::is_datetime(*cell) || CellTrait::is_datetime_iso(*cell) {
            has_datetime = true;
        }
    }
    if has_string {
        CellColType::Utf8
    } else if has_datetime {
        if all_midnight(cells) {
            CellColType::Date
        } else {
            CellColType::Datetime
        }
    } else if has_int {
        CellColType::Int64
    } else if has_float {
        let all_whole = cells.iter().flatten().all(|cell| {
            cell.as_f64()
                .is_none_or(|f| f.is_finite() && (f - f.trunc()).abs() < 1e-10)
        });
        if all_whole {
            CellColType::Int64
        } else {
            CellColType::Float64
        }
    } else if has_bool {
        CellColType::Boolean
    } else {
        CellColType::Utf8
    }
}

/// True if every cell that parses as datetime has time 00:00:00.
fn all_midnight(cells: &[Option<&Data>]) -> bool {
    cells
        .iter()
        .flatten()
        .filter_map(|c| cell_to_naive_datetime(c))
        .all(|dt| dt.time() == NaiveTime::MIN)
}

/// Date cell as NaiveDateTime: an Excel serial date or an ODS ISO value.
fn cell_to_naive_datetime(cell: &Data) -> Option<NaiveDateTime> {
    use calamine::DataType;
    if cell.is_datetime() {
        return cell.as_datetime();
    }
    let iso = cell.get_datetime_iso()?.trim();
    NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(iso, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Build a Series from a column of cells using the inferred type.
fn column_to_series(
    name: &str,
    cells: &[Option<&Data>],
    col_type: CellColType,
) -> PolarsResult<Series> {
    use calamine::DataType as CellTrait;
    let series = match col_type {
        CellColType::Int64 => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.as_i64()))
                .collect();
            Series::new(name.into(), v)
        }
        CellColType::Float64 => {
            let v: Vec<Option<f64>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.as_f64()))
                .collect();
            Series::new(name.into(), v)
        }
        CellColType::Boolean => {
            let v: Vec<Option<bool>> = cells
                .iter()
                .map(|c| c.and_then(|cell| cell.get_bool()))
                .collect();
            Series::new(name.into(), v)
        }
        CellColType::Utf8 => {
            let v: Vec<Option<String>> = cells
                .iter()
                .map(|c| c.filter(|cell| !cell.is_empty()).and_then(|cell| cell.as_string()))
                .collect();
            Series::new(name.into(), v)
        }
        CellColType::Date => {
            let epoch = NaiveDate::default();
            let v: Vec<Option<i32>> = cells
                .iter()
                .map(|c| {
                    c.and_then(cell_to_naive_datetime)
                        .map(|dt| (dt.date() - epoch).num_days() as i32)
                })
                .collect();
            Series::new(name.into(), v).cast(&DataType::Date)?
        }
        CellColType::Datetime => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| {
                    c.and_then(cell_to_naive_datetime)
                        .map(|dt| dt.and_utc().timestamp_micros())
                })
                .collect();
            Series::new(name.into(), v).cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
        }
    };
    Ok(series)
}
