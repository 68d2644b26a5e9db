use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use calamine::{Data, ExcelDateTime, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawSheet};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the raw cell grid of a spreadsheet.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet of the workbook
/// * `.csv`     – plain rows, no header assumed
/// * `.json`    – `[[...], [...]]` rows, or `[{...}, {...}]` records
/// * `.parquet` – one row per record, schema field names as the first row
///
/// No row is treated as the header yet; see [`RawSheet::to_dataset`].
pub fn load_sheet(path: &Path) -> Result<RawSheet, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let sheet = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    }
    .map_err(LoadError::Read)?;

    if sheet.rows.iter().all(|row| row.iter().all(CellValue::is_blank)) {
        return Err(LoadError::Empty);
    }
    Ok(sheet)
}

// ---------------------------------------------------------------------------
// Excel loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path) -> Result<RawSheet> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheets")?
        .context("reading first worksheet")?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(excel_to_cell).collect())
        .collect();

    Ok(RawSheet::new(rows))
}

fn excel_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Date(excel_date_text(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

/// Date-times as `2024-01-30 12:00:00`. Durations, and serials outside the
/// calendar, keep the raw serial number.
fn excel_date_text(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        return dt.as_f64().to_string();
    }
    dt.as_datetime()
        .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| dt.as_f64().to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Every line becomes a row; rows may have different lengths.
fn load_csv(path: &Path) -> Result<RawSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawSheet::new(rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Accepts either shape produced by a DataFrame export:
///
/// ```json
/// [["ИП", "Цена продажи"], ["A", 100]]
/// ```
///
/// or records (`orient='records'`), whose keys become the first row:
///
/// ```json
/// [{ "ИП": "A", "Цена продажи": 100 }]
/// ```
fn load_json(path: &Path) -> Result<RawSheet> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let items = root.as_array().context("Expected top-level JSON array")?;

    if items.iter().all(JsonValue::is_array) {
        let rows = items
            .iter()
            .filter_map(JsonValue::as_array)
            .map(|row| row.iter().map(json_to_cell).collect())
            .collect();
        return Ok(RawSheet::new(rows));
    }

    // Records: header is the union of keys in first-seen order.
    let mut header: Vec<String> = Vec::new();
    for (i, item) in items.iter().enumerate() {
        let obj = item
            .as_object()
            .with_context(|| format!("Row {i} is neither an array nor an object"))?;
        for key in obj.keys() {
            if !header.contains(key) {
                header.push(key.clone());
            }
        }
    }

    let mut rows = Vec::with_capacity(items.len() + 1);
    rows.push(header.iter().map(|k| CellValue::String(k.clone())).collect());
    for item in items.iter().filter_map(JsonValue::as_object) {
        rows.push(
            header
                .iter()
                .map(|k| item.get(k).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect(),
        );
    }

    Ok(RawSheet::new(rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`); the schema's
/// field names become the first row so the header row can still be chosen.
fn load_parquet(path: &Path) -> Result<RawSheet> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let header: Vec<CellValue> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| CellValue::String(f.name().clone()))
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = vec![header];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            rows.push(cells);
        }
    }

    Ok(RawSheet::new(rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            CellValue::Date(array_value_to_string(col, row)?)
        }
        DataType::List(_) | DataType::LargeList(_) | DataType::Struct(_) | DataType::Map(_, _) => {
            bail!("nested column type {:?} is not supported", col.data_type())
        }
        _ => CellValue::String(array_value_to_string(col, row)?),
    };
    Ok(value)
}
