use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{CountryRow, EmissionsTable, SchemaError};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an emissions table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with a country column and one column per year
/// * `.json`    – records orientation: `[{ "Country/Region": ..., "1990": ... }, ...]`
/// * `.parquet` – wide schema: one string country column, one numeric column per year
pub fn load_file(path: &Path) -> Result<EmissionsTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Header classification
// ---------------------------------------------------------------------------

/// Column headers the country column is recognised by, lowercased. When
/// none matches, the first non-year column wins (the source dataset put the
/// name first, followed by a couple of metadata columns we don't chart).
const COUNTRY_HEADERS: [&str; 4] = ["country/region", "country", "region", "name"];

/// Case-insensitive match against [`COUNTRY_HEADERS`]. All three loaders
/// recognise the country column through this, so `Region` or `NAME` works
/// the same in CSV, JSON and Parquet.
fn is_country_header(header: &str) -> bool {
    COUNTRY_HEADERS.contains(&header.trim().to_ascii_lowercase().as_str())
}

/// Which header is the country column and which headers are year columns.
/// Shared by the CSV and Parquet readers, which both see a flat header row.
struct ColumnLayout {
    country_idx: usize,
    /// (column index, year), ascending by year.
    year_cols: Vec<(usize, i32)>,
}

impl ColumnLayout {
    fn from_headers(headers: &[String]) -> Result<Self, SchemaError> {
        let mut year_cols = Vec::new();
        let mut non_year = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            match parse_year(header) {
                Some(year) => year_cols.push((idx, year)),
                None => non_year.push(idx),
            }
        }
        if year_cols.is_empty() {
            return Err(SchemaError::NoYearColumns);
        }
        // files may list years in any order; the table wants them ascending
        year_cols.sort_by_key(|&(_, year)| year);

        let country_idx = non_year
            .iter()
            .copied()
            .find(|&i| is_country_header(&headers[i]))
            .or_else(|| non_year.first().copied())
            .ok_or(SchemaError::MissingCountryColumn)?;

        for &idx in non_year.iter().filter(|&&i| i != country_idx) {
            log::debug!("ignoring non-year column {:?}", headers[idx]);
        }

        Ok(ColumnLayout {
            country_idx,
            year_cols,
        })
    }

    fn years(&self) -> Vec<i32> {
        self.year_cols.iter().map(|&(_, year)| year).collect()
    }
}

/// A header is a year column when it reads as a four-digit year.
fn parse_year(header: &str) -> Option<i32> {
    let year: i32 = header.trim().parse().ok()?;
    (1000..=9999).contains(&year).then_some(year)
}

/// Parse one value cell. Empty, unparseable, and non-finite cells are all
/// missing values (a NaN would poison every total it touches).
fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        Ok(_) => None,
        Err(_) => {
            log::debug!("treating non-numeric cell {cell:?} as missing");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<EmissionsTable> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    read_csv(file)
}

/// Split from [`load_csv`] so tests can feed bytes directly.
fn read_csv<R: Read>(input: R) -> Result<EmissionsTable> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let layout = ColumnLayout::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let country = record
            .get(layout.country_idx)
            .unwrap_or("")
            .trim()
            .to_string();
        let values = layout
            .year_cols
            .iter()
            .map(|&(idx, _)| parse_cell(record.get(idx).unwrap_or("")))
            .collect();

        rows.push(CountryRow { country, values });
    }

    Ok(EmissionsTable::new(layout.years(), rows)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// One record of `df.to_json(orient='records')` output:
///
/// ```json
/// [
///   { "Country/Region": "China", "1990": 2420.2, "1991": 2512.9 },
///   { "Country/Region": "United States", "1990": 5121.2 }
/// ]
/// ```
///
/// Year keys may differ between records; the table takes their union and
/// the gaps become missing values. The country key is matched with
/// [`is_country_header`], like the CSV and Parquet headers.
#[derive(Debug, Deserialize)]
struct JsonRecord {
    #[serde(flatten)]
    cells: BTreeMap<String, JsonValue>,
}

impl JsonRecord {
    fn country(&self) -> Option<&str> {
        self.cells
            .iter()
            .find(|(key, _)| is_country_header(key))
            .and_then(|(_, value)| value.as_str())
    }
}

fn load_json(path: &Path) -> Result<EmissionsTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<EmissionsTable> {
    let records: Vec<JsonRecord> = serde_json::from_str(text).context("parsing JSON records")?;

    let mut year_set: BTreeSet<i32> = BTreeSet::new();
    let mut ignored: BTreeSet<&str> = BTreeSet::new();
    for record in &records {
        for key in record.cells.keys() {
            match parse_year(key) {
                Some(year) => {
                    year_set.insert(year);
                }
                None if !is_country_header(key) => {
                    ignored.insert(key.as_str());
                }
                None => {}
            }
        }
    }
    for key in ignored {
        log::debug!("ignoring non-year key {key:?}");
    }
    if year_set.is_empty() {
        return Err(SchemaError::NoYearColumns.into());
    }
    let years: Vec<i32> = year_set.into_iter().collect();

    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        let Some(country) = record.country() else {
            return Err(SchemaError::MissingCountryColumn.into());
        };

        let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
        for (key, value) in &record.cells {
            let Some(year) = parse_year(key) else {
                continue;
            };
            if let Some(v) = value.as_f64().filter(|v| v.is_finite()) {
                by_year.insert(year, v);
            }
        }
        let values = years.iter().map(|y| by_year.get(y).copied()).collect();
        rows.push(CountryRow {
            country: country.trim().to_string(),
            values,
        });
    }

    Ok(EmissionsTable::new(years, rows)?)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with a wide emissions schema.
///
/// Expected columns: one Utf8/LargeUtf8 country column (picked the same way
/// as for CSV) and one numeric column per year (Float64/Float32/Int64/Int32,
/// nulls allowed). Works with files written by Pandas (`df.to_parquet()`)
/// and by our own sample generator.
fn load_parquet(path: &Path) -> Result<EmissionsTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    read_parquet(file)
}

/// Generic over the reader so tests can hand in an in-memory buffer.
fn read_parquet<R: ChunkReader + 'static>(input: R) -> Result<EmissionsTable> {
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(input).context("reading parquet metadata")?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let layout = ColumnLayout::from_headers(&headers)?;

    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        let country_col = batch.column(layout.country_idx);
        if !matches!(
            country_col.data_type(),
            DataType::Utf8 | DataType::LargeUtf8
        ) {
            bail!(
                "country column {:?} is not a string column (got {:?})",
                headers[layout.country_idx],
                country_col.data_type()
            );
        }

        for row_idx in 0..batch.num_rows() {
            let country = string_cell(country_col, row_idx).unwrap_or_default();
            let values = layout
                .year_cols
                .iter()
                .map(|&(col_idx, _)| numeric_cell(batch.column(col_idx), row_idx))
                .collect();
            rows.push(CountryRow {
                country: country.trim().to_string(),
                values,
            });
        }
    }

    Ok(EmissionsTable::new(layout.years(), rows)?)
}

// -- Arrow helpers --

fn string_cell(col: &ArrayRef, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => Some(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        _ => None,
    }
}

/// Read one numeric cell, whatever width the writer chose.
fn numeric_cell(col: &ArrayRef, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    let value = match col.data_type() {
        DataType::Float64 => col.as_any().downcast_ref::<Float64Array>()?.value(row),
        DataType::Float32 => f64::from(col.as_any().downcast_ref::<Float32Array>()?.value(row)),
        DataType::Int64 => col.as_any().downcast_ref::<Int64Array>()?.value(row) as f64,
        DataType::Int32 => f64::from(col.as_any().downcast_ref::<Int32Array>()?.value(row)),
        other => {
            log::debug!("year column with unsupported type {other:?}");
            return None;
        }
    };
    value.is_finite().then_some(value)
}
