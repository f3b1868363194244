//! Tabular upload parsing (CSV and spreadsheets).
//!
//! Only the first worksheet of a spreadsheet is read, and its first row
//! holds the headers. Headers are matched against per-field aliases, so both
//! the Chinese template (`经度`, `纬度`, `污染物浓度`, `标记名称`) and English
//! headers work.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use tracing::debug;

use heatmap_common::{HeatmapError, HeatmapResult, SamplePoint};

use crate::upload_store::UploadRecord;

/// Container format of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Spreadsheet,
}

/// Header row plus data rows, all as trimmed strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn cell(&self, row: usize, col: usize) -> &str {
        self.rows[row].get(col).map(String::as_str).unwrap_or("")
    }
}

/// Canonical upload fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Lng,
    Lat,
    Concentration,
    Name,
}

impl Field {
    pub fn canonical(&self) -> &'static str {
        match self {
            Field::Lng => "lng",
            Field::Lat => "lat",
            Field::Concentration => "concentration",
            Field::Name => "name",
        }
    }

    /// Accepted header spellings, compared case-insensitively.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Lng => &["经度", "lng", "lon", "longitude", "x"],
            Field::Lat => &["纬度", "lat", "latitude", "y"],
            Field::Concentration => &["污染物浓度", "concentration", "value", "pm25"],
            Field::Name => &["标记名称", "name", "label"],
        }
    }

    fn matches(&self, header: &str) -> bool {
        let header = header.trim().to_lowercase();
        self.aliases().iter().any(|a| *a == header)
    }
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// Pick the format from the file extension, else from the content.
pub fn detect_format(filename: Option<&str>, bytes: &[u8]) -> TableFormat {
    let ext = filename
        .and_then(|f| f.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("csv") | Some("txt") => TableFormat::Csv,
        Some("xlsx") | Some("xlsm") | Some("xlsb") | Some("xls") | Some("ods") => TableFormat::Spreadsheet,
        _ if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) => TableFormat::Spreadsheet,
        _ => TableFormat::Csv,
    }
}

/// Read an uploaded file into a table.
pub fn read_table(filename: Option<&str>, bytes: &[u8]) -> HeatmapResult<Table> {
    let format = detect_format(filename, bytes);
    let table = match format {
        TableFormat::Csv => read_csv(bytes)?,
        TableFormat::Spreadsheet => read_spreadsheet(bytes)?,
    };
    debug!(
        format = ?format,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "Parsed tabular upload"
    );
    Ok(table)
}

fn read_csv(bytes: &[u8]) -> HeatmapResult<Table> {
    let bytes = bytes.strip_prefix("\u{feff}".as_bytes()).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| HeatmapError::InputMalformed(format!("unreadable CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| HeatmapError::InputMalformed(format!("unreadable CSV row: {}", e)))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table { headers, rows })
}

fn read_spreadsheet(bytes: &[u8]) -> HeatmapResult<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| HeatmapError::InputMalformed(format!("unreadable spreadsheet: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| HeatmapError::InputMalformed("spreadsheet has no worksheets".to_string()))?
        .map_err(|e| HeatmapError::InputMalformed(format!("unreadable worksheet: {}", e)))?;

    let mut rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    let headers = rows.next().unwrap_or_default();

    Ok(Table {
        headers,
        rows: rows.collect(),
    })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Column index of each field, or `MissingColumns` naming every absent one.
pub fn resolve_columns(headers: &[String], fields: &[Field]) -> HeatmapResult<Vec<usize>> {
    let mut found = Vec::with_capacity(fields.len());
    let mut missing = Vec::new();

    for field in fields {
        match headers.iter().position(|h| field.matches(h)) {
            Some(idx) => found.push(idx),
            None => missing.push(field.canonical().to_string()),
        }
    }

    if missing.is_empty() {
        Ok(found)
    } else {
        Err(HeatmapError::MissingColumns(missing))
    }
}

fn number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Measurement samples for the heatmap pipeline.
///
/// Rows with an empty or non-numeric coordinate or value are skipped.
pub fn parse_samples(table: &Table) -> HeatmapResult<Vec<SamplePoint>> {
    let cols = resolve_columns(&table.headers, &[Field::Lng, Field::Lat, Field::Concentration])?;

    let mut samples = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let parsed = (
            number(table.cell(row, cols[0])),
            number(table.cell(row, cols[1])),
            number(table.cell(row, cols[2])),
        );
        match parsed {
            (Some(x), Some(y), Some(value)) => samples.push(SamplePoint::new(x, y, value)),
            _ => debug!(row = row + 2, "Skipping row without numeric lng/lat/concentration"),
        }
    }
    Ok(samples)
}

/// Marker records for the map view; requires a name column as well.
pub fn parse_upload_records(table: &Table) -> HeatmapResult<Vec<UploadRecord>> {
    let cols = resolve_columns(
        &table.headers,
        &[Field::Lng, Field::Lat, Field::Concentration, Field::Name],
    )?;

    let mut records = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let parsed = (
            number(table.cell(row, cols[0])),
            number(table.cell(row, cols[1])),
            number(table.cell(row, cols[2])),
        );
        match parsed {
            (Some(lng), Some(lat), Some(concentration)) => records.push(UploadRecord {
                lng,
                lat,
                concentration,
                name: table.cell(row, cols[3]).to_string(),
            }),
            _ => debug!(row = row + 2, "Skipping marker row without numeric lng/lat/concentration"),
        }
    }
    Ok(records)
}
