//! CSV ingest.
//!
//! Turns the bytes of an uploaded sales file into `SalesRecord`s.
//!
//! - **Strict schema**: the header row must carry every required column,
//!   otherwise nothing is parsed and the run stops with `MissingColumns`.
//! - **Row-level leniency**: a row whose branch, product, year or month cannot
//!   be read is skipped and reported, it never aborts the run. A blank numeric
//!   cell is kept as `NaN` and left to the aggregation stage.
//! - **No derivation here**: computed columns live in `metrics::derive`.

use std::path::Path;

use chrono::NaiveDate;
use csv::{ByteRecord, StringRecord};
use tracing::{debug, warn};

use crate::domain::{SalesRecord, Upload};
use crate::error::AppError;
use crate::io::schema::{validate_columns, ColumnMap, RequiredColumn};

/// Years accepted at ingest: four digits, so `YYYY-MM` labels sort as dates.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1000..=9999;

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub rows_read: usize,
    pub rows_used: usize,
}

impl IngestStats {
    pub fn rows_skipped(&self) -> usize {
        self.rows_read - self.rows_used
    }
}

/// Ingest output: parsed records + stats + skipped rows.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<SalesRecord>,
    pub stats: IngestStats,
    pub row_errors: Vec<RowError>,
}

/// Read a CSV file from disk into an in-memory upload.
pub fn read_upload(path: &Path) -> Result<Upload, AppError> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::io(format!("Failed to read CSV '{}'", path.display()), e))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!(file = %name, bytes = bytes.len(), "loaded upload");
    Ok(Upload::new(name, bytes))
}

/// Validate the header row and parse every data row.
pub fn load_sales_records(bytes: &[u8]) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    // Header cells are decoded lossily so a stray non-UTF-8 byte only spoils
    // the column it appears in.
    let headers = match reader.byte_headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            warn!(error = %e, "failed to read CSV header row");
            ByteRecord::new()
        }
    };
    let header_names: Vec<String> = headers
        .iter()
        .map(|cell| String::from_utf8_lossy(cell).into_owned())
        .collect();

    let columns = validate_columns(header_names.iter().map(String::as_str))?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts right after the header, which is line 1.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &columns));

        match parsed {
            Ok(record) => records.push(record),
            Err(message) => {
                warn!(line, %message, "skipping row");
                row_errors.push(RowError { line, message });
            }
        }
    }

    let stats = IngestStats {
        rows_read,
        rows_used: records.len(),
    };
    debug!(rows_read = stats.rows_read, rows_used = stats.rows_used, "ingest complete");

    Ok(IngestedData {
        records,
        stats,
        row_errors,
    })
}

fn parse_row(record: &StringRecord, columns: &ColumnMap) -> Result<SalesRecord, String> {
    let branch = get_text(record, columns, RequiredColumn::Branch)?.to_string();
    let product = get_text(record, columns, RequiredColumn::Product)?.to_string();
    let year = parse_integer(get_text(record, columns, RequiredColumn::Year)?, RequiredColumn::Year)?;
    let month = parse_integer(get_text(record, columns, RequiredColumn::Month)?, RequiredColumn::Month)?;

    let month = u32::try_from(month)
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| format!("Invalid `{}` value {month} (expected 1-12).", RequiredColumn::Month.canonical()))?;
    let year = i32::try_from(year)
        .ok()
        .filter(|y| YEAR_RANGE.contains(y) && NaiveDate::from_ymd_opt(*y, month, 1).is_some())
        .ok_or_else(|| {
            format!(
                "Invalid `{}` value {year} (expected {}-{}).",
                RequiredColumn::Year.canonical(),
                YEAR_RANGE.start(),
                YEAR_RANGE.end()
            )
        })?;

    Ok(SalesRecord {
        branch,
        product,
        year,
        month,
        units_sold: parse_number(record, columns, RequiredColumn::UnitsSold)?,
        revenue: parse_number(record, columns, RequiredColumn::Revenue)?,
        cost: parse_number(record, columns, RequiredColumn::Cost)?,
    })
}

fn get_text<'a>(record: &'a StringRecord, columns: &ColumnMap, column: RequiredColumn) -> Result<&'a str, String> {
    record
        .get(columns.index(column))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing value for `{}`.", column.canonical()))
}

/// Integers may arrive as `2024` or, from spreadsheet exports, `2024.0`.
fn parse_integer(s: &str, column: RequiredColumn) -> Result<i64, String> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(format!("Invalid integer '{s}' for `{}`.", column.canonical())),
    }
}

/// A blank or absent cell is `NaN`; text that is not a finite number is an error.
fn parse_number(record: &StringRecord, columns: &ColumnMap, column: RequiredColumn) -> Result<f64, String> {
    let Ok(s) = get_text(record, columns, column) else {
        return Ok(f64::NAN);
    };
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid number '{s}' for `{}`.", column.canonical())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Sucursal,Producto,Año,Mes,Unidades_vendidas,Ingreso_total,Costo_total\n";

    #[test]
    fn parses_valid_rows() {
        let csv = format!("{HEADER}Centro,Cafe,2024,3,10,250.5,100\nNorte,Te,2024.0,12,0,0,5\n");
        let data = load_sales_records(csv.as_bytes()).unwrap();
        assert_eq!(data.stats, IngestStats { rows_read: 2, rows_used: 2 });
        assert_eq!(
            data.records[0],
            SalesRecord {
                branch: "Centro".to_string(),
                product: "Cafe".to_string(),
                year: 2024,
                month: 3,
                units_sold: 10.0,
                revenue: 250.5,
                cost: 100.0,
            }
        );
        assert_eq!(data.records[1].year, 2024);
        assert_eq!(data.records[1].month, 12);
    }

    #[test]
    fn missing_column_stops_before_any_row_is_parsed() {
        let csv = "Sucursal,Producto,Año,Unidades_vendidas,Ingreso_total,Costo_total\nA,B,2024,1,1,1\n";
        match load_sales_records(csv.as_bytes()) {
            Err(AppError::MissingColumns { missing }) => assert_eq!(missing, vec!["Mes"]),
            other => panic!("expected missing column error, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_is_missing_every_column() {
        match load_sales_records(b"") {
            Err(AppError::MissingColumns { missing }) => assert_eq!(missing.len(), 7),
            other => panic!("expected missing column error, got {other:?}"),
        }
    }

    #[test]
    fn header_only_file_yields_no_records() {
        let data = load_sales_records(HEADER.as_bytes()).unwrap();
        assert!(data.records.is_empty());
        assert_eq!(data.stats.rows_read, 0);
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let csv = format!(
            "{HEADER}A,P,2024,13,1,1,1\nA,P,2024,1,abc,1,1\n,P,2024,1,1,1,1\nA,P,2024,2,5,10,4\n"
        );
        let data = load_sales_records(csv.as_bytes()).unwrap();
        assert_eq!(data.stats.rows_read, 4);
        assert_eq!(data.stats.rows_used, 1);
        assert_eq!(data.stats.rows_skipped(), 3);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert!(data.row_errors[0].message.contains("Mes"));
        assert!(data.row_errors[2].message.contains("Sucursal"));
    }

    #[test]
    fn blank_numeric_cells_become_nan() {
        let csv = format!("{HEADER}A,P,2024,1,10,100,50\nA,P,2024,2,20,200,\nA,P,2024,3,5,50\n");
        let data = load_sales_records(csv.as_bytes()).unwrap();
        assert_eq!(data.stats.rows_used, 3);
        assert!(data.row_errors.is_empty());
        assert_eq!(data.records[1].units_sold, 20.0);
        assert!(data.records[1].cost.is_nan());
        assert!(data.records[2].cost.is_nan());
    }

    #[test]
    fn years_outside_four_digits_are_rejected() {
        let csv = format!("{HEADER}A,P,999,12,1,1,1\nA,P,1000,1,2,2,1\nA,P,10000,1,3,3,1\nA,P,-5,1,4,4,1\n");
        let data = load_sales_records(csv.as_bytes()).unwrap();
        let years: Vec<i32> = data.records.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![1000]);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 4, 5]);
        assert!(data.row_errors[0].message.contains("Año"));
    }

    #[test]
    fn non_utf8_header_only_spoils_its_own_column() {
        let mut csv = b"Sucursal,Producto,A\xf1o,Mes,Unidades_vendidas,Ingreso_total,Costo_total\n".to_vec();
        csv.extend_from_slice(b"A,P,2024,1,1,1,1\n");
        match load_sales_records(&csv) {
            Err(AppError::MissingColumns { missing }) => assert_eq!(missing, vec!["Año"]),
            other => panic!("expected missing column error, got {other:?}"),
        }
    }

    #[test]
    fn extra_columns_and_english_aliases_are_accepted() {
        let csv = "Region,Branch,Product,Year,Month,UnitsSold,Revenue,Cost\nX,B1,P1,2023,7,3,30,12\n";
        let data = load_sales_records(csv.as_bytes()).unwrap();
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.records[0].branch, "B1");
        assert_eq!(data.records[0].cost, 12.0);
    }

    #[test]
    fn read_upload_keeps_file_name_and_bytes() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        let upload = read_upload(file.path()).unwrap();
        assert!(upload.name.ends_with(".csv"));
        assert_eq!(&*upload.bytes, HEADER.as_bytes());
    }

    #[test]
    fn read_upload_reports_missing_file() {
        let err = read_upload(Path::new("definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
