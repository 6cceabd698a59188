use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::SubTrackError;
use crate::record::{Record, RecordId, parse_start_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileType {
    Csv,
    Parquet,
    Arrow,
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// Raw string cells of every record field, one vector per field.
struct RecordColumns {
    id: Vec<Option<String>>,
    name: Vec<Option<String>>,
    price: Vec<Option<String>>,
    currency: Vec<Option<String>>,
    frequency: Vec<Option<String>>,
    category: Vec<Option<String>>,
    start_date: Vec<Option<String>>,
    payment_method: Vec<Option<String>>,
    status: Vec<Option<String>>,
}

/// Loads the subscriptions stored in a csv, parquet or arrow ipc file.
pub fn load_records(path: PathBuf) -> Result<Vec<Record>, SubTrackError> {
    let file_info = get_file_info(path)?;
    debug!("Loading {:?}", file_info);
    let frame = match file_info.file_type {
        FileType::Csv => load_csv(&file_info.path)?,
        FileType::Parquet => load_parquet(&file_info.path)?,
        FileType::Arrow => load_arrow(&file_info.path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;
    let columns = RecordColumns::from_frame(&df)?;

    // Rows are independent, convert them in parallel. Order is preserved by collect.
    let records = (0..df.height())
        .into_par_iter()
        .map(|row| columns.record(row))
        .collect::<Result<Vec<Record>, SubTrackError>>()?;
    check_unique_ids(&records)?;

    info!(
        "Loaded {} records ({} bytes) in {}ms",
        records.len(),
        file_info.file_size,
        start_time.elapsed().as_millis()
    );
    Ok(records)
}

fn detect_file_type(path: &Path) -> Result<FileType, SubTrackError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::Csv),
        Some("PARQUET") | Some("PQ") => Ok(FileType::Parquet),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::Arrow),
        _ => Err(SubTrackError::UnknownFileType),
    }
}

fn get_file_info(path: PathBuf) -> Result<FileInfo, SubTrackError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SubTrackError::FileNotFound,
        ErrorKind::PermissionDenied => SubTrackError::PermissionDenied,
        _ => SubTrackError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(SubTrackError::LoadingFailed("Not a file!".into()));
    }

    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        path,
        file_size: metadata.len(),
        file_type,
    })
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

/// Reads the first existing column of `names` as strings.
fn string_column(df: &DataFrame, names: &[&str]) -> Result<Vec<Option<String>>, SubTrackError> {
    let Some(column) = names.iter().find_map(|name| df.column(name).ok()) else {
        return Err(SubTrackError::MissingColumn(names[0].to_string()));
    };
    let column = column.cast(&DataType::String)?;
    let series = column.str()?;
    Ok(series
        .into_iter()
        .map(|value| value.map(|s| s.trim().to_string()))
        .collect())
}

impl RecordColumns {
    fn from_frame(df: &DataFrame) -> Result<Self, SubTrackError> {
        Ok(Self {
            id: string_column(df, &["id"])?,
            name: string_column(df, &["name"])?,
            price: string_column(df, &["price"])?,
            currency: string_column(df, &["currency"])?,
            frequency: string_column(df, &["frequency"])?,
            category: string_column(df, &["category"])?,
            start_date: string_column(df, &["startDate", "start_date"])?,
            payment_method: string_column(df, &["paymentMethod", "payment_method"])?,
            status: string_column(df, &["status"])?,
        })
    }

    fn record(&self, row: usize) -> Result<Record, SubTrackError> {
        // 1-based data row for error messages
        let line = row + 1;
        let invalid = |reason: String| SubTrackError::InvalidRecord { row: line, reason };
        let cell = |column: &[Option<String>], field: &str| -> Result<String, SubTrackError> {
            match column.get(row) {
                Some(Some(value)) => Ok(value.clone()),
                _ => Err(invalid(format!("{field} is empty"))),
            }
        };

        let id = cell(&self.id, "id")?;
        let id = id
            .parse::<i64>()
            .map_err(|_| invalid(format!("id \"{id}\" is not an integer")))?;

        let price = cell(&self.price, "price")?;
        let price = price
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or_else(|| invalid(format!("price \"{price}\" is not a non-negative number")))?;

        let start_date = cell(&self.start_date, "startDate")?;
        let start_date = parse_start_date(&start_date)
            .ok_or_else(|| invalid(format!("startDate \"{start_date}\" is not a date")))?;

        Ok(Record {
            id: RecordId(id),
            name: cell(&self.name, "name")?,
            price,
            currency: cell(&self.currency, "currency")?
                .parse()
                .map_err(|e| invalid(format!("{e}")))?,
            frequency: cell(&self.frequency, "frequency")?
                .parse()
                .map_err(|e| invalid(format!("{e}")))?,
            category: cell(&self.category, "category")?
                .parse()
                .map_err(|e| invalid(format!("{e}")))?,
            start_date,
            payment_method: self
                .payment_method
                .get(row)
                .cloned()
                .flatten()
                .unwrap_or_default(),
            status: cell(&self.status, "status")?
                .parse()
                .map_err(|e| invalid(format!("{e}")))?,
        })
    }
}

fn check_unique_ids(records: &[Record]) -> Result<(), SubTrackError> {
    let mut seen = HashSet::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        if !seen.insert(record.id) {
            return Err(SubTrackError::InvalidRecord {
                row: idx + 1,
                reason: format!("duplicate id {}", record.id),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_types_by_extension() {
        assert_eq!(detect_file_type(Path::new("a.csv")).ok(), Some(FileType::Csv));
        assert_eq!(detect_file_type(Path::new("a.PQ")).ok(), Some(FileType::Parquet));
        assert_eq!(detect_file_type(Path::new("a.feather")).ok(), Some(FileType::Arrow));
        assert!(matches!(
            detect_file_type(Path::new("a.xlsx")),
            Err(SubTrackError::UnknownFileType)
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_records(PathBuf::from("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, SubTrackError::FileNotFound));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut records = crate::record::sample_subscriptions();
        records[4].id = RecordId(2);
        let err = check_unique_ids(&records).unwrap_err();
        assert!(matches!(err, SubTrackError::InvalidRecord { row: 5, .. }));
    }
}
