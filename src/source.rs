use polars::prelude::*;
use rayon::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::domain::DashError;
use crate::pages::TableSpec;
use crate::record::{ColumnSpec, Record, Value};

#[derive(Debug, PartialEq)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

#[derive(Debug)]
struct FileInfo {
    path: PathBuf,
    file_size: u64,
    file_type: FileType,
}

/// Records read from a data file together with a table layout for them.
#[derive(Debug)]
pub struct Imported {
    pub records: Vec<Record>,
    pub table: TableSpec,
}

// One converted column, values aligned with the frame rows
struct ColumnValues {
    name: String,
    textual: bool,
    values: Vec<Option<Value>>,
}

#[instrument]
pub fn import(path: &str) -> Result<Imported, DashError> {
    let expanded = shellexpand::full(path)
        .map_err(|e| DashError::loading_failed(format!("Cannot expand {path}: {e}")))?;
    let file_info = get_file_info(PathBuf::from(expanded.into_owned()))?;
    debug!("Importing {:?}", file_info);

    let frame = match file_info.file_type {
        FileType::CSV => load_csv(&file_info.path)?,
        FileType::PARQUET => load_parquet(&file_info.path)?,
        FileType::ARROW => load_arrow(&file_info.path)?,
    };

    // Columns are converted in parallel, each in its own task.
    let start_time = Instant::now();
    let df = Arc::new(frame.collect()?);
    let converted: Result<Vec<ColumnValues>, PolarsError> = df
        .get_column_names()
        .par_iter()
        .map(|name| convert_column(&df, name))
        .collect();
    let columns = converted?;

    let records = assemble(&columns, df.height());
    info!(
        "Imported {} rows x {} columns ({} bytes) in {}ms",
        records.len(),
        columns.len(),
        file_info.file_size,
        start_time.elapsed().as_millis()
    );

    let title = file_info
        .path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("???")
        .to_string();
    Ok(Imported {
        records,
        table: table_spec(title, &columns),
    })
}

fn assemble(columns: &[ColumnValues], height: usize) -> Vec<Record> {
    (0..height)
        .map(|row| {
            let mut record = Record::new();
            for column in columns {
                if let Some(Some(value)) = column.values.get(row) {
                    record.insert(&column.name, value.clone());
                }
            }
            record
        })
        .collect()
}

fn table_spec(title: String, columns: &[ColumnValues]) -> TableSpec {
    TableSpec {
        title,
        columns: columns
            .iter()
            .map(|c| ColumnSpec::new(&c.name, &c.name))
            .collect(),
        search_keys: columns
            .iter()
            .filter(|c| c.textual)
            .map(|c| c.name.clone())
            .collect(),
        hidden_columns: Vec::new(),
    }
}

fn is_numeric_type(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn is_temporal_type(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Date | DataType::Datetime(_, _))
}

fn convert_column(df: &DataFrame, col_name: &str) -> Result<ColumnValues, PolarsError> {
    let column = df.column(col_name)?;
    let dtype = column.dtype().clone();

    let values: Vec<Option<Value>> = if is_numeric_type(&dtype) {
        let col = column.cast(&DataType::Float64)?;
        col.f64()?.into_iter().map(|v| v.map(Value::Number)).collect()
    } else if dtype == DataType::Boolean {
        column.bool()?.into_iter().map(|v| v.map(Value::Bool)).collect()
    } else {
        let col = column.cast(&DataType::String)?;
        let temporal = is_temporal_type(&dtype);
        col.str()?
            .into_iter()
            .map(|v| {
                v.map(|s| {
                    let s = s.replace("\r\n", " ↵ ").replace('\n', " ↵ ");
                    if temporal { Value::Date(s) } else { Value::Text(s) }
                })
            })
            .collect()
    };

    Ok(ColumnValues {
        name: col_name.to_string(),
        textual: !is_numeric_type(&dtype) && dtype != DataType::Boolean,
        values,
    })
}

fn detect_file_type(path: &Path) -> Result<FileType, DashError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(DashError::UnknownFileType),
    }
}

fn get_file_info(path: PathBuf) -> Result<FileInfo, DashError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DashError::FileNotFound,
        ErrorKind::PermissionDenied => DashError::PermissionDenied,
        _ => DashError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(DashError::loading_failed("Not a file!"));
    }

    let file_size = metadata.len();
    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        path,
        file_size,
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("sdrdash-{}-{name}", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn file_types_by_extension() {
        assert_eq!(detect_file_type(Path::new("a.csv")).unwrap(), FileType::CSV);
        assert_eq!(detect_file_type(Path::new("a.PQ")).unwrap(), FileType::PARQUET);
        assert_eq!(detect_file_type(Path::new("a.feather")).unwrap(), FileType::ARROW);
        assert!(matches!(
            detect_file_type(Path::new("a.xlsx")),
            Err(DashError::UnknownFileType)
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let result = import("/definitely/not/here.csv");
        assert!(matches!(result, Err(DashError::FileNotFound)));
    }

    #[test]
    fn csv_becomes_records() {
        let path = write_csv(
            "contacts.csv",
            "name,company,employees,active\nAda,Analytical,12,true\nGrace,,40,false\n",
        );
        let imported = import(path.to_str().unwrap()).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(imported.records.len(), 2);
        let ada = &imported.records[0];
        assert_eq!(ada.text("name"), Some("Ada"));
        assert_eq!(ada.get("employees"), Some(&Value::Number(12.0)));
        assert_eq!(ada.get("active"), Some(&Value::Bool(true)));
        // empty csv cells are nulls
        assert_eq!(imported.records[1].get("company"), None);

        let keys: Vec<&str> = imported.table.columns.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["name", "company", "employees", "active"]);
        assert_eq!(imported.table.search_keys, vec!["name", "company"]);
    }
}
