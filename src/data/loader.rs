use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type,
};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, DType, Dataset, Value};

/// Cell texts treated as missing, matching the usual dataframe defaults.
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by one record per row (recommended)
/// * `.json`    – `[{ "col": value, ... }, ...]`
/// * `.parquet` – flat scalar columns
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            read_csv(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            read_json(&text)
        }
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Parse CSV from any reader. The first record is the header.
///
/// Rows with a different field count than the header are a hard error.
/// An empty input yields an empty dataset (no rows, no columns).
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let headers = dedupe_headers(&headers);

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        for (col_idx, value) in record.iter().enumerate() {
            let cell = if MISSING_TOKENS.contains(&value) {
                None
            } else {
                Some(value.to_string())
            };
            cells[col_idx].push(cell);
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| infer_column(name, raw))
        .collect();
    Ok(Dataset::new(columns)?)
}

/// Blank header names become `Unnamed: i`, repeats get a `.1`, `.2`, … suffix.
fn dedupe_headers(headers: &[String]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.clone()
            };
            let n = seen.entry(base.clone()).or_insert(0);
            let name = if *n == 0 {
                base.clone()
            } else {
                format!("{base}.{n}")
            };
            *n += 1;
            name
        })
        .collect()
}

/// Pick the narrowest dtype that every non-missing cell of a column fits.
fn infer_column(name: String, raw: Vec<Option<String>>) -> Column {
    if raw.is_empty() {
        // Header-only file: nothing to infer from.
        return Column::new(name, DType::Text, Vec::new());
    }

    let present = || raw.iter().flatten().map(|s| s.trim());
    let dtype = if present().all(|s| s.parse::<i64>().is_ok()) && present().next().is_some() {
        DType::Integer
    } else if present().all(|s| s.parse::<f64>().is_ok()) {
        DType::Float
    } else if present().all(|s| parse_bool(s).is_some()) {
        DType::Bool
    } else {
        DType::Text
    };

    let values = raw
        .into_iter()
        .map(|cell| match cell {
            None => Value::Null,
            Some(s) => parse_cell(&s, dtype),
        })
        .collect();
    Column::new(name, dtype, values)
}

fn parse_cell(s: &str, dtype: DType) -> Value {
    let trimmed = s.trim();
    let parsed = match dtype {
        DType::Integer => trimmed.parse::<i64>().ok().map(Value::Integer),
        DType::Float => trimmed.parse::<f64>().ok().map(Value::float),
        DType::Bool => parse_bool(trimmed).map(Value::Bool),
        DType::Text => None,
    };
    parsed.unwrap_or_else(|| Value::Text(s.to_string()))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "age": 31, "city": "Lyon", "income": 41200.5 },
///   { "age": 45, "city": "Oslo", "income": null },
///   ...
/// ]
/// ```
///
/// Column order follows first appearance; keys absent from a record are missing.
pub fn read_json(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut cells: Vec<Vec<Value>> = Vec::new();

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for (key, val) in obj {
            let col = *index.entry(key.clone()).or_insert_with(|| {
                names.push(key.clone());
                cells.push(vec![Value::Null; i]);
                names.len() - 1
            });
            cells[col].push(json_to_value(val));
        }
        // Pad columns this record did not mention.
        for column in &mut cells {
            if column.len() < i + 1 {
                column.push(Value::Null);
            }
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::from_values(name, values))
        .collect();
    Ok(Dataset::new(columns)?)
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) if MISSING_TOKENS.contains(&s.as_str()) => Value::Null,
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::float(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Integer, float, boolean and string columns map onto the matching dtype;
/// any other Arrow type (dates, timestamps, decimals…) is kept as display text.
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    for (batch_no, batch_result) in reader.enumerate() {
        let batch = batch_result.context("reading parquet record batch")?;
        if batch_no == 0 && log::log_enabled!(log::Level::Debug) {
            let preview = batch.slice(0, batch.num_rows().min(5));
            if let Ok(table) = arrow::util::pretty::pretty_format_batches(&[preview]) {
                log::debug!("first parquet rows:\n{table}");
            }
        }
        for (col_idx, column) in batch.columns().iter().enumerate() {
            for row in 0..batch.num_rows() {
                cells[col_idx].push(
                    extract_value(column, row)
                        .with_context(|| format!("column '{}', row {row}", names[col_idx]))?,
                );
            }
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::from_values(name, values))
        .collect();
    Ok(Dataset::new(columns)?)
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => Value::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => Value::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => Value::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Value::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => Value::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => Value::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer)
        }
        DataType::Float32 => Value::float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Value::float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        DataType::List(_) | DataType::LargeList(_) | DataType::Struct(_) | DataType::Map(..) => {
            bail!("nested {:?} columns are not supported", col.data_type())
        }
        _ => Value::Text(
            array_value_to_string(col.as_ref(), row).context("formatting arrow value")?,
        ),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::classify::classify;

    #[test]
    fn infers_column_types() {
        let csv = "id,score,name,flag,empty\n1,1.5,ann,true,\n2,NA,bob,False,\n3,2,,TRUE,\n";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.shape(), (3, 5));
        let dtypes: Vec<DType> = ds.columns().iter().map(|c| c.dtype).collect();
        assert_eq!(
            dtypes,
            vec![DType::Integer, DType::Float, DType::Text, DType::Bool, DType::Float]
        );
        let score = ds.column("score").unwrap();
        assert_eq!(score.values, vec![Value::Float(1.5), Value::Null, Value::Float(2.0)]);
        assert_eq!(ds.column("name").unwrap().values[2], Value::Null);
        assert_eq!(ds.column("empty").unwrap().null_count(), 3);
    }

    #[test]
    fn mixed_column_keeps_raw_text() {
        let ds = read_csv("code\n1.50\nA7\n".as_bytes()).unwrap();
        let code = ds.column("code").unwrap();
        assert_eq!(code.dtype, DType::Text);
        assert_eq!(code.values[0], Value::Text("1.50".into()));
    }

    #[test]
    fn age_and_city_end_to_end() {
        let mut csv = String::from("age,city\n");
        let cities = ["Paris", "Oslo", "Lima"];
        for i in 0..45 {
            csv.push_str(&format!("{},{}\n", 20 + i % 15, cities[i % 3]));
        }
        let ds = read_csv(csv.as_bytes()).unwrap();
        let c = classify(&ds);
        assert_eq!(c.discrete, vec!["age"]);
        assert_eq!(c.categorical, vec!["city"]);
        assert!(c.continuous.is_empty());
    }

    #[test]
    fn empty_input_gives_empty_dataset() {
        let ds = read_csv("".as_bytes()).unwrap();
        assert_eq!(ds.shape(), (0, 0));
        let c = classify(&ds);
        assert!(c.continuous.is_empty() && c.discrete.is_empty() && c.categorical.is_empty());
    }

    #[test]
    fn header_only_columns_are_text() {
        let ds = read_csv("a,b\n".as_bytes()).unwrap();
        assert_eq!(ds.shape(), (0, 2));
        assert!(ds.columns().iter().all(|c| c.dtype == DType::Text));
    }

    #[test]
    fn ragged_rows_are_a_load_failure() {
        let err = read_csv("a,b\n1,2\n3\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("CSV row 2"));
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let ds = read_csv("x,x,,x\n1,2,3,4\n".as_bytes()).unwrap();
        assert_eq!(ds.column_names(), vec!["x", "x.1", "Unnamed: 2", "x.2"]);
    }

    #[test]
    fn json_records() {
        let json = r#"[{"a": 1, "b": "u"}, {"a": 2.5, "c": true}, {"b": null}]"#;
        let ds = read_json(json).unwrap();
        assert_eq!(ds.column_names(), vec!["a", "b", "c"]);
        assert_eq!(ds.n_rows(), 3);
        let a = ds.column("a").unwrap();
        assert_eq!(a.dtype, DType::Float);
        assert_eq!(a.values, vec![Value::Float(1.0), Value::Float(2.5), Value::Null]);
        let c = ds.column("c").unwrap();
        assert_eq!(c.dtype, DType::Bool);
        assert_eq!(c.values, vec![Value::Null, Value::Bool(true), Value::Null]);
    }

    #[test]
    fn json_keeps_file_column_order() {
        let ds = read_json(r#"[{"zeta": 1, "alpha": "u", "mid": 2.0}, {"beta": true}]"#).unwrap();
        assert_eq!(ds.column_names(), vec!["zeta", "alpha", "mid", "beta"]);
    }

    #[test]
    fn negative_zero_is_not_a_distinct_value() {
        let ds = read_csv("x\n0.0\n-0.0\n1.5\n".as_bytes()).unwrap();
        let x = ds.column("x").unwrap();
        assert!(matches!(x.values[1], Value::Float(v) if v.is_sign_positive()));
        assert_eq!(x.n_unique(), 2);
    }

    #[test]
    fn arrow_float_nan_is_missing() {
        use arrow::array::{ArrayRef, Float32Array, Float64Array};

        let f32s: ArrayRef = Arc::new(Float32Array::from(vec![Some(f32::NAN), Some(-0.0), None]));
        assert_eq!(extract_value(&f32s, 0).unwrap(), Value::Null);
        assert_eq!(extract_value(&f32s, 1).unwrap(), Value::Float(0.0));
        assert_eq!(extract_value(&f32s, 2).unwrap(), Value::Null);

        let f64s: ArrayRef = Arc::new(Float64Array::from(vec![f64::NAN, 2.5]));
        assert_eq!(extract_value(&f64s, 0).unwrap(), Value::Null);
        assert_eq!(extract_value(&f64s, 1).unwrap(), Value::Float(2.5));
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(read_json(r#"{"a": 1}"#).is_err());
        assert!(read_json("[1, 2]").is_err());
    }

    #[test]
    fn unsupported_extension() {
        let err = load_file(Path::new("data.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
