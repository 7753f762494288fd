use std::collections::BTreeSet;
use std::fmt;

use super::error::DataError;

// ---------------------------------------------------------------------------
// Value – a single cell of a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the common Pandas dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{v:.1}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Value::Null => write!(f, "NaN"),
        }
    }
}

impl Value {
    /// Float cell: NaN is missing and `-0.0` is stored as `0.0`.
    pub fn float(v: f64) -> Value {
        if v.is_nan() {
            Value::Null
        } else {
            Value::Float(v + 0.0)
        }
    }

    /// Interpret the value as an `f64` for numeric statistics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// DType – inferred column type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Integer,
    Float,
    Bool,
    Text,
}

impl DType {
    /// `Integer` and `Float` columns take part in numeric views.
    pub fn is_numeric(self) -> bool {
        matches!(self, DType::Integer | DType::Float)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Integer => "int64",
            DType::Float => "float64",
            DType::Bool => "bool",
            DType::Text => "object",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Column – a named, homogeneously typed sequence of cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: DType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DType, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// Build a column from cells of mixed variants, unifying them into one dtype.
    ///
    /// * only integers → `Integer`
    /// * integers and floats → `Float`
    /// * only booleans → `Bool`
    /// * anything else → `Text` (non-null cells rendered to strings)
    /// * nothing but nulls → `Float`
    pub fn from_values(name: impl Into<String>, values: Vec<Value>) -> Self {
        let mut has_int = false;
        let mut has_float = false;
        let mut has_bool = false;
        let mut has_text = false;
        for v in &values {
            match v {
                Value::Null => {}
                Value::Integer(_) => has_int = true,
                Value::Float(_) => has_float = true,
                Value::Bool(_) => has_bool = true,
                Value::Text(_) => has_text = true,
            }
        }

        let numeric = has_int || has_float;
        let dtype = if has_text || (has_bool && numeric) {
            DType::Text
        } else if has_bool {
            DType::Bool
        } else if has_float || !has_int {
            DType::Float
        } else {
            DType::Integer
        };

        let values = match dtype {
            DType::Text => values
                .into_iter()
                .map(|v| match v {
                    Value::Null | Value::Text(_) => v,
                    other => Value::Text(other.to_string()),
                })
                .collect(),
            DType::Float => values
                .into_iter()
                .map(|v| match v.as_f64() {
                    Some(f) => Value::Float(f),
                    None => Value::Null,
                })
                .collect(),
            DType::Integer | DType::Bool => values,
        };

        Column::new(name, dtype, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_numeric(&self) -> bool {
        self.dtype.is_numeric()
    }

    /// Non-null values as `f64`, in row order. Empty for non-numeric columns.
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    /// One entry per row, `None` for missing or non-numeric cells.
    pub fn numeric_cells(&self) -> Vec<Option<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }

    /// Sorted set of distinct non-null values.
    pub fn unique_values(&self) -> BTreeSet<Value> {
        self.values
            .iter()
            .filter(|v| !v.is_null())
            .cloned()
            .collect()
    }

    /// Number of distinct non-null values.
    pub fn n_unique(&self) -> usize {
        self.unique_values().len()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Ordered collection of equally long columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset, checking that every column has the same row count.
    pub fn new(columns: Vec<Column>) -> Result<Self, DataError> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(DataError::LengthMismatch {
                column: bad.name.clone(),
                expected: n_rows,
                found: bad.len(),
            });
        }
        Ok(Dataset { columns, n_rows })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`, as shown in the header.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    /// Whether the dataset has no columns at all.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`Dataset::column`] but reports a missing column as an error.
    pub fn require_column(&self, name: &str) -> Result<&Column, DataError> {
        self.column(name)
            .ok_or_else(|| DataError::UnknownColumn(name.to_string()))
    }

    /// Append a column, or replace an existing one with the same name in place.
    pub fn upsert_column(&mut self, column: Column) -> Result<(), DataError> {
        let found = column.len();
        if !self.columns.is_empty() && found != self.n_rows {
            return Err(DataError::LengthMismatch {
                column: column.name,
                expected: self.n_rows,
                found,
            });
        }
        if self.columns.is_empty() {
            self.n_rows = column.len();
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_values_unifies_numeric_variants() {
        let col = Column::from_values(
            "x",
            vec![Value::Integer(1), Value::Null, Value::Float(2.5)],
        );
        assert_eq!(col.dtype, DType::Float);
        assert_eq!(
            col.values,
            vec![Value::Float(1.0), Value::Null, Value::Float(2.5)]
        );
    }

    #[test]
    fn from_values_falls_back_to_text() {
        let col = Column::from_values("x", vec![Value::Integer(1), Value::Text("a".into())]);
        assert_eq!(col.dtype, DType::Text);
        assert_eq!(col.values[0], Value::Text("1".into()));
    }

    #[test]
    fn all_null_column_is_float() {
        let col = Column::from_values("x", vec![Value::Null, Value::Null]);
        assert_eq!(col.dtype, DType::Float);
        assert_eq!(col.n_unique(), 0);
        assert_eq!(col.null_count(), 2);
    }

    #[test]
    fn dataset_rejects_ragged_columns() {
        let err = Dataset::new(vec![
            Column::new("a", DType::Integer, vec![Value::Integer(1)]),
            Column::new("b", DType::Integer, vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, DataError::LengthMismatch { .. }));
    }

    #[test]
    fn upsert_replaces_existing_column() {
        let mut ds = Dataset::new(vec![Column::new(
            "a",
            DType::Integer,
            vec![Value::Integer(1), Value::Integer(2)],
        )])
        .unwrap();
        ds.upsert_column(Column::new("a", DType::Text, vec![Value::Null, Value::Null]))
            .unwrap();
        assert_eq!(ds.n_cols(), 1);
        assert_eq!(ds.columns()[0].dtype, DType::Text);

        ds.upsert_column(Column::new("b", DType::Bool, vec![Value::Bool(true), Value::Null]))
            .unwrap();
        assert_eq!(ds.column_names(), vec!["a", "b"]);
        assert_eq!(
            ds.upsert_column(Column::new("c", DType::Bool, vec![])),
            Err(DataError::LengthMismatch {
                column: "c".into(),
                expected: 2,
                found: 0,
            })
        );
        assert_eq!(ds.n_cols(), 2);
    }

    #[test]
    fn float_constructor_normalises_zero_and_nan() {
        assert!(matches!(Value::float(-0.0), Value::Float(v) if v.is_sign_positive()));
        assert_eq!(Value::float(f64::NAN), Value::Null);
        let col = Column::from_values(
            "x",
            vec![Value::float(0.0), Value::float(-0.0), Value::float(1.5)],
        );
        assert_eq!(col.n_unique(), 2);
    }
}
