use super::model::{Column, Dataset};

/// Numeric columns with fewer distinct values than this are discrete.
pub const DISCRETE_CARDINALITY_LIMIT: usize = 20;

// ---------------------------------------------------------------------------
// Column kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Numeric, at least [`DISCRETE_CARDINALITY_LIMIT`] distinct values.
    Continuous,
    /// Numeric, fewer than [`DISCRETE_CARDINALITY_LIMIT`] distinct values.
    Discrete,
    /// Anything non-numeric (text, booleans).
    Categorical,
}

impl ColumnKind {
    pub fn label(self) -> &'static str {
        match self {
            ColumnKind::Continuous => "continuous",
            ColumnKind::Discrete => "discrete",
            ColumnKind::Categorical => "categorical",
        }
    }
}

/// Tag a single column by type and cardinality.
pub fn kind_of_column(column: &Column) -> ColumnKind {
    if !column.is_numeric() {
        ColumnKind::Categorical
    } else if column.n_unique() < DISCRETE_CARDINALITY_LIMIT {
        ColumnKind::Discrete
    } else {
        ColumnKind::Continuous
    }
}

// ---------------------------------------------------------------------------
// Classification: the three partitions of a dataset's columns
// ---------------------------------------------------------------------------

/// Column names split by kind, each list in dataset column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub continuous: Vec<String>,
    pub discrete: Vec<String>,
    pub categorical: Vec<String>,
}

impl Classification {
    /// All numeric columns (continuous and discrete), in dataset order.
    pub fn numeric_in<'a>(&self, dataset: &'a Dataset) -> Vec<&'a str> {
        dataset
            .columns()
            .iter()
            .filter(|c| self.continuous.contains(&c.name) || self.discrete.contains(&c.name))
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        let name = name.to_string();
        if self.continuous.contains(&name) {
            Some(ColumnKind::Continuous)
        } else if self.discrete.contains(&name) {
            Some(ColumnKind::Discrete)
        } else if self.categorical.contains(&name) {
            Some(ColumnKind::Categorical)
        } else {
            None
        }
    }
}

/// Partition the dataset's column names into continuous, discrete and categorical.
///
/// An empty dataset yields three empty partitions.
pub fn classify(dataset: &Dataset) -> Classification {
    let mut out = Classification::default();
    for column in dataset.columns() {
        let bucket = match kind_of_column(column) {
            ColumnKind::Continuous => &mut out.continuous,
            ColumnKind::Discrete => &mut out.discrete,
            ColumnKind::Categorical => &mut out.categorical,
        };
        bucket.push(column.name.clone());
    }
    log::debug!(
        "classified columns: continuous={:?} discrete={:?} categorical={:?}",
        out.continuous,
        out.discrete,
        out.categorical
    );
    out
}

// ---------------------------------------------------------------------------
// Column selection prompts
// ---------------------------------------------------------------------------

/// Resolve a target/feature selection against the eligible candidates.
///
/// Keeps the current choice while it is still a candidate, otherwise falls
/// back to the first candidate. `None` only when there are no candidates.
pub fn select_column(current: Option<&str>, candidates: &[String]) -> Option<String> {
    match current {
        Some(name) if candidates.iter().any(|c| c == name) => Some(name.to_string()),
        _ => candidates.first().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{DType, Value};

    fn int_column(name: &str, distinct: i64, rows: usize) -> Column {
        let values = (0..rows).map(|i| Value::Integer(i as i64 % distinct)).collect();
        Column::new(name, DType::Integer, values)
    }

    fn text_column(name: &str, rows: usize) -> Column {
        let values = (0..rows).map(|i| Value::Text(format!("v{}", i % 3))).collect();
        Column::new(name, DType::Text, values)
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let ds = Dataset::new(vec![
            int_column("few", 5, 60),
            text_column("label", 60),
            int_column("many", 40, 60),
            Column::new("flag", DType::Bool, (0..60).map(|i| Value::Bool(i % 2 == 0)).collect()),
            int_column("some", 19, 60),
        ])
        .unwrap();
        let c = classify(&ds);

        let mut all: Vec<String> = c
            .continuous
            .iter()
            .chain(&c.discrete)
            .chain(&c.categorical)
            .cloned()
            .collect();
        assert_eq!(all.len(), ds.n_cols());
        all.sort();
        all.dedup();
        assert_eq!(all.len(), ds.n_cols());

        assert_eq!(c.continuous, vec!["many"]);
        assert_eq!(c.discrete, vec!["few", "some"]);
        assert_eq!(c.categorical, vec!["label", "flag"]);
        assert_eq!(c.numeric_in(&ds), vec!["few", "many", "some"]);
    }

    #[test]
    fn threshold_boundary() {
        let ds = Dataset::new(vec![int_column("nineteen", 19, 100), int_column("twenty", 20, 100)])
            .unwrap();
        let c = classify(&ds);
        assert_eq!(c.kind_of("nineteen"), Some(ColumnKind::Discrete));
        assert_eq!(c.kind_of("twenty"), Some(ColumnKind::Continuous));
        assert_eq!(c.kind_of("missing"), None);
        assert_eq!(c.kind_of("twenty").map(ColumnKind::label), Some("continuous"));
    }

    #[test]
    fn nulls_do_not_count_as_distinct() {
        let mut values: Vec<Value> = (0..19).map(|i| Value::Float(i as f64)).collect();
        values.push(Value::Null);
        let col = Column::new("x", DType::Float, values);
        assert_eq!(kind_of_column(&col), ColumnKind::Discrete);
    }

    #[test]
    fn empty_dataset_gives_empty_partitions() {
        let c = classify(&Dataset::default());
        assert!(c.is_empty());
        assert!(c.continuous.is_empty() && c.discrete.is_empty() && c.categorical.is_empty());
    }

    #[test]
    fn select_column_keeps_valid_choice() {
        let candidates = vec!["a".to_string(), "b".to_string()];
        assert_eq!(select_column(Some("b"), &candidates), Some("b".to_string()));
        assert_eq!(select_column(Some("zz"), &candidates), Some("a".to_string()));
        assert_eq!(select_column(None, &candidates), Some("a".to_string()));
        assert_eq!(select_column(Some("a"), &[]), None);
    }
}
