use super::error::DataError;
use super::model::{Column, DType, Value};
use super::stats::quantile;

/// Number of equal-frequency buckets produced by [`bin_quartiles`].
pub const QUARTILES: usize = 4;

/// Name under which the binned copy of `source` is appended to the dataset.
pub fn derived_column_name(source: &str) -> String {
    format!("{source}_category")
}

/// Edges of `buckets` equal-frequency bins over sorted values (`buckets + 1` entries).
pub fn quantile_edges(sorted: &[f64], buckets: usize) -> Vec<f64> {
    (0..=buckets)
        .filter_map(|i| quantile(sorted, i as f64 / buckets as f64))
        .collect()
}

/// Equal-frequency cut of a numeric column into quartile labels `0..=3`.
///
/// A value falls into bucket `i` when `edge[i] < v <= edge[i + 1]`; the
/// lowest edge is inclusive. Missing cells stay `None`.
///
/// Fails with [`DataError::CannotCategorize`] when the column is not numeric,
/// has fewer than four distinct values, or is so tied that two quantile edges
/// coincide.
pub fn bin_quartiles(column: &Column) -> Result<Vec<Option<i64>>, DataError> {
    let cannot = |reason: String| DataError::CannotCategorize {
        column: column.name.clone(),
        reason,
    };

    if !column.is_numeric() {
        return Err(cannot(format!("{} column is not numeric", column.dtype)));
    }
    let distinct = column.n_unique();
    if distinct < QUARTILES {
        return Err(cannot(format!(
            "{distinct} distinct values, need at least {QUARTILES}"
        )));
    }

    let mut sorted = column.numeric_values();
    sorted.sort_by(f64::total_cmp);
    let edges = quantile_edges(&sorted, QUARTILES);
    if edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(cannot(format!("quantile edges are not unique: {edges:?}")));
    }

    let upper = &edges[1..];
    Ok(column
        .numeric_cells()
        .into_iter()
        .map(|cell| {
            cell.map(|v| upper.partition_point(|e| *e < v).min(QUARTILES - 1) as i64)
        })
        .collect())
}

/// Binned copy of `column` as an integer column named by [`derived_column_name`].
pub fn quartile_column(column: &Column) -> Result<Column, DataError> {
    let labels = bin_quartiles(column)?;
    let values = labels
        .into_iter()
        .map(|l| l.map(Value::Integer).unwrap_or(Value::Null))
        .collect();
    Ok(Column::new(derived_column_name(&column.name), DType::Integer, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_column(values: &[f64]) -> Column {
        Column::new(
            "x",
            DType::Float,
            values.iter().map(|v| Value::Float(*v)).collect(),
        )
    }

    fn bucket_sizes(labels: &[Option<i64>]) -> [usize; 4] {
        let mut sizes = [0; 4];
        for l in labels.iter().flatten() {
            sizes[*l as usize] += 1;
        }
        sizes
    }

    #[test]
    fn eight_values_split_evenly() {
        let col = float_column(&[8.0, 1.0, 7.0, 2.0, 6.0, 3.0, 5.0, 4.0]);
        let labels = bin_quartiles(&col).unwrap();
        assert_eq!(
            labels,
            vec![Some(3), Some(0), Some(3), Some(0), Some(2), Some(1), Some(2), Some(1)]
        );
    }

    #[test]
    fn buckets_hold_floor_or_ceil_of_quarter() {
        for n in 4..=60usize {
            // Distinct, unevenly spaced, unsorted values.
            let values: Vec<f64> = (0..n).rev().map(|i| (i as f64).powf(1.3) + 0.5).collect();
            let labels = bin_quartiles(&float_column(&values)).unwrap();
            assert!(labels.iter().all(|l| matches!(l, Some(0..=3))));
            let lo = n / 4;
            let hi = n.div_ceil(4);
            for size in bucket_sizes(&labels) {
                assert!(size == lo || size == hi, "n={n} size={size}");
            }
        }
    }

    #[test]
    fn three_distinct_values_cannot_be_categorized() {
        let col = float_column(&[1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
        let err = bin_quartiles(&col).unwrap_err();
        assert!(matches!(err, DataError::CannotCategorize { .. }));
        assert!(err.to_string().starts_with("cannot categorize `x`"));
    }

    #[test]
    fn tied_edges_cannot_be_categorized() {
        let col = float_column(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(matches!(
            bin_quartiles(&col),
            Err(DataError::CannotCategorize { .. })
        ));
    }

    #[test]
    fn text_column_cannot_be_categorized() {
        let col = Column::new(
            "city",
            DType::Text,
            ["a", "b", "c", "d"].iter().map(|s| Value::Text(s.to_string())).collect(),
        );
        assert!(bin_quartiles(&col).is_err());
    }

    #[test]
    fn missing_cells_stay_missing() {
        let mut values: Vec<Value> = (1..=8).map(Value::Integer).collect();
        values.insert(3, Value::Null);
        let col = Column::new("n", DType::Integer, values);
        let derived = quartile_column(&col).unwrap();
        assert_eq!(derived.name, "n_category");
        assert_eq!(derived.dtype, DType::Integer);
        assert_eq!(derived.values[3], Value::Null);
        assert_eq!(derived.values[0], Value::Integer(0));
        assert_eq!(derived.values[8], Value::Integer(3));
    }
}
