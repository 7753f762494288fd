use std::collections::{BTreeMap, BTreeSet};

use super::classify::Classification;
use super::error::DataError;
use super::model::{Column, Dataset, Value};

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Quantile of already sorted values using linear interpolation.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    if lower == upper {
        Some(sorted[lower])
    } else {
        let fraction = idx - lower as f64;
        Some(sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction)
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

// ---------------------------------------------------------------------------
// describe()
// ---------------------------------------------------------------------------

/// Summary row of a numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    pub fn of(column: &Column) -> Self {
        let values = column.numeric_values();
        let sorted = sorted_copy(&values);
        NumericSummary {
            column: column.name.clone(),
            count: values.len(),
            mean: mean(&values),
            std: sample_std(&values),
            min: sorted.first().copied(),
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }
}

/// Summary row of a non-numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<Value>,
    pub freq: usize,
}

impl CategoricalSummary {
    pub fn of(column: &Column) -> Self {
        let counts = value_counts(column);
        let (top, freq) = counts
            .first()
            .map(|(v, n)| (Some(v.clone()), *n))
            .unwrap_or((None, 0));
        CategoricalSummary {
            column: column.name.clone(),
            count: column.len() - column.null_count(),
            unique: counts.len(),
            top,
            freq,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Description {
    Numeric(Vec<NumericSummary>),
    Categorical(Vec<CategoricalSummary>),
}

/// Describe the numeric columns, or every column when none is numeric.
pub fn describe(dataset: &Dataset) -> Description {
    let numeric: Vec<&Column> = dataset.columns().iter().filter(|c| c.is_numeric()).collect();
    if numeric.is_empty() {
        Description::Categorical(dataset.columns().iter().map(CategoricalSummary::of).collect())
    } else {
        Description::Numeric(numeric.into_iter().map(NumericSummary::of).collect())
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation over the rows where both cells are present.
///
/// `None` when fewer than two complete pairs exist or either side has zero variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        None
    } else {
        Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `values[i][j]` = corr(columns[i], columns[j]).
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

pub fn correlation_matrix(
    dataset: &Dataset,
    columns: &[&str],
) -> Result<CorrelationMatrix, DataError> {
    let mut cells = Vec::with_capacity(columns.len());
    for name in columns {
        let column = dataset.require_column(name)?;
        if !column.is_numeric() {
            return Err(DataError::NotNumeric(column.name.clone()));
        }
        cells.push(column.numeric_cells());
    }

    let n = cells.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&cells[i], &cells[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
    })
}

// ---------------------------------------------------------------------------
// Counting
// ---------------------------------------------------------------------------

/// Non-null value frequencies, most frequent first (ties in value order).
pub fn value_counts(column: &Column) -> Vec<(Value, usize)> {
    let mut counts: BTreeMap<&Value, usize> = BTreeMap::new();
    for v in column.values.iter().filter(|v| !v.is_null()) {
        *counts.entry(v).or_default() += 1;
    }
    let mut out: Vec<(Value, usize)> = counts.into_iter().map(|(v, n)| (v.clone(), n)).collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

/// Missing-cell count per column, in dataset order.
pub fn missing_counts(dataset: &Dataset) -> Vec<(String, usize)> {
    dataset
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.null_count()))
        .collect()
}

/// Distinct non-null count per column, in dataset order.
pub fn unique_counts(dataset: &Dataset) -> Vec<(String, usize)> {
    dataset
        .columns()
        .iter()
        .map(|c| (c.name.clone(), c.n_unique()))
        .collect()
}

/// Frequency table of two columns; rows with a null on either side are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Crosstab {
    pub rows: Vec<Value>,
    pub columns: Vec<Value>,
    /// `counts[r][c]` = number of rows with `rows[r]` and `columns[c]`.
    pub counts: Vec<Vec<usize>>,
}

pub fn crosstab(row_col: &Column, col_col: &Column) -> Result<Crosstab, DataError> {
    if row_col.len() != col_col.len() {
        return Err(DataError::LengthMismatch {
            column: col_col.name.clone(),
            expected: row_col.len(),
            found: col_col.len(),
        });
    }
    let mut pairs: BTreeMap<(&Value, &Value), usize> = BTreeMap::new();
    let mut rows = BTreeSet::new();
    let mut columns = BTreeSet::new();
    for (a, b) in row_col.values.iter().zip(&col_col.values) {
        if a.is_null() || b.is_null() {
            continue;
        }
        rows.insert(a);
        columns.insert(b);
        *pairs.entry((a, b)).or_default() += 1;
    }

    let counts = rows
        .iter()
        .map(|r| {
            columns
                .iter()
                .map(|c| pairs.get(&(*r, *c)).copied().unwrap_or(0))
                .collect()
        })
        .collect();
    Ok(Crosstab {
        rows: rows.into_iter().cloned().collect(),
        columns: columns.into_iter().cloned().collect(),
        counts,
    })
}

/// Mean of `target` per distinct value of `groups`, in group order.
pub fn group_means(groups: &Column, target: &Column) -> Result<Vec<(Value, f64)>, DataError> {
    if !target.is_numeric() {
        return Err(DataError::NotNumeric(target.name.clone()));
    }
    let mut acc: BTreeMap<&Value, (f64, usize)> = BTreeMap::new();
    for (g, t) in groups.values.iter().zip(&target.values) {
        if g.is_null() {
            continue;
        }
        let Some(t) = t.as_f64() else {
            continue;
        };
        let entry = acc.entry(g).or_default();
        entry.0 += t;
        entry.1 += 1;
    }
    Ok(acc
        .into_iter()
        .map(|(g, (sum, n))| (g.clone(), sum / n as f64))
        .collect())
}

// ---------------------------------------------------------------------------
// Distribution shapes
// ---------------------------------------------------------------------------

/// Five-number summary with Tukey whiskers (1.5 · IQR).
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let sorted = sorted_copy(values);
    let q1 = quantile(&sorted, 0.25)?;
    let median = quantile(&sorted, 0.5)?;
    let q3 = quantile(&sorted, 0.75)?;
    let iqr = q3 - q1;
    let lower_fence = q1 - 1.5 * iqr;
    let upper_fence = q3 + 1.5 * iqr;

    let inside = || sorted.iter().copied().filter(|v| *v >= lower_fence && *v <= upper_fence);
    let lower_whisker = inside().next().unwrap_or(q1);
    let upper_whisker = inside().last().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lower_fence || *v > upper_fence)
        .collect();

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width histogram over `[min, max]`; the last bin is closed on the right.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().copied().fold(min, f64::max);
    if bins == 0 {
        return Vec::new();
    }
    if max == min {
        return vec![HistogramBin {
            start: min - 0.5,
            end: max + 0.5,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count,
        })
        .collect()
}

/// Square-root rule, capped so small multiples stay readable.
pub fn default_bin_count(n: usize) -> usize {
    ((n as f64).sqrt().ceil() as usize).clamp(1, 30)
}

// ---------------------------------------------------------------------------
// Cached whole-dataset summaries
// ---------------------------------------------------------------------------

/// Summaries computed once per dataset version and reused every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub description: Description,
    pub correlation: CorrelationMatrix,
    pub missing: Vec<(String, usize)>,
    pub unique: Vec<(String, usize)>,
}

impl Insights {
    pub fn compute(dataset: &Dataset, classification: &Classification) -> Result<Self, DataError> {
        let numeric = classification.numeric_in(dataset);
        Ok(Insights {
            description: describe(dataset),
            correlation: correlation_matrix(dataset, &numeric)?,
            missing: missing_counts(dataset),
            unique: unique_counts(dataset),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::DType;

    fn floats(name: &str, values: &[Option<f64>]) -> Column {
        Column::new(
            name,
            DType::Float,
            values
                .iter()
                .map(|v| v.map(Value::Float).unwrap_or(Value::Null))
                .collect(),
        )
    }

    fn texts(name: &str, values: &[&str]) -> Column {
        Column::new(
            name,
            DType::Text,
            values.iter().map(|s| Value::Text(s.to_string())).collect(),
        )
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile(&sorted, 0.25), Some(1.75));
        assert_eq!(quantile(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
    }

    #[test]
    fn describe_numeric_columns() {
        let ds = Dataset::new(vec![
            floats("x", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), None]),
            texts("label", &["a", "b", "a", "c", "a"]),
        ])
        .unwrap();
        let Description::Numeric(rows) = describe(&ds) else {
            panic!("expected numeric description");
        };
        assert_eq!(rows.len(), 1);
        let x = &rows[0];
        assert_eq!(x.count, 4);
        assert_eq!(x.mean, Some(2.5));
        let std = x.std.unwrap();
        assert!((std - 1.290_994_448_735_805_6).abs() < 1e-12);
        assert_eq!((x.min, x.q1, x.median, x.q3, x.max),
            (Some(1.0), Some(1.75), Some(2.5), Some(3.25), Some(4.0)));
    }

    #[test]
    fn describe_falls_back_to_categorical() {
        let ds = Dataset::new(vec![texts("label", &["a", "b", "a"])]).unwrap();
        let Description::Categorical(rows) = describe(&ds) else {
            panic!("expected categorical description");
        };
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[0].unique, 2);
        assert_eq!(rows[0].top, Some(Value::Text("a".into())));
        assert_eq!(rows[0].freq, 2);
    }

    #[test]
    fn correlation_of_linear_columns() {
        let ds = Dataset::new(vec![
            floats("a", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            floats("b", &[Some(2.0), Some(4.0), Some(6.0), Some(8.0)]),
            floats("c", &[Some(4.0), Some(3.0), Some(2.0), Some(1.0)]),
            floats("flat", &[Some(1.0), Some(1.0), Some(1.0), Some(1.0)]),
        ])
        .unwrap();
        let m = correlation_matrix(&ds, &["a", "b", "c", "flat"]).unwrap();
        let close = |v: Option<f64>, want: f64| (v.unwrap() - want).abs() < 1e-12;
        assert!(close(m.values[0][0], 1.0));
        assert!(close(m.values[0][1], 1.0));
        assert!(close(m.values[0][2], -1.0));
        assert_eq!(m.values[0][3], None);
        assert_eq!(m.values[3][3], None);
    }

    #[test]
    fn correlation_rejects_text_columns() {
        let ds = Dataset::new(vec![texts("label", &["a"])]).unwrap();
        assert_eq!(
            correlation_matrix(&ds, &["label"]),
            Err(DataError::NotNumeric("label".into()))
        );
        assert!(matches!(
            correlation_matrix(&ds, &["nope"]),
            Err(DataError::UnknownColumn(_))
        ));
    }

    #[test]
    fn pearson_uses_pairwise_complete_rows() {
        let x = [Some(1.0), None, Some(2.0), Some(3.0)];
        let y = [Some(10.0), Some(99.0), Some(20.0), Some(30.0)];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn value_counts_orders_by_frequency() {
        let col = texts("c", &["b", "a", "b", "c", "b", "a"]);
        let counts = value_counts(&col);
        assert_eq!(counts[0], (Value::Text("b".into()), 3));
        assert_eq!(counts[1], (Value::Text("a".into()), 2));
        assert_eq!(counts[2], (Value::Text("c".into()), 1));
    }

    #[test]
    fn crosstab_counts_pairs() {
        let a = texts("a", &["x", "x", "y", "y", "y"]);
        let b = texts("b", &["p", "q", "p", "p", "q"]);
        let ct = crosstab(&a, &b).unwrap();
        assert_eq!(ct.rows, vec![Value::Text("x".into()), Value::Text("y".into())]);
        assert_eq!(ct.columns, vec![Value::Text("p".into()), Value::Text("q".into())]);
        assert_eq!(ct.counts, vec![vec![1, 1], vec![2, 1]]);
    }

    #[test]
    fn group_means_skip_missing_and_reject_text_target() {
        let groups = texts("g", &["a", "a", "b", "b"]);
        let target = floats("t", &[Some(1.0), Some(3.0), Some(10.0), None]);
        let means = group_means(&groups, &target).unwrap();
        assert_eq!(
            means,
            vec![(Value::Text("a".into()), 2.0), (Value::Text("b".into()), 10.0)]
        );
        assert!(group_means(&target, &groups).is_err());
    }

    #[test]
    fn box_stats_flags_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let b = box_stats(&values).unwrap();
        assert_eq!(b.median, 3.5);
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 5.0);
        assert!(box_stats(&[]).is_none());
    }

    #[test]
    fn histogram_covers_every_value() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = histogram(&values, 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert_eq!(bins[9].count, 10);

        let single = histogram(&[5.0, 5.0], 10);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].count, 2);
        assert!(histogram(&[], 10).is_empty());
    }

    #[test]
    fn missing_and_unique_counts() {
        let ds = Dataset::new(vec![
            floats("x", &[Some(1.0), None, Some(1.0)]),
            texts("y", &["a", "b", "c"]),
        ])
        .unwrap();
        assert_eq!(missing_counts(&ds), vec![("x".into(), 1), ("y".into(), 0)]);
        assert_eq!(unique_counts(&ds), vec![("x".into(), 1), ("y".into(), 3)]);
    }
}
