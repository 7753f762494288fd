use crate::color::ColorMap;
use crate::data::binning::quartile_column;
use crate::data::classify::{Classification, classify};
use crate::data::error::DataError;
use crate::data::model::Dataset;
use crate::data::stats::Insights;

/// Rows shown by the raw data preview.
pub const RAW_PREVIEW_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// View toggles and column selections
// ---------------------------------------------------------------------------

/// One checkbox per view; everything starts unchecked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewToggles {
    pub raw_data: bool,
    pub basic_statistics: bool,
    pub correlation: bool,
    pub distributions: bool,
    pub pairplot: bool,
    pub categorical_counts: bool,
    pub missing_values: bool,
    pub unique_values: bool,
    pub boxplots: bool,
    pub categorical_bar: bool,
    pub target_with_feature: bool,
    pub quartile_categories: bool,
    pub discrete_by_target: bool,
}

/// Target / feature prompts, remembered across frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    pub pairplot_hue: Option<String>,
    pub bar_feature: Option<String>,
    pub distribution_target: Option<String>,
    pub distribution_feature: Option<String>,
    pub quartile_feature: Option<String>,
    pub quartile_target: Option<String>,
    pub crosstab_target: Option<String>,
}

/// Result of the last quartile binning request.
#[derive(Debug, Clone, PartialEq)]
pub enum BinningOutcome {
    Created { source: String, column: String },
    Failed { source: String, message: String },
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Debug, Default)]
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    /// File name of the loaded dataset.
    pub source_name: Option<String>,

    /// Column partitions of the current dataset; rebuilt whenever a column is added.
    pub classification: Classification,

    /// Cached whole-dataset summaries, cleared when the dataset changes.
    pub insights: Option<Insights>,

    pub toggles: ViewToggles,
    pub selections: Selections,

    /// Source column of the derived quartile column currently in the dataset.
    pub binned_feature: Option<String>,
    pub binning_outcome: Option<BinningOutcome>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded dataset, classify it and reset per-dataset choices.
    pub fn set_dataset(&mut self, dataset: Dataset, source_name: Option<String>) {
        self.classification = classify(&dataset);
        self.dataset = Some(dataset);
        self.source_name = source_name;
        self.insights = None;
        self.selections = Selections::default();
        self.binned_feature = None;
        self.binning_outcome = None;
        self.status_message = None;
    }

    /// Recompute the classification after the dataset gained a column.
    pub fn reclassify(&mut self) {
        self.classification = self
            .dataset
            .as_ref()
            .map(classify)
            .unwrap_or_default();
        self.insights = None;
    }

    /// Compute [`Insights`] if they are not cached yet.
    pub fn ensure_insights(&mut self) {
        if self.insights.is_some() {
            return;
        }
        let Some(ds) = &self.dataset else {
            return;
        };
        match Insights::compute(ds, &self.classification) {
            Ok(insights) => self.insights = Some(insights),
            Err(e) => {
                log::error!("Failed to summarise dataset: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Append `<feature>_category` (quartile labels) and reclassify.
    ///
    /// Returns the derived column's name.
    pub fn apply_quartile_binning(&mut self, feature: &str) -> Result<String, DataError> {
        let ds = self
            .dataset
            .as_mut()
            .ok_or_else(|| DataError::UnknownColumn(feature.to_string()))?;
        let derived = quartile_column(ds.require_column(feature)?)?;
        let name = derived.name.clone();
        ds.upsert_column(derived)?;
        self.reclassify();
        log::info!("Added derived column '{name}' from quartiles of '{feature}'");
        Ok(name)
    }

    /// Bin `feature` unless it is already the binned column.
    pub fn categorize(&mut self, feature: &str) {
        if self.binned_feature.as_deref() == Some(feature) {
            return;
        }
        self.binned_feature = Some(feature.to_string());
        self.binning_outcome = Some(match self.apply_quartile_binning(feature) {
            Ok(column) => BinningOutcome::Created {
                source: feature.to_string(),
                column,
            },
            Err(e) => {
                log::warn!("{e}");
                BinningOutcome::Failed {
                    source: feature.to_string(),
                    message: e.to_string(),
                }
            }
        });
    }

    /// Forget the last binning so the next request re-derives the column.
    pub fn reset_binning(&mut self) {
        self.binned_feature = None;
        self.binning_outcome = None;
    }

    /// Colour map over the distinct values of `column`.
    pub fn hue_map(&self, column: &str) -> Option<ColorMap> {
        let col = self.dataset.as_ref()?.column(column)?;
        Some(ColorMap::new(column, &col.unique_values()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::classify::ColumnKind;
    use crate::data::loader::read_csv;

    fn state_with(csv: &str) -> AppState {
        let mut state = AppState::default();
        state.set_dataset(read_csv(csv.as_bytes()).unwrap(), Some("test.csv".into()));
        state
    }

    fn wide_csv() -> String {
        let mut csv = String::from("income,grade,city\n");
        for i in 0..40 {
            csv.push_str(&format!("{},{},c{}\n", 1000 + i * 37, i % 3, i % 4));
        }
        csv
    }

    #[test]
    fn binning_adds_column_and_reclassifies() {
        let mut state = state_with(&wide_csv());
        state.ensure_insights();
        assert!(state.insights.is_some());
        assert_eq!(state.classification.continuous, vec!["income"]);

        state.categorize("income");
        assert_eq!(
            state.binning_outcome,
            Some(BinningOutcome::Created {
                source: "income".into(),
                column: "income_category".into()
            })
        );
        assert!(state.insights.is_none());
        assert_eq!(
            state.classification.kind_of("income_category"),
            Some(ColumnKind::Discrete)
        );
        assert_eq!(state.dataset.as_ref().unwrap().n_cols(), 4);

        // Re-triggering with the same feature keeps a single derived column.
        state.reset_binning();
        state.categorize("income");
        assert_eq!(state.dataset.as_ref().unwrap().n_cols(), 4);
    }

    #[test]
    fn binning_failure_is_reported_not_fatal() {
        let mut state = state_with(&wide_csv());
        state.categorize("grade");
        match &state.binning_outcome {
            Some(BinningOutcome::Failed { source, message }) => {
                assert_eq!(source, "grade");
                assert!(message.contains("cannot categorize"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(state.dataset.as_ref().unwrap().n_cols(), 3);

        state.categorize("nope");
        assert!(matches!(
            state.binning_outcome,
            Some(BinningOutcome::Failed { .. })
        ));
    }

    #[test]
    fn new_dataset_resets_choices() {
        let mut state = state_with(&wide_csv());
        state.selections.pairplot_hue = Some("city".into());
        state.categorize("income");
        state.set_dataset(read_csv("a\n1\n".as_bytes()).unwrap(), None);
        assert_eq!(state.selections, Selections::default());
        assert!(state.binning_outcome.is_none());
        assert_eq!(state.classification.discrete, vec!["a"]);
    }

    #[test]
    fn hue_map_covers_distinct_values() {
        let state = state_with(&wide_csv());
        assert_eq!(state.hue_map("city").unwrap().values().count(), 4);
        assert!(state.hue_map("missing").is_none());
    }
}
