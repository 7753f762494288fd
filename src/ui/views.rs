use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::ColorMap;
use crate::data::classify::{Classification, select_column};
use crate::data::error::DataError;
use crate::data::model::Value;
use crate::data::stats::{Crosstab, box_stats, crosstab, group_means, value_counts};
use crate::state::{AppState, BinningOutcome, RAW_PREVIEW_ROWS};
use crate::ui::{charts, tables};

// ---------------------------------------------------------------------------
// Central panel: header followed by one toggled section per view
// ---------------------------------------------------------------------------

/// Render the central panel.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            header(ui);

            let Some(ds) = &state.dataset else {
                ui.add_space(12.0);
                ui.label(RichText::new("Awaiting for CSV file to be uploaded.").italics());
                return;
            };
            let (rows, cols) = ds.shape();
            ui.label(format!("Dataframe shape: ({rows}, {cols})"));
            if ds.is_empty() {
                note(ui, "The file has no columns.");
                return;
            }
            ui.label(format!("Dataframe columns: {:?}", ds.column_names()));
            ui.separator();

            state.ensure_insights();

            raw_data(ui, state);
            basic_statistics(ui, state);
            correlation(ui, state);
            distributions(ui, state);
            pairplot(ui, state);
            categorical_counts(ui, state);
            missing_values(ui, state);
            unique_values(ui, state);
            boxplots(ui, state);
            categorical_bar(ui, state);
            target_with_feature(ui, state);
            quartile_categories(ui, state);
            discrete_by_target(ui, state);
        });
}

fn header(ui: &mut Ui) {
    ui.heading(RichText::new("The EDA App").strong());
    ui.label(
        "Exploratory data analysis for a tabular file. Open a CSV file, then \
         tick the views below to inspect its columns.",
    );
    ui.separator();
}

// ---------------------------------------------------------------------------
// Small widgets
// ---------------------------------------------------------------------------

fn note(ui: &mut Ui, text: impl Into<String>) {
    ui.label(RichText::new(text).italics());
}

fn warning(ui: &mut Ui, text: impl Into<String>) {
    ui.label(RichText::new(text).color(Color32::from_rgb(200, 120, 0)));
}

/// Capitalise an error message for display.
fn sentence(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// Combo box over `candidates`; keeps `current` valid and returns the choice.
/// Each entry is tagged with its column kind.
fn select_prompt(
    ui: &mut Ui,
    id: &str,
    label: &str,
    current: &mut Option<String>,
    candidates: &[String],
    classification: &Classification,
) -> Option<String> {
    *current = select_column(current.as_deref(), candidates);
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(current.clone().unwrap_or_default())
            .show_ui(ui, |ui: &mut Ui| {
                for c in candidates {
                    let text = match classification.kind_of(c) {
                        Some(kind) => format!("{c}  ({})", kind.label()),
                        None => c.clone(),
                    };
                    if ui.selectable_label(current.as_deref() == Some(c.as_str()), text).clicked() {
                        *current = Some(c.clone());
                    }
                }
            });
    });
    current.clone()
}

/// Grouped bars of a crosstab: one group per row value, one series per column value.
fn crosstab_chart(ui: &mut Ui, id: &str, table: &Crosstab, series_column: &str) {
    let values: BTreeSet<Value> = table.columns.iter().cloned().collect();
    let colors = ColorMap::new(series_column, &values);
    let x_labels: Vec<String> = table.rows.iter().map(|v| v.to_string()).collect();
    let series: Vec<(String, Color32, Vec<f64>)> = table
        .columns
        .iter()
        .enumerate()
        .map(|(c, value)| {
            let counts = table.counts.iter().map(|row| row[c] as f64).collect();
            (value.to_string(), colors.color_for(value), counts)
        })
        .collect();
    charts::grouped_bars(ui, id, &x_labels, &series, "Count");
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

fn raw_data(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(&mut state.toggles.raw_data, "Show raw data");
    let (true, Some(ds)) = (state.toggles.raw_data, &state.dataset) else {
        return;
    };
    ui.heading("Raw Data");
    tables::head_table(ui, ds, RAW_PREVIEW_ROWS);
}

fn basic_statistics(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(&mut state.toggles.basic_statistics, "Show basic statistics");
    let (true, Some(insights)) = (state.toggles.basic_statistics, &state.insights) else {
        return;
    };
    ui.heading("Basic Statistics");
    tables::describe_table(ui, &insights.description);
}

fn correlation(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(&mut state.toggles.correlation, "Show correlation matrix");
    let (true, Some(insights)) = (state.toggles.correlation, &state.insights) else {
        return;
    };
    ui.heading("Correlation Matrix");
    if insights.correlation.is_empty() {
        note(ui, "No numeric features available for a correlation matrix.");
    } else {
        charts::correlation_heatmap(ui, &insights.correlation);
    }
}

fn distributions(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(
        &mut state.toggles.distributions,
        "Show distribution of numerical features",
    );
    let (true, Some(ds)) = (state.toggles.distributions, &state.dataset) else {
        return;
    };
    ui.heading("Distribution of Numerical Features");
    if state.classification.discrete.is_empty() {
        note(ui, "No discrete numeric features to plot.");
    }
    for name in &state.classification.discrete {
        let Some(column) = ds.column(name) else {
            continue;
        };
        ui.strong(format!("Distribution of {name}"));
        charts::discrete_histogram(ui, &format!("dist_{name}"), column);
    }
}

fn pairplot(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(&mut state.toggles.pairplot, "Show pairplot");
    let (true, Some(ds)) = (state.toggles.pairplot, &state.dataset) else {
        return;
    };
    ui.heading("Pairplot");
    let candidates = ds.column_names();
    let Some(hue) = select_prompt(
        ui,
        "pairplot_hue",
        "Select target column for pairplot",
        &mut state.selections.pairplot_hue,
        &candidates,
        &state.classification,
    ) else {
        return;
    };

    let vars: Vec<&str> = state
        .classification
        .numeric_in(ds)
        .into_iter()
        .filter(|v| *v != hue)
        .collect();
    let (Some(hue_column), Some(colors)) = (ds.column(&hue), state.hue_map(&hue)) else {
        return;
    };
    if vars.is_empty() {
        note(ui, "No numeric features besides the hue column.");
        return;
    }
    charts::pairplot(ui, ds, &vars, hue_column, &colors);
}

fn categorical_counts(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(
        &mut state.toggles.categorical_counts,
        "Show count of categorical features",
    );
    let (true, Some(ds)) = (state.toggles.categorical_counts, &state.dataset) else {
        return;
    };
    ui.heading("Count of Categorical Features");
    if state.classification.categorical.is_empty() {
        note(ui, "No categorical features.");
    }
    for name in &state.classification.categorical {
        let Some(column) = ds.column(name) else {
            continue;
        };
        let counts: Vec<(String, usize)> = value_counts(column)
            .into_iter()
            .map(|(v, n)| (v.to_string(), n))
            .collect();
        ui.strong(format!("Count of {name}"));
        charts::count_plot(ui, &format!("count_{name}"), &counts, true);
    }
}

fn missing_values(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(&mut state.toggles.missing_values, "Show missing values");
    let (true, Some(ds), Some(insights)) =
        (state.toggles.missing_values, &state.dataset, &state.insights)
    else {
        return;
    };
    ui.heading("Missing Values");
    let missing: Vec<(String, usize)> = insights
        .missing
        .iter()
        .filter(|(_, n)| *n > 0)
        .cloned()
        .collect();
    if missing.is_empty() {
        note(ui, "No missing values.");
    } else {
        tables::count_grid(ui, "missing_grid", ("column", "missing"), &missing);
    }
    ui.strong("Missing Values Heatmap");
    charts::missing_heatmap(ui, ds);
}

fn unique_values(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(
        &mut state.toggles.unique_values,
        "Show unique values in each column",
    );
    let (true, Some(insights)) = (state.toggles.unique_values, &state.insights) else {
        return;
    };
    ui.heading("Unique Values in Each Column");
    tables::count_grid(ui, "unique_grid", ("column", "unique"), &insights.unique);
}

fn boxplots(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(&mut state.toggles.boxplots, "Show boxplot for outliers");
    let (true, Some(ds)) = (state.toggles.boxplots, &state.dataset) else {
        return;
    };
    ui.heading("Boxplot for Outliers");
    for name in state.classification.numeric_in(ds) {
        let Some(stats) = ds.column(name).and_then(|c| box_stats(&c.numeric_values())) else {
            continue;
        };
        ui.strong(format!("Boxplot of {name}"));
        charts::box_plot(ui, &format!("box_{name}"), name, &stats);
    }
}

fn categorical_bar(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(
        &mut state.toggles.categorical_bar,
        "Show bar plot for categorical features",
    );
    let (true, Some(ds)) = (state.toggles.categorical_bar, &state.dataset) else {
        return;
    };
    ui.heading("Bar Plot for Categorical Features");
    let Some(feature) = select_prompt(
        ui,
        "bar_feature",
        "Select categorical feature",
        &mut state.selections.bar_feature,
        &state.classification.categorical,
        &state.classification,
    ) else {
        note(ui, "No categorical features available for bar plot.");
        return;
    };
    let Some(column) = ds.column(&feature) else {
        return;
    };
    let counts: Vec<(String, usize)> = value_counts(column)
        .into_iter()
        .map(|(v, n)| (v.to_string(), n))
        .collect();
    ui.strong(format!("Bar Plot of {feature}"));
    charts::count_plot(ui, "categorical_bar", &counts, true);
}

fn target_with_feature(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(
        &mut state.toggles.target_with_feature,
        "Show distribution of target with feature",
    );
    let (true, Some(ds)) = (state.toggles.target_with_feature, &state.dataset) else {
        return;
    };
    ui.heading("Distribution of Target with Feature");
    let candidates = ds.column_names();
    let target = select_prompt(
        ui,
        "distribution_target",
        "Select target column",
        &mut state.selections.distribution_target,
        &candidates,
        &state.classification,
    );
    let feature = select_prompt(
        ui,
        "distribution_feature",
        "Select feature column",
        &mut state.selections.distribution_feature,
        &candidates,
        &state.classification,
    );
    let (Some(target), Some(feature)) = (target, feature) else {
        note(ui, "Please select both target and feature columns.");
        return;
    };
    let table = ds
        .require_column(&target)
        .and_then(|t| crosstab(t, ds.require_column(&feature)?));
    match table {
        Ok(table) => {
            ui.strong(format!("Distribution of {target} with {feature}"));
            crosstab_chart(ui, "target_with_feature", &table, &feature);
        }
        Err(e) => warning(ui, e.to_string()),
    }
}

fn quartile_categories(ui: &mut Ui, state: &mut AppState) {
    if ui
        .checkbox(
            &mut state.toggles.quartile_categories,
            "Show categories of selected numeric features using qcut",
        )
        .changed()
    {
        // Unticking and ticking again re-derives the column.
        state.reset_binning();
    }
    if !state.toggles.quartile_categories {
        return;
    }
    let Some(ds) = &state.dataset else {
        return;
    };
    ui.heading("Categories of Numeric Features using qcut");

    let all_columns = ds.column_names();
    let Some(feature) = select_prompt(
        ui,
        "quartile_feature",
        "Select numeric feature",
        &mut state.selections.quartile_feature,
        &state.classification.continuous,
        &state.classification,
    ) else {
        note(ui, "No numeric features available for categorization.");
        return;
    };
    let Some(target) = select_prompt(
        ui,
        "quartile_target",
        "Select target column",
        &mut state.selections.quartile_target,
        &all_columns,
        &state.classification,
    ) else {
        return;
    };

    state.categorize(&feature);

    let Some(ds) = &state.dataset else {
        return;
    };
    match &state.binning_outcome {
        Some(BinningOutcome::Created { column, .. }) => {
            let means = ds
                .require_column(column)
                .and_then(|groups| group_means(groups, ds.require_column(&target)?));
            match means {
                Ok(means) => {
                    ui.strong(format!("Categories of {feature}"));
                    charts::mean_bars(ui, "quartile_means", &means, column, &target);
                }
                Err(DataError::NotNumeric(_)) => {
                    warning(ui, format!("Target `{target}` is not numeric; pick a numeric target."));
                }
                Err(e) => warning(ui, e.to_string()),
            }
        }
        Some(BinningOutcome::Failed { message, .. }) => {
            warning(ui, sentence(message));
        }
        None => {}
    }
}

fn discrete_by_target(ui: &mut Ui, state: &mut AppState) {
    ui.checkbox(
        &mut state.toggles.discrete_by_target,
        "Show counts of discrete variables grouped by target",
    );
    let (true, Some(ds)) = (state.toggles.discrete_by_target, &state.dataset) else {
        return;
    };
    ui.heading("Counts of Discrete Variables Grouped by Target");
    let candidates = ds.column_names();
    let target = select_prompt(
        ui,
        "crosstab_target",
        "Select target column",
        &mut state.selections.crosstab_target,
        &candidates,
        &state.classification,
    );
    let Some(target) = target.filter(|_| !state.classification.discrete.is_empty()) else {
        note(ui, "No discrete variables or target column selected.");
        return;
    };
    let Some(target_column) = ds.column(&target) else {
        return;
    };
    for var in &state.classification.discrete {
        let Some(column) = ds.column(var) else {
            continue;
        };
        match crosstab(column, target_column) {
            Ok(table) => {
                ui.strong(format!("Counts of {var} Variable Grouped by Target"));
                crosstab_chart(ui, &format!("crosstab_{var}"), &table, &target);
            }
            Err(e) => warning(ui, e.to_string()),
        }
    }
}
