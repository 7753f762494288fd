use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – upload and column overview
// ---------------------------------------------------------------------------

/// Render the left panel: file upload and the column classification.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Upload your CSV data");
    ui.separator();

    if ui.button("Browse files…").clicked() {
        open_file_dialog(state);
    }
    match &state.source_name {
        Some(name) => ui.label(RichText::new(name).monospace()),
        None => ui.label("Upload your input CSV file"),
    };
    ui.add_space(8.0);

    let Some(dataset) = &state.dataset else {
        return;
    };

    ui.heading("Columns");
    ui.separator();

    let classification = &state.classification;
    let groups = [
        ("Continuous", &classification.continuous),
        ("Discrete", &classification.discrete),
        ("Categorical", &classification.categorical),
    ];

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (title, names) in groups {
                let header_text = format!("{title}  ({})", names.len());
                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(title)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        for name in names {
                            let dtype = dataset
                                .column(name)
                                .map(|c| c.dtype.to_string())
                                .unwrap_or_default();
                            ui.horizontal(|ui: &mut Ui| {
                                ui.label(name);
                                ui.label(RichText::new(dtype).weak().small());
                            });
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let (rows, cols) = ds.shape();
            ui.label(format!("{rows} rows × {cols} columns"));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    dataset.n_rows(),
                    dataset.column_names()
                );
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned());
                state.set_dataset(dataset, name);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
