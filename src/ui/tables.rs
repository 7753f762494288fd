use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Dataset;
use crate::data::stats::{Description, NumericSummary};

const ROW_HEIGHT: f32 = 18.0;
const HEADER_HEIGHT: f32 = 22.0;

fn fmt_stat(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.6}"),
        None => "NaN".to_string(),
    }
}

fn stat_row(summaries: &[NumericSummary], f: impl Fn(&NumericSummary) -> String) -> Vec<String> {
    summaries.iter().map(f).collect()
}

/// Wraps a table in its own id scope and a horizontal scroll area so wide
/// datasets stay usable inside the page scroll.
fn scoped(ui: &mut Ui, id: &str, add_contents: impl FnOnce(&mut Ui)) {
    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal()
            .auto_shrink([false, true])
            .show(ui, add_contents);
    });
}

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

/// First `n` rows, index column first.
pub fn head_table(ui: &mut Ui, dataset: &Dataset, n: usize) {
    let columns = dataset.columns();
    let n = n.min(dataset.n_rows());
    scoped(ui, "raw_data", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(TableColumn::auto().at_least(32.0))
            .columns(TableColumn::auto().at_least(60.0), columns.len())
            .header(HEADER_HEIGHT, |mut header| {
                header.col(|_ui: &mut Ui| {});
                for c in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(&c.name);
                    });
                }
            })
            .body(|mut body| {
                for row in 0..n {
                    body.row(ROW_HEIGHT, |mut table_row| {
                        table_row.col(|ui: &mut Ui| {
                            ui.label(RichText::new(row.to_string()).weak());
                        });
                        for c in columns {
                            table_row.col(|ui: &mut Ui| {
                                ui.label(c.values[row].to_string());
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// describe()
// ---------------------------------------------------------------------------

/// Statistic names down the side, one column per dataset column.
pub fn describe_table(ui: &mut Ui, description: &Description) {
    let (names, rows): (Vec<String>, Vec<(&str, Vec<String>)>) = match description {
        Description::Numeric(summaries) => (
            summaries.iter().map(|s| s.column.clone()).collect(),
            vec![
                ("count", stat_row(summaries, |s| format!("{:.1}", s.count as f64))),
                ("mean", stat_row(summaries, |s| fmt_stat(s.mean))),
                ("std", stat_row(summaries, |s| fmt_stat(s.std))),
                ("min", stat_row(summaries, |s| fmt_stat(s.min))),
                ("25%", stat_row(summaries, |s| fmt_stat(s.q1))),
                ("50%", stat_row(summaries, |s| fmt_stat(s.median))),
                ("75%", stat_row(summaries, |s| fmt_stat(s.q3))),
                ("max", stat_row(summaries, |s| fmt_stat(s.max))),
            ],
        ),
        Description::Categorical(summaries) => (
            summaries.iter().map(|s| s.column.clone()).collect(),
            vec![
                ("count", summaries.iter().map(|s| s.count.to_string()).collect()),
                ("unique", summaries.iter().map(|s| s.unique.to_string()).collect()),
                (
                    "top",
                    summaries
                        .iter()
                        .map(|s| s.top.as_ref().map(|v| v.to_string()).unwrap_or_default())
                        .collect(),
                ),
                ("freq", summaries.iter().map(|s| s.freq.to_string()).collect()),
            ],
        ),
    };

    scoped(ui, "describe", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .column(TableColumn::auto().at_least(48.0))
            .columns(TableColumn::auto().at_least(80.0), names.len())
            .header(HEADER_HEIGHT, |mut header| {
                header.col(|_ui: &mut Ui| {});
                for name in &names {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|mut body| {
                for (stat, cells) in &rows {
                    body.row(ROW_HEIGHT, |mut table_row| {
                        table_row.col(|ui: &mut Ui| {
                            ui.strong(*stat);
                        });
                        for cell in cells {
                            table_row.col(|ui: &mut Ui| {
                                ui.monospace(cell);
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// name → count listings
// ---------------------------------------------------------------------------

/// Two-column grid, e.g. column → missing count.
pub fn count_grid(ui: &mut Ui, id: &str, heading: (&str, &str), rows: &[(String, usize)]) {
    egui::Grid::new(id)
        .striped(true)
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.strong(heading.0);
            ui.strong(heading.1);
            ui.end_row();
            for (name, count) in rows {
                ui.label(name);
                ui.monospace(count.to_string());
                ui.end_row();
            }
        });
}
