use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, RichText, Sense, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoint, Points, Text};

use crate::color::{ColorMap, diverging, diverging_text};
use crate::data::model::{Column, Dataset, Value};
use crate::data::stats::{BoxStats, CorrelationMatrix, HistogramBin, default_bin_count, histogram};

// ---------------------------------------------------------------------------
// Shared look
// ---------------------------------------------------------------------------

pub const PLOT_HEIGHT: f32 = 260.0;
pub const BAR_COLOR: Color32 = Color32::from_rgb(76, 114, 176);
const CATEGORY_ROW: f32 = 22.0;
const LABEL_CHARS: usize = 14;

fn short_label(s: &str) -> String {
    if s.chars().count() <= LABEL_CHARS {
        s.to_string()
    } else {
        let head: String = s.chars().take(LABEL_CHARS - 1).collect();
        format!("{head}…")
    }
}

fn category_text(pos: PlotPoint, label: &str, anchor: Align2) -> Text {
    Text::new(pos, RichText::new(short_label(label)).size(11.0)).anchor(anchor)
}

// ---------------------------------------------------------------------------
// Counts
// ---------------------------------------------------------------------------

/// One bar per category; horizontal bars list the first entry at the top.
pub fn count_plot(ui: &mut Ui, id: &str, counts: &[(String, usize)], horizontal: bool) {
    let n = counts.len();
    let max = counts.iter().map(|(_, c)| *c).max().unwrap_or(1) as f64;
    let height = if horizontal {
        (n as f32 * CATEGORY_ROW + 40.0).max(PLOT_HEIGHT)
    } else {
        PLOT_HEIGHT
    };

    Plot::new(id)
        .height(height)
        .allow_scroll(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .include_x(if horizontal { -0.3 * max } else { -0.5 })
        .include_y(if horizontal { -0.5 } else { -0.12 * max })
        .show(ui, |plot_ui| {
            let position = |i: usize| if horizontal { (n - 1 - i) as f64 } else { i as f64 };
            let bars: Vec<Bar> = counts
                .iter()
                .enumerate()
                .map(|(i, (label, count))| {
                    Bar::new(position(i), *count as f64).name(label).width(0.7)
                })
                .collect();
            let mut chart = BarChart::new(bars).color(BAR_COLOR).name("count");
            if horizontal {
                chart = chart.horizontal();
            }
            plot_ui.bar_chart(chart);

            for (i, (label, _)) in counts.iter().enumerate() {
                let text = if horizontal {
                    category_text(PlotPoint::new(0.0, position(i)), label, Align2::RIGHT_CENTER)
                } else {
                    category_text(PlotPoint::new(position(i), 0.0), label, Align2::CENTER_TOP)
                };
                plot_ui.text(text);
            }
        });
}

/// One group per `x_labels` entry, one coloured bar per series inside each group.
pub fn grouped_bars(
    ui: &mut Ui,
    id: &str,
    x_labels: &[String],
    series: &[(String, Color32, Vec<f64>)],
    y_label: &str,
) {
    let k = series.len().max(1);
    let bar_width = 0.8 / k as f64;
    let max = series
        .iter()
        .flat_map(|(_, _, v)| v.iter().copied())
        .fold(1.0, f64::max);

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .y_axis_label(y_label)
        .allow_scroll(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .include_y(-0.12 * max)
        .show(ui, |plot_ui| {
            for (s, (name, color, values)) in series.iter().enumerate() {
                let offset = -0.4 + bar_width * (s as f64 + 0.5);
                let bars: Vec<Bar> = values
                    .iter()
                    .enumerate()
                    .map(|(g, v)| {
                        Bar::new(g as f64 + offset, *v)
                            .width(bar_width * 0.95)
                            .name(format!("{} / {name}", x_labels[g]))
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).color(*color).name(name));
            }
            for (g, label) in x_labels.iter().enumerate() {
                plot_ui.text(category_text(
                    PlotPoint::new(g as f64, 0.0),
                    label,
                    Align2::CENTER_TOP,
                ));
            }
        });
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// Histogram with one bar per distinct value, for low-cardinality numeric columns.
pub fn discrete_histogram(ui: &mut Ui, id: &str, column: &Column) {
    let mut counts: Vec<(f64, usize)> = Vec::new();
    let mut sorted = column.numeric_values();
    sorted.sort_by(f64::total_cmp);
    for v in sorted {
        match counts.last_mut() {
            Some((last, n)) if *last == v => *n += 1,
            _ => counts.push((v, 1)),
        }
    }
    let min_gap = counts
        .windows(2)
        .map(|w| w[1].0 - w[0].0)
        .fold(f64::INFINITY, f64::min);
    let width = if min_gap.is_finite() { min_gap * 0.8 } else { 0.8 };

    Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label(column.name.as_str())
        .y_axis_label("Count")
        .allow_scroll(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            let bars = counts
                .iter()
                .map(|(v, n)| Bar::new(*v, *n as f64).width(width))
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name(&column.name));
        });
}

fn histogram_chart(bins: &[HistogramBin], name: &str, color: Color32) -> BarChart {
    let bars = bins
        .iter()
        .map(|b| Bar::new(b.center(), b.count as f64).width(b.width()))
        .collect();
    BarChart::new(bars).color(color).name(name)
}

/// Horizontal box plot with Tukey whiskers; outliers drawn as points.
pub fn box_plot(ui: &mut Ui, id: &str, name: &str, stats: &BoxStats) {
    Plot::new(id)
        .height(120.0)
        .x_axis_label(name)
        .show_y(false)
        .show_axes([true, false])
        .allow_scroll(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            let spread = BoxSpread::new(
                stats.lower_whisker,
                stats.q1,
                stats.median,
                stats.q3,
                stats.upper_whisker,
            );
            let elem = BoxElem::new(0.0, spread)
                .name(name)
                .box_width(0.5)
                .whisker_width(0.3);
            plot_ui.box_plot(BoxPlot::new(vec![elem]).horizontal().color(BAR_COLOR));

            if !stats.outliers.is_empty() {
                let points: Vec<[f64; 2]> = stats.outliers.iter().map(|v| [*v, 0.0]).collect();
                plot_ui.points(
                    Points::new(points)
                        .radius(2.5)
                        .color(Color32::DARK_GRAY)
                        .name("outliers"),
                );
            }
        });
}

/// Mean of a target per group, labelled under each bar.
pub fn mean_bars(ui: &mut Ui, id: &str, means: &[(Value, f64)], x_label: &str, y_label: &str) {
    Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_scroll(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            let bars = means
                .iter()
                .enumerate()
                .map(|(i, (group, mean))| {
                    Bar::new(i as f64, *mean)
                        .width(0.7)
                        .name(format!("{x_label} = {group}"))
                })
                .collect();
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name(y_label));
            for (i, (group, _)) in means.iter().enumerate() {
                plot_ui.text(category_text(
                    PlotPoint::new(i as f64, 0.0),
                    &group.to_string(),
                    Align2::CENTER_TOP,
                ));
            }
        });
}

// ---------------------------------------------------------------------------
// Pairplot
// ---------------------------------------------------------------------------

/// Scatter grid over `vars`, coloured by the hue column. Diagonal cells hold
/// per-hue histograms. Rows with a missing hue are skipped.
pub fn pairplot(ui: &mut Ui, dataset: &Dataset, vars: &[&str], hue: &Column, colors: &ColorMap) {
    const CELL: f32 = 150.0;

    let cells: Vec<Vec<Option<f64>>> = vars
        .iter()
        .map(|v| {
            dataset
                .column(v)
                .map(Column::numeric_cells)
                .unwrap_or_default()
        })
        .collect();
    let cell = |var: usize, row: usize| cells[var].get(row).copied().flatten();

    egui::ScrollArea::horizontal()
        .id_salt("pairplot_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("pairplot_grid")
                .spacing([4.0, 4.0])
                .show(ui, |ui: &mut Ui| {
                    for (i, y_name) in vars.iter().enumerate() {
                        ui.label(RichText::new(short_label(y_name)).small());
                        for (j, _) in vars.iter().enumerate() {
                            Plot::new(("pair", i, j))
                                .width(CELL)
                                .height(CELL)
                                .show_axes(false)
                                .show_grid(false)
                                .allow_scroll(false)
                                .allow_drag(false)
                                .allow_zoom(false)
                                .allow_boxed_zoom(false)
                                .show(ui, |plot_ui| {
                                    for value in colors.values() {
                                        let color = colors.color_for(value);
                                        let rows = (0..hue.len()).filter(|r| &hue.values[*r] == value);
                                        if i == j {
                                            let xs: Vec<f64> =
                                                rows.filter_map(|r| cell(i, r)).collect();
                                            let bins = histogram(&xs, default_bin_count(xs.len()));
                                            plot_ui.bar_chart(histogram_chart(
                                                &bins,
                                                &value.to_string(),
                                                color.gamma_multiply(0.6),
                                            ));
                                        } else {
                                            let pts: Vec<[f64; 2]> = rows
                                                .filter_map(|r| Some([cell(j, r)?, cell(i, r)?]))
                                                .collect();
                                            plot_ui.points(
                                                Points::new(pts)
                                                    .radius(1.5)
                                                    .color(color)
                                                    .name(value.to_string()),
                                            );
                                        }
                                    }
                                });
                        }
                        ui.end_row();
                    }
                    ui.label("");
                    for x_name in vars {
                        ui.label(RichText::new(short_label(x_name)).small());
                    }
                    ui.end_row();
                });
        });

    legend_row(ui, &colors.column, &colors.legend_entries());
}

/// Coloured swatches for a hue mapping.
pub fn legend_row(ui: &mut Ui, title: &str, entries: &[(String, Color32)]) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.strong(title);
        for (label, color) in entries {
            ui.label(RichText::new("■").color(*color));
            ui.label(label);
        }
    });
}

// ---------------------------------------------------------------------------
// Heatmaps (painted directly)
// ---------------------------------------------------------------------------

/// Annotated correlation matrix with a cool-warm colour bar.
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let n = matrix.columns.len();
    if n == 0 {
        return;
    }
    let margin = Vec2::new(110.0, 24.0);
    let legend_width = 70.0;
    let cell_size = ((ui.available_width() - margin.x - legend_width) / n as f32).clamp(18.0, 56.0);
    let size = Vec2::new(
        margin.x + cell_size * n as f32 + legend_width,
        margin.y + cell_size * n as f32 + 90.0,
    );
    let (area, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(area);
    let grid = Rect::from_min_size(area.min + margin, Vec2::splat(cell_size * n as f32));
    let font = FontId::proportional(10.0);

    for i in 0..n {
        for j in 0..n {
            let cell = Rect::from_min_size(
                grid.min + Vec2::new(j as f32 * cell_size, i as f32 * cell_size),
                Vec2::splat(cell_size),
            );
            // Undefined correlations stay blank.
            let Some(r) = matrix.values[i][j] else {
                continue;
            };
            painter.rect_filled(cell, 0.0, diverging(r));
            if cell_size >= 28.0 {
                painter.text(
                    cell.center(),
                    Align2::CENTER_CENTER,
                    format!("{r:.2}"),
                    font.clone(),
                    diverging_text(r),
                );
            }
        }
    }

    for (i, name) in matrix.columns.iter().enumerate() {
        let offset = (i as f32 + 0.5) * cell_size;
        painter.text(
            Pos2::new(grid.min.x - 5.0, grid.min.y + offset),
            Align2::RIGHT_CENTER,
            short_label(name),
            font.clone(),
            Color32::GRAY,
        );
        // Column labels below the grid, staggered so neighbours do not collide.
        let stagger = if i % 2 == 0 { 4.0 } else { 18.0 };
        painter.text(
            Pos2::new(grid.min.x + offset, grid.max.y + stagger),
            Align2::CENTER_TOP,
            short_label(name),
            font.clone(),
            Color32::GRAY,
        );
    }

    // Colour bar: +1 at the top.
    let bar = Rect::from_min_size(
        Pos2::new(grid.max.x + 16.0, grid.min.y),
        Vec2::new(14.0, grid.height()),
    );
    let steps = 100;
    for s in 0..steps {
        let t = s as f32 / (steps - 1) as f32;
        let y = bar.min.y + t * bar.height();
        painter.line_segment(
            [Pos2::new(bar.min.x, y), Pos2::new(bar.max.x, y)],
            Stroke::new(2.0, diverging(1.0 - 2.0 * t as f64)),
        );
    }
    for (label, y, anchor) in [
        ("1.0", bar.min.y, Align2::LEFT_TOP),
        ("0.0", bar.center().y, Align2::LEFT_CENTER),
        ("-1.0", bar.max.y, Align2::LEFT_BOTTOM),
    ] {
        painter.text(Pos2::new(bar.max.x + 4.0, y), anchor, label, font.clone(), Color32::GRAY);
    }
}

/// Rows × columns map of missing cells: black = missing, white = present.
/// Rows are bucketed to pixel height; a bucket is black if any row in it is missing.
pub fn missing_heatmap(ui: &mut Ui, dataset: &Dataset) {
    let n_cols = dataset.n_cols();
    let n_rows = dataset.n_rows();
    if n_cols == 0 || n_rows == 0 {
        return;
    }
    let margin = Vec2::new(40.0, 6.0);
    let plot_height = 300.0;
    let width = (ui.available_width() - margin.x).clamp(120.0, 900.0);
    let size = Vec2::new(margin.x + width, margin.y + plot_height + 40.0);
    let (area, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(area);
    let grid = Rect::from_min_size(area.min + margin, Vec2::new(width, plot_height));
    let font = FontId::proportional(10.0);

    let buckets = n_rows.min(plot_height as usize);
    let cell_w = width / n_cols as f32;
    let cell_h = plot_height / buckets as f32;

    painter.rect_filled(grid, 0.0, Color32::WHITE);
    for (c, column) in dataset.columns().iter().enumerate() {
        for b in 0..buckets {
            let start = b * n_rows / buckets;
            let end = ((b + 1) * n_rows / buckets).max(start + 1);
            if column.values[start..end].iter().any(Value::is_null) {
                let cell = Rect::from_min_size(
                    grid.min + Vec2::new(c as f32 * cell_w, b as f32 * cell_h),
                    Vec2::new(cell_w, cell_h.max(1.0)),
                );
                painter.rect_filled(cell, 0.0, Color32::BLACK);
            }
        }
        let stagger = if c % 2 == 0 { 4.0 } else { 18.0 };
        painter.text(
            Pos2::new(grid.min.x + (c as f32 + 0.5) * cell_w, grid.max.y + stagger),
            Align2::CENTER_TOP,
            short_label(&column.name),
            font.clone(),
            Color32::GRAY,
        );
    }
    painter.text(grid.min - Vec2::new(4.0, 0.0), Align2::RIGHT_TOP, "0", font.clone(), Color32::GRAY);
    painter.text(
        Pos2::new(grid.min.x - 4.0, grid.max.y),
        Align2::RIGHT_BOTTOM,
        (n_rows - 1).to_string(),
        font,
        Color32::GRAY,
    );

    legend_row(
        ui,
        "",
        &[
            ("missing".to_string(), Color32::BLACK),
            ("present".to_string(), Color32::from_gray(235)),
        ],
    );
}
