use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Ui, vec2};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::{BAR_COLOR, MISSING_COLOR, change_color, generate_palette, heat_color};
use crate::config::AppConfig;
use crate::data::LabeledTable;
use crate::data::analysis::{self, Heatmap};
use crate::state::ChartKind;

use super::format_count;

const CHART_HEIGHT: f32 = 460.0;

// ---------------------------------------------------------------------------
// Chart dispatch (central panel)
// ---------------------------------------------------------------------------

/// Render the selected chart for `localities`.
pub fn chart(
    ui: &mut Ui,
    dataset: &LabeledTable,
    localities: &[String],
    kind: ChartKind,
    ranking_period: &mut Option<String>,
    config: &AppConfig,
) {
    if localities.is_empty() {
        ui.colored_label(
            Color32::from_rgb(0xd9, 0x8c, 0x00),
            "Select at least one locality in the side panel.",
        );
        return;
    }

    ui.heading(chart_title(dataset, kind, ranking_period.as_deref()));
    match kind {
        ChartKind::TimeSeries => time_series(ui, dataset, localities),
        ChartKind::BarRanking => {
            period_slider(ui, dataset, ranking_period);
            if let Some(period) = ranking_period.as_deref() {
                ranking_chart(ui, dataset, period, config.ranking_rows.min(localities.len()));
            }
        }
        ChartKind::Heatmap => heatmap_chart(ui, dataset, localities, config.heatmap_rows),
        ChartKind::PctChange => pct_change_chart(
            ui,
            dataset,
            localities,
            config.ranking_rows.min(localities.len()),
        ),
    }
}

fn chart_title(dataset: &LabeledTable, kind: ChartKind, period: Option<&str>) -> String {
    let table = &dataset.table;
    match kind {
        ChartKind::TimeSeries => dataset.title.to_string(),
        ChartKind::BarRanking => format!("{} – Ranking {}", dataset.title, period.unwrap_or("")),
        ChartKind::Heatmap => format!("{} – Evolution", dataset.title),
        ChartKind::PctChange => format!(
            "{} – Change {}→{} (%)",
            dataset.title,
            table.first_period().unwrap_or(""),
            table.last_period().unwrap_or("")
        ),
    }
}

/// Label of the category bar closest to a grid mark, if any.
fn category_label(labels: &[String], value: f64) -> String {
    let index = value.round();
    if (value - index).abs() > 1e-6 || index < 0.0 {
        return String::new();
    }
    labels.get(index as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Line series over time
// ---------------------------------------------------------------------------

fn time_series(ui: &mut Ui, dataset: &LabeledTable, localities: &[String]) {
    let palette = generate_palette(localities.len());

    Plot::new("time_series")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label(dataset.unit_label)
        .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (name, color) in localities.iter().zip(palette) {
                let points = match analysis::series_points(&dataset.table, name) {
                    Ok(points) => points,
                    Err(e) => {
                        log::warn!("{e}");
                        continue;
                    }
                };
                let coords: Vec<[f64; 2]> = points.iter().map(|&(x, y)| [x, y]).collect();

                plot_ui.line(
                    Line::new(PlotPoints::from(coords.clone()))
                        .name(name)
                        .color(color)
                        .width(2.5),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(coords))
                        .name(name)
                        .color(color)
                        .radius(3.5),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Horizontal ranking bars for one period
// ---------------------------------------------------------------------------

fn period_slider(ui: &mut Ui, dataset: &LabeledTable, period: &mut Option<String>) {
    let periods = dataset.table.periods();
    if periods.is_empty() {
        return;
    }
    let mut index = period
        .as_deref()
        .and_then(|p| dataset.table.period_index(p).ok())
        .unwrap_or(periods.len() - 1);

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Year");
        ui.add(egui::Slider::new(&mut index, 0..=periods.len() - 1).show_value(false));
        ui.strong(&periods[index]);
    });
    *period = Some(periods[index].clone());
}

fn ranking_chart(ui: &mut Ui, dataset: &LabeledTable, period: &str, top_n: usize) {
    let ranked = match analysis::ranking(&dataset.table, period, top_n) {
        Ok(r) => r,
        Err(e) => {
            ui.colored_label(Color32::RED, e.to_string());
            return;
        }
    };
    let unit = dataset.unit_label;
    let bars = ranked
        .iter()
        .enumerate()
        .map(|(i, (name, value))| Bar::new(i as f64, *value).name(name).fill(BAR_COLOR))
        .collect();
    horizontal_bars(
        ui,
        "ranking",
        ranked.into_iter().map(|(name, _)| name).collect(),
        BarChart::new(bars).element_formatter(Box::new(move |bar, _chart| {
            format!("{}\n{unit}: {}", bar.name, format_count(bar.value))
        })),
        unit,
    );
}

// ---------------------------------------------------------------------------
// Percentage change between first and last period
// ---------------------------------------------------------------------------

fn pct_change_chart(ui: &mut Ui, dataset: &LabeledTable, localities: &[String], top_n: usize) {
    let changes = match analysis::pct_change_by_entity(&dataset.table, Some(localities), top_n) {
        Ok(c) => c,
        Err(e) => {
            ui.colored_label(Color32::RED, e.to_string());
            return;
        }
    };
    if changes.is_empty() {
        ui.label("No locality has values in both the first and the last period.");
        return;
    }
    let bars = changes
        .iter()
        .enumerate()
        .map(|(i, (name, change))| {
            Bar::new(i as f64, *change)
                .name(name)
                .fill(change_color(*change))
        })
        .collect();
    horizontal_bars(
        ui,
        "pct_change",
        changes.into_iter().map(|(name, _)| name).collect(),
        BarChart::new(bars).element_formatter(Box::new(|bar, _chart| {
            format!("{}\nChange: {:+.1}%", bar.name, bar.value)
        })),
        "Change (%)",
    );
}

fn horizontal_bars(ui: &mut Ui, id: &str, labels: Vec<String>, chart: BarChart, x_label: &str) {
    let height = (labels.len() as f32 * 28.0).clamp(200.0, CHART_HEIGHT);
    Plot::new(id)
        .height(height)
        .x_axis_label(x_label)
        .y_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart.horizontal().width(0.7));
        });
}

// ---------------------------------------------------------------------------
// Heatmap over period × locality
// ---------------------------------------------------------------------------

const LABEL_WIDTH: f32 = 170.0;
const HEADER_HEIGHT: f32 = 24.0;
const CELL_HEIGHT: f32 = 26.0;

fn heatmap_chart(ui: &mut Ui, dataset: &LabeledTable, localities: &[String], rows: usize) {
    let heat = match analysis::heatmap(&dataset.table, Some(localities), rows) {
        Ok(h) => h,
        Err(e) => {
            ui.colored_label(Color32::RED, e.to_string());
            return;
        }
    };
    let Some((lo, hi)) = heat.bounds() else {
        ui.label("No values to show.");
        return;
    };

    let n_cols = heat.periods.len().max(1);
    let cell_width = ((ui.available_width() - LABEL_WIDTH) / n_cols as f32).max(28.0);
    let size = vec2(
        LABEL_WIDTH + cell_width * n_cols as f32,
        HEADER_HEIGHT + CELL_HEIGHT * heat.entities.len() as f32,
    );
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;
    let text_color = ui.visuals().text_color();
    let font = FontId::proportional(12.0);

    let scale = |v: f64| -> f32 {
        if hi > lo {
            ((v - lo) / (hi - lo)) as f32
        } else {
            0.5
        }
    };

    for (j, period) in heat.periods.iter().enumerate() {
        painter.text(
            origin + vec2(LABEL_WIDTH + cell_width * (j as f32 + 0.5), HEADER_HEIGHT / 2.0),
            Align2::CENTER_CENTER,
            period,
            font.clone(),
            text_color,
        );
    }
    for (i, entity) in heat.entities.iter().enumerate() {
        let top = HEADER_HEIGHT + CELL_HEIGHT * i as f32;
        painter.text(
            origin + vec2(LABEL_WIDTH - 8.0, top + CELL_HEIGHT / 2.0),
            Align2::RIGHT_CENTER,
            entity,
            font.clone(),
            text_color,
        );
        for (j, value) in heat.values[i].iter().enumerate() {
            let rect = Rect::from_min_size(
                origin + vec2(LABEL_WIDTH + cell_width * j as f32, top),
                vec2(cell_width, CELL_HEIGHT),
            )
            .shrink(1.0);
            let fill = value.map_or(MISSING_COLOR, |v| heat_color(scale(v)));
            painter.rect_filled(rect, 2.0, fill);
        }
    }

    let tooltip = response
        .hover_pos()
        .and_then(|pos| hovered_cell(&heat, pos - origin, cell_width))
        .map(|(i, j)| {
            let value = heat.values[i][j].map_or("–".to_string(), format_count);
            format!(
                "{}\nYear: {}\n{}: {value}",
                heat.entities[i], heat.periods[j], dataset.unit_label
            )
        });
    if let Some(text) = tooltip {
        response.on_hover_text_at_pointer(text);
    }

    heat_legend(ui, lo, hi);
}

/// `(entity, period)` under a pointer offset relative to the heatmap origin.
fn hovered_cell(heat: &Heatmap, offset: egui::Vec2, cell_width: f32) -> Option<(usize, usize)> {
    if offset.x < LABEL_WIDTH || offset.y < HEADER_HEIGHT {
        return None;
    }
    let i = ((offset.y - HEADER_HEIGHT) / CELL_HEIGHT) as usize;
    let j = ((offset.x - LABEL_WIDTH) / cell_width) as usize;
    (i < heat.entities.len() && j < heat.periods.len()).then_some((i, j))
}

fn heat_legend(ui: &mut Ui, lo: f64, hi: f64) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format_count(lo));
        for step in 0..=10 {
            let (rect, _) = ui.allocate_exact_size(vec2(16.0, 12.0), Sense::hover());
            ui.painter()
                .rect_filled(rect, 0.0, heat_color(step as f32 / 10.0));
        }
        ui.label(format_count(hi));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_only_on_whole_marks() {
        let labels = vec!["AM".to_string(), "SP".to_string()];
        assert_eq!(category_label(&labels, 1.0), "SP");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 2.0), "");
    }

    #[test]
    fn hover_maps_to_cells() {
        let heat = Heatmap {
            entities: vec!["SP".into(), "MG".into()],
            periods: vec!["2006".into(), "2007".into()],
            values: vec![vec![Some(1.0), Some(2.0)], vec![None, Some(4.0)]],
        };
        let cell = |x: f32, y: f32| hovered_cell(&heat, vec2(x, y), 40.0);
        assert_eq!(cell(LABEL_WIDTH + 5.0, HEADER_HEIGHT + 5.0), Some((0, 0)));
        assert_eq!(cell(LABEL_WIDTH + 45.0, HEADER_HEIGHT + CELL_HEIGHT + 1.0), Some((1, 1)));
        assert_eq!(cell(10.0, 50.0), None);
        assert_eq!(cell(LABEL_WIDTH + 100.0, HEADER_HEIGHT + 1.0), None);
    }
}
