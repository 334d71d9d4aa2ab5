use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{
    AxisHints, Bar, BarChart, GridMark, HPlacement, Legend, Line, Plot, PlotPoints, Points,
};

use crate::color::{SeriesColors, ADMISSIONS_COLOR, DEATHS_COLOR, RATE_COLOR};
use crate::report::{DiagnosisRow, GroupBar, MonthlyChart};

const PLOT_HEIGHT: f32 = 360.0;
const GROUP_BAR_WIDTH: f64 = 0.35;

// ---------------------------------------------------------------------------
// Categorical axes
// ---------------------------------------------------------------------------

/// Label of the category at integer position `value`, empty between ticks.
fn category_at(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| category_at(&labels, mark.value)
}

fn truncate(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let short: String = label.chars().take(max_chars - 1).collect();
        format!("{short}…")
    }
}

fn base_plot(id: &str) -> Plot<'_> {
    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
        .include_y(0.0)
}

// ---------------------------------------------------------------------------
// Month-axis charts
// ---------------------------------------------------------------------------

/// Lines with markers, one per series. Missing values break the line.
pub fn line_chart(ui: &mut Ui, id: &str, chart: &MonthlyChart, colors: &SeriesColors) {
    let months: Vec<String> = chart.months.iter().map(|m| m.to_string()).collect();
    let hover_months = months.clone();

    base_plot(id)
        .x_axis_formatter(category_formatter(months))
        .y_axis_label("Quantidade")
        .label_formatter(move |name, point| {
            let month = category_at(&hover_months, point.x);
            if name.is_empty() {
                month
            } else {
                format!("{name}\n{month}: {:.0}", point.y)
            }
        })
        .show(ui, |plot_ui| {
            for series in &chart.series {
                let color = colors.color_for(&series.name);

                let mut segment: Vec<[f64; 2]> = Vec::new();
                let mut markers: Vec<[f64; 2]> = Vec::new();
                let points = series.values.iter().enumerate();
                for (i, value) in points.chain(std::iter::once((series.values.len(), &None))) {
                    match value {
                        Some(y) => {
                            segment.push([i as f64, *y]);
                            markers.push([i as f64, *y]);
                        }
                        None if !segment.is_empty() => {
                            let line = Line::new(PlotPoints::from(std::mem::take(&mut segment)))
                                .name(&series.name)
                                .color(color)
                                .width(1.5);
                            plot_ui.line(line);
                        }
                        None => {}
                    }
                }

                plot_ui.points(
                    Points::new(PlotPoints::from(markers))
                        .name(&series.name)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

/// Percentage bars stacked per month. `counts` (same shape as `shares`)
/// adds absolute numbers to the hover text.
pub fn stacked_percent_chart(
    ui: &mut Ui,
    id: &str,
    shares: &MonthlyChart,
    counts: Option<&MonthlyChart>,
    colors: &SeriesColors,
) {
    let months: Vec<String> = shares.months.iter().map(|m| m.to_string()).collect();

    let mut charts: Vec<BarChart> = Vec::new();
    for (s_idx, series) in shares.series.iter().enumerate() {
        let bars = series
            .values
            .iter()
            .enumerate()
            .map(|(i, share)| {
                let count = counts
                    .and_then(|c| c.series.get(s_idx))
                    .and_then(|c| c.values.get(i).copied().flatten());
                let month = months.get(i).map(String::as_str).unwrap_or_default();
                let label = match count {
                    Some(n) => format!("{month}\nQuantidade: {n:.0}"),
                    None => month.to_string(),
                };
                Bar::new(i as f64, share.unwrap_or(0.0)).name(label)
            })
            .collect();

        let mut chart = BarChart::new(bars)
            .name(&series.name)
            .color(colors.color_for(&series.name))
            .width(0.6)
            .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
                format!("{}\nPercentual: {:.1}%", bar.name, bar.value)
            }));
        let below: Vec<&BarChart> = charts.iter().collect();
        chart = chart.stack_on(&below);
        charts.push(chart);
    }

    base_plot(id)
        .x_axis_formatter(category_formatter(months))
        .y_axis_label("Percentual (%)")
        .include_y(100.0)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

/// Side-by-side bars, one group per category.
pub fn grouped_bar_chart(
    ui: &mut Ui,
    id: &str,
    categories: &[String],
    groups: &[(&str, Vec<f64>, Color32)],
) {
    let n = groups.len().max(1) as f64;
    let width = 0.8 / n;

    base_plot(id)
        .x_axis_formatter(category_formatter(categories.to_vec()))
        .y_axis_label("Quantidade")
        .show(ui, |plot_ui| {
            for (g_idx, (name, values, color)) in groups.iter().enumerate() {
                let offset = (g_idx as f64 - (n - 1.0) / 2.0) * width;
                let bars = values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        let label = categories.get(i).cloned().unwrap_or_default();
                        Bar::new(i as f64 + offset, *v).width(width).name(label)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(*name).color(*color));
            }
        });
}

/// Series of a month chart as grouped bars.
pub fn monthly_bar_chart(ui: &mut Ui, id: &str, chart: &MonthlyChart, colors: &SeriesColors) {
    let months: Vec<String> = chart.months.iter().map(|m| m.to_string()).collect();
    let groups: Vec<(&str, Vec<f64>, Color32)> = chart
        .series
        .iter()
        .map(|s| {
            (
                s.name.as_str(),
                s.values.iter().map(|v| v.unwrap_or(0.0)).collect(),
                colors.color_for(&s.name),
            )
        })
        .collect();
    grouped_bar_chart(ui, id, &months, &groups);
}

// ---------------------------------------------------------------------------
// Mortality charts
// ---------------------------------------------------------------------------

/// Admissions and deaths per diagnosis with the lethality rate on a
/// secondary axis.
pub fn lethality_chart(ui: &mut Ui, rows: &[DiagnosisRow]) {
    let labels: Vec<String> = rows.iter().map(|r| truncate(&r.diagnosis, 14)).collect();
    let max_count = rows
        .iter()
        .map(|r| r.admissions.max(r.deaths))
        .fold(0.0_f64, f64::max);
    // Rates are drawn on the count axis, scaled so 100% meets the tallest bar.
    let scale = if max_count > 0.0 { max_count / 100.0 } else { 1.0 };

    let bars = |value: fn(&DiagnosisRow) -> f64, offset: f64| -> Vec<Bar> {
        rows.iter()
            .enumerate()
            .map(|(i, r)| {
                Bar::new(i as f64 + offset, value(r))
                    .width(GROUP_BAR_WIDTH)
                    .name(&r.diagnosis)
            })
            .collect()
    };
    let admissions = BarChart::new(bars(|r| r.admissions, -GROUP_BAR_WIDTH / 2.0))
        .name("Internamentos")
        .color(ADMISSIONS_COLOR);
    let deaths = BarChart::new(bars(|r| r.deaths, GROUP_BAR_WIDTH / 2.0))
        .name("Óbitos")
        .color(DEATHS_COLOR);
    let rate_points: Vec<[f64; 2]> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| [i as f64, r.lethality * scale])
        .collect();

    let axes = vec![
        AxisHints::new_y().label("Quantidade"),
        AxisHints::new_y()
            .label("Taxa de Letalidade (%)")
            .placement(HPlacement::Right)
            .formatter(move |mark, _range| format!("{:.0}%", mark.value / scale)),
    ];

    base_plot("lethality_by_diagnosis")
        .x_axis_formatter(category_formatter(labels))
        .x_axis_label("Diagnóstico")
        .custom_y_axes(axes)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(admissions);
            plot_ui.bar_chart(deaths);
            plot_ui.line(
                Line::new(PlotPoints::from(rate_points.clone()))
                    .name("Taxa de Letalidade (%)")
                    .color(RATE_COLOR)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(rate_points))
                    .name("Taxa de Letalidade (%)")
                    .color(RATE_COLOR)
                    .radius(3.0),
            );
        });
}

/// Admissions and deaths per group as grouped vertical bars.
pub fn group_bars(ui: &mut Ui, id: &str, groups: &[GroupBar]) {
    let labels: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();
    grouped_bar_chart(
        ui,
        id,
        &labels,
        &[
            (
                "Internamentos",
                groups.iter().map(|g| g.admissions).collect(),
                ADMISSIONS_COLOR,
            ),
            (
                "Óbitos",
                groups.iter().map(|g| g.deaths).collect(),
                DEATHS_COLOR,
            ),
        ],
    );
}

/// Admissions and deaths per group as grouped horizontal bars, first group
/// at the bottom.
pub fn horizontal_group_bars(ui: &mut Ui, id: &str, groups: &[GroupBar]) {
    let labels: Vec<String> = groups.iter().map(|g| g.label.clone()).collect();
    let bars = |value: fn(&GroupBar) -> f64, offset: f64| -> Vec<Bar> {
        groups
            .iter()
            .enumerate()
            .map(|(i, g)| {
                Bar::new(i as f64 + offset, value(g))
                    .width(GROUP_BAR_WIDTH)
                    .name(&g.label)
            })
            .collect()
    };
    let admissions = BarChart::new(bars(|g| g.admissions, -GROUP_BAR_WIDTH / 2.0))
        .name("Internamentos")
        .color(ADMISSIONS_COLOR)
        .horizontal();
    let deaths = BarChart::new(bars(|g| g.deaths, GROUP_BAR_WIDTH / 2.0))
        .name("Óbitos")
        .color(DEATHS_COLOR)
        .horizontal();

    Plot::new(id)
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .include_x(0.0)
        .y_axis_formatter(category_formatter(labels))
        .x_axis_label("Quantidade")
        .y_axis_label("Faixa Etária")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(admissions);
            plot_ui.bar_chart(deaths);
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_ticks_only_on_integer_positions() {
        let labels = vec!["Jan".to_string(), "Fev".to_string()];
        assert_eq!(category_at(&labels, 0.0), "Jan");
        assert_eq!(category_at(&labels, 1.0), "Fev");
        assert_eq!(category_at(&labels, 0.5), "");
        assert_eq!(category_at(&labels, 2.0), "");
        assert_eq!(category_at(&labels, -1.0), "");
    }

    #[test]
    fn long_labels_are_truncated() {
        assert_eq!(truncate("Neoplasias", 14), "Neoplasias");
        assert_eq!(
            truncate("Doenças do aparelho circulatório", 8),
            "Doenças…"
        );
    }
}
