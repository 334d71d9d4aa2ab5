use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::SeriesColors;
use crate::report::{DiagnosisRow, MortalityView, Section, Series};
use crate::state::{AppState, Tab};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Tab strip and dispatch
// ---------------------------------------------------------------------------

pub fn tab_strip(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.title());
        }
    });
    ui.separator();
}

/// Render the active tab in the central panel.
pub fn active_tab(ui: &mut Ui, state: &mut AppState) {
    let mut chosen_diagnosis: Option<String> = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let view = &state.view;
            match state.active_tab {
                Tab::Triage => {
                    ui.heading("Evolução Mensal dos Atendimento em Urgência");
                    show_section(ui, &view.triage, |ui, chart| {
                        plot::line_chart(ui, "triage", chart, &SeriesColors::triage());
                    });
                }
                Tab::EmergencyType => {
                    ui.heading("Evolução Mensal dos Tipos de Urgência");
                    show_section(ui, &view.emergency, |ui, chart| {
                        let colors = series_colors(&chart.series);
                        plot::line_chart(ui, "emergency_type", chart, &colors);
                    });
                }
                Tab::Consultations => {
                    ui.heading("Evolução Mensal das Consultas Médicas");
                    show_section(ui, &view.consultations, |ui, chart| {
                        let colors = series_colors(&chart.series);
                        plot::stacked_percent_chart(ui, "consultations", chart, None, &colors);
                    });
                }
                Tab::Surgeries => {
                    ui.heading("Evolução Mensal das Intervenções Cirúrgicas");
                    show_section(ui, &view.surgeries, |ui, chart| {
                        let colors = series_colors(&chart.series);
                        plot::line_chart(ui, "surgeries", chart, &colors);
                    });
                }
                Tab::Mortality => {
                    show_section(ui, &view.mortality, |ui, mortality| {
                        chosen_diagnosis = mortality_tab(ui, mortality);
                    });
                }
                Tab::Births => {
                    ui.heading("Evolução Mensal dos Partos e Cesarianas");
                    show_section(ui, &view.births, |ui, mix| {
                        let colors = series_colors(&mix.shares.series);
                        plot::stacked_percent_chart(
                            ui,
                            "childbirths",
                            &mix.shares,
                            Some(&mix.counts),
                            &colors,
                        );
                    });
                    ui.separator();
                    ui.heading("Comparação Mensal: Notícias de Nascimento vs Nascer Utente");
                    show_section(ui, &view.registrations, |ui, chart| {
                        let colors = series_colors(&chart.series);
                        plot::monthly_bar_chart(ui, "birth_registrations", chart, &colors);
                    });
                }
            }
        });

    if let Some(diagnosis) = chosen_diagnosis {
        state.select_diagnosis(diagnosis);
    }
}

fn series_colors(series: &[Series]) -> SeriesColors {
    let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
    SeriesColors::new(&names)
}

fn show_section<T>(ui: &mut Ui, section: &Section<T>, draw: impl FnOnce(&mut Ui, &T)) {
    match section {
        Ok(data) => draw(ui, data),
        Err(msg) => {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    }
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(label);
        ui.label(RichText::new(value).size(28.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Mortality tab
// ---------------------------------------------------------------------------

/// Returns the diagnosis picked in the selector, if it changed.
fn mortality_tab(ui: &mut Ui, mortality: &MortalityView) -> Option<String> {
    metric(
        ui,
        "Total de Óbitos",
        format!("{}", mortality.total_deaths.round() as i64),
    );
    ui.separator();

    ui.heading("Internamentos, Óbitos e Taxa de Letalidade por Diagnóstico");
    plot::lethality_chart(ui, &mortality.by_diagnosis);
    diagnosis_table(ui, &mortality.by_diagnosis);
    ui.separator();

    ui.heading("Distribuição por Gênero e Faixa Etária - Selecionar Diagnóstico");
    let current = mortality
        .breakdown
        .as_ref()
        .map(|b| b.diagnosis.clone())
        .unwrap_or_default();
    let mut chosen = None;
    egui::ComboBox::from_label("Selecione um diagnóstico")
        .selected_text(current.as_str())
        .width(420.0)
        .show_ui(ui, |ui: &mut Ui| {
            for diagnosis in &mortality.diagnoses {
                if ui
                    .selectable_label(*diagnosis == current, diagnosis.as_str())
                    .clicked()
                    && *diagnosis != current
                {
                    chosen = Some(diagnosis.clone());
                }
            }
        });

    let Some(breakdown) = &mortality.breakdown else {
        ui.label("Sem diagnósticos para os meses selecionados.");
        return chosen;
    };

    metric(
        ui,
        &format!("Taxa Média de Letalidade - {}", breakdown.diagnosis),
        format!("{:.2}%", breakdown.lethality),
    );
    ui.separator();

    ui.heading(format!("Distribuição por Gênero - {}", breakdown.diagnosis));
    plot::group_bars(ui, "deaths_by_sex", &breakdown.by_sex);

    ui.heading(format!(
        "Distribuição por Faixa Etária - {}",
        breakdown.diagnosis
    ));
    plot::horizontal_group_bars(ui, "deaths_by_age_band", &breakdown.by_age_band);

    chosen
}

fn diagnosis_table(ui: &mut Ui, rows: &[DiagnosisRow]) {
    ui.push_id("diagnosis_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::remainder().at_least(240.0))
            .column(Column::auto().at_least(90.0))
            .column(Column::auto().at_least(70.0))
            .column(Column::auto().at_least(110.0))
            .max_scroll_height(240.0)
            .header(20.0, |mut header| {
                for title in ["Diagnóstico", "Internamentos", "Óbitos", "Taxa Letalidade (%)"] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for row in rows {
                    body.row(18.0, |mut table_row| {
                        table_row.col(|ui: &mut Ui| {
                            ui.label(row.diagnosis.as_str());
                        });
                        table_row.col(|ui: &mut Ui| {
                            ui.label(format!("{:.0}", row.admissions));
                        });
                        table_row.col(|ui: &mut Ui| {
                            ui.label(format!("{:.0}", row.deaths));
                        });
                        table_row.col(|ui: &mut Ui| {
                            ui.label(format!("{:.2}", row.lethality));
                        });
                    });
                }
            });
    });
}
