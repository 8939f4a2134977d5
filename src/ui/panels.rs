use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::DatasetKey;
use crate::state::{AppState, ChartKind, LocalityMode, Status};

use super::{metrics, plot, table};

// ---------------------------------------------------------------------------
// Left side panel – dataset and locality filters
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Microeletrônica");
    ui.separator();

    let choices: Vec<(DatasetKey, &'static str)> = match state.datasets() {
        Some(datasets) => datasets.values().map(|d| (d.key, d.title)).collect(),
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // ---- Dataset selector (only datasets that loaded) ----
    ui.strong("Dataset");
    let current = state.selected;
    let mut picked = None;
    egui::ComboBox::from_id_salt("dataset")
        .selected_text(current.map_or("–", |k| k.spec().title))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for (key, title) in &choices {
                if ui.selectable_label(current == Some(*key), *title).clicked() {
                    picked = Some(*key);
                }
            }
        });
    if let Some(key) = picked {
        state.select_dataset(key);
    }
    ui.separator();

    // Clone what we need so we can mutate state below.
    let Some(dataset) = state.current() else {
        return;
    };
    let entities = dataset.table.entities().to_vec();
    let span = dataset.table.period_span();
    let total = entities.len();

    // ---- Locality filter ----
    ui.strong("Localities");
    let mut mode = state.locality_mode;
    ui.radio_value(&mut mode, LocalityMode::All, "All");
    ui.radio_value(&mut mode, LocalityMode::TopN, format!("Top N (of {total})"));
    ui.radio_value(&mut mode, LocalityMode::Manual, "Choose manually");
    if mode != state.locality_mode {
        state.set_locality_mode(mode);
    }

    match mode {
        LocalityMode::All => {}
        LocalityMode::TopN => {
            ui.add(egui::Slider::new(&mut state.top_n, 1..=total.max(1)).text("N"));
        }
        LocalityMode::Manual => {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all();
                }
                if ui.small_button("None").clicked() {
                    state.select_none();
                }
            });
            ScrollArea::vertical()
                .max_height(260.0)
                .auto_shrink([false, true])
                .show(ui, |ui: &mut Ui| {
                    for entity in &entities {
                        let mut checked = state.manual.contains(entity);
                        if ui.checkbox(&mut checked, entity).changed() {
                            state.toggle_locality(entity);
                        }
                    }
                });
        }
    }
    ui.separator();

    // ---- Chart selector ----
    ui.strong("Chart");
    for kind in ChartKind::ALL {
        ui.radio_value(&mut state.chart, kind, kind.label());
    }
    ui.separator();

    ui.label(RichText::new(format!("Period: {span}")).small());
    ui.label(RichText::new(format!("Localities: {total} in total")).small());
}

// ---------------------------------------------------------------------------
// Central panel – description, metrics, chart and raw table
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    let localities = match state.selected_localities() {
        Ok(l) => l,
        Err(e) => {
            ui.colored_label(Color32::RED, e.to_string());
            return;
        }
    };
    let mut ranking_period = state.ranking_period.clone();
    let mut status = None;

    let Some(dataset) = state.current() else {
        return;
    };
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new(dataset.title).strong().size(18.0));
            ui.label(dataset.description);
            ui.add_space(8.0);

            if !localities.is_empty() {
                metrics::metric_cards(ui, &dataset.table, &localities);
            }
            ui.separator();

            plot::chart(
                ui,
                dataset,
                &localities,
                state.chart,
                &mut ranking_period,
                &state.config,
            );
            ui.separator();

            if !localities.is_empty() {
                status = table::raw_table(ui, dataset, &localities);
            }

            ui.separator();
            ui.label(
                RichText::new(
                    "Source: RAIS (Relação Anual de Informações Sociais) – \
                     Ministério do Trabalho e Emprego",
                )
                .small(),
            );
        });

    state.ranking_period = ranking_period;
    if status.is_some() {
        state.status = status;
    }
}

// ---------------------------------------------------------------------------
// Missing data view
// ---------------------------------------------------------------------------

/// Shown instead of the dashboard when no dataset could be loaded.
pub fn missing_data(ui: &mut Ui, state: &mut AppState) {
    ui.heading(RichText::new(state.unavailable_heading()).color(Color32::RED));
    if let Some(Status::Error(message)) = &state.status {
        ui.label(RichText::new(message).color(Color32::RED));
    }
    ui.add_space(8.0);
    ui.label(format!(
        "Place the .xlsx files in {}:",
        state.registry.data_dir().display()
    ));
    ui.add_space(4.0);

    for (key, present) in state.availability() {
        let file = key.spec().file_name;
        if present {
            ui.label(RichText::new(format!("✔ {file}")).color(Color32::DARK_GREEN));
        } else {
            ui.label(RichText::new(format!("✖ {file} ({key})")).color(Color32::RED));
        }
    }

    ui.add_space(8.0);
    if ui.button("Retry").clicked() {
        state.reload();
    }
    ui.add_space(8.0);
    ui.label(
        RichText::new(
            "The source data comes from RAIS (Relação Anual de Informações Sociais), \
             Ministério do Trabalho e Emprego.",
        )
        .small(),
    );
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Reload data").clicked() {
                state.reload();
                ui.close_menu();
            }
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        if let Some(datasets) = state.datasets() {
            ui.label(format!(
                "{}/{} datasets loaded from {}",
                datasets.len(),
                DatasetKey::ALL.len(),
                state.registry.data_dir().display()
            ));
        }

        ui.separator();

        match &state.status {
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Status::Info(msg)) => {
                ui.label(msg);
            }
            None => {}
        }
    });
}
