use std::fs::File;
use std::io::BufWriter;

use eframe::egui::{self, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::export::{PERIOD_HEADER, export_file_name, write_csv};
use crate::data::{DataError, LabeledTable};
use crate::state::{Status, describe};

use super::format_count;

// ---------------------------------------------------------------------------
// Raw data table with CSV export
// ---------------------------------------------------------------------------

/// Collapsible table of the selected localities. Returns a status when the
/// user saved (or failed to save) a CSV file.
pub fn raw_table(ui: &mut Ui, dataset: &LabeledTable, localities: &[String]) -> Option<Status> {
    let mut status = None;
    egui::CollapsingHeader::new("Raw data")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.button("Save CSV…").clicked() {
                status = save_csv_dialog(dataset, localities);
            }

            let table = &dataset.table;
            let cols: Vec<usize> = localities
                .iter()
                .filter_map(|name| table.entity_index(name).ok())
                .collect();

            ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
                TableBuilder::new(ui)
                    .striped(true)
                    .max_scroll_height(400.0)
                    .column(Column::auto().at_least(50.0))
                    .columns(Column::auto().at_least(80.0), cols.len())
                    .header(22.0, |mut header| {
                        header.col(|ui: &mut Ui| {
                            ui.strong(PERIOD_HEADER);
                        });
                        for &c in &cols {
                            header.col(|ui: &mut Ui| {
                                ui.strong(&table.entities()[c]);
                            });
                        }
                    })
                    .body(|mut body| {
                        for (row, period) in table.periods().iter().enumerate() {
                            body.row(20.0, |mut cells| {
                                cells.col(|ui: &mut Ui| {
                                    ui.label(period);
                                });
                                for &c in &cols {
                                    cells.col(|ui: &mut Ui| {
                                        let text = table
                                            .value_at(row, c)
                                            .map_or_else(String::new, format_count);
                                        ui.label(text);
                                    });
                                }
                            });
                        }
                    });
            });
        });
    status
}

fn save_csv_dialog(dataset: &LabeledTable, localities: &[String]) -> Option<Status> {
    let path = rfd::FileDialog::new()
        .set_title("Save raw data")
        .set_file_name(export_file_name(dataset.key))
        .add_filter("CSV", &["csv"])
        .save_file()?;

    let result = File::create(&path)
        .map_err(DataError::from)
        .and_then(|file| write_csv(&dataset.table, localities, BufWriter::new(file)));
    match result {
        Ok(()) => {
            log::info!("Exported {} to {}", dataset.key, path.display());
            Some(Status::Info(format!("Saved {}", path.display())))
        }
        Err(e) => {
            let message = describe(&e);
            log::error!("Failed to export CSV: {message}");
            Some(Status::Error(format!("Error: {message}")))
        }
    }
}
