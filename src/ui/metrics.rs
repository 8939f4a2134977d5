use eframe::egui::{self, Color32, RichText, Ui};

use crate::color::{DECLINE_COLOR, GROWTH_COLOR};
use crate::data::TimeTable;
use crate::data::analysis::summary;

use super::format_count;

const NEUTRAL_COLOR: Color32 = Color32::from_gray(140);

// ---------------------------------------------------------------------------
// Summary metric cards
// ---------------------------------------------------------------------------

/// Four cards: last total, first total, change between them and the leader.
pub fn metric_cards(ui: &mut Ui, table: &TimeTable, localities: &[String]) {
    let summary = match summary(table, localities) {
        Ok(Some(s)) => s,
        Ok(None) => return,
        Err(e) => {
            ui.colored_label(Color32::RED, e.to_string());
            return;
        }
    };

    let change_color = if summary.change_pct >= 0.0 {
        GROWTH_COLOR
    } else {
        DECLINE_COLOR
    };
    let change = format!("{:+.1}%", summary.change_pct);
    let (leader, leader_value) = match &summary.leader {
        Some((name, value)) => (name.clone(), Some(format_count(*value))),
        None => ("–".to_string(), None),
    };

    ui.columns(4, |cols| {
        card(
            &mut cols[0],
            &format!("Total ({})", summary.last_period),
            &format_count(summary.total_end),
            None,
        );
        card(
            &mut cols[1],
            &format!("Total ({})", summary.first_period),
            &format_count(summary.total_start),
            None,
        );
        card(
            &mut cols[2],
            &format!("Change {}→{}", summary.first_period, summary.last_period),
            &change,
            Some((change.clone(), change_color)),
        );
        card(
            &mut cols[3],
            &format!("Leader ({})", summary.last_period),
            &leader,
            leader_value.map(|v| (v, NEUTRAL_COLOR)),
        );
    });
}

fn card(ui: &mut Ui, label: &str, value: &str, delta: Option<(String, Color32)>) {
    egui::Frame::group(ui.style())
        .fill(ui.visuals().faint_bg_color)
        .show(ui, |ui: &mut Ui| {
            ui.set_min_width(ui.available_width());
            ui.label(RichText::new(label).small());
            ui.label(RichText::new(value).size(22.0).strong());
            if let Some((text, color)) = delta {
                ui.label(RichText::new(text).color(color));
            }
        });
}
