use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – dashboard, screen and filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new("KFANTRIX").strong().color(state.accent()));
        ui.label("K-pop channel analytics");
    });
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            dashboard_picker(ui, state);
            ui.separator();

            ui.strong("View");
            for mode in state.available_modes() {
                if ui.selectable_label(state.mode == mode, mode.label()).clicked() {
                    state.set_mode(mode);
                }
            }
            ui.separator();

            if state.filters.group.is_some() {
                group_filters(ui, state);
            } else {
                channel_filters(ui, state);
            }
            ui.separator();

            data_info(ui, state);
            ui.separator();
            service_tiers(ui);
        });

    // Rebuild the view after any selection changes.
    state.refresh();
}

fn dashboard_picker(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Dashboard");
    let current = state
        .selected_group()
        .map(|g| g.display_name().to_string())
        .unwrap_or_else(|| "All channels".to_string());

    let groups: Vec<(String, String)> = state
        .config
        .groups
        .iter()
        .map(|g| (g.prefix.clone(), g.display_name().to_string()))
        .collect();

    egui::ComboBox::from_id_salt("dashboard")
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            if ui
                .selectable_label(state.filters.group.is_none(), "All channels")
                .clicked()
            {
                state.set_group(None);
            }
            for (prefix, name) in &groups {
                let selected = state.filters.group.as_deref() == Some(prefix.as_str());
                if ui.selectable_label(selected, name).clicked() {
                    state.set_group(Some(prefix.clone()));
                }
            }
        });
}

fn channel_filters(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");

    let artists = state.artists.clone();
    let n_selected = state.filters.channels.artists.len();
    egui::CollapsingHeader::new(RichText::new(format!("Artists  ({n_selected}/{})", artists.len())).strong())
        .id_salt("artists")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_artists();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_artists();
                }
            });
            for artist in &artists {
                let mut checked = state.filters.channels.artists.contains(artist);
                let text = RichText::new(artist).color(state.color_map.color_for(artist));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_artist(artist);
                }
            }
        });

    let categories = state.categories.clone();
    let n_selected = state.filters.channels.categories.len();
    egui::CollapsingHeader::new(
        RichText::new(format!("Categories  ({n_selected}/{})", categories.len())).strong(),
    )
    .id_salt("categories")
    .default_open(false)
    .show(ui, |ui: &mut Ui| {
        ui.horizontal(|ui: &mut Ui| {
            if ui.small_button("All").clicked() {
                state.select_all_categories();
            }
            if ui.small_button("None").clicked() {
                state.select_no_categories();
            }
        });
        for category in &categories {
            let mut checked = state.filters.channels.categories.contains(category);
            if ui.checkbox(&mut checked, category).changed() {
                state.toggle_category(category);
            }
        }
    });
}

fn group_filters(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");

    let members = state.choices.members.clone();
    let current = state.filters.member.clone();
    ui.label("Member");
    egui::ComboBox::from_id_salt("member")
        .selected_text(current.as_deref().unwrap_or("All members"))
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), "All members").clicked() {
                state.set_member(None);
            }
            for m in &members {
                if ui
                    .selectable_label(current.as_deref() == Some(m.as_str()), m)
                    .clicked()
                {
                    state.set_member(Some(m.clone()));
                }
            }
        });

    let regions = state.choices.regions.clone();
    let current = state.filters.region.clone();
    ui.label("Region");
    egui::ComboBox::from_id_salt("region")
        .selected_text(current.as_deref().unwrap_or("All regions"))
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(current.is_none(), "All regions").clicked() {
                state.set_region(None);
            }
            for r in &regions {
                if ui
                    .selectable_label(current.as_deref() == Some(r.as_str()), r)
                    .clicked()
                {
                    state.set_region(Some(r.clone()));
                }
            }
        });
}

fn data_info(ui: &mut Ui, state: &AppState) {
    ui.strong("Data");
    ui.label(format!("Artists analysed: {}", state.artists.len()));
    ui.label(format!("Directory: {}", state.cache.data_dir().display()));
    ui.label(format!("Tables cached: {}", state.cache.len()));
}

const PLANS: [(&str, &str, &[&str]); 3] = [
    (
        "Basic",
        "₩0 / month",
        &["Core channel metrics", "Artist rankings", "Monthly updates"],
    ),
    (
        "Pro",
        "₩290,000 / month",
        &[
            "Detailed engagement analysis",
            "Artist comparison",
            "Weekly updates",
            "CSV download",
        ],
    ),
    (
        "Enterprise",
        "Contact us",
        &["Fandom analysis by country", "Sentiment analysis", "API access", "Custom reports"],
    ),
];

fn service_tiers(ui: &mut Ui) {
    egui::CollapsingHeader::new(RichText::new("Plans").strong())
        .id_salt("plans")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for (name, price, features) in PLANS {
                ui.strong(name);
                for f in features {
                    ui.label(format!("• {f}"));
                }
                ui.label(RichText::new(price).italics());
                ui.add_space(4.0);
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
            if ui.button("Export CSV…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload data").clicked() {
                state.reload();
                state.refresh();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.label(format!(
            "{} artists loaded, {} selected",
            state.artists.len(),
            state.filters.channels.artists.len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Export dialog
// ---------------------------------------------------------------------------

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export CSV")
        .set_file_name(state.export_file_name())
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_current(&path) {
            Ok(bytes) => {
                state.status_message = None;
                log::info!("Exported {bytes} bytes to {}", path.display());
            }
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}
