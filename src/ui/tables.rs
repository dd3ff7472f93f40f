use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use kfantrix::data::model::ChannelRecord;
use kfantrix::format;

use crate::color::ColorMap;

const ROW_HEIGHT: f32 = 18.0;
const HEADER_HEIGHT: f32 = 20.0;

/// Full channel detail table, one row per filtered channel.
pub fn channel_table(ui: &mut Ui, rows: &[ChannelRecord], colors: &ColorMap) {
    let headers = [
        "Artist",
        "Category",
        "Subscribers",
        "Total views",
        "Videos",
        "Avg views",
        "Avg likes",
        "Avg comments",
        "Engagement",
        "Fandom activity",
    ];

    TableBuilder::new(ui)
        .id_salt("channel_table")
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(100.0))
        .column(Column::auto().at_least(80.0))
        .columns(Column::auto().at_least(70.0), headers.len() - 2)
        .header(HEADER_HEIGHT, |mut header| {
            for h in headers {
                header.col(|ui: &mut Ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let r = &rows[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.label(RichText::new(&r.artist).color(colors.color_for(&r.artist)));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(&r.category);
                });
                let counts = [
                    r.subscribers,
                    r.total_views,
                    r.video_count,
                    r.avg_views,
                    r.avg_likes,
                    r.avg_comments,
                ];
                for n in counts {
                    row.col(|ui: &mut Ui| {
                        ui.label(format::thousands(n));
                    });
                }
                row.col(|ui: &mut Ui| {
                    ui.label(format::optional(r.engagement(), |v| format::percent(v, 2)));
                });
                row.col(|ui: &mut Ui| {
                    ui.label(format::optional(r.fandom_activity(), |v| format::percent(v, 2)));
                });
            });
        });
}

/// Plain text table for the smaller group files.
pub fn text_table(ui: &mut Ui, id: &str, headers: &[&str], rows: &[Vec<String>]) {
    if headers.is_empty() {
        return;
    }
    TableBuilder::new(ui)
        .id_salt(id)
        .striped(true)
        .resizable(true)
        .vscroll(false)
        .columns(Column::auto().at_least(60.0), headers.len())
        .header(HEADER_HEIGHT, |mut header| {
            for h in headers {
                header.col(|ui: &mut Ui| {
                    ui.strong(*h);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let cells = &rows[row.index()];
                for i in 0..headers.len() {
                    row.col(|ui: &mut Ui| {
                        ui.label(cells.get(i).map(String::as_str).unwrap_or(""));
                    });
                }
            });
        });
}
