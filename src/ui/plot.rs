use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use eframe::egui::{self, Align2, Color32, FontId, RichText, ScrollArea, Sense, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Text};

use kfantrix::cooccurrence::CooccurrenceMatrix;
use kfantrix::data::model::Keywords;
use kfantrix::format;
use kfantrix::metrics::{ChannelColumn, GroupAggregate, RadarProfile, RankedValue, TierIntegrity, RADAR_AXES};
use kfantrix::view::{
    CategoryData, ComparisonData, CooccurrenceData, KeywordData, MembersData, OverviewData,
    Section, TierBreakdown, VideoData, View,
};

use crate::color::{self, ColorMap};
use crate::state::{missing_notice, AppState};
use crate::ui::tables;

const BAR_ROW: f32 = 26.0;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the selected screen in the central panel.
pub fn render_view(ui: &mut Ui, state: &AppState) {
    let accent = state.accent();
    let title = match state.selected_group() {
        Some(group) => format!("{} · {}", group.display_name(), state.mode.label()),
        None => state.mode.label().to_string(),
    };
    ui.heading(RichText::new(title).color(accent));
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match &state.view {
            View::Overview(s) => section(ui, s, |ui, data| overview(ui, data, accent)),
            View::Comparison(s) => section(ui, s, |ui, data| comparison(ui, data, &state.color_map)),
            View::Categories(s) => section(ui, s, |ui, data| categories(ui, data, accent)),
            View::Table(s) => {
                section(ui, s, |ui, rows| tables::channel_table(ui, rows, &state.color_map))
            }
            View::GroupSummary(s) => section(ui, s, |ui, summary| {
                ui.columns(3, |cols: &mut [Ui]| {
                    metric_card(&mut cols[0], "Comments analysed", format::thousands(summary.total_comments), accent);
                    metric_card(&mut cols[1], "Videos", format::thousands(summary.total_videos), accent);
                    metric_card(&mut cols[2], "Unique authors", format::thousands(summary.unique_authors), accent);
                });
                ui.columns(2, |cols: &mut [Ui]| {
                    metric_card(&mut cols[0], "Loyal fan rate", format::percent(summary.loyal_fan_rate, 1), accent);
                    metric_card(&mut cols[1], "Super fan rate", format::percent(summary.super_fan_rate, 1), accent);
                });
            }),
            View::Languages(s) => section(ui, s, |ui, langs| {
                let entries = langs
                    .iter()
                    .map(|l| (l.language.clone(), l.comment_count as f64, accent))
                    .collect();
                hbar_chart(ui, "languages", entries);
                let rows: Vec<Vec<String>> = langs
                    .iter()
                    .map(|l| {
                        vec![
                            l.language.clone(),
                            format::thousands(l.comment_count),
                            format::percent(l.percentage, 1),
                        ]
                    })
                    .collect();
                tables::text_table(ui, "languages_table", &["Language", "Comments", "Share"], &rows);
            }),
            View::Members(data) => members(ui, data, accent),
            View::Cooccurrence(s) => section(ui, s, |ui, data| cooccurrence(ui, data, accent)),
            View::Keywords(data) => keywords(ui, data),
            View::LoyalFans(s) => section(ui, s, |ui, tiers| loyal_fans(ui, tiers, accent)),
            View::Videos(s) => section(ui, s, |ui, data| videos(ui, data, accent)),
            View::NoGroup => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Select a group dashboard in the side panel");
                });
            }
            View::Disabled(gate) => {
                ui.label(format!("The {gate:?} section is turned off for this group."));
            }
        });
}

/// Draw `body` for a ready section, or say why there is nothing to draw.
fn section<T>(ui: &mut Ui, section: &Section<T>, body: impl FnOnce(&mut Ui, &T)) {
    match section {
        Section::Ready(data) => body(ui, data),
        Section::Empty => {
            ui.label(RichText::new("No data matches the selected filters").italics());
        }
        Section::Missing(missing) => {
            ui.label(RichText::new(missing_notice(missing)).color(Color32::from_rgb(0xFF, 0x98, 0x00)));
        }
    }
}

fn metric_card(ui: &mut Ui, title: &str, value: String, accent: Color32) {
    ui.group(|ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(title);
            ui.heading(RichText::new(value).strong().color(accent));
        });
    });
}

fn column_value(column: ChannelColumn, value: f64) -> String {
    if column.is_rate() {
        format::percent(value, 2)
    } else {
        format::thousands(value.round() as u64)
    }
}

// ---------------------------------------------------------------------------
// Channel screens
// ---------------------------------------------------------------------------

fn overview(ui: &mut Ui, data: &OverviewData, accent: Color32) {
    let s = &data.summary;
    ui.columns(4, |cols: &mut [Ui]| {
        metric_card(&mut cols[0], "Artists", s.artists.to_string(), accent);
        metric_card(&mut cols[1], "Avg subscribers", format::millions(s.avg_subscribers, 2), accent);
        metric_card(&mut cols[2], "Avg views", format::thousands(s.avg_views.round() as u64), accent);
        metric_card(
            &mut cols[3],
            "Avg engagement",
            format::optional(s.avg_engagement, |v| format::percent(v, 2)),
            accent,
        );
    });
    ui.label(format!(
        "Average fandom activity: {}",
        format::optional(s.avg_fandom_activity, |v| format::percent(v, 2))
    ));
    ui.add_space(8.0);

    ui.columns(3, |cols: &mut [Ui]| {
        top_list(&mut cols[0], "Top engagement", &data.top_engagement, ChannelColumn::EngagementRate);
        top_list(&mut cols[1], "Top subscribers", &data.top_subscribers, ChannelColumn::Subscribers);
        top_list(&mut cols[2], "Top fandom activity", &data.top_fandom, ChannelColumn::FandomActivity);
    });

    if let Some(at) = data.collected_at {
        ui.add_space(8.0);
        ui.label(RichText::new(format!("Collected {}", at.format("%Y-%m-%d %H:%M"))).weak());
    }
}

fn top_list(ui: &mut Ui, title: &str, entries: &[RankedValue], column: ChannelColumn) {
    ui.strong(title);
    for (i, e) in entries.iter().enumerate() {
        ui.label(format!("{}. {}  {}", i + 1, e.label, column_value(column, e.value)));
    }
}

fn comparison(ui: &mut Ui, data: &ComparisonData, colors: &ColorMap) {
    ui.columns(2, |cols: &mut [Ui]| {
        for (i, bars) in data.bars.iter().enumerate() {
            let ui = &mut cols[i % 2];
            ui.strong(bars.column.label());
            let entries = bars
                .entries
                .iter()
                .map(|e| (e.label.clone(), e.value, colors.color_for(&e.label)))
                .collect();
            hbar_chart(ui, &format!("compare_{i}"), entries);
        }
    });
    ui.separator();
    ui.strong("Profile (relative to the strongest channel)");
    radar_chart(ui, &data.radar, colors);
}

fn categories(ui: &mut Ui, data: &CategoryData, accent: Color32) {
    let entries = |rows: &[GroupAggregate]| -> Vec<(String, f64, Color32)> {
        rows.iter()
            .filter_map(|g| g.value.map(|v| (format!("{} ({})", g.group, g.rows), v, accent)))
            .collect()
    };
    ui.strong("Mean subscribers");
    hbar_chart(ui, "category_subscribers", entries(&data.mean_subscribers));
    ui.strong("Mean engagement (%)");
    hbar_chart(ui, "category_engagement", entries(&data.mean_engagement));
}

// ---------------------------------------------------------------------------
// Group screens
// ---------------------------------------------------------------------------

fn members(ui: &mut Ui, data: &MembersData, accent: Color32) {
    ui.strong("Mentions per member");
    section(ui, &data.mentions, |ui, rows| {
        let entries = rows
            .iter()
            .map(|m| (m.member.clone(), m.mention_count as f64, accent))
            .collect();
        hbar_chart(ui, "member_mentions", entries);
    });
    ui.separator();
    ui.strong("Mentions by region");
    section(ui, &data.regional, |ui, regional| {
        let entries = regional
            .rows
            .iter()
            .take(kfantrix::view::CHART_LIMIT)
            .map(|r| (format!("{} · {}", r.member, r.region), r.mention_count as f64, accent))
            .collect();
        hbar_chart(ui, "region_mentions", entries);
    });
}

fn cooccurrence(ui: &mut Ui, data: &CooccurrenceData, accent: Color32) {
    heat_map(ui, &data.matrix, accent);
    if data.matrix.dropped() > 0 {
        ui.label(
            RichText::new(format!("{} pairs outside the member list were skipped", data.matrix.dropped()))
                .weak(),
        );
    }
    ui.separator();
    ui.strong("Most frequent pairs");
    let entries = data
        .top_pairs
        .iter()
        .map(|p| (p.label(), p.count as f64, accent))
        .collect();
    hbar_chart(ui, "top_pairs", entries);
}

fn keywords(ui: &mut Ui, data: &KeywordData) {
    fn cards<K: Keywords>(ui: &mut Ui, rows: &[K], title: impl Fn(&K) -> String) {
        for row in rows {
            let entries = row.keyword_entries();
            egui::CollapsingHeader::new(title(row))
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    if entries.is_empty() {
                        ui.label(RichText::new("no keywords").weak());
                    }
                    for (label, words) in entries {
                        ui.horizontal_wrapped(|ui: &mut Ui| {
                            ui.strong(label);
                            ui.label(words);
                        });
                    }
                });
        }
    }

    ui.strong("By member");
    section(ui, &data.members, |ui, rows| cards(ui, rows, |r| r.member.clone()));
    ui.separator();
    ui.strong("By region");
    section(ui, &data.regions, |ui, rows| cards(ui, rows, |r| r.region.clone()));
    ui.separator();
    ui.strong("By member and region");
    section(ui, &data.member_regions, |ui, rows| {
        cards(ui, rows, |r| format!("{} · {}", r.member, r.region))
    });
}

fn loyal_fans(ui: &mut Ui, tiers: &[TierBreakdown], accent: Color32) {
    let tier_colors = [
        Color32::from_gray(170),
        color::heat(0.35, accent),
        color::heat(0.7, accent),
        accent,
    ];
    let labels: Vec<String> = tiers.iter().map(|t| t.tier.member.clone()).collect();

    let charts: Vec<BarChart> = (0..4)
        .map(|k| {
            let bars = tiers
                .iter()
                .enumerate()
                .filter_map(|(i, t)| {
                    let (name, share) = t.share.as_ref()?.entries()[k];
                    Some(Bar::new(i as f64 + (k as f64 - 1.5) * 0.2, share).width(0.2).name(name))
                })
                .collect();
            BarChart::new(bars)
                .name(["Casual", "Regular", "Loyal", "Super"][k])
                .color(tier_colors[k])
        })
        .collect();

    Plot::new("loyal_fans")
        .height(260.0)
        .legend(Legend::default())
        .y_axis_label("% of mentions")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| label_at(&labels, mark.value))
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });

    for t in tiers {
        match &t.share {
            None => {
                ui.label(format!("{}: no mentions", t.tier.member));
            }
            Some(share) => {
                if let TierIntegrity::Mismatch { expected, actual } = share.integrity {
                    ui.label(
                        RichText::new(format!(
                            "{}: tiers add up to {actual} of {expected} mentions",
                            t.tier.member
                        ))
                        .color(Color32::from_rgb(0xFF, 0x98, 0x00)),
                    );
                }
            }
        }
    }

    let rows: Vec<Vec<String>> = tiers
        .iter()
        .map(|t| {
            vec![
                t.tier.member.clone(),
                format::thousands(t.total_mentions),
                format::thousands(t.tier.casual_fans),
                format::thousands(t.tier.regular_fans),
                format::thousands(t.tier.loyal_fans),
                format::thousands(t.tier.super_fans),
                format::percent(t.tier.loyal_rate, 1),
                format::percent(t.tier.super_fan_rate, 1),
            ]
        })
        .collect();
    tables::text_table(
        ui,
        "loyal_table",
        &["Member", "Mentions", "Casual", "Regular", "Loyal", "Super", "Loyal rate", "Super rate"],
        &rows,
    );
}

fn videos(ui: &mut Ui, data: &VideoData, accent: Color32) {
    ui.columns(2, |cols: &mut [Ui]| {
        metric_card(&mut cols[0], "Videos analysed", data.video_count.to_string(), accent);
        metric_card(
            &mut cols[1],
            "Avg engagement",
            format::optional(data.avg_engagement, |v| format::percent(v, 2)),
            accent,
        );
    });
    let entries = data
        .top
        .iter()
        .filter_map(|v| v.engagement().map(|e| (v.title.clone(), e, accent)))
        .collect();
    hbar_chart(ui, "videos", entries);

    let rows: Vec<Vec<String>> = data
        .top
        .iter()
        .map(|v| {
            vec![
                v.title.clone(),
                format::optional(v.published_at, |d| d.to_string()),
                format::thousands(v.views),
                format::thousands(v.likes),
                format::thousands(v.comments),
                format::optional(v.engagement(), |e| format::percent(e, 2)),
            ]
        })
        .collect();
    tables::text_table(
        ui,
        "videos_table",
        &["Title", "Published", "Views", "Likes", "Comments", "Engagement"],
        &rows,
    );
}

// ---------------------------------------------------------------------------
// Chart primitives
// ---------------------------------------------------------------------------

fn label_at(labels: &[String], value: f64) -> String {
    let i = value.round();
    if (value - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

/// Horizontal bars, the first entry on top.
fn hbar_chart(ui: &mut Ui, id: &str, entries: Vec<(String, f64, Color32)>) {
    if entries.is_empty() {
        return;
    }
    let n = entries.len();
    // Bars are laid out bottom-up; index 0 of `labels` is the lowest bar.
    let labels: Vec<String> = entries.iter().rev().map(|(l, _, _)| l.clone()).collect();
    let bars: Vec<Bar> = entries
        .into_iter()
        .enumerate()
        .map(|(i, (label, value, fill))| {
            Bar::new((n - 1 - i) as f64, value)
                .name(label)
                .fill(fill)
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .height(BAR_ROW * n as f32 + 40.0)
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| label_at(&labels, mark.value))
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

fn polar(axis: usize, radius: f64) -> [f64; 2] {
    let angle = FRAC_PI_2 - axis as f64 * TAU / RADAR_AXES.len() as f64;
    [radius * angle.cos(), radius * angle.sin()]
}

/// One closed polygon per artist over the four normalized axes.
fn radar_chart(ui: &mut Ui, profiles: &[RadarProfile], colors: &ColorMap) {
    Plot::new("radar")
        .height(360.0)
        .data_aspect(1.0)
        .legend(Legend::default())
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for ring in [0.25, 0.5, 0.75, 1.0] {
                let points: PlotPoints = (0..=RADAR_AXES.len()).map(|k| polar(k, ring)).collect();
                plot_ui.line(Line::new(points).color(Color32::from_gray(90)).width(0.5));
            }
            for (k, column) in RADAR_AXES.iter().enumerate() {
                let spoke: PlotPoints = vec![[0.0, 0.0], polar(k, 1.0)].into();
                plot_ui.line(Line::new(spoke).color(Color32::from_gray(90)).width(0.5));
                let [x, y] = polar(k, 1.15);
                plot_ui.text(Text::new(PlotPoint::new(x, y), column.label()));
            }
            for profile in profiles {
                let points: PlotPoints = (0..=RADAR_AXES.len())
                    .map(|k| polar(k, profile.scores[k % RADAR_AXES.len()].unwrap_or(0.0)))
                    .collect();
                plot_ui.line(
                    Line::new(points)
                        .name(&profile.artist)
                        .color(colors.color_for(&profile.artist))
                        .width(2.0),
                );
            }
        });
}

/// Member × member grid, cell shade proportional to the count.
fn heat_map(ui: &mut Ui, matrix: &CooccurrenceMatrix, accent: Color32) {
    let max = matrix.max_count().max(1) as f32;
    let cell = egui::vec2(56.0, 26.0);

    egui::Grid::new("cooccurrence_grid")
        .spacing([2.0, 2.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for m in matrix.members() {
                ui.strong(m);
            }
            ui.end_row();

            for (i, a) in matrix.members().iter().enumerate() {
                ui.strong(a);
                for (j, &count) in matrix.row(i).iter().enumerate() {
                    let t = count as f32 / max;
                    let fill = color::heat(t, accent);
                    let (rect, response) = ui.allocate_exact_size(cell, Sense::hover());
                    ui.painter().rect_filled(rect, 2.0, fill);
                    let text_color = if t > 0.5 { Color32::WHITE } else { Color32::BLACK };
                    ui.painter().text(
                        rect.center(),
                        Align2::CENTER_CENTER,
                        format::thousands(count),
                        FontId::proportional(13.0),
                        text_color,
                    );
                    response.on_hover_text(format!("{a} & {}: {count}", matrix.members()[j]));
                }
                ui.end_row();
            }
        });
}
