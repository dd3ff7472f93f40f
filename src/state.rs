use std::path::Path;

use anyhow::{Context, Result};
use kfantrix::config::{DashboardConfig, GroupConfig};
use kfantrix::data::filter::unique_in_order;
use kfantrix::data::{AnalysisKind, ChannelFilter, DashboardFilter, MissingSource, TableCache};
use kfantrix::export;
use kfantrix::view::{channel_table, GroupChoices, Section, View, ViewMode};

use crate::color::{self, ColorMap};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded tables, shared by every view.
    pub cache: TableCache,

    /// Side panel selections.
    pub filters: DashboardFilter,

    /// Selected screen.
    pub mode: ViewMode,

    /// The screen built for the current selections. Rebuilt only after an
    /// interaction changes something.
    pub view: View,

    /// Members and regions of the selected group.
    pub choices: GroupChoices,

    /// All artists and categories of the channel table, in file order.
    pub artists: Vec<String>,
    pub categories: Vec<String>,

    /// Colour per artist, stable across filters.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    dirty: bool,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let cache = TableCache::new(config.data_dir.clone());
        let mut state = Self {
            config,
            cache,
            filters: DashboardFilter::default(),
            mode: ViewMode::default(),
            view: View::NoGroup,
            choices: GroupChoices::default(),
            artists: Vec::new(),
            categories: Vec::new(),
            color_map: ColorMap::default(),
            status_message: None,
            dirty: true,
        };
        state.init_channel_filter();
        state.refresh();
        state
    }

    /// Select every artist and category of the (re)loaded channel table.
    fn init_channel_filter(&mut self) {
        match channel_table(&mut self.cache) {
            Ok(rows) => {
                self.filters.channels = ChannelFilter::all(&rows);
                self.artists = owned(unique_in_order(rows.as_slice(), |r| r.artist.as_str()));
                self.categories = owned(unique_in_order(rows.as_slice(), |r| r.category.as_str()));
                self.color_map = ColorMap::new(self.artists.iter().map(String::as_str));
                log::info!(
                    "Loaded {} channels in {} categories",
                    rows.len(),
                    self.categories.len()
                );
            }
            Err(missing) => {
                self.filters.channels = ChannelFilter::default();
                self.artists.clear();
                self.categories.clear();
                self.status_message = Some(missing_notice(&missing));
            }
        }
    }

    /// Rebuild the current view if an interaction changed anything.
    pub fn refresh(&mut self) {
        if !self.dirty {
            return;
        }
        self.view = View::build(self.mode, &mut self.cache, &self.config, &self.filters);
        self.dirty = false;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn selected_group(&self) -> Option<&GroupConfig> {
        self.filters
            .group
            .as_deref()
            .and_then(|prefix| self.config.group(prefix))
    }

    /// Screens offered in the side panel for the current dashboard.
    pub fn available_modes(&self) -> Vec<ViewMode> {
        match self.selected_group() {
            Some(group) => ViewMode::enabled_for(group),
            None => ViewMode::CHANNEL.to_vec(),
        }
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.mode != mode {
            self.mode = mode;
            self.mark_dirty();
        }
    }

    /// Switch between the channel dashboard (`None`) and a group dashboard.
    pub fn set_group(&mut self, prefix: Option<String>) {
        if self.filters.group == prefix {
            return;
        }
        self.filters.set_group(prefix);
        self.choices = match self.selected_group().cloned() {
            Some(group) => GroupChoices::load(&mut self.cache, &group),
            None => GroupChoices::default(),
        };
        let modes = self.available_modes();
        if !modes.contains(&self.mode) {
            self.mode = modes.first().copied().unwrap_or_default();
        }
        self.mark_dirty();
    }

    pub fn set_member(&mut self, member: Option<String>) {
        if self.filters.member != member {
            self.filters.member = member;
            self.mark_dirty();
        }
    }

    pub fn set_region(&mut self, region: Option<String>) {
        if self.filters.region != region {
            self.filters.region = region;
            self.mark_dirty();
        }
    }

    pub fn toggle_artist(&mut self, artist: &str) {
        self.filters.channels.toggle_artist(artist);
        self.mark_dirty();
    }

    pub fn toggle_category(&mut self, category: &str) {
        self.filters.channels.toggle_category(category);
        self.mark_dirty();
    }

    pub fn select_all_artists(&mut self) {
        self.filters.channels.artists = self.artists.iter().cloned().collect();
        self.mark_dirty();
    }

    pub fn select_no_artists(&mut self) {
        self.filters.channels.artists.clear();
        self.mark_dirty();
    }

    pub fn select_all_categories(&mut self) {
        self.filters.channels.categories = self.categories.iter().cloned().collect();
        self.mark_dirty();
    }

    pub fn select_no_categories(&mut self) {
        self.filters.channels.categories.clear();
        self.mark_dirty();
    }

    /// Drop every cached table and read the files again.
    pub fn reload(&mut self) {
        self.cache.clear();
        self.status_message = None;
        self.init_channel_filter();
        self.choices = match self.selected_group().cloned() {
            Some(group) => GroupChoices::load(&mut self.cache, &group),
            None => GroupChoices::default(),
        };
        self.mark_dirty();
    }

    /// Accent colour of the current dashboard variant.
    pub fn accent(&self) -> eframe::egui::Color32 {
        match self.selected_group() {
            Some(group) => color::accent(group.accent()),
            None => color::accent(&self.config.accent),
        }
    }

    /// Suggested file name for exporting what is on screen.
    pub fn export_file_name(&self) -> String {
        let stem = match (self.filters.group.as_deref(), export_kind(self.mode)) {
            (Some(prefix), Some(kind)) => format!("kfantrix_{prefix}_{}", kind.suffix()),
            _ => "kfantrix_data".to_string(),
        };
        export::export_file_name(&stem, chrono::Local::now().date_naive())
    }

    /// Write the table behind the current screen to `path`.
    pub fn export_current(&mut self, path: &Path) -> Result<usize> {
        let written = match &self.view {
            View::Overview(_) | View::Comparison(_) | View::Categories(_) | View::Table(_) => {
                let rows = channel_table(&mut self.cache).context("channel table not loaded")?;
                let selected = self.filters.channels.apply(&rows);
                if selected.is_empty() {
                    anyhow::bail!("no rows match the selected filters");
                }
                export::write_export(path, selected.rows().iter().copied())?
            }
            View::Languages(Section::Ready(rows)) => export::write_export(path, rows)?,
            View::Members(data) => match &data.mentions {
                Section::Ready(rows) => export::write_export(path, rows)?,
                _ => anyhow::bail!("nothing to export"),
            },
            View::LoyalFans(Section::Ready(tiers)) => {
                export::write_export(path, tiers.iter().map(|t| &t.tier))?
            }
            View::Videos(Section::Ready(data)) => export::write_export(path, &data.top)?,
            View::Cooccurrence(Section::Ready(data)) => export::write_export(path, &data.top_pairs)?,
            _ => anyhow::bail!("nothing to export on this screen"),
        };
        Ok(written)
    }
}

fn export_kind(mode: ViewMode) -> Option<AnalysisKind> {
    match mode {
        ViewMode::Languages => Some(AnalysisKind::LanguageStats),
        ViewMode::Members => Some(AnalysisKind::MemberStats),
        ViewMode::LoyalFans => Some(AnalysisKind::LoyalFans),
        ViewMode::Videos => Some(AnalysisKind::VideoEngagement),
        ViewMode::Cooccurrence => Some(AnalysisKind::MemberCooccurrence),
        _ => None,
    }
}

pub fn missing_notice(missing: &MissingSource) -> String {
    if missing.is_not_found() {
        format!("⚠ {} not found.", missing.id)
    } else {
        format!("⚠ {} could not be read ({}).", missing.id, missing.reason)
    }
}

fn owned(values: Vec<&str>) -> Vec<String> {
    values.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kfantrix::data::SourceId;
    use tempfile::TempDir;

    const CHANNELS: &str = "\
artist,category,subscribers,total_views,video_count,avg_views,avg_likes,avg_comments,engagement_rate
BLACKPINK,Girl Group,3810000,190000000,300,632147,40000,2000,6.64
NewJeans,Girl Group,1120000,24000000,120,200592,15000,1500,8.23
IU,Solo,9800000,50000000,200,400000,30000,1000,7.75
";

    fn state_in(dir: &TempDir) -> AppState {
        let config = DashboardConfig {
            data_dir: dir.path().to_path_buf(),
            groups: vec![GroupConfig::new("bts")],
            ..DashboardConfig::default()
        };
        AppState::new(config)
    }

    #[test]
    fn starts_with_every_artist_selected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("channels_data.csv"), CHANNELS).unwrap();
        let state = state_in(&dir);

        assert_eq!(state.artists, vec!["BLACKPINK", "NewJeans", "IU"]);
        assert_eq!(state.categories, vec!["Girl Group", "Solo"]);
        assert_eq!(state.filters.channels.artists.len(), 3);
        let View::Overview(Section::Ready(data)) = &state.view else {
            panic!("expected overview, got {:?}", state.view);
        };
        assert_eq!(data.summary.artists, 3);
    }

    #[test]
    fn missing_channels_file_sets_status() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        assert!(state.artists.is_empty());
        let msg = state.status_message.as_deref().unwrap();
        assert!(msg.contains("channels_data.csv"));
        assert!(matches!(state.view, View::Overview(Section::Missing(_))));
    }

    #[test]
    fn view_is_rebuilt_only_on_refresh() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("channels_data.csv"), CHANNELS).unwrap();
        let mut state = state_in(&dir);

        state.select_no_categories();
        assert!(matches!(state.view, View::Overview(Section::Ready(_))));
        state.refresh();
        assert!(matches!(state.view, View::Overview(Section::Empty)));
    }

    #[test]
    fn switching_to_a_group_picks_a_group_screen() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);

        state.set_group(Some("bts".into()));
        assert_eq!(state.mode, ViewMode::GroupSummary);
        assert_eq!(state.available_modes(), ViewMode::GROUP.to_vec());
        state.refresh();
        match &state.view {
            View::GroupSummary(Section::Missing(m)) => {
                assert_eq!(m.id, SourceId::group("bts", AnalysisKind::Summary));
            }
            other => panic!("unexpected {other:?}"),
        }

        state.set_group(None);
        assert_eq!(state.mode, ViewMode::Overview);
    }

    #[test]
    fn reload_picks_up_new_files() {
        let dir = TempDir::new().unwrap();
        let mut state = state_in(&dir);
        assert!(state.artists.is_empty());

        std::fs::write(dir.path().join("channels_data.csv"), CHANNELS).unwrap();
        state.reload();
        state.refresh();
        assert_eq!(state.artists.len(), 3);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn exports_filtered_channels() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("channels_data.csv"), CHANNELS).unwrap();
        let mut state = state_in(&dir);
        state.toggle_category("Solo");
        state.refresh();

        let out = dir.path().join("export.csv");
        let bytes = state.export_current(&out).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(bytes, text.len());
        assert!(text.starts_with('\u{feff}'));
        assert!(text.contains("NewJeans"));
        assert!(!text.contains("IU,"));

        assert!(state.export_file_name().starts_with("kfantrix_data_"));

        state.select_no_artists();
        state.refresh();
        let empty = dir.path().join("empty.csv");
        let err = state.export_current(&empty).unwrap_err();
        assert!(err.to_string().contains("no rows match"));
        assert!(!empty.exists());

        state.set_group(Some("bts".into()));
        state.set_mode(ViewMode::Languages);
        assert!(state
            .export_file_name()
            .starts_with("kfantrix_bts_language_stats_"));
    }
}
