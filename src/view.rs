//! Screen selection and the data each screen needs.
//!
//! Every interaction picks one [`ViewMode`] and calls [`View::build`], which
//! pulls the tables it needs from the cache, applies the current filter and
//! returns a variant holding only that screen's data.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::config::{DashboardConfig, GroupConfig, GroupSection};
use crate::cooccurrence::{member_order, CooccurrenceMatrix};
use crate::data::filter::{filter_rows, unique_in_order, DashboardFilter, Selection};
use crate::data::model::{
    AnalysisSummary, ChannelRecord, CooccurrencePair, LanguageStat, LoyalFanTier, MemberKeyword,
    MemberMention, MemberRegionKeyword, Record, RegionKeyword, RegionMember, VideoEngagement,
};
use crate::data::{AnalysisKind, MissingSource, SourceId, TableCache};
use crate::metrics::{
    self, category_aggregate, fan_tier_share, rank_channels, top_n, Aggregate, ChannelColumn,
    ChannelSummary, FanTierShare, GroupAggregate, RadarProfile, RadarScale, RankedValue,
};

/// Length of chart lists (languages, pairs, videos).
pub const CHART_LIMIT: usize = 10;

/// Metrics shown side by side on the comparison screen.
pub const COMPARISON_COLUMNS: [ChannelColumn; 4] = [
    ChannelColumn::Subscribers,
    ChannelColumn::AvgViews,
    ChannelColumn::EngagementRate,
    ChannelColumn::FandomActivity,
];

// ---------------------------------------------------------------------------
// ViewMode – what the user picked
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ViewMode {
    #[default]
    Overview,
    Comparison,
    Categories,
    Table,
    GroupSummary,
    Languages,
    Members,
    Cooccurrence,
    Keywords,
    LoyalFans,
    Videos,
}

impl ViewMode {
    pub const CHANNEL: [ViewMode; 4] = [
        ViewMode::Overview,
        ViewMode::Comparison,
        ViewMode::Categories,
        ViewMode::Table,
    ];

    pub const GROUP: [ViewMode; 7] = [
        ViewMode::GroupSummary,
        ViewMode::Languages,
        ViewMode::Members,
        ViewMode::Cooccurrence,
        ViewMode::Keywords,
        ViewMode::LoyalFans,
        ViewMode::Videos,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Overview => "Overview",
            ViewMode::Comparison => "Artist comparison",
            ViewMode::Categories => "Categories",
            ViewMode::Table => "Detail table",
            ViewMode::GroupSummary => "Fandom summary",
            ViewMode::Languages => "Languages",
            ViewMode::Members => "Member mentions",
            ViewMode::Cooccurrence => "Member pairs",
            ViewMode::Keywords => "Keywords",
            ViewMode::LoyalFans => "Loyal fans",
            ViewMode::Videos => "Video engagement",
        }
    }

    /// The config section that gates a group screen.
    pub fn group_section(self) -> Option<GroupSection> {
        match self {
            ViewMode::Overview | ViewMode::Comparison | ViewMode::Categories | ViewMode::Table => {
                None
            }
            ViewMode::GroupSummary => Some(GroupSection::Summary),
            ViewMode::Languages => Some(GroupSection::Languages),
            ViewMode::Members => Some(GroupSection::Members),
            ViewMode::Cooccurrence => Some(GroupSection::Cooccurrence),
            ViewMode::Keywords => Some(GroupSection::Keywords),
            ViewMode::LoyalFans => Some(GroupSection::LoyalFans),
            ViewMode::Videos => Some(GroupSection::Videos),
        }
    }

    /// Group screens the given group enables, in menu order.
    pub fn enabled_for(group: &GroupConfig) -> Vec<ViewMode> {
        ViewMode::GROUP
            .into_iter()
            .filter(|m| m.group_section().is_some_and(|s| group.enables(s)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Section – one file's worth of a screen
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    /// The file was absent or unusable.
    Missing(MissingSource),
    /// The file loaded but nothing matches the current selection.
    Empty,
    Ready(T),
}

impl<T> Section<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Section::Missing(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Section::Empty)
    }
}

/// Load `source` and shape it. An empty table, or `build` returning `None`,
/// is an empty selection; `build` is never called with zero rows.
fn section<R: Record, T>(
    cache: &mut TableCache,
    source: &SourceId,
    build: impl FnOnce(&[R]) -> Option<T>,
) -> Section<T> {
    match cache.get::<R>(source) {
        Err(missing) => Section::Missing(missing),
        Ok(rows) if rows.is_empty() => Section::Empty,
        Ok(rows) => build(rows.as_slice()).map_or(Section::Empty, Section::Ready),
    }
}

fn non_empty<T>(v: Vec<T>) -> Option<Vec<T>> {
    (!v.is_empty()).then_some(v)
}

fn owned<T: Clone>(selection: Selection<'_, T>) -> Option<Vec<T>> {
    match selection {
        Selection::Empty => None,
        Selection::Rows(rows) => Some(rows.into_iter().cloned().collect()),
    }
}

// ---------------------------------------------------------------------------
// Per-screen data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewData {
    pub summary: ChannelSummary,
    pub top_engagement: Vec<RankedValue>,
    pub top_subscribers: Vec<RankedValue>,
    pub top_fandom: Vec<RankedValue>,
    pub collected_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricBars {
    pub column: ChannelColumn,
    /// Descending by value.
    pub entries: Vec<RankedValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonData {
    pub bars: Vec<MetricBars>,
    /// Normalized against the full channel table.
    pub radar: Vec<RadarProfile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryData {
    pub mean_subscribers: Vec<GroupAggregate>,
    pub mean_engagement: Vec<GroupAggregate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionalMentions {
    pub rows: Vec<RegionMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MembersData {
    pub mentions: Section<Vec<MemberMention>>,
    pub regional: Section<RegionalMentions>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CooccurrenceData {
    pub matrix: CooccurrenceMatrix,
    pub top_pairs: Vec<CooccurrencePair>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordData {
    pub members: Section<Vec<MemberKeyword>>,
    pub regions: Section<Vec<RegionKeyword>>,
    pub member_regions: Section<Vec<MemberRegionKeyword>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierBreakdown {
    pub tier: LoyalFanTier,
    pub total_mentions: u64,
    pub share: Option<FanTierShare>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoData {
    pub top: Vec<VideoEngagement>,
    pub avg_engagement: Option<f64>,
    pub video_count: usize,
}

// ---------------------------------------------------------------------------
// View – the built screen
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Overview(Section<OverviewData>),
    Comparison(Section<ComparisonData>),
    Categories(Section<CategoryData>),
    Table(Section<Vec<ChannelRecord>>),
    GroupSummary(Section<AnalysisSummary>),
    Languages(Section<Vec<LanguageStat>>),
    Members(MembersData),
    Cooccurrence(Section<CooccurrenceData>),
    Keywords(KeywordData),
    LoyalFans(Section<Vec<TierBreakdown>>),
    Videos(Section<VideoData>),
    /// A group screen was requested without a group selected.
    NoGroup,
    /// The selected group does not enable this screen.
    Disabled(GroupSection),
}

impl View {
    pub fn build(
        mode: ViewMode,
        cache: &mut TableCache,
        config: &DashboardConfig,
        filter: &DashboardFilter,
    ) -> View {
        let Some(gate) = mode.group_section() else {
            return build_channel_view(mode, cache, config, filter);
        };
        let Some(group) = filter.group.as_deref() else {
            return View::NoGroup;
        };
        let group_config = config
            .group(group)
            .cloned()
            .unwrap_or_else(|| GroupConfig::new(group));
        if !group_config.enables(gate) {
            return View::Disabled(gate);
        }
        build_group_view(mode, cache, config, &group_config, filter)
    }
}

/// Filtered channel rows handed to `shape` together with the full table.
/// An empty selection short-circuits before `shape` runs.
fn channel_section<T>(
    cache: &mut TableCache,
    filter: &DashboardFilter,
    shape: impl FnOnce(&[ChannelRecord], &[&ChannelRecord]) -> Option<T>,
) -> Section<T> {
    section(cache, &SourceId::Channels, |all: &[ChannelRecord]| {
        match filter.channels.apply(all) {
            Selection::Empty => None,
            Selection::Rows(rows) => shape(all, &rows),
        }
    })
}

fn build_channel_view(
    mode: ViewMode,
    cache: &mut TableCache,
    config: &DashboardConfig,
    filter: &DashboardFilter,
) -> View {
    let n = config.top_n;

    match mode {
        ViewMode::Overview => View::Overview(channel_section(cache, filter, |all, rows| {
            let selection = Selection::Rows(rows.to_vec());
            Some(OverviewData {
                summary: ChannelSummary::compute(&selection)?,
                top_engagement: rank_channels(rows.iter().copied(), ChannelColumn::EngagementRate, n),
                top_subscribers: rank_channels(rows.iter().copied(), ChannelColumn::Subscribers, n),
                top_fandom: rank_channels(rows.iter().copied(), ChannelColumn::FandomActivity, n),
                collected_at: all.first().and_then(|r| r.collected_at),
            })
        })),
        ViewMode::Comparison => View::Comparison(channel_section(cache, filter, |all, rows| {
            let scale = RadarScale::new(all);
            Some(ComparisonData {
                bars: COMPARISON_COLUMNS
                    .iter()
                    .map(|&column| MetricBars {
                        column,
                        entries: rank_channels(rows.iter().copied(), column, rows.len()),
                    })
                    .collect(),
                radar: rows.iter().map(|r| scale.profile(r)).collect(),
            })
        })),
        ViewMode::Categories => View::Categories(channel_section(cache, filter, |_, rows| {
            let by_category = |column: ChannelColumn| {
                category_aggregate(
                    rows.iter().copied(),
                    |r| r.category.as_str(),
                    |r| column.value(r),
                    Aggregate::Mean,
                )
            };
            Some(CategoryData {
                mean_subscribers: by_category(ChannelColumn::Subscribers),
                mean_engagement: by_category(ChannelColumn::EngagementRate),
            })
        })),
        ViewMode::Table => View::Table(channel_section(cache, filter, |_, rows| {
            Some(rows.iter().map(|r| (*r).clone()).collect())
        })),
        ViewMode::GroupSummary
        | ViewMode::Languages
        | ViewMode::Members
        | ViewMode::Cooccurrence
        | ViewMode::Keywords
        | ViewMode::LoyalFans
        | ViewMode::Videos => View::NoGroup,
    }
}

fn build_group_view(
    mode: ViewMode,
    cache: &mut TableCache,
    config: &DashboardConfig,
    group: &GroupConfig,
    filter: &DashboardFilter,
) -> View {
    let src = |kind| SourceId::group(group.prefix.as_str(), kind);

    match mode {
        ViewMode::GroupSummary => View::GroupSummary(section(
            cache,
            &src(AnalysisKind::Summary),
            |rows: &[AnalysisSummary]| rows.first().cloned(),
        )),
        ViewMode::Languages => View::Languages(section(
            cache,
            &src(AnalysisKind::LanguageStats),
            |rows: &[LanguageStat]| {
                non_empty(
                    top_n(rows, |r| Some(r.comment_count as f64), CHART_LIMIT)
                        .into_iter()
                        .cloned()
                        .collect(),
                )
            },
        )),
        ViewMode::Members => View::Members(MembersData {
            mentions: section(
                cache,
                &src(AnalysisKind::MemberStats),
                |rows: &[MemberMention]| {
                    non_empty(
                        top_n(rows, |r| Some(r.mention_count as f64), rows.len())
                            .into_iter()
                            .cloned()
                            .collect(),
                    )
                },
            ),
            regional: section(
                cache,
                &src(AnalysisKind::RegionMember),
                |rows: &[RegionMember]| {
                    let selected = filter_rows(rows, |r| {
                        filter.region_matches(&r.region) && filter.member_matches(&r.member)
                    });
                    let ranked: Vec<RegionMember> = top_n(
                        selected.rows().iter().copied(),
                        |r| Some(r.mention_count as f64),
                        selected.len(),
                    )
                    .into_iter()
                    .cloned()
                    .collect();
                    non_empty(ranked).map(|rows| RegionalMentions { rows })
                },
            ),
        }),
        ViewMode::Cooccurrence => {
            let mentions = if group.members.is_empty() {
                cache.get::<MemberMention>(&src(AnalysisKind::MemberStats)).ok()
            } else {
                None
            };
            View::Cooccurrence(section(
                cache,
                &src(AnalysisKind::MemberCooccurrence),
                |pairs: &[CooccurrencePair]| {
                    let members = if group.members.is_empty() {
                        member_order(mentions.as_deref().map(Vec::as_slice), pairs)
                    } else {
                        group.members.clone()
                    };
                    let matrix = CooccurrenceMatrix::build(&members, pairs);
                    let top_pairs = top_n(pairs, |p| Some(p.count as f64), CHART_LIMIT)
                        .into_iter()
                        .cloned()
                        .collect();
                    Some(CooccurrenceData { matrix, top_pairs })
                },
            ))
        }
        ViewMode::Keywords => View::Keywords(KeywordData {
            members: section(
                cache,
                &src(AnalysisKind::MemberKeywords),
                |rows: &[MemberKeyword]| {
                    owned(filter_rows(rows, |r| filter.member_matches(&r.member)))
                },
            ),
            regions: section(
                cache,
                &src(AnalysisKind::RegionKeywords),
                |rows: &[RegionKeyword]| {
                    owned(filter_rows(rows, |r| filter.region_matches(&r.region)))
                },
            ),
            member_regions: section(
                cache,
                &src(AnalysisKind::MemberRegionKeywords),
                |rows: &[MemberRegionKeyword]| {
                    owned(filter_rows(rows, |r| {
                        filter.member_matches(&r.member) && filter.region_matches(&r.region)
                    }))
                },
            ),
        }),
        ViewMode::LoyalFans => {
            let mentions = cache.get::<MemberMention>(&src(AnalysisKind::MemberStats)).ok();
            View::LoyalFans(section(
                cache,
                &src(AnalysisKind::LoyalFans),
                |rows: &[LoyalFanTier]| {
                    let breakdown = filter_rows(rows, |r| filter.member_matches(&r.member))
                        .rows()
                        .iter()
                        .map(|tier| tier_breakdown(tier, mentions.as_deref()))
                        .collect();
                    non_empty(breakdown)
                },
            ))
        }
        ViewMode::Videos => View::Videos(section(
            cache,
            &src(AnalysisKind::VideoEngagement),
            |rows: &[VideoEngagement]| {
                Some(VideoData {
                    top: top_n(rows, VideoEngagement::engagement, CHART_LIMIT.max(config.top_n))
                        .into_iter()
                        .cloned()
                        .collect(),
                    avg_engagement: metrics::average(rows, VideoEngagement::engagement),
                    video_count: rows.len(),
                })
            },
        )),
        ViewMode::Overview | ViewMode::Comparison | ViewMode::Categories | ViewMode::Table => {
            build_channel_view(mode, cache, config, filter)
        }
    }
}

/// The member's total comes from the member stats table when it lists the
/// member; otherwise the tier sum stands in for it.
fn tier_breakdown(tier: &LoyalFanTier, mentions: Option<&Vec<MemberMention>>) -> TierBreakdown {
    let total_mentions = mentions
        .and_then(|all| all.iter().find(|m| m.member == tier.member))
        .map(|m| m.mention_count)
        .unwrap_or_else(|| tier.tier_total());
    TierBreakdown {
        tier: tier.clone(),
        total_mentions,
        share: fan_tier_share(tier, total_mentions),
    }
}

// ---------------------------------------------------------------------------
// Side panel choices
// ---------------------------------------------------------------------------

/// Members and regions a group's tables know about, for the filter widgets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupChoices {
    pub members: Vec<String>,
    pub regions: Vec<String>,
}

impl GroupChoices {
    pub fn load(cache: &mut TableCache, group: &GroupConfig) -> Self {
        let src = |kind| SourceId::group(group.prefix.as_str(), kind);

        let members: Vec<String> = if group.members.is_empty() {
            cache
                .get::<MemberMention>(&src(AnalysisKind::MemberStats))
                .map(|rows| rows.iter().map(|r| r.member.clone()).collect())
                .unwrap_or_default()
        } else {
            group.members.clone()
        };

        let regions = cache
            .get::<RegionMember>(&src(AnalysisKind::RegionMember))
            .map(|rows| to_owned(unique_in_order(rows.as_slice(), |r| r.region.as_str())))
            .or_else(|_| {
                cache
                    .get::<RegionKeyword>(&src(AnalysisKind::RegionKeywords))
                    .map(|rows| to_owned(unique_in_order(rows.as_slice(), |r| r.region.as_str())))
            })
            .unwrap_or_default();

        Self { members, regions }
    }
}

fn to_owned(values: Vec<&str>) -> Vec<String> {
    values.into_iter().map(str::to_string).collect()
}

/// Channel rows for the side panel, or `None` if the file is missing.
pub fn channel_table(cache: &mut TableCache) -> Result<Arc<Vec<ChannelRecord>>, MissingSource> {
    cache.get::<ChannelRecord>(&SourceId::Channels)
}
