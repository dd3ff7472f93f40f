//! Derived metrics and rankings over loaded tables.
//!
//! Column accessors return `Option<f64>`; `None` (or a non-finite value) is an
//! undefined cell and is skipped by every aggregate, the way a dataframe mean
//! skips NaN.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::data::filter::Selection;
use crate::data::model::{ChannelRecord, LoyalFanTier};

// ---------------------------------------------------------------------------
// Glossary formulas
// ---------------------------------------------------------------------------

/// (likes + comments) / views, as a percentage.
pub fn engagement_rate(likes: u64, comments: u64, views: u64) -> Option<f64> {
    (views > 0).then(|| (likes + comments) as f64 / views as f64 * 100.0)
}

/// avg_views / subscribers, as a percentage.
pub fn views_per_subscriber(avg_views: u64, subscribers: u64) -> Option<f64> {
    (subscribers > 0).then(|| avg_views as f64 / subscribers as f64 * 100.0)
}

// ---------------------------------------------------------------------------
// Channel columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelColumn {
    Subscribers,
    TotalViews,
    VideoCount,
    AvgViews,
    AvgLikes,
    AvgComments,
    EngagementRate,
    FandomActivity,
}

impl ChannelColumn {
    pub fn value(self, row: &ChannelRecord) -> Option<f64> {
        let v = match self {
            ChannelColumn::Subscribers => row.subscribers as f64,
            ChannelColumn::TotalViews => row.total_views as f64,
            ChannelColumn::VideoCount => row.video_count as f64,
            ChannelColumn::AvgViews => row.avg_views as f64,
            ChannelColumn::AvgLikes => row.avg_likes as f64,
            ChannelColumn::AvgComments => row.avg_comments as f64,
            ChannelColumn::EngagementRate => return row.engagement(),
            ChannelColumn::FandomActivity => return row.fandom_activity(),
        };
        defined(Some(v))
    }

    pub fn label(self) -> &'static str {
        match self {
            ChannelColumn::Subscribers => "Subscribers",
            ChannelColumn::TotalViews => "Total views",
            ChannelColumn::VideoCount => "Videos",
            ChannelColumn::AvgViews => "Avg views",
            ChannelColumn::AvgLikes => "Avg likes",
            ChannelColumn::AvgComments => "Avg comments",
            ChannelColumn::EngagementRate => "Engagement",
            ChannelColumn::FandomActivity => "Fandom activity",
        }
    }

    /// Whether values are percentages rather than counts.
    pub fn is_rate(self) -> bool {
        matches!(
            self,
            ChannelColumn::EngagementRate | ChannelColumn::FandomActivity
        )
    }
}

fn defined(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Arithmetic mean of the defined values. `None` when there are none.
pub fn average<'a, T: 'a>(
    rows: impl IntoIterator<Item = &'a T>,
    key: impl Fn(&T) -> Option<f64>,
) -> Option<f64> {
    let (sum, n) = rows
        .into_iter()
        .filter_map(|r| defined(key(r)))
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Largest defined value of a column.
pub fn column_max<'a, T: 'a>(
    rows: impl IntoIterator<Item = &'a T>,
    key: impl Fn(&T) -> Option<f64>,
) -> Option<f64> {
    rows.into_iter()
        .filter_map(|r| defined(key(r)))
        .max_by(f64::total_cmp)
}

/// `value / column_max`. The max must come from the full reference population,
/// not from the filtered subset, so scores stay put while filters change.
pub fn normalize(value: f64, column_max: f64) -> Option<f64> {
    (value.is_finite() && column_max.is_finite() && column_max > 0.0).then(|| value / column_max)
}

/// The `n` rows with the largest key, descending. Ties keep their original
/// order; undefined keys rank last.
pub fn top_n<'a, T>(
    rows: impl IntoIterator<Item = &'a T>,
    key: impl Fn(&T) -> Option<f64>,
    n: usize,
) -> Vec<&'a T> {
    let mut keyed: Vec<(Option<f64>, &'a T)> =
        rows.into_iter().map(|r| (defined(key(r)), r)).collect();
    keyed.sort_by(|(a, _), (b, _)| descending(*a, *b));
    keyed.truncate(n);
    keyed.into_iter().map(|(_, r)| r).collect()
}

fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Mean,
    Sum,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate {
    pub group: String,
    /// `None` for a mean over a group with no defined values.
    pub value: Option<f64>,
    pub rows: usize,
}

/// One output per distinct `group_key`, in first-appearance order.
pub fn category_aggregate<'a, T: 'a>(
    rows: impl IntoIterator<Item = &'a T>,
    group_key: impl Fn(&T) -> &str,
    value_key: impl Fn(&T) -> Option<f64>,
    aggregate: Aggregate,
) -> Vec<GroupAggregate> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<f64>, usize)> = Vec::new();

    for row in rows {
        let group = group_key(row);
        let slot = match index.get(group) {
            Some(&i) => i,
            None => {
                index.insert(group.to_string(), groups.len());
                groups.push((group.to_string(), Vec::new(), 0));
                groups.len() - 1
            }
        };
        let entry = &mut groups[slot];
        entry.2 += 1;
        if let Some(v) = defined(value_key(row)) {
            entry.1.push(v);
        }
    }

    groups
        .into_iter()
        .map(|(group, values, rows)| {
            let sum: f64 = values.iter().sum();
            let value = match aggregate {
                Aggregate::Sum => Some(sum),
                Aggregate::Mean => (!values.is_empty()).then(|| sum / values.len() as f64),
            };
            GroupAggregate { group, value, rows }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Rankings for the insight lists
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RankedValue {
    pub label: String,
    pub value: f64,
}

/// Top `n` channels by `column`, skipping undefined values.
pub fn rank_channels<'a>(
    rows: impl IntoIterator<Item = &'a ChannelRecord>,
    column: ChannelColumn,
    n: usize,
) -> Vec<RankedValue> {
    top_n(rows, |r| column.value(r), n)
        .into_iter()
        .filter_map(|r| {
            column.value(r).map(|value| RankedValue {
                label: r.artist.clone(),
                value,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSummary {
    pub artists: usize,
    pub avg_subscribers: f64,
    pub avg_views: f64,
    pub avg_engagement: Option<f64>,
    pub avg_fandom_activity: Option<f64>,
}

impl ChannelSummary {
    /// `None` for an empty selection; nothing is averaged in that case.
    pub fn compute(selection: &Selection<'_, ChannelRecord>) -> Option<Self> {
        let rows = match selection {
            Selection::Empty => return None,
            Selection::Rows(rows) => rows,
        };
        let col = |c: ChannelColumn| move |r: &ChannelRecord| c.value(r);
        let iter = || rows.iter().copied();

        Some(ChannelSummary {
            artists: rows.len(),
            avg_subscribers: average(iter(), col(ChannelColumn::Subscribers))?,
            avg_views: average(iter(), col(ChannelColumn::AvgViews))?,
            avg_engagement: average(iter(), col(ChannelColumn::EngagementRate)),
            avg_fandom_activity: average(iter(), col(ChannelColumn::FandomActivity)),
        })
    }
}

// ---------------------------------------------------------------------------
// Radar scores
// ---------------------------------------------------------------------------

/// Axes of the composite score chart, in drawing order.
pub const RADAR_AXES: [ChannelColumn; 4] = [
    ChannelColumn::Subscribers,
    ChannelColumn::AvgViews,
    ChannelColumn::EngagementRate,
    ChannelColumn::FandomActivity,
];

#[derive(Debug, Clone, PartialEq)]
pub struct RadarProfile {
    pub artist: String,
    /// One score per [`RADAR_AXES`] entry, in `[0, 1]` for non-negative data.
    pub scores: [Option<f64>; 4],
}

/// Column maxima of the full dataset, computed once per render.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarScale {
    maxima: [Option<f64>; 4],
}

impl RadarScale {
    pub fn new(reference: &[ChannelRecord]) -> Self {
        Self {
            maxima: RADAR_AXES.map(|c| column_max(reference, |r| c.value(r))),
        }
    }

    pub fn profile(&self, row: &ChannelRecord) -> RadarProfile {
        let mut scores = [None; 4];
        for (i, column) in RADAR_AXES.iter().enumerate() {
            scores[i] = match (column.value(row), self.maxima[i]) {
                (Some(v), Some(max)) => normalize(v, max),
                _ => None,
            };
        }
        RadarProfile {
            artist: row.artist.clone(),
            scores,
        }
    }
}

pub fn radar_profile(row: &ChannelRecord, reference: &[ChannelRecord]) -> RadarProfile {
    RadarScale::new(reference).profile(row)
}

// ---------------------------------------------------------------------------
// Fan tiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierIntegrity {
    Consistent,
    /// The four tiers do not add up to the member's total.
    Mismatch { expected: u64, actual: u64 },
}

/// Each tier's percentage of a member's total mentions.
#[derive(Debug, Clone, PartialEq)]
pub struct FanTierShare {
    pub total_mentions: u64,
    pub casual: f64,
    pub regular: f64,
    pub loyal: f64,
    pub super_fans: f64,
    pub integrity: TierIntegrity,
}

impl FanTierShare {
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("Casual", self.casual),
            ("Regular", self.regular),
            ("Loyal", self.loyal),
            ("Super", self.super_fans),
        ]
    }

    pub fn total_share(&self) -> f64 {
        self.casual + self.regular + self.loyal + self.super_fans
    }
}

/// `None` when the total is zero. A tier sum that differs from the total is
/// reported in `integrity` and logged; the shares are still computed.
pub fn fan_tier_share(tiers: &LoyalFanTier, total_mentions: u64) -> Option<FanTierShare> {
    if total_mentions == 0 {
        return None;
    }
    let actual = tiers.tier_total();
    let integrity = if actual == total_mentions {
        TierIntegrity::Consistent
    } else {
        log::warn!(
            "{}: fan tiers sum to {actual}, expected {total_mentions}",
            tiers.member
        );
        TierIntegrity::Mismatch {
            expected: total_mentions,
            actual,
        }
    };
    let pct = |n: u64| n as f64 / total_mentions as f64 * 100.0;

    Some(FanTierShare {
        total_mentions,
        casual: pct(tiers.casual_fans),
        regular: pct(tiers.regular_fans),
        loyal: pct(tiers.loyal_fans),
        super_fans: pct(tiers.super_fans),
        integrity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter_rows, ChannelFilter};

    fn channel(artist: &str, category: &str, subscribers: u64, avg_views: u64, eng: f64) -> ChannelRecord {
        ChannelRecord {
            artist: artist.into(),
            category: category.into(),
            company: None,
            subscribers,
            total_views: avg_views * 10,
            video_count: 10,
            avg_views,
            avg_likes: 0,
            avg_comments: 0,
            engagement_rate: Some(eng),
            fandom_activity: views_per_subscriber(avg_views, subscribers),
            recent_videos_30d: None,
            created_at: None,
            collected_at: None,
        }
    }

    fn two_artists() -> Vec<ChannelRecord> {
        vec![
            channel("BLACKPINK", "Girl Group", 3_810_000, 632_147, 6.64),
            channel("NewJeans", "Girl Group", 1_120_000, 200_592, 8.23),
        ]
    }

    #[test]
    fn averages_two_artist_table() {
        let rows = two_artists();
        let subs = average(&rows, |r| ChannelColumn::Subscribers.value(r)).unwrap();
        let views = average(&rows, |r| ChannelColumn::AvgViews.value(r)).unwrap();
        assert_eq!(subs, 2_465_000.0);
        assert_eq!(views, 416_369.5);
    }

    #[test]
    fn average_lies_between_min_and_max() {
        let rows = vec![
            channel("A", "x", 10, 1, 0.5),
            channel("B", "x", 7_000, 1, 12.0),
            channel("C", "x", 333, 1, 3.25),
        ];
        for column in [ChannelColumn::Subscribers, ChannelColumn::EngagementRate] {
            let values: Vec<f64> = rows.iter().filter_map(|r| column.value(r)).collect();
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let avg = average(&rows, |r| column.value(r)).unwrap();
            assert!(min <= avg && avg <= max, "{avg} outside [{min}, {max}]");
        }
    }

    #[test]
    fn average_of_nothing_is_undefined() {
        let rows: Vec<ChannelRecord> = Vec::new();
        assert_eq!(average(&rows, |r| ChannelColumn::Subscribers.value(r)), None);

        // Undefined cells are skipped rather than poisoning the mean.
        let mut rows = two_artists();
        rows[0].fandom_activity = Some(f64::NAN);
        rows[0].subscribers = 0;
        let fandom = average(&rows, |r| ChannelColumn::FandomActivity.value(r)).unwrap();
        assert!((fandom - 200_592.0 / 1_120_000.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn glossary_formulas_guard_zero_denominators() {
        assert_eq!(engagement_rate(40, 10, 1_000), Some(5.0));
        assert_eq!(engagement_rate(40, 10, 0), None);
        assert_eq!(views_per_subscriber(50, 200), Some(25.0));
        assert_eq!(views_per_subscriber(50, 0), None);
    }

    #[test]
    fn normalization_ignores_current_filter() {
        let rows = vec![
            channel("A", "Girl Group", 4_000, 100, 2.0),
            channel("B", "Boy Group", 1_000, 400, 8.0),
            channel("C", "Solo", 2_000, 200, 4.0),
        ];
        let scale = RadarScale::new(&rows);

        let mut narrow = ChannelFilter::all(&rows);
        narrow.categories = ["Solo".to_string()].into_iter().collect();
        let visible = narrow.apply(&rows);
        let only_c = visible.rows()[0];

        let wide = ChannelFilter::all(&rows).apply(&rows);
        let c_in_wide = wide.rows()[2];

        assert_eq!(scale.profile(only_c), scale.profile(c_in_wide));
        assert_eq!(scale.profile(only_c).scores[0], Some(0.5));
        assert_eq!(scale.profile(only_c).scores[1], Some(0.5));
        assert_eq!(radar_profile(only_c, &rows).scores[2], Some(0.5));
    }

    #[test]
    fn normalize_rejects_degenerate_max() {
        assert_eq!(normalize(5.0, 10.0), Some(0.5));
        assert_eq!(normalize(5.0, 0.0), None);
        assert_eq!(normalize(f64::NAN, 10.0), None);
    }

    #[test]
    fn top_n_sorts_descending_with_stable_ties() {
        let rows = vec![
            channel("A", "x", 5, 1, 1.0),
            channel("B", "x", 9, 1, 1.0),
            channel("C", "x", 5, 1, 1.0),
            channel("D", "x", 7, 1, 1.0),
        ];
        let key = |r: &ChannelRecord| ChannelColumn::Subscribers.value(r);
        let names = |v: Vec<&ChannelRecord>| v.into_iter().map(|r| r.artist.clone()).collect::<Vec<_>>();

        assert_eq!(names(top_n(&rows, key, 10)), vec!["B", "D", "A", "C"]);
        assert_eq!(names(top_n(&rows, key, 4)), vec!["B", "D", "A", "C"]);
        assert_eq!(names(top_n(&rows, key, 2)), vec!["B", "D"]);
        assert!(top_n(&rows, key, 0).is_empty());
    }

    #[test]
    fn top_n_ranks_undefined_last() {
        let mut rows = two_artists();
        rows[1].subscribers = 0;
        rows[1].fandom_activity = None;
        rows.push(channel("IU", "Solo", 100, 90, 1.0));

        let ranked = top_n(&rows, |r| ChannelColumn::FandomActivity.value(r), 3);
        assert_eq!(ranked[0].artist, "IU");
        assert_eq!(ranked[2].artist, "NewJeans");

        let listed = rank_channels(&rows, ChannelColumn::FandomActivity, 3);
        assert_eq!(listed.len(), 2);
    }

    #[test]
    fn category_aggregate_groups_in_first_appearance_order() {
        let rows = vec![
            channel("A", "Solo", 100, 1, 3.0),
            channel("B", "Girl Group", 300, 1, 5.0),
            channel("C", "Solo", 200, 1, 1.0),
        ];
        let mean = category_aggregate(
            &rows,
            |r| r.category.as_str(),
            |r| ChannelColumn::Subscribers.value(r),
            Aggregate::Mean,
        );
        assert_eq!(mean.len(), 2);
        assert_eq!(mean[0].group, "Solo");
        assert_eq!(mean[0].value, Some(150.0));
        assert_eq!(mean[0].rows, 2);
        assert_eq!(mean[1].group, "Girl Group");

        let sum = category_aggregate(
            &rows,
            |r| r.category.as_str(),
            |r| ChannelColumn::EngagementRate.value(r),
            Aggregate::Sum,
        );
        assert_eq!(sum[0].value, Some(4.0));
        assert_eq!(sum[1].value, Some(5.0));
    }

    #[test]
    fn summary_requires_non_empty_selection() {
        let rows = two_artists();
        assert_eq!(ChannelSummary::compute(&Selection::Empty), None);

        let sel = filter_rows(&rows, |_| true);
        let summary = ChannelSummary::compute(&sel).unwrap();
        assert_eq!(summary.artists, 2);
        assert_eq!(summary.avg_subscribers, 2_465_000.0);
        assert_eq!(summary.avg_views, 416_369.5);
        assert!((summary.avg_engagement.unwrap() - 7.435).abs() < 1e-9);
        assert!(summary.avg_fandom_activity.is_some());
    }

    #[test]
    fn summary_leaves_undefined_engagement_undefined() {
        let mut rows = two_artists();
        for r in &mut rows {
            r.engagement_rate = Some(f64::NAN);
            r.avg_views = 0;
        }
        let sel = filter_rows(&rows, |_| true);
        let summary = ChannelSummary::compute(&sel).unwrap();
        assert_eq!(summary.artists, 2);
        assert_eq!(summary.avg_engagement, None);
        assert_eq!(summary.avg_views, 0.0);
    }

    fn tiers(casual: u64, regular: u64, loyal: u64, super_fans: u64) -> LoyalFanTier {
        LoyalFanTier {
            member: "Jimin".into(),
            casual_fans: casual,
            regular_fans: regular,
            loyal_fans: loyal,
            super_fans,
            loyal_rate: 0.0,
            super_fan_rate: 0.0,
        }
    }

    #[test]
    fn fan_tier_shares_add_up_for_consistent_counts() {
        let t = tiers(700, 200, 70, 30);
        let share = fan_tier_share(&t, 1_000).unwrap();
        assert_eq!(share.integrity, TierIntegrity::Consistent);
        assert!((share.total_share() - 100.0).abs() < 1e-9);
        assert!((share.casual - 70.0).abs() < 1e-9);

        let back: f64 = share
            .entries()
            .iter()
            .map(|(_, pct)| pct / 100.0 * share.total_mentions as f64)
            .sum();
        assert!((back - 1_000.0).abs() < 1e-6);
    }

    #[test]
    fn fan_tier_mismatch_is_reported_not_fatal() {
        let t = tiers(10, 10, 10, 10);
        let share = fan_tier_share(&t, 50).unwrap();
        assert_eq!(
            share.integrity,
            TierIntegrity::Mismatch {
                expected: 50,
                actual: 40
            }
        );
        assert!(fan_tier_share(&t, 0).is_none());
    }
}
