use std::collections::BTreeSet;

use super::model::ChannelRecord;

// ---------------------------------------------------------------------------
// Selection – a non-destructive view over a loaded table
// ---------------------------------------------------------------------------

/// Result of applying a filter. `Empty` means the table was loaded but no row
/// matched, which is not the same as the table being missing.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a, T> {
    Empty,
    /// Matching rows in their original order. Never empty.
    Rows(Vec<&'a T>),
}

impl<'a, T> Selection<'a, T> {
    pub fn rows(&self) -> &[&'a T] {
        match self {
            Selection::Empty => &[],
            Selection::Rows(rows) => rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }
}

/// Keep the rows satisfying `predicate`, preserving their relative order.
pub fn filter_rows<'a, T>(rows: &'a [T], predicate: impl Fn(&T) -> bool) -> Selection<'a, T> {
    let kept: Vec<&T> = rows.iter().filter(|row| predicate(row)).collect();
    if kept.is_empty() {
        Selection::Empty
    } else {
        Selection::Rows(kept)
    }
}

// ---------------------------------------------------------------------------
// Channel filter: selected artists and categories
// ---------------------------------------------------------------------------

/// A channel passes when its artist AND its category are selected.
/// An empty set selects nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFilter {
    pub artists: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

impl ChannelFilter {
    /// Everything selected (i.e., show all channels).
    pub fn all(rows: &[ChannelRecord]) -> Self {
        Self {
            artists: rows.iter().map(|r| r.artist.clone()).collect(),
            categories: rows.iter().map(|r| r.category.clone()).collect(),
        }
    }

    pub fn matches(&self, row: &ChannelRecord) -> bool {
        self.artists.contains(&row.artist) && self.categories.contains(&row.category)
    }

    pub fn apply<'a>(&self, rows: &'a [ChannelRecord]) -> Selection<'a, ChannelRecord> {
        filter_rows(rows, |r| self.matches(r))
    }

    pub fn toggle_artist(&mut self, artist: &str) {
        toggle(&mut self.artists, artist);
    }

    pub fn toggle_category(&mut self, category: &str) {
        toggle(&mut self.categories, category);
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

/// Distinct values of a column in first-appearance order.
pub fn unique_in_order<'a, T>(rows: &'a [T], key: impl Fn(&'a T) -> &'a str) -> Vec<&'a str> {
    let mut seen = BTreeSet::new();
    rows.iter()
        .map(key)
        .filter(|v| seen.insert(*v))
        .collect()
}

// ---------------------------------------------------------------------------
// Dashboard-wide filter state
// ---------------------------------------------------------------------------

/// Everything the user has selected in the side panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardFilter {
    pub channels: ChannelFilter,
    /// Prefix of the selected group, if any.
    pub group: Option<String>,
    /// `None` means all regions.
    pub region: Option<String>,
    /// `None` means all members.
    pub member: Option<String>,
}

impl DashboardFilter {
    pub fn region_matches(&self, region: &str) -> bool {
        self.region.as_deref().map_or(true, |r| r == region)
    }

    pub fn member_matches(&self, member: &str) -> bool {
        self.member.as_deref().map_or(true, |m| m == member)
    }

    /// Switching group resets the member/region picks belonging to the old one.
    pub fn set_group(&mut self, group: Option<String>) {
        if self.group != group {
            self.group = group;
            self.region = None;
            self.member = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(artist: &str, category: &str) -> ChannelRecord {
        ChannelRecord {
            artist: artist.into(),
            category: category.into(),
            company: None,
            subscribers: 1,
            total_views: 1,
            video_count: 1,
            avg_views: 1,
            avg_likes: 0,
            avg_comments: 0,
            engagement_rate: None,
            fandom_activity: None,
            recent_videos_30d: None,
            created_at: None,
            collected_at: None,
        }
    }

    fn table() -> Vec<ChannelRecord> {
        vec![
            channel("BLACKPINK", "Girl Group"),
            channel("BTS", "Boy Group"),
            channel("IU", "Solo"),
            channel("NewJeans", "Girl Group"),
        ]
    }

    fn artists<'a>(sel: &Selection<'a, ChannelRecord>) -> Vec<&'a str> {
        sel.rows().iter().map(|r| r.artist.as_str()).collect()
    }

    #[test]
    fn accept_all_returns_whole_table_in_order() {
        let rows = table();
        let sel = filter_rows(&rows, |_| true);
        assert_eq!(sel.len(), rows.len());
        assert!(sel.rows().iter().zip(&rows).all(|(a, b)| std::ptr::eq(*a, b)));

        let sel = ChannelFilter::all(&rows).apply(&rows);
        assert_eq!(artists(&sel), vec!["BLACKPINK", "BTS", "IU", "NewJeans"]);
    }

    #[test]
    fn filter_is_an_order_preserving_subset() {
        let rows = table();
        let mut filter = ChannelFilter::all(&rows);
        filter.toggle_category("Boy Group");
        filter.toggle_artist("IU");

        let sel = filter.apply(&rows);
        assert_eq!(artists(&sel), vec!["BLACKPINK", "NewJeans"]);
    }

    #[test]
    fn no_match_is_empty_selection() {
        let rows = table();
        let mut filter = ChannelFilter::all(&rows);
        filter.categories = ["Actor".to_string()].into_iter().collect();

        let sel = filter.apply(&rows);
        assert!(sel.is_empty());
        assert_eq!(sel, Selection::Empty);
    }

    #[test]
    fn empty_artist_set_selects_nothing() {
        let rows = table();
        let mut filter = ChannelFilter::all(&rows);
        filter.artists.clear();
        assert!(filter.apply(&rows).is_empty());
    }

    #[test]
    fn unique_values_keep_first_appearance_order() {
        let rows = table();
        assert_eq!(
            unique_in_order(&rows, |r| r.category.as_str()),
            vec!["Girl Group", "Boy Group", "Solo"]
        );
    }

    #[test]
    fn changing_group_resets_member_and_region() {
        let mut filter = DashboardFilter {
            group: Some("bts".into()),
            region: Some("Asia".into()),
            member: Some("V".into()),
            ..Default::default()
        };
        assert!(filter.member_matches("V"));
        assert!(!filter.member_matches("RM"));

        filter.set_group(Some("bts".into()));
        assert_eq!(filter.member.as_deref(), Some("V"));

        filter.set_group(Some("nj".into()));
        assert_eq!(filter.member, None);
        assert!(filter.region_matches("Europe"));
    }
}
