use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Record – a row type that can be loaded from a CSV file
// ---------------------------------------------------------------------------

/// A typed CSV row.
///
/// `REQUIRED_COLUMNS` lists the header names that must be present before any
/// row is deserialized. Each entry is a set of accepted spellings, so a column
/// that goes by two names upstream is written as `&["a", "b"]`.
pub trait Record: for<'de> Deserialize<'de> + Send + Sync + 'static {
    const REQUIRED_COLUMNS: &'static [&'static [&'static str]];
}

// ---------------------------------------------------------------------------
// Channel metrics (channels_data.csv)
// ---------------------------------------------------------------------------

/// One artist channel snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub artist: String,
    pub category: String,
    #[serde(default)]
    pub company: Option<String>,
    pub subscribers: u64,
    pub total_views: u64,
    pub video_count: u64,
    pub avg_views: u64,
    pub avg_likes: u64,
    pub avg_comments: u64,
    /// (avg_likes + avg_comments) / avg_views * 100, computed upstream.
    /// Empty when avg_views is zero.
    #[serde(default)]
    pub engagement_rate: Option<f64>,
    /// avg_views / subscribers * 100, computed upstream. Empty when
    /// subscribers is zero.
    #[serde(default, alias = "views_per_subscriber")]
    pub fandom_activity: Option<f64>,
    #[serde(default)]
    pub recent_videos_30d: Option<u64>,
    #[serde(default, deserialize_with = "de::optional_date")]
    pub created_at: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::optional_timestamp")]
    pub collected_at: Option<NaiveDateTime>,
}

impl ChannelRecord {
    /// Stored engagement rate, or the derived one when the cell was empty.
    pub fn engagement(&self) -> Option<f64> {
        self.engagement_rate
            .filter(|v| v.is_finite())
            .or_else(|| crate::metrics::engagement_rate(self.avg_likes, self.avg_comments, self.avg_views))
    }

    /// Stored fandom activity, or the derived ratio when the column was left
    /// empty. Undefined for channels without subscribers.
    pub fn fandom_activity(&self) -> Option<f64> {
        self.fandom_activity
            .filter(|v| v.is_finite())
            .or_else(|| crate::metrics::views_per_subscriber(self.avg_views, self.subscribers))
    }
}

impl Record for ChannelRecord {
    const REQUIRED_COLUMNS: &'static [&'static [&'static str]] = &[
        &["artist"],
        &["category"],
        &["subscribers"],
        &["total_views"],
        &["video_count"],
        &["avg_views"],
        &["avg_likes"],
        &["avg_comments"],
    ];
}

// ---------------------------------------------------------------------------
// Comment-analysis tables ({prefix}_*.csv)
// ---------------------------------------------------------------------------

/// Headline numbers of a group's comment analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default, alias = "group")]
    pub artist: Option<String>,
    pub total_comments: u64,
    pub total_videos: u64,
    pub unique_authors: u64,
    pub loyal_fan_rate: f64,
    pub super_fan_rate: f64,
}

impl Record for AnalysisSummary {
    const REQUIRED_COLUMNS: &'static [&'static [&'static str]] = &[
        &["total_comments"],
        &["total_videos"],
        &["unique_authors"],
        &["loyal_fan_rate"],
        &["super_fan_rate"],
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageStat {
    pub language: String,
    pub comment_count: u64,
    pub percentage: f64,
}

impl Record for LanguageStat {
    const REQUIRED_COLUMNS: &'static [&'static [&'static str]] =
        &[&["language"], &["comment_count"], &["percentage"]];
}

/// How often a member is mentioned across the analysed comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberMention {
    pub member: String,
    pub mention_count: u64,
    pub mention_rate: f64,
}

impl Record for MemberMention {
    const REQUIRED_COLUMNS: &'static [&'static [&'static str]] =
        &[&["member"], &["mention_count"], &["mention_rate"]];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMember {
    pub region: String,
    pub member: String,
    pub mention_count: u64,
}

impl Record for RegionMember {
    const REQUIRED_COLUMNS: &'static [&'static [&'static str]] =
        &[&["region"], &["member"], &["mention_count"]];
}

/// Number of comments mentioning two members together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CooccurrencePair {
    pub member_1: String,
    pub member_2: String,
    #[serde(default)]
    pub pair: Option<String>,
    pub count: u64,
}

impl CooccurrencePair {
    pub fn label(&self) -> String {
        match &self.pair {
            Some(p) if !p.is_empty() => p.clone(),
            _ => format!("{} & {}", self.member_1, self.member_2),
        }
    }
}

impl Record for CooccurrencePair {
    const REQUIRED_COLUMNS: &'static [&'static [&'static str]] =
        &[&["member_1"], &["member_2"], &["count"]];
}

/// Top keywords per category. Every field is free text and may be empty.
pub trait Keywords {
    fn visual(&self) -> Option<&str>;
    fn talent(&self) -> Option<&str>;
    fn personality(&self) -> Option<&str>;
    fn love(&self) -> Option<&str>;
    fn top_words(&self) -> Option<&str>;

    /// (category label, keywords) pairs for the categories that have text.
    fn keyword_entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("Visual", self.visual()),
            ("Talent", self.talent()),
            ("Personality", self.personality()),
            ("Love", self.love()),
            ("Top words", self.top_words()),
        ]
        .into_iter()
        .filter_map(|(label, v)| v.map(str::trim).filter(|s| !s.is_empty()).map(|s| (label, s)))
        .collect()
    }
}

macro_rules! keyword_record {
    ($(#[$meta:meta])* $name:ident { $($key:ident),+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(pub $key: String,)+
            #[serde(default)]
            pub visual: Option<String>,
            #[serde(default)]
            pub talent: Option<String>,
            #[serde(default)]
            pub personality: Option<String>,
            #[serde(default)]
            pub love: Option<String>,
            #[serde(default)]
            pub top_words: Option<String>,
        }

        impl Keywords for $name {
            fn visual(&self) -> Option<&str> {
                self.visual.as_deref()
            }
            fn talent(&self) -> Option<&str> {
                self.talent.as_deref()
            }
            fn personality(&self) -> Option<&str> {
                self.personality.as_deref()
            }
            fn love(&self) -> Option<&str> {
                self.love.as_deref()
            }
            fn top_words(&self) -> Option<&str> {
                self.top_words.as_deref()
            }
        }

        impl Record for $name {
            const REQUIRED_COLUMNS: &'static [&'static [&'static str]] =
                &[$(&[stringify!($key)]),+];
        }
    };
}

keyword_record!(
    /// Keywords used about one member.
    MemberKeyword { member }
);
keyword_record!(
    /// Keywords used by commenters from one region.
    RegionKeyword { region }
);
keyword_record!(MemberRegionKeyword { member, region });

/// Authors mentioning a member, partitioned by fixed comment-count thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyalFanTier {
    pub member: String,
    pub casual_fans: u64,
    pub regular_fans: u64,
    pub loyal_fans: u64,
    pub super_fans: u64,
    pub loyal_rate: f64,
    pub super_fan_rate: f64,
}

impl LoyalFanTier {
    pub fn tier_total(&self) -> u64 {
        self.casual_fans + self.regular_fans + self.loyal_fans + self.super_fans
    }
}

impl Record for LoyalFanTier {
    const REQUIRED_COLUMNS: &'static [&'static [&'static str]] = &[
        &["member"],
        &["casual_fans"],
        &["regular_fans"],
        &["loyal_fans"],
        &["super_fans"],
        &["loyal_rate"],
        &["super_fan_rate"],
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoEngagement {
    pub video_id: String,
    pub title: String,
    #[serde(default, deserialize_with = "de::optional_date")]
    pub published_at: Option<NaiveDate>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    #[serde(default)]
    pub engagement_rate: Option<f64>,
}

impl VideoEngagement {
    pub fn engagement(&self) -> Option<f64> {
        self.engagement_rate
            .filter(|v| v.is_finite())
            .or_else(|| crate::metrics::engagement_rate(self.likes, self.comments, self.views))
    }
}

impl Record for VideoEngagement {
    const REQUIRED_COLUMNS: &'static [&'static [&'static str]] = &[
        &["video_id"],
        &["title"],
        &["views"],
        &["likes"],
        &["comments"],
    ];
}

// ---------------------------------------------------------------------------
// Lenient date parsing for CSV cells
// ---------------------------------------------------------------------------

pub(crate) mod de {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::{Deserialize, Deserializer};

    const TIMESTAMP_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    pub fn parse_date(s: &str) -> Option<NaiveDate> {
        let head = s.get(..10).unwrap_or(s);
        NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }

    pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_utc());
        }
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    pub fn optional_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_date(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid date '{s}'"))),
        }
    }

    pub fn optional_timestamp<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse_timestamp(s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_with_trailing_time() {
        assert_eq!(
            de::parse_date("2013-06-12T00:00:00Z"),
            NaiveDate::from_ymd_opt(2013, 6, 12)
        );
        assert_eq!(de::parse_date("12/06/2013"), None);
    }

    #[test]
    fn parses_common_timestamp_shapes() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 15)
            .and_then(|d| d.and_hms_opt(9, 30, 0))
            .unwrap();
        assert_eq!(de::parse_timestamp("2025-01-15 09:30:00"), Some(expected));
        assert_eq!(de::parse_timestamp("2025-01-15T09:30:00"), Some(expected));
        assert_eq!(de::parse_timestamp("2025-01-15 09:30"), Some(expected));
        assert_eq!(de::parse_timestamp("2025-01-15T09:30:00+00:00"), Some(expected));
        assert!(de::parse_timestamp("2025-01-15").is_some());
        assert!(de::parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn fandom_activity_falls_back_to_derived_ratio() {
        let mut rec = ChannelRecord {
            artist: "A".into(),
            category: "Group".into(),
            company: None,
            subscribers: 1_000,
            total_views: 0,
            video_count: 0,
            avg_views: 250,
            avg_likes: 0,
            avg_comments: 0,
            engagement_rate: None,
            fandom_activity: None,
            recent_videos_30d: None,
            created_at: None,
            collected_at: None,
        };
        assert_eq!(rec.fandom_activity(), Some(25.0));
        assert_eq!(rec.engagement(), Some(0.0));

        rec.fandom_activity = Some(30.0);
        assert_eq!(rec.fandom_activity(), Some(30.0));

        rec.fandom_activity = None;
        rec.subscribers = 0;
        assert_eq!(rec.fandom_activity(), None);
    }

    #[test]
    fn keyword_entries_skip_blank_categories() {
        let kw = MemberKeyword {
            member: "Jimin".into(),
            visual: Some("pretty, tall".into()),
            talent: Some("  ".into()),
            personality: None,
            love: Some("love".into()),
            top_words: None,
        };
        assert_eq!(
            kw.keyword_entries(),
            vec![("Visual", "pretty, tall"), ("Love", "love")]
        );
    }
}
