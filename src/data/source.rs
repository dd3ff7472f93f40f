use std::fmt;

/// Name of the channel metrics file.
pub const CHANNELS_FILE: &str = "channels_data.csv";

// ---------------------------------------------------------------------------
// AnalysisKind – the per-group comment-analysis files
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnalysisKind {
    Summary,
    LanguageStats,
    MemberStats,
    RegionMember,
    MemberCooccurrence,
    MemberKeywords,
    RegionKeywords,
    MemberRegionKeywords,
    LoyalFans,
    VideoEngagement,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 10] = [
        AnalysisKind::Summary,
        AnalysisKind::LanguageStats,
        AnalysisKind::MemberStats,
        AnalysisKind::RegionMember,
        AnalysisKind::MemberCooccurrence,
        AnalysisKind::MemberKeywords,
        AnalysisKind::RegionKeywords,
        AnalysisKind::MemberRegionKeywords,
        AnalysisKind::LoyalFans,
        AnalysisKind::VideoEngagement,
    ];

    /// File name suffix appended to the group prefix.
    pub fn suffix(self) -> &'static str {
        match self {
            AnalysisKind::Summary => "summary",
            AnalysisKind::LanguageStats => "language_stats",
            AnalysisKind::MemberStats => "member_stats",
            AnalysisKind::RegionMember => "region_member",
            AnalysisKind::MemberCooccurrence => "member_cooccurrence",
            AnalysisKind::MemberKeywords => "member_keywords",
            AnalysisKind::RegionKeywords => "region_keywords",
            AnalysisKind::MemberRegionKeywords => "member_region_keywords",
            AnalysisKind::LoyalFans => "loyal_fans",
            AnalysisKind::VideoEngagement => "video_engagement",
        }
    }
}

// ---------------------------------------------------------------------------
// SourceId – cache key and file locator
// ---------------------------------------------------------------------------

/// Identifies one flat file under the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceId {
    Channels,
    Group { prefix: String, kind: AnalysisKind },
}

impl SourceId {
    pub fn group(prefix: impl Into<String>, kind: AnalysisKind) -> Self {
        SourceId::Group {
            prefix: prefix.into(),
            kind,
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            SourceId::Channels => CHANNELS_FILE.to_string(),
            SourceId::Group { prefix, kind } => format!("{prefix}_{}.csv", kind.suffix()),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_group_file_names() {
        assert_eq!(SourceId::Channels.file_name(), "channels_data.csv");
        assert_eq!(
            SourceId::group("bts", AnalysisKind::MemberCooccurrence).file_name(),
            "bts_member_cooccurrence.csv"
        );
        assert_eq!(
            SourceId::group("nj", AnalysisKind::MemberRegionKeywords).to_string(),
            "nj_member_region_keywords.csv"
        );
    }

    #[test]
    fn every_kind_has_a_distinct_suffix() {
        let mut suffixes: Vec<_> = AnalysisKind::ALL.iter().map(|k| k.suffix()).collect();
        suffixes.sort_unstable();
        suffixes.dedup();
        assert_eq!(suffixes.len(), AnalysisKind::ALL.len());
    }
}
