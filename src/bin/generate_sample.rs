//! Writes a deterministic sample data directory: `channels_data.csv` plus the
//! ten analysis files of one group.
//!
//! Usage: `generate_sample [OUT_DIR] [PREFIX]` (defaults: `data`, `bts`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use kfantrix::data::model::{
    AnalysisSummary, ChannelRecord, CooccurrencePair, LanguageStat, LoyalFanTier, MemberKeyword,
    MemberMention, MemberRegionKeyword, RegionKeyword, RegionMember, VideoEngagement,
};
use kfantrix::data::{AnalysisKind, SourceId};
use kfantrix::metrics;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[lo, hi)`.
    fn range(&mut self, lo: u64, hi: u64) -> u64 {
        lo + (self.next_f64() * (hi - lo) as f64) as u64
    }

    /// `base` scaled by a factor in `[1 - spread, 1 + spread)`.
    fn jitter(&mut self, base: f64, spread: f64) -> f64 {
        base * (1.0 - spread + 2.0 * spread * self.next_f64())
    }
}

const ARTISTS: [(&str, &str, &str, u64); 12] = [
    ("BLACKPINK", "Girl Group", "YG Entertainment", 95_000_000),
    ("BTS", "Boy Group", "HYBE", 79_000_000),
    ("TWICE", "Girl Group", "JYP Entertainment", 17_000_000),
    ("Stray Kids", "Boy Group", "JYP Entertainment", 22_000_000),
    ("NewJeans", "Girl Group", "ADOR", 10_000_000),
    ("SEVENTEEN", "Boy Group", "Pledis Entertainment", 11_000_000),
    ("aespa", "Girl Group", "SM Entertainment", 7_500_000),
    ("IU", "Solo", "EDAM Entertainment", 9_800_000),
    ("ENHYPEN", "Boy Group", "Belift Lab", 8_300_000),
    ("IVE", "Girl Group", "Starship Entertainment", 5_600_000),
    ("Jungkook", "Solo", "HYBE", 4_900_000),
    ("LE SSERAFIM", "Girl Group", "Source Music", 6_200_000),
];

const MEMBERS: [&str; 7] = ["RM", "Jin", "SUGA", "j-hope", "Jimin", "V", "Jungkook"];
const REGIONS: [&str; 5] = ["Asia", "North America", "South America", "Europe", "Middle East"];
const LANGUAGES: [(&str, u64); 8] = [
    ("en", 4200),
    ("ko", 2100),
    ("es", 900),
    ("pt", 700),
    ("id", 450),
    ("ja", 300),
    ("ar", 220),
    ("fr", 130),
];

fn write_csv<T: Serialize>(dir: &Path, file_name: &str, rows: &[T]) -> Result<()> {
    let path = dir.join(file_name);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    log::info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn channels(rng: &mut SimpleRng, collected_at: NaiveDateTime) -> Vec<ChannelRecord> {
    ARTISTS
        .iter()
        .map(|&(artist, category, company, subscribers)| {
            let video_count = rng.range(150, 1400);
            let avg_views = rng.jitter(subscribers as f64 * 0.12, 0.5) as u64;
            let avg_likes = rng.jitter(avg_views as f64 * 0.06, 0.4) as u64;
            let avg_comments = rng.jitter(avg_likes as f64 * 0.05, 0.4) as u64;
            ChannelRecord {
                artist: artist.to_string(),
                category: category.to_string(),
                company: Some(company.to_string()),
                subscribers,
                total_views: avg_views * video_count,
                video_count,
                avg_views,
                avg_likes,
                avg_comments,
                engagement_rate: metrics::engagement_rate(avg_likes, avg_comments, avg_views),
                fandom_activity: metrics::views_per_subscriber(avg_views, subscribers),
                recent_videos_30d: Some(rng.range(2, 40)),
                created_at: NaiveDate::from_ymd_opt(2009 + rng.range(0, 12) as i32, 1 + rng.range(0, 12) as u32, 1),
                collected_at: Some(collected_at),
            }
        })
        .collect()
}

fn mentions(rng: &mut SimpleRng) -> Vec<MemberMention> {
    let counts: Vec<u64> = MEMBERS.iter().map(|_| rng.range(300, 2500)).collect();
    let total: u64 = counts.iter().sum();
    MEMBERS
        .iter()
        .zip(&counts)
        .map(|(&member, &mention_count)| MemberMention {
            member: member.to_string(),
            mention_count,
            mention_rate: mention_count as f64 / total as f64 * 100.0,
        })
        .collect()
}

fn loyal_fans(mentions: &[MemberMention], rng: &mut SimpleRng) -> Vec<LoyalFanTier> {
    mentions
        .iter()
        .map(|m| {
            let total = m.mention_count;
            let super_fans = total * rng.range(3, 8) / 100;
            let loyal_fans = total * rng.range(10, 20) / 100;
            let regular_fans = total * rng.range(20, 30) / 100;
            let casual_fans = total - super_fans - loyal_fans - regular_fans;
            LoyalFanTier {
                member: m.member.clone(),
                casual_fans,
                regular_fans,
                loyal_fans,
                super_fans,
                loyal_rate: (loyal_fans + super_fans) as f64 / total as f64 * 100.0,
                super_fan_rate: super_fans as f64 / total as f64 * 100.0,
            }
        })
        .collect()
}

fn cooccurrence(rng: &mut SimpleRng) -> Vec<CooccurrencePair> {
    let mut pairs = Vec::new();
    for (i, a) in MEMBERS.iter().enumerate() {
        for b in &MEMBERS[i + 1..] {
            pairs.push(CooccurrencePair {
                member_1: a.to_string(),
                member_2: b.to_string(),
                pair: Some(format!("{a} & {b}")),
                count: rng.range(5, 400),
            });
        }
    }
    pairs
}

fn keyword(rng: &mut SimpleRng, pool: &[&str]) -> Option<String> {
    let a = pool[rng.range(0, pool.len() as u64) as usize];
    let b = pool[rng.range(0, pool.len() as u64) as usize];
    Some(if a == b { a.to_string() } else { format!("{a}, {b}") })
}

const VISUAL: [&str; 5] = ["handsome", "gorgeous", "visual", "cute", "stunning"];
const TALENT: [&str; 5] = ["vocals", "dance", "rap", "stage", "producing"];
const PERSONALITY: [&str; 4] = ["funny", "kind", "humble", "sweet"];
const LOVE: [&str; 4] = ["love", "bias", "saranghae", "proud"];
const TOP_WORDS: [&str; 5] = ["comeback", "army", "mv", "stream", "concert"];

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".to_string()));
    let prefix = args.next().unwrap_or_else(|| "bts".to_string());
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let collected_at = NaiveDate::from_ymd_opt(2025, 1, 15)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .context("invalid collection timestamp")?;

    write_csv(&out_dir, SourceId::Channels.file_name().as_str(), &channels(&mut rng, collected_at))?;

    let file = |kind| SourceId::group(prefix.as_str(), kind).file_name();

    let member_stats = mentions(&mut rng);
    let total_mentions: u64 = member_stats.iter().map(|m| m.mention_count).sum();
    let tiers = loyal_fans(&member_stats, &mut rng);
    let super_fans: u64 = tiers.iter().map(|t| t.super_fans).sum();
    let loyal: u64 = tiers.iter().map(|t| t.loyal_fans + t.super_fans).sum();

    let total_comments: u64 = LANGUAGES.iter().map(|(_, n)| n).sum();
    let languages: Vec<LanguageStat> = LANGUAGES
        .iter()
        .map(|&(language, comment_count)| LanguageStat {
            language: language.to_string(),
            comment_count,
            percentage: comment_count as f64 / total_comments as f64 * 100.0,
        })
        .collect();

    let videos: Vec<VideoEngagement> = (0..20)
        .map(|i| {
            let views = rng.range(2_000_000, 90_000_000);
            let likes = rng.jitter(views as f64 * 0.05, 0.5) as u64;
            let comments = rng.jitter(likes as f64 * 0.04, 0.5) as u64;
            VideoEngagement {
                video_id: format!("vid{i:03}"),
                title: format!("Official MV #{}", i + 1),
                published_at: NaiveDate::from_ymd_opt(2024, 1 + (i % 12) as u32, 1 + (i % 28) as u32),
                views,
                likes,
                comments,
                engagement_rate: metrics::engagement_rate(likes, comments, views),
            }
        })
        .collect();

    let summary = AnalysisSummary {
        artist: Some(prefix.to_uppercase()),
        total_comments,
        total_videos: videos.len() as u64,
        unique_authors: total_comments * 7 / 10,
        loyal_fan_rate: loyal as f64 / total_mentions as f64 * 100.0,
        super_fan_rate: super_fans as f64 / total_mentions as f64 * 100.0,
    };

    let mut regional = Vec::new();
    let mut region_keywords = Vec::new();
    let mut member_region_keywords = Vec::new();
    for region in REGIONS {
        region_keywords.push(RegionKeyword {
            region: region.to_string(),
            visual: keyword(&mut rng, &VISUAL),
            talent: keyword(&mut rng, &TALENT),
            personality: keyword(&mut rng, &PERSONALITY),
            love: keyword(&mut rng, &LOVE),
            top_words: keyword(&mut rng, &TOP_WORDS),
        });
        for member in MEMBERS {
            regional.push(RegionMember {
                region: region.to_string(),
                member: member.to_string(),
                mention_count: rng.range(10, 600),
            });
            member_region_keywords.push(MemberRegionKeyword {
                member: member.to_string(),
                region: region.to_string(),
                visual: keyword(&mut rng, &VISUAL),
                talent: keyword(&mut rng, &TALENT),
                personality: None,
                love: keyword(&mut rng, &LOVE),
                top_words: None,
            });
        }
    }

    let member_keywords: Vec<MemberKeyword> = MEMBERS
        .iter()
        .map(|member| MemberKeyword {
            member: member.to_string(),
            visual: keyword(&mut rng, &VISUAL),
            talent: keyword(&mut rng, &TALENT),
            personality: keyword(&mut rng, &PERSONALITY),
            love: keyword(&mut rng, &LOVE),
            top_words: keyword(&mut rng, &TOP_WORDS),
        })
        .collect();

    write_csv(&out_dir, &file(AnalysisKind::Summary), &[summary])?;
    write_csv(&out_dir, &file(AnalysisKind::LanguageStats), &languages)?;
    write_csv(&out_dir, &file(AnalysisKind::MemberStats), &member_stats)?;
    write_csv(&out_dir, &file(AnalysisKind::RegionMember), &regional)?;
    write_csv(&out_dir, &file(AnalysisKind::MemberCooccurrence), &cooccurrence(&mut rng))?;
    write_csv(&out_dir, &file(AnalysisKind::MemberKeywords), &member_keywords)?;
    write_csv(&out_dir, &file(AnalysisKind::RegionKeywords), &region_keywords)?;
    write_csv(&out_dir, &file(AnalysisKind::MemberRegionKeywords), &member_region_keywords)?;
    write_csv(&out_dir, &file(AnalysisKind::LoyalFans), &tiers)?;
    write_csv(&out_dir, &file(AnalysisKind::VideoEngagement), &videos)?;

    log::info!(
        "Sample data for '{prefix}' written to {} ({} files)",
        out_dir.display(),
        AnalysisKind::ALL.len() + 1
    );
    Ok(())
}
