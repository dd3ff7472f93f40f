use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// UTF-8 byte-order mark so spreadsheet tools pick the right encoding.
pub const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Serialize rows as CSV with a header row, prefixed with a BOM.
pub fn to_csv_bytes<'a, T: Serialize + 'a>(rows: impl IntoIterator<Item = &'a T>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(BOM.to_vec());
    for row in rows {
        writer.serialize(row).context("serializing CSV row")?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV: {}", e.error()))
}

/// `kfantrix_data` + 2026-10-14 → `kfantrix_data_20261014.csv`.
pub fn export_file_name(stem: &str, date: NaiveDate) -> String {
    format!("{stem}_{}.csv", date.format("%Y%m%d"))
}

pub fn write_export<'a, T: Serialize + 'a>(
    path: &Path,
    rows: impl IntoIterator<Item = &'a T>,
) -> Result<usize> {
    let bytes = to_csv_bytes(rows)?;
    std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} bytes to {}", bytes.len(), path.display());
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_records;
    use crate::data::model::{ChannelRecord, MemberMention};
    use tempfile::TempDir;

    fn mentions() -> Vec<MemberMention> {
        vec![
            MemberMention {
                member: "민지".into(),
                mention_count: 120,
                mention_rate: 40.0,
            },
            MemberMention {
                member: "Hanni".into(),
                mention_count: 180,
                mention_rate: 60.0,
            },
        ]
    }

    #[test]
    fn output_starts_with_bom_and_header() {
        let rows = mentions();
        let bytes = to_csv_bytes(&rows).unwrap();
        assert!(bytes.starts_with(BOM));

        let text = std::str::from_utf8(&bytes[BOM.len()..]).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("member,mention_count,mention_rate"));
        assert_eq!(lines.next(), Some("민지,120,40.0"));
    }

    #[test]
    fn file_name_carries_the_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        assert_eq!(
            export_file_name("kfantrix_data", date),
            "kfantrix_data_20261014.csv"
        );
    }

    #[test]
    fn exported_channels_load_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![ChannelRecord {
            artist: "IU".into(),
            category: "Solo".into(),
            company: Some("EDAM".into()),
            subscribers: 10_000_000,
            total_views: 1,
            video_count: 1,
            avg_views: 1,
            avg_likes: 1,
            avg_comments: 1,
            engagement_rate: Some(200.0),
            fandom_activity: None,
            recent_videos_30d: Some(3),
            created_at: NaiveDate::from_ymd_opt(2008, 9, 18),
            collected_at: None,
        }];

        write_export(&path, rows.iter()).unwrap();
        let back: Vec<ChannelRecord> = read_records(&path).unwrap();
        assert_eq!(back, rows);
    }
}
