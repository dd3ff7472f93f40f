use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_ENV: &str = "KFANTRIX_CONFIG";
pub const DATA_DIR_ENV: &str = "KFANTRIX_DATA_DIR";
pub const DEFAULT_CONFIG_FILE: &str = "kfantrix.toml";
pub const DEFAULT_ACCENT: &str = "#E91E63";

// ---------------------------------------------------------------------------
// Group sections and per-group settings
// ---------------------------------------------------------------------------

/// Optional screens a group dashboard can enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSection {
    Summary,
    Languages,
    Members,
    Cooccurrence,
    Keywords,
    LoyalFans,
    Videos,
}

impl GroupSection {
    pub const ALL: [GroupSection; 7] = [
        GroupSection::Summary,
        GroupSection::Languages,
        GroupSection::Members,
        GroupSection::Cooccurrence,
        GroupSection::Keywords,
        GroupSection::LoyalFans,
        GroupSection::Videos,
    ];
}

fn all_sections() -> Vec<GroupSection> {
    GroupSection::ALL.to_vec()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupConfig {
    /// File prefix, e.g. `bts` for `bts_summary.csv`.
    pub prefix: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Fixed member order for the co-occurrence matrix.
    #[serde(default)]
    pub members: Vec<String>,
    /// Hex colour such as `#9C27B0`.
    #[serde(default)]
    pub accent: Option<String>,
    #[serde(default = "all_sections")]
    pub sections: Vec<GroupSection>,
}

impl GroupConfig {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: None,
            members: Vec::new(),
            accent: None,
            sections: all_sections(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.prefix)
    }

    pub fn accent(&self) -> &str {
        self.accent.as_deref().unwrap_or(DEFAULT_ACCENT)
    }

    pub fn enables(&self, section: GroupSection) -> bool {
        self.sections.contains(&section)
    }
}

// ---------------------------------------------------------------------------
// File config (everything optional) and resolved config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub data_dir: Option<String>,
    pub logging_level: Option<String>,
    pub top_n: Option<usize>,
    pub accent: Option<String>,
    pub groups: Vec<GroupConfig>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub logging_level: String,
    /// Length of the ranking lists.
    pub top_n: usize,
    /// Accent of the channel dashboard.
    pub accent: String,
    pub groups: Vec<GroupConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::from_file_config(FileConfig::default())
    }
}

impl DashboardConfig {
    pub fn from_file_config(file: FileConfig) -> Self {
        Self {
            data_dir: PathBuf::from(file.data_dir.unwrap_or_else(|| ".".to_string())),
            logging_level: file.logging_level.unwrap_or_else(|| "info".to_string()),
            top_n: file.top_n.unwrap_or(3).max(1),
            accent: file.accent.unwrap_or_else(|| DEFAULT_ACCENT.to_string()),
            groups: file.groups,
        }
    }

    /// Config file from `KFANTRIX_CONFIG`, else `./kfantrix.toml` if present,
    /// else defaults. `KFANTRIX_DATA_DIR` overrides the data directory.
    pub fn resolve() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let path = explicit.or_else(|| {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.is_file().then_some(default)
        });

        let file = match &path {
            Some(p) => FileConfig::load(p)?,
            None => FileConfig::default(),
        };
        let mut config = Self::from_file_config(file);
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn group(&self, prefix: &str) -> Option<&GroupConfig> {
        self.groups.iter().find(|g| g.prefix == prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_file() {
        let config = DashboardConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.logging_level, "info");
        assert_eq!(config.top_n, 3);
        assert_eq!(config.accent, DEFAULT_ACCENT);
        assert!(config.groups.is_empty());
    }

    #[test]
    fn parses_groups_and_sections() {
        let file = FileConfig::parse(
            r##"
data_dir = "data"
top_n = 5

[[groups]]
prefix = "bts"
name = "BTS"
members = ["RM", "Jin", "SUGA"]
accent = "#9C27B0"
sections = ["summary", "cooccurrence", "loyal_fans"]

[[groups]]
prefix = "nj"
"##,
        )
        .unwrap();
        let config = DashboardConfig::from_file_config(file);

        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.top_n, 5);

        let bts = config.group("bts").unwrap();
        assert_eq!(bts.display_name(), "BTS");
        assert_eq!(bts.accent(), "#9C27B0");
        assert!(bts.enables(GroupSection::LoyalFans));
        assert!(!bts.enables(GroupSection::Videos));

        let nj = config.group("nj").unwrap();
        assert_eq!(nj.display_name(), "nj");
        assert_eq!(nj.accent(), DEFAULT_ACCENT);
        assert_eq!(nj.sections.len(), GroupSection::ALL.len());
        assert!(config.group("twice").is_none());
    }

    #[test]
    fn rejects_unknown_section() {
        assert!(FileConfig::parse("[[groups]]\nprefix = \"x\"\nsections = [\"pricing\"]\n").is_err());
    }

    #[test]
    fn load_reports_path_on_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kfantrix.toml");
        std::fs::write(&path, "top_n = \"three\"").unwrap();

        let err = FileConfig::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("kfantrix.toml"));
    }
}
