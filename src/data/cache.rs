use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::{load_table, MissingSource};
use super::model::Record;
use super::source::SourceId;

type CachedTable = Arc<dyn Any + Send + Sync>;

// ---------------------------------------------------------------------------
// TableCache – load once per source, keep until reset
// ---------------------------------------------------------------------------

/// Loaded tables keyed by source. Failures are cached as well, so a missing
/// file is only probed once until the cache is cleared.
pub struct TableCache {
    data_dir: PathBuf,
    entries: HashMap<SourceId, Result<CachedTable, MissingSource>>,
}

impl TableCache {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            entries: HashMap::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Point the cache at another directory. Everything loaded so far is dropped.
    pub fn set_data_dir(&mut self, data_dir: impl Into<PathBuf>) {
        self.data_dir = data_dir.into();
        self.clear();
    }

    /// Fetch a table, loading it on first access.
    pub fn get<T: Record>(&mut self, source: &SourceId) -> Result<Arc<Vec<T>>, MissingSource> {
        if !self.entries.contains_key(source) {
            let loaded = load_table::<T>(&self.data_dir, source)
                .map(|rows| Arc::new(rows) as CachedTable);
            self.entries.insert(source.clone(), loaded);
        }

        match self.entries.get(source) {
            Some(Ok(table)) => Arc::clone(table).downcast::<Vec<T>>().map_err(|_| {
                MissingSource::invalid(
                    source.clone(),
                    format!("cached as a different record type than {}", std::any::type_name::<T>()),
                )
            }),
            Some(Err(missing)) => Err(missing.clone()),
            None => Err(MissingSource::not_found(source.clone())),
        }
    }

    pub fn is_cached(&self, source: &SourceId) -> bool {
        self.entries.contains_key(source)
    }

    /// Forget one source so the next access reads the file again.
    pub fn invalidate(&mut self, source: &SourceId) {
        self.entries.remove(source);
    }

    pub fn clear(&mut self) {
        log::info!("Clearing {} cached tables", self.entries.len());
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{LanguageStat, MemberMention};
    use crate::data::source::AnalysisKind;
    use tempfile::TempDir;

    fn language_source() -> SourceId {
        SourceId::group("g", AnalysisKind::LanguageStats)
    }

    fn write_languages(dir: &TempDir, body: &str) {
        std::fs::write(dir.path().join("g_language_stats.csv"), body).unwrap();
    }

    #[test]
    fn serves_cached_table_until_invalidated() {
        let dir = TempDir::new().unwrap();
        write_languages(&dir, "language,comment_count,percentage\nko,10,50.0\nen,10,50.0\n");
        let mut cache = TableCache::new(dir.path());

        let first = cache.get::<LanguageStat>(&language_source()).unwrap();
        assert_eq!(first.len(), 2);

        // The file changing on disk is not observed while cached.
        write_languages(&dir, "language,comment_count,percentage\nko,10,100.0\n");
        let again = cache.get::<LanguageStat>(&language_source()).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        cache.invalidate(&language_source());
        let reloaded = cache.get::<LanguageStat>(&language_source()).unwrap();
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn caches_missing_sources_until_cleared() {
        let dir = TempDir::new().unwrap();
        let mut cache = TableCache::new(dir.path());

        assert!(cache.get::<LanguageStat>(&language_source()).unwrap_err().is_not_found());
        assert!(cache.is_cached(&language_source()));

        write_languages(&dir, "language,comment_count,percentage\nko,1,100.0\n");
        assert!(cache.get::<LanguageStat>(&language_source()).is_err());

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get::<LanguageStat>(&language_source()).unwrap().len(), 1);
    }

    #[test]
    fn wrong_record_type_is_reported_as_missing() {
        let dir = TempDir::new().unwrap();
        write_languages(&dir, "language,comment_count,percentage\nko,1,100.0\n");
        let mut cache = TableCache::new(dir.path());

        cache.get::<LanguageStat>(&language_source()).unwrap();
        let err = cache.get::<MemberMention>(&language_source()).unwrap_err();
        assert!(!err.is_not_found());
    }

    #[test]
    fn changing_data_dir_drops_entries() {
        let dir = TempDir::new().unwrap();
        let mut cache = TableCache::new(dir.path());
        let _ = cache.get::<LanguageStat>(&language_source());
        assert_eq!(cache.len(), 1);

        let other = TempDir::new().unwrap();
        cache.set_data_dir(other.path());
        assert!(cache.is_empty());
        assert_eq!(cache.data_dir(), other.path());
    }
}
