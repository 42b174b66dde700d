//! JSON-file-backed cache store.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::cache::CacheStore;
use crate::error::BoxError;
use crate::gateway::{SeriesDescriptor, SiteDescriptor};
use crate::models::{Site, SiteMap, TimeSeries};

/// Envelope written around every cached collection.
///
/// `cached_at` records when the data was written. It is informational
/// only: reads never compare it against a deadline, because a non-empty
/// cache entry is authoritative for as long as it exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }
}

/// A cache store keeping one pretty-printed JSON file per cached
/// collection under a directory.
///
/// What is persisted are identity snapshots ([`SiteDescriptor`] /
/// [`SeriesDescriptor`]), not whole entities; sites and series read back
/// from disk start with fresh, unpopulated lazy attributes.
pub struct JsonFileCache {
    cache_dir: PathBuf,
}

impl JsonFileCache {
    /// Open a store rooted at `cache_dir`, creating the directory if
    /// needed.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let cache_dir = cache_dir.into();
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    /// The platform cache location for this crate, when one exists.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("hydrocache"))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{name}.json"))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {name}"))?;
        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {name}"))?;
        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write cache file: {name}"))?;
        Ok(())
    }

    fn sites_file(source_url: &str) -> String {
        format!("sites_{}", sanitize(source_url))
    }

    fn series_file(network: &str, code: &str) -> String {
        format!("series_{}_{}", sanitize(network), sanitize(code))
    }
}

impl CacheStore for JsonFileCache {
    fn get_cached_sites(&self, source_url: &str) -> Result<SiteMap, BoxError> {
        let cached: Option<CachedData<Vec<SiteDescriptor>>> = self
            .load(&Self::sites_file(source_url))
            .map_err(BoxError::from)?;
        let Some(cached) = cached else {
            return Ok(SiteMap::new());
        };
        debug!(
            source = %source_url,
            count = cached.data.len(),
            age_minutes = cached.age_minutes(),
            "loaded cached site map"
        );
        Ok(cached
            .data
            .into_iter()
            .map(|descriptor| {
                let code = descriptor.code.clone();
                (code, Site::from_descriptor(descriptor, source_url))
            })
            .collect())
    }

    fn put_sites(&self, source_url: &str, sites: &SiteMap) -> Result<(), BoxError> {
        let records: Vec<SiteDescriptor> = sites.values().map(Site::descriptor).collect();
        self.save(&Self::sites_file(source_url), &records)
            .map_err(BoxError::from)
    }

    fn get_cached_timeseries(
        &self,
        network: &str,
        code: &str,
    ) -> Result<Vec<TimeSeries>, BoxError> {
        let cached: Option<CachedData<Vec<SeriesDescriptor>>> = self
            .load(&Self::series_file(network, code))
            .map_err(BoxError::from)?;
        let Some(cached) = cached else {
            return Ok(Vec::new());
        };
        debug!(
            site = code,
            count = cached.data.len(),
            age_minutes = cached.age_minutes(),
            "loaded cached series catalog"
        );
        Ok(cached
            .data
            .into_iter()
            .map(|descriptor| TimeSeries::from_descriptor(descriptor, network, code))
            .collect())
    }

    fn put_timeseries(
        &self,
        network: &str,
        code: &str,
        series: &[TimeSeries],
    ) -> Result<(), BoxError> {
        let records: Vec<SeriesDescriptor> = series.iter().map(TimeSeries::descriptor).collect();
        self.save(&Self::series_file(network, code), &records)
            .map_err(BoxError::from)
    }
}

/// Collapse anything that could upset a filesystem into underscores.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::{Units, Variable};

    fn store() -> (tempfile::TempDir, JsonFileCache) {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = JsonFileCache::new(dir.path().join("cache")).expect("cache dir");
        (dir, cache)
    }

    fn site_map() -> SiteMap {
        let descriptor = SiteDescriptor {
            network: "NWISDV".to_string(),
            code: "01234".to_string(),
            name: "Example Creek".to_string(),
            id: Some(7),
            latitude: 30.47,
            longitude: -97.79,
        };
        let site = Site::from_descriptor(descriptor, "http://example.org/wml");
        let mut map = SiteMap::new();
        map.insert(site.code().to_string(), site);
        map
    }

    fn catalog() -> Vec<TimeSeries> {
        let descriptor = SeriesDescriptor {
            variable: Variable {
                name: "Discharge".to_string(),
                code: "00060".to_string(),
                id: Some(1),
                vocabulary: "NWISDV".to_string(),
                units: Units {
                    name: "cubic feet per second".to_string(),
                    abbreviation: "cfs".to_string(),
                    code: "35".to_string(),
                },
                no_data_value: -999999.0,
            },
            value_count: Some(365),
            method: None,
            quality_control_level: Some("1".to_string()),
            begin_datetime: Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            end_datetime: Utc.with_ymd_and_hms(2020, 12, 31, 0, 0, 0).unwrap(),
        };
        vec![TimeSeries::from_descriptor(descriptor, "NWISDV", "01234")]
    }

    #[test]
    fn missing_files_read_back_empty() {
        let (_dir, cache) = store();
        assert!(cache.get_cached_sites("http://example.org/wml").unwrap().is_empty());
        assert!(cache
            .get_cached_timeseries("NWISDV", "01234")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn sites_round_trip_as_descriptors() {
        let (_dir, cache) = store();
        let map = site_map();
        cache.put_sites("http://example.org/wml", &map).unwrap();

        let cached = cache.get_cached_sites("http://example.org/wml").unwrap();
        assert_eq!(cached.len(), 1);
        let site = &cached["01234"];
        assert_eq!(site.network(), "NWISDV");
        assert_eq!(site.name(), "Example Creek");
        assert_eq!(site.source_url(), "http://example.org/wml");
        // only identity survives the disk round trip
        assert!(site.cached_site_info().is_none());
        assert!(site.cached_timeseries().is_none());
    }

    #[test]
    fn series_round_trip_as_descriptors() {
        let (_dir, cache) = store();
        let series = catalog();
        cache.put_timeseries("NWISDV", "01234", &series).unwrap();

        let cached = cache.get_cached_timeseries("NWISDV", "01234").unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].variable().code, "00060");
        assert_eq!(cached[0].site_code(), "01234");
        assert!(!cached[0].is_fetched());
    }

    #[test]
    fn fresh_entries_report_zero_age() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert!(cached.age_minutes() <= 1);
    }

    #[test]
    fn sanitize_keeps_filenames_flat() {
        assert_eq!(
            sanitize("http://example.org/wml?v=1"),
            "http___example.org_wml_v_1"
        );
        assert_eq!(sanitize("NWISDV"), "NWISDV");
    }
}
