//! In-process cache store.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::cache::CacheStore;
use crate::error::BoxError;
use crate::models::{SiteMap, TimeSeries};

/// A cache store holding whole entity clones in process memory.
///
/// Because entities are cloned as-is, already-materialized lazy state
/// (fetched detail payloads, value series) survives the round trip; a
/// source adopting a cached site map gets whatever was fetched by the
/// source that stored it.
///
/// Interior mutability via `RefCell` matches the model's single-threaded
/// contract; this type is not thread-safe.
#[derive(Debug, Default)]
pub struct MemoryCache {
    sites: RefCell<HashMap<String, SiteMap>>,
    series: RefCell<HashMap<(String, String), Vec<TimeSeries>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCache {
    fn get_cached_sites(&self, source_url: &str) -> Result<SiteMap, BoxError> {
        Ok(self
            .sites
            .borrow()
            .get(source_url)
            .cloned()
            .unwrap_or_default())
    }

    fn put_sites(&self, source_url: &str, sites: &SiteMap) -> Result<(), BoxError> {
        self.sites
            .borrow_mut()
            .insert(source_url.to_string(), sites.clone());
        Ok(())
    }

    fn get_cached_timeseries(
        &self,
        network: &str,
        code: &str,
    ) -> Result<Vec<TimeSeries>, BoxError> {
        Ok(self
            .series
            .borrow()
            .get(&(network.to_string(), code.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn put_timeseries(
        &self,
        network: &str,
        code: &str,
        series: &[TimeSeries],
    ) -> Result<(), BoxError> {
        self.series
            .borrow_mut()
            .insert((network.to_string(), code.to_string()), series.to_vec());
        Ok(())
    }
}
