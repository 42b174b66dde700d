//! A remote data service endpoint and the sites it exposes.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::cache::CacheStore;
use crate::error::{HydroError, Result};
use crate::gateway::{SiteDetailPayload, WaterService};
use crate::lazy::LazyField;
use crate::models::{Measurement, Site, TimeSeries, Units, VariableFrame};

/// The site mapping owned by a source: site code to site entity.
pub type SiteMap = BTreeMap<String, Site>;

/// A hydrological data service endpoint plus the sites it exposes.
///
/// Owns the gateway handle bound to its URL and, optionally, a cache store.
/// The site map starts unpopulated and fills on first access to
/// [`sites`](Self::sites) (or any of the per-site accessors, which populate
/// it as a prerequisite). Construction performs no I/O.
///
/// Caching is decided entirely by construction: build with
/// [`with_cache`](Self::with_cache) to consult and feed a store, or with
/// [`new`](Self::new) for always-fetch behavior. A non-empty cached result
/// is adopted as-is, with no freshness check; within one process lifetime a
/// populated source never refreshes.
pub struct Source {
    url: String,
    gateway: Box<dyn WaterService>,
    cache: Option<Box<dyn CacheStore>>,
    sites: LazyField<SiteMap>,
}

impl Source {
    /// A source with caching disabled.
    pub fn new(url: impl Into<String>, gateway: Box<dyn WaterService>) -> Self {
        Self {
            url: url.into(),
            gateway,
            cache: None,
            sites: LazyField::new(),
        }
    }

    /// A source that consults `cache` before the gateway and writes fetched
    /// collections back to it.
    pub fn with_cache(
        url: impl Into<String>,
        gateway: Box<dyn WaterService>,
        cache: Box<dyn CacheStore>,
    ) -> Self {
        Self {
            url: url.into(),
            gateway,
            cache: Some(cache),
            sites: LazyField::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// The full site mapping, populated on first access.
    pub fn sites(&mut self) -> Result<&SiteMap> {
        self.materialized().map(|(map, _, _)| &*map)
    }

    /// One site by code, populating the site map first if needed.
    pub fn site(&mut self, code: &str) -> Result<&Site> {
        let (map, _, _) = self.materialized()?;
        map.get(code)
            .ok_or_else(|| HydroError::UnknownSite(code.to_string()))
    }

    /// The detail payload for one site, fetching it first if needed.
    pub fn site_info(&mut self, code: &str) -> Result<&SiteDetailPayload> {
        let (map, service, _) = self.materialized()?;
        site_entry(map, code)?.site_info(service)
    }

    /// The series catalog for one site, populating it first if needed.
    pub fn timeseries_list(&mut self, code: &str) -> Result<&[TimeSeries]> {
        let (map, service, store) = self.materialized()?;
        site_entry(map, code)?.timeseries_list(service, store)
    }

    /// The tabular join of one site's series, building it first if needed.
    pub fn dataframe(&mut self, code: &str) -> Result<&VariableFrame> {
        let (map, service, store) = self.materialized()?;
        site_entry(map, code)?.dataframe(service, store)
    }

    /// The measurements of one site's series for `variable_code`, fetching
    /// whatever the chain still misses.
    pub fn values(&mut self, code: &str, variable_code: &str) -> Result<&[Measurement]> {
        let (map, service, store) = self.materialized()?;
        site_entry(map, code)?.series_for(variable_code, service, store)
    }

    /// The unit descriptor of one site's series for `variable_code`.
    pub fn quantity(&mut self, code: &str, variable_code: &str) -> Result<&Units> {
        let (map, service, store) = self.materialized()?;
        site_entry(map, code)?.quantity_for(variable_code, service, store)
    }

    /// Populate the site map if needed and hand out the map together with
    /// the collaborator handles, so per-site accessors can keep borrowing
    /// from disjoint fields.
    fn materialized(
        &mut self,
    ) -> Result<(&mut SiteMap, &dyn WaterService, Option<&dyn CacheStore>)> {
        let Self {
            url,
            gateway,
            cache,
            sites,
        } = self;
        let service: &dyn WaterService = &**gateway;
        let store: Option<&dyn CacheStore> = cache.as_deref();
        let map = sites.get_or_populate_mut(|| fetch_site_map(url, service, store))?;
        Ok((map, service, store))
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("url", &self.url)
            .field("cache_enabled", &self.cache.is_some())
            .field("sites_populated", &self.sites.is_populated())
            .finish()
    }
}

fn site_entry<'a>(map: &'a mut SiteMap, code: &str) -> Result<&'a mut Site> {
    map.get_mut(code)
        .ok_or_else(|| HydroError::UnknownSite(code.to_string()))
}

fn fetch_site_map(
    url: &str,
    service: &dyn WaterService,
    cache: Option<&dyn CacheStore>,
) -> Result<SiteMap> {
    if let Some(store) = cache {
        let cached = store.get_cached_sites(url).map_err(HydroError::Cache)?;
        if !cached.is_empty() {
            debug!(source = %url, count = cached.len(), "using cached site map");
            return Ok(cached);
        }
    }

    // empty filter means "all sites"
    let descriptors = service.list_sites("").map_err(HydroError::Service)?;
    let map: SiteMap = descriptors
        .into_iter()
        .map(|descriptor| {
            let code = descriptor.code.clone();
            (code, Site::from_descriptor(descriptor, url))
        })
        .collect();

    if let Some(store) = cache {
        store.put_sites(url, &map).map_err(HydroError::Cache)?;
    }
    debug!(source = %url, count = map.len(), "materialized site map");
    Ok(map)
}
