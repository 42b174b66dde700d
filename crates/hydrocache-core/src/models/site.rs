//! A monitoring site and its lazily fetched detail, catalog and frame.

use std::fmt;

use geo_types::Point;
use tracing::debug;

use crate::cache::CacheStore;
use crate::error::{HydroError, Result};
use crate::gateway::{SiteDescriptor, SiteDetailPayload, WaterService};
use crate::lazy::LazyField;
use crate::models::{Measurement, TimeSeries, Units, Variable, VariableFrame};

/// A monitoring location belonging to one source.
///
/// Identity is the `(network, code)` pair, unique within a source. Three
/// attributes are deferred until first access:
///
/// - [`site_info`](Self::site_info): the raw site-detail payload,
/// - [`timeseries_list`](Self::timeseries_list): the series catalog, built
///   from the detail payload (or adopted from a cache store),
/// - [`dataframe`](Self::dataframe): the tabular join of every series.
///
/// Construction performs no I/O. The back-reference to the owning source is
/// its URL, a non-owning identifier.
#[derive(Debug, Clone)]
pub struct Site {
    network: String,
    code: String,
    name: String,
    id: Option<i64>,
    location: Point<f64>,
    source_url: String,
    site_info: LazyField<SiteDetailPayload>,
    timeseries: LazyField<Vec<TimeSeries>>,
    frame: LazyField<VariableFrame>,
}

impl Site {
    /// Build a site entity from a listing descriptor, bound to the source
    /// it came from.
    pub fn from_descriptor(descriptor: SiteDescriptor, source_url: &str) -> Self {
        Self {
            network: descriptor.network,
            code: descriptor.code,
            name: descriptor.name,
            id: descriptor.id,
            location: Point::new(descriptor.longitude, descriptor.latitude),
            source_url: source_url.to_string(),
            site_info: LazyField::new(),
            timeseries: LazyField::new(),
            frame: LazyField::new(),
        }
    }

    /// Snapshot of the identity attributes, in listing form. Used by cache
    /// stores that persist descriptors rather than whole entities.
    pub fn descriptor(&self) -> SiteDescriptor {
        SiteDescriptor {
            network: self.network.clone(),
            code: self.code.clone(),
            name: self.name.clone(),
            id: self.id,
            latitude: self.latitude(),
            longitude: self.longitude(),
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Location as a point with longitude on x and latitude on y.
    pub fn location(&self) -> Point<f64> {
        self.location
    }

    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }

    /// URL of the owning source.
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// The `network:code` form used in remote detail and value queries.
    pub fn network_code(&self) -> String {
        format!("{}:{}", self.network, self.code)
    }

    /// The site-detail payload, fetched on first access.
    ///
    /// The payload is validated before it is kept: a response describing
    /// anything other than exactly one site with exactly one series catalog
    /// fails with a shape error and leaves this attribute unset, so a later
    /// access retries.
    pub fn site_info(&mut self, service: &dyn WaterService) -> Result<&SiteDetailPayload> {
        let network_code = self.network_code();
        self.site_info
            .get_or_populate(|| fetch_site_detail(&network_code, service))
    }

    /// The series catalog, populated on first access.
    ///
    /// A configured cache store is consulted first; a non-empty cached
    /// catalog is adopted as-is with no remote call. Otherwise the catalog
    /// is derived from [`site_info`](Self::site_info) (fetching it first if
    /// needed) and written back to the store.
    pub fn timeseries_list(
        &mut self,
        service: &dyn WaterService,
        cache: Option<&dyn CacheStore>,
    ) -> Result<&[TimeSeries]> {
        let Self {
            network,
            code,
            site_info,
            timeseries,
            ..
        } = self;
        let (network, code) = (network.as_str(), code.as_str());
        timeseries
            .get_or_populate(|| fetch_series_catalog(network, code, site_info, service, cache))
            .map(Vec::as_slice)
    }

    /// The variable descriptors of the site's catalog, populating the
    /// catalog first if needed.
    pub fn variables(
        &mut self,
        service: &dyn WaterService,
        cache: Option<&dyn CacheStore>,
    ) -> Result<Vec<Variable>> {
        Ok(self
            .timeseries_list(service, cache)?
            .iter()
            .map(|series| series.variable().clone())
            .collect())
    }

    /// The tabular join of all the site's series, built on first access.
    ///
    /// Populates the series catalog first if needed, then fetches every
    /// series' values (one remote call per still-unfetched series) and
    /// aligns them by timestamp. The frame is built at most once per
    /// catalog population.
    pub fn dataframe(
        &mut self,
        service: &dyn WaterService,
        cache: Option<&dyn CacheStore>,
    ) -> Result<&VariableFrame> {
        let Self {
            network,
            code,
            site_info,
            timeseries,
            frame,
            ..
        } = self;
        let (network, code) = (network.as_str(), code.as_str());
        let catalog = timeseries
            .get_or_populate_mut(|| fetch_series_catalog(network, code, site_info, service, cache))?;
        frame.get_or_populate(|| build_frame(catalog, service))
    }

    /// The measurements of the first catalog entry for `variable_code`,
    /// fetching catalog and values as needed.
    pub fn series_for(
        &mut self,
        variable_code: &str,
        service: &dyn WaterService,
        cache: Option<&dyn CacheStore>,
    ) -> Result<&[Measurement]> {
        self.series_entry(variable_code, service, cache)?
            .series(service)
    }

    /// The unit descriptor of the first catalog entry for `variable_code`,
    /// fetching catalog and values as needed.
    pub fn quantity_for(
        &mut self,
        variable_code: &str,
        service: &dyn WaterService,
        cache: Option<&dyn CacheStore>,
    ) -> Result<&Units> {
        self.series_entry(variable_code, service, cache)?
            .quantity(service)
    }

    /// The detail payload, if already fetched. Never triggers a remote
    /// call.
    pub fn cached_site_info(&self) -> Option<&SiteDetailPayload> {
        self.site_info.get()
    }

    /// The series catalog, if already populated. Never triggers a remote
    /// call.
    pub fn cached_timeseries(&self) -> Option<&[TimeSeries]> {
        self.timeseries.get().map(Vec::as_slice)
    }

    /// The frame, if already built. Never triggers a remote call.
    pub fn cached_dataframe(&self) -> Option<&VariableFrame> {
        self.frame.get()
    }

    fn series_entry(
        &mut self,
        variable_code: &str,
        service: &dyn WaterService,
        cache: Option<&dyn CacheStore>,
    ) -> Result<&mut TimeSeries> {
        let Self {
            network,
            code,
            site_info,
            timeseries,
            ..
        } = self;
        let (network, code) = (network.as_str(), code.as_str());
        let catalog = timeseries
            .get_or_populate_mut(|| fetch_series_catalog(network, code, site_info, service, cache))?;
        catalog
            .iter_mut()
            .find(|series| series.variable().code == variable_code)
            .ok_or_else(|| HydroError::UnknownSeries {
                site: code.to_string(),
                variable: variable_code.to_string(),
            })
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.code)
    }
}

fn fetch_site_detail(network_code: &str, service: &dyn WaterService) -> Result<SiteDetailPayload> {
    let payload = service
        .get_site_detail(network_code)
        .map_err(HydroError::Service)?;
    // validated before it is committed, so a bad payload never sticks
    payload.validate_single(network_code)?;
    debug!(site = %network_code, "fetched site detail");
    Ok(payload)
}

fn fetch_series_catalog(
    network: &str,
    code: &str,
    site_info: &mut LazyField<SiteDetailPayload>,
    service: &dyn WaterService,
    cache: Option<&dyn CacheStore>,
) -> Result<Vec<TimeSeries>> {
    if let Some(store) = cache {
        let cached = store
            .get_cached_timeseries(network, code)
            .map_err(HydroError::Cache)?;
        if !cached.is_empty() {
            debug!(site = code, count = cached.len(), "using cached series catalog");
            return Ok(cached);
        }
    }

    let network_code = format!("{network}:{code}");
    let detail = site_info.get_or_populate(|| fetch_site_detail(&network_code, service))?;
    let catalog = detail.single_catalog(&network_code)?;
    let list: Vec<TimeSeries> = catalog
        .series
        .iter()
        .map(|descriptor| TimeSeries::from_descriptor(descriptor.clone(), network, code))
        .collect();

    if let Some(store) = cache {
        store
            .put_timeseries(network, code, &list)
            .map_err(HydroError::Cache)?;
    }
    debug!(site = %network_code, count = list.len(), "materialized series catalog");
    Ok(list)
}

fn build_frame(catalog: &mut [TimeSeries], service: &dyn WaterService) -> Result<VariableFrame> {
    let mut columns = Vec::with_capacity(catalog.len());
    for series in catalog.iter_mut() {
        let code = series.variable().code.clone();
        let points = series.series(service)?.to_vec();
        columns.push((code, points));
    }
    Ok(VariableFrame::from_columns(columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> SiteDescriptor {
        SiteDescriptor {
            network: "NWISDV".to_string(),
            code: "01234".to_string(),
            name: "Example Creek".to_string(),
            id: Some(42),
            latitude: 30.47,
            longitude: -97.79,
        }
    }

    #[test]
    fn construction_is_pure_and_keeps_identity() {
        let site = Site::from_descriptor(descriptor(), "http://example.org/wml");
        assert_eq!(site.network(), "NWISDV");
        assert_eq!(site.code(), "01234");
        assert_eq!(site.network_code(), "NWISDV:01234");
        assert_eq!(site.source_url(), "http://example.org/wml");
        assert_eq!(site.latitude(), 30.47);
        assert_eq!(site.longitude(), -97.79);
        assert!(site.cached_site_info().is_none());
        assert!(site.cached_timeseries().is_none());
        assert!(site.cached_dataframe().is_none());
    }

    #[test]
    fn descriptor_round_trips() {
        let site = Site::from_descriptor(descriptor(), "http://example.org/wml");
        assert_eq!(site.descriptor(), descriptor());
    }

    #[test]
    fn display_names_site_and_code() {
        let site = Site::from_descriptor(descriptor(), "http://example.org/wml");
        assert_eq!(site.to_string(), "Example Creek [01234]");
    }
}
