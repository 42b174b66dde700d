//! The cache store interface.

use std::rc::Rc;

use crate::error::BoxError;
use crate::models::{SiteMap, TimeSeries};

/// Persistence for previously materialized sites and series catalogs.
///
/// A store is consulted before the gateway and fed after a fetch. The
/// contract is deliberately simple: a non-empty result is adopted as-is
/// (the model applies no freshness check, TTL or partial merge), and an
/// empty result means "nothing cached" and falls through to the remote
/// path. Backend failures are passed through to the caller unchanged.
///
/// Stores are accessed read-then-write without transactional guarantees
/// and are not required to be thread-safe; the model itself is
/// single-threaded.
pub trait CacheStore {
    /// All sites previously stored for the source at `source_url`, keyed
    /// by site code. Empty when nothing is cached.
    fn get_cached_sites(&self, source_url: &str) -> Result<SiteMap, BoxError>;

    /// Store the full site mapping for the source at `source_url`.
    fn put_sites(&self, source_url: &str, sites: &SiteMap) -> Result<(), BoxError>;

    /// The series catalog previously stored for the site `(network,
    /// code)`. Empty when nothing is cached.
    fn get_cached_timeseries(&self, network: &str, code: &str)
        -> Result<Vec<TimeSeries>, BoxError>;

    /// Store the series catalog for the site `(network, code)`.
    fn put_timeseries(
        &self,
        network: &str,
        code: &str,
        series: &[TimeSeries],
    ) -> Result<(), BoxError>;
}

/// A shared store handle, so one store can back several sources.
impl<C: CacheStore + ?Sized> CacheStore for Rc<C> {
    fn get_cached_sites(&self, source_url: &str) -> Result<SiteMap, BoxError> {
        (**self).get_cached_sites(source_url)
    }

    fn put_sites(&self, source_url: &str, sites: &SiteMap) -> Result<(), BoxError> {
        (**self).put_sites(source_url, sites)
    }

    fn get_cached_timeseries(
        &self,
        network: &str,
        code: &str,
    ) -> Result<Vec<TimeSeries>, BoxError> {
        (**self).get_cached_timeseries(network, code)
    }

    fn put_timeseries(
        &self,
        network: &str,
        code: &str,
        series: &[TimeSeries],
    ) -> Result<(), BoxError> {
        (**self).put_timeseries(network, code, series)
    }
}
