use thiserror::Error;

/// Boxed error type returned by the collaborator traits ([`WaterService`] and
/// [`CacheStore`]). Implementations surface whatever failure their transport
/// or backend produced; the core carries it through without interpretation.
///
/// [`WaterService`]: crate::gateway::WaterService
/// [`CacheStore`]: crate::cache::CacheStore
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HydroError>;

#[derive(Error, Debug)]
pub enum HydroError {
    /// A site-detail response described more (or fewer) than one site.
    /// This signals a broken data-shape assumption, not a transient fault,
    /// and is never retried by the core.
    #[error("site detail for {site} describes {count} sites; exactly one is supported")]
    MultiSiteDetail { site: String, count: usize },

    /// A site-detail response carried more (or fewer) than one series catalog.
    #[error("site detail for {site} carries {count} series catalogs; exactly one is supported")]
    MultiCatalogDetail { site: String, count: usize },

    /// No site with the given code exists in the source's site map.
    #[error("no site with code {0}")]
    UnknownSite(String),

    /// The site's series catalog has no entry for the given variable code.
    #[error("no series for variable {variable} at site {site}")]
    UnknownSeries { site: String, variable: String },

    /// Failure raised by the remote service gateway, passed through unchanged.
    #[error("service call failed: {0}")]
    Service(#[source] BoxError),

    /// Failure raised by the cache store, passed through unchanged.
    #[error("cache store failed: {0}")]
    Cache(#[source] BoxError),
}

impl HydroError {
    /// True for the unrecoverable data-shape errors, false for everything
    /// that a caller might reasonably handle or retry at its own layer.
    pub fn is_shape_error(&self) -> bool {
        matches!(
            self,
            HydroError::MultiSiteDetail { .. } | HydroError::MultiCatalogDetail { .. }
        )
    }
}
