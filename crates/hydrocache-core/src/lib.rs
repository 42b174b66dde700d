//! Client-side data model for WaterML-style hydrological observation
//! services.
//!
//! The model mirrors the remote catalog as three levels of entities --
//! [`Source`] owns sites, [`Site`] owns time series, [`TimeSeries`] owns
//! its measurements -- and defers every remote interaction to the first
//! access of the attribute that needs it. Fetched attributes are memoized
//! for the life of the entity, and an optional [`CacheStore`] lets
//! materialized collections survive across sources and processes.
//!
//! The remote transport itself stays outside the crate: a
//! [`WaterService`] implementation is wired in at construction and called
//! synchronously whenever an attribute has to be fetched.
//!
//! ```no_run
//! use hydrocache_core::{MemoryCache, Source, WaterService};
//!
//! fn open(gateway: Box<dyn WaterService>) -> hydrocache_core::Result<()> {
//!     let mut source = Source::with_cache(
//!         "http://example.org/wml",
//!         gateway,
//!         Box::new(MemoryCache::new()),
//!     );
//!     for (code, site) in source.sites()? {
//!         println!("{code}: {site}");
//!     }
//!     let frame = source.dataframe("01234")?;
//!     println!("{} series, {} rows", frame.num_columns(), frame.num_rows());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod gateway;
pub mod lazy;
pub mod models;

pub use cache::{CacheStore, CachedData, JsonFileCache, MemoryCache};
pub use error::{BoxError, HydroError, Result};
pub use gateway::{
    SeriesCatalog, SeriesDescriptor, SiteDescriptor, SiteDetail, SiteDetailPayload, ValuesPayload,
    WaterService,
};
pub use models::{Measurement, Site, SiteMap, Source, TimeSeries, Units, Variable, VariableFrame};
