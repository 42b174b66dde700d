//! Remote service gateway: the interface to the observation service and
//! the parsed payloads that cross it.
//!
//! This crate never talks to the network itself. A [`WaterService`]
//! implementation is handed to [`Source`](crate::models::Source) at
//! construction and invoked by the lazy accessors when an attribute is
//! first needed.

pub mod payload;
pub mod service;

pub use payload::{
    SeriesCatalog, SeriesDescriptor, SiteDescriptor, SiteDetail, SiteDetailPayload, ValuesPayload,
};
pub use service::WaterService;
