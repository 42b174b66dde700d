//! Entity model for hydrological observation data.
//!
//! Four entities mirror the structure of the remote catalog:
//!
//! - [`Source`]: a service endpoint and its site mapping
//! - [`Site`]: a monitoring location with a detail payload, a series
//!   catalog and a derived tabular view
//! - [`TimeSeries`]: one variable's measurements over a bounded date range
//! - [`Variable`] / [`Units`]: immutable descriptors of what is measured
//!
//! Identity and static attributes are set at construction; everything that
//! needs a remote call is deferred to first access and memoized (see
//! [`crate::lazy`]).

pub mod frame;
pub mod site;
pub mod source;
pub mod timeseries;
pub mod variable;

pub use frame::VariableFrame;
pub use site::Site;
pub use source::{SiteMap, Source};
pub use timeseries::{Measurement, TimeSeries};
pub use variable::{Units, Variable};
