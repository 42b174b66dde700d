//! A single observed time series at one site.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HydroError, Result};
use crate::gateway::{SeriesDescriptor, WaterService};
use crate::lazy::LazyField;
use crate::models::{Units, Variable};

/// One timestamped measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Value series plus the unit descriptor the service reported for it.
/// Held in a single cell so neither half can exist without the other.
#[derive(Debug, Clone)]
struct SeriesData {
    points: Vec<Measurement>,
    units: Units,
}

/// A bounded-date-range sequence of measurements for one variable at one
/// site.
///
/// Identity is the tuple (site, variable, begin, end, method, quality
/// control level), taken from the site's series catalog. The measurements
/// themselves are fetched on first access to [`series`](Self::series) or
/// [`quantity`](Self::quantity) and kept for the life of the entity.
///
/// The back-reference to the owning site is the `(network, code)` identifier
/// pair, not an owning handle.
#[derive(Debug, Clone)]
pub struct TimeSeries {
    variable: Variable,
    value_count: Option<u64>,
    method: Option<String>,
    quality_control_level: Option<String>,
    begin_datetime: DateTime<Utc>,
    end_datetime: DateTime<Utc>,
    network: String,
    site_code: String,
    data: LazyField<SeriesData>,
}

impl TimeSeries {
    /// Build a series entity from a catalog entry, bound to the site that
    /// owns the catalog.
    pub fn from_descriptor(descriptor: SeriesDescriptor, network: &str, site_code: &str) -> Self {
        Self {
            variable: descriptor.variable,
            value_count: descriptor.value_count,
            method: descriptor.method,
            quality_control_level: descriptor.quality_control_level,
            begin_datetime: descriptor.begin_datetime,
            end_datetime: descriptor.end_datetime,
            network: network.to_string(),
            site_code: site_code.to_string(),
            data: LazyField::new(),
        }
    }

    /// Snapshot of the identity attributes, in catalog-entry form. Used by
    /// cache stores that persist catalogs rather than whole entities.
    pub fn descriptor(&self) -> SeriesDescriptor {
        SeriesDescriptor {
            variable: self.variable.clone(),
            value_count: self.value_count,
            method: self.method.clone(),
            quality_control_level: self.quality_control_level.clone(),
            begin_datetime: self.begin_datetime,
            end_datetime: self.end_datetime,
        }
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    /// Number of values the catalog advertised for this series, when known.
    /// Advisory only; the fetched series is authoritative.
    pub fn value_count(&self) -> Option<u64> {
        self.value_count
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn quality_control_level(&self) -> Option<&str> {
        self.quality_control_level.as_deref()
    }

    pub fn begin_datetime(&self) -> DateTime<Utc> {
        self.begin_datetime
    }

    pub fn end_datetime(&self) -> DateTime<Utc> {
        self.end_datetime
    }

    /// Network of the owning site.
    pub fn network(&self) -> &str {
        &self.network
    }

    /// Code of the owning site.
    pub fn site_code(&self) -> &str {
        &self.site_code
    }

    /// The measurements, fetched on first access.
    ///
    /// The fetch retrieves both the values and the unit descriptor in one
    /// remote call; after it succeeds, [`quantity`](Self::quantity) is
    /// answered from the same cell without another call.
    pub fn series(&mut self, service: &dyn WaterService) -> Result<&[Measurement]> {
        Ok(self.fetch(service)?.points.as_slice())
    }

    /// The unit descriptor reported by the service for the fetched values.
    /// Triggers the same fetch as [`series`](Self::series) when the cell is
    /// still empty.
    pub fn quantity(&mut self, service: &dyn WaterService) -> Result<&Units> {
        Ok(&self.fetch(service)?.units)
    }

    /// The measurements, if already fetched. Never triggers a remote call.
    pub fn cached_series(&self) -> Option<&[Measurement]> {
        self.data.get().map(|data| data.points.as_slice())
    }

    /// The unit descriptor, if already fetched. Never triggers a remote
    /// call.
    pub fn cached_quantity(&self) -> Option<&Units> {
        self.data.get().map(|data| &data.units)
    }

    pub fn is_fetched(&self) -> bool {
        self.data.is_populated()
    }

    fn fetch(&mut self, service: &dyn WaterService) -> Result<&SeriesData> {
        let Self {
            variable,
            begin_datetime,
            end_datetime,
            network,
            site_code,
            data,
            ..
        } = self;
        let site = format!("{network}:{site_code}");
        let variable_query = variable.vocabulary_code();
        let begin = begin_datetime.format("%Y-%m-%d").to_string();
        let end = end_datetime.format("%Y-%m-%d").to_string();
        data.get_or_populate(|| {
            let payload = service
                .get_values(&site, &variable_query, &begin, &end)
                .map_err(HydroError::Service)?;
            let mut points = payload.points;
            points.sort_by_key(|measurement| measurement.timestamp);
            debug!(
                site = %site,
                variable = %variable_query,
                count = points.len(),
                "fetched value series"
            );
            Ok(SeriesData {
                points,
                units: payload.units,
            })
        })
    }
}

impl fmt::Display for TimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} - {})",
            self.variable.name,
            self.begin_datetime.format("%Y-%m-%d"),
            self.end_datetime.format("%Y-%m-%d")
        )
    }
}
