//! Parsed response payloads handed over by the service gateway.
//!
//! The gateway's transport and wire-format parsing live outside this crate;
//! what crosses the boundary are these already-parsed primitive values.
//! They double as the records the file-backed cache store persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HydroError;
use crate::models::{Measurement, Units, Variable};

/// One entry of a site listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    pub network: String,
    pub code: String,
    pub name: String,
    pub id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
}

/// A site-detail response.
///
/// The protocol allows a response to describe several sites, each with
/// several series catalogs; this crate supports exactly one of each and
/// rejects everything else as an unrecoverable shape error (see
/// [`validate_single`](Self::validate_single)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDetailPayload {
    pub sites: Vec<SiteDetail>,
}

/// One site's description within a detail response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteDetail {
    pub site: SiteDescriptor,
    pub catalogs: Vec<SeriesCatalog>,
}

/// A list of series descriptors embedded in a site-detail response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesCatalog {
    pub series: Vec<SeriesDescriptor>,
}

/// One catalog entry: the identity of a time series offered by a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesDescriptor {
    pub variable: Variable,
    pub value_count: Option<u64>,
    pub method: Option<String>,
    pub quality_control_level: Option<String>,
    pub begin_datetime: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
}

/// A get-values response: the measurements plus the unit descriptor the
/// service reported for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuesPayload {
    pub units: Units,
    pub points: Vec<Measurement>,
}

impl SiteDetailPayload {
    /// The payload's single series catalog, or the shape error naming what
    /// was found instead. `site` is the `network:code` the payload was
    /// requested for, used in the error message only.
    pub fn single_catalog(&self, site: &str) -> Result<&SeriesCatalog, HydroError> {
        match self.sites.as_slice() {
            [detail] => match detail.catalogs.as_slice() {
                [catalog] => Ok(catalog),
                catalogs => Err(HydroError::MultiCatalogDetail {
                    site: site.to_string(),
                    count: catalogs.len(),
                }),
            },
            sites => Err(HydroError::MultiSiteDetail {
                site: site.to_string(),
                count: sites.len(),
            }),
        }
    }

    /// Shape check without borrowing the catalog.
    pub fn validate_single(&self, site: &str) -> Result<(), HydroError> {
        self.single_catalog(site).map(|_| ())
    }
}
