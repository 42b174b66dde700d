//! The remote service gateway interface.

use crate::error::BoxError;
use crate::gateway::{SiteDescriptor, SiteDetailPayload, ValuesPayload};

/// The three remote operations the data model consumes, already parsed
/// into primitive payloads.
///
/// Implementations own the transport (SOAP, REST, fixtures, ...) and the
/// wire-format parsing; the data model calls them synchronously and blocks
/// until they return. Errors are passed through to the caller unchanged --
/// retry, backoff and timeouts belong to the implementation, not to the
/// model.
pub trait WaterService {
    /// List the sites the service exposes. An empty `filter` means all
    /// sites.
    fn list_sites(&self, filter: &str) -> Result<Vec<SiteDescriptor>, BoxError>;

    /// Full description of one site, addressed as `network:code`. The
    /// returned payload is expected to describe exactly one site with
    /// exactly one series catalog; the model rejects anything else.
    fn get_site_detail(&self, site: &str) -> Result<SiteDetailPayload, BoxError>;

    /// The values of one series: `site` as `network:code`, `variable` as
    /// `vocabulary:code`, and the inclusive date range as ISO `YYYY-MM-DD`
    /// strings.
    fn get_values(
        &self,
        site: &str,
        variable: &str,
        begin_date: &str,
        end_date: &str,
    ) -> Result<ValuesPayload, BoxError>;
}
