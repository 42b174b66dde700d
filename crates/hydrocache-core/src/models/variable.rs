//! Descriptors for observed variables and their units of measurement.
//!
//! Both types are plain values: they carry identity and metadata, have no
//! lazy behavior, and travel unchanged between gateway payloads, cached
//! records and the entity model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unit of measurement, e.g. cubic feet per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Units {
    pub name: String,
    pub abbreviation: String,
    pub code: String,
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.abbreviation)
    }
}

/// What a time series measures: discharge, gage height, precipitation, etc.
///
/// `vocabulary` names the controlled vocabulary the `code` belongs to (for
/// USGS NWIS services this is typically `"NWISDV"` or `"NWISIV"`).
/// `no_data_value` is the sentinel the service substitutes for missing
/// measurements; fetched series keep sentinel values as-is so callers can
/// mask them against this field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub code: String,
    pub id: Option<i64>,
    pub vocabulary: String,
    pub units: Units,
    pub no_data_value: f64,
}

impl Variable {
    /// The `vocabulary:code` form used in remote value queries.
    pub fn vocabulary_code(&self) -> String {
        format!("{}:{}", self.vocabulary, self.code)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfs() -> Units {
        Units {
            name: "cubic feet per second".to_string(),
            abbreviation: "cfs".to_string(),
            code: "35".to_string(),
        }
    }

    #[test]
    fn display_forms() {
        let variable = Variable {
            name: "Discharge".to_string(),
            code: "00060".to_string(),
            id: Some(1),
            vocabulary: "NWISDV".to_string(),
            units: cfs(),
            no_data_value: -999999.0,
        };
        assert_eq!(variable.to_string(), "Discharge [00060]");
        assert_eq!(variable.units.to_string(), "cubic feet per second [cfs]");
        assert_eq!(variable.vocabulary_code(), "NWISDV:00060");
    }
}
