//! The derived tabular view over a site's time series.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Measurement;

/// A site's time series joined into one table: one column per variable
/// code, one row per timestamp, rows aligned on the sorted union of all
/// series timestamps. Cells with no measurement at that timestamp are
/// `None`.
///
/// A frame is a snapshot derived from the catalog it was built from; it is
/// only ever (re)built together with that catalog and carries no fetch
/// logic of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableFrame {
    timestamps: Vec<DateTime<Utc>>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl VariableFrame {
    /// Build a frame from `(variable code, measurements)` pairs.
    ///
    /// When the same variable code appears more than once, the later pair
    /// replaces the earlier one entirely.
    pub fn from_columns(series: Vec<(String, Vec<Measurement>)>) -> Self {
        let mut latest: BTreeMap<String, Vec<Measurement>> = BTreeMap::new();
        for (code, points) in series {
            latest.insert(code, points);
        }

        let mut stamps: BTreeSet<DateTime<Utc>> = BTreeSet::new();
        for points in latest.values() {
            for measurement in points {
                stamps.insert(measurement.timestamp);
            }
        }
        let timestamps: Vec<DateTime<Utc>> = stamps.into_iter().collect();
        let index: BTreeMap<DateTime<Utc>, usize> = timestamps
            .iter()
            .enumerate()
            .map(|(row, stamp)| (*stamp, row))
            .collect();

        let mut columns: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
        for (code, points) in latest {
            let mut column = vec![None; timestamps.len()];
            for measurement in points {
                if let Some(&row) = index.get(&measurement.timestamp) {
                    column[row] = Some(measurement.value);
                }
            }
            columns.insert(code, column);
        }

        Self {
            timestamps,
            columns,
        }
    }

    /// Row labels: the sorted union of every series' timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Column labels, in code order.
    pub fn variable_codes(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// One column, aligned to [`timestamps`](Self::timestamps).
    pub fn column(&self, variable_code: &str) -> Option<&[Option<f64>]> {
        self.columns.get(variable_code).map(Vec::as_slice)
    }

    /// Single-cell lookup.
    pub fn value_at(&self, variable_code: &str, timestamp: DateTime<Utc>) -> Option<f64> {
        let row = self.timestamps.binary_search(&timestamp).ok()?;
        self.columns.get(variable_code)?.get(row).copied().flatten()
    }

    pub fn num_rows(&self) -> usize {
        self.timestamps.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty() && self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap()
    }

    fn point(day: u32, value: f64) -> Measurement {
        Measurement {
            timestamp: at(day),
            value,
        }
    }

    #[test]
    fn aligns_rows_on_timestamp_union() {
        let frame = VariableFrame::from_columns(vec![
            (
                "00060".to_string(),
                vec![point(1, 10.0), point(2, 11.0)],
            ),
            (
                "00065".to_string(),
                vec![point(2, 3.5), point(3, 3.7)],
            ),
        ]);

        assert_eq!(frame.num_rows(), 3);
        assert_eq!(frame.num_columns(), 2);
        assert_eq!(frame.timestamps(), &[at(1), at(2), at(3)]);
        assert_eq!(
            frame.column("00060"),
            Some(&[Some(10.0), Some(11.0), None][..])
        );
        assert_eq!(
            frame.column("00065"),
            Some(&[None, Some(3.5), Some(3.7)][..])
        );
        assert_eq!(frame.value_at("00065", at(3)), Some(3.7));
        assert_eq!(frame.value_at("00065", at(1)), None);
        assert_eq!(frame.value_at("09999", at(1)), None);
    }

    #[test]
    fn later_series_replaces_duplicate_variable_code() {
        let frame = VariableFrame::from_columns(vec![
            ("00060".to_string(), vec![point(1, 1.0)]),
            ("00060".to_string(), vec![point(2, 2.0)]),
        ]);

        assert_eq!(frame.num_columns(), 1);
        // only the replacement series contributes rows
        assert_eq!(frame.timestamps(), &[at(2)]);
        assert_eq!(frame.column("00060"), Some(&[Some(2.0)][..]));
    }

    #[test]
    fn empty_input_builds_empty_frame() {
        let frame = VariableFrame::from_columns(Vec::new());
        assert!(frame.is_empty());
        assert_eq!(frame.num_rows(), 0);
        assert_eq!(frame.variable_codes().count(), 0);
    }
}
