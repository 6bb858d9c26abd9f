//! Join of long-form readings with marker placements.

use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};

use crate::models::{MergedRow, Placement, Reading};

use super::ValueRange;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Readings enriched with marker positions, indexed by timestamp.
#[derive(Debug, Clone)]
pub struct MergedData {
    rows: Vec<MergedRow>,
    by_timestamp: BTreeMap<NaiveDateTime, Vec<usize>>,
    value_range: Option<ValueRange>,
}

/// Inner join `readings` to `placements` on sensor name.
///
/// Readings of unplaced sensors are dropped. The value range is taken from
/// the full `readings` slice, not from the joined subset.
pub fn merge_readings(readings: &[Reading], placements: &[Placement]) -> MergedData {
    let by_sensor: HashMap<&str, &Placement> = placements
        .iter()
        .map(|p| (p.sensor.as_str(), p))
        .collect();

    let rows: Vec<MergedRow> = readings
        .iter()
        .filter_map(|reading| {
            by_sensor.get(reading.sensor.as_str()).map(|p| MergedRow {
                timestamp: reading.timestamp,
                sensor: reading.sensor.clone(),
                value: reading.value,
                x: p.x,
                y: p.y,
            })
        })
        .collect();

    let dropped = readings.len() - rows.len();
    if dropped > 0 {
        log_debug!("{} readings dropped for unplaced sensors", dropped);
    }

    let mut by_timestamp: BTreeMap<NaiveDateTime, Vec<usize>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        if let Some(ts) = row.timestamp {
            by_timestamp.entry(ts).or_default().push(i);
        }
    }

    let value_range = ValueRange::from_values(readings.iter().map(|r| r.value));

    log_info!(
        "Merged {} rows across {} timestamps",
        rows.len(),
        by_timestamp.len()
    );

    MergedData {
        rows,
        by_timestamp,
        value_range,
    }
}

impl MergedData {
    pub fn rows(&self) -> &[MergedRow] {
        &self.rows
    }

    /// Sorted distinct valid timestamps: the selectable time domain.
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.by_timestamp.keys().copied().collect()
    }

    pub fn value_range(&self) -> Option<ValueRange> {
        self.value_range
    }

    pub fn rows_at(&self, timestamp: NaiveDateTime) -> Vec<MergedRow> {
        self.by_timestamp
            .get(&timestamp)
            .map(|idx| idx.iter().map(|&i| self.rows[i].clone()).collect())
            .unwrap_or_default()
    }
}
