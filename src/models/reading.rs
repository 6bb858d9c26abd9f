use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Sensor columns expected in the readings CSV. Click order maps onto this
/// list: the Nth placed point belongs to the Nth label.
pub const SENSOR_LABELS: [&str; 5] = [
    "AboveSuperSac",
    "ControlRoom",
    "Palletizer",
    "TransferPoint",
    "TruckLoading",
];

/// One (timestamp, sensor, value) observation in long form.
///
/// `timestamp` is `None` when the source row's `Date`/`Time` pair could not be
/// parsed. `value` is NaN when the source cell was blank or non-numeric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub timestamp: Option<NaiveDateTime>,
    pub sensor: String,
    pub value: f64,
}

/// A reading enriched with the pixel position of its sensor's marker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MergedRow {
    pub timestamp: Option<NaiveDateTime>,
    pub sensor: String,
    pub value: f64,
    pub x: f64,
    pub y: f64,
}
