//! Readings CSV loader.
//!
//! The source file is wide: a `Date` column, a `Time` column and one numeric
//! column per sensor. We resolve columns by header name, fold `Date` + `Time`
//! into one timestamp and reshape into long form, one [`Reading`] per
//! (row, sensor column) pair. Rows are emitted column by column, so all
//! readings of the first sensor come before those of the second.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;
use std::path::Path;

use crate::models::Reading;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

const DATE_COLUMN: &str = "Date";
const TIME_COLUMN: &str = "Time";

const TIMESTAMP_FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
];

/// Long-form reading table plus what we learned about the source file.
#[derive(Debug, Clone)]
pub struct LoadedReadings {
    pub readings: Vec<Reading>,
    /// Sensor column names in header order.
    pub sensors: Vec<String>,
    pub source_rows: usize,
    /// Source rows whose `Date`/`Time` pair did not parse.
    pub invalid_timestamps: usize,
}

/// Load the readings CSV at `path` and reshape it into long form.
///
/// Missing files and missing `Date`/`Time` columns are hard errors. Malformed
/// timestamps and blank values are tolerated (`None` and NaN respectively).
pub fn load_readings(path: &Path) -> Result<LoadedReadings> {
    let rdr = reader_builder()
        .from_path(path)
        .with_context(|| format!("Failed to open readings CSV {}", path.display()))?;
    read_wide(rdr)
}

/// Same as [`load_readings`] but from any reader, used for in-memory data.
pub fn load_readings_from_reader<R: std::io::Read>(reader: R) -> Result<LoadedReadings> {
    read_wide(reader_builder().from_reader(reader))
}

// Short rows are padded with NaN rather than failing the whole load.
fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.flexible(true);
    builder
}

fn read_wide<R: std::io::Read>(mut rdr: csv::Reader<R>) -> Result<LoadedReadings> {
    let headers = rdr
        .headers()
        .context("Failed to read readings CSV headers")?
        .clone();

    let col = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| anyhow!("Missing column '{name}' in readings CSV"))
    };

    let i_date = col(DATE_COLUMN)?;
    let i_time = col(TIME_COLUMN)?;

    let sensor_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != i_date && *i != i_time)
        .map(|(i, h)| (i, h.trim().to_string()))
        .collect();

    let mut timestamps: Vec<Option<NaiveDateTime>> = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); sensor_columns.len()];

    for (row_num, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Readings CSV row {row_num}"))?;

        let date = record.get(i_date).unwrap_or_default();
        let time = record.get(i_time).unwrap_or_default();
        timestamps.push(parse_timestamp(date, time));

        for (slot, (i_sensor, _)) in values.iter_mut().zip(&sensor_columns) {
            slot.push(parse_value(record.get(*i_sensor).unwrap_or_default()));
        }
    }

    let source_rows = timestamps.len();
    let invalid_timestamps = timestamps.iter().filter(|t| t.is_none()).count();
    if invalid_timestamps > 0 {
        log_warn!(
            "{} of {} rows have an unparseable Date/Time",
            invalid_timestamps,
            source_rows
        );
    }

    let mut readings = Vec::with_capacity(source_rows * sensor_columns.len());
    for ((_, sensor), column) in sensor_columns.iter().zip(values) {
        for (timestamp, value) in timestamps.iter().zip(column) {
            readings.push(Reading {
                timestamp: *timestamp,
                sensor: sensor.clone(),
                value,
            });
        }
    }

    let sensors: Vec<String> = sensor_columns.into_iter().map(|(_, name)| name).collect();
    log_info!(
        "Loaded {} readings ({} rows x {} sensors)",
        readings.len(),
        source_rows,
        sensors.len()
    );

    Ok(LoadedReadings {
        readings,
        sensors,
        source_rows,
        invalid_timestamps,
    })
}

/// Combine a `Date` and `Time` cell into one timestamp, `None` if unparseable.
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let combined = format!("{} {}", date.trim(), time.trim());
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&combined, fmt).ok())
}

fn parse_value(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
