use anyhow::{anyhow, bail, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const BOUND_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Inclusive `[start, end]` range of timestamps shown during animation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            bail!("time window start {start} is after end {end}");
        }
        Ok(Self { start, end })
    }

    /// Window spanning the whole sorted timestamp domain, `None` if it is empty.
    pub fn full(domain: &[NaiveDateTime]) -> Option<Self> {
        let start = *domain.first()?;
        let end = *domain.last()?;
        Some(Self { start, end })
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Pulls both bounds inside the domain, the way a range slider would.
    pub fn clamp_to(self, domain: &[NaiveDateTime]) -> Self {
        let Some(full) = Self::full(domain) else {
            return self;
        };
        Self {
            start: self.start.clamp(full.start, full.end),
            end: self.end.clamp(full.start, full.end),
        }
    }

    /// Parses a bound as sent by the webview's `datetime-local` inputs.
    pub fn parse_bound(raw: &str) -> Result<NaiveDateTime> {
        let trimmed = raw.trim();
        BOUND_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .ok_or_else(|| anyhow!("unrecognised time bound '{raw}'"))
    }
}
