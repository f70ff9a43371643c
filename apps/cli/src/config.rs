use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

/// Settings resolved from flags and the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// The instant SRS operations treat as "now".
    pub now: DateTime<Utc>,
}

impl Config {
    /// `now` comes from `--now` / `QUIZ_SRS_NOW`, or the wall clock if unset.
    pub fn resolve(now: Option<&str>) -> Result<Self> {
        let now = match now.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("Invalid QUIZ_SRS_NOW timestamp '{raw}'"))?
                .with_timezone(&Utc),
            None => Utc::now(),
        };
        Ok(Self { now })
    }
}
