use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timefmt;
use crate::track::StormTrack;

/// `yes`/`no` column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    Yes,
    No,
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        if value {
            Flag::Yes
        } else {
            Flag::No
        }
    }
}

/// Joins the storm's basin codes for a single CSV cell.
pub fn basin_cell(storm: &StormTrack) -> String {
    storm.basins().join(";")
}

/// One row per storm: name, basins and observation period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormSummaryRecord {
    pub name: String,
    pub basin: String,
    pub year: i32,
    #[serde(with = "timefmt")]
    pub t0: DateTime<Utc>,
    #[serde(with = "timefmt")]
    pub tf: DateTime<Utc>,
    pub sid: String,
    pub findex: usize,
}

impl StormSummaryRecord {
    pub fn from_track(storm: &StormTrack) -> Self {
        Self {
            name: storm.name().to_string(),
            basin: basin_cell(storm),
            year: storm.year(),
            t0: storm.start(),
            tf: storm.end(),
            sid: storm.sid().to_string(),
            findex: storm.index(),
        }
    }
}

/// Storm summary extended with lifetime category and closest approach to land.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummaryRecord {
    pub name: String,
    pub basin: String,
    pub year: i32,
    #[serde(with = "timefmt")]
    pub t0: DateTime<Utc>,
    #[serde(with = "timefmt")]
    pub tf: DateTime<Utc>,
    pub max_usa_sshs: Option<i8>,
    pub min_landfall: Option<f64>,
    pub landfall0: Flag,
    pub landfall111: Flag,
    pub sid: String,
    pub findex: usize,
}

/// Number of storms per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub storm_count: usize,
}
