use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timefmt;

/// Attributes of a storm at the first sample of one landfall event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandfallRecord {
    pub name: String,
    pub year: i32,
    #[serde(with = "timefmt")]
    pub t0: DateTime<Utc>,
    #[serde(with = "timefmt")]
    pub tf: DateTime<Utc>,
    pub max_usa_sshs: Option<i8>,
    pub landfall_lat: f64,
    pub landfall_lon: f64,
    pub dist_from_shore_km: f64,
    pub landfall_cat: Option<i8>,
    pub landfall_wspd_kts: Option<f64>,
    pub landfall_pres: Option<f64>,
    pub sid: String,
    pub findex: usize,
}
