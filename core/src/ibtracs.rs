//! Reader for the IBTrACS "list" CSV distribution.
//!
//! The file has a header row, a units row and one row per observation.
//! Rows are grouped into storms by `SID` in first-seen order; blank fields
//! and the `-9999` fill value become `None`.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::prelude::{AnalysisError, AnalysisResult};
use crate::segment::clean;
use crate::telemetry::LogManager;
use crate::track::{Position, StormIdentity, StormTrack, TrackSeries};

const ISO_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct Observation {
    #[serde(rename = "SID")]
    sid: String,
    #[serde(rename = "SEASON")]
    season: Option<i32>,
    #[serde(rename = "BASIN", default)]
    basin: String,
    #[serde(rename = "NAME", default)]
    name: String,
    #[serde(rename = "ISO_TIME")]
    iso_time: String,
    #[serde(rename = "LAT")]
    lat: Option<f64>,
    #[serde(rename = "LON")]
    lon: Option<f64>,
    #[serde(rename = "LANDFALL")]
    landfall: Option<f64>,
    #[serde(rename = "USA_SSHS")]
    usa_sshs: Option<i8>,
    #[serde(rename = "USA_WIND")]
    usa_wind: Option<f64>,
    #[serde(rename = "USA_PRES")]
    usa_pres: Option<f64>,
}

impl Observation {
    fn position(&self) -> Option<Position> {
        match (self.lat.and_then(clean), self.lon.and_then(clean)) {
            (Some(lat), Some(lon)) => Some(Position::new(lat, lon)),
            _ => None,
        }
    }

    /// Saffir-Simpson values run from -5 to 5; anything else is a fill value.
    fn category(&self) -> Option<i8> {
        self.usa_sshs.filter(|c| (-5..=5).contains(c))
    }
}

fn parse_time(raw: &str, line: u64) -> AnalysisResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw, ISO_TIME_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|err| AnalysisError::Dataset {
            line,
            reason: format!("ISO_TIME {:?}: {}", raw, err),
        })
}

/// Reads every storm of an IBTrACS list CSV.
pub fn read_tracks<R: Read>(reader: R) -> AnalysisResult<Vec<StormTrack>> {
    let logger = LogManager::new("ibtracs");
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut order: Vec<(StormIdentity, TrackSeries)> = Vec::new();
    let mut by_sid: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        // The units row and any blank separator rows carry no storm id.
        if record.get(0).map_or(true, str::is_empty) {
            skipped += 1;
            continue;
        }
        let obs: Observation =
            record
                .deserialize(Some(&headers))
                .map_err(|err| AnalysisError::Dataset {
                    line,
                    reason: err.to_string(),
                })?;
        if obs.sid.is_empty() {
            skipped += 1;
            continue;
        }
        let time = parse_time(&obs.iso_time, line)?;

        let slot = *by_sid.entry(obs.sid.clone()).or_insert_with(|| {
            order.push((
                StormIdentity {
                    sid: obs.sid.clone(),
                    index: order.len(),
                    name: obs.name.clone(),
                    season: obs.season,
                },
                TrackSeries::default(),
            ));
            order.len() - 1
        });
        let series = &mut order[slot].1;
        series.times.push(time);
        series.basins.push(obs.basin.clone());
        series.positions.push(obs.position());
        series.landfall.push(obs.landfall.and_then(clean));
        series.category.push(obs.category());
        series.wind.push(obs.usa_wind.and_then(clean));
        series.pressure.push(obs.usa_pres.and_then(clean));
    }

    let tracks = order
        .into_iter()
        .map(|(identity, series)| {
            let sid = identity.sid.clone();
            StormTrack::new(identity, series).map_err(|err| {
                AnalysisError::InvalidInput(format!("storm {}: {}", sid, err))
            })
        })
        .collect::<AnalysisResult<Vec<_>>>()?;

    logger.record(&format!(
        "loaded {} storms ({} rows without storm id skipped)",
        tracks.len(),
        skipped
    ));
    Ok(tracks)
}

/// Opens and reads an IBTrACS list CSV from disk.
pub fn load_tracks<P: AsRef<Path>>(path: P) -> AnalysisResult<Vec<StormTrack>> {
    let file = File::open(path.as_ref())?;
    read_tracks(file)
}
