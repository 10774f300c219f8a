use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::math::stats::StatsHelper;
use crate::prelude::{AnalysisError, AnalysisResult};

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Identity of a storm record in the source dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StormIdentity {
    pub sid: String,
    /// Ordinal of the storm in the source file.
    pub index: usize,
    pub name: String,
    pub season: Option<i32>,
}

/// Per-timestep series of a storm, index-aligned.
///
/// Missing values are `None`; dataset sentinels never reach this type.
#[derive(Debug, Clone, Default)]
pub struct TrackSeries {
    pub times: Vec<DateTime<Utc>>,
    pub basins: Vec<String>,
    pub positions: Vec<Option<Position>>,
    pub landfall: Vec<Option<f64>>,
    pub category: Vec<Option<i8>>,
    pub wind: Vec<Option<f64>>,
    pub pressure: Vec<Option<f64>>,
}

impl TrackSeries {
    fn check_lengths(&self) -> AnalysisResult<usize> {
        let expected = self.times.len();
        let lengths = [
            ("basins", self.basins.len()),
            ("positions", self.positions.len()),
            ("landfall", self.landfall.len()),
            ("category", self.category.len()),
            ("wind", self.wind.len()),
            ("pressure", self.pressure.len()),
        ];
        for (field, actual) in lengths {
            if actual != expected {
                return Err(AnalysisError::LengthMismatch {
                    field,
                    expected,
                    actual,
                });
            }
        }
        Ok(expected)
    }

    fn subset(&self, indices: &[usize]) -> Self {
        Self {
            times: indices.iter().map(|&i| self.times[i]).collect(),
            basins: indices.iter().map(|&i| self.basins[i].clone()).collect(),
            positions: indices.iter().map(|&i| self.positions[i]).collect(),
            landfall: indices.iter().map(|&i| self.landfall[i]).collect(),
            category: indices.iter().map(|&i| self.category[i]).collect(),
            wind: indices.iter().map(|&i| self.wind[i]).collect(),
            pressure: indices.iter().map(|&i| self.pressure[i]).collect(),
        }
    }
}

/// One storm of the dataset with its validated per-timestep series.
#[derive(Debug, Clone)]
pub struct StormTrack {
    identity: StormIdentity,
    series: TrackSeries,
}

impl StormTrack {
    /// Builds a track, rejecting empty, misaligned or time-reversed series.
    pub fn new(identity: StormIdentity, series: TrackSeries) -> AnalysisResult<Self> {
        let len = series.check_lengths()?;
        if len == 0 {
            return Err(AnalysisError::Empty(format!(
                "storm {} has no observations",
                identity.sid
            )));
        }
        if let Some(pos) = series.times.windows(2).position(|w| w[1] < w[0]) {
            return Err(AnalysisError::UnorderedTimes(pos + 1));
        }
        Ok(Self { identity, series })
    }

    pub fn identity(&self) -> &StormIdentity {
        &self.identity
    }

    pub fn sid(&self) -> &str {
        &self.identity.sid
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn index(&self) -> usize {
        self.identity.index
    }

    pub fn len(&self) -> usize {
        self.series.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.times.is_empty()
    }

    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.series.times
    }

    pub fn positions(&self) -> &[Option<Position>] {
        &self.series.positions
    }

    pub fn landfall(&self) -> &[Option<f64>] {
        &self.series.landfall
    }

    pub fn category(&self) -> &[Option<i8>] {
        &self.series.category
    }

    pub fn wind(&self) -> &[Option<f64>] {
        &self.series.wind
    }

    pub fn pressure(&self) -> &[Option<f64>] {
        &self.series.pressure
    }

    /// First observation time.
    pub fn start(&self) -> DateTime<Utc> {
        self.series.times[0]
    }

    /// Last observation time.
    pub fn end(&self) -> DateTime<Utc> {
        self.series.times[self.len() - 1]
    }

    /// Year of the first observation, used for every year filter.
    pub fn year(&self) -> i32 {
        self.start().year()
    }

    /// Unique non-blank basin codes in order of first appearance.
    pub fn basins(&self) -> Vec<String> {
        let mut unique: Vec<String> = Vec::new();
        for basin in &self.series.basins {
            if !basin.is_empty() && !unique.contains(basin) {
                unique.push(basin.clone());
            }
        }
        unique
    }

    /// Lifetime maximum Saffir-Simpson category, ignoring missing samples.
    pub fn max_category(&self) -> Option<i8> {
        self.series.category.iter().flatten().copied().max()
    }

    /// Smallest distance from land over the track, ignoring missing samples.
    pub fn min_landfall(&self) -> Option<f64> {
        StatsHelper::min(&self.series.landfall)
    }

    /// Copy of the track keeping only samples with a known position.
    pub fn positioned(&self) -> AnalysisResult<Self> {
        let kept: Vec<usize> = (0..self.len())
            .filter(|&i| self.series.positions[i].is_some())
            .collect();
        Self::new(self.identity.clone(), self.series.subset(&kept))
    }
}

/// Tropical storm or stronger on the Saffir-Simpson scale.
pub fn is_tropical_storm(category: i8) -> bool {
    category >= 0
}

/// Category 3 and above.
pub fn is_major(category: i8) -> bool {
    category >= 3
}


#[cfg(test)]
mod tests {
    use super::fixtures::track;
    use super::*;

    #[test]
    fn mismatched_series_are_rejected() {
        let series = TrackSeries {
            times: vec![Utc::now(), Utc::now()],
            basins: vec!["NA".into(); 2],
            positions: vec![None; 2],
            landfall: vec![Some(10.0)],
            category: vec![None; 2],
            wind: vec![None; 2],
            pressure: vec![None; 2],
        };
        let err = StormTrack::new(StormIdentity::default(), series).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::LengthMismatch {
                field: "landfall",
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn empty_track_is_rejected() {
        let err = StormTrack::new(StormIdentity::default(), TrackSeries::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::Empty(_)));
    }

    #[test]
    fn positioned_drops_unknown_positions() {
        let mut storm = track("S1", &[Some(300.0), Some(90.0), None], &[-70.0, -75.0, -80.0]);
        storm.series.positions[1] = None;
        let kept = storm.positioned().unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.landfall(), &[Some(300.0), None]);
    }

    #[test]
    fn lifetime_extremes_ignore_missing_values() {
        let storm = track("S2", &[None, Some(40.0), Some(0.0), None], &[-70.0; 4]);
        assert_eq!(storm.min_landfall(), Some(0.0));
        assert_eq!(storm.max_category(), Some(2));
        assert_eq!(storm.year(), 2005);
        assert_eq!(storm.basins(), vec!["NA".to_string()]);
    }
}
