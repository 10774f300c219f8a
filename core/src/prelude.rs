use serde::{Deserialize, Serialize};

use crate::track::StormTrack;

/// Distance from land below which a sample counts as landfall (60 nmi).
pub const DEFAULT_THRESHOLD_KM: f64 = 111.0;
/// Lead time highlighted before each landfall event.
pub const DEFAULT_LEAD_HOURS: i64 = 72;

/// Shared configuration for each analysis stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub start_year: i32,
    pub end_year: i32,
    /// Basin code filter; `None` keeps storms from every basin.
    pub basin: Option<String>,
    pub threshold_km: f64,
    pub lead_hours: i64,
    /// Landfall rows are only emitted west of this longitude.
    pub landfall_max_lon: f64,
    /// Qualifying samples east of this longitude are ignored when deciding impact.
    pub impact_max_lon: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            start_year: 1970,
            end_year: 2019,
            basin: None,
            threshold_km: DEFAULT_THRESHOLD_KM,
            lead_hours: DEFAULT_LEAD_HOURS,
            landfall_max_lon: -60.0,
            impact_max_lon: -40.0,
        }
    }
}

impl AnalysisConfig {
    /// Year and basin filter shared by every stage.
    pub fn accepts(&self, storm: &StormTrack) -> bool {
        let year = storm.year();
        if year < self.start_year || year > self.end_year {
            return false;
        }
        match self.basin.as_deref() {
            None | Some("all") => true,
            Some(code) => storm.basins().iter().any(|b| b == code),
        }
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if !self.threshold_km.is_finite() || self.threshold_km <= 0.0 {
            return Err(AnalysisError::InvalidThreshold(self.threshold_km));
        }
        if self.start_year > self.end_year {
            return Err(AnalysisError::InvalidInput(format!(
                "year range {}..={} is empty",
                self.start_year, self.end_year
            )));
        }
        if self.lead_hours < 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "lead time must not be negative, got {}h",
                self.lead_hours
            )));
        }
        Ok(())
    }
}

/// Common error type for track construction, segmentation and analysis.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("empty input: {0}")]
    Empty(String),
    #[error("length mismatch: {field} has {actual} samples, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("track has {0} samples, at least 2 are required")]
    TooShort(usize),
    #[error("non-finite distance {value} at index {index}")]
    NonFinite { index: usize, value: f64 },
    #[error("negative distance {value} at index {index}")]
    NegativeDistance { index: usize, value: f64 },
    #[error("invalid threshold {0} km")]
    InvalidThreshold(f64),
    #[error("indices not strictly increasing at position {position}: {previous} then {current}")]
    UnorderedIndices {
        position: usize,
        previous: usize,
        current: usize,
    },
    #[error("timestamps decrease at index {0}")]
    UnorderedTimes(usize),
    #[error("override for storm {sid}: {reason}")]
    InvalidOverride { sid: String, reason: String },
    #[error("dataset line {line}: {reason}")]
    Dataset { line: u64, reason: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Trait describing per-storm analysis stages.
///
/// A stage is initialized once, executed for every storm that passes the
/// configuration filter and cleaned up at the end of the run.
pub trait AnalysisStage {
    type Row;

    fn initialize(&mut self, config: &AnalysisConfig) -> AnalysisResult<()>;
    fn execute(&mut self, storm: &StormTrack) -> AnalysisResult<Vec<Self::Row>>;
    fn cleanup(&mut self);
}
