use chrono::Duration;
use serde::Serialize;

use super::storm_events;
use crate::prelude::{AnalysisConfig, AnalysisError, AnalysisResult, AnalysisStage};
use crate::segment::{merged_windows, LandfallEvent, OverrideTable};
use crate::telemetry::LogManager;
use crate::track::{Position, StormTrack};

/// A storm's positioned track with the samples leading up to its landfalls.
#[derive(Debug, Clone, Serialize)]
pub struct StormApproach {
    pub sid: String,
    pub name: String,
    pub year: i32,
    pub track: Vec<Position>,
    pub events: Vec<LandfallEvent>,
    /// Indices into `track`, sorted and deduplicated across events.
    pub approach: Vec<usize>,
}

impl StormApproach {
    pub fn approach_positions(&self) -> Vec<Position> {
        self.approach.iter().map(|&i| self.track[i]).collect()
    }
}

/// Selects the lead-up window before every landfall west of the impact longitude.
pub struct ApproachStage {
    config: Option<AnalysisConfig>,
    overrides: OverrideTable,
    logger: LogManager,
}

impl ApproachStage {
    pub fn new(overrides: OverrideTable) -> Self {
        Self {
            config: None,
            overrides,
            logger: LogManager::new("approach"),
        }
    }
}

impl AnalysisStage for ApproachStage {
    type Row = StormApproach;

    fn initialize(&mut self, config: &AnalysisConfig) -> AnalysisResult<()> {
        config.validate()?;
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, storm: &StormTrack) -> AnalysisResult<Vec<Self::Row>> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| AnalysisError::Internal("stage not initialized".into()))?;

        let positioned = storm.positioned()?;
        let (_, events) = storm_events(
            &positioned,
            config.threshold_km,
            Some(config.impact_max_lon),
            &self.overrides,
        )?;
        let approach = merged_windows(
            positioned.times(),
            &events,
            Duration::hours(config.lead_hours),
        );
        if !events.is_empty() {
            self.logger.detail(&format!(
                "{} {}: {} events, {} approach samples",
                storm.sid(),
                storm.name(),
                events.len(),
                approach.len()
            ));
        }

        Ok(vec![StormApproach {
            sid: storm.sid().to_string(),
            name: storm.name().to_string(),
            year: storm.year(),
            track: positioned.positions().iter().flatten().copied().collect(),
            events,
            approach,
        }])
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
