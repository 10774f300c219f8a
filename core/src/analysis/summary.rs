use crate::prelude::{AnalysisConfig, AnalysisError, AnalysisResult, AnalysisStage};
use crate::records::storm::basin_cell;
use crate::records::{CategorySummaryRecord, Flag, StormSummaryRecord};
use crate::telemetry::LogManager;
use crate::track::StormTrack;

/// One summary row per storm.
pub struct SummaryStage {
    config: Option<AnalysisConfig>,
    logger: LogManager,
}

impl SummaryStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("summary"),
        }
    }
}

impl Default for SummaryStage {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisStage for SummaryStage {
    type Row = StormSummaryRecord;

    fn initialize(&mut self, config: &AnalysisConfig) -> AnalysisResult<()> {
        config.validate()?;
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, storm: &StormTrack) -> AnalysisResult<Vec<Self::Row>> {
        if self.config.is_none() {
            return Err(AnalysisError::Internal("stage not initialized".into()));
        }
        self.logger
            .detail(&format!("{} {} ({})", storm.sid(), storm.name(), storm.year()));
        Ok(vec![StormSummaryRecord::from_track(storm)])
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}

/// Summary row with lifetime category and closest approach to land.
pub struct CategoryStage {
    config: Option<AnalysisConfig>,
    logger: LogManager,
}

impl CategoryStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("categories"),
        }
    }
}

impl Default for CategoryStage {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisStage for CategoryStage {
    type Row = CategorySummaryRecord;

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

        let min_landfall = storm.min_landfall();
        let landfall0 = min_landfall == Some(0.0);
        let within = min_landfall.map_or(false, |d| d <= config.threshold_km);
        if min_landfall.is_none() {
            self.logger
                .detail(&format!("{} has no landfall samples", storm.sid()));
        }

        Ok(vec![CategorySummaryRecord {
            name: storm.name().to_string(),
            basin: basin_cell(storm),
            year: storm.year(),
            t0: storm.start(),
            tf: storm.end(),
            max_usa_sshs: storm.max_category(),
            min_landfall,
            landfall0: landfall0.into(),
            landfall111: Flag::from(within),
            sid: storm.sid().to_string(),
            findex: storm.index(),
        }])
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
