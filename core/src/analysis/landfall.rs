use super::storm_events;
use crate::prelude::{AnalysisConfig, AnalysisError, AnalysisResult, AnalysisStage};
use crate::records::LandfallRecord;
use crate::segment::OverrideTable;
use crate::telemetry::LogManager;
use crate::track::{is_tropical_storm, StormTrack};

/// Emits one row per landfall event, read at the event's first sample.
pub struct LandfallStage {
    config: Option<AnalysisConfig>,
    overrides: OverrideTable,
    logger: LogManager,
}

impl LandfallStage {
    pub fn new(overrides: OverrideTable) -> Self {
        Self {
            config: None,
            overrides,
            logger: LogManager::new("landfalls"),
        }
    }
}

impl AnalysisStage for LandfallStage {
    type Row = LandfallRecord;

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

        let max_category = storm.max_category();
        if !max_category.map_or(false, is_tropical_storm) {
            return Ok(Vec::new());
        }

        let (distances, events) =
            storm_events(storm, config.threshold_km, None, &self.overrides)?;

        let mut rows = Vec::with_capacity(events.len());
        for event in &events {
            let idx = event.first();
            let Some(position) = storm.positions()[idx] else {
                self.logger.warn(&format!(
                    "{} landfall at index {} has no position",
                    storm.sid(),
                    idx
                ));
                continue;
            };
            if position.lon >= config.landfall_max_lon {
                continue;
            }
            rows.push(LandfallRecord {
                name: storm.name().to_string(),
                year: storm.year(),
                t0: storm.start(),
                tf: storm.end(),
                max_usa_sshs: max_category,
                landfall_lat: position.lat,
                landfall_lon: position.lon,
                dist_from_shore_km: distances[idx],
                landfall_cat: storm.category()[idx],
                landfall_wspd_kts: storm.wind()[idx],
                landfall_pres: storm.pressure()[idx],
                sid: storm.sid().to_string(),
                findex: storm.index(),
            });
        }

        if !rows.is_empty() {
            self.logger.detail(&format!(
                "{} {}: {} of {} events west of {}",
                storm.sid(),
                storm.name(),
                rows.len(),
                events.len(),
                config.landfall_max_lon
            ));
        }
        Ok(rows)
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}
