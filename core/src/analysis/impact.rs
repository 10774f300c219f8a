use std::collections::BTreeMap;

use crate::analysis::storm_events;
use crate::prelude::{AnalysisConfig, AnalysisError, AnalysisResult, AnalysisStage};
use crate::records::YearCount;
use crate::segment::OverrideTable;
use crate::telemetry::LogManager;
use crate::track::{is_major, is_tropical_storm, StormTrack};

/// A storm that came within the threshold of land west of the impact longitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImpactRecord {
    pub year: i32,
    pub major: bool,
}

/// Classifies storms as landfalling (tropical storm or stronger) and major (category 3+).
pub struct ImpactStage {
    config: Option<AnalysisConfig>,
    logger: LogManager,
}

impl ImpactStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("counts"),
        }
    }
}

impl Default for ImpactStage {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisStage for ImpactStage {
    type Row = ImpactRecord;

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

        let Some(category) = storm.max_category().filter(|&c| is_tropical_storm(c)) else {
            return Ok(Vec::new());
        };

        // Overrides never change whether a storm made landfall.
        let (_, events) = storm_events(
            storm,
            config.threshold_km,
            Some(config.impact_max_lon),
            &OverrideTable::new(),
        )?;
        let impacts_west = !events.is_empty();
        if !impacts_west {
            return Ok(Vec::new());
        }

        let major = is_major(category);
        self.logger.detail(&format!(
            "{} {} landfall in {} (category {})",
            storm.sid(),
            storm.name(),
            storm.year(),
            category
        ));
        Ok(vec![ImpactRecord {
            year: storm.year(),
            major,
        }])
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}

/// Counts landfalling and major-landfall storms for every year of the range.
pub fn tally_by_year(
    records: &[ImpactRecord],
    start_year: i32,
    end_year: i32,
) -> (Vec<YearCount>, Vec<YearCount>) {
    let mut all: BTreeMap<i32, usize> = (start_year..=end_year).map(|y| (y, 0)).collect();
    let mut major = all.clone();

    for record in records {
        if let Some(count) = all.get_mut(&record.year) {
            *count += 1;
        }
        if record.major {
            if let Some(count) = major.get_mut(&record.year) {
                *count += 1;
            }
        }
    }

    let to_rows = |counts: BTreeMap<i32, usize>| {
        counts
            .into_iter()
            .map(|(year, storm_count)| YearCount { year, storm_count })
            .collect::<Vec<_>>()
    };
    (to_rows(all), to_rows(major))
}
