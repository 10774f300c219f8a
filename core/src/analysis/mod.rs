pub mod approach;
pub mod impact;
pub mod landfall;
pub mod nearest;
pub mod summary;

pub use approach::{ApproachStage, StormApproach};
pub use impact::{tally_by_year, ImpactRecord, ImpactStage};
pub use landfall::LandfallStage;
pub use nearest::{join_nearest, SiteTable};
pub use summary::{CategoryStage, SummaryStage};

use crate::prelude::AnalysisResult;
use crate::segment::{
    qualifying_indices, resolve_landfall, segment_indices, LandfallEvent, OverrideTable,
};
use crate::track::StormTrack;

/// Segments a storm's landfall samples and applies its override rule.
///
/// With `max_lon`, qualifying samples at or east of that longitude (or
/// without a position) are dropped before merging, which also splits events.
pub fn storm_events(
    storm: &StormTrack,
    threshold_km: f64,
    max_lon: Option<f64>,
    overrides: &OverrideTable,
) -> AnalysisResult<(Vec<f64>, Vec<LandfallEvent>)> {
    let distances = resolve_landfall(storm.landfall())?;
    let positions = storm.positions();
    let qualifying: Vec<usize> = qualifying_indices(&distances, threshold_km)?
        .into_iter()
        .filter(|&i| match max_lon {
            None => true,
            Some(limit) => positions[i].map_or(false, |p| p.lon < limit),
        })
        .collect();

    let events = segment_indices(&qualifying)?;
    let events = overrides.select(storm.sid(), storm.len(), events)?;
    Ok((distances, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::EventSelection;
    use crate::track::fixtures::track;

    #[test]
    fn longitude_limit_splits_and_drops_events() {
        let storm = track(
            "S1",
            &[Some(50.0), Some(60.0), Some(70.0), Some(300.0), Some(20.0), None],
            &[-30.0, -70.0, -71.0, -72.0, -80.0, -81.0],
        );
        let (_, all) = storm_events(&storm, 111.0, None, &OverrideTable::new()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].indices(), &[0, 1, 2]);
        assert_eq!(all[1].indices(), &[4, 5]);

        let (_, west) = storm_events(&storm, 111.0, Some(-40.0), &OverrideTable::new()).unwrap();
        assert_eq!(west[0].indices(), &[1, 2]);
        assert_eq!(west[1].indices(), &[4, 5]);
    }

    #[test]
    fn override_rule_is_applied_after_segmentation() {
        let storm = track(
            "S2",
            &[Some(50.0), Some(300.0), Some(20.0), None],
            &[-70.0, -71.0, -72.0, -73.0],
        );
        let mut overrides = OverrideTable::new();
        overrides.insert("S2", EventSelection::Last);
        let (distances, events) = storm_events(&storm, 111.0, None, &overrides).unwrap();
        assert_eq!(distances[3], 20.0);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].indices(), &[2, 3]);
    }
}
