use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::events::LandfallEvent;
use crate::prelude::{AnalysisError, AnalysisResult};

/// Rule choosing which segmented events of a storm are kept.
///
/// Used for tracks whose geometry yields spurious events, e.g. passing
/// over Mexico or the Caribbean before the landfall of interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum EventSelection {
    #[default]
    All,
    First,
    Last,
    /// Events by position; negative positions count from the end.
    Ordinals { ordinals: Vec<i64> },
    /// Replace the segmented events with curated index runs.
    Explicit { runs: Vec<Vec<usize>> },
}

impl EventSelection {
    pub fn apply(
        &self,
        sid: &str,
        track_len: usize,
        events: Vec<LandfallEvent>,
    ) -> AnalysisResult<Vec<LandfallEvent>> {
        let invalid = |reason: String| AnalysisError::InvalidOverride {
            sid: sid.to_string(),
            reason,
        };
        match self {
            EventSelection::All => Ok(events),
            EventSelection::First => Ok(events.into_iter().take(1).collect()),
            EventSelection::Last => Ok(events.into_iter().last().into_iter().collect()),
            EventSelection::Ordinals { ordinals } => {
                let count = events.len() as i64;
                ordinals
                    .iter()
                    .map(|&ordinal| {
                        let position = if ordinal < 0 { count + ordinal } else { ordinal };
                        if position < 0 || position >= count {
                            return Err(invalid(format!(
                                "event {} requested but only {} events exist",
                                ordinal, count
                            )));
                        }
                        Ok(events[position as usize].clone())
                    })
                    .collect()
            }
            EventSelection::Explicit { runs } => runs
                .iter()
                .map(|run| {
                    if let Some(&out_of_range) = run.iter().find(|&&i| i >= track_len) {
                        return Err(invalid(format!(
                            "index {} outside track of {} samples",
                            out_of_range, track_len
                        )));
                    }
                    LandfallEvent::from_run(run.clone()).map_err(|err| invalid(err.to_string()))
                })
                .collect(),
        }
    }
}

/// Per-storm event selection rules keyed by storm identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTable {
    rules: HashMap<String, EventSelection>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml(contents: &str) -> AnalysisResult<Self> {
        serde_yaml::from_str(contents)
            .map_err(|err| AnalysisError::InvalidInput(format!("override table: {}", err)))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&contents)
    }

    pub fn insert(&mut self, sid: impl Into<String>, rule: EventSelection) {
        self.rules.insert(sid.into(), rule);
    }

    /// Adds every rule of `other`, replacing existing entries.
    pub fn extend(&mut self, other: OverrideTable) {
        self.rules.extend(other.rules);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_for(&self, sid: &str) -> &EventSelection {
        static ALL: EventSelection = EventSelection::All;
        self.rules.get(sid).unwrap_or(&ALL)
    }

    /// Applies the storm's rule, or keeps every event when it has none.
    pub fn select(
        &self,
        sid: &str,
        track_len: usize,
        events: Vec<LandfallEvent>,
    ) -> AnalysisResult<Vec<LandfallEvent>> {
        self.rule_for(sid).apply(sid, track_len, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segment_indices;

    fn five_events() -> Vec<LandfallEvent> {
        segment_indices(&[1, 2, 5, 8, 9, 12, 15, 16]).unwrap()
    }

    fn firsts(events: &[LandfallEvent]) -> Vec<usize> {
        events.iter().map(|e| e.first()).collect()
    }

    #[test]
    fn storms_without_rule_keep_all_events() {
        let table = OverrideTable::new();
        let kept = table.select("2005236N23285", 20, five_events()).unwrap();
        assert_eq!(firsts(&kept), vec![1, 5, 8, 12, 15]);
    }

    #[test]
    fn first_and_last_rules() {
        assert_eq!(
            firsts(&EventSelection::First.apply("a", 20, five_events()).unwrap()),
            vec![1]
        );
        assert_eq!(
            firsts(&EventSelection::Last.apply("a", 20, five_events()).unwrap()),
            vec![15]
        );
        assert!(EventSelection::Last
            .apply("a", 20, Vec::new())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn ordinals_count_from_both_ends() {
        let rule = EventSelection::Ordinals {
            ordinals: vec![0, -1],
        };
        assert_eq!(firsts(&rule.apply("a", 20, five_events()).unwrap()), vec![1, 15]);

        let rule = EventSelection::Ordinals {
            ordinals: vec![2, 3, 4],
        };
        assert_eq!(
            firsts(&rule.apply("a", 20, five_events()).unwrap()),
            vec![8, 12, 15]
        );
    }

    #[test]
    fn out_of_range_ordinal_names_the_storm() {
        let rule = EventSelection::Ordinals { ordinals: vec![5] };
        let err = rule.apply("2017242N16333", 20, five_events()).unwrap_err();
        assert!(err.to_string().contains("2017242N16333"));
    }

    #[test]
    fn explicit_runs_replace_segmentation() {
        let rule = EventSelection::Explicit {
            runs: vec![vec![26, 27, 28]],
        };
        let kept = rule.apply("a", 40, five_events()).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].indices(), &[26, 27, 28]);

        assert!(rule.apply("a", 28, Vec::new()).is_err());
        let gappy = EventSelection::Explicit {
            runs: vec![vec![3, 5]],
        };
        assert!(gappy.apply("a", 40, Vec::new()).is_err());
    }

    #[test]
    fn table_parses_from_yaml() {
        let table = OverrideTable::from_yaml(
            "2004223N11301: { rule: last }\n\
             2005236N23285: { rule: ordinals, ordinals: [0, -1] }\n\
             2008238N13293: { rule: explicit, runs: [[26, 27, 28]] }\n",
        )
        .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rule_for("2004223N11301"), &EventSelection::Last);
        assert_eq!(
            table.rule_for("2005236N23285"),
            &EventSelection::Ordinals {
                ordinals: vec![0, -1]
            }
        );
        assert_eq!(table.rule_for("missing"), &EventSelection::All);
    }
}
