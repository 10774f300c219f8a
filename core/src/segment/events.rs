use serde::Serialize;

use crate::prelude::{AnalysisError, AnalysisResult};

/// One discrete approach to land: a maximal run of consecutive sample
/// indices whose distance from land is below the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LandfallEvent {
    indices: Vec<usize>,
}

impl LandfallEvent {
    /// Wraps a hand-curated run, checking it is non-empty and contiguous.
    pub fn from_run(indices: Vec<usize>) -> AnalysisResult<Self> {
        if indices.is_empty() {
            return Err(AnalysisError::Empty("landfall event has no indices".into()));
        }
        if let Some(pos) = indices.windows(2).position(|w| w[1] != w[0] + 1) {
            return Err(AnalysisError::InvalidInput(format!(
                "landfall event indices {:?} are not contiguous at position {}",
                indices,
                pos + 1
            )));
        }
        Ok(Self { indices })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The landfall instant.
    pub fn first(&self) -> usize {
        self.indices[0]
    }

    pub fn last(&self) -> usize {
        self.indices[self.indices.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Splits the samples closer to land than `threshold_km` into landfall events.
///
/// `distances` must already have missing samples resolved (see
/// [`resolve_landfall`](super::resolve_landfall)); `+inf` is accepted as
/// "never qualifies", any other non-finite or negative value is rejected.
pub fn segment(distances: &[f64], threshold_km: f64) -> AnalysisResult<Vec<LandfallEvent>> {
    segment_indices(&qualifying_indices(distances, threshold_km)?)
}

/// Indices whose distance is below the threshold, after validating the input.
pub fn qualifying_indices(distances: &[f64], threshold_km: f64) -> AnalysisResult<Vec<usize>> {
    if !threshold_km.is_finite() || threshold_km <= 0.0 {
        return Err(AnalysisError::InvalidThreshold(threshold_km));
    }
    if distances.is_empty() {
        return Err(AnalysisError::Empty("no distance samples".into()));
    }
    for (index, &value) in distances.iter().enumerate() {
        if value.is_nan() || value == f64::NEG_INFINITY {
            return Err(AnalysisError::NonFinite { index, value });
        }
        if value < 0.0 {
            return Err(AnalysisError::NegativeDistance { index, value });
        }
    }

    Ok(distances
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d < threshold_km)
        .map(|(i, _)| i)
        .collect())
}

/// Merges strictly increasing qualifying indices into maximal consecutive runs.
pub fn segment_indices(qualifying: &[usize]) -> AnalysisResult<Vec<LandfallEvent>> {
    let mut events = Vec::new();
    let mut current: Vec<usize> = Vec::new();

    for (position, &index) in qualifying.iter().enumerate() {
        match current.last().copied() {
            Some(previous) if index <= previous => {
                return Err(AnalysisError::UnorderedIndices {
                    position,
                    previous,
                    current: index,
                });
            }
            Some(previous) if index != previous + 1 => {
                events.push(LandfallEvent {
                    indices: std::mem::take(&mut current),
                });
            }
            _ => {}
        }
        current.push(index);
    }
    if !current.is_empty() {
        events.push(LandfallEvent { indices: current });
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::collections::BTreeSet;

    fn runs(events: &[LandfallEvent]) -> Vec<Vec<usize>> {
        events.iter().map(|e| e.indices().to_vec()).collect()
    }

    #[test]
    fn splits_two_approaches() {
        let distances = [200.0, 150.0, 80.0, 70.0, 90.0, 200.0, 50.0, 200.0];
        let events = segment(&distances, 111.0).unwrap();
        assert_eq!(runs(&events), vec![vec![2, 3, 4], vec![6]]);
        assert_eq!(events[0].first(), 2);
        assert_eq!(events[0].last(), 4);
    }

    #[test]
    fn leading_run_and_trailing_single() {
        let events = segment(&[50.0, 60.0, 200.0, 55.0], 111.0).unwrap();
        assert_eq!(runs(&events), vec![vec![0, 1], vec![3]]);
    }

    #[test]
    fn no_qualifying_sample_means_no_landfall() {
        let events = segment(&[500.0, f64::INFINITY, 111.0], 111.0).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn single_qualifying_sample() {
        let events = segment(&[10.0], 111.0).unwrap();
        assert_eq!(runs(&events), vec![vec![0]]);
    }

    #[test]
    fn whole_track_qualifies() {
        let events = segment(&[0.0, 5.0, 20.0, 110.9], 111.0).unwrap();
        assert_eq!(runs(&events), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(segment(&[], 111.0), Err(AnalysisError::Empty(_))));
    }

    #[test]
    fn rejects_nan_and_unresolved_sentinel() {
        assert!(matches!(
            segment(&[10.0, f64::NAN], 111.0),
            Err(AnalysisError::NonFinite { index: 1, .. })
        ));
        assert!(matches!(
            segment(&[-9999.0, 10.0], 111.0),
            Err(AnalysisError::NegativeDistance { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_bad_threshold() {
        assert!(matches!(
            segment(&[10.0], f64::NAN),
            Err(AnalysisError::InvalidThreshold(_))
        ));
        assert!(matches!(
            segment(&[10.0], 0.0),
            Err(AnalysisError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn segment_indices_rejects_unordered_input() {
        assert!(matches!(
            segment_indices(&[3, 4, 4]),
            Err(AnalysisError::UnorderedIndices { position: 2, .. })
        ));
    }

    #[test]
    fn segment_indices_over_filtered_subset() {
        let events = segment_indices(&[1, 2, 5, 9, 10, 11]).unwrap();
        assert_eq!(runs(&events), vec![vec![1, 2], vec![5], vec![9, 10, 11]]);
    }

    #[test]
    fn from_run_requires_contiguous_indices() {
        assert!(LandfallEvent::from_run(vec![26, 27, 28]).is_ok());
        assert!(LandfallEvent::from_run(vec![26, 28]).is_err());
        assert!(LandfallEvent::from_run(Vec::new()).is_err());
    }

    #[test]
    fn random_sequences_hold_segmentation_properties() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let len = rng.gen_range(1..60);
            let distances: Vec<f64> = (0..len)
                .map(|_| {
                    if rng.gen_bool(0.1) {
                        f64::INFINITY
                    } else {
                        rng.gen_range(0.0..300.0)
                    }
                })
                .collect();
            let events = segment(&distances, 111.0).unwrap();

            let expected: BTreeSet<usize> =
                (0..len).filter(|&i| distances[i] < 111.0).collect();
            let covered: BTreeSet<usize> =
                events.iter().flat_map(|e| e.indices().iter().copied()).collect();
            assert_eq!(covered, expected);

            for event in &events {
                assert!(!event.is_empty());
                assert!(event.indices().windows(2).all(|w| w[1] == w[0] + 1));
            }
            for pair in events.windows(2) {
                assert!(pair[1].first() >= pair[0].last() + 2);
            }

            assert_eq!(segment(&distances, 111.0).unwrap(), events);
        }
    }
}
