use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};

use super::events::LandfallEvent;

/// Sample indices observed within `lead` before any of the event's timestamps.
///
/// For each event timestamp `t`, every index whose time lies in
/// `[t - lead, t]` is selected; the result is the sorted union.
pub fn approach_window(
    times: &[DateTime<Utc>],
    event: &LandfallEvent,
    lead: Duration,
) -> Vec<usize> {
    let mut selected = BTreeSet::new();
    for &event_index in event.indices() {
        let Some(&t1) = times.get(event_index) else {
            continue;
        };
        let t0 = t1 - lead;
        selected.extend(
            times
                .iter()
                .enumerate()
                .filter(|&(_, &t)| t0 <= t && t <= t1)
                .map(|(i, _)| i),
        );
    }
    selected.into_iter().collect()
}

/// Approach windows of several events merged and deduplicated by index.
pub fn merged_windows(
    times: &[DateTime<Utc>],
    events: &[LandfallEvent],
    lead: Duration,
) -> Vec<usize> {
    let merged: BTreeSet<usize> = events
        .iter()
        .flat_map(|event| approach_window(times, event, lead))
        .collect();
    merged.into_iter().collect()
}
