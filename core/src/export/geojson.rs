//! GeoJSON export of storm tracks and their approach windows.

use std::io::Write;

use serde_json::{json, Value};

use crate::analysis::StormApproach;
use crate::prelude::{AnalysisError, AnalysisResult};
use crate::track::Position;

fn coordinates(positions: &[Position]) -> Vec<[f64; 2]> {
    // GeoJSON orders coordinates as [lon, lat].
    positions.iter().map(|p| [p.lon, p.lat]).collect()
}

fn track_geometry(positions: &[Position]) -> Value {
    if positions.len() == 1 {
        json!({ "type": "Point", "coordinates": coordinates(positions)[0] })
    } else {
        json!({ "type": "LineString", "coordinates": coordinates(positions) })
    }
}

/// Builds a `FeatureCollection` with one track feature per storm and one
/// approach feature per storm that has landfall events.
pub fn approach_collection(storms: &[StormApproach]) -> Value {
    let mut features = Vec::with_capacity(storms.len() * 2);
    for storm in storms {
        if storm.track.is_empty() {
            continue;
        }
        features.push(json!({
            "type": "Feature",
            "geometry": track_geometry(&storm.track),
            "properties": {
                "kind": "track",
                "sid": storm.sid,
                "name": storm.name,
                "year": storm.year,
                "landfall_events": storm.events.len(),
            },
        }));
        if !storm.approach.is_empty() {
            features.push(json!({
                "type": "Feature",
                "geometry": {
                    "type": "MultiPoint",
                    "coordinates": coordinates(&storm.approach_positions()),
                },
                "properties": {
                    "kind": "approach",
                    "sid": storm.sid,
                    "name": storm.name,
                    "year": storm.year,
                    "landfall_indices": storm.events.iter().map(|e| e.first()).collect::<Vec<_>>(),
                },
            }));
        }
    }
    json!({ "type": "FeatureCollection", "features": features })
}

pub fn write_collection<W: Write>(writer: W, collection: &Value) -> AnalysisResult<()> {
    serde_json::to_writer_pretty(writer, collection)
        .map_err(|err| AnalysisError::Internal(format!("writing GeoJSON: {}", err)))
}
