use anyhow::Context;
use chrono::{Datelike, Duration, TimeZone, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use stormcore::track::{Position, StormIdentity, StormTrack, TrackSeries};

const NAMES: [&str; 8] = [
    "ARLENE", "BRET", "CINDY", "DON", "EMILY", "FRANKLIN", "GERT", "HARVEY",
];

/// Configuration for generating synthetic North Atlantic storm tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub storms: usize,
    pub seed: u64,
    pub start_year: i32,
    pub years: i32,
    pub min_fixes: usize,
    pub max_fixes: usize,
    /// Longitude of the idealised mainland coastline.
    pub coast_lon: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            storms: 20,
            seed: 0,
            start_year: 2000,
            years: 10,
            min_fixes: 20,
            max_fixes: 60,
            coast_lon: -80.0,
        }
    }
}

/// Distance to the idealised coast: a north-south mainland plus an island chain.
fn distance_from_land(position: Position, coast_lon: f64) -> f64 {
    let km_per_degree = 111.32 * position.lat.to_radians().cos();
    let mainland = ((position.lon - coast_lon) * km_per_degree).max(0.0);
    let over_islands = (17.0..=20.0).contains(&position.lat) && (-68.0..=-62.0).contains(&position.lon);
    if over_islands {
        mainland.min(30.0)
    } else {
        mainland
    }
}

fn wind_for(category: i8) -> f64 {
    match category {
        i8::MIN..=-1 => 30.0,
        0 => 45.0,
        1 => 75.0,
        2 => 90.0,
        3 => 105.0,
        4 => 125.0,
        _ => 145.0,
    }
}

fn build_storm(config: &SyntheticConfig, index: usize, rng: &mut StdRng) -> anyhow::Result<StormTrack> {
    let years = config.years.max(1);
    let year = config.start_year + (index as i32 % years);
    let fixes = rng.gen_range(config.min_fixes.max(2)..=config.max_fixes.max(config.min_fixes.max(2)));
    let peak: i8 = rng.gen_range(-1..=5);

    let genesis = Utc
        .with_ymd_and_hms(year, 8, 1, 0, 0, 0)
        .single()
        .context("building genesis time")?
        + Duration::hours(6 * rng.gen_range(0..240));
    let mut position = Position::new(rng.gen_range(10.0..18.0), rng.gen_range(-50.0..-20.0));

    let mut series = TrackSeries::default();
    for step in 0..fixes {
        let phase = (step as f64 + 0.5) / fixes as f64;
        let category = ((peak as f64 + 1.0) * (PI * phase).sin()).round() as i8 - 1;
        series.times.push(genesis + Duration::hours(6 * step as i64));
        series.basins.push("NA".to_string());
        series.positions.push(Some(position));
        series.landfall.push(Some(distance_from_land(position, config.coast_lon)));
        series.category.push(Some(category));
        series.wind.push(Some(wind_for(category)));
        series.pressure.push(Some(1010.0 - (wind_for(category) - 25.0) * 0.8));

        position.lon -= rng.gen_range(0.4..1.2);
        position.lat += rng.gen_range(0.1..0.5);
    }
    // The dataset never populates landfall distance at the final fix.
    if let Some(last) = series.landfall.last_mut() {
        *last = None;
    }

    let origin = series.positions[0].context("synthetic track without origin")?;
    let identity = StormIdentity {
        sid: format!(
            "{}{:03}N{:02}{:03}",
            year,
            genesis.ordinal(),
            origin.lat.round() as i32,
            (360.0 + origin.lon).round() as i32
        ),
        index,
        name: NAMES[index % NAMES.len()].to_string(),
        season: Some(year),
    };
    StormTrack::new(identity, series).context("assembling synthetic track")
}

pub fn build_storms(config: &SyntheticConfig) -> anyhow::Result<Vec<StormTrack>> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    (0..config.storms)
        .map(|index| build_storm(config, index, &mut rng))
        .collect()
}

/// A storm observed only once, which landfall segmentation must reject.
#[cfg(test)]
pub fn single_fix_storm(year: i32) -> StormTrack {
    let series = TrackSeries {
        times: vec![Utc.with_ymd_and_hms(year, 9, 1, 0, 0, 0).unwrap()],
        basins: vec!["NA".to_string()],
        positions: vec![Some(Position::new(25.0, -79.0))],
        landfall: vec![Some(0.0)],
        category: vec![Some(1)],
        wind: vec![Some(75.0)],
        pressure: vec![Some(990.0)],
    };
    let identity = StormIdentity {
        sid: format!("{}244N25281", year),
        index: 999,
        name: "UNNAMED".to_string(),
        season: Some(year),
    };
    StormTrack::new(identity, series).unwrap()
}
