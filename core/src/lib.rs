//! Storm-track analysis core for IBTrACS best-track data.
//!
//! Splits each storm's distance-from-land series into discrete landfall
//! events and derives the landfall summaries, yearly counts and approach
//! windows used by the `analyzer` command-line driver.

pub mod analysis;
pub mod export;
pub mod ibtracs;
pub mod math;
pub mod prelude;
pub mod records;
pub mod segment;
pub mod telemetry;
pub mod track;

pub use prelude::{AnalysisConfig, AnalysisError, AnalysisResult, AnalysisStage};
pub use segment::{segment, LandfallEvent};
pub use track::{Position, StormTrack};
