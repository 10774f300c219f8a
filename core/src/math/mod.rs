pub mod geodesy;
pub mod stats;

pub use geodesy::geodesic_km;
pub use stats::StatsHelper;
