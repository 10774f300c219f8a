pub mod geojson;

pub use geojson::{approach_collection, write_collection};
