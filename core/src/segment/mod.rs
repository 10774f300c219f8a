//! Landfall segmentation and the consumers of its events.

pub mod events;
pub mod selection;
pub mod sentinel;
pub mod window;

pub use events::{qualifying_indices, segment, segment_indices, LandfallEvent};
pub use selection::{EventSelection, OverrideTable};
pub use sentinel::{clean, resolve_landfall, MISSING_SENTINEL};
pub use window::{approach_window, merged_windows};
