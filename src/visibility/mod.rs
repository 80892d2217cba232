//! Visibility: momentary camera coverage and persistent exploration fog
//!
//! The two are deliberately separate. Camera coverage is recomputed from
//! scratch each turn; fog accumulates for the whole run.

pub mod camera;
pub mod fog;

pub use camera::{Camera, CameraRig, SensorFlags, SensorRanges, VisibilityMask};
pub use fog::ExplorationFog;
