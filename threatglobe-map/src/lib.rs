//! # Threatglobe Map — Surface Synchronization Engine
//!
//! Drives a rendering surface from the threatglobe-core domain layer: scene
//! creation, in-place data updates, display-mode flips, and the idle globe
//! rotation. The surface itself is a trait; `HeadlessSurface` is the
//! in-process implementation used by the app binary and the tests.

pub mod engine;
pub mod headless;
pub mod layers;
pub mod spin;
pub mod surface;
pub mod sync;

pub use engine::{EngineReport, MapEngine};
pub use headless::HeadlessSurface;
pub use layers::{threat_scene, LayerSpec, HEAT_LAYER_ID, POINTS_LAYER_ID, PULSE_LAYER_ID, THREAT_SOURCE_ID};
pub use spin::{IdleSpinController, SPIN_DURATION_MS, SPIN_STEP_DEGREES, SPIN_ZOOM_THRESHOLD};
pub use surface::{
    CameraTarget, Easing, MapSurface, SurfaceCallback, SurfaceError, SurfaceEvent, SurfaceNotice,
    ViewState,
};
pub use sync::LayerSynchronizer;
