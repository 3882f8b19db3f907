//! Idle globe rotation.
//!
//! Each time the camera settles, one small westward ease is requested; the
//! transition's own settle notification schedules the next step, so the
//! rotation is a self-sustaining cycle with no timer of its own. Zooming to
//! 3 or beyond is the only thing that suppresses a step; the cycle resumes
//! untouched once the user zooms back out.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::debug;

use crate::surface::{CameraTarget, Easing, MapSurface};

/// Zoom at or above which rotation pauses.
pub const SPIN_ZOOM_THRESHOLD: f64 = 3.0;
/// Degrees moved west per settle.
pub const SPIN_STEP_DEGREES: f64 = 0.5;
/// Duration of one rotation step.
pub const SPIN_DURATION_MS: u64 = 1500;

#[derive(Debug, Clone, serde::Serialize)]
pub struct SpinReport {
    pub enabled: bool,
    pub steps_taken: u64,
    pub suppressed: u64,
}

pub struct IdleSpinController {
    enabled: AtomicBool,
    steps_taken: AtomicU64,
    suppressed: AtomicU64,
}

impl IdleSpinController {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            steps_taken: AtomicU64::new(0),
            suppressed: AtomicU64::new(0),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Whether a settle at this zoom produces a step. Evaluated fresh on
    /// every notification; nothing is cached across settles.
    pub fn eligible(&self, zoom: f64) -> bool {
        self.is_enabled() && zoom < SPIN_ZOOM_THRESHOLD
    }

    /// Settle handler: requests exactly one eased step west when eligible.
    pub fn on_settle(&self, surface: &dyn MapSurface) {
        let view = surface.view();
        if !self.eligible(view.zoom) {
            self.suppressed.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let target = CameraTarget {
            lng: view.lng - SPIN_STEP_DEGREES,
            lat: view.lat,
            duration_ms: SPIN_DURATION_MS,
            easing: Easing::Linear,
        };
        match surface.ease_to(target) {
            Ok(()) => {
                self.steps_taken.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                debug!(error = %e, "Spin step rejected by surface");
            }
        }
    }

    pub fn report(&self) -> SpinReport {
        SpinReport {
            enabled: self.is_enabled(),
            steps_taken: self.steps_taken.load(Ordering::Relaxed),
            suppressed: self.suppressed.load(Ordering::Relaxed),
        }
    }
}
