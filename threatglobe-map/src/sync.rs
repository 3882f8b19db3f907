//! Keeps the threat source and its layers consistent with the latest
//! projection and display mode.
//!
//! Scene creation and data updates are separate operations: `ensure_scene`
//! is an idempotent create-if-absent pass safe to run on every style load,
//! while `set_data` replaces source contents in place and silently drops the
//! update when the surface is not ready. Routine updates never rebuild the
//! scene.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info};

use threatglobe_core::geojson::FeatureCollection;
use threatglobe_core::types::DisplayMode;

use crate::layers::{threat_scene, THREAT_SOURCE_ID};
use crate::surface::{MapSurface, SurfaceError};

#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncReport {
    pub updates_applied: u64,
    pub updates_dropped: u64,
    pub mode_switches: u64,
}

pub struct LayerSynchronizer {
    /// Last collection handed to `set_data`; installed on scene creation so
    /// a late style load still shows current data.
    features: RwLock<FeatureCollection>,
    display: RwLock<DisplayMode>,
    updates_applied: AtomicU64,
    updates_dropped: AtomicU64,
    mode_switches: AtomicU64,
}

impl LayerSynchronizer {
    pub fn new(display: DisplayMode) -> Self {
        Self {
            features: RwLock::new(FeatureCollection::empty()),
            display: RwLock::new(display),
            updates_applied: AtomicU64::new(0),
            updates_dropped: AtomicU64::new(0),
            mode_switches: AtomicU64::new(0),
        }
    }

    /// Creates the source and all three layers if absent. No-op while the
    /// style is loading or once the scene exists. Returns whether this call
    /// created the scene.
    pub fn ensure_scene(&self, surface: &dyn MapSurface) -> Result<bool, SurfaceError> {
        if !surface.is_style_loaded() {
            return Ok(false);
        }
        if surface.has_source(THREAT_SOURCE_ID) {
            return Ok(false);
        }
        let features = self.features.read().clone();
        let mode = *self.display.read();
        surface.add_source(THREAT_SOURCE_ID, features)?;
        for spec in threat_scene(mode) {
            surface.add_layer(spec)?;
        }
        info!(mode = mode.label(), "Threat scene created");
        Ok(true)
    }

    /// Replaces the source contents with a new collection. Dropped (and
    /// counted) when the style or source is not ready; the cached collection
    /// is installed by the next `ensure_scene` instead.
    pub fn set_data(&self, surface: &dyn MapSurface, features: FeatureCollection) {
        *self.features.write() = features.clone();
        if surface.is_style_loaded() && surface.has_source(THREAT_SOURCE_ID) {
            match surface.set_source_data(THREAT_SOURCE_ID, features) {
                Ok(()) => {
                    self.updates_applied.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    self.updates_dropped.fetch_add(1, Ordering::Relaxed);
                    debug!(error = %e, "Source update failed, dropped");
                }
            }
        } else {
            self.updates_dropped.fetch_add(1, Ordering::Relaxed);
            debug!("Surface not ready, update dropped");
        }
    }

    /// Switches display mode by flipping layer visibility. Layers are never
    /// removed or re-added on a mode change.
    pub fn set_display_mode(&self, surface: &dyn MapSurface, mode: DisplayMode) {
        let changed = {
            let mut display = self.display.write();
            let changed = *display != mode;
            *display = mode;
            changed
        };
        if changed {
            self.mode_switches.fetch_add(1, Ordering::Relaxed);
            info!(mode = mode.label(), "Display mode switched");
        }
        for spec in threat_scene(mode) {
            if surface.has_layer(&spec.id) {
                if let Err(e) = surface.set_layer_visibility(&spec.id, spec.visible) {
                    debug!(layer = %spec.id, error = %e, "Visibility flip failed");
                }
            }
        }
    }

    pub fn display(&self) -> DisplayMode {
        *self.display.read()
    }

    pub fn report(&self) -> SyncReport {
        SyncReport {
            updates_applied: self.updates_applied.load(Ordering::Relaxed),
            updates_dropped: self.updates_dropped.load(Ordering::Relaxed),
            mode_switches: self.mode_switches.load(Ordering::Relaxed),
        }
    }
}
