//! Rendering surface abstraction.
//!
//! The engine drives any backend exposing these primitives: GeoJSON sources,
//! styled layers with visibility, camera easing, and the two asynchronous
//! notifications the sync and spin logic live off (style load, movement
//! settled). Nothing above this trait knows which rendering technology is
//! attached.

use std::sync::Arc;

use thiserror::Error;

use threatglobe_core::geojson::FeatureCollection;

use crate::layers::LayerSpec;

#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("Source already exists: {0}")]
    DuplicateSource(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Layer already exists: {0}")]
    DuplicateLayer(String),

    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    #[error("Surface is closed")]
    Closed,
}

/// Camera position as the surface reports it.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ViewState {
    pub lng: f64,
    pub lat: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Easing {
    Linear,
    EaseInOut,
}

/// A requested eased camera move. The surface animates toward the target and
/// reports a MoveEnd once it settles.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct CameraTarget {
    pub lng: f64,
    pub lat: f64,
    pub duration_ms: u64,
    pub easing: Easing,
}

/// Notifications a surface pushes to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceEvent {
    /// Style finished loading; sources/layers may now be created.
    StyleLoad,
    /// Camera movement settled (user gesture or eased transition).
    MoveEnd,
}

/// Payload delivered with each notification.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceNotice {
    pub event: SurfaceEvent,
    pub view: ViewState,
}

/// A subscriber callback. Callbacks may re-enter the surface, so
/// implementations must not hold internal locks while dispatching.
pub type SurfaceCallback = Arc<dyn Fn(&SurfaceNotice) + Send + Sync>;

/// The collaborator boundary between the engine and a rendering backend.
pub trait MapSurface: Send + Sync {
    fn add_source(&self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError>;
    fn has_source(&self, id: &str) -> bool;
    fn set_source_data(&self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError>;

    fn add_layer(&self, spec: LayerSpec) -> Result<(), SurfaceError>;
    fn has_layer(&self, id: &str) -> bool;
    fn set_layer_visibility(&self, id: &str, visible: bool) -> Result<(), SurfaceError>;
    fn layer_visibility(&self, id: &str) -> Option<bool>;

    /// Whether the style finished loading. Data pushes before this are
    /// rejected by real backends, so the sync layer guards on it.
    fn is_style_loaded(&self) -> bool;

    fn view(&self) -> ViewState;
    fn ease_to(&self, target: CameraTarget) -> Result<(), SurfaceError>;

    /// Subscribe to a notification kind. Returns a token for unsubscribe.
    fn subscribe(&self, event: SurfaceEvent, callback: SurfaceCallback) -> u64;
    fn unsubscribe(&self, token: u64) -> bool;
}
