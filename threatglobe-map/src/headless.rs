//! In-process rendering surface.
//!
//! Models the asynchronous half of a real map backend: style load and camera
//! settling are explicit driver calls (`load_style`, `settle`) so an app loop
//! or a test decides when those notifications fire. An eased camera move is
//! recorded as pending and only applied on the next `settle`, which is what
//! keeps the idle-spin loop a scheduled cycle rather than recursion.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use threatglobe_core::geojson::FeatureCollection;

use crate::layers::LayerSpec;
use crate::surface::{
    CameraTarget, MapSurface, SurfaceCallback, SurfaceError, SurfaceEvent, SurfaceNotice, ViewState,
};

/// Initial camera: the globe view the app opens on.
pub const DEFAULT_VIEW: ViewState = ViewState {
    lng: 10.0,
    lat: 15.0,
    zoom: 1.6,
    pitch: 45.0,
    bearing: 0.0,
};

struct SurfaceState {
    style_loaded: bool,
    sources: HashMap<String, FeatureCollection>,
    layers: Vec<LayerSpec>,
    view: ViewState,
    pending: Option<CameraTarget>,
}

struct HeadlessSubscription {
    token: u64,
    event: SurfaceEvent,
    callback: SurfaceCallback,
}

pub struct HeadlessSurface {
    state: RwLock<SurfaceState>,
    subscribers: RwLock<Vec<HeadlessSubscription>>,
    next_token: AtomicU64,
    ease_requests: AtomicU64,
    closed: AtomicBool,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::with_view(DEFAULT_VIEW)
    }

    pub fn with_view(view: ViewState) -> Self {
        Self {
            state: RwLock::new(SurfaceState {
                style_loaded: false,
                sources: HashMap::new(),
                layers: Vec::new(),
                view,
                pending: None,
            }),
            subscribers: RwLock::new(Vec::new()),
            next_token: AtomicU64::new(1),
            ease_requests: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Marks the style loaded and fires StyleLoad. A style swap on a real
    /// backend refires this, so repeated calls dispatch again.
    pub fn load_style(&self) {
        if self.closed.load(Ordering::Relaxed) {
            return;
        }
        self.state.write().style_loaded = true;
        self.dispatch(SurfaceEvent::StyleLoad);
    }

    /// Applies any pending camera transition, then fires MoveEnd. Also used
    /// without a pending move to model a settled user gesture.
    pub fn settle(&self) {
        if self.closed.load(Ordering::Relaxed) {
            return;
        }
        {
            let mut state = self.state.write();
            if let Some(target) = state.pending.take() {
                state.view.lng = normalize_lng(target.lng);
                state.view.lat = target.lat;
            }
        }
        self.dispatch(SurfaceEvent::MoveEnd);
    }

    pub fn set_zoom(&self, zoom: f64) {
        self.state.write().view.zoom = zoom;
    }

    pub fn set_view(&self, view: ViewState) {
        self.state.write().view = view;
    }

    /// The transition requested by the last `ease_to`, if not yet settled.
    pub fn pending_transition(&self) -> Option<CameraTarget> {
        self.state.read().pending
    }

    pub fn ease_request_count(&self) -> u64 {
        self.ease_requests.load(Ordering::Relaxed)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn source_data(&self, id: &str) -> Option<FeatureCollection> {
        self.state.read().sources.get(id).cloned()
    }

    /// Marks the surface unusable; further mutation is rejected.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
    }

    fn check_open(&self) -> Result<(), SurfaceError> {
        if self.closed.load(Ordering::Relaxed) {
            Err(SurfaceError::Closed)
        } else {
            Ok(())
        }
    }

    // Callbacks re-enter the surface, so both locks are released before any
    // callback runs.
    fn dispatch(&self, event: SurfaceEvent) {
        let view = self.state.read().view;
        let callbacks: Vec<SurfaceCallback> = self
            .subscribers
            .read()
            .iter()
            .filter(|sub| sub.event == event)
            .map(|sub| sub.callback.clone())
            .collect();
        let notice = SurfaceNotice { event, view };
        for callback in callbacks {
            callback(&notice);
        }
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_lng(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}

impl MapSurface for HeadlessSurface {
    fn add_source(&self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError> {
        self.check_open()?;
        let mut state = self.state.write();
        if state.sources.contains_key(id) {
            return Err(SurfaceError::DuplicateSource(id.to_string()));
        }
        state.sources.insert(id.to_string(), data);
        Ok(())
    }

    fn has_source(&self, id: &str) -> bool {
        self.state.read().sources.contains_key(id)
    }

    fn set_source_data(&self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError> {
        self.check_open()?;
        let mut state = self.state.write();
        match state.sources.get_mut(id) {
            Some(existing) => {
                *existing = data;
                Ok(())
            }
            None => Err(SurfaceError::UnknownSource(id.to_string())),
        }
    }

    fn add_layer(&self, spec: LayerSpec) -> Result<(), SurfaceError> {
        self.check_open()?;
        let mut state = self.state.write();
        if state.layers.iter().any(|l| l.id == spec.id) {
            return Err(SurfaceError::DuplicateLayer(spec.id));
        }
        if !state.sources.contains_key(&spec.source) {
            return Err(SurfaceError::UnknownSource(spec.source));
        }
        state.layers.push(spec);
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.state.read().layers.iter().any(|l| l.id == id)
    }

    fn set_layer_visibility(&self, id: &str, visible: bool) -> Result<(), SurfaceError> {
        self.check_open()?;
        let mut state = self.state.write();
        match state.layers.iter_mut().find(|l| l.id == id) {
            Some(layer) => {
                layer.visible = visible;
                Ok(())
            }
            None => Err(SurfaceError::UnknownLayer(id.to_string())),
        }
    }

    fn layer_visibility(&self, id: &str) -> Option<bool> {
        self.state.read().layers.iter().find(|l| l.id == id).map(|l| l.visible)
    }

    fn is_style_loaded(&self) -> bool {
        self.state.read().style_loaded
    }

    fn view(&self) -> ViewState {
        self.state.read().view
    }

    fn ease_to(&self, target: CameraTarget) -> Result<(), SurfaceError> {
        self.check_open()?;
        self.ease_requests.fetch_add(1, Ordering::Relaxed);
        debug!(lng = target.lng, lat = target.lat, duration_ms = target.duration_ms, "Camera ease requested");
        self.state.write().pending = Some(target);
        Ok(())
    }

    fn subscribe(&self, event: SurfaceEvent, callback: SurfaceCallback) -> u64 {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().push(HeadlessSubscription { token, event, callback });
        token
    }

    fn unsubscribe(&self, token: u64) -> bool {
        let mut subs = self.subscribers.write();
        let before = subs.len();
        subs.retain(|s| s.token != token);
        subs.len() < before
    }
}
