//! Map engine: store → filter → projection → synchronizer over an attached
//! surface.
//!
//! The engine owns every piece of live-map state and exposes the mutation
//! entry points the host calls (ingest, filter/display/spin changes). A
//! surface is attached once and then driven purely through notifications;
//! swapping surfaces goes through `rebuild_surface`, the one full-teardown
//! path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{info, warn};

use threatglobe_core::event_store::{BoundedEventStore, StoreReport};
use threatglobe_core::feed::search_event;
use threatglobe_core::filter;
use threatglobe_core::geojson;
use threatglobe_core::palette::SeverityPalette;
use threatglobe_core::types::{DisplayMode, FilterState, ThreatEvent};
use threatglobe_core::GlobeConfig;

use crate::spin::{IdleSpinController, SpinReport};
use crate::surface::{MapSurface, SurfaceCallback, SurfaceError, SurfaceEvent, SurfaceNotice};
use crate::sync::{LayerSynchronizer, SyncReport};

#[derive(Debug, Clone, serde::Serialize)]
pub struct EngineReport {
    pub store: StoreReport,
    pub sync: SyncReport,
    pub spin: SpinReport,
    pub visible: usize,
    pub display: String,
    /// Events the latest projection skipped for malformed coordinates
    pub malformed_skipped: u64,
    pub surface_attached: bool,
}

pub struct MapEngine {
    store: Arc<BoundedEventStore>,
    palette: SeverityPalette,
    filters: Arc<RwLock<FilterState>>,
    sync: Arc<LayerSynchronizer>,
    spin: Arc<IdleSpinController>,
    surface: RwLock<Option<Arc<dyn MapSurface>>>,
    tokens: RwLock<Vec<u64>>,
    malformed_skipped: Arc<AtomicU64>,
}

impl MapEngine {
    pub fn new(config: &GlobeConfig) -> Self {
        let filters = config.filter_state();
        Self {
            store: Arc::new(BoundedEventStore::new(config.store.capacity)),
            palette: SeverityPalette::new(Arc::new(config.theme())),
            sync: Arc::new(LayerSynchronizer::new(filters.display)),
            spin: Arc::new(IdleSpinController::new(filters.spin)),
            filters: Arc::new(RwLock::new(filters)),
            surface: RwLock::new(None),
            tokens: RwLock::new(Vec::new()),
            malformed_skipped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Attaches a rendering surface: subscribes the scene and spin handlers
    /// and, if the style is already loaded, creates the scene immediately.
    /// Any previously attached surface is detached first.
    pub fn attach(&self, surface: Arc<dyn MapSurface>) -> Result<(), SurfaceError> {
        self.detach();
        let style_token = surface.subscribe(SurfaceEvent::StyleLoad, self.style_callback(&surface));
        let settle_token = surface.subscribe(SurfaceEvent::MoveEnd, self.settle_callback(&surface));
        self.tokens.write().extend([style_token, settle_token]);
        *self.surface.write() = Some(surface.clone());

        if surface.is_style_loaded() {
            if let Err(e) = self.sync.ensure_scene(surface.as_ref()) {
                self.detach();
                return Err(e);
            }
            self.refresh();
        }
        info!("Surface attached");
        Ok(())
    }

    /// Releases the surface: every subscription token is unsubscribed and the
    /// reference dropped, so no callback or spin step outlives the handover.
    pub fn detach(&self) {
        let surface = self.surface.write().take();
        if let Some(surface) = surface {
            for token in self.tokens.write().drain(..) {
                surface.unsubscribe(token);
            }
            info!("Surface detached");
        }
    }

    /// Full surface replacement, e.g. after a credential or style-host
    /// change. Detach plus attach; live data and filters carry over.
    pub fn rebuild_surface(&self, surface: Arc<dyn MapSurface>) -> Result<(), SurfaceError> {
        info!("Rebuilding rendering surface");
        self.attach(surface)
    }

    /// Inbound event path: push through the bounded store, then re-project.
    pub fn ingest(&self, event: ThreatEvent) {
        self.store.push(event);
        self.refresh();
    }

    /// Records an IOC lookup as a high-severity event through the same
    /// ingest path as the feed.
    pub fn record_search(&self, query: &str) -> ThreatEvent {
        let event = search_event(query);
        info!(ioc = %query, id = %event.id, "Search recorded as threat event");
        self.ingest(event.clone());
        event
    }

    /// Replaces the whole filter snapshot and re-applies the dependent
    /// display and spin state.
    pub fn set_filters(&self, filters: FilterState) {
        let display = filters.display;
        let spin = filters.spin;
        *self.filters.write() = filters;
        self.spin.set_enabled(spin);
        if let Some(surface) = self.current_surface() {
            self.sync.set_display_mode(surface.as_ref(), display);
        }
        self.refresh();
    }

    /// Display switch; a visibility flip on the surface, never a re-project.
    pub fn set_display(&self, mode: DisplayMode) {
        self.filters.write().display = mode;
        if let Some(surface) = self.current_surface() {
            self.sync.set_display_mode(surface.as_ref(), mode);
        }
    }

    pub fn set_spin(&self, enabled: bool) {
        self.filters.write().spin = enabled;
        self.spin.set_enabled(enabled);
    }

    /// Recomputes visible events and pushes the projection to the surface.
    /// A missing or not-ready surface drops the update silently.
    pub fn refresh(&self) {
        if let Some(surface) = self.current_surface() {
            push_projection(
                surface.as_ref(),
                &self.sync,
                &self.store,
                &self.filters,
                &self.palette,
                &self.malformed_skipped,
            );
        }
    }

    /// The currently visible events, newest first (ticker input).
    pub fn visible_events(&self) -> Vec<ThreatEvent> {
        let events = self.store.snapshot();
        filter::visible(&events, &self.filters.read())
    }

    pub fn filters(&self) -> FilterState {
        self.filters.read().clone()
    }

    pub fn store(&self) -> Arc<BoundedEventStore> {
        self.store.clone()
    }

    pub fn palette(&self) -> &SeverityPalette {
        &self.palette
    }

    pub fn report(&self) -> EngineReport {
        EngineReport {
            store: self.store.report(),
            sync: self.sync.report(),
            spin: self.spin.report(),
            visible: self.visible_events().len(),
            display: self.filters.read().display.label().to_string(),
            malformed_skipped: self.malformed_skipped.load(Ordering::Relaxed),
            surface_attached: self.surface.read().is_some(),
        }
    }

    fn current_surface(&self) -> Option<Arc<dyn MapSurface>> {
        self.surface.read().clone()
    }

    fn style_callback(&self, surface: &Arc<dyn MapSurface>) -> SurfaceCallback {
        let weak: Weak<dyn MapSurface> = Arc::downgrade(surface);
        let sync = self.sync.clone();
        let store = self.store.clone();
        let filters = self.filters.clone();
        let palette = self.palette.clone();
        let skipped = self.malformed_skipped.clone();
        Arc::new(move |_: &SurfaceNotice| {
            let Some(surface) = weak.upgrade() else { return };
            if let Err(e) = sync.ensure_scene(surface.as_ref()) {
                warn!(error = %e, "Scene creation on style load failed");
                return;
            }
            push_projection(surface.as_ref(), &sync, &store, &filters, &palette, &skipped);
        })
    }

    fn settle_callback(&self, surface: &Arc<dyn MapSurface>) -> SurfaceCallback {
        let weak: Weak<dyn MapSurface> = Arc::downgrade(surface);
        let spin = self.spin.clone();
        Arc::new(move |_: &SurfaceNotice| {
            let Some(surface) = weak.upgrade() else { return };
            spin.on_settle(surface.as_ref());
        })
    }
}

impl Drop for MapEngine {
    fn drop(&mut self) {
        self.detach();
    }
}

fn push_projection(
    surface: &dyn MapSurface,
    sync: &LayerSynchronizer,
    store: &BoundedEventStore,
    filters: &RwLock<FilterState>,
    palette: &SeverityPalette,
    malformed: &AtomicU64,
) {
    let filters = filters.read().clone();
    let events = store.snapshot();
    let visible = filter::visible(&events, &filters);
    let collection = geojson::project(&visible, palette);
    // Gauge, not a running total: retained malformed events would otherwise
    // be recounted on every refresh.
    malformed.store((visible.len() - collection.len()) as u64, Ordering::Relaxed);
    sync.set_data(surface, collection);
}
