//! # Threatglobe Core — Event Model and Projection Library
//!
//! Domain layer for the live threat globe: the event model, filter pipeline,
//! severity palette, GeoJSON projection, bounded retention, and the synthetic
//! feed that keeps the map moving. Everything rendering-related lives in
//! `threatglobe-map`; this crate never talks to a surface.

pub mod config_loader;
pub mod error;
pub mod event_store;
pub mod feed;
pub mod filter;
pub mod geojson;
pub mod palette;
pub mod types;

pub use config_loader::GlobeConfig;
pub use error::{GlobeError, GlobeResult};
pub use event_store::BoundedEventStore;
pub use palette::{SeverityPalette, StaticTheme, ThemeLookup};
pub use types::{
    DisplayMode, FilterState, Severity, ThreatCategory, ThreatEvent, ThreatSource, Timeframe,
};

/// Rolling window retained for rendering (default: 60 events)
pub const DEFAULT_EVENT_CAPACITY: usize = 60;

/// Synthetic feed cadence (default: 4.5s per event)
pub const DEFAULT_REFRESH_MS: u64 = 4500;
