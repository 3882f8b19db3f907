//! End-to-end integration tests for Threatglobe
//!
//! These tests exercise real multi-component scenarios:
//! - Seed → feed → search flows through the bounded store to the surface
//! - Style-load ordering, scene idempotence, and readiness-guarded updates
//! - Fail-closed filtering and display-mode flips
//! - Idle-spin cycles with zoom suppression
//! - Surface rebuild and teardown
//! - Config loading with theme overrides

use std::sync::Arc;

use threatglobe_core::config_loader::GlobeConfig;
use threatglobe_core::feed::{seed_events, SyntheticFeed};
use threatglobe_core::types::{DisplayMode, Severity, ThreatCategory, ThreatEvent, ThreatSource};
use threatglobe_map::engine::MapEngine;
use threatglobe_map::headless::HeadlessSurface;
use threatglobe_map::layers::{HEAT_LAYER_ID, POINTS_LAYER_ID, PULSE_LAYER_ID, THREAT_SOURCE_ID};
use threatglobe_map::surface::MapSurface;

fn make_event(id: &str, severity: Severity, lat: f64, lng: f64) -> ThreatEvent {
    ThreatEvent {
        id: id.to_string(),
        source: ThreatSource::VirusTotal,
        category: ThreatCategory::Malware,
        severity,
        lat,
        lng,
        ioc: "198.51.100.22".to_string(),
        description: "Suspicious activity detected".to_string(),
        timestamp_ms: chrono::Utc::now().timestamp_millis(),
        location_name: None,
    }
}

fn seeded(engine: &MapEngine) {
    for event in seed_events().into_iter().rev() {
        engine.ingest(event);
    }
}

// ── Scenario 1: Full Live-Map Lifecycle ──────────────────────────────────

#[test]
fn test_live_map_lifecycle() {
    let mut config = GlobeConfig::default();
    config.store.capacity = 40;
    let engine = MapEngine::new(&config);
    let surface = Arc::new(HeadlessSurface::new());

    engine.attach(surface.clone()).unwrap();
    surface.load_style();
    seeded(&engine);

    assert!(surface.has_source(THREAT_SOURCE_ID));
    assert!(surface.has_layer(HEAT_LAYER_ID));
    assert!(surface.has_layer(POINTS_LAYER_ID));
    assert!(surface.has_layer(PULSE_LAYER_ID));
    assert_eq!(surface.source_data(THREAT_SOURCE_ID).unwrap().len(), 3);

    // A burst beyond capacity keeps exactly the newest 40.
    for i in 0..50 {
        engine.ingest(make_event(&format!("burst-{i}"), Severity::Low, 10.0, 10.0));
    }
    let report = engine.report();
    assert_eq!(report.store.len, 40);
    assert_eq!(report.store.total_ingested, 53);
    assert_eq!(report.store.total_evicted, 13);
    let data = surface.source_data(THREAT_SOURCE_ID).unwrap();
    assert_eq!(data.len(), 40);
    assert_eq!(data.features[0].properties.id, "burst-49");

    engine.detach();
    assert_eq!(surface.subscriber_count(), 0);
}

// ── Scenario 2: Fail-Closed Filtering ────────────────────────────────────

#[test]
fn test_filters_narrow_and_fail_closed() {
    let engine = MapEngine::new(&GlobeConfig::default());
    let surface = Arc::new(HeadlessSurface::new());
    engine.attach(surface.clone()).unwrap();
    surface.load_style();
    seeded(&engine);

    // Narrow to critical only: the Tokyo seed remains, in its palette color.
    let mut filters = engine.filters();
    filters.severities = [Severity::Critical].into_iter().collect();
    engine.set_filters(filters);
    let data = surface.source_data(THREAT_SOURCE_ID).unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data.features[0].properties.ioc, "203.0.113.5");
    assert_eq!(data.features[0].properties.color, "hsl(0 84% 60%)");

    // Deselecting every severity empties the globe; events stay retained.
    let mut filters = engine.filters();
    filters.severities.clear();
    engine.set_filters(filters);
    assert!(surface.source_data(THREAT_SOURCE_ID).unwrap().is_empty());
    assert_eq!(engine.report().store.len, 3);

    // Re-adding brings everything back; nothing was lost.
    let mut filters = engine.filters();
    filters.severities = Severity::ALL.into_iter().collect();
    engine.set_filters(filters);
    assert_eq!(surface.source_data(THREAT_SOURCE_ID).unwrap().len(), 3);
}

// ── Scenario 3: Search Push Under Full Store ─────────────────────────────

#[test]
fn test_search_push_at_capacity() {
    let mut config = GlobeConfig::default();
    config.store.capacity = 5;
    let engine = MapEngine::new(&config);
    let surface = Arc::new(HeadlessSurface::new());
    engine.attach(surface.clone()).unwrap();
    surface.load_style();

    for i in 0..5 {
        engine.ingest(make_event(&format!("old-{i}"), Severity::Medium, 0.0, 0.0));
    }
    let recorded = engine.record_search("evil.example.org");

    let data = surface.source_data(THREAT_SOURCE_ID).unwrap();
    assert_eq!(data.len(), 5);
    assert_eq!(data.features[0].properties.id, recorded.id);
    assert_eq!(data.features[0].properties.ioc, "evil.example.org");
    // The oldest event was evicted to make room.
    assert!(!data.features.iter().any(|f| f.properties.id == "old-0"));
}

// ── Scenario 4: Malformed Coordinates Never Reach the Surface ────────────

#[test]
fn test_malformed_events_projected_away() {
    let engine = MapEngine::new(&GlobeConfig::default());
    let surface = Arc::new(HeadlessSurface::new());
    engine.attach(surface.clone()).unwrap();
    surface.load_style();

    engine.ingest(make_event("good", Severity::High, 48.85, 2.35));
    engine.ingest(make_event("polar", Severity::High, 95.0, 0.0));
    engine.ingest(make_event("nan", Severity::High, f64::NAN, 0.0));
    engine.ingest(make_event("wrapped", Severity::High, 0.0, 200.0));

    let data = surface.source_data(THREAT_SOURCE_ID).unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data.features[0].properties.id, "good");
    assert_eq!(engine.report().malformed_skipped, 3);
    // Malformed events still count as retained and visible.
    assert_eq!(engine.report().visible, 4);
}

// ── Scenario 5: Updates Before Readiness Are Dropped, Then Recovered ─────

#[test]
fn test_style_load_ordering() {
    let engine = MapEngine::new(&GlobeConfig::default());
    let surface = Arc::new(HeadlessSurface::new());
    engine.attach(surface.clone()).unwrap();

    // Style not loaded yet: ingests flow into the store but no surface data.
    seeded(&engine);
    assert!(!surface.has_source(THREAT_SOURCE_ID));
    let report = engine.report();
    assert_eq!(report.sync.updates_applied, 0);
    assert_eq!(report.sync.updates_dropped, 3);

    // Style load creates the scene and installs the latest collection.
    surface.load_style();
    assert_eq!(surface.source_data(THREAT_SOURCE_ID).unwrap().len(), 3);

    // A style reload refires the notification; creation must not repeat.
    surface.load_style();
    surface.load_style();
    assert_eq!(surface.source_data(THREAT_SOURCE_ID).unwrap().len(), 3);
    assert!(engine.report().sync.updates_applied >= 1);
}

// ── Scenario 6: Display Mode Round-Trip ──────────────────────────────────

#[test]
fn test_display_mode_round_trip() {
    let engine = MapEngine::new(&GlobeConfig::default());
    let surface = Arc::new(HeadlessSurface::new());
    engine.attach(surface.clone()).unwrap();
    surface.load_style();
    seeded(&engine);

    engine.set_display(DisplayMode::Heatmap);
    assert_eq!(surface.layer_visibility(HEAT_LAYER_ID), Some(true));
    assert_eq!(surface.layer_visibility(POINTS_LAYER_ID), Some(false));
    assert_eq!(surface.layer_visibility(PULSE_LAYER_ID), Some(false));

    engine.set_display(DisplayMode::Points);
    assert_eq!(surface.layer_visibility(HEAT_LAYER_ID), Some(false));
    assert_eq!(surface.layer_visibility(POINTS_LAYER_ID), Some(true));
    assert_eq!(surface.layer_visibility(PULSE_LAYER_ID), Some(true));

    // Layers were flipped, never rebuilt, and data is intact.
    assert_eq!(engine.report().sync.mode_switches, 2);
    assert_eq!(surface.source_data(THREAT_SOURCE_ID).unwrap().len(), 3);
}

// ── Scenario 7: Idle Spin With Zoom Suppression ──────────────────────────

#[test]
fn test_idle_spin_cycle() {
    let engine = MapEngine::new(&GlobeConfig::default());
    let surface = Arc::new(HeadlessSurface::new());
    engine.attach(surface.clone()).unwrap();
    surface.load_style();

    let start_lng = surface.view().lng;

    // Each settle requests a step that the next settle applies.
    surface.settle();
    surface.settle();
    surface.settle();
    assert!((surface.view().lng - (start_lng - 1.0)).abs() < 1e-9);
    assert!(surface.pending_transition().is_some());

    // Zooming in suppresses new steps; one settle drains the in-flight
    // request, then the camera stays put.
    surface.set_zoom(4.0);
    surface.settle();
    let paused_lng = surface.view().lng;
    assert!(surface.pending_transition().is_none());
    surface.settle();
    surface.settle();
    assert_eq!(surface.view().lng, paused_lng);

    // Zooming back out resumes the cycle.
    surface.set_zoom(1.6);
    surface.settle();
    surface.settle();
    assert!((surface.view().lng - (paused_lng - 0.5)).abs() < 1e-9);

    let report = engine.report();
    assert!(report.spin.steps_taken >= 4);
    assert!(report.spin.suppressed >= 2);
}

// ── Scenario 8: Spin Disable Is Immediate ────────────────────────────────

#[test]
fn test_spin_disable_via_filters() {
    let engine = MapEngine::new(&GlobeConfig::default());
    let surface = Arc::new(HeadlessSurface::new());
    engine.attach(surface.clone()).unwrap();
    surface.load_style();

    surface.settle();
    assert!(surface.pending_transition().is_some());
    surface.settle();

    let mut filters = engine.filters();
    filters.spin = false;
    engine.set_filters(filters);
    surface.settle();
    assert!(surface.pending_transition().is_none());

    engine.set_spin(true);
    surface.settle();
    assert!(surface.pending_transition().is_some());
}

// ── Scenario 9: Surface Rebuild ──────────────────────────────────────────

#[test]
fn test_surface_rebuild_carries_state() {
    let engine = MapEngine::new(&GlobeConfig::default());
    let old_surface = Arc::new(HeadlessSurface::new());
    engine.attach(old_surface.clone()).unwrap();
    old_surface.load_style();
    seeded(&engine);
    engine.set_display(DisplayMode::Heatmap);

    let new_surface = Arc::new(HeadlessSurface::new());
    new_surface.load_style();
    engine.rebuild_surface(new_surface.clone()).unwrap();

    // Old surface fully released; new one carries data and mode.
    assert_eq!(old_surface.subscriber_count(), 0);
    assert_eq!(new_surface.source_data(THREAT_SOURCE_ID).unwrap().len(), 3);
    assert_eq!(new_surface.layer_visibility(HEAT_LAYER_ID), Some(true));

    // Ingest now lands only on the new surface.
    engine.ingest(make_event("fresh", Severity::Critical, 1.0, 1.0));
    assert_eq!(old_surface.source_data(THREAT_SOURCE_ID).unwrap().len(), 3);
    assert_eq!(new_surface.source_data(THREAT_SOURCE_ID).unwrap().len(), 4);
}

// ── Scenario 10: Config Overrides Reach the Projection ───────────────────

#[test]
fn test_config_theme_and_view_flow_through() {
    let config: GlobeConfig = toml::from_str(
        r#"
        [store]
        capacity = 40

        [view]
        display = "heatmap"
        spin = false
        timeframe = "7d"

        [theme]
        "--sev-high" = "300 100% 50%"
        "#,
    )
    .unwrap();

    let engine = MapEngine::new(&config);
    let surface = Arc::new(HeadlessSurface::new());
    engine.attach(surface.clone()).unwrap();
    surface.load_style();
    seeded(&engine);

    // Initial visibility honors the configured display mode.
    assert_eq!(surface.layer_visibility(HEAT_LAYER_ID), Some(true));
    assert_eq!(surface.layer_visibility(POINTS_LAYER_ID), Some(false));

    // Spin disabled from config: a settle requests nothing.
    surface.settle();
    assert!(surface.pending_transition().is_none());

    // Theme override reaches the projected feature color for the high seed.
    let data = surface.source_data(THREAT_SOURCE_ID).unwrap();
    let high = data
        .features
        .iter()
        .find(|f| f.properties.severity == "high")
        .unwrap();
    assert_eq!(high.properties.color, "hsl(300 100% 50%)");
    // Untouched severities keep the stock theme.
    let critical = data
        .features
        .iter()
        .find(|f| f.properties.severity == "critical")
        .unwrap();
    assert_eq!(critical.properties.color, "hsl(0 84% 60%)");
}

// ── Scenario 11: Synthetic Feed Into the Engine ──────────────────────────

#[tokio::test]
async fn test_feed_drives_engine() {
    let engine = Arc::new(MapEngine::new(&GlobeConfig::default()));
    let surface = Arc::new(HeadlessSurface::new());
    engine.attach(surface.clone()).unwrap();
    surface.load_style();

    let feed = SyntheticFeed::new(250);
    let sink_engine = engine.clone();
    feed.start(Arc::new(move |event| sink_engine.ingest(event))).unwrap();

    // First interval tick fires immediately.
    tokio::time::sleep(std::time::Duration::from_millis(120)).await;
    feed.stop();
    // Let an emission already past the stop check finish before comparing.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert!(feed.total_emitted() >= 1);
    let data = surface.source_data(THREAT_SOURCE_ID).unwrap();
    assert!(!data.is_empty());
    assert!(data.features[0].properties.id.starts_with("synth-"));
    assert_eq!(engine.report().store.total_ingested, feed.total_emitted());
}
