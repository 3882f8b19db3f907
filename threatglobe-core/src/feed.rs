//! Synthetic threat feed: deterministic seeds plus a periodic generator.
//!
//! Production deployments replace this with real intel ingest; the feed
//! exists so the globe renders live motion out of the box. The feed never
//! touches storage itself: every event is handed to an injected sink, which
//! keeps capacity enforcement on one path regardless of producer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::types::{Severity, ThreatCategory, ThreatEvent, ThreatSource};

/// Receives each produced event; typically the engine's ingest entry point.
pub type EventSink = Arc<dyn Fn(ThreatEvent) + Send + Sync>;

/// Floor for the generator cadence; below this the tick loop would dominate
/// the runtime.
const MIN_REFRESH_MS: u64 = 250;

/// The three fixtures shown before the generator produces anything.
pub fn seed_events() -> Vec<ThreatEvent> {
    let now = chrono::Utc::now().timestamp_millis();
    vec![
        ThreatEvent {
            id: "t1".to_string(),
            source: ThreatSource::VirusTotal,
            category: ThreatCategory::Malware,
            severity: Severity::High,
            lat: 37.77,
            lng: -122.41,
            ioc: "198.51.100.22".to_string(),
            description: "Malware C2 beacon detected".to_string(),
            timestamp_ms: now,
            location_name: Some("San Francisco".to_string()),
        },
        ThreatEvent {
            id: "t2".to_string(),
            source: ThreatSource::AbuseIpdb,
            category: ThreatCategory::BruteForce,
            severity: Severity::Medium,
            lat: 51.5,
            lng: -0.12,
            ioc: "bruteforce.example.com".to_string(),
            description: "SSH brute force attempts".to_string(),
            timestamp_ms: now,
            location_name: Some("London".to_string()),
        },
        ThreatEvent {
            id: "t3".to_string(),
            source: ThreatSource::Shodan,
            category: ThreatCategory::ExposedService,
            severity: Severity::Critical,
            lat: 35.68,
            lng: 139.69,
            ioc: "203.0.113.5".to_string(),
            description: "Exposed RDP service with default creds".to_string(),
            timestamp_ms: now,
            location_name: Some("Tokyo".to_string()),
        },
    ]
}

/// Event representing an on-demand IOC lookup. Goes through the same ingest
/// path as the generator; pinned to a fixed location since the sample data
/// carries no geo resolution.
pub fn search_event(query: &str) -> ThreatEvent {
    let now = chrono::Utc::now().timestamp_millis();
    ThreatEvent {
        id: format!("search-{now}"),
        source: ThreatSource::VirusTotal,
        category: ThreatCategory::Malware,
        severity: Severity::High,
        lat: 40.71,
        lng: -74.0,
        ioc: query.to_string(),
        description: "Aggregated risk from sample data".to_string(),
        timestamp_ms: now,
        location_name: Some("New York".to_string()),
    }
}

pub struct SyntheticFeed {
    refresh_ms: u64,
    running: Arc<AtomicBool>,
    counter: Arc<AtomicU64>,
}

impl SyntheticFeed {
    /// Creates a feed ticking every `refresh_ms`, clamped to the cadence floor.
    pub fn new(refresh_ms: u64) -> Self {
        let refresh_ms = if refresh_ms < MIN_REFRESH_MS {
            warn!(refresh_ms, floor = MIN_REFRESH_MS, "Refresh cadence below floor, clamping");
            MIN_REFRESH_MS
        } else {
            refresh_ms
        };
        Self {
            refresh_ms,
            running: Arc::new(AtomicBool::new(false)),
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Synthesizes the next event without delivering it anywhere.
    pub fn next_event(&self) -> ThreatEvent {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        synth_event(n)
    }

    /// Start the periodic generator; each tick hands one event to `sink`.
    /// A second start while running is rejected, it would double the cadence.
    pub fn start(&self, sink: EventSink) -> Result<(), String> {
        if self.running.swap(true, Ordering::Relaxed) {
            return Err("synthetic feed already running".to_string());
        }
        let running = self.running.clone();
        let counter = self.counter.clone();
        let period = self.refresh_ms;

        info!(period_ms = period, "Synthetic feed started");

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_millis(period));
            while running.load(Ordering::Relaxed) {
                ticker.tick().await;
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                let n = counter.fetch_add(1, Ordering::Relaxed) + 1;
                let event = synth_event(n);
                debug!(id = %event.id, severity = event.severity.label(), "Synthetic threat emitted");
                sink(event);
            }
            info!("Synthetic feed stopped");
        });
        Ok(())
    }

    pub fn stop(&self) { self.running.store(false, Ordering::Relaxed); }
    pub fn is_running(&self) -> bool { self.running.load(Ordering::Relaxed) }
    pub fn refresh_ms(&self) -> u64 { self.refresh_ms }
    pub fn total_emitted(&self) -> u64 { self.counter.load(Ordering::Relaxed) }
}

fn synth_event(n: u64) -> ThreatEvent {
    let severity = match (rand::random::<f64>() * 4.0) as u32 {
        0 => Severity::Low,
        1 => Severity::Medium,
        2 => Severity::High,
        _ => Severity::Critical,
    };
    let source = if rand::random::<bool>() {
        ThreatSource::VirusTotal
    } else {
        ThreatSource::AbuseIpdb
    };
    let category = match (rand::random::<f64>() * 4.0) as u32 {
        0 => ThreatCategory::Malware,
        1 => ThreatCategory::BruteForce,
        2 => ThreatCategory::ExposedService,
        _ => ThreatCategory::Phishing,
    };
    let ioc = if rand::random::<bool>() {
        format!(
            "{}.{}.{}.{}",
            rand::random::<u8>(),
            rand::random::<u8>(),
            rand::random::<u8>(),
            rand::random::<u8>()
        )
    } else {
        format!("malicious-{n}.example.net")
    };
    ThreatEvent {
        id: format!("synth-{n}"),
        source,
        category,
        severity,
        lat: -60.0 + rand::random::<f64>() * 120.0,
        lng: -180.0 + rand::random::<f64>() * 360.0,
        ioc,
        description: "Suspicious activity detected".to_string(),
        timestamp_ms: chrono::Utc::now().timestamp_millis(),
        location_name: None,
    }
}
