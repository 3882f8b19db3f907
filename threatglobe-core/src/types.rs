//! Shared types for the threat globe: events, filter state, display modes.

use std::collections::HashSet;

// ── Severity ────────────────────────────────────────────────────────────────

/// Threat severity, ordered low → critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Severity> {
        match s.to_lowercase().as_str() {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }
}

// ── Source / Category ───────────────────────────────────────────────────────

/// Intelligence source that reported an event. Closed set of known feeds plus
/// an explicit escape hatch so membership checks stay exhaustive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ThreatSource {
    VirusTotal,
    AbuseIpdb,
    Shodan,
    Other(String),
}

impl ThreatSource {
    pub const NAMED: [ThreatSource; 3] = [
        ThreatSource::VirusTotal,
        ThreatSource::AbuseIpdb,
        ThreatSource::Shodan,
    ];

    pub fn label(&self) -> &str {
        match self {
            ThreatSource::VirusTotal => "VirusTotal",
            ThreatSource::AbuseIpdb => "AbuseIPDB",
            ThreatSource::Shodan => "Shodan",
            ThreatSource::Other(name) => name,
        }
    }

    pub fn parse(s: &str) -> ThreatSource {
        match s.to_lowercase().as_str() {
            "virustotal" => ThreatSource::VirusTotal,
            "abuseipdb" => ThreatSource::AbuseIpdb,
            "shodan" => ThreatSource::Shodan,
            _ => ThreatSource::Other(s.to_string()),
        }
    }
}

/// Category of activity an event describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ThreatCategory {
    Malware,
    BruteForce,
    ExposedService,
    Phishing,
    Other(String),
}

impl ThreatCategory {
    pub const NAMED: [ThreatCategory; 4] = [
        ThreatCategory::Malware,
        ThreatCategory::BruteForce,
        ThreatCategory::ExposedService,
        ThreatCategory::Phishing,
    ];

    pub fn label(&self) -> &str {
        match self {
            ThreatCategory::Malware => "Malware",
            ThreatCategory::BruteForce => "Brute Force",
            ThreatCategory::ExposedService => "Exposed Service",
            ThreatCategory::Phishing => "Phishing",
            ThreatCategory::Other(name) => name,
        }
    }

    pub fn parse(s: &str) -> ThreatCategory {
        match s.to_lowercase().as_str() {
            "malware" => ThreatCategory::Malware,
            "brute force" | "bruteforce" | "brute_force" => ThreatCategory::BruteForce,
            "exposed service" | "exposed_service" => ThreatCategory::ExposedService,
            "phishing" => ThreatCategory::Phishing,
            _ => ThreatCategory::Other(s.to_string()),
        }
    }
}

// ── Threat Event ────────────────────────────────────────────────────────────

/// A single observed threat. Immutable once created; events leave the system
/// only by eviction from the bounded store.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ThreatEvent {
    /// Unique id (feed counter or `search-<ts>`)
    pub id: String,
    pub source: ThreatSource,
    pub category: ThreatCategory,
    pub severity: Severity,
    /// Degrees, [-90, 90]
    pub lat: f64,
    /// Degrees, [-180, 180]
    pub lng: f64,
    /// Indicator of compromise: IP or domain
    pub ioc: String,
    pub description: String,
    /// Unix timestamp (millis)
    pub timestamp_ms: i64,
    pub location_name: Option<String>,
}

impl ThreatEvent {
    /// Whether lat/lng are finite and inside the geographic domain.
    /// Events failing this are dropped at projection time, not here.
    pub fn coordinates_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

// ── Timeframe / Display ─────────────────────────────────────────────────────

/// Declared lookback window. Carried through filter state and reports; the
/// visible-event computation does not compare event age against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Timeframe {
    LastHour,
    Last24Hours,
    Last7Days,
    Last30Days,
}

impl Timeframe {
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::LastHour => "1h",
            Timeframe::Last24Hours => "24h",
            Timeframe::Last7Days => "7d",
            Timeframe::Last30Days => "30d",
        }
    }

    pub fn parse(s: &str) -> Option<Timeframe> {
        match s.to_lowercase().as_str() {
            "1h" => Some(Timeframe::LastHour),
            "24h" => Some(Timeframe::Last24Hours),
            "7d" => Some(Timeframe::Last7Days),
            "30d" => Some(Timeframe::Last30Days),
            _ => None,
        }
    }

    /// Window span in milliseconds.
    pub fn window_ms(&self) -> i64 {
        match self {
            Timeframe::LastHour => 60 * 60 * 1000,
            Timeframe::Last24Hours => 24 * 60 * 60 * 1000,
            Timeframe::Last7Days => 7 * 24 * 60 * 60 * 1000,
            Timeframe::Last30Days => 30 * 24 * 60 * 60 * 1000,
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Last24Hours
    }
}

/// Which visual interpretation of the feature collection is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DisplayMode {
    Points,
    Heatmap,
}

impl DisplayMode {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayMode::Points => "points",
            DisplayMode::Heatmap => "heatmap",
        }
    }

    pub fn parse(s: &str) -> Option<DisplayMode> {
        match s.to_lowercase().as_str() {
            "points" => Some(DisplayMode::Points),
            "heatmap" => Some(DisplayMode::Heatmap),
            _ => None,
        }
    }
}

impl Default for DisplayMode {
    fn default() -> Self {
        DisplayMode::Points
    }
}

// ── Filter State ────────────────────────────────────────────────────────────

/// Complete filter configuration. The presentation layer owns mutation and
/// hands the engine a full snapshot on every change; an empty acceptance set
/// in any dimension shows nothing (fail-closed).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FilterState {
    pub severities: HashSet<Severity>,
    pub sources: HashSet<ThreatSource>,
    pub categories: HashSet<ThreatCategory>,
    pub timeframe: Timeframe,
    pub display: DisplayMode,
    pub spin: bool,
    /// Generator cadence in milliseconds
    pub refresh_ms: u64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            severities: Severity::ALL.into_iter().collect(),
            sources: ThreatSource::NAMED.into_iter().collect(),
            categories: ThreatCategory::NAMED.into_iter().collect(),
            timeframe: Timeframe::default(),
            display: DisplayMode::default(),
            spin: true,
            refresh_ms: crate::DEFAULT_REFRESH_MS,
        }
    }
}
