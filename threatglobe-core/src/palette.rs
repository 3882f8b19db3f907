//! Severity → color/weight encoding backed by an injectable theme.
//!
//! Colors come from named design tokens so a host can restyle the globe
//! without touching projection code. An unresolvable token falls back to a
//! fixed accent color rather than failing the render.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::Severity;

/// Color used whenever a severity token is missing from the active theme.
pub const FALLBACK_COLOR: &str = "#22d3ee";

/// Resolves a design token to its raw value. Implementations are expected to
/// be cheap; the palette queries on every projected event.
pub trait ThemeLookup: Send + Sync {
    fn resolve(&self, token: &str) -> Option<String>;
}

/// In-memory token table. `with_defaults` carries the stock dark theme.
#[derive(Debug, Clone, Default)]
pub struct StaticTheme {
    tokens: HashMap<String, String>,
}

impl StaticTheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stock dark theme: raw HSL triples keyed by severity token.
    pub fn with_defaults() -> Self {
        let mut theme = Self::new();
        theme.set("--sev-low", "187 92% 50%");
        theme.set("--sev-medium", "45 93% 58%");
        theme.set("--sev-high", "25 95% 55%");
        theme.set("--sev-critical", "0 84% 60%");
        theme
    }

    pub fn set(&mut self, token: &str, value: &str) {
        self.tokens.insert(token.to_string(), value.to_string());
    }
}

impl ThemeLookup for StaticTheme {
    fn resolve(&self, token: &str) -> Option<String> {
        self.tokens.get(token).cloned()
    }
}

/// Maps severities to render colors and heat weights.
#[derive(Clone)]
pub struct SeverityPalette {
    theme: Arc<dyn ThemeLookup>,
}

impl SeverityPalette {
    pub fn new(theme: Arc<dyn ThemeLookup>) -> Self {
        Self { theme }
    }

    pub fn with_defaults() -> Self {
        Self::new(Arc::new(StaticTheme::with_defaults()))
    }

    /// Design token queried for a severity.
    pub fn token(severity: Severity) -> &'static str {
        match severity {
            Severity::Low => "--sev-low",
            Severity::Medium => "--sev-medium",
            Severity::High => "--sev-high",
            Severity::Critical => "--sev-critical",
        }
    }

    /// CSS color string for a severity. A raw token value is wrapped as
    /// `hsl(..)`; a missing token yields [`FALLBACK_COLOR`].
    pub fn color(&self, severity: Severity) -> String {
        match self.theme.resolve(Self::token(severity)) {
            Some(raw) => format!("hsl({raw})"),
            None => FALLBACK_COLOR.to_string(),
        }
    }

    /// Heatmap contribution weight. Fixed scale, independent of theme.
    pub fn weight(severity: Severity) -> f64 {
        match severity {
            Severity::Low => 0.2,
            Severity::Medium => 0.5,
            Severity::High => 0.8,
            Severity::Critical => 1.0,
        }
    }
}
