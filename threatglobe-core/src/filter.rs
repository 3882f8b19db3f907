//! Visibility predicate over the event store.
//!
//! Filtering is conjunctive across dimensions and fail-closed: an empty
//! acceptance set in any dimension hides everything rather than everything
//! being shown. The declared timeframe is carried in state but intentionally
//! not applied here; eviction from the bounded store is what ages events out.

use crate::types::{FilterState, ThreatEvent};

impl FilterState {
    /// Whether a single event passes every filter dimension.
    pub fn matches(&self, event: &ThreatEvent) -> bool {
        self.severities.contains(&event.severity)
            && self.sources.contains(&event.source)
            && self.categories.contains(&event.category)
    }
}

/// Applies the filter to an event slice, preserving input order.
pub fn visible(events: &[ThreatEvent], filters: &FilterState) -> Vec<ThreatEvent> {
    events
        .iter()
        .filter(|event| filters.matches(event))
        .cloned()
        .collect()
}
