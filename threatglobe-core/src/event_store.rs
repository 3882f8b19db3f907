//! Bounded, newest-first store of threat events.
//!
//! The globe renders a rolling window, not a history: new events are
//! prepended and the tail is evicted once capacity is reached. Every
//! producer (periodic feed, search, seeds) goes through the same `push`
//! path so the bound can never be bypassed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::warn;

use crate::types::ThreatEvent;

/// Counters and dimensions of a store, for the status report.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreReport {
    pub len: usize,
    pub capacity: usize,
    pub total_ingested: u64,
    pub total_evicted: u64,
}

pub struct BoundedEventStore {
    events: RwLock<VecDeque<ThreatEvent>>,
    capacity: usize,
    total_ingested: AtomicU64,
    total_evicted: AtomicU64,
}

impl BoundedEventStore {
    /// Creates a store holding at most `capacity` events. A zero capacity is
    /// clamped to one so a push never evicts the event it just added.
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            warn!("Event store capacity 0 requested, clamping to 1");
            1
        } else {
            capacity
        };
        Self {
            events: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            total_ingested: AtomicU64::new(0),
            total_evicted: AtomicU64::new(0),
        }
    }

    /// Prepends an event, evicting from the tail past capacity.
    pub fn push(&self, event: ThreatEvent) {
        let mut events = self.events.write();
        events.push_front(event);
        self.total_ingested.fetch_add(1, Ordering::Relaxed);
        while events.len() > self.capacity {
            events.pop_back();
            self.total_evicted.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current contents, newest first.
    pub fn snapshot(&self) -> Vec<ThreatEvent> {
        self.events.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_ingested(&self) -> u64 { self.total_ingested.load(Ordering::Relaxed) }
    pub fn total_evicted(&self) -> u64 { self.total_evicted.load(Ordering::Relaxed) }

    pub fn report(&self) -> StoreReport {
        StoreReport {
            len: self.len(),
            capacity: self.capacity,
            total_ingested: self.total_ingested(),
            total_evicted: self.total_evicted(),
        }
    }
}

impl Default for BoundedEventStore {
    fn default() -> Self {
        Self::new(crate::DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Severity, ThreatCategory, ThreatSource};

    fn event(id: &str) -> ThreatEvent {
        ThreatEvent {
            id: id.to_string(),
            source: ThreatSource::VirusTotal,
            category: ThreatCategory::Malware,
            severity: Severity::High,
            lat: 40.71,
            lng: -74.0,
            ioc: "198.51.100.22".to_string(),
            description: "test".to_string(),
            timestamp_ms: 0,
            location_name: None,
        }
    }

    #[test]
    fn test_newest_first_order() {
        let store = BoundedEventStore::new(10);
        store.push(event("one"));
        store.push(event("two"));
        store.push(event("three"));
        let ids: Vec<String> = store.snapshot().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["three", "two", "one"]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = BoundedEventStore::new(3);
        for i in 0..5 {
            store.push(event(&format!("e{i}")));
        }
        let ids: Vec<String> = store.snapshot().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["e4", "e3", "e2"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_report_counters() {
        let store = BoundedEventStore::new(2);
        for i in 0..5 {
            store.push(event(&format!("e{i}")));
        }
        let report = store.report();
        assert_eq!(report.len, 2);
        assert_eq!(report.capacity, 2);
        assert_eq!(report.total_ingested, 5);
        assert_eq!(report.total_evicted, 3);
    }

    #[test]
    fn test_one_past_capacity_evicts_exactly_the_oldest() {
        let store = BoundedEventStore::new(60);
        for i in 0..61 {
            store.push(event(&format!("e{i}")));
        }
        let snap = store.snapshot();
        assert_eq!(snap.len(), 60);
        assert_eq!(snap[0].id, "e60");
        assert_eq!(snap[59].id, "e1");
        assert!(!snap.iter().any(|e| e.id == "e0"));
        assert_eq!(store.total_evicted(), 1);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let store = BoundedEventStore::new(0);
        store.push(event("only"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.capacity(), 1);
    }

    #[test]
    fn test_search_and_feed_share_push_path() {
        let store = BoundedEventStore::new(2);
        store.push(event("feed-1"));
        store.push(event("search-1700000000000"));
        store.push(event("feed-2"));
        let ids: Vec<String> = store.snapshot().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["feed-2", "search-1700000000000"]);
    }
}
