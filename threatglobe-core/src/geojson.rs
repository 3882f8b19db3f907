//! Projection of threat events into a GeoJSON feature collection.
//!
//! The render surface consumes one collection per update; every visual
//! attribute a layer needs (color, heat weight) is denormalized into feature
//! properties here so layers stay pure style definitions.

use tracing::warn;

use crate::palette::SeverityPalette;
use crate::types::ThreatEvent;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ThreatProperties {
    pub id: String,
    pub severity: String,
    pub source: String,
    pub ioc: String,
    pub description: String,
    pub color: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    /// GeoJSON order: [lng, lat]
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    pub geometry: PointGeometry,
    pub properties: ThreatProperties,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn empty() -> Self {
        Self {
            kind: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Builds the feature collection for a set of visible events. Events with
/// non-finite or out-of-range coordinates are dropped, never emitted as
/// degenerate geometry.
pub fn project(events: &[ThreatEvent], palette: &SeverityPalette) -> FeatureCollection {
    let mut collection = FeatureCollection::empty();
    for event in events {
        if !event.coordinates_valid() {
            warn!(id = %event.id, lat = event.lat, lng = event.lng, "Dropping event with malformed coordinates");
            continue;
        }
        collection.features.push(Feature {
            kind: "Feature".to_string(),
            geometry: PointGeometry {
                kind: "Point".to_string(),
                coordinates: [event.lng, event.lat],
            },
            properties: ThreatProperties {
                id: event.id.clone(),
                severity: event.severity.label().to_string(),
                source: event.source.label().to_string(),
                ioc: event.ioc.clone(),
                description: event.description.clone(),
                color: palette.color(event.severity),
                weight: SeverityPalette::weight(event.severity),
            },
        });
    }
    collection
}
