//! Scene definition: the threat source and its three presentation layers.
//!
//! Paint values are typed zoom ramps instead of opaque style expressions so
//! any surface backend can evaluate them. The constants here define the look
//! of the globe; the sync layer only ever flips visibility.

use threatglobe_core::types::DisplayMode;

/// Single GeoJSON source shared by all threat layers.
pub const THREAT_SOURCE_ID: &str = "threats";
pub const HEAT_LAYER_ID: &str = "threat-heat";
pub const POINTS_LAYER_ID: &str = "threat-points";
pub const PULSE_LAYER_ID: &str = "threat-pulse";

/// Piecewise-linear zoom → value ramp.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Ramp {
    pub stops: Vec<(f64, f64)>,
}

impl Ramp {
    pub fn new(stops: Vec<(f64, f64)>) -> Self {
        Self { stops }
    }

    /// Linear interpolation between stops, clamped at both ends.
    pub fn value_at(&self, zoom: f64) -> f64 {
        match self.stops.first() {
            None => 0.0,
            Some(&(first_z, first_v)) => {
                if zoom <= first_z {
                    return first_v;
                }
                for pair in self.stops.windows(2) {
                    let (z0, v0) = pair[0];
                    let (z1, v1) = pair[1];
                    if zoom <= z1 {
                        let t = (zoom - z0) / (z1 - z0);
                        return v0 + t * (v1 - v0);
                    }
                }
                self.stops[self.stops.len() - 1].1
            }
        }
    }
}

/// Density → color stops for the heatmap gradient.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ColorRamp {
    pub stops: Vec<(f64, String)>,
}

impl ColorRamp {
    /// Color of the highest stop at or below `density` (step semantics).
    pub fn color_at(&self, density: f64) -> &str {
        let mut current = "";
        for (stop, color) in &self.stops {
            if *stop <= density {
                current = color.as_str();
            }
        }
        current
    }
}

/// Where a circle layer takes its fill color from.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum PaintColor {
    Fixed(String),
    /// Read from a feature property, e.g. the palette color
    FromProperty(String),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CirclePaint {
    pub radius: Ramp,
    pub color: PaintColor,
    pub opacity: f64,
    pub stroke_width: f64,
    pub stroke_color: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HeatmapPaint {
    /// Feature property feeding per-point heat contribution
    pub weight_property: String,
    pub intensity: Ramp,
    pub radius: Ramp,
    pub density: ColorRamp,
    pub opacity: f64,
    pub max_zoom: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum LayerKind {
    Circle(CirclePaint),
    Heatmap(HeatmapPaint),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
    pub visible: bool,
}

/// Heat density layer: wide soft glow at low zoom, street-level pools by
/// zoom 9 where it caps out.
pub fn heat_layer(visible: bool) -> LayerSpec {
    LayerSpec {
        id: HEAT_LAYER_ID.to_string(),
        source: THREAT_SOURCE_ID.to_string(),
        kind: LayerKind::Heatmap(HeatmapPaint {
            weight_property: "weight".to_string(),
            intensity: Ramp::new(vec![(0.0, 0.4), (9.0, 2.0)]),
            radius: Ramp::new(vec![(0.0, 2.0), (9.0, 24.0)]),
            density: ColorRamp {
                stops: vec![
                    (0.0, "rgba(33,147,176,0)".to_string()),
                    (0.2, "rgba(33,147,176,0.4)".to_string()),
                    (0.4, "rgba(44,209,171,0.6)".to_string()),
                    (0.6, "rgba(255,204,0,0.8)".to_string()),
                    (0.8, "rgba(255,102,0,0.9)".to_string()),
                    (1.0, "rgba(255,0,0,1)".to_string()),
                ],
            },
            opacity: 0.8,
            max_zoom: 9.0,
        }),
        visible,
    }
}

/// Solid severity-colored dots.
pub fn points_layer(visible: bool) -> LayerSpec {
    LayerSpec {
        id: POINTS_LAYER_ID.to_string(),
        source: THREAT_SOURCE_ID.to_string(),
        kind: LayerKind::Circle(CirclePaint {
            radius: Ramp::new(vec![(0.0, 2.0), (4.0, 6.0)]),
            color: PaintColor::FromProperty("color".to_string()),
            opacity: 0.9,
            stroke_width: 1.0,
            stroke_color: "#0a0f1a".to_string(),
        }),
        visible,
    }
}

/// Faint halo behind each point.
pub fn pulse_layer(visible: bool) -> LayerSpec {
    LayerSpec {
        id: PULSE_LAYER_ID.to_string(),
        source: THREAT_SOURCE_ID.to_string(),
        kind: LayerKind::Circle(CirclePaint {
            radius: Ramp::new(vec![(0.0, 4.0), (4.0, 14.0)]),
            color: PaintColor::FromProperty("color".to_string()),
            opacity: 0.15,
            stroke_width: 0.0,
            stroke_color: "#0a0f1a".to_string(),
        }),
        visible,
    }
}

/// The full scene for a display mode. Points mode shows dots plus halo;
/// heatmap mode shows density only. All three layers are always created so a
/// mode switch is a visibility flip, never a rebuild.
pub fn threat_scene(display: DisplayMode) -> Vec<LayerSpec> {
    let heatmap = display == DisplayMode::Heatmap;
    vec![
        heat_layer(heatmap),
        points_layer(!heatmap),
        pulse_layer(!heatmap),
    ]
}
