use crate::geom::DVec3;
use crate::map::body::BodyKind;
use crate::map::scene::Color;
use serde::Deserialize;

/// Raw document units per rendering unit.
pub const DOCUMENT_SCALE: f64 = 1_000_000.0;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BodyStyle {
    pub radius: f64,
    pub color: Color,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct KindStyles {
    pub star: BodyStyle,
    pub planet: BodyStyle,
    pub minor: BodyStyle,
}

impl Default for KindStyles {
    fn default() -> Self {
        Self {
            star: BodyStyle {
                radius: 3.0,
                color: Color::rgb(0xf4cd00),
            },
            planet: BodyStyle {
                radius: 1.0,
                color: Color::rgb(0xeeeeee),
            },
            minor: BodyStyle {
                radius: 0.4,
                color: Color::rgb(0xbbbbbb),
            },
        }
    }
}

impl Default for BodyStyle {
    fn default() -> Self {
        KindStyles::default().minor
    }
}

impl KindStyles {
    pub fn for_kind(&self, kind: BodyKind) -> &BodyStyle {
        match kind {
            BodyKind::Star => &self.star,
            BodyKind::Planet => &self.planet,
            _ => &self.minor,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StandStyle {
    pub threshold: f64,
    pub line_color: Color,
    pub ring_radius: f64,
    pub ring_color: Color,
    pub ring_opacity: f64,
}

impl Default for StandStyle {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            line_color: Color::rgb(0xeeeeee),
            ring_radius: 3.0,
            ring_color: Color::rgb(0xffffff),
            ring_opacity: 0.4,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BackdropStyle {
    pub enabled: bool,
    pub center: DVec3,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub color: Color,
    pub opacity: f64,
}

impl Default for BackdropStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            center: DVec3::new(-2.0, 30.0, 0.0),
            inner_radius: 0.0,
            outer_radius: 140.0,
            color: Color::rgb(0xddddff),
            opacity: 0.15,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    pub position: DVec3,
    pub target: DVec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            position: DVec3::new(0.0, 0.0, 170.0),
            target: DVec3::ZERO,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DomIds {
    pub map: String,
    pub list: String,
    pub filters: String,
    pub detail: String,
    pub image: String,
    pub name: String,
    pub gravity: String,
    pub size: String,
}

impl Default for DomIds {
    fn default() -> Self {
        Self {
            map: "map".to_string(),
            list: "poi-list".to_string(),
            filters: "poi-list-filters".to_string(),
            detail: "poi-current".to_string(),
            image: "poi-current-image".to_string(),
            name: "poi-current-name".to_string(),
            gravity: "poi-current-gravity".to_string(),
            size: "poi-current-size".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub scale: f64,
    pub highlight: Color,
    pub styles: KindStyles,
    pub stand: StandStyle,
    pub backdrop: BackdropStyle,
    pub label_color: Color,
    pub line_threshold: f64,
    pub camera: CameraConfig,
    pub icon_path: String,
    pub default_filters: Vec<BodyKind>,
    pub dom: DomIds,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            scale: DOCUMENT_SCALE,
            highlight: Color::rgb(0xff0000),
            styles: KindStyles::default(),
            stand: StandStyle::default(),
            backdrop: BackdropStyle::default(),
            label_color: Color::rgb(0xffffff),
            line_threshold: 1.0,
            camera: CameraConfig::default(),
            icon_path: "data/images/planet-icons/".to_string(),
            default_filters: BodyKind::KNOWN.to_vec(),
            dom: DomIds::default(),
        }
    }
}

impl MapConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
