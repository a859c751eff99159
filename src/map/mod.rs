pub mod body;
pub mod config;
pub mod error;
pub mod pick;
pub mod poi;
pub mod render;
pub mod scene;

use crate::geom::DVec2;
use body::{Body, BodyKind, SystemMap};
use config::MapConfig;
use error::DocumentError;
use pick::{BodyDetail, PickController, PickEvent};
use poi::{rebuild_list, FilterSet, PoiEntry};
use render::{render_backdrop, render_tree, ProxyLookup};
use scene::{Camera, Scene};
use serde::Serialize;
use serde_json::Value;

struct Loaded {
    tree: SystemMap,
    scene: Scene,
    lookup: ProxyLookup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub bodies: usize,
    pub rejected: usize,
    pub primitives: usize,
}

pub struct StarMap {
    config: MapConfig,
    camera: Camera,
    pick: PickController,
    filters: FilterSet,
    loaded: Option<Loaded>,
    poi: Vec<PoiEntry>,
}

impl StarMap {
    pub fn new(config: MapConfig) -> Self {
        Self {
            camera: Camera::from_config(&config.camera),
            pick: PickController::new(config.highlight),
            filters: FilterSet::new(config.default_filters.iter().copied()),
            loaded: None,
            poi: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn load_str(&mut self, json: &str) -> Result<LoadSummary, DocumentError> {
        let tree = SystemMap::from_json(json, self.config.scale)?;
        Ok(self.load_tree(tree))
    }

    pub fn load_value(&mut self, value: &Value) -> Result<LoadSummary, DocumentError> {
        let tree = SystemMap::parse(value, self.config.scale)?;
        Ok(self.load_tree(tree))
    }

    pub fn load_tree(&mut self, tree: SystemMap) -> LoadSummary {
        let mut scene = Scene::new(self.config.line_threshold);
        let mut lookup = ProxyLookup::new();
        render_backdrop(&mut scene, &mut lookup, &self.config);
        let bodies = render_tree(tree.roots(), &mut scene, &mut lookup, &self.config);

        let summary = LoadSummary {
            bodies,
            rejected: tree.rejected().len(),
            primitives: scene.len(),
        };
        log::info!(
            "loaded {} bodies in {} systems ({} rejected, {} primitives)",
            summary.bodies,
            tree.roots().len(),
            summary.rejected,
            summary.primitives
        );

        self.camera.position = self.config.camera.position;
        self.camera.target = self.config.camera.target;
        self.pick.reset();
        self.loaded = Some(Loaded {
            tree,
            scene,
            lookup,
        });
        self.rebuild_poi();
        summary
    }

    pub fn unload(&mut self) {
        self.loaded = None;
        self.pick.reset();
        self.poi.clear();
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn tree(&self) -> Option<&SystemMap> {
        self.loaded.as_ref().map(|l| &l.tree)
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.loaded.as_ref().map(|l| &l.scene)
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.camera.set_viewport(width, height);
    }

    pub fn on_pointer_move(&mut self, ndc: DVec2) -> PickEvent {
        self.pick.on_pointer_move(ndc);
        self.tick()
    }

    pub fn on_pointer_down(&mut self) -> bool {
        self.pick.on_pointer_down()
    }

    pub fn tick(&mut self) -> PickEvent {
        match self.loaded.as_mut() {
            Some(loaded) => self
                .pick
                .tick(&mut loaded.scene, &self.camera, &loaded.lookup),
            None => PickEvent::Unchanged,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.pick.is_locked()
    }

    pub fn selected(&self) -> Option<&Body> {
        let id = self.pick.current_body()?;
        self.tree()?.get(id)
    }

    pub fn detail(&self) -> Option<BodyDetail> {
        self.selected()
            .map(|body| BodyDetail::from_body(body, &self.config.icon_path))
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn toggle_filter(&mut self, kind: BodyKind) -> bool {
        let active = self.filters.toggle(kind);
        log::debug!("filter {} -> {}", kind.label(), active);
        self.rebuild_poi();
        active
    }

    pub fn poi_list(&self) -> &[PoiEntry] {
        &self.poi
    }

    fn rebuild_poi(&mut self) {
        self.poi = match &self.loaded {
            Some(loaded) => rebuild_list(loaded.tree.roots(), &self.filters),
            None => Vec::new(),
        };
    }
}

impl Default for StarMap {
    fn default() -> Self {
        Self::new(MapConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::pick::PickState;
    use super::*;
    use crate::geom::DVec3;

    const HELIOS: &str = r#"{"star": {"id": "s1", "name": "Helios", "type": "star",
        "center": {"x": 0, "y": 0, "z": 0},
        "children": [{"id": "p1", "name": "Terra", "type": "planet",
            "center": {"x": 100000000, "y": 0, "z": 0}, "radius": 1, "gravity": 1}]}}"#;

    fn loaded() -> StarMap {
        let mut map = StarMap::default();
        map.resize(1200.0, 800.0);
        map.load_str(HELIOS).unwrap();
        map
    }

    fn point_at(map: &mut StarMap, id: &str) -> PickEvent {
        let position = map.tree().unwrap().get(id).unwrap().position;
        let ndc = map.camera().project(position).unwrap().ndc;
        map.on_pointer_move(ndc)
    }

    #[test]
    fn helios_example_end_to_end() {
        let mut map = loaded();
        let terra = map.tree().unwrap().get("p1").unwrap();
        assert_eq!(terra.position, DVec3::new(100.0, 0.0, 0.0));

        assert_eq!(
            point_at(&mut map, "p1"),
            PickEvent::Highlighted {
                body_id: "p1".to_string()
            }
        );
        assert_eq!(map.tick(), PickEvent::Unchanged);
        let detail = map.detail().unwrap();
        assert_eq!(detail.name, "Terra");
        assert_eq!(detail.gravity, "1g");
        assert_eq!(detail.size, "1");

        point_at(&mut map, "s1");
        assert_eq!(map.detail().unwrap().name, "Helios (1)");
        assert_eq!(map.selected().unwrap().radius, None);
    }

    #[test]
    fn nothing_is_picked_before_load() {
        let mut map = StarMap::default();
        assert_eq!(map.on_pointer_move(DVec2::new(0.0, 0.0)), PickEvent::Unchanged);
        assert_eq!(map.tick(), PickEvent::Unchanged);
        assert!(map.detail().is_none());
        assert!(map.poi_list().is_empty());
        assert!(map.scene().is_none());
    }

    #[test]
    fn failed_reload_keeps_previous_document() {
        let mut map = loaded();
        assert!(map.load_str(r#"{"broken": {"name": "no id"}}"#).is_err());
        assert!(map.is_loaded());
        assert_eq!(map.tree().unwrap().len(), 2);
        assert_eq!(map.poi_list().len(), 1);
    }

    #[test]
    fn reload_drops_selection_and_rebuilds_everything() {
        let mut map = loaded();
        point_at(&mut map, "p1");
        assert!(map.on_pointer_down());

        let summary = map.load_str(HELIOS).unwrap();
        assert_eq!(
            summary,
            LoadSummary {
                bodies: 2,
                rejected: 0,
                // disk, two spheres, one label
                primitives: 4,
            }
        );
        assert!(!map.is_locked());
        assert!(map.selected().is_none());
        assert_eq!(map.pick.state(), &PickState::Idle);

        let scene = map.scene().unwrap();
        let highlight = map.config().highlight;
        assert!(scene.iter().all(|p| p.material.color != highlight));
    }

    #[test]
    fn toggling_filters_rebuilds_list() {
        let mut map = loaded();
        let before = map.poi_list().to_vec();
        assert_eq!(before[0].sublist.as_ref().unwrap().len(), 1);

        assert!(!map.toggle_filter(BodyKind::Planet));
        assert_eq!(map.poi_list()[0].sublist, Some(Vec::new()));

        assert!(map.toggle_filter(BodyKind::Planet));
        assert_eq!(map.poi_list(), before.as_slice());
    }

    #[test]
    fn unload_returns_to_idle() {
        let mut map = loaded();
        point_at(&mut map, "p1");
        map.unload();
        assert!(!map.is_loaded());
        assert!(map.selected().is_none());
        assert_eq!(map.tick(), PickEvent::Unchanged);
    }

    #[test]
    fn pointer_move_alone_selects_the_body_under_it() {
        let mut map = loaded();
        point_at(&mut map, "p1");
        assert_eq!(map.selected().map(|b| b.name.as_str()), Some("Terra"));

        assert_eq!(map.on_pointer_move(DVec2::new(0.99, 0.99)), PickEvent::Cleared);
        assert!(map.selected().is_none());
    }

    #[test]
    fn parsed_values_load_like_text() {
        let value: Value = serde_json::from_str(HELIOS).unwrap();
        let mut map = StarMap::default();
        let summary = map.load_value(&value).unwrap();
        assert_eq!(summary.bodies, 2);
        assert_eq!(map.poi_list()[0].name, "Helios");
        assert!(matches!(
            map.load_value(&Value::Null),
            Err(DocumentError::NotAnObject)
        ));
        assert!(map.is_loaded());
    }
}
