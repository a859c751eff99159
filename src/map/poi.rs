use crate::map::body::{Body, BodyKind};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterSet {
    active: BTreeSet<BodyKind>,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::new(BodyKind::KNOWN)
    }
}

impl FilterSet {
    pub fn new(kinds: impl IntoIterator<Item = BodyKind>) -> Self {
        Self {
            active: kinds.into_iter().collect(),
        }
    }

    pub fn contains(&self, kind: BodyKind) -> bool {
        self.active.contains(&kind)
    }

    pub fn toggle(&mut self, kind: BodyKind) -> bool {
        if self.active.remove(&kind) {
            false
        } else {
            self.active.insert(kind);
            true
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = BodyKind> + '_ {
        self.active.iter().copied()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PoiEntry {
    pub id: String,
    pub name: String,
    pub kind: BodyKind,
    /// Present whenever the body has children, even if none of them is shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sublist: Option<Vec<PoiEntry>>,
}

pub fn rebuild_list<'a>(
    roots: impl IntoIterator<Item = &'a Body>,
    filters: &FilterSet,
) -> Vec<PoiEntry> {
    let mut list = Vec::new();
    for root in roots {
        append(root, filters, &mut list);
    }
    list
}

fn append(body: &Body, filters: &FilterSet, list: &mut Vec<PoiEntry>) {
    if !filters.contains(body.kind) {
        for child in &body.children {
            append(child, filters, list);
        }
        return;
    }

    let sublist = body.has_children().then(|| {
        let mut sublist = Vec::new();
        for child in &body.children {
            append(child, filters, &mut sublist);
        }
        sublist
    });
    list.push(PoiEntry {
        id: body.id.clone(),
        name: body.name.clone(),
        kind: body.kind,
        sublist,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::body::SystemMap;
    use crate::map::config::DOCUMENT_SCALE;
    use serde_json::json;

    fn system() -> SystemMap {
        let doc = json!({
            "alioth": {"id": "s", "name": "Alioth", "type": "star", "center": {"x": 0, "y": 0, "z": 0},
                "children": [
                    {"id": "p1", "name": "Madis", "type": "planet", "center": {"x": 1, "y": 0, "z": 0},
                     "children": [
                        {"id": "m1", "name": "Madis Moon 1", "type": "moon", "center": {"x": 1, "y": 1, "z": 0}},
                        {"id": "b1", "name": "Madis Station", "type": "starbase", "center": {"x": 1, "y": 2, "z": 0}}
                     ]},
                    {"id": "p2", "name": "Thades", "type": "planet", "center": {"x": 2, "y": 0, "z": 0}},
                    {"id": "x1", "name": "Beacon", "type": "relay", "center": {"x": 3, "y": 0, "z": 0}}
                ]}
        });
        SystemMap::parse(&doc, DOCUMENT_SCALE).unwrap()
    }

    fn names(list: &[PoiEntry]) -> Vec<String> {
        let mut out = Vec::new();
        for entry in list {
            out.push(entry.name.clone());
            if let Some(sub) = &entry.sublist {
                out.extend(names(sub).into_iter().map(|n| format!("  {n}")));
            }
        }
        out
    }

    #[test]
    fn default_filters_show_known_kinds_nested() {
        let map = system();
        let list = rebuild_list(map.roots(), &FilterSet::default());
        assert_eq!(
            names(&list),
            vec![
                "Alioth",
                "  Madis",
                "    Madis Moon 1",
                "    Madis Station",
                "  Thades"
            ]
        );
        assert_eq!(list[0].sublist.as_ref().unwrap()[1].sublist, None);
    }

    #[test]
    fn hidden_parent_children_attach_to_nearest_visible_ancestor() {
        let map = system();
        let filters = FilterSet::new([BodyKind::Star, BodyKind::Moon]);
        let list = rebuild_list(map.roots(), &filters);
        assert_eq!(names(&list), vec!["Alioth", "  Madis Moon 1"]);

        let only_moons = FilterSet::new([BodyKind::Moon]);
        let list = rebuild_list(map.roots(), &only_moons);
        assert_eq!(names(&list), vec!["Madis Moon 1"]);
    }

    #[test]
    fn shown_parent_keeps_empty_sublist() {
        let map = system();
        let list = rebuild_list(map.roots(), &FilterSet::new([BodyKind::Planet]));
        assert_eq!(names(&list), vec!["Madis", "Thades"]);
        assert_eq!(list[0].sublist, Some(Vec::new()));
        assert_eq!(list[1].sublist, None);
    }

    #[test]
    fn unknown_kinds_need_their_own_filter() {
        let map = system();
        let mut filters = FilterSet::default();
        assert!(!names(&rebuild_list(map.roots(), &filters)).iter().any(|n| n.contains("Beacon")));
        assert!(filters.toggle(BodyKind::Unknown));
        assert!(names(&rebuild_list(map.roots(), &filters)).contains(&"  Beacon".to_string()));
    }

    #[test]
    fn toggle_on_then_off_restores_list() {
        let map = system();
        for kind in BodyKind::ALL {
            let mut filters = FilterSet::new([BodyKind::Star, BodyKind::Moon]);
            let before = rebuild_list(map.roots(), &filters);
            let first = filters.toggle(kind);
            filters.toggle(kind);
            assert_ne!(first, filters.contains(kind));
            assert_eq!(rebuild_list(map.roots(), &filters), before, "kind {kind:?}");
        }
    }

    #[test]
    fn list_serializes_for_scripts() {
        let map = system();
        let list = rebuild_list(map.roots(), &FilterSet::new([BodyKind::Planet]));
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(
            json,
            json!([
                {"id": "p1", "name": "Madis", "kind": "planet", "sublist": []},
                {"id": "p2", "name": "Thades", "kind": "planet"}
            ])
        );
    }
}
