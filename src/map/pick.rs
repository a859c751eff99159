use crate::geom::DVec2;
use crate::map::body::{Body, BodyKind};
use crate::map::render::ProxyLookup;
use crate::map::scene::{Camera, Color, Hit, ProxyId, Scene};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq)]
pub struct Highlight {
    pub proxy: ProxyId,
    pub body_id: String,
    /// Color before highlighting, restored on leave.
    pub original: Color,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum PickState {
    #[default]
    Idle,
    Hovering(Highlight),
}

#[derive(Clone, Debug, PartialEq)]
pub enum PickEvent {
    Unchanged,
    Highlighted { body_id: String },
    Cleared,
}

pub struct PickController {
    pointer: Option<DVec2>,
    state: PickState,
    locked: bool,
    highlight: Color,
}

impl PickController {
    pub fn new(highlight: Color) -> Self {
        Self {
            pointer: None,
            state: PickState::Idle,
            locked: false,
            highlight,
        }
    }

    pub fn state(&self) -> &PickState {
        &self.state
    }

    pub fn current_body(&self) -> Option<&str> {
        match &self.state {
            PickState::Hovering(h) => Some(h.body_id.as_str()),
            PickState::Idle => None,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn on_pointer_move(&mut self, ndc: DVec2) {
        self.pointer = Some(ndc);
    }

    pub fn on_pointer_down(&mut self) -> bool {
        if matches!(self.state, PickState::Hovering(_)) {
            self.locked = !self.locked;
        }
        self.locked
    }

    pub fn reset(&mut self) {
        self.state = PickState::Idle;
        self.locked = false;
    }

    pub fn candidate(hits: &[Hit], lookup: &ProxyLookup) -> Option<ProxyId> {
        let hit = hits
            .iter()
            .find(|hit| !hit.transparent && !lookup.is_ignored(hit.proxy))?;
        if lookup.body_id(hit.proxy).is_none() {
            log::debug!("pick hit unregistered proxy {:?}", hit.proxy);
            return None;
        }
        Some(hit.proxy)
    }

    pub fn tick(&mut self, scene: &mut Scene, camera: &Camera, lookup: &ProxyLookup) -> PickEvent {
        let candidate = self.pointer.and_then(|ndc| {
            let hits = scene.intersect(&camera.ray_from_ndc(ndc));
            Self::candidate(&hits, lookup)
        });
        self.apply(candidate, scene, lookup)
    }

    pub fn apply(
        &mut self,
        candidate: Option<ProxyId>,
        scene: &mut Scene,
        lookup: &ProxyLookup,
    ) -> PickEvent {
        let dropped = matches!(&self.state, PickState::Hovering(h) if scene.get(h.proxy).is_none());
        if dropped {
            log::debug!("highlighted proxy left the scene");
            self.reset();
        }

        if self.locked {
            return PickEvent::Unchanged;
        }

        let previous = std::mem::take(&mut self.state);
        if let PickState::Hovering(h) = &previous {
            if Some(h.proxy) == candidate {
                self.state = previous;
                return PickEvent::Unchanged;
            }
            scene.set_color(h.proxy, h.original);
        }

        let next = candidate.and_then(|proxy| {
            let body_id = lookup.body_id(proxy)?.to_string();
            let original = scene.color(proxy)?;
            Some(Highlight {
                proxy,
                body_id,
                original,
            })
        });

        match next {
            Some(h) => {
                scene.set_color(h.proxy, self.highlight);
                log::debug!("highlight `{}`", h.body_id);
                let body_id = h.body_id.clone();
                self.state = PickState::Hovering(h);
                PickEvent::Highlighted { body_id }
            }
            None if dropped || matches!(previous, PickState::Hovering(_)) => {
                log::debug!("highlight cleared");
                PickEvent::Cleared
            }
            None => PickEvent::Unchanged,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BodyDetail {
    pub id: String,
    pub kind: BodyKind,
    pub name: String,
    pub gravity: String,
    pub size: String,
    pub image: String,
}

impl BodyDetail {
    pub fn from_body(body: &Body, icon_path: &str) -> Self {
        let mut name = body.name.clone();
        if matches!(body.kind, BodyKind::Star | BodyKind::Planet) && body.has_children() {
            name = format!("{} ({})", name, body.children.len());
        }
        Self {
            id: body.id.clone(),
            kind: body.kind,
            name,
            gravity: body.gravity.map(|g| format!("{g}g")).unwrap_or_default(),
            size: body.radius.map(|r| r.to_string()).unwrap_or_default(),
            image: format!("{}{}.png", icon_path, body.name),
        }
    }
}
