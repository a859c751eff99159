use crate::map::body::{Body, BodyKind};
use crate::map::config::MapConfig;
use crate::map::scene::{Material, ProxyId, Scene, Shape};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, PartialEq)]
pub struct BodyProxies {
    pub primary: ProxyId,
    pub label: Option<ProxyId>,
    pub stand: Option<Stand>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stand {
    pub line: ProxyId,
    pub ring: ProxyId,
}

#[derive(Debug, Default)]
pub struct ProxyLookup {
    bodies: HashMap<ProxyId, String>,
    ignored: HashSet<ProxyId>,
    owned: HashMap<String, Vec<ProxyId>>,
}

impl ProxyLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body_id(&self, proxy: ProxyId) -> Option<&str> {
        self.bodies.get(&proxy).map(String::as_str)
    }

    pub fn is_ignored(&self, proxy: ProxyId) -> bool {
        self.ignored.contains(&proxy)
    }

    pub fn proxies_of(&self, body_id: &str) -> &[ProxyId] {
        self.owned.get(body_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn primary_of(&self, body_id: &str) -> Option<ProxyId> {
        self.proxies_of(body_id)
            .iter()
            .copied()
            .find(|p| self.bodies.contains_key(p))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn register_primary(&mut self, proxy: ProxyId, body_id: &str) {
        self.bodies.insert(proxy, body_id.to_string());
        self.owned.entry(body_id.to_string()).or_default().push(proxy);
    }

    fn register_decoration(&mut self, proxy: ProxyId, owner: Option<&str>) {
        self.ignored.insert(proxy);
        if let Some(body_id) = owner {
            self.owned.entry(body_id.to_string()).or_default().push(proxy);
        }
    }
}

pub fn render(
    body: &Body,
    scene: &mut Scene,
    lookup: &mut ProxyLookup,
    config: &MapConfig,
) -> BodyProxies {
    let style = config.styles.for_kind(body.kind);
    let primary = scene.add(
        Shape::Sphere {
            center: body.position,
            radius: style.radius,
        },
        Material::solid(style.color),
    );
    lookup.register_primary(primary, &body.id);

    let mut proxies = BodyProxies {
        primary,
        label: None,
        stand: None,
    };
    if body.kind != BodyKind::Planet {
        return proxies;
    }

    let label = scene.add(
        Shape::Label {
            anchor: body.position,
            text: body.name.clone(),
        },
        Material::translucent(config.label_color, 1.0),
    );
    lookup.register_decoration(label, Some(&body.id));
    proxies.label = Some(label);

    let stand = &config.stand;
    if body.position.z.abs() > stand.threshold {
        let foot = body.position.truncate().extend(0.0);
        let line = scene.add(
            Shape::Line {
                from: body.position,
                to: foot,
            },
            Material::translucent(stand.line_color, 1.0),
        );
        let ring = scene.add(
            Shape::Ring {
                center: foot,
                inner: 0.0,
                outer: stand.ring_radius,
            },
            Material::translucent(stand.ring_color, stand.ring_opacity),
        );
        lookup.register_decoration(line, Some(&body.id));
        lookup.register_decoration(ring, Some(&body.id));
        proxies.stand = Some(Stand { line, ring });
    }

    proxies
}

pub fn render_tree<'a>(
    roots: impl IntoIterator<Item = &'a Body>,
    scene: &mut Scene,
    lookup: &mut ProxyLookup,
    config: &MapConfig,
) -> usize {
    let mut count = 0;
    for root in roots {
        for body in root.iter() {
            render(body, scene, lookup, config);
            count += 1;
        }
    }
    count
}

pub fn render_backdrop(
    scene: &mut Scene,
    lookup: &mut ProxyLookup,
    config: &MapConfig,
) -> Option<ProxyId> {
    let backdrop = &config.backdrop;
    if !backdrop.enabled {
        return None;
    }
    let disk = scene.add(
        Shape::Ring {
            center: backdrop.center,
            inner: backdrop.inner_radius,
            outer: backdrop.outer_radius,
        },
        Material::translucent(backdrop.color, backdrop.opacity),
    );
    lookup.register_decoration(disk, None);
    Some(disk)
}

pub fn clear_body(body_id: &str, scene: &mut Scene, lookup: &mut ProxyLookup) -> usize {
    let Some(proxies) = lookup.owned.remove(body_id) else {
        return 0;
    };
    for proxy in &proxies {
        scene.remove(*proxy);
        lookup.bodies.remove(proxy);
        lookup.ignored.remove(proxy);
    }
    proxies.len()
}
