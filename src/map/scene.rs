use crate::geom::{Ray, DVec2, DVec3};
use crate::map::config::CameraConfig;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const fn rgb(hex: u32) -> Self {
        Self(hex & 0xff_ffff)
    }

    pub fn css(self) -> String {
        format!("#{:06x}", self.0 & 0xff_ffff)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProxyId(pub u32);

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere { center: DVec3, radius: f64 },
    Ring { center: DVec3, inner: f64, outer: f64 },
    Line { from: DVec3, to: DVec3 },
    Label { anchor: DVec3, text: String },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f64,
    pub transparent: bool,
}

impl Material {
    pub fn solid(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            transparent: false,
        }
    }

    pub fn translucent(color: Color, opacity: f64) -> Self {
        Self {
            color,
            opacity,
            transparent: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub id: ProxyId,
    pub shape: Shape,
    pub material: Material,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub proxy: ProxyId,
    pub distance: f64,
    pub transparent: bool,
}

pub struct Scene {
    primitives: Vec<Primitive>,
    next_id: u32,
    line_threshold: f64,
}

impl Scene {
    pub fn new(line_threshold: f64) -> Self {
        Self {
            primitives: Vec::new(),
            next_id: 0,
            line_threshold,
        }
    }

    pub fn add(&mut self, shape: Shape, material: Material) -> ProxyId {
        let id = ProxyId(self.next_id);
        self.next_id += 1;
        self.primitives.push(Primitive {
            id,
            shape,
            material,
        });
        id
    }

    pub fn remove(&mut self, id: ProxyId) -> Option<Primitive> {
        let pos = self.primitives.iter().position(|p| p.id == id)?;
        Some(self.primitives.remove(pos))
    }

    pub fn get(&self, id: ProxyId) -> Option<&Primitive> {
        self.primitives.iter().find(|p| p.id == id)
    }

    pub fn color(&self, id: ProxyId) -> Option<Color> {
        self.get(id).map(|p| p.material.color)
    }

    pub fn set_color(&mut self, id: ProxyId, color: Color) -> bool {
        match self.primitives.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.material.color = color;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Primitive> + '_ {
        self.primitives.iter()
    }

    pub fn intersect(&self, ray: &Ray) -> Vec<Hit> {
        let mut hits: Vec<Hit> = self
            .primitives
            .iter()
            .filter_map(|p| {
                let distance = match &p.shape {
                    Shape::Sphere { center, radius } => ray.hit_sphere(*center, *radius),
                    Shape::Ring {
                        center,
                        inner,
                        outer,
                    } => ray.hit_ring(*center, *inner, *outer),
                    Shape::Line { from, to } => ray.hit_segment(*from, *to, self.line_threshold),
                    Shape::Label { .. } => None,
                }?;
                Some(Hit {
                    proxy: p.id,
                    distance,
                    transparent: p.material.transparent,
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub ndc: DVec2,
    pub depth: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: DVec3,
    pub target: DVec3,
    pub up: DVec3,
    pub fov_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Camera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: config.position,
            target: config.target,
            up: DVec3::new(0.0, 1.0, 0.0),
            fov_deg: config.fov_deg,
            aspect: 1.0,
            near: config.near,
            far: config.far,
        }
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
        }
    }

    fn basis(&self) -> (DVec3, DVec3, DVec3) {
        let forward = (self.target - self.position).normalize_or_zero();
        let mut right = forward.cross(self.up).normalize_or_zero();
        if right == DVec3::ZERO {
            // Looking straight along `up`.
            right = DVec3::new(1.0, 0.0, 0.0);
        }
        let up = right.cross(forward);
        (forward, right, up)
    }

    fn half_height(&self) -> f64 {
        (self.fov_deg.to_radians() * 0.5).tan()
    }

    pub fn ray_from_ndc(&self, ndc: DVec2) -> Ray {
        let (forward, right, up) = self.basis();
        let h = self.half_height();
        let dir = forward + right * (ndc.x * h * self.aspect) + up * (ndc.y * h);
        Ray::new(self.position, dir)
    }

    pub fn project(&self, point: DVec3) -> Option<Projected> {
        let (forward, right, up) = self.basis();
        let rel = point - self.position;
        let depth = rel.dot(forward);
        if depth < self.near || depth > self.far {
            return None;
        }
        let h = self.half_height();
        Some(Projected {
            ndc: DVec2::new(
                rel.dot(right) / (depth * h * self.aspect),
                rel.dot(up) / (depth * h),
            ),
            depth,
        })
    }

    pub fn pixels_per_unit(&self, depth: f64, viewport_height: f64) -> f64 {
        viewport_height * 0.5 / (depth * self.half_height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        let mut camera = Camera::from_config(&CameraConfig::default());
        camera.set_viewport(800.0, 600.0);
        camera
    }

    #[test]
    fn center_ray_points_at_target() {
        let ray = camera().ray_from_ndc(DVec2::new(0.0, 0.0));
        assert!((ray.dir.z + 1.0).abs() < 1e-12);
        assert!(ray.dir.x.abs() < 1e-12 && ray.dir.y.abs() < 1e-12);
    }

    #[test]
    fn projection_inverts_picking_ray() {
        let camera = camera();
        let ndc = DVec2::new(0.3, -0.45);
        let point = camera.ray_from_ndc(ndc).at(120.0);
        let projected = camera.project(point).expect("in front");
        assert!((projected.ndc.x - ndc.x).abs() < 1e-9);
        assert!((projected.ndc.y - ndc.y).abs() < 1e-9);
    }

    #[test]
    fn points_behind_camera_are_not_projected() {
        assert!(camera().project(DVec3::new(0.0, 0.0, 500.0)).is_none());
    }

    #[test]
    fn intersect_sorts_nearest_first_and_skips_labels() {
        let mut scene = Scene::new(1.0);
        let far = scene.add(
            Shape::Sphere {
                center: DVec3::new(0.0, 0.0, -10.0),
                radius: 1.0,
            },
            Material::solid(Color::rgb(0xffffff)),
        );
        let disk = scene.add(
            Shape::Ring {
                center: DVec3::ZERO,
                inner: 0.0,
                outer: 50.0,
            },
            Material::translucent(Color::rgb(0xddddff), 0.15),
        );
        scene.add(
            Shape::Label {
                anchor: DVec3::new(0.0, 0.0, 5.0),
                text: "label".to_string(),
            },
            Material::translucent(Color::rgb(0xffffff), 1.0),
        );

        let ray = Ray::new(DVec3::new(0.0, 0.0, 20.0), DVec3::new(0.0, 0.0, -1.0));
        let hits = scene.intersect(&ray);
        let order: Vec<ProxyId> = hits.iter().map(|h| h.proxy).collect();
        assert_eq!(order, vec![disk, far]);
        assert!(hits[0].transparent);
        assert!(!hits[1].transparent);
    }

    #[test]
    fn set_color_reports_missing_primitives() {
        let mut scene = Scene::new(1.0);
        let id = scene.add(
            Shape::Sphere {
                center: DVec3::ZERO,
                radius: 1.0,
            },
            Material::solid(Color::rgb(0x123456)),
        );
        assert!(scene.set_color(id, Color::rgb(0xff0000)));
        assert_eq!(scene.color(id), Some(Color::rgb(0xff0000)));
        scene.remove(id);
        assert!(!scene.set_color(id, Color::rgb(0x00ff00)));
        assert_eq!(Color::rgb(0x00ff00).css(), "#00ff00");
    }
}
