pub use glam::{DVec2, DVec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    /// Always unit length.
    pub dir: DVec3,
}

impl Ray {
    pub fn new(origin: DVec3, dir: DVec3) -> Self {
        Self {
            origin,
            dir: dir.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.dir * t
    }

    pub fn hit_sphere(&self, center: DVec3, radius: f64) -> Option<f64> {
        let oc = self.origin - center;
        let b = oc.dot(self.dir);
        let c = oc.length_squared() - radius * radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sq = disc.sqrt();
        let near = -b - sq;
        if near >= 0.0 {
            return Some(near);
        }
        // origin inside the sphere: report the exit point
        let far = -b + sq;
        (far >= 0.0).then_some(far)
    }

    pub fn hit_ring(&self, center: DVec3, inner: f64, outer: f64) -> Option<f64> {
        if self.dir.z.abs() < 1e-12 {
            return None;
        }
        let t = (center.z - self.origin.z) / self.dir.z;
        if t < 0.0 {
            return None;
        }
        let r = (self.at(t) - center).truncate().length();
        (r >= inner && r <= outer).then_some(t)
    }

    pub fn hit_segment(&self, a: DVec3, b: DVec3, threshold: f64) -> Option<f64> {
        let seg = b - a;
        let w0 = self.origin - a;
        let aa = self.dir.length_squared();
        let bb = self.dir.dot(seg);
        let cc = seg.length_squared();
        let dd = self.dir.dot(w0);
        let ee = seg.dot(w0);
        let denom = aa * cc - bb * bb;

        let (t, s) = if denom.abs() < 1e-12 || cc < 1e-12 {
            (0.0_f64.max(-dd / aa), 0.0)
        } else {
            let s = ((aa * ee - bb * dd) / denom).clamp(0.0, 1.0);
            let t = ((bb * s - dd) / aa).max(0.0);
            (t, s)
        };

        let gap = self.at(t).distance(a + seg * s);
        (gap <= threshold).then_some(t)
    }
}
