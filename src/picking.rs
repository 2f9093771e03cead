//! Hit testing for border loops.
//!
//! Everything here works in the globe's local frame (the frame the border
//! points were projected in); callers move the pointer ray into that frame
//! first, so the spinning globe needs no special handling.

use bevy::math::{Affine3A, Ray3d, Vec3};

use crate::geojson::BorderRing;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickRay {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl PickRay {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The same ray seen from the local frame of an object placed by
    /// `world_from_local`.
    pub fn to_local(&self, world_from_local: &Affine3A) -> Self {
        let local_from_world = world_from_local.inverse();
        Self::new(
            local_from_world.transform_point3(self.origin),
            local_from_world.transform_vector3(self.direction),
        )
    }
}

impl From<Ray3d> for PickRay {
    fn from(ray: Ray3d) -> Self {
        Self::new(ray.origin, *ray.direction)
    }
}

/// Distance along the ray to the first intersection with a sphere, or `None`
/// when the ray misses it or it lies behind the origin.
pub fn ray_sphere(ray: &PickRay, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let far = -b + root;
    if far < 0.0 {
        return None;
    }
    Some((-b - root).max(0.0))
}

/// Closest approach between a ray and the segment `a..b`.
/// Returns `(gap, t)`: the gap between the two closest points and the
/// distance along the ray at which it occurs.
pub fn ray_segment(ray: &PickRay, a: Vec3, b: Vec3) -> (f32, f32) {
    let segment = b - a;
    let r = ray.origin - a;
    let e = segment.length_squared();
    let c = ray.direction.dot(r);

    if e <= f32::EPSILON {
        let t = (-c).max(0.0);
        return (ray.at(t).distance(a), t);
    }

    let bd = ray.direction.dot(segment);
    let f = segment.dot(r);
    let denom = e - bd * bd;

    let mut t = if denom > f32::EPSILON {
        ((bd * f - c * e) / denom).max(0.0)
    } else {
        0.0
    };
    let mut s = (bd * t + f) / e;
    if s < 0.0 {
        s = 0.0;
        t = (-c).max(0.0);
    } else if s > 1.0 {
        s = 1.0;
        t = (bd - c).max(0.0);
    }

    let gap = ray.at(t).distance(a + segment * s);
    (gap, t)
}

fn ray_point_gap(ray: &PickRay, point: Vec3) -> f32 {
    let t = (point - ray.origin).dot(ray.direction).max(0.0);
    ray.at(t).distance(point)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderHit {
    pub ring: usize,
    /// Distance along the pick ray.
    pub distance: f32,
}

#[derive(Clone, Debug)]
struct IndexedRing {
    country: String,
    points: Vec<Vec3>,
    center: Vec3,
    radius: f32,
}

/// All border loops in a form suitable for ray picking. Ring indices are
/// stable and match the order borders were inserted in.
#[derive(Clone, Debug, Default)]
pub struct HitIndex {
    rings: Vec<IndexedRing>,
    threshold: f32,
}

impl HitIndex {
    /// `threshold` is how close (world units) the ray must pass to a loop.
    pub fn new(threshold: f32) -> Self {
        Self {
            rings: Vec::new(),
            threshold,
        }
    }

    pub fn from_borders(borders: &[BorderRing], threshold: f32) -> Self {
        let mut index = Self::new(threshold);
        for border in borders {
            index.insert(&border.country, border.points.clone());
        }
        index
    }

    pub fn insert(&mut self, country: &str, points: Vec<Vec3>) -> usize {
        let center = if points.is_empty() {
            Vec3::ZERO
        } else {
            points.iter().copied().sum::<Vec3>() / points.len() as f32
        };
        let radius = points
            .iter()
            .map(|p| p.distance(center))
            .fold(0.0, f32::max);
        self.rings.push(IndexedRing {
            country: country.to_string(),
            points,
            center,
            radius,
        });
        self.rings.len() - 1
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn country(&self, ring: usize) -> Option<&str> {
        self.rings.get(ring).map(|r| r.country.as_str())
    }

    pub fn first_ring_of(&self, country: &str) -> Option<usize> {
        self.rings.iter().position(|r| r.country == country)
    }

    /// Nearest loop along the ray, if any passes within the threshold.
    pub fn pick(&self, ray: &PickRay) -> Option<BorderHit> {
        let mut best: Option<BorderHit> = None;

        for (index, ring) in self.rings.iter().enumerate() {
            if ring.points.is_empty()
                || ray_point_gap(ray, ring.center) > ring.radius + self.threshold
            {
                continue;
            }

            // Closed loop: the last point connects back to the first.
            let count = ring.points.len();
            for i in 0..count {
                let a = ring.points[i];
                let b = ring.points[(i + 1) % count];
                let (gap, t) = ray_segment(ray, a, b);
                if gap <= self.threshold && best.is_none_or(|hit| t < hit.distance) {
                    best = Some(BorderHit {
                        ring: index,
                        distance: t,
                    });
                }
            }
        }

        best
    }

    /// Click picking: the ray has to hit the globe, and the border has to be
    /// on the visible side of it.
    pub fn pick_on_globe(
        &self,
        ray: &PickRay,
        globe_radius: f32,
        occlusion_tolerance: f32,
    ) -> Option<BorderHit> {
        let surface = ray_sphere(ray, Vec3::ZERO, globe_radius)?;
        self.pick(ray)
            .filter(|hit| hit.distance <= surface + occlusion_tolerance)
    }
}

/// Something that can recolor border loops by ring index.
pub trait BorderPaint {
    fn paint(&mut self, ring: usize, highlighted: bool);
    fn ring_count(&self) -> usize;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HoverState {
    #[default]
    NoHover,
    Hovering(usize),
}

/// Pointer hover highlight. Only the previously hovered loop is ever reset,
/// so at most one loop is highlighted through hover at a time.
#[derive(Clone, Copy, Debug, Default)]
pub struct HoverTracker {
    state: HoverState,
}

impl HoverTracker {
    pub fn state(&self) -> HoverState {
        self.state
    }

    pub fn update(&mut self, pick: Option<usize>, paint: &mut impl BorderPaint) {
        if let HoverState::Hovering(previous) = self.state {
            if pick != Some(previous) {
                paint.paint(previous, false);
                self.state = HoverState::NoHover;
            }
        }

        if let Some(ring) = pick {
            paint.paint(ring, true);
            self.state = HoverState::Hovering(ring);
        }
    }
}

/// Search highlight: every loop goes back to the default color, then the
/// first loop of `country` is highlighted. Returns the highlighted ring.
pub fn highlight_country(
    index: &HitIndex,
    country: &str,
    paint: &mut impl BorderPaint,
) -> Option<usize> {
    for ring in 0..paint.ring_count() {
        paint.paint(ring, false);
    }
    let ring = index.first_ring_of(country)?;
    paint.paint(ring, true);
    Some(ring)
}
