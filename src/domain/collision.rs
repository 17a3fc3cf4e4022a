use glam::{Vec2, Vec3};
use serde::Serialize;
use crate::domain::city::City;
use crate::state::enemy::EnemyArena;

/// Penetration passes per move; enough for a corner between two buildings
const MAX_RESOLVE_PASSES: usize = 4;

const GROUND_LEVEL: f32 = 0.0;

/// Axis-aligned box used for building volumes and enemy hit boxes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Distance along `dir` (unit) at which the ray enters the box, if within `max_distance`.
    /// A ray starting inside reports 0.
    pub fn ray_distance(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<f32> {
        let mut t_min = 0.0f32;
        let mut t_max = max_distance;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }

    /// Footprint overlap in XZ, touching edges excluded
    pub fn overlaps_xz(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Horizontal push that moves a circle at `center` out of this footprint
    pub fn circle_push_out(&self, center: Vec3, radius: f32) -> Option<Vec2> {
        let closest_x = center.x.clamp(self.min.x, self.max.x);
        let closest_z = center.z.clamp(self.min.z, self.max.z);
        let offset = Vec2::new(center.x - closest_x, center.z - closest_z);
        let dist_sq = offset.length_squared();

        if dist_sq >= radius * radius {
            return None;
        }

        if dist_sq > 1e-10 {
            let dist = dist_sq.sqrt();
            return Some(offset / dist * (radius - dist));
        }

        // Centre inside the footprint: leave through the nearest face
        let exits = [
            (center.x - self.min.x, Vec2::new(-1.0, 0.0)),
            (self.max.x - center.x, Vec2::new(1.0, 0.0)),
            (center.z - self.min.z, Vec2::new(0.0, -1.0)),
            (self.max.z - center.z, Vec2::new(0.0, 1.0)),
        ];
        let (depth, normal) = exits
            .into_iter()
            .min_by(|a, b| a.0.total_cmp(&b.0))?;
        Some(normal * (depth + radius))
    }
}

/// Corrected displacement after collision resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub displacement: Vec3,
    pub grounded: bool,
}

/// Resolve an intended displacement of a vertical body against the city.
///
/// Penetrating footprints push the body out along their surface normal, so
/// motion into a wall turns into motion along it. The body is kept inside
/// the city bounds and stopped at the ground plane.
pub fn resolve_movement(city: &City, position: Vec3, radius: f32, displacement: Vec3) -> Movement {
    let mut target = position + displacement;

    for _ in 0..MAX_RESOLVE_PASSES {
        let mut pushed = false;
        for building in city.buildings() {
            let bounds = building.bounds();
            if target.y >= bounds.max.y {
                continue;
            }
            if let Some(push) = bounds.circle_push_out(target, radius) {
                target.x += push.x;
                target.z += push.y;
                pushed = true;
            }
        }
        if !pushed {
            break;
        }
    }

    let limit = city.half_extent() - radius;
    target.x = target.x.clamp(-limit, limit);
    target.z = target.z.clamp(-limit, limit);

    let grounded = target.y <= GROUND_LEVEL;
    if grounded {
        target.y = GROUND_LEVEL;
    }

    Movement {
        displacement: target - position,
        grounded,
    }
}

/// Result of a hit query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub enemy_id: u32,
    pub distance: f32,
}

/// Nearest living enemy hit by the ray within `range`, unless a building is entered first
pub fn hitscan(city: &City, enemies: &EnemyArena, origin: Vec3, dir: Vec3, range: f32) -> Option<RayHit> {
    let dir = dir.normalize_or_zero();
    if dir == Vec3::ZERO {
        return None;
    }

    let nearest = enemies
        .living()
        .filter_map(|enemy| {
            enemy
                .bounds()
                .ray_distance(origin, dir, range)
                .map(|distance| RayHit { enemy_id: enemy.id, distance })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))?;

    if city.first_occluder(origin, dir, nearest.distance).is_some() {
        return None;
    }

    Some(nearest)
}

/// Line of sight between two points, blocked by any building in between
pub fn check_line_of_sight(city: &City, from: Vec3, to: Vec3) -> bool {
    let delta = to - from;
    let distance = delta.length();
    if distance < 1e-6 {
        return true;
    }
    city.first_occluder(from, delta / distance, distance).is_none()
}
