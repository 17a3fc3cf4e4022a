use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use crate::domain::collision::Aabb;

/// Radius around the spawn point kept free of buildings
pub const SPAWN_CLEAR_RADIUS: f32 = 10.0;

const MIN_FOOTPRINT: f32 = 6.0;
const MAX_FOOTPRINT: f32 = 18.0;
const MIN_HEIGHT: f32 = 8.0;
const MAX_HEIGHT: f32 = 60.0;
/// Minimum street width between neighbouring footprints
const STREET_GAP: f32 = 2.0;
const ATTEMPTS_PER_BUILDING: usize = 30;

/// Static building volume; `position` is the footprint centre at street level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Building {
    pub id: u32,
    pub position: Vec3,
    pub width: f32,
    pub depth: f32,
    pub height: f32,
}

impl Building {
    pub fn bounds(&self) -> Aabb {
        let half = Vec3::new(self.width * 0.5, 0.0, self.depth * 0.5);
        Aabb::new(
            self.position - half,
            self.position + half + Vec3::new(0.0, self.height, 0.0),
        )
    }
}

/// Immutable city layout, generated once per process
#[derive(Debug, Clone, Serialize)]
pub struct City {
    size: f32,
    spawn_point: Vec3,
    buildings: Vec<Building>,
}

impl City {
    pub fn from_buildings(size: f32, buildings: Vec<Building>) -> Self {
        Self {
            size,
            spawn_point: Vec3::ZERO,
            buildings,
        }
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn half_extent(&self) -> f32 {
        self.size * 0.5
    }

    pub fn spawn_point(&self) -> Vec3 {
        self.spawn_point
    }

    /// Point lies inside the city bounds (XZ)
    pub fn contains(&self, point: Vec3) -> bool {
        let half = self.half_extent();
        point.x.abs() <= half && point.z.abs() <= half
    }

    /// A circle at `point` fits inside the bounds without touching any footprint
    pub fn is_clear(&self, point: Vec3, radius: f32) -> bool {
        let half = self.half_extent() - radius;
        if point.x.abs() > half || point.z.abs() > half {
            return false;
        }
        self.buildings
            .iter()
            .all(|b| b.bounds().circle_push_out(point, radius).is_none())
    }

    /// Nearest building entered by the ray strictly before `max_distance`
    pub fn first_occluder(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<(u32, f32)> {
        self.buildings
            .iter()
            .filter_map(|b| b.bounds().ray_distance(origin, dir, max_distance).map(|d| (b.id, d)))
            .filter(|(_, d)| *d < max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Generate a city layout deterministically from `seed`.
///
/// Footprints never overlap, stay inside the bounds and keep the spawn
/// point clear. When the space runs out fewer buildings are placed.
pub fn generate(city_size: f32, building_count: usize, seed: u64) -> City {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let half = city_size * 0.5;
    let spawn_point = Vec3::ZERO;
    let mut buildings: Vec<Building> = Vec::with_capacity(building_count);

    for _ in 0..building_count * ATTEMPTS_PER_BUILDING {
        if buildings.len() >= building_count {
            break;
        }

        let width = rng.gen_range(MIN_FOOTPRINT..MAX_FOOTPRINT);
        let depth = rng.gen_range(MIN_FOOTPRINT..MAX_FOOTPRINT);
        let height = rng.gen_range(MIN_HEIGHT..MAX_HEIGHT);

        // Perimeter street keeps every footprint off the city edge
        let max_x = half - width * 0.5 - STREET_GAP;
        let max_z = half - depth * 0.5 - STREET_GAP;
        if max_x <= 0.0 || max_z <= 0.0 {
            continue;
        }

        let candidate = Building {
            id: buildings.len() as u32 + 1,
            position: Vec3::new(rng.gen_range(-max_x..max_x), 0.0, rng.gen_range(-max_z..max_z)),
            width,
            depth,
            height,
        };
        let bounds = candidate.bounds();

        if bounds.circle_push_out(spawn_point, SPAWN_CLEAR_RADIUS).is_some() {
            continue;
        }

        let padded = Aabb::new(
            bounds.min - Vec3::new(STREET_GAP, 0.0, STREET_GAP),
            bounds.max + Vec3::new(STREET_GAP, 0.0, STREET_GAP),
        );
        if buildings.iter().any(|b| padded.overlaps_xz(&b.bounds())) {
            continue;
        }

        buildings.push(candidate);
    }

    if buildings.len() < building_count {
        log::warn!(
            "City generation placed {} of {} buildings (size {})",
            buildings.len(),
            building_count,
            city_size
        );
    } else {
        log::debug!("Generated city with {} buildings", buildings.len());
    }

    City {
        size: city_size,
        spawn_point,
        buildings,
    }
}
