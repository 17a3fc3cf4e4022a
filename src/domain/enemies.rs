use glam::{Quat, Vec3};
use rand::Rng;
use smallvec::SmallVec;
use crate::domain::city::City;
use crate::domain::collision;
use crate::state::enemy::{EnemyAi, EnemyArena, EnemyTier};
use crate::state::player::{EYE_HEIGHT, PLAYER_RADIUS};
use crate::state::session::Session;
use crate::utils::config::Config;

pub const SPAWN_MIN_DISTANCE: f32 = 20.0;
pub const SPAWN_MAX_DISTANCE: f32 = 45.0;
pub const SPAWN_ATTEMPTS: usize = 24;

/// How far ahead a seeking enemy probes for buildings
pub const STEERING_LOOKAHEAD: f32 = 3.0;

/// Alternate headings in degrees, tried in order when the direct path is blocked
const AVOIDANCE_ANGLES: [f32; 8] = [30.0, -30.0, 60.0, -60.0, 90.0, -90.0, 135.0, -135.0];

/// Probe height for steering rays, below every building roof
const PROBE_HEIGHT: f32 = 0.5;

/// An enemy landing an attack on the player this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactHit {
    pub enemy_id: u32,
    pub damage: u32,
}

pub type ContactHits = SmallVec<[ContactHit; 8]>;

/// Spawn weights; harder tiers become likelier as the score climbs
pub fn tier_weights(score: u32) -> [(EnemyTier, u32); 3] {
    [
        (EnemyTier::Walker, 6),
        (EnemyTier::Runner, (1 + score / 100).min(6)),
        (EnemyTier::Tank, (score / 250).min(4)),
    ]
}

/// Roll a tier against the score-dependent weights
pub fn choose_tier<R: Rng>(score: u32, rng: &mut R) -> EnemyTier {
    let weights = tier_weights(score);
    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    let roll = rng.gen_range(0..total);

    let mut cumulative = 0;
    for (tier, weight) in weights {
        cumulative += weight;
        if roll < cumulative {
            return tier;
        }
    }

    EnemyTier::Walker
}

/// Sample a clear ground point in the annulus around the player
pub fn pick_spawn_point<R: Rng>(city: &City, around: Vec3, radius: f32, rng: &mut R) -> Option<Vec3> {
    let limit = city.half_extent() - radius;
    if limit <= 0.0 {
        return None;
    }

    for _ in 0..SPAWN_ATTEMPTS {
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let distance = rng.gen_range(SPAWN_MIN_DISTANCE..=SPAWN_MAX_DISTANCE);
        let (sin, cos) = angle.sin_cos();
        let candidate = Vec3::new(around.x + cos * distance, 0.0, around.z + sin * distance);

        // Out-of-bounds candidates fail here and are resampled, never clamped
        if city.is_clear(candidate, radius) {
            return Some(candidate);
        }
    }

    None
}

/// Spawn one enemy when the interval has elapsed and the population is below the cap.
/// Returns the new enemy id.
pub fn spawn_tick(session: &mut Session, config: &Config, now: u64) -> Option<u32> {
    if now.saturating_sub(session.last_spawn_at) < config.spawn_interval_ms {
        return None;
    }
    session.last_spawn_at = now;

    if session.enemies.living_count() >= config.max_enemies {
        return None;
    }

    let tier = choose_tier(session.player.score, &mut session.rng);
    let Some(position) =
        pick_spawn_point(&session.city, session.player.position, tier.stats().radius, &mut session.rng)
    else {
        log::debug!("No clear spawn point for {:?}, skipping", tier);
        return None;
    };

    let id = session.enemies.spawn(tier, position);
    log::debug!("Spawned {:?} #{} at ({:.1}, {:.1})", tier, id, position.x, position.z);
    Some(id)
}

fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec3::new(b.x - a.x, 0.0, b.z - a.z).length()
}

fn heading_clear(city: &City, position: Vec3, heading: Vec3, radius: f32) -> bool {
    let origin = Vec3::new(position.x, PROBE_HEIGHT, position.z);
    city.first_occluder(origin, heading, STEERING_LOOKAHEAD + radius).is_none()
}

/// Direct heading towards `target`, nudged around buildings inside the lookahead
pub fn steer(city: &City, position: Vec3, target: Vec3, radius: f32) -> Vec3 {
    let direct = Vec3::new(target.x - position.x, 0.0, target.z - position.z).normalize_or_zero();
    if direct == Vec3::ZERO || heading_clear(city, position, direct, radius) {
        return direct;
    }

    AVOIDANCE_ANGLES
        .iter()
        .map(|deg| Quat::from_rotation_y(deg.to_radians()) * direct)
        .find(|heading| heading_clear(city, position, *heading, radius))
        .unwrap_or(direct)
}

/// Advance every living enemy: chase the player or attack on contact.
///
/// Hits are collected rather than applied so the caller can resolve them
/// against the player after the whole population has moved.
pub fn update_enemies(
    enemies: &mut EnemyArena,
    city: &City,
    player_position: Vec3,
    now: u64,
    dt_secs: f32,
) -> ContactHits {
    let mut hits = ContactHits::new();

    let player_eye = player_position + Vec3::new(0.0, EYE_HEIGHT, 0.0);

    for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
        let stats = enemy.tier.stats();
        let reach = stats.attack_range + PLAYER_RADIUS;
        let body_gap = stats.radius + PLAYER_RADIUS;

        // Bodies never overlap, even when the player walks into the enemy
        let offset = Vec3::new(enemy.position.x - player_position.x, 0.0, enemy.position.z - player_position.z);
        let overlap = body_gap - offset.length();
        if overlap > 0.0 {
            let away = offset.try_normalize().unwrap_or(Vec3::X);
            let push = collision::resolve_movement(city, enemy.position, stats.radius, away * overlap);
            enemy.position += push.displacement;
        }

        // Track the player while visible; once the last sighting is reached, follow anyway
        let enemy_eye = enemy.position + Vec3::new(0.0, stats.height * 0.9, 0.0);
        if collision::check_line_of_sight(city, enemy_eye, player_eye)
            || horizontal_distance(enemy.position, enemy.last_known_target) <= reach
        {
            enemy.last_known_target = player_position;
        }

        let distance = horizontal_distance(enemy.position, player_position);

        if distance <= reach {
            enemy.ai = EnemyAi::Attack;
            let ready = enemy
                .last_attack_at
                .map_or(true, |last| now.saturating_sub(last) >= stats.attack_cooldown_ms);
            if ready {
                enemy.last_attack_at = Some(now);
                hits.push(ContactHit { enemy_id: enemy.id, damage: stats.damage });
            }
            continue;
        }

        enemy.ai = EnemyAi::Seek;
        let heading = steer(city, enemy.position, enemy.last_known_target, stats.radius);
        // Stop inside reach, but no closer than body contact
        let stand_off = (reach * 0.5).max(body_gap);
        let remaining = horizontal_distance(enemy.position, enemy.last_known_target);
        let step = (stats.speed * dt_secs).min(remaining - stand_off);
        if step <= 0.0 {
            continue;
        }

        let movement = collision::resolve_movement(city, enemy.position, stats.radius, heading * step);
        enemy.position += movement.displacement;
    }

    hits
}
