use glam::Vec3;
use serde::Serialize;
use crate::domain::collision::Aabb;

/// Enemy tier: light, fast, heavy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnemyTier {
    Walker,
    Runner,
    Tank,
}

#[derive(Debug, Clone, Copy)]
pub struct TierStats {
    pub speed: f32,
    pub health: u32,
    pub damage: u32,
    pub attack_range: f32,
    pub attack_cooldown_ms: u64,
    pub radius: f32,
    pub height: f32,
    pub score: u32,
}

impl EnemyTier {
    pub const fn stats(self) -> TierStats {
        match self {
            EnemyTier::Walker => TierStats {
                speed: 3.5,
                health: 50,
                damage: 10,
                attack_range: 1.2,
                attack_cooldown_ms: 1000,
                radius: 0.5,
                height: 1.8,
                score: 10,
            },
            EnemyTier::Runner => TierStats {
                speed: 7.5,
                health: 30,
                damage: 5,
                attack_range: 1.0,
                attack_cooldown_ms: 600,
                radius: 0.4,
                height: 1.6,
                score: 20,
            },
            EnemyTier::Tank => TierStats {
                speed: 2.0,
                health: 200,
                damage: 25,
                attack_range: 1.6,
                attack_cooldown_ms: 1500,
                radius: 0.9,
                height: 2.6,
                score: 50,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyAi {
    Seek,
    Attack,
    Dead,
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub tier: EnemyTier,
    pub position: Vec3,
    pub health: u32,
    pub max_health: u32,
    pub ai: EnemyAi,
    pub last_known_target: Vec3,
    pub last_attack_at: Option<u64>,
}

impl Enemy {
    pub fn new(id: u32, tier: EnemyTier, position: Vec3) -> Self {
        let stats = tier.stats();
        Self {
            id,
            tier,
            position,
            health: stats.health,
            max_health: stats.health,
            ai: EnemyAi::Seek,
            last_known_target: position,
            last_attack_at: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.ai != EnemyAi::Dead
    }

    /// Hit box: the footprint square extruded to the tier height
    pub fn bounds(&self) -> Aabb {
        let stats = self.tier.stats();
        Aabb::new(
            self.position - Vec3::new(stats.radius, 0.0, stats.radius),
            self.position + Vec3::new(stats.radius, stats.height, stats.radius),
        )
    }

    /// Apply weapon damage; returns true when this hit killed the enemy
    pub fn take_damage(&mut self, damage: u32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = self.health.saturating_sub(damage);
        if self.health == 0 {
            self.ai = EnemyAi::Dead;
            return true;
        }
        false
    }
}

/// Live enemy set with stable ids and deferred removal
///
/// Dead enemies stay in their slot until `compact` runs at a tick phase
/// boundary, so iteration never observes removal.
#[derive(Debug, Default)]
pub struct EnemyArena {
    enemies: Vec<Enemy>,
    next_id: u32,
}

impl EnemyArena {
    pub fn new() -> Self {
        Self {
            enemies: Vec::new(),
            next_id: 1,
        }
    }

    pub fn spawn(&mut self, tier: EnemyTier, position: Vec3) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.enemies.push(Enemy::new(id, tier, position));
        id
    }

    pub fn get(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.enemies.iter_mut()
    }

    pub fn living(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.is_alive())
    }

    pub fn living_count(&self) -> usize {
        self.living().count()
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Drop dead enemies, returning the removed (id, tier) pairs in slot order
    pub fn compact(&mut self) -> Vec<(u32, EnemyTier)> {
        let mut removed = Vec::new();
        self.enemies.retain(|e| {
            if e.is_alive() {
                true
            } else {
                removed.push((e.id, e.tier));
                false
            }
        });
        removed
    }

    /// Remove everything; ids keep counting so none is reused in this session
    pub fn clear(&mut self) {
        self.enemies.clear();
    }
}
