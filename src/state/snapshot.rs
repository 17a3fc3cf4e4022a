use glam::Vec3;
use serde::Serialize;
use crate::state::enemy::{EnemyAi, EnemyTier};
use crate::state::session::{GameMessage, GameState, Session};
use crate::utils::weapondb::{WeaponDb, WeaponType};

/// Read-only view of the session published at each tick boundary
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub game_state: GameState,
    pub player: PlayerView,
    pub weapon: WeaponView,
    pub enemies: Vec<EnemyView>,
    pub messages: Vec<GameMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub health: u32,
    pub max_health: u32,
    pub score: u32,
    pub is_dashing: bool,
    pub dash_cooldown_ms: u64,
    pub current_weapon: WeaponType,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeaponView {
    pub weapon: WeaponType,
    pub name: &'static str,
    pub ammo: u32,
    pub max_ammo: u32,
    pub is_reloading: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub tier: EnemyTier,
    pub position: Vec3,
    pub health: u32,
    pub max_health: u32,
    pub ai: EnemyAi,
}

impl Snapshot {
    pub fn capture(session: &Session, weapons: &WeaponDb) -> Self {
        let player = &session.player;
        let weapon = session.arsenal.current;
        let stats = weapons.get(weapon);
        let state = session.arsenal.current_state();

        Self {
            tick: session.tick,
            game_state: session.game_state,
            player: PlayerView {
                position: player.position,
                yaw: player.yaw,
                pitch: player.pitch,
                health: player.health,
                max_health: player.max_health,
                score: player.score,
                is_dashing: player.is_dashing,
                dash_cooldown_ms: player.dash_cooldown_ms,
                current_weapon: weapon,
            },
            weapon: WeaponView {
                weapon,
                name: stats.name,
                ammo: state.ammo,
                max_ammo: stats.max_ammo,
                is_reloading: state.is_reloading(),
            },
            enemies: session
                .enemies
                .living()
                .map(|e| EnemyView {
                    id: e.id,
                    tier: e.tier,
                    position: e.position,
                    health: e.health,
                    max_health: e.max_health,
                    ai: e.ai,
                })
                .collect(),
            messages: session.messages.iter().cloned().collect(),
        }
    }
}
