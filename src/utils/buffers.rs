use serde::Serialize;
use smallvec::SmallVec;
use crate::state::enemy::EnemyTier;
use crate::state::session::{GameMessage, GameState};
use crate::utils::weapondb::WeaponType;

/// Type alias for small collections that avoid allocations
pub type SmallEventVec = SmallVec<[SyncEvent; 16]>;

/// Outbound update event for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    HealthChanged { health: u32, max_health: u32 },
    /// Ammo of the currently selected weapon
    AmmoChanged { weapon: WeaponType, ammo: u32, max_ammo: u32 },
    ScoreChanged { score: u32, delta: u32 },
    DashChanged { is_dashing: bool, dash_cooldown_ms: u64 },
    WeaponChanged { weapon: WeaponType },
    ReloadChanged { weapon: WeaponType, is_reloading: bool },
    GameStateChanged { state: GameState },
    EnemyHit { enemy_id: u32, damage: u32, remaining_health: u32 },
    EnemyKilled { enemy_id: u32, tier: EnemyTier, points: u32 },
    MessagePosted { message: GameMessage },
}

/// Reusable buffer for datagram serialization
pub struct PacketBuffer {
    buffer: Vec<u8>,
}

impl PacketBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Serialize `value` as JSON into the buffer, replacing previous contents
    pub fn encode<T: Serialize>(&mut self, value: &T) -> Result<&[u8], serde_json::Error> {
        self.buffer.clear();
        serde_json::to_writer(&mut self.buffer, value)?;
        Ok(&self.buffer)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for PacketBuffer {
    fn default() -> Self {
        Self::new(1024)
    }
}
