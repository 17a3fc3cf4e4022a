use serde::{Deserialize, Serialize};

/// Weapon slots available to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeaponType {
    Pistol,
    Smg,
    Shotgun,
}

impl WeaponType {
    pub const ALL: [WeaponType; 3] = [WeaponType::Pistol, WeaponType::Smg, WeaponType::Shotgun];

    /// Map a number-key slot (1, 2, 3) to a weapon
    pub fn from_slot(slot: u8) -> Option<Self> {
        match slot {
            1 => Some(WeaponType::Pistol),
            2 => Some(WeaponType::Smg),
            3 => Some(WeaponType::Shotgun),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            WeaponType::Pistol => 0,
            WeaponType::Smg => 1,
            WeaponType::Shotgun => 2,
        }
    }
}

/// Static weapon stats, shared by every instance of a weapon type
#[derive(Debug, Clone, Serialize)]
pub struct WeaponStats {
    pub weapon: WeaponType,
    pub name: &'static str,
    /// Damage per hit (per pellet for multi-pellet weapons)
    pub damage: u32,
    /// Minimum milliseconds between accepted shots
    pub fire_rate_ms: u64,
    pub max_ammo: u32,
    pub reload_time_ms: u64,
    pub range: f32,
    pub spread: f32,
    pub pellets: u32,
    pub ammo_per_shot: u32,
}

/// Immutable weapon table - built once at startup and passed by reference
#[derive(Debug, Clone)]
pub struct WeaponDb {
    weapons: [WeaponStats; 3],
}

impl WeaponDb {
    pub fn load() -> Self {
        Self {
            weapons: [
                WeaponStats {
                    weapon: WeaponType::Pistol,
                    name: "Tactical P9",
                    damage: 25,
                    fire_rate_ms: 400,
                    max_ammo: 12,
                    reload_time_ms: 1500,
                    range: 100.0,
                    spread: 0.01,
                    pellets: 1,
                    ammo_per_shot: 1,
                },
                WeaponStats {
                    weapon: WeaponType::Smg,
                    name: "Vector-Z",
                    damage: 15,
                    fire_rate_ms: 100,
                    max_ammo: 30,
                    reload_time_ms: 2000,
                    range: 60.0,
                    spread: 0.05,
                    pellets: 1,
                    ammo_per_shot: 1,
                },
                WeaponStats {
                    weapon: WeaponType::Shotgun,
                    name: "Breacher-8",
                    damage: 15,
                    fire_rate_ms: 800,
                    max_ammo: 6,
                    reload_time_ms: 3000,
                    range: 30.0,
                    spread: 0.15,
                    pellets: 8,
                    ammo_per_shot: 1,
                },
            ],
        }
    }

    pub fn get(&self, weapon: WeaponType) -> &WeaponStats {
        &self.weapons[weapon.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &WeaponStats> {
        self.weapons.iter()
    }

    pub fn default_weapon() -> WeaponType {
        WeaponType::Pistol
    }
}
