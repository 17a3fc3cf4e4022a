use glam::Vec3;
use serde::{Deserialize, Serialize};
use crate::domain::city::{Building, City};
use crate::state::session::GameState;
use crate::utils::weapondb::WeaponStats;

/// HTTP Request/Response DTOs

#[derive(Serialize, Debug)]
pub struct SessionInfo {
    pub game_state: GameState,
    pub tick: u64,
    pub udp_port: u16,
    pub tick_rate_hz: u32,
}

#[derive(Serialize, Debug)]
pub struct CommandAccepted {
    pub accepted: bool,
}

#[derive(Serialize, Debug)]
pub struct CityInfo {
    pub size: f32,
    pub spawn_point: Vec3,
    pub building_count: usize,
    pub buildings: Vec<Building>,
}

impl From<&City> for CityInfo {
    fn from(city: &City) -> Self {
        Self {
            size: city.size(),
            spawn_point: city.spawn_point(),
            building_count: city.buildings().len(),
            buildings: city.buildings().to_vec(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct WeaponInfo {
    /// Number key that selects the weapon
    pub slot: u8,
    #[serde(flatten)]
    pub stats: WeaponStats,
}

/// Optional query for the message feed
#[derive(Deserialize, Debug, Default)]
pub struct MessagesQuery {
    pub limit: Option<usize>,
}
