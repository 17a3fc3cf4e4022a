use glam::Vec3;

pub const MAX_HEALTH: u32 = 100;
pub const PLAYER_RADIUS: f32 = 0.5;
pub const EYE_HEIGHT: f32 = 1.6;

/// Player state for the running game
#[derive(Debug, Clone)]
pub struct PlayerState {
    /// Feet position; y = 0 is the street
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,

    // Health state
    pub health: u32,
    pub max_health: u32,
    pub score: u32,

    // Dash state
    pub is_dashing: bool,
    pub dash_ends_at: Option<u64>,
    pub dash_cooldown_ms: u64,
    pub dash_direction: Vec3,
}

impl PlayerState {
    pub fn new(spawn: Vec3) -> Self {
        Self {
            position: spawn,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: true,
            health: MAX_HEALTH,
            max_health: MAX_HEALTH,
            score: 0,
            is_dashing: false,
            dash_ends_at: None,
            dash_cooldown_ms: 0,
            dash_direction: Vec3::ZERO,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::new(0.0, EYE_HEIGHT, 0.0)
    }

    /// Unit look vector; yaw 0 faces -Z
    pub fn aim_direction(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    /// Horizontal forward and right axes for movement input
    pub fn movement_basis(&self) -> (Vec3, Vec3) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let forward = Vec3::new(-sin_yaw, 0.0, -cos_yaw);
        let right = Vec3::new(cos_yaw, 0.0, -sin_yaw);
        (forward, right)
    }
}
