use std::collections::VecDeque;
use std::sync::Arc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use crate::domain::city::City;
use crate::state::arsenal::Arsenal;
use crate::state::commands::{InputFrame, PendingActions};
use crate::state::enemy::EnemyArena;
use crate::state::player::PlayerState;
use crate::utils::weapondb::{WeaponDb, WeaponType};

/// Number of flavor messages retained in the feed
pub const MESSAGE_FEED_LEN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameState {
    #[serde(rename = "START")]
    Start,
    #[serde(rename = "PLAYING")]
    Playing,
    #[serde(rename = "GAMEOVER")]
    GameOver,
}

/// Flavor-text message shown in the radio feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameMessage {
    pub id: String,
    pub text: String,
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// Fields diffed between ticks for delta sync
#[derive(Debug, Clone, PartialEq)]
pub struct SyncState {
    pub health: u32,
    pub max_health: u32,
    pub score: u32,
    pub weapon: WeaponType,
    pub ammo: u32,
    pub max_ammo: u32,
    pub is_reloading: bool,
    pub is_dashing: bool,
    pub dash_cooldown_ms: u64,
    pub game_state: GameState,
}

/// The single game session - owned exclusively by the tick task
#[derive(Debug)]
pub struct Session {
    /// Bumped on every start; tags flavor requests so stale replies can be dropped
    pub generation: u64,
    pub game_state: GameState,
    pub tick: u64,
    pub city: Arc<City>,

    pub player: PlayerState,
    pub arsenal: Arsenal,
    pub enemies: EnemyArena,
    /// Newest first
    pub messages: VecDeque<GameMessage>,

    pub input: InputFrame,
    pub pending: PendingActions,
    pub rng: ChaCha8Rng,

    pub last_tick_at: Option<u64>,
    pub last_spawn_at: u64,

    // Delta tracking for efficient state sync
    pub last_sync_state: Option<SyncState>,
}

impl Session {
    pub fn new(city: Arc<City>, weapons: &WeaponDb, seed: u64) -> Self {
        let player = PlayerState::new(city.spawn_point());
        Self {
            generation: 0,
            game_state: GameState::Start,
            tick: 0,
            city,
            player,
            arsenal: Arsenal::new(weapons),
            enemies: EnemyArena::new(),
            messages: VecDeque::with_capacity(MESSAGE_FEED_LEN),
            input: InputFrame::default(),
            pending: PendingActions::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            last_tick_at: None,
            last_spawn_at: 0,
            last_sync_state: None,
        }
    }

    /// Reset every entity and weapon to initial values and enter PLAYING.
    /// The city layout and the message feed survive restarts.
    pub fn start_new_game(&mut self, weapons: &WeaponDb, now: u64) {
        self.generation += 1;
        self.game_state = GameState::Playing;
        self.player = PlayerState::new(self.city.spawn_point());
        self.arsenal = Arsenal::new(weapons);
        self.enemies.clear();
        self.input = InputFrame::default();
        self.pending = PendingActions::default();
        self.last_spawn_at = now;
    }

    pub fn is_playing(&self) -> bool {
        self.game_state == GameState::Playing
    }

    /// Push a message to the front of the feed, trimming to the newest few
    pub fn post_message(&mut self, message: GameMessage) {
        self.messages.push_front(message);
        self.messages.truncate(MESSAGE_FEED_LEN);
    }

    pub fn to_sync_state(&self, weapons: &WeaponDb) -> SyncState {
        let weapon = self.arsenal.current;
        let state = self.arsenal.current_state();
        SyncState {
            health: self.player.health,
            max_health: self.player.max_health,
            score: self.player.score,
            weapon,
            ammo: state.ammo,
            max_ammo: weapons.get(weapon).max_ammo,
            is_reloading: state.is_reloading(),
            is_dashing: self.player.is_dashing,
            dash_cooldown_ms: self.player.dash_cooldown_ms,
            game_state: self.game_state,
        }
    }
}
