pub mod delta_sync;
pub mod game_tick;
pub mod step;
