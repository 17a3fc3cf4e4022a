pub mod arsenal;
pub mod commands;
pub mod enemy;
pub mod player;
pub mod server_state;
pub mod session;
pub mod snapshot;
