use std::net::SocketAddr;
use serde::Deserialize;
use tokio::sync::mpsc;

/// Continuous input sampled once per tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputFrame {
    /// Strafe axis, right positive
    pub move_x: f32,
    /// Forward axis, forward positive
    pub move_z: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub jump: bool,
}

/// Inbound command from the presentation/input layer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameCommand {
    /// Start or restart the game
    Start,
    Input(InputFrame),
    Fire,
    Reload,
    Dash,
    SelectWeapon { slot: u8 },
}

/// Command sent from network handlers to the tick loop
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Game(GameCommand),
    /// Registers or refreshes a client for event pushes
    Heartbeat { addr: SocketAddr },
}

/// Edge-triggered actions latched until the next tick consumes them
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PendingActions {
    pub fire: bool,
    pub reload: bool,
    pub dash: bool,
    pub select_slot: Option<u8>,
}

impl PendingActions {
    pub fn take(&mut self) -> PendingActions {
        std::mem::take(self)
    }
}

/// Drain the queue, keeping only the latest input frame.
/// Discrete commands keep their order; the surviving input goes last.
pub fn drain_and_coalesce(rx: &mut mpsc::Receiver<SessionCommand>) -> Vec<SessionCommand> {
    let mut latest_input: Option<SessionCommand> = None;
    let mut other_commands: Vec<SessionCommand> = Vec::new();

    while let Ok(cmd) = rx.try_recv() {
        match cmd {
            SessionCommand::Game(GameCommand::Input(_)) => latest_input = Some(cmd),
            _ => other_commands.push(cmd),
        }
    }

    other_commands.extend(latest_input);
    other_commands
}
