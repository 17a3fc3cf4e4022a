use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};
use crate::flavor::{FlavorReply, FlavorRequest};
use crate::state::commands::{drain_and_coalesce, SessionCommand};
use crate::state::session::Session;
use crate::state::snapshot::Snapshot;
use crate::tick::step::{self, TickInput};
use crate::utils::buffers::{PacketBuffer, SyncEvent};
use crate::utils::config::Config;
use crate::utils::weapondb::WeaponDb;

/// Channels the tick task owns for its whole life
pub struct TickChannels {
    pub command_rx: mpsc::Receiver<SessionCommand>,
    pub reply_rx: mpsc::UnboundedReceiver<FlavorReply>,
    pub request_tx: mpsc::Sender<FlavorRequest>,
    pub snapshot_tx: watch::Sender<Arc<Snapshot>>,
}

/// Session tick loop - sole owner of the session, runs at the configured rate
pub async fn game_tick_loop(
    mut session: Session,
    channels: TickChannels,
    socket: Arc<UdpSocket>,
    weapons: Arc<WeaponDb>,
    config: Arc<Config>,
) {
    let TickChannels {
        mut command_rx,
        mut reply_rx,
        request_tx,
        snapshot_tx,
    } = channels;

    let started = Instant::now();
    let mut tick_timer = interval(Duration::from_millis(config.tick_interval_ms()));
    tick_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let client_timeout = Duration::from_secs(config.client_timeout_secs);

    let mut send_buffer = PacketBuffer::default();
    let mut clients: HashMap<SocketAddr, Instant> = HashMap::new();

    loop {
        tick_timer.tick().await;

        // One clock sample per tick
        let clock = Instant::now();
        let now = clock.duration_since(started).as_millis() as u64;

        // 1. Drain commands (coalesce input - keep only latest)
        let mut commands = Vec::new();
        for cmd in drain_and_coalesce(&mut command_rx) {
            match cmd {
                SessionCommand::Game(command) => commands.push(command),
                SessionCommand::Heartbeat { addr } => {
                    if clients.insert(addr, clock).is_none() {
                        log::info!("Client {} registered for updates", addr);
                    }
                }
            }
        }

        // 2. Drain flavor replies
        let mut replies = Vec::new();
        while let Ok(reply) = reply_rx.try_recv() {
            replies.push(reply);
        }

        // 3. Simulate
        let output = step::advance(&mut session, &weapons, &config, TickInput { now, commands, replies });

        // 4. Forward flavor requests - drop if the worker is backed up
        for request in output.flavor_requests {
            if let Err(e) = request_tx.try_send(request) {
                log::warn!("Dropping flavor request for score {}: {}", request.score, e);
            }
        }

        // 5. Publish snapshot
        snapshot_tx.send_replace(Arc::new(Snapshot::capture(&session, &weapons)));

        // 6. Push events
        if !output.events.is_empty() && !clients.is_empty() {
            broadcast_events(&socket, &clients, &output.events, &mut send_buffer).await;
        }

        // 7. Forget silent clients
        clients.retain(|addr, last_seen| {
            let alive = clock.duration_since(*last_seen) < client_timeout;
            if !alive {
                log::info!("Client {} timed out", addr);
            }
            alive
        });
    }
}

/// Send each event as its own JSON datagram to every registered client
async fn broadcast_events(
    socket: &UdpSocket,
    clients: &HashMap<SocketAddr, Instant>,
    events: &[SyncEvent],
    buffer: &mut PacketBuffer,
) {
    for event in events {
        let data = match buffer.encode(event) {
            Ok(data) => data,
            Err(e) => {
                log::error!("Failed to encode {:?}: {}", event, e);
                continue;
            }
        };

        for addr in clients.keys() {
            if let Err(e) = socket.send_to(data, *addr).await {
                log::debug!("Failed to send event to {}: {:?}", addr, e);
            }
        }
    }
}
