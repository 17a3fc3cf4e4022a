use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use log::info;
use tokio::net::{TcpListener, UdpSocket};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use crate::domain::city::City;
use crate::flavor::{spawn_flavor_worker, FlavorTextSource};
use crate::handlers::http::{get_city, get_messages, get_snapshot, list_weapons, post_command, start_game, AppState};
use crate::handlers::udp::handle_udp_packet;
use crate::state::commands::SessionCommand;
use crate::state::server_state::{ServerState, SessionHandle};
use crate::state::session::Session;
use crate::state::snapshot::Snapshot;
use crate::tick::game_tick::{game_tick_loop, TickChannels};
use crate::utils::config::Config;
use crate::utils::weapondb::WeaponDb;

const COMMAND_QUEUE_CAPACITY: usize = 1000;

/// Start HTTP and UDP servers
pub async fn start_servers(
    state: Arc<ServerState>,
    weapons: Arc<WeaponDb>,
    config: Arc<Config>,
    udp_socket: Arc<UdpSocket>,
) -> Result<(), Box<dyn std::error::Error>> {
    let http_server = init_http_server(state.clone(), weapons, config);
    let udp_server = init_udp_server(state, udp_socket);

    tokio::try_join!(http_server, udp_server)?;
    Ok(())
}

/// Build the HTTP router
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/game/start", post(start_game))
        .route("/game/command", post(post_command))
        .route("/game/snapshot", get(get_snapshot))
        .route("/game/city", get(get_city))
        .route("/game/messages", get(get_messages))
        .route("/weapons", get(list_weapons))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Initialize HTTP server
fn init_http_server(
    state: Arc<ServerState>,
    weapons: Arc<WeaponDb>,
    config: Arc<Config>,
) -> tokio::task::JoinHandle<()> {
    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let app = router(AppState { state, weapons, config });
    info!("Starting HTTP server on {}", http_addr);

    tokio::spawn(async move {
        let listener = match TcpListener::bind(&http_addr).await {
            Ok(listener) => {
                info!("HTTP server successfully bound to {}", http_addr);
                listener
            }
            Err(e) => {
                log::error!("Failed to bind HTTP server to {}: {}", http_addr, e);
                return;
            }
        };

        if let Err(e) = axum::serve(listener, app).await {
            log::error!("HTTP server error: {}", e);
        }
    })
}

/// Initialize UDP server
fn init_udp_server(state: Arc<ServerState>, socket: Arc<UdpSocket>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut buf = [0u8; 1024];

        loop {
            match socket.recv_from(&mut buf).await {
                Ok((len, addr)) => {
                    // Invalid JSON still refreshes the sender as a heartbeat
                    let packet = serde_json::from_slice::<serde_json::Value>(&buf[..len])
                        .unwrap_or(serde_json::Value::Null);
                    handle_udp_packet(packet, addr, &state);
                }
                Err(e) => {
                    log::error!("UDP recv error: {}", e);
                }
            }
        }
    })
}

/// Create the game session and spawn its tick loop and flavor worker.
/// Must be called from within the runtime.
pub fn create_session_with_tick(
    city: Arc<City>,
    weapons: Arc<WeaponDb>,
    config: Arc<Config>,
    socket: Arc<UdpSocket>,
    flavor_source: Arc<dyn FlavorTextSource>,
) -> ServerState {
    let seed = config.seed.unwrap_or_else(rand::random);
    let session = Session::new(city.clone(), &weapons, seed);

    // Create channels
    let (command_tx, command_rx) = mpsc::channel::<SessionCommand>(COMMAND_QUEUE_CAPACITY);
    let (request_tx, request_rx) = mpsc::channel(config.flavor_queue_capacity.max(1));
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Snapshot::capture(&session, &weapons)));

    let flavor_handle = spawn_flavor_worker(flavor_source, request_rx, reply_tx, config.flavor_timeout_ms);

    // Spawn tick loop
    let channels = TickChannels {
        command_rx,
        reply_rx,
        request_tx,
        snapshot_tx,
    };
    let task_handle = tokio::spawn(game_tick_loop(session, channels, socket, weapons, config));

    ServerState::new(SessionHandle {
        command_tx,
        snapshot_rx,
        city,
        task_handle,
        flavor_handle,
    })
}
