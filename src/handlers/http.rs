use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use std::sync::Arc;
use crate::handlers::models::{CityInfo, CommandAccepted, MessagesQuery, SessionInfo, WeaponInfo};
use crate::state::commands::{GameCommand, SessionCommand};
use crate::state::server_state::ServerState;
use crate::state::session::GameMessage;
use crate::state::snapshot::Snapshot;
use crate::utils::config::Config;
use crate::utils::weapondb::WeaponDb;

/// App state for HTTP handlers (includes server state and dependencies)
#[derive(Clone)]
pub struct AppState {
    pub state: Arc<ServerState>,
    pub weapons: Arc<WeaponDb>,
    pub config: Arc<Config>,
}

fn session_info(app_state: &AppState) -> SessionInfo {
    let snapshot = app_state.state.latest_snapshot();
    SessionInfo {
        game_state: snapshot.game_state,
        tick: snapshot.tick,
        udp_port: app_state.config.udp_port,
        tick_rate_hz: app_state.config.tick_rate_hz,
    }
}

fn enqueue(app_state: &AppState, command: GameCommand) -> Result<(), StatusCode> {
    app_state.state.submit(SessionCommand::Game(command)).map_err(|e| {
        log::warn!("Rejected HTTP command: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })
}

/// Thin HTTP handler: Start or restart the game
///
/// The start is applied on the next tick; the returned state is the one
/// published before it.
pub async fn start_game(State(app_state): State<AppState>) -> Result<Json<SessionInfo>, StatusCode> {
    enqueue(&app_state, GameCommand::Start)?;
    Ok(Json(session_info(&app_state)))
}

/// Thin HTTP handler: Submit any game command
pub async fn post_command(
    State(app_state): State<AppState>,
    Json(command): Json<GameCommand>,
) -> Result<(StatusCode, Json<CommandAccepted>), StatusCode> {
    enqueue(&app_state, command)?;
    Ok((StatusCode::ACCEPTED, Json(CommandAccepted { accepted: true })))
}

/// Thin HTTP handler: Latest published snapshot
pub async fn get_snapshot(State(app_state): State<AppState>) -> Json<Snapshot> {
    Json(app_state.state.latest_snapshot().as_ref().clone())
}

/// Thin HTTP handler: City layout for the renderer
pub async fn get_city(State(app_state): State<AppState>) -> Json<CityInfo> {
    Json(CityInfo::from(app_state.state.city().as_ref()))
}

/// Thin HTTP handler: Radio message feed, newest first
pub async fn get_messages(
    State(app_state): State<AppState>,
    Query(query): Query<MessagesQuery>,
) -> Json<Vec<GameMessage>> {
    let snapshot = app_state.state.latest_snapshot();
    let limit = query.limit.unwrap_or(snapshot.messages.len());
    Json(snapshot.messages.iter().take(limit).cloned().collect())
}

/// Thin HTTP handler: Weapon table
pub async fn list_weapons(State(app_state): State<AppState>) -> Json<Vec<WeaponInfo>> {
    Json(
        app_state
            .weapons
            .iter()
            .map(|stats| WeaponInfo {
                slot: stats.weapon.index() as u8 + 1,
                stats: stats.clone(),
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::{mpsc, watch};
    use crate::domain::city::City;
    use crate::state::server_state::SessionHandle;
    use crate::state::session::{GameState, Session};

    fn app_state() -> (AppState, mpsc::Receiver<SessionCommand>) {
        let weapons = Arc::new(WeaponDb::load());
        let city = Arc::new(crate::domain::city::generate(200.0, 10, 4));
        let session = Session::new(city.clone(), &weapons, 1);
        let (command_tx, command_rx) = mpsc::channel(8);
        let (_snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Snapshot::capture(&session, &weapons)));

        let handle = SessionHandle {
            command_tx,
            snapshot_rx,
            city,
            task_handle: tokio::spawn(async {}),
            flavor_handle: tokio::spawn(async {}),
        };
        let app_state = AppState {
            state: Arc::new(ServerState::new(handle)),
            weapons,
            config: Arc::new(Config::default()),
        };
        (app_state, command_rx)
    }

    #[tokio::test]
    async fn test_start_enqueues_command() {
        let (app_state, mut rx) = app_state();
        let Json(info) = start_game(State(app_state)).await.unwrap();
        assert_eq!(info.game_state, GameState::Start);
        assert_eq!(info.udp_port, 8081);
        assert!(matches!(rx.recv().await, Some(SessionCommand::Game(GameCommand::Start))));
    }

    #[tokio::test]
    async fn test_post_command() {
        let (app_state, mut rx) = app_state();
        let (status, _) = post_command(State(app_state), Json(GameCommand::SelectWeapon { slot: 3 }))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(matches!(
            rx.recv().await,
            Some(SessionCommand::Game(GameCommand::SelectWeapon { slot: 3 }))
        ));
    }

    #[tokio::test]
    async fn test_full_queue_is_unavailable() {
        let (app_state, _rx) = app_state();
        for _ in 0..8 {
            enqueue(&app_state, GameCommand::Fire).unwrap();
        }
        let result = start_game(State(app_state)).await;
        assert_eq!(result.unwrap_err(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_city_and_weapons() {
        let (app_state, _rx) = app_state();
        let Json(city) = get_city(State(app_state.clone())).await;
        assert_eq!(city.size, 200.0);
        assert_eq!(city.building_count, city.buildings.len());

        let Json(weapons) = list_weapons(State(app_state)).await;
        let slots: Vec<u8> = weapons.iter().map(|w| w.slot).collect();
        assert_eq!(slots, vec![1, 2, 3]);
        assert_eq!(weapons[2].stats.pellets, 8);
    }

    #[tokio::test]
    async fn test_snapshot_and_empty_feed() {
        let (app_state, _rx) = app_state();
        let Json(snapshot) = get_snapshot(State(app_state.clone())).await;
        assert_eq!(snapshot.tick, 0);

        let Json(messages) = get_messages(State(app_state), Query(MessagesQuery::default())).await;
        assert!(messages.is_empty());
    }

    #[test]
    fn test_city_info_from_city() {
        let city = City::from_buildings(50.0, Vec::new());
        let info = CityInfo::from(&city);
        assert_eq!(info.building_count, 0);
        assert_eq!(info.spawn_point, glam::Vec3::ZERO);
    }
}
