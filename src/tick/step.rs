use smallvec::SmallVec;
use crate::domain::{collision, enemies, player, weapons};
use crate::flavor::{FlavorReply, FlavorRequest};
use crate::state::commands::GameCommand;
use crate::state::session::{GameState, Session};
use crate::tick::delta_sync;
use crate::utils::buffers::{SmallEventVec, SyncEvent};
use crate::utils::config::Config;
use crate::utils::weapondb::WeaponDb;

/// Score interval that earns a radio message
pub const SCORE_MILESTONE: u32 = 100;

/// Longest frame fed to the physics step; a stalled loop catches up in time, not in distance
const MAX_FRAME_MS: u64 = 100;

/// Everything one tick consumes
#[derive(Debug, Default)]
pub struct TickInput {
    /// Monotonic milliseconds since the loop started
    pub now: u64,
    pub commands: Vec<GameCommand>,
    pub replies: Vec<FlavorReply>,
}

/// Everything one tick produces besides the mutated session
#[derive(Debug, Default)]
pub struct TickOutput {
    pub events: SmallEventVec,
    pub flavor_requests: SmallVec<[FlavorRequest; 4]>,
}

/// Advance the session by one tick.
///
/// Phases run in a fixed order: flavor replies, commands, player, weapons
/// and kills, spawning, enemy AI, dash cooldown, game-state check, delta
/// sync. Only the session is mutated; all outward effects are returned.
pub fn advance(session: &mut Session, weapon_db: &WeaponDb, config: &Config, input: TickInput) -> TickOutput {
    let mut output = TickOutput::default();
    let mut combat_events = SmallEventVec::new();
    let mut feed_events = SmallEventVec::new();

    let now = input.now;
    let elapsed_ms = session.last_tick_at.map_or(0, |last| now.saturating_sub(last));
    session.last_tick_at = Some(now);

    // 1. Flavor replies
    for reply in input.replies {
        if reply.generation != session.generation {
            log::debug!(
                "Discarding flavor reply from generation {} (current {})",
                reply.generation,
                session.generation
            );
            continue;
        }
        feed_events.push(SyncEvent::MessagePosted { message: reply.message.clone() });
        session.post_message(reply.message);
    }

    // 2. Commands
    for command in input.commands {
        apply_command(session, weapon_db, command, now);
    }

    if session.is_playing() {
        simulate(session, weapon_db, config, now, elapsed_ms, &mut combat_events, &mut output.flavor_requests);
    }

    // 9. Delta sync, then the discrete events of this tick
    output.events = delta_sync::collect_changed_events(session, weapon_db);
    output.events.extend(combat_events);
    output.events.extend(feed_events);

    session.tick += 1;
    output
}

fn apply_command(session: &mut Session, weapon_db: &WeaponDb, command: GameCommand, now: u64) {
    match command {
        GameCommand::Start => {
            session.start_new_game(weapon_db, now);
            log::info!("Game started (generation {})", session.generation);
        }
        command if !session.is_playing() => {
            log::debug!("Ignoring {:?} while {:?}", command, session.game_state);
        }
        GameCommand::Input(frame) => session.input = frame,
        GameCommand::Fire => session.pending.fire = true,
        GameCommand::Reload => session.pending.reload = true,
        GameCommand::Dash => session.pending.dash = true,
        GameCommand::SelectWeapon { slot } => session.pending.select_slot = Some(slot),
    }
}

fn simulate(
    session: &mut Session,
    weapon_db: &WeaponDb,
    config: &Config,
    now: u64,
    elapsed_ms: u64,
    combat_events: &mut SmallEventVec,
    flavor_requests: &mut SmallVec<[FlavorRequest; 4]>,
) {
    let dt_secs = elapsed_ms.min(MAX_FRAME_MS) as f32 / 1000.0;
    let actions = session.pending.take();
    let input = session.input;

    // 3. Player
    if actions.dash {
        if let Err(e) = player::try_dash(&mut session.player, &input, now) {
            log::debug!("Dash rejected: {}", e);
        }
    }
    player::update_movement(&mut session.player, &session.city, &input, now, dt_secs);

    // 4. Weapons
    if let Some(slot) = actions.select_slot {
        if let Err(e) = weapons::select_slot(&mut session.arsenal, slot) {
            log::debug!("Weapon select {} rejected: {}", slot, e);
        }
    }
    if actions.reload {
        if let Err(e) = weapons::start_reload(&mut session.arsenal, weapon_db, now) {
            log::debug!("Reload rejected: {}", e);
        }
    }
    if actions.fire {
        fire(session, weapon_db, now, combat_events);
    }
    weapons::update_reloads(&mut session.arsenal, weapon_db, now);
    award_kills(session, combat_events, flavor_requests);

    // 5. Spawning
    enemies::spawn_tick(session, config, now);

    // 6. Enemy AI, then contact damage once every enemy has moved
    let hits = enemies::update_enemies(&mut session.enemies, &session.city, session.player.position, now, dt_secs);
    for hit in hits {
        player::apply_damage(
            &mut session.player,
            &mut session.game_state,
            hit.damage,
            config.dash_grants_immunity,
        );
    }

    // 7. Dash expiry and cooldown
    player::update_dash(&mut session.player, now, elapsed_ms);

    // 8. Game state
    if session.is_playing() && !session.player.is_alive() {
        session.game_state = GameState::GameOver;
    }
}

fn fire(session: &mut Session, weapon_db: &WeaponDb, now: u64, combat_events: &mut SmallEventVec) {
    let origin = session.player.eye_position();
    let aim = session.player.aim_direction();

    let shot = match weapons::try_fire(&mut session.arsenal, weapon_db, now, aim, &mut session.rng) {
        Ok(shot) => shot,
        Err(reason) => {
            log::debug!("Fire rejected: {:?}", reason);
            return;
        }
    };

    for ray in &shot.rays {
        let Some(hit) = collision::hitscan(&session.city, &session.enemies, origin, *ray, shot.range) else {
            continue;
        };
        if let Some(enemy) = session.enemies.get_mut(hit.enemy_id) {
            enemy.take_damage(shot.damage_per_ray);
            combat_events.push(SyncEvent::EnemyHit {
                enemy_id: enemy.id,
                damage: shot.damage_per_ray,
                remaining_health: enemy.health,
            });
        }
    }
}

/// Compact dead enemies and pay out their score exactly once
fn award_kills(
    session: &mut Session,
    combat_events: &mut SmallEventVec,
    flavor_requests: &mut SmallVec<[FlavorRequest; 4]>,
) {
    let before = session.player.score;

    for (enemy_id, tier) in session.enemies.compact() {
        let points = tier.stats().score;
        session.player.score = session.player.score.saturating_add(points);
        combat_events.push(SyncEvent::EnemyKilled { enemy_id, tier, points });
        log::debug!("Enemy #{} ({:?}) killed, +{}", enemy_id, tier, points);
    }

    flavor_requests.extend(
        crossed_milestones(before, session.player.score)
            .map(|score| FlavorRequest { generation: session.generation, score }),
    );
}

/// Every multiple of the milestone in `(before, after]`
pub fn crossed_milestones(before: u32, after: u32) -> impl Iterator<Item = u32> {
    (before / SCORE_MILESTONE + 1..=after / SCORE_MILESTONE).map(|k| k * SCORE_MILESTONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use glam::Vec3;
    use crate::domain::city::{Building, City};
    use crate::flavor::new_message;
    use crate::state::enemy::EnemyTier;

    fn setup(buildings: Vec<Building>) -> (Session, WeaponDb, Config) {
        let weapons = WeaponDb::load();
        let city = Arc::new(City::from_buildings(200.0, buildings));
        (Session::new(city, &weapons, 7), weapons, Config::default())
    }

    fn tick(session: &mut Session, weapons: &WeaponDb, config: &Config, now: u64, commands: Vec<GameCommand>) -> TickOutput {
        advance(session, weapons, config, TickInput { now, commands, replies: Vec::new() })
    }

    fn started() -> (Session, WeaponDb, Config) {
        let (mut session, weapons, config) = setup(Vec::new());
        tick(&mut session, &weapons, &config, 0, vec![GameCommand::Start]);
        (session, weapons, config)
    }

    fn kills(output: &TickOutput) -> usize {
        output.events.iter().filter(|e| matches!(e, SyncEvent::EnemyKilled { .. })).count()
    }

    #[test]
    fn test_crossed_milestones() {
        assert_eq!(crossed_milestones(80, 120).collect::<Vec<_>>(), vec![100]);
        assert_eq!(crossed_milestones(95, 245).collect::<Vec<_>>(), vec![100, 200]);
        assert_eq!(crossed_milestones(100, 199).count(), 0);
        assert_eq!(crossed_milestones(0, 100).collect::<Vec<_>>(), vec![100]);
    }

    #[test]
    fn test_start_enters_playing() {
        let (mut session, weapons, config) = setup(Vec::new());
        let output = tick(&mut session, &weapons, &config, 0, vec![GameCommand::Start]);
        assert_eq!(session.game_state, GameState::Playing);
        assert!(output.events.contains(&SyncEvent::GameStateChanged { state: GameState::Playing }));
        assert_eq!(session.tick, 1);
    }

    #[test]
    fn test_commands_ignored_before_start() {
        let (mut session, weapons, config) = setup(Vec::new());
        tick(&mut session, &weapons, &config, 0, vec![GameCommand::Fire, GameCommand::SelectWeapon { slot: 2 }]);
        assert_eq!(session.arsenal.current_state().ammo, 12);
        assert_eq!(session.pending, Default::default());
        assert_eq!(session.game_state, GameState::Start);
    }

    #[test]
    fn test_fire_hits_enemy_in_front() {
        let (mut session, weapons, config) = started();
        let id = session.enemies.spawn(EnemyTier::Tank, Vec3::new(0.0, 0.0, -10.0));

        let output = tick(&mut session, &weapons, &config, 16, vec![GameCommand::Fire]);
        assert!(output.events.contains(&SyncEvent::EnemyHit { enemy_id: id, damage: 25, remaining_health: 175 }));
        assert_eq!(session.arsenal.current_state().ammo, 11);
    }

    #[test]
    fn test_occluded_enemy_takes_no_damage() {
        let wall = Building { id: 1, position: Vec3::new(0.0, 0.0, -5.0), width: 10.0, depth: 1.0, height: 20.0 };
        let (mut session, weapons, config) = setup(vec![wall]);
        tick(&mut session, &weapons, &config, 0, vec![GameCommand::Start]);
        let id = session.enemies.spawn(EnemyTier::Tank, Vec3::new(0.0, 0.0, -10.0));

        let output = tick(&mut session, &weapons, &config, 16, vec![GameCommand::Fire]);
        assert_eq!(session.enemies.get(id).unwrap().health, 200);
        assert!(!output.events.iter().any(|e| matches!(e, SyncEvent::EnemyHit { .. })));
        // The round is still spent
        assert_eq!(session.arsenal.current_state().ammo, 11);
    }

    #[test]
    fn test_kill_removes_enemy_and_awards_once() {
        let (mut session, weapons, config) = started();
        let id = session.enemies.spawn(EnemyTier::Walker, Vec3::new(0.0, 0.0, -10.0));

        tick(&mut session, &weapons, &config, 16, vec![GameCommand::Fire]);
        assert_eq!(session.enemies.get(id).unwrap().health, 25);

        let output = tick(&mut session, &weapons, &config, 416, vec![GameCommand::Fire]);
        assert_eq!(kills(&output), 1);
        assert!(session.enemies.get(id).is_none());
        assert_eq!(session.player.score, 10);

        let output = tick(&mut session, &weapons, &config, 432, Vec::new());
        assert_eq!(kills(&output), 0);
        assert_eq!(session.player.score, 10);
    }

    #[test]
    fn test_single_milestone_request() {
        let (mut session, weapons, config) = started();
        session.player.score = 80;
        let id = session.enemies.spawn(EnemyTier::Tank, Vec3::new(30.0, 0.0, 0.0));
        session.enemies.get_mut(id).unwrap().take_damage(1000);

        let output = tick(&mut session, &weapons, &config, 16, Vec::new());
        assert_eq!(session.player.score, 130);
        assert_eq!(
            output.flavor_requests.as_slice(),
            &[FlavorRequest { generation: session.generation, score: 100 }]
        );
    }

    #[test]
    fn test_request_per_boundary_crossed() {
        let (mut session, weapons, config) = started();
        session.player.score = 95;
        for x in [30.0, 35.0, 40.0] {
            let id = session.enemies.spawn(EnemyTier::Tank, Vec3::new(x, 0.0, 0.0));
            session.enemies.get_mut(id).unwrap().take_damage(1000);
        }

        let output = tick(&mut session, &weapons, &config, 16, Vec::new());
        assert_eq!(session.player.score, 245);
        let scores: Vec<u32> = output.flavor_requests.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![100, 200]);
    }

    #[test]
    fn test_stale_reply_discarded() {
        let (mut session, weapons, config) = started();
        let stale = FlavorReply { generation: session.generation - 1, message: new_message("old".to_string()) };
        let fresh = FlavorReply { generation: session.generation, message: new_message("new".to_string()) };

        let output = advance(
            &mut session,
            &weapons,
            &config,
            TickInput { now: 16, commands: Vec::new(), replies: vec![stale, fresh] },
        );

        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].text, "new");
        let posted = output.events.iter().filter(|e| matches!(e, SyncEvent::MessagePosted { .. })).count();
        assert_eq!(posted, 1);
    }

    #[test]
    fn test_contact_damage_and_game_over() {
        let (mut session, weapons, config) = started();
        session.player.health = 20;
        session.enemies.spawn(EnemyTier::Tank, Vec3::new(1.0, 0.0, 0.0));

        let output = tick(&mut session, &weapons, &config, 16, Vec::new());
        assert_eq!(session.player.health, 0);
        assert_eq!(session.game_state, GameState::GameOver);
        assert!(output.events.contains(&SyncEvent::GameStateChanged { state: GameState::GameOver }));

        // Nothing moves or takes damage once the game is over
        let position = session.player.position;
        tick(
            &mut session,
            &weapons,
            &config,
            2000,
            vec![GameCommand::Input(crate::state::commands::InputFrame { move_z: 1.0, ..Default::default() })],
        );
        assert_eq!(session.player.position, position);
        assert_eq!(session.player.health, 0);
    }

    #[test]
    fn test_spawn_after_interval() {
        let (mut session, weapons, config) = started();
        tick(&mut session, &weapons, &config, 2999, Vec::new());
        assert_eq!(session.enemies.len(), 0);
        tick(&mut session, &weapons, &config, 3000, Vec::new());
        assert_eq!(session.enemies.len(), 1);
    }

    #[test]
    fn test_restart_bumps_generation_and_keeps_feed() {
        let (mut session, weapons, config) = started();
        session.post_message(new_message("hold on".to_string()));
        let generation = session.generation;

        tick(&mut session, &weapons, &config, 100, vec![GameCommand::Start]);
        assert_eq!(session.generation, generation + 1);
        assert_eq!(session.messages.len(), 1);
    }
}
