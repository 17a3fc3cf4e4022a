use crate::state::session::Session;
use crate::utils::buffers::{SmallEventVec, SyncEvent};
use crate::utils::weapondb::WeaponDb;

/// Collect events for fields that changed since the last sync.
/// The first call after startup reports every field.
pub fn collect_changed_events(session: &mut Session, weapons: &WeaponDb) -> SmallEventVec {
    let mut events = SmallEventVec::new();
    let current = session.to_sync_state(weapons);
    let last = session.last_sync_state.as_ref();

    if last.map(|l| l.game_state != current.game_state).unwrap_or(true) {
        events.push(SyncEvent::GameStateChanged { state: current.game_state });
    }

    if last
        .map(|l| l.health != current.health || l.max_health != current.max_health)
        .unwrap_or(true)
    {
        events.push(SyncEvent::HealthChanged {
            health: current.health,
            max_health: current.max_health,
        });
    }

    if last.map(|l| l.score != current.score).unwrap_or(true) {
        let previous = last.map(|l| l.score).unwrap_or(0);
        events.push(SyncEvent::ScoreChanged {
            score: current.score,
            delta: current.score.saturating_sub(previous),
        });
    }

    if last.map(|l| l.weapon != current.weapon).unwrap_or(true) {
        events.push(SyncEvent::WeaponChanged { weapon: current.weapon });
    }

    // Ammo and reload follow the selected weapon, so a switch re-reports both
    if last
        .map(|l| l.weapon != current.weapon || l.ammo != current.ammo || l.max_ammo != current.max_ammo)
        .unwrap_or(true)
    {
        events.push(SyncEvent::AmmoChanged {
            weapon: current.weapon,
            ammo: current.ammo,
            max_ammo: current.max_ammo,
        });
    }

    if last
        .map(|l| l.weapon != current.weapon || l.is_reloading != current.is_reloading)
        .unwrap_or(true)
    {
        events.push(SyncEvent::ReloadChanged {
            weapon: current.weapon,
            is_reloading: current.is_reloading,
        });
    }

    if last
        .map(|l| l.is_dashing != current.is_dashing || l.dash_cooldown_ms != current.dash_cooldown_ms)
        .unwrap_or(true)
    {
        events.push(SyncEvent::DashChanged {
            is_dashing: current.is_dashing,
            dash_cooldown_ms: current.dash_cooldown_ms,
        });
    }

    session.last_sync_state = Some(current);
    events
}
