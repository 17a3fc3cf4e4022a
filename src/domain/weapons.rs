use glam::Vec3;
use rand::Rng;
use smallvec::SmallVec;
use crate::state::arsenal::Arsenal;
use crate::utils::weapondb::{WeaponDb, WeaponType};

/// Rays produced by one accepted trigger pull
#[derive(Debug, Clone)]
pub struct Shot {
    pub weapon: WeaponType,
    pub damage_per_ray: u32,
    pub range: f32,
    pub rays: SmallVec<[Vec3; 8]>,
}

/// Why a trigger pull was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireRejected {
    Reloading,
    /// Magazine empty; an automatic reload was started
    Empty,
    /// Fire-rate gate still closed
    Cooling,
}

/// Try to fire the selected weapon - validates reload state, ammo and fire rate
pub fn try_fire<R: Rng>(
    arsenal: &mut Arsenal,
    weapons: &WeaponDb,
    now: u64,
    aim: Vec3,
    rng: &mut R,
) -> Result<Shot, FireRejected> {
    let weapon = arsenal.current;
    let stats = weapons.get(weapon);
    let state = arsenal.current_state_mut();

    if state.is_reloading() {
        return Err(FireRejected::Reloading);
    }

    if state.ammo < stats.ammo_per_shot {
        state.reload_started_at = Some(now);
        return Err(FireRejected::Empty);
    }

    if let Some(last) = state.last_fire_at {
        if now.saturating_sub(last) < stats.fire_rate_ms {
            return Err(FireRejected::Cooling);
        }
    }

    state.ammo -= stats.ammo_per_shot;
    state.last_fire_at = Some(now);

    // Last round chambers a reload straight away
    if state.ammo == 0 {
        state.reload_started_at = Some(now);
    }

    let rays = (0..stats.pellets.max(1))
        .map(|_| jitter(aim, stats.spread, &mut *rng))
        .collect();

    Ok(Shot {
        weapon,
        damage_per_ray: stats.damage,
        range: stats.range,
        rays,
    })
}

/// Aim direction jittered per axis within `±spread`
fn jitter<R: Rng>(aim: Vec3, spread: f32, rng: &mut R) -> Vec3 {
    if spread <= 0.0 {
        return aim.normalize_or_zero();
    }
    let offset = Vec3::new(
        rng.gen_range(-spread..=spread),
        rng.gen_range(-spread..=spread),
        rng.gen_range(-spread..=spread),
    );
    (aim.normalize_or_zero() + offset).normalize_or_zero()
}

/// Start reloading the selected weapon
pub fn start_reload(arsenal: &mut Arsenal, weapons: &WeaponDb, now: u64) -> Result<(), &'static str> {
    let stats = weapons.get(arsenal.current);
    let state = arsenal.current_state_mut();

    if state.is_reloading() || state.ammo >= stats.max_ammo {
        return Err("Cannot reload");
    }

    state.reload_started_at = Some(now);
    Ok(())
}

/// Complete every reload whose time has elapsed, selected or not.
/// Returns the weapons that finished.
pub fn update_reloads(arsenal: &mut Arsenal, weapons: &WeaponDb, now: u64) -> SmallVec<[WeaponType; 3]> {
    let mut completed = SmallVec::new();

    for (weapon, state) in arsenal.iter_mut() {
        if let Some(started) = state.reload_started_at {
            let stats = weapons.get(weapon);
            if now.saturating_sub(started) >= stats.reload_time_ms {
                state.ammo = stats.max_ammo;
                state.reload_started_at = None;
                completed.push(weapon);
            }
        }
    }

    completed
}

/// Select a weapon; reloads in progress keep running in the background
pub fn switch_weapon(arsenal: &mut Arsenal, weapon: WeaponType) -> Result<(), &'static str> {
    if arsenal.current == weapon {
        return Err("Weapon already selected");
    }
    arsenal.current = weapon;
    Ok(())
}

/// Select by number-key slot; unknown slots are rejected
pub fn select_slot(arsenal: &mut Arsenal, slot: u8) -> Result<WeaponType, &'static str> {
    let weapon = WeaponType::from_slot(slot).ok_or("Invalid weapon slot")?;
    switch_weapon(arsenal, weapon)?;
    Ok(weapon)
}
