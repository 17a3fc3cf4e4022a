use crate::utils::weapondb::{WeaponDb, WeaponType};

/// Runtime state of one weapon; survives weapon switches
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponState {
    pub ammo: u32,
    pub last_fire_at: Option<u64>,
    pub reload_started_at: Option<u64>,
}

impl WeaponState {
    pub fn is_reloading(&self) -> bool {
        self.reload_started_at.is_some()
    }
}

/// Every weapon the player carries plus the selected one
#[derive(Debug, Clone)]
pub struct Arsenal {
    pub current: WeaponType,
    slots: [WeaponState; 3],
}

impl Arsenal {
    /// Full magazines, nothing fired, default weapon selected
    pub fn new(weapons: &WeaponDb) -> Self {
        let full = |weapon: WeaponType| WeaponState {
            ammo: weapons.get(weapon).max_ammo,
            last_fire_at: None,
            reload_started_at: None,
        };
        Self {
            current: WeaponDb::default_weapon(),
            slots: WeaponType::ALL.map(full),
        }
    }

    pub fn state(&self, weapon: WeaponType) -> &WeaponState {
        &self.slots[weapon.index()]
    }

    pub fn state_mut(&mut self, weapon: WeaponType) -> &mut WeaponState {
        &mut self.slots[weapon.index()]
    }

    pub fn current_state(&self) -> &WeaponState {
        self.state(self.current)
    }

    pub fn current_state_mut(&mut self) -> &mut WeaponState {
        self.state_mut(self.current)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (WeaponType, &mut WeaponState)> {
        WeaponType::ALL.into_iter().zip(self.slots.iter_mut())
    }
}
