//! Weapon data holder.
//!
//! A weapon is descriptive data only. The motor never reads or writes it, and
//! it owns no physics or input logic.

use bevy::prelude::*;

/// Stats of a held weapon.
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct Weapon {
    /// Name the weapon is addressed by.
    pub name: String,
    /// Entity carrying the weapon's visual model, if any.
    pub model: Option<Entity>,
    /// Shots per second.
    pub firing_speed: f32,
    /// Seconds to reload.
    pub reload_speed: f32,
    /// Melee weapons strike instead of firing.
    pub melee: bool,
    /// Whether the holder is currently shooting with it.
    pub shooting: bool,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            name: String::new(),
            model: None,
            firing_speed: 1.0,
            reload_speed: 1.0,
            melee: false,
            shooting: false,
        }
    }
}

impl Weapon {
    /// Create a ranged weapon that is not shooting.
    pub fn new(name: impl Into<String>, firing_speed: f32, reload_speed: f32) -> Self {
        Self {
            name: name.into(),
            firing_speed,
            reload_speed,
            ..default()
        }
    }

    /// Builder: attach a visual model.
    pub fn with_model(mut self, model: Entity) -> Self {
        self.model = Some(model);
        self
    }

    /// Builder: mark as a melee weapon.
    pub fn melee(mut self) -> Self {
        self.melee = true;
        self
    }
}

/// Find a weapon by name.
pub fn find_weapon<'a>(
    weapons: impl IntoIterator<Item = &'a Weapon>,
    name: &str,
) -> Option<&'a Weapon> {
    weapons.into_iter().find(|weapon| weapon.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_weapon_is_idle() {
        let weapon = Weapon::new("Pistol", 4.0, 1.5);
        assert_eq!(weapon.name, "Pistol");
        assert_eq!(weapon.firing_speed, 4.0);
        assert_eq!(weapon.reload_speed, 1.5);
        assert!(!weapon.shooting);
        assert!(!weapon.melee);
        assert!(weapon.model.is_none());
    }

    #[test]
    fn builders() {
        let model = Entity::from_raw(9);
        let weapon = Weapon::new("Knife", 2.0, 0.0).melee().with_model(model);
        assert!(weapon.melee);
        assert_eq!(weapon.model, Some(model));
    }

    #[test]
    fn find_weapon_by_name() {
        let weapons = [
            Weapon::new("Pistol", 4.0, 1.5),
            Weapon::new("Shotgun", 1.0, 3.0),
        ];
        assert_eq!(find_weapon(&weapons, "Shotgun").map(|w| w.reload_speed), Some(3.0));
        assert!(find_weapon(&weapons, "Rifle").is_none());
    }
}
