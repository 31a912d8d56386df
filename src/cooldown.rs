//! Jump cooldown timer service.
//!
//! A jump schedules a one-shot [`JumpCooldownElapsed`] message. The plugin
//! ticks pending entries at the start of every frame and the handler re-arms
//! the jump of the motor the message names, if that motor still exists.

use std::time::Duration;

use bevy::prelude::*;

use crate::motor::CharacterMotor;

/// Sent once when a jump cooldown has elapsed.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpCooldownElapsed {
    /// The actor whose jump cooldown elapsed.
    pub entity: Entity,
}

#[derive(Debug, Clone)]
struct ScheduledReset {
    entity: Entity,
    timer: Timer,
}

/// Pending jump cooldowns, one per actor at most.
#[derive(Resource, Debug, Default)]
pub struct JumpCooldowns {
    pending: Vec<ScheduledReset>,
}

impl JumpCooldowns {
    /// Schedule a cooldown for `entity`, replacing any pending one.
    pub fn schedule(&mut self, entity: Entity, delay_secs: f32) {
        self.cancel(entity);
        self.pending.push(ScheduledReset {
            entity,
            timer: Timer::from_seconds(delay_secs.max(0.0), TimerMode::Once),
        });
    }

    /// Drop the pending cooldown of `entity`. Returns whether one was pending.
    pub fn cancel(&mut self, entity: Entity) -> bool {
        let before = self.pending.len();
        self.pending.retain(|reset| reset.entity != entity);
        self.pending.len() != before
    }

    /// Check whether `entity` has a pending cooldown.
    pub fn is_pending(&self, entity: Entity) -> bool {
        self.pending.iter().any(|reset| reset.entity == entity)
    }

    /// Seconds left on the pending cooldown of `entity`.
    pub fn remaining_secs(&self, entity: Entity) -> Option<f32> {
        self.pending
            .iter()
            .find(|reset| reset.entity == entity)
            .map(|reset| reset.timer.remaining_secs())
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advance every pending timer and remove the ones that finished.
    ///
    /// Returns the entities whose cooldown elapsed, in scheduling order.
    pub fn tick(&mut self, delta: Duration) -> Vec<Entity> {
        let mut elapsed = Vec::new();
        self.pending.retain_mut(|reset| {
            reset.timer.tick(delta);
            if reset.timer.finished() {
                elapsed.push(reset.entity);
                false
            } else {
                true
            }
        });
        elapsed
    }
}

/// Advance pending cooldowns and announce the ones that elapsed.
pub fn tick_jump_cooldowns(
    time: Res<Time>,
    mut cooldowns: ResMut<JumpCooldowns>,
    mut elapsed: EventWriter<JumpCooldownElapsed>,
) {
    if cooldowns.is_empty() {
        return;
    }
    for entity in cooldowns.tick(time.delta()) {
        elapsed.write(JumpCooldownElapsed { entity });
    }
}

/// Re-arm the jump of every motor whose cooldown elapsed.
///
/// Messages for actors that were despawned (or lost their motor) are ignored.
pub fn on_jump_cooldown_elapsed(
    mut events: EventReader<JumpCooldownElapsed>,
    mut motors: Query<&mut CharacterMotor>,
) {
    for event in events.read() {
        let Ok(mut motor) = motors.get_mut(event.entity) else {
            debug!(
                "Jump cooldown elapsed for {:?}, which no longer has a motor",
                event.entity
            );
            continue;
        };
        if motor.finish_jump_cooldown() {
            debug!("Jump ready again for {:?}", event.entity);
        }
    }
}
