//! Core motor systems.
//!
//! These systems implement the per-frame state machine and the per-step
//! force engine. They are generic over the physics backend so the same
//! logic runs on any engine. Backend calls need the whole world, so most of
//! them are exclusive systems that collect the work first and then apply it
//! entity by entity.

use bevy::prelude::*;

use crate::backend::MotorPhysicsBackend;
use crate::config::{GroundLayers, MotorOrientation, OrientationSource};
use crate::cooldown::JumpCooldowns;
use crate::intent::MotorInput;
use crate::motor::{clamp_horizontal_speed, CharacterMotor, Flashlight};
use crate::state::{Airborne, Crouching, Grounded};

/// Seed the cached collider height of motors on their first frame.
pub fn activate_motors<B: MotorPhysicsBackend>(world: &mut World) {
    let entities: Vec<Entity> = world
        .query::<(Entity, &CharacterMotor)>()
        .iter(world)
        .filter(|(_, motor)| !motor.activated)
        .map(|(e, _)| e)
        .collect();

    for entity in entities {
        let height = B::get_collider_height(world, entity);
        let Some(mut motor) = world.get_mut::<CharacterMotor>(entity) else {
            continue;
        };

        match height {
            Some(height) => motor.refresh_collider_height(height),
            None => warn!(
                "Motor {:?} has no measurable collider, probing with player height {}",
                entity,
                motor.config().player_height
            ),
        }
        motor.activated = true;
        debug!(
            "Motor {:?} activated (height {}, run speed {}, crouch speed {})",
            entity,
            motor.collider_height(),
            motor.running_speed(),
            motor.crouch_speed()
        );
    }
}

/// Copy [`MotorOrientation`] from the entity named by [`OrientationSource`].
pub fn sync_orientation_from_source(
    mut q_motors: Query<(&OrientationSource, &mut MotorOrientation)>,
    q_sources: Query<&GlobalTransform>,
) {
    for (source, mut orientation) in &mut q_motors {
        if let Ok(transform) = q_sources.get(source.0) {
            *orientation = MotorOrientation::from_transform(transform);
        }
    }
}

/// Probe for ground under every motor.
///
/// The ray starts at the actor's origin and points straight down, with a
/// length of half the cached collider height plus the skin margin. The
/// result overwrites the grounded flag every frame, with no debounce.
pub fn update_ground_state<B: MotorPhysicsBackend>(world: &mut World) {
    let probes: Vec<(Entity, f32, GroundLayers)> = world
        .query::<(Entity, &CharacterMotor)>()
        .iter(world)
        .map(|(e, motor)| (e, motor.ground_probe_length(), motor.config().ground_layers))
        .collect();

    for (entity, probe_length, layers) in probes {
        let origin = B::get_position(world, entity);
        let grounded = B::raycast(world, origin, Vec3::NEG_Y, probe_length, entity, layers).is_some();

        if let Some(mut motor) = world.get_mut::<CharacterMotor>(entity) {
            motor.set_grounded(grounded);
        }
    }
}

/// Run the jump, flashlight and crouch transitions from this frame's input.
///
/// Ends by refreshing the cached collider height from the live collider, so
/// next frame's ground probe matches the current stance.
pub fn interpret_motor_input<B: MotorPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, MotorInput, Option<Flashlight>)> = world
        .query_filtered::<(Entity, &MotorInput, Option<&Flashlight>), With<CharacterMotor>>()
        .iter(world)
        .map(|(e, input, flashlight)| (e, *input, flashlight.copied()))
        .collect();

    for (entity, input, flashlight) in entities {
        // Axes and jump
        let (jumped, cooldown) = {
            let Some(mut motor) = world.get_mut::<CharacterMotor>(entity) else {
                continue;
            };
            motor.set_input_axes(input.horizontal, input.vertical);
            (motor.begin_jump(input.jump_pressed), motor.config().jump_cooldown)
        };
        if jumped {
            perform_jump::<B>(world, entity);
            if let Some(mut cooldowns) = world.get_resource_mut::<JumpCooldowns>() {
                cooldowns.schedule(entity, cooldown);
            }
        }

        // Flashlight
        if input.flashlight_pressed {
            toggle_flashlight(world, entity, flashlight);
        }

        // Crouch
        let live_height = B::get_collider_height(world, entity);
        let new_height = {
            let Some(mut motor) = world.get_mut::<CharacterMotor>(entity) else {
                continue;
            };
            let height = live_height.unwrap_or(motor.collider_height());
            let new_height = if !motor.is_crouching() && input.crouch_pressed {
                motor.crouch(height)
            } else if motor.is_crouching() && input.crouch_released {
                motor.stand(height)
            } else {
                None
            };
            if let Some(new_height) = new_height {
                debug!(
                    "Motor {:?} is now {:?} (height {} -> {})",
                    entity,
                    motor.stance(),
                    height,
                    new_height
                );
            }
            new_height
        };
        if let Some(new_height) = new_height {
            B::set_collider_height(world, entity, new_height);
        }

        // Cached height always follows the live collider
        let refreshed = B::get_collider_height(world, entity).or(new_height);
        if let (Some(height), Some(mut motor)) = (refreshed, world.get_mut::<CharacterMotor>(entity)) {
            motor.refresh_collider_height(height);
        }
    }
}

/// Zero the vertical velocity, then kick along the actor's up axis.
fn perform_jump<B: MotorPhysicsBackend>(world: &mut World, entity: Entity) {
    let velocity = B::get_velocity(world, entity);
    B::set_velocity(world, entity, Vec3::new(velocity.x, 0.0, velocity.z));

    let up = B::get_up(world, entity);
    let Some(impulse) = world
        .get::<CharacterMotor>(entity)
        .map(|motor| motor.jump_impulse(up))
    else {
        return;
    };
    B::apply_impulse(world, entity, impulse);
    debug!("Motor {:?} jumped with impulse {}", entity, impulse);
}

fn toggle_flashlight(world: &mut World, entity: Entity, flashlight: Option<Flashlight>) {
    let on = {
        let Some(mut motor) = world.get_mut::<CharacterMotor>(entity) else {
            return;
        };
        let on = motor.toggle_flashlight();
        if motor.config().log_flashlight_toggles {
            info!("{}", if on { "Flashlight ON" } else { "Flashlight OFF" });
        }
        on
    };

    let Some(Flashlight(target)) = flashlight else {
        return;
    };
    if let Some(mut visibility) = world.get_mut::<Visibility>(target) {
        *visibility = if on {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

/// Apply ground drag while grounded and no drag while airborne.
pub fn apply_ground_drag<B: MotorPhysicsBackend>(world: &mut World) {
    let drags: Vec<(Entity, f32)> = world
        .query::<(Entity, &CharacterMotor)>()
        .iter(world)
        .map(|(e, motor)| (e, motor.drag()))
        .collect();

    for (entity, drag) in drags {
        B::set_linear_drag(world, entity, drag);
    }
}

/// Sync state marker components with the motor state.
pub fn sync_state_markers(
    mut commands: Commands,
    q_motors: Query<(
        Entity,
        &CharacterMotor,
        Has<Grounded>,
        Has<Airborne>,
        Has<Crouching>,
    )>,
) {
    for (entity, motor, has_grounded, has_airborne, has_crouching) in &q_motors {
        // Sync Grounded/Airborne
        if motor.is_grounded() && !has_grounded {
            commands.entity(entity).insert(Grounded).remove::<Airborne>();
        } else if !motor.is_grounded() && !has_airborne {
            commands.entity(entity).insert(Airborne).remove::<Grounded>();
        }

        // Sync Crouching
        if motor.is_crouching() && !has_crouching {
            commands.entity(entity).insert(Crouching);
        } else if !motor.is_crouching() && has_crouching {
            commands.entity(entity).remove::<Crouching>();
        }
    }
}

/// Consume this frame's input edges.
pub fn clear_motor_input(mut q_inputs: Query<&mut MotorInput>) {
    for mut input in &mut q_inputs {
        if input.jump_pressed
            || input.flashlight_pressed
            || input.crouch_pressed
            || input.crouch_released
        {
            input.clear_edges();
        }
    }
}

/// Cap horizontal speed at the current move speed.
///
/// Runs before the movement force so the cap applies to the velocity the
/// physics step starts from. Vertical velocity is left alone.
pub fn limit_horizontal_speed<B: MotorPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, f32)> = world
        .query::<(Entity, &CharacterMotor)>()
        .iter(world)
        .map(|(e, motor)| (e, motor.move_speed()))
        .collect();

    for (entity, max_speed) in entities {
        let velocity = B::get_velocity(world, entity);
        if let Some(limited) = clamp_horizontal_speed(velocity, max_speed) {
            B::set_velocity(world, entity, limited);
        }
    }
}

/// Apply the movement force for this physics step.
pub fn apply_movement_force<B: MotorPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, MotorOrientation)> = world
        .query::<(Entity, &CharacterMotor, Option<&MotorOrientation>)>()
        .iter(world)
        .map(|(e, _, orientation)| (e, orientation.copied().unwrap_or_default()))
        .collect();

    for (entity, orientation) in entities {
        let force = {
            let Some(mut motor) = world.get_mut::<CharacterMotor>(entity) else {
                continue;
            };
            motor.movement_force(&orientation)
        };
        B::apply_force(world, entity, force);
    }
}
