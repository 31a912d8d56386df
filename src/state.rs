//! State marker components.
//!
//! These components mirror the motor's state so other systems can filter on
//! it with plain queries. They are added and removed automatically by
//! [`sync_state_markers`](crate::systems::sync_state_markers) every frame.

use bevy::prelude::*;

/// Marker component indicating the character is grounded.
///
/// Present when this frame's ground probe hit a surface in the motor's
/// ground layers. Mutually exclusive with [`Airborne`].
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use fps_character_motor::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Marker component indicating the character is crouching.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Crouching;
