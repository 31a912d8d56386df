//! Motor input component.
//!
//! [`MotorInput`] is the only input surface the motor reads. The host fills
//! it from whatever device or AI it likes; the motor only assumes axes in
//! `[-1, 1]` and edge-triggered booleans.

use bevy::prelude::*;

/// Raw input for one frame.
///
/// Axes persist until overwritten. Edge flags are consumed by the motor and
/// cleared at the end of the frame in [`MotorSet::Cleanup`](crate::MotorSet).
///
/// # Example
///
/// ```rust
/// use fps_character_motor::prelude::*;
///
/// let mut input = MotorInput::new();
/// input.set_axes(0.0, 1.0);
/// input.press_jump();
/// assert!(input.is_moving());
/// assert!(input.jump_pressed);
///
/// input.clear_edges();
/// assert!(!input.jump_pressed);
/// assert!(input.is_moving());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct MotorInput {
    /// Strafe axis (-1.0 = left, 1.0 = right).
    pub horizontal: f32,
    /// Forward axis (-1.0 = back, 1.0 = forward).
    pub vertical: f32,
    /// Jump key went down this frame.
    pub jump_pressed: bool,
    /// Flashlight key went down this frame.
    pub flashlight_pressed: bool,
    /// Crouch key went down this frame.
    pub crouch_pressed: bool,
    /// Crouch key went up this frame.
    pub crouch_released: bool,
}

impl MotorInput {
    /// Create an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both movement axes. Values are clamped to `[-1, 1]`.
    pub fn set_axes(&mut self, horizontal: f32, vertical: f32) {
        self.horizontal = clamp_axis(horizontal);
        self.vertical = clamp_axis(vertical);
    }

    /// Record a jump press edge.
    pub fn press_jump(&mut self) {
        self.jump_pressed = true;
    }

    /// Record a flashlight press edge.
    pub fn press_flashlight(&mut self) {
        self.flashlight_pressed = true;
    }

    /// Record a crouch press edge.
    pub fn press_crouch(&mut self) {
        self.crouch_pressed = true;
    }

    /// Record a crouch release edge.
    pub fn release_crouch(&mut self) {
        self.crouch_released = true;
    }

    /// Check if there is any movement input.
    pub fn is_moving(&self) -> bool {
        self.horizontal.abs() > 0.001 || self.vertical.abs() > 0.001
    }

    /// Clear the edge flags, keeping the axes.
    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.flashlight_pressed = false;
        self.crouch_pressed = false;
        self.crouch_released = false;
    }

    /// Clear everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}
