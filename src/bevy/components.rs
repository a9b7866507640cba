//! Bevy component definitions
//!
//! This module contains all component markers and data structures used
//! to tag and identify entities in the Bevy ECS (Entity Component System).

use bevy::prelude::*;

use crate::controls::Stride;

/// Marker component for the offscreen camera that follows the player
///
/// Entities with this component render to the frame target, orbit the player on mouse drag and
/// trail it with damping.
#[derive(Component)]
pub struct ThirdPersonCamera;

/// Marker component for the controllable character
#[derive(Component)]
pub struct Player;

/// Stride the character is currently walking with
#[derive(Component, Default, Debug, Clone, Copy, PartialEq)]
pub struct StrideMove(pub Stride);

/// Heading (radians around +Y) the character is turned toward
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct Facing(pub f32);

/// Which locomotion clip a character's animation player is running
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocomotionClip {
    Idle,
    Running,
}

/// Marker for the map scene root; its materials get tuned once spawned
#[derive(Component)]
pub struct MapModel;

