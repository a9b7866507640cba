//! Bevy resource definitions
//!
//! This module contains all global resources used by Bevy systems.
//! Resources are singleton data that can be accessed by any system.

use bevy::{animation::graph::AnimationNodeIndex, asset::UntypedHandle, prelude::*};
use std::time::Duration;

use crate::config::camera::{START_DISTANCE, START_PITCH, TARGET_HEIGHT};
use crate::tauri_bridge::{
    SharedFrameBuffer, SharedLoadProgress, SharedMouseInput, SharedPerfStats, SharedStrideInput,
    SharedViewport,
};

// =============================================================================
// Camera Control
// =============================================================================

/// Third-person orbit state in spherical coordinates around the character
#[derive(Resource)]
pub struct OrbitCameraState {
    /// Horizontal rotation angle (radians)
    pub yaw: f32,
    /// Vertical rotation angle (radians), clamped to avoid gimbal lock
    pub pitch: f32,
    /// Distance from the camera to the center point
    pub distance: f32,
    /// Damped point the camera orbits around
    pub center: Vec3,
}

impl Default for OrbitCameraState {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: START_PITCH,
            distance: START_DISTANCE,
            center: Vec3::Y * TARGET_HEIGHT,
        }
    }
}

impl OrbitCameraState {
    /// Camera position for the current orbit
    pub fn eye(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.center + Vec3::new(x, y, z)
    }
}

/// Resource to hold shared mouse input in Bevy
#[derive(Resource)]
pub struct MouseInputRes(pub SharedMouseInput);

/// Resource to hold the frontend viewport size in Bevy
#[derive(Resource)]
pub struct ViewportRes(pub SharedViewport);

// =============================================================================
// Locomotion
// =============================================================================

/// Resource to hold the frontend's stride input in Bevy
#[derive(Resource)]
pub struct StrideInputRes(pub SharedStrideInput);

/// Animation graph for the character and its two locomotion nodes
#[derive(Resource)]
pub struct CharacterAnimations {
    pub graph: Handle<AnimationGraph>,
    pub idle: AnimationNodeIndex,
    pub running: AnimationNodeIndex,
}

// =============================================================================
// Preload
// =============================================================================

/// One asset gated behind the loading screen
pub struct PreloadEntry {
    pub label: String,
    /// Size hint used to weight progress
    pub weight: u64,
    pub handle: UntypedHandle,
}

/// Everything requested at startup, tracked until loaded
#[derive(Resource, Default)]
pub struct PreloadAssets {
    pub entries: Vec<PreloadEntry>,
    /// Highest percent reported so far
    pub best_percent: f32,
    pub failure_logged: bool,
}

/// Typed handles for spawning the scene once loading finishes
#[derive(Resource)]
pub struct SceneAssets {
    pub map: Handle<Scene>,
    pub character: Handle<Scene>,
    pub environment: Handle<Image>,
}

/// Shared load progress resource for Bevy
#[derive(Resource)]
pub struct LoadProgressRes(pub SharedLoadProgress);

// =============================================================================
// Rendering
// =============================================================================

/// Shared frame buffer resource for Bevy
#[derive(Resource, Clone)]
pub struct FrameBufferRes(pub SharedFrameBuffer);

// =============================================================================
// Frame Management
// =============================================================================

/// Counter for total frames published
#[derive(Resource, Default)]
pub struct FrameCount(pub u32);

/// Number of pre-roll frames to skip before starting output
#[derive(Resource, Default)]
pub struct PreRollFrames(pub u32);

/// Frame rate limiter to control output FPS
#[derive(Resource)]
pub struct FrameRateLimiter {
    pub last_frame_time: std::time::Instant,
    pub min_frame_interval: Duration,
}

impl FrameRateLimiter {
    pub fn new(target_fps: f64) -> Self {
        Self {
            last_frame_time: std::time::Instant::now(),
            min_frame_interval: Duration::from_secs_f64(1.0 / target_fps),
        }
    }
}

// =============================================================================
// Performance Monitoring
// =============================================================================

/// Performance timing tracker for frame processing
#[derive(Resource, Default)]
pub struct FrameTimings {
    pub last_print_time: f64,
    pub frame_times: Vec<f64>,
}

/// Shared performance statistics resource
#[derive(Resource)]
pub struct PerfStatsRes(pub SharedPerfStats);

// =============================================================================
// Channel Communication (Main World <-> Render World)
// =============================================================================

use crossbeam_channel::{Receiver, Sender};

/// Receives data from render world
#[derive(Resource, Deref)]
pub struct MainWorldReceiver(pub Receiver<Vec<u8>>);

/// Sends data to main world
#[derive(Resource, Deref)]
pub struct RenderWorldSender(pub Sender<Vec<u8>>);
