//! Configuration constants and settings for the fox demo
//!
//! This module contains all configurable parameters such as render resolution,
//! frame rates, camera and locomotion tuning, and the preload manifest.

/// Width of the offscreen render target in pixels
pub const RENDER_WIDTH: u32 = 800;

/// Height of the offscreen render target in pixels
pub const RENDER_HEIGHT: u32 = 600;

/// Target frames per second for the Bevy render loop
pub const TARGET_FPS: f64 = 60.0;

/// Number of pre-roll frames to skip before starting output
/// This allows the render pipeline to warm up before frames are published
pub const PRE_ROLL_FRAMES: u32 = 30;

/// Third-person camera settings
pub mod camera {
    /// Rotation speed multiplier for mouse drag
    pub const ROTATION_SPEED: f32 = 0.005;

    /// Zoom speed multiplier for scroll wheel
    pub const ZOOM_SPEED: f32 = 0.5;

    /// Minimum camera distance from the character
    pub const MIN_DISTANCE: f32 = 2.0;

    /// Maximum camera distance from the character
    pub const MAX_DISTANCE: f32 = 20.0;

    /// Starting camera distance from the character
    pub const START_DISTANCE: f32 = 6.5;

    /// Starting pitch (radians), slightly looking down on the character
    pub const START_PITCH: f32 = 0.35;

    /// Maximum pitch angle (radians) to prevent camera flipping
    pub const MAX_PITCH: f32 = 1.4;

    /// Minimum pitch angle (radians); slightly below the horizon
    pub const MIN_PITCH: f32 = -0.3;

    /// Height above the character's origin the camera looks at
    pub const TARGET_HEIGHT: f32 = 1.2;

    /// Follow damping rate (1/s); higher follows more tightly
    pub const FOLLOW_DAMPING: f32 = 6.0;

    /// Field of view (degrees) for landscape viewports
    pub const FOV_LANDSCAPE_DEG: f32 = 90.0;

    /// Field of view (degrees) for portrait viewports (phones held upright)
    pub const FOV_PORTRAIT_DEG: f32 = 120.0;
}

/// Character locomotion settings
pub mod locomotion {
    /// Largest stride magnitude on either axis
    pub const MAX_STRIDE: f32 = 5.0;

    /// World units per second per stride unit
    pub const STRIDE_SPEED: f32 = 0.6;

    /// Turn rate (radians per second) toward the travel direction
    pub const TURN_RATE: f32 = 10.0;
}

/// Character animation settings
pub mod animation {
    use std::time::Duration;

    /// Cross-fade duration between idle and running
    pub const BLEND: Duration = Duration::from_millis(250);

    /// Index of the idle clip inside the character file
    pub const IDLE_CLIP: usize = 0;

    /// Index of the running clip inside the character file
    pub const RUNNING_CLIP: usize = 1;
}

/// Scene composition settings
pub mod scene {
    /// Uniform scale applied to the map model
    pub const MAP_SCALE: f32 = 3.0;

    /// Uniform scale applied to the character model
    pub const CHARACTER_SCALE: f32 = 0.02;

    /// Roughness override for map materials (better color contrast)
    pub const MAP_ROUGHNESS: f32 = 0.5;

    /// Metalness override for map materials
    pub const MAP_METALLIC: f32 = 1.0;

    /// Environment light intensity for the HDR map
    pub const ENVIRONMENT_INTENSITY: f32 = 900.0;

    /// Skybox brightness for the HDR map
    pub const SKYBOX_BRIGHTNESS: f32 = 1000.0;

    /// Number of faces stacked in the environment image
    pub const ENVIRONMENT_FACES: u32 = 6;
}

/// Assets gated behind the loading screen
pub mod preload {
    /// Map model file
    pub const MAP: &str = "Grassland.glb";

    /// Character model file (scene plus idle/running clips)
    pub const CHARACTER: &str = "Fox.glb";

    /// HDR environment used for skybox and lighting
    pub const ENVIRONMENT: &str = "env.hdr";

    /// Size hints in bytes, used to weight load progress
    pub const MAP_BYTES: u64 = 2_400_000;
    pub const CHARACTER_BYTES: u64 = 1_100_000;
    pub const ENVIRONMENT_BYTES: u64 = 1_300_000;
    /// Each animation clip is weighted separately from the character mesh
    pub const CLIP_BYTES: u64 = 400_000;
}

/// Performance monitoring settings
pub mod performance {
    /// Interval for printing performance stats (seconds)
    pub const STATS_PRINT_INTERVAL: f64 = 2.0;

    /// Number of frame timing samples to keep for averaging
    pub const FRAME_TIMING_SAMPLES: usize = 60;
}

/// Image compression settings
pub mod compression {
    /// JPEG quality level (0-100, higher = better quality but larger size)
    pub const JPEG_QUALITY: u8 = 85;
}

/// Logging settings
pub mod logging {
    /// Default tracing filter; wgpu is noisy at info
    pub const FILTER: &str = "info,wgpu=error,naga=warn,fox_meadow_lib=debug";
}
