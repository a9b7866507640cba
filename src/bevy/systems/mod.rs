//! Bevy systems
//!
//! This module contains all the game systems that operate on entities
//! and resources in the Bevy ECS.

pub mod preload;
pub mod scene;
pub mod locomotion;
pub mod camera;
pub mod animation;
pub mod frame_extraction;

pub use preload::{start_preload, track_preload};
pub use scene::{attach_environment, setup_render_target, spawn_world, tune_map_materials};
pub use locomotion::{apply_stride_input, move_character};
pub use camera::{update_camera_fov, update_camera_from_input};
pub use animation::{start_locomotion_animation, switch_locomotion_animation};
pub use frame_extraction::extract_and_process_frame;
