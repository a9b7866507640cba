//! Bevy application setup and execution
//!
//! This module handles the creation and configuration of the Bevy app,
//! including plugin registration, states and system scheduling.

use bevy::{
    app::{App, ScheduleRunnerPlugin},
    log::{info, Level, LogPlugin},
    prelude::*,
    window::ExitCondition,
};
use std::thread;
use std::time::Duration;

use crate::bevy::plugins::ImageCopyPlugin;
use crate::bevy::resources::*;
use crate::bevy::state::AppState;
use crate::bevy::systems::*;
use crate::config::{logging, PRE_ROLL_FRAMES, TARGET_FPS};
use crate::tauri_bridge::SharedState;

/// Create and configure the Bevy application
pub fn create_app(shared: SharedState) -> App {
    let mut app = App::new();

    // Use DefaultPlugins but configure for headless operation
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: None,
                exit_condition: ExitCondition::DontExit,
                ..default()
            })
            .set(LogPlugin {
                filter: logging::FILTER.to_string(),
                level: Level::INFO,
                ..default()
            }),
    );

    // Add schedule runner for controlled frame rate
    app.add_plugins(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
        1.0 / TARGET_FPS,
    )));

    app.add_plugins(ImageCopyPlugin);
    app.init_state::<AppState>();

    // Preload gate
    app.add_systems(Startup, (setup_render_target, start_preload));
    app.add_systems(Update, track_preload.run_if(in_state(AppState::Loading)));
    app.add_systems(OnEnter(AppState::InGame), (spawn_world, attach_environment));

    // Character, camera and animation
    app.add_systems(
        Update,
        (
            apply_stride_input,
            move_character,
            update_camera_from_input,
        )
            .chain()
            .run_if(in_state(AppState::InGame)),
    );
    app.add_systems(
        Update,
        (
            start_locomotion_animation,
            switch_locomotion_animation.after(apply_stride_input),
            tune_map_materials,
            update_camera_fov,
        ),
    );
    app.add_systems(Last, extract_and_process_frame);

    // Insert resources
    app.insert_resource(FrameBufferRes(shared.frame_buffer));
    app.insert_resource(PerfStatsRes(shared.perf_stats));
    app.insert_resource(MouseInputRes(shared.mouse_input));
    app.insert_resource(StrideInputRes(shared.stride_input));
    app.insert_resource(ViewportRes(shared.viewport));
    app.insert_resource(LoadProgressRes(shared.load_progress));
    app.insert_resource(OrbitCameraState::default());
    app.insert_resource(FrameCount::default());
    app.insert_resource(PreRollFrames(PRE_ROLL_FRAMES));
    app.insert_resource(FrameTimings::default());
    app.insert_resource(FrameRateLimiter::new(TARGET_FPS));

    info!("[Bevy] App configured (headless mode, preload gate active)");
    app
}

/// Start Bevy in a background thread
pub fn start_bevy(shared: SharedState) {
    thread::spawn(move || {
        let mut app = create_app(shared);
        info!("[Bevy] Running render loop...");
        app.run();
    });
}
