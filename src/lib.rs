//! Fox Meadow: third-person character demo
//!
//! A fox roams a grassland map, steered with WASD or an on-screen joystick.
//! Bevy renders the scene headless; Tauri hosts the webview that shows the
//! frames and collects input.
//!
//! Architecture:
//! - Bevy runs in a background thread with NO window (true headless mode)
//! - Assets are preloaded behind a loading screen that reports weighted progress
//! - GPU texture -> Buffer -> CPU channel -> Tauri frontend
//! - Keyboard/joystick input becomes a stride the character controller consumes
//!
//! # Module Structure
//!
//! - `config`: Configuration constants and settings
//! - `controls`: Keyboard/joystick to stride mapping
//! - `tauri_bridge`: Bridge layer between Tauri and Bevy
//!   - `shared_state`: Thread-safe data structures
//!   - `commands`: Tauri command handlers
//!   - `protocol`: Custom protocol handlers
//! - `bevy`: Bevy engine integration
//!   - `components`: ECS components
//!   - `resources`: Global resources
//!   - `state`: Loading / in-game states
//!   - `plugins`: Custom plugins
//!   - `systems`: Game systems
//!   - `app`: Application setup

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod bevy;
pub mod config;
pub mod controls;
mod tauri_bridge;

use ::bevy::log::{error, info};
use std::{thread, time::Duration};
use tauri_bridge::{protocol::ProtocolState, SharedState};

/// Main entry point for the Tauri application
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let shared = SharedState::default();

    // Start Bevy in background thread
    bevy::start_bevy(shared.clone());

    // Wait for Bevy to initialize (this also installs the log subscriber)
    thread::sleep(Duration::from_millis(1000));
    info!("[Tauri] Starting...");

    let protocol_state = ProtocolState {
        buffer: shared.frame_buffer.clone(),
        perf_stats: shared.perf_stats.clone(),
        progress: shared.load_progress.clone(),
    };

    let result = tauri::Builder::default()
        .manage(shared.frame_buffer)
        .manage(shared.perf_stats)
        .manage(shared.mouse_input)
        .manage(shared.stride_input)
        .manage(shared.viewport)
        .manage(shared.load_progress)
        // Custom protocol "frame://" for direct binary transfer, bypassing IPC JSON
        .register_asynchronous_uri_scheme_protocol("frame", move |_ctx, request, responder| {
            let state = protocol_state.clone();

            // Handle the request in a separate thread to avoid blocking
            std::thread::spawn(move || {
                // For Tauri v2 on Windows, URL format is: http://frame.localhost/path
                let response =
                    tauri_bridge::protocol::handle_frame_protocol(request.uri().path(), &state);
                responder.respond(response);
            });
        })
        .invoke_handler(tauri::generate_handler![
            tauri_bridge::commands::get_frame,
            tauri_bridge::commands::get_render_size,
            tauri_bridge::commands::get_performance_stats,
            tauri_bridge::commands::get_load_progress,
            tauri_bridge::commands::send_mouse_input,
            tauri_bridge::commands::send_key_state,
            tauri_bridge::commands::send_joystick_move,
            tauri_bridge::commands::send_joystick_end,
            tauri_bridge::commands::send_viewport_size
        ])
        .run(tauri::generate_context!());

    if let Err(err) = result {
        error!("[Tauri] Application error: {}", err);
        std::process::exit(1);
    }
}
