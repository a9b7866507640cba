//! Tauri command handlers
//!
//! This module contains all the Tauri command functions that can be invoked
//! from the frontend JavaScript code: frame access, status queries, and the
//! keyboard, joystick, mouse and viewport input that drives the scene.

use base64::{engine::general_purpose::STANDARD, Engine};
use tauri::State;

use crate::config::{RENDER_HEIGHT, RENDER_WIDTH};
use crate::controls::Stride;
use super::shared_state::{
    FrameResponse, LoadProgress, PerformanceStats, SharedFrameBuffer, SharedLoadProgress,
    SharedMouseInput, SharedPerfStats, SharedStrideInput, SharedViewport, StrideSource, Viewport,
};

/// Get the current rendered frame as Base64-encoded RGBA data
#[tauri::command]
pub fn get_frame(
    state: State<SharedFrameBuffer>,
    perf_state: State<SharedPerfStats>,
) -> Result<FrameResponse, String> {
    let cmd_start = std::time::Instant::now();

    let rgba_data = state.latest().map_err(|e| e.to_string())?;
    let data_fetch_time = cmd_start.elapsed().as_secs_f64() * 1000.0;

    let encode_start = std::time::Instant::now();
    let base64_data = STANDARD.encode(&rgba_data);
    let encode_time = encode_start.elapsed().as_secs_f64() * 1000.0;

    if let Ok(mut stats) = perf_state.0.lock() {
        stats.tauri_get_frame_ms = data_fetch_time;
        stats.tauri_serialize_ms = encode_time;
    }

    Ok(FrameResponse {
        data: base64_data,
        width: RENDER_WIDTH,
        height: RENDER_HEIGHT,
    })
}

/// Get the render resolution
#[tauri::command]
pub fn get_render_size() -> (u32, u32) {
    (RENDER_WIDTH, RENDER_HEIGHT)
}

/// Get performance statistics
#[tauri::command]
pub fn get_performance_stats(state: State<SharedPerfStats>) -> Result<PerformanceStats, String> {
    state.snapshot().map_err(|e| e.to_string())
}

/// Get preload progress for the loading screen
#[tauri::command]
pub fn get_load_progress(state: State<SharedLoadProgress>) -> Result<LoadProgress, String> {
    state.get().map_err(|e| e.to_string())
}

/// Receive mouse input from frontend for camera control
/// Input deltas are accumulated until consumed by Bevy
#[tauri::command]
pub fn send_mouse_input(
    state: State<SharedMouseInput>,
    delta_x: f32,
    delta_y: f32,
    scroll_delta: f32,
    left_button: bool,
    right_button: bool,
) -> Result<(), String> {
    let mut guard = state.0.lock().map_err(|e| e.to_string())?;
    // Accumulate deltas (will be cleared when Bevy reads them)
    guard.delta_x += delta_x;
    guard.delta_y += delta_y;
    guard.scroll_delta += scroll_delta;
    // Button state is just the current state
    guard.left_button = left_button;
    guard.right_button = right_button;
    Ok(())
}

/// Receive the full set of held keys whenever it changes
#[tauri::command]
pub fn send_key_state(state: State<SharedStrideInput>, keys: Vec<String>) -> Result<Stride, String> {
    let stride = Stride::from_keys(&keys);
    state
        .set(stride, StrideSource::Keyboard)
        .map_err(|e| e.to_string())?;
    Ok(stride)
}

/// Receive the joystick's normalized displacement
#[tauri::command]
pub fn send_joystick_move(state: State<SharedStrideInput>, x: f32, y: f32) -> Result<Stride, String> {
    let stride = Stride::from_joystick(x, y);
    state
        .set(stride, StrideSource::Joystick)
        .map_err(|e| e.to_string())?;
    Ok(stride)
}

/// Joystick released: stop moving
#[tauri::command]
pub fn send_joystick_end(state: State<SharedStrideInput>) -> Result<(), String> {
    state
        .set(Stride::ZERO, StrideSource::Joystick)
        .map_err(|e| e.to_string())
}

/// Receive the frontend view size, used to pick the camera field of view
#[tauri::command]
pub fn send_viewport_size(state: State<SharedViewport>, width: u32, height: u32) -> Result<(), String> {
    state
        .set(Viewport { width, height })
        .map_err(|e| e.to_string())
}
