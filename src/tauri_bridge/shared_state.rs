//! Shared state structures for communication between Tauri and Bevy
//!
//! This module defines thread-safe data structures that allow bidirectional
//! communication between the Tauri frontend and the Bevy render backend.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

use crate::controls::Stride;

/// Errors surfaced by the bridge layer
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("shared state lock poisoned: {0}")]
    LockPoisoned(&'static str),
    #[error("No frame yet (scene still loading)")]
    FrameNotReady,
    #[error("frame buffer has {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },
    #[error("frame encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &'static str) -> Result<MutexGuard<'a, T>, BridgeError> {
    mutex.lock().map_err(|_| BridgeError::LockPoisoned(name))
}

// =============================================================================
// Frame Buffer
// =============================================================================

/// Thread-safe RGBA frame buffer shared between Bevy and Tauri
/// Stores raw RGBA8 pixel data (4 bytes per pixel)
#[derive(Clone, Default)]
pub struct SharedFrameBuffer(pub Arc<Mutex<Option<Vec<u8>>>>);

impl SharedFrameBuffer {
    /// Copy of the latest frame
    pub fn latest(&self) -> Result<Vec<u8>, BridgeError> {
        lock(&self.0, "frame buffer")?
            .clone()
            .ok_or(BridgeError::FrameNotReady)
    }

    pub fn publish(&self, rgba: Vec<u8>) -> Result<(), BridgeError> {
        *lock(&self.0, "frame buffer")? = Some(rgba);
        Ok(())
    }
}

/// Frame response containing Base64-encoded RGBA pixel data
#[derive(Serialize, Deserialize)]
pub struct FrameResponse {
    /// Base64-encoded RGBA pixel data (avoids slow JSON array serialization)
    pub data: String,
    pub width: u32,
    pub height: u32,
}

// =============================================================================
// Mouse Input
// =============================================================================

/// Mouse input state received from frontend
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct MouseInput {
    /// Accumulated X movement delta
    pub delta_x: f32,
    /// Accumulated Y movement delta
    pub delta_y: f32,
    /// Accumulated scroll wheel delta
    pub scroll_delta: f32,
    /// Left mouse button is pressed
    pub left_button: bool,
    /// Right mouse button is pressed
    pub right_button: bool,
}

/// Thread-safe mouse input shared between Tauri and Bevy
#[derive(Clone, Default)]
pub struct SharedMouseInput(pub Arc<Mutex<MouseInput>>);

impl SharedMouseInput {
    /// Read the accumulated input and clear the deltas
    pub fn take(&self) -> Result<MouseInput, BridgeError> {
        let mut guard = lock(&self.0, "mouse input")?;
        let input = guard.clone();
        guard.delta_x = 0.0;
        guard.delta_y = 0.0;
        guard.scroll_delta = 0.0;
        Ok(input)
    }
}

// =============================================================================
// Locomotion Input
// =============================================================================

/// Which control last produced the stride
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrideSource {
    #[default]
    None,
    Keyboard,
    Joystick,
}

/// Latest stride requested by the frontend
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct StrideInput {
    pub stride: Stride,
    pub source: StrideSource,
}

/// Thread-safe stride input shared between Tauri and Bevy
#[derive(Clone, Default)]
pub struct SharedStrideInput(pub Arc<Mutex<StrideInput>>);

impl SharedStrideInput {
    pub fn set(&self, stride: Stride, source: StrideSource) -> Result<(), BridgeError> {
        *lock(&self.0, "stride input")? = StrideInput { stride, source };
        Ok(())
    }

    pub fn get(&self) -> Result<StrideInput, BridgeError> {
        Ok(*lock(&self.0, "stride input")?)
    }
}

// =============================================================================
// Viewport
// =============================================================================

/// Size of the frontend view displaying the frames, in CSS pixels
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: crate::config::RENDER_WIDTH,
            height: crate::config::RENDER_HEIGHT,
        }
    }
}

/// Thread-safe viewport size shared between Tauri and Bevy
#[derive(Clone, Default)]
pub struct SharedViewport(pub Arc<Mutex<Viewport>>);

impl SharedViewport {
    pub fn set(&self, viewport: Viewport) -> Result<(), BridgeError> {
        *lock(&self.0, "viewport")? = viewport;
        Ok(())
    }

    pub fn get(&self) -> Result<Viewport, BridgeError> {
        Ok(*lock(&self.0, "viewport")?)
    }
}

// =============================================================================
// Load Progress
// =============================================================================

/// Preload progress reported to the loading screen
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct LoadProgress {
    /// Weighted progress in `[0, 100]`
    pub percent: f32,
    pub loaded_assets: usize,
    pub total_assets: usize,
    /// All assets loaded and the scene is being shown
    pub ready: bool,
    /// First asset that failed to load, with the error text
    pub failed: Option<String>,
}

impl LoadProgress {
    /// Percent as shown on the loading screen
    pub fn display_percent(&self) -> u32 {
        self.percent.clamp(0.0, 100.0).round() as u32
    }
}

/// Thread-safe load progress shared between Tauri and Bevy
#[derive(Clone, Default)]
pub struct SharedLoadProgress(pub Arc<Mutex<LoadProgress>>);

impl SharedLoadProgress {
    pub fn set(&self, progress: LoadProgress) -> Result<(), BridgeError> {
        *lock(&self.0, "load progress")? = progress;
        Ok(())
    }

    pub fn get(&self) -> Result<LoadProgress, BridgeError> {
        Ok(lock(&self.0, "load progress")?.clone())
    }
}

// =============================================================================
// Performance Statistics
// =============================================================================

/// Performance statistics for debugging and monitoring
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct PerformanceStats {
    // Backend (Bevy/Rust) timings
    pub gpu_transfer_ms: f64,
    pub data_processing_ms: f64,
    pub frame_encoding_ms: f64,
    pub bevy_fps: f64,
    pub frame_count: u32,
    pub data_size_kb: f64,
    // Tauri command timings
    pub tauri_get_frame_ms: f64,
    pub tauri_serialize_ms: f64,
}

/// Thread-safe performance statistics
#[derive(Clone, Default)]
pub struct SharedPerfStats(pub Arc<Mutex<PerformanceStats>>);

impl SharedPerfStats {
    pub fn snapshot(&self) -> Result<PerformanceStats, BridgeError> {
        Ok(lock(&self.0, "performance stats")?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_buffer_starts_empty() {
        let buffer = SharedFrameBuffer::default();
        assert!(matches!(buffer.latest(), Err(BridgeError::FrameNotReady)));

        buffer.publish(vec![1, 2, 3, 4]).unwrap();
        assert_eq!(buffer.latest().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn mouse_take_clears_deltas_but_keeps_buttons() {
        let input = SharedMouseInput::default();
        {
            let mut guard = input.0.lock().unwrap();
            guard.delta_x = 4.0;
            guard.scroll_delta = -1.0;
            guard.left_button = true;
        }

        let first = input.take().unwrap();
        assert_eq!(first.delta_x, 4.0);
        assert_eq!(first.scroll_delta, -1.0);

        let second = input.take().unwrap();
        assert_eq!(second.delta_x, 0.0);
        assert_eq!(second.scroll_delta, 0.0);
        assert!(second.left_button);
    }

    #[test]
    fn stride_input_remembers_source() {
        let shared = SharedStrideInput::default();
        assert_eq!(shared.get().unwrap().source, StrideSource::None);

        shared
            .set(Stride::from_joystick(0.0, 1.0), StrideSource::Joystick)
            .unwrap();
        let input = shared.get().unwrap();
        assert_eq!(input.source, StrideSource::Joystick);
        assert_eq!(input.stride.forward, -5.0);
    }

    #[test]
    fn display_percent_rounds() {
        let progress = LoadProgress {
            percent: 49.5,
            ..Default::default()
        };
        assert_eq!(progress.display_percent(), 50);

        let progress = LoadProgress {
            percent: 99.4,
            ..Default::default()
        };
        assert_eq!(progress.display_percent(), 99);
    }

    #[test]
    fn load_progress_serializes_for_frontend() {
        let progress = LoadProgress {
            percent: 100.0,
            loaded_assets: 5,
            total_assets: 5,
            ready: true,
            failed: None,
        };
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["ready"], true);
        assert_eq!(json["loaded_assets"], 5);
        assert!(json["failed"].is_null());
    }
}
