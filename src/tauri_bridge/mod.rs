//! Bridge layer between Tauri and Bevy
//!
//! This module handles all communication between the Tauri frontend and
//! the Bevy rendering backend, including command handlers, custom protocols,
//! and shared state management.

pub mod shared_state;
pub mod commands;
pub mod protocol;

// Re-export commonly used types
pub use shared_state::{
    SharedFrameBuffer, SharedLoadProgress, SharedMouseInput, SharedPerfStats, SharedStrideInput,
    SharedViewport,
};

/// Every piece of state shared between the Tauri and Bevy threads
#[derive(Clone, Default)]
pub struct SharedState {
    pub frame_buffer: SharedFrameBuffer,
    pub perf_stats: SharedPerfStats,
    pub mouse_input: SharedMouseInput,
    pub stride_input: SharedStrideInput,
    pub viewport: SharedViewport,
    pub load_progress: SharedLoadProgress,
}
