//! Application states
//!
//! The app starts behind the preload gate and switches to the game once
//! every manifest asset is available.

use bevy::prelude::*;

#[derive(States, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AppState {
    /// Assets are being fetched; the frontend shows the loading screen
    #[default]
    Loading,
    /// Scene spawned, character controllable
    InGame,
}
