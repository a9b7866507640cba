//! Preload gate
//!
//! Requests every manifest asset at startup and reports weighted progress
//! to the loading screen until all of them (and their dependencies) are in.

use bevy::{
    asset::RecursiveDependencyLoadState,
    gltf::GltfAssetLabel,
    log::{error, info},
    prelude::*,
};

use crate::bevy::resources::{
    CharacterAnimations, LoadProgressRes, PreloadAssets, PreloadEntry, SceneAssets,
};
use crate::bevy::state::AppState;
use crate::config::{animation::*, preload::*};
use crate::tauri_bridge::shared_state::LoadProgress;

/// Load state of a single entry
#[derive(Debug, Clone, PartialEq)]
pub enum EntryState {
    Pending,
    Loaded,
    Failed(String),
}

/// Request the manifest assets and build the character's animation graph
pub fn start_preload(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut graphs: ResMut<Assets<AnimationGraph>>,
) {
    let map: Handle<Scene> = asset_server.load(GltfAssetLabel::Scene(0).from_asset(MAP));
    let character: Handle<Scene> =
        asset_server.load(GltfAssetLabel::Scene(0).from_asset(CHARACTER));
    let idle: Handle<AnimationClip> =
        asset_server.load(GltfAssetLabel::Animation(IDLE_CLIP).from_asset(CHARACTER));
    let running: Handle<AnimationClip> =
        asset_server.load(GltfAssetLabel::Animation(RUNNING_CLIP).from_asset(CHARACTER));
    let environment: Handle<Image> = asset_server.load(ENVIRONMENT);

    let (graph, nodes) = AnimationGraph::from_clips([idle.clone(), running.clone()]);
    let &[idle_node, running_node] = nodes.as_slice() else {
        error!("[Bevy] Animation graph has {} nodes, expected 2", nodes.len());
        return;
    };
    commands.insert_resource(CharacterAnimations {
        graph: graphs.add(graph),
        idle: idle_node,
        running: running_node,
    });

    let entries = vec![
        PreloadEntry {
            label: MAP.to_string(),
            weight: MAP_BYTES,
            handle: map.clone().untyped(),
        },
        PreloadEntry {
            label: CHARACTER.to_string(),
            weight: CHARACTER_BYTES,
            handle: character.clone().untyped(),
        },
        PreloadEntry {
            label: format!("{CHARACTER} (idle)"),
            weight: CLIP_BYTES,
            handle: idle.untyped(),
        },
        PreloadEntry {
            label: format!("{CHARACTER} (running)"),
            weight: CLIP_BYTES,
            handle: running.untyped(),
        },
        PreloadEntry {
            label: ENVIRONMENT.to_string(),
            weight: ENVIRONMENT_BYTES,
            handle: environment.clone().untyped(),
        },
    ];
    info!("[Bevy] Preloading {} assets", entries.len());

    commands.insert_resource(SceneAssets {
        map,
        character,
        environment,
    });
    commands.insert_resource(PreloadAssets {
        entries,
        ..default()
    });
}

/// Recompute progress and leave the loading state once everything is in
pub fn track_preload(
    asset_server: Res<AssetServer>,
    preload: Option<ResMut<PreloadAssets>>,
    progress_res: Option<Res<LoadProgressRes>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(mut preload) = preload else { return };

    let states: Vec<(&str, u64, EntryState)> = preload
        .entries
        .iter()
        .map(|entry| {
            let state = match asset_server.get_recursive_dependency_load_state(entry.handle.id()) {
                Some(RecursiveDependencyLoadState::Loaded) => EntryState::Loaded,
                Some(RecursiveDependencyLoadState::Failed(err)) => {
                    EntryState::Failed(err.to_string())
                }
                _ => EntryState::Pending,
            };
            (entry.label.as_str(), entry.weight, state)
        })
        .collect();

    let progress = compute_progress(&states);
    drop(states);
    let progress = record_progress(&mut preload, progress);

    if progress.ready {
        info!(
            "[Bevy] Preload complete ({} assets), entering game",
            progress.total_assets
        );
        next_state.set(AppState::InGame);
    }

    if let Some(shared) = progress_res {
        if let Err(err) = shared.0.set(progress) {
            error!("[Bevy] Could not publish load progress: {}", err);
        }
    }
}

/// Fold a fresh snapshot into the preload bookkeeping
///
/// The reported percent never drops below what was already shown, and a
/// failure is logged only the first time it is seen.
fn record_progress(preload: &mut PreloadAssets, mut progress: LoadProgress) -> LoadProgress {
    progress.percent = progress.percent.max(preload.best_percent);
    preload.best_percent = progress.percent;

    if let Some(failed) = &progress.failed {
        if !preload.failure_logged {
            error!("[Bevy] Preload failed: {}", failed);
            preload.failure_logged = true;
        }
    }

    progress
}

/// Weighted progress over `(label, weight, state)` entries
///
/// Progress reaches exactly 100 only when every entry is loaded. When all
/// weights are zero, entries count equally.
pub fn compute_progress(entries: &[(&str, u64, EntryState)]) -> LoadProgress {
    let total_assets = entries.len();
    let loaded_assets = entries
        .iter()
        .filter(|(_, _, state)| *state == EntryState::Loaded)
        .count();

    let failed = entries.iter().find_map(|(label, _, state)| match state {
        EntryState::Failed(err) => Some(format!("{label}: {err}")),
        _ => None,
    });

    let total_weight: u64 = entries.iter().map(|(_, weight, _)| weight).sum();
    let loaded_weight: u64 = entries
        .iter()
        .filter(|(_, _, state)| *state == EntryState::Loaded)
        .map(|(_, weight, _)| weight)
        .sum();

    let ready = loaded_assets == total_assets;
    let percent = if ready {
        100.0
    } else if total_weight == 0 {
        100.0 * loaded_assets as f32 / total_assets as f32
    } else {
        // Stay below 100 until the last entry lands
        (100.0 * loaded_weight as f64 / total_weight as f64).min(99.9) as f32
    };

    LoadProgress {
        percent,
        loaded_assets,
        total_assets,
        ready,
        failed,
    }
}
