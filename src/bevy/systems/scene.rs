//! Scene setup systems
//!
//! The render target and camera exist from startup so the pipeline is warm
//! while assets load; the world itself is spawned when the preload gate opens.

use bevy::{
    asset::Assets,
    camera::RenderTarget,
    core_pipeline::{tonemapping::Tonemapping, Skybox},
    image::Image,
    light::GeneratedEnvironmentMapLight,
    log::{info, warn},
    math::{Quat, Vec3},
    pbr::{MeshMaterial3d, StandardMaterial},
    prelude::*,
    render::{
        render_resource::{
            Extent3d, TextureFormat, TextureUsages, TextureViewDescriptor, TextureViewDimension,
        },
        renderer::RenderDevice,
    },
};

use crate::bevy::components::{
    Facing, MapModel, Player, StrideMove, ThirdPersonCamera,
};
use crate::bevy::plugins::image_copy::ImageCopier;
use crate::bevy::resources::{OrbitCameraState, SceneAssets};
use crate::config::{scene::*, RENDER_HEIGHT, RENDER_WIDTH};

/// Create the offscreen render target, its copier, and the camera
pub fn setup_render_target(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    render_device: Res<RenderDevice>,
    orbit_state: Res<OrbitCameraState>,
) {
    info!("[Bevy] Creating render target {}x{}", RENDER_WIDTH, RENDER_HEIGHT);

    let size = Extent3d {
        width: RENDER_WIDTH,
        height: RENDER_HEIGHT,
        depth_or_array_layers: 1,
    };

    let mut render_target_image =
        Image::new_target_texture(size.width, size.height, TextureFormat::bevy_default());
    render_target_image.texture_descriptor.usage |= TextureUsages::COPY_SRC;
    let render_target_image_handle = images.add(render_target_image);

    // GPU-to-CPU transfer of every rendered frame
    commands.spawn(ImageCopier::new(
        render_target_image_handle.clone(),
        size,
        &render_device,
    ));

    commands.spawn((
        Camera3d::default(),
        Camera {
            target: RenderTarget::Image(render_target_image_handle.into()),
            clear_color: ClearColorConfig::Custom(Color::srgb(0.55, 0.7, 0.85)),
            ..default()
        },
        Tonemapping::None,
        Transform::from_translation(orbit_state.eye()).looking_at(orbit_state.center, Vec3::Y),
        ThirdPersonCamera,
    ));
}

/// Spawn map, character, and lights once every asset is available
pub fn spawn_world(mut commands: Commands, assets: Res<SceneAssets>) {
    info!("[Bevy] Spawning world...");

    commands.spawn((
        SceneRoot(assets.map.clone()),
        Transform::from_scale(Vec3::splat(MAP_SCALE)),
        MapModel,
    ));

    commands.spawn((
        SceneRoot(assets.character.clone()),
        Transform::from_scale(Vec3::splat(CHARACTER_SCALE)),
        Player,
        StrideMove::default(),
        Facing::default(),
    ));

    // Sun for shadows; the HDR map provides the ambient term
    commands.spawn((
        DirectionalLight {
            illuminance: 8000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(EulerRot::XYZ, -0.9, 0.5, 0.0)),
    ));

    info!("[Bevy] World spawned");
}

/// Apply the map's roughness and metalness overrides to its materials
pub fn tune_map_materials(
    new_meshes: Query<(Entity, &MeshMaterial3d<StandardMaterial>), Added<MeshMaterial3d<StandardMaterial>>>,
    parents: Query<&ChildOf>,
    maps: Query<(), With<MapModel>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (entity, material) in new_meshes.iter() {
        if !parents.iter_ancestors(entity).any(|ancestor| maps.contains(ancestor)) {
            continue;
        }
        if let Some(material) = materials.get_mut(&material.0) {
            material.perceptual_roughness = MAP_ROUGHNESS;
            material.metallic = MAP_METALLIC;
        }
    }
}

/// Turn the HDR strip into a cubemap and use it as skybox and ambient light
pub fn attach_environment(
    mut commands: Commands,
    assets: Res<SceneAssets>,
    mut images: ResMut<Assets<Image>>,
    cameras: Query<Entity, With<ThirdPersonCamera>>,
) {
    let Some(image) = images.get_mut(&assets.environment) else {
        warn!("[Bevy] Environment image missing, skipping skybox");
        return;
    };

    if image.texture_descriptor.array_layer_count() == 1 {
        let (width, height) = (image.width(), image.height());
        if !is_stacked_cube_strip(width, height) {
            warn!(
                "[Bevy] Environment image is {}x{}, expected {} stacked square power-of-two faces",
                width, height, ENVIRONMENT_FACES
            );
            return;
        }
        image.reinterpret_stacked_2d_as_array(ENVIRONMENT_FACES);
        image.texture_view_descriptor = Some(TextureViewDescriptor {
            dimension: Some(TextureViewDimension::Cube),
            ..default()
        });
    }

    for camera in cameras.iter() {
        commands.entity(camera).insert((
            Skybox {
                image: assets.environment.clone(),
                brightness: SKYBOX_BRIGHTNESS,
                ..default()
            },
            // Diffuse and specular maps are prefiltered from the cubemap on the GPU
            GeneratedEnvironmentMapLight {
                environment_map: assets.environment.clone(),
                intensity: ENVIRONMENT_INTENSITY,
                ..default()
            },
        ));
    }
}

/// Vertical strip of square faces whose edge the GPU filter can mip down to 1
fn is_stacked_cube_strip(width: u32, height: u32) -> bool {
    width.is_power_of_two() && height == width * ENVIRONMENT_FACES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_power_of_two_strip() {
        assert!(is_stacked_cube_strip(256, 256 * ENVIRONMENT_FACES));
        assert!(is_stacked_cube_strip(1, ENVIRONMENT_FACES));
    }

    #[test]
    fn rejects_wrong_shape_or_odd_face_size() {
        assert!(!is_stacked_cube_strip(256, 256));
        assert!(!is_stacked_cube_strip(256 * ENVIRONMENT_FACES, 256));
        assert!(!is_stacked_cube_strip(300, 300 * ENVIRONMENT_FACES));
        assert!(!is_stacked_cube_strip(0, 0));
    }
}
