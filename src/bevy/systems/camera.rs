//! Third-person camera system
//!
//! The camera orbits the player: dragging with the left button rotates it,
//! scrolling zooms, and the orbit center trails the player with damping.

use bevy::{
    math::Vec3,
    prelude::*,
    time::Time,
};

use crate::bevy::components::{Player, ThirdPersonCamera};
use crate::bevy::resources::{MouseInputRes, OrbitCameraState, ViewportRes};
use crate::config::camera::*;
use crate::controls::camera_fov_degrees;
use crate::tauri_bridge::shared_state::MouseInput;

/// Update camera transform based on mouse input and the player's position
/// - Left button drag: rotate camera (yaw/pitch)
/// - Scroll wheel: zoom (adjust distance)
pub fn update_camera_from_input(
    time: Res<Time>,
    mouse_input_res: Option<Res<MouseInputRes>>,
    mut orbit_state: ResMut<OrbitCameraState>,
    players: Query<&Transform, (With<Player>, Without<ThirdPersonCamera>)>,
    mut camera_query: Query<&mut Transform, With<ThirdPersonCamera>>,
) {
    if let Some(mouse_res) = mouse_input_res {
        if let Ok(input) = mouse_res.0.take() {
            apply_mouse_input(&mut orbit_state, &input);
        }
    }

    if let Ok(player) = players.single() {
        let target = player.translation + Vec3::Y * TARGET_HEIGHT;
        orbit_state.center = damp_towards(
            orbit_state.center,
            target,
            FOLLOW_DAMPING,
            time.delta_secs(),
        );
    }

    for mut transform in camera_query.iter_mut() {
        *transform =
            Transform::from_translation(orbit_state.eye()).looking_at(orbit_state.center, Vec3::Y);
    }
}

/// Keep the field of view matched to the frontend's orientation
pub fn update_camera_fov(
    viewport_res: Option<Res<ViewportRes>>,
    mut projections: Query<&mut Projection, With<ThirdPersonCamera>>,
) {
    let Some(viewport_res) = viewport_res else {
        return;
    };
    let Ok(viewport) = viewport_res.0.get() else {
        return;
    };
    let fov = camera_fov_degrees(viewport.width, viewport.height).to_radians();

    for mut projection in projections.iter_mut() {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            if perspective.fov != fov {
                perspective.fov = fov;
            }
        }
    }
}

/// Fold accumulated drag and scroll into the orbit
pub fn apply_mouse_input(orbit_state: &mut OrbitCameraState, input: &MouseInput) {
    if input.left_button && (input.delta_x != 0.0 || input.delta_y != 0.0) {
        orbit_state.yaw -= input.delta_x * ROTATION_SPEED;
        orbit_state.pitch += input.delta_y * ROTATION_SPEED;
        orbit_state.pitch = orbit_state.pitch.clamp(MIN_PITCH, MAX_PITCH);
    }

    if input.scroll_delta != 0.0 {
        orbit_state.distance -= input.scroll_delta * ZOOM_SPEED;
        orbit_state.distance = orbit_state.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }
}

/// Frame-rate independent exponential approach of `current` to `target`
pub fn damp_towards(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    let t = 1.0 - (-rate * dt.max(0.0)).exp();
    current.lerp(target, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn damping_approaches_without_overshoot() {
        let target = Vec3::new(10.0, 0.0, 0.0);
        let mut center = Vec3::ZERO;
        let mut last = 0.0;
        for _ in 0..120 {
            center = damp_towards(center, target, FOLLOW_DAMPING, 1.0 / 60.0);
            assert!(center.x >= last);
            assert!(center.x <= target.x);
            last = center.x;
        }
        assert_relative_eq!(center.x, 10.0, epsilon = 1e-2);
    }

    #[test]
    fn zero_dt_does_not_move() {
        let center = damp_towards(Vec3::ZERO, Vec3::ONE, FOLLOW_DAMPING, 0.0);
        assert_eq!(center, Vec3::ZERO);
    }

    #[test]
    fn drag_requires_left_button() {
        let mut orbit = OrbitCameraState::default();
        let yaw = orbit.yaw;
        apply_mouse_input(
            &mut orbit,
            &MouseInput {
                delta_x: 50.0,
                ..Default::default()
            },
        );
        assert_eq!(orbit.yaw, yaw);
    }

    #[test]
    fn drag_clamps_pitch_and_scroll_clamps_distance() {
        let mut orbit = OrbitCameraState::default();
        apply_mouse_input(
            &mut orbit,
            &MouseInput {
                delta_y: 100_000.0,
                scroll_delta: -1_000.0,
                left_button: true,
                ..Default::default()
            },
        );
        assert_eq!(orbit.pitch, MAX_PITCH);
        assert_eq!(orbit.distance, MAX_DISTANCE);

        apply_mouse_input(
            &mut orbit,
            &MouseInput {
                delta_y: -100_000.0,
                scroll_delta: 1_000.0,
                left_button: true,
                ..Default::default()
            },
        );
        assert_eq!(orbit.pitch, MIN_PITCH);
        assert_eq!(orbit.distance, MIN_DISTANCE);
    }
}
