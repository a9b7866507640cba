//! Character locomotion
//!
//! The frontend's stride is copied onto the player every frame, then turned
//! into camera-relative motion on the ground plane.

use bevy::{math::Vec3, prelude::*, time::Time};
use std::f32::consts::{PI, TAU};

use crate::bevy::components::{Facing, Player, StrideMove, ThirdPersonCamera};
use crate::bevy::resources::StrideInputRes;
use crate::config::locomotion::{MAX_STRIDE, STRIDE_SPEED, TURN_RATE};
use crate::controls::Stride;

/// Copy the latest stride input onto the player
pub fn apply_stride_input(
    stride_input: Option<Res<StrideInputRes>>,
    mut players: Query<&mut StrideMove, With<Player>>,
) {
    let Some(stride_input) = stride_input else {
        return;
    };
    let Ok(input) = stride_input.0.get() else {
        return;
    };

    for mut stride_move in players.iter_mut() {
        // Avoid tripping change detection every frame
        stride_move.set_if_neq(StrideMove(input.stride));
    }
}

/// Move and turn the player relative to the camera's view direction
pub fn move_character(
    time: Res<Time>,
    cameras: Query<&Transform, (With<ThirdPersonCamera>, Without<Player>)>,
    mut players: Query<(&StrideMove, &mut Facing, &mut Transform), With<Player>>,
) {
    let Ok(camera) = cameras.single() else {
        return;
    };
    let dt = time.delta_secs();

    for (stride_move, mut facing, mut transform) in players.iter_mut() {
        let direction = travel_direction(stride_move.0, *camera.forward(), *camera.right());
        if direction == Vec3::ZERO {
            continue;
        }

        let speed = stride_move.0.intensity() * MAX_STRIDE * STRIDE_SPEED;
        transform.translation += direction * speed * dt;

        let target = direction.x.atan2(direction.z);
        facing.0 = turn_towards(facing.0, target, TURN_RATE * dt);
        transform.rotation = Quat::from_rotation_y(facing.0);
    }
}

/// Unit ground-plane direction for a stride, given the camera's axes
///
/// Returns zero when standing still or when the camera looks straight down.
pub fn travel_direction(stride: Stride, camera_forward: Vec3, camera_right: Vec3) -> Vec3 {
    if !stride.is_moving() {
        return Vec3::ZERO;
    }
    let forward = Vec3::new(camera_forward.x, 0.0, camera_forward.z).normalize_or_zero();
    let right = Vec3::new(camera_right.x, 0.0, camera_right.z).normalize_or_zero();
    (forward * -stride.forward + right * -stride.right).normalize_or_zero()
}

/// Rotate `current` toward `target` by at most `max_delta`, wrapped to (-PI, PI]
pub fn turn_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = wrap_angle(target - current);
    if delta.abs() <= max_delta {
        return wrap_angle(target);
    }
    wrap_angle(current + max_delta.copysign(delta))
}

fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tauri_bridge::shared_state::{SharedStrideInput, StrideSource};
    use approx::assert_relative_eq;
    use bevy::ecs::system::RunSystemOnce;
    use std::f32::consts::FRAC_PI_2;

    // Camera looking down -Z, right is +X
    const FORWARD: Vec3 = Vec3::NEG_Z;
    const RIGHT: Vec3 = Vec3::X;

    #[test]
    fn standing_still_has_no_direction() {
        assert_eq!(travel_direction(Stride::ZERO, FORWARD, RIGHT), Vec3::ZERO);
    }

    #[test]
    fn w_walks_away_from_camera() {
        let dir = travel_direction(Stride::from_keys(["w"]), FORWARD, RIGHT);
        assert_relative_eq!(dir.z, -1.0);
        assert_relative_eq!(dir.x, 0.0);
    }

    #[test]
    fn a_walks_to_camera_left() {
        let dir = travel_direction(Stride::from_keys(["a"]), FORWARD, RIGHT);
        assert_relative_eq!(dir.x, -1.0);
    }

    #[test]
    fn tilted_camera_still_moves_on_ground() {
        let tilted = Vec3::new(0.0, -0.8, -0.6);
        let dir = travel_direction(Stride::from_keys(["w"]), tilted, RIGHT);
        assert_eq!(dir.y, 0.0);
        assert_relative_eq!(dir.length(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn turning_is_rate_limited() {
        let next = turn_towards(0.0, FRAC_PI_2, 0.1);
        assert_relative_eq!(next, 0.1, epsilon = 1e-6);
        assert_relative_eq!(turn_towards(0.0, 0.05, 0.1), 0.05, epsilon = 1e-6);
    }

    #[test]
    fn turning_takes_the_short_way_round() {
        // From just under +PI to just over -PI is a small positive step
        let next = turn_towards(3.1, -3.1, 0.05);
        assert!(next > 3.1 || next < -3.0);
    }

    #[test]
    fn stride_input_reaches_player() {
        let shared = SharedStrideInput::default();
        shared
            .set(Stride::from_keys(["w", "d"]), StrideSource::Keyboard)
            .unwrap();

        let mut world = World::new();
        world.insert_resource(StrideInputRes(shared));
        let player = world.spawn((Player, StrideMove::default())).id();

        world.run_system_once(apply_stride_input).unwrap();

        let stride = world.get::<StrideMove>(player).unwrap().0;
        assert_eq!(stride, Stride::new(-5.0, -5.0));
    }

    #[test]
    fn missing_player_is_a_no_op() {
        let mut world = World::new();
        world.insert_resource(StrideInputRes(SharedStrideInput::default()));
        world.run_system_once(apply_stride_input).unwrap();
    }

    #[test]
    fn player_moves_toward_camera_forward() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, move_character);

        app.world_mut().spawn((
            ThirdPersonCamera,
            Transform::from_xyz(0.0, 2.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
        ));
        let player = app
            .world_mut()
            .spawn((
                Player,
                StrideMove(Stride::from_keys(["w"])),
                Facing::default(),
                Transform::default(),
            ))
            .id();

        // First update has a zero delta; give time a chance to advance
        app.update();
        std::thread::sleep(std::time::Duration::from_millis(20));
        app.update();

        let transform = app.world().get::<Transform>(player).unwrap();
        assert!(transform.translation.z < 0.0);
        assert_relative_eq!(transform.translation.y, 0.0);
    }
}
