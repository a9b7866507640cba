//! Animation systems
//!
//! The character idles while standing and runs while a stride is held.

use bevy::prelude::*;

use crate::bevy::components::{LocomotionClip, Player, StrideMove};
use crate::bevy::resources::CharacterAnimations;
use crate::config::animation::BLEND;

/// Slowest playback rate for a barely-pushed joystick
const MIN_RUN_SPEED: f32 = 0.4;

/// Hook up the graph when the character's animation player appears
///
/// Animation players spawned by other scenes (the map) are left alone.
pub fn start_locomotion_animation(
    mut commands: Commands,
    animations: Option<Res<CharacterAnimations>>,
    mut players: Query<(Entity, &mut AnimationPlayer), Added<AnimationPlayer>>,
    parents: Query<&ChildOf>,
    characters: Query<(), With<Player>>,
) {
    let Some(animations) = animations else {
        return;
    };

    for (entity, mut player) in players.iter_mut() {
        let in_character = characters.contains(entity)
            || parents
                .iter_ancestors(entity)
                .any(|ancestor| characters.contains(ancestor));
        if !in_character {
            continue;
        }

        let mut transitions = AnimationTransitions::new();
        transitions
            .play(&mut player, animations.idle, BLEND)
            .repeat();

        commands.entity(entity).insert((
            AnimationGraphHandle(animations.graph.clone()),
            transitions,
            LocomotionClip::Idle,
        ));
    }
}

/// Cross-fade between idle and running as the stride changes
pub fn switch_locomotion_animation(
    animations: Option<Res<CharacterAnimations>>,
    characters: Query<&StrideMove, With<Player>>,
    mut players: Query<(
        &mut AnimationPlayer,
        &mut AnimationTransitions,
        &mut LocomotionClip,
    )>,
) {
    let Some(animations) = animations else {
        return;
    };
    let Ok(stride_move) = characters.single() else {
        return;
    };
    let stride = stride_move.0;
    let wanted = desired_clip(stride.is_moving());

    for (mut player, mut transitions, mut clip) in players.iter_mut() {
        if *clip != wanted {
            let node = match wanted {
                LocomotionClip::Idle => animations.idle,
                LocomotionClip::Running => animations.running,
            };
            transitions.play(&mut player, node, BLEND).repeat();
            *clip = wanted;
        }

        if wanted == LocomotionClip::Running {
            if let Some(active) = player.animation_mut(animations.running) {
                active.set_speed(stride.intensity().max(MIN_RUN_SPEED));
            }
        }
    }
}

fn desired_clip(moving: bool) -> LocomotionClip {
    if moving {
        LocomotionClip::Running
    } else {
        LocomotionClip::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::Stride;
    use bevy::animation::RepeatAnimation;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn moving_runs_standing_idles() {
        assert_eq!(desired_clip(true), LocomotionClip::Running);
        assert_eq!(desired_clip(false), LocomotionClip::Idle);
    }

    fn world_with_graph() -> (World, AnimationNodeIndex, AnimationNodeIndex) {
        let (_, nodes) =
            AnimationGraph::from_clips([Handle::<AnimationClip>::default(), Handle::default()]);
        let (idle, running) = (nodes[0], nodes[1]);

        let mut world = World::new();
        world.insert_resource(CharacterAnimations {
            graph: Handle::default(),
            idle,
            running,
        });
        (world, idle, running)
    }

    /// Character root with the glTF's animation player nested below it
    fn spawn_character(world: &mut World) -> (Entity, Entity) {
        let character = world
            .spawn((Player, StrideMove::default()))
            .id();
        let armature = world.spawn(ChildOf(character)).id();
        let rig = world.spawn((AnimationPlayer::default(), ChildOf(armature))).id();
        (character, rig)
    }

    #[test]
    fn new_character_player_idles_forever() {
        let (mut world, idle, _) = world_with_graph();
        let (_, rig) = spawn_character(&mut world);

        world.run_system_once(start_locomotion_animation).unwrap();

        assert_eq!(world.get::<LocomotionClip>(rig), Some(&LocomotionClip::Idle));
        assert!(world.get::<AnimationGraphHandle>(rig).is_some());
        assert_eq!(
            world.get::<AnimationTransitions>(rig).unwrap().get_main_animation(),
            Some(idle)
        );

        let player = world.get::<AnimationPlayer>(rig).unwrap();
        assert!(player.is_playing_animation(idle));
        assert_eq!(
            player.animation(idle).map(|active| active.repeat_mode()),
            Some(RepeatAnimation::Forever)
        );
    }

    #[test]
    fn map_animation_players_are_ignored() {
        let (mut world, _, _) = world_with_graph();
        let map = world.spawn(Transform::default()).id();
        let windmill = world.spawn((AnimationPlayer::default(), ChildOf(map))).id();

        world.run_system_once(start_locomotion_animation).unwrap();

        assert!(world.get::<LocomotionClip>(windmill).is_none());
        assert!(world.get::<AnimationTransitions>(windmill).is_none());
        let player = world.get::<AnimationPlayer>(windmill).unwrap();
        assert_eq!(player.playing_animations().count(), 0);
    }

    #[test]
    fn stride_switches_clip_only_when_it_changes() {
        let (mut world, idle, running) = world_with_graph();
        let (character, rig) = spawn_character(&mut world);
        world.run_system_once(start_locomotion_animation).unwrap();

        world.get_mut::<StrideMove>(character).unwrap().0 = Stride::from_keys(["w"]);
        world.run_system_once(switch_locomotion_animation).unwrap();

        assert_eq!(world.get::<LocomotionClip>(rig), Some(&LocomotionClip::Running));
        assert_eq!(
            world.get::<AnimationTransitions>(rig).unwrap().get_main_animation(),
            Some(running)
        );
        assert!(world.get::<AnimationPlayer>(rig).unwrap().is_playing_animation(running));

        // Same stride again: the clip is already right, so nothing is replayed
        world
            .get_mut::<AnimationPlayer>(rig)
            .unwrap()
            .stop(running);
        world.run_system_once(switch_locomotion_animation).unwrap();
        assert!(!world.get::<AnimationPlayer>(rig).unwrap().is_playing_animation(running));
        assert_eq!(world.get::<LocomotionClip>(rig), Some(&LocomotionClip::Running));

        world.get_mut::<StrideMove>(character).unwrap().0 = Stride::ZERO;
        world.run_system_once(switch_locomotion_animation).unwrap();
        assert_eq!(world.get::<LocomotionClip>(rig), Some(&LocomotionClip::Idle));
        assert_eq!(
            world.get::<AnimationTransitions>(rig).unwrap().get_main_animation(),
            Some(idle)
        );
    }

    #[test]
    fn half_stride_runs_at_half_speed() {
        let (mut world, _, running) = world_with_graph();
        let (character, rig) = spawn_character(&mut world);
        world.run_system_once(start_locomotion_animation).unwrap();

        world.get_mut::<StrideMove>(character).unwrap().0 = Stride::from_joystick(0.0, 0.5);
        world.run_system_once(switch_locomotion_animation).unwrap();

        let player = world.get::<AnimationPlayer>(rig).unwrap();
        let speed = player.animation(running).map(|active| active.speed());
        assert_eq!(speed, Some(0.5));
    }
}
