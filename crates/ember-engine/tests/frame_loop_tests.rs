//! End-to-end frame loop behavior with the standard systems.

use ember_engine::prelude::*;
use glam::Vec2;
use proptest::prelude::*;

fn spawn_player(world: &mut World) -> Entity {
    let e = world.create_entity();
    world.add(e, Transform::default()).unwrap();
    world
        .add(
            e,
            PhysicsBody {
                drag: 1.0,
                ..Default::default()
            },
        )
        .unwrap();
    world.add(e, PlayerControl { speed: 20.0 }).unwrap();
    world.add(e, CameraTarget).unwrap();
    e
}

#[test]
fn scripted_input_steers_player_right_then_up() {
    let mut frame_loop = default_frame_loop(World::new(), &EngineConfig::default());
    let player = spawn_player(frame_loop.world_mut());

    let mut script = vec![vec![KeyEvent::Pressed(KeyCode::D)]];
    script.extend((0..29).map(|_| Vec::new()));
    script.push(vec![
        KeyEvent::Released(KeyCode::D),
        KeyEvent::Pressed(KeyCode::Up),
    ]);
    script.extend((0..29).map(|_| Vec::new()));

    let mut platform = HeadlessPlatform::scripted(script);
    let mut clock = FixedClock::new(1.0 / 60.0);
    let frames = frame_loop.run(&mut platform, &mut clock).unwrap();
    assert_eq!(frames, 60);

    let position = frame_loop.world().get::<Transform>(player).unwrap().position;
    assert!(position.x > 0.5, "player should have moved right: {position:?}");
    assert!(position.y > 0.5, "player should have moved up: {position:?}");

    let focus = camera_focus(frame_loop.world()).unwrap();
    assert_eq!(focus, Some(position));
}

#[test]
fn auto_destroy_emitter_removed_and_sweep_finds_nothing() {
    let config = EngineConfig {
        frame: FrameConfig {
            orphan_sweep_interval: 1,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut frame_loop = default_frame_loop(World::new(), &config);
    let world = frame_loop.world_mut();
    let blast = world.create_entity();
    world.add(blast, Transform::default()).unwrap();
    let mut system = ParticleSystem::with_seed(EmissionProfile::explosion(), 16, 3).auto_destroy();
    system.emit_burst(16, Vec2::ZERO);
    system.stop(false);
    world.add(blast, system).unwrap();

    let input = KeyboardState::new();
    frame_loop.step(&input).unwrap();
    assert!(frame_loop.world().is_entity_active(blast));

    // Explosion particles live at most 0.8s.
    frame_loop.run_frames(60, &input).unwrap();
    assert!(!frame_loop.world().is_entity_active(blast));
    assert!(!frame_loop.world().has::<Transform>(blast));
    assert_eq!(frame_loop.world().component_count(), 0);
    assert_eq!(frame_loop.last_diagnostics().orphans_removed, 0);
}

#[test]
fn recycled_entity_starts_clean() {
    let mut frame_loop = default_frame_loop(World::new(), &EngineConfig::default());
    let world = frame_loop.world_mut();
    let old = spawn_player(world);
    world.destroy_entity(old).unwrap();

    let reused = world.create_entity();
    assert_eq!(reused, old);
    assert!(!world.has::<PlayerControl>(reused));
    assert!(!world.has::<CameraTarget>(reused));
    assert_eq!(camera_focus(world).unwrap(), None);
}

#[test]
fn standard_systems_registered_in_order() {
    let frame_loop = default_frame_loop(World::new(), &EngineConfig::default());
    assert_eq!(
        frame_loop.system_names(),
        vec!["movement", "particles", "animation"]
    );
}

proptest! {
    #[test]
    fn bodies_stay_within_bounds(
        bodies in prop::collection::vec(
            ((-8.0f32..8.0, -4.5f32..4.5), (-50.0f32..50.0, -50.0f32..50.0)),
            1..20,
        ),
        frames in 1u64..60,
    ) {
        let config = EngineConfig::default();
        let mut frame_loop = default_frame_loop(World::new(), &config);
        let world = frame_loop.world_mut();
        for ((x, y), (vx, vy)) in &bodies {
            let e = world.create_entity();
            world.add(e, Transform::from_position(Vec2::new(*x, *y))).unwrap();
            world
                .add(
                    e,
                    PhysicsBody {
                        velocity: Vec2::new(*vx, *vy),
                        use_gravity: true,
                        ..Default::default()
                    },
                )
                .unwrap();
        }

        frame_loop.run_frames(frames, &KeyboardState::new()).unwrap();

        let physics = &config.physics;
        for (_, (t,)) in frame_loop.world().query::<(Transform,)>() {
            prop_assert!(t.position.x.abs() <= physics.horizontal_bound);
            prop_assert!(t.position.y.abs() <= physics.vertical_bound);
        }
    }
}
