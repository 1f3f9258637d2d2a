//! Headless demo -- a steered player, a bouncing ball and a few emitters.
//!
//! Run with:
//!   cargo run --example particles_headless -p ember-engine [config.json]
//!
//! The optional argument is an engine config document; omitted fields use
//! their defaults. Set `RUST_LOG=debug` to watch emitters being destroyed.

use anyhow::Context;
use ember_engine::prelude::*;
use ember_engine::render::{pack_instances, pack_particle_instances};
use glam::Vec2;
use tracing::info;

const FRAMES: u64 = 300;

fn load_config() -> anyhow::Result<EngineConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            EngineConfig::from_json_str(&text).with_context(|| format!("loading {path}"))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn build_scene(world: &mut World, seed: u64) -> anyhow::Result<()> {
    let player = world.create_entity();
    world.add(player, Transform::default())?;
    world.add(
        player,
        PhysicsBody {
            drag: 2.0,
            ..Default::default()
        },
    )?;
    world.add(player, PlayerControl::default())?;
    world.add(player, CameraTarget)?;
    world.add(player, Sprite::new("player_0", Vec2::splat(0.5)).with_layer(10))?;

    let ball = world.create_entity();
    world.add(ball, Transform::from_position(Vec2::new(-3.0, 3.0)))?;
    world.add(
        ball,
        PhysicsBody {
            velocity: Vec2::new(4.0, 0.0),
            use_gravity: true,
            ..Default::default()
        },
    )?;
    world.add(ball, Sprite::new("ball", Vec2::splat(0.3)).with_layer(5))?;

    let presets = [
        ("fire", EmissionProfile::fire(), Vec2::new(-5.0, -4.0)),
        ("smoke", EmissionProfile::smoke(), Vec2::new(-5.0, -3.0)),
        ("sparkle", EmissionProfile::sparkle(), Vec2::new(5.0, 2.0)),
        ("magic", EmissionProfile::magic(), Vec2::new(0.0, 3.0)),
    ];
    for (i, (name, profile, position)) in presets.into_iter().enumerate() {
        let emitter = world.create_entity();
        world.add(emitter, Transform::from_position(position))?;
        world.add(emitter, ParticleSystem::with_seed(profile, 256, seed + i as u64))?;
        info!(%emitter, preset = name, "spawned emitter");
    }

    // One-shot explosion that removes itself once its particles die out.
    let blast = world.create_entity();
    world.add(blast, Transform::from_position(Vec2::new(2.0, -1.0)))?;
    let mut explosion =
        ParticleSystem::with_seed(EmissionProfile::explosion(), 128, seed + 100).auto_destroy();
    explosion.emit_burst(128, Vec2::new(2.0, -1.0));
    explosion.stop(false);
    world.add(blast, explosion)?;

    let walker = world.create_entity();
    world.add(walker, Transform::from_position(Vec2::new(3.0, -3.0)))?;
    let frames = (0..4).map(|i| format!("walk_{i}")).collect();
    world.add(walker, AnimatedSprite::new(frames, 0.12, Vec2::ONE).with_layer(1))?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = load_config()?;
    let mut frame_loop = default_frame_loop(World::new(), &config);
    build_scene(frame_loop.world_mut(), config.rng_seed)?;

    // Hold D for the first half, then W.
    let script = (0..FRAMES)
        .map(|frame| match frame {
            0 => vec![KeyEvent::Pressed(KeyCode::D)],
            f if f == FRAMES / 2 => vec![
                KeyEvent::Released(KeyCode::D),
                KeyEvent::Pressed(KeyCode::W),
            ],
            _ => Vec::new(),
        })
        .collect();
    let mut platform = HeadlessPlatform::scripted(script);
    let mut clock = FixedClock::new(config.frame.fixed_dt);

    let frames = frame_loop.run(&mut platform, &mut clock)?;

    let world = frame_loop.world();
    let mut atlas = SpriteAtlas::uniform_grid("walk", 4, 1);
    atlas.insert("player_0", UvRect::new(0.0, 0.0, 0.25, 0.25));
    let draw_list = collect_draw_list(world);
    let sprites = pack_instances(&draw_list, &atlas, UvRect::FULL);
    let particles = pack_particle_instances(&collect_particle_draws(world), UvRect::FULL);

    let mut camera = Camera2D::default();
    camera.follow(world)?;

    println!("frames run:        {frames}");
    println!("live entities:     {}", world.entity_count());
    println!("sprite instances:  {}", sprites.len());
    println!("particle quads:    {}", particles.len());
    println!("camera center:     {:?}", camera.center);
    let diagnostics = frame_loop.last_diagnostics();
    for (name, time) in &diagnostics.system_times {
        println!("  {name:<10} {time:?}");
    }
    Ok(())
}
