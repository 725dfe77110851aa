//! Scene demo: batches a small asteroid field and renders it headless
//!
//! Usage: `scene_demo [config.toml|config.ron]`

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use render_engine::foundation::logging;
use render_engine::prelude::*;
use render_engine::render::backends::headless::{HandleKind, HeadlessCommand};

const ASTEROID_COUNT: usize = 48;
const FRAME_COUNT: u64 = 6;
const FIELD_RADIUS: f32 = 40.0;

fn load_config() -> Result<RendererConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading renderer config from {}", path);
            RendererConfig::load_from_file(&path)
        }
        None => Ok(RendererConfig::default()),
    }
}

fn quad() -> (Vec<Vertex>, Vec<u32>) {
    let normal = [0.0, 0.0, 1.0];
    let vertices = vec![
        Vertex::new([-0.5, -0.5, 0.0], normal, [0.0, 0.0]),
        Vertex::new([0.5, -0.5, 0.0], normal, [1.0, 0.0]),
        Vertex::new([0.5, 0.5, 0.0], normal, [1.0, 1.0]),
        Vertex::new([-0.5, 0.5, 0.0], normal, [0.0, 1.0]),
    ];
    (vertices, vec![0, 1, 2, 2, 3, 0])
}

fn octahedron() -> (Vec<Vertex>, Vec<u32>) {
    let points = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];
    let vertices = points.iter().map(|p| Vertex::new(*p, *p, [0.5, 0.5])).collect();
    let indices = vec![
        0, 2, 4, 2, 1, 4, 1, 3, 4, 3, 0, 4, //
        2, 0, 5, 1, 2, 5, 3, 1, 5, 0, 3, 5,
    ];
    (vertices, indices)
}

fn checker_texels(size: u32) -> Vec<u8> {
    (0..size * size)
        .flat_map(|i| {
            let on = ((i % size) + (i / size)) % 2 == 0;
            if on { [220, 220, 220, 255] } else { [40, 40, 40, 255] }
        })
        .collect()
}

fn random_position(rng: &mut StdRng) -> Vec3 {
    Vec3::new(
        rng.gen_range(-FIELD_RADIUS..FIELD_RADIUS),
        rng.gen_range(-FIELD_RADIUS..FIELD_RADIUS),
        rng.gen_range(-FIELD_RADIUS..0.0),
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_level(log::LevelFilter::Info);

    log::info!("Starting scene demo");
    let config = load_config()?;
    log::info!(
        "Batching policy {:?}, rendering path {:?}",
        config.batching_policy,
        config.rendering_path
    );

    let (mut graphics, probe) = GraphicsSystem::headless(config);
    let mut rng = StdRng::seed_from_u64(2024);

    log::info!("Creating meshes...");
    let (rock_vertices, rock_indices) = octahedron();
    let rock = graphics.create_mesh("rock", &rock_vertices, Some(rock_indices.as_slice()), PrimitiveTopology::TriangleList)?;
    let (quad_vertices, quad_indices) = quad();
    let panel = graphics.create_mesh("panel", &quad_vertices, Some(quad_indices.as_slice()), PrimitiveTopology::TriangleList)?;

    log::info!("Creating materials...");
    let checker = graphics.create_texture(
        &TextureDescriptor::new(8, 8, TextureFormat::Rgba8Srgb).with_label("checker"),
        &checker_texels(8),
    )?;
    let basalt = graphics.create_material(
        MaterialDescriptor::opaque("standard", MaterialParams::with_color(0.3, 0.3, 0.35)).with_label("basalt"),
    )?;
    let iron = graphics.create_material(
        MaterialDescriptor::opaque("standard", MaterialParams::with_color(0.6, 0.4, 0.3))
            .with_label("iron")
            .with_texture(0, checker),
    )?;
    let ice = graphics.create_material(
        MaterialDescriptor::transparent("standard", MaterialParams::with_color(0.7, 0.9, 1.0).with_alpha(0.4))
            .with_label("ice"),
    )?;
    let hud = graphics.create_material(
        MaterialDescriptor::new("unlit")
            .with_label("hud")
            .with_state(GraphicsContextState::overlay()),
    )?;

    let mut scene = graphics.create_scene();
    let mut asteroids = Vec::with_capacity(ASTEROID_COUNT);
    for _ in 0..ASTEROID_COUNT {
        let transform = Transform::from_position(random_position(&mut rng)).with_uniform_scale(rng.gen_range(0.5..3.0));
        let renderable = match rng.gen_range(0..3) {
            0 => Renderable::new(rock, basalt),
            1 => Renderable::new(rock, iron),
            _ => Renderable::new(rock, ice).in_group(RenderGroup::Transparent),
        };
        asteroids.push(scene.on_attached(renderable.with_transform(&transform)));
    }
    let hud_panel = scene.on_attached(Renderable::new(panel, hud).in_group(RenderGroup::Overlay));
    log::info!(
        "Attached {} renderables into {} batches",
        scene.len(),
        scene.batches().batch_count()
    );

    let frame = FrameData::look_at(Vec3::new(0.0, 0.0, 20.0), Vec3::new(0.0, 0.0, 0.0), 1.0, 16.0 / 9.0)
        .with_light(LightData::directional(Vec3::new(-0.5, -1.0, -0.3), Vec3::new(1.0, 0.95, 0.9), 1.2));

    for frame_number in 0..FRAME_COUNT {
        match frame_number {
            1 => {
                log::info!("Refreezing a third of the field");
                for id in asteroids.iter().step_by(3) {
                    scene.on_material_or_mesh_changed(*id, Some(rock), Some(ice));
                    scene.set_group(*id, RenderGroup::Transparent);
                }
            }
            2 => {
                log::info!("Tinting iron");
                graphics.update_material_params(iron, MaterialParams::with_color(0.8, 0.3, 0.2))?;
            }
            3 => {
                log::info!("Hiding the HUD and drifting a few rocks");
                scene.set_enabled(hud_panel, false);
                for id in asteroids.iter().take(4) {
                    let transform = Transform::from_position(random_position(&mut rng));
                    scene.set_transform(*id, &transform);
                }
            }
            4 => {
                log::info!("Unloading the checker texture");
                graphics.destroy_texture(checker);
            }
            _ => {}
        }

        probe.clear_commands();
        let stats = graphics.render_frame(&scene, &frame)?;
        log::info!("{}", stats);
        log::info!(
            "  {} draw commands recorded, {:.2} draws per batch",
            probe.count_commands(|c| matches!(c, HeadlessCommand::Draw { .. })),
            stats.avg_draws_per_batch()
        );
    }

    log::info!(
        "Live handles before shutdown: {} ({} materials)",
        probe.live_handles(),
        probe.live_handles_of(HandleKind::Material)
    );
    scene.clear();
    drop(graphics);
    log::info!(
        "Live handles after shutdown: {}, double releases: {}",
        probe.live_handles(),
        probe.double_releases()
    );

    Ok(())
}
