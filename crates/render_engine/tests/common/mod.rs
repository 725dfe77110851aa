//! Shared fixtures for integration tests

#![allow(dead_code)]

use render_engine::prelude::*;
use render_engine::render::backends::headless::HeadlessProbe;

/// A headless graphics system with a few meshes and materials ready to use
pub struct Fixture {
    pub graphics: GraphicsSystem,
    pub probe: HeadlessProbe,
    pub meshes: Vec<MeshId>,
    pub materials: Vec<MaterialId>,
}

impl Fixture {
    pub fn new(config: RendererConfig, mesh_count: usize, material_count: usize) -> Self {
        render_engine::foundation::logging::init();
        let (mut graphics, probe) = GraphicsSystem::headless(config);

        let meshes = (0..mesh_count)
            .map(|i| {
                graphics
                    .create_mesh(&format!("mesh_{i}"), &triangle(), None, PrimitiveTopology::TriangleList)
                    .expect("mesh")
            })
            .collect();

        let materials = (0..material_count)
            .map(|i| {
                let color = MaterialParams::with_color(i as f32 / 4.0, 0.5, 0.5);
                graphics
                    .create_material(MaterialDescriptor::new("standard").with_label(format!("mat_{i}")).with_params(color))
                    .expect("material")
            })
            .collect();

        Self { graphics, probe, meshes, materials }
    }

    pub fn lenient_scene(&self) -> RenderScene {
        self.graphics.create_scene().with_strict_logic_errors(false)
    }

    pub fn render(&mut self, scene: &RenderScene) -> RenderingStatistics {
        self.graphics
            .render_frame(scene, &FrameData::default())
            .expect("frame")
            .clone()
    }
}

pub fn triangle() -> Vec<Vertex> {
    vec![
        Vertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
        Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
        Vertex::new([0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]),
    ]
}
