//! Randomized scene mutation checked against a plain reference model
//!
//! Every step mutates the scene and the model the same way, then checks that
//! the batch index still describes exactly the live renderables.

mod common;

use std::collections::{HashMap, HashSet};

use common::Fixture;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use render_engine::prelude::*;
use render_engine::render::systems::batching::{BatchKey, BatchMaterial};

#[derive(Debug, Clone, Copy)]
struct Expected {
    mesh: MeshId,
    material: MaterialId,
    group: RenderGroup,
    enabled: bool,
}

const GROUPS: [RenderGroup; 3] = [RenderGroup::Opaque, RenderGroup::Transparent, RenderGroup::Overlay];

fn check_index(scene: &RenderScene, model: &HashMap<RenderableId, Expected>) {
    assert!(scene.validate().is_ok());
    assert_eq!(scene.len(), model.len());

    let batches = scene.batches();
    assert_eq!(batches.renderable_count(), model.len());

    let summed: usize = batches.iter().map(|(_, batch)| batch.len()).sum();
    assert_eq!(summed, model.len());

    for (_, batch) in batches.iter() {
        assert!(!batch.is_empty(), "empty batch left behind");
        assert!(batch.buckets().iter().all(|bucket| !bucket.is_empty()));
    }

    for (id, expected) in model {
        let batch_id = batches.batch_of(*id).expect("renderable is batched");
        let batch = batches.get(batch_id).expect("batch exists");
        assert_eq!(batch.key(), BatchKey::material(expected.group, Some(expected.material)));
        let bucket = batch.bucket(Some(expected.mesh)).expect("mesh bucket");
        assert!(bucket.renderables().contains(id));
    }

    let keys: HashSet<(RenderGroup, MaterialId)> = model.values().map(|e| (e.group, e.material)).collect();
    assert_eq!(batches.batch_count(), keys.len());
}

fn check_frame(fx: &mut Fixture, scene: &RenderScene, model: &HashMap<RenderableId, Expected>) {
    let stats = fx.render(scene);

    let enabled = model.values().filter(|e| e.enabled).count();
    let live_keys: HashSet<(RenderGroup, MaterialId)> = model
        .values()
        .filter(|e| e.enabled)
        .map(|e| (e.group, e.material))
        .collect();
    let live_buckets: HashSet<(RenderGroup, MaterialId, MeshId)> = model
        .values()
        .filter(|e| e.enabled)
        .map(|e| (e.group, e.material, e.mesh))
        .collect();

    assert_eq!(stats.draw_calls(), enabled);
    assert_eq!(stats.disabled_renderables(), model.len() - enabled);
    assert_eq!(stats.material_binds(), live_keys.len());
    assert_eq!(stats.mesh_binds(), live_buckets.len());
    assert_eq!(stats.batches_visited(), scene.batches().batch_count());
    assert_eq!(stats.skipped_renderables(), 0);
}

fn run_sequence(seed: u64, steps: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut fx = Fixture::new(RendererConfig::new(BatchingPolicy::MaterialGroups), 3, 4);
    let mut scene = fx.graphics.create_scene();
    let mut model: HashMap<RenderableId, Expected> = HashMap::new();

    for step in 0..steps {
        let ids: Vec<RenderableId> = model.keys().copied().collect();
        let pick = |rng: &mut StdRng| ids[rng.gen_range(0..ids.len())];

        match rng.gen_range(0..10) {
            0..=3 => {
                let expected = Expected {
                    mesh: fx.meshes[rng.gen_range(0..fx.meshes.len())],
                    material: fx.materials[rng.gen_range(0..fx.materials.len())],
                    group: GROUPS[rng.gen_range(0..GROUPS.len())],
                    enabled: true,
                };
                let id = scene.on_attached(Renderable::new(expected.mesh, expected.material).in_group(expected.group));
                model.insert(id, expected);
            }
            4..=5 if !ids.is_empty() => {
                let id = pick(&mut rng);
                let detached = scene.on_detached(id).expect("live renderable");
                assert_eq!(detached.material(), Some(model[&id].material));
                model.remove(&id);
            }
            6..=7 if !ids.is_empty() => {
                let id = pick(&mut rng);
                let mesh = fx.meshes[rng.gen_range(0..fx.meshes.len())];
                let material = fx.materials[rng.gen_range(0..fx.materials.len())];
                assert!(scene.on_material_or_mesh_changed(id, Some(mesh), Some(material)));
                let entry = model.get_mut(&id).expect("modelled");
                entry.mesh = mesh;
                entry.material = material;
            }
            8 if !ids.is_empty() => {
                let id = pick(&mut rng);
                let group = GROUPS[rng.gen_range(0..GROUPS.len())];
                assert!(scene.set_group(id, group));
                model.get_mut(&id).expect("modelled").group = group;
            }
            9 if !ids.is_empty() => {
                let id = pick(&mut rng);
                let enabled = rng.gen_bool(0.5);
                assert!(scene.set_enabled(id, enabled));
                model.get_mut(&id).expect("modelled").enabled = enabled;
            }
            _ => {}
        }

        check_index(&scene, &model);
        if step % 10 == 0 {
            check_frame(&mut fx, &scene, &model);
        }
    }

    check_frame(&mut fx, &scene, &model);
    assert_eq!(scene.logic_error_count(), 0);
}

#[test]
fn test_random_sequences_keep_index_consistent() {
    for seed in [1, 7, 42, 1234, 98_765] {
        run_sequence(seed, 300);
    }
}

#[test]
fn test_detach_everything_leaves_no_batches() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut fx = Fixture::new(RendererConfig::new(BatchingPolicy::MaterialGroups), 2, 3);
    let mut scene = fx.graphics.create_scene();

    let mut ids: Vec<RenderableId> = (0..50)
        .map(|_| {
            let mesh = fx.meshes[rng.gen_range(0..fx.meshes.len())];
            let material = fx.materials[rng.gen_range(0..fx.materials.len())];
            scene.on_attached(Renderable::new(mesh, material))
        })
        .collect();

    while !ids.is_empty() {
        let id = ids.swap_remove(rng.gen_range(0..ids.len()));
        assert!(scene.on_detached(id).is_some());
    }

    assert!(scene.batches().is_empty());
    assert_eq!(scene.batches().batch_count(), 0);
    assert_eq!(fx.render(&scene).draw_calls(), 0);
}

#[test]
fn test_reassigning_to_same_resources_is_stable() {
    let mut fx = Fixture::new(RendererConfig::new(BatchingPolicy::MaterialGroups), 1, 2);
    let mut scene = fx.graphics.create_scene();
    let a = scene.on_attached(Renderable::new(fx.meshes[0], fx.materials[0]));
    scene.on_attached(Renderable::new(fx.meshes[0], fx.materials[1]));

    let before: Vec<BatchKey> = scene.batches().iter().map(|(_, batch)| batch.key()).collect();
    for _ in 0..5 {
        assert!(scene.on_material_or_mesh_changed(a, Some(fx.meshes[0]), Some(fx.materials[0])));
    }

    assert_eq!(scene.batches().batch_count(), 2);
    assert_eq!(scene.batches().renderable_count(), 2);
    let after: HashSet<BatchKey> = scene.batches().iter().map(|(_, batch)| batch.key()).collect();
    assert_eq!(after, before.into_iter().collect());
}

#[test]
fn test_single_batch_tracks_every_renderable() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut fx = Fixture::new(RendererConfig::new(BatchingPolicy::SingleBatch), 3, 3);
    let mut scene = fx.graphics.create_scene();
    let mut live = Vec::new();

    for _ in 0..100 {
        if live.is_empty() || rng.gen_bool(0.6) {
            let mesh = fx.meshes[rng.gen_range(0..fx.meshes.len())];
            let material = fx.materials[rng.gen_range(0..fx.materials.len())];
            let group = GROUPS[rng.gen_range(0..GROUPS.len())];
            live.push(scene.on_attached(Renderable::new(mesh, material).in_group(group)));
        } else {
            let id = live.swap_remove(rng.gen_range(0..live.len()));
            scene.on_detached(id);
        }

        let batches = scene.batches();
        assert_eq!(batches.batch_count(), usize::from(!live.is_empty()));
        assert_eq!(batches.renderable_count(), live.len());
        if let Some((_, batch)) = batches.iter().next() {
            assert_eq!(batch.material(), BatchMaterial::Mixed);
            assert_eq!(batch.key(), BatchKey::everything());
        }
    }

    let stats = fx.render(&scene);
    assert_eq!(stats.draw_calls(), live.len());
    assert_eq!(stats.material_binds(), live.len());
}
