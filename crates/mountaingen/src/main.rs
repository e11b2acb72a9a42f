//! Grows a mountain around a boundary polygon and hands the mesh to the renderer.
//!
//! Usage: `mountaingen [scene.ron]` (defaults to `./mountain.ron`, then built-in defaults).

mod scene;

use anyhow::Result;
use procgen::{MountainBuilder, MountainMesh};
use renderer::{GpuContext, MeshData};
use std::path::PathBuf;

use crate::scene::MountainScene;

/// Bundle the mountain buffers and let the renderer derive bounds, normals and tangents.
fn finalize(mesh: &MountainMesh) -> MeshData {
    MeshData::from_geometry(&mesh.positions, &mesh.uvs, &mesh.indices).finalized()
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(scene::default_path);
    let scene = MountainScene::load(&path);

    let mesh = MountainBuilder::new(scene.mountain.clone()).build(&scene.boundary_points())?;
    if mesh.is_empty() {
        log::warn!("Boundary is empty; nothing to generate");
        return Ok(());
    }
    log::info!(
        "Mountain: {} boundary points, {} layers, {} vertices, {} triangles",
        mesh.angles,
        mesh.layers,
        mesh.positions.len(),
        mesh.triangle_count()
    );
    if let Some(arc) = mesh.cliff {
        log::info!("Cliff: {} sides starting at angle {}", arc.sides, arc.start);
    }

    let data = finalize(&mesh);
    if let Some(bounds) = data.bounds {
        log::info!("Bounds: min {:?}, max {:?}", bounds.min, bounds.max);
    }

    match pollster::block_on(GpuContext::headless()) {
        Ok(gpu) => {
            let gpu_mesh = data.upload(&gpu.device);
            log::info!(
                "Uploaded {} indices to {}",
                gpu_mesh.num_indices,
                gpu.adapter_name
            );
        }
        Err(e) => log::warn!("Skipping GPU upload: {}", e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use procgen::MountainConfig;

    #[test]
    fn default_scene_finalizes() {
        let scene = MountainScene::default();
        let mesh = MountainBuilder::new(scene.mountain.clone())
            .build(&scene.boundary_points())
            .unwrap();
        let data = finalize(&mesh);

        assert_eq!(data.vertices.len(), mesh.positions.len());
        assert_eq!(data.indices, mesh.indices);
        for v in &data.vertices {
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4);
            assert!(v.tangent.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn bounds_reach_the_peak() {
        let config = MountainConfig {
            layer_width: 1.0,
            y_max: 10.0,
            y_min: 0.0,
            y_variance: 0.0,
            peak_offset: 1,
            extrude_times: 2,
            min_cliff_sides: 0,
            max_cliff_sides: 0,
            ..Default::default()
        };
        let square = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let mesh = MountainBuilder::new(config).build(&square).unwrap();
        let bounds = finalize(&mesh).bounds.unwrap();
        assert_eq!(bounds.min.y, 0.0);
        assert_eq!(bounds.max.y, 10.0);
    }
}
