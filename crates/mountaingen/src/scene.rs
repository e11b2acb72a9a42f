//! Mountain scene (boundary + generation parameters). Loaded from a RON file at startup.

use glam::Vec3;
use procgen::{regular_polygon, MountainConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Boundary polygon and the parameters to grow a mountain from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MountainScene {
    /// Closed boundary in winding order; the last point connects back to the first.
    #[serde(default = "default_boundary")]
    pub boundary: Vec<[f32; 3]>,
    #[serde(default)]
    pub mountain: MountainConfig,
}

fn default_boundary() -> Vec<[f32; 3]> {
    regular_polygon(8, 4.0, Vec3::ZERO)
        .into_iter()
        .map(|p| p.to_array())
        .collect()
}

impl Default for MountainScene {
    fn default() -> Self {
        Self {
            boundary: default_boundary(),
            mountain: MountainConfig::default(),
        }
    }
}

impl MountainScene {
    /// Load a scene from `path`. If the file is missing or invalid, returns the default scene.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(data) => match Self::parse(&data) {
                Ok(scene) => return scene,
                Err(e) => log::warn!("Invalid scene at {:?}: {}, using defaults", path, e),
            },
            Err(e) => log::info!("No scene at {:?} ({}), using defaults", path, e),
        }
        Self::default()
    }

    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    pub fn boundary_points(&self) -> Vec<Vec3> {
        self.boundary.iter().copied().map(Vec3::from).collect()
    }
}

/// `mountain.ron` in the current directory.
pub fn default_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("mountain.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_scene_fills_defaults() {
        let scene = MountainScene::parse(
            "(
                boundary: [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 0.0, 1.0), (0.0, 0.0, 1.0)],
                mountain: (extrude_times: 2, peak_offset: 1, seed: 9),
            )",
        )
        .unwrap();

        assert_eq!(scene.boundary.len(), 4);
        assert_eq!(scene.boundary_points()[2], Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(scene.mountain.extrude_times, 2);
        assert_eq!(scene.mountain.peak_offset, 1);
        assert_eq!(scene.mountain.seed, 9);
        assert_eq!(scene.mountain.layer_width, MountainConfig::default().layer_width);
    }

    #[test]
    fn empty_scene_is_default() {
        let scene = MountainScene::parse("()").unwrap();
        assert_eq!(scene.boundary, default_boundary());
        assert_eq!(scene.mountain, MountainConfig::default());
    }

    #[test]
    fn missing_file_falls_back() {
        let scene = MountainScene::load(Path::new("/nonexistent/mountain.ron"));
        assert_eq!(scene.boundary.len(), 8);
    }

    #[test]
    fn invalid_scene_is_an_error() {
        assert!(MountainScene::parse("(boundary: 12)").is_err());
    }
}
