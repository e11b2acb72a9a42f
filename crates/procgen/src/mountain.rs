//! Ring-extruded mountain meshes grown outward from a closed boundary polygon.
//!
//! The boundary becomes ring 0. Each extrusion step pushes every corner of the
//! outermost ring away from the boundary centroid and stitches a side wall
//! between the two rings. Rings are then lifted along a rise-then-fall height
//! profile, and a contiguous arc of columns is flattened into a cliff.
//!
//! **Hard edges:** every logical corner is stored as three identical entries in a
//! row (a triplet). Side walls address different slots of a triplet, so a normal
//! recompute from face topology yields flat shading. Any write to a corner goes
//! through all three slots.

use glam::{Vec2, Vec3};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::boundary::{centroid, planar_uv};

/// Vertex-buffer slots per logical corner.
pub const TRIPLET: usize = 3;

/// Precondition failures for a mountain build.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MountainError {
    #[error("boundary needs at least 3 points, got {0}")]
    TooFewPoints(usize),
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },
    #[error("y_variance must not be negative, got {0}")]
    NegativeVariance(f32),
    #[error("peak_offset {peak_offset} leaves no peak layer among {layers} layers")]
    PeakOutOfRange { peak_offset: i32, layers: usize },
    #[error("min_cliff_sides {min} exceeds max_cliff_sides {max}")]
    InvertedCliffRange { min: usize, max: usize },
}

/// Parameters for one mountain build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountainConfig {
    /// Radial distance each ring is pushed away from the centroid.
    pub layer_width: f32,
    /// Upper end of the elevation range (the peak sits at `y_max - y_min`).
    pub y_max: f32,
    /// Lower end of the elevation range.
    pub y_min: f32,
    /// Per-corner jitter amplitude; heights move by up to this much either way.
    pub y_variance: f32,
    /// Layers subtracted from the total ring count to locate the peak ring.
    pub peak_offset: i32,
    /// Number of rings grown outward from the boundary.
    pub extrude_times: u32,
    /// Narrowest cliff arc, in boundary sides (inclusive).
    pub min_cliff_sides: usize,
    /// Widest cliff arc, in boundary sides (inclusive).
    pub max_cliff_sides: usize,
    /// Elevation every carved cliff corner is forced to.
    pub cliff_y: f32,
    /// Seed for jitter and cliff placement.
    pub seed: u64,
}

impl Default for MountainConfig {
    fn default() -> Self {
        Self {
            layer_width: 0.5,
            y_max: 3.0,
            y_min: 0.0,
            y_variance: 0.2,
            peak_offset: 2,
            extrude_times: 6,
            min_cliff_sides: 1,
            max_cliff_sides: 3,
            cliff_y: 2.5,
            seed: 0,
        }
    }
}

impl MountainConfig {
    /// Rings after extrusion, the boundary included.
    pub fn layer_count(&self) -> usize {
        self.extrude_times as usize + 1
    }

    /// Ring index at which the height profile tops out.
    pub fn peak_layer(&self) -> i64 {
        self.layer_count() as i64 - self.peak_offset as i64
    }

    /// Check the parameters before a build. Cliff arcs wider than the boundary
    /// wrap around it, so the boundary size does not constrain them.
    pub fn validate(&self) -> Result<(), MountainError> {
        for (field, value) in [
            ("layer_width", self.layer_width),
            ("y_max", self.y_max),
            ("y_min", self.y_min),
            ("y_variance", self.y_variance),
            ("cliff_y", self.cliff_y),
        ] {
            if !value.is_finite() {
                return Err(MountainError::NonFinite { field, value });
            }
        }
        if self.y_variance < 0.0 {
            return Err(MountainError::NegativeVariance(self.y_variance));
        }
        // The jitter range spans twice the variance.
        if !(2.0 * self.y_variance).is_finite() {
            return Err(MountainError::NonFinite {
                field: "y_variance",
                value: self.y_variance,
            });
        }
        if self.peak_layer() < 1 {
            return Err(MountainError::PeakOutOfRange {
                peak_offset: self.peak_offset,
                layers: self.layer_count(),
            });
        }
        if self.min_cliff_sides > self.max_cliff_sides {
            return Err(MountainError::InvertedCliffRange {
                min: self.min_cliff_sides,
                max: self.max_cliff_sides,
            });
        }
        Ok(())
    }
}

/// Contiguous run of boundary angles whose upper rings were flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliffArc {
    pub start: usize,
    pub sides: usize,
}

impl CliffArc {
    /// Angle indices covered by the arc, wrapping past the last boundary point.
    pub fn angles(&self, angles: usize) -> impl Iterator<Item = usize> {
        let start = self.start;
        (0..self.sides).map(move |j| (start + j) % angles)
    }

    pub fn contains(&self, angle: usize, angles: usize) -> bool {
        self.angles(angles).any(|a| a == angle)
    }
}

/// Elevation of `ring` on the triangular profile: a linear climb to `peak_layer`,
/// then a symmetric descent (negative past twice the peak).
pub fn profile_height(ring: usize, peak_layer: i64, increment: f32) -> f32 {
    let k = ring as i64;
    let steps = if k > peak_layer {
        peak_layer - (peak_layer - k).abs()
    } else {
        k
    };
    steps as f32 * increment
}

/// Vertex, UV and triangle buffers of a mountain, plus the ring bookkeeping
/// needed to address them.
///
/// Corner `(ring, angle)` lives at `ring * ring_stride() + angle * 3` and the two
/// slots after it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountainMesh {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    /// Boundary point count.
    pub angles: usize,
    /// Ring count, the boundary included.
    pub layers: usize,
    /// Origin of every radial extrusion.
    pub centroid: Vec3,
    /// Arc flattened by the cliff pass, if it ran.
    pub cliff: Option<CliffArc>,
}

impl MountainMesh {
    /// Seed the buffers with the boundary as ring 0. An empty boundary yields an
    /// empty mesh.
    pub fn from_boundary(boundary: &[Vec3]) -> Self {
        let Some(center) = centroid(boundary) else {
            return Self::default();
        };

        let mut mesh = Self {
            positions: Vec::with_capacity(boundary.len() * TRIPLET),
            uvs: Vec::with_capacity(boundary.len() * TRIPLET),
            indices: Vec::new(),
            angles: boundary.len(),
            layers: 1,
            centroid: center,
            cliff: None,
        };
        for &p in boundary {
            mesh.push_corner(p);
        }
        mesh
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Distance in vertex slots between the same angle on consecutive rings.
    pub fn ring_stride(&self) -> usize {
        self.angles * TRIPLET
    }

    pub fn corner_index(&self, ring: usize, angle: usize) -> usize {
        ring * self.ring_stride() + angle * TRIPLET
    }

    pub fn corner(&self, ring: usize, angle: usize) -> Vec3 {
        self.positions[self.corner_index(ring, angle)]
    }

    /// Corners of one ring in boundary order.
    pub fn ring_corners(&self, ring: usize) -> impl Iterator<Item = Vec3> + '_ {
        (0..self.angles).map(move |angle| self.corner(ring, angle))
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn push_corner(&mut self, p: Vec3) {
        let uv = planar_uv(p);
        for _ in 0..TRIPLET {
            self.positions.push(p);
            self.uvs.push(uv);
        }
    }

    fn set_corner_y(&mut self, ring: usize, angle: usize, y: f32) {
        let start = self.corner_index(ring, angle);
        for p in &mut self.positions[start..start + TRIPLET] {
            p.y = y;
        }
    }

    /// Grow `times` rings outward, each `layer_width` further from the centroid
    /// along every corner's own radial direction.
    pub fn extrude(&mut self, times: u32, layer_width: f32) {
        if self.angles == 0 {
            return;
        }
        let stride = self.ring_stride();
        self.positions.reserve(stride * times as usize);
        self.uvs.reserve(stride * times as usize);
        self.indices.reserve(self.angles * 6 * times as usize);

        for _ in 0..times {
            self.layers += 1;
            let ring_end = self.positions.len();
            let extrude_start = ring_end - stride;

            for i in (extrude_start..ring_end).step_by(TRIPLET) {
                let current = self.positions[i];
                let outward = (current - self.centroid).normalize_or_zero();
                self.push_corner(current + outward * layer_width);

                // The last angle closes the loop onto the first corner of both rings.
                // Indices past `i + stride` point into the ring still being appended.
                let next = if i + TRIPLET >= ring_end {
                    extrude_start
                } else {
                    i + TRIPLET
                };
                self.indices.extend(
                    [
                        i,
                        i + stride,
                        next + 2,
                        next + 1,
                        i + 1 + stride,
                        next + 2 + stride,
                    ]
                    .map(|v| v as u32),
                );
            }
        }
    }

    /// Lift every ring past the boundary onto the height profile, with an
    /// independent jitter per corner.
    ///
    /// Panics if `config.peak_offset` leaves no peak ring (`layers - peak_offset < 1`).
    pub fn randomize_heights<R: Rng>(&mut self, config: &MountainConfig, rng: &mut R) {
        let peak_layer = self.layers as i64 - config.peak_offset as i64;
        assert!(
            peak_layer >= 1,
            "peak_offset {} leaves no peak layer among {} layers",
            config.peak_offset,
            self.layers
        );
        let increment = (config.y_max - config.y_min) / peak_layer as f32;
        let variance = config.y_variance;

        for ring in 1..self.layers {
            let base = profile_height(ring, peak_layer, increment);
            for angle in 0..self.angles {
                let jitter = if variance > 0.0 {
                    rng.gen_range(-variance..=variance)
                } else {
                    0.0
                };
                self.set_corner_y(ring, angle, base + jitter);
            }
        }
    }

    /// Pick a random arc and flatten it to `config.cliff_y`.
    pub fn carve_cliff<R: Rng>(
        &mut self,
        config: &MountainConfig,
        rng: &mut R,
    ) -> Option<CliffArc> {
        if self.angles == 0 {
            return None;
        }
        let sides = rng.gen_range(config.min_cliff_sides..=config.max_cliff_sides);
        let start = rng.gen_range(0..self.angles);
        let arc = CliffArc { start, sides };
        self.flatten_arc(arc, config.cliff_y);
        Some(arc)
    }

    /// Force every ring except the boundary to elevation `y` along `arc`.
    pub fn flatten_arc(&mut self, arc: CliffArc, y: f32) {
        let angles = self.angles;
        for angle in arc.angles(angles) {
            for ring in 1..self.layers {
                self.set_corner_y(ring, angle, y);
            }
        }
    }
}

/// Builds [`MountainMesh`]es from boundaries with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct MountainBuilder {
    pub config: MountainConfig,
}

impl MountainBuilder {
    pub fn new(config: MountainConfig) -> Self {
        Self { config }
    }

    /// Build with randomness seeded from `config.seed`.
    pub fn build(&self, boundary: &[Vec3]) -> Result<MountainMesh, MountainError> {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.build_with_rng(boundary, &mut rng)
    }

    /// Run ingestion, extrusion, height randomization and cliff carving.
    /// An empty boundary is a no-op that returns an empty mesh.
    pub fn build_with_rng<R: Rng>(
        &self,
        boundary: &[Vec3],
        rng: &mut R,
    ) -> Result<MountainMesh, MountainError> {
        if boundary.is_empty() {
            log::debug!("Empty boundary, skipping mountain build");
            return Ok(MountainMesh::default());
        }
        if boundary.len() < 3 {
            return Err(MountainError::TooFewPoints(boundary.len()));
        }
        self.config.validate()?;

        let mut mesh = MountainMesh::from_boundary(boundary);
        mesh.extrude(self.config.extrude_times, self.config.layer_width);
        mesh.randomize_heights(&self.config, rng);
        mesh.cliff = mesh.carve_cliff(&self.config, rng);

        log::debug!(
            "Built mountain: {} angles, {} layers, {} vertices, {} triangles, cliff {:?}",
            mesh.angles,
            mesh.layers,
            mesh.positions.len(),
            mesh.triangle_count(),
            mesh.cliff
        );
        Ok(mesh)
    }
}
