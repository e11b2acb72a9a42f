//! Mesh data structures: CPU-side geometry and its GPU upload.

use crate::vertex::Vertex;
use glam::{Vec2, Vec3, Vec4};
use wgpu::util::DeviceExt;

/// A GPU mesh with vertex and index buffers.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    /// Create a mesh from vertex and index data.
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing every point. `None` when there are no points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for p in points {
            aabb.min = aabb.min.min(p);
            aabb.max = aabb.max.max(p);
        }
        Some(aabb)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Mesh data before GPU upload (single submesh, triangle list).
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub bounds: Option<Aabb>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle parallel position/UV buffers and a triangle index list.
    /// Normals and tangents are placeholders until recalculated.
    pub fn from_geometry(positions: &[Vec3], uvs: &[Vec2], indices: &[u32]) -> Self {
        assert_eq!(
            positions.len(),
            uvs.len(),
            "position and UV buffers must be parallel"
        );
        let vertices = positions
            .iter()
            .zip(uvs)
            .map(|(p, uv)| Vertex::new((*p).into(), [0.0, 1.0, 0.0], (*uv).into()))
            .collect();
        Self {
            vertices,
            indices: indices.to_vec(),
            bounds: None,
        }
    }

    /// Recompute bounds, normals and tangents, in that order.
    pub fn finalized(mut self) -> Self {
        self.recalculate_bounds();
        self.recalculate_normals();
        self.recalculate_tangents();
        self
    }

    pub fn recalculate_bounds(&mut self) -> Option<Aabb> {
        self.bounds = Aabb::from_points(self.vertices.iter().map(|v| Vec3::from(v.position)));
        self.bounds
    }

    /// Per-vertex normals from face topology. Faces only influence the vertices
    /// they index, so duplicated vertices keep independent normals.
    pub fn recalculate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let v0 = Vec3::from(self.vertices[i0].position);
            let v1 = Vec3::from(self.vertices[i1].position);
            let v2 = Vec3::from(self.vertices[i2].position);

            let n = (v1 - v0).cross(v2 - v0).normalize_or_zero();
            normals[i0] += n;
            normals[i1] += n;
            normals[i2] += n;
        }

        for (vertex, n) in self.vertices.iter_mut().zip(normals) {
            let n = n.try_normalize().unwrap_or(Vec3::Y);
            vertex.normal = n.into();
        }
    }

    /// Tangent frames from the UV mapping. Requires normals to be current.
    pub fn recalculate_tangents(&mut self) {
        let mut tan_u = vec![Vec3::ZERO; self.vertices.len()];
        let mut tan_v = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (a, b, c) = (&self.vertices[i0], &self.vertices[i1], &self.vertices[i2]);

            let e1 = Vec3::from(b.position) - Vec3::from(a.position);
            let e2 = Vec3::from(c.position) - Vec3::from(a.position);
            let d1 = Vec2::from(b.tex_coords) - Vec2::from(a.tex_coords);
            let d2 = Vec2::from(c.tex_coords) - Vec2::from(a.tex_coords);

            let det = d1.x * d2.y - d2.x * d1.y;
            if det.abs() < 1e-12 {
                // No UV area (e.g. a vertical wall under planar mapping).
                continue;
            }
            let r = 1.0 / det;
            let sdir = (e1 * d2.y - e2 * d1.y) * r;
            let tdir = (e2 * d1.x - e1 * d2.x) * r;

            for i in [i0, i1, i2] {
                tan_u[i] += sdir;
                tan_v[i] += tdir;
            }
        }

        for (i, vertex) in self.vertices.iter_mut().enumerate() {
            let n = Vec3::from(vertex.normal);
            let t = (tan_u[i] - n * n.dot(tan_u[i]))
                .try_normalize()
                .unwrap_or_else(|| n.any_orthonormal_vector());
            let w = if n.cross(t).dot(tan_v[i]) < 0.0 { -1.0 } else { 1.0 };
            vertex.tangent = Vec4::new(t.x, t.y, t.z, w).into();
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn upload(&self, device: &wgpu::Device) -> Mesh {
        Mesh::new(device, &self.vertices, &self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_triangle() -> MeshData {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
        ];
        let uvs = positions.map(|p| Vec2::new(p.x, p.z));
        MeshData::from_geometry(&positions, &uvs, &[0, 1, 2])
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let mut data = flat_triangle();
        data.vertices[1].position[1] = 4.0;
        let bounds = data.recalculate_bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 4.0, 1.0));
        assert_eq!(bounds.center(), Vec3::new(0.5, 2.0, 0.5));
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        let data = MeshData::new().finalized();
        assert!(data.bounds.is_none());
        assert_eq!(data.triangle_count(), 0);
    }

    #[test]
    fn flat_triangle_faces_up() {
        let data = flat_triangle().finalized();
        for v in &data.vertices {
            assert_eq!(v.normal, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn tangent_follows_u_axis() {
        let data = flat_triangle().finalized();
        for v in &data.vertices {
            let t = Vec4::from(v.tangent).truncate();
            assert!((t - Vec3::X).length() < 1e-6);
            assert_eq!(v.tangent[3], -1.0);
        }
    }

    #[test]
    fn duplicated_vertices_keep_separate_normals() {
        // Two faces meeting at a right angle along the X axis, corners duplicated.
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let uvs = positions.map(|p| Vec2::new(p.x, p.z));
        let data = MeshData::from_geometry(&positions, &uvs, &[0, 1, 2, 3, 4, 5]).finalized();

        assert_eq!(data.vertices[0].normal, [0.0, 1.0, 0.0]);
        assert_eq!(data.vertices[3].normal, [0.0, 0.0, 1.0]);
        // The wall has no UV area; its tangent still lies in the face.
        let n = Vec3::from(data.vertices[3].normal);
        let t = Vec4::from(data.vertices[3].tangent).truncate();
        assert!(n.dot(t).abs() < 1e-6);
        assert!((t.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "must be parallel")]
    fn short_uv_buffer_is_rejected() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Z];
        let uvs = [Vec2::ZERO, Vec2::X];
        MeshData::from_geometry(&positions, &uvs, &[0, 1, 2]);
    }
}
