//! Closed boundary polygons that seed mountain generation.

use glam::{Vec2, Vec3};

/// Arithmetic mean of the boundary points. `None` for an empty boundary.
pub fn centroid(points: &[Vec3]) -> Option<Vec3> {
    if points.is_empty() {
        return None;
    }
    let sum: Vec3 = points.iter().copied().sum();
    Some(sum / points.len() as f32)
}

/// Planar texture coordinate for a position (its XZ footprint).
#[inline]
pub fn planar_uv(p: Vec3) -> Vec2 {
    Vec2::new(p.x, p.z)
}

/// Regular polygon on the XZ plane, wound counter-clockwise when seen from +Y.
pub fn regular_polygon(sides: usize, radius: f32, center: Vec3) -> Vec<Vec3> {
    (0..sides)
        .map(|i| {
            let angle = i as f32 / sides as f32 * std::f32::consts::TAU;
            let (sin_a, cos_a) = angle.sin_cos();
            center + Vec3::new(cos_a * radius, 0.0, sin_a * radius)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_of_square() {
        let square = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        assert_eq!(centroid(&square), Some(Vec3::new(0.5, 0.0, 0.5)));
    }

    #[test]
    fn centroid_of_nothing() {
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn uv_drops_height() {
        assert_eq!(planar_uv(Vec3::new(2.0, 7.5, -3.0)), Vec2::new(2.0, -3.0));
    }

    #[test]
    fn regular_polygon_is_centered() {
        let center = Vec3::new(3.0, 1.0, -2.0);
        let hex = regular_polygon(6, 5.0, center);
        assert_eq!(hex.len(), 6);
        let c = centroid(&hex).unwrap();
        assert!((c - center).length() < 1e-4);
        for p in &hex {
            assert!(((*p - center).length() - 5.0).abs() < 1e-4);
            assert_eq!(p.y, 1.0);
        }
    }
}
