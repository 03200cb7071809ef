use cgmath::{InnerSpace, Vector3, VectorSpace};
use std::f32::consts::PI;

/// UVs of the four quad corners, in quad order. The whole texture covers the whole face.
pub const FLAT_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// The UV used when no valid spherical sample has been taken yet.
pub const SPHERE_CENTRE_UV: [f32; 2] = [0.5, 0.5];

pub fn flat_uv(corner: usize) -> [f32; 2] {
    FLAT_UVS[corner % FLAT_UVS.len()]
}

/// # Equirectangular mapping
/// The point is pushed out onto the unit sphere and its direction is turned into a longitude
/// (`u`, from `atan2(z, x)`) and a latitude (`v`, from `asin(y)`). The texture seam sits where
/// `atan2` wraps (the -X axis) and both poles collapse a whole texture row into one point; these
/// are properties of the projection.
///
/// Returns `None` for the origin, which has no direction.
pub fn spherical_uv(point: Vector3<f32>) -> Option<[f32; 2]> {
    let length = point.magnitude();
    if !length.is_finite() || length <= f32::EPSILON {
        return None;
    }
    let n = point / length;

    let u = 0.5 + n.z.atan2(n.x) / (2.0 * PI);
    let v = 0.5 - n.y.clamp(-1.0, 1.0).asin() / PI;
    Some([u, v])
}

/// Samples [`spherical_uv`] along a mesh, reusing the previous valid UV for points that have no
/// direction.
#[derive(Debug, Clone, Copy)]
pub struct SphericalSampler {
    last: [f32; 2],
}

impl Default for SphericalSampler {
    fn default() -> Self {
        Self {
            last: SPHERE_CENTRE_UV,
        }
    }
}

impl SphericalSampler {
    pub fn sample(&mut self, point: Vector3<f32>) -> [f32; 2] {
        match spherical_uv(point) {
            Some(uv) => {
                self.last = uv;
                uv
            }
            None => {
                log::trace!("degenerate spherical sample at {point:?}, reusing {:?}", self.last);
                self.last
            }
        }
    }
}

/// Bilinear interpolation across a quad given in quad order: `s` runs from corner 0 to corner 1
/// (and 3 to 2), `t` runs from the 0-1 edge to the 3-2 edge.
pub fn bilinear(corners: &[Vector3<f32>; 4], s: f32, t: f32) -> Vector3<f32> {
    let bottom = corners[0].lerp(corners[1], s);
    let top = corners[3].lerp(corners[2], s);
    bottom.lerp(top, t)
}

/// Subdivision count for the spherical mesh: each face becomes an N×N grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TessellationFactor(u32);

impl TessellationFactor {
    pub const DEFAULT: TessellationFactor = TessellationFactor(20);
    pub const MAX: u32 = 256;

    pub fn new(n: u32) -> Option<Self> {
        (1..=Self::MAX).contains(&n).then_some(Self(n))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn increased(self) -> Self {
        Self((self.0 + 1).min(Self::MAX))
    }

    pub fn decreased(self) -> Self {
        Self(self.0.saturating_sub(1).max(1))
    }
}

impl Default for TessellationFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_uv_eq(a: [f32; 2], b: [f32; 2]) {
        assert_abs_diff_eq!(a[0], b[0], epsilon = 1e-5);
        assert_abs_diff_eq!(a[1], b[1], epsilon = 1e-5);
    }

    #[test]
    fn flat_uvs_cover_the_whole_texture_in_quad_order() {
        let uvs: Vec<_> = (0..4).map(flat_uv).collect();
        assert_eq!(uvs, vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
    }

    #[test]
    fn spherical_uv_of_axis_directions() {
        let cases = [
            (Vector3::new(1.0, 0.0, 0.0), [0.5, 0.5]),
            (Vector3::new(0.0, 0.0, 1.0), [0.75, 0.5]),
            (Vector3::new(0.0, 0.0, -1.0), [0.25, 0.5]),
            (Vector3::new(0.0, 1.0, 0.0), [0.5, 0.0]),
            (Vector3::new(0.0, -1.0, 0.0), [0.5, 1.0]),
        ];
        for (point, expected) in cases {
            assert_uv_eq(spherical_uv(point).unwrap(), expected);
        }
    }

    #[test]
    fn spherical_uv_ignores_distance() {
        let points = [
            Vector3::new(1.0, -1.0, 1.0),
            Vector3::new(0.3, 0.9, -0.2),
            Vector3::new(-1.0, 0.25, 0.5),
        ];
        for p in points {
            let uv = spherical_uv(p).unwrap();
            for k in [0.01f32, 0.5, 2.0, 37.0] {
                assert_uv_eq(spherical_uv(p * k).unwrap(), uv);
            }
        }
    }

    #[test]
    fn spherical_uv_stays_in_unit_square() {
        for i in 0..20 {
            for j in 0..20 {
                let p = Vector3::new(i as f32 - 10.0, j as f32 - 10.0, 3.0 - i as f32 * 0.5);
                if let Some([u, v]) = spherical_uv(p) {
                    assert!((0.0..=1.0).contains(&u));
                    assert!((0.0..=1.0).contains(&v));
                }
            }
        }
    }

    #[test]
    fn origin_has_no_spherical_uv() {
        assert_eq!(spherical_uv(Vector3::new(0.0, 0.0, 0.0)), None);
    }

    #[test]
    fn sampler_reuses_last_valid_uv() {
        let mut sampler = SphericalSampler::default();
        assert_eq!(sampler.sample(Vector3::new(0.0, 0.0, 0.0)), SPHERE_CENTRE_UV);

        let uv = sampler.sample(Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(sampler.sample(Vector3::new(0.0, 0.0, 0.0)), uv);
    }

    #[test]
    fn bilinear_hits_the_corners() {
        let corners = [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        assert_eq!(bilinear(&corners, 0.0, 0.0), corners[0]);
        assert_eq!(bilinear(&corners, 1.0, 0.0), corners[1]);
        assert_eq!(bilinear(&corners, 1.0, 1.0), corners[2]);
        assert_eq!(bilinear(&corners, 0.0, 1.0), corners[3]);
        assert_eq!(bilinear(&corners, 0.5, 0.5), Vector3::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn tessellation_factor_bounds() {
        assert_eq!(TessellationFactor::new(0), None);
        assert_eq!(TessellationFactor::new(1).map(TessellationFactor::get), Some(1));
        assert_eq!(TessellationFactor::new(TessellationFactor::MAX + 1), None);
        assert_eq!(TessellationFactor::default().get(), 20);

        let one = TessellationFactor::new(1).unwrap();
        assert_eq!(one.decreased(), one);
        let max = TessellationFactor::new(TessellationFactor::MAX).unwrap();
        assert_eq!(max.increased(), max);
        assert_eq!(one.increased().get(), 2);
    }
}
