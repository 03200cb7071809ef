use crate::face::Face;
use cgmath::Vector3;

/// Half the edge length of the skybox cube. The cube is centred on the origin, which is also where
/// the camera sits.
pub const CUBE_HALF_EXTENT: f32 = 1.0;

const S: f32 = CUBE_HALF_EXTENT;

/// The eight shared corners of the cube.
#[rustfmt::skip]
pub const VERTICES: [[f32; 3]; 8] = [
    [-S, -S,  S],
    [ S, -S,  S],
    [ S,  S,  S],
    [-S,  S,  S],
    [-S, -S, -S],
    [ S, -S, -S],
    [ S,  S, -S],
    [-S,  S, -S],
];

/// Indices into [`VERTICES`] for the quad of `face`.
///
/// Every quad is wound counter-clockwise when seen from outside the cube, which is clockwise when
/// seen from the camera at the centre. The skybox pipeline declares clockwise front faces so the
/// inside surface is the front side.
///
/// Note that `Right` sits on the -X side and `Left` on +X; file naming of existing skybox packs
/// depends on this, so it is kept as is.
pub fn face_indices(face: Face) -> [usize; 4] {
    match face {
        Face::Front => [0, 1, 2, 3],
        Face::Back => [5, 4, 7, 6],
        Face::Right => [4, 0, 3, 7],
        Face::Left => [1, 5, 6, 2],
        Face::Up => [3, 2, 6, 7],
        Face::Down => [4, 5, 1, 0],
    }
}

/// The four corner positions of `face`, in quad order.
pub fn face_corners(face: Face) -> [Vector3<f32>; 4] {
    face_indices(face).map(|i| Vector3::from(VERTICES[i]))
}
