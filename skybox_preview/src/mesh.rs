use crate::face::Face;
use crate::geometry;
use crate::uv::{self, SphericalSampler, TessellationFactor};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Making `Vertex` a trait will allow us to abstract out the `VertexBufferLayout` creation code to
/// make creating `RenderPipeline`s easier.
pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// `bytemuck::Pod` indicates that our `Vertex` is "Plain Old Data" and can be interpreted as a &[u8].
/// `bytemuck::Zeroable` indicates that we can use `std::mem::zeroed()`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyboxVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex for SkyboxVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;

        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<SkyboxVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// How face textures are mapped onto the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Each texture covers exactly one face.
    #[default]
    FlatCube,
    /// Each face is subdivided and textured through the equirectangular projection, so the cube
    /// reads as a sphere.
    SphericalCube,
}

impl RenderMode {
    pub fn toggled(self) -> Self {
        match self {
            RenderMode::FlatCube => RenderMode::SphericalCube,
            RenderMode::SphericalCube => RenderMode::FlatCube,
        }
    }
}

/// Identifies one build of the geometry. The tessellation factor only matters in spherical mode,
/// so flat keys never carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshKey {
    pub mode: RenderMode,
    pub tessellation: Option<TessellationFactor>,
}

impl MeshKey {
    pub fn new(mode: RenderMode, tessellation: TessellationFactor) -> Self {
        let tessellation = match mode {
            RenderMode::FlatCube => None,
            RenderMode::SphericalCube => Some(tessellation),
        };
        Self { mode, tessellation }
    }
}

/// CPU side mesh of one face. `strips` are ranges into `indices`, each drawn as its own triangle
/// strip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceMesh {
    pub vertices: Vec<SkyboxVertex>,
    pub indices: Vec<u32>,
    pub strips: Vec<Range<u32>>,
}

impl FaceMesh {
    /// The face as a single quad, the whole texture stretched across it. The corners stay in quad
    /// order and the strip visits them as 0, 1, 3, 2.
    pub fn flat(face: Face) -> Self {
        let vertices = geometry::face_corners(face)
            .iter()
            .enumerate()
            .map(|(i, corner)| SkyboxVertex {
                position: (*corner).into(),
                tex_coords: uv::flat_uv(i),
            })
            .collect();

        Self {
            vertices,
            indices: vec![0, 1, 3, 2],
            strips: vec![0..4],
        }
    }

    /// The face as an N×N grid. Grid points are interpolated across the cube face (not the sphere)
    /// and each row becomes one strip of `2 * (N + 1)` vertices.
    pub fn spherical(face: Face, tessellation: TessellationFactor) -> Self {
        let sub = tessellation.get();
        let corners = geometry::face_corners(face);
        let row_len = 2 * (sub + 1);

        let mut sampler = SphericalSampler::default();
        let mut vertices = Vec::with_capacity((sub * row_len) as usize);
        let mut strips = Vec::with_capacity(sub as usize);

        for i in 0..sub {
            let t0 = i as f32 / sub as f32;
            let t1 = (i + 1) as f32 / sub as f32;
            let start = vertices.len() as u32;
            for j in 0..=sub {
                let s = j as f32 / sub as f32;
                for t in [t0, t1] {
                    let position = uv::bilinear(&corners, s, t);
                    vertices.push(SkyboxVertex {
                        position: position.into(),
                        tex_coords: sampler.sample(position),
                    });
                }
            }
            strips.push(start..start + row_len);
        }

        let indices = (0..vertices.len() as u32).collect();
        Self {
            vertices,
            indices,
            strips,
        }
    }

    pub fn build(face: Face, key: MeshKey) -> Self {
        match key.tessellation {
            Some(tessellation) if key.mode == RenderMode::SphericalCube => {
                Self::spherical(face, tessellation)
            }
            _ => Self::flat(face),
        }
    }
}

/// Where one face lives inside the packed buffers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceDrawRange {
    pub base_vertex: i32,
    pub strips: Vec<Range<u32>>,
}

/// All six faces concatenated into one vertex array and one index array, ready for upload.
#[derive(Debug, Clone, Default)]
pub struct PackedGeometry {
    pub vertices: Vec<SkyboxVertex>,
    pub indices: Vec<u32>,
    pub faces: [FaceDrawRange; Face::COUNT],
}

/// Per-face meshes for the current [`MeshKey`]. Meshes are only rebuilt when the key changes,
/// not every frame.
#[derive(Debug, Default)]
pub struct GeometryCache {
    key: Option<MeshKey>,
    faces: Vec<FaceMesh>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<MeshKey> {
        self.key
    }

    /// Makes the cache hold meshes for `mode`/`tessellation`. Returns `true` if anything was
    /// rebuilt.
    pub fn ensure(&mut self, mode: RenderMode, tessellation: TessellationFactor) -> bool {
        let key = MeshKey::new(mode, tessellation);
        if self.key == Some(key) {
            return false;
        }

        self.faces = Face::ALL
            .iter()
            .map(|&face| FaceMesh::build(face, key))
            .collect();
        self.key = Some(key);
        log::debug!(
            "rebuilt skybox geometry for {key:?}: {} vertices",
            self.faces.iter().map(|f| f.vertices.len()).sum::<usize>()
        );
        true
    }

    pub fn face(&self, face: Face) -> Option<&FaceMesh> {
        self.faces.get(face.index())
    }

    pub fn pack(&self) -> PackedGeometry {
        let mut packed = PackedGeometry::default();
        for (mesh, range) in self.faces.iter().zip(packed.faces.iter_mut()) {
            let first_index = packed.indices.len() as u32;
            range.base_vertex = packed.vertices.len() as i32;
            range.strips = mesh
                .strips
                .iter()
                .map(|strip| first_index + strip.start..first_index + strip.end)
                .collect();
            packed.vertices.extend_from_slice(&mesh.vertices);
            packed.indices.extend_from_slice(&mesh.indices);
        }
        packed
    }
}
