use crate::face::Face;
use crate::mesh::{FaceDrawRange, GeometryCache, RenderMode, SkyboxVertex, Vertex};
use crate::texture::{FaceTexture, Texture, TextureCache};
use crate::uv::TessellationFactor;
use std::ops::Range;
use wgpu::util::DeviceExt;

/// The draw calls the skybox needs from a render pass. Abstracted so the per-face bind and draw
/// sequence can run against something other than a real GPU pass.
pub trait SkyboxPass<'a> {
    type Texture: 'a;

    /// `None` means the face is drawn untextured.
    fn bind_face_texture(&mut self, texture: Option<&'a Self::Texture>);

    /// Draws one triangle strip from the index buffer.
    fn draw_strip(&mut self, indices: Range<u32>, base_vertex: i32);
}

/// Draws every face in [`Face::ALL`] order: one texture bind, then every strip of that face.
pub fn draw_skybox<'a, P, H>(
    pass: &mut P,
    textures: &'a TextureCache<H>,
    faces: &[FaceDrawRange; Face::COUNT],
) where
    P: SkyboxPass<'a, Texture = H>,
{
    for face in Face::ALL {
        let range = &faces[face.index()];
        pass.bind_face_texture(textures.texture_for(face));
        for strip in &range.strips {
            pass.draw_strip(strip.clone(), range.base_vertex);
        }
    }
}

/// [`SkyboxPass`] over a wgpu render pass, with the skybox pipeline and camera already set.
pub struct GpuSkyboxPass<'a, 'p> {
    pass: &'p mut wgpu::RenderPass<'a>,
    untextured: &'a FaceTexture,
}

impl<'a> SkyboxPass<'a> for GpuSkyboxPass<'a, '_> {
    type Texture = FaceTexture;

    fn bind_face_texture(&mut self, texture: Option<&'a FaceTexture>) {
        let texture = texture.unwrap_or(self.untextured);
        self.pass.set_bind_group(1, &texture.bind_group, &[]);
    }

    fn draw_strip(&mut self, indices: Range<u32>, base_vertex: i32) {
        self.pass.draw_indexed(indices, base_vertex, 0..1);
    }
}

struct GeometryBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    faces: [FaceDrawRange; Face::COUNT],
}

/// Pipeline and geometry for drawing the skybox as a backdrop.
///
/// # Backdrop state
/// The camera sits inside the cube, so the pipeline declares clockwise front faces (the cube's
/// quads are clockwise seen from inside) and turns culling off entirely. Depth is tested but never
/// written, so anything drawn afterwards with its own pipeline lands in front of the skybox.
pub struct SkyboxRenderer {
    pipeline: wgpu::RenderPipeline,
    geometry: GeometryCache,
    buffers: Option<GeometryBuffers>,
}

impl SkyboxRenderer {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        camera_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox_pipeline_layout"),
            bind_group_layouts: &[camera_layout, texture_layout],
            push_constant_ranges: &[],
        });
        let pipeline = create_render_pipeline(
            device,
            &pipeline_layout,
            color_format,
            Some(Texture::DEPTH_FORMAT),
            &[SkyboxVertex::desc()],
            wgpu::include_wgsl!("shaders/skybox.wgsl"),
        );

        Self {
            pipeline,
            geometry: GeometryCache::new(),
            buffers: None,
        }
    }

    /// Rebuilds the geometry and its GPU buffers if `mode` or `tessellation` changed since the
    /// last call.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        mode: RenderMode,
        tessellation: TessellationFactor,
    ) {
        if !self.geometry.ensure(mode, tessellation) && self.buffers.is_some() {
            return;
        }

        let packed = self.geometry.pack();
        log::info!(
            "uploading skybox geometry for {:?}: {} vertices, {} indices",
            self.geometry.key(),
            packed.vertices.len(),
            packed.indices.len()
        );
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Skybox Vertex Buffer"),
            contents: bytemuck::cast_slice(&packed.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Skybox Index Buffer"),
            contents: bytemuck::cast_slice(&packed.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        if let Some(old) = self.buffers.take() {
            old.vertex_buffer.destroy();
            old.index_buffer.destroy();
        }
        self.buffers = Some(GeometryBuffers {
            vertex_buffer,
            index_buffer,
            faces: packed.faces,
        });
    }

    pub fn draw<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        camera_bind_group: &'a wgpu::BindGroup,
        textures: &'a TextureCache<FaceTexture>,
        untextured: &'a FaceTexture,
    ) {
        let Some(buffers) = &self.buffers else {
            log::warn!("skybox drawn before its geometry was built");
            return;
        };

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        render_pass.set_vertex_buffer(0, buffers.vertex_buffer.slice(..));
        render_pass.set_index_buffer(buffers.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        let mut pass = GpuSkyboxPass {
            pass: render_pass,
            untextured,
        };
        draw_skybox(&mut pass, textures, &buffers.faces);
    }
}

fn create_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Skybox Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: vertex_layouts,
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleStrip,
            strip_index_format: Some(wgpu::IndexFormat::Uint32),
            front_face: wgpu::FrontFace::Cw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::Slot;
    use crate::texture::test_support::{solid, RecordingBackend};

    #[derive(Debug, PartialEq)]
    enum Command {
        Bind(Option<u32>),
        Draw(Range<u32>, i32),
    }

    #[derive(Default)]
    struct RecordingPass {
        commands: Vec<Command>,
    }

    impl<'a> SkyboxPass<'a> for RecordingPass {
        type Texture = u32;

        fn bind_face_texture(&mut self, texture: Option<&'a u32>) {
            self.commands.push(Command::Bind(texture.copied()));
        }

        fn draw_strip(&mut self, indices: Range<u32>, base_vertex: i32) {
            self.commands.push(Command::Draw(indices, base_vertex));
        }
    }

    fn geometry(mode: RenderMode, n: u32) -> GeometryCache {
        let mut cache = GeometryCache::new();
        cache.ensure(mode, TessellationFactor::new(n).unwrap());
        cache
    }

    /// Commands issued for `face`: from its bind up to the next bind.
    fn face_commands(commands: &[Command], face: Face) -> &[Command] {
        let binds: Vec<usize> = commands
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, Command::Bind(_)))
            .map(|(i, _)| i)
            .collect();
        let start = binds[face.index()];
        let end = binds.get(face.index() + 1).copied().unwrap_or(commands.len());
        &commands[start..end]
    }

    #[test]
    fn empty_cache_draws_every_face_untextured() {
        let textures = TextureCache::<u32>::new();
        let packed = geometry(RenderMode::FlatCube, 20).pack();
        let mut pass = RecordingPass::default();

        draw_skybox(&mut pass, &textures, &packed.faces);

        assert_eq!(pass.commands.len(), 12);
        for face in Face::ALL {
            assert_eq!(face_commands(&pass.commands, face)[0], Command::Bind(None));
        }
    }

    #[test]
    fn flat_red_up_face() {
        let mut backend = RecordingBackend::default();
        let mut textures = TextureCache::new();
        textures
            .upload(&mut backend, Slot::Face(Face::Up), &solid(4, 4, [255, 0, 0, 255]))
            .unwrap();
        let handle = *textures.texture_for(Face::Up).unwrap();

        let cache = geometry(RenderMode::FlatCube, 20);
        let packed = cache.pack();
        let mut pass = RecordingPass::default();
        draw_skybox(&mut pass, &textures, &packed.faces);

        let bound = pass
            .commands
            .iter()
            .filter(|c| **c == Command::Bind(Some(handle)))
            .count();
        assert_eq!(bound, 1);

        let up = face_commands(&pass.commands, Face::Up);
        let base = packed.faces[Face::Up.index()].base_vertex;
        assert_eq!(up.len(), 2);
        assert_eq!(up[1], Command::Draw(16..20, base));

        let uvs: Vec<_> = cache
            .face(Face::Up)
            .unwrap()
            .vertices
            .iter()
            .map(|v| v.tex_coords)
            .collect();
        assert_eq!(uvs, vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        let packed_uvs: Vec<_> = packed.vertices[base as usize..base as usize + 4]
            .iter()
            .map(|v| v.tex_coords)
            .collect();
        assert_eq!(packed_uvs, uvs);
    }

    #[test]
    fn spherical_up_face_with_two_subdivisions() {
        let mut backend = RecordingBackend::default();
        let mut textures = TextureCache::new();
        textures
            .upload(&mut backend, Slot::Face(Face::Up), &solid(4, 4, [255, 0, 0, 255]))
            .unwrap();

        let packed = geometry(RenderMode::SphericalCube, 2).pack();
        let mut pass = RecordingPass::default();
        draw_skybox(&mut pass, &textures, &packed.faces);

        let up = face_commands(&pass.commands, Face::Up);
        assert_eq!(up[0], Command::Bind(Some(1)));
        let strips: Vec<_> = up[1..]
            .iter()
            .map(|c| match c {
                Command::Draw(range, _) => range.len(),
                Command::Bind(_) => panic!("second bind inside a face"),
            })
            .collect();
        assert_eq!(strips, vec![6, 6]);
        assert_eq!(pass.commands.len(), 6 * 3);
    }

    #[test]
    fn faces_are_drawn_in_declaration_order() {
        let mut backend = RecordingBackend::default();
        let mut textures = TextureCache::new();
        for face in Face::ALL {
            textures
                .upload(&mut backend, face.into(), &solid(1, 1, [0, 0, 0, 255]))
                .unwrap();
        }

        let packed = geometry(RenderMode::FlatCube, 1).pack();
        let mut pass = RecordingPass::default();
        draw_skybox(&mut pass, &textures, &packed.faces);

        let binds: Vec<_> = pass
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::Bind(h) => *h,
                Command::Draw(..) => None,
            })
            .collect();
        assert_eq!(binds, vec![1, 2, 3, 4, 5, 6]);
    }
}
