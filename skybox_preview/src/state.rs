use crate::camera::{CameraController, CameraUniform, OrbitCamera, Projection};
use crate::config::PreviewConfig;
use crate::face::Slot;
use crate::mesh::RenderMode;
use crate::resources::{SourceMode, Staging};
use crate::skybox::SkyboxRenderer;
use crate::texture::{FaceTexture, GpuTextureBackend, Texture, TextureCache};
use crate::uv::TessellationFactor;
use anyhow::Context;
use cgmath::Deg;
use image::DynamicImage;
use wgpu::util::DeviceExt;
use winit::window::Window;

pub(super) struct State<'window> {
    surface: wgpu::Surface<'window>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    depth_texture: Texture,
    projection: Projection,
    camera_controller: CameraController,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    textures: TextureCache<FaceTexture>,
    untextured: FaceTexture,
    skybox: SkyboxRenderer,
    render_mode: RenderMode,
    tessellation: TessellationFactor,
    // The window must be declared after the surface so it gets dropped after it as the surface
    // contains unsafe references to the window's resources.
    window: &'window Window,
}

impl<'window> State<'window> {
    // Creating some of the wgpu types requires async code
    pub(crate) async fn new(
        window: &'window Window,
        settings: &PreviewConfig,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();
        // The instance is a handle to our GPU
        // Backends::all => Vulkan + Metal + DX12 + Browser WebGPU
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // The surface borrows the window, which outlives `State`.
        let surface = instance
            .create_surface(window)
            .context("creating the window surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter can present to this window")?;
        log::info!("using adapter {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    label: None,
                },
                None,
            )
            .await
            .context("requesting a device")?;

        let surface_caps = surface.get_capabilities(&adapter);

        // The shader assumes an sRGB surface texture, anything else comes out darker.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface supports no formats")?;
        log::info!("surface format {surface_format:?}");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth_texture = Texture::create_depth_texture(&device, &config, "depth_texture");

        let preview = &settings.preview;
        let camera = OrbitCamera::new(Deg(preview.initial_pitch), Deg(preview.initial_yaw));
        let (fov_y, z_near, z_far) = preview.frustum();
        let projection = Projection::new(config.width, config.height, Deg(fov_y), z_near, z_far);
        let camera_controller = CameraController::new(camera, preview.sensitivity);

        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj(camera_controller.camera(), &projection);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("camera_bind_group_layout"),
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        let texture_layout = FaceTexture::create_bind_group_layout(&device);
        let untextured = FaceTexture::untextured(&device, &queue, &texture_layout);
        let skybox = SkyboxRenderer::new(
            &device,
            config.format,
            &camera_bind_group_layout,
            &texture_layout,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            depth_texture,
            projection,
            camera_controller,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            texture_layout,
            textures: TextureCache::new(),
            untextured,
            skybox,
            render_mode: RenderMode::default(),
            tessellation: preview.tessellation(),
            window,
        })
    }

    pub fn window(&self) -> &Window {
        self.window
    }

    pub(crate) fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        // A minimised window reports 0x0, which the surface cannot be configured with.
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.projection.resize(new_size.width, new_size.height);
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Texture::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub(crate) fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    /// Returns `true` if the camera controller consumed the event.
    pub(crate) fn input(&mut self, event: &winit::event::WindowEvent) -> bool {
        self.camera_controller.process_events(event)
    }

    pub(crate) fn update(&mut self) {
        self.camera_uniform
            .update_view_proj(self.camera_controller.camera(), &self.projection);
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );
        self.skybox
            .sync(&self.device, self.render_mode, self.tessellation);
    }

    pub(crate) fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("skybox_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.skybox.draw(
                &mut render_pass,
                &self.camera_bind_group,
                &self.textures,
                &self.untextured,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Uploads `bitmap` as the texture of `slot`. Failures are logged and leave the slot either
    /// unchanged (invalid bitmap) or empty (allocation failure); returns `false` in both cases.
    pub(crate) fn load_texture(&mut self, slot: Slot, bitmap: &DynamicImage) -> bool {
        let mut backend = GpuTextureBackend::new(&self.device, &self.queue, &self.texture_layout);
        match self.textures.upload(&mut backend, slot, bitmap) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("{slot}: {e}");
                false
            }
        }
    }

    pub(crate) fn clear_textures(&mut self) {
        let mut backend = GpuTextureBackend::new(&self.device, &self.queue, &self.texture_layout);
        self.textures.clear(&mut backend);
    }

    /// Replaces every texture with the staged images that belong to `mode` and switches to the
    /// mesh that mode is viewed on.
    pub(crate) fn show_staged(&mut self, staging: &Staging, mode: SourceMode) {
        self.clear_textures();
        for slot in mode.slots() {
            if let Some(bitmap) = staging.get(slot) {
                self.load_texture(slot, bitmap);
            }
        }
        self.set_render_mode(mode.render_mode());
    }

    pub(crate) fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    /// Switching modes only changes geometry; textures stay bound to their faces.
    pub(crate) fn set_render_mode(&mut self, mode: RenderMode) {
        if mode != self.render_mode {
            log::info!("render mode {:?} -> {mode:?}", self.render_mode);
            self.render_mode = mode;
        }
    }

    pub(crate) fn tessellation(&self) -> TessellationFactor {
        self.tessellation
    }

    pub(crate) fn set_tessellation(&mut self, tessellation: TessellationFactor) {
        if tessellation != self.tessellation {
            log::info!("tessellation {}", tessellation.get());
            self.tessellation = tessellation;
        }
    }
}
