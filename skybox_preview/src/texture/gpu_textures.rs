use super::texture_basic::Texture;
use super::texture_cache::TextureBackend;
use crate::error::TextureError;
use image::RgbaImage;

/// A face texture on the GPU together with the bind group the skybox shader samples it through.
pub struct FaceTexture {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

impl FaceTexture {
    pub fn new(
        device: &wgpu::Device,
        texture: Texture,
        layout: &wgpu::BindGroupLayout,
        label: Option<&str>,
    ) -> Self {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label,
        });
        Self {
            texture,
            bind_group,
        }
    }

    /// The opaque white texture bound for faces that have nothing loaded.
    pub fn untextured(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let label = Some("untextured");
        let texture = Texture::solid(device, queue, [255, 255, 255, 255], label);
        Self::new(device, texture, layout, label)
    }

    pub fn create_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("face_texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        })
    }
}

/// [`TextureBackend`] that puts face textures on a wgpu device.
pub struct GpuTextureBackend<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    layout: &'a wgpu::BindGroupLayout,
}

impl<'a> GpuTextureBackend<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        layout: &'a wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            device,
            queue,
            layout,
        }
    }
}

impl TextureBackend for GpuTextureBackend<'_> {
    type Handle = FaceTexture;

    fn create(&mut self, label: &str, bitmap: &RgbaImage) -> Result<FaceTexture, TextureError> {
        let (width, height) = bitmap.dimensions();
        let max = self.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            return Err(TextureError::ResourceExhaustion(format!(
                "{label} is {width}x{height}, the device allows at most {max}x{max}"
            )));
        }

        let texture = Texture::from_rgba(self.device, self.queue, bitmap, Some(label));
        Ok(FaceTexture::new(self.device, texture, self.layout, Some(label)))
    }

    fn release(&mut self, handle: FaceTexture) {
        // Free the GPU memory now instead of whenever the last reference goes away.
        handle.texture.texture.destroy();
    }
}
