use cgmath::{Deg, Matrix4};

/// Pitch is kept within ±90 degrees so the view never flips over the poles.
pub(crate) const PITCH_LIMIT: f32 = 90.0;

/// The skybox camera sits at the centre of the cube and only rotates: `yaw` turns it around the
/// vertical axis and `pitch` tilts it around the horizontal one. Both are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pitch: Deg<f32>,
    yaw: Deg<f32>,
}

/// The coordinate system in Wgpu is based on DirectX and Metal's coordinate systems. That means that
/// in normalized device coordinates, the x-axis and y-axis are in the range of -1 to 1, and the z-axis
/// is 0.0 to +1.0. The `cgmath` crate (as well as most game math crates) is built for OpenGL's coordinate
/// system. This matrix will scale and translate our scene from OpenGL's coordinate system to Wgpu's.
#[rustfmt::skip]
const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

impl OrbitCamera {
    pub fn new<P: Into<Deg<f32>>, Y: Into<Deg<f32>>>(pitch: P, yaw: Y) -> Self {
        let mut camera = Self {
            pitch: pitch.into(),
            yaw: yaw.into(),
        };
        camera.rotate(Deg(0.0), Deg(0.0));
        camera
    }

    pub fn pitch(&self) -> Deg<f32> {
        self.pitch
    }

    pub fn yaw(&self) -> Deg<f32> {
        self.yaw
    }

    /// Adds to both angles. Yaw is left unbounded; pitch is clamped.
    pub fn rotate(&mut self, pitch: Deg<f32>, yaw: Deg<f32>) {
        self.yaw += yaw;
        self.pitch = Deg((self.pitch.0 + pitch.0).clamp(-PITCH_LIMIT, PITCH_LIMIT));
    }

    /// This creates the view matrix. Vertices are turned by yaw first and then by pitch, both
    /// about the world axes.
    pub(crate) fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_x(self.pitch) * Matrix4::from_angle_y(self.yaw)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Deg(20.0), Deg(-30.0))
    }
}

/// The projection only needs to change if the window resizes, so we'll store it separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Deg<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Deg<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: Self::aspect_for(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    fn aspect_for(width: u32, height: u32) -> f32 {
        // A minimised window reports a height of zero.
        width as f32 / height.max(1) as f32
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = Self::aspect_for(width, height);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// A uniform is a blob of data available to every invocation of a set of shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // We can't use cgmath with bytemuck directly, so we'll convert the Matrix4 into a 4x4 f32 array.
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub(crate) fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_proj: cgmath::Matrix4::identity().into(),
        }
    }

    pub(crate) fn update_view_proj(&mut self, camera: &OrbitCamera, projection: &Projection) {
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}
