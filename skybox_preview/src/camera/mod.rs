mod camera;
mod camera_controller;

pub use camera::{CameraUniform, OrbitCamera, Projection};
pub use camera_controller::{CameraController, DragState, PointerEvent, PointerPhase};
