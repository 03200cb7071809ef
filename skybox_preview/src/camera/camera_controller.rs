use super::camera::OrbitCamera;
use cgmath::Deg;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, WindowEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Pressed,
    Moved,
    Released,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: PhysicalPosition<f64>,
    pub phase: PointerPhase,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, phase: PointerPhase) -> Self {
        Self {
            position: PhysicalPosition::new(x, y),
            phase,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// `anchor` is the last sampled pointer position, so every move turns the camera by the
    /// distance since the previous move.
    Dragging { anchor: PhysicalPosition<f64> },
}

/// Owns the camera orientation and turns pointer drags into rotation: horizontal movement changes
/// yaw, vertical movement changes pitch.
pub struct CameraController {
    camera: OrbitCamera,
    state: DragState,
    cursor: PhysicalPosition<f64>,
    sensitivity: f32,
}

impl CameraController {
    pub(crate) fn new(camera: OrbitCamera, sensitivity: f32) -> Self {
        Self {
            camera,
            state: DragState::Idle,
            cursor: PhysicalPosition::new(0.0, 0.0),
            sensitivity,
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> DragState {
        self.state
    }

    /// Returns `true` if the camera moved.
    pub fn process_pointer(&mut self, event: PointerEvent) -> bool {
        match (self.state, event.phase) {
            (_, PointerPhase::Pressed) => {
                self.state = DragState::Dragging {
                    anchor: event.position,
                };
                false
            }
            (DragState::Dragging { anchor }, PointerPhase::Moved) => {
                let dx = (event.position.x - anchor.x) as f32;
                let dy = (event.position.y - anchor.y) as f32;
                self.camera
                    .rotate(Deg(dy * self.sensitivity), Deg(dx * self.sensitivity));
                self.state = DragState::Dragging {
                    anchor: event.position,
                };
                dx != 0.0 || dy != 0.0
            }
            (_, PointerPhase::Released) => {
                self.state = DragState::Idle;
                false
            }
            (DragState::Idle, PointerPhase::Moved) => false,
        }
    }

    /// Translates left button and cursor events of the window. Returns `true` if the event was
    /// consumed.
    pub(crate) fn process_events(&mut self, event: &WindowEvent) -> bool {
        let pointer = match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = *position;
                PointerEvent {
                    position: *position,
                    phase: PointerPhase::Moved,
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => PointerEvent {
                position: self.cursor,
                phase: match state {
                    ElementState::Pressed => PointerPhase::Pressed,
                    ElementState::Released => PointerPhase::Released,
                },
            },
            _ => return false,
        };
        self.process_pointer(pointer);
        true
    }
}
