pub mod camera;
pub mod config;
pub mod error;
pub mod face;
pub mod geometry;
pub mod mesh;
pub mod resources;
pub mod skybox;
mod state;
pub mod texture;
pub mod uv;

use config::PreviewConfig;
use face::{Face, Slot};
use resources::{SourceMode, Staging};
use state::State;
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey::Code},
    window::WindowBuilder,
};

type StagingEdit =
    fn(&mut Staging, Slot) -> Result<Option<&image::DynamicImage>, error::StagingError>;

/// What the keyboard edits: the staged images, which of them feed the preview and which face the
/// rotate and flip keys apply to.
struct Session {
    staging: Staging,
    source_mode: SourceMode,
    selected: Face,
}

impl Session {
    fn selected_slot(&self) -> Slot {
        match self.source_mode {
            SourceMode::SixImages => Slot::Face(self.selected),
            SourceMode::Stretch => Slot::Stretch,
        }
    }

    /// Returns `true` if the key was handled.
    fn handle_key(&mut self, key: KeyCode, state: &mut State) -> bool {
        match key {
            KeyCode::Tab => state.set_render_mode(state.render_mode().toggled()),
            KeyCode::KeyM => {
                self.source_mode = self.source_mode.toggled();
                log::info!("source mode {:?}", self.source_mode);
                state.show_staged(&self.staging, self.source_mode);
            }
            KeyCode::Digit1 => self.select(Face::Front),
            KeyCode::Digit2 => self.select(Face::Back),
            KeyCode::Digit3 => self.select(Face::Left),
            KeyCode::Digit4 => self.select(Face::Right),
            KeyCode::Digit5 => self.select(Face::Up),
            KeyCode::Digit6 => self.select(Face::Down),
            KeyCode::KeyR => self.edit_selected(state, Staging::rotate),
            KeyCode::KeyF => self.edit_selected(state, Staging::flip),
            KeyCode::Equal | KeyCode::NumpadAdd => {
                state.set_tessellation(state.tessellation().increased())
            }
            KeyCode::Minus | KeyCode::NumpadSubtract => {
                state.set_tessellation(state.tessellation().decreased())
            }
            _ => return false,
        }
        true
    }

    fn select(&mut self, face: Face) {
        log::info!("selected {face}");
        self.selected = face;
    }

    /// Applies `edit` to the selected image and re-uploads the result.
    fn edit_selected(&mut self, state: &mut State, edit: StagingEdit) {
        let slot = self.selected_slot();
        match edit(&mut self.staging, slot) {
            Ok(Some(bitmap)) => {
                state.load_texture(slot, bitmap);
            }
            Ok(None) => log::info!("{slot} has no image to edit"),
            Err(e) => log::warn!("editing {slot}: {e}"),
        }
    }
}

pub async fn run(
    config: PreviewConfig,
    staging: Staging,
    source_mode: SourceMode,
) -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(&config.window.title)
        .with_inner_size(LogicalSize::new(config.window.width, config.window.height))
        .build(&event_loop)?;

    let mut state = State::new(&window, &config).await?;
    state.show_staged(&staging, source_mode);

    let mut session = Session {
        staging,
        source_mode,
        selected: Face::Front,
    };

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            ref event,
            window_id,
        } if window_id == state.window().id() => {
            if !state.input(event) {
                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: Code(KeyCode::Escape),
                                ..
                            },
                        ..
                    } => elwt.exit(),
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: Code(key),
                                repeat: false,
                                ..
                            },
                        ..
                    } => {
                        session.handle_key(*key, &mut state);
                    }
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::RedrawRequested => {
                        state.update();
                        match state.render() {
                            Ok(_) => (),
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                state.resize(state.size())
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("out of GPU memory");
                                elwt.exit()
                            }
                            Err(wgpu::SurfaceError::Timeout) => log::warn!("Surface timeout"),
                        }
                    }
                    _ => (),
                }
            }
        }
        Event::AboutToWait => {
            state.window().request_redraw();
        }
        _ => (),
    })?;

    Ok(())
}
