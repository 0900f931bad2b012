//! Winit event loop and window lifecycle.
//!
//! ## Two-phase app
//!
//! Winit 0.30 only allows windows to be created inside `resumed()`, and the
//! GL context needs the window's device context. The app therefore starts
//! in an `Initial` state holding the configuration and switches to
//! `Running` once the window and context exist:
//!
//! ```text
//! App::Initial { config }  →  [resumed()]  →  App::Running(AppState)  →  App::Exited
//! ```
//!
//! ## Frame
//!
//! Every `RedrawRequested` clears the back buffer with the configured color
//! and swaps. `Escape` or closing the window ends the loop; the context is
//! deleted before the device context is released.

use glow::HasContext;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::bootstrap::{BootstrapRequest, Bootstrapped};
use crate::config::Config;
use crate::fatal::ProcessAbort;
use crate::rendering::{self, WindowSurface};
use crate::wgl::WglDriver;

// ─────────────────────────────────────────────────────────────────────────────
// AppState
// ─────────────────────────────────────────────────────────────────────────────

/// Everything alive while the window is open.
///
/// Field order is drop order: the `glow` wrapper, then the GL context, then
/// the device context, then the window.
pub struct AppState {
    gl: glow::Context,
    bootstrapped: Bootstrapped<WglDriver>,
    surface: WindowSurface,
    window: Window,
    clear_color: [f32; 4],
}

impl AppState {
    fn draw(&self) {
        let size = self.window.inner_size();
        let [r, g, b, a] = self.clear_color;
        // SAFETY: the context in `bootstrapped` is current on this thread.
        unsafe {
            self.gl.viewport(0, 0, size.width as i32, size.height as i32);
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }
        self.surface.swap_buffers();
    }

    fn shutdown(&mut self) {
        self.bootstrapped.context.delete();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App
// ─────────────────────────────────────────────────────────────────────────────

pub enum App {
    /// Waiting for winit to call `resumed()`.
    Initial { config: Config },

    /// Window open, context current.
    Running(Box<AppState>),

    /// Event loop is shutting down.
    Exited,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self::Initial { config }
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Self::Running(mut state) = std::mem::replace(self, Self::Exited) {
            state.shutdown();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let config = match self {
            Self::Initial { config } => config.clone(),
            Self::Running(_) | Self::Exited => return,
        };

        // ── 1. Window ──────────────────────────────────────────────────
        let window_attributes = Window::default_attributes()
            .with_title(config.window.title.clone())
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => window,
            Err(e) => {
                error!(error = %e, "Failed to create window");
                event_loop.exit();
                return;
            }
        };

        // ── 2. GL context + function table ─────────────────────────────
        let request = BootstrapRequest::from_config(&config);
        let Ok((surface, bootstrapped)) =
            rendering::create_rendering_context(&window, &request, &ProcessAbort)
        else {
            // ProcessAbort has already terminated the process.
            event_loop.exit();
            return;
        };

        // SAFETY: the context is current and outlives `gl` (see AppState).
        let gl = unsafe { bootstrapped.functions.glow_context() };
        info!(version = ?gl.version(), "OpenGL ready");

        window.request_redraw();

        *self = Self::Running(Box::new(AppState {
            gl,
            bootstrapped,
            surface,
            window,
            clear_color: config.render.clear_color,
        }));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => self.exit(event_loop),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.exit(event_loop),

            WindowEvent::RedrawRequested => {
                if let Self::Running(state) = self {
                    state.draw();
                    state.window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Self::Running(mut state) = std::mem::replace(self, Self::Exited) {
            state.shutdown();
        }
    }
}
