//! # wglboot — OpenGL context bootstrap for Windows
//!
//! Creates a window, negotiates a pixel format with the driver, establishes
//! an OpenGL core context of a requested version through the two-phase WGL
//! protocol, and resolves the GL entry points into a function table.
//!
//! ## Module layout
//!
//! Negotiation core (platform-independent, driven through [`driver::GlDriver`]):
//!
//! - [`format`]: Pixel format selection and commit.
//! - [`legacy`]: Temporary version-less context, torn down on every path.
//! - [`extensions`]: `wglGetExtensionsStringARB` query and token matching.
//! - [`versioned`]: `wglCreateContextAttribsARB` and the owned [`versioned::RenderContext`].
//! - [`loader`]: Function table with the `wglGetProcAddress` → `opengl32.dll` fallback.
//! - [`bootstrap`]: Runs the stages in order and reports failures to a [`fatal::FatalHandler`].
//!
//! Ambient:
//!
//! - [`config`]: TOML configuration (window, context, pixel format, clear color).
//! - [`error`] / [`fatal`]: Failure taxonomy and process-terminating handler.
//!
//! Windows shell:
//!
//! - `wgl`: [`driver::GlDriver`] over GDI/WGL (windows-sys).
//! - `rendering`: Window → device context → bootstrapped context.
//! - `app`: Winit event loop, clear-and-swap render loop.

pub mod bootstrap;
pub mod config;
pub mod driver;
pub mod error;
pub mod extensions;
pub mod fatal;
pub mod format;
pub mod legacy;
pub mod loader;
pub mod versioned;

#[cfg(windows)]
pub mod app;
#[cfg(windows)]
pub mod rendering;
#[cfg(windows)]
pub mod wgl;

#[cfg(test)]
mod mock_driver;
