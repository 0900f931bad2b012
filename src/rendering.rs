//! Factory for the window's GPU rendering context.
//!
//! Isolates the window → WGL context step from the event loop: acquire the
//! window's device context, run the negotiation on it, and hand back
//! everything the render loop needs.

use tracing::{info, warn};
use windows_sys::Win32::Foundation::HWND;
use windows_sys::Win32::Graphics::Gdi::{GetDC, ReleaseDC};
use windows_sys::Win32::Graphics::OpenGL::SwapBuffers;
use winit::raw_window_handle::{HasWindowHandle, RawWindowHandle};
use winit::window::Window;

use crate::bootstrap::{self, BootstrapRequest, Bootstrapped};
use crate::driver::SurfaceHandle;
use crate::error::{BootstrapError, Result};
use crate::fatal::FatalHandler;
use crate::wgl::WglDriver;

/// The window's device context, released with `ReleaseDC` on drop.
pub struct WindowSurface {
    hwnd: HWND,
    hdc: SurfaceHandle,
}

impl WindowSurface {
    pub fn acquire(window: &Window) -> Result<Self> {
        let hwnd = match window.window_handle().map(|h| h.as_raw()) {
            Ok(RawWindowHandle::Win32(handle)) => handle.hwnd.get() as HWND,
            _ => return Err(BootstrapError::SurfaceUnavailable),
        };

        let hdc = SurfaceHandle::from_raw(unsafe { GetDC(hwnd) })
            .ok_or(BootstrapError::SurfaceUnavailable)?;
        Ok(Self { hwnd, hdc })
    }

    pub fn handle(&self) -> SurfaceHandle {
        self.hdc
    }

    pub fn swap_buffers(&self) {
        if unsafe { SwapBuffers(self.hdc.as_raw()) } == 0 {
            warn!("SwapBuffers failed");
        }
    }
}

impl Drop for WindowSurface {
    fn drop(&mut self) {
        unsafe {
            ReleaseDC(self.hwnd, self.hdc.as_raw());
        }
    }
}

/// Creates the OpenGL context for `window` and loads its functions.
///
/// Any failure goes to `handler`; with [`crate::fatal::ProcessAbort`] that
/// terminates the process. No GPU, no renderer.
pub fn create_rendering_context(
    window: &Window,
    request: &BootstrapRequest,
    handler: &dyn FatalHandler,
) -> Result<(WindowSurface, Bootstrapped<WglDriver>)> {
    let surface = WindowSurface::acquire(window).inspect_err(|err| handler.fatal(err))?;
    let bootstrapped = bootstrap::run(&WglDriver, surface.handle(), request, handler)?;

    info!(
        functions = bootstrapped.functions.len(),
        format = bootstrapped.context.format().get(),
        "Rendering context ready"
    );
    Ok((surface, bootstrapped))
}
