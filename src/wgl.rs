//! [`GlDriver`] implementation over GDI and WGL.
//!
//! Thin FFI layer: every method is one windows-sys call plus the conversion
//! between raw handles and the crate's handle types.

use std::ffi::{CStr, c_char, c_void};
use std::mem;
use std::ptr::{self, NonNull};

use tracing::warn;
use windows_sys::Win32::Foundation::GetLastError;
use windows_sys::Win32::Graphics::Gdi::HDC;
use windows_sys::Win32::Graphics::OpenGL::{
    ChoosePixelFormat, HGLRC, PFD_DOUBLEBUFFER, PFD_DRAW_TO_WINDOW, PFD_SUPPORT_OPENGL,
    PFD_TYPE_COLORINDEX, PFD_TYPE_RGBA, PIXELFORMATDESCRIPTOR, SetPixelFormat, wglCreateContext,
    wglDeleteContext, wglGetCurrentContext, wglGetProcAddress, wglMakeCurrent,
};
use windows_sys::Win32::System::LibraryLoader::{FreeLibrary, GetProcAddress, LoadLibraryA};

use crate::driver::{ContextHandle, FormatId, GlDriver, ModuleHandle, SurfaceHandle};
use crate::format::FormatDescriptor;

type GetExtensionsStringArb = unsafe extern "system" fn(hdc: HDC) -> *const c_char;
type CreateContextAttribsArb =
    unsafe extern "system" fn(hdc: HDC, share: HGLRC, attributes: *const i32) -> HGLRC;

/// The system WGL implementation (`opengl32.dll` and the ICD behind it).
#[derive(Debug, Clone, Copy, Default)]
pub struct WglDriver;

fn pixel_format_descriptor(descriptor: &FormatDescriptor) -> PIXELFORMATDESCRIPTOR {
    // SAFETY: PIXELFORMATDESCRIPTOR is plain data; all-zero is a valid value.
    let mut pfd: PIXELFORMATDESCRIPTOR = unsafe { mem::zeroed() };
    pfd.nSize = mem::size_of::<PIXELFORMATDESCRIPTOR>() as u16;
    pfd.nVersion = 1;
    pfd.dwFlags = PFD_SUPPORT_OPENGL;
    if descriptor.draw_to_window {
        pfd.dwFlags |= PFD_DRAW_TO_WINDOW;
    }
    if descriptor.double_buffer {
        pfd.dwFlags |= PFD_DOUBLEBUFFER;
    }
    pfd.iPixelType = if descriptor.rgba {
        PFD_TYPE_RGBA as _
    } else {
        PFD_TYPE_COLORINDEX as _
    };
    pfd.cColorBits = descriptor.color_bits;
    pfd.cAlphaBits = descriptor.alpha_bits;
    pfd.cAccumBits = descriptor.accum_bits;
    pfd.cDepthBits = descriptor.depth_bits;
    pfd.cStencilBits = descriptor.stencil_bits;
    pfd
}

fn proc_to_ptr(proc: Option<unsafe extern "system" fn() -> isize>) -> *const c_void {
    proc.map_or(ptr::null(), |f| f as *const c_void)
}

impl GlDriver for WglDriver {
    fn choose_format(
        &self,
        surface: SurfaceHandle,
        descriptor: &FormatDescriptor,
    ) -> Option<FormatId> {
        let pfd = pixel_format_descriptor(descriptor);
        // SAFETY: `surface` is a live device context supplied by the window shell.
        let index = unsafe { ChoosePixelFormat(surface.as_raw(), &pfd) };
        if index == 0 {
            warn!(error = unsafe { GetLastError() }, "ChoosePixelFormat failed");
        }
        FormatId::new(index)
    }

    fn set_format(
        &self,
        surface: SurfaceHandle,
        format: FormatId,
        descriptor: &FormatDescriptor,
    ) -> bool {
        let pfd = pixel_format_descriptor(descriptor);
        let ok = unsafe { SetPixelFormat(surface.as_raw(), format.get(), &pfd) } != 0;
        if !ok {
            warn!(
                error = unsafe { GetLastError() },
                format = format.get(),
                "SetPixelFormat failed"
            );
        }
        ok
    }

    fn create_context(&self, surface: SurfaceHandle) -> Option<ContextHandle> {
        ContextHandle::from_raw(unsafe { wglCreateContext(surface.as_raw()) })
    }

    fn make_current(&self, binding: Option<(SurfaceHandle, ContextHandle)>) -> bool {
        let (hdc, hglrc) = binding.map_or((ptr::null_mut(), ptr::null_mut()), |(s, c)| {
            (s.as_raw(), c.as_raw())
        });
        unsafe { wglMakeCurrent(hdc, hglrc) != 0 }
    }

    fn current_context(&self) -> Option<ContextHandle> {
        ContextHandle::from_raw(unsafe { wglGetCurrentContext() })
    }

    fn delete_context(&self, context: ContextHandle) -> bool {
        unsafe { wglDeleteContext(context.as_raw()) != 0 }
    }

    fn context_proc_address(&self, name: &CStr) -> *const c_void {
        proc_to_ptr(unsafe { wglGetProcAddress(name.as_ptr().cast()) })
    }

    unsafe fn extensions_string(
        &self,
        proc: NonNull<c_void>,
        surface: SurfaceHandle,
    ) -> Option<String> {
        // SAFETY: caller guarantees `proc` is wglGetExtensionsStringARB.
        let get_extensions: GetExtensionsStringArb = unsafe { mem::transmute(proc.as_ptr()) };
        let raw = unsafe { get_extensions(surface.as_raw()) };
        if raw.is_null() {
            return None;
        }
        // The string is owned by the driver; copy it out and leave it alone.
        Some(unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned())
    }

    unsafe fn create_context_attribs(
        &self,
        proc: NonNull<c_void>,
        surface: SurfaceHandle,
        share: Option<ContextHandle>,
        attributes: &[i32],
    ) -> Option<ContextHandle> {
        debug_assert_eq!(attributes.last(), Some(&0));
        // SAFETY: caller guarantees `proc` is wglCreateContextAttribsARB.
        let create: CreateContextAttribsArb = unsafe { mem::transmute(proc.as_ptr()) };
        let share = share.map_or(ptr::null_mut(), ContextHandle::as_raw);
        ContextHandle::from_raw(unsafe { create(surface.as_raw(), share, attributes.as_ptr()) })
    }

    fn load_module(&self, name: &CStr) -> Option<ModuleHandle> {
        ModuleHandle::from_raw(unsafe { LoadLibraryA(name.as_ptr().cast()) })
    }

    fn module_proc_address(&self, module: ModuleHandle, name: &CStr) -> *const c_void {
        proc_to_ptr(unsafe { GetProcAddress(module.as_raw(), name.as_ptr().cast()) })
    }

    fn free_module(&self, module: ModuleHandle) {
        if unsafe { FreeLibrary(module.as_raw()) } == 0 {
            warn!(error = unsafe { GetLastError() }, "FreeLibrary failed");
        }
    }
}
