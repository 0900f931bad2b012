//! Driver boundary: the calls the negotiation protocol makes into GDI/WGL.
//!
//! [`GlDriver`] is the black box the protocol talks to. On Windows it is
//! implemented by [`crate::wgl::WglDriver`]; tests use an in-memory driver
//! that records every call.
//!
//! Handles are thin non-null wrappers around the OS pointers (`HDC`,
//! `HGLRC`, `HMODULE`). They are `Copy` but not `Send`: a GL context belongs
//! to the thread that created it.

use std::ffi::{CStr, c_void};
use std::num::NonZeroI32;
use std::ptr::NonNull;

use crate::format::FormatDescriptor;

// ─────────────────────────────────────────────────────────────────────────────
// Handles
// ─────────────────────────────────────────────────────────────────────────────

/// Drawable target (the window's device context). Borrowed, never owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(NonNull<c_void>);

impl SurfaceHandle {
    /// Wraps a raw `HDC`. Returns `None` for null, which every API in this
    /// crate treats as failure.
    pub fn from_raw(raw: *mut c_void) -> Option<Self> {
        NonNull::new(raw).map(Self)
    }

    /// The raw `HDC`, for passing back to the OS.
    pub fn as_raw(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// GL rendering context (`HGLRC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(NonNull<c_void>);

impl ContextHandle {
    /// Wraps a raw `HGLRC`. Returns `None` for null, which every API in this
    /// crate treats as failure.
    pub fn from_raw(raw: *mut c_void) -> Option<Self> {
        NonNull::new(raw).map(Self)
    }

    /// The raw `HGLRC`, for passing back to the OS.
    pub fn as_raw(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Loaded driver library (`HMODULE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleHandle(NonNull<c_void>);

impl ModuleHandle {
    /// Wraps a raw `HMODULE`. Returns `None` for null, which every API in this
    /// crate treats as failure.
    pub fn from_raw(raw: *mut c_void) -> Option<Self> {
        NonNull::new(raw).map(Self)
    }

    /// The raw `HMODULE`, for passing back to the OS.
    pub fn as_raw(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Pixel format index picked by the driver. Zero means "no match" and is
/// never represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatId(NonZeroI32);

impl FormatId {
    /// Wraps a 1-based index. Returns `None` for 0.
    pub fn new(index: i32) -> Option<Self> {
        NonZeroI32::new(index).map(Self)
    }

    /// The index as passed to `SetPixelFormat`.
    pub fn get(self) -> i32 {
        self.0.get()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Driver trait
// ─────────────────────────────────────────────────────────────────────────────

/// Graphics driver and OS calls used during context negotiation.
///
/// Methods mirror the underlying API one-to-one and report failure the way
/// the API does (`None`/`false`/null). Interpreting those failures is the
/// protocol's job, not the driver's.
pub trait GlDriver {
    /// Closest pixel format to `descriptor` (`ChoosePixelFormat`).
    fn choose_format(
        &self,
        surface: SurfaceHandle,
        descriptor: &FormatDescriptor,
    ) -> Option<FormatId>;

    /// Commits `format` to the surface (`SetPixelFormat`). One-shot per surface.
    fn set_format(
        &self,
        surface: SurfaceHandle,
        format: FormatId,
        descriptor: &FormatDescriptor,
    ) -> bool;

    /// Version-less context on the surface (`wglCreateContext`).
    fn create_context(&self, surface: SurfaceHandle) -> Option<ContextHandle>;

    /// Binds a context to the calling thread, or clears the binding with `None`.
    fn make_current(&self, binding: Option<(SurfaceHandle, ContextHandle)>) -> bool;

    /// Context currently bound to the calling thread.
    fn current_context(&self) -> Option<ContextHandle>;

    /// Releases a context (`wglDeleteContext`).
    fn delete_context(&self, context: ContextHandle) -> bool;

    /// Context-specific resolver (`wglGetProcAddress`). The raw value may be
    /// null or one of the historical "not found" sentinels.
    fn context_proc_address(&self, name: &CStr) -> *const c_void;

    /// Calls `wglGetExtensionsStringARB` and copies the driver-owned string.
    ///
    /// # Safety
    ///
    /// `proc` must be the address resolved for `wglGetExtensionsStringARB`
    /// while a context is current on this thread.
    unsafe fn extensions_string(&self, proc: NonNull<c_void>, surface: SurfaceHandle)
    -> Option<String>;

    /// Calls `wglCreateContextAttribsARB` with a zero-terminated attribute list.
    ///
    /// # Safety
    ///
    /// `proc` must be the address resolved for `wglCreateContextAttribsARB`
    /// and `attributes` must end with a `0, 0` pair.
    unsafe fn create_context_attribs(
        &self,
        proc: NonNull<c_void>,
        surface: SurfaceHandle,
        share: Option<ContextHandle>,
        attributes: &[i32],
    ) -> Option<ContextHandle>;

    /// Loads a driver library (`LoadLibraryA`).
    fn load_module(&self, name: &CStr) -> Option<ModuleHandle>;

    /// Exported symbol of a loaded library (`GetProcAddress`).
    fn module_proc_address(&self, module: ModuleHandle, name: &CStr) -> *const c_void;

    /// Releases a library loaded with [`GlDriver::load_module`].
    fn free_module(&self, module: ModuleHandle);
}
