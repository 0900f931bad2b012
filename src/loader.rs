//! OpenGL function loading.
//!
//! Each entry point is first asked of the context resolver
//! (`wglGetProcAddress`). That call is documented to return null on failure,
//! but some drivers return `1`, `2`, `3` or `-1` instead, and it never
//! resolves the GL 1.1 functions exported by `opengl32.dll` itself. Every
//! such answer is collapsed into [`Address::NotFound`] and the lookup falls
//! back to `GetProcAddress` on the driver module.
//!
//! The load is all-or-nothing: a single missing name fails the whole table.

use std::collections::HashMap;
use std::ffi::{CStr, CString, c_void};
use std::ptr::{self, NonNull};

use tracing::{debug, info};

use crate::driver::{GlDriver, ModuleHandle};
use crate::error::{BootstrapError, Result};
use crate::versioned::RenderContext;

/// Library holding the GL 1.1 exports.
pub const DRIVER_MODULE: &CStr = c"opengl32.dll";

/// Non-null values some drivers use to mean "not found".
const SENTINELS: [usize; 4] = [1, 2, 3, usize::MAX];

/// Entry points a 3.3 core renderer needs.
pub const REQUIRED_FUNCTIONS: &[&str] = &[
    // GL 1.1, exported by opengl32.dll
    "glClear",
    "glClearColor",
    "glViewport",
    "glEnable",
    "glDisable",
    "glGetError",
    "glGetString",
    "glGetIntegerv",
    "glDrawArrays",
    // GL 1.5 – 3.3
    "glGetStringi",
    "glGenBuffers",
    "glBindBuffer",
    "glBufferData",
    "glDeleteBuffers",
    "glGenVertexArrays",
    "glBindVertexArray",
    "glDeleteVertexArrays",
    "glVertexAttribPointer",
    "glEnableVertexAttribArray",
    "glCreateShader",
    "glShaderSource",
    "glCompileShader",
    "glGetShaderiv",
    "glGetShaderInfoLog",
    "glDeleteShader",
    "glCreateProgram",
    "glAttachShader",
    "glLinkProgram",
    "glGetProgramiv",
    "glGetProgramInfoLog",
    "glUseProgram",
    "glDeleteProgram",
    "glGetUniformLocation",
    "glUniform4f",
];

// ─────────────────────────────────────────────────────────────────────────────
// Address classification
// ─────────────────────────────────────────────────────────────────────────────

/// Result of a single symbol lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Address {
    Resolved(NonNull<c_void>),
    NotFound,
}

impl Address {
    /// Collapses null and the driver sentinels into `NotFound`.
    pub fn classify(raw: *const c_void) -> Self {
        if SENTINELS.contains(&raw.addr()) {
            return Address::NotFound;
        }
        NonNull::new(raw.cast_mut()).map_or(Address::NotFound, Address::Resolved)
    }

    pub fn resolved(self) -> Option<NonNull<c_void>> {
        match self {
            Address::Resolved(ptr) => Some(ptr),
            Address::NotFound => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Driver module guard
// ─────────────────────────────────────────────────────────────────────────────

/// Loaded driver library, freed when dropped.
pub struct DriverModule<'d, D: GlDriver> {
    driver: &'d D,
    handle: ModuleHandle,
}

impl<'d, D: GlDriver> DriverModule<'d, D> {
    pub fn open(driver: &'d D, name: &CStr) -> Result<Self> {
        let handle = driver
            .load_module(name)
            .ok_or_else(|| BootstrapError::ModuleLoad {
                module: name.to_string_lossy().into_owned(),
            })?;
        Ok(Self { driver, handle })
    }

    pub fn symbol(&self, name: &CStr) -> Address {
        Address::classify(self.driver.module_proc_address(self.handle, name))
    }
}

impl<D: GlDriver> Drop for DriverModule<'_, D> {
    fn drop(&mut self) {
        self.driver.free_module(self.handle);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Function table
// ─────────────────────────────────────────────────────────────────────────────

/// Resolved entry points, keyed by name. Built once by [`load_all`].
#[derive(Debug)]
pub struct FunctionTable {
    entries: HashMap<String, NonNull<c_void>>,
}

impl FunctionTable {
    pub fn get(&self, name: &str) -> Option<NonNull<c_void>> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Typed `glow` wrapper over the table. Names outside the table resolve
    /// to null, which `glow` treats as unsupported.
    ///
    /// # Safety
    ///
    /// The context the table was loaded for must be current on this thread
    /// and must outlive the returned `glow::Context`.
    pub unsafe fn glow_context(&self) -> glow::Context {
        unsafe {
            glow::Context::from_loader_function_cstr(|name| {
                name.to_str()
                    .ok()
                    .and_then(|name| self.get(name))
                    .map_or(ptr::null(), |addr| addr.as_ptr().cast_const())
            })
        }
    }
}

/// Resolves one entry point: context resolver first, then the module.
pub fn resolve<D: GlDriver>(
    driver: &D,
    module: &DriverModule<'_, D>,
    name: &str,
) -> Result<NonNull<c_void>> {
    let not_found = || BootstrapError::FunctionNotFound {
        name: name.to_string(),
    };
    let c_name = CString::new(name).map_err(|_| not_found())?;

    if let Address::Resolved(addr) = Address::classify(driver.context_proc_address(&c_name)) {
        return Ok(addr);
    }

    debug!(name, "wglGetProcAddress missed, falling back to opengl32.dll");
    module.symbol(&c_name).resolved().ok_or_else(not_found)
}

/// Resolves every name in `names` for the current `context`.
pub fn load_all<D: GlDriver>(
    driver: &D,
    context: &RenderContext<D>,
    names: &[&str],
) -> Result<FunctionTable> {
    if context.handle().is_none() || driver.current_context() != context.handle() {
        return Err(BootstrapError::ContextNotCurrent);
    }

    let module = DriverModule::open(driver, DRIVER_MODULE)?;

    let mut entries = HashMap::with_capacity(names.len());
    for name in names {
        let addr = resolve(driver, &module, name)?;
        debug!(name, address = ?addr, "OpenGL procedure loaded");
        entries.insert((*name).to_string(), addr);
    }
    drop(module);

    info!(count = entries.len(), "OpenGL functions loaded");
    Ok(FunctionTable { entries })
}
