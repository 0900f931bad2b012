//! Versioned (core profile) context creation.
//!
//! Second half of the negotiation: with the legacy context gone, the pixel
//! format is selected again and `wglCreateContextAttribsARB` creates the
//! real context from an explicit attribute list. The result is a
//! [`RenderContext`] owned by the caller.

use tracing::{info, warn};

use crate::driver::{ContextHandle, FormatId, GlDriver, SurfaceHandle};
use crate::error::{BootstrapError, Result, Stage};
use crate::extensions::{CREATE_CONTEXT_ATTRIBS, ExtensionReport};
use crate::format::{FormatDescriptor, select_format};
use crate::legacy::LegacyReleased;

// https://registry.khronos.org/OpenGL/extensions/ARB/WGL_ARB_create_context.txt
pub const WGL_CONTEXT_MAJOR_VERSION_ARB: i32 = 0x2091;
pub const WGL_CONTEXT_MINOR_VERSION_ARB: i32 = 0x2092;
pub const WGL_CONTEXT_FLAGS_ARB: i32 = 0x2094;
pub const WGL_CONTEXT_PROFILE_MASK_ARB: i32 = 0x9126;
pub const WGL_CONTEXT_DEBUG_BIT_ARB: i32 = 0x0001;
pub const WGL_CONTEXT_FORWARD_COMPATIBLE_BIT_ARB: i32 = 0x0002;
pub const WGL_CONTEXT_CORE_PROFILE_BIT_ARB: i32 = 0x0001;

/// Requested context version and flags. Always core profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextRequest {
    pub major: i32,
    pub minor: i32,
    pub forward_compatible: bool,
    pub debug: bool,
}

impl Default for ContextRequest {
    fn default() -> Self {
        Self {
            major: 3,
            minor: 3,
            forward_compatible: true,
            debug: true,
        }
    }
}

/// Attribute list for `wglCreateContextAttribsARB`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextAttributes {
    pairs: Vec<(i32, i32)>,
}

impl ContextAttributes {
    pub fn new(request: &ContextRequest) -> Self {
        let mut flags = 0;
        if request.forward_compatible {
            flags |= WGL_CONTEXT_FORWARD_COMPATIBLE_BIT_ARB;
        }
        if request.debug {
            flags |= WGL_CONTEXT_DEBUG_BIT_ARB;
        }

        Self {
            pairs: vec![
                (WGL_CONTEXT_MAJOR_VERSION_ARB, request.major),
                (WGL_CONTEXT_MINOR_VERSION_ARB, request.minor),
                (WGL_CONTEXT_PROFILE_MASK_ARB, WGL_CONTEXT_CORE_PROFILE_BIT_ARB),
                (WGL_CONTEXT_FLAGS_ARB, flags),
            ],
        }
    }

    pub fn pairs(&self) -> &[(i32, i32)] {
        &self.pairs
    }

    /// Flattened list, terminated by a `0, 0` pair.
    pub fn to_list(&self) -> Vec<i32> {
        self.pairs
            .iter()
            .flat_map(|&(key, value)| [key, value])
            .chain([0, 0])
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RenderContext
// ─────────────────────────────────────────────────────────────────────────────

/// The versioned context handed to the caller.
///
/// [`RenderContext::delete`] releases it and nulls the handle, so calling it
/// again is a no-op. Dropping the value does the same.
#[derive(Debug)]
pub struct RenderContext<D: GlDriver> {
    driver: D,
    surface: SurfaceHandle,
    format: FormatId,
    handle: Option<ContextHandle>,
}

impl<D: GlDriver> RenderContext<D> {
    /// The underlying context, or `None` after [`RenderContext::delete`].
    pub fn handle(&self) -> Option<ContextHandle> {
        self.handle
    }

    /// Pixel format committed before this context was created.
    pub fn format(&self) -> FormatId {
        self.format
    }

    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }

    /// Binds the context to the calling thread.
    pub fn make_current(&self) -> Result<()> {
        let bound = self
            .handle
            .is_some_and(|handle| self.driver.make_current(Some((self.surface, handle))));
        if bound {
            Ok(())
        } else {
            Err(BootstrapError::MakeCurrentFailed {
                stage: Stage::VersionedContext,
            })
        }
    }

    /// Deletes the context, clearing the thread's binding first if this
    /// context is the bound one. Another context bound to the thread stays
    /// bound.
    pub fn delete(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        if self.driver.current_context() == Some(handle) && !self.driver.make_current(None) {
            warn!(context = ?handle, "Failed to clear the current render context");
        }
        if !self.driver.delete_context(handle) {
            warn!(context = ?handle, "wglDeleteContext failed");
        }
        info!(context = ?handle, "Render context deleted");
    }
}

impl<D: GlDriver> Drop for RenderContext<D> {
    fn drop(&mut self) {
        self.delete();
    }
}

/// Creates the versioned context and makes it current on `surface`.
///
/// Takes the [`LegacyReleased`] proof so it cannot run while the legacy
/// context exists; still refuses if any context is bound to the thread.
pub fn create_versioned_context<D: GlDriver + Clone>(
    driver: &D,
    surface: SurfaceHandle,
    descriptor: &FormatDescriptor,
    report: &ExtensionReport,
    _released: LegacyReleased,
    request: ContextRequest,
) -> Result<RenderContext<D>> {
    if driver.current_context().is_some() {
        return Err(BootstrapError::LegacyStillCurrent);
    }

    let format = select_format(driver, surface, descriptor)?;

    let create_context_attribs =
        report
            .create_context_attribs()
            .ok_or_else(|| BootstrapError::EntryPointUnavailable {
                stage: Stage::VersionedContext,
                name: CREATE_CONTEXT_ATTRIBS.to_string_lossy().into_owned(),
            })?;

    let attributes = ContextAttributes::new(&request).to_list();

    // SAFETY: the address was resolved for wglCreateContextAttribsARB during
    // the extension query, and `attributes` is zero-terminated.
    let handle = unsafe {
        driver.create_context_attribs(create_context_attribs, surface, None, &attributes)
    }
    .ok_or(BootstrapError::VersionedContextCreation {
        major: request.major,
        minor: request.minor,
    })?;

    let context = RenderContext {
        driver: driver.clone(),
        surface,
        format,
        handle: Some(handle),
    };
    context.make_current()?;

    info!(
        major = request.major,
        minor = request.minor,
        forward_compatible = request.forward_compatible,
        debug = request.debug,
        format = format.get(),
        "OpenGL core context created"
    );
    Ok(context)
}
