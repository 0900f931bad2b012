//! Temporary version-less context used only to query driver capabilities.
//!
//! `wglGetProcAddress` needs a current context before it will hand out the
//! ARB extension entry points, so the protocol first creates a plain
//! `wglCreateContext` context, uses it for the query, then throws it away.
//!
//! [`LegacyContext`] owns that context. Teardown (clear current if bound,
//! then delete) runs in [`LegacyContext::release`] or, on any early exit,
//! in `Drop`. `release` hands back a [`LegacyReleased`] proof which the
//! versioned creator requires, so the real context cannot be created while
//! the temporary one still exists.

use tracing::{debug, warn};

use crate::driver::{ContextHandle, GlDriver, SurfaceHandle};
use crate::error::{BootstrapError, Result, Stage};

/// Owned temporary context on a surface.
///
/// Dropping it (or calling [`LegacyContext::release`]) clears the thread's
/// binding if this context is bound, then deletes it.
pub struct LegacyContext<'d, D: GlDriver> {
    driver: &'d D,
    surface: SurfaceHandle,
    handle: Option<ContextHandle>,
}

/// Proof that the legacy context has been torn down.
#[derive(Debug)]
pub struct LegacyReleased {
    _private: (),
}

impl<'d, D: GlDriver> LegacyContext<'d, D> {
    /// Creates the context. The surface must already have a committed
    /// pixel format. The context is not made current.
    pub fn create(driver: &'d D, surface: SurfaceHandle) -> Result<Self> {
        let handle = driver
            .create_context(surface)
            .ok_or(BootstrapError::LegacyContextCreation)?;

        debug!(context = ?handle, "Temporary render context created");
        Ok(Self {
            driver,
            surface,
            handle: Some(handle),
        })
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
                stage: Stage::LegacyContext,
            })
        }
    }

    /// The underlying context. `None` only once torn down.
    pub fn handle(&self) -> Option<ContextHandle> {
        self.handle
    }

    /// Tears the context down and returns the proof required to create the
    /// versioned context.
    pub fn release(mut self) -> LegacyReleased {
        self.teardown();
        LegacyReleased { _private: () }
    }

    fn teardown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        if self.driver.current_context() == Some(handle) && !self.driver.make_current(None) {
            warn!(context = ?handle, "Failed to clear the current render context");
        }
        if !self.driver.delete_context(handle) {
            warn!(context = ?handle, "wglDeleteContext failed on the temporary context");
        }
        debug!(context = ?handle, "Temporary render context released");
    }
}

impl<D: GlDriver> Drop for LegacyContext<'_, D> {
    fn drop(&mut self) {
        self.teardown();
    }
}
