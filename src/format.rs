//! Surface pixel format selection.
//!
//! A pixel format can be committed to a window only once. The bootstrap calls
//! [`select_format`] exactly twice, with the same descriptor: before the
//! legacy context and again before the versioned one.

use tracing::debug;

use crate::driver::{FormatId, GlDriver, SurfaceHandle};
use crate::error::{BootstrapError, Result};

/// Required surface attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub color_bits: u8,
    pub alpha_bits: u8,
    pub accum_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub double_buffer: bool,
    pub draw_to_window: bool,
    /// RGBA layout (as opposed to color-index).
    pub rgba: bool,
}

impl Default for FormatDescriptor {
    fn default() -> Self {
        Self {
            color_bits: 24,
            alpha_bits: 8,
            accum_bits: 0,
            depth_bits: 24,
            stencil_bits: 8,
            double_buffer: true,
            draw_to_window: true,
            rgba: true,
        }
    }
}

impl FormatDescriptor {
    /// True if `self` provides at least what `required` asks for.
    pub fn meets(&self, required: &FormatDescriptor) -> bool {
        self.color_bits >= required.color_bits
            && self.alpha_bits >= required.alpha_bits
            && self.accum_bits >= required.accum_bits
            && self.depth_bits >= required.depth_bits
            && self.stencil_bits >= required.stencil_bits
            && (self.double_buffer || !required.double_buffer)
            && (self.draw_to_window || !required.draw_to_window)
            && self.rgba == required.rgba
    }
}

/// Picks the driver's closest format for `descriptor` and commits it to the
/// surface. The surface's format state changes permanently.
pub fn select_format<D: GlDriver>(
    driver: &D,
    surface: SurfaceHandle,
    descriptor: &FormatDescriptor,
) -> Result<FormatId> {
    let format = driver
        .choose_format(surface, descriptor)
        .ok_or(BootstrapError::NoMatchingFormat)?;

    if !driver.set_format(surface, format, descriptor) {
        return Err(BootstrapError::SetFormatRejected {
            format: format.get(),
        });
    }

    debug!(format = format.get(), "Pixel format committed");
    Ok(format)
}
