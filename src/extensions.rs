//! WGL extension capability query.
//!
//! Run while the legacy context is current: resolves
//! `wglGetExtensionsStringARB`, reads the driver's space-delimited token list
//! and checks the two tokens the versioned context needs. When both are
//! present, `wglCreateContextAttribsARB` is resolved for the next stage.

use std::ffi::{CStr, c_void};
use std::ptr::NonNull;

use tracing::{debug, info, warn};

use crate::driver::{GlDriver, SurfaceHandle};
use crate::error::{BootstrapError, Result, Stage};
use crate::legacy::LegacyContext;
use crate::loader::Address;

pub const GET_EXTENSIONS_STRING: &CStr = c"wglGetExtensionsStringARB";
pub const CREATE_CONTEXT_ATTRIBS: &CStr = c"wglCreateContextAttribsARB";

pub const ARB_CREATE_CONTEXT: &str = "WGL_ARB_create_context";
pub const ARB_CREATE_CONTEXT_PROFILE: &str = "WGL_ARB_create_context_profile";

/// What to do when a required extension token is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtensionPolicy {
    /// Fail at the query stage.
    #[default]
    Strict,
    /// Carry on; context creation fails later because
    /// `wglCreateContextAttribsARB` was never resolved.
    Permissive,
}

/// Outcome of the capability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionReport {
    pub create_context: bool,
    pub create_context_profile: bool,
    create_context_attribs: Option<NonNull<c_void>>,
}

impl ExtensionReport {
    /// Address of `wglCreateContextAttribsARB`, if it was resolved.
    pub fn create_context_attribs(&self) -> Option<NonNull<c_void>> {
        self.create_context_attribs
    }

    /// First required token the driver does not advertise.
    pub fn missing_token(&self) -> Option<&'static str> {
        if !self.create_context {
            Some(ARB_CREATE_CONTEXT)
        } else if !self.create_context_profile {
            Some(ARB_CREATE_CONTEXT_PROFILE)
        } else {
            None
        }
    }
}

/// True iff `token` appears as a whole word in `extensions`.
pub fn has_capability(extensions: &str, token: &str) -> bool {
    !token.is_empty() && extensions.split_ascii_whitespace().any(|t| t == token)
}

/// Makes `legacy` current on `surface` and queries the driver's extensions.
pub fn query_extensions<D: GlDriver>(
    driver: &D,
    surface: SurfaceHandle,
    legacy: &LegacyContext<'_, D>,
    policy: ExtensionPolicy,
) -> Result<ExtensionReport> {
    legacy.make_current()?;

    let get_extensions = Address::classify(driver.context_proc_address(GET_EXTENSIONS_STRING))
        .resolved()
        .ok_or_else(|| unavailable(GET_EXTENSIONS_STRING))?;

    // SAFETY: resolved by name above while `legacy` is current.
    let extensions = unsafe { driver.extensions_string(get_extensions, surface) }
        .ok_or(BootstrapError::ExtensionsUnavailable)?;

    let create_context = has_capability(&extensions, ARB_CREATE_CONTEXT);
    let create_context_profile = has_capability(&extensions, ARB_CREATE_CONTEXT_PROFILE);
    debug!(create_context, create_context_profile, extensions = %extensions, "WGL extensions");

    let mut report = ExtensionReport {
        create_context,
        create_context_profile,
        create_context_attribs: None,
    };

    if let Some(token) = report.missing_token() {
        match policy {
            ExtensionPolicy::Strict => return Err(BootstrapError::MissingExtension { token }),
            ExtensionPolicy::Permissive => {
                warn!(token, "Required WGL extension missing, continuing without it");
                return Ok(report);
            }
        }
    }

    report.create_context_attribs =
        Address::classify(driver.context_proc_address(CREATE_CONTEXT_ATTRIBS)).resolved();

    if report.create_context_attribs.is_none() {
        if policy == ExtensionPolicy::Strict {
            return Err(unavailable(CREATE_CONTEXT_ATTRIBS));
        }
        warn!(
            entry_point = %CREATE_CONTEXT_ATTRIBS.to_string_lossy(),
            "Extensions advertised but entry point unresolved, continuing without it"
        );
        return Ok(report);
    }

    info!("WGL context creation extensions available");
    Ok(report)
}

fn unavailable(name: &CStr) -> BootstrapError {
    BootstrapError::EntryPointUnavailable {
        stage: Stage::ExtensionQuery,
        name: name.to_string_lossy().into_owned(),
    }
}
