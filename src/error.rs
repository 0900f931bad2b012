//! Bootstrap failure taxonomy.
//!
//! Every failure in the negotiation protocol is either a precondition
//! violation or a driver rejection. Each variant knows the [`Stage`] it was
//! raised in and, where one is involved, the entry point it concerns, so the
//! fatal handler can emit a structured diagnostic.

use std::fmt;

use thiserror::Error;

/// Step of the bootstrap sequence a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Acquiring the window's drawing surface.
    Surface,
    /// Choosing and committing the pixel format.
    SurfaceFormat,
    /// Creating or binding the temporary legacy context.
    LegacyContext,
    /// Reading the driver extension string.
    ExtensionQuery,
    /// Creating or binding the versioned context.
    VersionedContext,
    /// Resolving the GL function table.
    FunctionLoading,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Surface => "surface",
            Stage::SurfaceFormat => "surface-format",
            Stage::LegacyContext => "legacy-context",
            Stage::ExtensionQuery => "extension-query",
            Stage::VersionedContext => "versioned-context",
            Stage::FunctionLoading => "function-loading",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BootstrapError {
    #[error("failed to get a device context for the window")]
    SurfaceUnavailable,

    #[error("failed to choose a pixel format")]
    NoMatchingFormat,

    #[error("failed to set pixel format {format}")]
    SetFormatRejected { format: i32 },

    #[error("failed to create temporary render context")]
    LegacyContextCreation,

    #[error("failed to make the {stage} render context current")]
    MakeCurrentFailed { stage: Stage },

    #[error("{name} not found")]
    EntryPointUnavailable { stage: Stage, name: String },

    #[error("driver returned no extension string")]
    ExtensionsUnavailable,

    #[error("driver does not advertise {token}")]
    MissingExtension { token: &'static str },

    #[error("a render context is still current; release the legacy context first")]
    LegacyStillCurrent,

    #[error("wglCreateContextAttribsARB failed to create an OpenGL {major}.{minor} render context")]
    VersionedContextCreation { major: i32, minor: i32 },

    #[error("the render context is not current on this thread")]
    ContextNotCurrent,

    #[error("failed to load {module}")]
    ModuleLoad { module: String },

    #[error("failed to load OpenGL procedure: {name}")]
    FunctionNotFound { name: String },
}

impl BootstrapError {
    /// Stage of the sequence that raised this error.
    pub fn stage(&self) -> Stage {
        match self {
            BootstrapError::SurfaceUnavailable => Stage::Surface,
            BootstrapError::NoMatchingFormat | BootstrapError::SetFormatRejected { .. } => {
                Stage::SurfaceFormat
            }
            BootstrapError::LegacyContextCreation => Stage::LegacyContext,
            BootstrapError::MakeCurrentFailed { stage }
            | BootstrapError::EntryPointUnavailable { stage, .. } => *stage,
            BootstrapError::ExtensionsUnavailable | BootstrapError::MissingExtension { .. } => {
                Stage::ExtensionQuery
            }
            BootstrapError::LegacyStillCurrent
            | BootstrapError::VersionedContextCreation { .. } => Stage::VersionedContext,
            BootstrapError::ContextNotCurrent
            | BootstrapError::ModuleLoad { .. }
            | BootstrapError::FunctionNotFound { .. } => Stage::FunctionLoading,
        }
    }

    /// Name of the entry point involved in the failure, if any.
    pub fn entry_point(&self) -> Option<&str> {
        match self {
            BootstrapError::EntryPointUnavailable { name, .. }
            | BootstrapError::FunctionNotFound { name } => Some(name),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BootstrapError>;
