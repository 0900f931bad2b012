//! Full context negotiation: format → legacy context → extension query →
//! versioned context → function table.
//!
//! ```text
//! select_format ─► LegacyContext::create ─► query_extensions ─► release
//!                                                                  │
//!       load_all ◄─ create_versioned_context (re-selects format) ◄─┘
//! ```
//!
//! Each stage gates the next and nothing is retried. The legacy context is
//! released whatever the query returned.

use tracing::info;

use crate::config::Config;
use crate::driver::{GlDriver, SurfaceHandle};
use crate::error::Result;
use crate::extensions::{ExtensionPolicy, query_extensions};
use crate::fatal::FatalHandler;
use crate::format::{FormatDescriptor, select_format};
use crate::legacy::LegacyContext;
use crate::loader::{FunctionTable, REQUIRED_FUNCTIONS, load_all};
use crate::versioned::{ContextRequest, RenderContext, create_versioned_context};

/// Everything the negotiation needs from the caller.
#[derive(Debug, Clone)]
pub struct BootstrapRequest {
    pub descriptor: FormatDescriptor,
    pub context: ContextRequest,
    pub policy: ExtensionPolicy,
    pub functions: &'static [&'static str],
}

impl Default for BootstrapRequest {
    fn default() -> Self {
        Self {
            descriptor: FormatDescriptor::default(),
            context: ContextRequest::default(),
            policy: ExtensionPolicy::default(),
            functions: REQUIRED_FUNCTIONS,
        }
    }
}

impl BootstrapRequest {
    pub fn from_config(config: &Config) -> Self {
        let format = &config.format;
        let context = &config.context;
        Self {
            descriptor: FormatDescriptor {
                color_bits: format.color_bits,
                alpha_bits: format.alpha_bits,
                accum_bits: format.accum_bits,
                depth_bits: format.depth_bits,
                stencil_bits: format.stencil_bits,
                double_buffer: format.double_buffer,
                ..FormatDescriptor::default()
            },
            context: ContextRequest {
                major: context.major,
                minor: context.minor,
                forward_compatible: context.forward_compatible,
                debug: context.debug,
            },
            policy: if context.strict_extensions {
                ExtensionPolicy::Strict
            } else {
                ExtensionPolicy::Permissive
            },
            functions: REQUIRED_FUNCTIONS,
        }
    }
}

/// A current versioned context and its loaded functions.
#[derive(Debug)]
pub struct Bootstrapped<D: GlDriver> {
    // Declared first so the table is gone before the context is deleted.
    pub functions: FunctionTable,
    pub context: RenderContext<D>,
}

/// Runs the negotiation on `surface`.
pub fn bootstrap<D: GlDriver + Clone>(
    driver: &D,
    surface: SurfaceHandle,
    request: &BootstrapRequest,
) -> Result<Bootstrapped<D>> {
    let format = select_format(driver, surface, &request.descriptor)?;
    info!(format = format.get(), "Pixel format selected for the temporary context");

    let legacy = LegacyContext::create(driver, surface)?;
    let report = query_extensions(driver, surface, &legacy, request.policy);
    let released = legacy.release();
    let report = report?;

    let context = create_versioned_context(
        driver,
        surface,
        &request.descriptor,
        &report,
        released,
        request.context,
    )?;

    let functions = load_all(driver, &context, request.functions)?;

    Ok(Bootstrapped { functions, context })
}

/// [`bootstrap`], handing any failure to `handler` before returning it.
pub fn run<D: GlDriver + Clone>(
    driver: &D,
    surface: SurfaceHandle,
    request: &BootstrapRequest,
    handler: &dyn FatalHandler,
) -> Result<Bootstrapped<D>> {
    bootstrap(driver, surface, request).inspect_err(|err| handler.fatal(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BootstrapError, Stage};
    use crate::fatal::testing::RecordingHandler;
    use crate::mock_driver::{ContextKind, MockDriver, surface};

    #[test]
    fn test_end_to_end_3_3_core() {
        let driver = MockDriver::healthy();
        let handler = RecordingHandler::default();
        let request = BootstrapRequest::default();
        assert_eq!(request.descriptor.color_bits, 24);
        assert_eq!(request.descriptor.stencil_bits, 8);

        let result = run(&driver, surface(1), &request, &handler).unwrap();

        {
            let state = driver.state();
            assert_eq!(state.live_count(ContextKind::Versioned), 1);
            assert_eq!(state.live_count(ContextKind::Legacy), 0);
            assert_eq!(state.current, result.context.handle());
            assert_eq!(state.modules_open, 0);
            assert_eq!(
                state.attributes,
                vec![0x2091, 3, 0x2092, 3, 0x9126, 1, 0x2094, 3, 0, 0]
            );
            assert_eq!(state.choose_calls, 2);
            assert_eq!(state.set_calls, 2);
        }
        for name in REQUIRED_FUNCTIONS {
            assert!(result.functions.get(name).is_some(), "{name} missing");
        }
        assert_eq!(result.context.format().get(), 7);
        assert!(handler.calls.borrow().is_empty());

        drop(result);
        assert_eq!(driver.state().live_count(ContextKind::Versioned), 0);
    }

    #[test]
    fn test_legacy_released_when_query_fails() {
        let driver = MockDriver::healthy();
        driver.state_mut().extensions = Some("WGL_ARB_pixel_format".into());

        let err = bootstrap(&driver, surface(1), &BootstrapRequest::default()).unwrap_err();

        assert_eq!(
            err,
            BootstrapError::MissingExtension {
                token: "WGL_ARB_create_context"
            }
        );
        let state = driver.state();
        assert_eq!(state.live_count(ContextKind::Legacy), 0);
        assert_eq!(state.current, None);
    }

    #[test]
    fn test_missing_profile_extension_strict_fails_at_query() {
        let driver = MockDriver::healthy();
        driver.state_mut().extensions = Some("WGL_ARB_create_context".into());
        let handler = RecordingHandler::default();

        let err = run(&driver, surface(1), &BootstrapRequest::default(), &handler).unwrap_err();

        assert_eq!(err.stage(), Stage::ExtensionQuery);
        let calls = handler.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].stage, Stage::ExtensionQuery);
        assert!(calls[0].condition.contains("WGL_ARB_create_context_profile"));
    }

    #[test]
    fn test_missing_profile_extension_permissive_fails_at_creation() {
        let driver = MockDriver::healthy();
        driver.state_mut().extensions = Some("WGL_ARB_create_context".into());
        let handler = RecordingHandler::default();
        let request = BootstrapRequest {
            policy: ExtensionPolicy::Permissive,
            ..BootstrapRequest::default()
        };

        let err = run(&driver, surface(1), &request, &handler).unwrap_err();

        assert_eq!(err.stage(), Stage::VersionedContext);
        assert_eq!(err.entry_point(), Some("wglCreateContextAttribsARB"));
        assert_eq!(
            handler.calls.borrow()[0].entry_point.as_deref(),
            Some("wglCreateContextAttribsARB")
        );
        let state = driver.state();
        assert_eq!(state.live_count(ContextKind::Legacy), 0);
        assert_eq!(state.live_count(ContextKind::Versioned), 0);
    }

    #[test]
    fn test_function_failure_leaves_nothing_live() {
        let driver = MockDriver::healthy();
        {
            let mut state = driver.state_mut();
            state.context_procs.insert("glGenBuffers".into(), 1);
        }
        let handler = RecordingHandler::default();

        let err = run(&driver, surface(1), &BootstrapRequest::default(), &handler).unwrap_err();

        assert_eq!(err.entry_point(), Some("glGenBuffers"));
        let state = driver.state();
        assert_eq!(state.modules_open, 0);
        assert_eq!(state.live_count(ContextKind::Versioned), 0);
        assert_eq!(handler.calls.borrow()[0].stage, Stage::FunctionLoading);
    }

    #[test]
    fn test_no_matching_format_stops_before_any_context() {
        let driver = MockDriver::healthy();
        let request = BootstrapRequest {
            descriptor: FormatDescriptor {
                stencil_bits: 16,
                ..FormatDescriptor::default()
            },
            ..BootstrapRequest::default()
        };

        let err = bootstrap(&driver, surface(1), &request).unwrap_err();

        assert_eq!(err, BootstrapError::NoMatchingFormat);
        assert!(driver.state().live.is_empty());
    }

    #[test]
    fn test_request_from_config() {
        let mut config = Config::default();
        config.context.major = 4;
        config.context.minor = 1;
        config.context.debug = false;
        config.context.strict_extensions = false;
        config.format.depth_bits = 32;

        let request = BootstrapRequest::from_config(&config);

        assert_eq!(request.context.major, 4);
        assert_eq!(request.context.minor, 1);
        assert!(!request.context.debug);
        assert!(request.context.forward_compatible);
        assert_eq!(request.policy, ExtensionPolicy::Permissive);
        assert_eq!(request.descriptor.depth_bits, 32);
        assert!(request.descriptor.draw_to_window);
    }

    #[test]
    fn test_default_config_matches_default_request() {
        let request = BootstrapRequest::from_config(&Config::default());
        let default = BootstrapRequest::default();
        assert_eq!(request.descriptor, default.descriptor);
        assert_eq!(request.context, default.context);
        assert_eq!(request.policy, default.policy);
    }
}
