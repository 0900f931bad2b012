//! In-memory [`GlDriver`] used by the unit tests.
//!
//! Behaves like a well-formed WGL driver on top of `opengl32.dll`: GL 1.1
//! entry points only resolve through the module, everything newer through
//! the context resolver, and the context resolver only answers while a
//! context is current. Individual quirks are switched on through
//! [`MockState`].

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::ffi::{CStr, c_void};
use std::ptr::{self, NonNull};
use std::rc::Rc;

use crate::driver::{ContextHandle, FormatId, GlDriver, ModuleHandle, SurfaceHandle};
use crate::format::FormatDescriptor;
use crate::loader::REQUIRED_FUNCTIONS;

pub(crate) const GET_EXTENSIONS_STRING_ADDR: usize = 0x1000;
pub(crate) const CREATE_CONTEXT_ATTRIBS_ADDR: usize = 0x2000;
const MODULE_ADDR: usize = 0x9000;

/// Entry points exported by `opengl32.dll` itself; `wglGetProcAddress`
/// returns null for them.
pub(crate) const GL11_FUNCTIONS: &[&str] = &[
    "glClear",
    "glClearColor",
    "glViewport",
    "glEnable",
    "glDisable",
    "glGetError",
    "glGetString",
    "glGetIntegerv",
    "glDrawArrays",
];

pub(crate) const FULL_EXTENSIONS: &str = "WGL_ARB_extensions_string WGL_ARB_pixel_format \
     WGL_ARB_create_context WGL_ARB_create_context_profile WGL_EXT_swap_control";

pub(crate) fn surface(n: usize) -> SurfaceHandle {
    SurfaceHandle::from_raw((0x5000 + n * 0x10) as *mut c_void).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContextKind {
    Legacy,
    Versioned,
}

#[derive(Debug)]
pub(crate) struct MockState {
    // ── Driver behaviour ──────────────────────────────────────────────
    pub available_format: FormatDescriptor,
    pub format_index: i32,
    pub reject_set_format: bool,
    pub fail_legacy_creation: bool,
    pub fail_versioned_creation: bool,
    pub fail_make_current: bool,
    pub extensions: Option<String>,
    pub context_procs: HashMap<String, usize>,
    pub module_procs: HashMap<String, usize>,
    pub module_available: bool,

    // ── Observed state ────────────────────────────────────────────────
    pub committed: HashMap<SurfaceHandle, FormatId>,
    pub choose_calls: usize,
    pub set_calls: usize,
    pub live: HashMap<ContextHandle, ContextKind>,
    pub current: Option<ContextHandle>,
    pub deleted_while_current: usize,
    pub attributes: Vec<i32>,
    pub share_context: Option<ContextHandle>,
    pub versioned_created_while_bound: bool,
    pub modules_open: usize,
    pub modules_loaded: usize,
    pub module_lookups: Vec<String>,
    next_handle: usize,
}

impl MockState {
    pub fn live_count(&self, kind: ContextKind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    fn allocate(&mut self, kind: ContextKind) -> ContextHandle {
        self.next_handle += 0x10;
        let handle = ContextHandle::from_raw(self.next_handle as *mut c_void).unwrap();
        self.live.insert(handle, kind);
        handle
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MockDriver {
    state: Rc<RefCell<MockState>>,
}

impl MockDriver {
    /// Driver advertising both context-creation extensions and every
    /// required function.
    pub fn healthy() -> Self {
        let mut context_procs = HashMap::new();
        let mut module_procs = HashMap::new();

        context_procs.insert(
            "wglGetExtensionsStringARB".to_string(),
            GET_EXTENSIONS_STRING_ADDR,
        );
        context_procs.insert(
            "wglCreateContextAttribsARB".to_string(),
            CREATE_CONTEXT_ATTRIBS_ADDR,
        );

        for (i, name) in REQUIRED_FUNCTIONS.iter().enumerate() {
            let addr = 0x10_0000 + i * 0x40;
            if GL11_FUNCTIONS.contains(name) {
                module_procs.insert((*name).to_string(), addr);
            } else {
                context_procs.insert((*name).to_string(), addr);
            }
        }

        let state = MockState {
            available_format: FormatDescriptor {
                color_bits: 32,
                ..FormatDescriptor::default()
            },
            format_index: 7,
            reject_set_format: false,
            fail_legacy_creation: false,
            fail_versioned_creation: false,
            fail_make_current: false,
            extensions: Some(FULL_EXTENSIONS.to_string()),
            context_procs,
            module_procs,
            module_available: true,
            committed: HashMap::new(),
            choose_calls: 0,
            set_calls: 0,
            live: HashMap::new(),
            current: None,
            deleted_while_current: 0,
            attributes: Vec::new(),
            share_context: None,
            versioned_created_while_bound: false,
            modules_open: 0,
            modules_loaded: 0,
            module_lookups: Vec::new(),
            next_handle: 0x7000,
        };

        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub fn state(&self) -> Ref<'_, MockState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, MockState> {
        self.state.borrow_mut()
    }
}

impl GlDriver for MockDriver {
    fn choose_format(
        &self,
        _surface: SurfaceHandle,
        descriptor: &FormatDescriptor,
    ) -> Option<FormatId> {
        let mut state = self.state_mut();
        state.choose_calls += 1;
        if state.available_format.meets(descriptor) {
            FormatId::new(state.format_index)
        } else {
            None
        }
    }

    fn set_format(
        &self,
        surface: SurfaceHandle,
        format: FormatId,
        _descriptor: &FormatDescriptor,
    ) -> bool {
        let mut state = self.state_mut();
        state.set_calls += 1;
        if state.reject_set_format {
            return false;
        }
        if let Some(existing) = state.committed.get(&surface).copied() {
            return existing == format;
        }
        state.committed.insert(surface, format);
        true
    }

    fn create_context(&self, surface: SurfaceHandle) -> Option<ContextHandle> {
        let mut state = self.state_mut();
        if state.fail_legacy_creation || !state.committed.contains_key(&surface) {
            return None;
        }
        Some(state.allocate(ContextKind::Legacy))
    }

    fn make_current(&self, binding: Option<(SurfaceHandle, ContextHandle)>) -> bool {
        let mut state = self.state_mut();
        match binding {
            None => {
                state.current = None;
                true
            }
            Some((_, context)) => {
                if state.fail_make_current || !state.live.contains_key(&context) {
                    return false;
                }
                state.current = Some(context);
                true
            }
        }
    }

    fn current_context(&self) -> Option<ContextHandle> {
        self.state().current
    }

    fn delete_context(&self, context: ContextHandle) -> bool {
        let mut state = self.state_mut();
        if state.live.remove(&context).is_none() {
            return false;
        }
        if state.current == Some(context) {
            state.deleted_while_current += 1;
            state.current = None;
        }
        true
    }

    fn context_proc_address(&self, name: &CStr) -> *const c_void {
        let state = self.state();
        if state.current.is_none() {
            return ptr::null();
        }
        let name = name.to_string_lossy();
        state
            .context_procs
            .get(&*name)
            .map_or(ptr::null(), |addr| *addr as *const c_void)
    }

    unsafe fn extensions_string(
        &self,
        proc: NonNull<c_void>,
        _surface: SurfaceHandle,
    ) -> Option<String> {
        let state = self.state();
        assert_eq!(proc.as_ptr() as usize, GET_EXTENSIONS_STRING_ADDR);
        assert!(state.current.is_some(), "extension query without a current context");
        state.extensions.clone()
    }

    unsafe fn create_context_attribs(
        &self,
        proc: NonNull<c_void>,
        surface: SurfaceHandle,
        share: Option<ContextHandle>,
        attributes: &[i32],
    ) -> Option<ContextHandle> {
        let mut state = self.state_mut();
        assert_eq!(proc.as_ptr() as usize, CREATE_CONTEXT_ATTRIBS_ADDR);
        state.attributes = attributes.to_vec();
        state.share_context = share;
        if state.current.is_some() {
            state.versioned_created_while_bound = true;
        }
        if state.fail_versioned_creation || !state.committed.contains_key(&surface) {
            return None;
        }
        Some(state.allocate(ContextKind::Versioned))
    }

    fn load_module(&self, _name: &CStr) -> Option<ModuleHandle> {
        let mut state = self.state_mut();
        if !state.module_available {
            return None;
        }
        state.modules_open += 1;
        state.modules_loaded += 1;
        ModuleHandle::from_raw(MODULE_ADDR as *mut c_void)
    }

    fn module_proc_address(&self, module: ModuleHandle, name: &CStr) -> *const c_void {
        let mut state = self.state_mut();
        assert_eq!(module.as_raw() as usize, MODULE_ADDR);
        assert!(state.modules_open > 0, "lookup on a released module");
        let name = name.to_string_lossy().into_owned();
        let addr = state
            .module_procs
            .get(&name)
            .map_or(ptr::null(), |addr| *addr as *const c_void);
        state.module_lookups.push(name);
        addr
    }

    fn free_module(&self, _module: ModuleHandle) {
        self.state_mut().modules_open -= 1;
    }
}
