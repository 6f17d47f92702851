//! Thread-local state behind the exported host functions.
//!
//! C plugins call free functions (`createButton`, `putPixel`, `addTool`)
//! with no context argument, so the host publishes what those calls may
//! touch for exactly as long as it is driving the plugin: a registration
//! scope around `init_module`, a build scope around `buildSetupWidget`, and
//! a dispatch scope around `apply`.

use std::cell::RefCell;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::tool::{ToolId, ToolKind};
use crate::widget::{WidgetId, WidgetRegistry, WidgetRequest};

use super::types::RawTool;

#[derive(Default)]
struct Session {
    registry: Option<Rc<RefCell<WidgetRegistry>>>,
    building: Option<ToolId>,
    registering: Option<Vec<(ToolKind, NonNull<RawTool>)>>,
}

thread_local! {
    static SESSION: RefCell<Session> = RefCell::new(Session::default());
}

/// Publishes the widget registry (and, while building, the owning tool) to
/// the exported functions until dropped.
pub(crate) struct CallScope {
    previous_registry: Option<Rc<RefCell<WidgetRegistry>>>,
    previous_building: Option<ToolId>,
}

impl CallScope {
    pub(crate) fn build(registry: &Rc<RefCell<WidgetRegistry>>, owner: ToolId) -> Self {
        Self::enter(registry, Some(owner))
    }

    pub(crate) fn dispatch(registry: &Rc<RefCell<WidgetRegistry>>) -> Self {
        Self::enter(registry, None)
    }

    fn enter(registry: &Rc<RefCell<WidgetRegistry>>, building: Option<ToolId>) -> Self {
        SESSION.with(|session| {
            let mut session = session.borrow_mut();
            Self {
                previous_registry: session.registry.replace(Rc::clone(registry)),
                previous_building: std::mem::replace(&mut session.building, building),
            }
        })
    }
}

impl Drop for CallScope {
    fn drop(&mut self) {
        let registry = self.previous_registry.take();
        let building = self.previous_building.take();
        SESSION.with(|session| {
            let mut session = session.borrow_mut();
            session.registry = registry;
            session.building = building;
        });
    }
}

/// Collects `addTool`/`addFilter` calls made while a module initializes.
pub(crate) struct RegistrationScope {
    previous: Option<Vec<(ToolKind, NonNull<RawTool>)>>,
    finished: bool,
}

impl RegistrationScope {
    pub(crate) fn open() -> Self {
        let previous = SESSION.with(|session| session.borrow_mut().registering.replace(Vec::new()));
        Self { previous, finished: false }
    }

    /// Close the scope and take everything registered inside it.
    pub(crate) fn finish(mut self) -> Vec<(ToolKind, NonNull<RawTool>)> {
        self.finished = true;
        self.restore()
    }

    fn restore(&mut self) -> Vec<(ToolKind, NonNull<RawTool>)> {
        let previous = self.previous.take();
        SESSION
            .with(|session| std::mem::replace(&mut session.borrow_mut().registering, previous))
            .unwrap_or_default()
    }
}

impl Drop for RegistrationScope {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // Unwinding out of init_module: the host still owns whatever was registered.
        for (_, tool) in self.restore() {
            // SAFETY: the pointer was handed over by addTool/addFilter and never adopted.
            unsafe { destroy_raw(tool) };
        }
    }
}

/// # Safety
///
/// `tool` must point to a live tool object whose ownership the caller holds.
pub(crate) unsafe fn destroy_raw(tool: NonNull<RawTool>) {
    let ptr = tool.as_ptr();
    // SAFETY: guaranteed by the caller.
    unsafe { ((*(*ptr).vtable).delete)(ptr) };
}

/// Receive a tool from `addTool`/`addFilter`. Outside `init_module` there is
/// nobody to hand it to, so the tool is destroyed on the spot.
pub(crate) fn register_raw(kind: ToolKind, tool: *mut RawTool) {
    let Some(tool) = NonNull::new(tool) else {
        log::error!("{kind:?} registration with a null tool pointer ignored");
        return;
    };
    let orphan = SESSION.with(|session| {
        let mut session = session.borrow_mut();
        match session.registering.as_mut() {
            Some(pending) if pending.iter().any(|(_, t)| *t == tool) => {
                log::error!("tool {tool:p} registered twice; keeping the first registration");
                false
            }
            Some(pending) => {
                pending.push((kind, tool));
                false
            }
            None => true,
        }
    });
    if orphan {
        log::error!("{kind:?} registered outside init_module; destroying it");
        // SAFETY: ownership was transferred to the host by the registration call.
        unsafe { destroy_raw(tool) };
    }
}

/// Back end of the `create*` exports. Returns 0 outside a build scope.
pub(crate) fn create_widget(request: WidgetRequest) -> u64 {
    let target = SESSION.with(|session| {
        let session = session.borrow();
        session.building.zip(session.registry.clone())
    });
    let Some((owner, registry)) = target else {
        log::warn!("widget creation outside buildSetupWidget refused");
        return WidgetId::INVALID;
    };
    let id = registry.borrow_mut().create(owner, request);
    crate::widget::into_raw_handle(id)
}

/// Back end of the canvas exports. Does nothing outside a host-driven call.
pub(crate) fn with_registry(op: &str, f: impl FnOnce(&mut WidgetRegistry)) {
    let registry = SESSION.with(|session| session.borrow().registry.clone());
    match registry {
        Some(registry) => f(&mut registry.borrow_mut()),
        None => log::warn!("{op} called outside a host-driven call; ignored"),
    }
}
