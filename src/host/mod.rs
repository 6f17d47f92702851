//! The host runtime: owns registered tools, drives their lifecycle and
//! routes events to them.

mod config;
mod gui;
mod registrar;
mod services;

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use libloading::Library;

use crate::context::AppContext;
use crate::error::{HostError, HostResult};
use crate::event::{CanvasPhase, Event, EventQueue};
use crate::ffi::{CallScope, ForeignTool, ModuleEntryPoint, RegistrationScope};
use crate::surface::{PixelBuffer, PixelSurface};
use crate::tool::{Lifecycle, Tool, ToolId, ToolKind};
use crate::widget::{WidgetId, WidgetRegistry};

pub use config::{ConfigError, HostConfig};
pub use registrar::{ModuleRegistrar, Registrar};

use services::{HostServices, WidgetBuilder};

enum ContextHandle {
    Owned(AppContext),
    Global,
}

impl ContextHandle {
    fn get(&self) -> &AppContext {
        match self {
            Self::Owned(ctx) => ctx,
            Self::Global => AppContext::global(),
        }
    }
}

struct ToolSlot {
    kind: ToolKind,
    state: Lifecycle,
    // Taken out while the tool is running so it can borrow the host.
    tool: Option<Box<dyn Tool>>,
    name: String,
    texture: String,
}

/// Summary of a registered tool, for toolbars and menus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    pub id: ToolId,
    pub kind: ToolKind,
    pub name: String,
    pub texture: String,
    pub state: Lifecycle,
}

/// Owns every registered tool for the lifetime of the host.
pub struct Host {
    config: HostConfig,
    context: ContextHandle,
    registry: Rc<RefCell<WidgetRegistry>>,
    slots: Vec<ToolSlot>,
    queue: EventQueue,
    active: Option<ToolId>,
}

impl Host {
    /// A host with its own drawing context. Native tools see it through
    /// `ToolHost::app_context`; plugins reading `APPCONTEXT` do not.
    pub fn new(config: HostConfig) -> Self {
        let context = ContextHandle::Owned(AppContext::new(config.context));
        Self::with_context(config, context)
    }

    /// A host driving the process-wide context published as `APPCONTEXT`.
    /// Use this one when loading plugin libraries.
    pub fn with_global_context(config: HostConfig) -> Self {
        AppContext::global().replace(config.context);
        Self::with_context(config, ContextHandle::Global)
    }

    fn with_context(config: HostConfig, context: ContextHandle) -> Self {
        Self {
            registry: Rc::new(RefCell::new(WidgetRegistry::new(&config))),
            config,
            context,
            slots: Vec::new(),
            queue: EventQueue::new(),
            active: None,
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn app_context(&self) -> &AppContext {
        self.context.get()
    }

    /// Take ownership of `tool`.
    pub fn register(&mut self, kind: ToolKind, tool: Box<dyn Tool>) -> ToolId {
        let id = ToolId(self.slots.len());
        log::info!("registered {kind:?} {} as {id}", tool.name());
        self.slots.push(ToolSlot {
            kind,
            state: Lifecycle::Registered,
            name: tool.name().to_owned(),
            texture: tool.texture().to_owned(),
            tool: Some(tool),
        });
        id
    }

    /// Run a native module's entry point and register what it hands over.
    pub fn load_module(&mut self, init: impl FnOnce(&mut dyn Registrar)) -> Vec<ToolId> {
        let mut registrar = ModuleRegistrar::new();
        init(&mut registrar);
        registrar
            .into_pending()
            .into_iter()
            .map(|(kind, tool)| self.register(kind, tool))
            .collect()
    }

    /// Call a C `init_module` and adopt every tool it registers through
    /// `addTool`/`addFilter`.
    ///
    /// # Safety
    ///
    /// `init` must be a valid module entry point whose code, and the code of
    /// every tool it registers, stays loaded while `library` is alive (or for
    /// the rest of the process when `library` is `None`).
    pub unsafe fn load_foreign_module(
        &mut self,
        origin: &str,
        init: ModuleEntryPoint,
        library: Option<Arc<Library>>,
    ) -> Vec<ToolId> {
        let scope = RegistrationScope::open();
        // SAFETY: guaranteed by the caller.
        unsafe { init() };
        let registered = scope.finish();
        if registered.is_empty() {
            log::warn!("module {origin} registered no tools");
        }

        registered
            .into_iter()
            .map(|(kind, raw)| {
                // SAFETY: the pointer was handed over through addTool/addFilter
                // and nothing else owns it.
                let tool = unsafe { ForeignTool::adopt(raw, library.clone(), origin) };
                self.register(kind, Box::new(tool))
            })
            .collect()
    }

    /// Let every newly registered tool build its setup widgets. Each tool is
    /// built once; afterwards it accepts events. Returns how many tools were
    /// built by this call.
    pub fn build_widgets(&mut self) -> HostResult<usize> {
        let mut built = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.state != Lifecycle::Registered {
                continue;
            }
            let id = ToolId(index);
            slot.state.advance(Lifecycle::WidgetBuilding)?;
            let Some(mut tool) = slot.tool.take() else {
                return Err(HostError::UnknownTool(id));
            };
            {
                let _scope = CallScope::build(&self.registry, id);
                let mut builder = WidgetBuilder { owner: id, registry: &self.registry };
                tool.build_setup_widget(&mut builder);
            }
            slot.tool = Some(tool);
            slot.state.advance(Lifecycle::Active)?;

            let widgets = self.registry.borrow().widgets_of(id).count();
            log::info!("{id} ({}) built {widgets} widgets", slot.name);
            built += 1;
        }
        Ok(built)
    }

    /// Make `tool` the receiver of image mouse events.
    pub fn activate(&mut self, tool: ToolId) -> HostResult<()> {
        let slot = self.slot(tool)?;
        if !slot.state.accepts_events() {
            return Err(HostError::NotActive(tool));
        }
        log::debug!("{tool} ({}) is now active", slot.name);
        self.active = Some(tool);
        Ok(())
    }

    pub fn active_tool(&self) -> Option<ToolId> {
        self.active
    }

    /// Queue `event` for the tool it belongs to. Image mouse events go to the
    /// active tool. Widget events go to the tool owning the widget, through
    /// the same checks as [`click_button`](Self::click_button),
    /// [`move_slider`](Self::move_slider) and
    /// [`canvas_pointer`](Self::canvas_pointer). `NoEvent` is dropped and
    /// yields `Ok(None)`.
    pub fn post(&mut self, event: Event) -> HostResult<Option<ToolId>> {
        let target = match event {
            Event::NoEvent => {
                log::debug!("dropping NoEvent");
                return Ok(None);
            }
            Event::ButtonClicked(e) => self.click_button(e.id)?,
            Event::SliderMoved(e) => {
                self.move_slider(e.id, e.value)?;
                self.owner_of(e.id)?
            }
            Event::CanvasMousePressed(e) => {
                self.canvas_pointer(e.id, CanvasPhase::Pressed, e.x, e.y)?
            }
            Event::CanvasMouseReleased(e) => {
                self.canvas_pointer(e.id, CanvasPhase::Released, e.x, e.y)?
            }
            Event::CanvasMouseMoved(e) => self.canvas_pointer(e.id, CanvasPhase::Moved, e.x, e.y)?,
            Event::MouseMoved(_) | Event::MousePressed(_) | Event::MouseReleased(_) => {
                let target = self.active.ok_or(HostError::NoActiveTool)?;
                self.post_to(target, event)?;
                target
            }
        };
        Ok(Some(target))
    }

    /// Queue `event` for `tool` regardless of routing.
    pub fn post_to(&mut self, tool: ToolId, event: Event) -> HostResult<()> {
        if !self.slot(tool)?.state.accepts_events() {
            return Err(HostError::NotActive(tool));
        }
        self.queue.push(tool, event);
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deliver every queued event in order, lending `image` to each call.
    /// Returns how many `apply` calls were made.
    pub fn dispatch_pending(&mut self, mut image: Option<&mut dyn PixelSurface>) -> usize {
        let mut delivered = 0;
        while let Some((id, event)) = self.queue.pop() {
            let Some(slot) = self.slots.get_mut(id.0) else {
                log::warn!("dropping {:?} for unknown {id}", event.kind());
                continue;
            };
            if !slot.state.accepts_events() {
                log::warn!("dropping {:?} for {id} in state {}", event.kind(), slot.state.name());
                continue;
            }
            let Some(mut tool) = slot.tool.take() else {
                log::warn!("{id} is already running; dropping {:?}", event.kind());
                continue;
            };

            log::debug!("dispatching {:?} to {id}", event.kind());
            {
                let _scope = CallScope::dispatch(&self.registry);
                let mut services = HostServices {
                    registry: &self.registry,
                    context: self.context.get(),
                };
                let image = image.as_deref_mut().map(|s| s as &mut dyn PixelSurface);
                tool.apply(&mut services, image, &event);
            }
            slot.tool = Some(tool);
            delivered += 1;
        }
        delivered
    }

    /// Post one event and deliver everything pending.
    pub fn send(
        &mut self,
        event: Event,
        image: Option<&mut dyn PixelSurface>,
    ) -> HostResult<usize> {
        self.post(event)?;
        Ok(self.dispatch_pending(image))
    }

    /// The user clicked a button.
    pub fn click_button(&mut self, id: WidgetId) -> HostResult<ToolId> {
        let owner = self.registry.borrow().button_owner(id)?;
        self.post_to(owner, Event::button_clicked(id))?;
        Ok(owner)
    }

    /// The user moved a slider. The value is clamped into the slider's range
    /// before it is stored and delivered; the delivered value is returned.
    pub fn move_slider(&mut self, id: WidgetId, value: i64) -> HostResult<i64> {
        let value = self.registry.borrow_mut().set_slider_value(id, value)?;
        let owner = self.owner_of(id)?;
        self.post_to(owner, Event::slider_moved(id, value))?;
        Ok(value)
    }

    /// The pointer did something on a canvas, at canvas coordinates.
    pub fn canvas_pointer(
        &mut self,
        id: WidgetId,
        phase: CanvasPhase,
        x: usize,
        y: usize,
    ) -> HostResult<ToolId> {
        if !self.registry.borrow().canvas(id)?.contains(x, y) {
            return Err(HostError::OutOfBounds { id, x, y });
        }
        let owner = self.owner_of(id)?;
        self.post_to(owner, phase.event(id, x, y))?;
        Ok(owner)
    }

    pub fn slider_value(&self, id: WidgetId) -> HostResult<i64> {
        self.registry.borrow().slider_value(id)
    }

    pub fn canvas(&self, id: WidgetId) -> HostResult<Ref<'_, PixelBuffer>> {
        let registry = self.registry.borrow();
        registry.canvas(id)?;
        Ref::filter_map(registry, |r| r.canvas(id).ok()).map_err(|_| HostError::UnknownWidget(id))
    }

    /// Read access to every widget, e.g. to lay out a tool panel.
    pub fn with_registry<R>(&self, f: impl FnOnce(&WidgetRegistry) -> R) -> R {
        f(&self.registry.borrow())
    }

    pub fn tools(&self) -> Vec<ToolInfo> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| ToolInfo {
                id: ToolId(index),
                kind: slot.kind,
                name: slot.name.clone(),
                texture: slot.texture.clone(),
                state: slot.state,
            })
            .collect()
    }

    pub fn find_tool(&self, name: &str) -> Option<ToolId> {
        self.slots.iter().position(|slot| slot.name == name).map(ToolId)
    }

    pub fn state(&self, tool: ToolId) -> HostResult<Lifecycle> {
        self.slot(tool).map(|slot| slot.state)
    }

    /// Destroy every tool and forget its widgets and pending events. Safe to
    /// call more than once.
    pub fn shutdown(&mut self) {
        self.active = None;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.state == Lifecycle::Destroyed {
                continue;
            }
            let id = ToolId(index);
            if let Err(err) = slot.state.advance(Lifecycle::Destroyed) {
                log::error!("{id}: {err}");
                continue;
            }
            let discarded = self.queue.discard_for(id);
            if discarded > 0 {
                log::debug!("discarded {discarded} pending events for {id}");
            }
            drop(slot.tool.take());
            let widgets = self.registry.borrow_mut().remove_owned_by(id);
            log::info!("destroyed {id} ({}) and {widgets} widgets", slot.name);
        }
    }

    fn owner_of(&self, id: WidgetId) -> HostResult<ToolId> {
        self.registry.borrow().owner_of(id).ok_or(HostError::UnknownWidget(id))
    }

    fn slot(&self, tool: ToolId) -> HostResult<&ToolSlot> {
        self.slots.get(tool.0).ok_or(HostError::UnknownTool(tool))
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("tools", &self.slots.len())
            .field("widgets", &self.registry.borrow().len())
            .field("pending", &self.queue.len())
            .field("active", &self.active)
            .finish()
    }
}
