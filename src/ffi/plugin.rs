//! Plugin side of the boundary: wraps Rust tools as C tool objects and
//! implements the host traits on top of the imported host functions.

use std::ffi::{CString, c_char};
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::ptr::{self, NonNull};

use crate::color::Color;
use crate::context::AppContext;
use crate::host::Registrar;
use crate::surface::PixelSurface;
use crate::tool::{Tool, ToolHost};
use crate::widget::{CanvasOps, Geometry, SliderRange, WidgetFactory, WidgetId};

use super::sys;
use super::types::{RawEvent, RawSurface, RawTool, ToolVTable};

/// A Rust tool dressed as a C tool object. `raw` must stay the first field so
/// a `*mut RawTool` is also a `*mut ExportedTool`.
#[repr(C)]
struct ExportedTool {
    raw: RawTool,
    texture: CString,
    tool: Box<dyn Tool>,
}

static EXPORTED_VTABLE: ToolVTable = ToolVTable {
    apply: exported_apply,
    drop_in_place: exported_drop_in_place,
    delete: exported_delete,
    get_texture: exported_get_texture,
    build_setup_widget: exported_build_setup_widget,
};

/// Turn a tool into a C tool object ready for `addTool`/`addFilter`.
///
/// Whoever receives the pointer must eventually call its `delete` entry.
pub fn export_tool(tool: Box<dyn Tool>) -> *mut RawTool {
    let texture = CString::new(tool.texture()).unwrap_or_else(|err| {
        log::warn!("texture path of {} contains NUL: {err}", tool.name());
        CString::default()
    });
    let exported = Box::new(ExportedTool {
        raw: RawTool { vtable: &EXPORTED_VTABLE },
        texture,
        tool,
    });
    Box::into_raw(exported).cast::<RawTool>()
}

fn guarded(what: &str, f: impl FnOnce()) {
    if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
        log::error!("plugin tool panicked in {what}");
    }
}

unsafe extern "C" fn exported_apply(
    this: *mut RawTool,
    image: *mut RawSurface,
    event: *const RawEvent,
) {
    guarded("apply", || {
        // SAFETY: `this` was produced by export_tool and is still owned by the host.
        let exported = unsafe { &mut *this.cast::<ExportedTool>() };
        // SAFETY: the host passes a valid event record or null.
        let Some(raw_event) = (unsafe { event.as_ref() }) else {
            log::error!("apply called with a null event");
            return;
        };
        // SAFETY: the host fills the payload member named by the tag.
        let event = match unsafe { raw_event.to_event() } {
            Ok(event) => event,
            Err(err) => {
                log::warn!("dropping malformed event: {err}");
                return;
            }
        };
        // SAFETY: the surface, if any, is valid for the duration of this call.
        let mut surface = unsafe { ForeignSurface::from_raw(image) };
        let mut host = FfiHost::new();
        exported.tool.apply(
            &mut host,
            surface.as_mut().map(|s| s as &mut dyn PixelSurface),
            &event,
        );
    });
}

unsafe extern "C" fn exported_drop_in_place(this: *mut RawTool) {
    guarded("drop", || {
        // SAFETY: `this` was produced by export_tool; the caller keeps the
        // allocation and never uses the object again.
        unsafe { ptr::drop_in_place(this.cast::<ExportedTool>()) };
    });
}

unsafe extern "C" fn exported_delete(this: *mut RawTool) {
    guarded("drop", || {
        // SAFETY: `this` was produced by Box::into_raw in export_tool and the
        // host destroys each tool exactly once.
        drop(unsafe { Box::from_raw(this.cast::<ExportedTool>()) });
    });
}

unsafe extern "C" fn exported_get_texture(this: *mut RawTool) -> *const c_char {
    // SAFETY: `this` was produced by export_tool.
    let exported = unsafe { &*this.cast::<ExportedTool>() };
    exported.texture.as_ptr()
}

unsafe extern "C" fn exported_build_setup_widget(this: *mut RawTool) {
    guarded("buildSetupWidget", || {
        // SAFETY: `this` was produced by export_tool.
        let exported = unsafe { &mut *this.cast::<ExportedTool>() };
        exported.tool.build_setup_widget(&mut FfiWidgets);
    });
}

/// A host surface lent for one `apply` call.
struct ForeignSurface<'a> {
    raw: NonNull<RawSurface>,
    _call: PhantomData<&'a mut RawSurface>,
}

impl ForeignSurface<'_> {
    /// # Safety
    ///
    /// `raw` must be null or valid until the returned value is dropped.
    unsafe fn from_raw(raw: *mut RawSurface) -> Option<Self> {
        NonNull::new(raw).map(|raw| Self { raw, _call: PhantomData })
    }
}

impl PixelSurface for ForeignSurface<'_> {
    fn width(&self) -> usize {
        let ptr = self.raw.as_ptr();
        // SAFETY: valid for this call, see from_raw.
        unsafe { ((*(*ptr).vtable).get_w)(ptr) }
    }

    fn height(&self) -> usize {
        let ptr = self.raw.as_ptr();
        // SAFETY: valid for this call, see from_raw.
        unsafe { ((*(*ptr).vtable).get_h)(ptr) }
    }

    fn get_pixel(&self, x: usize, y: usize) -> Color {
        let ptr = self.raw.as_ptr();
        // SAFETY: valid for this call, see from_raw.
        Color(unsafe { ((*(*ptr).vtable).get_pixel)(ptr, x, y) })
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        let ptr = self.raw.as_ptr();
        // SAFETY: valid for this call, see from_raw.
        unsafe { ((*(*ptr).vtable).set_pixel)(ptr, x, y, color.0) }
    }
}

fn c_text(what: &str, text: &str) -> Option<CString> {
    match CString::new(text) {
        Ok(text) => Some(text),
        Err(err) => {
            log::warn!("{what} text contains NUL: {err}");
            None
        }
    }
}

fn canvas_put_pixel(canvas: WidgetId, x: usize, y: usize, color: Color) {
    // SAFETY: plain-value call into the host.
    unsafe { sys::putPixel(canvas.get(), x, y, color.0) }
}

fn canvas_put_sprite(canvas: WidgetId, x: usize, y: usize, w: usize, h: usize, texture: &str) {
    if let Some(texture) = c_text("sprite", texture) {
        // SAFETY: `texture` is NUL-terminated and outlives the call.
        unsafe { sys::putSprite(canvas.get(), x, y, w, h, texture.as_ptr()) }
    }
}

fn canvas_clean(canvas: WidgetId, color: Color) {
    // SAFETY: plain-value call into the host.
    unsafe { sys::cleanCanvas(canvas.get(), color.0) }
}

/// `ToolHost` backed by the host's exported functions.
pub struct FfiHost {
    context: &'static AppContext,
}

impl FfiHost {
    pub fn new() -> Self {
        let ptr = sys::app_context_ptr();
        let context = if ptr.is_null() {
            log::error!("host published a null APPCONTEXT; using a plugin-local context");
            AppContext::global()
        } else {
            // SAFETY: APPCONTEXT points to host storage that lives for the whole process.
            unsafe { AppContext::from_ptr(ptr) }
        };
        Self { context }
    }
}

impl Default for FfiHost {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasOps for FfiHost {
    fn put_pixel(&mut self, canvas: WidgetId, x: usize, y: usize, color: Color) {
        canvas_put_pixel(canvas, x, y, color);
    }

    fn put_sprite(
        &mut self,
        canvas: WidgetId,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        texture: &str,
    ) {
        canvas_put_sprite(canvas, x, y, w, h, texture);
    }

    fn clean_canvas(&mut self, canvas: WidgetId, color: Color) {
        canvas_clean(canvas, color);
    }
}

impl ToolHost for FfiHost {
    fn app_context(&self) -> &AppContext {
        self.context
    }
}

/// `WidgetFactory` backed by the host's exported functions.
pub struct FfiWidgets;

impl CanvasOps for FfiWidgets {
    fn put_pixel(&mut self, canvas: WidgetId, x: usize, y: usize, color: Color) {
        canvas_put_pixel(canvas, x, y, color);
    }

    fn put_sprite(
        &mut self,
        canvas: WidgetId,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        texture: &str,
    ) {
        canvas_put_sprite(canvas, x, y, w, h, texture);
    }

    fn clean_canvas(&mut self, canvas: WidgetId, color: Color) {
        canvas_clean(canvas, color);
    }
}

impl WidgetFactory for FfiWidgets {
    fn create_button(&mut self, geometry: Geometry, text: &str) -> Option<WidgetId> {
        let text = c_text("button", text)?;
        let Geometry { x, y, w, h } = geometry;
        // SAFETY: `text` is NUL-terminated and outlives the call.
        WidgetId::from_raw(unsafe { sys::createButton(x, y, w, h, text.as_ptr()) })
    }

    fn create_label(&mut self, geometry: Geometry, text: &str) -> Option<WidgetId> {
        let text = c_text("label", text)?;
        let Geometry { x, y, w, h } = geometry;
        // SAFETY: `text` is NUL-terminated and outlives the call.
        WidgetId::from_raw(unsafe { sys::createLabel(x, y, w, h, text.as_ptr()) })
    }

    fn create_slider(&mut self, geometry: Geometry, range: SliderRange) -> Option<WidgetId> {
        let Geometry { x, y, w, h } = geometry;
        let SliderRange { min, max, start } = range;
        // SAFETY: plain-value call into the host.
        WidgetId::from_raw(unsafe { sys::createSlider(x, y, w, h, min, max, start) })
    }

    fn create_canvas(&mut self, geometry: Geometry) -> Option<WidgetId> {
        let Geometry { x, y, w, h } = geometry;
        // SAFETY: plain-value call into the host.
        WidgetId::from_raw(unsafe { sys::createCanvas(x, y, w, h) })
    }
}

/// `Registrar` used inside an exported `init_module`.
#[derive(Debug, Default)]
pub struct ExportRegistrar {
    registered: usize,
}

impl ExportRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registered(&self) -> usize {
        self.registered
    }
}

impl Registrar for ExportRegistrar {
    fn add_tool(&mut self, tool: Box<dyn Tool>) {
        self.registered += 1;
        // SAFETY: export_tool returns a fresh tool object whose ownership moves to the host.
        unsafe { sys::addTool(export_tool(tool)) }
    }

    fn add_filter(&mut self, tool: Box<dyn Tool>) {
        self.registered += 1;
        // SAFETY: export_tool returns a fresh tool object whose ownership moves to the host.
        unsafe { sys::addFilter(export_tool(tool)) }
    }
}

/// Body of a generated `init_module`: run the module's registration
/// function without letting a panic cross into the host.
pub fn run_module_init(init: impl FnOnce(&mut dyn Registrar)) {
    let mut registrar = ExportRegistrar::new();
    if panic::catch_unwind(AssertUnwindSafe(|| init(&mut registrar))).is_err() {
        log::error!("init_module panicked after registering {} tools", registrar.registered());
    } else {
        log::debug!("init_module registered {} tools", registrar.registered());
    }
}

/// Define the module entry point `init_module` for a plugin library.
///
/// ```ignore
/// fn register(registrar: &mut dyn paint_plugins::Registrar) {
///     registrar.add_tool(Box::new(MyTool::default()));
/// }
///
/// paint_plugins::declare_module!(register);
/// ```
#[macro_export]
macro_rules! declare_module {
    ($register:path) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn init_module() {
            $crate::ffi::run_module_init(|registrar| $register(registrar));
        }
    };
}
