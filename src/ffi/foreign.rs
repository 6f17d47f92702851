//! Host side of the boundary: C tool objects adopted as [`Tool`]s.

use std::ffi::CStr;
use std::ptr::NonNull;
use std::sync::Arc;

use libloading::Library;

use crate::color::Color;
use crate::event::Event;
use crate::surface::PixelSurface;
use crate::tool::{Tool, ToolHost};
use crate::widget::WidgetFactory;

use super::types::{RawEvent, RawSurface, RawTool, SurfaceVTable};

/// A tool implemented on the far side of the C boundary.
///
/// Widget and canvas calls the tool makes reach the host through the
/// exported functions, so `build_setup_widget` and `apply` ignore the
/// factory/host arguments they are given. The host must have a call scope
/// open around both.
pub struct ForeignTool {
    raw: NonNull<RawTool>,
    name: String,
    texture: String,
    // Dropped after `raw` is destroyed.
    _library: Option<Arc<Library>>,
}

impl ForeignTool {
    /// Take ownership of a tool object received through `addTool`/`addFilter`.
    ///
    /// # Safety
    ///
    /// `raw` must be a live tool object owned by the caller, and its code
    /// must stay loaded at least as long as `library` (or the process, if
    /// `None`).
    pub unsafe fn adopt(
        raw: NonNull<RawTool>,
        library: Option<Arc<Library>>,
        origin: &str,
    ) -> Self {
        let ptr = raw.as_ptr();
        // SAFETY: guaranteed by the caller.
        let texture = unsafe { ((*(*ptr).vtable).get_texture)(ptr) };
        let texture = if texture.is_null() {
            String::new()
        } else {
            // SAFETY: the tool returns a NUL-terminated string it keeps alive.
            unsafe { CStr::from_ptr(texture) }.to_string_lossy().into_owned()
        };
        let stem = texture.rsplit(['/', '\\']).next().unwrap_or_default();
        let stem = stem.split('.').next().unwrap_or_default();
        let name = if stem.is_empty() {
            format!("{origin}:{ptr:p}")
        } else {
            format!("{origin}:{stem}")
        };
        Self { raw, name, texture, _library: library }
    }

    pub fn as_raw(&self) -> *mut RawTool {
        self.raw.as_ptr()
    }
}

impl Tool for ForeignTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn texture(&self) -> &str {
        &self.texture
    }

    fn build_setup_widget(&mut self, _widgets: &mut dyn WidgetFactory) {
        let ptr = self.raw.as_ptr();
        // SAFETY: `raw` is live until Drop.
        unsafe { ((*(*ptr).vtable).build_setup_widget)(ptr) }
    }

    fn apply(
        &mut self,
        _host: &mut dyn ToolHost,
        image: Option<&mut dyn PixelSurface>,
        event: &Event,
    ) {
        let ptr = self.raw.as_ptr();
        let raw_event = RawEvent::from(event);
        let call = |surface: *mut RawSurface| {
            // SAFETY: `raw` is live until Drop; the event and surface outlive the call.
            unsafe { ((*(*ptr).vtable).apply)(ptr, surface, &raw_event) }
        };
        match image {
            Some(image) => lend_surface(image, call),
            None => call(std::ptr::null_mut()),
        }
    }
}

impl Drop for ForeignTool {
    fn drop(&mut self) {
        log::debug!("destroying foreign tool {}", self.name);
        // SAFETY: we own the tool object and destroy it exactly once.
        unsafe { super::session::destroy_raw(self.raw) };
    }
}

impl std::fmt::Debug for ForeignTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForeignTool")
            .field("name", &self.name)
            .field("texture", &self.texture)
            .finish_non_exhaustive()
    }
}

/// A host surface dressed as a C++ `Image`: the vtable header first, then
/// the fat `&mut dyn PixelSurface` that does not fit in one C pointer.
#[repr(C)]
struct LentSurface<'a> {
    raw: RawSurface,
    surface: &'a mut dyn PixelSurface,
}

static LENT_SURFACE_VTABLE: SurfaceVTable = SurfaceVTable {
    get_h: lent_height,
    get_w: lent_width,
    get_pixel: lent_get_pixel,
    set_pixel: lent_set_pixel,
};

/// Expose `surface` as a `RawSurface` for the duration of `f`.
fn lend_surface<R>(surface: &mut dyn PixelSurface, f: impl FnOnce(*mut RawSurface) -> R) -> R {
    let mut lent = LentSurface {
        raw: RawSurface { vtable: &LENT_SURFACE_VTABLE },
        surface,
    };
    f((&mut lent as *mut LentSurface<'_>).cast::<RawSurface>())
}

/// # Safety
///
/// `this` must come from `lend_surface` and still be inside its call.
unsafe fn lent<'a>(this: *mut RawSurface) -> &'a mut dyn PixelSurface {
    // SAFETY: guaranteed by the caller; `raw` is the first field.
    unsafe { &mut *(*this.cast::<LentSurface<'a>>()).surface }
}

unsafe extern "C" fn lent_height(this: *mut RawSurface) -> usize {
    // SAFETY: only reachable through LENT_SURFACE_VTABLE.
    unsafe { lent(this) }.height()
}

unsafe extern "C" fn lent_width(this: *mut RawSurface) -> usize {
    // SAFETY: only reachable through LENT_SURFACE_VTABLE.
    unsafe { lent(this) }.width()
}

unsafe extern "C" fn lent_get_pixel(this: *mut RawSurface, x: usize, y: usize) -> u32 {
    // SAFETY: only reachable through LENT_SURFACE_VTABLE.
    let surface = unsafe { lent(this) };
    if x >= surface.width() || y >= surface.height() {
        log::warn!("plugin read pixel ({x}, {y}) outside the image");
        return Color::TRANSPARENT.0;
    }
    surface.get_pixel(x, y).0
}

unsafe extern "C" fn lent_set_pixel(this: *mut RawSurface, x: usize, y: usize, color: u32) {
    // SAFETY: only reachable through LENT_SURFACE_VTABLE.
    let surface = unsafe { lent(this) };
    if x >= surface.width() || y >= surface.height() {
        log::warn!("plugin wrote pixel ({x}, {y}) outside the image; ignored");
        return;
    }
    surface.set_pixel(x, y, Color(color));
}
