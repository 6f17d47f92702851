//! The host half of the C ABI, exported under the names plugins link against.

#![allow(non_snake_case)]

use std::ffi::{CStr, c_char};

use crate::color::Color;
use crate::context::{ApplicationContext, GLOBAL};
use crate::tool::ToolKind;
use crate::widget::{Geometry, SliderRange, WidgetId, WidgetRequest};

use super::session;
use super::types::RawTool;

/// Value of the exported `APPCONTEXT` symbol.
#[repr(transparent)]
pub struct AppContextPtr(pub *mut ApplicationContext);

// SAFETY: the pointer itself never changes; the pointee is only touched from
// the event-loop thread.
unsafe impl Sync for AppContextPtr {}

#[unsafe(no_mangle)]
pub static APPCONTEXT: AppContextPtr = AppContextPtr(GLOBAL.0.as_ptr());

/// `APPCONTEXT` under the name C++ plugins link against: the header declares
/// it inside `namespace booba` without C linkage.
#[unsafe(export_name = "_ZN5booba10APPCONTEXTE")]
pub static APPCONTEXT_CPP: AppContextPtr = AppContextPtr(GLOBAL.0.as_ptr());

/// Reference every export so the linker keeps them in executables that
/// only reach the crate through the loader.
pub(crate) fn keep_linked() {
    let symbols: [*const (); 11] = [
        createButton as *const (),
        createLabel as *const (),
        createSlider as *const (),
        createCanvas as *const (),
        putPixel as *const (),
        putSprite as *const (),
        cleanCanvas as *const (),
        addTool as *const (),
        addFilter as *const (),
        &APPCONTEXT as *const AppContextPtr as *const (),
        &APPCONTEXT_CPP as *const AppContextPtr as *const (),
    ];
    std::hint::black_box(symbols);
}

/// # Safety
///
/// `text` must be null or point to a NUL-terminated string.
unsafe fn text_arg(text: *const c_char) -> Option<String> {
    if text.is_null() {
        log::warn!("widget text is a null pointer");
        return None;
    }
    // SAFETY: guaranteed by the caller.
    match unsafe { CStr::from_ptr(text) }.to_str() {
        Ok(text) => Some(text.to_owned()),
        Err(err) => {
            log::warn!("widget text is not UTF-8: {err}");
            None
        }
    }
}

/// Creates a button; clicks arrive as `ButtonClicked` with its id. 0 on failure.
///
/// # Safety
///
/// `text` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn createButton(
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    text: *const c_char,
) -> u64 {
    // SAFETY: forwarded caller guarantee.
    let Some(text) = (unsafe { text_arg(text) }) else {
        return WidgetId::INVALID;
    };
    session::create_widget(WidgetRequest::Button { geometry: Geometry::new(x, y, w, h), text })
}

/// Creates a label. 0 on failure.
///
/// # Safety
///
/// `text` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn createLabel(
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    text: *const c_char,
) -> u64 {
    // SAFETY: forwarded caller guarantee.
    let Some(text) = (unsafe { text_arg(text) }) else {
        return WidgetId::INVALID;
    };
    session::create_widget(WidgetRequest::Label { geometry: Geometry::new(x, y, w, h), text })
}

/// Creates a slider; changes arrive as `SliderMoved`. 0 on failure.
///
/// # Safety
///
/// Always safe to call; `unsafe` only for symmetry with the imported declaration.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn createSlider(
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    min_value: i64,
    max_value: i64,
    start_value: i64,
) -> u64 {
    session::create_widget(WidgetRequest::Slider {
        geometry: Geometry::new(x, y, w, h),
        range: SliderRange::new(min_value, max_value, start_value),
    })
}

/// Creates a canvas. 0 on failure.
///
/// # Safety
///
/// Always safe to call; `unsafe` only for symmetry with the imported declaration.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn createCanvas(x: usize, y: usize, w: usize, h: usize) -> u64 {
    session::create_widget(WidgetRequest::Canvas { geometry: Geometry::new(x, y, w, h) })
}

/// # Safety
///
/// Always safe to call; `unsafe` only for symmetry with the imported declaration.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn putPixel(canvas: u64, x: usize, y: usize, color: u32) {
    let Some(id) = WidgetId::from_raw(canvas) else {
        log::warn!("putPixel on canvas 0 ignored");
        return;
    };
    session::with_registry("putPixel", |registry| registry.put_pixel(id, x, y, Color(color)));
}

/// # Safety
///
/// `texture` must be null or a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn putSprite(
    canvas: u64,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    texture: *const c_char,
) {
    let Some(id) = WidgetId::from_raw(canvas) else {
        log::warn!("putSprite on canvas 0 ignored");
        return;
    };
    // SAFETY: forwarded caller guarantee.
    let Some(texture) = (unsafe { text_arg(texture) }) else {
        return;
    };
    session::with_registry("putSprite", |registry| {
        registry.put_sprite(id, x, y, w, h, &texture)
    });
}

/// # Safety
///
/// Always safe to call; `unsafe` only for symmetry with the imported declaration.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn cleanCanvas(canvas_id: u64, color: u32) {
    let Some(id) = WidgetId::from_raw(canvas_id) else {
        log::warn!("cleanCanvas on canvas 0 ignored");
        return;
    };
    session::with_registry("cleanCanvas", |registry| {
        registry.clean_canvas(id, Color(color))
    });
}

/// Hands a tool to the host, which deletes it on exit.
///
/// # Safety
///
/// `tool` must be a valid tool object that the caller stops using.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn addTool(tool: *mut RawTool) {
    session::register_raw(ToolKind::Tool, tool);
}

/// Same as [`addTool`], placed in the filter menu.
///
/// # Safety
///
/// `tool` must be a valid tool object that the caller stops using.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn addFilter(tool: *mut RawTool) {
    session::register_raw(ToolKind::Filter, tool);
}
