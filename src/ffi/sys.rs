//! The host functions as seen from plugin code: the local exports inside a
//! host build, imports resolved at load time inside a plugin build.

#![allow(non_snake_case)]

use crate::context::ApplicationContext;

#[cfg(not(feature = "plugin"))]
pub use super::exports::{
    addFilter, addTool, cleanCanvas, createButton, createCanvas, createLabel, createSlider,
    putPixel, putSprite,
};

#[cfg(not(feature = "plugin"))]
pub fn app_context_ptr() -> *mut ApplicationContext {
    super::exports::APPCONTEXT.0
}

#[cfg(feature = "plugin")]
mod imports {
    use std::ffi::c_char;

    use crate::context::ApplicationContext;
    use crate::ffi::types::RawTool;

    unsafe extern "C" {
        pub fn createButton(x: usize, y: usize, w: usize, h: usize, text: *const c_char) -> u64;
        pub fn createLabel(x: usize, y: usize, w: usize, h: usize, text: *const c_char) -> u64;
        pub fn createSlider(
            x: usize,
            y: usize,
            w: usize,
            h: usize,
            min_value: i64,
            max_value: i64,
            start_value: i64,
        ) -> u64;
        pub fn createCanvas(x: usize, y: usize, w: usize, h: usize) -> u64;
        pub fn putPixel(canvas: u64, x: usize, y: usize, color: u32);
        pub fn putSprite(
            canvas: u64,
            x: usize,
            y: usize,
            w: usize,
            h: usize,
            texture: *const c_char,
        );
        pub fn cleanCanvas(canvas_id: u64, color: u32);
        pub fn addTool(tool: *mut RawTool);
        pub fn addFilter(tool: *mut RawTool);
        pub static APPCONTEXT: *mut ApplicationContext;
    }
}

#[cfg(feature = "plugin")]
pub use imports::{
    addFilter, addTool, cleanCanvas, createButton, createCanvas, createLabel, createSlider,
    putPixel, putSprite,
};

#[cfg(feature = "plugin")]
pub fn app_context_ptr() -> *mut ApplicationContext {
    // SAFETY: the host defines APPCONTEXT and never changes its value.
    unsafe { imports::APPCONTEXT }
}
