//! The drawing context shared by the host and every loaded tool.
//!
//! Hosts hand tools an `&AppContext` through [`crate::tool::ToolHost`] instead
//! of tools reaching for a global. Both sides may change the colors at any
//! time; nothing is synchronized, so only touch it from inside host-driven
//! calls on the event-loop thread.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Flat record laid out exactly like the C `ApplicationContext`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationContext {
    /// Foreground drawing color
    pub fg_color: Color,
    /// Background drawing color
    pub bg_color: Color,
}

impl Default for ApplicationContext {
    fn default() -> Self {
        Self {
            fg_color: Color::BLACK,
            bg_color: Color::WHITE,
        }
    }
}

/// Shared, unsynchronized handle to the current drawing colors.
///
/// Same layout as [`ApplicationContext`], so a pointer to one is a pointer
/// to the other.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct AppContext(Cell<ApplicationContext>);

impl AppContext {
    pub const fn new(initial: ApplicationContext) -> Self {
        Self(Cell::new(initial))
    }

    /// The process-wide context published to C plugins as `APPCONTEXT`.
    pub fn global() -> &'static AppContext {
        &GLOBAL.0
    }

    pub fn foreground(&self) -> Color {
        self.0.get().fg_color
    }

    pub fn background(&self) -> Color {
        self.0.get().bg_color
    }

    pub fn set_foreground(&self, color: Color) {
        let mut ctx = self.0.get();
        ctx.fg_color = color;
        self.0.set(ctx);
    }

    pub fn set_background(&self, color: Color) {
        let mut ctx = self.0.get();
        ctx.bg_color = color;
        self.0.set(ctx);
    }

    pub fn snapshot(&self) -> ApplicationContext {
        self.0.get()
    }

    pub fn replace(&self, ctx: ApplicationContext) -> ApplicationContext {
        self.0.replace(ctx)
    }

    pub const fn as_ptr(&self) -> *mut ApplicationContext {
        self.0.as_ptr()
    }

    /// Reinterpret a C `ApplicationContext*` as a shared handle.
    ///
    /// # Safety
    ///
    /// `ptr` must be non-null, aligned, and stay valid for `'a`.
    pub unsafe fn from_ptr<'a>(ptr: *mut ApplicationContext) -> &'a AppContext {
        // SAFETY: AppContext is repr(transparent) over Cell<ApplicationContext>,
        // which is repr(transparent) over ApplicationContext.
        unsafe { &*(ptr as *const AppContext) }
    }
}

pub(crate) struct GlobalContext(pub(crate) AppContext);

// SAFETY: the plugin contract confines every access to the host's event-loop
// thread. The storage has to be a plain static so C code can address it.
unsafe impl Sync for GlobalContext {}

pub(crate) static GLOBAL: GlobalContext = GlobalContext(AppContext::new(ApplicationContext {
    fg_color: Color::BLACK,
    bg_color: Color::WHITE,
}));
