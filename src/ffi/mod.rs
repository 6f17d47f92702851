//! The C-linkage plugin ABI.
//!
//! Host builds export `createButton`, `putPixel`, `addTool`, `APPCONTEXT`
//! and friends, and adopt the tool objects plugins register as
//! [`ForeignTool`]s. Plugin builds (feature `plugin`) import the same
//! symbols and wrap Rust tools with [`export_tool`] / [`declare_module!`].
//!
//! [`declare_module!`]: crate::declare_module

#[cfg(all(feature = "host", feature = "plugin"))]
compile_error!(
    "features `host` and `plugin` are mutually exclusive; \
     build plugins with `default-features = false, features = [\"plugin\"]`"
);

mod foreign;
mod loader;
mod session;
mod types;

#[cfg(all(feature = "host", not(feature = "plugin")))]
pub mod exports;
#[cfg(any(feature = "host", feature = "plugin"))]
mod plugin;
#[cfg(any(feature = "host", feature = "plugin"))]
pub mod sys;

pub use foreign::ForeignTool;
pub use loader::{LoadError, LoadedModule, ModuleEntryPoint, PluginLoader};
#[cfg(any(feature = "host", feature = "plugin"))]
pub use plugin::{ExportRegistrar, FfiHost, FfiWidgets, export_tool, run_module_init};
pub use types::{
    ButtonClickedEventData, CanvasEventData, EventData, MotionEventData, MouseButtonEventData,
    RawEvent, RawEventError, RawSurface, RawTool, SliderMovedEventData, SurfaceVTable, ToolVTable,
};

pub(crate) use session::{CallScope, RegistrationScope};
