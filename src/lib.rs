#![warn(clippy::all, rust_2018_idioms)]

pub mod color;
pub mod context;
pub mod error;
pub mod event;
pub mod ffi;
pub mod host;
pub mod input;
pub mod surface;
pub mod tool;
pub mod tools;
pub mod widget;

mod id_generator;

pub use color::Color;
pub use context::{AppContext, ApplicationContext};
pub use error::{HostError, HostResult, TransitionError};
pub use event::{CanvasPhase, Event, EventKind, Modifiers, MouseButton};
pub use ffi::{ForeignTool, LoadError, PluginLoader};
pub use host::{ConfigError, Host, HostConfig, ModuleRegistrar, Registrar, ToolInfo};
pub use input::InputHandler;
pub use surface::{PixelBuffer, PixelSurface};
pub use tool::{Lifecycle, Tool, ToolHost, ToolId, ToolKind};
pub use widget::{CanvasOps, Geometry, SliderRange, WidgetFactory, WidgetId};
