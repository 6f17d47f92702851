//! Tools shipped with the host.

mod invert;
mod pencil;

pub use invert::Invert;
pub use pencil::Pencil;

use crate::host::Registrar;

/// Registers the built-in tools, the same way a plugin module would.
pub fn register_builtin(registrar: &mut dyn Registrar) {
    registrar.add_tool(Box::new(Pencil::new()));
    registrar.add_filter(Box::new(Invert::new()));
}
