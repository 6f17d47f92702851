use crate::tool::{Tool, ToolKind};

/// What a module's initialization entry point may do: hand tools to the host.
///
/// Registration moves the tool into the host, which becomes its only owner.
pub trait Registrar {
    /// Register a tool for the toolbar
    fn add_tool(&mut self, tool: Box<dyn Tool>);

    /// Register a filter for the filter menu
    fn add_filter(&mut self, tool: Box<dyn Tool>);
}

/// Collects registrations made by a native module's entry point.
#[derive(Default)]
pub struct ModuleRegistrar {
    pending: Vec<(ToolKind, Box<dyn Tool>)>,
}

impl ModuleRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_pending(self) -> Vec<(ToolKind, Box<dyn Tool>)> {
        self.pending
    }
}

impl Registrar for ModuleRegistrar {
    fn add_tool(&mut self, tool: Box<dyn Tool>) {
        self.pending.push((ToolKind::Tool, tool));
    }

    fn add_filter(&mut self, tool: Box<dyn Tool>) {
        self.pending.push((ToolKind::Filter, tool));
    }
}
