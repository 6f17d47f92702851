mod lifecycle;
mod trait_def;

use serde::{Deserialize, Serialize};

pub use lifecycle::Lifecycle;
pub use trait_def::{Tool, ToolHost};

/// Host-assigned index of a registered tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ToolId(pub usize);

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tool {}", self.0)
    }
}

/// Where the host places a registered tool. Both kinds share one contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    /// Registered with `addTool`: shown on the toolbar
    Tool,
    /// Registered with `addFilter`: shown in the filter menu
    Filter,
}
