use thiserror::Error;

use crate::tool::ToolId;
use crate::widget::WidgetId;

/// Errors that can occur during tool lifecycle transitions
#[derive(Debug, Error)]
pub enum TransitionError {
    /// Attempted to transition between incompatible states
    #[error("cannot transition from {from} to {to}")]
    InvalidStateTransition {
        from: &'static str,
        to: &'static str,
    },
}

/// Errors reported by host-side operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("no {0} is registered")]
    UnknownTool(ToolId),

    #[error("no widget {0} exists")]
    UnknownWidget(WidgetId),

    #[error("widget {id} is a {actual}, expected a {expected}")]
    WrongWidgetKind {
        id: WidgetId,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{0} is not accepting events")]
    NotActive(ToolId),

    #[error("no active tool to receive image events")]
    NoActiveTool,

    #[error("({x}, {y}) lies outside canvas {id}")]
    OutOfBounds { id: WidgetId, x: usize, y: usize },

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;
