mod events;
mod queue;

pub use events::*;
pub use queue::EventQueue;
