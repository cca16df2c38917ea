mod guard;
mod kind;
mod state;

pub use guard::{InteractionGuard, Invocation};
pub use kind::{GateKind, GateState};
pub use state::{Gate, GateSnapshot};
