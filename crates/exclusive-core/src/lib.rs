//! # Exclusive Core Library
//!
//! Guards UI interactions against rapid repeats. Double taps, fast tab
//! switches and quick screen push/pop sequences trigger their action once per
//! cooldown window; repeats inside the window are dropped.
//!
//! ## Architecture
//!
//! - **Gates**: three independent interaction classes (tab switch, view
//!   transition, normal tap), each a busy flag re-opened by a delayed reset
//! - **Scheduler**: the delayed-callback facility that runs resets on the
//!   caller's thread (simulated clock or tokio `LocalSet`)
//! - **Storage**: TOML configuration of the cooldowns
//! - **Simulation**: deterministic replay of scripted interaction timelines
//!
//! ## Key Components
//!
//! - [`InteractionGuard`]: owns the gates and admits or rejects invocations
//! - [`Scheduler`]: trait for the reset timer facility
//! - [`GuardConfig`]: cooldown configuration
//! - [`GuardEvent`]: record of every gate state change

pub mod error;
pub mod events;
pub mod gate;
pub mod scheduler;
pub mod simulation;
pub mod storage;

pub use error::{ConfigError, CoreError, GuardError, SimulationError};
pub use events::{GuardEvent, GuardSnapshot};
pub use gate::{Gate, GateKind, GateSnapshot, GateState, InteractionGuard, Invocation};
pub use scheduler::{LocalScheduler, ManualScheduler, Scheduler, Task, TimerHandle};
pub use simulation::{replay, ReplayReport, Script, ScriptStep, StepOp, StepOutcome, StepReport};
pub use storage::{config_path, CooldownConfig, GuardConfig};
