//! Session orchestration for the Kingdom Builder rules engine.
//!
//! This crate sequences turns and phases, runs actions through the
//! requirement evaluator and the effect interpreter, and produces the
//! immutable snapshots handed to the transport layer.
//!
//! # Modules
//!
//! - [`clock`] -- Turn clock: turn, active player, phase and step.
//! - [`config`] -- Configuration loading from `kingdom-config.yaml` into
//!   strongly-typed structs.
//! - [`session`] -- [`GameSession`]: phase advancement and action execution.
//! - [`placeholders`] -- `$name` substitution of action parameters.
//! - [`snapshot`] -- Owned [`SessionSnapshot`] assembly.
//! - [`queue`] -- [`SessionHandle`]: the per-session FIFO operation queue.
//!
//! [`GameSession`]: session::GameSession
//! [`SessionHandle`]: queue::SessionHandle
//! [`SessionSnapshot`]: kingdom_types::SessionSnapshot

pub mod clock;
pub mod config;
pub mod placeholders;
pub mod queue;
pub mod session;
pub mod snapshot;

pub use clock::{Boundary, ClockError, TurnClock};
pub use config::{ConfigError, EngineConfig};
pub use placeholders::ActionParams;
pub use queue::SessionHandle;
pub use session::{GameSession, SessionError};
