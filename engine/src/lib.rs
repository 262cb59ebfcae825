//! Readiness gating engine for Curtain - state machine and orchestration.
//!
//! This crate decides when a client has finished preparing its visual
//! surface and may reveal primary content. [`gate::ReadinessGate`] owns the
//! synchronous state transitions; [`driver`] runs them against real timers
//! and readiness sources on a tokio runtime. The render surface itself is
//! reached only through the seams in [`surface`] and [`store`], so none of
//! this crate performs UI work.

pub mod config;
pub mod driver;
pub mod gate;
pub mod store;
pub mod surface;

pub use config::{ConfigError, CurtainConfig};
pub use driver::RevealTask;
pub use gate::{GateConfig, ReadinessGate};
pub use store::{JsonFileStore, MemoryStore, StoreError, VISITED_KEY, VISITED_VALUE, VisitStore};
pub use surface::{FontFault, ImageSurface};

// Re-export the domain types consumers need alongside the gate.
pub use curtain_types::{GateSnapshot, ImageCensus, Progress, ReadinessVector, VisitorClass};
