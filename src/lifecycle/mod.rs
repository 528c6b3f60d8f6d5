//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build route table & verifier → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     ctrl-c received → broadcast signal → server drains → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Shutdown fans out over a broadcast channel so every long-running
//!   task observes it

pub mod shutdown;

pub use shutdown::Shutdown;
