//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, path)
//!     → router.rs (table lookup in declaration order)
//!     → matcher.rs (evaluate path patterns)
//!     → Return: matched Route or no match
//!
//! Route compilation (at startup):
//!     RouteConfig[]
//!     → Compile patterns, methods and filters
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - First match wins; no best-match or longest-prefix resolution
//! - Pattern matching is case-sensitive and CPU-only

pub mod matcher;
pub mod router;

pub use router::{Route, RouteTable};
