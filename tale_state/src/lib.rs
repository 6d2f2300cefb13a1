//! # Tale State
//!
//! The "World Bible" crate - authored worlds, the per-session state they give
//! rise to, and the store that mutates that state through deltas.
//! This crate is the single source of truth for session state and contains no
//! narrative logic.

pub mod delta;
pub mod entities;
pub mod state;
pub mod store;
pub mod world;

pub use delta::*;
pub use entities::*;
pub use state::*;
pub use store::*;
pub use world::*;
