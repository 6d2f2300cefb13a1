//! # Narrative Core
//!
//! The storyteller of Hearthtale. This crate reads worlds and session state
//! from `tale_state`, suggests what the player might do, resolves what they
//! choose, and runs the turn-based session loop.
//!
//! ## Core Components
//!
//! - **presenter**: Ranks available actions into a 3-4 item menu plus a free-form wildcard
//! - **resolver**: Interprets free-form text and turns actions into narration and state deltas
//! - **session**: The turn loop, transcript, snapshots and a line-oriented driver
//! - **scene**: Describes the player's surroundings
//!
//! ## Design Philosophy
//!
//! - **State-Driven**: Every suggestion and narration is derived from the session state
//! - **Never Fatal**: Input that cannot be understood is narrated, never raised to the host
//! - **Explicit State**: The session state is passed by reference, never held globally

pub mod choice;
pub mod config;
pub mod presenter;
pub mod resolver;
pub mod scene;
pub mod session;

pub use choice::*;
pub use config::*;
pub use presenter::*;
pub use resolver::*;
pub use scene::*;
pub use session::*;
