//! Brickfall (workspace facade crate).
//!
//! The simulation, input mapping and terminal renderer live in dedicated
//! crates under `crates/`; this package re-exports them as
//! `brickfall::{core,input,term,types}` and holds what both binaries share.

pub mod autopilot;
pub mod cli;

pub use brickfall_core as core;
pub use brickfall_input as input;
pub use brickfall_term as term;
pub use brickfall_types as types;
