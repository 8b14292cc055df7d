//! # RPG Rules
//!
//! The rules core - dice, derived combat statistics, skill checks, combat
//! resolution and the tile map. Everything here is a pure function of the data
//! handed in plus an explicitly passed [`RandomSource`]; there is no global
//! state and no I/O beyond optional config loading.

pub mod config;
pub mod entities;
pub mod error;
pub mod mechanics;
pub mod random;
pub mod world_state;

pub use config::*;
pub use entities::*;
pub use error::*;
pub use mechanics::*;
pub use random::*;
pub use world_state::*;
