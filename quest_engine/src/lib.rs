//! # Quest Engine
//!
//! Drives quests on top of `rpg_rules`: authored quest graphs are validated at
//! load time, walked node by node, and discovered at map locations through a
//! tiered search.
//!
//! ## Core Components
//!
//! - **quest**: Quest content model, catalog validation and the graph runner
//! - **discovery**: Search-roll tiers, distance bands and location assignment
//! - **ledger**: Active, completed and failed quests
//! - **merchant**: Tick-gated merchant stock
//! - **travel**: Staged, cancelable movement across tiles
//! - **session**: One player's session wiring all of the above together

pub mod config;
pub mod discovery;
pub mod error;
pub mod ledger;
pub mod merchant;
pub mod quest;
pub mod session;
pub mod travel;

pub use config::*;
pub use discovery::*;
pub use error::*;
pub use ledger::*;
pub use merchant::*;
pub use quest::*;
pub use session::*;
pub use travel::*;
