//! Game mechanics: dice, derived stats, skill checks and combat.

mod check;
mod combat;
mod dice;
mod stats;

pub use check::*;
pub use combat::*;
pub use dice::*;
pub use stats::*;
