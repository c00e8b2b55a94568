//! CLI command handlers.

mod check;
mod hash;
mod update;

pub use check::run_check;
pub use hash::run_hash;
pub use update::run_update;
