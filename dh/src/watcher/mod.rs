//! Dev-mode watcher
//!
//! Owns the filesystem watch for a development session and drives one
//! regenerate -> rebuild -> restart cycle per detected change, strictly
//! serialized, until interrupted.

mod cycle;
mod dev_watcher;
mod session;

pub use cycle::{CycleOutcome, run_cycle};
pub use dev_watcher::DevWatcher;
pub use session::WatchSession;
