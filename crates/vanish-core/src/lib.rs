//! Vanish state machine, visibility policy, and usage stats.
//!
//! This crate has no dependency on a game host. Player lookups, presentation
//! changes, and messaging go through the traits in [`host`]; persistence goes
//! through [`persistence::PersistenceStore`]. Everything runs synchronously on
//! the caller's tick.

pub mod assignment;
pub mod clock;
pub mod config;
pub mod error;
pub mod host;
pub mod manager;
pub mod notify;
pub mod persistence;
pub mod policy;
pub mod registry;
pub mod settings;
pub mod state;
pub mod stats;

#[cfg(test)]
mod testing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::VanishConfig;
pub use error::{StoreError, VanishError};
pub use host::{permission, BroadcastSink, Host, PlayerDirectory, PlayerHandle, PresentationSink};
pub use manager::{JoinOutcome, SweepReport, VanishManager};
pub use persistence::{Blob, JsonFileStore, MemoryStore, PersistenceStore};
