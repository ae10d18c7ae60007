//! # Family Core
//!
//! The engines behind a family life simulation. This crate works on the
//! `family_rules` data model: it persists game states safely on the player's
//! machine and tracks the achievements a playthrough earns.
//!
//! ## Core Components
//!
//! - **save_store**: Versioned local saves with checksums, obfuscated storage, quotas, export/import and a debounced auto-save
//! - **achievements**: Catalog, requirement evaluation, exactly-once unlocks, stats and badges
//! - **session**: One running playthrough wired to both engines
//! - **config**: Store limits, loadable from TOML
//!
//! ## Design Philosophy
//!
//! - **Explicit Instances**: Stores and engines are constructed and passed around, never global
//! - **Fail Closed**: Corrupted or tampered data is reported, never returned
//! - **Never Block Play**: Auto-save and achievement evaluation degrade quietly instead of failing

pub mod achievements;
pub mod config;
pub mod save_store;
pub mod session;

pub use achievements::*;
pub use config::*;
pub use save_store::*;
pub use session::*;
