//! # Family Rules
//!
//! The data model of a Hearthside playthrough: the game state, the children being
//! raised, the decision timeline and the achievement records that persist with them.
//! This crate holds no I/O and no evaluation logic; it is the single source of
//! truth for what a save contains.

pub mod achievement_state;
pub mod entities;
pub mod game_state;
pub mod mechanics;

pub use achievement_state::*;
pub use entities::*;
pub use game_state::*;
pub use mechanics::*;
